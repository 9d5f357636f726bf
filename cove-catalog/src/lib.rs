pub mod resource;
pub mod schedule;

pub use resource::{Resource, ResourceCategory, ResourceError};
pub use schedule::{LocationSchedule, OpenHours};
