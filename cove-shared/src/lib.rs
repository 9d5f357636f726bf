pub mod money;
pub mod time;

pub use money::{apply_rate, split_advance, ADVANCE_SHARE_PERCENT};
pub use time::TimeWindow;
