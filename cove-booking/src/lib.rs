pub mod admission;
pub mod availability;
pub mod expiry;
pub mod ledger;
pub mod lifecycle;
pub mod models;

pub use admission::{AdmissionError, AdmissionService, LineShortage};
pub use availability::{AvailabilityCalculator, AvailabilityError, ReleaseEvent};
pub use expiry::HoldExpirySweeper;
pub use ledger::LedgerRepository;
pub use lifecycle::{LifecycleError, LifecycleService};
pub use models::{MonetaryTotals, Reservation, ReservationLineItem, ReservationStatus};
