use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Reservation, ReservationStatus};

/// Repository trait for the reservation ledger. The ledger is the
/// authoritative record availability is computed from; rows are only
/// ever created or rewritten, never removed.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn create(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Reservation>, Box<dyn std::error::Error + Send + Sync>>;

    /// Overwrite an existing reservation by id.
    async fn save(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Overwrite only if the stored row still has `expected` status.
    /// Returns whether the write applied. Status transitions go through
    /// this so that two writers racing on the same reservation cannot
    /// clobber each other's committed state.
    async fn save_if_status(
        &self,
        reservation: &Reservation,
        expected: ReservationStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// All reservations containing a line item for the resource,
    /// regardless of status.
    async fn list_for_resource(
        &self,
        resource_id: Uuid,
    ) -> Result<Vec<Reservation>, Box<dyn std::error::Error + Send + Sync>>;

    /// Ids of held reservations whose TTL elapsed at or before `now`.
    async fn list_expired_holds(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, Box<dyn std::error::Error + Send + Sync>>;
}
