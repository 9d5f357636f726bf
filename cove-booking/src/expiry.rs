use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::ledger::LedgerRepository;
use crate::models::ReservationStatus;

/// Reaps holds whose TTL elapsed without confirmation, transitioning
/// them to CANCELLED. The availability calculator already ignores
/// expired holds on read; the sweep keeps the ledger tidy and makes the
/// expiry terminal.
pub struct HoldExpirySweeper {
    ledger: Arc<dyn LedgerRepository>,
}

impl HoldExpirySweeper {
    pub fn new(ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { ledger }
    }

    /// Cancel every hold expired at `now`. Returns how many were reaped.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let expired = self.ledger.list_expired_holds(now).await?;
        let mut reaped = 0;

        for id in expired {
            let Some(mut reservation) = self.ledger.get(id).await? else {
                continue;
            };
            // Re-check: a confirm may have landed since the listing.
            if !reservation.is_hold_expired(now) {
                continue;
            }
            reservation.update_status(ReservationStatus::Cancelled);
            // Conditional on the row still being Held: a confirm racing
            // between our read and this write wins, and we must not
            // clobber it with the stale snapshot.
            if !self
                .ledger
                .save_if_status(&reservation, ReservationStatus::Held)
                .await?
            {
                tracing::debug!(reservation_id = %id, "Hold changed under sweep, skipped");
                continue;
            }
            reaped += 1;
            tracing::info!(reservation_id = %id, "Expired hold reaped");
        }

        Ok(reaped)
    }
}

