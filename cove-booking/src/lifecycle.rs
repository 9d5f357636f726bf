use std::sync::Arc;

use chrono::{DateTime, Utc};
use cove_core::payment::{PaymentAdapter, PaymentProof};
use uuid::Uuid;

use crate::ledger::LedgerRepository;
use crate::models::{Reservation, ReservationStatus};

/// Operational transitions driven by staff events: hand-over, return,
/// cancellation. Each one re-reads the ledger, guards the transition,
/// and writes back in a single save.
pub struct LifecycleService {
    ledger: Arc<dyn LedgerRepository>,
    payments: Arc<dyn PaymentAdapter>,
}

impl LifecycleService {
    pub fn new(ledger: Arc<dyn LedgerRepository>, payments: Arc<dyn PaymentAdapter>) -> Self {
        Self { ledger, payments }
    }

    /// Transition: Confirmed -> InUse (resource physically handed over).
    /// An advance booking settles its remaining balance here; nothing
    /// goes out the door with money still owed.
    pub async fn check_in(
        &self,
        reservation_id: Uuid,
        balance_payment: Option<&PaymentProof>,
    ) -> Result<Reservation, LifecycleError> {
        let mut reservation = self.load(reservation_id).await?;

        if reservation.status != ReservationStatus::Confirmed {
            return Err(LifecycleError::InvalidTransition {
                from: format!("{:?}", reservation.status),
                to: "IN_USE".to_string(),
            });
        }

        if let Some(payment) = balance_payment {
            let verified = self
                .payments
                .verify(payment)
                .await
                .map_err(|e| LifecycleError::Infrastructure(e.to_string()))?;
            if !verified {
                return Err(LifecycleError::PaymentInsufficient {
                    outstanding_cents: reservation.outstanding_cents,
                    captured_cents: 0,
                });
            }
            reservation.apply_payment(payment.amount_cents.min(reservation.outstanding_cents));
        }

        if reservation.outstanding_cents > 0 {
            return Err(LifecycleError::PaymentInsufficient {
                outstanding_cents: reservation.outstanding_cents,
                captured_cents: balance_payment.map(|p| p.amount_cents).unwrap_or(0),
            });
        }

        reservation.update_status(ReservationStatus::InUse);
        self.save(&reservation, ReservationStatus::Confirmed).await?;

        tracing::info!(reservation_id = %reservation.id, "Checked in");
        Ok(reservation)
    }

    /// Transition: InUse -> Completed. Records the actual return instant
    /// (the turnaround buffer runs from here) and books the deposit
    /// refund in the same write.
    pub async fn check_out(
        &self,
        reservation_id: Uuid,
        returned_at: DateTime<Utc>,
    ) -> Result<Reservation, LifecycleError> {
        let mut reservation = self.load(reservation_id).await?;

        if reservation.status != ReservationStatus::InUse {
            return Err(LifecycleError::InvalidTransition {
                from: format!("{:?}", reservation.status),
                to: "COMPLETED".to_string(),
            });
        }

        reservation.completed_at = Some(returned_at);
        reservation.deposit_refunded = true;
        reservation.update_status(ReservationStatus::Completed);
        self.save(&reservation, ReservationStatus::InUse).await?;

        tracing::info!(reservation_id = %reservation.id, %returned_at, "Checked out");
        Ok(reservation)
    }

    /// Any pre-InUse state may cancel. The units become visible to the
    /// availability calculator the moment the status lands in the
    /// ledger; there is no separate cleanup step.
    pub async fn cancel(&self, reservation_id: Uuid) -> Result<Reservation, LifecycleError> {
        let mut reservation = self.load(reservation_id).await?;

        match reservation.status {
            ReservationStatus::Held | ReservationStatus::Confirmed => {}
            _ => {
                return Err(LifecycleError::InvalidTransition {
                    from: format!("{:?}", reservation.status),
                    to: "CANCELLED".to_string(),
                })
            }
        }

        let read_status = reservation.status;
        reservation.update_status(ReservationStatus::Cancelled);
        self.save(&reservation, read_status).await?;

        tracing::info!(reservation_id = %reservation.id, "Cancelled");
        Ok(reservation)
    }

    async fn load(&self, id: Uuid) -> Result<Reservation, LifecycleError> {
        self.ledger
            .get(id)
            .await
            .map_err(|e| LifecycleError::Infrastructure(e.to_string()))?
            .ok_or(LifecycleError::ReservationNotFound(id))
    }

    /// Writes are conditional on the status read at load time; a writer
    /// that raced us and already transitioned the row wins.
    async fn save(
        &self,
        reservation: &Reservation,
        expected: ReservationStatus,
    ) -> Result<(), LifecycleError> {
        let applied = self
            .ledger
            .save_if_status(reservation, expected)
            .await
            .map_err(|e| LifecycleError::Infrastructure(e.to_string()))?;
        if !applied {
            return Err(LifecycleError::ConcurrentModification(reservation.id));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Reservation not found: {0}")]
    ReservationNotFound(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Outstanding balance of {outstanding_cents} cents; captured {captured_cents}")]
    PaymentInsufficient {
        outstanding_cents: i64,
        captured_cents: i64,
    },

    #[error("Reservation {0} was modified concurrently")]
    ConcurrentModification(Uuid),

    #[error("Lifecycle operation failed: {0}")]
    Infrastructure(String),
}

