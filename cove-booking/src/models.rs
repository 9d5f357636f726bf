use chrono::{DateTime, Utc};
use cove_catalog::ResourceCategory;
use cove_quote::{BookingMode, QuoteResult};
use cove_shared::TimeWindow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reservation status in the lifecycle. `quoted` is ephemeral and never
/// written to the ledger; `pending` is CONFIRMED with an outstanding
/// balance, not a separate status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Held,
    Confirmed,
    InUse,
    Completed,
    Cancelled,
}

/// One rented resource within a reservation. The unit rate is captured
/// at booking time; later catalog changes never alter existing lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationLineItem {
    pub resource_id: Uuid,
    pub category: ResourceCategory,
    pub quantity: i32,
    pub window: TimeWindow,
    pub unit_rate_cents: i64,
}

impl ReservationLineItem {
    /// Occupancy window plus the category's turnaround buffer. Units
    /// stay unavailable until this window ends.
    pub fn buffered_window(&self) -> TimeWindow {
        self.window.extended_by(self.category.turnaround_buffer())
    }
}

/// Monetary breakdown, minor currency units.
/// `final_cents == base + tax + deposit - discount` always.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonetaryTotals {
    pub base_cents: i64,
    pub tax_cents: i64,
    pub deposit_cents: i64,
    pub discount_cents: i64,
    pub final_cents: i64,
}

impl MonetaryTotals {
    pub fn from_quote(quote: &QuoteResult) -> Self {
        Self {
            base_cents: quote.total_base_cents,
            tax_cents: quote.tax_cents,
            deposit_cents: quote.deposit_cents,
            discount_cents: quote.discount_cents,
            final_cents: quote.final_total_cents,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.final_cents
            == self.base_cents + self.tax_cents + self.deposit_cents - self.discount_cents
    }
}

/// A committed (or tentatively held) rental. Never physically deleted;
/// cancellation and completion are statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub customer_id: String,
    pub seller_id: Option<String>,
    pub location_id: Uuid,
    pub line_items: Vec<ReservationLineItem>,
    pub totals: MonetaryTotals,
    pub amount_paid_cents: i64,
    pub outstanding_cents: i64,
    pub mode: BookingMode,
    pub status: ReservationStatus,
    pub hold_expires_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub deposit_refunded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        customer_id: String,
        seller_id: Option<String>,
        location_id: Uuid,
        line_items: Vec<ReservationLineItem>,
        totals: MonetaryTotals,
        mode: BookingMode,
        status: ReservationStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            seller_id,
            location_id,
            line_items,
            totals,
            amount_paid_cents: 0,
            outstanding_cents: totals.final_cents,
            mode,
            status,
            hold_expires_at: None,
            completed_at: None,
            deposit_refunded: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: ReservationStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    /// Record a captured amount against the outstanding balance.
    pub fn apply_payment(&mut self, amount_cents: i64) {
        self.amount_paid_cents += amount_cents;
        self.outstanding_cents -= amount_cents;
        self.updated_at = Utc::now();
    }

    /// Advance booking that is confirmed but not fully paid.
    pub fn is_pending(&self) -> bool {
        self.status == ReservationStatus::Confirmed && self.outstanding_cents > 0
    }

    pub fn is_hold_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Held
            && self.hold_expires_at.map(|t| t <= now).unwrap_or(false)
    }

    /// `amount_paid + outstanding == final_total`, exactly.
    pub fn payment_invariant_holds(&self) -> bool {
        self.amount_paid_cents + self.outstanding_cents == self.totals.final_cents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cove_shared::TimeWindow;

    fn totals(final_cents: i64) -> MonetaryTotals {
        MonetaryTotals {
            base_cents: final_cents,
            tax_cents: 0,
            deposit_cents: 0,
            discount_cents: 0,
            final_cents,
        }
    }

    fn reservation(final_cents: i64) -> Reservation {
        Reservation::new(
            "customer@example.com".to_string(),
            None,
            Uuid::new_v4(),
            vec![],
            totals(final_cents),
            BookingMode::Advance,
            ReservationStatus::Confirmed,
        )
    }

    #[test]
    fn test_payment_invariant_through_partial_payments() {
        let mut r = reservation(10000);
        assert!(r.payment_invariant_holds());

        r.apply_payment(6000);
        assert!(r.payment_invariant_holds());
        assert!(r.is_pending());

        r.apply_payment(4000);
        assert!(r.payment_invariant_holds());
        assert!(!r.is_pending());
        assert_eq!(r.outstanding_cents, 0);
    }

    #[test]
    fn test_hold_expiry_check() {
        let mut r = reservation(5000);
        r.status = ReservationStatus::Held;
        let now = Utc::now();

        r.hold_expires_at = Some(now + Duration::minutes(5));
        assert!(!r.is_hold_expired(now));

        r.hold_expires_at = Some(now - Duration::seconds(1));
        assert!(r.is_hold_expired(now));

        // Only holds expire
        r.status = ReservationStatus::Confirmed;
        assert!(!r.is_hold_expired(now));
    }

    #[test]
    fn test_buffered_window_uses_category_buffer() {
        let start = Utc::now();
        let line = ReservationLineItem {
            resource_id: Uuid::new_v4(),
            category: ResourceCategory::Motorized,
            quantity: 1,
            window: TimeWindow::from_hours(start, 1),
            unit_rate_cents: 5000,
        };
        let buffered = line.buffered_window();
        assert_eq!(buffered.end, start + Duration::hours(1) + Duration::minutes(10));
    }
}
