// These tests live as integration tests rather than unit tests inside
// cove-booking: they use cove-store's in-memory ledger, and cove-store
// depends on cove-booking, so a unit-test build would compile two copies
// of the crate and the trait impls would not line up.

use std::sync::Arc;

use chrono::{Duration, Utc};
use cove_booking::ledger::LedgerRepository;
use cove_booking::lifecycle::{LifecycleError, LifecycleService};
use cove_booking::models::{MonetaryTotals, Reservation, ReservationLineItem, ReservationStatus};
use cove_catalog::ResourceCategory;
use cove_core::payment::{AcceptingPaymentAdapter, PaymentProof, PaymentStatus};
use cove_quote::BookingMode;
use cove_shared::TimeWindow;
use cove_store::memory::InMemoryLedger;
use uuid::Uuid;

fn reservation(mode: BookingMode, paid_cents: i64) -> Reservation {
    let totals = MonetaryTotals {
        base_cents: 10000,
        tax_cents: 1800,
        deposit_cents: 2000,
        discount_cents: 0,
        final_cents: 13800,
    };
    let mut r = Reservation::new(
        "customer@example.com".to_string(),
        None,
        Uuid::new_v4(),
        vec![ReservationLineItem {
            resource_id: Uuid::new_v4(),
            category: ResourceCategory::Aquatic,
            quantity: 1,
            window: TimeWindow::from_hours(Utc::now(), 2),
            unit_rate_cents: 5000,
        }],
        totals,
        mode,
        ReservationStatus::Confirmed,
    );
    r.apply_payment(paid_cents);
    r
}

fn proof(amount_cents: i64) -> PaymentProof {
    PaymentProof {
        reference: "pi_test".to_string(),
        amount_cents,
        currency: "USD".to_string(),
        status: PaymentStatus::Succeeded,
        captured_at: Utc::now(),
    }
}

async fn service() -> (LifecycleService, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::new());
    (
        LifecycleService::new(ledger.clone(), Arc::new(AcceptingPaymentAdapter)),
        ledger,
    )
}

#[tokio::test]
async fn test_full_lifecycle() {
    let (service, ledger) = service().await;
    let r = reservation(BookingMode::Immediate, 13800);
    ledger.create(&r).await.unwrap();

    let r = service.check_in(r.id, None).await.unwrap();
    assert_eq!(r.status, ReservationStatus::InUse);

    let returned_at = Utc::now() + Duration::hours(2);
    let r = service.check_out(r.id, returned_at).await.unwrap();
    assert_eq!(r.status, ReservationStatus::Completed);
    assert_eq!(r.completed_at, Some(returned_at));
    assert!(r.deposit_refunded);
}

#[tokio::test]
async fn test_check_in_blocks_on_outstanding_balance() {
    let (service, ledger) = service().await;
    // Advance booking paid 60%
    let r = reservation(BookingMode::Advance, 8280);
    ledger.create(&r).await.unwrap();

    let err = service.check_in(r.id, None).await.unwrap_err();
    match err {
        LifecycleError::PaymentInsufficient { outstanding_cents, .. } => {
            assert_eq!(outstanding_cents, 13800 - 8280);
        }
        other => panic!("expected PaymentInsufficient, got {other:?}"),
    }

    // Settling the balance at the counter unblocks hand-over
    let r = service.check_in(r.id, Some(&proof(13800 - 8280))).await.unwrap();
    assert_eq!(r.status, ReservationStatus::InUse);
    assert_eq!(r.outstanding_cents, 0);
    assert!(r.payment_invariant_holds());
}

#[tokio::test]
async fn test_cannot_cancel_in_use() {
    let (service, ledger) = service().await;
    let mut r = reservation(BookingMode::Immediate, 13800);
    r.update_status(ReservationStatus::InUse);
    ledger.create(&r).await.unwrap();

    let err = service.cancel(r.id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_cancel_confirmed() {
    let (service, ledger) = service().await;
    let r = reservation(BookingMode::Immediate, 13800);
    ledger.create(&r).await.unwrap();

    let r = service.cancel(r.id).await.unwrap();
    assert_eq!(r.status, ReservationStatus::Cancelled);
}

#[tokio::test]
async fn test_check_out_requires_in_use() {
    let (service, ledger) = service().await;
    let r = reservation(BookingMode::Immediate, 13800);
    ledger.create(&r).await.unwrap();

    let err = service.check_out(r.id, Utc::now()).await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
}

/// Serves one reservation's reads from a stale snapshot while the
/// inner ledger already holds a newer row.
struct StaleReadLedger {
    inner: Arc<InMemoryLedger>,
    stale: Reservation,
}

#[async_trait::async_trait]
impl LedgerRepository for StaleReadLedger {
    async fn create(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner.create(reservation).await
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Reservation>, Box<dyn std::error::Error + Send + Sync>> {
        if id == self.stale.id {
            return Ok(Some(self.stale.clone()));
        }
        self.inner.get(id).await
    }

    async fn save(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner.save(reservation).await
    }

    async fn save_if_status(
        &self,
        reservation: &Reservation,
        expected: ReservationStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        self.inner.save_if_status(reservation, expected).await
    }

    async fn list_for_resource(
        &self,
        resource_id: Uuid,
    ) -> Result<Vec<Reservation>, Box<dyn std::error::Error + Send + Sync>> {
        self.inner.list_for_resource(resource_id).await
    }

    async fn list_expired_holds(
        &self,
        now: chrono::DateTime<Utc>,
    ) -> Result<Vec<Uuid>, Box<dyn std::error::Error + Send + Sync>> {
        self.inner.list_expired_holds(now).await
    }
}

#[tokio::test]
async fn test_check_in_loses_race_against_cancel() {
    let inner = Arc::new(InMemoryLedger::new());
    let confirmed = reservation(BookingMode::Immediate, 13800);
    inner.create(&confirmed).await.unwrap();

    // A cancel lands in the ledger after check-in read the row.
    let mut cancelled = confirmed.clone();
    cancelled.update_status(ReservationStatus::Cancelled);
    inner.save(&cancelled).await.unwrap();

    let service = LifecycleService::new(
        Arc::new(StaleReadLedger {
            inner: inner.clone(),
            stale: confirmed.clone(),
        }),
        Arc::new(AcceptingPaymentAdapter),
    );

    let err = service.check_in(confirmed.id, None).await.unwrap_err();
    assert!(matches!(err, LifecycleError::ConcurrentModification(_)));

    // First write stays authoritative.
    let stored = inner.get(confirmed.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ReservationStatus::Cancelled);
}
