// Integration tests rather than unit tests: they use cove-store's
// in-memory repositories, and cove-store depends on cove-booking, so a
// unit-test build would compile two copies of the crate.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use cove_booking::admission::{AdmissionError, AdmissionService};
use cove_booking::ledger::LedgerRepository;
use cove_booking::models::ReservationStatus;
use cove_catalog::{LocationSchedule, Resource, ResourceCategory};
use cove_core::payment::{AcceptingPaymentAdapter, PaymentProof, PaymentStatus};
use cove_core::repository::{CatalogRepository, ScheduleRepository};
use cove_quote::{default_coupons, BookingMode, Cart, CartLine, CouponBook, PricingRates, QuoteEngine};
use cove_store::memory::{InMemoryCatalog, InMemoryLedger, InMemorySchedules};
use uuid::Uuid;

struct Fixture {
    service: Arc<AdmissionService>,
    ledger: Arc<InMemoryLedger>,
    resource: Resource,
}

async fn fixture(category: ResourceCategory, stock: i32, schedule: Option<LocationSchedule>) -> Fixture {
    let catalog = Arc::new(InMemoryCatalog::new());
    let schedules = Arc::new(InMemorySchedules::new());
    let ledger = Arc::new(InMemoryLedger::new());

    let location_id = schedule
        .as_ref()
        .map(|s| s.location_id)
        .unwrap_or_else(Uuid::new_v4);
    if let Some(s) = &schedule {
        schedules.upsert_schedule(s).await.unwrap();
    }

    let resource = Resource::new(location_id, category, "unit".to_string(), 5000, stock);
    catalog.upsert_resource(&resource).await.unwrap();

    let quotes = Arc::new(QuoteEngine::new(
        catalog.clone(),
        Arc::new(CouponBook::new(default_coupons())),
        PricingRates { tax_rate: 0.18, deposit_rate: 0.20 },
    ));

    let service = Arc::new(AdmissionService::new(
        catalog,
        schedules,
        ledger.clone(),
        quotes,
        Arc::new(AcceptingPaymentAdapter),
        600,
    ));

    Fixture { service, ledger, resource }
}

fn proof(amount_cents: i64) -> PaymentProof {
    PaymentProof {
        reference: format!("pi_{}", Uuid::new_v4().simple()),
        amount_cents,
        currency: "USD".to_string(),
        status: PaymentStatus::Succeeded,
        captured_at: Utc::now(),
    }
}

fn cart(resource_id: Uuid, quantity: i32, hours: u32) -> Cart {
    Cart::new(vec![CartLine { resource_id, quantity, hours }])
}

fn at(h: u32, m: u32) -> DateTime<Utc> {
    // 2025-06-14 is a Saturday
    Utc.with_ymd_and_hms(2025, 6, 14, h, m, 0).unwrap()
}

fn open_daily(opens: (u32, u32), closes: (u32, u32)) -> LocationSchedule {
    LocationSchedule::uniform(
        Uuid::new_v4(),
        NaiveTime::from_hms_opt(opens.0, opens.1, 0).unwrap(),
        NaiveTime::from_hms_opt(closes.0, closes.1, 0).unwrap(),
    )
}

#[tokio::test]
async fn test_admit_immediate_full_payment() {
    let f = fixture(ResourceCategory::Aquatic, 3, None).await;
    // 50.00 * 2h = 100.00 base; +18 tax +20 deposit = 138.00
    let reservation = f
        .service
        .admit(
            &cart(f.resource.id, 1, 2),
            Utc::now(),
            BookingMode::Immediate,
            "customer@example.com".to_string(),
            None,
            None,
            &proof(13800),
        )
        .await
        .unwrap();

    assert_eq!(reservation.status, ReservationStatus::Confirmed);
    assert_eq!(reservation.totals.final_cents, 13800);
    assert_eq!(reservation.amount_paid_cents, 13800);
    assert_eq!(reservation.outstanding_cents, 0);
    assert!(!reservation.is_pending());
    assert!(reservation.payment_invariant_holds());
    assert!(reservation.totals.is_consistent());
}

#[tokio::test]
async fn test_admit_advance_sixty_percent_leaves_balance() {
    let f = fixture(ResourceCategory::Camping, 2, None).await;
    // 50.00 * 2h = 100.00 base -> 138.00 final -> 82.80 due now
    let reservation = f
        .service
        .admit(
            &cart(f.resource.id, 1, 2),
            Utc::now() + Duration::days(3),
            BookingMode::Advance,
            "customer@example.com".to_string(),
            None,
            None,
            &proof(8280),
        )
        .await
        .unwrap();

    assert_eq!(reservation.status, ReservationStatus::Confirmed);
    assert!(reservation.is_pending());
    assert_eq!(reservation.amount_paid_cents, 8280);
    assert_eq!(reservation.outstanding_cents, 13800 - 8280);
    assert!(reservation.payment_invariant_holds());
}

#[tokio::test]
async fn test_payment_insufficient_does_not_touch_ledger() {
    let f = fixture(ResourceCategory::Beach, 1, None).await;
    let start = Utc::now();

    let err = f
        .service
        .admit(
            &cart(f.resource.id, 1, 2),
            start,
            BookingMode::Immediate,
            "customer@example.com".to_string(),
            None,
            None,
            &proof(100),
        )
        .await
        .unwrap_err();

    match err {
        AdmissionError::PaymentInsufficient { required_cents, captured_cents } => {
            assert_eq!(required_cents, 13800);
            assert_eq!(captured_cents, 100);
        }
        other => panic!("expected PaymentInsufficient, got {other:?}"),
    }

    let free = f
        .service
        .availability()
        .free_units_at(f.resource.id, start + Duration::minutes(30))
        .await
        .unwrap();
    assert_eq!(free, 1);
}

#[tokio::test]
async fn test_oversell_reports_exact_shortfall() {
    let f = fixture(ResourceCategory::Beach, 2, None).await;
    let start = Utc::now();

    f.service
        .admit(
            &cart(f.resource.id, 2, 2),
            start,
            BookingMode::Immediate,
            "first@example.com".to_string(),
            None,
            None,
            &proof(1_000_000),
        )
        .await
        .unwrap();

    let err = f
        .service
        .admit(
            &cart(f.resource.id, 2, 2),
            start,
            BookingMode::Immediate,
            "second@example.com".to_string(),
            None,
            None,
            &proof(1_000_000),
        )
        .await
        .unwrap_err();

    match err {
        AdmissionError::InsufficientStock { shortages } => {
            assert_eq!(shortages.len(), 1);
            assert_eq!(shortages[0].requested, 2);
            assert_eq!(shortages[0].available, 0);
            assert_eq!(shortages[0].short_by, 2);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
}

#[tokio::test]
async fn test_schedule_conflict_cites_closing_time() {
    let schedule = open_daily((8, 0), (18, 0));
    let f = fixture(ResourceCategory::Beach, 5, Some(schedule)).await;

    // 17:30 + 3h = 20:30, past the 18:00 close
    let err = f
        .service
        .admit(
            &cart(f.resource.id, 1, 3),
            at(17, 30),
            BookingMode::Immediate,
            "customer@example.com".to_string(),
            None,
            None,
            &proof(1_000_000),
        )
        .await
        .unwrap_err();

    match err {
        AdmissionError::ScheduleConflict { closes_at, occupancy_end, .. } => {
            assert_eq!(closes_at, at(18, 0));
            // 20:30 plus the 2-minute beach turnaround
            assert_eq!(occupancy_end, at(20, 32));
        }
        other => panic!("expected ScheduleConflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_advance_mode_skips_closing_check() {
    let schedule = open_daily((8, 0), (18, 0));
    let f = fixture(ResourceCategory::Beach, 5, Some(schedule)).await;

    let reservation = f
        .service
        .admit(
            &cart(f.resource.id, 1, 3),
            at(17, 30),
            BookingMode::Advance,
            "customer@example.com".to_string(),
            None,
            None,
            &proof(1_000_000),
        )
        .await;
    assert!(reservation.is_ok());
}

#[tokio::test]
async fn test_no_oversell_under_concurrent_admissions() {
    let f = fixture(ResourceCategory::Motorized, 1, None).await;
    let start = Utc::now();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = f.service.clone();
        let cart = cart(f.resource.id, 1, 2);
        handles.push(tokio::spawn(async move {
            service
                .admit(
                    &cart,
                    start,
                    BookingMode::Immediate,
                    format!("customer{}@example.com", i),
                    None,
                    None,
                    &proof(1_000_000),
                )
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AdmissionError::InsufficientStock { .. }) => {}
            Err(other) => panic!("unexpected admission failure: {other:?}"),
        }
    }
    assert_eq!(successes, 1);

    let free = f
        .service
        .availability()
        .free_units_at(f.resource.id, start + Duration::minutes(30))
        .await
        .unwrap();
    assert_eq!(free, 0);
}

#[tokio::test]
async fn test_hold_then_confirm() {
    let f = fixture(ResourceCategory::Aquatic, 1, None).await;
    let start = Utc::now();

    let hold = f
        .service
        .place_hold(
            &cart(f.resource.id, 1, 2),
            start,
            BookingMode::Immediate,
            "customer@example.com".to_string(),
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(hold.status, ReservationStatus::Held);
    assert!(hold.hold_expires_at.is_some());

    // The hold tentatively occupies the unit
    let free = f
        .service
        .availability()
        .free_units_at(f.resource.id, start + Duration::minutes(30))
        .await
        .unwrap();
    assert_eq!(free, 0);

    // A second customer cannot take the held unit
    let err = f
        .service
        .admit(
            &cart(f.resource.id, 1, 2),
            start,
            BookingMode::Immediate,
            "rival@example.com".to_string(),
            None,
            None,
            &proof(1_000_000),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AdmissionError::InsufficientStock { .. }));

    // Confirming the hold does not trip over its own occupancy
    let confirmed = f
        .service
        .confirm_hold(hold.id, &proof(hold.totals.final_cents))
        .await
        .unwrap();
    assert_eq!(confirmed.status, ReservationStatus::Confirmed);
    assert_eq!(confirmed.outstanding_cents, 0);
    assert!(confirmed.hold_expires_at.is_none());
}

#[tokio::test]
async fn test_expired_hold_cannot_confirm() {
    let f = fixture(ResourceCategory::Aquatic, 1, None).await;

    let hold = f
        .service
        .place_hold(
            &cart(f.resource.id, 1, 2),
            Utc::now(),
            BookingMode::Immediate,
            "customer@example.com".to_string(),
            None,
            None,
        )
        .await
        .unwrap();

    // Force the TTL into the past
    let mut stale = f.ledger.get(hold.id).await.unwrap().unwrap();
    stale.hold_expires_at = Some(Utc::now() - Duration::seconds(1));
    f.ledger.save(&stale).await.unwrap();

    let err = f
        .service
        .confirm_hold(hold.id, &proof(1_000_000))
        .await
        .unwrap_err();
    assert!(matches!(err, AdmissionError::HoldExpired(_)));
}

#[tokio::test]
async fn test_coupon_carried_into_admission_totals() {
    let f = fixture(ResourceCategory::Beach, 5, None).await;

    // 100.00 base, 10% off via SUMMER10: final = 100 + 18 + 20 - 10
    let reservation = f
        .service
        .admit(
            &cart(f.resource.id, 1, 2),
            Utc::now(),
            BookingMode::Immediate,
            "customer@example.com".to_string(),
            None,
            Some("SUMMER10"),
            &proof(1_000_000),
        )
        .await
        .unwrap();

    assert_eq!(reservation.totals.discount_cents, 1000);
    assert_eq!(reservation.totals.final_cents, 12800);
    assert!(reservation.totals.is_consistent());
}
