use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Duration, Utc};
use cove_core::payment::{PaymentAdapter, PaymentProof};
use cove_core::repository::{CatalogRepository, ScheduleRepository};
use cove_quote::{BookingMode, Cart, PaymentSchedule, QuoteEngine, QuoteError};
use cove_shared::TimeWindow;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::availability::{AvailabilityCalculator, AvailabilityError};
use crate::ledger::LedgerRepository;
use crate::models::{MonetaryTotals, Reservation, ReservationLineItem, ReservationStatus};

/// How far short one line item fell at commit time.
#[derive(Debug, Clone, Serialize)]
pub struct LineShortage {
    pub resource_id: Uuid,
    pub requested: i32,
    pub available: i32,
    pub short_by: i32,
}

fn shortage_summary(shortages: &[LineShortage]) -> String {
    shortages
        .iter()
        .map(|s| {
            format!(
                "resource {}: requested {}, available {} (short by {})",
                s.resource_id, s.requested, s.available, s.short_by
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("Invalid cart: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(Uuid),

    #[error("Insufficient stock: {}", shortage_summary(.shortages))]
    InsufficientStock { shortages: Vec<LineShortage> },

    #[error("Location {location_id} closes at {closes_at}; occupancy (incl. turnaround) would end at {occupancy_end}")]
    ScheduleConflict {
        location_id: Uuid,
        closes_at: DateTime<Utc>,
        occupancy_end: DateTime<Utc>,
    },

    #[error("Location {location_id} opens at {opens_at}; requested start is {start}")]
    BeforeOpening {
        location_id: Uuid,
        opens_at: DateTime<Utc>,
        start: DateTime<Utc>,
    },

    #[error("Location {location_id} is closed on {on}")]
    LocationClosed {
        location_id: Uuid,
        on: DateTime<Utc>,
    },

    #[error("Payment insufficient: required {required_cents} cents, captured {captured_cents}")]
    PaymentInsufficient {
        required_cents: i64,
        captured_cents: i64,
    },

    #[error("Payment proof failed verification")]
    PaymentUnverified,

    #[error("Reservation not found: {0}")]
    ReservationNotFound(Uuid),

    #[error("Hold expired: {0}")]
    HoldExpired(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Admission failed: {0}")]
    Infrastructure(String),
}

impl From<QuoteError> for AdmissionError {
    fn from(e: QuoteError) -> Self {
        match e {
            QuoteError::Validation(msg) => AdmissionError::Validation(msg),
            QuoteError::ResourceNotFound(id) => AdmissionError::ResourceNotFound(id),
            QuoteError::ResourceInactive(id) => {
                AdmissionError::Validation(format!("Resource is not active: {}", id))
            }
            QuoteError::Infrastructure(msg) => AdmissionError::Infrastructure(msg),
        }
    }
}

impl From<AvailabilityError> for AdmissionError {
    fn from(e: AvailabilityError) -> Self {
        match e {
            AvailabilityError::ResourceNotFound(id) => AdmissionError::ResourceNotFound(id),
            AvailabilityError::Infrastructure(msg) => AdmissionError::Infrastructure(msg),
        }
    }
}

/// The transactional gate: re-validates availability and schedule at the
/// instant of commit, then writes the ledger. Concurrent admissions
/// against the same resource are serialized by per-resource mutexes;
/// payment verification happens strictly outside that critical section.
pub struct AdmissionService {
    catalog: Arc<dyn CatalogRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    ledger: Arc<dyn LedgerRepository>,
    quotes: Arc<QuoteEngine>,
    payments: Arc<dyn PaymentAdapter>,
    availability: AvailabilityCalculator,
    locks: StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    hold_ttl: Duration,
}

impl AdmissionService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        schedules: Arc<dyn ScheduleRepository>,
        ledger: Arc<dyn LedgerRepository>,
        quotes: Arc<QuoteEngine>,
        payments: Arc<dyn PaymentAdapter>,
        hold_ttl_seconds: u64,
    ) -> Self {
        let availability = AvailabilityCalculator::new(catalog.clone(), ledger.clone());
        Self {
            catalog,
            schedules,
            ledger,
            quotes,
            payments,
            availability,
            locks: StdMutex::new(HashMap::new()),
            hold_ttl: Duration::seconds(hold_ttl_seconds as i64),
        }
    }

    pub fn availability(&self) -> &AvailabilityCalculator {
        &self.availability
    }

    /// Validate, price, verify payment, then commit a confirmed
    /// reservation. Returns the written reservation or a typed failure
    /// naming the concrete numbers involved.
    #[allow(clippy::too_many_arguments)]
    pub async fn admit(
        &self,
        cart: &Cart,
        start: DateTime<Utc>,
        mode: BookingMode,
        customer_id: String,
        seller_id: Option<String>,
        coupon_code: Option<&str>,
        payment: &PaymentProof,
    ) -> Result<Reservation, AdmissionError> {
        let quote = self
            .quotes
            .quote(cart, start, mode, Some(customer_id.clone()), coupon_code)
            .await?;

        // Payment is verified before any lock is taken; the critical
        // section below never awaits the payment collaborator.
        self.verify_payment(payment, quote.payment.due_now_cents)
            .await?;

        let (location_id, line_items) = self.build_line_items(cart, start).await?;

        let _guards = self.acquire_locks(&line_items).await;

        self.check_schedule(location_id, &line_items, mode).await?;
        self.check_availability(&line_items, None).await?;

        let mut reservation = Reservation::new(
            customer_id,
            seller_id,
            location_id,
            line_items,
            MonetaryTotals::from_quote(&quote),
            mode,
            ReservationStatus::Confirmed,
        );
        reservation.apply_payment(payment.amount_cents.min(quote.final_total_cents));

        self.ledger
            .create(&reservation)
            .await
            .map_err(|e| AdmissionError::Infrastructure(e.to_string()))?;

        tracing::info!(
            reservation_id = %reservation.id,
            final_cents = reservation.totals.final_cents,
            pending = reservation.is_pending(),
            "Reservation admitted"
        );
        Ok(reservation)
    }

    /// Reserve capacity without payment. The hold occupies units for a
    /// bounded TTL so a second customer cannot oversell mid-checkout.
    pub async fn place_hold(
        &self,
        cart: &Cart,
        start: DateTime<Utc>,
        mode: BookingMode,
        customer_id: String,
        seller_id: Option<String>,
        coupon_code: Option<&str>,
    ) -> Result<Reservation, AdmissionError> {
        let quote = self
            .quotes
            .quote(cart, start, mode, Some(customer_id.clone()), coupon_code)
            .await?;

        let (location_id, line_items) = self.build_line_items(cart, start).await?;

        let _guards = self.acquire_locks(&line_items).await;

        self.check_schedule(location_id, &line_items, mode).await?;
        self.check_availability(&line_items, None).await?;

        let mut reservation = Reservation::new(
            customer_id,
            seller_id,
            location_id,
            line_items,
            MonetaryTotals::from_quote(&quote),
            mode,
            ReservationStatus::Held,
        );
        reservation.hold_expires_at = Some(Utc::now() + self.hold_ttl);

        self.ledger
            .create(&reservation)
            .await
            .map_err(|e| AdmissionError::Infrastructure(e.to_string()))?;

        tracing::info!(reservation_id = %reservation.id, expires_at = ?reservation.hold_expires_at, "Hold placed");
        Ok(reservation)
    }

    /// Promote a hold to a confirmed reservation once payment is in.
    /// Availability is re-checked (ignoring the hold's own occupancy)
    /// rather than trusting the state at hold time.
    pub async fn confirm_hold(
        &self,
        reservation_id: Uuid,
        payment: &PaymentProof,
    ) -> Result<Reservation, AdmissionError> {
        let reservation = self
            .ledger
            .get(reservation_id)
            .await
            .map_err(|e| AdmissionError::Infrastructure(e.to_string()))?
            .ok_or(AdmissionError::ReservationNotFound(reservation_id))?;

        if reservation.status != ReservationStatus::Held {
            return Err(AdmissionError::InvalidTransition {
                from: format!("{:?}", reservation.status),
                to: "CONFIRMED".to_string(),
            });
        }

        let required = PaymentSchedule::for_mode(reservation.mode, reservation.totals.final_cents)
            .due_now_cents;
        self.verify_payment(payment, required).await?;

        let _guards = self.acquire_locks(&reservation.line_items).await;

        // Re-read inside the critical section: the sweep or a cancel may
        // have raced us.
        let mut reservation = self
            .ledger
            .get(reservation_id)
            .await
            .map_err(|e| AdmissionError::Infrastructure(e.to_string()))?
            .ok_or(AdmissionError::ReservationNotFound(reservation_id))?;

        if reservation.status != ReservationStatus::Held {
            return Err(AdmissionError::InvalidTransition {
                from: format!("{:?}", reservation.status),
                to: "CONFIRMED".to_string(),
            });
        }
        if reservation.is_hold_expired(Utc::now()) {
            return Err(AdmissionError::HoldExpired(reservation_id));
        }

        self.check_schedule(reservation.location_id, &reservation.line_items, reservation.mode)
            .await?;
        self.check_availability(&reservation.line_items, Some(reservation_id))
            .await?;

        reservation.update_status(ReservationStatus::Confirmed);
        reservation.hold_expires_at = None;
        reservation.apply_payment(payment.amount_cents.min(reservation.totals.final_cents));

        // Conditional on the row still being Held: the expiry sweep does
        // not take the admission locks, so its cancel may land between
        // our re-read and this write.
        let applied = self
            .ledger
            .save_if_status(&reservation, ReservationStatus::Held)
            .await
            .map_err(|e| AdmissionError::Infrastructure(e.to_string()))?;
        if !applied {
            let current = self
                .ledger
                .get(reservation_id)
                .await
                .map_err(|e| AdmissionError::Infrastructure(e.to_string()))?
                .ok_or(AdmissionError::ReservationNotFound(reservation_id))?;
            return Err(AdmissionError::InvalidTransition {
                from: format!("{:?}", current.status),
                to: "CONFIRMED".to_string(),
            });
        }

        tracing::info!(reservation_id = %reservation.id, pending = reservation.is_pending(), "Hold confirmed");
        Ok(reservation)
    }

    async fn verify_payment(
        &self,
        payment: &PaymentProof,
        required_cents: i64,
    ) -> Result<(), AdmissionError> {
        let verified = self
            .payments
            .verify(payment)
            .await
            .map_err(|e| AdmissionError::Infrastructure(e.to_string()))?;
        if !verified {
            return Err(AdmissionError::PaymentUnverified);
        }
        if payment.amount_cents < required_cents {
            return Err(AdmissionError::PaymentInsufficient {
                required_cents,
                captured_cents: payment.amount_cents,
            });
        }
        Ok(())
    }

    /// Resolve cart lines against the catalog, capturing rates and
    /// categories. All lines must belong to one location.
    async fn build_line_items(
        &self,
        cart: &Cart,
        start: DateTime<Utc>,
    ) -> Result<(Uuid, Vec<ReservationLineItem>), AdmissionError> {
        let mut location_id: Option<Uuid> = None;
        let mut line_items = Vec::with_capacity(cart.lines.len());

        for line in &cart.lines {
            let resource = self
                .catalog
                .get_resource(line.resource_id)
                .await
                .map_err(|e| AdmissionError::Infrastructure(e.to_string()))?
                .ok_or(AdmissionError::ResourceNotFound(line.resource_id))?;

            match location_id {
                None => location_id = Some(resource.location_id),
                Some(existing) if existing != resource.location_id => {
                    return Err(AdmissionError::Validation(
                        "All cart lines must belong to the same location".to_string(),
                    ));
                }
                _ => {}
            }

            line_items.push(ReservationLineItem {
                resource_id: resource.id,
                category: resource.category,
                quantity: line.quantity,
                window: TimeWindow::from_hours(start, line.hours),
                unit_rate_cents: resource.hourly_rate_cents,
            });
        }

        let location_id = location_id
            .ok_or_else(|| AdmissionError::Validation("Cart has no lines".to_string()))?;
        Ok((location_id, line_items))
    }

    /// Acquire per-resource mutexes in sorted-id order so multi-resource
    /// carts cannot deadlock against each other.
    async fn acquire_locks(&self, line_items: &[ReservationLineItem]) -> Vec<OwnedMutexGuard<()>> {
        let mut ids: Vec<Uuid> = line_items.iter().map(|l| l.resource_id).collect();
        ids.sort();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            let lock = {
                let mut locks = self.locks.lock().expect("lock map poisoned");
                locks.entry(id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
            };
            guards.push(lock.lock_owned().await);
        }
        guards
    }

    /// Immediate rentals must fit inside the location's operating day:
    /// occupancy end plus turnaround must not pass closing time. Advance
    /// bookings are priced for a future open day and skip this gate.
    async fn check_schedule(
        &self,
        location_id: Uuid,
        line_items: &[ReservationLineItem],
        mode: BookingMode,
    ) -> Result<(), AdmissionError> {
        if mode != BookingMode::Immediate {
            return Ok(());
        }

        let schedule = match self
            .schedules
            .get_schedule(location_id)
            .await
            .map_err(|e| AdmissionError::Infrastructure(e.to_string()))?
        {
            Some(s) => s,
            // No registry row means the location is unconstrained.
            None => return Ok(()),
        };

        for line in line_items {
            let start = line.window.start;
            let (opens_at, closes_at) = match (schedule.opening_at(start), schedule.closing_at(start)) {
                (Some(o), Some(c)) => (o, c),
                _ => {
                    return Err(AdmissionError::LocationClosed {
                        location_id,
                        on: start,
                    })
                }
            };

            if start < opens_at {
                return Err(AdmissionError::BeforeOpening {
                    location_id,
                    opens_at,
                    start,
                });
            }

            let occupancy_end = line.buffered_window().end;
            if occupancy_end > closes_at {
                return Err(AdmissionError::ScheduleConflict {
                    location_id,
                    closes_at,
                    occupancy_end,
                });
            }
        }
        Ok(())
    }

    /// The commit-time re-check: minimum free units over each line's
    /// buffered window must still cover the requested quantity. Reports
    /// every short line, never a generic failure.
    async fn check_availability(
        &self,
        line_items: &[ReservationLineItem],
        exclude: Option<Uuid>,
    ) -> Result<(), AdmissionError> {
        let mut shortages = Vec::new();
        for line in line_items {
            let available = self
                .availability
                .min_free_units_excluding(line.resource_id, line.buffered_window(), exclude)
                .await?;
            if available < line.quantity {
                shortages.push(LineShortage {
                    resource_id: line.resource_id,
                    requested: line.quantity,
                    available,
                    short_by: line.quantity - available,
                });
            }
        }
        if shortages.is_empty() {
            Ok(())
        } else {
            Err(AdmissionError::InsufficientStock { shortages })
        }
    }
}

