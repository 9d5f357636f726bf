use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cove_core::repository::CatalogRepository;
use cove_shared::TimeWindow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerRepository;
use crate::models::ReservationStatus;

/// An instant at which previously-occupied units become free again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseEvent {
    pub at: DateTime<Utc>,
    pub units: i32,
}

/// Derives free-unit counts from the ledger. Pure reads: scans the
/// reservations touching a resource and applies turnaround buffers,
/// no counters to keep in sync.
pub struct AvailabilityCalculator {
    catalog: Arc<dyn CatalogRepository>,
    ledger: Arc<dyn LedgerRepository>,
}

struct Occupancy {
    reservation_id: Uuid,
    window: TimeWindow,
    quantity: i32,
}

impl AvailabilityCalculator {
    pub fn new(catalog: Arc<dyn CatalogRepository>, ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { catalog, ledger }
    }

    /// Buffered occupancy intervals for a resource. Held reservations
    /// count only while their TTL has not elapsed (check-on-read, so an
    /// abandoned checkout stops blocking capacity without a sweep).
    async fn occupancies(&self, resource_id: Uuid) -> Result<Vec<Occupancy>, AvailabilityError> {
        let reservations = self
            .ledger
            .list_for_resource(resource_id)
            .await
            .map_err(|e| AvailabilityError::Infrastructure(e.to_string()))?;

        let now = Utc::now();
        let mut occupancies = Vec::new();
        for reservation in &reservations {
            let occupies = match reservation.status {
                ReservationStatus::Held => !reservation.is_hold_expired(now),
                ReservationStatus::Confirmed | ReservationStatus::InUse => true,
                ReservationStatus::Completed => true,
                ReservationStatus::Cancelled => false,
            };
            if !occupies {
                continue;
            }

            for line in &reservation.line_items {
                if line.resource_id != resource_id {
                    continue;
                }

                // A completed rental's buffer timer runs from the actual
                // return instant, not the booked end.
                let window = match (reservation.status, reservation.completed_at) {
                    (ReservationStatus::Completed, Some(returned_at)) => {
                        let end = returned_at + line.category.turnaround_buffer();
                        TimeWindow::new(line.window.start, end.max(line.window.start))
                            .unwrap_or(line.window)
                    }
                    _ => line.buffered_window(),
                };

                occupancies.push(Occupancy {
                    reservation_id: reservation.id,
                    window,
                    quantity: line.quantity,
                });
            }
        }
        Ok(occupancies)
    }

    async fn stock_of(&self, resource_id: Uuid) -> Result<i32, AvailabilityError> {
        let resource = self
            .catalog
            .get_resource(resource_id)
            .await
            .map_err(|e| AvailabilityError::Infrastructure(e.to_string()))?
            .ok_or(AvailabilityError::ResourceNotFound(resource_id))?;
        Ok(resource.stock)
    }

    /// Units free at one instant: physical stock minus quantities whose
    /// buffered interval contains the instant.
    pub async fn free_units_at(
        &self,
        resource_id: Uuid,
        instant: DateTime<Utc>,
    ) -> Result<i32, AvailabilityError> {
        let stock = self.stock_of(resource_id).await?;
        let occupied: i32 = self
            .occupancies(resource_id)
            .await?
            .iter()
            .filter(|o| o.window.contains(instant))
            .map(|o| o.quantity)
            .sum();
        Ok((stock - occupied).max(0))
    }

    /// Minimum free units over a whole window. Occupancy only changes at
    /// interval boundaries, so it suffices to evaluate at the window
    /// start and at each occupancy start inside the window.
    pub async fn min_free_units(
        &self,
        resource_id: Uuid,
        window: TimeWindow,
    ) -> Result<i32, AvailabilityError> {
        self.min_free_units_excluding(resource_id, window, None).await
    }

    /// Same as `min_free_units`, ignoring one reservation's own
    /// occupancy. Used when confirming a hold, which already reserves
    /// its units in the ledger.
    pub async fn min_free_units_excluding(
        &self,
        resource_id: Uuid,
        window: TimeWindow,
        exclude: Option<Uuid>,
    ) -> Result<i32, AvailabilityError> {
        let stock = self.stock_of(resource_id).await?;
        let occupancies: Vec<Occupancy> = self
            .occupancies(resource_id)
            .await?
            .into_iter()
            .filter(|o| Some(o.reservation_id) != exclude)
            .collect();

        let mut instants = vec![window.start];
        for o in &occupancies {
            if o.window.start > window.start && o.window.start < window.end {
                instants.push(o.window.start);
            }
        }

        let max_occupied = instants
            .iter()
            .map(|instant| {
                occupancies
                    .iter()
                    .filter(|o| o.window.contains(*instant))
                    .map(|o| o.quantity)
                    .sum::<i32>()
            })
            .max()
            .unwrap_or(0);

        Ok((stock - max_occupied).max(0))
    }

    /// Upcoming instants at which units free up, ascending, with units
    /// released at identical instants merged. Feeds the "next free at
    /// 3:10 PM" display.
    pub async fn next_release_events(
        &self,
        resource_id: Uuid,
        from: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<ReleaseEvent>, AvailabilityError> {
        // Verify the resource exists before scanning.
        self.stock_of(resource_id).await?;

        let mut by_instant: BTreeMap<DateTime<Utc>, i32> = BTreeMap::new();
        for o in self.occupancies(resource_id).await? {
            if o.window.contains(from) {
                *by_instant.entry(o.window.end).or_insert(0) += o.quantity;
            }
        }

        let mut events: Vec<ReleaseEvent> = by_instant
            .into_iter()
            .map(|(at, units)| ReleaseEvent { at, units })
            .collect();
        if let Some(limit) = limit {
            events.truncate(limit);
        }
        Ok(events)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(Uuid),

    #[error("Availability lookup failed: {0}")]
    Infrastructure(String),
}

