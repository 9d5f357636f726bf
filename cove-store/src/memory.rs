use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cove_booking::{LedgerRepository, Reservation, ReservationStatus};
use cove_catalog::{LocationSchedule, Resource};
use cove_core::repository::{CatalogRepository, ScheduleRepository};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory resource catalog. The interface is the seam; a database
/// implementation slots in behind the same trait.
pub struct InMemoryCatalog {
    resources: RwLock<HashMap<Uuid, Resource>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn get_resource(
        &self,
        id: Uuid,
    ) -> Result<Option<Resource>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.resources.read().await.get(&id).cloned())
    }

    async fn list_resources(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Resource>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .resources
            .read()
            .await
            .values()
            .filter(|r| r.location_id == location_id)
            .cloned()
            .collect())
    }

    async fn upsert_resource(
        &self,
        resource: &Resource,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.resources
            .write()
            .await
            .insert(resource.id, resource.clone());
        Ok(())
    }
}

/// In-memory schedule registry, keyed by location.
pub struct InMemorySchedules {
    schedules: RwLock<HashMap<Uuid, LocationSchedule>>,
}

impl InMemorySchedules {
    pub fn new() -> Self {
        Self {
            schedules: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySchedules {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleRepository for InMemorySchedules {
    async fn get_schedule(
        &self,
        location_id: Uuid,
    ) -> Result<Option<LocationSchedule>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.schedules.read().await.get(&location_id).cloned())
    }

    async fn upsert_schedule(
        &self,
        schedule: &LocationSchedule,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.schedules
            .write()
            .await
            .insert(schedule.location_id, schedule.clone());
        Ok(())
    }
}

/// In-memory reservation ledger. Writes replace the whole row; nothing
/// is ever removed, cancelled reservations simply stop occupying.
pub struct InMemoryLedger {
    reservations: RwLock<HashMap<Uuid, Reservation>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            reservations: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedger {
    async fn create(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut reservations = self.reservations.write().await;
        if reservations.contains_key(&reservation.id) {
            return Err(format!("Reservation already exists: {}", reservation.id).into());
        }
        reservations.insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Reservation>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.reservations.read().await.get(&id).cloned())
    }

    async fn save(
        &self,
        reservation: &Reservation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut reservations = self.reservations.write().await;
        if !reservations.contains_key(&reservation.id) {
            return Err(format!("Reservation not found: {}", reservation.id).into());
        }
        reservations.insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn save_if_status(
        &self,
        reservation: &Reservation,
        expected: ReservationStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut reservations = self.reservations.write().await;
        let current = reservations
            .get(&reservation.id)
            .ok_or_else(|| format!("Reservation not found: {}", reservation.id))?;
        if current.status != expected {
            return Ok(false);
        }
        reservations.insert(reservation.id, reservation.clone());
        Ok(true)
    }

    async fn list_for_resource(
        &self,
        resource_id: Uuid,
    ) -> Result<Vec<Reservation>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .reservations
            .read()
            .await
            .values()
            .filter(|r| r.line_items.iter().any(|l| l.resource_id == resource_id))
            .cloned()
            .collect())
    }

    async fn list_expired_holds(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .reservations
            .read()
            .await
            .values()
            .filter(|r| r.is_hold_expired(now))
            .map(|r| r.id)
            .collect())
    }
}
