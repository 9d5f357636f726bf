use async_trait::async_trait;
use cove_catalog::{LocationSchedule, Resource};
use uuid::Uuid;

/// Repository trait for resource catalog access
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn get_resource(
        &self,
        id: Uuid,
    ) -> Result<Option<Resource>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_resources(
        &self,
        location_id: Uuid,
    ) -> Result<Vec<Resource>, Box<dyn std::error::Error + Send + Sync>>;

    /// Inventory management entry point; outside the booking flow.
    async fn upsert_resource(
        &self,
        resource: &Resource,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for location operating hours
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn get_schedule(
        &self,
        location_id: Uuid,
    ) -> Result<Option<LocationSchedule>, Box<dyn std::error::Error + Send + Sync>>;

    async fn upsert_schedule(
        &self,
        schedule: &LocationSchedule,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
