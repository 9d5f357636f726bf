use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rental categories in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceCategory {
    Motorized,
    Aquatic,
    Beach,
    Adventure,
    Camping,
}

impl ResourceCategory {
    /// Mandatory cleaning/inspection time between the end of one occupancy
    /// and the next. Motorized units need refuelling and a mechanical check;
    /// everything else is a quick rinse-and-rack.
    pub fn turnaround_buffer(&self) -> Duration {
        match self {
            ResourceCategory::Motorized => Duration::minutes(10),
            _ => Duration::minutes(2),
        }
    }
}

/// A rentable physical resource at one location. Stock counts identical
/// interchangeable units; rates are minor currency units per hour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub location_id: Uuid,
    pub category: ResourceCategory,
    pub name: String,
    pub hourly_rate_cents: i64,
    pub stock: i32,
    pub is_active: bool,
}

impl Resource {
    pub fn new(
        location_id: Uuid,
        category: ResourceCategory,
        name: String,
        hourly_rate_cents: i64,
        stock: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            location_id,
            category,
            name,
            hourly_rate_cents,
            stock,
            is_active: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(Uuid),

    #[error("Resource is not active: {0}")]
    Inactive(Uuid),
}
