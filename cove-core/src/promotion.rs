use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cove_catalog::ResourceCategory;
use serde::{Deserialize, Serialize};

/// Cart facts a promotion rule may discriminate on. The quote engine
/// builds this from the priced cart; the resolver never sees the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponContext {
    pub customer_id: Option<String>,
    pub total_base_cents: i64,
    pub categories: Vec<ResourceCategory>,
    pub start: DateTime<Utc>,
}

/// Outcome of coupon resolution. Ineligibility is data, not an error:
/// the quote proceeds with zero discount and carries the reason through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponOutcome {
    Discount(i64),
    Ineligible(String),
}

#[async_trait]
pub trait CouponResolver: Send + Sync {
    async fn resolve_coupon(
        &self,
        code: &str,
        context: &CouponContext,
    ) -> Result<CouponOutcome, Box<dyn std::error::Error + Send + Sync>>;
}
