use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cove_catalog::ResourceCategory;
use cove_core::promotion::{CouponContext, CouponOutcome, CouponResolver};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CouponKind {
    /// Fraction of the cart base (0.15 = 15% off)
    Percent(f64),
    /// Flat amount in minor units
    Fixed(i64),
}

/// One promotion rule. The rule catalog is configuration data; nothing
/// in the engine assumes a particular set of codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponRule {
    pub id: Uuid,
    pub code: String,
    pub kind: CouponKind,
    /// None = any category qualifies
    pub eligible_categories: Option<Vec<ResourceCategory>>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub min_total_cents: Option<i64>,
    pub is_active: bool,
}

/// In-process promotion rule source. Resolution never fails a quote:
/// every miss is an Ineligible outcome with a human-readable reason.
pub struct CouponBook {
    rules: Vec<CouponRule>,
}

impl CouponBook {
    pub fn new(rules: Vec<CouponRule>) -> Self {
        Self { rules }
    }

    pub fn evaluate(&self, code: &str, context: &CouponContext) -> CouponOutcome {
        let rule = match self
            .rules
            .iter()
            .find(|r| r.code.eq_ignore_ascii_case(code))
        {
            Some(r) => r,
            None => return CouponOutcome::Ineligible(format!("Unknown coupon code '{}'", code)),
        };

        if !rule.is_active {
            return CouponOutcome::Ineligible(format!("Coupon '{}' is no longer active", rule.code));
        }

        // Date eligibility is judged against the rental start, not the
        // instant of quoting.
        if let Some(from) = rule.valid_from {
            if context.start < from {
                return CouponOutcome::Ineligible(format!(
                    "Coupon '{}' is not valid before {}",
                    rule.code, from
                ));
            }
        }
        if let Some(until) = rule.valid_until {
            if context.start >= until {
                return CouponOutcome::Ineligible(format!("Coupon '{}' has expired", rule.code));
            }
        }

        if let Some(min) = rule.min_total_cents {
            if context.total_base_cents < min {
                return CouponOutcome::Ineligible(format!(
                    "Coupon '{}' requires a cart of at least {} cents, got {}",
                    rule.code, min, context.total_base_cents
                ));
            }
        }

        if let Some(categories) = &rule.eligible_categories {
            if !context.categories.iter().any(|c| categories.contains(c)) {
                return CouponOutcome::Ineligible(format!(
                    "Coupon '{}' does not apply to any item in this cart",
                    rule.code
                ));
            }
        }

        let discount = match &rule.kind {
            CouponKind::Percent(fraction) => {
                (context.total_base_cents as f64 * fraction).round() as i64
            }
            CouponKind::Fixed(amount) => *amount,
        };

        CouponOutcome::Discount(discount.max(0))
    }
}

#[async_trait]
impl CouponResolver for CouponBook {
    async fn resolve_coupon(
        &self,
        code: &str,
        context: &CouponContext,
    ) -> Result<CouponOutcome, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.evaluate(code, context))
    }
}

pub fn default_coupons() -> Vec<CouponRule> {
    vec![
        CouponRule {
            id: Uuid::new_v4(),
            code: "SUMMER10".to_string(),
            kind: CouponKind::Percent(0.10),
            eligible_categories: None,
            valid_from: None,
            valid_until: None,
            min_total_cents: None,
            is_active: true,
        },
        CouponRule {
            id: Uuid::new_v4(),
            code: "GROUP15".to_string(),
            kind: CouponKind::Percent(0.15),
            eligible_categories: None,
            valid_from: None,
            valid_until: None,
            min_total_cents: Some(20000),
            is_active: true,
        },
        CouponRule {
            id: Uuid::new_v4(),
            code: "PADDLE5".to_string(),
            kind: CouponKind::Fixed(500),
            eligible_categories: Some(vec![ResourceCategory::Aquatic]),
            valid_from: None,
            valid_until: None,
            min_total_cents: None,
            is_active: true,
        },
    ]
}
