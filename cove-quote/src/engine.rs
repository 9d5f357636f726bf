use std::sync::Arc;

use chrono::{DateTime, Utc};
use cove_catalog::Resource;
use cove_core::promotion::{CouponContext, CouponOutcome, CouponResolver};
use cove_core::repository::CatalogRepository;
use cove_shared::money::apply_rate;
use uuid::Uuid;

use crate::alerts::advisory_alerts;
use crate::models::{BookingMode, Cart, PaymentSchedule, QuoteLine, QuoteResult};

/// Fixed pricing rates, loaded from configuration at startup.
#[derive(Debug, Clone, Copy)]
pub struct PricingRates {
    /// e.g. 0.18
    pub tax_rate: f64,
    /// Refundable deposit, e.g. 0.20. Added to the amount collected.
    pub deposit_rate: f64,
}

/// Computes base/tax/deposit/discount totals for a candidate cart.
/// Quoting only reads; it takes no locks and may run arbitrarily
/// concurrently with admissions.
pub struct QuoteEngine {
    catalog: Arc<dyn CatalogRepository>,
    coupons: Arc<dyn CouponResolver>,
    rates: PricingRates,
}

impl QuoteEngine {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        coupons: Arc<dyn CouponResolver>,
        rates: PricingRates,
    ) -> Self {
        Self {
            catalog,
            coupons,
            rates,
        }
    }

    pub async fn quote(
        &self,
        cart: &Cart,
        start: DateTime<Utc>,
        mode: BookingMode,
        customer_id: Option<String>,
        coupon_code: Option<&str>,
    ) -> Result<QuoteResult, QuoteError> {
        // Malformed carts are rejected before any catalog lookup.
        if cart.lines.is_empty() {
            return Err(QuoteError::Validation("Cart has no lines".to_string()));
        }
        for line in &cart.lines {
            if line.quantity < 1 {
                return Err(QuoteError::Validation(format!(
                    "Quantity must be at least 1, got {} for resource {}",
                    line.quantity, line.resource_id
                )));
            }
            if line.hours < 1 {
                return Err(QuoteError::Validation(format!(
                    "Duration must be at least 1 hour for resource {}",
                    line.resource_id
                )));
            }
        }

        let mut priced = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let resource = self
                .catalog
                .get_resource(line.resource_id)
                .await
                .map_err(|e| QuoteError::Infrastructure(e.to_string()))?
                .ok_or(QuoteError::ResourceNotFound(line.resource_id))?;

            if !resource.is_active {
                return Err(QuoteError::ResourceInactive(line.resource_id));
            }

            priced.push((line.clone(), resource));
        }

        let lines: Vec<QuoteLine> = priced
            .iter()
            .map(|(line, resource)| QuoteLine {
                resource_id: resource.id,
                quantity: line.quantity,
                hours: line.hours,
                unit_rate_cents: resource.hourly_rate_cents,
                line_base_cents: resource.hourly_rate_cents
                    * line.hours as i64
                    * line.quantity as i64,
            })
            .collect();

        let total_base_cents: i64 = lines.iter().map(|l| l.line_base_cents).sum();
        let tax_cents = apply_rate(total_base_cents, self.rates.tax_rate);
        let deposit_cents = apply_rate(total_base_cents, self.rates.deposit_rate);

        let (discount_cents, coupon_note) = match coupon_code {
            None => (0, None),
            Some(code) => {
                let context = CouponContext {
                    customer_id: customer_id.clone(),
                    total_base_cents,
                    categories: priced.iter().map(|(_, r)| r.category).collect(),
                    start,
                };
                match self.coupons.resolve_coupon(code, &context).await {
                    Ok(CouponOutcome::Discount(d)) => (d.min(total_base_cents), None),
                    Ok(CouponOutcome::Ineligible(reason)) => (0, Some(reason)),
                    Err(e) => {
                        // Coupon problems never block a quote.
                        tracing::warn!("Coupon resolution failed: {}", e);
                        (0, Some("Coupon could not be verified".to_string()))
                    }
                }
            }
        };

        let final_total_cents = total_base_cents + tax_cents + deposit_cents - discount_cents;

        Ok(QuoteResult {
            alerts: advisory_alerts(&priced),
            lines,
            total_base_cents,
            tax_cents,
            deposit_cents,
            discount_cents,
            final_total_cents,
            payment: PaymentSchedule::for_mode(mode, final_total_cents),
            coupon_note,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Invalid cart: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(Uuid),

    #[error("Resource is not active: {0}")]
    ResourceInactive(Uuid),

    #[error("Quote failed: {0}")]
    Infrastructure(String),
}
