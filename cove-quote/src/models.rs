use cove_shared::money::split_advance;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the customer pays for a reservation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingMode {
    /// Walk-up rental: full amount collected now
    Immediate,
    /// Future-dated rental: 60% now, 40% on delivery
    Advance,
}

/// One requested resource in a candidate cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub resource_id: Uuid,
    pub quantity: i32,
    pub hours: u32,
}

/// A candidate cart, not yet admitted against the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }
}

/// Priced line: rate captured from the catalog at quoting time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLine {
    pub resource_id: Uuid,
    pub quantity: i32,
    pub hours: u32,
    pub unit_rate_cents: i64,
    pub line_base_cents: i64,
}

/// What must be collected when, derived from the booking mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentSchedule {
    pub due_now_cents: i64,
    pub due_later_cents: i64,
}

impl PaymentSchedule {
    pub fn for_mode(mode: BookingMode, final_total_cents: i64) -> Self {
        match mode {
            BookingMode::Immediate => Self {
                due_now_cents: final_total_cents,
                due_later_cents: 0,
            },
            BookingMode::Advance => {
                let (advance, balance) = split_advance(final_total_cents);
                Self {
                    due_now_cents: advance,
                    due_later_cents: balance,
                }
            }
        }
    }
}

/// Fully computed quote. All amounts in minor currency units.
/// `final_total == total_base + tax + deposit - discount` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResult {
    pub lines: Vec<QuoteLine>,
    pub total_base_cents: i64,
    pub tax_cents: i64,
    pub deposit_cents: i64,
    pub discount_cents: i64,
    pub final_total_cents: i64,
    pub payment: PaymentSchedule,
    /// Why a supplied coupon did not apply, if it did not
    pub coupon_note: Option<String>,
    /// Advisory upsell/safety strings; never affect the totals
    pub alerts: Vec<String>,
}
