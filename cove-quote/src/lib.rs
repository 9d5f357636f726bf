pub mod alerts;
pub mod engine;
pub mod models;
pub mod rules;

pub use engine::{PricingRates, QuoteEngine, QuoteError};
pub use models::{BookingMode, Cart, CartLine, PaymentSchedule, QuoteLine, QuoteResult};
pub use rules::{default_coupons, CouponBook, CouponKind, CouponRule};
