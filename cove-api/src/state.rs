use std::sync::Arc;

use cove_booking::{AdmissionService, LedgerRepository, LifecycleService};
use cove_core::repository::{CatalogRepository, ScheduleRepository};
use cove_quote::QuoteEngine;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub admission: Arc<AdmissionService>,
    pub lifecycle: Arc<LifecycleService>,
    pub quotes: Arc<QuoteEngine>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub auth: AuthConfig,
    pub business_rules: cove_store::app_config::BusinessRules,
}
