use std::net::SocketAddr;
use std::sync::Arc;

use cove_api::{app, state::AppState, worker::spawn_expiry_worker};
use cove_booking::{AdmissionService, LedgerRepository, LifecycleService};
use cove_core::payment::AcceptingPaymentAdapter;
use cove_core::repository::{CatalogRepository, ScheduleRepository};
use cove_quote::{default_coupons, CouponBook, PricingRates, QuoteEngine};
use cove_store::{InMemoryCatalog, InMemoryLedger, InMemorySchedules};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cove_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cove_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Cove API on port {}", config.server.port);

    let catalog: Arc<dyn CatalogRepository> = Arc::new(InMemoryCatalog::new());
    let schedules: Arc<dyn ScheduleRepository> = Arc::new(InMemorySchedules::new());
    let ledger: Arc<dyn LedgerRepository> = Arc::new(InMemoryLedger::new());
    let payments = Arc::new(AcceptingPaymentAdapter);

    let quotes = Arc::new(QuoteEngine::new(
        catalog.clone(),
        Arc::new(CouponBook::new(default_coupons())),
        PricingRates {
            tax_rate: config.business_rules.tax_rate,
            deposit_rate: config.business_rules.deposit_rate,
        },
    ));

    let admission = Arc::new(AdmissionService::new(
        catalog.clone(),
        schedules.clone(),
        ledger.clone(),
        quotes.clone(),
        payments.clone(),
        config.business_rules.hold_ttl_seconds,
    ));
    let lifecycle = Arc::new(LifecycleService::new(ledger.clone(), payments));

    spawn_expiry_worker(ledger.clone(), config.business_rules.expiry_sweep_seconds);

    let app_state = AppState {
        admission,
        lifecycle,
        quotes,
        ledger,
        catalog,
        schedules,
        auth: cove_api::state::AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        business_rules: config.business_rules.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
