use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cove_booking::{HoldExpirySweeper, LedgerRepository};

/// Background loop reaping expired holds. The availability calculator
/// already ignores expired holds on read; this keeps the ledger tidy.
pub fn spawn_expiry_worker(
    ledger: Arc<dyn LedgerRepository>,
    interval_seconds: u64,
) -> tokio::task::JoinHandle<()> {
    let sweeper = HoldExpirySweeper::new(ledger);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        loop {
            ticker.tick().await;
            match sweeper.sweep(Utc::now()).await {
                Ok(0) => {}
                Ok(reaped) => tracing::info!(reaped, "Expiry sweep completed"),
                Err(e) => tracing::error!("Expiry sweep failed: {}", e),
            }
        }
    })
}
