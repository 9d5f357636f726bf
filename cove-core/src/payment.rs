use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Processing,
    Succeeded,
    Canceled,
    Failed,
}

/// Evidence of a capture performed by the external payment collaborator.
/// Admission verifies the proof; it never talks to the gateway while
/// holding a resource lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProof {
    pub reference: String, // provider's ID (e.g. pi_123)
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub captured_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Capture an amount against a reservation with the provider.
    async fn capture(
        &self,
        reservation_id: Uuid,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentProof, Box<dyn std::error::Error + Send + Sync>>;

    /// Verify that a proof is authentic and settled.
    async fn verify(
        &self,
        proof: &PaymentProof,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Trusts any proof whose status is SUCCEEDED. Stands in for the real
/// gateway adapter, which lives outside this core.
pub struct AcceptingPaymentAdapter;

#[async_trait]
impl PaymentAdapter for AcceptingPaymentAdapter {
    async fn capture(
        &self,
        reservation_id: Uuid,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentProof, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(%reservation_id, amount_cents, "Capturing payment");
        Ok(PaymentProof {
            reference: format!("pi_{}", Uuid::new_v4().simple()),
            amount_cents,
            currency: currency.to_string(),
            status: PaymentStatus::Succeeded,
            captured_at: Utc::now(),
        })
    }

    async fn verify(
        &self,
        proof: &PaymentProof,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(proof.status == PaymentStatus::Succeeded)
    }
}
