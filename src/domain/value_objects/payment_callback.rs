use serde::Deserialize;

/// Payment-status webhook body sent by the gateway. Only the fields the
/// reconciler consumes are modeled; the raw body is what gets signed.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentStatusCallback {
    pub reference: Option<String>,
    pub merchant_ref: String,
    pub status: String,
    pub total_amount: Option<i64>,
    pub paid_at: Option<i64>,
    pub note: Option<String>,
}
