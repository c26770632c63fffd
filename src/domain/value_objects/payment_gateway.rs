use serde::{Deserialize, Serialize};

/// Request shape for creating a transaction on the payment gateway.
#[derive(Debug, Clone, Serialize)]
pub struct CreateGatewayTransaction {
    pub method: String,
    pub merchant_ref: String,
    pub amount: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub order_items: Vec<GatewayOrderItem>,
    pub return_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrderItem {
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    pub product_url: Option<String>,
}

/// Raw response envelope returned by the gateway. `success == false` is a
/// business-level rejection and is handled by the caller, not an `Err`.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayTransactionEnvelope {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<GatewayTransactionData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayTransactionData {
    pub reference: Option<String>,
    pub merchant_ref: Option<String>,
    pub payment_method: Option<String>,
    pub checkout_url: Option<String>,
    pub instructions: Option<serde_json::Value>,
    pub expired_time: Option<i64>,
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPaymentChannel {
    pub code: String,
    pub name: String,
    pub group: String,
    pub active: bool,
    pub fee_customer: Option<serde_json::Value>,
    pub fee_merchant: Option<serde_json::Value>,
    pub icon_url: Option<String>,
}
