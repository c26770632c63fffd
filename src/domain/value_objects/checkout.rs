use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::transactions::TransactionEntity;
use crate::domain::value_objects::payment_gateway::GatewayPaymentChannel;

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub course_id: i64,
    pub payment_method: String,
    pub promo_code: Option<String>,
    pub payment_channel: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionDto {
    pub id: i64,
    pub invoice_number: String,
    pub user_id: Uuid,
    pub course_id: i64,
    pub amount: i64,
    pub discount: i64,
    pub admin_fee: i64,
    pub total: i64,
    pub payment_method: String,
    pub payment_channel: Option<String>,
    pub status: String,
    pub payment_url: Option<String>,
    pub payment_instructions: Option<serde_json::Value>,
    pub expired_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionEntity> for TransactionDto {
    fn from(value: TransactionEntity) -> Self {
        Self {
            id: value.id,
            invoice_number: value.invoice_number,
            user_id: value.user_id,
            course_id: value.course_id,
            amount: value.amount,
            discount: value.discount,
            admin_fee: value.admin_fee,
            total: value.total,
            payment_method: value.payment_method,
            payment_channel: value.payment_channel,
            status: value.status,
            payment_url: value.payment_url,
            payment_instructions: value.payment_instructions,
            expired_at: value.expired_at,
            paid_at: value.paid_at,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentChannelDto {
    pub code: String,
    pub name: String,
    pub group: String,
    pub fee_customer: Option<serde_json::Value>,
    pub fee_merchant: Option<serde_json::Value>,
    pub icon_url: Option<String>,
}

impl From<GatewayPaymentChannel> for PaymentChannelDto {
    fn from(value: GatewayPaymentChannel) -> Self {
        Self {
            code: value.code,
            name: value.name,
            group: value.group,
            fee_customer: value.fee_customer,
            fee_merchant: value.fee_merchant,
            icon_url: value.icon_url,
        }
    }
}
