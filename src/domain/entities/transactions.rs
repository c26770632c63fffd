use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::transactions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = transactions)]
pub struct TransactionEntity {
    pub id: i64,
    pub invoice_number: String,
    pub user_id: Uuid,
    pub course_id: i64,
    pub amount: i64,
    pub discount: i64,
    pub admin_fee: i64,
    pub total: i64,
    pub promo_code_id: Option<i64>,
    pub payment_method: String,
    pub payment_channel: Option<String>,
    pub gateway_reference: Option<String>,
    pub merchant_ref: String,
    pub payment_url: Option<String>,
    pub payment_instructions: Option<serde_json::Value>,
    pub expired_at: Option<DateTime<Utc>>,
    pub status: String,
    pub metadata: serde_json::Value,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub struct InsertTransactionEntity {
    pub invoice_number: String,
    pub user_id: Uuid,
    pub course_id: i64,
    pub amount: i64,
    pub discount: i64,
    pub admin_fee: i64,
    pub total: i64,
    pub promo_code_id: Option<i64>,
    pub payment_method: String,
    pub payment_channel: Option<String>,
    pub merchant_ref: String,
    pub status: String,
    pub metadata: serde_json::Value,
}

/// Changeset applied after the gateway accepts a transaction.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = transactions)]
pub struct TransactionGatewayUpdateEntity {
    pub payment_channel: Option<String>,
    pub gateway_reference: Option<String>,
    pub merchant_ref: Option<String>,
    pub payment_url: Option<String>,
    pub payment_instructions: Option<serde_json::Value>,
    pub expired_at: Option<DateTime<Utc>>,
    pub total: Option<i64>,
    pub admin_fee: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}
