use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infrastructure::postgres::schema::promo_codes;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = promo_codes)]
pub struct PromoCodeEntity {
    pub id: i64,
    pub code: String,
    pub discount: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
