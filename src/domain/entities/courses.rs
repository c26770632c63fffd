use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infrastructure::postgres::schema::courses;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = courses)]
pub struct CourseEntity {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub price: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}
