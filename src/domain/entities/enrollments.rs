use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::enrollments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = enrollments)]
pub struct EnrollmentEntity {
    pub id: i64,
    pub user_id: Uuid,
    pub course_id: i64,
    pub status: String,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = enrollments)]
pub struct InsertEnrollmentEntity {
    pub user_id: Uuid,
    pub course_id: i64,
    pub status: String,
    pub enrolled_at: DateTime<Utc>,
}
