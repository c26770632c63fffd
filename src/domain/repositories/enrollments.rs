use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::enrollments::{EnrollmentEntity, InsertEnrollmentEntity};

#[async_trait]
#[automock]
pub trait EnrollmentRepository {
    async fn find_by_user_and_course(
        &self,
        user_id: Uuid,
        course_id: i64,
    ) -> Result<Option<EnrollmentEntity>>;

    /// Race-safe find-or-create keyed by (user, course); concurrent callers
    /// must converge on a single row.
    async fn find_or_create(
        &self,
        insert_enrollment_entity: InsertEnrollmentEntity,
    ) -> Result<EnrollmentEntity>;
}
