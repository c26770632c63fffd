use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    entities::enrollments::{EnrollmentEntity, InsertEnrollmentEntity},
    repositories::enrollments::EnrollmentRepository,
    value_objects::enums::enrollment_statuses::EnrollmentStatus,
};

/// Grants a user access to a course exactly once. Safe to invoke repeatedly
/// and concurrently for the same (user, course) pair; the repository's
/// find-or-create converges every caller on a single row.
pub struct EnrollmentActivationUseCase {
    enrollment_repository: Arc<dyn EnrollmentRepository + Send + Sync>,
}

impl EnrollmentActivationUseCase {
    pub fn new(enrollment_repository: Arc<dyn EnrollmentRepository + Send + Sync>) -> Self {
        Self {
            enrollment_repository,
        }
    }

    pub async fn activate(&self, user_id: Uuid, course_id: i64) -> Result<EnrollmentEntity> {
        if let Some(existing) = self
            .enrollment_repository
            .find_by_user_and_course(user_id, course_id)
            .await?
        {
            debug!(
                %user_id,
                course_id,
                enrollment_id = existing.id,
                "enrollment_activation: enrollment already exists"
            );
            return Ok(existing);
        }

        let enrollment = self
            .enrollment_repository
            .find_or_create(InsertEnrollmentEntity {
                user_id,
                course_id,
                status: EnrollmentStatus::Active.to_string(),
                enrolled_at: Utc::now(),
            })
            .await?;

        info!(
            %user_id,
            course_id,
            enrollment_id = enrollment.id,
            "enrollment_activation: enrollment activated"
        );
        Ok(enrollment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::enrollments::MockEnrollmentRepository;
    use mockall::predicate::eq;

    fn sample_enrollment(id: i64, user_id: Uuid, course_id: i64) -> EnrollmentEntity {
        EnrollmentEntity {
            id,
            user_id,
            course_id,
            status: EnrollmentStatus::Active.to_string(),
            enrolled_at: Utc::now(),
            completed_at: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn returns_existing_enrollment_without_creating_a_second_row() {
        let user_id = Uuid::new_v4();
        let course_id = 7;

        let mut enrollment_repo = MockEnrollmentRepository::new();
        let existing = sample_enrollment(42, user_id, course_id);

        enrollment_repo
            .expect_find_by_user_and_course()
            .with(eq(user_id), eq(course_id))
            .times(2)
            .returning(move |_, _| {
                let existing = existing.clone();
                Box::pin(async move { Ok(Some(existing)) })
            });

        let usecase = EnrollmentActivationUseCase::new(Arc::new(enrollment_repo));

        let first = usecase.activate(user_id, course_id).await.unwrap();
        let second = usecase.activate(user_id, course_id).await.unwrap();

        assert_eq!(first.id, 42);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn creates_active_enrollment_when_none_exists() {
        let user_id = Uuid::new_v4();
        let course_id = 7;

        let mut enrollment_repo = MockEnrollmentRepository::new();

        enrollment_repo
            .expect_find_by_user_and_course()
            .with(eq(user_id), eq(course_id))
            .returning(|_, _| Box::pin(async { Ok(None) }));

        enrollment_repo
            .expect_find_or_create()
            .withf(move |insert| {
                insert.user_id == user_id
                    && insert.course_id == course_id
                    && insert.status == EnrollmentStatus::Active.to_string()
            })
            .times(1)
            .returning(move |insert| {
                let enrollment = EnrollmentEntity {
                    id: 1,
                    user_id: insert.user_id,
                    course_id: insert.course_id,
                    status: insert.status,
                    enrolled_at: insert.enrolled_at,
                    completed_at: None,
                    expires_at: None,
                };
                Box::pin(async move { Ok(enrollment) })
            });

        let usecase = EnrollmentActivationUseCase::new(Arc::new(enrollment_repo));

        let enrollment = usecase.activate(user_id, course_id).await.unwrap();

        assert_eq!(enrollment.user_id, user_id);
        assert_eq!(enrollment.course_id, course_id);
        assert_eq!(enrollment.status, "active");
    }
}
