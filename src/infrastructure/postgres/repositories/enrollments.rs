use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, SelectableHelper, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::enrollments::{EnrollmentEntity, InsertEnrollmentEntity},
        repositories::enrollments::EnrollmentRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::enrollments},
};

pub struct EnrollmentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl EnrollmentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl EnrollmentRepository for EnrollmentPostgres {
    async fn find_by_user_and_course(
        &self,
        user_id: Uuid,
        course_id: i64,
    ) -> Result<Option<EnrollmentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = enrollments::table
            .filter(enrollments::user_id.eq(user_id))
            .filter(enrollments::course_id.eq(course_id))
            .order(enrollments::enrolled_at.asc())
            .select(EnrollmentEntity::as_select())
            .first::<EnrollmentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_or_create(
        &self,
        insert_enrollment_entity: InsertEnrollmentEntity,
    ) -> Result<EnrollmentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Insert-ignore then re-read: the unique (user_id, course_id)
        // constraint makes concurrent activations converge on one row.
        insert_into(enrollments::table)
            .values(&insert_enrollment_entity)
            .on_conflict((enrollments::user_id, enrollments::course_id))
            .do_nothing()
            .execute(&mut conn)?;

        let result = enrollments::table
            .filter(enrollments::user_id.eq(insert_enrollment_entity.user_id))
            .filter(enrollments::course_id.eq(insert_enrollment_entity.course_id))
            .order(enrollments::enrolled_at.asc())
            .select(EnrollmentEntity::as_select())
            .first::<EnrollmentEntity>(&mut conn)?;

        Ok(result)
    }
}
