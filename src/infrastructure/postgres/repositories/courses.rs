use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, SelectableHelper, prelude::*};
use std::sync::Arc;

use crate::{
    domain::{entities::courses::CourseEntity, repositories::courses::CourseRepository},
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::courses},
};

pub struct CoursePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CoursePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CourseRepository for CoursePostgres {
    async fn find_published_by_id(&self, course_id: i64) -> Result<Option<CourseEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = courses::table
            .filter(courses::id.eq(course_id))
            .filter(courses::is_published.eq(true))
            .select(CourseEntity::as_select())
            .first::<CourseEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
