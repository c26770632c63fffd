use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::courses::CourseEntity;

#[async_trait]
#[automock]
pub trait CourseRepository {
    async fn find_published_by_id(&self, course_id: i64) -> Result<Option<CourseEntity>>;
}
