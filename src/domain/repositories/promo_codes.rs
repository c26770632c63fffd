use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::promo_codes::PromoCodeEntity;

#[async_trait]
#[automock]
pub trait PromoCodeRepository {
    /// Exact-match lookup; callers pass the uppercase-normalized code.
    async fn find_active_by_code(&self, code: String) -> Result<Option<PromoCodeEntity>>;
}
