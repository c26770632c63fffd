use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, SelectableHelper, prelude::*};
use std::sync::Arc;

use crate::{
    domain::{
        entities::promo_codes::PromoCodeEntity,
        repositories::promo_codes::PromoCodeRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::promo_codes},
};

pub struct PromoCodePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PromoCodePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PromoCodeRepository for PromoCodePostgres {
    async fn find_active_by_code(&self, code: String) -> Result<Option<PromoCodeEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = promo_codes::table
            .filter(promo_codes::code.eq(code))
            .filter(promo_codes::is_active.eq(true))
            .select(PromoCodeEntity::as_select())
            .first::<PromoCodeEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
