use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, SelectableHelper, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain::{
        entities::transactions::{
            InsertTransactionEntity, TransactionEntity, TransactionGatewayUpdateEntity,
        },
        repositories::transactions::TransactionRepository,
        value_objects::enums::transaction_statuses::TransactionStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::transactions},
};

pub struct TransactionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TransactionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl TransactionRepository for TransactionPostgres {
    async fn create(
        &self,
        insert_transaction_entity: InsertTransactionEntity,
    ) -> Result<TransactionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(transactions::table)
            .values(&insert_transaction_entity)
            .returning(TransactionEntity::as_returning())
            .get_result::<TransactionEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, transaction_id: i64) -> Result<Option<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = transactions::table
            .filter(transactions::id.eq(transaction_id))
            .select(TransactionEntity::as_select())
            .first::<TransactionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_merchant_ref_or_invoice(
        &self,
        reference: String,
    ) -> Result<Option<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = transactions::table
            .filter(
                transactions::merchant_ref
                    .eq(reference.clone())
                    .or(transactions::invoice_number.eq(reference)),
            )
            .select(TransactionEntity::as_select())
            .first::<TransactionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn apply_gateway_details(
        &self,
        transaction_id: i64,
        update_entity: TransactionGatewayUpdateEntity,
    ) -> Result<TransactionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(transactions::table)
            .filter(transactions::id.eq(transaction_id))
            .set(&update_entity)
            .returning(TransactionEntity::as_returning())
            .get_result::<TransactionEntity>(&mut conn)?;

        Ok(result)
    }

    async fn transition_from_pending(
        &self,
        transaction_id: i64,
        status: TransactionStatus,
    ) -> Result<Option<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        // Guarded update: the status filter makes the transition atomic with
        // respect to concurrent callbacks for the same row.
        let result = update(transactions::table)
            .filter(transactions::id.eq(transaction_id))
            .filter(transactions::status.eq(TransactionStatus::Pending.to_string()))
            .set((
                transactions::status.eq(status.to_string()),
                transactions::paid_at
                    .eq(matches!(status, TransactionStatus::Paid).then_some(now)),
                transactions::updated_at.eq(now),
            ))
            .returning(TransactionEntity::as_returning())
            .get_result::<TransactionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete(&self, transaction_id: i64) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::delete(transactions::table.filter(transactions::id.eq(transaction_id)))
            .execute(&mut conn)?;

        Ok(())
    }
}
