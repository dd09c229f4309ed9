use crate::database::error::DatabaseError;
use crate::database::repository::{OrderHistoryRepository, OrderStatusRecord};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

/// Order status history backed by `orders_status_history`
pub struct PgOrderHistoryRepository {
    pool: PgPool,
}

impl PgOrderHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderHistoryRepository for PgOrderHistoryRepository {
    async fn append(&self, record: &OrderStatusRecord) -> Result<(), DatabaseError> {
        debug!(
            "Appending status {} to order {}",
            record.status_id, record.order_id
        );

        sqlx::query(
            "INSERT INTO orders_status_history (comments, orders_id, orders_status_id, customer_notified, date_added)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&record.comment)
        .bind(record.order_id)
        .bind(record.status_id)
        .bind(record.customer_notified)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e).with_context(format!("order {}", record.order_id)))?;

        Ok(())
    }
}
