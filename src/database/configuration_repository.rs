use crate::database::error::DatabaseError;
use crate::database::repository::{ConfigurationEntry, ConfigurationStore};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

/// Configuration store backed by the storefront `configuration` table
pub struct PgConfigurationRepository {
    pool: PgPool,
}

impl PgConfigurationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigurationStore for PgConfigurationRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        debug!("Reading configuration key {}", key);

        sqlx::query_scalar::<_, String>(
            "SELECT configuration_value FROM configuration WHERE configuration_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn exists(&self, key: &str) -> Result<bool, DatabaseError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM configuration WHERE configuration_key = $1)",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn install_defaults(&self, entries: &[ConfigurationEntry]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO configuration (configuration_title, configuration_key, configuration_value, configuration_description, configuration_group_id, sort_order, date_added)
                 VALUES ($1, $2, $3, $4, $5, $6, NOW())",
            )
            .bind(&entry.title)
            .bind(&entry.key)
            .bind(&entry.value)
            .bind(&entry.description)
            .bind(entry.group_id)
            .bind(entry.sort_order)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_sqlx(e).with_context(entry.key.clone()))?;
        }

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;

        info!("Installed {} configuration keys", entries.len());
        Ok(())
    }

    async fn remove_all(&self, keys: &[String]) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM configuration WHERE configuration_key = ANY($1)")
            .bind(keys)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        info!("Removed {} configuration keys", result.rows_affected());
        Ok(result.rows_affected())
    }
}
