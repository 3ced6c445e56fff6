use crate::{error::DbError, rows::ChainRow, Db};

impl Db {
    pub async fn get_chain(&self, chain_id: i64) -> Result<ChainRow, DbError> {
        sqlx::query_as::<_, ChainRow>(
            "SELECT id, name, rpc_url, confirmation_threshold, block_time_seconds, is_active
             FROM chains WHERE id = $1",
        )
        .bind(chain_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound { what: "chains" })
    }

    pub async fn list_active_chains(&self) -> Result<Vec<ChainRow>, DbError> {
        let rows = sqlx::query_as::<_, ChainRow>(
            "SELECT id, name, rpc_url, confirmation_threshold, block_time_seconds, is_active
             FROM chains WHERE is_active ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
