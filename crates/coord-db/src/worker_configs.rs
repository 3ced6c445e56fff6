use serde_json::Value;

use crate::{error::DbError, Db};

/// Key under which the incident-mode document (§4.1, §3.2) is stored in
/// `worker_configs`.
pub const INCIDENT_MODE_KEY: &str = "incident_mode";

impl Db {
    pub async fn get_worker_config(&self, key: &str) -> Result<Option<Value>, DbError> {
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT value FROM worker_configs WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(v,)| v))
    }

    pub async fn set_worker_config(&self, key: &str, value: Value) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO worker_configs (key, value) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = $2",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
