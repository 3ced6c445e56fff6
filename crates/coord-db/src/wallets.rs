use chrono::Utc;

use crate::{
    error::DbError,
    rows::{OperationWalletAddressRow, UserWalletAddressRow},
    Db,
};

impl Db {
    pub async fn get_user_wallet_address(&self, id: i64) -> Result<UserWalletAddressRow, DbError> {
        sqlx::query_as::<_, UserWalletAddressRow>(
            "SELECT id, uid, chain_id, address, wallet_group_id, derivation_index, is_active
             FROM user_wallet_addresses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound { what: "user_wallet_addresses" })
    }

    pub async fn find_user_wallet_by_address(
        &self,
        chain_id: i64,
        address: &str,
    ) -> Result<Option<UserWalletAddressRow>, DbError> {
        let row = sqlx::query_as::<_, UserWalletAddressRow>(
            "SELECT id, uid, chain_id, address, wallet_group_id, derivation_index, is_active
             FROM user_wallet_addresses WHERE chain_id = $1 AND address = $2",
        )
        .bind(chain_id)
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_operation_wallet_address(
        &self,
        id: i64,
    ) -> Result<OperationWalletAddressRow, DbError> {
        sqlx::query_as::<_, OperationWalletAddressRow>(
            "SELECT id, chain_id, address, role, wallet_group_id, derivation_index, is_active,
                    last_used_at
             FROM operation_wallet_addresses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound { what: "operation_wallet_addresses" })
    }

    /// Picks the next hot wallet to fund an outgoing transfer on `chain_id`
    /// by least-recently-used rotation (§4.7 step 2) and immediately stamps
    /// `last_used_at` so the next caller in the same cycle rotates past it.
    pub async fn pick_and_touch_hot_wallet(
        &self,
        chain_id: i64,
    ) -> Result<Option<OperationWalletAddressRow>, DbError> {
        let mut tx = self.pool.begin().await?;
        let picked = sqlx::query_as::<_, OperationWalletAddressRow>(
            "SELECT id, chain_id, address, role, wallet_group_id, derivation_index, is_active,
                    last_used_at
             FROM operation_wallet_addresses
             WHERE chain_id = $1 AND role = 'hot' AND is_active
             ORDER BY last_used_at ASC NULLS FIRST
             LIMIT 1
             FOR UPDATE SKIP LOCKED",
        )
        .bind(chain_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(wallet) = picked else {
            tx.commit().await?;
            return Ok(None);
        };

        sqlx::query("UPDATE operation_wallet_addresses SET last_used_at = $2 WHERE id = $1")
            .bind(wallet.id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(wallet))
    }
}
