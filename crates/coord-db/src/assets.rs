use crate::{error::DbError, rows::AssetOnChainRow, Db};

impl Db {
    pub async fn get_asset_on_chain(&self, asset_on_chain_id: i64) -> Result<AssetOnChainRow, DbError> {
        sqlx::query_as::<_, AssetOnChainRow>(
            "SELECT id, chain_id, asset_id, contract_address, decimals, is_native, is_active
             FROM asset_on_chain WHERE id = $1",
        )
        .bind(asset_on_chain_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound { what: "asset_on_chain" })
    }

    /// Resolves `(asset_id, chain_id)` to the active `asset_on_chain` row
    /// (decision for OQ-4: prefer the explicit `asset_on_chain_id` at the
    /// call site and fall back to this lookup only when it is absent).
    pub async fn find_asset_on_chain(
        &self,
        asset_id: i64,
        chain_id: i64,
    ) -> Result<AssetOnChainRow, DbError> {
        sqlx::query_as::<_, AssetOnChainRow>(
            "SELECT id, chain_id, asset_id, contract_address, decimals, is_native, is_active
             FROM asset_on_chain WHERE asset_id = $1 AND chain_id = $2 AND is_active",
        )
        .bind(asset_id)
        .bind(chain_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound { what: "asset_on_chain" })
    }
}
