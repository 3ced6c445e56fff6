//! Pre-lock validation (§4.3 "Validation pre-lock"): cheap checks run
//! before attempting to acquire a lock, so an execute stage can fail a
//! job fast with a diagnostic message instead of churning through a
//! lock-contention retry for a job that can never succeed.

use coord_db::rows::WalletBalanceRow;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("wallet balance {0} is not idle")]
    NotIdle(i64),
    #[error("wallet balance {0} needs a gas top-up before it can be consolidated")]
    NeedsGas(i64),
    #[error("wallet balance {0} is not flagged for consolidation")]
    NotFlaggedForConsolidation(i64),
}

/// A consolidation job may only proceed against a wallet that is
/// `idle`, does not need gas first, and is actually flagged
/// `needs_consolidation` (§4.3).
pub fn validate_for_consolidation(row: &WalletBalanceRow) -> Result<(), ValidationError> {
    if row.processing_status != "idle" {
        return Err(ValidationError::NotIdle(row.id));
    }
    if row.needs_gas {
        return Err(ValidationError::NeedsGas(row.id));
    }
    if !row.needs_consolidation {
        return Err(ValidationError::NotFlaggedForConsolidation(row.id));
    }
    Ok(())
}

/// A gas top-up job only requires the recipient wallet to be `idle`
/// (§4.3 lists the `needs_gas`/idle checks as consolidation-specific;
/// gas top-up itself is only gated by idleness before locking).
pub fn validate_for_gas_topup(row: &WalletBalanceRow) -> Result<(), ValidationError> {
    if row.processing_status != "idle" {
        return Err(ValidationError::NotIdle(row.id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_row() -> WalletBalanceRow {
        WalletBalanceRow {
            id: 1,
            wallet_id: 1,
            asset_on_chain_id: 1,
            available_raw: "0".into(),
            needs_consolidation: true,
            needs_gas: false,
            processing_status: "idle".into(),
            consolidation_locked_until: None,
            consolidation_locked_by: None,
            gas_locked_until: None,
            gas_locked_by: None,
            last_processed_at: None,
            last_consolidation_at: None,
        }
    }

    #[test]
    fn consolidation_requires_idle_no_gas_need_and_flag_set() {
        assert!(validate_for_consolidation(&base_row()).is_ok());

        let mut needs_gas = base_row();
        needs_gas.needs_gas = true;
        assert_eq!(validate_for_consolidation(&needs_gas), Err(ValidationError::NeedsGas(1)));

        let mut not_flagged = base_row();
        not_flagged.needs_consolidation = false;
        assert_eq!(
            validate_for_consolidation(&not_flagged),
            Err(ValidationError::NotFlaggedForConsolidation(1))
        );

        let mut busy = base_row();
        busy.processing_status = "gas_topup".into();
        assert_eq!(validate_for_consolidation(&busy), Err(ValidationError::NotIdle(1)));
    }

    #[test]
    fn gas_topup_only_requires_idle() {
        let row = base_row();
        assert!(validate_for_gas_topup(&row).is_ok());

        let mut busy = base_row();
        busy.processing_status = "consolidating".into();
        assert_eq!(validate_for_gas_topup(&busy), Err(ValidationError::NotIdle(1)));
    }
}
