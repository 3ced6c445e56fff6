//! Shared signer-dispatch path for the three execute stages (§4.5 steps
//! 5-9). Building the `TxIntent` is stage-specific; the EVM gas-price
//! ceiling check, per-funder nonce serialization, and the bounded
//! `replacement underpriced` bump-and-retry loop are identical across
//! withdrawal, consolidation, and gas top-up execution.

use std::sync::Arc;

use coord_chain_rpc::ChainRpcClient;
use coord_config::Config;
use coord_signer_client::{SignResponse, SignerClient};
use coord_types::{ChainKind, ClassifiedError, ErrorKind, TxIntent};

use crate::nonce::NonceGuard;

/// Bound on the "bump gas price and re-sign" loop (§4.5 step 6: "bounded
/// recursion").
const MAX_GAS_BUMP_ATTEMPTS: u32 = 3;

/// Runs the EVM pre-flight (when applicable), then signs and broadcasts
/// `intent` under the per-funder nonce lock.
pub(crate) async fn dispatch(
    config: &Config,
    rpc: &Arc<dyn ChainRpcClient>,
    signer: &SignerClient,
    nonce_guard: &NonceGuard,
    chain_name: &str,
    wallet_group_id: &str,
    derivation_index: i64,
    mut intent: TxIntent,
) -> Result<SignResponse, ClassifiedError> {
    if config.chain_kind == ChainKind::Evm {
        let gas_price = rpc.current_gas_price().await.map_err(|e| e.into_classified())?;
        if gas_price > config.max_gas_price_gwei {
            return Err(ClassifiedError::new(
                ErrorKind::GasSpike,
                format!("current gas price {gas_price} gwei exceeds ceiling {} gwei", config.max_gas_price_gwei),
            ));
        }
        set_gas_price(&mut intent, Some(gas_price));
    }

    let from = intent.from_address().to_string();
    nonce_guard
        .with_lock(&from, || {
            broadcast_with_bump(config, signer, chain_name, wallet_group_id, derivation_index, intent)
        })
        .await
}

fn set_gas_price(intent: &mut TxIntent, gwei: Option<u64>) {
    match intent {
        TxIntent::NativeTransfer { gas_price_gwei, .. } | TxIntent::Erc20Transfer { gas_price_gwei, .. } => {
            *gas_price_gwei = gwei;
        }
        _ => {}
    }
}

fn gas_price(intent: &TxIntent) -> Option<u64> {
    match intent {
        TxIntent::NativeTransfer { gas_price_gwei, .. } | TxIntent::Erc20Transfer { gas_price_gwei, .. } => {
            *gas_price_gwei
        }
        _ => None,
    }
}

fn is_replacement_underpriced(err: &ClassifiedError) -> bool {
    err.message.to_lowercase().contains("replacement underpriced")
}

fn bump_gas_price(current: u64, bump_percent: u64, ceiling: u64) -> u64 {
    let bumped = current + current.saturating_mul(bump_percent) / 100;
    bumped.max(current + 1).min(ceiling)
}

async fn broadcast_with_bump(
    config: &Config,
    signer: &SignerClient,
    chain_name: &str,
    wallet_group_id: &str,
    derivation_index: i64,
    mut intent: TxIntent,
) -> Result<SignResponse, ClassifiedError> {
    for attempt in 0..MAX_GAS_BUMP_ATTEMPTS {
        match signer.sign_and_broadcast(chain_name, wallet_group_id, derivation_index, &intent).await {
            Ok(resp) => return Ok(resp),
            Err(e) if is_replacement_underpriced(&e) && attempt + 1 < MAX_GAS_BUMP_ATTEMPTS => {
                let current = gas_price(&intent).unwrap_or(config.max_gas_price_gwei);
                let bumped = bump_gas_price(current, config.gas_bump_percent, config.max_gas_price_gwei);
                if bumped == current {
                    // Already pinned at the ceiling; no higher bid to offer.
                    return Err(e);
                }
                set_gas_price(&mut intent, Some(bumped));
            }
            Err(e) => return Err(e),
        }
    }
    unreachable!("loop always returns on its last iteration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_never_exceeds_ceiling() {
        assert_eq!(bump_gas_price(18, 15, 20), 20);
        assert_eq!(bump_gas_price(10, 15, 20), 11);
        assert_eq!(bump_gas_price(20, 15, 20), 20);
    }

    #[test]
    fn detects_replacement_underpriced_case_insensitively() {
        let err = ClassifiedError::new(ErrorKind::SigningFailed, "Replacement Underpriced: try again");
        assert!(is_replacement_underpriced(&err));
        let other = ClassifiedError::new(ErrorKind::SigningFailed, "vault unreachable");
        assert!(!is_replacement_underpriced(&other));
    }
}
