//! Newtype row identifiers.
//!
//! Every table in §3 uses a plain bigserial `id`. Wrapping each in a
//! distinct newtype stops a `ChainId` from being passed where a
//! `WalletBalanceId` is expected at the call site, without adding any
//! runtime cost.

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

id_newtype!(ChainId);
id_newtype!(AssetOnChainId);
id_newtype!(AssetId);
id_newtype!(UserWalletAddressId);
id_newtype!(OperationWalletAddressId);
id_newtype!(WalletBalanceId);
id_newtype!(DepositId);
id_newtype!(WithdrawalRequestId);
id_newtype!(WithdrawalQueueId);
id_newtype!(ConsolidationQueueId);
id_newtype!(GasTopupQueueId);
id_newtype!(UserId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner_value() {
        let id = ChainId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn newtypes_do_not_implicitly_coerce() {
        // This is a compile-time property, but we at least assert two
        // independently constructed ids of different newtypes can hold
        // the same raw value without conflating them at runtime.
        let chain = ChainId::new(1);
        let wallet = WalletBalanceId::new(1);
        assert_eq!(chain.get(), wallet.get());
    }
}
