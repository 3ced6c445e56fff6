//! Generic queue-claim protocol (C2, spec §4.2): candidate ordering,
//! conditional-claim semantics, and retry/backoff math shared by every
//! `*_queue` table. Table-specific SQL lives in `coord-db`; this crate
//! only holds the logic that is the same across `withdrawal_queue`,
//! `consolidation_queue`, and `gas_topup_queue`.

pub mod backoff;
pub mod claimable;
pub mod retry;

pub use backoff::backoff_duration;
pub use claimable::{sort_candidates, Claimable};
pub use retry::{decide, RetryDecision};
