//! Incident-mode permission matrix (§4.1): a global override, stored in
//! `worker_configs` under [`coord_db::INCIDENT_MODE_KEY`], that can halt
//! whole domains of work without stopping every worker process.

use coord_types::enums::{IncidentMode, WorkerDomain};

/// Whether a worker in `domain` may run a cycle while the fleet is in
/// `mode`, per §4.1's permission matrix. `degraded_gas_allowed` is the
/// optional flag carried alongside `mode` in the `incident_mode`
/// document (§3.2); it only matters in `Degraded` mode, where `gas` is
/// the single domain the matrix makes conditional rather than fixed.
pub fn domain_allowed(mode: IncidentMode, domain: WorkerDomain, degraded_gas_allowed: bool) -> bool {
    match mode {
        IncidentMode::Normal => true,
        IncidentMode::Degraded => match domain {
            WorkerDomain::Balances | WorkerDomain::DepositsListen | WorkerDomain::DepositsConfirm => true,
            WorkerDomain::Gas => degraded_gas_allowed,
            WorkerDomain::Consolidation | WorkerDomain::Withdrawals | WorkerDomain::Orchestration => false,
        },
        IncidentMode::Emergency => matches!(domain, WorkerDomain::Balances | WorkerDomain::DepositsListen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_mode_allows_everything() {
        for domain in [
            WorkerDomain::Balances,
            WorkerDomain::DepositsListen,
            WorkerDomain::DepositsConfirm,
            WorkerDomain::Gas,
            WorkerDomain::Consolidation,
            WorkerDomain::Withdrawals,
            WorkerDomain::Orchestration,
        ] {
            assert!(domain_allowed(IncidentMode::Normal, domain, false));
        }
    }

    #[test]
    fn emergency_mode_allows_only_balances_and_deposits_listen() {
        assert!(domain_allowed(IncidentMode::Emergency, WorkerDomain::Balances, true));
        assert!(domain_allowed(IncidentMode::Emergency, WorkerDomain::DepositsListen, true));
        assert!(!domain_allowed(IncidentMode::Emergency, WorkerDomain::DepositsConfirm, true));
        assert!(!domain_allowed(IncidentMode::Emergency, WorkerDomain::Gas, true));
        assert!(!domain_allowed(IncidentMode::Emergency, WorkerDomain::Withdrawals, true));
        assert!(!domain_allowed(IncidentMode::Emergency, WorkerDomain::Consolidation, true));
        assert!(!domain_allowed(IncidentMode::Emergency, WorkerDomain::Orchestration, true));
    }

    #[test]
    fn degraded_mode_keeps_deposits_alive_and_blocks_balance_mutation() {
        assert!(domain_allowed(IncidentMode::Degraded, WorkerDomain::DepositsConfirm, false));
        assert!(!domain_allowed(IncidentMode::Degraded, WorkerDomain::Withdrawals, true));
        assert!(!domain_allowed(IncidentMode::Degraded, WorkerDomain::Consolidation, true));
        assert!(!domain_allowed(IncidentMode::Degraded, WorkerDomain::Orchestration, true));
    }

    #[test]
    fn degraded_mode_gas_follows_the_explicit_flag() {
        assert!(!domain_allowed(IncidentMode::Degraded, WorkerDomain::Gas, false));
        assert!(domain_allowed(IncidentMode::Degraded, WorkerDomain::Gas, true));
    }
}
