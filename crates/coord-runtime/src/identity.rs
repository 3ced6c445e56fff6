use coord_types::enums::WorkerType;

/// A worker process's identity for the lifetime of that process (§6.6):
/// `worker_id = "<worker_type>_<pid>"`. Never persisted or reused across
/// restarts — a new pid means a new row in `worker_status`.
#[derive(Debug, Clone)]
pub struct WorkerIdentity {
    pub worker_type: WorkerType,
    pub chain_id: Option<i64>,
    pub pid: u32,
    pub worker_id: String,
}

impl WorkerIdentity {
    pub fn new(worker_type: WorkerType, chain_id: Option<i64>) -> Self {
        let pid = std::process::id();
        let worker_id = format!("{}_{}", worker_type.as_str(), pid);
        WorkerIdentity { worker_type, chain_id, pid, worker_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_id_follows_type_pid_convention() {
        let id = WorkerIdentity::new(WorkerType::GasTopupExecute, Some(1));
        assert_eq!(id.worker_id, format!("gas_topup_execute_{}", id.pid));
    }
}
