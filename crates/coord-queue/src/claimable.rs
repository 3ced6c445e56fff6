use chrono::{DateTime, Utc};
use coord_types::enums::Priority;

/// Anything the generic claim procedure (§4.2 step 1-2) can order and
/// attempt to claim: `withdrawal_queue`, `consolidation_queue`, and
/// `gas_topup_queue` rows all implement this the same way, so the sort
/// and the conditional-claim retry loop are written once here instead
/// of three times in `coord-stages`.
pub trait Claimable {
    fn id(&self) -> i64;
    fn priority(&self) -> Priority;
    fn scheduled_at(&self) -> DateTime<Utc>;
}

/// Sorts candidates by priority rank, then by age within a priority
/// (§4.2 step 2). Stable: ties keep their original (id-ascending)
/// relative order, matching the DB query's own `ORDER BY ... , id`.
pub fn sort_candidates<T: Claimable>(candidates: &mut [T]) {
    candidates.sort_by(|a, b| {
        a.priority()
            .rank()
            .cmp(&b.priority().rank())
            .then_with(|| a.scheduled_at().cmp(&b.scheduled_at()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Job {
        id: i64,
        priority: Priority,
        scheduled_at: DateTime<Utc>,
    }

    impl Claimable for Job {
        fn id(&self) -> i64 {
            self.id
        }
        fn priority(&self) -> Priority {
            self.priority
        }
        fn scheduled_at(&self) -> DateTime<Utc> {
            self.scheduled_at
        }
    }

    #[test]
    fn high_priority_sorts_before_normal_regardless_of_age() {
        let now = Utc::now();
        let mut jobs = vec![
            Job { id: 1, priority: Priority::Normal, scheduled_at: now - chrono::Duration::hours(1) },
            Job { id: 2, priority: Priority::High, scheduled_at: now },
        ];
        sort_candidates(&mut jobs);
        assert_eq!(jobs[0].id, 2);
    }

    #[test]
    fn same_priority_sorts_oldest_first() {
        let now = Utc::now();
        let mut jobs = vec![
            Job { id: 1, priority: Priority::Normal, scheduled_at: now },
            Job { id: 2, priority: Priority::Normal, scheduled_at: now - chrono::Duration::minutes(5) },
        ];
        sort_candidates(&mut jobs);
        assert_eq!(jobs[0].id, 2);
    }
}
