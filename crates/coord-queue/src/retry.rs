use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::backoff::backoff_duration;

/// What a stage should do after a retryable failure on a queue job
/// (§4.2 step 2, §4.5 step 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Go back to `pending` with `scheduled_at` pushed out by the
    /// backoff.
    RescheduleAt(DateTime<Utc>),
    /// `retry_count` has reached `max_retries`; mark the job `failed`
    /// outright.
    GiveUp,
}

/// Decides between rescheduling and giving up, given the job's current
/// `retry_count` (the count *before* this failure is recorded) and the
/// configured ceiling. §4.2's formula increments `retry_count` first and
/// only then computes `2^retry_count · base` (scenario §8.3 spells out
/// the same post-increment arithmetic: `retry_count++` then
/// `30s · 2^retry_count`), so the backoff here is keyed on `retry_count + 1`.
pub fn decide(retry_count: u32, max_retries: u32, now: DateTime<Utc>, base: Duration, cap: Duration) -> RetryDecision {
    if retry_count >= max_retries {
        return RetryDecision::GiveUp;
    }
    let delay = backoff_duration(retry_count + 1, base, cap);
    let delay = chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::seconds(cap.as_secs() as i64));
    RetryDecision::RescheduleAt(now + delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gives_up_once_retry_count_reaches_max() {
        let now = Utc::now();
        let d = decide(6, 6, now, Duration::from_secs(30), Duration::from_secs(900));
        assert_eq!(d, RetryDecision::GiveUp);
    }

    #[test]
    fn first_retry_uses_post_increment_exponent() {
        // §8.3: retry_count 0 -> 1, scheduled_at = now + 30s * 2^1 = 60s.
        let now = Utc::now();
        let d = decide(0, 6, now, Duration::from_secs(30), Duration::from_secs(900));
        match d {
            RetryDecision::RescheduleAt(at) => assert_eq!(at, now + chrono::Duration::seconds(60)),
            RetryDecision::GiveUp => panic!("expected reschedule"),
        }
    }
}
