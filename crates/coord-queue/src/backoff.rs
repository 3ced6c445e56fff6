use std::time::Duration;

/// Exponential backoff with a hard cap (§4.2 step 2): `base * 2^attempt`,
/// never exceeding `cap`. `attempt` is the retry count *before* this
/// attempt, so the first retry after an initial failure uses `base`
/// itself.
pub fn backoff_duration(attempt: u32, base: Duration, cap: Duration) -> Duration {
    let shift = attempt.min(32);
    match base.checked_mul(1u32.checked_shl(shift).unwrap_or(u32::MAX)) {
        Some(d) => d.min(cap),
        None => cap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_retry_uses_base() {
        let d = backoff_duration(0, Duration::from_secs(30), Duration::from_secs(900));
        assert_eq!(d, Duration::from_secs(30));
    }

    #[test]
    fn doubles_each_attempt() {
        let base = Duration::from_secs(30);
        let cap = Duration::from_secs(900);
        assert_eq!(backoff_duration(1, base, cap), Duration::from_secs(60));
        assert_eq!(backoff_duration(2, base, cap), Duration::from_secs(120));
        assert_eq!(backoff_duration(3, base, cap), Duration::from_secs(240));
    }

    #[test]
    fn never_exceeds_cap() {
        let base = Duration::from_secs(30);
        let cap = Duration::from_secs(900);
        assert_eq!(backoff_duration(10, base, cap), cap);
        assert_eq!(backoff_duration(31, base, cap), cap);
    }
}
