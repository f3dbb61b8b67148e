use time::{Duration, OffsetDateTime};

/// Whether a stored recommendation is still usable without regeneration.
///
/// A value is fresh while its age is at most `window_days`; the boundary
/// itself counts as fresh.
pub fn is_fresh(stored_at: OffsetDateTime, now: OffsetDateTime, window_days: i64) -> bool {
	now - stored_at <= Duration::days(window_days)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn now() -> OffsetDateTime {
		OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap()
	}

	#[test]
	fn recent_value_is_fresh() {
		assert!(is_fresh(now() - Duration::days(6), now(), 7));
	}

	#[test]
	fn boundary_age_is_still_fresh() {
		assert!(is_fresh(now() - Duration::days(7), now(), 7));
	}

	#[test]
	fn older_value_is_stale() {
		assert!(!is_fresh(now() - Duration::days(8), now(), 7));
	}

	#[test]
	fn future_timestamp_is_fresh() {
		assert!(is_fresh(now() + Duration::hours(1), now(), 7));
	}
}
