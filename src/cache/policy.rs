//! Expiry rule for the cached feed

use chrono::{DateTime, Days, Duration, Local, NaiveDateTime, Offset, TimeZone, Utc};

/// Number of calendar days a cached feed stays valid
pub const MAX_CACHE_AGE_DAYS: u64 = 7;

/// Decides whether a cached feed is still fresh enough to show
///
/// The maximum age is added as calendar days in the local time zone, so a
/// week is "same wall-clock time seven days later" even across a daylight
/// saving transition, rather than a fixed number of seconds.
#[derive(Debug, Clone, Copy)]
pub struct FeedCachePolicy;

impl FeedCachePolicy {
    /// Returns `true` if a feed cached at `timestamp` is still valid at `against`
    pub fn validate(timestamp: DateTime<Utc>, against: DateTime<Utc>) -> bool {
        Self::validate_in(&Local, timestamp, against)
    }

    /// Same as [`validate`](Self::validate), doing the calendar arithmetic in `tz`
    ///
    /// A timestamp whose expiry date falls outside the supported date range is
    /// treated as expired.
    pub fn validate_in<Tz: TimeZone>(
        tz: &Tz,
        timestamp: DateTime<Utc>,
        against: DateTime<Utc>,
    ) -> bool {
        let Some(max_cache_age) = add_calendar_days(tz, timestamp, MAX_CACHE_AGE_DAYS as i64)
        else {
            return false;
        };

        against < max_cache_age
    }
}

/// Moves `timestamp` by `days` calendar days on the wall clock of `tz`
///
/// A result that lands in a daylight saving fold takes the earlier instant.
/// One that lands in a gap is pushed forward by the length of the gap, so
/// 02:30 on a spring-forward night becomes 03:30. Returns `None` only when
/// the date itself is out of range.
pub fn add_calendar_days<Tz: TimeZone>(
    tz: &Tz,
    timestamp: DateTime<Utc>,
    days: i64,
) -> Option<DateTime<Utc>> {
    let local = timestamp.with_timezone(tz).naive_local();
    let shifted = if days >= 0 {
        local.checked_add_days(Days::new(days.unsigned_abs()))?
    } else {
        local.checked_sub_days(Days::new(days.unsigned_abs()))?
    };

    resolve_local(tz, shifted)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    if let Some(resolved) = tz.from_local_datetime(&local).earliest() {
        return Some(resolved.with_timezone(&Utc));
    }

    // Inside a gap: read the wall-clock time with the offset in force just
    // before the transition.
    let before_gap = (1..=48).find_map(|hours| {
        let earlier = local.checked_sub_signed(Duration::hours(hours))?;
        tz.from_local_datetime(&earlier).latest()
    })?;
    let offset = before_gap.offset().fix().local_minus_utc();
    let utc = local.checked_sub_signed(Duration::seconds(i64::from(offset)))?;

    Some(Utc.from_utc_datetime(&utc))
}
