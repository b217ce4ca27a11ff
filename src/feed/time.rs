use chrono::{DateTime, Datelike, Months, Utc};

/// Coarse age of a unix timestamp relative to `now`, e.g. `"3d"` or `"5h"`.
///
/// Picks the largest of years, months, weeks, days, hours, minutes and
/// seconds whose whole elapsed count is positive. Timestamps at or after
/// `now`, or outside the representable range, come out as `"0s"`.
pub fn relative_age(timestamp: i64, now: DateTime<Utc>) -> String {
    let Some(then) = DateTime::<Utc>::from_timestamp(timestamp, 0) else {
        return "0s".to_string();
    };

    let months = whole_months_between(then, now);
    let elapsed = now.signed_duration_since(then);

    let scales = [
        (months / 12, 'y'),
        (months, 'm'),
        (elapsed.num_weeks(), 'w'),
        (elapsed.num_days(), 'd'),
        (elapsed.num_hours(), 'h'),
        (elapsed.num_minutes(), 'm'),
        (elapsed.num_seconds(), 's'),
    ];

    scales
        .iter()
        .find(|(count, _)| *count > 0)
        .map(|(count, unit)| format!("{}{}", count, unit))
        .unwrap_or_else(|| "0s".to_string())
}

/// Calendar months from `then` to `now`; zero or negative when `now` is not later.
fn whole_months_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    if now <= then {
        return 0;
    }

    let mut months = i64::from(now.year() - then.year()) * 12 + i64::from(now.month())
        - i64::from(then.month());

    // Step back while the anniversary has not been reached yet.
    while months > 0 {
        let reached = u32::try_from(months)
            .ok()
            .and_then(|m| then.checked_add_months(Months::new(m)))
            .is_some_and(|anniversary| anniversary <= now);
        if reached {
            break;
        }
        months -= 1;
    }

    months
}
