//! Hand-rolled `__DATE__`/`__TIME__` formatting against `SystemTime`. No `chrono`
//! dependency, matching the core's zero-dependency policy.

use std::time::{SystemTime, UNIX_EPOCH};

/// Format the current UTC date as `"Mmm dd yyyy"` for the `__DATE__` macro.
#[must_use]
pub fn format_date() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let days_since_epoch = now.as_secs() / 86400;
    let mut year = 1970u64;
    let mut days_remaining = days_since_epoch;

    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if days_remaining < days_in_year {
            break;
        }
        days_remaining -= days_in_year;
        year += 1;
    }

    let month_names = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let month_days = [
        31,
        if is_leap_year(year) { 29 } else { 28 },
        31, 30, 31, 30, 31, 31, 30, 31, 30, 31,
    ];

    let mut month = 0;
    let mut day = days_remaining + 1;
    for (i, &days) in month_days.iter().enumerate() {
        if day <= days {
            month = i;
            break;
        }
        day -= days;
    }

    format!("{:3} {:2} {}", month_names[month], day, year)
}

/// Format the current UTC time as `"hh:mm:ss"` for the `__TIME__` macro.
#[must_use]
pub fn format_time() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let seconds_today = now.as_secs() % 86400;
    let hours = seconds_today / 3600;
    let minutes = (seconds_today % 3600) / 60;
    let seconds = seconds_today % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

const fn is_leap_year(year: u64) -> bool {
    (year.is_multiple_of(4) && !year.is_multiple_of(100)) || year.is_multiple_of(400)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_has_expected_shape() {
        let date = format_date();
        assert_eq!(date.len(), 11);
        let month = &date[0..3];
        assert!(
            ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"]
                .contains(&month)
        );
    }

    #[test]
    fn time_has_expected_shape() {
        let time = format_time();
        assert_eq!(time.len(), 8);
        assert_eq!(time.chars().nth(2), Some(':'));
        assert_eq!(time.chars().nth(5), Some(':'));
    }
}
