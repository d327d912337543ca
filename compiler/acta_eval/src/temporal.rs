//! Date, time and duration helpers.

use acta_ir::builtins::{DATE_LITERAL_FORMATS, TIME_LITERAL_FORMATS};
use acta_ir::DurationUnit;
use chrono::{Local, NaiveDate, NaiveTime, TimeDelta};

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_LITERAL_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    TIME_LITERAL_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

/// Duration of `value` units, `None` when it does not fit.
pub fn duration(value: i64, unit: DurationUnit) -> Option<TimeDelta> {
    unit.to_millis(value).and_then(TimeDelta::try_milliseconds)
}

/// Duration from a (possibly fractional) number of milliseconds.
#[expect(
    clippy::cast_possible_truncation,
    reason = "range is checked against i64 before the cast"
)]
pub fn duration_from_millis(millis: f64) -> Option<TimeDelta> {
    let rounded = millis.round();
    if !rounded.is_finite() || rounded.abs() >= 9.2e18 {
        return None;
    }
    TimeDelta::try_milliseconds(rounded as i64)
}

/// Current local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local wall-clock time.
pub fn now() -> NaiveTime {
    Local::now().time()
}

/// Render a duration in its largest exact unit: `3d`, `90m`, `250ms`.
pub fn format_duration(delta: TimeDelta) -> String {
    const UNITS: [DurationUnit; 4] = [
        DurationUnit::Days,
        DurationUnit::Hours,
        DurationUnit::Minutes,
        DurationUnit::Seconds,
    ];
    let millis = delta.num_milliseconds();
    if millis == 0 {
        return "0s".to_string();
    }
    for unit in UNITS {
        if millis % unit.millis() == 0 {
            return format!("{}{}", millis / unit.millis(), unit.suffix());
        }
    }
    format!("{millis}ms")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 25);
        assert_eq!(parse_date("2024-03-25"), expected);
        assert_eq!(parse_date("25/03/2024"), expected);
        // Day 25 is not a month, so the US layout is the one that matches.
        assert_eq!(parse_date("03/25/2024"), expected);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_time_layouts() {
        assert_eq!(parse_time("08:30:15"), NaiveTime::from_hms_opt(8, 30, 15));
        assert_eq!(parse_time("08:30"), NaiveTime::from_hms_opt(8, 30, 0));
        assert_eq!(parse_time("25:00"), None);
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(
            duration(90, DurationUnit::Seconds),
            TimeDelta::try_seconds(90)
        );
        assert_eq!(duration(i64::MAX, DurationUnit::Days), None);
    }

    #[test]
    fn test_durations_render_in_largest_exact_unit() {
        let render = |value, unit| duration(value, unit).map(format_duration);
        assert_eq!(render(2, DurationUnit::Days).as_deref(), Some("2d"));
        assert_eq!(render(90, DurationUnit::Minutes).as_deref(), Some("90m"));
        assert_eq!(render(120, DurationUnit::Minutes).as_deref(), Some("2h"));
        assert_eq!(render(1500, DurationUnit::Milliseconds).as_deref(), Some("1500ms"));
        assert_eq!(render(0, DurationUnit::Hours).as_deref(), Some("0s"));
    }
}
