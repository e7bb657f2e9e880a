use chrono::TimeDelta;

/// Rounds a span to whole seconds, half a second rounding up. Spans that go backwards count as
/// nothing.
pub fn whole_seconds(span: TimeDelta) -> u64 {
    let millis = span.num_milliseconds();
    if millis <= 0 {
        0
    } else {
        ((millis + 500) / 1000) as u64
    }
}

pub fn format_duration(seconds: u64) -> String {
    let (hours, minutes, seconds) = (seconds / 3600, seconds / 60 % 60, seconds % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::{format_duration, whole_seconds};

    #[test]
    fn test_whole_seconds_rounding() {
        assert_eq!(whole_seconds(TimeDelta::milliseconds(499)), 0);
        assert_eq!(whole_seconds(TimeDelta::milliseconds(500)), 1);
        assert_eq!(whole_seconds(TimeDelta::milliseconds(1499)), 1);
        assert_eq!(whole_seconds(TimeDelta::milliseconds(10_500)), 11);
    }

    #[test]
    fn test_whole_seconds_backwards() {
        assert_eq!(whole_seconds(TimeDelta::seconds(-30)), 0);
        assert_eq!(whole_seconds(TimeDelta::zero()), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m5s");
        assert_eq!(format_duration(3 * 3600 + 61), "3h1m1s");
    }
}
