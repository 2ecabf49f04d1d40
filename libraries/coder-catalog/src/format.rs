//! Display formatting for catalog metadata.

/// Split an ISO-8601 duration such as `PT1H2M3S` into seconds.
///
/// Only the hour/minute/second designators are understood. Returns `None`
/// for anything that does not start with `PT` or does not fit in a `u64`.
pub fn duration_secs(iso: &str) -> Option<u64> {
    let rest = iso.trim().strip_prefix("PT")?;

    let mut total = 0u64;
    let mut digits = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            'H' => 3600,
            'M' => 60,
            'S' => 1,
            _ => break,
        };
        let value: u64 = digits.parse().ok()?;
        total = value.checked_mul(unit)?.checked_add(total)?;
        digits.clear();
    }
    Some(total)
}

/// Format an ISO-8601 duration for display.
///
/// `PT1H2M3S` becomes `1:02:03`, `PT3M5S` becomes `3:05`. Empty or
/// unrecognised input gives an empty string.
pub fn format_duration(iso: &str) -> String {
    let Some(total) = duration_secs(iso) else {
        return String::new();
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Format a raw view count, e.g. `1234567` as `1.2M views`.
///
/// Unparsable counts read as zero.
pub fn format_view_count(view_count: &str) -> String {
    let count: u64 = view_count.trim().parse().unwrap_or(0);
    if count >= 1_000_000 {
        format!("{:.1}M views", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K views", count as f64 / 1_000.0)
    } else {
        format!("{} views", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration("PT1H2M3S"), "1:02:03");
        assert_eq!(format_duration("PT3M5S"), "3:05");
        assert_eq!(format_duration("PT45S"), "0:45");
        assert_eq!(format_duration("PT2H"), "2:00:00");
        assert_eq!(format_duration("PT10M"), "10:00");
    }

    #[test]
    fn oversized_durations_are_rejected() {
        assert_eq!(duration_secs("PT9999999999999999999H"), None);
        assert_eq!(duration_secs("PT99999999999999999999S"), None);
        assert_eq!(format_duration("PT9999999999999999999H"), "");
        assert_eq!(
            duration_secs("PT5124095576030431H"),
            Some(5_124_095_576_030_431 * 3600)
        );
    }

    #[test]
    fn invalid_durations_are_blank() {
        assert_eq!(format_duration(""), "");
        assert_eq!(format_duration("3:05"), "");
        assert_eq!(format_duration("P1D"), "");
    }

    #[test]
    fn duration_seconds() {
        assert_eq!(duration_secs("PT1H2M3S"), Some(3723));
        assert_eq!(duration_secs("PT0S"), Some(0));
        assert_eq!(duration_secs("nope"), None);
    }

    #[test]
    fn view_counts() {
        assert_eq!(format_view_count("1234567"), "1.2M views");
        assert_eq!(format_view_count("3400"), "3.4K views");
        assert_eq!(format_view_count("12"), "12 views");
        assert_eq!(format_view_count("lots"), "0 views");
    }
}
