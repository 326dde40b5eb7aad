use ipdb::Meta;

/// Latest year a build timestamp may fall in
const MAX_YEAR: i64 = 9999;

/// Render an IPDB build timestamp (Unix seconds) as a UTC date.
///
/// Timestamps before 1970 or after year 9999 come from a damaged header and
/// are reported as invalid.
pub fn format_unix_timestamp(timestamp: i64) -> String {
    if timestamp < 0 {
        return format!("Invalid timestamp: {}", timestamp);
    }
    let days = timestamp / 86_400;
    let secs = timestamp % 86_400;

    let (year, month, day) = civil_from_days(days);
    if year > MAX_YEAR {
        return format!("Invalid timestamp: {}", timestamp);
    }

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        year,
        month,
        day,
        secs / 3600,
        secs % 3600 / 60,
        secs % 60
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
///
/// Closed form over 400-year eras, so the cost does not depend on the date.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // March = 0
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// "IPv4", "IPv6", "IPv4+IPv6" or "unknown" from the metadata flags
pub fn ip_version_label(meta: &Meta) -> &'static str {
    match (meta.supports_ipv4(), meta.supports_ipv6()) {
        (true, true) => "IPv4+IPv6",
        (true, false) => "IPv4",
        (false, true) => "IPv6",
        (false, false) => "unknown",
    }
}
