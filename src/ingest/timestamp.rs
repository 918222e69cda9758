use chrono::{DateTime, NaiveDateTime, Utc};

/// 无时区后缀时尝试的格式，按 UTC 解释
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// 解析 ISO-8601 时间戳
///
/// 接受 `Z` 或数字偏移（`+03:00`）；日期与时间之间可用空格。
/// 没有任何偏移信息的时间戳视为 UTC。
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("empty timestamp".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    Err(format!("'{}' is not an ISO-8601 timestamp", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_z_suffix_is_utc() {
        let dt = parse_timestamp("2025-11-27T10:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 11, 27, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_offset_is_normalized() {
        let dt = parse_timestamp("2025-11-27T13:30:00+03:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 11, 27, 10, 30, 0).unwrap());

        let dt = parse_timestamp("2025-11-27 13:30:00+03:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 11, 27, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_fractional_seconds() {
        let dt = parse_timestamp("2025-08-19T08:54:35.123456+00:00").unwrap();
        assert_eq!(dt.timestamp_subsec_micros(), 123456);
    }

    #[test]
    fn test_naive_is_treated_as_utc() {
        let dt = parse_timestamp("2025-11-27T10:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 11, 27, 10, 0, 0).unwrap());

        let dt = parse_timestamp("2025-11-27 10:00:00.5").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("2025-13-45T10:00:00Z").is_err());
    }
}
