use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp (the wire format for all snapshot timestamps).
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render an HTTP date (RFC 1123), e.g. `Thu, 23 Jan 2025 17:05:00 GMT`.
pub fn format_http_date(dt: DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date as sent in `If-Modified-Since` / `If-Unmodified-Since`.
/// RFC 2822 parsing covers the RFC 1123 form including the `GMT` zone name.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_date_round_trips() {
        let dt = parse_rfc3339("2025-01-23T17:05:00Z").unwrap();
        let header = format_http_date(dt);
        assert_eq!(header, "Thu, 23 Jan 2025 17:05:00 GMT");
        assert_eq!(parse_http_date(&header), Some(dt));
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert!(parse_rfc3339("not-a-date").is_none());
        assert!(parse_http_date("not-a-date").is_none());
    }

    #[test]
    fn accepts_offset_timestamps() {
        let a = parse_rfc3339("2025-01-23T17:05:00Z").unwrap();
        let b = parse_rfc3339("2025-01-23T18:05:00+01:00").unwrap();
        assert_eq!(a, b);
    }
}
