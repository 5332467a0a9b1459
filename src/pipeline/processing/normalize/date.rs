use crate::constants::NULL_DATE_TOKENS;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
];

// Day-first for slashed dates, as published by Brazilian sources
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%Y%m%d"];

/// Canonical `YYYY-MM-DD`, or an empty string when the input is absent or
/// not a real calendar date.
pub fn normalize_date(raw: Option<&str>) -> String {
    raw.and_then(parse_date)
        .map(|d| d.format(CANONICAL_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() || NULL_DATE_TOKENS.contains(&s) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_timestamps_become_plain_dates() {
        assert_eq!(normalize_date(Some("2026-01-15T09:30:12")), "2026-01-15");
        assert_eq!(normalize_date(Some("2026-01-15T09:30:12.345")), "2026-01-15");
        assert_eq!(normalize_date(Some("2026-01-15 09:30:12")), "2026-01-15");
        assert_eq!(normalize_date(Some("2026-01-15T09:30:12-03:00")), "2026-01-15");
    }

    #[test]
    fn plain_dates_are_canonicalised() {
        assert_eq!(normalize_date(Some("2026-02-03")), "2026-02-03");
        assert_eq!(normalize_date(Some("03/02/2026")), "2026-02-03");
        assert_eq!(normalize_date(Some("20260203")), "2026-02-03");
    }

    #[test]
    fn impossible_dates_are_empty_not_placeholders() {
        assert_eq!(normalize_date(Some("2026-13-40")), "");
        assert_eq!(normalize_date(Some("2026-02-30")), "");
        assert_eq!(normalize_date(Some("amanhã")), "");
    }

    #[test]
    fn null_tokens_are_empty() {
        assert_eq!(normalize_date(None), "");
        for token in ["", "NaT", "None", "nan", "  "] {
            assert_eq!(normalize_date(Some(token)), "");
        }
    }
}
