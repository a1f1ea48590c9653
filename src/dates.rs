//! Date labels and start-date ordering.
//!
//! Dates from the store are opaque `YYYY-MM-DD` strings. They are only ever
//! compared for ordering and formatted for display; there is no timezone or
//! calendar arithmetic beyond a whole-month difference for duration labels.
//! Strings that don't parse are shown verbatim.

use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;

/// Label used for an open-ended period.
pub const PRESENT: &str = "Present";

/// Parse `YYYY-MM-DD`, `YYYY-MM`, or an RFC 3339 timestamp (date part only).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok())
}

/// `"2023-01-15"` → `"January 2023"`.
pub fn month_year(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// `"2023-01-15"` → `"Jan 2023"`; `None` → `"Present"`.
pub fn short_month_year(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => parse_date(raw)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_else(|| raw.to_string()),
        None => PRESENT.to_string(),
    }
}

/// `"January 2023 – Present"`. A missing end means the period is ongoing.
pub fn period_label(start: Option<&str>, end: Option<&str>) -> String {
    let end = end.map(month_year).unwrap_or_else(|| PRESENT.to_string());
    match start {
        Some(start) => format!("{} – {}", month_year(start), end),
        None => end,
    }
}

/// Whole months between start and end, counting both endpoint months.
///
/// Returns `None` when the start is missing or unparsable, or when the end
/// precedes the start.
pub fn months_between(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> Option<u32> {
    let start = parse_date(start?)?;
    let end = match end {
        Some(raw) => parse_date(raw)?,
        None => today,
    };
    let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    u32::try_from(months + 1).ok().filter(|m| *m > 0)
}

/// `"1 yr 3 mos"`, `"2 yrs"`, `"5 mos"`.
pub fn duration_label(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> Option<String> {
    let months = months_between(start, end, today)?;
    let (years, rest) = (months / 12, months % 12);
    let years_label = match years {
        0 => None,
        1 => Some("1 yr".to_string()),
        n => Some(format!("{n} yrs")),
    };
    let months_label = match rest {
        0 => None,
        1 => Some("1 mo".to_string()),
        n => Some(format!("{n} mos")),
    };
    match (years_label, months_label) {
        (Some(y), Some(m)) => Some(format!("{y} {m}")),
        (Some(y), None) => Some(y),
        (None, Some(m)) => Some(m),
        (None, None) => None,
    }
}

/// Descending by start date; missing dates sort last.
///
/// ISO dates order lexicographically, so the raw strings are compared.
pub fn cmp_start_desc(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort, newest start date first. Ties keep their incoming order.
pub fn sort_by_start_desc<T>(items: &mut [T], start: impl Fn(&T) -> Option<&str>) {
    items.sort_by(|a, b| cmp_start_desc(start(a), start(b)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_accepts_common_shapes() {
        assert_eq!(parse_date("2023-04-02"), Some(day(2023, 4, 2)));
        assert_eq!(parse_date("2023-04"), Some(day(2023, 4, 1)));
        assert_eq!(parse_date("2023-04-02T10:00:00Z"), Some(day(2023, 4, 2)));
        assert_eq!(parse_date("spring"), None);
    }

    #[test]
    fn month_year_formats_or_passes_through() {
        assert_eq!(month_year("2021-09-01"), "September 2021");
        assert_eq!(month_year("someday"), "someday");
    }

    #[test]
    fn period_with_null_end_is_present() {
        assert_eq!(
            period_label(Some("2022-03-01"), None),
            "March 2022 – Present"
        );
    }

    #[test]
    fn period_with_end() {
        assert_eq!(
            period_label(Some("2019-01-01"), Some("2021-06-30")),
            "January 2019 – June 2021"
        );
    }

    #[test]
    fn short_labels() {
        assert_eq!(short_month_year(Some("2024-02-10")), "Feb 2024");
        assert_eq!(short_month_year(None), "Present");
    }

    #[test]
    fn duration_counts_endpoint_months() {
        let today = day(2024, 6, 1);
        assert_eq!(
            duration_label(Some("2024-01-01"), Some("2024-01-31"), today),
            Some("1 mo".to_string())
        );
        assert_eq!(
            duration_label(Some("2022-01-01"), Some("2023-03-01"), today),
            Some("1 yr 3 mos".to_string())
        );
        assert_eq!(
            duration_label(Some("2020-07-01"), Some("2022-06-01"), today),
            Some("2 yrs".to_string())
        );
    }

    #[test]
    fn duration_open_ended_uses_today() {
        let today = day(2024, 6, 15);
        assert_eq!(
            duration_label(Some("2024-01-01"), None, today),
            Some("6 mos".to_string())
        );
    }

    #[test]
    fn duration_rejects_inverted_or_missing() {
        let today = day(2024, 6, 15);
        assert_eq!(duration_label(Some("2024-05-01"), Some("2023-01-01"), today), None);
        assert_eq!(duration_label(None, Some("2023-01-01"), today), None);
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut items = vec![
            ("a", Some("2020-01-01")),
            ("b", None),
            ("c", Some("2023-05-01")),
            ("d", Some("2020-01-01")),
        ];
        sort_by_start_desc(&mut items, |i| i.1);
        let order: Vec<&str> = items.iter().map(|i| i.0).collect();
        assert_eq!(order, vec!["c", "a", "d", "b"]);
    }
}
