//! Date parsing for transaction dates.
//!
//! Source systems deliver dates in several textual layouts. Each value is
//! tried against [`DATE_FORMATS`] in order and the first layout that yields a
//! real calendar date wins, so ambiguous inputs such as `01-02-2021` resolve
//! day-first (1 February 2021).

use chrono::NaiveDate;

/// Accepted input layouts, in priority order.
pub const DATE_FORMATS: [&str; 7] = [
    "%Y/%m/%d", // 2021/01/31
    "%Y-%m-%d", // 2021-01-31
    "%d %b %Y", // 31 Jan 2021
    "%b %d, %Y", // Jan 31, 2021
    "%d %B %Y", // 31 January 2021
    "%d-%m-%Y", // 31-01-2021
    "%d/%m/%Y", // 31/01/2021
];

/// Layout of normalized dates in transaction outputs.
pub const CANONICAL_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a raw date value.
///
/// Returns `None` for null, empty, unrecognised or calendrically invalid
/// input; never fails.
///
/// ```
/// use chrono::NaiveDate;
/// use etl_transform::normalize_date;
///
/// assert_eq!(normalize_date(Some("01-02-2021")), NaiveDate::from_ymd_opt(2021, 2, 1));
/// assert_eq!(normalize_date(Some("2021-02-30")), None);
/// assert_eq!(normalize_date(None), None);
/// ```
pub fn normalize_date(value: Option<&str>) -> Option<NaiveDate> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .filter(|format| same_spacing(trimmed, format))
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// chrono lets a space in the layout match no whitespace at all, so the
/// input must split into as many whitespace-separated parts as the layout.
fn same_spacing(input: &str, format: &str) -> bool {
    input.split_whitespace().count() == format.split_whitespace().count()
}

/// Render a date as `DD/MM/YYYY`.
pub fn format_canonical_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}
