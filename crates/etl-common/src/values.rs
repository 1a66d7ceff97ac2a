//! Scalar conversions for amounts and identifiers.
//!
//! Amounts reach the cleaners as integers, floats or text depending on the
//! source, and customer ids are written to snapshots and SQL in textual
//! form. Both directions go through here so a number renders the same way
//! everywhere: `600.0` is `600`, `500.25` stays `500.25`.

use polars::prelude::AnyValue;

/// Textual form of a cell; empty for null.
///
/// ```
/// use polars::prelude::AnyValue;
/// use etl_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Float64(600.0)), "600");
/// assert_eq!(any_to_string(AnyValue::String("uk")), "uk");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_owned(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Render a float without a trailing fraction when it is integral.
///
/// `f64`'s `Display` already omits trailing zeros; only negative zero needs
/// folding so `-0.0` and `0.0` render alike.
pub fn format_numeric(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// Numeric value of an amount cell. Text is parsed after trimming; nulls,
/// booleans and unparseable text give `None`.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        AnyValue::Int8(_)
        | AnyValue::Int16(_)
        | AnyValue::Int32(_)
        | AnyValue::Int64(_)
        | AnyValue::UInt8(_)
        | AnyValue::UInt16(_)
        | AnyValue::UInt32(_)
        | AnyValue::UInt64(_)
        | AnyValue::Float32(_)
        | AnyValue::Float64(_) => value.extract::<f64>(),
        _ => None,
    }
}

pub fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}
