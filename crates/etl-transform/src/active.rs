//! Normalization of the customer `is_active` flag.

use etl_common::any_to_string;
use polars::prelude::AnyValue;

/// Text values (case-insensitive) meaning "active".
const ACTIVE_TOKENS: [&str; 3] = ["active", "1", "true"];

/// Source encoding of an `is_active` value.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveFlag {
    Missing,
    Flag(bool),
    /// Any other encoding, numbers included, in its textual form.
    Text(String),
}

impl ActiveFlag {
    pub fn from_value(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Self::Missing,
            AnyValue::Float64(v) if v.is_nan() => Self::Missing,
            AnyValue::Boolean(flag) => Self::Flag(flag),
            other => Self::Text(any_to_string(other)),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Self::Missing => false,
            Self::Flag(flag) => *flag,
            Self::Text(text) => ACTIVE_TOKENS
                .iter()
                .any(|token| text.eq_ignore_ascii_case(token)),
        }
    }
}

/// Strict boolean for a raw `is_active` value.
///
/// ```
/// use polars::prelude::AnyValue;
/// use etl_transform::standardise_is_active;
///
/// assert!(standardise_is_active(AnyValue::String("Active")));
/// assert!(!standardise_is_active(AnyValue::String("inactive")));
/// assert!(!standardise_is_active(AnyValue::Null));
/// ```
pub fn standardise_is_active(value: AnyValue<'_>) -> bool {
    ActiveFlag::from_value(value).is_active()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_encodings_use_their_text() {
        assert!(standardise_is_active(AnyValue::Int64(1)));
        assert!(standardise_is_active(AnyValue::Float64(1.0)));
        assert!(!standardise_is_active(AnyValue::Int64(0)));
        assert!(!standardise_is_active(AnyValue::Int64(2)));
    }

    #[test]
    fn nan_is_missing() {
        assert_eq!(
            ActiveFlag::from_value(AnyValue::Float64(f64::NAN)),
            ActiveFlag::Missing
        );
    }

    #[test]
    fn whitespace_is_not_trimmed() {
        assert!(!standardise_is_active(AnyValue::String(" active")));
    }
}
