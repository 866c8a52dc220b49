use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Weight bound assigned when a weight cell cannot be read.
pub const UNPARSEABLE_WEIGHT_KG: f64 = 99.0;
/// Seat width assigned when a width cell holds no integer.
pub const UNPARSEABLE_SEAT_WIDTH_CM: u32 = 99;

/// Raw weight cell as it appears in the catalog source.
///
/// Serializes back to its source shape: integral numbers as JSON integers,
/// other numbers as floats, text as a string, and a missing cell as `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightCell {
    Number(f64),
    Text(String),
    Missing,
}

impl WeightCell {
    /// Classify a trimmed source cell. Cells that read as a finite number are numeric.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Self::Missing;
        };

        match value.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(value.to_string()),
        }
    }
}

/// Largest magnitude an `f64` holds with every integer below it exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for WeightCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(value) if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER => {
                serializer.serialize_i64(*value as i64)
            }
            Self::Number(value) => serializer.serialize_f64(*value),
            Self::Text(value) => serializer.serialize_str(value),
            Self::Missing => serializer.serialize_none(),
        }
    }
}

impl fmt::Display for WeightCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Missing => f.write_str("-"),
        }
    }
}

/// Product weight interval in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

impl WeightRange {
    pub const UNPARSEABLE: Self = Self {
        min: UNPARSEABLE_WEIGHT_KG,
        max: UNPARSEABLE_WEIGHT_KG,
    };

    pub const fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        *self == Self::UNPARSEABLE
    }
}

fn decimal_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("decimal token pattern"))
}

fn integer_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+").expect("integer token pattern"))
}

/// Derive a weight interval from a catalog cell. Never fails.
///
/// `"13.3~16"` reads as a range, anything else contributes its first
/// decimal token to both bounds.
pub fn parse_weight(cell: &WeightCell) -> WeightRange {
    match cell {
        WeightCell::Number(value) => WeightRange::point(*value),
        WeightCell::Text(text) => parse_weight_text(text),
        WeightCell::Missing => WeightRange::UNPARSEABLE,
    }
}

fn parse_weight_text(text: &str) -> WeightRange {
    if text.contains('~') {
        let mut sides = text.split('~');
        return match (sides.next(), sides.next(), sides.next()) {
            (Some(min), Some(max), None) => {
                match (min.trim().parse::<f64>(), max.trim().parse::<f64>()) {
                    (Ok(min), Ok(max)) => WeightRange { min, max },
                    _ => WeightRange::UNPARSEABLE,
                }
            }
            _ => WeightRange::UNPARSEABLE,
        };
    }

    decimal_token()
        .find(text)
        .and_then(|token| token.as_str().parse::<f64>().ok())
        .map(WeightRange::point)
        .unwrap_or(WeightRange::UNPARSEABLE)
}

/// Smallest integer mentioned in a seat-width cell, e.g. `"40-42"` gives 40.
pub fn parse_min_seat_width(raw: Option<&str>) -> u32 {
    raw.and_then(|text| {
        integer_token()
            .find_iter(text)
            .filter_map(|token| token.as_str().parse::<u32>().ok())
            .min()
    })
    .unwrap_or(UNPARSEABLE_SEAT_WIDTH_CM)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> WeightCell {
        WeightCell::Text(value.to_string())
    }

    #[test]
    fn weight_ranges_split_on_tilde() {
        assert_eq!(
            parse_weight(&text("13.3~16")),
            WeightRange {
                min: 13.3,
                max: 16.0
            }
        );
        assert_eq!(
            parse_weight(&text(" 12 ~ 14.5 ")),
            WeightRange {
                min: 12.0,
                max: 14.5
            }
        );
    }

    #[test]
    fn malformed_ranges_fall_back_to_sentinel() {
        assert_eq!(parse_weight(&text("13~")), WeightRange::UNPARSEABLE);
        assert_eq!(parse_weight(&text("약 13~16kg")), WeightRange::UNPARSEABLE);
        assert_eq!(parse_weight(&text("12~13~14")), WeightRange::UNPARSEABLE);
    }

    #[test]
    fn single_values_use_first_number() {
        assert_eq!(parse_weight(&text("16")), WeightRange::point(16.0));
        assert_eq!(parse_weight(&text("약 13.3kg")), WeightRange::point(13.3));
        assert_eq!(parse_weight(&WeightCell::Number(16.0)), WeightRange::point(16.0));
    }

    #[test]
    fn unreadable_weights_are_sentinel() {
        assert_eq!(parse_weight(&text("abc")), WeightRange::UNPARSEABLE);
        assert_eq!(parse_weight(&WeightCell::Missing), WeightRange::UNPARSEABLE);
        assert!(parse_weight(&text("abc")).is_unparseable());
    }

    #[test]
    fn cells_are_classified_before_parsing() {
        assert_eq!(WeightCell::from_raw(Some(" 16 ")), WeightCell::Number(16.0));
        assert_eq!(WeightCell::from_raw(Some("13.3~16")), text("13.3~16"));
        assert_eq!(WeightCell::from_raw(Some("inf")), text("inf"));
        assert_eq!(WeightCell::from_raw(Some("  ")), WeightCell::Missing);
        assert_eq!(WeightCell::from_raw(None), WeightCell::Missing);
    }

    #[test]
    fn cells_serialize_in_their_source_shape() {
        let json = |cell: WeightCell| serde_json::to_value(cell).expect("serialize cell");
        assert_eq!(json(WeightCell::Number(18.0)), serde_json::json!(18));
        assert_eq!(json(WeightCell::Number(16.5)), serde_json::json!(16.5));
        assert_eq!(json(text("13.3~16")), serde_json::json!("13.3~16"));
        assert_eq!(json(WeightCell::Missing), serde_json::Value::Null);
    }

    #[test]
    fn seat_width_takes_smallest_integer() {
        assert_eq!(parse_min_seat_width(Some("40-42")), 40);
        assert_eq!(parse_min_seat_width(Some("46 / 43 / 45")), 43);
        assert_eq!(parse_min_seat_width(Some("없음")), UNPARSEABLE_SEAT_WIDTH_CM);
        assert_eq!(parse_min_seat_width(None), UNPARSEABLE_SEAT_WIDTH_CM);
    }
}
