//! Decimal wire-string parsing.
//!
//! All numeric domain values use `rust_decimal::Decimal` -- never `f64` --
//! so server-side precision survives the trip through the client.

use rust_decimal::Decimal;

/// Parses the server's decimal wire string.
///
/// Empty and unparseable strings yield `None`, which the decoder maps to the
/// missing-value sentinel (`Value::Null`) rather than a NaN that would
/// propagate through arithmetic. Values outside the 96-bit `Decimal` range
/// also yield `None`; the decoder flags those separately as lossy.
pub fn parse_wire_decimal(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_plain_decimal() {
        assert_eq!(
            parse_wire_decimal("2.50"),
            Some(Decimal::from_str("2.50").unwrap())
        );
    }

    #[test]
    fn parses_negative_and_padded() {
        assert_eq!(
            parse_wire_decimal("  -17.125 "),
            Some(Decimal::from_str("-17.125").unwrap())
        );
    }

    #[test]
    fn empty_string_is_missing() {
        assert_eq!(parse_wire_decimal(""), None);
        assert_eq!(parse_wire_decimal("   "), None);
    }

    #[test]
    fn garbage_is_missing_not_nan() {
        assert_eq!(parse_wire_decimal("not a number"), None);
    }

    #[test]
    fn out_of_range_is_missing() {
        // 40 integer digits exceeds the 96-bit representation.
        assert_eq!(parse_wire_decimal(&"9".repeat(40)), None);
    }

    #[test]
    fn preserves_trailing_zero_scale() {
        let d = parse_wire_decimal("2.50").unwrap();
        assert_eq!(d.to_string(), "2.50");
    }
}
