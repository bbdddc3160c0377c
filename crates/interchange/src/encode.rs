//! Request encoding: native values to tagged wire JSON.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rust_decimal::prelude::ToPrimitive;
use serde_json::json;

use parlance_core::{TimeDeltaValue, Value};

use crate::error::WireError;
use crate::lossy::{Lossy, LossyReport};
use crate::MAX_DEPTH;

/// An encoded request: the wire tree plus any lossy-conversion flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub wire: serde_json::Value,
    pub lossy: LossyReport,
}

/// Encodes a native value tree into its wire form.
///
/// The inverse of decoding: typed kinds become discriminated objects,
/// scalars and containers pass through. Months go back to 1-based and
/// milliseconds widen to microseconds, so a decode of the result
/// reproduces the input exactly (timedeltas excepted when they carry
/// calendar fields, which the wire cannot express).
pub fn encode_request(value: &Value) -> Result<Encoded, WireError> {
    let mut lossy = LossyReport::new();
    let wire = encode_value(value, 0, &mut lossy)?;
    Ok(Encoded { wire, lossy })
}

fn encode_value(
    value: &Value,
    depth: usize,
    lossy: &mut LossyReport,
) -> Result<serde_json::Value, WireError> {
    if depth > MAX_DEPTH {
        return Err(WireError::DepthExceeded { limit: MAX_DEPTH });
    }
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(json!(b)),
        Value::Int(n) => Ok(json!(n)),
        Value::Float(f) => {
            serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| WireError::Unrepresentable {
                    message: format!("non-finite float {}", f),
                })
        }
        Value::String(s) => Ok(json!(s)),
        Value::Decimal(d) => Ok(json!({
            "__class__": "Decimal",
            "decimal": d.to_string(),
        })),
        Value::Date(d) => Ok(json!({
            "__class__": "date",
            "year": d.year(),
            "month": d.month0() + 1,
            "day": d.day(),
        })),
        Value::DateTime(dt) => Ok(json!({
            "__class__": "datetime",
            "year": dt.year(),
            "month": dt.month0() + 1,
            "day": dt.day(),
            "hour": dt.hour(),
            "minute": dt.minute(),
            "second": dt.second(),
            "microsecond": dt.millisecond() as u32 * 1_000,
        })),
        Value::Time(t) => Ok(json!({
            "__class__": "time",
            "hour": t.hour(),
            "minute": t.minute(),
            "second": t.second(),
            "microsecond": t.millisecond() as u32 * 1_000,
        })),
        Value::TimeDelta(td) => encode_timedelta(td, lossy),
        Value::Bytes(b) => Ok(json!({
            "__class__": "bytes",
            "base64": BASE64.encode(b),
        })),
        Value::List(items) => {
            let encoded: Result<Vec<serde_json::Value>, WireError> = items
                .iter()
                .map(|item| encode_value(item, depth + 1, lossy))
                .collect();
            Ok(serde_json::Value::Array(encoded?))
        }
        Value::Map(entries) => {
            let mut wire = serde_json::Map::new();
            for (key, child) in entries {
                wire.insert(key.clone(), encode_value(child, depth + 1, lossy)?);
            }
            Ok(serde_json::Value::Object(wire))
        }
    }
}

/// Collapses a timedelta to the seconds-only wire form.
///
/// Whole-second durations emit an integer; fractional ones emit a float.
/// Calendar fields do not survive the collapse and are flagged.
fn encode_timedelta(
    td: &TimeDeltaValue,
    lossy: &mut LossyReport,
) -> Result<serde_json::Value, WireError> {
    if td.has_calendar_component() {
        lossy.record(Lossy::CalendarDelta {
            years: td.years(),
            months: td.months(),
        });
    }
    let total = td.total_seconds();
    let seconds = if td.milliseconds() == 0 {
        total.to_i64().map(serde_json::Value::from)
    } else {
        total
            .to_f64()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
    };
    match seconds {
        Some(n) => Ok(json!({"__class__": "timedelta", "seconds": n})),
        None => Err(WireError::Unrepresentable {
            message: "timedelta too large for a JSON number".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlance_core::{DateTimeValue, DateValue, TimeValue};
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn encode(value: Value) -> serde_json::Value {
        encode_request(&value).unwrap().wire
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(encode(Value::Null), json!(null));
        assert_eq!(encode(Value::Bool(false)), json!(false));
        assert_eq!(encode(Value::Int(-3)), json!(-3));
        assert_eq!(encode(Value::Float(2.5)), json!(2.5));
        assert_eq!(encode(Value::from("hi")), json!("hi"));
    }

    #[test]
    fn non_finite_float_is_unrepresentable() {
        let err = encode_request(&Value::Float(f64::NAN)).unwrap_err();
        assert!(matches!(err, WireError::Unrepresentable { .. }));
    }

    #[test]
    fn decimal_emits_string_payload() {
        let d = Decimal::from_str("19.99").unwrap();
        assert_eq!(
            encode(Value::Decimal(d)),
            json!({"__class__": "Decimal", "decimal": "19.99"})
        );
    }

    #[test]
    fn decimal_preserves_trailing_zero_scale() {
        let d = Decimal::from_str("2.50").unwrap();
        assert_eq!(
            encode(Value::Decimal(d)),
            json!({"__class__": "Decimal", "decimal": "2.50"})
        );
    }

    #[test]
    fn date_month_converts_to_one_based() {
        let d = DateValue::new(2024, 2, 15).unwrap(); // March
        assert_eq!(
            encode(Value::Date(d)),
            json!({"__class__": "date", "year": 2024, "month": 3, "day": 15})
        );
    }

    #[test]
    fn datetime_milliseconds_widen_to_microseconds() {
        let dt = DateTimeValue::from_utc(2024, 2, 15, 9, 30, 5, 123).unwrap();
        assert_eq!(
            encode(Value::DateTime(dt)),
            json!({
                "__class__": "datetime",
                "year": 2024, "month": 3, "day": 15,
                "hour": 9, "minute": 30, "second": 5, "microsecond": 123_000
            })
        );
    }

    #[test]
    fn time_emits_all_fields() {
        let t = TimeValue::new(14, 0, 0, 5).unwrap();
        assert_eq!(
            encode(Value::Time(t)),
            json!({"__class__": "time", "hour": 14, "minute": 0, "second": 0, "microsecond": 5_000})
        );
    }

    #[test]
    fn timedelta_whole_seconds_emit_integer() {
        let td = TimeDeltaValue::new(0, 0, 1, 2, 3, 4);
        assert_eq!(
            encode(Value::TimeDelta(td)),
            json!({"__class__": "timedelta", "seconds": 93_784})
        );
    }

    #[test]
    fn timedelta_fractional_seconds_emit_float() {
        let td = TimeDeltaValue::from_seconds(5, 250);
        assert_eq!(
            encode(Value::TimeDelta(td)),
            json!({"__class__": "timedelta", "seconds": 5.25})
        );
    }

    #[test]
    fn timedelta_calendar_fields_are_flagged() {
        let td = TimeDeltaValue::new(1, 2, 0, 0, 0, 0);
        let encoded = encode_request(&Value::TimeDelta(td)).unwrap();
        assert_eq!(encoded.wire, json!({"__class__": "timedelta", "seconds": 0}));
        assert_eq!(
            encoded.lossy.flags(),
            &[Lossy::CalendarDelta { years: 1, months: 2 }]
        );
    }

    #[test]
    fn bytes_emit_base64() {
        assert_eq!(
            encode(Value::Bytes(vec![1, 2, 3, 4])),
            json!({"__class__": "bytes", "base64": "AQIDBA=="})
        );
    }

    #[test]
    fn containers_recurse() {
        let mut map = BTreeMap::new();
        map.insert("qty".to_string(), Value::Int(2));
        map.insert(
            "price".to_string(),
            Value::Decimal(Decimal::from_str("9.99").unwrap()),
        );
        let v = Value::List(vec![Value::Map(map)]);
        assert_eq!(
            encode(v),
            json!([{
                "qty": 2,
                "price": {"__class__": "Decimal", "decimal": "9.99"}
            }])
        );
    }

    #[test]
    fn depth_limit_rejects_pathological_nesting() {
        let mut v = Value::Int(1);
        for _ in 0..200 {
            v = Value::List(vec![v]);
        }
        let err = encode_request(&v).unwrap_err();
        assert!(matches!(err, WireError::DepthExceeded { .. }));
    }
}
