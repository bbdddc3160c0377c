//! Response decoding: tagged wire JSON to native values.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rust_decimal::Decimal;

use parlance_core::decimal::parse_wire_decimal;
use parlance_core::{DateTimeValue, DateValue, TimeDeltaValue, TimeValue, Value};

use crate::error::WireError;
use crate::lossy::{Lossy, LossyReport};
use crate::MAX_DEPTH;

/// A decoded response: the native value plus any lossy-conversion flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    pub lossy: LossyReport,
}

/// Decodes a wire tree into native values.
///
/// Scalars and `null` pass through, arrays map elementwise preserving order
/// and length, and objects carrying a `__class__` discriminator become the
/// matching typed value. Plain objects decode every child first and only
/// then re-check for a discriminator, so a tagged shape produced by
/// decoding children is still honored.
pub fn decode_response(wire: &serde_json::Value) -> Result<Decoded, WireError> {
    let mut lossy = LossyReport::new();
    let value = decode_value(wire, 0, &mut lossy)?;
    Ok(Decoded { value, lossy })
}

fn decode_value(
    wire: &serde_json::Value,
    depth: usize,
    lossy: &mut LossyReport,
) -> Result<Value, WireError> {
    if depth > MAX_DEPTH {
        return Err(WireError::DepthExceeded { limit: MAX_DEPTH });
    }
    match wire {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else {
                // u64 beyond i64::MAX, or fractional
                Ok(Value::Float(n.as_f64().unwrap_or(f64::MAX)))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(items) => {
            let decoded: Result<Vec<Value>, WireError> = items
                .iter()
                .map(|item| decode_value(item, depth + 1, lossy))
                .collect();
            Ok(Value::List(decoded?))
        }
        serde_json::Value::Object(entries) => {
            // Children first; the discriminator re-check runs on the result.
            let mut decoded = BTreeMap::new();
            for (key, child) in entries {
                decoded.insert(key.clone(), decode_value(child, depth + 1, lossy)?);
            }
            if let Some(Value::String(tag)) = decoded.get("__class__") {
                let tag = tag.clone();
                return decode_tagged(&tag, &decoded, lossy);
            }
            Ok(Value::Map(decoded))
        }
    }
}

/// Builds a typed value from a discriminated object's decoded fields.
///
/// Discriminators match case-insensitively; the closed set is
/// {decimal, date, datetime, time, timedelta, bytes}. Anything else is
/// [`WireError::UnsupportedTag`].
fn decode_tagged(
    tag: &str,
    fields: &BTreeMap<String, Value>,
    lossy: &mut LossyReport,
) -> Result<Value, WireError> {
    match tag.to_ascii_lowercase().as_str() {
        "decimal" => decode_decimal(fields, lossy),
        "date" => {
            let year = require_year(fields, "date")?;
            let month0 = require_wire_month(fields, "date")?;
            let day = require_int(fields, "date", "day")?;
            let day = u8::try_from(day).map_err(|_| malformed("date", "day out of range"))?;
            DateValue::new(year, month0, day)
                .map(Value::Date)
                .map_err(|e| malformed("date", &e.to_string()))
        }
        "datetime" => {
            let year = require_year(fields, "datetime")?;
            let month0 = require_wire_month(fields, "datetime")?;
            let day = clock_component("datetime", "day", require_int(fields, "datetime", "day")?)?;
            let hour = clock_component("datetime", "hour", int_or_zero(fields, "datetime", "hour")?)?;
            let minute =
                clock_component("datetime", "minute", int_or_zero(fields, "datetime", "minute")?)?;
            let second =
                clock_component("datetime", "second", int_or_zero(fields, "datetime", "second")?)?;
            let millisecond =
                millisecond_of(int_or_zero(fields, "datetime", "microsecond")?, "datetime", lossy)?;
            DateTimeValue::from_utc(year, month0, day, hour, minute, second, millisecond)
                .map(Value::DateTime)
                .map_err(|e| malformed("datetime", &e.to_string()))
        }
        "time" => {
            let hour = clock_component("time", "hour", int_or_zero(fields, "time", "hour")?)?;
            let minute = clock_component("time", "minute", int_or_zero(fields, "time", "minute")?)?;
            let second = clock_component("time", "second", int_or_zero(fields, "time", "second")?)?;
            let millisecond =
                millisecond_of(int_or_zero(fields, "time", "microsecond")?, "time", lossy)?;
            TimeValue::new(hour, minute, second, millisecond)
                .map(Value::Time)
                .map_err(|e| malformed("time", &e.to_string()))
        }
        "timedelta" => match fields.get("seconds") {
            Some(Value::Int(n)) => Ok(Value::TimeDelta(TimeDeltaValue::from_seconds(*n, 0))),
            Some(Value::Float(f)) if f.is_finite() => {
                let whole = f.trunc();
                let millis = ((f - whole) * 1_000.0).round() as i64;
                Ok(Value::TimeDelta(TimeDeltaValue::from_seconds(
                    whole as i64,
                    millis,
                )))
            }
            Some(other) => Err(malformed(
                "timedelta",
                &format!("'seconds' must be a number, got {}", other.type_name()),
            )),
            None => Err(malformed("timedelta", "missing 'seconds' field")),
        },
        "bytes" => {
            let encoded = require_str(fields, "bytes", "base64")?;
            BASE64
                .decode(encoded)
                .map(Value::Bytes)
                .map_err(|e| malformed("bytes", &format!("invalid base64: {}", e)))
        }
        _ => Err(WireError::UnsupportedTag {
            tag: tag.to_string(),
        }),
    }
}

fn decode_decimal(
    fields: &BTreeMap<String, Value>,
    lossy: &mut LossyReport,
) -> Result<Value, WireError> {
    match fields.get("decimal") {
        Some(Value::String(s)) => match parse_wire_decimal(s) {
            Some(d) => Ok(Value::Decimal(d)),
            None => {
                // Empty/garbage is the missing-value sentinel; a numeric
                // string that only failed on range is flagged as lossy.
                if !s.trim().is_empty() && s.trim().parse::<f64>().is_ok() {
                    lossy.record(Lossy::DecimalPrecision { literal: s.clone() });
                }
                Ok(Value::Null)
            }
        },
        Some(Value::Int(n)) => Ok(Value::Decimal(Decimal::from(*n))),
        Some(Value::Float(f)) => match Decimal::try_from(*f) {
            Ok(d) => Ok(Value::Decimal(d)),
            Err(_) => Ok(Value::Null),
        },
        Some(other) => Err(malformed(
            "decimal",
            &format!("'decimal' must be a string or number, got {}", other.type_name()),
        )),
        None => Err(malformed("decimal", "missing 'decimal' field")),
    }
}

// ── Field helpers ───────────────────────────────────────────────────

fn malformed(tag: &str, message: &str) -> WireError {
    WireError::Malformed {
        tag: tag.to_string(),
        message: message.to_string(),
    }
}

fn require_int(fields: &BTreeMap<String, Value>, tag: &str, name: &str) -> Result<i64, WireError> {
    match fields.get(name) {
        Some(Value::Int(n)) => Ok(*n),
        Some(other) => Err(malformed(
            tag,
            &format!("'{}' must be an integer, got {}", name, other.type_name()),
        )),
        None => Err(malformed(tag, &format!("missing '{}' field", name))),
    }
}

fn int_or_zero(fields: &BTreeMap<String, Value>, tag: &str, name: &str) -> Result<i64, WireError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Int(n)) => Ok(*n),
        Some(other) => Err(malformed(
            tag,
            &format!("'{}' must be an integer, got {}", name, other.type_name()),
        )),
    }
}

fn require_str<'a>(
    fields: &'a BTreeMap<String, Value>,
    tag: &str,
    name: &str,
) -> Result<&'a str, WireError> {
    match fields.get(name) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(malformed(
            tag,
            &format!("'{}' must be a string, got {}", name, other.type_name()),
        )),
        None => Err(malformed(tag, &format!("missing '{}' field", name))),
    }
}

fn require_year(fields: &BTreeMap<String, Value>, tag: &str) -> Result<i32, WireError> {
    let year = require_int(fields, tag, "year")?;
    i32::try_from(year).map_err(|_| malformed(tag, "year out of range"))
}

/// Reads the 1-based wire month and applies the ±1 conversion -- the one
/// place it happens on the decode path.
fn require_wire_month(fields: &BTreeMap<String, Value>, tag: &str) -> Result<u8, WireError> {
    let month = require_int(fields, tag, "month")?;
    if !(1..=12).contains(&month) {
        return Err(malformed(tag, "month out of range"));
    }
    Ok(month as u8 - 1)
}

fn clock_component(tag: &str, name: &str, raw: i64) -> Result<u8, WireError> {
    u8::try_from(raw).map_err(|_| malformed(tag, &format!("'{}' out of range", name)))
}

/// Converts wire microseconds to native milliseconds, flagging any
/// truncated sub-millisecond remainder.
fn millisecond_of(microsecond: i64, tag: &str, lossy: &mut LossyReport) -> Result<u16, WireError> {
    if microsecond % 1_000 != 0 {
        lossy.record(Lossy::SubMillisecond { microsecond });
    }
    u16::try_from(microsecond.div_euclid(1_000))
        .map_err(|_| malformed(tag, "'microsecond' out of range"))
}
