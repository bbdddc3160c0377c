//! Expression-node parsing.
//!
//! Wire expressions are JSON trees in which tagged objects are operator
//! nodes and everything else is literal data. Parsing front-loads all
//! structural validation so evaluation proper only sees well-formed nodes.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use parlance_core::decimal::parse_wire_decimal;
use parlance_core::Value;

use crate::error::ExprError;
use crate::MAX_DEPTH;

/// A parsed expression node.
///
/// Any field of a tagged node may itself be a tagged node; children are
/// parsed (and later evaluated) recursively, with plain JSON data as the
/// literal fast path.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    List(Vec<Expr>),
    Map(BTreeMap<String, Expr>),
    Eval { name: String, default: Box<Expr> },
    Not(Box<Expr>),
    Bool(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Equal(Box<Expr>, Box<Expr>),
    Greater { lhs: Box<Expr>, rhs: Box<Expr>, or_equal: bool },
    Less { lhs: Box<Expr>, rhs: Box<Expr>, or_equal: bool },
    If { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
    Get { target: Box<Expr>, key: Box<Expr>, default: Box<Expr> },
    In { container: Box<Expr>, needle: Box<Expr> },
    DateLit(DateSpec),
    DateTimeLit(DateTimeSpec),
    Len(Box<Expr>),
    DecimalLit(Decimal),
}

/// Fields of a `Date` literal node: components plus an additive delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpec {
    pub year: i32,
    pub month0: u8,
    pub day: u8,
    pub delta_years: i64,
    pub delta_months: i64,
    pub delta_days: i64,
}

/// Fields of a `DateTime` literal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeSpec {
    pub year: i32,
    pub month0: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub delta_years: i64,
    pub delta_months: i64,
    pub delta_days: i64,
    pub delta_hours: i64,
    pub delta_minutes: i64,
    pub delta_seconds: i64,
}

/// Parses a wire expression tree.
///
/// Tag dispatch is case-sensitive apart from the two legacy lower-case
/// aliases `date` and `datetime`. An object whose `__class__` is not a
/// string is plain data, not a node.
pub fn parse_expr(json: &serde_json::Value) -> Result<Expr, ExprError> {
    parse_at(json, 0)
}

fn parse_at(json: &serde_json::Value, depth: usize) -> Result<Expr, ExprError> {
    if depth > MAX_DEPTH {
        return Err(ExprError::DepthExceeded { limit: MAX_DEPTH });
    }
    match json {
        serde_json::Value::Null => Ok(Expr::Literal(Value::Null)),
        serde_json::Value::Bool(b) => Ok(Expr::Literal(Value::Bool(*b))),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Expr::Literal(Value::Int(i)))
            } else {
                Ok(Expr::Literal(Value::Float(n.as_f64().unwrap_or(f64::MAX))))
            }
        }
        serde_json::Value::String(s) => Ok(Expr::Literal(Value::String(s.clone()))),
        serde_json::Value::Array(items) => {
            let parsed: Result<Vec<Expr>, ExprError> =
                items.iter().map(|item| parse_at(item, depth + 1)).collect();
            Ok(Expr::List(parsed?))
        }
        serde_json::Value::Object(entries) => {
            match entries.get("__class__").and_then(|t| t.as_str()) {
                Some(tag) => parse_node(tag, entries, depth),
                None => {
                    let mut parsed = BTreeMap::new();
                    for (key, child) in entries {
                        parsed.insert(key.clone(), parse_at(child, depth + 1)?);
                    }
                    Ok(Expr::Map(parsed))
                }
            }
        }
    }
}

fn parse_node(
    tag: &str,
    fields: &serde_json::Map<String, serde_json::Value>,
    depth: usize,
) -> Result<Expr, ExprError> {
    match tag {
        "Eval" => {
            let name = require_str(fields, tag, "v")?.to_string();
            Ok(Expr::Eval {
                name,
                default: child_or_null(fields, "d", depth)?,
            })
        }
        "Not" => Ok(Expr::Not(require_child(fields, tag, "v", depth)?)),
        "Bool" => Ok(Expr::Bool(require_child(fields, tag, "v", depth)?)),
        "Len" => Ok(Expr::Len(require_child(fields, tag, "v", depth)?)),
        "And" | "Or" => {
            let terms = match fields.get("s") {
                Some(serde_json::Value::Array(items)) => items
                    .iter()
                    .map(|item| parse_at(item, depth + 1))
                    .collect::<Result<Vec<Expr>, ExprError>>()?,
                Some(_) => return Err(malformed(tag, "'s' must be an array")),
                None => return Err(malformed(tag, "missing 's' field")),
            };
            Ok(if tag == "And" {
                Expr::And(terms)
            } else {
                Expr::Or(terms)
            })
        }
        "Equal" => Ok(Expr::Equal(
            require_child(fields, tag, "s1", depth)?,
            require_child(fields, tag, "s2", depth)?,
        )),
        "Greater" | "Less" => {
            let lhs = require_child(fields, tag, "s1", depth)?;
            let rhs = require_child(fields, tag, "s2", depth)?;
            let or_equal = match fields.get("e") {
                None | Some(serde_json::Value::Null) => false,
                Some(serde_json::Value::Bool(b)) => *b,
                Some(_) => return Err(malformed(tag, "'e' must be a boolean")),
            };
            Ok(if tag == "Greater" {
                Expr::Greater { lhs, rhs, or_equal }
            } else {
                Expr::Less { lhs, rhs, or_equal }
            })
        }
        "If" => Ok(Expr::If {
            cond: require_child(fields, tag, "c", depth)?,
            then: require_child(fields, tag, "t", depth)?,
            otherwise: child_or_null(fields, "e", depth)?,
        }),
        "Get" => Ok(Expr::Get {
            target: require_child(fields, tag, "v", depth)?,
            key: require_child(fields, tag, "k", depth)?,
            default: child_or_null(fields, "d", depth)?,
        }),
        "In" => Ok(Expr::In {
            container: require_child(fields, tag, "v", depth)?,
            needle: require_child(fields, tag, "k", depth)?,
        }),
        "Date" | "date" => Ok(Expr::DateLit(parse_date_spec(fields, tag)?)),
        "DateTime" | "datetime" => Ok(Expr::DateTimeLit(parse_datetime_spec(fields, tag)?)),
        "Decimal" => {
            let literal = require_str(fields, tag, "decimal")?;
            match parse_wire_decimal(literal) {
                Some(d) => Ok(Expr::DecimalLit(d)),
                None => Err(malformed(tag, "'decimal' is not a decimal literal")),
            }
        }
        _ => Err(ExprError::UnsupportedNode {
            tag: tag.to_string(),
        }),
    }
}

fn parse_date_spec(
    fields: &serde_json::Map<String, serde_json::Value>,
    tag: &str,
) -> Result<DateSpec, ExprError> {
    let (year, month0, day) = calendar_components(fields, tag)?;
    Ok(DateSpec {
        year,
        month0,
        day,
        delta_years: delta(fields, tag, "dy")?,
        delta_months: delta(fields, tag, "dM")?,
        delta_days: delta(fields, tag, "dd")?,
    })
}

fn parse_datetime_spec(
    fields: &serde_json::Map<String, serde_json::Value>,
    tag: &str,
) -> Result<DateTimeSpec, ExprError> {
    let (year, month0, day) = calendar_components(fields, tag)?;
    Ok(DateTimeSpec {
        year,
        month0,
        day,
        hour: clock(fields, tag, &["h", "hour"])?,
        minute: clock(fields, tag, &["m", "minute"])?,
        second: clock(fields, tag, &["s", "second"])?,
        delta_years: delta(fields, tag, "dy")?,
        delta_months: delta(fields, tag, "dM")?,
        delta_days: delta(fields, tag, "dd")?,
        delta_hours: delta(fields, tag, "dh")?,
        delta_minutes: delta(fields, tag, "dm")?,
        delta_seconds: delta(fields, tag, "ds")?,
    })
}

/// Required year/month/day, each under a short or long name. Month is
/// 1-based on the wire and converted here.
fn calendar_components(
    fields: &serde_json::Map<String, serde_json::Value>,
    tag: &str,
) -> Result<(i32, u8, u8), ExprError> {
    let year = require_aliased_int(fields, tag, &["y", "year"])?;
    let year = i32::try_from(year).map_err(|_| malformed(tag, "year out of range"))?;
    let month = require_aliased_int(fields, tag, &["M", "month"])?;
    if !(1..=12).contains(&month) {
        return Err(malformed(tag, "month out of range"));
    }
    let day = require_aliased_int(fields, tag, &["d", "day"])?;
    let day = u8::try_from(day).map_err(|_| malformed(tag, "day out of range"))?;
    Ok((year, month as u8 - 1, day))
}

// ── Field helpers ───────────────────────────────────────────────────

fn malformed(tag: &str, message: &str) -> ExprError {
    ExprError::Malformed {
        message: format!("{}: {}", tag, message),
    }
}

fn require_child(
    fields: &serde_json::Map<String, serde_json::Value>,
    tag: &str,
    name: &str,
    depth: usize,
) -> Result<Box<Expr>, ExprError> {
    match fields.get(name) {
        Some(child) => Ok(Box::new(parse_at(child, depth + 1)?)),
        None => Err(malformed(tag, &format!("missing '{}' field", name))),
    }
}

fn child_or_null(
    fields: &serde_json::Map<String, serde_json::Value>,
    name: &str,
    depth: usize,
) -> Result<Box<Expr>, ExprError> {
    match fields.get(name) {
        Some(child) => Ok(Box::new(parse_at(child, depth + 1)?)),
        None => Ok(Box::new(Expr::Literal(Value::Null))),
    }
}

fn require_str<'a>(
    fields: &'a serde_json::Map<String, serde_json::Value>,
    tag: &str,
    name: &str,
) -> Result<&'a str, ExprError> {
    match fields.get(name) {
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(_) => Err(malformed(tag, &format!("'{}' must be a string", name))),
        None => Err(malformed(tag, &format!("missing '{}' field", name))),
    }
}

fn require_aliased_int(
    fields: &serde_json::Map<String, serde_json::Value>,
    tag: &str,
    names: &[&str],
) -> Result<i64, ExprError> {
    for name in names {
        if let Some(v) = fields.get(*name) {
            return v
                .as_i64()
                .ok_or_else(|| malformed(tag, &format!("'{}' must be an integer", name)));
        }
    }
    Err(malformed(tag, &format!("missing '{}' field", names[0])))
}

fn clock(
    fields: &serde_json::Map<String, serde_json::Value>,
    tag: &str,
    names: &[&str],
) -> Result<u8, ExprError> {
    for name in names {
        if let Some(v) = fields.get(*name) {
            let raw = v
                .as_i64()
                .ok_or_else(|| malformed(tag, &format!("'{}' must be an integer", name)))?;
            return u8::try_from(raw)
                .map_err(|_| malformed(tag, &format!("'{}' out of range", name)));
        }
    }
    Ok(0)
}

fn delta(
    fields: &serde_json::Map<String, serde_json::Value>,
    tag: &str,
    name: &str,
) -> Result<i64, ExprError> {
    match fields.get(name) {
        None | Some(serde_json::Value::Null) => Ok(0),
        Some(v) => v
            .as_i64()
            .ok_or_else(|| malformed(tag, &format!("'{}' must be an integer", name))),
    }
}
