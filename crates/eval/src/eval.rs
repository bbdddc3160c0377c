//! Tree-walking evaluation of parsed expressions.

use rust_decimal::Decimal;

use parlance_core::{DateTimeValue, DateValue, Value};

use crate::context::Context;
use crate::error::ExprError;
use crate::node::{DateSpec, DateTimeSpec, Expr};

/// Evaluates a parsed expression against a context.
///
/// Every child is resolved to a plain value before its parent combines
/// the results, so `And`/`Or` do not short-circuit and both branches of
/// an `If` are evaluated.
pub fn eval_expr(expr: &Expr, ctx: &Context) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::List(items) => {
            let values: Result<Vec<Value>, ExprError> =
                items.iter().map(|item| eval_expr(item, ctx)).collect();
            Ok(Value::List(values?))
        }
        Expr::Map(entries) => {
            let mut values = std::collections::BTreeMap::new();
            for (key, child) in entries {
                values.insert(key.clone(), eval_expr(child, ctx)?);
            }
            Ok(Value::Map(values))
        }
        Expr::Eval { name, default } => {
            let fallback = eval_expr(default, ctx)?;
            match ctx.get(name) {
                Some(v) => Ok(v.clone()),
                None => Ok(fallback),
            }
        }
        Expr::Not(v) => Ok(Value::Bool(!is_truthy(&eval_expr(v, ctx)?))),
        Expr::Bool(v) => {
            let value = eval_expr(v, ctx)?;
            Ok(Value::Bool(match &value {
                Value::Map(entries) => !entries.is_empty(),
                Value::List(items) => !items.is_empty(),
                other => is_truthy(other),
            }))
        }
        Expr::And(terms) => {
            let mut all = true;
            for term in terms {
                all &= is_truthy(&eval_expr(term, ctx)?);
            }
            Ok(Value::Bool(all))
        }
        Expr::Or(terms) => {
            let mut any = false;
            for term in terms {
                let value = eval_expr(term, ctx)?;
                // A mapping term only counts when non-empty.
                let truthy = match &value {
                    Value::Map(entries) => !entries.is_empty(),
                    other => is_truthy(other),
                };
                any |= truthy;
            }
            Ok(Value::Bool(any))
        }
        Expr::Equal(lhs, rhs) => {
            let a = eval_expr(lhs, ctx)?;
            let b = eval_expr(rhs, ctx)?;
            Ok(Value::Bool(loose_eq(&a, &b)))
        }
        Expr::Greater { lhs, rhs, or_equal } => {
            let a = as_number(&eval_expr(lhs, ctx)?)?;
            let b = as_number(&eval_expr(rhs, ctx)?)?;
            Ok(Value::Bool(if *or_equal { a >= b } else { a > b }))
        }
        Expr::Less { lhs, rhs, or_equal } => {
            let a = as_number(&eval_expr(lhs, ctx)?)?;
            let b = as_number(&eval_expr(rhs, ctx)?)?;
            Ok(Value::Bool(if *or_equal { a <= b } else { a < b }))
        }
        Expr::If {
            cond,
            then,
            otherwise,
        } => {
            let c = eval_expr(cond, ctx)?;
            let t = eval_expr(then, ctx)?;
            let e = eval_expr(otherwise, ctx)?;
            Ok(if is_truthy(&c) { t } else { e })
        }
        Expr::Get {
            target,
            key,
            default,
        } => {
            let target = eval_expr(target, ctx)?;
            let key = eval_expr(key, ctx)?;
            let fallback = eval_expr(default, ctx)?;
            let entries = target.as_map().ok_or_else(|| ExprError::Type {
                message: format!("cannot index a {}", target.type_name()),
            })?;
            // Numeric keys arrive as their string spelling.
            let key = match &key {
                Value::String(s) => s.clone(),
                Value::Int(n) => n.to_string(),
                other => {
                    return Err(ExprError::Type {
                        message: format!("mapping key must be a string, got {}", other.type_name()),
                    })
                }
            };
            Ok(entries.get(&key).cloned().unwrap_or(fallback))
        }
        Expr::In { container, needle } => {
            let container = eval_expr(container, ctx)?;
            let needle = eval_expr(needle, ctx)?;
            match &container {
                Value::List(items) => {
                    Ok(Value::Bool(items.iter().any(|item| loose_eq(item, &needle))))
                }
                Value::Map(entries) => {
                    let present = match &needle {
                        Value::String(s) => entries.contains_key(s),
                        // Numeric keys arrive as their string spelling.
                        Value::Int(n) => entries.contains_key(&n.to_string()),
                        _ => false,
                    };
                    Ok(Value::Bool(present))
                }
                other => Err(ExprError::Type {
                    message: format!("cannot test membership in a {}", other.type_name()),
                }),
            }
        }
        Expr::DateLit(spec) => Ok(Value::Date(eval_date(spec)?)),
        Expr::DateTimeLit(spec) => Ok(Value::DateTime(eval_datetime(spec)?)),
        Expr::Len(v) => {
            let value = eval_expr(v, ctx)?;
            let len = match &value {
                Value::String(s) => s.chars().count(),
                Value::List(items) => items.len(),
                Value::Map(entries) => entries.len(),
                Value::Bytes(b) => b.len(),
                other => {
                    return Err(ExprError::Type {
                        message: format!("cannot take the length of a {}", other.type_name()),
                    })
                }
            };
            Ok(Value::Int(len as i64))
        }
        Expr::DecimalLit(d) => Ok(Value::Decimal(*d)),
    }
}

fn eval_date(spec: &DateSpec) -> Result<DateValue, ExprError> {
    let base = DateValue::new(spec.year, spec.month0, spec.day)?;
    Ok(base.checked_add_delta(spec.delta_years, spec.delta_months, spec.delta_days)?)
}

fn eval_datetime(spec: &DateTimeSpec) -> Result<DateTimeValue, ExprError> {
    let base = DateTimeValue::from_utc(
        spec.year,
        spec.month0,
        spec.day,
        spec.hour,
        spec.minute,
        spec.second,
        0,
    )?;
    Ok(base.checked_add_delta(
        spec.delta_years,
        spec.delta_months,
        spec.delta_days,
        spec.delta_hours,
        spec.delta_minutes,
        spec.delta_seconds,
    )?)
}

/// Plain truthiness: empty/zero scalars are false, containers and typed
/// values are true.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(n) => *n != 0,
        Value::Float(f) => *f != 0.0 && !f.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Decimal(d) => !d.is_zero(),
        Value::Bytes(b) => !b.is_empty(),
        Value::Date(_)
        | Value::DateTime(_)
        | Value::Time(_)
        | Value::TimeDelta(_)
        | Value::List(_)
        | Value::Map(_) => true,
    }
}

/// Loose equality: exact matches, then cross-representation numeric
/// comparison (int/float/decimal, numeric strings, booleans as 0/1).
pub(crate) fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (numeric_of(a), numeric_of(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Numeric reading of a value for loose equality, if it has one.
fn numeric_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::Int(n) => Some(Decimal::from(*n)),
        Value::Float(f) => Decimal::try_from(*f).ok(),
        Value::Decimal(d) => Some(*d),
        Value::Bool(b) => Some(Decimal::from(*b as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric coercion for ordered comparison. Unlike [`numeric_of`], a
/// value with no numeric reading is a type error here, and null reads
/// as zero.
fn as_number(value: &Value) -> Result<Decimal, ExprError> {
    match value {
        Value::Null => Ok(Decimal::ZERO),
        other => numeric_of(other).ok_or_else(|| ExprError::Type {
            message: format!("cannot compare a {} numerically", other.type_name()),
        }),
    }
}
