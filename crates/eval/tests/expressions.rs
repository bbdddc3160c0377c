//! End-to-end evaluation of wire expression trees.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::json;

use parlance_core::Value;
use parlance_eval::{evaluate, Context, ExprError};

fn eval(node: serde_json::Value) -> Value {
    evaluate(&node, &Context::new()).unwrap()
}

#[test]
fn eval_falls_back_when_unbound() {
    let node = json!({"__class__": "Eval", "v": "x", "d": "fallback"});
    assert_eq!(eval(node.clone()), Value::from("fallback"));

    let mut ctx = Context::new();
    ctx.insert("x", "present");
    assert_eq!(evaluate(&node, &ctx).unwrap(), Value::from("present"));
}

#[test]
fn eval_bound_null_beats_the_default() {
    let node = json!({"__class__": "Eval", "v": "x", "d": "fallback"});
    let mut ctx = Context::new();
    ctx.insert("x", Value::Null);
    assert_eq!(evaluate(&node, &ctx).unwrap(), Value::Null);
}

#[test]
fn and_folds_all_terms() {
    assert_eq!(
        eval(json!({"__class__": "And", "s": [true, true, false]})),
        Value::Bool(false)
    );
    assert_eq!(
        eval(json!({"__class__": "And", "s": [true, 1, "x"]})),
        Value::Bool(true)
    );
    assert_eq!(eval(json!({"__class__": "And", "s": []})), Value::Bool(true));
}

#[test]
fn or_treats_empty_mapping_as_false() {
    assert_eq!(
        eval(json!({"__class__": "Or", "s": [false, {}]})),
        Value::Bool(false)
    );
    assert_eq!(
        eval(json!({"__class__": "Or", "s": [false, {"a": 1}]})),
        Value::Bool(true)
    );
    assert_eq!(eval(json!({"__class__": "Or", "s": []})), Value::Bool(false));
}

#[test]
fn not_negates_truthiness() {
    assert_eq!(eval(json!({"__class__": "Not", "v": 0})), Value::Bool(true));
    assert_eq!(
        eval(json!({"__class__": "Not", "v": "x"})),
        Value::Bool(false)
    );
}

#[test]
fn bool_checks_container_emptiness() {
    assert_eq!(eval(json!({"__class__": "Bool", "v": []})), Value::Bool(false));
    assert_eq!(eval(json!({"__class__": "Bool", "v": [0]})), Value::Bool(true));
    assert_eq!(eval(json!({"__class__": "Bool", "v": {}})), Value::Bool(false));
    assert_eq!(eval(json!({"__class__": "Bool", "v": 3})), Value::Bool(true));
}

#[test]
fn equal_is_loose() {
    assert_eq!(
        eval(json!({"__class__": "Equal", "s1": 5, "s2": "5"})),
        Value::Bool(true)
    );
    assert_eq!(
        eval(json!({"__class__": "Equal", "s1": [1, 2], "s2": [1, 2]})),
        Value::Bool(true)
    );
    assert_eq!(
        eval(json!({"__class__": "Equal", "s1": "a", "s2": "b"})),
        Value::Bool(false)
    );
}

#[test]
fn greater_honors_the_or_equal_flag() {
    assert_eq!(
        eval(json!({"__class__": "Greater", "s1": 5, "s2": 5, "e": true})),
        Value::Bool(true)
    );
    assert_eq!(
        eval(json!({"__class__": "Greater", "s1": 5, "s2": 5})),
        Value::Bool(false)
    );
    assert_eq!(
        eval(json!({"__class__": "Less", "s1": 3, "s2": "4.5"})),
        Value::Bool(true)
    );
}

#[test]
fn greater_rejects_non_numeric_operands() {
    let err = evaluate(
        &json!({"__class__": "Greater", "s1": [1], "s2": 2}),
        &Context::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ExprError::Type { .. }));
}

#[test]
fn if_selects_by_condition_truthiness() {
    assert_eq!(
        eval(json!({"__class__": "If", "c": 1, "t": "yes", "e": "no"})),
        Value::from("yes")
    );
    assert_eq!(
        eval(json!({"__class__": "If", "c": "", "t": "yes", "e": "no"})),
        Value::from("no")
    );
}

#[test]
fn get_indexes_mappings_with_default() {
    let node = json!({"__class__": "Get", "v": {"a": 1}, "k": "a", "d": 0});
    assert_eq!(eval(node), Value::Int(1));
    let node = json!({"__class__": "Get", "v": {"a": 1}, "k": "b", "d": 0});
    assert_eq!(eval(node), Value::Int(0));
}

#[test]
fn get_coerces_numeric_keys_to_their_string_spelling() {
    let node = json!({"__class__": "Get", "v": {"1": 42}, "k": 1, "d": 0});
    assert_eq!(eval(node), Value::Int(42));
    let node = json!({"__class__": "Get", "v": {"1": 42}, "k": 2, "d": 0});
    assert_eq!(eval(node), Value::Int(0));
}

#[test]
fn get_rejects_non_mapping_target() {
    let err = evaluate(
        &json!({"__class__": "Get", "v": [1, 2], "k": "a"}),
        &Context::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ExprError::Type { .. }));
}

#[test]
fn in_checks_sequence_values_and_mapping_keys() {
    assert_eq!(
        eval(json!({"__class__": "In", "v": [1, 2, 3], "k": 2})),
        Value::Bool(true)
    );
    assert_eq!(
        eval(json!({"__class__": "In", "v": [1, 2, 3], "k": 9})),
        Value::Bool(false)
    );
    assert_eq!(
        eval(json!({"__class__": "In", "v": {"a": 1}, "k": "a"})),
        Value::Bool(true)
    );
    assert_eq!(
        eval(json!({"__class__": "In", "v": {"a": 1}, "k": "b"})),
        Value::Bool(false)
    );
}

#[test]
fn len_counts_elements() {
    assert_eq!(eval(json!({"__class__": "Len", "v": [1, 2, 3]})), Value::Int(3));
    assert_eq!(
        eval(json!({"__class__": "Len", "v": {"a": 1, "b": 2}})),
        Value::Int(2)
    );
    assert_eq!(eval(json!({"__class__": "Len", "v": "héllo"})), Value::Int(5));
}

#[test]
fn decimal_node_yields_exact_decimal() {
    assert_eq!(
        eval(json!({"__class__": "Decimal", "decimal": "19.99"})),
        Value::Decimal(Decimal::from_str("19.99").unwrap())
    );
}

#[test]
fn date_literal_with_delta_clamps_to_month_end() {
    // Jan 31 plus one month lands on the last day of February.
    let node = json!({"__class__": "Date", "y": 2023, "M": 1, "d": 31, "dM": 1});
    match eval(node) {
        Value::Date(d) => assert_eq!((d.year(), d.month0(), d.day()), (2023, 1, 28)),
        other => panic!("expected date, got {}", other.type_name()),
    }
}

#[test]
fn datetime_literal_with_clock_delta() {
    let node = json!({
        "__class__": "DateTime",
        "y": 2024, "M": 3, "d": 15, "h": 23, "ds": 3_600
    });
    match eval(node) {
        Value::DateTime(dt) => {
            assert_eq!((dt.day(), dt.hour()), (16, 0));
        }
        other => panic!("expected datetime, got {}", other.type_name()),
    }
}

#[test]
fn lowercase_aliases_are_honored() {
    assert!(matches!(
        eval(json!({"__class__": "date", "y": 2024, "M": 1, "d": 1})),
        Value::Date(_)
    ));
    assert!(matches!(
        eval(json!({"__class__": "datetime", "y": 2024, "M": 1, "d": 1})),
        Value::DateTime(_)
    ));
}

#[test]
fn unknown_tag_is_an_explicit_error() {
    let err = evaluate(&json!({"__class__": "Concat", "s": []}), &Context::new()).unwrap_err();
    assert_eq!(
        err,
        ExprError::UnsupportedNode {
            tag: "Concat".to_string()
        }
    );
}

#[test]
fn nested_nodes_resolve_inside_out() {
    let mut ctx = Context::new();
    ctx.insert("state", "posted");
    let node = json!({
        "__class__": "And",
        "s": [
            {"__class__": "Equal", "s1": {"__class__": "Eval", "v": "state", "d": ""}, "s2": "posted"},
            {"__class__": "Not", "v": {"__class__": "Eval", "v": "locked", "d": false}},
        ]
    });
    assert_eq!(evaluate(&node, &ctx).unwrap(), Value::Bool(true));
}

#[test]
fn evaluation_does_not_mutate_the_context() {
    let mut ctx = Context::new();
    ctx.insert("x", 1i64);
    let before = ctx.clone();
    let _ = evaluate(&json!({"__class__": "Eval", "v": "x", "d": 0}), &ctx);
    let _ = evaluate(&json!({"__class__": "Get", "v": 5, "k": "a"}), &ctx);
    assert_eq!(ctx, before);
}
