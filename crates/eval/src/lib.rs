//! Expression-tree evaluator for Parlance domain conditions.
//!
//! The server and stored view definitions express conditions as JSON
//! trees of tagged operator nodes (`{"__class__": "Eval", "v": "state",
//! "d": ""}`). This crate parses such trees and evaluates them against a
//! caller-supplied [`Context`] of variable bindings.
//!
//! Evaluation is a pure function of the node tree and the context: the
//! context is read-only and a failed call has no side effects. Any field
//! of a node may itself be a tagged node; children are always fully
//! resolved before their parent combines them, so `And`/`Or` do not
//! short-circuit.

pub mod context;
pub mod error;
pub mod eval;
pub mod node;

pub use context::Context;
pub use error::ExprError;
pub use node::{parse_expr, Expr};

use parlance_core::Value;

/// Maximum expression nesting depth accepted by the parser.
pub(crate) const MAX_DEPTH: usize = 128;

/// Parses and evaluates a wire expression in one call.
pub fn evaluate(node: &serde_json::Value, ctx: &Context) -> Result<Value, ExprError> {
    let expr = parse_expr(node)?;
    eval::eval_expr(&expr, ctx)
}
