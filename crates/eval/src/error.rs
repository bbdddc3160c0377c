use thiserror::Error;

/// Errors from parsing or evaluating an expression tree.
///
/// Scoped to the single `evaluate` call that produced them; the context
/// mapping is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// A `__class__` tag outside the supported node set.
    #[error("unsupported expression node '{tag}'")]
    UnsupportedNode { tag: String },
    /// A known node with missing or mistyped fields.
    #[error("malformed expression node: {message}")]
    Malformed { message: String },
    /// Operands a node cannot coerce (non-numeric comparison operands,
    /// indexing a non-mapping, taking the length of a scalar).
    #[error("type error: {message}")]
    Type { message: String },
    /// Input nesting beyond the fixed depth bound.
    #[error("expression nesting exceeds depth limit of {limit}")]
    DepthExceeded { limit: usize },
    /// A date/datetime literal whose components or delta do not form a
    /// valid instant.
    #[error(transparent)]
    Value(#[from] parlance_core::ValueError),
}
