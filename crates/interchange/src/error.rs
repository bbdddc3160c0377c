use thiserror::Error;

/// Errors during wire decoding or encoding.
///
/// These are fatal to the single call that produced them; the embedding
/// caller decides between abort and substitution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// A discriminated object with a missing or mistyped required field.
    #[error("malformed '{tag}' value: {message}")]
    Malformed { tag: String, message: String },
    /// A `__class__` outside the supported set.
    ///
    /// Policy: unknown discriminators are always an error, never a
    /// passthrough that would silently drop the typed fields.
    #[error("unsupported wire discriminator '{tag}'")]
    UnsupportedTag { tag: String },
    /// Input nesting beyond the fixed depth bound.
    #[error("input nesting exceeds depth limit of {limit}")]
    DepthExceeded { limit: usize },
    /// A native value with no JSON representation (non-finite float, or a
    /// duration too large for a JSON number).
    #[error("value not representable in JSON: {message}")]
    Unrepresentable { message: String },
}
