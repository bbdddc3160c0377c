//! Tagged-JSON wire codec for the Parlance RPC client.
//!
//! The server exchanges JSON values in which domain types ride as tagged
//! objects: `{"__class__": "date", "year": 2024, "month": 3, "day": 15}`.
//! This crate converts such wire trees to native [`parlance_core::Value`]
//! trees and back.
//!
//! Both directions are pure, synchronous functions over immutable input;
//! a failed call leaves no partial state behind. Conversions that drop
//! information the other side cannot represent are not errors -- they are
//! collected in a [`LossyReport`] for the caller to inspect.

pub mod decode;
pub mod encode;
pub mod error;
pub mod lossy;

pub use decode::{decode_response, Decoded};
pub use encode::{encode_request, Encoded};
pub use error::WireError;
pub use lossy::{Lossy, LossyReport};

/// Maximum nesting depth accepted in either direction.
///
/// Recursion depth equals input tree depth; deeper input is rejected with
/// [`WireError::DepthExceeded`] instead of risking stack exhaustion.
pub(crate) const MAX_DEPTH: usize = 128;
