//! Native value model for the Parlance RPC client.
//!
//! The business-object server speaks tagged JSON; client code works with the
//! typed values in this crate. `Value` is the closed native tree produced by
//! decoding a response and consumed when encoding a request. The temporal
//! types wrap `time` primitives and pin down the contracts the wire format
//! depends on: 0-based month indices on the native side, millisecond
//! precision for instants, and fixed ±10^8-day "no bound" sentinels.

pub mod decimal;
pub mod error;
pub mod temporal;
pub mod value;

pub use error::ValueError;
pub use temporal::{DateTimeValue, DateValue, TimeDeltaValue, TimeValue};
pub use value::Value;
