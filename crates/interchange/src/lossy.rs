//! Lossy-conversion flags.
//!
//! Some values legal on one side of the wire cannot be carried on the
//! other. The codec completes the call and records what was dropped; the
//! caller decides whether that matters.

/// One lossy conversion observed during a decode or encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lossy {
    /// Wire microseconds truncated to the native millisecond grid.
    SubMillisecond { microsecond: i64 },
    /// Timedelta years/months dropped: the seconds-only wire form cannot
    /// carry calendar-length fields.
    CalendarDelta { years: i64, months: i64 },
    /// Decimal literal outside the 96-bit representable range, decoded to
    /// the missing-value sentinel.
    DecimalPrecision { literal: String },
}

/// Collector for [`Lossy`] flags, threaded through one codec call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LossyReport(Vec<Lossy>);

impl LossyReport {
    pub fn new() -> Self {
        LossyReport(Vec::new())
    }

    pub fn record(&mut self, flag: Lossy) {
        self.0.push(flag);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn flags(&self) -> &[Lossy] {
        &self.0
    }
}
