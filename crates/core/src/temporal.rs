//! Typed calendar and clock values.
//!
//! These wrap `time` primitives and fix the contracts the wire codec relies
//! on. Native month indices are 0-based (the wire is 1-based; the ±1
//! conversion happens exactly once per direction, in the codec). Instants
//! carry millisecond precision -- the wire's microsecond field is always a
//! whole multiple of 1000 on the way out. The `MIN`/`MAX` sentinels sit at
//! exactly ±100 000 000 days from the Unix epoch and are used by callers as
//! "no bound" markers.

use rust_decimal::Decimal;
use time::macros::{date, datetime};
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::error::ValueError;

/// A calendar date with no time-of-day component.
///
/// The constructor takes a 0-based month index (March is 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateValue(Date);

impl DateValue {
    /// "No lower bound" sentinel: 100 000 000 days before the Unix epoch.
    pub const MIN: DateValue = DateValue(date!(-271821 - 04 - 20));
    /// "No upper bound" sentinel: 100 000 000 days after the Unix epoch.
    pub const MAX: DateValue = DateValue(date!(+275760 - 09 - 13));

    pub fn new(year: i32, month0: u8, day: u8) -> Result<Self, ValueError> {
        if month0 > 11 {
            return Err(ValueError::ComponentRange { component: "month" });
        }
        let month = Month::try_from(month0 + 1)
            .map_err(|_| ValueError::ComponentRange { component: "month" })?;
        Date::from_calendar_date(year, month, day)
            .map(DateValue)
            .map_err(|e| ValueError::ComponentRange { component: e.name() })
    }

    pub fn from_date(date: Date) -> Self {
        DateValue(date)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 0-based month index (January is 0).
    pub fn month0(&self) -> u8 {
        self.0.month() as u8 - 1
    }

    pub fn day(&self) -> u8 {
        self.0.day()
    }

    pub fn date(&self) -> Date {
        self.0
    }

    /// Adds a signed (years, months, days) delta.
    ///
    /// Year and month steps clamp the day to the end of the target month
    /// before the day offset applies, so Jan 31 + 1 month is Feb 28 (or 29),
    /// never Mar 3.
    pub fn checked_add_delta(
        &self,
        years: i64,
        months: i64,
        days: i64,
    ) -> Result<Self, ValueError> {
        let shifted = if years != 0 || months != 0 {
            let total = (self.0.year() as i64)
                .checked_mul(12)
                .and_then(|m| m.checked_add(self.month0() as i64))
                .and_then(|m| years.checked_mul(12).and_then(|y| m.checked_add(y)))
                .and_then(|m| m.checked_add(months))
                .ok_or(ValueError::Overflow)?;
            let year = total.div_euclid(12);
            if year < i32::MIN as i64 || year > i32::MAX as i64 {
                return Err(ValueError::Overflow);
            }
            let month = Month::try_from(total.rem_euclid(12) as u8 + 1)
                .map_err(|_| ValueError::Overflow)?;
            let day = self
                .0
                .day()
                .min(time::util::days_in_year_month(year as i32, month));
            Date::from_calendar_date(year as i32, month, day).map_err(|_| ValueError::Overflow)?
        } else {
            self.0
        };
        let day_seconds = days.checked_mul(86_400).ok_or(ValueError::Overflow)?;
        shifted
            .checked_add(Duration::seconds(day_seconds))
            .map(DateValue)
            .ok_or(ValueError::Overflow)
    }
}

/// An instant with millisecond precision.
///
/// Stored offset-aware; every accessor reports the UTC-normalized view,
/// because the wire is always UTC regardless of how the value was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTimeValue(OffsetDateTime);

impl DateTimeValue {
    /// "No lower bound" sentinel: 100 000 000 days before the Unix epoch.
    pub const MIN: DateTimeValue = DateTimeValue(datetime!(-271821 - 04 - 20 0:00 UTC));
    /// "No upper bound" sentinel: 100 000 000 days after the Unix epoch.
    pub const MAX: DateTimeValue = DateTimeValue(datetime!(+275760 - 09 - 13 0:00 UTC));

    /// Constructs directly in UTC. Month is 0-based.
    #[allow(clippy::too_many_arguments)]
    pub fn from_utc(
        year: i32,
        month0: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
    ) -> Result<Self, ValueError> {
        Self::from_offset(
            year,
            month0,
            day,
            hour,
            minute,
            second,
            millisecond,
            UtcOffset::UTC,
        )
    }

    /// Constructs at an explicit UTC offset.
    ///
    /// A pure library cannot consult an ambient local timezone, so "local"
    /// construction takes the offset from the caller; the stored value is
    /// normalized to UTC either way.
    #[allow(clippy::too_many_arguments)]
    pub fn from_offset(
        year: i32,
        month0: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        offset: UtcOffset,
    ) -> Result<Self, ValueError> {
        let date = DateValue::new(year, month0, day)?;
        let time = TimeValue::new(hour, minute, second, millisecond)?;
        PrimitiveDateTime::new(date.date(), time.time())
            .assume_offset(offset)
            .checked_to_offset(UtcOffset::UTC)
            .map(DateTimeValue)
            .ok_or(ValueError::Overflow)
    }

    /// Merges a date's calendar fields with a time's time-of-day fields.
    pub fn combine(date: &DateValue, time: &TimeValue) -> Self {
        DateTimeValue(PrimitiveDateTime::new(date.date(), time.time()).assume_utc())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 0-based month index (January is 0).
    pub fn month0(&self) -> u8 {
        self.0.month() as u8 - 1
    }

    pub fn day(&self) -> u8 {
        self.0.day()
    }

    pub fn hour(&self) -> u8 {
        self.0.hour()
    }

    pub fn minute(&self) -> u8 {
        self.0.minute()
    }

    pub fn second(&self) -> u8 {
        self.0.second()
    }

    pub fn millisecond(&self) -> u16 {
        self.0.millisecond()
    }

    /// The calendar part of the UTC view.
    pub fn date_value(&self) -> DateValue {
        DateValue(self.0.date())
    }

    /// The time-of-day part of the UTC view.
    pub fn time_value(&self) -> TimeValue {
        TimeValue(self.0.time())
    }

    /// Adds a signed calendar/clock delta, with the same month-end clamping
    /// as [`DateValue::checked_add_delta`].
    #[allow(clippy::too_many_arguments)]
    pub fn checked_add_delta(
        &self,
        years: i64,
        months: i64,
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    ) -> Result<Self, ValueError> {
        let date = self.date_value().checked_add_delta(years, months, days)?;
        let base = PrimitiveDateTime::new(date.date(), self.0.time()).assume_utc();
        let clock_seconds = hours
            .checked_mul(3_600)
            .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(seconds))
            .ok_or(ValueError::Overflow)?;
        base.checked_add(Duration::seconds(clock_seconds))
            .map(DateTimeValue)
            .ok_or(ValueError::Overflow)
    }
}

/// A time of day with millisecond precision and no date component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeValue(Time);

impl TimeValue {
    pub fn new(hour: u8, minute: u8, second: u8, millisecond: u16) -> Result<Self, ValueError> {
        Time::from_hms_milli(hour, minute, second, millisecond)
            .map(TimeValue)
            .map_err(|e| ValueError::ComponentRange { component: e.name() })
    }

    pub fn hour(&self) -> u8 {
        self.0.hour()
    }

    pub fn minute(&self) -> u8 {
        self.0.minute()
    }

    pub fn second(&self) -> u8 {
        self.0.second()
    }

    pub fn millisecond(&self) -> u16 {
        self.0.millisecond()
    }

    pub fn time(&self) -> Time {
        self.0
    }
}

/// A signed duration.
///
/// The calendar fields (years, months) are kept apart from the fixed-length
/// fields because the wire format collapses to total seconds and cannot
/// carry them; the encoder flags nonzero calendar fields as lossy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TimeDeltaValue {
    years: i64,
    months: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    milliseconds: i64,
}

impl TimeDeltaValue {
    pub fn new(years: i64, months: i64, days: i64, hours: i64, minutes: i64, seconds: i64) -> Self {
        TimeDeltaValue {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
            milliseconds: 0,
        }
    }

    pub fn from_weeks_days_millis(weeks: i64, days: i64, milliseconds: i64) -> Self {
        TimeDeltaValue {
            days: weeks.saturating_mul(7).saturating_add(days),
            milliseconds,
            ..Default::default()
        }
    }

    pub fn from_seconds(seconds: i64, milliseconds: i64) -> Self {
        TimeDeltaValue {
            seconds,
            milliseconds,
            ..Default::default()
        }
    }

    pub fn years(&self) -> i64 {
        self.years
    }

    pub fn months(&self) -> i64 {
        self.months
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn hours(&self) -> i64 {
        self.hours
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn milliseconds(&self) -> i64 {
        self.milliseconds
    }

    /// True when the duration carries years or months, which the seconds-only
    /// wire form cannot represent.
    pub fn has_calendar_component(&self) -> bool {
        self.years != 0 || self.months != 0
    }

    /// Total seconds of the fixed-length fields.
    ///
    /// Years and months are excluded; callers that encode must check
    /// [`has_calendar_component`](Self::has_calendar_component) and flag the
    /// loss.
    pub fn total_seconds(&self) -> Decimal {
        Decimal::from(self.days) * Decimal::from(86_400)
            + Decimal::from(self.hours) * Decimal::from(3_600)
            + Decimal::from(self.minutes) * Decimal::from(60)
            + Decimal::from(self.seconds)
            + Decimal::from(self.milliseconds) / Decimal::from(1_000)
    }
}
