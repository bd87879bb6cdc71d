//! Validated domain primitives.
//!
//! - [`Email`]: an address that passed `validator`'s email rules.
//! - [`TimeOfDay`]: minutes since midnight, exchanged as zero-padded `"HH:MM"`.
//! - [`TimeRange`]: a half-open `[start, end)` interval with `start < end`.
//!
//! Times are compared as integers. A timetable slot stores `start_minute` and
//! `end_minute` columns, and the overlap predicate on them is identical to the
//! one [`TimeRange::overlaps`] applies in memory.
//!
//! ```ignore
//! use classbook_models::value_types::{TimeOfDay, TimeRange};
//!
//! let first: TimeRange = TimeRange::new("07:00".parse()?, "08:30".parse()?)?;
//! let second = TimeRange::new("08:30".parse()?, "09:30".parse()?)?;
//! assert!(!first.overlaps(&second));
//! ```

use serde::{Deserialize, Serialize, Serializer};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::ValidateEmail;

/// Error type for value type parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTypeError {
    InvalidEmail(String),
    InvalidTimeOfDay(String),
    /// The range is empty or reversed.
    InvalidTimeRange { start: TimeOfDay, end: TimeOfDay },
}

impl std::error::Error for ValueTypeError {}

impl fmt::Display for ValueTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            Self::InvalidTimeOfDay(msg) => write!(f, "Invalid time: {}", msg),
            Self::InvalidTimeRange { start, end } => write!(
                f,
                "Start time ({}) must be before end time ({})",
                start, end
            ),
        }
    }
}

// ============================================================================
// Email
// ============================================================================

/// A validated email address.
///
/// Values read back from the database are trusted; everything arriving over
/// the wire goes through [`Email::new`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[schema(value_type = String, format = "email", example = "teacher@school.test")]
pub struct Email(String);

impl Email {
    pub fn new(email: impl Into<String>) -> Result<Self, ValueTypeError> {
        let email = email.into().trim().to_lowercase();
        if email.is_empty() {
            return Err(ValueTypeError::InvalidEmail("email cannot be empty".into()));
        }
        if !email.validate_email() {
            return Err(ValueTypeError::InvalidEmail(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        Ok(Self(email))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Type<sqlx::Postgres> for Email {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for Email {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <String as Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
    }
}

impl PgHasArrayType for Email {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TimeOfDay
// ============================================================================

/// A wall-clock time with minute precision.
///
/// Stored as minutes since midnight (`0..=1439`) in an `INT4` column and
/// rendered as zero-padded `"HH:MM"` everywhere else. Ordering is numeric, so
/// `"9:00"`-style formatting quirks can never reorder two times.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[schema(value_type = String, example = "07:30")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    /// Last representable minute, 23:59.
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay(24 * 60 - 1);

    pub fn from_minutes(minutes: u16) -> Result<Self, ValueTypeError> {
        if minutes > Self::LAST_MINUTE.0 {
            return Err(ValueTypeError::InvalidTimeOfDay(format!(
                "{} minutes is past 23:59",
                minutes
            )));
        }
        Ok(Self(minutes))
    }

    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, ValueTypeError> {
        if hour > 23 || minute > 59 {
            return Err(ValueTypeError::InvalidTimeOfDay(format!(
                "{}:{} is not a valid time",
                hour, minute
            )));
        }
        Ok(Self(u16::from(hour) * 60 + u16::from(minute)))
    }

    #[inline]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    #[inline]
    pub const fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({})", self)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ValueTypeError;

    /// Accepts exactly `HH:MM`, both fields zero padded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueTypeError::InvalidTimeOfDay(format!("'{}' is not in HH:MM format", s));

        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(invalid());
        }
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute)
    }
}

impl TryFrom<i32> for TimeOfDay {
    type Error = ValueTypeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let minutes = u16::try_from(value).map_err(|_| {
            ValueTypeError::InvalidTimeOfDay(format!("{} minutes is out of range", value))
        })?;
        Self::from_minutes(minutes)
    }
}

impl From<TimeOfDay> for i32 {
    fn from(time: TimeOfDay) -> i32 {
        i32::from(time.0)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Type<sqlx::Postgres> for TimeOfDay {
    fn type_info() -> PgTypeInfo {
        <i32 as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <i32 as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for TimeOfDay {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as Encode<'q, sqlx::Postgres>>::encode_by_ref(&i32::from(*self), buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for TimeOfDay {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let minutes = <i32 as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(minutes)?)
    }
}

// ============================================================================
// TimeRange
// ============================================================================

/// A half-open interval `[start, end)` within one day.
///
/// Construction fails for empty or reversed ranges, so an overlap test can
/// never be handed a range that matches nothing or everything.
///
/// Both ends are [`TimeOfDay`] values, so the latest possible end is 23:59
/// and a range can never reach midnight. `"24:00"` is rejected at parse time
/// and the `end_minute` column is bounded the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeRange {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, ValueTypeError> {
        if start >= end {
            return Err(ValueTypeError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub const fn start(&self) -> TimeOfDay {
        self.start
    }

    #[inline]
    pub const fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    /// Half-open overlap: touching endpoints do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    mod email_tests {
        use super::*;

        #[test]
        fn test_valid_email_is_normalized() {
            let email = Email::new("  Teacher@School.TEST ").unwrap();
            assert_eq!(email.as_str(), "teacher@school.test");
        }

        #[test]
        fn test_invalid_emails() {
            assert!(Email::new("").is_err());
            assert!(Email::new("not-an-email").is_err());
            assert!("@school.test".parse::<Email>().is_err());
        }

        #[test]
        fn test_email_deserialize_validates() {
            let ok: Result<Email, _> = serde_json::from_str(r#""a@b.test""#);
            assert!(ok.is_ok());
            let bad: Result<Email, _> = serde_json::from_str(r#""nope""#);
            assert!(bad.is_err());
        }
    }

    mod time_of_day_tests {
        use super::*;

        #[test]
        fn test_parse_and_display() {
            let time = t("07:05");
            assert_eq!(time.minutes(), 425);
            assert_eq!(time.hour(), 7);
            assert_eq!(time.minute(), 5);
            assert_eq!(time.to_string(), "07:05");
        }

        #[test]
        fn test_parse_bounds() {
            assert_eq!(t("00:00"), TimeOfDay::MIDNIGHT);
            assert_eq!(t("23:59"), TimeOfDay::LAST_MINUTE);
            assert!("24:00".parse::<TimeOfDay>().is_err());
            assert!("12:60".parse::<TimeOfDay>().is_err());
        }

        #[test]
        fn test_parse_rejects_unpadded_and_garbage() {
            for input in ["7:30", "07:3", "0730", "07-30", "ab:cd", "+7:30", "07:30:00", ""] {
                assert!(input.parse::<TimeOfDay>().is_err(), "accepted {input:?}");
            }
        }

        #[test]
        fn test_ordering_is_numeric() {
            assert!(t("09:00") < t("10:00"));
            assert!(t("00:59") < t("01:00"));
        }

        #[test]
        fn test_try_from_i32() {
            assert_eq!(TimeOfDay::try_from(90).unwrap(), t("01:30"));
            assert!(TimeOfDay::try_from(-1).is_err());
            assert!(TimeOfDay::try_from(1440).is_err());
            assert_eq!(i32::from(t("01:30")), 90);
        }

        #[test]
        fn test_serde_uses_hh_mm() {
            let json = serde_json::to_string(&t("13:45")).unwrap();
            assert_eq!(json, r#""13:45""#);
            let back: TimeOfDay = serde_json::from_str(&json).unwrap();
            assert_eq!(back, t("13:45"));
            assert!(serde_json::from_str::<TimeOfDay>(r#""1:45""#).is_err());
        }
    }

    mod time_range_tests {
        use super::*;

        #[test]
        fn test_rejects_empty_and_reversed() {
            assert!(TimeRange::new(t("08:00"), t("08:00")).is_err());
            let err = TimeRange::new(t("09:00"), t("08:00")).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Start time (09:00) must be before end time (08:00)"
            );
        }

        #[test]
        fn test_overlap_half_open() {
            let first = TimeRange::new(t("07:00"), t("08:30")).unwrap();
            let touching = TimeRange::new(t("08:30"), t("09:30")).unwrap();
            let crossing = TimeRange::new(t("08:00"), t("09:00")).unwrap();
            let inside = TimeRange::new(t("07:15"), t("08:00")).unwrap();

            assert!(!first.overlaps(&touching));
            assert!(!touching.overlaps(&first));
            assert!(first.overlaps(&crossing));
            assert!(first.overlaps(&inside));
            assert!(inside.overlaps(&first));
            assert!(first.overlaps(&first));
        }

        #[test]
        fn test_latest_range_ends_one_minute_before_midnight() {
            let late = TimeRange::new(t("23:00"), TimeOfDay::LAST_MINUTE).unwrap();
            assert_eq!(late.duration_minutes(), 59);
            assert_eq!(i32::from(late.end()), 1439);
            assert!(TimeRange::new(TimeOfDay::LAST_MINUTE, TimeOfDay::LAST_MINUTE).is_err());
        }

        #[test]
        fn test_duration_and_display() {
            let range = TimeRange::new(t("07:00"), t("08:30")).unwrap();
            assert_eq!(range.duration_minutes(), 90);
            assert_eq!(range.to_string(), "07:00-08:30");
        }
    }
}
