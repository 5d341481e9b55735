//! Self-validating setting value types
//!
//! Every configurable value in Twenty is a small wrapper type with a
//! canonical string form: parsing goes through the same constructor that
//! enforces the range invariant, so an out-of-range stored value fails the
//! same way a malformed one does. For every legal value `v`,
//! `parse(v.to_string()) == v`.

use crate::constants::{
    BREAK_MAX_SECONDS, BREAK_MIN_SECONDS, SESSION_MAX_MINUTES, SESSION_MIN_MINUTES,
};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A stored or user-supplied string does not conform to a setting's
/// grammar, or conforms but violates its range invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingParseError {
    #[error("invalid duration {raw:?}: expected an integer with '{unit}' suffix")]
    InvalidDuration { raw: String, unit: &'static str },
    #[error("{value}{unit} is outside the allowed range {min}{unit}-{max}{unit}")]
    OutOfRange {
        value: u32,
        min: u32,
        max: u32,
        unit: &'static str,
    },
    #[error("invalid clock time {0:?}: expected HH:MM")]
    InvalidClockTime(String),
    #[error("clock time carries a non-zero seconds component: {0}")]
    NonZeroSeconds(u8),
    #[error("unknown weekday {0:?}")]
    UnknownWeekday(String),
    #[error("invalid day set {0:?}: expected {{}} or {{DAY,DAY,...}}")]
    InvalidDaySet(String),
    #[error("invalid toggle {0:?}: expected \"true\" or \"false\"")]
    InvalidToggle(String),
    #[error("unknown look and feel {0:?}")]
    UnknownLookAndFeel(String),
}

fn parse_suffixed_u32(
    raw: &str,
    unit: &'static str,
) -> Result<u32, SettingParseError> {
    raw.strip_suffix(unit)
        // Digits only; u32::from_str alone would admit a leading '+'
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u32>().ok())
        .ok_or_else(|| SettingParseError::InvalidDuration {
            raw: raw.to_string(),
            unit,
        })
}

/// Break length in seconds. Canonical form `"20s"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BreakSeconds(u32);

impl BreakSeconds {
    pub const MIN: BreakSeconds = BreakSeconds(BREAK_MIN_SECONDS);
    pub const MAX: BreakSeconds = BreakSeconds(BREAK_MAX_SECONDS);

    /// Constant-context constructor for statically known values; panics
    /// when out of range. Runtime input goes through [`BreakSeconds::new`].
    pub const fn of(seconds: u32) -> Self {
        assert!(seconds >= BREAK_MIN_SECONDS && seconds <= BREAK_MAX_SECONDS);
        Self(seconds)
    }

    pub fn new(seconds: u32) -> Result<Self, SettingParseError> {
        if !(BREAK_MIN_SECONDS..=BREAK_MAX_SECONDS).contains(&seconds) {
            return Err(SettingParseError::OutOfRange {
                value: seconds,
                min: BREAK_MIN_SECONDS,
                max: BREAK_MAX_SECONDS,
                unit: "s",
            });
        }
        Ok(Self(seconds))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }

    /// Range bounds, for slider widgets.
    pub fn range() -> (u32, u32) {
        (BREAK_MIN_SECONDS, BREAK_MAX_SECONDS)
    }
}

impl fmt::Display for BreakSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl FromStr for BreakSeconds {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_suffixed_u32(s, "s")?)
    }
}

/// Screen session length in minutes. Canonical form `"20min"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionMinutes(u32);

impl SessionMinutes {
    pub const MIN: SessionMinutes = SessionMinutes(SESSION_MIN_MINUTES);
    pub const MAX: SessionMinutes = SessionMinutes(SESSION_MAX_MINUTES);

    /// Constant-context constructor for statically known values; panics
    /// when out of range. Runtime input goes through [`SessionMinutes::new`].
    pub const fn of(minutes: u32) -> Self {
        assert!(minutes >= SESSION_MIN_MINUTES && minutes <= SESSION_MAX_MINUTES);
        Self(minutes)
    }

    pub fn new(minutes: u32) -> Result<Self, SettingParseError> {
        if !(SESSION_MIN_MINUTES..=SESSION_MAX_MINUTES).contains(&minutes) {
            return Err(SettingParseError::OutOfRange {
                value: minutes,
                min: SESSION_MIN_MINUTES,
                max: SESSION_MAX_MINUTES,
                unit: "min",
            });
        }
        Ok(Self(minutes))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0) * 60)
    }

    pub fn range() -> (u32, u32) {
        (SESSION_MIN_MINUTES, SESSION_MAX_MINUTES)
    }
}

impl fmt::Display for SessionMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}min", self.0)
    }
}

impl FromStr for SessionMinutes {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_suffixed_u32(s, "min")?)
    }
}

/// A wall-clock time with hour and minute only. The type cannot represent
/// seconds or subseconds, so the zero-seconds invariant of the stored
/// format holds by construction; `from_hms` exists for callers holding a
/// full clock reading and rejects any non-zero seconds component.
///
/// Canonical form `"HH:MM"`, zero-padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalHmTime {
    hour: u8,
    minute: u8,
}

impl LocalHmTime {
    /// Constant-context constructor for statically known times; panics
    /// when out of range. Runtime input goes through [`LocalHmTime::new`].
    pub const fn at(hour: u8, minute: u8) -> Self {
        assert!(hour < 24 && minute < 60);
        Self { hour, minute }
    }

    pub fn new(hour: u8, minute: u8) -> Result<Self, SettingParseError> {
        if hour >= 24 || minute >= 60 {
            return Err(SettingParseError::InvalidClockTime(format!(
                "{hour}:{minute}"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn from_hms(hour: u8, minute: u8, second: u8) -> Result<Self, SettingParseError> {
        if second != 0 {
            return Err(SettingParseError::NonZeroSeconds(second));
        }
        Self::new(hour, minute)
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Minutes since midnight, for ordering against the current time.
    pub fn minutes_of_day(self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }
}

impl fmt::Display for LocalHmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for LocalHmTime {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SettingParseError::InvalidClockTime(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        // Fixed-width digit fields; rejects "21:00:30", "9:5", "+9:05",
        // signs and spaces
        if h.len() != 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour = h.parse::<u8>().map_err(|_| invalid())?;
        let minute = m.parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

/// Days of the week, Monday-first. The discriminant doubles as the
/// canonical ordering index for [`ActiveOn`] serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Weekday {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
            Weekday::Saturday => "SATURDAY",
            Weekday::Sunday => "SUNDAY",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| SettingParseError::UnknownWeekday(s.to_string()))
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        // num_days_from_monday is 0-based, matching ALL
        Weekday::ALL[day.num_days_from_monday() as usize]
    }
}

/// A set of weekdays, backed by a bitmask so membership is unique and
/// insertion order irrelevant by construction.
///
/// Canonical form: `"{}"` when empty, otherwise brace-delimited,
/// comma-separated day names in Monday-first order, e.g.
/// `"{MONDAY,WEDNESDAY}"`. One grammar covers zero through seven elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveOn(u8);

impl ActiveOn {
    /// The empty set (feature off on every day).
    pub const NONE: ActiveOn = ActiveOn(0);

    pub fn new<I>(days: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut set = ActiveOn(0);
        for day in days {
            set.insert(day);
        }
        set
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day as u8;
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !(1 << day as u8);
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day as u8) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates in canonical Monday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl fmt::Display for ActiveOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        let mut first = true;
        for day in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(day.as_str())?;
            first = false;
        }
        f.write_str("}")
    }
}

impl FromStr for ActiveOn {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| SettingParseError::InvalidDaySet(s.to_string()))?;
        if inner.is_empty() {
            return Ok(ActiveOn::NONE);
        }
        let mut set = ActiveOn(0);
        for token in inner.split(',') {
            set.insert(token.parse::<Weekday>()?);
        }
        Ok(set)
    }
}

impl FromIterator<Weekday> for ActiveOn {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        ActiveOn::new(iter)
    }
}

/// Boolean setting. Canonical form is the literal `"true"` / `"false"`;
/// nothing else parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Toggle(pub bool);

impl Toggle {
    pub fn get(self) -> bool {
        self.0
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 { "true" } else { "false" })
    }
}

impl FromStr for Toggle {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Toggle(true)),
            "false" => Ok(Toggle(false)),
            other => Err(SettingParseError::InvalidToggle(other.to_string())),
        }
    }
}

/// UI theme choice. The value is itself; canonical form is the variant
/// name verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookAndFeel {
    System,
    CrossPlatform,
    Metal,
    Nimbus,
}

impl LookAndFeel {
    pub const ALL: [LookAndFeel; 4] = [
        LookAndFeel::System,
        LookAndFeel::CrossPlatform,
        LookAndFeel::Metal,
        LookAndFeel::Nimbus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LookAndFeel::System => "SYSTEM",
            LookAndFeel::CrossPlatform => "CROSS_PLATFORM",
            LookAndFeel::Metal => "METAL",
            LookAndFeel::Nimbus => "NIMBUS",
        }
    }
}

impl fmt::Display for LookAndFeel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookAndFeel {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LookAndFeel::ALL
            .into_iter()
            .find(|laf| laf.as_str() == s)
            .ok_or_else(|| SettingParseError::UnknownLookAndFeel(s.to_string()))
    }
}

/// Tag identifying a setting variant. The settings metadata table maps
/// each preference key to one of these; [`SettingValue::parse_as`] is the
/// single dispatch point from tag to parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    BreakSeconds,
    SessionMinutes,
    LocalHmTime,
    ActiveOn,
    Toggle,
    LookAndFeel,
}

/// A parsed setting value of any variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    BreakSeconds(BreakSeconds),
    SessionMinutes(SessionMinutes),
    LocalHmTime(LocalHmTime),
    ActiveOn(ActiveOn),
    Toggle(Toggle),
    LookAndFeel(LookAndFeel),
}

impl SettingValue {
    /// Parse `raw` through the parser belonging to `kind`.
    pub fn parse_as(kind: SettingKind, raw: &str) -> Result<Self, SettingParseError> {
        Ok(match kind {
            SettingKind::BreakSeconds => SettingValue::BreakSeconds(raw.parse()?),
            SettingKind::SessionMinutes => SettingValue::SessionMinutes(raw.parse()?),
            SettingKind::LocalHmTime => SettingValue::LocalHmTime(raw.parse()?),
            SettingKind::ActiveOn => SettingValue::ActiveOn(raw.parse()?),
            SettingKind::Toggle => SettingValue::Toggle(raw.parse()?),
            SettingKind::LookAndFeel => SettingValue::LookAndFeel(raw.parse()?),
        })
    }

    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::BreakSeconds(_) => SettingKind::BreakSeconds,
            SettingValue::SessionMinutes(_) => SettingKind::SessionMinutes,
            SettingValue::LocalHmTime(_) => SettingKind::LocalHmTime,
            SettingValue::ActiveOn(_) => SettingKind::ActiveOn,
            SettingValue::Toggle(_) => SettingKind::Toggle,
            SettingValue::LookAndFeel(_) => SettingKind::LookAndFeel,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::BreakSeconds(v) => v.fmt(f),
            SettingValue::SessionMinutes(v) => v.fmt(f),
            SettingValue::LocalHmTime(v) => v.fmt(f),
            SettingValue::ActiveOn(v) => v.fmt(f),
            SettingValue::Toggle(v) => v.fmt(f),
            SettingValue::LookAndFeel(v) => v.fmt(f),
        }
    }
}
