use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTimeWindowError {
    #[error("expected HH:MM-HH:MM, got {0:?}")]
    Format(String),

    #[error("time out of range in {0:?}")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: u16,
    end: u16,
}

impl TimeWindow {
    pub fn new(start: u16, end: u16) -> Option<Self> {
        (start < MINUTES_PER_DAY && end < MINUTES_PER_DAY).then_some(Self { start, end })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// True when either window's start falls inside the other.
    /// Windows that only touch at an endpoint do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        (self.start <= other.start && other.start < self.end)
            || (other.start <= self.start && self.start < other.end)
    }
}

pub fn any_overlap(a: &[TimeWindow], b: &[TimeWindow]) -> bool {
    a.iter().any(|left| b.iter().any(|right| left.overlaps(right)))
}

fn parse_clock(raw: &str, field: &str) -> Result<u16, ParseTimeWindowError> {
    let bytes = field.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
    if !well_formed {
        return Err(ParseTimeWindowError::Format(raw.to_string()));
    }

    let digit = |i: usize| u16::from(bytes[i] - b'0');
    let hours = digit(0) * 10 + digit(1);
    let minutes = digit(3) * 10 + digit(4);
    if hours > 23 || minutes > 59 {
        return Err(ParseTimeWindowError::OutOfRange(raw.to_string()));
    }

    Ok(hours * 60 + minutes)
}

impl FromStr for TimeWindow {
    type Err = ParseTimeWindowError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (start, end) = raw
            .split_once('-')
            .ok_or_else(|| ParseTimeWindowError::Format(raw.to_string()))?;

        Ok(Self {
            start: parse_clock(raw, start)?,
            end: parse_clock(raw, end)?,
        })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start / 60,
            self.start % 60,
            self.end / 60,
            self.end % 60
        )
    }
}

impl Serialize for TimeWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeWindow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
