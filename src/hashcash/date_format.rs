use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HashcashError;

/// Date granularity of a stamp. Coarser granularity implies a longer validity window:
///
/// | format         | width | window              |
/// |----------------|-------|---------------------|
/// | `YY`           | 2     | never expires       |
/// | `YYMM`         | 4     | 2 years             |
/// | `YYMMDD`       | 6     | 2 months            |
/// | `YYMMDDhhmm`   | 10    | 2 days              |
/// | `YYMMDDhhmmss` | 12    | 2 minutes           |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    Yy,
    Yymm,
    Yymmdd,
    Yymmddhhmm,
    Yymmddhhmmss,
}

// Padding appended to a short date so that every width parses under the full pattern.
const FULL_PATTERN: &str = "%y%m%d%H%M%S";
const FULL_WIDTH: usize = 12;
const TAIL_PADDING: &str = "0101000000";

impl DateFormat {
    pub const ALL: [DateFormat; 5] = [
        DateFormat::Yy,
        DateFormat::Yymm,
        DateFormat::Yymmdd,
        DateFormat::Yymmddhhmm,
        DateFormat::Yymmddhhmmss,
    ];

    /// `strftime` pattern used to render the date field.
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::Yy => "%y",
            DateFormat::Yymm => "%y%m",
            DateFormat::Yymmdd => "%y%m%d",
            DateFormat::Yymmddhhmm => "%y%m%d%H%M",
            DateFormat::Yymmddhhmmss => FULL_PATTERN,
        }
    }

    /// Character width of the rendered date field.
    pub fn width(self) -> usize {
        match self {
            DateFormat::Yy => 2,
            DateFormat::Yymm => 4,
            DateFormat::Yymmdd => 6,
            DateFormat::Yymmddhhmm => 10,
            DateFormat::Yymmddhhmmss => 12,
        }
    }

    /// Infer the format from the width of a rendered date field.
    pub fn from_width(width: usize) -> Result<Self, HashcashError> {
        Self::ALL
            .into_iter()
            .find(|f| f.width() == width)
            .ok_or(HashcashError::InvalidDateFormat)
    }

    /// Age after which a stamp of this format is expired. `None` means it never expires.
    pub fn max_age(self) -> Option<TimeDelta> {
        match self {
            DateFormat::Yy => None,
            DateFormat::Yymm => Some(TimeDelta::days(2 * 365)),
            DateFormat::Yymmdd => Some(TimeDelta::days(2 * 30)),
            DateFormat::Yymmddhhmm => Some(TimeDelta::days(2)),
            DateFormat::Yymmddhhmmss => Some(TimeDelta::minutes(2)),
        }
    }

    /// Round `at` down to the start of the period this format can express.
    pub fn truncate(self, at: DateTime<Utc>) -> Result<DateTime<Utc>, HashcashError> {
        let (month, day, hour, minute, second) = match self {
            DateFormat::Yy => (1, 1, 0, 0, 0),
            DateFormat::Yymm => (at.month(), 1, 0, 0, 0),
            DateFormat::Yymmdd => (at.month(), at.day(), 0, 0, 0),
            DateFormat::Yymmddhhmm => (at.month(), at.day(), at.hour(), at.minute(), 0),
            DateFormat::Yymmddhhmmss => {
                (at.month(), at.day(), at.hour(), at.minute(), at.second())
            }
        };
        Utc.with_ymd_and_hms(at.year(), month, day, hour, minute, second)
            .single()
            .ok_or_else(|| HashcashError::InvalidDate(format!("cannot truncate {at}")))
    }

    /// Render `at` as a fixed-width date field.
    pub fn format(self, at: &DateTime<Utc>) -> String {
        at.format(self.pattern()).to_string()
    }

    /// Parse a date field rendered in this format.
    ///
    /// Two-digit years cover 1970 to 2069: `70..=99` map to the 1900s, the rest to the 2000s.
    pub fn parse(self, date: &str) -> Result<DateTime<Utc>, HashcashError> {
        if date.len() != self.width() || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HashcashError::InvalidDate(date.to_owned()));
        }
        let mut full = String::with_capacity(FULL_WIDTH);
        full.push_str(date);
        full.push_str(&TAIL_PADDING[self.width() - 2..]);
        let naive = NaiveDateTime::parse_from_str(&full, FULL_PATTERN)
            .map_err(|e| HashcashError::InvalidDate(format!("{date}: {e}")))?;
        Ok(naive.and_utc())
    }
}
