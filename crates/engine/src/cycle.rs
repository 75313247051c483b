//! Monthly cycle tags (`"YYYY-MM"`) used to key ledger aggregates.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Calendar month a ledger aggregate row belongs to, rendered as `"YYYY-MM"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CycleTag {
    year: i32,
    month: u32,
}

impl CycleTag {
    /// Builds a tag, rejecting months outside `1..=12` and years outside `0..=9999`.
    pub fn new(year: i32, month: u32) -> Result<Self, EngineError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(EngineError::InvalidArgument(format!(
                "invalid cycle {year}-{month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The cycle a point in time falls into (UTC calendar month).
    #[must_use]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for CycleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for CycleTag {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidArgument(format!("invalid cycle tag: {s}"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for CycleTag {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CycleTag> for String {
    fn from(value: CycleTag) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn tag_from_datetime_is_zero_padded() {
        let at = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();
        assert_eq!(CycleTag::from_datetime(at).to_string(), "2025-03");
    }

    #[test]
    fn parse_round_trips() {
        let tag: CycleTag = "2024-12".parse().unwrap();
        assert_eq!(tag.year(), 2024);
        assert_eq!(tag.month(), 12);
        assert_eq!(tag.to_string(), "2024-12");
    }

    #[test]
    fn parse_rejects_malformed_tags() {
        for raw in ["2024-13", "2024-00", "2024-1", "24-01", "2024/01", "", "abcd-ef"] {
            assert!(raw.parse::<CycleTag>().is_err(), "{raw} should be rejected");
        }
    }
}
