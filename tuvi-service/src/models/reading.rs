//! Caller-supplied identity and the fixed trigram data set.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Birth information as submitted; only presence is checked, never format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: String,
    pub birth_date: String,
    pub birth_time: String,
}

/// One of the eight trigrams drawn for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hexagram {
    pub symbol: &'static str,
    pub name: &'static str,
    pub meaning: &'static str,
    pub description: &'static str,
}

impl Hexagram {
    /// Heading shown to the user, e.g. `Quẻ Càn - Trời`.
    pub fn title(&self) -> String {
        format!("Quẻ {} - {}", self.name, self.meaning)
    }
}

/// Horizon a reading covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingPeriod {
    Week,
    Month,
    Year,
}

impl ReadingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingPeriod::Week => "week",
            ReadingPeriod::Month => "month",
            ReadingPeriod::Year => "year",
        }
    }

    /// Vietnamese label embedded in the prompt.
    pub fn label(&self) -> &'static str {
        match self {
            ReadingPeriod::Week => "1 tuần",
            ReadingPeriod::Month => "1 tháng",
            ReadingPeriod::Year => "1 năm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reading period '{0}'")]
pub struct UnknownPeriod(pub String);

impl FromStr for ReadingPeriod {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(ReadingPeriod::Week),
            "month" => Ok(ReadingPeriod::Month),
            "year" => Ok(ReadingPeriod::Year),
            other => Err(UnknownPeriod(other.to_string())),
        }
    }
}
