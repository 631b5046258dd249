//! Solar and lunar date types.

use serde::Serialize;
use std::fmt;

/// A Gregorian date as literally written by the caller (no timezone shift).
///
/// Fields may be 0 when the date came from a partial parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolarDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

/// A date in the Vietnamese lunisolar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LunarDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub is_leap_month: bool,
}

impl LunarDate {
    /// Degraded lunar date that simply repeats the solar fields.
    pub fn mirror(solar: SolarDate) -> Self {
        Self {
            day: solar.day,
            month: solar.month,
            year: solar.year,
            is_leap_month: false,
        }
    }

    /// `d/m/y` without the leap marker, as embedded in prompts.
    pub fn numeric(&self) -> String {
        format!("{}/{}/{}", self.day, self.month, self.year)
    }
}

/// `d/m/y`, or `d/m (nhuận)/y` for a leap month.
impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leap_month {
            write!(f, "{}/{} (nhuận)/{}", self.day, self.month, self.year)
        } else {
            write!(f, "{}/{}/{}", self.day, self.month, self.year)
        }
    }
}

/// Why a conversion degraded to the solar passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No day/month/year could be recognised in the input.
    Unparseable,
    /// Fields were recognised but do not form a real Gregorian date.
    InvalidDate,
    /// The date lies outside the years the calendar tables cover.
    OutOfRange,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FallbackReason::Unparseable => "unparseable date",
            FallbackReason::InvalidDate => "invalid calendar date",
            FallbackReason::OutOfRange => "date outside supported range",
        };
        f.write_str(text)
    }
}

/// Outcome of a solar → lunar conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LunarConversion {
    Converted { solar: SolarDate, lunar: LunarDate },
    Fallback { solar: SolarDate, reason: FallbackReason },
}

impl LunarConversion {
    pub fn solar(&self) -> SolarDate {
        match self {
            LunarConversion::Converted { solar, .. } | LunarConversion::Fallback { solar, .. } => {
                *solar
            }
        }
    }

    /// The lunar date, or the solar mirror for a fallback.
    pub fn lunar(&self) -> LunarDate {
        match self {
            LunarConversion::Converted { lunar, .. } => *lunar,
            LunarConversion::Fallback { solar, .. } => LunarDate::mirror(*solar),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LunarConversion::Fallback { .. })
    }
}
