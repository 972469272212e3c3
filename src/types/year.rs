use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// First year the generator has observation data for.
pub const MIN_YEAR: i32 = 1979;
/// Last year offered for generation.
pub const MAX_YEAR: i32 = 2025;
/// Year pre-filled in the form.
pub const DEFAULT_YEAR: i32 = 2020;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Year {0} is outside the supported range {min}-{max}", min = MIN_YEAR, max = MAX_YEAR)]
pub struct YearOutOfRange(pub i32);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidYear {
    #[error("'{0}' is not a year")]
    NotANumber(String),

    #[error(transparent)]
    OutOfRange(#[from] YearOutOfRange),
}

/// A calendar year an AMY (actual meteorological year) file can be requested for.
///
/// Always within `MIN_YEAR..=MAX_YEAR`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct AmyYear(i32);

impl AmyYear {
    pub fn new(year: i32) -> Result<Self, YearOutOfRange> {
        if (MIN_YEAR..=MAX_YEAR).contains(&year) {
            Ok(Self(year))
        } else {
            Err(YearOutOfRange(year))
        }
    }

    /// Clips `year` into the supported range instead of rejecting it.
    pub fn clamped(year: i32) -> Self {
        Self(year.clamp(MIN_YEAR, MAX_YEAR))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl Default for AmyYear {
    fn default() -> Self {
        Self(DEFAULT_YEAR)
    }
}

impl TryFrom<i32> for AmyYear {
    type Error = YearOutOfRange;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for AmyYear {
    type Err = InvalidYear;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let year = s
            .trim()
            .parse::<i32>()
            .map_err(|_| InvalidYear::NotANumber(s.to_string()))?;
        Ok(Self::new(year)?)
    }
}

impl From<AmyYear> for i32 {
    fn from(value: AmyYear) -> Self {
        value.0
    }
}

impl Display for AmyYear {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}
