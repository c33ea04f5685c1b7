use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// A stay as a half-open interval `[check_in, check_out)`. The checkout
/// date is not an occupied night, so one guest leaving and another
/// arriving on the same day never conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl DateRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> EngineResult<Self> {
        if check_in >= check_out {
            return Err(EngineError::InvalidRange(format!(
                "check-in {check_in} must be before check-out {check_out}"
            )));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// The one-night range `[day, day + 1)` used for calendar blocks.
    pub fn single_day(day: NaiveDate) -> EngineResult<Self> {
        let next = day
            .succ_opt()
            .ok_or_else(|| EngineError::InvalidRange(format!("no day after {day}")))?;
        Self::new(day, next)
    }

    /// Strict on both ends: ranges that merely share a boundary date do
    /// not overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Every date from check-in through check-out, checkout included.
    /// This is the display walk, not the conflict rule.
    pub fn days_inclusive(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.check_out;
        self.check_in.iter_days().take_while(move |d| *d <= last)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.check_in, self.check_out)
    }
}
