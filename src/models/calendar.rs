use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Day-indexed id lookup for one month. 0 means nothing on that day;
/// real ids are always positive. Kept as a plain integer map because the
/// admin form round-trips these values as field names.
pub type DayMap = BTreeMap<NaiveDate, i64>;

/// What one room's month looks like: which reservation covers each day
/// and which owner block sits on each day. Built fresh per render and
/// cached in the admin session so reconciliation can diff against what
/// was actually shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDayMap {
    pub room_id: i64,
    pub year: i32,
    pub month: u32,
    pub reservation_map: DayMap,
    pub block_map: DayMap,
}

impl CalendarDayMap {
    /// Both maps zeroed for every day in `[first, last]`.
    pub fn zeroed(room_id: i64, year: i32, month: u32, first: NaiveDate, last: NaiveDate) -> Self {
        let days: DayMap = first
            .iter_days()
            .take_while(|d| *d <= last)
            .map(|d| (d, 0))
            .collect();
        Self {
            room_id,
            year,
            month,
            reservation_map: days.clone(),
            block_map: days,
        }
    }

    /// True when neither a reservation nor a block covers the day.
    pub fn is_open(&self, day: NaiveDate) -> bool {
        self.reservation_map.get(&day).copied().unwrap_or(0) == 0
            && self.block_map.get(&day).copied().unwrap_or(0) == 0
    }
}
