use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::{EngineError, EngineResult};
use crate::models::CalendarDayMap;
use crate::store::IntervalStore;

// ── Month arithmetic ──

pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn last_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = next_month(year, month);
    first_of_month(ny, nm)?.pred_opt()
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Builds the per-day occupancy view of one room's month.
#[derive(Clone)]
pub struct CalendarProjector {
    store: Arc<dyn IntervalStore>,
}

impl CalendarProjector {
    pub fn new(store: Arc<dyn IntervalStore>) -> Self {
        Self { store }
    }

    /// Every day of the month starts at 0 in both maps; each restriction
    /// intersecting the month then marks its days. Reservations mark
    /// check-in through checkout *inclusive* — the calendar deliberately
    /// shows the turnover day as occupied even though the booking rule
    /// treats it as free. Owner blocks are one row per day and mark only
    /// their check-in date.
    pub async fn project_month(
        &self,
        room_id: i64,
        year: i32,
        month: u32,
    ) -> EngineResult<CalendarDayMap> {
        let first = first_of_month(year, month)
            .ok_or_else(|| EngineError::InvalidRange(format!("{year}-{month:02} is not a calendar month")))?;
        let last = last_of_month(year, month)
            .ok_or_else(|| EngineError::InvalidRange(format!("{year}-{month:02} is not a calendar month")))?;

        self.store
            .room(room_id)
            .await
            .map_err(EngineError::Store)?
            .ok_or_else(|| EngineError::NotFound(format!("room {room_id}")))?;

        let mut calendar = CalendarDayMap::zeroed(room_id, year, month, first, last);

        let restrictions = self
            .store
            .restrictions_in_range(room_id, first, last)
            .await
            .map_err(EngineError::Store)?;

        for restriction in &restrictions {
            match restriction.reservation_id {
                Some(reservation_id) => {
                    for day in restriction.range.days_inclusive() {
                        if day < first {
                            continue;
                        }
                        if day > last {
                            break;
                        }
                        calendar.reservation_map.insert(day, reservation_id);
                    }
                }
                None => {
                    let day = restriction.range.check_in;
                    if day >= first && day <= last {
                        calendar.block_map.insert(day, restriction.id);
                    }
                }
            }
        }

        Ok(calendar)
    }
}
