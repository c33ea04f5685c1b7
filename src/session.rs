use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{CalendarDayMap, DayMap, Reservation};

/// Per-admin-session state the web layer keeps between requests: the
/// guest's in-progress reservation and the block map of each calendar
/// month as it was last shown to *this* session. Accessors are typed —
/// `Option` instead of the untyped cast a generic session store would
/// force on callers. One instance per session; never shared, so two
/// admins each diff against their own rendered view.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SessionState {
    reservation: Option<Reservation>,
    block_maps: HashMap<i64, DayMap>,
}

impl SessionState {
    pub fn reservation(&self) -> Option<&Reservation> {
        self.reservation.as_ref()
    }

    pub fn put_reservation(&mut self, reservation: Reservation) {
        self.reservation = Some(reservation);
    }

    pub fn take_reservation(&mut self) -> Option<Reservation> {
        self.reservation.take()
    }

    /// Remembers the rendered block map for the calendar's room,
    /// replacing whatever month was cached for that room before.
    pub fn cache_block_map(&mut self, calendar: &CalendarDayMap) {
        self.block_maps
            .insert(calendar.room_id, calendar.block_map.clone());
    }

    pub fn block_map(&self, room_id: i64) -> Option<&DayMap> {
        self.block_maps.get(&room_id)
    }

    pub fn clear_block_map(&mut self, room_id: i64) {
        self.block_maps.remove(&room_id);
    }
}
