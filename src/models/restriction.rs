use serde::{Deserialize, Serialize};

use crate::models::DateRange;

/// A stored interval of unavailability for one room: either backed by a
/// guest reservation or an owner-placed block (maintenance and the like).
/// Restrictions for the same room never overlap; that is the invariant
/// everything else leans on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restriction {
    pub id: i64,
    pub room_id: i64,
    pub range: DateRange,
    /// `Some` means reservation-backed, `None` means owner block. The
    /// storage layer keeps the original 0-means-none sentinel; it never
    /// leaks past the row mapping.
    pub reservation_id: Option<i64>,
}

impl Restriction {
    pub fn is_block(&self) -> bool {
        self.reservation_id.is_none()
    }
}
