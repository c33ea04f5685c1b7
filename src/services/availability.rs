use std::sync::Arc;

use crate::errors::{EngineError, EngineResult};
use crate::models::{DateRange, Room};
use crate::store::IntervalStore;

/// Answers whether a room (or any room) is free for a stay. Read-only;
/// a store failure propagates rather than defaulting to "free".
#[derive(Clone)]
pub struct AvailabilityChecker {
    store: Arc<dyn IntervalStore>,
}

impl AvailabilityChecker {
    pub fn new(store: Arc<dyn IntervalStore>) -> Self {
        Self { store }
    }

    /// True iff no stored restriction overlaps the range. A room with no
    /// restrictions at all is free.
    pub async fn is_room_free(&self, room_id: i64, range: DateRange) -> EngineResult<bool> {
        let overlapping = self
            .store
            .count_overlapping(room_id, range)
            .await
            .map_err(EngineError::Store)?;
        Ok(overlapping == 0)
    }

    /// Every room with no overlapping restriction, computed as a set
    /// difference in the store.
    pub async fn find_free_rooms(&self, range: DateRange) -> EngineResult<Vec<Room>> {
        self.store
            .free_rooms(range)
            .await
            .map_err(EngineError::Store)
    }
}
