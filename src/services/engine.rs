use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::{EngineError, EngineResult};
use crate::models::{CalendarDayMap, DateRange, DayMap, NewReservation, Reservation, Room};
use crate::services::{AvailabilityChecker, CalendarProjector, Reconciler, SubmittedForm};
use crate::services::reconcile::ReconcileOutcome;
use crate::store::IntervalStore;

/// The crate's public face: availability checks, calendar projection,
/// block reconciliation and the guest-booking flow, all over one shared
/// store handle. Construct one per store and clone it freely.
#[derive(Clone)]
pub struct BookingEngine {
    store: Arc<dyn IntervalStore>,
    checker: AvailabilityChecker,
    projector: CalendarProjector,
    reconciler: Reconciler,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn IntervalStore>) -> Self {
        Self {
            checker: AvailabilityChecker::new(Arc::clone(&store)),
            projector: CalendarProjector::new(Arc::clone(&store)),
            reconciler: Reconciler::new(Arc::clone(&store)),
            store,
        }
    }

    pub async fn check_availability(
        &self,
        room_id: i64,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> EngineResult<bool> {
        let range = DateRange::new(check_in, check_out)?;
        self.checker.is_room_free(room_id, range).await
    }

    pub async fn find_available_rooms(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> EngineResult<Vec<Room>> {
        let range = DateRange::new(check_in, check_out)?;
        self.checker.find_free_rooms(range).await
    }

    /// The caller is responsible for caching the returned map (see
    /// [`crate::session::SessionState`]) so a later reconcile diffs
    /// against what this admin was actually shown.
    pub async fn render_month_calendar(
        &self,
        room_id: i64,
        year: i32,
        month: u32,
    ) -> EngineResult<CalendarDayMap> {
        self.projector.project_month(room_id, year, month).await
    }

    pub async fn reconcile_month_blocks(
        &self,
        room_id: i64,
        previous_block_map: &DayMap,
        form: &SubmittedForm,
    ) -> EngineResult<ReconcileOutcome> {
        self.reconciler
            .reconcile_month_blocks(room_id, previous_block_map, form)
            .await
    }

    /// Books a guest stay: availability check, then the reservation and
    /// its paired restriction. Returns the new reservation id.
    pub async fn book_room(&self, reservation: NewReservation) -> EngineResult<i64> {
        let range = reservation.range;
        let room_id = reservation.room_id;

        if !self.checker.is_room_free(room_id, range).await? {
            return Err(EngineError::Unavailable { room_id, range });
        }

        let reservation_id = self
            .store
            .insert_reservation(reservation)
            .await
            .map_err(EngineError::Store)?;
        self.store
            .insert_reservation_restriction(room_id, range, reservation_id)
            .await
            .map_err(EngineError::Store)?;

        tracing::info!(reservation_id, room_id, %range, "booked room");
        Ok(reservation_id)
    }

    pub async fn reservation(&self, id: i64) -> EngineResult<Reservation> {
        self.store
            .reservation(id)
            .await
            .map_err(EngineError::Store)?
            .ok_or_else(|| EngineError::NotFound(format!("reservation {id}")))
    }

    /// Removes a reservation and its paired restriction together.
    pub async fn delete_reservation(&self, id: i64) -> EngineResult<()> {
        let rows = self
            .store
            .delete_reservation(id)
            .await
            .map_err(EngineError::Store)?;
        if rows == 0 {
            return Err(EngineError::NotFound(format!("reservation {id}")));
        }
        tracing::info!(reservation_id = id, "deleted reservation");
        Ok(())
    }

    pub async fn mark_processed(&self, id: i64) -> EngineResult<()> {
        let rows = self
            .store
            .set_processed(id, true)
            .await
            .map_err(EngineError::Store)?;
        if rows == 0 {
            return Err(EngineError::NotFound(format!("reservation {id}")));
        }
        Ok(())
    }

    pub async fn rooms(&self) -> EngineResult<Vec<Room>> {
        self.store.all_rooms().await.map_err(EngineError::Store)
    }

    pub async fn room(&self, id: i64) -> EngineResult<Room> {
        self.store
            .room(id)
            .await
            .map_err(EngineError::Store)?
            .ok_or_else(|| EngineError::NotFound(format!("room {id}")))
    }
}
