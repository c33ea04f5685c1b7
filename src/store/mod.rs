pub mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{DateRange, NewReservation, Reservation, Restriction, Room};

/// Read/write seam over restriction storage. The engine only ever talks
/// to storage through this trait; errors pass through untouched so the
/// caller can wrap them without losing the backend's detail.
#[async_trait]
pub trait IntervalStore: Send + Sync {
    async fn all_rooms(&self) -> anyhow::Result<Vec<Room>>;

    async fn room(&self, room_id: i64) -> anyhow::Result<Option<Room>>;

    /// Rooms with no restriction overlapping `range`.
    async fn free_rooms(&self, range: DateRange) -> anyhow::Result<Vec<Room>>;

    /// How many restrictions on the room conflict with `range`.
    async fn count_overlapping(&self, room_id: i64, range: DateRange) -> anyhow::Result<i64>;

    /// Restrictions intersecting the inclusive window `[start, end]`.
    /// Order is unspecified; callers re-index by day.
    async fn restrictions_in_range(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<Restriction>>;

    /// Insert a one-day owner block `[day, day + 1)`, returning its id.
    async fn insert_block(&self, room_id: i64, day: NaiveDate) -> anyhow::Result<i64>;

    /// Returns the number of rows removed (0 when the id was already gone).
    async fn delete_restriction(&self, id: i64) -> anyhow::Result<usize>;

    async fn insert_reservation(&self, reservation: NewReservation) -> anyhow::Result<i64>;

    async fn insert_reservation_restriction(
        &self,
        room_id: i64,
        range: DateRange,
        reservation_id: i64,
    ) -> anyhow::Result<i64>;

    async fn reservation(&self, id: i64) -> anyhow::Result<Option<Reservation>>;

    /// Deletes the reservation together with its paired restriction.
    async fn delete_reservation(&self, id: i64) -> anyhow::Result<usize>;

    async fn set_processed(&self, id: i64, processed: bool) -> anyhow::Result<usize>;
}
