use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::{self, queries};
use crate::models::{DateRange, NewReservation, Reservation, Restriction, Room};
use crate::store::IntervalStore;

/// SQLite-backed interval store. Each call runs the blocking query on a
/// worker thread and is bounded by the configured timeout so a hung
/// backend fails the request instead of stalling it.
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
    timeout: Duration,
}

impl SqliteStore {
    pub fn new(db: Arc<Mutex<Connection>>, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let conn = db::init_db(&config.database_url)?;
        Ok(Self::new(
            Arc::new(Mutex::new(conn)),
            config.store_timeout(),
        ))
    }

    async fn call<T, F>(&self, op: &'static str, f: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let task = tokio::task::spawn_blocking(move || {
            let conn = db.lock().unwrap();
            f(&*conn)
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(anyhow::anyhow!("store call {op} panicked: {join}")),
            Err(_) => Err(anyhow::anyhow!(
                "store call {op} timed out after {}ms",
                self.timeout.as_millis()
            )),
        }
    }
}

#[async_trait]
impl IntervalStore for SqliteStore {
    async fn all_rooms(&self) -> anyhow::Result<Vec<Room>> {
        self.call("all_rooms", queries::all_rooms).await
    }

    async fn room(&self, room_id: i64) -> anyhow::Result<Option<Room>> {
        self.call("room", move |conn| queries::get_room(conn, room_id))
            .await
    }

    async fn free_rooms(&self, range: DateRange) -> anyhow::Result<Vec<Room>> {
        self.call("free_rooms", move |conn| queries::free_rooms(conn, &range))
            .await
    }

    async fn count_overlapping(&self, room_id: i64, range: DateRange) -> anyhow::Result<i64> {
        self.call("count_overlapping", move |conn| {
            queries::count_overlapping(conn, room_id, &range)
        })
        .await
    }

    async fn restrictions_in_range(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<Restriction>> {
        self.call("restrictions_in_range", move |conn| {
            queries::restrictions_in_range(conn, room_id, start, end)
        })
        .await
    }

    async fn insert_block(&self, room_id: i64, day: NaiveDate) -> anyhow::Result<i64> {
        self.call("insert_block", move |conn| {
            queries::insert_block(conn, room_id, day)
        })
        .await
    }

    async fn delete_restriction(&self, id: i64) -> anyhow::Result<usize> {
        self.call("delete_restriction", move |conn| {
            queries::delete_restriction(conn, id)
        })
        .await
    }

    async fn insert_reservation(&self, reservation: NewReservation) -> anyhow::Result<i64> {
        self.call("insert_reservation", move |conn| {
            queries::insert_reservation(conn, &reservation)
        })
        .await
    }

    async fn insert_reservation_restriction(
        &self,
        room_id: i64,
        range: DateRange,
        reservation_id: i64,
    ) -> anyhow::Result<i64> {
        self.call("insert_reservation_restriction", move |conn| {
            queries::insert_reservation_restriction(conn, room_id, &range, reservation_id)
        })
        .await
    }

    async fn reservation(&self, id: i64) -> anyhow::Result<Option<Reservation>> {
        self.call("reservation", move |conn| queries::get_reservation(conn, id))
            .await
    }

    async fn delete_reservation(&self, id: i64) -> anyhow::Result<usize> {
        self.call("delete_reservation", move |conn| {
            queries::delete_reservation(conn, id)
        })
        .await
    }

    async fn set_processed(&self, id: i64, processed: bool) -> anyhow::Result<usize> {
        self.call("set_processed", move |conn| {
            queries::set_processed(conn, id, processed)
        })
        .await
    }
}
