use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::{EngineError, EngineResult};
use crate::models::{DateRange, DayMap};
use crate::services::AvailabilityChecker;
use crate::store::IntervalStore;

const ADD_PREFIX: &str = "add_block_";
// Naming quirk inherited from the admin form: the checkbox for an
// existing block is pre-checked, so the *presence* of the field means
// "keep this block" and its absence means "remove it".
const KEEP_PREFIX: &str = "remove_block_";

/// The set of field names posted by the admin calendar form.
#[derive(Debug, Clone, Default)]
pub struct SubmittedForm {
    fields: BTreeSet<String>,
}

impl SubmittedForm {
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.fields.iter()
    }
}

/// `add_block_{room}_{day}` -> (room, day text). Anything else is not an
/// add field.
fn parse_add_block(field: &str) -> Option<(i64, &str)> {
    let rest = field.strip_prefix(ADD_PREFIX)?;
    let (room, day) = rest.split_once('_')?;
    Some((room.parse().ok()?, day))
}

/// What one reconciliation pass actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Newly inserted owner blocks as (day, restriction id).
    pub inserted: Vec<(NaiveDate, i64)>,
    /// Ids of blocks removed from the store.
    pub deleted: Vec<i64>,
    /// Requested add days that were already taken when re-checked; the
    /// rest of the batch still goes through.
    pub skipped: Vec<NaiveDate>,
}

/// Turns "what the admin was shown" plus "what the admin submitted" into
/// the minimal set of block deletes and inserts.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn IntervalStore>,
    checker: AvailabilityChecker,
}

impl Reconciler {
    pub fn new(store: Arc<dyn IntervalStore>) -> Self {
        let checker = AvailabilityChecker::new(Arc::clone(&store));
        Self { store, checker }
    }

    /// `previous_block_map` must be the block map as last rendered to
    /// this admin session — never recomputed at submit time, because
    /// removals are encoded as the *absence* of a keep field for a day
    /// that was shown, and a fresh projection could already reflect a
    /// concurrent admin's deletes.
    ///
    /// The first store failure aborts the remaining work; mutations
    /// already applied stay applied. Two admins editing the same room
    /// race last-writer-wins per field, by design.
    pub async fn reconcile_month_blocks(
        &self,
        room_id: i64,
        previous_block_map: &DayMap,
        form: &SubmittedForm,
    ) -> EngineResult<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();

        // Pass 1: existing blocks without a keep marker get deleted.
        // Zero-valued entries are empty days and reservation days live in
        // the other map; neither is ever touched here.
        for (day, block_id) in previous_block_map {
            if *block_id <= 0 {
                continue;
            }
            let keep_field = format!("{KEEP_PREFIX}{room_id}_{day}");
            if form.contains(&keep_field) {
                continue;
            }

            let rows = self
                .store
                .delete_restriction(*block_id)
                .await
                .map_err(|e| reconcile_err(&keep_field, EngineError::Store(e)))?;
            if rows == 0 {
                tracing::debug!(block_id, room_id, %day, "block already removed by a concurrent edit");
                continue;
            }
            tracing::info!(block_id, room_id, %day, "removed calendar block");
            outcome.deleted.push(*block_id);
        }

        // Pass 2: requested additions. Fields addressing other rooms are
        // someone else's pass over the same form.
        for field in form.fields() {
            let Some((field_room, day_text)) = parse_add_block(field) else {
                continue;
            };
            if field_room != room_id {
                continue;
            }

            let day = NaiveDate::parse_from_str(day_text, "%Y-%m-%d").map_err(|_| {
                reconcile_err(
                    field,
                    EngineError::InvalidRange(format!("{day_text} is not a date")),
                )
            })?;
            let range =
                DateRange::single_day(day).map_err(|e| reconcile_err(field, e))?;

            // The form only offers add checkboxes for open days, but the
            // day may have been taken since the calendar was rendered.
            // That loses this one insertion, not the batch.
            let free = self
                .checker
                .is_room_free(room_id, range)
                .await
                .map_err(|e| reconcile_err(field, e))?;
            if !free {
                tracing::warn!(room_id, %day, "day taken since calendar render, skipping block");
                outcome.skipped.push(day);
                continue;
            }

            let block_id = self
                .store
                .insert_block(room_id, day)
                .await
                .map_err(|e| reconcile_err(field, EngineError::Store(e)))?;
            tracing::info!(block_id, room_id, %day, "inserted calendar block");
            outcome.inserted.push((day, block_id));
        }

        Ok(outcome)
    }
}

fn reconcile_err(field: &str, source: EngineError) -> EngineError {
    EngineError::Reconciliation {
        field: field.to_string(),
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::db::{self, queries};
    use crate::models::NewReservation;
    use crate::store::SqliteStore;

    fn setup() -> (Reconciler, Arc<Mutex<rusqlite::Connection>>) {
        let conn = Arc::new(Mutex::new(db::init_db(":memory:").unwrap()));
        let store = SqliteStore::new(Arc::clone(&conn), Duration::from_secs(3));
        (Reconciler::new(Arc::new(store)), conn)
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn form(fields: &[&str]) -> SubmittedForm {
        SubmittedForm::from_fields(fields.iter().copied())
    }

    #[test]
    fn test_parse_add_block() {
        assert_eq!(parse_add_block("add_block_5_2024-03-20"), Some((5, "2024-03-20")));
        assert_eq!(parse_add_block("remove_block_5_2024-03-20"), None);
        assert_eq!(parse_add_block("add_block_x_2024-03-20"), None);
        assert_eq!(parse_add_block("add_block_5"), None);
        assert_eq!(parse_add_block("csrf_token"), None);
    }

    #[tokio::test]
    async fn test_keep_field_means_no_delete() {
        let (reconciler, conn) = setup();
        let (room, block_id) = {
            let conn = conn.lock().unwrap();
            let room = queries::insert_room(&conn, "Generals Quarters").unwrap();
            let block_id = queries::insert_block(&conn, room, d("2024-03-05")).unwrap();
            (room, block_id)
        };
        let previous: BTreeMap<_, _> = [(d("2024-03-05"), block_id)].into();

        let keep = format!("remove_block_{room}_2024-03-05");
        let outcome = reconciler
            .reconcile_month_blocks(room, &previous, &form(&[&keep]))
            .await
            .unwrap();

        assert!(outcome.deleted.is_empty());
        assert!(outcome.inserted.is_empty());
        let conn = conn.lock().unwrap();
        assert_eq!(queries::delete_restriction(&conn, block_id).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_keep_field_deletes_block() {
        let (reconciler, conn) = setup();
        let (room, block_id) = {
            let conn = conn.lock().unwrap();
            let room = queries::insert_room(&conn, "Generals Quarters").unwrap();
            let block_id = queries::insert_block(&conn, room, d("2024-03-05")).unwrap();
            (room, block_id)
        };
        let previous: BTreeMap<_, _> = [(d("2024-03-05"), block_id)].into();

        let outcome = reconciler
            .reconcile_month_blocks(room, &previous, &form(&[]))
            .await
            .unwrap();

        assert_eq!(outcome.deleted, vec![block_id]);
        assert!(outcome.inserted.is_empty());
        let conn = conn.lock().unwrap();
        assert_eq!(queries::delete_restriction(&conn, block_id).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_entries_are_never_touched() {
        let (reconciler, conn) = setup();
        let room = queries::insert_room(&conn.lock().unwrap(), "Generals Quarters").unwrap();
        // a rendered month is mostly zeros
        let previous: BTreeMap<_, _> = [
            (d("2024-03-01"), 0),
            (d("2024-03-02"), 0),
            (d("2024-03-03"), 0),
        ]
        .into();

        let outcome = reconciler
            .reconcile_month_blocks(room, &previous, &form(&[]))
            .await
            .unwrap();
        assert_eq!(outcome, ReconcileOutcome::default());
    }

    #[tokio::test]
    async fn test_add_field_inserts_one_block() {
        let (reconciler, conn) = setup();
        let room = queries::insert_room(&conn.lock().unwrap(), "Generals Quarters").unwrap();
        let add = format!("add_block_{room}_2024-03-20");

        let outcome = reconciler
            .reconcile_month_blocks(room, &BTreeMap::new(), &form(&[&add]))
            .await
            .unwrap();

        assert_eq!(outcome.inserted.len(), 1);
        assert!(outcome.deleted.is_empty());
        let (day, block_id) = outcome.inserted[0];
        assert_eq!(day, d("2024-03-20"));

        let conn = conn.lock().unwrap();
        let stored =
            queries::restrictions_in_range(&conn, room, d("2024-03-01"), d("2024-03-31")).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, block_id);
        assert!(stored[0].is_block());
    }

    #[tokio::test]
    async fn test_fields_for_other_rooms_are_ignored() {
        let (reconciler, conn) = setup();
        let (room, other) = {
            let conn = conn.lock().unwrap();
            let room = queries::insert_room(&conn, "Generals Quarters").unwrap();
            let other = queries::insert_room(&conn, "Majors Suite").unwrap();
            (room, other)
        };
        let add_other = format!("add_block_{other}_2024-03-20");

        let outcome = reconciler
            .reconcile_month_blocks(room, &BTreeMap::new(), &form(&[&add_other]))
            .await
            .unwrap();
        assert_eq!(outcome, ReconcileOutcome::default());
    }

    #[tokio::test]
    async fn test_add_for_day_taken_since_render_is_skipped() {
        let (reconciler, conn) = setup();
        let room = {
            let conn = conn.lock().unwrap();
            let room = queries::insert_room(&conn, "Generals Quarters").unwrap();
            // a guest booked 2024-03-20 after the admin's calendar was rendered
            let stay = DateRange::new(d("2024-03-20"), d("2024-03-21")).unwrap();
            let res_id = queries::insert_reservation(
                &conn,
                &NewReservation {
                    first_name: "John".into(),
                    last_name: "Smith".into(),
                    email: "john@smith.com".into(),
                    phone: "555-0100".into(),
                    range: stay,
                    room_id: room,
                },
            )
            .unwrap();
            queries::insert_reservation_restriction(&conn, room, &stay, res_id).unwrap();
            room
        };
        let add_taken = format!("add_block_{room}_2024-03-20");
        let add_free = format!("add_block_{room}_2024-03-25");

        let outcome = reconciler
            .reconcile_month_blocks(room, &BTreeMap::new(), &form(&[&add_taken, &add_free]))
            .await
            .unwrap();

        assert_eq!(outcome.skipped, vec![d("2024-03-20")]);
        assert_eq!(outcome.inserted.len(), 1);
        assert_eq!(outcome.inserted[0].0, d("2024-03-25"));
    }

    #[tokio::test]
    async fn test_malformed_day_fails_with_field_name() {
        let (reconciler, conn) = setup();
        let room = queries::insert_room(&conn.lock().unwrap(), "Generals Quarters").unwrap();
        let bad = format!("add_block_{room}_tomorrow");

        let err = reconciler
            .reconcile_month_blocks(room, &BTreeMap::new(), &form(&[&bad]))
            .await
            .unwrap_err();
        match err {
            EngineError::Reconciliation { field, source } => {
                assert_eq!(field, bad);
                assert!(matches!(*source, EngineError::InvalidRange(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_stale_delete_of_missing_block_is_quiet() {
        let (reconciler, conn) = setup();
        let room = queries::insert_room(&conn.lock().unwrap(), "Generals Quarters").unwrap();
        // the map still references a block a concurrent admin removed
        let previous: BTreeMap<_, _> = [(d("2024-03-05"), 999)].into();

        let outcome = reconciler
            .reconcile_month_blocks(room, &previous, &form(&[]))
            .await
            .unwrap();
        assert!(outcome.deleted.is_empty());
    }

    #[tokio::test]
    async fn test_mixed_edit_deletes_and_inserts() {
        let (reconciler, conn) = setup();
        let (room, keep_id, drop_id) = {
            let conn = conn.lock().unwrap();
            let room = queries::insert_room(&conn, "Generals Quarters").unwrap();
            let keep_id = queries::insert_block(&conn, room, d("2024-03-05")).unwrap();
            let drop_id = queries::insert_block(&conn, room, d("2024-03-08")).unwrap();
            (room, keep_id, drop_id)
        };
        let previous: BTreeMap<_, _> =
            [(d("2024-03-05"), keep_id), (d("2024-03-08"), drop_id)].into();
        let keep = format!("remove_block_{room}_2024-03-05");
        let add = format!("add_block_{room}_2024-03-12");

        let outcome = reconciler
            .reconcile_month_blocks(room, &previous, &form(&[&keep, &add]))
            .await
            .unwrap();

        assert_eq!(outcome.deleted, vec![drop_id]);
        assert_eq!(outcome.inserted.len(), 1);
        assert_eq!(outcome.inserted[0].0, d("2024-03-12"));
        assert!(outcome.skipped.is_empty());
    }
}
