use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::models::{DateRange, NewReservation, Reservation, Restriction, Room};

const DATE_FMT: &str = "%Y-%m-%d";

fn fmt_date(d: NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT).with_context(|| format!("bad stored date: {s}"))
}

// ── Rooms ──

pub fn insert_room(conn: &Connection, name: &str) -> anyhow::Result<i64> {
    conn.execute("INSERT INTO rooms (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn all_rooms(conn: &Connection) -> anyhow::Result<Vec<Room>> {
    let mut stmt = conn.prepare("SELECT id, name FROM rooms ORDER BY id")?;
    let rooms = stmt
        .query_map([], |row| {
            Ok(Room {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rooms)
}

pub fn get_room(conn: &Connection, id: i64) -> anyhow::Result<Option<Room>> {
    let result = conn.query_row(
        "SELECT id, name FROM rooms WHERE id = ?1",
        params![id],
        |row| {
            Ok(Room {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    );
    match result {
        Ok(room) => Ok(Some(room)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Availability ──

/// Number of restrictions on the room that conflict with the range,
/// strict on both ends so shared boundary dates never count.
pub fn count_overlapping(conn: &Connection, room_id: i64, range: &DateRange) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(id) FROM room_restrictions
         WHERE room_id = ?1 AND ?2 < check_out AND ?3 > check_in",
        params![room_id, fmt_date(range.check_in), fmt_date(range.check_out)],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// All rooms minus rooms with a conflicting restriction, as one set
/// difference in SQL.
pub fn free_rooms(conn: &Connection, range: &DateRange) -> anyhow::Result<Vec<Room>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.name FROM rooms r
         WHERE r.id NOT IN (
             SELECT rr.room_id FROM room_restrictions rr
             WHERE ?1 < rr.check_out AND ?2 > rr.check_in
         )
         ORDER BY r.id",
    )?;
    let rooms = stmt
        .query_map(
            params![fmt_date(range.check_in), fmt_date(range.check_out)],
            |row| {
                Ok(Room {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rooms)
}

// ── Restrictions ──

/// Restrictions for the room intersecting the inclusive window
/// `[start, end]` (a calendar month). The end comparison is >= because
/// the window's last day is itself in view.
pub fn restrictions_in_range(
    conn: &Connection,
    room_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<Restriction>> {
    let mut stmt = conn.prepare(
        "SELECT id, room_id, reservation_id, check_in, check_out
         FROM room_restrictions
         WHERE room_id = ?1 AND ?2 < check_out AND ?3 >= check_in",
    )?;
    let rows = stmt
        .query_map(params![room_id, fmt_date(start), fmt_date(end)], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut restrictions = Vec::with_capacity(rows.len());
    for (id, room_id, reservation_id, check_in, check_out) in rows {
        let range = DateRange::new(parse_date(&check_in)?, parse_date(&check_out)?)
            .map_err(|e| anyhow::anyhow!("corrupt restriction row {id}: {e}"))?;
        restrictions.push(Restriction {
            id,
            room_id,
            range,
            reservation_id,
        });
    }
    Ok(restrictions)
}

/// One-day owner block: `[day, day + 1)`, no reservation attached.
pub fn insert_block(conn: &Connection, room_id: i64, day: NaiveDate) -> anyhow::Result<i64> {
    let next = day
        .succ_opt()
        .with_context(|| format!("no day after {day}"))?;
    conn.execute(
        "INSERT INTO room_restrictions (room_id, reservation_id, check_in, check_out)
         VALUES (?1, NULL, ?2, ?3)",
        params![room_id, fmt_date(day), fmt_date(next)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_restriction(conn: &Connection, id: i64) -> anyhow::Result<usize> {
    let rows = conn.execute("DELETE FROM room_restrictions WHERE id = ?1", params![id])?;
    Ok(rows)
}

// ── Reservations ──

pub fn insert_reservation(conn: &Connection, res: &NewReservation) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO reservations (first_name, last_name, email, phone, check_in, check_out, room_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            res.first_name,
            res.last_name,
            res.email,
            res.phone,
            fmt_date(res.range.check_in),
            fmt_date(res.range.check_out),
            res.room_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_reservation_restriction(
    conn: &Connection,
    room_id: i64,
    range: &DateRange,
    reservation_id: i64,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO room_restrictions (room_id, reservation_id, check_in, check_out)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            room_id,
            reservation_id,
            fmt_date(range.check_in),
            fmt_date(range.check_out),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_reservation(conn: &Connection, id: i64) -> anyhow::Result<Option<Reservation>> {
    let result = conn.query_row(
        "SELECT id, first_name, last_name, email, phone, check_in, check_out,
                room_id, processed, created_at, updated_at
         FROM reservations WHERE id = ?1",
        params![id],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, i64>(7)?,
                row.get::<_, i64>(8)?,
                row.get::<_, String>(9)?,
                row.get::<_, String>(10)?,
            ))
        },
    );

    let row = match result {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let (id, first_name, last_name, email, phone, check_in, check_out, room_id, processed, created_at, updated_at) =
        row;
    let range = DateRange::new(parse_date(&check_in)?, parse_date(&check_out)?)
        .map_err(|e| anyhow::anyhow!("corrupt reservation row {id}: {e}"))?;
    let created_at = chrono::NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("bad created_at on reservation {id}"))?;
    let updated_at = chrono::NaiveDateTime::parse_from_str(&updated_at, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("bad updated_at on reservation {id}"))?;

    Ok(Some(Reservation {
        id,
        first_name,
        last_name,
        email,
        phone,
        range,
        room_id,
        processed: processed != 0,
        created_at,
        updated_at,
    }))
}

/// Removes the reservation and its paired restriction together so a
/// reservation-backed restriction never outlives its reservation.
pub fn delete_reservation(conn: &Connection, id: i64) -> anyhow::Result<usize> {
    conn.execute(
        "DELETE FROM room_restrictions WHERE reservation_id = ?1",
        params![id],
    )?;
    let rows = conn.execute("DELETE FROM reservations WHERE id = ?1", params![id])?;
    Ok(rows)
}

pub fn set_processed(conn: &Connection, id: i64, processed: bool) -> anyhow::Result<usize> {
    let rows = conn.execute(
        "UPDATE reservations
         SET processed = ?2, updated_at = datetime('now')
         WHERE id = ?1",
        params![id, processed as i64],
    )?;
    Ok(rows)
}
