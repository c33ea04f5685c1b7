use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::DateRange;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub range: DateRange,
    pub room_id: i64,
    /// Set once an admin has handled the booking.
    pub processed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insert payload for a reservation; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub range: DateRange,
    pub room_id: i64,
}
