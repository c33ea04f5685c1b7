pub mod calendar;
pub mod date_range;
pub mod reservation;
pub mod restriction;
pub mod room;

pub use calendar::{CalendarDayMap, DayMap};
pub use date_range::DateRange;
pub use reservation::{NewReservation, Reservation};
pub use restriction::Restriction;
pub use room::Room;
