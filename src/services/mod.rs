pub mod availability;
pub mod calendar;
pub mod engine;
pub mod reconcile;

pub use availability::AvailabilityChecker;
pub use calendar::CalendarProjector;
pub use engine::BookingEngine;
pub use reconcile::{ReconcileOutcome, Reconciler, SubmittedForm};
