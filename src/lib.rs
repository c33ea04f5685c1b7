//! Room availability and restriction reconciliation engine for a small
//! hotel-booking application.
//!
//! The crate answers three questions for the surrounding web layer:
//! whether a room is free for a requested stay, what a room's month looks
//! like day by day (reservations and owner blocks), and which inserts and
//! deletes an admin's edited calendar implies. Everything else — routing,
//! templates, sessions transport, mail — lives outside and talks to this
//! crate through [`BookingEngine`].

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod services;
pub mod session;
pub mod store;

pub use errors::{EngineError, EngineResult};
pub use services::engine::BookingEngine;
