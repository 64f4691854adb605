//! Data types for the Parking Analytics Service
//!
//! This module contains all the core data structures used throughout the
//! application.

mod event;
mod session;
mod window;

pub use event::{NewEventInput, ParkingAction, ParkingEvent, ValidEvent};
pub use session::Session;
pub use window::Window;
