//! Core services.

mod status_tracker;

pub use status_tracker::StatusTracker;
