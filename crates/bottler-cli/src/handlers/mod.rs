//! Command handlers.
//!
//! One-shot commands print JSON on stdout; logs go to stderr.

pub mod analyze;
pub mod candidates;
pub mod serve;
pub mod tools;
