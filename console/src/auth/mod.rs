//! Authentication domain: state machine, credential models, route guards.
//!
//! `context` owns the process-wide auth state, `models` holds the wire and
//! domain types, and `guard` decides what a given state may see.

pub mod context;
pub mod guard;
pub mod models;
