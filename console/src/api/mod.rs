//! Central module for organizing the backend endpoints the console consumes.
//!
//! This module acts as a top-level container for the different API domains,
//! such as user accounts and player records, excluding the authentication
//! flow which is handled separately.

pub mod common;
pub mod player;
pub mod user;
