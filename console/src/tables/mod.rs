//! Remote-backed tables.
//!
//! Each management screen is a paged collection over a listing endpoint,
//! with client-side sorting scoped to the loaded page and row actions that
//! go through the backend before the cache changes.

pub mod collection;
pub mod leaderboard;
pub mod players;
pub mod sort;
pub mod users;
