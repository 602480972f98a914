//! Board profiles
//!
//! A board profile tells the codec which optional records a board's module
//! carries and how its hardware address is stored. Profiles are keyed by the
//! exact board name found in the `$BOOTEFI$` record.

mod database;
mod types;

pub use database::{lookup, BoardDatabase, DatabaseError, BOARDS};
pub use types::*;
