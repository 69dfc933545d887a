//! Domain logic for Bingoals boards.
//!
//! Everything in this crate is pure: no I/O, no clocks other than values
//! passed in by the caller. The persistence, event and HTTP layers all share
//! these definitions so that grid geometry, status transitions, milestone
//! rewards and the realtime wire format have exactly one source of truth.

pub mod board;
pub mod error;
pub mod invite;
pub mod milestone;
pub mod reaction;
pub mod realtime;
pub mod reflection;
pub mod rewards;
pub mod status;
pub mod types;
