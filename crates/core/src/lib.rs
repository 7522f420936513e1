#![forbid(unsafe_code)]

//! Domain model for the preflight checklist manager.
//!
//! Everything in this crate is pure: no IO, no global state. Persistence and
//! orchestration live in the `storage` and `services` crates.

pub mod error;
pub mod model;
pub mod progress;
pub mod time;

pub use error::Error;
pub use progress::Progress;
pub use time::Clock;
