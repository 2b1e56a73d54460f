//! Input/output helpers.
//!
//! - run report exports and reload (`export`)

pub mod export;

pub use export::*;
