//! `sketch-lstsq` library crate.
//!
//! Householder QR factorization, least-squares solves built on it, and a
//! randomized sketch-and-solve variant for tall problems.
//!
//! The binary (`lstsq`) is a thin wrapper around this library so that:
//!
//! - the numeric core (`math`) is testable without spawning processes
//! - the driver pieces (problem generation, reporting, exports) stay separate
//!   from the math

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
