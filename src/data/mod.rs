//! Input data for the driver: seeded synthetic problems.

pub mod sample;

pub use sample::*;
