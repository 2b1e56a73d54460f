//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration (`RunConfig`, `SolverKind`)
//! - run outputs (`RunReport`, `SketchStats`, `QrCheck`)

pub mod types;

pub use types::*;
