//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during a run
//! - exported to JSON/CSV
//! - reloaded later for comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::SolveMethod;

/// Which solver the driver uses for both the exact and sketched problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    /// Householder QR + back substitution.
    Qr,
    /// Normal equations via Cholesky (less stable; for comparison).
    Normal,
}

impl SolverKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            SolverKind::Qr => "Householder QR",
            SolverKind::Normal => "normal equations",
        }
    }
}

impl From<SolverKind> for SolveMethod {
    fn from(kind: SolverKind) -> Self {
        match kind {
            SolverKind::Qr => SolveMethod::Qr,
            SolverKind::Normal => SolveMethod::NormalEquations,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Rows of the generated problem (`m`).
    pub rows: usize,
    /// Columns of the generated problem (`n`).
    pub cols: usize,
    pub sketch_sizes: Vec<usize>,
    /// Independent embeddings drawn per sketch size.
    pub trials: usize,
    pub seed: u64,
    pub solver: SolverKind,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}

impl RunConfig {
    /// Reject configurations that cannot describe a tall least-squares problem.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.cols == 0 {
            return Err(AppError::new(2, "Column count must be > 0."));
        }
        if self.rows < self.cols {
            return Err(AppError::new(
                2,
                format!("Row count ({}) must be >= column count ({}).", self.rows, self.cols),
            ));
        }
        if self.trials == 0 {
            return Err(AppError::new(2, "Trial count must be > 0."));
        }
        if let Some(&s) = self.sketch_sizes.iter().find(|&&s| s < self.cols) {
            return Err(AppError::new(
                2,
                format!("Sketch size {s} is smaller than the column count ({}).", self.cols),
            ));
        }
        Ok(())
    }
}

/// Residual statistics for one sketch size across all trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchStats {
    pub sketch_size: usize,
    pub trials: usize,
    pub mean_residual: f64,
    pub min_residual: f64,
    pub max_residual: f64,
    /// `mean_residual - exact_residual`.
    pub absolute_excess: f64,
    /// `mean_residual / exact_residual - 1`; `None` when the exact residual is
    /// zero (e.g. a square system), where the ratio is undefined.
    pub relative_excess: Option<f64>,
}

/// Everything a `run` produces; also the JSON export schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub rows: usize,
    pub cols: usize,
    pub seed: u64,
    pub solver: SolverKind,
    pub exact_residual: f64,
    pub sketches: Vec<SketchStats>,
}

/// Diagnostics of a single factorization (`lstsq qr`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCheck {
    pub rows: usize,
    pub cols: usize,
    /// `‖QᵀQ - I‖_F`.
    pub orthogonality_error: f64,
    /// `‖QR - A‖_F / ‖A‖_F`.
    pub reconstruction_error: f64,
    /// Largest `|R[i,j]|` with `i > j`.
    pub max_below_diagonal: f64,
    /// Largest `||R_ours[i,i]| - |R_ref[i,i]||` against nalgebra's QR.
    pub max_diag_mismatch: f64,
}
