//! Command-line parsing for the least-squares sketching driver.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the numeric code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::SolverKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "lstsq",
    version,
    about = "Householder QR least squares with randomized sketching"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve a random problem exactly and with each sketch size; print residuals.
    Run(RunArgs),
    /// Factorize a random matrix and report how well the QR factors check out.
    Qr(QrArgs),
}

/// Options for the sketching experiment.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Rows of the generated problem (m).
    #[arg(short = 'm', long, default_value_t = 300)]
    pub rows: usize,

    /// Columns of the generated problem (n).
    #[arg(short = 'n', long, default_value_t = 10)]
    pub cols: usize,

    /// Comma-separated sketch sizes (each must be >= n).
    #[arg(
        short = 's',
        long,
        value_delimiter = ',',
        default_values_t = [50, 100, 150, 200, 250, 300]
    )]
    pub sketch_sizes: Vec<usize>,

    /// Random embeddings drawn per sketch size (residuals are averaged).
    #[arg(short = 't', long, env = "LSTSQ_TRIALS", default_value_t = 1)]
    pub trials: usize,

    /// Random seed for the problem and the embeddings.
    #[arg(long, env = "LSTSQ_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Solver used for the exact and the sketched problems.
    #[arg(long, value_enum, default_value_t = SolverKind::Qr)]
    pub method: SolverKind,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,

    /// Export the run report to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Export per-sketch-size residuals to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}

/// Options for the factorization check.
#[derive(Debug, Parser, Clone)]
pub struct QrArgs {
    /// Rows of the random matrix.
    #[arg(short = 'm', long, default_value_t = 4)]
    pub rows: usize,

    /// Columns of the random matrix.
    #[arg(short = 'n', long, default_value_t = 3)]
    pub cols: usize,

    /// Random seed for the matrix.
    #[arg(long, env = "LSTSQ_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Also print Q and R.
    #[arg(long)]
    pub show: bool,
}
