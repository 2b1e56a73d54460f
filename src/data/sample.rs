//! Synthetic least-squares problems for the driver.
//!
//! `A` and `b` have i.i.d. `Uniform[0, 1)` entries. Everything is derived from
//! the user seed, so a run is reproducible end to end, including the
//! per-trial embeddings.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use nalgebra::{DMatrix, DVector};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::AppError;

/// A dense problem `minimize ‖A x - b‖₂`.
#[derive(Debug, Clone)]
pub struct Problem {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
}

impl Problem {
    pub fn rows(&self) -> usize {
        self.a.nrows()
    }

    pub fn cols(&self) -> usize {
        self.a.ncols()
    }
}

pub fn generate_problem(rows: usize, cols: usize, seed: u64) -> Result<Problem, AppError> {
    if rows == 0 || cols == 0 {
        return Err(AppError::new(2, "Problem dimensions must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(problem_seed(rows, cols, seed));
    let a = DMatrix::from_fn(rows, cols, |_, _| rng.r#gen::<f64>());
    let b = DVector::from_fn(rows, |_, _| rng.r#gen::<f64>());

    Ok(Problem { a, b })
}

fn problem_seed(rows: usize, cols: usize, seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    "problem".hash(&mut hasher);
    rows.hash(&mut hasher);
    cols.hash(&mut hasher);
    seed.hash(&mut hasher);
    hasher.finish()
}

/// Seed for the embedding of one `(sketch size, trial)` pair.
///
/// Independent of the order in which trials run, so parallel runs match serial ones.
pub fn trial_seed(seed: u64, sketch_size: usize, trial: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    "embedding".hash(&mut hasher);
    seed.hash(&mut hasher);
    sketch_size.hash(&mut hasher);
    trial.hash(&mut hasher);
    hasher.finish()
}
