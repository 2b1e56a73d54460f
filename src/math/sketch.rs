//! Randomized sketching for tall least-squares problems.
//!
//! Given an embedding `S` (`s × m`, `n ≤ s ≤ m`) we solve the reduced problem
//!
//! ```text
//! minimize ‖S A x - S b‖₂
//! ```
//!
//! whose solution approximates the full one, improving as `s` grows toward `m`.
//!
//! The Gaussian embedding has i.i.d. `N(0, 1/s)` entries, so `E[SᵀS] = I`.
//! Random generation sits behind [`EmbeddingBuilder`] so callers (and tests) can
//! supply their own source.

use log::debug;
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::StandardNormal;

use crate::error::{LstsqError, Result};
use crate::math::lstsq::SolveMethod;

/// Source of `s × m` embedding matrices.
pub trait EmbeddingBuilder {
    fn build(&mut self, s: usize, m: usize) -> Result<DMatrix<f64>>;
}

/// Gaussian embedding backed by a seeded `StdRng`.
#[derive(Debug, Clone)]
pub struct GaussianEmbedding {
    rng: StdRng,
}

impl GaussianEmbedding {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl EmbeddingBuilder for GaussianEmbedding {
    fn build(&mut self, s: usize, m: usize) -> Result<DMatrix<f64>> {
        build_embedding(s, m, &mut self.rng)
    }
}

/// Build an `s × m` matrix of i.i.d. normal entries with mean 0 and variance `1/s`.
pub fn build_embedding<R: Rng + ?Sized>(s: usize, m: usize, rng: &mut R) -> Result<DMatrix<f64>> {
    if s == 0 {
        return Err(LstsqError::InvalidSketchSize { sketch: s, cols: 1 });
    }
    if m == 0 {
        return Err(LstsqError::dims("build_embedding", "at least one column", "0 columns"));
    }

    let scale = 1.0 / (s as f64).sqrt();
    Ok(DMatrix::from_fn(s, m, |_, _| {
        let z: f64 = rng.sample(StandardNormal);
        scale * z
    }))
}

/// Solve `argmin_x ‖S A x - S b‖₂` with the QR solver.
pub fn sketched_least_squares(
    s: &DMatrix<f64>,
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<DVector<f64>> {
    sketched_least_squares_with(s, a, b, SolveMethod::Qr)
}

/// Same as [`sketched_least_squares`] with an explicit inner solver.
pub fn sketched_least_squares_with(
    s: &DMatrix<f64>,
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    method: SolveMethod,
) -> Result<DVector<f64>> {
    let (m, n) = a.shape();
    if s.ncols() != m {
        return Err(LstsqError::dims(
            "sketched_least_squares",
            format!("embedding with {m} columns"),
            format!("{}x{}", s.nrows(), s.ncols()),
        ));
    }
    if b.len() != m {
        return Err(LstsqError::dims("sketched_least_squares", format!("b of length {m}"), b.len()));
    }
    if s.nrows() < n {
        return Err(LstsqError::InvalidSketchSize {
            sketch: s.nrows(),
            cols: n,
        });
    }

    debug!("sketched_least_squares: {m}x{n} -> {}x{n}", s.nrows());
    let a2 = s * a;
    let b2 = s * b;

    method.solve(&a2, &b2)
}

/// Draw an `s × m` embedding from `builder` and solve the sketched problem.
pub fn sketch_and_solve<B: EmbeddingBuilder + ?Sized>(
    builder: &mut B,
    sketch_size: usize,
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    method: SolveMethod,
) -> Result<DVector<f64>> {
    if sketch_size < a.ncols() {
        return Err(LstsqError::InvalidSketchSize {
            sketch: sketch_size,
            cols: a.ncols(),
        });
    }
    let s = builder.build(sketch_size, a.nrows())?;
    sketched_least_squares_with(&s, a, b, method)
}
