//! Formatted terminal output for runs and factorization checks.
//!
//! We keep formatting code in one place so:
//! - the math code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use nalgebra::DMatrix;

use crate::app::pipeline::QrRunOutput;
use crate::domain::{RunConfig, RunReport, SketchStats};

/// Format the full run summary (problem + exact residual + per-sketch table).
pub fn format_run_summary(report: &RunReport, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== lstsq - sketched least squares ===\n");
    out.push_str(&format!(
        "Problem: {}x{} | seed={} | solver={}\n",
        report.rows,
        report.cols,
        report.seed,
        report.solver.display_name()
    ));
    out.push_str(&format!("Trials per sketch size: {}\n", config.trials));
    out.push_str(&format!("Exact residual ‖Ax - b‖: {:.6}\n", report.exact_residual));
    out.push('\n');

    out.push_str(&format_sketch_table(&report.sketches));

    out
}

fn format_sketch_table(rows: &[SketchStats]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>8} {:>7} {:>12} {:>12} {:>12} {:>9}\n",
            "sketch", "trials", "mean", "min", "max", "excess"
        )
        .trim_end(),
    );
    out.push('\n');

    out.push_str(
        format!(
            "{:-<8} {:-<7} {:-<12} {:-<12} {:-<12} {:-<9}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for s in rows {
        // A zero-residual fit has no meaningful ratio; show the absolute gap.
        let excess = match s.relative_excess {
            Some(rel) => format!("{:.2}%", 100.0 * rel),
            None => format!("+{:.2e}", s.absolute_excess),
        };
        out.push_str(
            format!(
                "{:>8} {:>7} {:>12.6} {:>12.6} {:>12.6} {:>9}\n",
                s.sketch_size,
                s.trials,
                s.mean_residual,
                s.min_residual,
                s.max_residual,
                excess,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the output of `lstsq qr`.
pub fn format_qr_check(run: &QrRunOutput, show_factors: bool) -> String {
    let c = &run.check;
    let mut out = String::new();

    out.push_str(&format!("=== lstsq - Householder QR check ({}x{}) ===\n", c.rows, c.cols));
    out.push_str(&format!("‖QᵀQ - I‖        : {:.3e}\n", c.orthogonality_error));
    out.push_str(&format!("‖QR - A‖ / ‖A‖   : {:.3e}\n", c.reconstruction_error));
    out.push_str(&format!("max |R[i,j]|, i>j: {:.3e}\n", c.max_below_diagonal));
    out.push_str(&format!("vs nalgebra |diag R| : {:.3e}\n", c.max_diag_mismatch));

    if show_factors {
        out.push_str("\nA:\n");
        out.push_str(&fmt_matrix(&run.a));
        out.push_str("\nQ:\n");
        out.push_str(&fmt_matrix(&run.factors.q));
        out.push_str("\nR:\n");
        out.push_str(&fmt_matrix(&run.factors.r));
    }

    out
}

fn fmt_matrix(m: &DMatrix<f64>) -> String {
    let mut out = String::new();
    for row in m.row_iter() {
        let parts: Vec<String> = row.iter().map(|x| format!("{x:>10.6}")).collect();
        out.push_str(&format!("[{}]\n", parts.join(" ")));
    }
    out
}
