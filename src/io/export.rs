//! Export run reports to JSON and CSV.
//!
//! JSON is the "portable" representation of a run (config summary + residual
//! statistics). CSV is meant to be easy to consume in spreadsheets or
//! downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::RunReport;
use crate::error::AppError;

/// Write the run report as pretty JSON.
pub fn write_report_json(path: &Path, report: &RunReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

/// Write one CSV row per sketch size.
pub fn write_report_csv(path: &Path, report: &RunReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut file = BufWriter::new(file);

    // Header
    writeln!(
        file,
        "rows,cols,seed,solver,sketch_size,trials,exact_residual,mean_residual,min_residual,max_residual,absolute_excess,relative_excess"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let solver = format!("{:?}", report.solver).to_lowercase();
    for s in &report.sketches {
        // Empty field when the exact residual is zero.
        let relative = s.relative_excess.map(|r| format!("{r:.10}")).unwrap_or_default();
        writeln!(
            file,
            "{},{},{},{},{},{},{:.10},{:.10},{:.10},{:.10},{:.10},{}",
            report.rows,
            report.cols,
            report.seed,
            solver,
            s.sketch_size,
            s.trials,
            report.exact_residual,
            s.mean_residual,
            s.min_residual,
            s.max_residual,
            s.absolute_excess,
            relative,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    file.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    Ok(())
}
