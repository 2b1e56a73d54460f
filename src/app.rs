//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - generates the problem and runs the exact + sketched solves
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use log::debug;

use crate::cli::{Command, QrArgs, RunArgs};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `lstsq` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is the normal case.
    let _ = dotenvy::dotenv();
    init_logging();

    // We want `lstsq` and `lstsq -m 500` to behave like `lstsq run ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Qr(args) => handle_qr(args),
    }
}

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    // Ignore double initialization (e.g. when embedded in tests).
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    debug!("run config: {config:?}");
    let run = pipeline::run_experiment(&config)?;

    println!("{}", crate::report::format_run_summary(&run.report, &config));

    if config.plot {
        let plot = crate::plot::render_residual_plot(&run.report, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_json {
        crate::io::write_report_json(path, &run.report)?;
    }
    if let Some(path) = &config.export_csv {
        crate::io::write_report_csv(path, &run.report)?;
    }

    Ok(())
}

fn handle_qr(args: QrArgs) -> Result<(), AppError> {
    let run = pipeline::run_qr_check(args.rows, args.cols, args.seed)?;
    println!("{}", crate::report::format_qr_check(&run, args.show));
    Ok(())
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        rows: args.rows,
        cols: args.cols,
        sketch_sizes: args.sketch_sizes.clone(),
        trials: args.trials,
        seed: args.seed,
        solver: args.method,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_json: args.export.clone(),
        export_csv: args.export_csv.clone(),
    }
}

/// Rewrite argv so `lstsq` defaults to `lstsq run`.
///
/// Rules:
/// - `lstsq`                      -> `lstsq run`
/// - `lstsq -m 500 ...`           -> `lstsq run -m 500 ...`
/// - `lstsq --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "qr");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::SolverKind;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_run() {
        assert_eq!(rewrite_args(args(&["lstsq"])), args(&["lstsq", "run"]));
        assert_eq!(
            rewrite_args(args(&["lstsq", "-m", "500"])),
            args(&["lstsq", "run", "-m", "500"])
        );
        assert_eq!(rewrite_args(args(&["lstsq", "qr"])), args(&["lstsq", "qr"]));
        assert_eq!(rewrite_args(args(&["lstsq", "--help"])), args(&["lstsq", "--help"]));
    }

    #[test]
    fn run_args_map_to_config() {
        let cli = Cli::parse_from(args(&[
            "lstsq", "run", "-m", "80", "-n", "4", "-s", "8,16,80", "--trials", "3", "--method",
            "normal", "--no-plot",
        ]));
        let Command::Run(run_args) = cli.command else {
            panic!("expected run subcommand");
        };

        let config = run_config_from_args(&run_args);
        assert_eq!((config.rows, config.cols), (80, 4));
        assert_eq!(config.sketch_sizes, vec![8, 16, 80]);
        assert_eq!(config.trials, 3);
        assert_eq!(config.solver, SolverKind::Normal);
        assert!(!config.plot);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn run_defaults_match_reference_experiment() {
        let cli = Cli::parse_from(args(&["lstsq", "run"]));
        let Command::Run(run_args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!((run_args.rows, run_args.cols), (300, 10));
        assert_eq!(run_args.sketch_sizes, vec![50, 100, 150, 200, 250, 300]);
        assert_eq!(run_args.method, SolverKind::Qr);
    }
}
