//! runmill: resolve a source file's language, recompile when stale, run it.

mod cli;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use runmill_cache::{default_store_path, BuildStore};
use runmill_config::{logging, AppConfig};
use runmill_engine::{
    Execution, ExitKind, LaunchOutcome, LaunchReport, Launcher, SystemRunner,
};
use runmill_foundation::{paths, Result, RunError};
use runmill_registry::LanguageRegistry;

use crate::cli::{split_run_args, Cli};

fn main() -> ExitCode {
    let (argv, run_args) = split_run_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    match run(&cli, run_args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("runmill: error: {error}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli, run_args: String) -> Result<ExitCode> {
    let config = AppConfig::load()?;
    logging::initialize(&config, cli.verbose);

    let file = paths::absolutize(&cli.file)?;
    if !file.exists() {
        // Report the path as the user typed it.
        return Err(RunError::FileNotFound(cli.file.clone()));
    }

    let registry = match &config.languages.file {
        Some(path) => {
            debug!(table = %path.display(), "Loading external language table");
            LanguageRegistry::from_file(path)?
        }
        None => LanguageRegistry::embedded()?,
    };

    let store_path = match &config.cache.path {
        Some(path) => path.clone(),
        None => default_store_path()?,
    };
    debug!(store = %store_path.display(), "Opening build store");
    let mut store = BuildStore::open(store_path)?;

    let request = cli.to_request(file, run_args);
    let runner = SystemRunner;
    let mut launcher = Launcher::new(&registry, &mut store, &runner);
    let report = launcher.launch(&request)?;

    Ok(conclude(&request.file, &report))
}

/// Print the result line for the launch and map it to this process's exit
/// status. Child exit codes pass through; resolution failures exit 2
/// upstream; an interrupted launch exits like a SIGINT-terminated shell
/// command (130) with no extra output.
fn conclude(file: &Path, report: &LaunchReport) -> ExitCode {
    match report.outcome {
        LaunchOutcome::CompiledOnly(compile) => {
            println!(
                "Compiled {} with status code 0 in {:.2}s",
                file.display(),
                compile.elapsed.as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        LaunchOutcome::CompileFailed(compile) => {
            eprintln!(
                "Error while compiling {} returned status code {}",
                file.display(),
                compile.code().unwrap_or(1)
            );
            child_exit_code(compile)
        }
        LaunchOutcome::Ran(run) => match run.exit {
            ExitKind::Code(0) => {
                println!(
                    "Ran {} returned status code 0 in {:.4}s",
                    file.display(),
                    run.elapsed.as_secs_f64()
                );
                ExitCode::SUCCESS
            }
            _ => {
                eprintln!(
                    "Error while running {} process returned code: {} in {:.4}s",
                    file.display(),
                    run.code().unwrap_or(1),
                    run.elapsed.as_secs_f64()
                );
                child_exit_code(run)
            }
        },
        LaunchOutcome::Interrupted => ExitCode::from(130),
    }
}

/// Shell conventions: nonzero codes pass through, signal terminations
/// (negative codes) become 128 + signo.
fn child_exit_code(execution: Execution) -> ExitCode {
    match execution.exit {
        ExitKind::Code(code) if code >= 0 => ExitCode::from(code.min(255) as u8),
        ExitKind::Code(negated_signal) => {
            ExitCode::from((128 + (-negated_signal).min(127)) as u8)
        }
        ExitKind::Interrupted => ExitCode::from(130),
    }
}
