//! Launch planning and orchestration
//!
//! `plan` is the pure decision: given a resolved language, the requested
//! mode, what is on disk, and what the store remembers, pick one of the
//! five plans. `launch` carries a plan out, spawning at most one compile
//! and one run, strictly in that order, and records a successful compile
//! before the run starts.

use std::path::{Path, PathBuf};

use runmill_cache::{mtime_seconds, BuildStore};
use runmill_foundation::paths::artifact_path;
use runmill_foundation::{Result, RunError};
use runmill_registry::{LanguageDefinition, LanguageRegistry};
use tracing::{debug, info, warn};

use crate::process::{Execution, ExitKind, ProcessRunner};
use crate::template::{append_args, render, OUTPUT_FILE};

/// What the caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    /// Compile when stale, then run
    #[default]
    Auto,
    /// Compile and record, never run
    CompileOnly,
    /// Run without any staleness checks
    RunOnly,
}

/// Compiler argument handling: extend the language's default arguments or
/// replace them wholesale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerArgs {
    Extra(String),
    Override(String),
}

impl Default for CompilerArgs {
    fn default() -> Self {
        Self::Extra(String::new())
    }
}

/// One fully described launch
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    /// Absolute path to the source file
    pub file: PathBuf,
    /// Explicit language token (name, alias, or extension) overriding the
    /// file's extension
    pub language: Option<String>,
    pub mode: LaunchMode,
    pub compiler_args: CompilerArgs,
    /// Verbatim text appended after the rendered run command
    pub run_args: String,
}

/// Why a compile phase is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileReason {
    /// No artifact exists on disk yet
    NoArtifact,
    /// The store has no entry for this path
    NoStoreEntry,
    /// The file's mtime differs from the recorded one
    SourceChanged,
}

/// The decision reached before anything is spawned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    /// Interpreted language: run directly
    Interpret,
    /// Compile, record, then run the artifact
    CompileAndRun(CompileReason),
    /// Artifact is fresh: run it without compiling
    RunExisting,
    /// Compile and record, do not run
    CompileOnly,
    /// Run without staleness checks. `artifact` is set when the run
    /// template references the output file, in which case it was verified
    /// to exist.
    RunOnly { artifact: Option<PathBuf> },
}

/// Terminal result of a launch
#[derive(Debug, Clone, Copy)]
pub enum LaunchOutcome {
    /// The run phase completed; its exit status may be nonzero
    Ran(Execution),
    /// Compile-only mode finished with status 0
    CompiledOnly(Execution),
    /// The compiler exited nonzero; nothing ran, the store is untouched
    CompileFailed(Execution),
    /// A phase was cut short by Ctrl-C; the store is untouched
    Interrupted,
}

/// Everything a caller needs to report one launch
#[derive(Debug, Clone)]
pub struct LaunchReport {
    /// Canonical name of the resolved language
    pub language: String,
    pub plan: LaunchPlan,
    /// The compile phase, when one ran to completion
    pub compile: Option<Execution>,
    pub outcome: LaunchOutcome,
}

/// Coordinates resolve, decide, compile, and run for one invocation
pub struct Launcher<'a, R: ProcessRunner> {
    registry: &'a LanguageRegistry,
    store: &'a mut BuildStore,
    runner: &'a R,
}

impl<'a, R: ProcessRunner> Launcher<'a, R> {
    pub fn new(registry: &'a LanguageRegistry, store: &'a mut BuildStore, runner: &'a R) -> Self {
        Self {
            registry,
            store,
            runner,
        }
    }

    /// Resolve the language, decide, and execute.
    pub fn launch(&mut self, request: &LaunchRequest) -> Result<LaunchReport> {
        let language = self
            .registry
            .resolve(&request.file, request.language.as_deref())?;
        let plan = self.plan(language.as_ref(), request)?;
        debug!(language = %language.name, ?plan, "Launch plan");
        self.carry_out(language.as_ref(), plan, request)
    }

    /// Decide what a launch will do without spawning anything.
    ///
    /// Interpreted languages always run directly. Explicit modes
    /// short-circuit the staleness logic: compile-only rejects interpreted
    /// languages, run-only requires an existing artifact only when the run
    /// template actually references one. In the default mode a compile
    /// happens when the artifact is missing, the store has no entry, or the
    /// recorded mtime differs from the file's current one.
    pub fn plan(
        &self,
        language: &LanguageDefinition,
        request: &LaunchRequest,
    ) -> Result<LaunchPlan> {
        match request.mode {
            LaunchMode::CompileOnly => {
                if !language.compiled {
                    return Err(RunError::NotCompiled(language.name.clone()));
                }
                Ok(LaunchPlan::CompileOnly)
            }
            LaunchMode::RunOnly => {
                if language.run_command.contains(OUTPUT_FILE) {
                    let artifact = artifact_path(&request.file);
                    if !artifact.exists() {
                        return Err(RunError::MissingArtifact(request.file.clone()));
                    }
                    Ok(LaunchPlan::RunOnly {
                        artifact: Some(artifact),
                    })
                } else {
                    Ok(LaunchPlan::RunOnly { artifact: None })
                }
            }
            LaunchMode::Auto => {
                if !language.compiled {
                    return Ok(LaunchPlan::Interpret);
                }
                if !artifact_path(&request.file).exists() {
                    return Ok(LaunchPlan::CompileAndRun(CompileReason::NoArtifact));
                }
                match self.store.entry(&request.file) {
                    None => Ok(LaunchPlan::CompileAndRun(CompileReason::NoStoreEntry)),
                    Some(_) if self.store.is_stale(&request.file)? => {
                        Ok(LaunchPlan::CompileAndRun(CompileReason::SourceChanged))
                    }
                    Some(_) => Ok(LaunchPlan::RunExisting),
                }
            }
        }
    }

    fn carry_out(
        &mut self,
        language: &LanguageDefinition,
        plan: LaunchPlan,
        request: &LaunchRequest,
    ) -> Result<LaunchReport> {
        let report_plan = plan.clone();
        match plan {
            LaunchPlan::Interpret => {
                debug!(file = %request.file.display(), "Language is not compiled, running interpreter");
                let run = self.run_program(language, request, "")?;
                Ok(report(language, report_plan, None, run_outcome(run)))
            }
            LaunchPlan::RunExisting => {
                let output = artifact_path(&request.file);
                let run = self.run_program(language, request, &lossy(&output))?;
                Ok(report(language, report_plan, None, run_outcome(run)))
            }
            LaunchPlan::RunOnly { artifact } => {
                let output = artifact.as_deref().map(lossy).unwrap_or_default();
                let run = self.run_program(language, request, &output)?;
                Ok(report(language, report_plan, None, run_outcome(run)))
            }
            LaunchPlan::CompileOnly => {
                let compile = self.compile_program(language, request)?;
                let outcome = match compile.exit {
                    ExitKind::Code(0) => {
                        self.record_build(&request.file);
                        LaunchOutcome::CompiledOnly(compile)
                    }
                    ExitKind::Code(_) => LaunchOutcome::CompileFailed(compile),
                    ExitKind::Interrupted => LaunchOutcome::Interrupted,
                };
                Ok(report(language, report_plan, Some(compile), outcome))
            }
            LaunchPlan::CompileAndRun(reason) => {
                match reason {
                    CompileReason::NoArtifact => {
                        debug!(file = %request.file.display(), "No existing binary, creating a new one")
                    }
                    CompileReason::NoStoreEntry => {
                        debug!(file = %request.file.display(), "No existing entry, treating it as a new file")
                    }
                    CompileReason::SourceChanged => {
                        debug!(file = %request.file.display(), "Detected changes, recompiling")
                    }
                }

                let compile = self.compile_program(language, request)?;
                match compile.exit {
                    ExitKind::Interrupted => {
                        return Ok(report(
                            language,
                            report_plan,
                            Some(compile),
                            LaunchOutcome::Interrupted,
                        ));
                    }
                    ExitKind::Code(code) if code != 0 => {
                        return Ok(report(
                            language,
                            report_plan,
                            Some(compile),
                            LaunchOutcome::CompileFailed(compile),
                        ));
                    }
                    ExitKind::Code(_) => {}
                }

                self.record_build(&request.file);
                info!(
                    file = %request.file.display(),
                    secs = compile.elapsed.as_secs_f64(),
                    "Compiled"
                );

                let output = artifact_path(&request.file);
                let run = self.run_program(language, request, &lossy(&output))?;
                Ok(report(language, report_plan, Some(compile), run_outcome(run)))
            }
        }
    }

    fn run_program(
        &self,
        language: &LanguageDefinition,
        request: &LaunchRequest,
        output: &str,
    ) -> Result<Execution> {
        let command = append_args(
            &render(&language.run_command, &lossy(&request.file), output),
            &request.run_args,
        );
        let execution = self.runner.execute(&command)?;
        debug!(
            %command,
            exit = ?execution.exit,
            secs = execution.elapsed.as_secs_f64(),
            "Run phase finished"
        );
        Ok(execution)
    }

    fn compile_program(
        &self,
        language: &LanguageDefinition,
        request: &LaunchRequest,
    ) -> Result<Execution> {
        let arguments = match &request.compiler_args {
            CompilerArgs::Override(full) => full.clone(),
            CompilerArgs::Extra(extra) => join_args(&language.default_args, extra),
        };
        let output = artifact_path(&request.file);
        let command = append_args(
            &render(
                &language.compiler_command,
                &lossy(&request.file),
                &lossy(&output),
            ),
            &arguments,
        );
        let execution = self.runner.execute(&command)?;
        debug!(
            %command,
            exit = ?execution.exit,
            secs = execution.elapsed.as_secs_f64(),
            "Compile phase finished"
        );
        Ok(execution)
    }

    /// Remember the source's current mtime after a successful compile. A
    /// store that cannot be written degrades to recompiling next time, so
    /// this warns instead of failing the launch.
    fn record_build(&mut self, file: &Path) {
        match mtime_seconds(file) {
            Ok(mtime) => {
                if let Err(error) = self.store.record_built(file, mtime) {
                    warn!(file = %file.display(), %error, "Compile succeeded but the build store was not updated");
                }
            }
            Err(error) => {
                warn!(file = %file.display(), %error, "Compile succeeded but the source mtime was not readable");
            }
        }
    }
}

fn report(
    language: &LanguageDefinition,
    plan: LaunchPlan,
    compile: Option<Execution>,
    outcome: LaunchOutcome,
) -> LaunchReport {
    LaunchReport {
        language: language.name.clone(),
        plan,
        compile,
        outcome,
    }
}

fn run_outcome(execution: Execution) -> LaunchOutcome {
    match execution.exit {
        ExitKind::Interrupted => LaunchOutcome::Interrupted,
        ExitKind::Code(_) => LaunchOutcome::Ran(execution),
    }
}

/// Default arguments and extra arguments joined with a space, skipping
/// whichever side is empty.
fn join_args(default_args: &str, extra: &str) -> String {
    match (default_args.is_empty(), extra.is_empty()) {
        (true, true) => String::new(),
        (true, false) => extra.to_string(),
        (false, true) => default_args.to_string(),
        (false, false) => format!("{default_args} {extra}"),
    }
}

fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
