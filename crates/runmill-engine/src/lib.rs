//! Compile-if-stale launch coordination
//!
//! [`Launcher`] drives one invocation end to end: resolve the language,
//! decide between compiling and reusing the existing artifact, execute at
//! most one compile and one run through a [`ProcessRunner`], and record
//! successful compiles in the build store. The decision itself is exposed
//! separately as [`Launcher::plan`] so it can be inspected without spawning
//! anything.

mod launcher;
mod process;
mod template;

pub use launcher::{
    CompileReason, CompilerArgs, LaunchMode, LaunchOutcome, LaunchPlan, LaunchReport,
    LaunchRequest, Launcher,
};
pub use process::{Execution, ExitKind, ProcessRunner, SystemRunner};
pub use template::{append_args, render, FILE_OUTPUT, FILE_PATH, OUTPUT_FILE};
