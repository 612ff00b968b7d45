//! CLI argument surface for runmill

use clap::Parser;
use std::path::PathBuf;

use runmill_engine::{CompilerArgs, LaunchMode, LaunchRequest};

/// The main CLI struct.
#[derive(Parser, Debug)]
#[command(name = "runmill")]
#[command(about = "A launcher that can compile and run any type of source file")]
#[command(
    after_help = "Everything after a literal `+` argument is passed to the launched \
                  program verbatim instead of being parsed as flags."
)]
#[command(version)]
pub struct Cli {
    /// Path to the input file
    pub file: PathBuf,

    /// Override the language instead of inferring it from the file type
    #[arg(long)]
    pub language: Option<String>,

    /// Replace the language's default compiler arguments entirely
    #[arg(long, conflicts_with = "args", allow_hyphen_values = true)]
    pub compiler_args: Option<String>,

    /// Add additional arguments to the compiler
    #[arg(short = 'a', long, default_value = "", allow_hyphen_values = true)]
    pub args: String,

    /// Compile the program without running it
    #[arg(long, conflicts_with = "run")]
    pub compile: bool,

    /// Run the program without checking for changes
    #[arg(long)]
    pub run: bool,

    /// Turn on verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn mode(&self) -> LaunchMode {
        if self.compile {
            LaunchMode::CompileOnly
        } else if self.run {
            LaunchMode::RunOnly
        } else {
            LaunchMode::Auto
        }
    }

    pub fn compiler_args(&self) -> CompilerArgs {
        match &self.compiler_args {
            Some(full) => CompilerArgs::Override(full.clone()),
            None => CompilerArgs::Extra(self.args.clone()),
        }
    }

    /// Assemble the engine request from the parsed flags, the absolutized
    /// file, and the pass-through arguments split off before parsing.
    pub fn to_request(&self, file: PathBuf, run_args: String) -> LaunchRequest {
        LaunchRequest {
            file,
            language: self.language.clone(),
            mode: self.mode(),
            compiler_args: self.compiler_args(),
            run_args,
        }
    }
}

/// Split argv at the first literal `+`. Everything after it belongs to the
/// launched program and is never seen by the flag parser.
pub fn split_run_args(argv: Vec<String>) -> (Vec<String>, String) {
    match argv.iter().position(|arg| arg == "+") {
        Some(index) => {
            let run_args = argv[index + 1..].join(" ");
            (argv[..index].to_vec(), run_args)
        }
        None => (argv, String::new()),
    }
}
