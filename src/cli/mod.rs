//! CLI entry point for provexec.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ProbeConfig;
use crate::scenario::Scenario;

/// Provider-executed tool reproduction harness
#[derive(Parser, Debug)]
#[command(
    name = "provexec",
    version,
    about = "Check agent streams for provider-executed tool bugs"
)]
pub struct Cli {
    /// Config file (default: ./provexec.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Provider tool name pattern (substring, or `re:<regex>`)
    #[arg(long, global = true)]
    pub provider_tool: Option<String>,

    /// Model id recorded on the scenario agents
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that a parallel tool call yields tool results
    Bail(RunArgs),
    /// Bail check plus provider tool re-invocation across steps
    Reinvoke(RunArgs),
    /// Persisted provider results and a resumed follow-up turn
    Resume(ResumeArgs),
    /// Print the classification of a recorded event log
    Classify(ClassifyArgs),
}

/// Arguments shared by the single-turn scenarios.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Recorded session directory (turn-N subdirectories)
    #[arg(short, long)]
    pub fixture: PathBuf,

    /// Max agent steps for the first turn
    #[arg(long)]
    pub max_steps: Option<u32>,
}

/// Arguments for `provexec resume`.
#[derive(Args, Debug)]
pub struct ResumeArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Max agent steps for the resumed turn
    #[arg(long)]
    pub resume_max_steps: Option<u32>,
}

/// Arguments for `provexec classify`.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// JSONL event log
    #[arg(short, long)]
    pub events: PathBuf,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply command-line overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut ProbeConfig) {
        if let Some(pattern) = &self.provider_tool {
            config.provider_tool = pattern.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        let (run, resume_max_steps) = match &self.command {
            Commands::Bail(run) | Commands::Reinvoke(run) => (Some(run), None),
            Commands::Resume(args) => (Some(&args.run), args.resume_max_steps),
            Commands::Classify(_) => (None, None),
        };
        if let Some(max_steps) = run.and_then(|r| r.max_steps) {
            config.max_steps = max_steps;
        }
        if let Some(resume_max_steps) = resume_max_steps {
            config.resume_max_steps = resume_max_steps;
        }
    }
}

impl Commands {
    /// The scenario and fixture directory, unless this command runs none.
    pub fn scenario(&self) -> Option<(Scenario, &PathBuf)> {
        match self {
            Self::Bail(run) => Some((Scenario::Bail, &run.fixture)),
            Self::Reinvoke(run) => Some((Scenario::Reinvoke, &run.fixture)),
            Self::Resume(args) => Some((Scenario::Resume, &args.run.fixture)),
            Self::Classify(_) => None,
        }
    }
}
