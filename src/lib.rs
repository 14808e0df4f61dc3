//! provexec: event-log verification for provider-executed tool calls.
//!
//! Drives a streaming, tool-using agent runtime through a parallel call to a
//! provider-executed tool and a local tool, then checks the event stream and
//! the persisted messages for two defects: a stream that ends without tool
//! results, and provider results that are never persisted (so a resumed
//! conversation re-invokes the tool or fails).
//!
//! # Quick Start
//!
//! ```no_run
//! use provexec::prelude::*;
//!
//! # async fn example() -> provexec::error::Result<()> {
//! let runtime = ReplayRuntime::open("sessions/web-search")?;
//! let settings = ScenarioSettings::default();
//! let mut report = Report::stdout();
//!
//! Scenario::Resume.run(&runtime, &settings, &mut report).await?;
//! report.print_summary();
//! std::process::exit(report.exit_signal().code());
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod correlate;
pub mod error;
pub mod prelude;
pub mod report;
pub mod runtime;
pub mod scenario;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
