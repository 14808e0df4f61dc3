//! Assertion recording and the aggregate exit signal.
//!
//! A [`Report`] writes a line-oriented, human-readable log: diagnostics,
//! one `PASS`/`FAIL` line per assertion, and a closing summary. The exit
//! signal is derived separately by [`evaluate`], once, at the process boundary.

pub mod diagnostics;

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// One named check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub name: String,
    pub pass: bool,
    pub detail: String,
}

impl TestResult {
    pub fn label(&self) -> &'static str {
        if self.pass {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

/// Pass/fail counts over a set of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// Process-level outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSignal {
    Success,
    Failure,
}

impl ExitSignal {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

/// Count passes and failures.
pub fn summarize(results: &[TestResult]) -> Summary {
    let passed = results.iter().filter(|r| r.pass).count();
    Summary {
        passed,
        failed: results.len() - passed,
    }
}

/// Failure iff at least one result failed.
pub fn evaluate(results: &[TestResult]) -> ExitSignal {
    if results.iter().any(|r| !r.pass) {
        ExitSignal::Failure
    } else {
        ExitSignal::Success
    }
}

/// Ordered assertion log bound to an output sink.
pub struct Report {
    results: Vec<TestResult>,
    out: Box<dyn Write + Send>,
}

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Report")
            .field("results", &self.results)
            .finish_non_exhaustive()
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Report {
    pub fn stdout() -> Self {
        Self::to_writer(io::stdout())
    }

    pub fn to_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            results: Vec::new(),
            out: Box::new(out),
        }
    }

    /// Write one diagnostic line.
    pub fn line(&mut self, text: impl AsRef<str>) {
        if let Err(e) = writeln!(self.out, "{}", text.as_ref()) {
            tracing::warn!(error = %e, "failed to write report line");
        }
    }

    /// Write a section banner.
    pub fn section(&mut self, title: &str) {
        self.line(format!("\n=== {title} ===\n"));
    }

    /// Record a check and emit its `PASS`/`FAIL` line immediately.
    pub fn assert(
        &mut self,
        name: impl Into<String>,
        pass: bool,
        detail: impl Into<String>,
    ) -> &TestResult {
        let result = TestResult {
            name: name.into(),
            pass,
            detail: detail.into(),
        };
        self.line(format!("{} {}: {}", result.label(), result.name, result.detail));
        if !pass {
            tracing::info!(check = %result.name, detail = %result.detail, "check failed");
        }
        self.results.push(result);
        &self.results[self.results.len() - 1]
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<TestResult> {
        self.results
    }

    /// Emit the summary block and the failed-check listing.
    pub fn print_summary(&mut self) -> Summary {
        let summary = summarize(&self.results);
        self.section("Summary");
        self.line(format!(
            "{} passed, {} failed out of {} tests",
            summary.passed,
            summary.failed,
            summary.total()
        ));

        if summary.failed > 0 {
            let failed: Vec<String> = self
                .results
                .iter()
                .filter(|r| !r.pass)
                .map(|r| format!("  - {}: {}", r.name, r.detail))
                .collect();
            self.line("\nFailed tests:");
            for entry in failed {
                self.line(entry);
            }
        }
        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "failed to flush report");
        }
        summary
    }

    pub fn exit_signal(&self) -> ExitSignal {
        evaluate(&self.results)
    }
}

/// In-memory sink that can be inspected after a [`Report`] took ownership of
/// a clone of it.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "capture buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
