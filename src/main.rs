//! provexec binary entry point.

use provexec::classify::{drain, StreamClassifier};
use provexec::cli::{Cli, Commands};
use provexec::config::ProbeConfig;
use provexec::report::{diagnostics, Report};
use provexec::runtime::replay::{read_event_log, ReplayRuntime};
use provexec::scenario::ScenarioSettings;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse_args();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

// Logs go to stderr; stdout carries the report.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> provexec::error::Result<i32> {
    let mut config = ProbeConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    tracing::debug!(?config, "resolved configuration");

    let mut report = Report::stdout();

    if let Commands::Classify(args) = &cli.command {
        let mut classifier = StreamClassifier::with_preview_chars(config.preview_chars);
        drain(read_event_log(&args.events).await?, &mut classifier).await?;
        let classification = classifier.finish();
        diagnostics::histogram(&mut report, &classification);
        diagnostics::steps(&mut report, &classification);
        diagnostics::text_preview(&mut report, &classification);
        return Ok(0);
    }

    let Some((scenario, fixture)) = cli.command.scenario() else {
        return Ok(0);
    };
    let settings = ScenarioSettings::from_config(&config)?;
    let runtime = ReplayRuntime::open(fixture)?;

    scenario.run(&runtime, &settings, &mut report).await?;
    report.print_summary();
    Ok(report.exit_signal().code())
}
