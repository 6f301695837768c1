//! `netplot-demo` - drives a netplot server with generated data.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use netplot_client::{DemoKind, DemoSettings, demo};
use netplot_common::{LoggingConfig, init_tracing};

#[derive(Parser, Debug)]
#[command(version, about = "Feed demo data to a netplot server")]
struct DemoArgs {
    /// Server host name or address.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port of the first chart slot.
    #[arg(short, long, default_value_t = 9600)]
    port: u16,

    /// Which chart to drive.
    #[arg(short, long, value_enum, default_value_t = DemoKind::All)]
    demo: DemoKind,

    /// Values sent per trace.
    #[arg(short = 'n', long, default_value_t = 100)]
    count: usize,

    /// Milliseconds between updates.
    #[arg(long, default_value_t = 100)]
    period_ms: u64,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = DemoArgs::parse();

    let mut logging = LoggingConfig::default();
    if let Some(level) = args.log_level {
        logging.level = level;
    }
    init_tracing(&logging).context("Failed to initialize logging")?;

    let settings = DemoSettings {
        count: args.count,
        period: Duration::from_millis(args.period_ms),
    };
    tracing::info!(host = %args.host, port = args.port, demo = ?args.demo, "Starting demo");

    demo::run(&args.host, args.port, args.demo, settings)
        .await
        .with_context(|| format!("Demo against {}:{} failed", args.host, args.port))?;

    tracing::info!("Demo complete");
    Ok(())
}
