//! `netplot` - network plotting server.

use std::io;

use anyhow::{Context, Result};
use netplot_common::init_tracing;
use netplot_server::args::prompt_base_port;
use netplot_server::{PersistedState, RenderSurface, ServerArgs, ServerConfig, ServerRunner};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse_or_exit();

    let mut config = match &args.config {
        Some(path) => ServerConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting netplot server");

    let state_path = PersistedState::default_path();
    let mut state = state_path
        .as_deref()
        .map(PersistedState::load)
        .unwrap_or_default();

    if let Some(max_charts) = args.max_charts {
        config.server.max_slots = usize::from(max_charts);
    }
    if let Some(port) = args.port {
        config.server.base_port = port;
    } else if args.prompt {
        let default = state.server_port.unwrap_or(config.server.base_port);
        let stdin = io::stdin();
        match prompt_base_port(default, &mut stdin.lock(), &mut io::stdout())? {
            Some(port) => {
                config.server.base_port = port;
                state.server_port = Some(port);
                if let Some(path) = &state_path {
                    if let Err(e) = state.save(path) {
                        tracing::warn!(error = %e, "Failed to save base port");
                    }
                }
            }
            None => return Ok(()),
        }
    }
    config.validate()?;

    let surface = RenderSurface::with_tracing(config.server.max_slots, &config.surface);
    let runner = ServerRunner::start(config, surface.clone()).await?;
    runner.run().await?;

    if let Some(window) = surface.geometry() {
        state.window = Some(window);
    }
    if let Some(path) = &state_path {
        state
            .save(path)
            .with_context(|| format!("Failed to save state to '{}'", path.display()))?;
    }

    tracing::info!("Goodbye!");
    Ok(())
}
