//! Server lifecycle: bind every slot, serve until Ctrl+C, shut down.

use std::net::SocketAddr;

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::listener::{ConnectionLimits, bind_listeners, run_slot_listener};
use crate::surface::RenderSurface;

/// Owns the listener tasks of a running server.
///
/// ```ignore
/// let surface = RenderSurface::with_tracing(config.server.max_slots, &config.surface);
/// let runner = ServerRunner::start(config, surface).await?;
/// runner.run().await?;
/// ```
pub struct ServerRunner {
    config: ServerConfig,
    surface: RenderSurface,
    addrs: Vec<SocketAddr>,
    tasks: Vec<JoinHandle<()>>,
}

impl ServerRunner {
    /// Bind one listener per slot and start accepting connections.
    ///
    /// Nothing is spawned unless every port could be bound.
    pub async fn start(config: ServerConfig, surface: RenderSurface) -> Result<Self, ServerError> {
        let listeners = bind_listeners(&config).await?;

        let mut addrs = Vec::with_capacity(listeners.len());
        for listener in &listeners {
            addrs.push(listener.local_addr()?);
        }

        let limits = ConnectionLimits::from(&config.server);
        let tasks = listeners
            .into_iter()
            .enumerate()
            .map(|(slot, listener)| {
                tokio::spawn(run_slot_listener(
                    listener,
                    slot,
                    surface.clone(),
                    limits,
                ))
            })
            .collect();

        info!(
            base_port = config.server.base_port,
            charts = config.server.max_slots,
            "Netplot server started"
        );

        Ok(Self {
            config,
            surface,
            addrs,
            tasks,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    /// Bound address of every slot, in slot order.
    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    /// Abort every listener task. Sessions already accepted run until their
    /// clients disconnect or the runtime stops.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    /// Serve until Ctrl+C is received.
    pub async fn run(mut self) -> Result<(), ServerError> {
        info!(
            listeners = self.tasks.len(),
            "Netplot server running. Press Ctrl+C to stop."
        );

        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
        }

        info!("Received shutdown signal");
        self.shutdown();
        Ok(())
    }
}

impl Drop for ServerRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    async fn free_base_port(slots: u16) -> u16 {
        // Look for a run of free ports.
        'search: for _ in 0..50 {
            let free = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base = free.local_addr().unwrap().port();
            drop(free);
            if base.checked_add(slots).is_none() {
                continue;
            }
            for offset in 1..slots {
                if TcpListener::bind(("127.0.0.1", base + offset)).await.is_err() {
                    continue 'search;
                }
            }
            return base;
        }
        panic!("no free port range found");
    }

    #[tokio::test]
    async fn test_start_binds_every_slot() {
        let mut config = ServerConfig::default();
        config.server.bind_address = "127.0.0.1".to_string();
        config.server.max_slots = 3;
        config.server.base_port = free_base_port(3).await;
        let surface = RenderSurface::with_tracing(3, &config.surface);

        let mut runner = ServerRunner::start(config.clone(), surface).await.unwrap();
        let ports: Vec<u16> = runner.local_addrs().iter().map(|a| a.port()).collect();
        let base = config.server.base_port;
        assert_eq!(ports, vec![base, base + 1, base + 2]);

        let stream = TcpStream::connect(("127.0.0.1", base + 2)).await.unwrap();
        let mut greeting = String::new();
        BufReader::new(stream).read_line(&mut greeting).await.unwrap();
        assert!(greeting.starts_with("netplot_version="));

        runner.shutdown();
    }

    #[tokio::test]
    async fn test_start_fails_when_a_port_is_taken() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = ServerConfig::default();
        config.server.bind_address = "127.0.0.1".to_string();
        config.server.base_port = taken.local_addr().unwrap().port();
        config.server.max_slots = 1;
        let surface = RenderSurface::with_tracing(1, &config.surface);

        let result = ServerRunner::start(config, surface).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
