//! TCP listeners, one per chart slot.
//!
//! Slot `n` listens on `base_port + n`. Each accepted connection runs its
//! own [`Session`] bound to that slot; the listener itself only accepts and
//! dispatches. Lines longer than [`ConnectionLimits::max_line_length`] are
//! discarded up to their newline and answered with an error.

use std::net::SocketAddr;
use std::sync::Arc;

use netplot_common::protocol::{Reply, greeting};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::{ListenerSetConfig, ServerConfig};
use crate::error::ServerError;
use crate::session::Session;
use crate::surface::RenderSurface;

/// Per-slot connection limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    /// Concurrent connections accepted on the slot.
    pub max_connections: usize,
    /// Longest accepted line in bytes, excluding the newline.
    pub max_line_length: usize,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self::from(&ListenerSetConfig::default())
    }
}

impl From<&ListenerSetConfig> for ConnectionLimits {
    fn from(config: &ListenerSetConfig) -> Self {
        Self {
            max_connections: config.max_connections_per_slot,
            max_line_length: config.max_line_length,
        }
    }
}

/// Bind one listener per slot. Fails on the first port that cannot be bound.
pub async fn bind_listeners(config: &ServerConfig) -> Result<Vec<TcpListener>, ServerError> {
    let mut listeners = Vec::with_capacity(config.server.max_slots);

    for slot in 0..config.server.max_slots {
        let port = config
            .port_for(slot)
            .ok_or_else(|| ServerError::config(format!("no TCP/IP port for slot {}", slot)))?;
        let listener = TcpListener::bind((config.server.bind_address.as_str(), port))
            .await
            .map_err(|source| ServerError::Bind { port, source })?;
        listeners.push(listener);
    }

    Ok(listeners)
}

/// Accept connections for `slot` until the task is aborted.
pub async fn run_slot_listener(
    listener: TcpListener,
    slot: usize,
    surface: RenderSurface,
    limits: ConnectionLimits,
) {
    match listener.local_addr() {
        Ok(addr) => info!(slot, %addr, "Chart listener started"),
        Err(e) => warn!(slot, error = %e, "Chart listener started on unknown address"),
    }

    let semaphore = Arc::new(Semaphore::new(limits.max_connections));

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => match semaphore.clone().try_acquire_owned() {
                Ok(permit) => {
                    let surface = surface.clone();
                    tokio::spawn(async move {
                        let _permit = permit;
                        info!(slot, %addr, "Client connected");
                        let session = Session::new(slot, surface);
                        let ended =
                            handle_connection(stream, addr, session, limits.max_line_length).await;
                        match ended {
                            Ok(()) => info!(slot, %addr, "Client disconnected"),
                            Err(e) => debug!(slot, %addr, error = %e, "Connection ended"),
                        }
                    });
                }
                Err(_) => {
                    warn!(slot, %addr, "Max connections reached, rejecting client");
                    drop(stream);
                }
            },
            Err(e) => {
                error!(slot, error = %e, "TCP accept error");
            }
        }
    }
}

/// Greet the client, then answer every line until EOF.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    mut session: Session,
    max_line_length: usize,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    writer.write_all(format!("{}\n", greeting()).as_bytes()).await?;

    let mut buf = Vec::new();
    loop {
        buf.clear();
        let reply = match read_line_capped(&mut reader, &mut buf, max_line_length).await? {
            LineRead::Eof => {
                debug!(%addr, "Client closed the connection");
                return Ok(());
            }
            LineRead::Line => session.respond(&String::from_utf8_lossy(&buf)),
            LineRead::TooLong => {
                warn!(%addr, max_line_length, "Discarding overlong line");
                Reply::Error(format!("line longer than {} bytes", max_line_length))
            }
        };
        writer.write_all(format!("{}\n", reply).as_bytes()).await?;
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Line,
    TooLong,
    Eof,
}

/// Read one line into `buf`, holding at most `limit` bytes plus the newline.
///
/// An overlong line is consumed up to and including its newline so the next
/// read starts on a fresh line.
async fn read_line_capped<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    if (&mut *reader).take(cap).read_until(b'\n', buf).await? == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.ends_with(b"\n") || buf.len() <= limit {
        return Ok(LineRead::Line);
    }

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            break;
        }
        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(newline) => (newline + 1, true),
            None => (available.len(), false),
        };
        reader.consume(used);
        if done {
            break;
        }
    }
    Ok(LineRead::TooLong)
}
