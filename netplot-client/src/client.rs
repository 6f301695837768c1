//! Async client for the netplot line protocol.

use std::time::Duration;

use chrono::NaiveDateTime;
use netplot_common::protocol::{format_timestamp, parse_greeting};
use netplot_common::{ChartKind, Reply, keywords};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::plot_config::PlotConfig;

/// How long to wait for each reply by default.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// A connection to one netplot chart slot.
///
/// Every command waits for the server's reply. In cache mode, data lines are
/// held back until [`update`](Self::update) sends them in a single write.
pub struct NetplotClient<S = TcpStream> {
    stream: BufReader<S>,
    server_version: f64,
    response_timeout: Duration,
    cache_enabled: bool,
    cache: Vec<String>,
}

impl NetplotClient<TcpStream> {
    /// Connect to `host:port` and check the greeting.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        debug!(%addr, "Connecting");
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| ClientError::Connect {
                addr: addr.clone(),
                source,
            })?;
        Self::from_stream(stream, &addr).await
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> NetplotClient<S> {
    /// Wrap an established stream. `peer` only labels errors.
    pub async fn from_stream(stream: S, peer: &str) -> Result<Self> {
        let mut client = Self {
            stream: BufReader::new(stream),
            server_version: 0.0,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            cache_enabled: false,
            cache: Vec::new(),
        };

        let line = client.read_line().await?;
        client.server_version =
            parse_greeting(&line).map_err(|_| ClientError::NotNetplotServer {
                addr: peer.to_string(),
                received: line.clone(),
            })?;
        debug!(peer, version = client.server_version, "Connected");
        Ok(client)
    }

    /// Protocol version announced by the server.
    pub fn server_version(&self) -> f64 {
        self.server_version
    }

    pub fn set_response_timeout(&mut self, timeout: Duration) {
        self.response_timeout = timeout;
    }

    pub async fn set_grid(&mut self, rows: usize, columns: usize) -> Result<()> {
        self.send_set(keywords::GRID, &format!("{},{}", rows, columns))
            .await
    }

    pub async fn set_frame_title(&mut self, title: &str) -> Result<()> {
        self.send_set(keywords::FRAME_TITLE, title).await
    }

    pub async fn set_legend_enabled(&mut self, enabled: bool) -> Result<()> {
        self.send_set(keywords::ENABLE_LEGEND, &enabled.to_string())
            .await
    }

    /// Select the chart type (`time`, `bar`, `xy` or `dial`).
    pub async fn set_plot_type(&mut self, plot_type: &str) -> Result<()> {
        let kind: ChartKind = plot_type
            .parse()
            .map_err(|_| ClientError::InvalidPlotType(plot_type.to_string()))?;
        self.send_set(keywords::GRAPH, kind.as_str()).await
    }

    /// Select the chart type, set its title (when non-empty) and `init`.
    pub async fn set_plot_type_with_title(&mut self, plot_type: &str, title: &str) -> Result<()> {
        self.set_plot_type(plot_type).await?;
        if !title.is_empty() {
            self.send_set(keywords::PLOT_TITLE, title).await?;
        }
        self.init().await
    }

    pub async fn init(&mut self) -> Result<()> {
        self.send_command(keywords::INIT).await
    }

    /// Add a trace, first sending every setting of `config` when given.
    pub async fn add_plot(&mut self, config: Option<&PlotConfig>) -> Result<()> {
        if let Some(config) = config {
            for (name, value) in config.attributes() {
                self.send_set(name, &value).await?;
            }
        }
        self.send_command(keywords::ADD_PLOT).await
    }

    /// One value per trace, in the order the traces were added.
    pub async fn add_plot_values(&mut self, values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let line = values
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.send_data(line).await
    }

    pub async fn add_xy_value(&mut self, plot: usize, x: f64, y: f64) -> Result<()> {
        self.send_data(format!("{}:{}:{}", plot, x, y)).await
    }

    pub async fn add_time_value(&mut self, plot: usize, at: NaiveDateTime, y: f64) -> Result<()> {
        self.send_data(format!("{}:{}:{}", plot, format_timestamp(&at), y))
            .await
    }

    pub async fn clear(&mut self, plot: usize) -> Result<()> {
        self.send_command(&format!("{} {}", keywords::CLEAR, plot))
            .await
    }

    pub async fn replot(&mut self, plot: usize) -> Result<()> {
        self.send_command(&format!("{} {}", keywords::REPLOT, plot))
            .await
    }

    /// Turn the server's status echo on or off.
    pub async fn enable_status(&mut self, enabled: bool) -> Result<()> {
        let flag = if enabled { 1 } else { 0 };
        self.send_command(&format!("{} {}", keywords::ENABLE_STATUS, flag))
            .await
    }

    /// Hold data lines until [`update`](Self::update) is called.
    pub fn enable_cache(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
    }

    /// Number of data lines waiting to be sent.
    pub fn cached_lines(&self) -> usize {
        self.cache.len()
    }

    /// Send every cached data line in one write, then read one reply each.
    ///
    /// All replies are read even after a failure; the first error is
    /// returned.
    pub async fn update(&mut self) -> Result<()> {
        if self.cache.is_empty() {
            return Ok(());
        }

        let lines = std::mem::take(&mut self.cache);
        let mut batch = lines.join("\n");
        batch.push('\n');
        debug!(lines = lines.len(), "Sending cached plot values");
        self.stream.write_all(batch.as_bytes()).await?;
        self.stream.flush().await?;

        let mut first_error = None;
        for _ in 0..lines.len() {
            let reply = self.read_reply().await?;
            if let Reply::Error(message) = reply {
                first_error.get_or_insert(ClientError::Server(message));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Close the connection. Cached lines that were never sent are dropped.
    pub async fn disconnect(mut self) -> Result<()> {
        self.stream.get_mut().shutdown().await?;
        Ok(())
    }

    async fn send_set(&mut self, name: &str, value: &str) -> Result<()> {
        self.send_command(&format!("{}{}={}", keywords::SET_PREFIX, name, value))
            .await
    }

    async fn send_data(&mut self, line: String) -> Result<()> {
        if self.cache_enabled {
            self.cache.push(line);
            Ok(())
        } else {
            self.send_command(&line).await
        }
    }

    /// Send one line and wait for its reply.
    async fn send_command(&mut self, line: &str) -> Result<()> {
        debug!(command = line, "Sending");
        self.stream
            .write_all(format!("{}\n", line).as_bytes())
            .await?;
        self.stream.flush().await?;

        match self.read_reply().await? {
            Reply::Ok => Ok(()),
            Reply::Error(message) => Err(ClientError::Server(message)),
        }
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let line = self.read_line().await?;
        debug!(reply = %line, "Received");
        Ok(Reply::parse(&line))
    }

    async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = tokio::time::timeout(self.response_timeout, self.stream.read_line(&mut line))
            .await
            .map_err(|_| ClientError::Timeout(self.response_timeout))??;
        if read == 0 {
            return Err(ClientError::ConnectionClosed);
        }
        Ok(line.trim_end().to_string())
    }
}
