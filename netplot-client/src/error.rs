//! Error types for the netplot client.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The peer did not greet with `netplot_version=<version>`.
    #[error("{addr} is not a netplot server. Received '{received}'")]
    NotNetplotServer { addr: String, received: String },

    /// The server answered `ERROR: <message>`.
    #[error("Server error: {0}")]
    Server(String),

    #[error("{0} is an invalid plot type")]
    InvalidPlotType(String),

    #[error("Connection closed by the server")]
    ConnectionClosed,

    #[error("No response from the server within {0:?}")]
    Timeout(std::time::Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
