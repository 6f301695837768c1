//! Error types for the netplot server.

use netplot_common::{ChartKind, UnknownChartKind};
use thiserror::Error;

/// Result type alias for protocol-level operations.
pub type Result<T> = std::result::Result<T, PlotError>;

/// A recoverable failure while processing one protocol line.
///
/// Every variant is turned into a single `ERROR: <message>` reply and the
/// session carries on with the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlotError {
    /// Malformed line, number or timestamp.
    #[error("unable to parse '{line}': {reason}")]
    Parse { line: String, reason: String },

    #[error("{name} is an unknown attribute (value={value})")]
    UnknownAttribute { name: String, value: String },

    #[error("{value} is an invalid value for {name}, must be {expected}")]
    InvalidAttributeValue {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    UnknownGraphType(#[from] UnknownChartKind),

    #[error("cannot {action} before a graph type has been set (set graph=time|bar|xy|dial)")]
    NoGraphTypeSet { action: &'static str },

    #[error("cannot {action} as the plot has not been initialised yet")]
    NotInitialized { action: &'static str },

    #[error("{kind} plot {index} does not exist ({count} plot(s) added)")]
    InvalidIndex {
        kind: ChartKind,
        index: usize,
        count: usize,
    },

    #[error("a {kind} chart holds at most {max} plot(s)")]
    TooManyPlots { kind: ChartKind, max: usize },

    #[error("{operation} is not supported on a {kind} chart")]
    UnsupportedOperation {
        kind: ChartKind,
        operation: &'static str,
    },

    #[error("cannot have a chart grid of {rows} by {columns} as the max chart count is {max}")]
    GridTooLarge {
        rows: usize,
        columns: usize,
        max: usize,
    },
}

impl PlotError {
    /// Create a parse error for `line`.
    pub fn parse(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            line: line.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_value(name: &str, value: &str, expected: &'static str) -> Self {
        Self::InvalidAttributeValue {
            name: name.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    pub(crate) fn unsupported(kind: ChartKind, operation: &'static str) -> Self {
        Self::UnsupportedOperation { kind, operation }
    }
}

/// Fatal errors raised while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A chart port could not be bound.
    #[error("Failed to bind TCP/IP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] netplot_common::Error),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<json5::Error> for ServerError {
    fn from(err: json5::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PlotError::parse("1,x", "'x' is not a number");
        assert_eq!(err.to_string(), "unable to parse '1,x': 'x' is not a number");

        let err = PlotError::InvalidIndex {
            kind: ChartKind::Xy,
            index: 3,
            count: 1,
        };
        assert_eq!(err.to_string(), "xy plot 3 does not exist (1 plot(s) added)");

        let err = PlotError::NotInitialized {
            action: "add plot values",
        };
        assert!(err.to_string().contains("not been initialised"));
    }

    #[test]
    fn test_unknown_graph_type_from() {
        let err: PlotError = "pie".parse::<ChartKind>().unwrap_err().into();
        assert!(matches!(err, PlotError::UnknownGraphType(_)));
        assert!(err.to_string().contains("pie"));
    }
}
