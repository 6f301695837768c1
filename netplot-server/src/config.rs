//! Server configuration.

use std::path::Path;

use netplot_common::LoggingConfig;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// Largest number of chart slots a server may expose.
pub const MAX_SLOTS_LIMIT: usize = 999;

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ListenerSetConfig,

    /// Render surface settings.
    #[serde(default)]
    pub surface: SurfaceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One TCP listener per chart slot, on consecutive ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerSetConfig {
    /// Address every slot listener binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port of slot 0. Slot `n` listens on `base_port + n`.
    #[serde(default = "default_base_port")]
    pub base_port: u16,

    /// Number of chart slots (and listeners).
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,

    /// Concurrent connections accepted per slot.
    #[serde(default = "default_max_connections_per_slot")]
    pub max_connections_per_slot: usize,

    /// Longest accepted command line in bytes, excluding the newline.
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

pub fn default_base_port() -> u16 {
    9600
}

fn default_max_slots() -> usize {
    10
}

fn default_max_connections_per_slot() -> usize {
    64
}

fn default_max_line_length() -> usize {
    64 * 1024
}

impl Default for ListenerSetConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            base_port: default_base_port(),
            max_slots: default_max_slots(),
            max_connections_per_slot: default_max_connections_per_slot(),
            max_line_length: default_max_line_length(),
        }
    }
}

/// Render surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Lines kept in the status log.
    #[serde(default = "default_status_log_capacity")]
    pub status_log_capacity: usize,

    /// Whether processed lines are echoed to the status log at startup.
    #[serde(default = "default_true")]
    pub status_enabled: bool,

    #[serde(default = "default_frame_title")]
    pub frame_title: String,
}

fn default_status_log_capacity() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

fn default_frame_title() -> String {
    "netplot".to_string()
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            status_log_capacity: default_status_log_capacity(),
            status_enabled: true,
            frame_title: default_frame_title(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let config: Self = netplot_common::load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ServerError> {
        let server = &self.server;

        if server.bind_address.is_empty() {
            return Err(ServerError::config("bind_address must not be empty"));
        }
        if server.base_port == 0 {
            return Err(ServerError::config("base_port must be between 1 and 65535"));
        }
        if !(1..=MAX_SLOTS_LIMIT).contains(&server.max_slots) {
            return Err(ServerError::config(format!(
                "max_slots must be between 1 and {}, got {}",
                MAX_SLOTS_LIMIT, server.max_slots
            )));
        }
        let last_port = usize::from(server.base_port) + server.max_slots - 1;
        if last_port > usize::from(u16::MAX) {
            return Err(ServerError::config(format!(
                "base_port {} with {} slots would need port {}",
                server.base_port, server.max_slots, last_port
            )));
        }
        if server.max_connections_per_slot == 0 {
            return Err(ServerError::config(
                "max_connections_per_slot must be greater than 0",
            ));
        }
        if server.max_line_length == 0 {
            return Err(ServerError::config("max_line_length must be greater than 0"));
        }
        if self.surface.status_log_capacity == 0 {
            return Err(ServerError::config(
                "status_log_capacity must be greater than 0",
            ));
        }

        Ok(())
    }

    /// TCP port of `slot`.
    pub fn port_for(&self, slot: usize) -> Option<u16> {
        u16::try_from(slot)
            .ok()
            .and_then(|slot| self.server.base_port.checked_add(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netplot_common::{LogFormat, parse_config};
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: ServerConfig = parse_config("{}").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.base_port, 9600);
        assert_eq!(config.server.max_slots, 10);
        assert_eq!(config.server.max_line_length, 65536);
        assert_eq!(config.surface.status_log_capacity, 1000);
        assert!(config.surface.status_enabled);
        assert_eq!(config.logging.level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let json5 = r#"
        {
            server: {
                bind_address: "127.0.0.1",
                base_port: 10000,
                max_slots: 4,
                max_connections_per_slot: 2,
                max_line_length: 256,
            },
            surface: {
                status_log_capacity: 50,
                status_enabled: false,
                frame_title: "Lab",
            },
            logging: {
                level: "debug",
                format: "json",
            },
        }
        "#;

        let config: ServerConfig = parse_config(json5).unwrap();
        config.validate().unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.port_for(3), Some(10003));
        assert_eq!(config.server.max_line_length, 256);
        assert_eq!(config.surface.frame_title, "Lab");
        assert!(!config.surface.status_enabled);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.server.max_slots = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.max_slots = 1000;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.base_port = 65530;
        config.server.max_slots = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("65539"));

        let mut config = ServerConfig::default();
        config.server.base_port = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.surface.status_log_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.max_line_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ server: {{ base_port: 9700, max_slots: 2 }} }}").unwrap();

        let config = ServerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.server.base_port, 9700);
        assert_eq!(config.port_for(1), Some(9701));
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ server: {{ max_slots: 0 }} }}").unwrap();

        let err = ServerConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
