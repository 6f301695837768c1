//! State remembered between runs: the last base port and window geometry.
//!
//! Stored as a small `key=value` properties file in the home directory.
//! Reading is forgiving. A missing file, an unreadable file or a malformed
//! value simply leaves the affected field unset.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ServerError;

/// File name of the state file in the home directory.
pub const STATE_FILE_NAME: &str = ".netplot.cfg";

const KEY_SERVER_PORT: &str = "server_port";
const KEY_GUI_X: &str = "gui_x";
const KEY_GUI_Y: &str = "gui_y";
const KEY_GUI_WIDTH: &str = "gui_width";
const KEY_GUI_HEIGHT: &str = "gui_height";

/// Window position and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub server_port: Option<u16>,
    pub window: Option<WindowGeometry>,
}

impl PersistedState {
    /// `~/.netplot.cfg`, when a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(STATE_FILE_NAME))
    }

    /// Load state from `path`, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No saved state");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read saved state");
                Self::default()
            }
        }
    }

    /// Parse properties text. Unknown keys are ignored.
    pub fn parse(content: &str) -> Self {
        let mut server_port = None;
        let mut x = None;
        let mut y = None;
        let mut width = None;
        let mut height = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once(['=', ':']) else {
                warn!(line, "Ignoring malformed saved state line");
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                KEY_SERVER_PORT => {
                    server_port = parse_field::<u16>(key, value).filter(|port| *port != 0)
                }
                KEY_GUI_X => x = parse_field(key, value),
                KEY_GUI_Y => y = parse_field(key, value),
                KEY_GUI_WIDTH => width = parse_field(key, value),
                KEY_GUI_HEIGHT => height = parse_field(key, value),
                _ => debug!(key, "Ignoring unknown saved state key"),
            }
        }

        let window = match (x, y, width, height) {
            (Some(x), Some(y), Some(width), Some(height)) => Some(WindowGeometry {
                x,
                y,
                width,
                height,
            }),
            _ => None,
        };

        Self {
            server_port,
            window,
        }
    }

    /// Render as properties text.
    pub fn to_properties(&self) -> String {
        let mut out = String::from("# netplot saved state\n");
        if let Some(port) = self.server_port {
            let _ = writeln!(out, "{}={}", KEY_SERVER_PORT, port);
        }
        if let Some(window) = &self.window {
            let _ = writeln!(out, "{}={}", KEY_GUI_X, window.x);
            let _ = writeln!(out, "{}={}", KEY_GUI_Y, window.y);
            let _ = writeln!(out, "{}={}", KEY_GUI_WIDTH, window.width);
            let _ = writeln!(out, "{}={}", KEY_GUI_HEIGHT, window.height);
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<(), ServerError> {
        std::fs::write(path, self.to_properties())?;
        debug!(path = %path.display(), "Saved state");
        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, value, "Ignoring invalid saved state value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties() {
        let content = "\
# saved by netplot
! legacy comment
server_port=9700
gui_x = 10
gui_y=-20
gui_width=800
gui_height: 600
something_else=1
";
        let state = PersistedState::parse(content);
        assert_eq!(state.server_port, Some(9700));
        assert_eq!(
            state.window,
            Some(WindowGeometry {
                x: 10,
                y: -20,
                width: 800,
                height: 600,
            })
        );
    }

    #[test]
    fn test_malformed_values_are_tolerated() {
        let state = PersistedState::parse("server_port=banana\ngui_x=1\ngarbage line\n");
        assert_eq!(state, PersistedState::default());

        let state = PersistedState::parse("server_port=0\n");
        assert_eq!(state.server_port, None);
    }

    #[test]
    fn test_partial_geometry_is_dropped() {
        let state = PersistedState::parse("gui_x=1\ngui_y=2\ngui_width=3\n");
        assert!(state.window.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATE_FILE_NAME);
        let state = PersistedState {
            server_port: Some(9610),
            window: Some(WindowGeometry {
                x: 5,
                y: 6,
                width: 1024,
                height: 768,
            }),
        };

        state.save(&path).unwrap();
        assert_eq!(PersistedState::load(&path), state);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = PersistedState::load(&dir.path().join("absent.cfg"));
        assert_eq!(state, PersistedState::default());
    }
}
