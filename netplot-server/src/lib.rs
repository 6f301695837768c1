//! Netplot server.
//!
//! Remote clients connect over TCP and drive live charts with a line
//! protocol. Each chart slot has its own port (`base_port + slot`); every
//! connection gets a [`Session`] that parses commands, applies them to a
//! chart variant and publishes the result to the shared [`RenderSurface`].
//!
//! # Protocol
//!
//! ```text
//! S: netplot_version=1.9
//! C: set graph=xy
//! S: OK
//! C: init
//! S: OK
//! C: set plot_name=P0
//! S: OK
//! C: add_plot
//! S: OK
//! C: 0:1:2
//! S: OK
//! C: 0:x:2
//! S: ERROR: unable to parse '0:x:2': 'x' is not a number
//! ```
//!
//! # Chart types
//!
//! | Type   | Data forms                      | Plots |
//! |--------|---------------------------------|-------|
//! | `time` | sequential, `plot:timestamp:y`  | any   |
//! | `bar`  | sequential                      | 1     |
//! | `xy`   | `plot:x:y`                      | any   |
//! | `dial` | sequential                      | 2     |

pub mod args;
pub mod attributes;
pub mod command;
pub mod config;
pub mod error;
pub mod listener;
pub mod plot;
pub mod runner;
pub mod session;
pub mod state;
pub mod surface;

pub use args::ServerArgs;
pub use attributes::ChartAttributes;
pub use config::{ListenerSetConfig, ServerConfig, SurfaceConfig};
pub use error::{PlotError, Result, ServerError};
pub use plot::{ChartModel, PlotVariant};
pub use runner::ServerRunner;
pub use session::{Session, SessionState};
pub use state::{PersistedState, WindowGeometry};
pub use surface::{ChartRenderer, RenderSurface, TracingRenderer};
