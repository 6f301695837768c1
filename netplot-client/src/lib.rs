//! Netplot Client
//!
//! Async client for a netplot server, plus a demo driver that exercises
//! every chart type.
//!
//! ```no_run
//! use netplot_client::{NetplotClient, PlotConfig};
//!
//! # async fn example() -> netplot_client::Result<()> {
//! let mut client = NetplotClient::connect("localhost", 9600).await?;
//! client.set_plot_type_with_title("xy", "Scope").await?;
//! client.add_plot(Some(&PlotConfig::named("Trace"))).await?;
//! client.add_xy_value(0, 1.0, 2.5).await?;
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod demo;
pub mod error;
pub mod plot_config;

pub use client::{DEFAULT_RESPONSE_TIMEOUT, NetplotClient};
pub use demo::{DemoKind, DemoSettings};
pub use error::{ClientError, Result};
pub use plot_config::PlotConfig;
