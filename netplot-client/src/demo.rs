//! Demo driver.
//!
//! Feeds randomly varying data into every chart type so a running server
//! can be exercised without a real data source.

use std::f64::consts::PI;
use std::time::Duration;

use chrono::{Local, TimeDelta};
use clap::ValueEnum;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::client::NetplotClient;
use crate::error::Result;
use crate::plot_config::PlotConfig;

/// Which charts the demo drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoKind {
    Time,
    Bar,
    Xy,
    Dial,
    /// One chart of each type on consecutive ports, laid out 2x2.
    All,
}

impl DemoKind {
    /// The single-chart demos, in slot order for [`DemoKind::All`].
    pub fn singles() -> &'static [DemoKind] {
        &[DemoKind::Time, DemoKind::Bar, DemoKind::Xy, DemoKind::Dial]
    }
}

/// How much data to send and how fast.
#[derive(Debug, Clone, Copy)]
pub struct DemoSettings {
    /// Values sent per trace.
    pub count: usize,
    /// Pause between updates.
    pub period: Duration,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            count: 100,
            period: Duration::from_millis(100),
        }
    }
}

/// Connect to `host:port` and run the chosen demo.
///
/// [`DemoKind::All`] uses ports `port` to `port + 3`, one chart per slot.
pub async fn run(host: &str, port: u16, kind: DemoKind, settings: DemoSettings) -> Result<()> {
    if kind != DemoKind::All {
        let mut client = NetplotClient::connect(host, port).await?;
        drive(&mut client, kind, settings).await?;
        return client.disconnect().await;
    }

    let mut clients = Vec::new();
    for (offset, kind) in DemoKind::singles().iter().enumerate() {
        let Some(slot_port) = port.checked_add(offset as u16) else {
            warn!(port, offset, "Slot port out of range, skipping");
            continue;
        };
        clients.push((NetplotClient::connect(host, slot_port).await?, *kind));
    }

    if let Some((first, _)) = clients.first_mut() {
        first.set_grid(2, 2).await?;
        first.set_frame_title("netplot demo").await?;
    }

    let mut tasks = JoinSet::new();
    for (mut client, kind) in clients {
        tasks.spawn(async move {
            drive(&mut client, kind, settings).await?;
            client.disconnect().await
        });
    }

    let mut result = Ok(());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "Demo chart failed");
                if result.is_ok() {
                    result = Err(e);
                }
            }
            Err(e) => warn!(error = %e, "Demo task panicked"),
        }
    }
    result
}

/// Run a demo on an open connection. [`DemoKind::All`] runs each chart in turn.
pub async fn drive<S>(
    client: &mut NetplotClient<S>,
    kind: DemoKind,
    settings: DemoSettings,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut rng = SmallRng::from_os_rng();
    let single = [kind];
    let kinds = match kind {
        DemoKind::All => DemoKind::singles(),
        _ => &single[..],
    };

    for kind in kinds {
        info!(?kind, count = settings.count, "Running demo");
        match kind {
            DemoKind::Time => time_demo(client, &mut rng, settings).await?,
            DemoKind::Bar => bar_demo(client, &mut rng, settings).await?,
            DemoKind::Xy => xy_demo(client, settings).await?,
            DemoKind::Dial | DemoKind::All => dial_demo(client, &mut rng, settings).await?,
        }
    }
    Ok(())
}

/// Two traces on separate y axes, then a cached burst of timestamped values.
async fn time_demo<S>(
    client: &mut NetplotClient<S>,
    rng: &mut SmallRng,
    settings: DemoSettings,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    client
        .set_plot_type_with_title("time", "Time chart, two traces with separate Y axes")
        .await?;

    let mut sine = PlotConfig::named("Sine");
    sine.x_axis_name = "Time".to_string();
    sine.y_axis_name = "Sine".to_string();
    sine.max_age_seconds = 60;
    client.add_plot(Some(&sine)).await?;

    let mut noise = PlotConfig::named("Noise");
    noise.y_axis_name = "Noise".to_string();
    noise.line_width = 3;
    noise.max_age_seconds = 60;
    client.add_plot(Some(&noise)).await?;

    for i in 0..settings.count {
        let x = i as f64 * 0.1;
        client
            .add_plot_values(&[x.sin(), rng.random_range(0.0..100.0)])
            .await?;
        tokio::time::sleep(settings.period).await;
    }

    client.enable_cache(true);
    let start = Local::now().naive_local();
    for i in 0..settings.count {
        let at = start + TimeDelta::milliseconds(i as i64 * 10);
        client.add_time_value(0, at, rng.random_range(-1.0..1.0)).await?;
        client.add_time_value(1, at, rng.random_range(0.0..100.0)).await?;
    }
    let sent = client.update().await;
    client.enable_cache(false);
    sent
}

async fn bar_demo<S>(
    client: &mut NetplotClient<S>,
    rng: &mut SmallRng,
    settings: DemoSettings,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    client.set_plot_type_with_title("bar", "Bar chart").await?;
    let mut config = PlotConfig::named("Load");
    config.x_axis_name = "Sample".to_string();
    config.y_axis_name = "Value".to_string();
    client.add_plot(Some(&config)).await?;

    // Ten bars, redrawn in place each round.
    let rounds = settings.count.div_ceil(10).max(1);
    for _ in 0..rounds {
        for _ in 0..10 {
            client
                .add_plot_values(&[rng.random_range(0.0..10_000.0)])
                .await?;
        }
        client.replot(0).await?;
        tokio::time::sleep(settings.period).await;
    }
    Ok(())
}

/// A Lissajous figure redrawn in place with `replot`.
async fn xy_demo<S>(client: &mut NetplotClient<S>, settings: DemoSettings) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    client
        .set_plot_type_with_title("xy", "XY chart, redrawn in place")
        .await?;
    let mut config = PlotConfig::named("Lissajous");
    config.x_axis_name = "X".to_string();
    config.y_axis_name = "Y".to_string();
    config.enable_zero_on_x_scale = false;
    config.enable_zero_on_y_scale = false;
    client.add_plot(Some(&config)).await?;

    let points = settings.count.max(1);
    for phase in 0..4 {
        let shift = phase as f64 * PI / 4.0;
        for i in 0..points {
            let t = 2.0 * PI * i as f64 / points as f64;
            client
                .add_xy_value(0, (3.0 * t + shift).sin(), (2.0 * t).sin())
                .await?;
        }
        client.replot(0).await?;
        tokio::time::sleep(settings.period).await;
    }
    Ok(())
}

async fn dial_demo<S>(
    client: &mut NetplotClient<S>,
    rng: &mut SmallRng,
    settings: DemoSettings,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    client.set_plot_type_with_title("dial", "Dial chart").await?;

    let mut speed = PlotConfig::named("Speed");
    speed.enable_autoscale = false;
    speed.min_scale_value = 0.0;
    speed.max_scale_value = 200.0;
    speed.tick_count = 10;
    client.add_plot(Some(&speed)).await?;

    let mut rpm = PlotConfig::named("RPM");
    rpm.enable_autoscale = false;
    rpm.min_scale_value = 0.0;
    rpm.max_scale_value = 8000.0;
    rpm.tick_count = 1000;
    client.add_plot(Some(&rpm)).await?;

    for _ in 0..settings.count {
        client
            .add_plot_values(&[rng.random_range(0.0..200.0), rng.random_range(0.0..8000.0)])
            .await?;
        tokio::time::sleep(settings.period).await;
    }
    Ok(())
}
