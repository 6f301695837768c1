//! The render surface shared by every session.
//!
//! One table of chart slots, the grid layout, the frame title and the
//! status log live behind a single lock. Every mutation, and every call into
//! the [`ChartRenderer`], happens while that lock is held, so a grid change
//! is globally ordered against chart updates from all slots.
//!
//! A session attaches a full [`ChartModel`] once and gets back a generation
//! number. Later updates are [`PlotChange`]s applied to the stored model in
//! place, accepted only while that generation still owns the slot.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::config::SurfaceConfig;
use crate::error::{PlotError, Result};
use crate::plot::{ChartModel, PlotChange};
use crate::state::WindowGeometry;

/// Narrow drawing interface implemented by whatever displays the charts.
pub trait ChartRenderer: Send + Sync {
    /// Redraw the chart in `slot`.
    fn draw(&self, slot: usize, model: &ChartModel);

    /// Arrange the slots in a grid.
    fn layout(&self, rows: usize, columns: usize);

    fn title(&self, title: &str);

    /// Append one line to the operator status view.
    fn status(&self, line: &str);

    /// Current window position and size, if the renderer has a window.
    fn geometry(&self) -> Option<WindowGeometry> {
        None
    }
}

/// Renderer that reports every surface change through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRenderer;

impl ChartRenderer for TracingRenderer {
    fn draw(&self, slot: usize, model: &ChartModel) {
        debug!(
            slot,
            kind = %model.kind,
            title = %model.title,
            plots = model.plots.len(),
            points = model.point_count(),
            "Chart updated"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            match serde_json::to_string(model) {
                Ok(json) => trace!(slot, model = %json, "Chart model"),
                Err(e) => trace!(slot, error = %e, "Failed to serialize chart model"),
            }
        }
    }

    fn layout(&self, rows: usize, columns: usize) {
        info!(rows, columns, "Chart grid changed");
    }

    fn title(&self, title: &str) {
        info!(title, "Frame title changed");
    }

    fn status(&self, line: &str) {
        debug!(target: "netplot::status", "{}", line);
    }
}

#[derive(Clone)]
struct SlotEntry {
    generation: u64,
    model: ChartModel,
}

struct SurfaceState {
    slots: Vec<Option<SlotEntry>>,
    next_generation: u64,
    grid: (usize, usize),
    frame_title: String,
    status_enabled: bool,
    status_log: VecDeque<String>,
    status_capacity: usize,
}

/// Cloneable handle to the shared surface.
#[derive(Clone)]
pub struct RenderSurface {
    state: Arc<Mutex<SurfaceState>>,
    renderer: Arc<dyn ChartRenderer>,
}

impl RenderSurface {
    /// Create a surface with `max_slots` empty slots laid out as one chart.
    pub fn new(max_slots: usize, config: &SurfaceConfig, renderer: Arc<dyn ChartRenderer>) -> Self {
        let state = SurfaceState {
            slots: vec![None; max_slots],
            next_generation: 1,
            grid: (1, 1),
            frame_title: config.frame_title.clone(),
            status_enabled: config.status_enabled,
            status_log: VecDeque::with_capacity(config.status_log_capacity.min(1024)),
            status_capacity: config.status_log_capacity.max(1),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            renderer,
        }
    }

    /// Surface that renders through [`TracingRenderer`].
    pub fn with_tracing(max_slots: usize, config: &SurfaceConfig) -> Self {
        Self::new(max_slots, config, Arc::new(TracingRenderer))
    }

    pub fn max_slots(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// Place `model` in `slot`, replacing whatever was shown there.
    ///
    /// Returns the generation to pass to [`apply`](Self::apply), or `None`
    /// when the slot is outside the surface.
    pub fn attach(&self, slot: usize, model: ChartModel) -> Option<u64> {
        let mut state = self.state.lock();
        let generation = state.next_generation;
        let Some(entry) = state.slots.get_mut(slot) else {
            warn!(slot, "Ignoring chart for a slot outside the surface");
            return None;
        };
        self.renderer.draw(slot, &model);
        *entry = Some(SlotEntry { generation, model });
        state.next_generation += 1;
        Some(generation)
    }

    /// Apply `changes` to the chart in `slot` and redraw it.
    ///
    /// Returns false without drawing when the slot no longer holds
    /// `generation`, or when a change does not fit the stored model. The
    /// caller then re-attaches a full model.
    pub fn apply(&self, slot: usize, generation: u64, changes: &[PlotChange]) -> bool {
        let mut state = self.state.lock();
        let entry = match state.slots.get_mut(slot) {
            Some(Some(entry)) if entry.generation == generation => entry,
            _ => return false,
        };
        for change in changes {
            if !entry.model.apply(change) {
                debug!(slot, ?change, "Change does not fit the displayed chart");
                return false;
            }
        }
        self.renderer.draw(slot, &entry.model);
        true
    }

    /// Change the chart grid. The grid may not hold more charts than slots.
    pub fn set_grid(&self, rows: usize, columns: usize) -> Result<()> {
        let mut state = self.state.lock();
        let max = state.slots.len();
        match rows.checked_mul(columns) {
            Some(cells) if cells <= max => {}
            _ => return Err(PlotError::GridTooLarge { rows, columns, max }),
        }
        state.grid = (rows, columns);
        self.renderer.layout(rows, columns);
        Ok(())
    }

    pub fn grid(&self) -> (usize, usize) {
        self.state.lock().grid
    }

    pub fn set_frame_title(&self, title: &str) {
        let mut state = self.state.lock();
        state.frame_title = title.to_string();
        self.renderer.title(title);
    }

    pub fn frame_title(&self) -> String {
        self.state.lock().frame_title.clone()
    }

    pub fn set_status_enabled(&self, enabled: bool) {
        self.state.lock().status_enabled = enabled;
    }

    pub fn status_enabled(&self) -> bool {
        self.state.lock().status_enabled
    }

    /// Append a line to the status log. Dropped when the log is disabled.
    pub fn status(&self, line: &str) {
        self.echo(&[line]);
    }

    /// Append `lines` to the status log as one uninterrupted block.
    pub fn echo(&self, lines: &[&str]) {
        let mut state = self.state.lock();
        if !state.status_enabled {
            return;
        }
        for line in lines {
            if state.status_log.len() >= state.status_capacity {
                state.status_log.pop_front();
            }
            state.status_log.push_back(line.to_string());
            self.renderer.status(line);
        }
    }

    pub fn status_lines(&self) -> Vec<String> {
        self.state.lock().status_log.iter().cloned().collect()
    }

    /// Copy of the chart currently shown in `slot`.
    pub fn snapshot(&self, slot: usize) -> Option<ChartModel> {
        self.state
            .lock()
            .slots
            .get(slot)
            .and_then(|entry| entry.as_ref())
            .map(|entry| entry.model.clone())
    }

    pub fn geometry(&self) -> Option<WindowGeometry> {
        let _state = self.state.lock();
        self.renderer.geometry()
    }
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RenderSurface")
            .field("slots", &state.slots.len())
            .field("grid", &state.grid)
            .field("frame_title", &state.frame_title)
            .finish()
    }
}
