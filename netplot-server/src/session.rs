//! Per-connection command interpreter.
//!
//! A session owns at most one chart variant and walks it through
//! `set graph` → `set ...` → `init` → `add_plot` → data. Every line yields
//! exactly one [`Reply`]; failures never end the session.

use netplot_common::{ChartKind, Reply, keywords};
use tracing::debug;

use crate::command::{self, Command, DataLine};
use crate::error::{PlotError, Result};
use crate::plot::{self, PlotVariant};
use crate::surface::RenderSurface;

/// Where a session is in the chart lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No `set graph` yet.
    NoType,
    /// A chart type was chosen.
    TypeSelected,
    /// At least one attribute was set after choosing the type.
    Configured,
    /// `init` ran; plots may be added.
    Initialized,
    /// At least one plot was added; data is accepted.
    Feeding,
}

pub struct Session {
    slot: usize,
    surface: RenderSurface,
    variant: Option<Box<dyn PlotVariant>>,
    state: SessionState,
    /// Surface generation of the chart this session last attached.
    generation: Option<u64>,
}

impl Session {
    pub fn new(slot: usize, surface: RenderSurface) -> Self {
        Self {
            slot,
            surface,
            variant: None,
            state: SessionState::NoType,
            generation: None,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn variant(&self) -> Option<&dyn PlotVariant> {
        self.variant.as_deref()
    }

    /// Process one line and build its reply, echoing both to the status log.
    pub fn respond(&mut self, line: &str) -> Reply {
        let line = line.trim_end_matches(['\r', '\n']);
        let reply = match self.process_line(line) {
            Ok(()) => Reply::Ok,
            Err(e) => Reply::Error(e.to_string()),
        };
        debug!(slot = self.slot, line, reply = %reply, "Processed line");

        let echoed = format!("[{}] {}", self.slot, line);
        let answered = format!("[{}] {}", self.slot, reply);
        self.surface.echo(&[echoed.as_str(), answered.as_str()]);
        reply
    }

    /// Process one line.
    pub fn process_line(&mut self, line: &str) -> Result<()> {
        match command::parse(line)? {
            Command::Comment => Ok(()),
            Command::Set { name, value } => self.set(&name, &value),
            Command::Init => self.init(),
            Command::AddPlot => self.add_plot(),
            Command::Clear(index) => self.with_variant("clear a plot", |v| v.clear(index)),
            Command::Replot(index) => self.with_variant("replot", |v| v.replot(index)),
            Command::EnableStatus(enabled) => {
                self.surface.set_status_enabled(enabled);
                Ok(())
            }
            Command::Data(data) => self.data(data),
        }
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            keywords::GRAPH => {
                let kind: ChartKind = value.trim().parse()?;
                self.variant = Some(plot::create(kind));
                self.state = SessionState::TypeSelected;
                self.generation = None;
                debug!(slot = self.slot, %kind, "Chart type selected");
                Ok(())
            }
            keywords::GRID => {
                let (rows, columns) = parse_grid(name, value)?;
                self.surface.set_grid(rows, columns)
            }
            keywords::FRAME_TITLE => {
                self.surface.set_frame_title(value);
                Ok(())
            }
            _ => {
                let variant = self.variant.as_mut().ok_or(PlotError::NoGraphTypeSet {
                    action: "set attributes",
                })?;
                variant.set_attribute(name, value)?;
                if self.state == SessionState::TypeSelected {
                    self.state = SessionState::Configured;
                }
                Ok(())
            }
        }
    }

    fn init(&mut self) -> Result<()> {
        let variant = self
            .variant
            .as_mut()
            .ok_or(PlotError::NoGraphTypeSet { action: "init" })?;
        variant.init();
        self.state = SessionState::Initialized;
        Ok(())
    }

    fn add_plot(&mut self) -> Result<()> {
        let variant = self
            .variant
            .as_mut()
            .ok_or(PlotError::NoGraphTypeSet { action: "add a plot" })?;
        if !matches!(
            self.state,
            SessionState::Initialized | SessionState::Feeding
        ) {
            return Err(PlotError::NotInitialized { action: "add a plot" });
        }

        let handle = variant.add_plot()?;
        debug!(
            slot = self.slot,
            index = handle.index,
            name = %handle.name,
            axis = handle.axis,
            "Plot added"
        );
        variant.take_changes();
        self.generation = self.surface.attach(self.slot, variant.render());
        self.state = SessionState::Feeding;
        Ok(())
    }

    fn with_variant(
        &mut self,
        action: &'static str,
        op: impl FnOnce(&mut dyn PlotVariant) -> Result<()>,
    ) -> Result<()> {
        let variant = self
            .variant
            .as_deref_mut()
            .ok_or(PlotError::NoGraphTypeSet { action })?;
        let result = op(variant);

        // Publish whatever was applied, even when the command failed part way.
        let changes = variant.take_changes();
        if self.state == SessionState::Feeding {
            let applied = self
                .generation
                .is_some_and(|generation| self.surface.apply(self.slot, generation, &changes));
            if !applied {
                self.generation = self.surface.attach(self.slot, variant.render());
            }
        }
        result
    }

    fn data(&mut self, data: DataLine) -> Result<()> {
        if self.state != SessionState::Feeding {
            return Err(PlotError::NotInitialized {
                action: "add plot values",
            });
        }
        self.with_variant("add plot values", |variant| apply(variant, data))
    }
}

/// Apply a data line. Plot indices are checked up front so a bad index
/// leaves every plot untouched.
fn apply(variant: &mut dyn PlotVariant, data: DataLine) -> Result<()> {
    let kind = variant.kind();
    let count = variant.plot_count();
    let invalid = |index| PlotError::InvalidIndex { kind, index, count };

    match data {
        DataLine::Sequential(values) => {
            if values.len() > count {
                return Err(invalid(values.len() - 1));
            }
            for (index, y) in values.into_iter().enumerate() {
                variant.add_value(index, y)?;
            }
        }
        DataLine::Indexed(values) => {
            if let Some(bad) = values.iter().find(|v| v.index >= count) {
                return Err(invalid(bad.index));
            }
            for value in values {
                variant.add_xy_value(value.index, value.x, value.y)?;
            }
        }
        DataLine::Timestamped { index, timestamp, y } => {
            variant.add_timed_value(index, timestamp, y)?;
        }
    }
    Ok(())
}

/// Parse `rows,columns`, both at least 1.
fn parse_grid(name: &str, value: &str) -> Result<(usize, usize)> {
    let line = format!("{}{}={}", keywords::SET_PREFIX, name, value);
    let (rows, columns) = value
        .split_once(',')
        .ok_or_else(|| PlotError::parse(&line, "expected grid=rows,columns"))?;

    let dimension = |s: &str| match s.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PlotError::parse(
            &line,
            format!("'{}' is not a positive grid dimension", s.trim()),
        )),
    };
    Ok((dimension(rows)?, dimension(columns)?))
}
