//! The four chart variants and the contract they share.
//!
//! Each variant embeds a [`ChartBase`] holding its attributes, axes,
//! per-plot styling and the [`PlotChange`]s not yet published, and adds its
//! own data buffers and write policy on top:
//!
//! - [`TimeSeriesPlot`] - points keyed by timestamp, duplicate timestamps update
//! - [`BarPlot`] - a single series with an implicit category counter
//! - [`XyPlot`] - explicit `(x, y)` points with a per-plot write cursor
//! - [`DialPlot`] - up to two scalar needles

mod bar;
mod dial;
pub mod model;
mod time_series;
mod xy;

pub use bar::BarPlot;
pub use dial::DialPlot;
pub use model::{AxisModel, ChartModel, PlotChange, PlotColor, PlotData, SubPlotModel};
pub use time_series::TimeSeriesPlot;
pub use xy::XyPlot;

use chrono::NaiveDateTime;
use netplot_common::ChartKind;

use crate::attributes::ChartAttributes;
use crate::error::{PlotError, Result};

/// Identity of a freshly added sub-plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotHandle {
    pub index: usize,
    pub name: String,
    pub color: PlotColor,
    pub axis: usize,
}

/// Behaviour shared by every chart variant.
///
/// Data forms a variant does not understand fall through to the default
/// implementations, which reject them with [`PlotError::UnsupportedOperation`].
pub trait PlotVariant: Send {
    fn base(&self) -> &ChartBase;
    fn base_mut(&mut self) -> &mut ChartBase;

    fn kind(&self) -> ChartKind {
        self.base().kind
    }

    fn attributes(&self) -> &ChartAttributes {
        &self.base().attributes
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.base_mut().attributes.set(name, value)
    }

    /// Reallocate the chart from the current attributes, dropping all plots.
    fn init(&mut self);

    /// Register a sub-plot using the current attributes.
    fn add_plot(&mut self) -> Result<PlotHandle>;

    /// Sequential form: one value for plot `index`.
    fn add_value(&mut self, _index: usize, _y: f64) -> Result<()> {
        Err(PlotError::unsupported(self.kind(), "adding sequential values"))
    }

    /// Indexed form: an explicit `(x, y)` point.
    fn add_xy_value(&mut self, _index: usize, _x: f64, _y: f64) -> Result<()> {
        Err(PlotError::unsupported(self.kind(), "adding x/y values"))
    }

    /// Indexed form: a value at a given timestamp.
    fn add_timed_value(&mut self, _index: usize, _at: NaiveDateTime, _y: f64) -> Result<()> {
        Err(PlotError::unsupported(self.kind(), "adding timestamped values"))
    }

    /// Empty plot `index`, keeping its name, colour and axis.
    fn clear(&mut self, index: usize) -> Result<()>;

    /// Rewind the write position of plot `index`.
    fn replot(&mut self, index: usize) -> Result<()>;

    fn plot_count(&self) -> usize {
        self.base().plot_count()
    }

    /// Snapshot the whole chart for the render surface.
    fn render(&self) -> ChartModel;

    /// Data changes made since the last call, oldest first.
    fn take_changes(&mut self) -> Vec<PlotChange> {
        std::mem::take(&mut self.base_mut().changes)
    }
}

/// Create an empty variant of the given kind.
pub fn create(kind: ChartKind) -> Box<dyn PlotVariant> {
    match kind {
        ChartKind::Time => Box::new(TimeSeriesPlot::new()),
        ChartKind::Bar => Box::new(BarPlot::new()),
        ChartKind::Xy => Box::new(XyPlot::new()),
        ChartKind::Dial => Box::new(DialPlot::new()),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ChartHeader {
    title: String,
    x_axis_name: String,
    legend: bool,
    include_zero_x: bool,
}

impl ChartHeader {
    fn from_attributes(attrs: &ChartAttributes) -> Self {
        Self {
            title: attrs.plot_title.clone(),
            x_axis_name: attrs.x_axis_name.clone(),
            legend: attrs.legend_enabled,
            include_zero_x: attrs.zero_on_x_scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PlotStyle {
    name: String,
    color: PlotColor,
    axis: usize,
    lines: bool,
    shapes: bool,
    line_width: u32,
}

/// State common to all variants: attributes, axes and per-plot styling.
#[derive(Debug, Clone)]
pub struct ChartBase {
    kind: ChartKind,
    attributes: ChartAttributes,
    header: ChartHeader,
    axes: Vec<AxisModel>,
    allocated_axes: usize,
    styles: Vec<PlotStyle>,
    changes: Vec<PlotChange>,
}

impl ChartBase {
    pub fn new(kind: ChartKind) -> Self {
        let attributes = ChartAttributes::default();
        Self {
            kind,
            header: ChartHeader::from_attributes(&attributes),
            axes: vec![AxisModel::from_attributes(&attributes)],
            allocated_axes: 0,
            styles: Vec::new(),
            changes: Vec::new(),
            attributes,
        }
    }

    /// Rebuild header and default axis from the attributes, dropping plots.
    pub(crate) fn reset(&mut self) {
        self.header = ChartHeader::from_attributes(&self.attributes);
        self.axes = vec![AxisModel::from_attributes(&self.attributes)];
        self.allocated_axes = 0;
        self.styles.clear();
        self.changes.clear();
    }

    pub(crate) fn record(&mut self, change: PlotChange) {
        self.changes.push(change);
    }

    /// Register a plot styled from the current attributes.
    ///
    /// A non-empty `y_axis_name` (or `dedicated_axis`) allocates an axis: the
    /// first allocation relabels the default axis, later ones append.
    pub(crate) fn register_plot(&mut self, dedicated_axis: bool) -> PlotHandle {
        let attrs = &self.attributes;
        if !attrs.plot_title.is_empty() {
            self.header.title = attrs.plot_title.clone();
        }
        if !attrs.x_axis_name.is_empty() {
            self.header.x_axis_name = attrs.x_axis_name.clone();
        }

        if dedicated_axis || !attrs.y_axis_name.is_empty() {
            let axis = AxisModel::from_attributes(attrs);
            match self.axes.get_mut(self.allocated_axes) {
                Some(slot) => *slot = axis,
                None => self.axes.push(axis),
            }
            self.allocated_axes += 1;
        }

        let index = self.styles.len();
        let style = PlotStyle {
            name: attrs.plot_name.clone(),
            color: PlotColor::for_index(index),
            axis: self.allocated_axes.saturating_sub(1),
            lines: attrs.lines_enabled,
            shapes: attrs.shapes_enabled,
            line_width: attrs.line_width,
        };
        let handle = PlotHandle {
            index,
            name: style.name.clone(),
            color: style.color,
            axis: style.axis,
        };
        self.styles.push(style);
        handle
    }

    /// Fail with `InvalidIndex` unless plot `index` exists.
    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index < self.styles.len() {
            Ok(())
        } else {
            Err(PlotError::InvalidIndex {
                kind: self.kind,
                index,
                count: self.styles.len(),
            })
        }
    }

    pub(crate) fn check_capacity(&self, max: usize) -> Result<()> {
        if self.styles.len() < max {
            Ok(())
        } else {
            Err(PlotError::TooManyPlots {
                kind: self.kind,
                max,
            })
        }
    }

    pub fn plot_count(&self) -> usize {
        self.styles.len()
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Combine the styling with one `PlotData` per plot.
    pub(crate) fn model(&self, data: impl IntoIterator<Item = PlotData>) -> ChartModel {
        let plots = self
            .styles
            .iter()
            .zip(data)
            .map(|(style, data)| SubPlotModel {
                name: style.name.clone(),
                color: style.color,
                axis: style.axis,
                lines: style.lines,
                shapes: style.shapes,
                line_width: style.line_width,
                data,
            })
            .collect();

        ChartModel {
            kind: self.kind,
            title: self.header.title.clone(),
            x_axis_name: self.header.x_axis_name.clone(),
            legend: self.header.legend,
            include_zero_x: self.header.include_zero_x,
            axes: self.axes.clone(),
            plots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_every_kind() {
        for kind in ChartKind::all() {
            let variant = create(*kind);
            assert_eq!(variant.kind(), *kind);
            assert_eq!(variant.plot_count(), 0);
        }
    }

    #[test]
    fn test_axis_allocation() {
        let mut base = ChartBase::new(ChartKind::Xy);
        base.attributes.set("y_axis_name", "Volts").unwrap();
        base.reset();
        assert_eq!(base.axis_count(), 1);

        // Named axis relabels the default one.
        let first = base.register_plot(false);
        assert_eq!(first.axis, 0);
        assert_eq!(base.axis_count(), 1);

        base.attributes.set("y_axis_name", "Amps").unwrap();
        let second = base.register_plot(false);
        assert_eq!(second.axis, 1);
        assert_eq!(base.axis_count(), 2);

        // Empty name keeps the latest axis.
        base.attributes.set("y_axis_name", "").unwrap();
        let third = base.register_plot(false);
        assert_eq!(third.axis, 1);
        assert_eq!(base.axis_count(), 2);
    }

    #[test]
    fn test_unnamed_plots_share_default_axis() {
        let mut base = ChartBase::new(ChartKind::Time);
        base.reset();
        assert_eq!(base.register_plot(false).axis, 0);
        assert_eq!(base.register_plot(false).axis, 0);
        assert_eq!(base.axis_count(), 1);
    }

    #[test]
    fn test_colours_follow_plot_order() {
        let mut base = ChartBase::new(ChartKind::Xy);
        let colours: Vec<_> = (0..13).map(|_| base.register_plot(false).color).collect();
        assert_eq!(colours[0], PlotColor::Blue);
        assert_eq!(colours[1], PlotColor::Black);
        assert_eq!(colours[12], PlotColor::Blue);
    }

    #[test]
    fn test_title_updates_on_add_plot() {
        let mut base = ChartBase::new(ChartKind::Bar);
        base.reset();
        base.attributes.set("plot_title", "Late title").unwrap();
        base.register_plot(false);
        let model = base.model([PlotData::Points(Vec::new())]);
        assert_eq!(model.title, "Late title");
    }

    #[test]
    fn test_check_index() {
        let mut base = ChartBase::new(ChartKind::Xy);
        assert_eq!(
            base.check_index(0),
            Err(PlotError::InvalidIndex {
                kind: ChartKind::Xy,
                index: 0,
                count: 0,
            })
        );
        base.register_plot(false);
        assert!(base.check_index(0).is_ok());
        assert!(base.check_index(1).is_err());
    }
}
