//! Render-ready chart snapshots.
//!
//! Variants never hand out their internal buffers. When a plot is added they
//! publish a full [`ChartModel`], which the render surface stores per slot.
//! After that each data line only sends the [`PlotChange`]s it caused, and
//! the surface applies them to its stored model in place.

use netplot_common::ChartKind;
use serde::Serialize;

use crate::attributes::ChartAttributes;

/// Sub-plot colours, assigned in `add_plot` order and reused cyclically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotColor {
    Blue,
    Black,
    Red,
    Green,
    Cyan,
    DarkGray,
    Gray,
    LightGray,
    Magenta,
    Orange,
    Pink,
    Yellow,
}

impl PlotColor {
    pub const PALETTE: [PlotColor; 12] = [
        PlotColor::Blue,
        PlotColor::Black,
        PlotColor::Red,
        PlotColor::Green,
        PlotColor::Cyan,
        PlotColor::DarkGray,
        PlotColor::Gray,
        PlotColor::LightGray,
        PlotColor::Magenta,
        PlotColor::Orange,
        PlotColor::Pink,
        PlotColor::Yellow,
    ];

    /// Colour of the `index`th sub-plot.
    pub fn for_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

/// One Y axis (or dial scale).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisModel {
    pub name: String,
    pub log_scale: bool,
    pub autoscale: bool,
    pub min: f64,
    pub max: f64,
    pub include_zero: bool,
    pub tick_count: u32,
}

impl AxisModel {
    pub(crate) fn from_attributes(attrs: &ChartAttributes) -> Self {
        Self {
            name: attrs.y_axis_name.clone(),
            log_scale: attrs.log_y_axis,
            autoscale: attrs.autoscale_enabled,
            min: attrs.min_scale_value,
            max: attrs.max_scale_value,
            include_zero: attrs.zero_on_y_scale,
            tick_count: attrs.tick_count,
        }
    }
}

/// What a sub-plot currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotData {
    /// `(x, y)` pairs. Time series use milliseconds since the epoch as x.
    Points(Vec<(f64, f64)>),
    /// Dial needle position.
    Value(f64),
}

impl PlotData {
    pub fn points(&self) -> &[(f64, f64)] {
        match self {
            PlotData::Points(points) => points,
            PlotData::Value(_) => &[],
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            PlotData::Value(value) => Some(*value),
            PlotData::Points(_) => None,
        }
    }
}

/// One trace within a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubPlotModel {
    pub name: String,
    pub color: PlotColor,
    /// Index into [`ChartModel::axes`].
    pub axis: usize,
    pub lines: bool,
    pub shapes: bool,
    pub line_width: u32,
    pub data: PlotData,
}

/// Snapshot of a whole chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis_name: String,
    pub legend: bool,
    pub include_zero_x: bool,
    pub axes: Vec<AxisModel>,
    pub plots: Vec<SubPlotModel>,
}

impl ChartModel {
    /// Total number of points across all sub-plots.
    pub fn point_count(&self) -> usize {
        self.plots.iter().map(|plot| plot.data.points().len()).sum()
    }

    /// Apply one change in place. Returns false, leaving the model as it
    /// was, when the change does not fit this model.
    pub fn apply(&mut self, change: &PlotChange) -> bool {
        let Some(plot) = self.plots.get_mut(change.plot()) else {
            return false;
        };

        match (&mut plot.data, change) {
            (PlotData::Points(points), PlotChange::SetPoint { at, point, .. }) => {
                if *at < points.len() {
                    points[*at] = *point;
                } else if *at == points.len() {
                    points.push(*point);
                } else {
                    return false;
                }
            }
            (PlotData::Points(points), PlotChange::InsertPoint { at, point, .. }) => {
                if *at > points.len() {
                    return false;
                }
                points.insert(*at, *point);
            }
            (PlotData::Points(points), PlotChange::DropOldest { count, .. }) => {
                if *count > points.len() {
                    return false;
                }
                points.drain(..*count);
            }
            (PlotData::Points(points), PlotChange::ClearPoints { .. }) => points.clear(),
            (PlotData::Value(current), PlotChange::SetValue { value, .. }) => *current = *value,
            _ => return false,
        }
        true
    }
}

/// One edit to a sub-plot's data, as produced by a single command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotChange {
    /// Replace point `at`, or append when `at` is the current length.
    SetPoint {
        plot: usize,
        at: usize,
        point: (f64, f64),
    },
    /// Insert a point before position `at`.
    InsertPoint {
        plot: usize,
        at: usize,
        point: (f64, f64),
    },
    /// Remove the first `count` points.
    DropOldest { plot: usize, count: usize },
    ClearPoints { plot: usize },
    SetValue { plot: usize, value: f64 },
}

impl PlotChange {
    /// Index of the sub-plot this change edits.
    pub fn plot(&self) -> usize {
        match *self {
            PlotChange::SetPoint { plot, .. }
            | PlotChange::InsertPoint { plot, .. }
            | PlotChange::DropOldest { plot, .. }
            | PlotChange::ClearPoints { plot }
            | PlotChange::SetValue { plot, .. } => plot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps() {
        assert_eq!(PlotColor::for_index(0), PlotColor::Blue);
        assert_eq!(PlotColor::for_index(2), PlotColor::Red);
        assert_eq!(PlotColor::for_index(11), PlotColor::Yellow);
        assert_eq!(PlotColor::for_index(12), PlotColor::Blue);
        assert_eq!(PlotColor::for_index(25), PlotColor::Black);
    }

    #[test]
    fn test_model_serializes() {
        let model = ChartModel {
            kind: ChartKind::Dial,
            title: "Pressure".to_string(),
            x_axis_name: String::new(),
            legend: true,
            include_zero_x: true,
            axes: vec![AxisModel::from_attributes(&ChartAttributes::default())],
            plots: vec![SubPlotModel {
                name: "P1".to_string(),
                color: PlotColor::DarkGray,
                axis: 0,
                lines: true,
                shapes: false,
                line_width: 1,
                data: PlotData::Value(3.5),
            }],
        };

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["kind"], "dial");
        assert_eq!(json["plots"][0]["color"], "dark_gray");
        assert_eq!(json["plots"][0]["data"]["value"], 3.5);
        assert_eq!(model.point_count(), 0);
    }

    fn line_chart(points: Vec<(f64, f64)>) -> ChartModel {
        ChartModel {
            kind: ChartKind::Xy,
            title: String::new(),
            x_axis_name: String::new(),
            legend: true,
            include_zero_x: true,
            axes: Vec::new(),
            plots: vec![SubPlotModel {
                name: String::new(),
                color: PlotColor::Blue,
                axis: 0,
                lines: true,
                shapes: true,
                line_width: 1,
                data: PlotData::Points(points),
            }],
        }
    }

    #[test]
    fn test_apply_point_changes() {
        let mut model = line_chart(vec![(1.0, 1.0), (3.0, 3.0)]);

        assert!(model.apply(&PlotChange::SetPoint {
            plot: 0,
            at: 0,
            point: (1.0, 9.0),
        }));
        assert!(model.apply(&PlotChange::SetPoint {
            plot: 0,
            at: 2,
            point: (4.0, 4.0),
        }));
        assert!(model.apply(&PlotChange::InsertPoint {
            plot: 0,
            at: 1,
            point: (2.0, 2.0),
        }));
        assert_eq!(
            model.plots[0].data.points(),
            &[(1.0, 9.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]
        );

        assert!(model.apply(&PlotChange::DropOldest { plot: 0, count: 3 }));
        assert_eq!(model.plots[0].data.points(), &[(4.0, 4.0)]);

        assert!(model.apply(&PlotChange::ClearPoints { plot: 0 }));
        assert_eq!(model.point_count(), 0);
    }

    #[test]
    fn test_apply_rejects_mismatched_changes() {
        let mut model = line_chart(vec![(1.0, 1.0)]);
        let before = model.clone();

        for change in [
            PlotChange::SetPoint {
                plot: 0,
                at: 5,
                point: (0.0, 0.0),
            },
            PlotChange::InsertPoint {
                plot: 0,
                at: 2,
                point: (0.0, 0.0),
            },
            PlotChange::DropOldest { plot: 0, count: 2 },
            PlotChange::SetValue { plot: 0, value: 1.0 },
            PlotChange::ClearPoints { plot: 1 },
        ] {
            assert!(!model.apply(&change), "{:?}", change);
        }
        assert_eq!(model, before);
    }
}
