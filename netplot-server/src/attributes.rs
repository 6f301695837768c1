//! Chart attributes and the `set name=value` configurator.
//!
//! Every chart variant embeds one [`ChartAttributes`] record. Clients mutate
//! it incrementally with `set` commands; variants read a snapshot of it when
//! a chart is initialised and each time a plot is added.

use netplot_common::keywords;
use serde::Serialize;

use crate::error::{PlotError, Result};

/// Line width used when none has been set.
pub const DEFAULT_LINE_WIDTH: u32 = 1;

/// Recognised per-chart attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    PlotTitle,
    PlotName,
    XAxisName,
    YAxisName,
    EnableLines,
    EnableShapes,
    EnableAutoscale,
    MinScaleValue,
    MaxScaleValue,
    MaxAgeSeconds,
    EnableLogYAxis,
    EnableZeroOnXScale,
    EnableZeroOnYScale,
    EnableLegend,
    TickCount,
    LineWidth,
}

impl Attribute {
    /// Wire name of the attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlotTitle => keywords::PLOT_TITLE,
            Self::PlotName => keywords::PLOT_NAME,
            Self::XAxisName => keywords::X_AXIS_NAME,
            Self::YAxisName => keywords::Y_AXIS_NAME,
            Self::EnableLines => keywords::ENABLE_LINES,
            Self::EnableShapes => keywords::ENABLE_SHAPES,
            Self::EnableAutoscale => keywords::ENABLE_AUTOSCALE,
            Self::MinScaleValue => keywords::MIN_SCALE_VALUE,
            Self::MaxScaleValue => keywords::MAX_SCALE_VALUE,
            Self::MaxAgeSeconds => keywords::MAX_AGE_SECONDS,
            Self::EnableLogYAxis => keywords::ENABLE_LOG_Y_AXIS,
            Self::EnableZeroOnXScale => keywords::ENABLE_ZERO_ON_X_SCALE,
            Self::EnableZeroOnYScale => keywords::ENABLE_ZERO_ON_Y_SCALE,
            Self::EnableLegend => keywords::ENABLE_LEGEND,
            Self::TickCount => keywords::TICK_COUNT,
            Self::LineWidth => keywords::LINE_WIDTH,
        }
    }

    pub fn all() -> &'static [Attribute] {
        &[
            Self::PlotTitle,
            Self::PlotName,
            Self::XAxisName,
            Self::YAxisName,
            Self::EnableLines,
            Self::EnableShapes,
            Self::EnableAutoscale,
            Self::MinScaleValue,
            Self::MaxScaleValue,
            Self::MaxAgeSeconds,
            Self::EnableLogYAxis,
            Self::EnableZeroOnXScale,
            Self::EnableZeroOnYScale,
            Self::EnableLegend,
            Self::TickCount,
            Self::LineWidth,
        ]
    }

    /// Look up an attribute by its wire name.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|attr| attr.as_str() == name)
    }
}

/// Display options shared by every chart variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartAttributes {
    pub plot_title: String,
    pub plot_name: String,
    pub x_axis_name: String,
    pub y_axis_name: String,
    pub lines_enabled: bool,
    pub shapes_enabled: bool,
    pub autoscale_enabled: bool,
    pub min_scale_value: f64,
    pub max_scale_value: f64,
    pub max_age_seconds: u64,
    pub log_y_axis: bool,
    pub zero_on_x_scale: bool,
    pub zero_on_y_scale: bool,
    pub legend_enabled: bool,
    pub tick_count: u32,
    pub line_width: u32,
}

impl Default for ChartAttributes {
    fn default() -> Self {
        Self {
            plot_title: String::new(),
            plot_name: String::new(),
            x_axis_name: String::new(),
            y_axis_name: String::new(),
            lines_enabled: true,
            shapes_enabled: true,
            autoscale_enabled: true,
            min_scale_value: 0.0,
            max_scale_value: 0.0,
            max_age_seconds: 60,
            log_y_axis: false,
            zero_on_x_scale: true,
            zero_on_y_scale: false,
            legend_enabled: true,
            tick_count: 0,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl ChartAttributes {
    /// Apply `set name=value`.
    ///
    /// The value is fully validated before anything is written, so a failed
    /// call leaves the record untouched.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let attr = Attribute::lookup(name).ok_or_else(|| PlotError::UnknownAttribute {
            name: name.to_string(),
            value: value.to_string(),
        })?;

        match attr {
            Attribute::PlotTitle => self.plot_title = value.to_string(),
            Attribute::PlotName => self.plot_name = value.to_string(),
            Attribute::XAxisName => self.x_axis_name = value.to_string(),
            Attribute::YAxisName => self.y_axis_name = value.to_string(),
            Attribute::EnableLines => self.lines_enabled = parse_bool(name, value)?,
            Attribute::EnableShapes => self.shapes_enabled = parse_bool(name, value)?,
            Attribute::EnableAutoscale => self.autoscale_enabled = parse_bool(name, value)?,
            Attribute::MinScaleValue => self.min_scale_value = parse_f64(name, value)?,
            Attribute::MaxScaleValue => self.max_scale_value = parse_f64(name, value)?,
            Attribute::MaxAgeSeconds => self.max_age_seconds = parse_integer(name, value)?,
            Attribute::EnableLogYAxis => self.log_y_axis = parse_bool(name, value)?,
            Attribute::EnableZeroOnXScale => self.zero_on_x_scale = parse_bool(name, value)?,
            Attribute::EnableZeroOnYScale => self.zero_on_y_scale = parse_bool(name, value)?,
            Attribute::EnableLegend => self.legend_enabled = parse_bool(name, value)?,
            Attribute::TickCount => self.tick_count = parse_integer(name, value)?,
            Attribute::LineWidth => self.line_width = parse_integer(name, value)?,
        }
        Ok(())
    }

    /// Read an attribute back in its wire representation.
    pub fn get(&self, name: &str) -> Option<String> {
        let value = match Attribute::lookup(name)? {
            Attribute::PlotTitle => self.plot_title.clone(),
            Attribute::PlotName => self.plot_name.clone(),
            Attribute::XAxisName => self.x_axis_name.clone(),
            Attribute::YAxisName => self.y_axis_name.clone(),
            Attribute::EnableLines => self.lines_enabled.to_string(),
            Attribute::EnableShapes => self.shapes_enabled.to_string(),
            Attribute::EnableAutoscale => self.autoscale_enabled.to_string(),
            Attribute::MinScaleValue => self.min_scale_value.to_string(),
            Attribute::MaxScaleValue => self.max_scale_value.to_string(),
            Attribute::MaxAgeSeconds => self.max_age_seconds.to_string(),
            Attribute::EnableLogYAxis => self.log_y_axis.to_string(),
            Attribute::EnableZeroOnXScale => self.zero_on_x_scale.to_string(),
            Attribute::EnableZeroOnYScale => self.zero_on_y_scale.to_string(),
            Attribute::EnableLegend => self.legend_enabled.to_string(),
            Attribute::TickCount => self.tick_count.to_string(),
            Attribute::LineWidth => self.line_width.to_string(),
        };
        Some(value)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(PlotError::invalid_value(name, value, "true or false")),
    }
}

// Values are taken literally, like booleans; surrounding spaces are rejected.
fn parse_f64(name: &str, value: &str) -> Result<f64> {
    crate::command::parse_number(value, value)
        .map_err(|_| PlotError::invalid_value(name, value, "a number"))
}

fn parse_integer<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| PlotError::invalid_value(name, value, "a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let attrs = ChartAttributes::default();
        assert!(attrs.lines_enabled);
        assert!(attrs.autoscale_enabled);
        assert_eq!(attrs.max_age_seconds, 60);
        assert!(attrs.zero_on_x_scale);
        assert!(!attrs.zero_on_y_scale);
        assert_eq!(attrs.line_width, DEFAULT_LINE_WIDTH);
    }

    #[test]
    fn test_every_attribute_reads_back() {
        let samples = [
            ("plot_title", "Room temperatures"),
            ("plot_name", "Kitchen"),
            ("x_axis_name", "Time"),
            ("y_axis_name", "Celsius"),
            ("enable_lines", "false"),
            ("enable_shapes", "false"),
            ("enable_autoscale", "false"),
            ("min_scale_value", "-20.5"),
            ("max_scale_value", "45"),
            ("max_age_seconds", "3600"),
            ("enable_log_y_axis", "true"),
            ("enable_zero_on_x_scale", "false"),
            ("enable_zero_on_y_scale", "true"),
            ("enable_legend", "false"),
            ("tick_count", "10"),
            ("line_width", "3"),
        ];
        assert_eq!(samples.len(), Attribute::all().len());

        let mut attrs = ChartAttributes::default();
        for (name, value) in samples {
            attrs.set(name, value).unwrap();
            assert_eq!(attrs.get(name).as_deref(), Some(value), "{}", name);
        }
        assert_eq!(attrs.min_scale_value, -20.5);
        assert!(attrs.log_y_axis);
        assert_eq!(attrs.line_width, 3);
    }

    #[test]
    fn test_booleans_are_case_sensitive() {
        let mut attrs = ChartAttributes::default();
        let err = attrs.set("enable_legend", "TRUE").unwrap_err();
        assert!(matches!(err, PlotError::InvalidAttributeValue { .. }));
        assert!(attrs.legend_enabled);

        assert!(attrs.set("enable_lines", "1").is_err());
        assert!(attrs.lines_enabled);
    }

    #[test]
    fn test_invalid_number_keeps_previous_value() {
        let mut attrs = ChartAttributes::default();
        attrs.set("min_scale_value", "12.5").unwrap();

        let err = attrs.set("min_scale_value", "abc").unwrap_err();
        assert_eq!(
            err,
            PlotError::InvalidAttributeValue {
                name: "min_scale_value".to_string(),
                value: "abc".to_string(),
                expected: "a number",
            }
        );
        assert_eq!(attrs.min_scale_value, 12.5);

        assert!(attrs.set("tick_count", "-1").is_err());
        assert!(attrs.set("max_age_seconds", "1.5").is_err());
        assert_eq!(attrs, {
            let mut expected = ChartAttributes::default();
            expected.min_scale_value = 12.5;
            expected
        });
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let mut attrs = ChartAttributes::default();
        for (name, value) in [
            ("enable_legend", " true"),
            ("enable_lines", "false "),
            ("min_scale_value", " 5"),
            ("max_scale_value", "5 "),
            ("tick_count", " 10"),
            ("line_width", "1 "),
            ("max_age_seconds", "\t30"),
        ] {
            let err = attrs.set(name, value).unwrap_err();
            assert!(
                matches!(err, PlotError::InvalidAttributeValue { .. }),
                "{} = {:?}",
                name,
                value
            );
        }
        assert_eq!(attrs, ChartAttributes::default());

        attrs.set("min_scale_value", "5").unwrap();
        attrs.set("tick_count", "10").unwrap();
        assert_eq!(attrs.min_scale_value, 5.0);
        assert_eq!(attrs.tick_count, 10);
    }

    #[test]
    fn test_unknown_attribute() {
        let mut attrs = ChartAttributes::default();
        let err = attrs.set("colour", "red").unwrap_err();
        assert_eq!(
            err,
            PlotError::UnknownAttribute {
                name: "colour".to_string(),
                value: "red".to_string(),
            }
        );
        assert_eq!(attrs, ChartAttributes::default());
        assert!(attrs.get("colour").is_none());
    }

    #[test]
    fn test_session_level_names_are_not_chart_attributes() {
        for name in ["graph", "grid", "frame_title"] {
            assert!(Attribute::lookup(name).is_none());
        }
    }
}
