//! Per-plot settings sent before each `add_plot`.

use netplot_common::keywords;

/// Settings for a single trace.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub plot_name: String,
    pub x_axis_name: String,
    pub y_axis_name: String,
    pub enable_lines: bool,
    pub line_width: u32,
    pub enable_shapes: bool,
    pub enable_autoscale: bool,
    pub min_scale_value: f64,
    pub max_scale_value: f64,
    pub max_age_seconds: u64,
    pub enable_log_y_axis: bool,
    pub enable_zero_on_x_scale: bool,
    pub enable_zero_on_y_scale: bool,
    pub tick_count: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            plot_name: String::new(),
            x_axis_name: String::new(),
            y_axis_name: String::new(),
            enable_lines: true,
            line_width: 1,
            enable_shapes: true,
            enable_autoscale: true,
            min_scale_value: 0.0,
            max_scale_value: 1e6,
            max_age_seconds: 3600,
            enable_log_y_axis: false,
            enable_zero_on_x_scale: true,
            enable_zero_on_y_scale: true,
            tick_count: 0,
        }
    }
}

impl PlotConfig {
    /// Config with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            plot_name: name.into(),
            ..Self::default()
        }
    }

    /// `(attribute, value)` pairs, in the order they are sent.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            (keywords::PLOT_NAME, self.plot_name.clone()),
            (keywords::X_AXIS_NAME, self.x_axis_name.clone()),
            (keywords::Y_AXIS_NAME, self.y_axis_name.clone()),
            (keywords::ENABLE_LINES, self.enable_lines.to_string()),
            (keywords::LINE_WIDTH, self.line_width.to_string()),
            (keywords::ENABLE_SHAPES, self.enable_shapes.to_string()),
            (keywords::ENABLE_AUTOSCALE, self.enable_autoscale.to_string()),
            (keywords::MIN_SCALE_VALUE, self.min_scale_value.to_string()),
            (keywords::MAX_SCALE_VALUE, self.max_scale_value.to_string()),
            (keywords::MAX_AGE_SECONDS, self.max_age_seconds.to_string()),
            (keywords::ENABLE_LOG_Y_AXIS, self.enable_log_y_axis.to_string()),
            (
                keywords::ENABLE_ZERO_ON_X_SCALE,
                self.enable_zero_on_x_scale.to_string(),
            ),
            (
                keywords::ENABLE_ZERO_ON_Y_SCALE,
                self.enable_zero_on_y_scale.to_string(),
            ),
            (keywords::TICK_COUNT, self.tick_count.to_string()),
        ]
    }
}
