//! Vocabulary of the netplot line protocol.
//!
//! Every client command is a single line of text. The server greets each
//! connection with [`greeting`] and answers every line with exactly one
//! [`Reply`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Error, Result};

/// Protocol version announced in the greeting line.
pub const PROTOCOL_VERSION: f64 = 1.9;

/// Prefix of the greeting line sent by the server on connect.
pub const GREETING_PREFIX: &str = "netplot_version=";

/// Successful reply line.
pub const REPLY_OK: &str = "OK";

/// Prefix of a failure reply line.
pub const REPLY_ERROR_PREFIX: &str = "ERROR: ";

/// Separator between the seven fields of a timestamp tuple.
pub const TIMESTAMP_DELIM: char = ';';

/// Command and attribute keywords.
pub mod keywords {
    pub const SET_PREFIX: &str = "set ";
    pub const INIT: &str = "init";
    pub const ADD_PLOT: &str = "add_plot";
    pub const CLEAR: &str = "clear";
    pub const REPLOT: &str = "replot";
    pub const ENABLE_STATUS: &str = "enable_status";

    // Session-level names
    pub const GRAPH: &str = "graph";
    pub const GRID: &str = "grid";
    pub const FRAME_TITLE: &str = "frame_title";

    // Chart attribute names
    pub const PLOT_TITLE: &str = "plot_title";
    pub const PLOT_NAME: &str = "plot_name";
    pub const X_AXIS_NAME: &str = "x_axis_name";
    pub const Y_AXIS_NAME: &str = "y_axis_name";
    pub const ENABLE_LINES: &str = "enable_lines";
    pub const ENABLE_SHAPES: &str = "enable_shapes";
    pub const ENABLE_AUTOSCALE: &str = "enable_autoscale";
    pub const MIN_SCALE_VALUE: &str = "min_scale_value";
    pub const MAX_SCALE_VALUE: &str = "max_scale_value";
    pub const MAX_AGE_SECONDS: &str = "max_age_seconds";
    pub const ENABLE_LOG_Y_AXIS: &str = "enable_log_y_axis";
    pub const ENABLE_ZERO_ON_X_SCALE: &str = "enable_zero_on_x_scale";
    pub const ENABLE_ZERO_ON_Y_SCALE: &str = "enable_zero_on_y_scale";
    pub const ENABLE_LEGEND: &str = "enable_legend";
    pub const TICK_COUNT: &str = "tick_count";
    pub const LINE_WIDTH: &str = "line_width";
}

/// Build the greeting line (without line terminator).
pub fn greeting() -> String {
    format!("{}{}", GREETING_PREFIX, PROTOCOL_VERSION)
}

/// Parse a greeting line and return the announced protocol version.
pub fn parse_greeting(line: &str) -> Result<f64> {
    line.trim_end()
        .strip_prefix(GREETING_PREFIX)
        .and_then(|version| version.parse::<f64>().ok())
        .ok_or_else(|| Error::Greeting(line.to_string()))
}

/// One reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Error(String),
}

impl Reply {
    /// Classify a reply line received from the server.
    ///
    /// Anything that is not an error reply counts as success.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end();
        match line.strip_prefix(REPLY_ERROR_PREFIX) {
            Some(message) => Reply::Error(message.to_string()),
            None => Reply::Ok,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Ok)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => f.write_str(REPLY_OK),
            Reply::Error(message) => write!(f, "{}{}", REPLY_ERROR_PREFIX, message),
        }
    }
}

/// The chart types a slot can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Time,
    Bar,
    Xy,
    Dial,
}

impl ChartKind {
    /// Keyword used in `set graph=<kind>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Time => "time",
            ChartKind::Bar => "bar",
            ChartKind::Xy => "xy",
            ChartKind::Dial => "dial",
        }
    }

    pub fn all() -> &'static [ChartKind] {
        &[ChartKind::Time, ChartKind::Bar, ChartKind::Xy, ChartKind::Dial]
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a graph type keyword is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is an unknown graph type (expected time, bar, xy or dial)")]
pub struct UnknownChartKind(pub String);

impl FromStr for ChartKind {
    type Err = UnknownChartKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ChartKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownChartKind(s.to_string()))
    }
}

/// Format a timestamp as `year;month;day;hour;minute;second;millisecond`.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    let d = TIMESTAMP_DELIM;
    format!(
        "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second(),
        ts.nanosecond() / 1_000_000 % 1000,
    )
}

/// Parse a `year;month;day;hour;minute;second;millisecond` tuple.
///
/// Months and days are 1-based. Exactly seven integer fields are required.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let fields: Vec<&str> = s.split(TIMESTAMP_DELIM).map(str::trim).collect();
    if fields.len() != 7 {
        return Err(Error::timestamp(
            s,
            format!("expected 7 fields, found {}", fields.len()),
        ));
    }

    let mut values = [0u32; 7];
    for (slot, field) in values.iter_mut().zip(&fields) {
        *slot = field
            .parse::<u32>()
            .map_err(|_| Error::timestamp(s, format!("'{}' is not an integer", field)))?;
    }
    let [year, month, day, hour, minute, second, millis] = values;

    let year = i32::try_from(year).map_err(|_| Error::timestamp(s, "year out of range"))?;
    // chrono reads 1000..=1999 ms at second 59 as a leap second.
    if millis > 999 {
        return Err(Error::timestamp(s, "millisecond must be 0 to 999"));
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_milli_opt(hour, minute, second, millis))
        .ok_or_else(|| Error::timestamp(s, "no such date/time"))
}
