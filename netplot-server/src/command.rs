//! Line tokenizer for the netplot protocol.
//!
//! Classifies one line as a comment, an attribute assignment, a control
//! command or a data line. Data lines come in three forms:
//!
//! ```text
//! 1.5,2.5 3.5              sequential: value i goes to plot i
//! 0:1.0:2.0 1:1.0:4.0      indexed xy: plot:x:y triples
//! 0:2013;1;2;23;10;5;587:7 indexed timestamp: plot:y;m;d;h;m;s;ms:y
//! ```

use chrono::NaiveDateTime;
use netplot_common::keywords;
use netplot_common::protocol::{TIMESTAMP_DELIM, parse_timestamp};

use crate::error::{PlotError, Result};

/// A classified protocol line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Empty line or a line starting with `#` or `/`.
    Comment,
    /// `set name=value`.
    Set { name: String, value: String },
    /// `init`.
    Init,
    /// `add_plot`.
    AddPlot,
    /// `clear <index>`.
    Clear(usize),
    /// `replot <index>`.
    Replot(usize),
    /// `enable_status <0|1|false|true|no|yes>`.
    EnableStatus(bool),
    /// Values to plot.
    Data(DataLine),
}

/// One `plot:x:y` triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XyValue {
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

/// The three data line forms.
#[derive(Debug, Clone, PartialEq)]
pub enum DataLine {
    /// One value per plot, in `add_plot` order.
    Sequential(Vec<f64>),
    /// Explicit `plot:x:y` triples.
    Indexed(Vec<XyValue>),
    /// `plot:timestamp:y`.
    Timestamped {
        index: usize,
        timestamp: NaiveDateTime,
        y: f64,
    },
}

/// Parse one line of client input.
pub fn parse(raw: &str) -> Result<Command> {
    let line = raw.trim();

    if line.is_empty() || line.starts_with('#') || line.starts_with('/') {
        return Ok(Command::Comment);
    }

    if let Some(assignment) = line.strip_prefix(keywords::SET_PREFIX) {
        return parse_set(line, assignment);
    }

    if line == keywords::INIT {
        return Ok(Command::Init);
    }
    if line == keywords::ADD_PLOT {
        return Ok(Command::AddPlot);
    }

    let mut words = line.split_whitespace();
    let keyword = words.next().unwrap_or_default();
    match keyword {
        keywords::CLEAR => {
            let index = parse_single_operand(line, keyword, words)?;
            Ok(Command::Clear(parse_index(line, index)?))
        }
        keywords::REPLOT => {
            let index = parse_single_operand(line, keyword, words)?;
            Ok(Command::Replot(parse_index(line, index)?))
        }
        keywords::ENABLE_STATUS => {
            let flag = parse_single_operand(line, keyword, words)?;
            Ok(Command::EnableStatus(parse_status_flag(line, flag)?))
        }
        _ => parse_data(line).map(Command::Data),
    }
}

fn parse_set(line: &str, assignment: &str) -> Result<Command> {
    let (name, value) = assignment
        .split_once('=')
        .ok_or_else(|| PlotError::parse(line, "expected set name=value"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(PlotError::parse(line, "missing attribute name"));
    }
    Ok(Command::Set {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn parse_single_operand<'a>(
    line: &str,
    keyword: &str,
    mut words: impl Iterator<Item = &'a str>,
) -> Result<&'a str> {
    let operand = words
        .next()
        .ok_or_else(|| PlotError::parse(line, format!("{} needs an argument", keyword)))?;
    if words.next().is_some() {
        return Err(PlotError::parse(
            line,
            format!("{} takes a single argument", keyword),
        ));
    }
    Ok(operand)
}

fn parse_status_flag(line: &str, flag: &str) -> Result<bool> {
    match flag.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(PlotError::parse(
            line,
            format!("'{}' is not one of 0, 1, false, true, no, yes", flag),
        )),
    }
}

fn parse_data(line: &str) -> Result<DataLine> {
    if !line.contains(':') {
        return tokens(line)
            .map(|token| parse_number(line, token))
            .collect::<Result<Vec<_>>>()
            .map(DataLine::Sequential);
    }

    if line.contains(TIMESTAMP_DELIM) {
        let fields: Vec<&str> = line.split(':').collect();
        let [index, timestamp, y] = fields.as_slice() else {
            return Err(PlotError::parse(
                line,
                "expected plot:year;month;day;hour;minute;second;millisecond:value",
            ));
        };
        let timestamp =
            parse_timestamp(timestamp.trim()).map_err(|e| PlotError::parse(line, e.to_string()))?;
        return Ok(DataLine::Timestamped {
            index: parse_index(line, index.trim())?,
            timestamp,
            y: parse_number(line, y.trim())?,
        });
    }

    tokens(line)
        .map(|token| {
            let fields: Vec<&str> = token.split(':').collect();
            match fields.as_slice() {
                [index, x, y] => Ok(XyValue {
                    index: parse_index(line, index)?,
                    x: parse_number(line, x)?,
                    y: parse_number(line, y)?,
                }),
                _ => Err(PlotError::parse(
                    line,
                    format!("'{}' is not a plot:x:y triple", token),
                )),
            }
        })
        .collect::<Result<Vec<_>>>()
        .map(DataLine::Indexed)
}

/// Split on commas and whitespace, dropping empty tokens.
fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Parse a finite decimal number. `inf`, `nan` and friends are rejected.
pub fn parse_number(line: &str, token: &str) -> Result<f64> {
    let starts_numeric = token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'));
    match token.parse::<f64>() {
        Ok(value) if starts_numeric && value.is_finite() => Ok(value),
        _ => Err(PlotError::parse(
            line,
            format!("'{}' is not a number", token),
        )),
    }
}

fn parse_index(line: &str, token: &str) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| PlotError::parse(line, format!("'{}' is not a plot index", token)))
}
