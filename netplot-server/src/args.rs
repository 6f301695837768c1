//! Command-line arguments for the `netplot` server.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;

use crate::config::MAX_SLOTS_LIMIT;

/// Exit code for invalid arguments.
pub const EXIT_INVALID_ARGS: i32 = -1;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "netplot",
    version,
    about = "Network plotting server: each TCP/IP port feeds one live chart"
)]
pub struct ServerArgs {
    /// Prompt for the TCP/IP base port on startup.
    #[arg(short = 'g', long = "prompt")]
    pub prompt: bool,

    /// TCP/IP base port, used by the first chart (default 9600).
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Maximum number of charts (default 10).
    #[arg(short = 'm', long = "max-charts", value_parser = clap::value_parser!(u16).range(1..=MAX_SLOTS_LIMIT as i64))]
    pub max_charts: Option<u16>,

    /// Path to a JSON5 configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ServerArgs {
    /// Parse the process arguments.
    ///
    /// Help and version output exit with 0, anything invalid exits with -1.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(args) => args,
            Err(e) => {
                let code = match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                    _ => EXIT_INVALID_ARGS,
                };
                let _ = e.print();
                std::process::exit(code);
            }
        }
    }
}

/// Ask for the base port until a valid one (or nothing, for `default`) is
/// entered. Returns `None` when the input ends.
pub fn prompt_base_port<R: BufRead, W: Write>(
    default: u16,
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<u16>> {
    let mut answer = String::new();
    loop {
        write!(output, "TCP/IP base port [{}]: ", default)?;
        output.flush()?;

        answer.clear();
        if input.read_line(&mut answer)? == 0 {
            return Ok(None);
        }

        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(Some(default));
        }
        match answer.parse::<u16>() {
            Ok(port) if port > 0 => return Ok(Some(port)),
            _ => writeln!(
                output,
                "{} is not a valid port number. The port number must be from 1 to 65535",
                answer
            )?,
        }
    }
}
