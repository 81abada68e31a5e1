use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
};

use env_logger::{Builder, Target, WriteStyle, fmt::Formatter};
use log::Record;

use crate::options::{LogFormat, SolverOptions};
use crate::{Error, Result};

/// Installs the global logger described by `options`. Fails if a logger is
/// already installed or the log file cannot be opened.
pub fn init_logger(options: &SolverOptions) -> Result<()> {
    let style = LineStyle {
        format: options.log_format,
        timestamp: options.log_timestamp,
    };

    Builder::new()
        .filter_level(options.log_level.to_filter())
        .write_style(WriteStyle::Never)
        .target(log_target(options.log_output_path())?)
        .format(move |buf, record| style.write(buf, record))
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))
}

#[derive(Clone, Copy, Debug)]
struct LineStyle {
    format: LogFormat,
    timestamp: bool,
}

impl LineStyle {
    fn write(self, buf: &mut Formatter, record: &Record<'_>) -> io::Result<()> {
        if self.timestamp {
            write!(buf, "{} ", buf.timestamp_millis())?;
        }
        let level = record.level().as_str();
        match self.format {
            LogFormat::Compact => writeln!(buf, "{level:<5} {}", record.args()),
            LogFormat::Pretty => writeln!(
                buf,
                "{level:<5} [{}] {}",
                short_target(record.target()),
                record.args()
            ),
        }
    }
}

/// Log lines are appended to `path` when given, otherwise written to stderr.
fn log_target(path: Option<&Path>) -> Result<Target> {
    let Some(path) = path else {
        return Ok(Target::Stderr);
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            Error::other(format!(
                "failed to open log output file {}: {e}",
                path.display()
            ))
        })?;
    Ok(Target::Pipe(Box::new(file)))
}

/// Drops the crate prefix so pretty lines read `[local_search::two_opt]`.
fn short_target(target: &str) -> &str {
    match target.split_once("::") {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => target,
    }
}
