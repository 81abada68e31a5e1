use std::{
    fmt, fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{Error, Result, options::SolverOptions};

const INPUT_MARKER: &str = "input_";
const OUTPUT_MARKER: &str = "output_";

/// Where the finished tour is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Resolves the destination before any solving work starts, so a bad
    /// input name fails fast.
    pub fn resolve(options: &SolverOptions) -> Result<Self> {
        match (options.output_arg(), options.input_path()) {
            (Some("-"), _) | (None, None) => Ok(Self::Stdout),
            (Some(path), _) => Ok(Self::File(PathBuf::from(path))),
            (None, Some(input)) => derive_output_path(input).map(Self::File),
        }
    }

    pub fn write(&self, tour: &[usize]) -> Result<()> {
        match self {
            Self::Stdout => {
                let stdout = std::io::stdout();
                write_tour(stdout.lock(), tour)?;
            }
            Self::File(path) => {
                let file = fs::File::create(path).map_err(|e| {
                    Error::other(format!("failed to create output {}: {e}", path.display()))
                })?;
                write_tour(file, tour)?;
            }
        }
        log::info!("output: target={self} rows={}", tour.len());
        Ok(())
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Writes an `index` header followed by one tour entry per line.
pub fn write_tour<W: Write>(writer: W, tour: &[usize]) -> std::io::Result<()> {
    let mut out = BufWriter::new(writer);
    writeln!(out, "index")?;
    for idx in tour {
        writeln!(out, "{idx}")?;
    }
    out.flush()
}

/// `data/input_6.csv` -> `data/output_6.csv`. Only the file name is
/// rewritten; directory components are left alone.
pub fn derive_output_path(input: &Path) -> Result<PathBuf> {
    let Some(file_name) = input.file_name().and_then(|name| name.to_str()) else {
        return Err(Error::PathDerivation(input.to_path_buf()));
    };
    if !file_name.contains(INPUT_MARKER) {
        return Err(Error::PathDerivation(input.to_path_buf()));
    }
    Ok(input.with_file_name(file_name.replace(INPUT_MARKER, OUTPUT_MARKER)))
}
