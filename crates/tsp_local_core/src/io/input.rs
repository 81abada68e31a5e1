use std::{
    fs,
    io::Read,
    path::Path,
};

use crate::{Error, Point, Result};

/// Reads points from `path`, or from stdin when `path` is `None`.
pub fn read_points(path: Option<&Path>) -> Result<Vec<Point>> {
    let text = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            Error::other(format!("failed to read input {}: {e}", path.display()))
        })?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let points = parse_points(&text)?;
    log::info!(
        "input: source={} points={}",
        path.map_or_else(|| "stdin".to_string(), |p| p.display().to_string()),
        points.len()
    );
    Ok(points)
}

/// Parses comma-delimited `x,y` rows.
///
/// Blank lines are skipped. The first non-blank row is treated as a header when
/// its first two fields are not both numbers; any later malformed row is an
/// [`Error::InputFormat`] carrying its 1-based line number.
pub fn parse_points(text: &str) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    let mut seen_row = false;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let row = line.trim_start_matches('\u{feff}').trim();
        if row.is_empty() {
            continue;
        }
        let first_row = !seen_row;
        seen_row = true;

        match parse_row(row) {
            Ok(point) => points.push(point),
            Err(_) if first_row && is_header(row) => {
                log::debug!("input: skip header line={line_no} row={row:?}");
            }
            Err(message) => return Err(Error::input_format(line_no, message)),
        }
    }

    Ok(points)
}

fn parse_row(row: &str) -> std::result::Result<Point, String> {
    let mut fields = row.split(',').map(str::trim);
    let x_s = fields.next().unwrap_or_default();
    let Some(y_s) = fields.next() else {
        return Err(format!("expected `x,y` but got a single field: {row}"));
    };
    if fields.next().is_some() {
        return Err(format!("expected `x,y` but got extra comma fields: {row}"));
    }

    let point = Point::new(parse_coordinate("x", x_s)?, parse_coordinate("y", y_s)?);
    if !point.is_finite() {
        return Err(format!("non-finite coordinate: {row}"));
    }
    Ok(point)
}

fn parse_coordinate(axis: &str, raw: &str) -> std::result::Result<f64, String> {
    raw.parse()
        .map_err(|_| format!("invalid {axis} coordinate: {raw:?}"))
}

/// A header has at least one field that does not even look like a number.
fn is_header(row: &str) -> bool {
    row.split(',')
        .map(str::trim)
        .any(|field| !field.is_empty() && field.parse::<f64>().is_err())
}
