//! The plain-text formats the CLI binary reads and writes. None of this is
//! core solver logic — it's the external-collaborator half of the format
//! contract, kept in the library only because the CLI binary needs
//! somewhere to put it, the same way this family of solvers colocates its
//! `FromStr`/`Display` impls with the rest of the game module (see
//! `voisimage.rs`, `stars.rs`). The encoder never parses or produces any
//! of these formats.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::grid::{Color, ColorGrid};

/// Sentinel integers the CSV format uses for the three special markers,
/// chosen to sit far outside any plausible regular-color range.
pub const CSV_UNCONSTRAINED: i64 = -1;
pub const CSV_ORIGIN: i64 = -2;
pub const CSV_FAR: i64 = -3;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("row {0} has {1} cells, expected {2}")]
    RaggedRow(usize, usize, usize),
    #[error("empty input")]
    Empty,
    #[error("cell {0:?} in row {1} is not an integer or blank")]
    BadCell(String, usize),
    #[error("unrecognized sentinel {0} in row {1}")]
    BadSentinel(i64, usize),
    #[error(transparent)]
    Shape(#[from] crate::util::matrix::ShapeError),
}

/// Parse a color grid from CSV: one row per line, comma-separated cells,
/// each either an integer color code, one of the three sentinel integers,
/// or empty for blank.
pub fn parse_csv(input: &str) -> Result<ColorGrid, CsvError> {
    let mut rows: Vec<Vec<Option<Color>>> = Vec::new();
    let mut width = None;

    for (row_idx, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Result<Vec<Option<Color>>, CsvError> = line
            .split(',')
            .map(|raw| parse_cell(raw.trim(), row_idx))
            .collect();
        let cells = cells?;

        let w = *width.get_or_insert(cells.len());
        if cells.len() != w {
            return Err(CsvError::RaggedRow(row_idx, cells.len(), w));
        }
        rows.push(cells);
    }

    let width = width.ok_or(CsvError::Empty)?;
    let height = rows.len();
    let flat: Vec<Option<Color>> = rows.into_iter().flatten().collect();
    Ok(ColorGrid::new(width, height, flat)?)
}

fn parse_cell(raw: &str, row: usize) -> Result<Option<Color>, CsvError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let n: i64 = raw
        .parse()
        .map_err(|_| CsvError::BadCell(raw.to_string(), row))?;
    Ok(Some(match n {
        CSV_UNCONSTRAINED => Color::Unconstrained,
        CSV_ORIGIN => Color::Origin,
        CSV_FAR => Color::Far,
        n if n >= 0 => Color::Regular(n as u32),
        other => return Err(CsvError::BadSentinel(other, row)),
    }))
}

/// Render a color grid (input or solved) back to the CSV form `parse_csv`
/// accepts, the sentinels round-tripping byte-for-byte.
pub fn write_csv_colors(colors: &crate::util::matrix::Matrix<Color>) -> String {
    let mut out = String::new();
    for line in colors.lines() {
        let cells: Vec<String> = line.iter().map(csv_cell).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn csv_cell(c: &Color) -> String {
    match c {
        Color::Regular(n) => n.to_string(),
        Color::Unconstrained => CSV_UNCONSTRAINED.to_string(),
        Color::Origin => CSV_ORIGIN.to_string(),
        Color::Far => CSV_FAR.to_string(),
    }
}

/// A minimal hand-rolled JSON writer for [`crate::grid::GridSolution`]:
/// walls as pairs of coordinates, plus the color matrix. Cell-to-cell
/// coordinate pairs stand in for sub-cell corner geometry — rendering a
/// wall segment's actual polygon corners is a tiling-geometry concern that
/// belongs to the rendering collaborator this crate doesn't implement.
pub fn write_json_solution(solution: &crate::grid::GridSolution) -> String {
    let mut out = String::new();
    out.push('{');

    out.push_str("\"kept\":[");
    write_edge_list(&mut out, &solution.kept);
    out.push_str("],");

    out.push_str("\"blocked\":[");
    write_edge_list(&mut out, &solution.blocked);
    out.push_str("],");

    out.push_str("\"colors\":[");
    for (i, line) in solution.colors.lines().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('[');
        for (j, c) in line.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            match c {
                Color::Regular(n) => out.push_str(&n.to_string()),
                other => out.push_str(&csv_cell(other)),
            }
        }
        out.push(']');
    }
    out.push(']');

    if !solution.distances.is_empty() {
        out.push_str(",\"distances\":{");
        for (i, (name, matrix)) in solution.distances.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&format!("{:?}:[", name));
            for (j, line) in matrix.lines().enumerate() {
                if j > 0 {
                    out.push(',');
                }
                let cells: Vec<String> = line.iter().map(i64::to_string).collect();
                out.push('[');
                out.push_str(&cells.join(","));
                out.push(']');
            }
            out.push(']');
        }
        out.push('}');
    }

    out.push('}');
    out
}

fn write_edge_list(out: &mut String, edges: &[crate::grid::Edge]) {
    for (i, e) in edges.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let (a, b) = e.endpoints();
        out.push_str(&format!("[[{},{}],[{},{}]]", a.row, a.col, b.row, b.col));
    }
}

/// A tiny `FromStr` wrapper so the CLI can parse `--tiling square` the way
/// `clap::ValueEnum` expects without pulling tiling-name parsing logic into
/// the core `adjacency` module.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TilingName(pub crate::adjacency::Tiling);

impl FromStr for TilingName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use crate::adjacency::Tiling::*;
        Ok(TilingName(match s {
            "square" => Square,
            "hex" => Hex,
            "octagon" => Octagon,
            "cairo" => CairoPentagonal,
            "cairo-bridge" => CairoBridge,
            other => return Err(format!("unknown tiling {other:?}")),
        }))
    }
}

impl fmt::Display for TilingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::adjacency::Tiling::*;
        f.write_str(match self.0 {
            Square => "square",
            Hex => "hex",
            Octagon => "octagon",
            CairoPentagonal => "cairo",
            CairoBridge => "cairo-bridge",
        })
    }
}
