//! The shapes that flow through the solver: grid coordinates, colors, edges,
//! and the solution that comes back out.

use std::collections::BTreeMap;

use crate::util::matrix::Matrix;

/// A cell coordinate, row-major.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }
}

/// A single canonical "blank" color. Cells with no fixed color, and cells
/// fixed as `Origin`/`Far`, all resolve to this value once the grid is
/// decoded back from the model.
pub const BASE_COLOR: u32 = 0;

/// The color (or sentinel role) a cell can carry.
///
/// `Unconstrained` cells never join a color's spanning tree and never carry
/// a color variable of their own, but they're still real cells: an edge
/// between an `Unconstrained` cell and any colored cell is always blocked
/// (there's no color to match across it), while an edge between two
/// `Unconstrained` cells is left free. `Origin`/`Far` are input-only markers
/// consumed by the pathlength constraints; a solved grid never reports a
/// cell as `Origin` or `Far`, it reports the regular color that cell
/// settled into.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Color {
    Regular(u32),
    Unconstrained,
    Origin,
    Far,
}

impl Color {
    pub fn is_regular(&self) -> bool {
        matches!(self, Color::Regular(_))
    }
}

/// An unordered pair of adjacent points, canonicalized so `{u,v}` and
/// `{v,u}` hash and compare equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Edge(Point, Point);

impl Edge {
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b { Edge(a, b) } else { Edge(b, a) }
    }

    pub fn endpoints(&self) -> (Point, Point) {
        (self.0, self.1)
    }
}

/// A rectangular grid of optionally-fixed colors.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ColorGrid {
    width: usize,
    height: usize,
    cells: Matrix<Option<Color>>,
}

impl ColorGrid {
    pub fn new(width: usize, height: usize, cells: Vec<Option<Color>>) -> Result<Self, crate::util::matrix::ShapeError> {
        let cells = Matrix::new(cells, (height, width))?;
        Ok(ColorGrid { width, height, cells })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, p: Point) -> Option<Color> {
        self.cells[p.row][p.col]
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells.indices().map(|(row, col)| Point::new(row, col))
    }

    pub fn is_blank(&self) -> bool {
        self.points().all(|p| self.get(p).is_none())
    }

    /// Whether any cell carries a `Regular`, `Origin`, or `Far` color —
    /// i.e. whether the active palette would be non-empty by construction
    /// rather than by the empty-palette default. A grid with cells that are
    /// all blank answers `false` here even though [`ColorGrid::is_blank`]
    /// would say it isn't blank (blank just means "not fixed", and a fully
    /// blank grid is the trivial-solution fast path's other precondition).
    /// A grid with an `Unconstrained` cell mixed in always answers `false`
    /// too, but the caller still can't take the fast path there: an
    /// `Unconstrained` cell forces its edges to every other cell's settled
    /// color closed, which the all-one-color trivial solution doesn't know
    /// about.
    pub fn has_fixed_color(&self) -> bool {
        self.points()
            .any(|p| matches!(self.get(p), Some(Color::Regular(_)) | Some(Color::Origin) | Some(Color::Far)))
    }
}

/// A lower bound on distance-from-root for a named set of cells, rooted at
/// one cell tagged `Origin` in the grid.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PathlengthConstraint {
    pub name: String,
    pub root: Point,
    pub min_distance: BTreeMap<Point, u32>,
}

/// The result of a successful solve.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GridSolution {
    pub kept: Vec<Edge>,
    pub blocked: Vec<Edge>,
    pub colors: Matrix<Color>,
    pub distances: BTreeMap<String, Matrix<i64>>,
}
