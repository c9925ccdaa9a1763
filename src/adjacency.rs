//! Pure adjacency functions for the five supported tilings. Nothing here
//! touches variables or clauses — just which cells border which.

use crate::grid::Point;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Tiling {
    Square,
    Hex,
    Octagon,
    CairoPentagonal,
    CairoBridge,
}

const CARDINALS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONALS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const MOORE: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

/// Every tiling but Cairo pentagonal includes all four cardinal offsets
/// unconditionally, which is what makes those offset tables trivially
/// symmetric. Hex and the two Cairo variants key their remaining offsets
/// off cell parity.
pub fn neighbors(tiling: Tiling, p: Point, width: usize, height: usize) -> Vec<Point> {
    offsets_for(tiling, p)
        .into_iter()
        .filter_map(|(dr, dc)| offset_point(p, dr, dc, width, height))
        .collect()
}

fn offset_point(p: Point, dr: isize, dc: isize, width: usize, height: usize) -> Option<Point> {
    let row = p.row as isize + dr;
    let col = p.col as isize + dc;
    if row < 0 || col < 0 {
        return None;
    }
    let (row, col) = (row as usize, col as usize);
    if row >= height || col >= width {
        return None;
    }
    Some(Point::new(row, col))
}

fn offsets_for(tiling: Tiling, p: Point) -> Vec<(isize, isize)> {
    match tiling {
        Tiling::Square => CARDINALS.to_vec(),
        Tiling::Hex => hex_offsets(p.row),
        Tiling::Octagon => MOORE.to_vec(),
        Tiling::CairoPentagonal => {
            let mut v = CARDINALS.to_vec();
            v.push(pentagonal_diagonal(p));
            v
        }
        Tiling::CairoBridge => {
            let excluded = opposite(pentagonal_diagonal(p));
            let mut v = CARDINALS.to_vec();
            v.extend(DIAGONALS.iter().copied().filter(|&d| d != excluded));
            v
        }
    }
}

fn hex_offsets(row: usize) -> Vec<(isize, isize)> {
    if row % 2 == 0 {
        vec![(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)]
    } else {
        vec![(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)]
    }
}

/// The single diagonal a Cairo-pentagonal cell carries, chosen by the
/// parity class of its coordinates. Cooked up so that a cell's chosen
/// diagonal always points at a neighbor whose own chosen diagonal points
/// straight back.
fn pentagonal_diagonal(p: Point) -> (isize, isize) {
    match (p.row % 2, p.col % 2) {
        (0, 0) => (-1, -1),
        (0, 1) => (-1, 1),
        (1, 0) => (1, -1),
        (1, 1) => (1, 1),
        _ => unreachable!(),
    }
}

fn opposite((dr, dc): (isize, isize)) -> (isize, isize) {
    (-dr, -dc)
}
