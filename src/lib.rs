//! A maze/coloring constraint solver: given a grid painted with a palette
//! of colors (or left blank) and a tiling, decide whether interior walls
//! can be erected so that every color class is a single connected region,
//! every differently-colored neighboring pair is separated by a wall, and
//! any requested wall-density/origin/distance constraints hold.
//!
//! [`solve`] is the one entry point: it owns the whole pipeline — grab the
//! adjacency tables, build the CNF, hand it to a SAT back-end, decode the
//! model — and returns either a [`GridSolution`] or `None` for any flavor
//! of infeasibility. Everything allocated along the way (variables,
//! clauses, the solver handle) lives only for the duration of one call.

pub mod adjacency;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod formula;
pub mod grid;
pub mod interchange;
pub mod options;
pub mod sat;
pub mod util;

pub use adjacency::Tiling;
pub use error::{SolveError, SolverFailureKind};
pub use grid::{Color, ColorGrid, Edge, GridSolution, PathlengthConstraint, Point};
pub use options::{SatBackendKind, SolveOptions};

use sat::batch::BatchBackend;
use sat::incremental::IncrementalBackend;
use sat::{SatBackend, SatOutcome};

/// Solve one grid against one set of options. `Ok(None)` covers every
/// flavor of infeasibility this crate distinguishes — multiple origins, an
/// unsatisfiable density floor, an unreachable pathlength horizon, or a
/// genuine SAT `unsat` verdict — none of those are [`SolveError`]s.
pub fn solve(grid: &ColorGrid, options: &SolveOptions) -> Result<Option<GridSolution>, SolveError> {
    if !grid.has_fixed_color()
        && !grid.points().any(|p| grid.get(p) == Some(Color::Unconstrained))
        && options.wall_density_floor.map_or(true, |p| p <= 0.0)
        && options.pathlength_constraints.is_empty()
    {
        log::debug!("grid carries no fixed color and no density/pathlength constraints, taking the fast path");
        return Ok(Some(decoder::trivial_blank_solution(grid, options)));
    }

    match options.backend {
        SatBackendKind::Batch => solve_with(grid, options, BatchBackend::new()),
        SatBackendKind::Incremental => solve_with(grid, options, IncrementalBackend::new()),
    }
}

fn solve_with<B: SatBackend>(
    grid: &ColorGrid,
    options: &SolveOptions,
    backend: B,
) -> Result<Option<GridSolution>, SolveError> {
    let mut enc = match encoder::encode(grid, options, backend)? {
        Some(enc) => enc,
        None => {
            log::debug!("encoder short-circuited to infeasible-by-construction");
            return Ok(None);
        }
    };

    log::debug!(
        "encoded {} clauses over {} variables",
        enc.fb.backend().stats().num_clauses,
        enc.fb.backend().stats().num_vars
    );

    let outcome = enc.fb.backend_mut().solve()?;
    if outcome == SatOutcome::Unsat {
        log::debug!("CNF is unsat");
        return Ok(None);
    }

    let assignment = enc
        .fb
        .backend()
        .assignment()
        .expect("solve() reported Sat but left no assignment")
        .clone();

    Ok(Some(decoder::decode(grid, options, &enc, &assignment)))
}

#[cfg(test)]
mod test {
    use super::*;

    fn grid(cells: Vec<Option<Color>>, w: usize, h: usize) -> ColorGrid {
        ColorGrid::new(w, h, cells).unwrap()
    }

    #[test]
    fn scenario_a_two_quadrants() {
        // 2x2: [[0,1],[0,1]]
        let cells = vec![
            Some(Color::Regular(0)), Some(Color::Regular(1)),
            Some(Color::Regular(0)), Some(Color::Regular(1)),
        ];
        let g = grid(cells, 2, 2);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };
        let solution = solve(&g, &options).unwrap().unwrap();

        let kept: std::collections::BTreeSet<_> = solution.kept.iter().copied().collect();
        assert!(kept.contains(&Edge::new(Point::new(0, 0), Point::new(1, 0))));
        assert!(kept.contains(&Edge::new(Point::new(0, 1), Point::new(1, 1))));

        let blocked: std::collections::BTreeSet<_> = solution.blocked.iter().copied().collect();
        assert!(blocked.contains(&Edge::new(Point::new(0, 0), Point::new(0, 1))));
        assert!(blocked.contains(&Edge::new(Point::new(1, 0), Point::new(1, 1))));
    }

    #[test]
    fn scenario_b_four_quadrants() {
        // 4x4, quadrants 0/1/2/3
        let mut cells = vec![None; 16];
        for row in 0..4 {
            for col in 0..4 {
                let color = match (row < 2, col < 2) {
                    (true, true) => 0,
                    (true, false) => 1,
                    (false, true) => 2,
                    (false, false) => 3,
                };
                cells[row * 4 + col] = Some(Color::Regular(color));
            }
        }
        let g = grid(cells, 4, 4);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };
        let solution = solve(&g, &options).unwrap().unwrap();

        let kept: std::collections::BTreeSet<_> = solution.kept.iter().copied().collect();
        for row in 0..4 {
            for col in 0..4 {
                let p = Point::new(row, col);
                for q in adjacency::neighbors(Tiling::Square, p, 4, 4) {
                    let same_quadrant = (row < 2) == (q.row < 2) && (col < 2) == (q.col < 2);
                    let e = Edge::new(p, q);
                    assert_eq!(kept.contains(&e), same_quadrant, "{:?}-{:?}", p, q);
                }
            }
        }
    }

    #[test]
    fn scenario_c_infeasible_diagonal() {
        // 2x2: [[0,1],[1,0]]
        let cells = vec![
            Some(Color::Regular(0)), Some(Color::Regular(1)),
            Some(Color::Regular(1)), Some(Color::Regular(0)),
        ];
        let g = grid(cells, 2, 2);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };
        assert!(solve(&g, &options).unwrap().is_none());
    }

    #[test]
    fn scenario_d_blank_grid_trivial_solution() {
        let g = grid(vec![None; 9], 3, 3);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };
        let solution = solve(&g, &options).unwrap().unwrap();
        assert_eq!(solution.kept.len(), 12);
        assert!(solution.blocked.is_empty());
        assert!(solution.colors.lines().all(|l| l.iter().all(|c| *c == Color::Regular(0))));
    }

    #[test]
    fn scenario_e_distance_lower_bound() {
        use std::collections::BTreeMap;
        let mut cells = vec![Some(Color::Regular(0)); 5];
        cells[0] = Some(Color::Origin);
        let g = grid(cells, 5, 1);

        let mut min_distance = BTreeMap::new();
        min_distance.insert(Point::new(0, 4), 4);
        let constraint = PathlengthConstraint {
            name: "root".into(),
            root: Point::new(0, 0),
            min_distance,
        };
        let options = SolveOptions {
            tiling: Tiling::Square,
            pathlength_constraints: vec![constraint],
            ..Default::default()
        };

        let solution = solve(&g, &options).unwrap().unwrap();
        assert_eq!(solution.kept.len(), 4);
        assert!(solution.blocked.is_empty());

        let dist = &solution.distances["root"];
        for col in 0..5 {
            assert_eq!(dist[0][col], col as i64);
        }
    }

    #[test]
    fn scenario_f_wall_floor_forces_disconnection() {
        let g = grid(vec![None; 4], 2, 2);
        let options = SolveOptions {
            tiling: Tiling::Square,
            wall_density_floor: Some(0.75),
            ..Default::default()
        };
        assert!(solve(&g, &options).unwrap().is_none());
    }

    #[test]
    fn one_by_one_blank_is_trivially_sat() {
        let g = grid(vec![None], 1, 1);
        let options = SolveOptions::default();
        let solution = solve(&g, &options).unwrap().unwrap();
        assert!(solution.kept.is_empty());
        assert!(solution.blocked.is_empty());
    }

    #[test]
    fn one_by_one_fixed_is_trivially_sat() {
        let g = grid(vec![Some(Color::Regular(3))], 1, 1);
        let options = SolveOptions::default();
        let solution = solve(&g, &options).unwrap().unwrap();
        assert!(solution.kept.is_empty());
        assert_eq!(solution.colors[0][0], Color::Regular(3));
    }

    #[test]
    fn determinism_same_input_same_backend_same_output() {
        let cells = vec![
            Some(Color::Regular(0)), Some(Color::Regular(1)),
            Some(Color::Regular(0)), Some(Color::Regular(1)),
        ];
        let g = grid(cells, 2, 2);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };
        let first = solve(&g, &options).unwrap().unwrap();
        let second = solve(&g, &options).unwrap().unwrap();
        assert_eq!(first.kept, second.kept);
        assert_eq!(first.blocked, second.blocked);
        assert_eq!(first.colors, second.colors);
    }

    #[test]
    fn incremental_backend_agrees_with_batch() {
        let cells = vec![
            Some(Color::Regular(0)), Some(Color::Regular(1)),
            Some(Color::Regular(0)), Some(Color::Regular(1)),
        ];
        let g = grid(cells, 2, 2);
        let batch_options = SolveOptions { tiling: Tiling::Square, ..Default::default() };
        let incremental_options = SolveOptions {
            tiling: Tiling::Square,
            backend: SatBackendKind::Incremental,
            ..Default::default()
        };
        let batch = solve(&g, &batch_options).unwrap().unwrap();
        let incremental = solve(&g, &incremental_options).unwrap().unwrap();
        assert_eq!(batch.kept, incremental.kept);
        assert_eq!(batch.colors, incremental.colors);
    }

    #[test]
    fn far_marker_forces_distance_beyond_horizon() {
        // 2x2 octagon grid: every cell is a true neighbor of every other,
        // so a direct origin-far edge is the shortest possible path unless
        // the horizon forbids it.
        let mut cells = vec![Some(Color::Regular(0)); 4];
        cells[0] = Some(Color::Origin); // (0,0)
        cells[3] = Some(Color::Far); // (1,1)
        let g = grid(cells, 2, 2);
        let options = SolveOptions {
            tiling: Tiling::Octagon,
            distance_horizon: Some(1),
            ..Default::default()
        };
        let solution = solve(&g, &options).unwrap().unwrap();

        let kept: std::collections::BTreeSet<_> = solution.kept.iter().copied().collect();
        assert!(!kept.contains(&Edge::new(Point::new(0, 0), Point::new(1, 1))));

        let dist = &solution.distances[encoder::ORIGIN_FAR_CONSTRAINT_NAME];
        assert!(dist[1][1] > 1);

        assert_eq!(solution.colors[0][0], Color::Regular(0));
        assert_eq!(solution.colors[1][1], Color::Regular(0));
    }

    #[test]
    fn far_marker_without_origin_is_infeasible() {
        let mut cells = vec![Some(Color::Regular(0)); 4];
        cells[3] = Some(Color::Far);
        let g = grid(cells, 2, 2);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };
        assert!(solve(&g, &options).unwrap().is_none());
    }

    #[test]
    fn pathlength_constraint_root_need_not_be_origin_marked() {
        // The named pathlength constraint mechanism is independent of the
        // Origin/Far sentinel machinery: any cell can serve as a root.
        use std::collections::BTreeMap;
        let cells = vec![Some(Color::Regular(0)); 5];
        let g = grid(cells, 5, 1);

        let mut min_distance = BTreeMap::new();
        min_distance.insert(Point::new(0, 4), 4);
        let constraint = PathlengthConstraint {
            name: "plain_root".into(),
            root: Point::new(0, 0),
            min_distance,
        };
        let options = SolveOptions {
            tiling: Tiling::Square,
            pathlength_constraints: vec![constraint],
            ..Default::default()
        };

        let solution = solve(&g, &options).unwrap().unwrap();
        let dist = &solution.distances["plain_root"];
        for col in 0..5 {
            assert_eq!(dist[0][col], col as i64);
        }
    }

    #[test]
    fn dimacs_round_trip_agrees_with_direct_solve() {
        use crate::sat::dimacs::{parse_dimacs, DimacsBackend};

        let cells = vec![
            Some(Color::Regular(0)), Some(Color::Regular(1)),
            Some(Color::Regular(0)), Some(Color::Regular(1)),
        ];
        let g = grid(cells, 2, 2);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };

        let direct = solve(&g, &options).unwrap();
        assert!(direct.is_some());

        let enc = encoder::encode(&g, &options, DimacsBackend::new()).unwrap().unwrap();
        let mut dimacs_text = Vec::new();
        enc.fb.backend().write_dimacs(&mut dimacs_text).unwrap();
        let text = String::from_utf8(dimacs_text).unwrap();

        let mut reimported = parse_dimacs(&text, BatchBackend::new()).unwrap();
        let reimported_outcome = reimported.solve().unwrap();
        assert_eq!(reimported_outcome, sat::SatOutcome::Sat);
    }

    #[test]
    fn dimacs_round_trip_agrees_on_unsat() {
        use crate::sat::dimacs::{parse_dimacs, DimacsBackend};

        let cells = vec![
            Some(Color::Regular(0)), Some(Color::Regular(1)),
            Some(Color::Regular(1)), Some(Color::Regular(0)),
        ];
        let g = grid(cells, 2, 2);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };

        assert!(solve(&g, &options).unwrap().is_none());

        let enc = encoder::encode(&g, &options, DimacsBackend::new()).unwrap().unwrap();
        let mut dimacs_text = Vec::new();
        enc.fb.backend().write_dimacs(&mut dimacs_text).unwrap();
        let text = String::from_utf8(dimacs_text).unwrap();

        let mut reimported = parse_dimacs(&text, BatchBackend::new()).unwrap();
        assert_eq!(reimported.solve().unwrap(), sat::SatOutcome::Unsat);
    }

    #[test]
    fn unconstrained_cell_forces_its_edges_closed() {
        // 1x3 row: a fixed color next to an Unconstrained cell next to a
        // different fixed color. Both edges touching the middle cell must
        // come out blocked no matter what, since an Unconstrained cell
        // never carries a color to match against.
        let cells = vec![Some(Color::Regular(0)), Some(Color::Unconstrained), Some(Color::Regular(1))];
        let g = grid(cells, 3, 1);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };

        let solution = solve(&g, &options).unwrap().unwrap();
        let kept: std::collections::BTreeSet<_> = solution.kept.iter().copied().collect();
        assert!(!kept.contains(&Edge::new(Point::new(0, 0), Point::new(0, 1))));
        assert!(!kept.contains(&Edge::new(Point::new(0, 1), Point::new(0, 2))));
    }

    #[test]
    fn adjacent_unconstrained_cells_keep_their_shared_edge() {
        // A 1x2 grid that is entirely Unconstrained takes the solver path
        // (has_fixed_color() is false, but the fast path is still skipped
        // because of the Unconstrained cells). Two Unconstrained cells
        // never conflict with each other, so the degree floor treats them
        // like any other matching pair with no other neighbor: the lone
        // edge between them is forced kept.
        let cells = vec![Some(Color::Unconstrained), Some(Color::Unconstrained)];
        let g = grid(cells, 2, 1);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };

        let solution = solve(&g, &options).unwrap().unwrap();
        assert_eq!(solution.kept, vec![Edge::new(Point::new(0, 0), Point::new(0, 1))]);
        assert!(solution.blocked.is_empty());
    }

    #[test]
    fn unconstrained_island_with_no_unconstrained_neighbor_is_exempt_from_degree_floor() {
        // A single Unconstrained cell whose only neighbor is a fixed color:
        // its one possible edge is forced closed, so it can't satisfy the
        // usual "≥1 kept edge" floor. It must still be solvable, meaning
        // the floor does not apply to it.
        let cells = vec![Some(Color::Regular(0)), Some(Color::Unconstrained)];
        let g = grid(cells, 2, 1);
        let options = SolveOptions { tiling: Tiling::Square, ..Default::default() };

        let solution = solve(&g, &options).unwrap().unwrap();
        assert!(solution.kept.is_empty());
    }
}
