//! Builds the CNF for one grid: color variables, edge variables, the
//! disconnection rule, degree bounds, a rooted spanning tree per color, the
//! wall-density floor, and the reachability ladder behind pathlength
//! constraints. This is the component with the most moving parts; each
//! piece is grounded in a specific formula-builder gadget from
//! `formula.rs`.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::adjacency;
use crate::error::SolveError;
use crate::formula::{BitVec, FormulaBuilder};
use crate::grid::{Color, ColorGrid, Edge, PathlengthConstraint, Point, BASE_COLOR};
use crate::options::SolveOptions;
use crate::sat::{Lit, SatBackend};

pub struct EncodeResult<B> {
    pub fb: FormulaBuilder<B>,
    pub edge_lits: BTreeMap<Edge, Lit>,
    pub color_lits: BTreeMap<(Point, u32), Lit>,
    pub active_palette: Vec<u32>,
    pub considered: Vec<Point>,
    pub graph: BTreeMap<Point, Vec<Point>>,
    /// User-supplied pathlength constraints plus, when the grid carries an
    /// `Origin` cell and at least one `Far` cell, the constraint derived
    /// from them (see [`effective_pathlength_constraints`]). The decoder
    /// reports a distance matrix for every entry here, not just the
    /// user-supplied ones.
    pub pathlength_constraints: Vec<PathlengthConstraint>,
}

/// The reserved name of the pathlength constraint synthesized from the
/// grid's `Origin`/`Far` markers and `SolveOptions::distance_horizon`. A
/// user-supplied constraint of the same name is shadowed in the decoder's
/// `distances` map, since `BTreeMap::insert` iterates in declaration order
/// and the derived constraint is always appended last.
pub const ORIGIN_FAR_CONSTRAINT_NAME: &str = "origin";

/// Folds the grid's `Origin`/`Far` markers into an ordinary pathlength
/// constraint — root at the origin cell, every far cell required to sit
/// strictly beyond `distance_horizon` (default 0, i.e. merely unequal to
/// the origin) — and appends it to the user-supplied list. Returns `None`
/// if the grid has far cells but no origin cell to measure them from: the
/// constraint could never be witnessed, which is infeasible by
/// construction rather than a solver-level unsat.
fn effective_pathlength_constraints(
    grid: &ColorGrid,
    options: &SolveOptions,
) -> Option<Vec<PathlengthConstraint>> {
    let mut constraints = options.pathlength_constraints.clone();

    let far_cells: Vec<Point> = grid.points().filter(|&p| grid.get(p) == Some(Color::Far)).collect();
    if far_cells.is_empty() {
        return Some(constraints);
    }

    let origin = grid.points().find(|&p| grid.get(p) == Some(Color::Origin))?;
    let required = options.distance_horizon.unwrap_or(0) + 1;
    let min_distance = far_cells.into_iter().map(|p| (p, required)).collect();
    constraints.push(PathlengthConstraint {
        name: ORIGIN_FAR_CONSTRAINT_NAME.to_string(),
        root: origin,
        min_distance,
    });
    Some(constraints)
}

/// Builds the full formula, or returns `Ok(None)` for one of the
/// design-time short-circuits: more than one origin cell, a wall-density
/// floor that demands more walls than exist, or a far cell with no origin
/// to be measured from.
pub fn encode<B: SatBackend>(
    grid: &ColorGrid,
    options: &SolveOptions,
    backend: B,
) -> Result<Option<EncodeResult<B>>, SolveError> {
    // `considered` is every cell eligible to carry an active-palette color
    // — fixed or blank, but not `Unconstrained`. `graph` is the full
    // geometric adjacency over *every* grid cell: `Unconstrained` cells are
    // still real cells with real edges (to be separated from differently
    // colored neighbors, and subject to the same degree bound), they just
    // never join a color's spanning tree.
    let considered: Vec<Point> = grid
        .points()
        .filter(|&p| grid.get(p) != Some(Color::Unconstrained))
        .collect();
    let considered_set: BTreeSet<Point> = considered.iter().copied().collect();

    let graph = build_graph(grid, options);
    let edge_keys = build_edge_keys(&graph);

    let origin_count = considered.iter().filter(|&&p| grid.get(p) == Some(Color::Origin)).count();
    if origin_count > 1 {
        return Ok(None);
    }

    let total_edges = edge_keys.len();
    let required_walls = options.wall_density_floor.filter(|&p| p > 0.0).map(|p| {
        (p * total_edges as f64).ceil() as usize
    });
    if let Some(required) = required_walls {
        if required > total_edges {
            return Ok(None);
        }
    }

    let pathlength_constraints = match effective_pathlength_constraints(grid, options) {
        Some(c) => c,
        None => return Ok(None),
    };
    let max_step = max_ladder_step(&pathlength_constraints);

    let active_palette = active_palette(grid);

    let mut fb = FormulaBuilder::new(backend);

    let color_lits = allocate_color_vars(&mut fb, grid, &considered, &active_palette)?;
    let edge_lits = allocate_edge_vars(&mut fb, &edge_keys);

    add_disconnection_clauses(&mut fb, grid, &color_lits, &edge_lits, &active_palette);
    add_degree_bounds(&mut fb, grid, &graph, &edge_lits, &color_lits, &active_palette);

    for &color in &active_palette {
        let hard_root = hard_root_for(grid, &considered, color);
        build_color_tree(&mut fb, &color_lits, &edge_lits, &considered, &considered_set, &graph, color, hard_root);
    }

    if let Some(required) = required_walls {
        let all_edges: Vec<Lit> = edge_lits.values().copied().collect();
        fb.at_least_k_false(&all_edges, required);
    }

    build_distance_constraints(&mut fb, &graph, &edge_lits, &pathlength_constraints, max_step);

    Ok(Some(EncodeResult {
        fb,
        edge_lits,
        color_lits,
        active_palette,
        considered,
        graph,
        pathlength_constraints,
    }))
}

fn build_graph(grid: &ColorGrid, options: &SolveOptions) -> BTreeMap<Point, Vec<Point>> {
    grid.points()
        .map(|p| (p, adjacency::neighbors(options.tiling, p, grid.width(), grid.height())))
        .collect()
}

fn build_edge_keys(graph: &BTreeMap<Point, Vec<Point>>) -> BTreeSet<Edge> {
    let mut edges = BTreeSet::new();
    for (&p, neighbors) in graph {
        for &q in neighbors {
            edges.insert(Edge::new(p, q));
        }
    }
    edges
}

fn active_palette(grid: &ColorGrid) -> Vec<u32> {
    let mut set = BTreeSet::new();
    for p in grid.points() {
        match grid.get(p) {
            Some(Color::Regular(c)) => {
                set.insert(c);
            }
            Some(Color::Origin) | Some(Color::Far) => {
                set.insert(BASE_COLOR);
            }
            Some(Color::Unconstrained) | None => {}
        }
    }
    if set.is_empty() {
        set.insert(BASE_COLOR);
    }
    set.into_iter().collect()
}

fn fixed_regular_color(grid: &ColorGrid, p: Point) -> Option<u32> {
    match grid.get(p) {
        Some(Color::Regular(c)) => Some(c),
        Some(Color::Origin) | Some(Color::Far) => Some(BASE_COLOR),
        _ => None,
    }
}

fn allocate_color_vars<B: SatBackend>(
    fb: &mut FormulaBuilder<B>,
    grid: &ColorGrid,
    considered: &[Point],
    active_palette: &[u32],
) -> Result<BTreeMap<(Point, u32), Lit>, SolveError> {
    let mut color_lits = BTreeMap::new();
    for &p in considered {
        let row: Vec<Lit> = active_palette.iter().map(|_| fb.fresh()).collect();
        for (&c, &lit) in active_palette.iter().zip(&row) {
            color_lits.insert((p, c), lit);
        }
        fb.exactly_one(&row);

        if let Some(fixed) = fixed_regular_color(grid, p) {
            let lit = *color_lits.get(&(p, fixed)).ok_or_else(|| {
                SolveError::solver_failure(format!("fixed color {fixed} at {p:?} is outside the active palette"))
            })?;
            fb.unit(lit);
        }
    }
    Ok(color_lits)
}

fn allocate_edge_vars<B: SatBackend>(
    fb: &mut FormulaBuilder<B>,
    edge_keys: &BTreeSet<Edge>,
) -> BTreeMap<Edge, Lit> {
    edge_keys.iter().map(|&e| (e, fb.fresh())).collect()
}

/// Forbids a kept edge between two differently colored cells. `Unconstrained`
/// cells carry no color variable, so they can never match a colored
/// neighbor — their edge to any considered cell is forced blocked outright.
/// An edge between two `Unconstrained` cells is unconstrained in turn: there
/// is no color to separate.
fn add_disconnection_clauses<B: SatBackend>(
    fb: &mut FormulaBuilder<B>,
    grid: &ColorGrid,
    color_lits: &BTreeMap<(Point, u32), Lit>,
    edge_lits: &BTreeMap<Edge, Lit>,
    active_palette: &[u32],
) {
    for (&edge, &edge_lit) in edge_lits {
        let (p, q) = edge.endpoints();
        let p_unconstrained = grid.get(p) == Some(Color::Unconstrained);
        let q_unconstrained = grid.get(q) == Some(Color::Unconstrained);

        if p_unconstrained && q_unconstrained {
            continue;
        }
        if p_unconstrained || q_unconstrained {
            fb.unit(!edge_lit);
            continue;
        }

        for &ca in active_palette {
            for &cb in active_palette {
                if ca == cb {
                    continue;
                }
                fb.add_clause(&[!color_lits[&(p, ca)], !color_lits[&(q, cb)], !edge_lit]);
            }
        }
    }
}

/// Whether keeping at least one edge out of `p` is even conceivable once the
/// disconnection clauses are in force. A considered cell matches a neighbor
/// either by sharing an active color with a considered neighbor, or simply
/// by having an `Unconstrained` neighbor (unconstrained-to-unconstrained
/// edges are never forbidden). An `Unconstrained` cell itself has no color
/// to match, so it can only ever keep an edge to another `Unconstrained`
/// cell. False only when every possibility is foreclosed — the
/// fixed-distinct-colors singleton island, or an `Unconstrained` cell with
/// no `Unconstrained` neighbor — which is exempt from the ≥1 floor.
fn could_match_a_neighbor<B: SatBackend>(
    fb: &mut FormulaBuilder<B>,
    grid: &ColorGrid,
    color_lits: &BTreeMap<(Point, u32), Lit>,
    graph: &BTreeMap<Point, Vec<Point>>,
    active_palette: &[u32],
    p: Point,
) -> Lit {
    let p_unconstrained = grid.get(p) == Some(Color::Unconstrained);
    let mut eqs = Vec::new();
    for &q in &graph[&p] {
        let q_unconstrained = grid.get(q) == Some(Color::Unconstrained);
        if p_unconstrained || q_unconstrained {
            if p_unconstrained && q_unconstrained {
                eqs.push(fb.true_lit());
            }
            continue;
        }
        let per_color: Vec<Lit> = active_palette
            .iter()
            .map(|&c| fb.and_gate(&[color_lits[&(p, c)], color_lits[&(q, c)]]))
            .collect();
        eqs.push(fb.or_gate(&per_color));
    }
    if eqs.is_empty() {
        fb.false_lit()
    } else {
        fb.or_gate(&eqs)
    }
}

fn add_degree_bounds<B: SatBackend>(
    fb: &mut FormulaBuilder<B>,
    grid: &ColorGrid,
    graph: &BTreeMap<Point, Vec<Point>>,
    edge_lits: &BTreeMap<Edge, Lit>,
    color_lits: &BTreeMap<(Point, u32), Lit>,
    active_palette: &[u32],
) {
    for &p in graph.keys() {
        let incident: Vec<Lit> = graph[&p].iter().map(|&q| edge_lits[&Edge::new(p, q)]).collect();
        if incident.is_empty() {
            continue;
        }

        let shares_color = could_match_a_neighbor(fb, grid, color_lits, graph, active_palette, p);
        let mut clause = vec![!shares_color];
        clause.extend(incident.iter().copied());
        fb.add_clause(&clause);

        at_most_three(fb, &incident);
    }
}

/// Forbids every kept-edge 4-subset directly when that's cheap (degree up
/// to 7), falls back to the sequential-counter encoding for the one tiling
/// (Octagon) where the subset count would otherwise blow up.
fn at_most_three<B: SatBackend>(fb: &mut FormulaBuilder<B>, lits: &[Lit]) {
    if lits.len() <= 3 {
        return;
    }
    if lits.len() <= 7 {
        for subset in (0..lits.len()).combinations(4) {
            let clause: Vec<Lit> = subset.iter().map(|&i| !lits[i]).collect();
            fb.add_clause(&clause);
        }
    } else {
        fb.at_most_k(lits, 3);
    }
}

fn bit_width(n: usize) -> usize {
    let mut w = 1;
    while (1usize << w) < n.max(1) {
        w += 1;
    }
    w
}

fn hard_root_for(grid: &ColorGrid, considered: &[Point], color: u32) -> Option<Point> {
    considered.iter().copied().filter(|&p| fixed_regular_color(grid, p) == Some(color)).min()
}

/// One rooted spanning tree per active color: a hard root when some fixed
/// cell already carries the color, otherwise a soft `is_root` selection
/// among every cell that could end up being it. Acyclicity falls out of
/// level numbers that strictly decrease from child to parent.
fn build_color_tree<B: SatBackend>(
    fb: &mut FormulaBuilder<B>,
    color_lits: &BTreeMap<(Point, u32), Lit>,
    edge_lits: &BTreeMap<Edge, Lit>,
    considered: &[Point],
    considered_set: &BTreeSet<Point>,
    graph: &BTreeMap<Point, Vec<Point>>,
    color: u32,
    hard_root: Option<Point>,
) {
    let n = considered.len();
    if n == 0 {
        return;
    }
    let width = bit_width(n);
    let levels: BTreeMap<Point, BitVec> = considered.iter().map(|&p| (p, fb.new_bitvec(width))).collect();
    let member = |p: Point| color_lits[&(p, color)];

    let mut is_root_lits: Vec<(Point, Lit)> = Vec::new();

    for &p in considered {
        let m = member(p);
        let mut candidates: Vec<Lit> = Vec::new();

        if hard_root.is_none() {
            let r = fb.fresh();
            is_root_lits.push((p, r));
            candidates.push(r);
        }

        for q in graph[&p].iter().copied().filter(|q| considered_set.contains(q)) {
            let edge = edge_lits[&Edge::new(p, q)];
            let cand = fb.fresh();
            fb.implies(cand, edge);
            fb.implies(cand, member(q));
            let lt = fb.less_than(&levels[&q], &levels[&p]);
            fb.implies(cand, lt);
            candidates.push(cand);
        }

        fb.at_most_one(&candidates);
        for &c in &candidates {
            fb.implies(c, m);
        }

        if hard_root == Some(p) {
            for i in 0..width {
                fb.unit(!levels[&p].bit(i));
            }
        } else {
            let mut clause = vec![!m];
            clause.extend(candidates.iter().copied());
            fb.add_clause(&clause);
        }
    }

    if hard_root.is_none() {
        let roots: Vec<Lit> = is_root_lits.iter().map(|&(_, r)| r).collect();
        fb.at_most_one(&roots);

        let members: Vec<Lit> = considered.iter().map(|&p| member(p)).collect();
        let used = fb.or_gate(&members);
        let mut clause = vec![!used];
        clause.extend(roots.iter().copied());
        fb.add_clause(&clause);

        for &(p, r) in &is_root_lits {
            for i in 0..width {
                fb.implies(r, !levels[&p].bit(i));
            }
        }
    }
}

/// `K_max` from §4.4: one less than the largest minimum distance named by
/// any constraint, the depth the reachability ladder needs to grow to
/// before every constraint's forbidden-level clause can be stated.
fn max_ladder_step(constraints: &[PathlengthConstraint]) -> usize {
    let mut max_step = 0usize;
    for constraint in constraints {
        for &d in constraint.min_distance.values() {
            if d == 0 {
                continue;
            }
            max_step = max_step.max((d - 1) as usize);
        }
    }
    max_step
}

/// Grows `R[step][cell]` ("reachable from a constraint's root within
/// `step` hops of kept edges") up through `max_step`, then asserts that
/// every distance-constrained cell is *not* reached before its lower
/// bound. Reachability rides the same kept-edge literals the disconnection
/// clauses already confine to one color, so a lower bound can never be
/// satisfied by hopping through a different color's territory.
fn build_distance_constraints<B: SatBackend>(
    fb: &mut FormulaBuilder<B>,
    graph: &BTreeMap<Point, Vec<Point>>,
    edge_lits: &BTreeMap<Edge, Lit>,
    constraints: &[PathlengthConstraint],
    max_step: usize,
) {
    for constraint in constraints {
        let mut reach: BTreeMap<Point, Lit> = graph
            .keys()
            .map(|&p| (p, if p == constraint.root { fb.true_lit() } else { fb.false_lit() }))
            .collect();

        for step in 1..=max_step {
            let mut next = BTreeMap::new();
            for (&p, neighbors) in graph {
                let mut terms = vec![reach[&p]];
                for &q in neighbors {
                    let edge = edge_lits[&Edge::new(p, q)];
                    terms.push(fb.and_gate(&[reach[&q], edge]));
                }
                next.insert(p, fb.or_gate(&terms));
            }
            reach = next;

            for (&target, &d) in &constraint.min_distance {
                if d as usize == step + 1 {
                    fb.unit(!reach[&target]);
                }
            }
        }
    }
}
