//! Knobs for a single `solve` call, bundled into one struct per the
//! "no grab-bag keyword args" design note.

use crate::adjacency::Tiling;
use crate::grid::PathlengthConstraint;

/// Which concrete SAT back-end to drive the encoding through.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SatBackendKind {
    /// Buffer clauses into a `CnfFormula`, then solve in one shot.
    #[default]
    Batch,
    /// Push clauses straight into a live `Solver`, one literal at a time.
    Incremental,
}

#[derive(Clone, PartialEq, Debug)]
pub struct SolveOptions {
    pub tiling: Tiling,
    pub wall_density_floor: Option<f64>,
    pub distance_horizon: Option<u32>,
    pub pathlength_constraints: Vec<PathlengthConstraint>,
    pub backend: SatBackendKind,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            tiling: Tiling::Square,
            wall_density_floor: None,
            distance_horizon: None,
            pathlength_constraints: Vec::new(),
            backend: SatBackendKind::default(),
        }
    }
}
