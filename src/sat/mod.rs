//! The SAT adapter: a small abstract contract (`SatBackend`) so the formula
//! builder and encoder never touch `varisat` types directly, plus two
//! concrete back-ends and a third for DIMACS export.

pub mod batch;
pub mod dimacs;
pub mod incremental;

use crate::error::SolveError;

/// An opaque solver-allocated variable. Variable identity, not the order in
/// which names were handed out at a call site, is what the encoder keys on.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct VarId(u32);

impl VarId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A signed reference to a `VarId`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Lit {
    var: VarId,
    polarity: bool,
}

impl Lit {
    pub fn positive(var: VarId) -> Self {
        Lit { var, polarity: true }
    }

    pub fn negative(var: VarId) -> Self {
        Lit { var, polarity: false }
    }

    pub fn var(&self) -> VarId {
        self.var
    }

    pub fn is_positive(&self) -> bool {
        self.polarity
    }

    fn to_dimacs(self) -> isize {
        let magnitude = self.var.0 as isize + 1;
        if self.polarity { magnitude } else { -magnitude }
    }

    fn to_varisat(self) -> varisat::Lit {
        varisat::Lit::from_dimacs(self.to_dimacs())
    }
}

impl std::ops::Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit { var: self.var, polarity: !self.polarity }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SatOutcome {
    Sat,
    Unsat,
}

/// A satisfying model, indexed by `VarId`.
#[derive(Clone, Debug)]
pub struct Assignment(Vec<bool>);

impl Assignment {
    /// `values[i]` is the polarity the solver chose for the variable
    /// allocated i-th (0-based), which is exactly the order varisat's own
    /// `Solver::model()` comes back in.
    fn from_polarities(values: Vec<bool>) -> Self {
        Assignment(values)
    }

    pub fn value(&self, var: VarId) -> bool {
        self.0[var.index()]
    }

    pub fn holds(&self, lit: Lit) -> bool {
        self.value(lit.var()) == lit.is_positive()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BackendStats {
    pub num_vars: usize,
    pub num_clauses: usize,
}

/// The contract every concrete SAT back-end satisfies. The formula builder
/// and encoder are written entirely against this trait.
pub trait SatBackend {
    fn new_var(&mut self) -> VarId;
    fn add_clause(&mut self, lits: &[Lit]);
    fn solve(&mut self) -> Result<SatOutcome, SolveError>;
    fn assignment(&self) -> Option<&Assignment>;
    fn stats(&self) -> BackendStats;
}

fn assignment_from_model(model: Vec<varisat::Lit>) -> Assignment {
    let values = model.into_iter().map(|l| l.is_positive()).collect();
    Assignment::from_polarities(values)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn not_flips_polarity() {
        let v = VarId(3);
        let l = Lit::positive(v);
        assert!(l.is_positive());
        assert!(!(!l).is_positive());
        assert_eq!((!l).var(), v);
    }

    #[test]
    fn dimacs_round_trips_sign() {
        let v = VarId(0);
        assert_eq!(Lit::positive(v).to_dimacs(), 1);
        assert_eq!(Lit::negative(v).to_dimacs(), -1);
    }
}
