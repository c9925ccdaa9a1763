//! A back-end that pushes straight into a live `varisat::Solver`, the way
//! `voisimage.rs` and `stars.rs` drive the solver directly rather than
//! buffering a `CnfFormula` first.

use varisat::ExtendFormula;

use crate::error::SolveError;

use super::{assignment_from_model, Assignment, BackendStats, Lit, SatBackend, SatOutcome, VarId};

pub struct IncrementalBackend {
    solver: varisat::Solver<'static>,
    num_vars: u32,
    num_clauses: usize,
    assignment: Option<Assignment>,
}

impl IncrementalBackend {
    pub fn new() -> Self {
        IncrementalBackend {
            solver: varisat::Solver::new(),
            num_vars: 0,
            num_clauses: 0,
            assignment: None,
        }
    }
}

impl Default for IncrementalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SatBackend for IncrementalBackend {
    fn new_var(&mut self) -> VarId {
        self.solver.new_var();
        let id = VarId(self.num_vars);
        self.num_vars += 1;
        id
    }

    fn add_clause(&mut self, lits: &[Lit]) {
        let varisat_lits: Vec<_> = lits.iter().map(|l| l.to_varisat()).collect();
        self.solver.add_clause(&varisat_lits);
        self.num_clauses += 1;
    }

    fn solve(&mut self) -> Result<SatOutcome, SolveError> {
        let sat = self.solver.solve().map_err(|e| SolveError::solver_failure(e.to_string()))?;
        if !sat {
            self.assignment = None;
            return Ok(SatOutcome::Unsat);
        }
        let model = self
            .solver
            .model()
            .ok_or_else(|| SolveError::solver_failure("solver reported SAT but returned no model"))?;
        self.assignment = Some(assignment_from_model(model));
        Ok(SatOutcome::Sat)
    }

    fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    fn stats(&self) -> BackendStats {
        BackendStats { num_vars: self.num_vars as usize, num_clauses: self.num_clauses }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn two_clauses_force_equality() {
        let mut b = IncrementalBackend::new();
        let a = b.new_var();
        let c = b.new_var();
        b.add_clause(&[!Lit::positive(a), Lit::positive(c)]);
        b.add_clause(&[Lit::positive(a), !Lit::positive(c)]);
        b.add_clause(&[Lit::positive(a)]);
        assert_eq!(b.solve().unwrap(), SatOutcome::Sat);
        let model = b.assignment().unwrap();
        assert!(model.holds(Lit::positive(a)));
        assert!(model.holds(Lit::positive(c)));
    }
}
