//! A back-end that buffers clauses into a `CnfFormula` and only hands them
//! to a solver once, at `solve()` time. Follows `util::integer::Problem`'s
//! shape elsewhere in this family of solvers: build a `CnfFormula` across
//! several calls and only construct a fresh `varisat::Solver` when asked
//! to solve.

use varisat::{CnfFormula, ExtendFormula};

use crate::error::SolveError;

use super::{assignment_from_model, Assignment, BackendStats, Lit, SatBackend, SatOutcome, VarId};

pub struct BatchBackend {
    formula: CnfFormula,
    num_vars: u32,
    num_clauses: usize,
    assignment: Option<Assignment>,
}

impl BatchBackend {
    pub fn new() -> Self {
        BatchBackend {
            formula: CnfFormula::new(),
            num_vars: 0,
            num_clauses: 0,
            assignment: None,
        }
    }
}

impl Default for BatchBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SatBackend for BatchBackend {
    fn new_var(&mut self) -> VarId {
        self.formula.new_lit();
        let id = VarId(self.num_vars);
        self.num_vars += 1;
        id
    }

    fn add_clause(&mut self, lits: &[Lit]) {
        let varisat_lits: Vec<_> = lits.iter().map(|l| l.to_varisat()).collect();
        self.formula.add_clause(&varisat_lits);
        self.num_clauses += 1;
    }

    fn solve(&mut self) -> Result<SatOutcome, SolveError> {
        let mut solver = varisat::Solver::new();
        solver.add_formula(&self.formula);
        let sat = solver.solve().map_err(|e| SolveError::solver_failure(e.to_string()))?;
        if !sat {
            self.assignment = None;
            return Ok(SatOutcome::Unsat);
        }
        let model = solver
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
