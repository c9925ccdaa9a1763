//! A back-end that buffers clauses exactly like [`super::batch::BatchBackend`]
//! but additionally knows how to render itself as DIMACS CNF text. This is
//! the export path (`gridsolve dimacs`), and stands in for an incremental
//! CaDiCaL-style back-end without pulling in a dependency this corpus never
//! uses: it exposes the same add-literal/solve shape as a real incremental
//! adapter would, backed by `varisat` underneath.

use std::io::{self, Write};

use varisat::{CnfFormula, ExtendFormula};

use crate::error::SolveError;

use super::{assignment_from_model, Assignment, BackendStats, Lit, SatBackend, SatOutcome, VarId};

/// Reads a DIMACS CNF text (the format [`DimacsBackend::write_dimacs`]
/// produces) back into a fresh back-end: `nvars` from the header become
/// `nvars` freshly allocated variables, and every `0`-terminated line
/// becomes one clause. Used to verify that an export/re-import round trip
/// agrees with a direct solve.
pub fn parse_dimacs<B: SatBackend>(text: &str, mut backend: B) -> Result<B, SolveError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty() && !l.starts_with('c'));

    let header = lines.next().ok_or_else(|| SolveError::solver_failure("empty DIMACS input"))?;
    let mut header_fields = header.split_whitespace();
    if header_fields.next() != Some("p") || header_fields.next() != Some("cnf") {
        return Err(SolveError::solver_failure(format!("malformed DIMACS header {header:?}")));
    }
    let num_vars: usize = header_fields
        .next()
        .ok_or_else(|| SolveError::solver_failure("DIMACS header missing variable count"))?
        .parse()
        .map_err(|_| SolveError::solver_failure("DIMACS header variable count is not an integer"))?;

    let vars: Vec<VarId> = (0..num_vars).map(|_| backend.new_var()).collect();

    for line in lines {
        let mut clause = Vec::new();
        for tok in line.split_whitespace() {
            let n: isize = tok
                .parse()
                .map_err(|_| SolveError::solver_failure(format!("non-integer DIMACS literal {tok:?}")))?;
            if n == 0 {
                break;
            }
            let idx = n.unsigned_abs() - 1;
            let var = *vars
                .get(idx)
                .ok_or_else(|| SolveError::solver_failure(format!("DIMACS literal {n} exceeds declared variable count")))?;
            clause.push(if n > 0 { Lit::positive(var) } else { Lit::negative(var) });
        }
        backend.add_clause(&clause);
    }

    Ok(backend)
}

pub struct DimacsBackend {
    formula: CnfFormula,
    num_vars: u32,
    clauses: Vec<Vec<Lit>>,
    assignment: Option<Assignment>,
}

impl DimacsBackend {
    pub fn new() -> Self {
        DimacsBackend {
            formula: CnfFormula::new(),
            num_vars: 0,
            clauses: Vec::new(),
            assignment: None,
        }
    }

    /// Write the buffered clauses as DIMACS CNF, `p cnf <vars> <clauses>`
    /// followed by one `0`-terminated line per clause.
    pub fn write_dimacs(&self, w: &mut impl Write) -> io::Result<()> {
        writeln!(w, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            for lit in clause {
                write!(w, "{} ", lit.to_dimacs())?;
            }
            writeln!(w, "0")?;
        }
        Ok(())
    }
}

impl Default for DimacsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SatBackend for DimacsBackend {
    fn new_var(&mut self) -> VarId {
        self.formula.new_lit();
        let id = VarId(self.num_vars);
        self.num_vars += 1;
        id
    }

    fn add_clause(&mut self, lits: &[Lit]) {
        let varisat_lits: Vec<_> = lits.iter().map(|l| l.to_varisat()).collect();
        self.formula.add_clause(&varisat_lits);
        self.clauses.push(lits.to_vec());
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
        BackendStats { num_vars: self.num_vars as usize, num_clauses: self.clauses.len() }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn writes_header_and_clauses() {
        let mut b = DimacsBackend::new();
        let a = b.new_var();
        let c = b.new_var();
        b.add_clause(&[Lit::positive(a), !Lit::positive(c)]);

        let mut out = Vec::new();
        b.write_dimacs(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "p cnf 2 1\n1 -2 0\n");
    }

    #[test]
    fn parse_dimacs_round_trips_sat_verdict() {
        use crate::sat::batch::BatchBackend;

        let mut original = DimacsBackend::new();
        let a = original.new_var();
        let c = original.new_var();
        original.add_clause(&[Lit::positive(a), Lit::positive(c)]);
        original.add_clause(&[!Lit::positive(a), !Lit::positive(c)]);
        let direct_outcome = {
            let mut scratch = DimacsBackend::new();
            let a2 = scratch.new_var();
            let c2 = scratch.new_var();
            scratch.add_clause(&[Lit::positive(a2), Lit::positive(c2)]);
            scratch.add_clause(&[!Lit::positive(a2), !Lit::positive(c2)]);
            scratch.solve().unwrap()
        };

        let mut out = Vec::new();
        original.write_dimacs(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut reimported = parse_dimacs(&text, BatchBackend::new()).unwrap();
        let reimported_outcome = reimported.solve().unwrap();

        assert_eq!(direct_outcome, reimported_outcome);
        assert_eq!(reimported_outcome, SatOutcome::Sat);
    }

    #[test]
    fn parse_dimacs_round_trips_unsat_verdict() {
        use crate::sat::batch::BatchBackend;

        let mut original = DimacsBackend::new();
        let a = original.new_var();
        original.add_clause(&[Lit::positive(a)]);
        original.add_clause(&[Lit::negative(a)]);

        let mut out = Vec::new();
        original.write_dimacs(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut reimported = parse_dimacs(&text, BatchBackend::new()).unwrap();
        assert_eq!(reimported.solve().unwrap(), SatOutcome::Unsat);
    }

    #[test]
    fn rejects_malformed_header() {
        use crate::sat::batch::BatchBackend;
        let err = parse_dimacs("not a header\n", BatchBackend::new());
        assert!(err.is_err());
    }
}
