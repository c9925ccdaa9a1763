//! Gadgets built on top of a [`SatBackend`]: named variables, Tseitin-style
//! DNF, binary integers, an unsigned comparator, and a cardinality bound.
//! Follows `util::solve::DnfFormula`'s helper-variable trick and
//! `util::integer::Problem`'s "buffer a formula, expose typed operations
//! over it" shape, generalized from one-hot range variables to binary
//! bitvectors where the encoder needs levels and distances.

use std::collections::BTreeMap;

use crate::error::SolveError;
use crate::sat::{Lit, SatBackend};

/// A fixed-width binary integer, LSB-first.
#[derive(Clone, Debug)]
pub struct BitVec {
    bits: Vec<Lit>,
}

impl BitVec {
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn bit(&self, i: usize) -> Lit {
        self.bits[i]
    }
}

pub struct FormulaBuilder<B> {
    backend: B,
    names: BTreeMap<String, Lit>,
    true_lit: Option<Lit>,
}

impl<B: SatBackend> FormulaBuilder<B> {
    pub fn new(backend: B) -> Self {
        FormulaBuilder { backend, names: BTreeMap::new(), true_lit: None }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// A fresh, unnamed literal.
    pub fn fresh(&mut self) -> Lit {
        Lit::positive(self.backend.new_var())
    }

    pub fn named_var(&mut self, name: impl Into<String>) -> Result<Lit, SolveError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(SolveError::DuplicateVariableName(name));
        }
        let lit = self.fresh();
        self.names.insert(name, lit);
        Ok(lit)
    }

    pub fn lookup(&self, name: &str) -> Result<Lit, SolveError> {
        self.names.get(name).copied().ok_or_else(|| SolveError::UnknownVariable(name.to_string()))
    }

    pub fn add_clause(&mut self, lits: &[Lit]) {
        self.backend.add_clause(lits);
    }

    pub fn unit(&mut self, lit: Lit) {
        self.add_clause(&[lit]);
    }

    /// A literal that is always true. Cached: every caller shares one
    /// variable instead of each minting its own.
    pub fn true_lit(&mut self) -> Lit {
        if let Some(t) = self.true_lit {
            return t;
        }
        let t = self.fresh();
        self.unit(t);
        self.true_lit = Some(t);
        t
    }

    pub fn false_lit(&mut self) -> Lit {
        !self.true_lit()
    }

    pub fn implies(&mut self, a: Lit, b: Lit) {
        self.add_clause(&[!a, b]);
    }

    /// At least one of `lits` holds, and no two hold simultaneously.
    pub fn exactly_one(&mut self, lits: &[Lit]) {
        self.add_clause(lits);
        self.at_most_one(lits);
    }

    /// Pairwise at-most-one: O(n^2) clauses, fine for the small groups
    /// (per-cell degree bounds, per-grid color counts) this is used on.
    pub fn at_most_one(&mut self, lits: &[Lit]) {
        for i in 0..lits.len() {
            for j in (i + 1)..lits.len() {
                self.add_clause(&[!lits[i], !lits[j]]);
            }
        }
    }

    /// Assert a disjunction of conjunctions via one helper variable per
    /// product term, the same way `add_dnf` does elsewhere in this family
    /// of solvers.
    pub fn add_dnf(&mut self, dnf: Vec<Vec<Lit>>) {
        let mut helpers = Vec::with_capacity(dnf.len());
        for product in dnf {
            let h = self.fresh();
            helpers.push(h);
            for term in product {
                self.add_clause(&[!h, term]);
            }
        }
        self.add_clause(&helpers);
    }

    /// A fresh literal equivalent to the conjunction of `lits`.
    pub fn and_gate(&mut self, lits: &[Lit]) -> Lit {
        let h = self.fresh();
        for &l in lits {
            self.implies(h, l);
        }
        let mut clause: Vec<Lit> = lits.iter().map(|&l| !l).collect();
        clause.push(h);
        self.add_clause(&clause);
        h
    }

    /// A fresh literal equivalent to the disjunction of `lits`.
    pub fn or_gate(&mut self, lits: &[Lit]) -> Lit {
        let h = self.fresh();
        for &l in lits {
            self.implies(l, h);
        }
        let mut clause: Vec<Lit> = lits.to_vec();
        clause.push(!h);
        self.add_clause(&clause);
        h
    }

    pub fn new_bitvec(&mut self, width: usize) -> BitVec {
        BitVec { bits: (0..width).map(|_| self.fresh()).collect() }
    }

    /// `a < b`, unsigned, built MSB-to-LSB: at each bit position, either
    /// every more-significant bit has been equal so far and this bit is
    /// the first place `a` is 0 where `b` is 1, or a strictly-more-
    /// significant position already decided it. Operands of unequal width
    /// are conceptually zero-extended to the wider one.
    pub fn less_than(&mut self, a: &BitVec, b: &BitVec) -> Lit {
        let n = a.width().max(b.width());
        let zero = self.false_lit();
        let mut eq_prefix = self.true_lit();
        let mut lt_terms = Vec::with_capacity(n);

        for i in (0..n).rev() {
            let ai = bit_or_zero(a, i, zero);
            let bi = bit_or_zero(b, i, zero);

            let bit_lt = self.and_gate(&[!ai, bi]);
            lt_terms.push(self.and_gate(&[eq_prefix, bit_lt]));

            let both_true = self.and_gate(&[ai, bi]);
            let both_false = self.and_gate(&[!ai, !bi]);
            let bit_eq = self.or_gate(&[both_true, both_false]);
            eq_prefix = self.and_gate(&[eq_prefix, bit_eq]);
        }

        self.or_gate(&lt_terms)
    }

    pub fn assert_less_than(&mut self, a: &BitVec, b: &BitVec) {
        let lt = self.less_than(a, b);
        self.unit(lt);
    }

    /// At most `k` of `lits` are true, via Sinz's sequential-counter
    /// encoding: linear in `lits.len() * k` clauses rather than the
    /// exponential subset-forbidding a pairwise `add_popcount` would need.
    pub fn at_most_k(&mut self, lits: &[Lit], k: usize) {
        let n = lits.len();
        if k >= n {
            return;
        }
        if k == 0 {
            for &l in lits {
                self.unit(!l);
            }
            return;
        }

        let s: Vec<Vec<Lit>> = (0..n).map(|_| (0..k).map(|_| self.fresh()).collect()).collect();

        self.implies(lits[0], s[0][0]);
        for j in 1..k {
            self.unit(!s[0][j]);
        }

        for i in 1..n {
            self.implies(lits[i], s[i][0]);
            self.implies(s[i - 1][0], s[i][0]);
            for j in 1..k {
                self.add_clause(&[!lits[i], !s[i - 1][j - 1], s[i][j]]);
                self.implies(s[i - 1][j], s[i][j]);
            }
            self.add_clause(&[!lits[i], !s[i - 1][k - 1]]);
        }
    }

    /// At least `k` of `lits` are false.
    pub fn at_least_k_false(&mut self, lits: &[Lit], k: usize) {
        let allowed_true = lits.len().saturating_sub(k);
        self.at_most_k(lits, allowed_true);
    }
}

/// A bit position read past the end of a narrower operand: always zero,
/// so comparing bitvectors of unequal width zero-extends the shorter one.
fn bit_or_zero(v: &BitVec, i: usize, zero: Lit) -> Lit {
    if i < v.width() { v.bit(i) } else { zero }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sat::{batch::BatchBackend, SatOutcome};

    fn solved(fb: FormulaBuilder<BatchBackend>) -> (SatOutcome, FormulaBuilder<BatchBackend>) {
        let mut fb = fb;
        let outcome = fb.backend_mut().solve().unwrap();
        (outcome, fb)
    }

    #[test]
    fn exactly_one_picks_a_single_literal() {
        let mut fb = FormulaBuilder::new(BatchBackend::new());
        let lits: Vec<_> = (0..4).map(|_| fb.fresh()).collect();
        fb.exactly_one(&lits);
        let (outcome, fb) = solved(fb);
        assert_eq!(outcome, SatOutcome::Sat);
        let model = fb.into_backend();
        let model = model.assignment().unwrap();
        let true_count = lits.iter().filter(|&&l| model.holds(l)).count();
        assert_eq!(true_count, 1);
    }

    #[test]
    fn at_most_k_rejects_too_many_true() {
        let mut fb = FormulaBuilder::new(BatchBackend::new());
        let lits: Vec<_> = (0..4).map(|_| fb.fresh()).collect();
        fb.at_most_k(&lits, 2);
        for &l in &lits {
            fb.unit(l);
        }
        let (outcome, _) = solved(fb);
        assert_eq!(outcome, SatOutcome::Unsat);
    }

    #[test]
    fn at_least_k_false_allows_all_false() {
        let mut fb = FormulaBuilder::new(BatchBackend::new());
        let lits: Vec<_> = (0..5).map(|_| fb.fresh()).collect();
        fb.at_least_k_false(&lits, 3);
        for &l in &lits {
            fb.unit(!l);
        }
        let (outcome, _) = solved(fb);
        assert_eq!(outcome, SatOutcome::Sat);
    }

    #[test]
    fn less_than_forces_strict_order() {
        let mut fb = FormulaBuilder::new(BatchBackend::new());
        let a = fb.new_bitvec(3);
        let b = fb.new_bitvec(3);
        fb.assert_less_than(&a, &b);
        for (i, &bit) in [true, false, true].iter().enumerate() {
            if bit {
                fb.unit(a.bit(i));
            } else {
                fb.unit(!a.bit(i));
            }
        }
        let (outcome, fb) = solved(fb);
        assert_eq!(outcome, SatOutcome::Sat);
        let model = fb.into_backend();
        let model = model.assignment().unwrap();
        let b_val: u32 = (0..3).rev().fold(0, |acc, i| (acc << 1) | model.holds(b.bit(i)) as u32);
        assert!(b_val > 0b101);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut fb = FormulaBuilder::new(BatchBackend::new());
        fb.named_var("x").unwrap();
        assert!(matches!(fb.named_var("x"), Err(SolveError::DuplicateVariableName(_))));
    }
}
