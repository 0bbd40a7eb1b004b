//! Bounds on the variables of a check.
//!
//! A [`BoundMap`] restricts variable `i` (by its position in
//! [`Cad::variables`]) to an interval. Bounds are used to prune samples,
//! to park elimination polynomials that have no zero inside the box, to
//! decide checks by interval evaluation, and as explanations: after SAT
//! they shrink to the cell of the solution, after UNSAT they may grow as
//! long as the check stays unsatisfiable.

use super::check::{Answer, CheckOptions};
use super::Cad;
use crate::constraint::Constraint;
use crate::observer::CadObserver;
use crate::sample_tree::NodeId;
use cadkit_math::{BoundType, Interval, RealAlgebraicNumber, RealAlgebraicPoint, Var};
use num_rational::BigRational;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Bounds by variable index.
pub type BoundMap = BTreeMap<usize, Interval>;

impl<O: CadObserver> Cad<O> {
    /// The bounds as a box over the variables.
    pub(crate) fn box_map(&self, bounds: &BoundMap) -> FxHashMap<Var, Interval> {
        bounds
            .iter()
            .filter_map(|(&i, b)| self.variables.get(i).map(|&v| (v, b.clone())))
            .collect()
    }

    /// The bound on the variable of `level`, or the real line.
    pub(crate) fn level_bound(&self, bounds: Option<&BoundMap>, level: usize) -> Interval {
        bounds
            .and_then(|b| b.get(&level))
            .cloned()
            .unwrap_or_else(Interval::unbounded)
    }

    /// Check whether polynomial `id` provably has no zero inside the box
    /// polynomials are currently parked for.
    pub(crate) fn outside_deferral_box(&self, id: crate::elimination_set::PolyId) -> bool {
        let Some(bounds) = &self.deferral_box else {
            return false;
        };
        let Some(p) = self.elimination_sets[id.level()].get(id) else {
            return false;
        };
        p.eval_interval(&self.box_map(bounds))
            .is_some_and(|e| !e.contains(&BigRational::zero()))
    }

    /// Park the elimination polynomials without zeros in `bounds`, after
    /// readmitting those parked for a different box.
    pub(crate) fn update_deferral(&mut self, bounds: Option<&BoundMap>) {
        let wanted = bounds
            .filter(|b| self.settings.simplify_elimination_by_bounds && !b.is_empty())
            .cloned();
        if wanted == self.deferral_box {
            return;
        }
        for set in &mut self.elimination_sets {
            set.readmit_all();
        }
        self.deferral_box = wanted;
        if self.deferral_box.is_none() {
            return;
        }
        let mut parked = 0;
        for level in 0..self.elimination_sets.len() {
            let ids: Vec<_> = self.elimination_sets[level].iter().map(|(id, _)| id).collect();
            for id in ids {
                if self.outside_deferral_box(id) {
                    self.elimination_sets[level].defer(id);
                    parked += 1;
                }
            }
        }
        debug!(parked, "elimination polynomials parked by bounds");
    }

    /// Decide the check by interval evaluation over the box, if possible.
    pub(crate) fn presolve_by_bounds(&self, constraints: &[Constraint], bounds: &BoundMap) -> Option<Answer> {
        let boxes = self.box_map(bounds);
        let mut all_hold = true;
        for c in constraints {
            match c.polynomial().eval_interval(&boxes).and_then(|e| e.sign()) {
                Some(s) if !c.holds_for(s) => {
                    debug!(constraint = %c, "violated everywhere in the bounds");
                    return Some(Answer::Unsat);
                }
                Some(_) => {}
                None => all_hold = false,
            }
        }
        if !all_hold {
            return None;
        }
        let point = (0..self.variables.len())
            .map(|i| {
                let q = bounds.get(&i).map_or_else(BigRational::zero, Interval::sample);
                RealAlgebraicNumber::from_rational(q, false)
            })
            .collect();
        debug!("all constraints hold everywhere in the bounds");
        Some(Answer::Sat(point))
    }

    /// An interval around the sample of `node` inside its cell: the open
    /// gap between the neighbouring roots for a sector sample, the
    /// isolating interval for a section sample.
    pub(crate) fn cell_interval(&self, node: NodeId) -> Interval {
        let Some(value) = self.tree.value(node) else {
            return Interval::unbounded();
        };
        if value.is_root() {
            return value.interval();
        }
        let Some(parent) = self.tree.node(node).parent() else {
            return Interval::unbounded();
        };
        let siblings = self.tree.children(parent);
        let Some(pos) = siblings.iter().position(|&s| s == node) else {
            return Interval::unbounded();
        };
        let root_at = |s: &NodeId| self.tree.value(*s).filter(|v| v.is_root()).cloned();
        let left = siblings[..pos].iter().rev().find_map(root_at);
        let right = siblings[pos + 1..].iter().find_map(root_at);
        if let Some(q) = value.value() {
            for r in left.iter().chain(right.iter()) {
                r.refine_avoiding(&q);
            }
        }
        open_gap(left.as_ref(), right.as_ref())
    }

    /// Cell intervals along the point `point`, one per variable index, as
    /// far as the point is a sample of the tree.
    pub fn get_bounds(&self, point: &RealAlgebraicPoint) -> BoundMap {
        let n = self.variables.len();
        let mut out = BoundMap::new();
        let mut node = self.tree.root();
        for depth in 1..=point.dim().min(n) {
            let index = n - depth;
            let Some(target) = point.get(index) else {
                break;
            };
            let next = self
                .tree
                .children(node)
                .iter()
                .copied()
                .find(|&c| self.tree.value(c).is_some_and(|v| v == target));
            let Some(next) = next else {
                break;
            };
            out.insert(index, self.cell_interval(next));
            node = next;
        }
        out
    }

    /// Narrow the bounds of the variables on the path to `leaf` to the
    /// cells of the solution.
    pub(crate) fn shrink_bounds(&self, bounds: &mut BoundMap, leaf: NodeId) {
        let n = self.variables.len();
        let mut node = leaf;
        while let Some(parent) = self.tree.node(node).parent() {
            let index = n - self.tree.depth(node);
            if let Some(b) = bounds.get_mut(&index) {
                let narrowed = b.intersect(&self.cell_interval(node));
                if !narrowed.is_empty() {
                    trace!(index, bound = %narrowed, "bound shrunk");
                    *b = narrowed;
                }
            }
            node = parent;
        }
    }

    /// Grow each bound up to the nearest root samples outside of it, as
    /// long as the check stays unsatisfiable.
    pub(crate) fn widen_bounds(&mut self, constraints: &[Constraint], bounds: &mut BoundMap) {
        let n = self.variables.len();
        let indices: Vec<usize> = bounds.keys().copied().collect();
        for index in indices {
            let Some(current) = bounds.get(&index).cloned() else {
                continue;
            };
            let roots: Vec<RealAlgebraicNumber> = self
                .samples_at(n - index)
                .into_iter()
                .filter(|v| v.is_root())
                .collect();
            let candidate = widened(&current, &roots);
            if candidate == current {
                continue;
            }
            let mut trial = bounds.clone();
            trial.insert(index, candidate.clone());
            let trace = self.trace;
            let returned = self.returned_leaves.clone();
            let counted = self.stats.clone();
            let verdict = self.check_inner(
                constraints,
                None,
                &mut trial,
                &mut Vec::new(),
                CheckOptions {
                    check_bounds: true,
                    ..CheckOptions::default()
                },
                false,
            );
            self.trace = trace;
            self.returned_leaves = returned;
            self.stats.checks = counted.checks;
            self.stats.sat_answers = counted.sat_answers;
            self.stats.unsat_answers = counted.unsat_answers;
            self.stats.unknown_answers = counted.unknown_answers;
            self.stats.trace_hits = counted.trace_hits;
            self.stats.presolved = counted.presolved;
            self.stats.bound_trials += 1;
            if matches!(verdict, Ok(Answer::Unsat)) {
                debug!(index, bound = %candidate, "bound widened");
                bounds.insert(index, candidate);
            }
        }
    }
}

/// `current` grown to the nearest of `roots` on each side, exclusive.
/// A side without a root beyond it becomes unbounded.
fn widened(current: &Interval, roots: &[RealAlgebraicNumber]) -> Interval {
    let (mut lower, mut lower_type) = (BigRational::zero(), BoundType::Infty);
    if let Some(l) = current.lower() {
        let below = RealAlgebraicNumber::from_rational(l.clone(), false);
        if let Some(r) = roots.iter().filter(|r| **r < below).max() {
            r.refine_avoiding(l);
            (lower, lower_type) = match r.value() {
                Some(v) => (v, BoundType::Strict),
                None => (upper_end(r), BoundType::Weak),
            };
        }
    }
    let (mut upper, mut upper_type) = (BigRational::zero(), BoundType::Infty);
    if let Some(u) = current.upper() {
        let above = RealAlgebraicNumber::from_rational(u.clone(), false);
        if let Some(r) = roots.iter().filter(|r| **r > above).min() {
            r.refine_avoiding(u);
            (upper, upper_type) = match r.value() {
                Some(v) => (v, BoundType::Strict),
                None => (lower_end(r), BoundType::Weak),
            };
        }
    }
    let grown = Interval::new(lower, lower_type, upper, upper_type);
    if grown.contains_interval(current) {
        grown
    } else {
        current.clone()
    }
}

fn upper_end(r: &RealAlgebraicNumber) -> BigRational {
    r.interval().upper().cloned().unwrap_or_else(BigRational::zero)
}

fn lower_end(r: &RealAlgebraicNumber) -> BigRational {
    r.interval().lower().cloned().unwrap_or_else(BigRational::zero)
}

/// The rationals known to lie strictly between `a` and `b` from their
/// current enclosures. Missing ends are infinite.
pub(crate) fn open_gap(a: Option<&RealAlgebraicNumber>, b: Option<&RealAlgebraicNumber>) -> Interval {
    let (lower, lower_type) = match a {
        None => (BigRational::zero(), BoundType::Infty),
        Some(a) => match a.value() {
            Some(v) => (v, BoundType::Strict),
            None => (upper_end(a), BoundType::Weak),
        },
    };
    let (upper, upper_type) = match b {
        None => (BigRational::zero(), BoundType::Infty),
        Some(b) => match b.value() {
            Some(v) => (v, BoundType::Strict),
            None => (lower_end(b), BoundType::Weak),
        },
    };
    Interval::new(lower, lower_type, upper, upper_type)
}

/// A rational strictly between `a` and `b` (infinite if missing) inside
/// `bound`, or `None` if there is none. Prefers integers if asked to.
pub(crate) fn sample_between(
    a: Option<&RealAlgebraicNumber>,
    b: Option<&RealAlgebraicNumber>,
    bound: &Interval,
    prefer_integer: bool,
) -> Option<BigRational> {
    if bound.is_empty() {
        return None;
    }
    if let (Some(b), Some(l)) = (b, bound.lower()) {
        if *b <= RealAlgebraicNumber::from_rational(l.clone(), false) {
            return None;
        }
    }
    if let (Some(a), Some(u)) = (a, bound.upper()) {
        if *a >= RealAlgebraicNumber::from_rational(u.clone(), false) {
            return None;
        }
    }
    loop {
        let cell = open_gap(a, b).intersect(bound);
        if !cell.is_empty() {
            if prefer_integer {
                if let Some(k) = integer_in(&cell) {
                    return Some(k);
                }
            }
            return Some(cell.sample());
        }
        if let Some(a) = a {
            a.refine();
        }
        if let Some(b) = b {
            b.refine();
        }
    }
}

/// An integer inside `cell` close to its lower end, or zero if possible.
fn integer_in(cell: &Interval) -> Option<BigRational> {
    let zero = BigRational::zero();
    if cell.contains(&zero) {
        return Some(zero);
    }
    let one = BigRational::one();
    let mut candidates = Vec::new();
    if let Some(l) = cell.lower() {
        candidates.push(l.ceil());
        candidates.push(l.floor() + &one);
    }
    if let Some(u) = cell.upper() {
        candidates.push(u.floor());
        candidates.push(u.ceil() - &one);
    }
    candidates.into_iter().find(|k| cell.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadkit_math::Polynomial;
    use num_bigint::BigInt;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn ran(n: i64) -> RealAlgebraicNumber {
        RealAlgebraicNumber::from_rational(rat(n), true)
    }

    fn sqrt2() -> RealAlgebraicNumber {
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-2, &[])]);
        RealAlgebraicNumber::from_polynomial(&p, 0, &Interval::open(rat(1), rat(2)), true)
            .expect("isolating interval")
    }

    #[test]
    fn test_sample_between_roots() {
        let q = sample_between(Some(&ran(1)), Some(&ran(3)), &Interval::unbounded(), false);
        assert_eq!(q, Some(rat(2)));
        let r = sqrt2();
        let q = sample_between(Some(&ran(1)), Some(&r), &Interval::unbounded(), false);
        assert!(q.is_some_and(|q| q > rat(1) && &q * &q < rat(2)));
    }

    #[test]
    fn test_sample_between_respects_bound() {
        let bound = Interval::closed(rat(10), rat(20));
        assert_eq!(sample_between(Some(&ran(1)), Some(&ran(3)), &bound, false), None);
        assert_eq!(sample_between(Some(&ran(25)), None, &bound, false), None);
        let q = sample_between(Some(&ran(1)), None, &bound, false);
        assert!(q.is_some_and(|q| bound.contains(&q)));
        // a point bound inside the gap is hit exactly
        let point = Interval::point(rat(2));
        assert_eq!(sample_between(Some(&ran(1)), Some(&ran(3)), &point, false), Some(rat(2)));
    }

    #[test]
    fn test_integer_preference() {
        let bound = Interval::unbounded();
        let q = sample_between(Some(&ran(3)), Some(&ran(7)), &bound, true);
        assert_eq!(q, Some(rat(4)));
        let half = BigRational::new(BigInt::from(1), BigInt::from(2));
        let tight = Interval::open(half.clone(), half + BigRational::new(BigInt::from(1), BigInt::from(4)));
        assert_eq!(integer_in(&tight), None);
    }

    #[test]
    fn test_widened_stops_at_roots() {
        let current = Interval::closed(rat(0), rat(1));
        let roots = vec![ran(-3), ran(-1), ran(5)];
        let grown = widened(&current, &roots);
        assert_eq!(grown, Interval::open(rat(-1), rat(5)));
        // nothing below: unbounded on that side
        let grown = widened(&current, &[ran(5)]);
        assert_eq!(grown.lower(), None);
    }
}
