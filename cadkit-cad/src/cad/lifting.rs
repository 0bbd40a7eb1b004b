//! Construction of sample points over a node of the sample tree.

use super::bounds::sample_between;
use super::Cad;
use crate::elimination_set::PolyId;
use crate::observer::CadObserver;
use crate::sample_tree::NodeId;
use crate::settings::IntegerHandling;
use cadkit_math::{real_roots_at, Interval, RealAlgebraicNumber, Var};
use tracing::{trace, warn};

impl<O: CadObserver> Cad<O> {
    /// Level whose variable the children of `node` assign.
    pub(crate) fn child_level(&self, node: NodeId) -> usize {
        self.variables.len() - 1 - self.tree.depth(node)
    }

    /// The assignment of the point of `node`.
    pub(crate) fn assignment_of(&self, node: NodeId) -> Vec<(Var, RealAlgebraicNumber)> {
        let n = self.variables.len();
        self.tree
            .path(node)
            .into_iter()
            .enumerate()
            .map(|(i, v)| (self.variables[n - 1 - i], v.clone()))
            .collect()
    }

    /// Isolate the roots of every polynomial of the child level that has
    /// not been lifted over `node` yet, and add them as children. With
    /// `fill`, every cell also gets a non-root sample inside that bound.
    ///
    /// Polynomials whose roots cannot be isolated over the sample are
    /// skipped and mark the current check as incomplete.
    pub(crate) fn lift_node(&mut self, node: NodeId, fill: Option<&Interval>) {
        let level = self.child_level(node);
        let var = self.variables[level];
        let pending: Vec<PolyId> = self.elimination_sets[level]
            .lifting_order()
            .into_iter()
            .filter(|&id| !self.tree.node(node).is_lifted(id))
            .collect();
        let mut roots = Vec::new();
        if !pending.is_empty() {
            let owned = self.assignment_of(node);
            let assignment: Vec<(Var, &RealAlgebraicNumber)> = owned.iter().map(|(v, r)| (*v, r)).collect();
            for id in pending {
                let Some(p) = self.elimination_sets[level].get(id).cloned() else {
                    self.tree.mark_lifted(node, id);
                    continue;
                };
                self.stats.lifting_steps += 1;
                match real_roots_at(&p, var, &assignment, &Interval::unbounded(), self.settings.splitting_strategy) {
                    Some(found) => {
                        self.tree.mark_lifted(node, id);
                        if found.nullified {
                            trace!(poly = %p, node, "polynomial vanishes over the sample");
                        }
                        roots.extend(found.roots);
                    }
                    // Left unlifted, so every later visit of `node` retries.
                    None => {
                        warn!(poly = %p, node, "root isolation over the sample failed");
                        self.lifting_failed = true;
                    }
                }
            }
        }
        match fill {
            Some(bound) => {
                self.samples(node, roots, bound);
            }
            None => {
                for mut root in roots {
                    root.set_is_root(true);
                    self.add_child(node, root);
                }
            }
        }
    }

    /// Merge `roots` into the children of `node` and add a non-root
    /// sample inside `bound` to every cell between consecutive roots that
    /// has none there. Returns the nodes created.
    pub fn samples(&mut self, node: NodeId, roots: Vec<RealAlgebraicNumber>, bound: &Interval) -> Vec<NodeId> {
        let mut created = Vec::new();
        for mut root in roots {
            root.set_is_root(true);
            if let Some(id) = self.add_child(node, root) {
                created.push(id);
            }
        }
        created.extend(self.fill_gaps(node, bound));
        created
    }

    /// Add a non-root sample inside `bound` to every cell between
    /// consecutive root children of `node` that lacks one.
    pub(crate) fn fill_gaps(&mut self, node: NodeId, bound: &Interval) -> Vec<NodeId> {
        let var = self.variables[self.child_level(node)];
        let prefer_integer = self.integer_variables.contains(&var)
            && matches!(
                self.settings.integer_handling,
                IntegerHandling::SplitEarly | IntegerHandling::GuessAndSplit
            );
        let mut gaps: Vec<(Option<RealAlgebraicNumber>, Option<RealAlgebraicNumber>)> = Vec::new();
        let mut lower: Option<&RealAlgebraicNumber> = None;
        let mut covered = false;
        for &c in self.tree.children(node) {
            let Some(v) = self.tree.value(c) else {
                continue;
            };
            if v.is_root() {
                if !covered {
                    gaps.push((lower.cloned(), Some(v.clone())));
                }
                lower = Some(v);
                covered = false;
            } else if !covered && v.contained_in(bound) {
                covered = true;
            }
        }
        if !covered {
            gaps.push((lower.cloned(), None));
        }

        let mut created = Vec::new();
        for (a, b) in gaps {
            if let Some(q) = sample_between(a.as_ref(), b.as_ref(), bound, prefer_integer) {
                if let Some(id) = self.add_child(node, RealAlgebraicNumber::from_rational(q, false)) {
                    created.push(id);
                }
            }
        }
        created
    }

    fn add_child(&mut self, node: NodeId, value: RealAlgebraicNumber) -> Option<NodeId> {
        let (id, added) = self.tree.insert_child(node, value);
        if !added {
            return None;
        }
        self.stats.samples_constructed += 1;
        if let Some(v) = self.tree.value(id) {
            trace!(node, child = id, value = %v, "sample");
            self.observer.on_sample(node, id, v);
        }
        Some(id)
    }

    /// Integrality test for a coordinate of `var` at assignment time.
    pub(crate) fn integral_early(&self, var: Var, value: &RealAlgebraicNumber) -> bool {
        if !self.integer_variables.contains(&var) {
            return true;
        }
        match self.settings.integer_handling {
            IntegerHandling::None | IntegerHandling::SplitLazy => true,
            IntegerHandling::SplitEarly => value.is_integral(),
            IntegerHandling::GuessAndSplit => {
                value.refine_to_integrality();
                value.is_integral()
            }
        }
    }

    /// Integrality test for a full point.
    pub(crate) fn integral_lazy(&self, leaf: NodeId) -> bool {
        if self.settings.integer_handling != IntegerHandling::SplitLazy {
            return true;
        }
        self.assignment_of(leaf)
            .iter()
            .all(|(var, value)| !self.integer_variables.contains(var) || value.is_integral())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadkit_math::Polynomial;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn children_values(cad: &Cad, node: NodeId) -> Vec<(Option<BigRational>, bool)> {
        cad.sample_tree()
            .children(node)
            .iter()
            .filter_map(|&c| cad.sample_tree().value(c))
            .map(|v| (v.value(), v.is_root()))
            .collect()
    }

    #[test]
    fn test_lift_root_adds_roots_and_gaps() {
        let mut cad = Cad::new();
        // y^2 - 4 at the only level
        cad.add_polynomial(Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-4, &[])]), &[0]);
        cad.prepare_elimination();
        let root = cad.sample_tree().root();
        cad.lift_node(root, Some(&Interval::unbounded()));
        let values = children_values(&cad, root);
        assert_eq!(values.len(), 5);
        assert_eq!(values[1], (Some(rat(-2)), true));
        assert_eq!(values[3], (Some(rat(2)), true));
        assert_eq!(values[2], (Some(rat(0)), false));
        assert!(values.iter().filter(|(_, r)| !r).count() == 3);
        // lifting again adds nothing
        let before = cad.sample_tree().len();
        cad.lift_node(root, Some(&Interval::unbounded()));
        assert_eq!(cad.sample_tree().len(), before);
    }

    #[test]
    fn test_fill_gaps_honors_bound() {
        let mut cad = Cad::new();
        cad.add_polynomial(Polynomial::from_var(0), &[0]);
        cad.prepare_elimination();
        let root = cad.sample_tree().root();
        cad.lift_node(root, Some(&Interval::unbounded()));
        // the cell (0, oo) already has a sample; none lies in [5, 6]
        let created = cad.fill_gaps(root, &Interval::closed(rat(5), rat(6)));
        assert_eq!(created.len(), 1);
        let v = cad.sample_tree().value(created[0]).and_then(|v| v.value());
        assert!(v.is_some_and(|v| v >= rat(5) && v <= rat(6)));
        // (-oo, 0) does not meet the bound
        assert_eq!(children_values(&cad, root).len(), 4);
    }

    #[test]
    fn test_integer_preference_in_gaps() {
        let mut cad = Cad::new();
        cad.set_integer_variables([0]);
        cad.alter_setting(crate::CadSettings {
            integer_handling: IntegerHandling::SplitEarly,
            ..crate::CadSettings::default()
        });
        // 3x - 1 and 3x - 8: the cell (1/3, 8/3) contains 1 and 2
        cad.add_polynomial(Polynomial::from_coeffs_int(&[(3, &[(0, 1)]), (-1, &[])]), &[0]);
        cad.add_polynomial(Polynomial::from_coeffs_int(&[(3, &[(0, 1)]), (-8, &[])]), &[0]);
        cad.prepare_elimination();
        let root = cad.sample_tree().root();
        cad.lift_node(root, Some(&Interval::unbounded()));
        let middle = children_values(&cad, root)[2].0.clone();
        assert!(middle.is_some_and(|v| v.is_integer()));
        assert!(cad.integral_early(0, &RealAlgebraicNumber::from_rational(rat(2), false)));
    }
}
