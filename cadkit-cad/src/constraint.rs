//! Sign conditions on polynomials.

use crate::conflict_graph::ConflictGraph;
use cadkit_math::{sign_at, Polynomial, RealAlgebraicNumber, RealAlgebraicPoint, Sign, Var};
use std::fmt;

/// A sign condition `p ~ 0` over an ordered variable list.
///
/// Without negation the relation is `p < 0`, `p = 0` or `p > 0` for the
/// signs `Negative`, `Zero` and `Positive`; negation gives `p >= 0`,
/// `p != 0` and `p <= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    polynomial: Polynomial,
    sign: Sign,
    variables: Vec<Var>,
    negated: bool,
}

impl Constraint {
    /// The constraint `polynomial ~ 0` with `~` given by `sign`.
    ///
    /// `variables` lists the coordinates of the points the constraint is
    /// evaluated at and must cover the variables of the polynomial.
    pub fn new(polynomial: Polynomial, sign: Sign, variables: Vec<Var>) -> Self {
        debug_assert!(polynomial.vars().iter().all(|v| variables.contains(v)));
        Self {
            polynomial,
            sign,
            variables,
            negated: false,
        }
    }

    /// The negation of `polynomial ~ 0`.
    pub fn negated(polynomial: Polynomial, sign: Sign, variables: Vec<Var>) -> Self {
        Self {
            negated: true,
            ..Self::new(polynomial, sign, variables)
        }
    }

    /// The constrained polynomial.
    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    /// The sign the polynomial is compared with.
    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// The coordinate variables.
    pub fn variables(&self) -> &[Var] {
        &self.variables
    }

    /// Check whether the relation is negated.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// `p = 0`.
    pub fn is_equation(&self) -> bool {
        !self.negated && self.sign == Sign::Zero
    }

    /// `p < 0`, `p > 0` or `p != 0`: the solution set is open.
    pub fn is_strict(&self) -> bool {
        self.negated == (self.sign == Sign::Zero)
    }

    /// The complementary constraint.
    pub fn negation(&self) -> Constraint {
        Self {
            negated: !self.negated,
            ..self.clone()
        }
    }

    /// Replace the coordinate variables.
    pub fn unify_variables(&mut self, variables: &[Var]) {
        self.variables = variables.to_vec();
    }

    /// Whether the relation holds for a polynomial of sign `s`.
    pub fn holds_for(&self, s: Sign) -> bool {
        (s == self.sign) != self.negated
    }

    /// Check the constraint at `point`, whose coordinates belong to
    /// `variables` in order. Unassigned polynomial variables fail the check.
    pub fn satisfied_by(&self, point: &RealAlgebraicPoint, variables: &[Var]) -> bool {
        debug_assert_eq!(point.dim(), variables.len());
        let assignment: Vec<(Var, &RealAlgebraicNumber)> =
            variables.iter().copied().zip(point.iter()).collect();
        self.satisfied_at(&assignment)
    }

    pub(crate) fn satisfied_at(&self, assignment: &[(Var, &RealAlgebraicNumber)]) -> bool {
        match sign_at(&self.polynomial, assignment) {
            Some(s) => self.holds_for(s),
            None => {
                debug_assert!(false, "constraint {} evaluated at a partial point", self);
                false
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rel = match (self.sign, self.negated) {
            (Sign::Negative, false) => "<",
            (Sign::Zero, false) => "=",
            (Sign::Positive, false) => ">",
            (Sign::Negative, true) => ">=",
            (Sign::Zero, true) => "!=",
            (Sign::Positive, true) => "<=",
        };
        write!(f, "{} {} 0", self.polynomial, rel)
    }
}

/// The constraints of one check, grouped by the sample tree depth at which
/// they become decidable.
///
/// With variables `x_0 .. x_{n-1}`, a sample at depth `d` assigns the last
/// `d` of them. A constraint is listed at the smallest depth whose assigned
/// variables cover its polynomial.
#[derive(Debug, Clone, Default)]
pub struct CadConstraints {
    constraints: Vec<Constraint>,
    by_depth: Vec<Vec<usize>>,
}

impl CadConstraints {
    /// Group `constraints` for the variable order `variables`.
    pub fn new(constraints: &[Constraint], variables: &[Var]) -> Self {
        let n = variables.len();
        let mut by_depth = vec![Vec::new(); n + 1];
        for (i, c) in constraints.iter().enumerate() {
            let depth = c
                .polynomial
                .vars()
                .iter()
                .filter_map(|v| variables.iter().position(|w| w == v))
                .map(|level| n - level)
                .max()
                .unwrap_or(0);
            by_depth[depth].push(i);
        }
        Self {
            constraints: constraints.to_vec(),
            by_depth,
        }
    }

    /// All constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Check whether there are no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Constraints decided exactly at `depth`.
    pub fn at_depth(&self, depth: usize) -> impl Iterator<Item = &Constraint> {
        self.by_depth
            .get(depth)
            .into_iter()
            .flatten()
            .map(move |&i| &self.constraints[i])
    }

    /// Check whether every constraint is strict.
    pub fn all_strict(&self) -> bool {
        self.constraints.iter().all(Constraint::is_strict)
    }

    /// Check whether some constraint is an equation.
    pub fn has_equations(&self) -> bool {
        self.constraints.iter().any(Constraint::is_equation)
    }

    /// Register every constraint as a vertex of `graph`.
    pub fn register(&self, graph: &mut ConflictGraph) {
        for c in &self.constraints {
            graph.constraint_id(c);
        }
    }

    /// Check the constraints decided at `depth` for the assignment of a
    /// sample at that depth.
    ///
    /// Constraints decided at smaller depths are assumed to hold, as they
    /// were checked on the way down. If `graph` is given and the check
    /// fails, the sample is recorded as a new column; constraints decided
    /// elsewhere count as satisfied.
    pub fn satisfied_at_depth(
        &self,
        depth: usize,
        assignment: &[(Var, &RealAlgebraicNumber)],
        graph: Option<&mut ConflictGraph>,
    ) -> bool {
        let Some(ids) = self.by_depth.get(depth) else {
            return true;
        };
        match graph {
            None => ids.iter().all(|&i| self.constraints[i].satisfied_at(assignment)),
            Some(graph) => {
                let mut all = true;
                let mut satisfied = Vec::with_capacity(self.constraints.len());
                for (i, c) in self.constraints.iter().enumerate() {
                    let holds = !ids.contains(&i) || c.satisfied_at(assignment);
                    all &= holds;
                    if holds {
                        satisfied.push(graph.constraint_id(c));
                    }
                }
                if !all {
                    graph.add_edges(satisfied);
                }
                all
            }
        }
    }

    /// Check every constraint at a full point.
    pub fn satisfied_by(&self, point: &RealAlgebraicPoint, variables: &[Var]) -> bool {
        self.constraints.iter().all(|c| c.satisfied_by(point, variables))
    }
}
