//! Satisfiability checks over the sample tree.
//!
//! A check runs in three phases. The leaf returned by the previous
//! satisfiable check is tried first, then every leaf already in the tree,
//! and finally the tree is lifted depth first from the root. Whenever the
//! lifting runs out of candidates, one more elimination step is performed
//! and the lifting resumes with the new polynomials; the check is
//! unsatisfiable once nothing is left to eliminate.

use super::bounds::BoundMap;
use super::Cad;
use crate::conflict_graph::{ConflictGraph, SelectionGraph};
use crate::constraint::{CadConstraints, Constraint};
use crate::error::{CadError, CadResult};
use crate::observer::CadObserver;
use crate::sample_set::SampleSet;
use crate::sample_tree::NodeId;
use crate::settings::IntegerHandling;
use cadkit_math::{sign_at, Interval, RealAlgebraicNumber, RealAlgebraicPoint, Sign, Var};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, trace};

/// Deductions derived from an unsatisfiable check: each entry reads
/// "the premises imply the conclusions".
pub type Deductions = Vec<(Vec<Constraint>, Vec<Constraint>)>;

/// Result of a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A point satisfying every constraint, one coordinate per variable of
    /// [`Cad::variables`].
    Sat(RealAlgebraicPoint),
    /// No point satisfies the constraints (inside the bounds, if any).
    Unsat,
    /// The check was interrupted or could not be completed.
    Unknown,
}

impl Answer {
    /// Check whether the answer is SAT.
    pub fn is_sat(&self) -> bool {
        matches!(self, Answer::Sat(_))
    }

    /// Check whether the answer is UNSAT.
    pub fn is_unsat(&self) -> bool {
        matches!(self, Answer::Unsat)
    }

    /// Check whether the answer is unknown.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Answer::Unknown)
    }

    /// The satisfying point.
    pub fn point(&self) -> Option<&RealAlgebraicPoint> {
        match self {
            Answer::Sat(p) => Some(p),
            _ => None,
        }
    }
}

/// Options of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Look for a point not returned since the last check without `next`.
    pub next: bool,
    /// Try the point of the previous satisfiable check first.
    pub check_trace_first: bool,
    /// Restrict the search to the bounds.
    pub check_bounds: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            next: false,
            check_trace_first: false,
            check_bounds: true,
        }
    }
}

enum Lift {
    Found(NodeId),
    Exhausted,
    Interrupted,
}

/// Which children of a node take part in the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    All,
    /// An equation decides the coordinate: no sector samples are created,
    /// existing ones are still checked.
    Decided,
    RootsOnly,
    NonRootsOnly,
}

struct Search<'a> {
    constraints: &'a CadConstraints,
    graph: Option<&'a mut ConflictGraph>,
    bounds: Option<&'a BoundMap>,
    prune: bool,
    skip: FxHashSet<NodeId>,
    failed: FxHashSet<NodeId>,
    /// Nodes without a solution below them, stamped with the number of
    /// polynomials their subtree had been lifted with.
    exhausted: FxHashMap<NodeId, u64>,
    equations_decide: bool,
    roots_only: bool,
    nonroots_only: bool,
    integer_rejected: bool,
}

impl<O: CadObserver> Cad<O> {
    /// Check the conjunction of `constraints`.
    ///
    /// Polynomials and variables of the constraints that the CAD does not
    /// know yet are added first.
    pub fn check(&mut self, constraints: &[Constraint]) -> CadResult<Answer> {
        let mut bounds = BoundMap::new();
        self.check_with_bounds(constraints, &mut bounds)
    }

    /// Check `constraints` inside `bounds`. On SAT the bounds shrink to the
    /// cells of the solution, on UNSAT they may grow as long as the
    /// constraints stay unsatisfiable (see `improve_bounds`).
    pub fn check_with_bounds(&mut self, constraints: &[Constraint], bounds: &mut BoundMap) -> CadResult<Answer> {
        self.check_inner(constraints, None, bounds, &mut Vec::new(), CheckOptions::default(), true)
    }

    /// Check `constraints` with every output.
    ///
    /// With `compute_conflict_graph` set, `graph` receives one column per
    /// rejected sample, and an unsatisfiable check without bounds adds up
    /// to `number_of_deductions` entries to `deductions`.
    pub fn check_full(
        &mut self,
        constraints: &[Constraint],
        graph: &mut ConflictGraph,
        bounds: &mut BoundMap,
        deductions: &mut Deductions,
        options: CheckOptions,
    ) -> CadResult<Answer> {
        let graph = if self.settings.compute_conflict_graph {
            graph.clear_sample_vertices();
            Some(graph)
        } else {
            None
        };
        self.check_inner(constraints, graph, bounds, deductions, options, true)
    }

    pub(crate) fn check_inner(
        &mut self,
        constraints: &[Constraint],
        mut graph: Option<&mut ConflictGraph>,
        bounds: &mut BoundMap,
        deductions: &mut Deductions,
        options: CheckOptions,
        improve: bool,
    ) -> CadResult<Answer> {
        self.stats.checks += 1;
        for c in constraints {
            if let Some(v) = c.polynomial().vars().into_iter().find(|v| !c.variables().contains(v)) {
                return Err(CadError::UnknownVariable(v));
            }
        }
        for c in constraints {
            self.register_variables(c.variables());
            if !c.polynomial().is_constant() && !self.polynomials.contains(c.polynomial()) {
                self.add_polynomial(c.polynomial().clone(), c.variables());
            }
        }
        self.prepare_elimination();
        self.lifting_failed = false;

        let n = self.variables.len();
        if let Some((&var, _)) = bounds.iter().find(|(&i, b)| i >= n || b.is_empty()) {
            return Err(CadError::InvalidBounds { var });
        }
        let active = options.check_bounds && !bounds.is_empty();
        self.update_deferral(active.then_some(&*bounds));
        if !options.next {
            self.returned_leaves.clear();
        }

        if active && self.settings.pre_solve_by_bounds {
            let integers_free = self.integer_variables.is_empty()
                || self.settings.integer_handling == IntegerHandling::None;
            match self.presolve_by_bounds(constraints, bounds) {
                Some(Answer::Sat(point)) if integers_free && !options.next => {
                    self.stats.presolved += 1;
                    return Ok(self.count(Answer::Sat(point)));
                }
                Some(Answer::Unsat) => {
                    self.stats.presolved += 1;
                    return Ok(self.count(Answer::Unsat));
                }
                _ => {}
            }
        }

        let cc = CadConstraints::new(constraints, &self.variables);
        if let Some(g) = graph.as_deref_mut() {
            cc.register(g);
        }
        let has_equations = cc.has_equations();
        let all_strict = !cc.is_empty() && cc.all_strict();
        let settings = &self.settings;
        let equations_decide = settings.equations_only || (settings.auto_separate_equations && has_equations);
        let roots_only = settings.equations_only && settings.zero_dim_equations && has_equations;
        let nonroots_only = (settings.inequalities_only || settings.auto_separate_equations) && all_strict;
        if settings.inequalities_only && !all_strict {
            debug!("inequalities only ignored: some constraint is not strict");
        }

        let outcome = {
            let mut search = Search {
                constraints: &cc,
                graph: graph.as_deref_mut(),
                bounds: active.then_some(&*bounds),
                prune: self.settings.early_lifting_pruning_by_bounds,
                skip: self.returned_leaves.clone(),
                failed: FxHashSet::default(),
                exhausted: FxHashMap::default(),
                equations_decide,
                roots_only,
                nonroots_only,
                integer_rejected: false,
            };
            let outcome = self.main_check(&mut search, options);
            (outcome, search.integer_rejected)
        };

        let answer = match outcome {
            (Lift::Found(leaf), _) => {
                let point = self.point_of(leaf);
                debug!(%point, "satisfying sample found");
                self.trace = Some(leaf);
                self.returned_leaves.insert(leaf);
                if improve && active && self.settings.improve_bounds {
                    self.shrink_bounds(bounds, leaf);
                }
                Answer::Sat(point)
            }
            (Lift::Interrupted, _) => {
                info!("check interrupted");
                self.stats.interrupts += 1;
                Answer::Unknown
            }
            (Lift::Exhausted, integer_rejected) if integer_rejected || self.lifting_failed => {
                debug!(integer_rejected, lifting_failed = self.lifting_failed, "search incomplete");
                Answer::Unknown
            }
            (Lift::Exhausted, _) => {
                if !options.next && !active {
                    if let Some(g) = graph {
                        self.derive_deductions(constraints, g, deductions, equations_decide || roots_only);
                    }
                }
                if improve && active && self.settings.improve_bounds {
                    self.widen_bounds(constraints, bounds);
                }
                Answer::Unsat
            }
        };
        Ok(self.count(answer))
    }

    fn count(&mut self, answer: Answer) -> Answer {
        match answer {
            Answer::Sat(_) => self.stats.sat_answers += 1,
            Answer::Unsat => self.stats.unsat_answers += 1,
            Answer::Unknown => self.stats.unknown_answers += 1,
        }
        answer
    }

    fn register_variables(&mut self, vars: &[Var]) {
        for &v in vars {
            if !self.variables.contains(&v) && !self.new_variables.contains(&v) {
                self.new_variables.push(v);
            }
        }
    }

    fn main_check(&mut self, search: &mut Search<'_>, options: CheckOptions) -> Lift {
        let n = self.variables.len();
        let root = self.tree.root();
        if !search.constraints.satisfied_at_depth(0, &[], search.graph.as_deref_mut()) {
            debug!("constant constraint violated");
            return Lift::Exhausted;
        }
        if n == 0 {
            return if search.skip.contains(&root) {
                Lift::Exhausted
            } else {
                Lift::Found(root)
            };
        }

        if options.check_trace_first || self.settings.warm_restart {
            if let Some(leaf) = self.trace.filter(|&t| t < self.tree.len() && self.tree.depth(t) == n) {
                if self.leaf_usable(leaf, search) {
                    trace!(leaf, "trace reused");
                    self.stats.trace_hits += 1;
                    return Lift::Found(leaf);
                }
            }
        }

        let leaves: Vec<NodeId> = self.tree.nodes_at(n).collect();
        for leaf in leaves {
            if self.an_answer_found() {
                return Lift::Interrupted;
            }
            if self.leaf_usable(leaf, search) {
                trace!(leaf, "existing sample satisfies the constraints");
                return Lift::Found(leaf);
            }
        }

        loop {
            match self.lift_check(root, search) {
                Lift::Exhausted => {}
                other => return other,
            }
            if self.an_answer_found() {
                return Lift::Interrupted;
            }
            match self.eliminate(n) {
                Some(level) => debug!(level, "samples exhausted, elimination continued"),
                None => return Lift::Exhausted,
            }
        }
    }

    fn lift_check(&mut self, node: NodeId, search: &mut Search<'_>) -> Lift {
        let n = self.variables.len();
        let depth = self.tree.depth(node);
        let level = n - 1 - depth;
        let var = self.variables[level];
        let stamp: u64 = self.generations[..=level].iter().sum();
        if search.exhausted.get(&node) == Some(&stamp) {
            return Lift::Exhausted;
        }

        let filter = self.child_filter(node, search);
        let bound = if search.prune {
            self.level_bound(search.bounds, level)
        } else {
            Interval::unbounded()
        };
        match filter {
            Filter::Decided | Filter::RootsOnly => self.lift_node(node, None),
            Filter::All | Filter::NonRootsOnly => self.lift_node(node, Some(&bound)),
        }

        let mut candidates: SampleSet<NodeId> = SampleSet::new();
        for &child in self.tree.children(node) {
            if search.failed.contains(&child) {
                continue;
            }
            let Some(value) = self.tree.value(child) else {
                continue;
            };
            let keep = match filter {
                Filter::RootsOnly => value.is_root(),
                Filter::NonRootsOnly => !value.is_root(),
                Filter::All | Filter::Decided => true,
            };
            if keep && value.contained_in(&bound) {
                candidates.insert(value.clone(), child);
            }
        }

        while let Some((value, child)) = self.pop_candidate(&mut candidates) {
            if self.an_answer_found() {
                return Lift::Interrupted;
            }
            let leaf = depth + 1 == n;
            if leaf && search.skip.contains(&child) {
                continue;
            }
            if !self.integral_early(var, &value) {
                search.integer_rejected = true;
                continue;
            }
            let owned = self.assignment_of(child);
            let assignment: Vec<(Var, &RealAlgebraicNumber)> = owned.iter().map(|(v, r)| (*v, r)).collect();
            let satisfied = search
                .constraints
                .satisfied_at_depth(depth + 1, &assignment, search.graph.as_deref_mut());
            self.observer.on_check(child, satisfied);
            if !satisfied {
                search.failed.insert(child);
                continue;
            }
            if leaf {
                if !search.prune && !self.in_bounds(child, search.bounds) {
                    continue;
                }
                if !self.integral_lazy(child) {
                    search.integer_rejected = true;
                    continue;
                }
                return Lift::Found(child);
            }
            match self.lift_check(child, search) {
                Lift::Exhausted => {}
                other => return other,
            }
        }
        search.exhausted.insert(node, stamp);
        Lift::Exhausted
    }

    fn child_filter(&self, node: NodeId, search: &Search<'_>) -> Filter {
        if search.roots_only {
            return Filter::RootsOnly;
        }
        if search.equations_decide {
            let depth = self.tree.depth(node);
            let var = self.variables[self.child_level(node)];
            let owned = self.assignment_of(node);
            let assignment: Vec<(Var, &RealAlgebraicNumber)> = owned.iter().map(|(v, r)| (*v, r)).collect();
            let decided = search
                .constraints
                .at_depth(depth + 1)
                .filter(|c| c.is_equation())
                .any(|c| !nullified(c, var, &assignment));
            if decided {
                return Filter::Decided;
            }
        }
        if search.nonroots_only {
            return Filter::NonRootsOnly;
        }
        Filter::All
    }

    fn pop_candidate(&self, candidates: &mut SampleSet<NodeId>) -> Option<(RealAlgebraicNumber, NodeId)> {
        if self.settings.prefer_nr_samples {
            candidates.simplify();
            if !candidates.empty_nr() {
                return candidates.pop_nr();
            }
        }
        if self.settings.prefer_samples_by_is_root {
            return if self.settings.prefer_nonroot_samples {
                candidates.pop_non_root()
            } else {
                candidates.pop_root()
            };
        }
        candidates.pop()
    }

    /// Check whether an existing leaf answers the check.
    fn leaf_usable(&self, leaf: NodeId, search: &Search<'_>) -> bool {
        if search.skip.contains(&leaf) || !self.in_bounds(leaf, search.bounds) {
            return false;
        }
        let owned = self.assignment_of(leaf);
        if self.settings.integer_handling != IntegerHandling::None
            && !owned.iter().all(|(v, value)| self.integral_early(*v, value))
        {
            return false;
        }
        if !self.integral_lazy(leaf) {
            return false;
        }
        let assignment: Vec<(Var, &RealAlgebraicNumber)> = owned.iter().map(|(v, r)| (*v, r)).collect();
        search
            .constraints
            .constraints()
            .iter()
            .all(|c| c.satisfied_at(&assignment))
    }

    fn in_bounds(&self, node: NodeId, bounds: Option<&BoundMap>) -> bool {
        let Some(bounds) = bounds else {
            return true;
        };
        let n = self.variables.len();
        let mut current = node;
        while let Some(parent) = self.tree.node(current).parent() {
            let index = n - self.tree.depth(current);
            if let (Some(b), Some(v)) = (bounds.get(&index), self.tree.value(current)) {
                if !v.contained_in(b) {
                    return false;
                }
            }
            current = parent;
        }
        true
    }

    /// The point of `leaf`, ordered like [`Cad::variables`].
    fn point_of(&self, leaf: NodeId) -> RealAlgebraicPoint {
        let mut coords: Vec<RealAlgebraicNumber> = self.tree.path(leaf).into_iter().cloned().collect();
        coords.reverse();
        RealAlgebraicPoint::new(coords)
    }

    /// Deductions `core \ {c} => not c` from a greedy cover of the sample
    /// columns by the constraints of this check.
    ///
    /// With `decided_by_equations`, sector samples were only skipped where an
    /// equation of the check vanishes on no sector, so the columns cover the
    /// search space of a subset only if it keeps every equation.
    fn derive_deductions(
        &self,
        constraints: &[Constraint],
        graph: &mut ConflictGraph,
        deductions: &mut Deductions,
        decided_by_equations: bool,
    ) {
        if self.settings.number_of_deductions == 0 {
            return;
        }
        let rows: Vec<usize> = constraints.iter().map(|c| graph.constraint_id(c)).collect();
        let columns = graph.sample_count();
        let mut selection = SelectionGraph::new(columns);
        for &v in &rows {
            selection.add_row((0..columns).map(|s| !graph.satisfies(v, s)));
        }
        let Some(cover) = selection.cover() else {
            debug!("conflict graph does not explain the check");
            return;
        };
        let mut selected: Vec<usize> = cover;
        if decided_by_equations {
            selected.extend((0..constraints.len()).filter(|&i| constraints[i].is_equation()));
        }
        selected.sort_unstable();
        selected.dedup();
        let mut core: Vec<Constraint> = Vec::with_capacity(selected.len());
        for i in selected {
            if !core.contains(&constraints[i]) {
                core.push(constraints[i].clone());
            }
        }
        debug!(core = core.len(), "infeasible subset");
        for i in 0..core.len().min(self.settings.number_of_deductions) {
            let premises: Vec<Constraint> = core
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, c)| c.clone())
                .collect();
            deductions.push((premises, vec![core[i].negation()]));
        }
    }
}

/// Check whether `c` vanishes identically in `var` over the assignment.
/// Undecided coefficient signs count as vanishing.
fn nullified(c: &Constraint, var: Var, assignment: &[(Var, &RealAlgebraicNumber)]) -> bool {
    c.polynomial()
        .coefficients(var)
        .iter()
        .all(|coeff| matches!(sign_at(coeff, assignment), None | Some(Sign::Zero)))
}
