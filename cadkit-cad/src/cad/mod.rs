//! The CAD engine.
//!
//! [`Cad`] owns one [`EliminationSet`] per variable and a [`SampleTree`].
//! Polynomials are added with [`Cad::add_polynomial`] and become part of
//! the decomposition on the next [`Cad::prepare_elimination`] (called by
//! every check). Elimination and lifting are interleaved: a check first
//! lifts with the polynomials at hand and projects further only when the
//! sample tree runs out of candidates.
//!
//! ## Levels
//!
//! With variables `x_0 .. x_{n-1}`, level `k` holds polynomials whose
//! first variable in this order is `x_k`; projecting level `k` eliminates
//! `x_k`. Lifting runs the other way round: the children of the root
//! assign `x_{n-1}`, their children `x_{n-2}`, and so on.
//!
//! ## References
//!
//! - Collins: "Quantifier elimination for real closed fields by cylindrical
//!   algebraic decomposition" (1975)
//! - Jovanović, de Moura: "Solving non-linear arithmetic" (2012)

mod bounds;
mod check;
mod elimination;
mod lifting;

pub use bounds::BoundMap;
pub use check::{Answer, CheckOptions, Deductions};

use crate::elimination_set::{EliminationSet, PolyId, Provenance};
use crate::observer::{CadObserver, NoopObserver};
use crate::projection::Projection;
use crate::sample_tree::{NodeId, SampleTree};
use crate::settings::CadSettings;
use cadkit_math::{real_roots, Interval, Polynomial, RealAlgebraicNumber, Var};
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Statistics for the CAD engine.
#[derive(Debug, Clone, Default)]
pub struct CadStats {
    /// Checks started.
    pub checks: u64,
    /// Checks answered SAT.
    pub sat_answers: u64,
    /// Checks answered UNSAT.
    pub unsat_answers: u64,
    /// Checks answered unknown.
    pub unknown_answers: u64,
    /// Checks answered by the sample trace of an earlier check.
    pub trace_hits: u64,
    /// Checks decided by interval evaluation over the bounds.
    pub presolved: u64,
    /// Sample nodes created.
    pub samples_constructed: u64,
    /// Elimination steps performed.
    pub polynomials_eliminated: u64,
    /// Polynomials lifted over a sample.
    pub lifting_steps: u64,
    /// Checks stopped by an interrupt flag.
    pub interrupts: u64,
    /// Rebuilds after the variable list changed.
    pub rebuilds: u64,
    /// Internal checks run while widening bounds. These are not counted
    /// as checks or answers.
    pub bound_trials: u64,
}

/// A cylindrical algebraic decomposition, built on demand.
#[derive(Debug)]
pub struct Cad<O: CadObserver = NoopObserver> {
    variables: Vec<Var>,
    new_variables: Vec<Var>,
    polynomials: Vec<Polynomial>,
    scheduled: Vec<Polynomial>,
    elimination_sets: Vec<EliminationSet>,
    tree: SampleTree,
    trace: Option<NodeId>,
    returned_leaves: FxHashSet<NodeId>,
    /// Number of polynomials ever added per level.
    generations: Vec<u64>,
    settings: CadSettings,
    projection: Projection,
    integer_variables: FxHashSet<Var>,
    interrupts: Vec<Arc<AtomicBool>>,
    deferral_box: Option<BoundMap>,
    lifting_failed: bool,
    stats: CadStats,
    observer: O,
}

impl Default for Cad<NoopObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl Cad<NoopObserver> {
    /// Create an empty CAD with default settings.
    pub fn new() -> Self {
        Self::with_settings(CadSettings::default())
    }

    /// Create an empty CAD with `settings`.
    pub fn with_settings(settings: CadSettings) -> Self {
        Self::with_observer(settings, NoopObserver)
    }
}

impl<O: CadObserver> Cad<O> {
    /// Create an empty CAD reporting to `observer`.
    pub fn with_observer(settings: CadSettings, observer: O) -> Self {
        Self {
            variables: Vec::new(),
            new_variables: Vec::new(),
            polynomials: Vec::new(),
            scheduled: Vec::new(),
            elimination_sets: Vec::new(),
            tree: SampleTree::new(),
            trace: None,
            returned_leaves: FxHashSet::default(),
            generations: Vec::new(),
            projection: Projection::new(settings.projection),
            settings,
            integer_variables: FxHashSet::default(),
            interrupts: Vec::new(),
            deferral_box: None,
            lifting_failed: false,
            stats: CadStats::default(),
            observer,
        }
    }

    /// The variables in elimination order, including those added since the
    /// last preparation.
    pub fn variables(&self) -> &[Var] {
        &self.variables
    }

    /// Position of `var` in the variable list.
    pub fn index_of(&self, var: Var) -> Option<usize> {
        self.variables.iter().position(|&v| v == var)
    }

    /// The input polynomials, as added.
    pub fn polynomials(&self) -> &[Polynomial] {
        &self.polynomials
    }

    /// The elimination sets, one per level.
    pub fn elimination_sets(&self) -> &[EliminationSet] {
        &self.elimination_sets
    }

    /// The sample tree.
    pub fn sample_tree(&self) -> &SampleTree {
        &self.tree
    }

    /// Text rendering of the sample tree.
    pub fn sample_tree_string(&self) -> String {
        self.tree.to_string()
    }

    /// Values of all samples at `depth`, in creation order.
    pub fn samples_at(&self, depth: usize) -> Vec<RealAlgebraicNumber> {
        self.tree
            .nodes_at(depth)
            .filter_map(|id| self.tree.value(id).cloned())
            .collect()
    }

    /// The settings in use.
    pub fn settings(&self) -> &CadSettings {
        &self.settings
    }

    /// Replace the settings. Queue orders and the projection operator take
    /// effect immediately; a different operator restarts the elimination.
    pub fn alter_setting(&mut self, settings: CadSettings) {
        let operator_changed = settings.projection != self.settings.projection;
        let factorization_changed = settings.simplify_by_factorization
            != self.settings.simplify_by_factorization
            || settings.remove_constants != self.settings.remove_constants;
        for set in &mut self.elimination_sets {
            set.set_elimination_order(settings.order);
            set.set_lifting_order(settings.order);
        }
        self.projection.set_operator(settings.projection);
        self.settings = settings;
        if operator_changed || factorization_changed {
            debug!("settings change requires a new elimination");
            self.rebuild();
        }
    }

    /// Get statistics.
    pub fn stats(&self) -> &CadStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats = CadStats::default();
        self.projection.reset_stats();
    }

    /// The observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The observer, mutably.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Declare the variables that range over the integers.
    pub fn set_integer_variables(&mut self, vars: impl IntoIterator<Item = Var>) {
        self.integer_variables = vars.into_iter().collect();
    }

    /// Check whether `var` ranges over the integers.
    pub fn is_integer_variable(&self, var: Var) -> bool {
        self.integer_variables.contains(&var)
    }

    /// Register a flag that stops running checks when set.
    pub fn add_interrupt(&mut self, flag: Arc<AtomicBool>) {
        self.interrupts.push(flag);
    }

    /// Replace all interrupt flags.
    pub fn set_interrupts(&mut self, flags: Vec<Arc<AtomicBool>>) {
        self.interrupts = flags;
    }

    /// Check whether some interrupt flag is set.
    pub fn an_answer_found(&self) -> bool {
        self.interrupts.iter().any(|f| f.load(Ordering::Relaxed))
    }

    /// Schedule `poly` over `vars`. Variables not seen before are added on
    /// the next preparation. Returns false if the polynomial is known.
    pub fn add_polynomial(&mut self, poly: Polynomial, vars: &[Var]) -> bool {
        if self.polynomials.contains(&poly) {
            return false;
        }
        for v in vars.iter().copied().chain(poly.vars()) {
            if !self.variables.contains(&v) && !self.new_variables.contains(&v) {
                self.new_variables.push(v);
            }
        }
        trace!(%poly, "polynomial scheduled");
        self.polynomials.push(poly.clone());
        self.scheduled.push(poly);
        true
    }

    /// Schedule several polynomials over `vars`.
    pub fn add_polynomials(&mut self, polys: impl IntoIterator<Item = Polynomial>, vars: &[Var]) {
        for p in polys {
            self.add_polynomial(p, vars);
        }
    }

    /// Remove an input polynomial together with every elimination
    /// polynomial that was derived from it alone. Returns false if the
    /// polynomial is unknown.
    ///
    /// Samples stay in the tree: they still sample every cell of the
    /// smaller decomposition. The trace is dropped.
    pub fn remove_polynomial(&mut self, poly: &Polynomial) -> bool {
        let Some(pos) = self.polynomials.iter().position(|q| q == poly) else {
            return false;
        };
        self.polynomials.remove(pos);
        if let Some(s) = self.scheduled.iter().position(|q| q == poly) {
            self.scheduled.remove(s);
            return true;
        }
        let kept: FxHashSet<Polynomial> = self
            .polynomials
            .iter()
            .filter(|q| !self.scheduled.contains(q))
            .flat_map(|q| self.factors(q))
            .collect();
        for f in self.factors(poly) {
            if kept.contains(&f) {
                continue;
            }
            for level in 0..self.elimination_sets.len() {
                let Some(id) = self.elimination_sets[level].find(&f) else {
                    continue;
                };
                if self.elimination_sets[level].remove_input(id) {
                    self.cascade_removal(id);
                }
            }
        }
        debug!(%poly, "polynomial removed");
        self.trace = None;
        self.returned_leaves.clear();
        if self.settings.trim_variables {
            self.trim_variables();
        }
        true
    }

    /// Erase everything derived from `erased` at the levels above it.
    fn cascade_removal(&mut self, erased: PolyId) {
        let mut pending = vec![erased];
        while let Some(id) = pending.pop() {
            for set in self.elimination_sets.iter_mut().skip(id.level() + 1) {
                pending.extend(set.remove_by_parent(id));
            }
        }
    }

    /// Drop variables no input polynomial mentions.
    fn trim_variables(&mut self) {
        let used: FxHashSet<Var> = self.polynomials.iter().flat_map(|p| p.vars()).collect();
        let before = self.variables.len();
        self.variables.retain(|v| used.contains(v));
        self.new_variables.retain(|v| used.contains(v));
        if self.variables.len() != before {
            debug!(dropped = before - self.variables.len(), "variables trimmed");
            self.rebuild();
        }
    }

    /// Insert the scheduled polynomials. Returns whether the variable list
    /// grew, in which case the new variables are prepended and the whole
    /// decomposition is rebuilt.
    pub fn prepare_elimination(&mut self) -> bool {
        if self.new_variables.is_empty() {
            for p in std::mem::take(&mut self.scheduled) {
                self.insert_input(&p);
            }
            return false;
        }
        let mut vars = std::mem::take(&mut self.new_variables);
        vars.append(&mut self.variables);
        self.variables = vars;
        debug!(variables = ?self.variables, "variable list grew");
        self.rebuild();
        true
    }

    /// Drop the elimination and the samples; every input polynomial is
    /// scheduled again.
    pub fn clear_elimination(&mut self) {
        for set in &mut self.elimination_sets {
            set.clear();
        }
        self.generations.iter_mut().for_each(|g| *g = 0);
        self.reset_samples();
        self.scheduled = self.polynomials.clone();
    }

    /// Forget all polynomials, variables and samples.
    pub fn clear(&mut self) {
        self.variables.clear();
        self.new_variables.clear();
        self.polynomials.clear();
        self.scheduled.clear();
        self.elimination_sets.clear();
        self.generations.clear();
        self.reset_samples();
    }

    fn reset_samples(&mut self) {
        self.tree.clear();
        self.trace = None;
        self.returned_leaves.clear();
        self.deferral_box = None;
        self.lifting_failed = false;
        self.observer.on_reset();
    }

    fn rebuild(&mut self) {
        self.stats.rebuilds += 1;
        let order = self.settings.order;
        self.elimination_sets = self
            .variables
            .iter()
            .enumerate()
            .map(|(level, &var)| {
                let mut set = EliminationSet::new(level, var, order);
                set.set_lifting_order(order);
                set
            })
            .collect();
        self.generations = vec![0; self.variables.len()];
        self.reset_samples();
        self.scheduled.clear();
        let inputs = self.polynomials.clone();
        for p in &inputs {
            self.insert_input(p);
        }
    }

    /// The polynomials `p` contributes to the elimination.
    fn factors(&self, p: &Polynomial) -> Vec<Polynomial> {
        if p.is_constant() {
            return Vec::new();
        }
        let mut out: Vec<Polynomial> = if self.settings.simplify_by_factorization {
            p.square_free_factors()
                .into_iter()
                .map(|(f, _)| f.primitive())
                .filter(|f| !f.is_constant())
                .collect()
        } else {
            vec![p.square_free_part().primitive()]
        };
        out.dedup();
        out
    }

    fn insert_input(&mut self, p: &Polynomial) {
        for f in self.factors(p) {
            self.route(f, 0, Provenance::Input);
        }
    }

    /// Insert `poly` at the first level from `from` on whose variable it
    /// contains. Returns the handle if the polynomial is new there.
    fn route(&mut self, poly: Polynomial, from: usize, provenance: Provenance) -> Option<PolyId> {
        let vars = poly.vars();
        let n = self.variables.len();
        let target = (from..n).find(|&l| vars.contains(&self.variables[l]))?;
        if self.settings.simplify_by_rootcounting && target + 1 == n && !self.has_real_roots(&poly, target) {
            trace!(%poly, "dropped: no real roots");
            return None;
        }
        if !self.settings.remove_constants {
            for level in from..target {
                let (_, added) = self.elimination_sets[level].insert(poly.clone(), provenance, true);
                if added {
                    self.generations[level] += 1;
                }
            }
        }
        let (id, added) = self.elimination_sets[target].insert(poly, provenance, false);
        if !added {
            return None;
        }
        self.generations[target] += 1;
        if self.outside_deferral_box(id) {
            self.elimination_sets[target].defer(id);
        }
        Some(id)
    }

    fn has_real_roots(&self, poly: &Polynomial, level: usize) -> bool {
        match poly.to_univariate(self.variables[level]) {
            Some(u) => !real_roots(&u, &Interval::unbounded(), self.settings.splitting_strategy).is_empty(),
            None => true,
        }
    }
}
