//! CAD configuration.
//!
//! [`CadSettings`] is a plain typed configuration value consumed by the CAD
//! and its elimination and lifting steps. The [`Preset`] flags build common
//! configurations.

use crate::projection::ProjectionOperator;
use cadkit_math::SplittingStrategy;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Order in which elimination and lifting queues hand out polynomials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolynomialOrder {
    /// Smaller Cauchy root bound first.
    CauchyBound,
    /// Lower degree in the level variable first, then fewer terms.
    #[default]
    LowDegree,
    /// Insertion order.
    Memory,
}

impl fmt::Display for PolynomialOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolynomialOrder::CauchyBound => write!(f, "CauchyBound"),
            PolynomialOrder::LowDegree => write!(f, "LowDegree"),
            PolynomialOrder::Memory => write!(f, "Memory"),
        }
    }
}

/// Treatment of variables registered as integer valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntegerHandling {
    /// Integer variables are treated as reals.
    #[default]
    None,
    /// Reject full samples with a non-integral integer coordinate.
    SplitLazy,
    /// Prune non-integral coordinates as soon as they are assigned and
    /// prefer integral non-root samples.
    SplitEarly,
    /// Like `SplitEarly`, refining interval samples to integrality first.
    GuessAndSplit,
}

impl fmt::Display for IntegerHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegerHandling::None => write!(f, "None"),
            IntegerHandling::SplitLazy => write!(f, "SplitLazy"),
            IntegerHandling::SplitEarly => write!(f, "SplitEarly"),
            IntegerHandling::GuessAndSplit => write!(f, "GuessAndSplit"),
        }
    }
}

/// Preset flags for [`CadSettings::preset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Preset(u32);

impl Preset {
    /// No changes to the defaults.
    pub const GENERIC: Preset = Preset(0);
    /// Prefer rational samples.
    pub const RATIONALSAMPLE: Preset = Preset(1);
    /// Do not prefer rational samples.
    pub const IRRATIONALSAMPLE: Preset = Preset(1 << 1);
    /// Constraint sets consist of equations.
    pub const EQUATIONSONLY: Preset = Preset(1 << 2);
    /// Constraint sets consist of strict inequalities.
    pub const INEQUALITIESONLY: Preset = Preset(1 << 3);
    /// Detect equations per check.
    pub const EQUATIONDETECT: Preset = Preset(1 << 4);
    /// Equation systems are zero-dimensional.
    pub const ZERODIM: Preset = Preset(1 << 5);
    /// Low degree polynomial order.
    pub const ALTERNATIVEORDER: Preset = Preset(1 << 6);
    /// Checks come with bounds.
    pub const BOUNDED: Preset = Preset(1 << 7);
    /// Checks come without bounds.
    pub const NOTBOUNDED: Preset = Preset(1 << 8);
    /// The default preset.
    pub const DEFAULT: Preset = Preset::BOUNDED;

    /// The raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Check whether all flags of `other` are set.
    pub fn contains(self, other: Preset) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

impl BitOr for Preset {
    type Output = Preset;

    fn bitor(self, rhs: Preset) -> Preset {
        Preset(self.0 | rhs.0)
    }
}

impl BitOrAssign for Preset {
    fn bitor_assign(&mut self, rhs: Preset) {
        self.0 |= rhs.0;
    }
}

/// Configuration of the CAD engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CadSettings {
    /// Lift numeric samples before interval represented ones.
    pub prefer_nr_samples: bool,
    /// Order samples by their root flag, see `prefer_nonroot_samples`.
    pub prefer_samples_by_is_root: bool,
    /// With `prefer_samples_by_is_root`, lift non-roots first; roots first
    /// otherwise.
    pub prefer_nonroot_samples: bool,
    /// Drop last-level univariate polynomials without real roots.
    pub simplify_by_rootcounting: bool,
    /// Split elimination polynomials into their square-free factors.
    pub simplify_by_factorization: bool,
    /// Use only root samples where an equation decides a coordinate.
    pub equations_only: bool,
    /// Use only non-root samples when all constraints are strict.
    pub inequalities_only: bool,
    /// Drop constant polynomials during elimination.
    pub remove_constants: bool,
    /// Drop variables whose levels become empty after a removal.
    pub trim_variables: bool,
    /// Decide `equations_only`/`inequalities_only` per check.
    pub auto_separate_equations: bool,
    /// With `equations_only`, use only root samples at every level.
    pub zero_dim_equations: bool,
    /// Record a conflict graph during checks.
    pub compute_conflict_graph: bool,
    /// Number of deductions derived from an unsatisfiable check.
    pub number_of_deductions: usize,
    /// Reuse the sample trace of the previous satisfiable check.
    pub warm_restart: bool,
    /// Decide checks by interval evaluation over the bounds when possible.
    pub pre_solve_by_bounds: bool,
    /// Discard samples outside the bounds during lifting.
    pub early_lifting_pruning_by_bounds: bool,
    /// Park elimination polynomials without roots inside the bounds.
    pub simplify_elimination_by_bounds: bool,
    /// Shrink bounds after SAT and widen them after UNSAT.
    pub improve_bounds: bool,
    /// Queue order for elimination and lifting.
    pub order: PolynomialOrder,
    /// Root isolation strategy.
    pub splitting_strategy: SplittingStrategy,
    /// Projection operator.
    pub projection: ProjectionOperator,
    /// Treatment of integer variables.
    pub integer_handling: IntegerHandling,
}

impl Default for CadSettings {
    fn default() -> Self {
        Self {
            prefer_nr_samples: false,
            prefer_samples_by_is_root: false,
            prefer_nonroot_samples: false,
            simplify_by_rootcounting: false,
            simplify_by_factorization: true,
            equations_only: false,
            inequalities_only: false,
            remove_constants: true,
            trim_variables: false,
            auto_separate_equations: false,
            zero_dim_equations: false,
            compute_conflict_graph: true,
            number_of_deductions: 1,
            warm_restart: false,
            pre_solve_by_bounds: false,
            early_lifting_pruning_by_bounds: true,
            simplify_elimination_by_bounds: true,
            improve_bounds: true,
            order: PolynomialOrder::default(),
            splitting_strategy: SplittingStrategy::default(),
            projection: ProjectionOperator::default(),
            integer_handling: IntegerHandling::default(),
        }
    }
}

impl CadSettings {
    /// Default settings adjusted by `preset`.
    pub fn preset(preset: Preset, strategy: SplittingStrategy) -> Self {
        Self::default().with_preset(preset, strategy)
    }

    /// Apply `preset` on top of these settings.
    ///
    /// Flags are applied in the order `RATIONALSAMPLE`, `IRRATIONALSAMPLE`,
    /// `EQUATIONDETECT`, `BOUNDED`, `NOTBOUNDED`, `EQUATIONSONLY`,
    /// `INEQUALITIESONLY`, `ZERODIM`, `ALTERNATIVEORDER`; later flags win.
    pub fn with_preset(mut self, preset: Preset, strategy: SplittingStrategy) -> Self {
        self.splitting_strategy = strategy;
        if preset.contains(Preset::RATIONALSAMPLE) {
            self.auto_separate_equations = false;
            self.prefer_nr_samples = true;
            self.order = PolynomialOrder::CauchyBound;
        }
        if preset.contains(Preset::IRRATIONALSAMPLE) {
            self.auto_separate_equations = false;
            self.prefer_nr_samples = false;
            self.order = PolynomialOrder::CauchyBound;
        }
        if preset.contains(Preset::EQUATIONDETECT) {
            self.auto_separate_equations = true;
            self.order = PolynomialOrder::CauchyBound;
        }
        for (flag, bounded) in [(Preset::BOUNDED, true), (Preset::NOTBOUNDED, false)] {
            if preset.contains(flag) {
                self.auto_separate_equations = true;
                self.compute_conflict_graph = false;
                self.number_of_deductions = 0;
                self.early_lifting_pruning_by_bounds = bounded;
                self.improve_bounds = bounded;
                self.pre_solve_by_bounds = false;
                self.remove_constants = true;
                self.simplify_by_factorization = true;
                self.simplify_by_rootcounting = false;
                self.simplify_elimination_by_bounds = bounded;
                self.trim_variables = false;
                self.warm_restart = true;
                self.order = PolynomialOrder::CauchyBound;
            }
        }
        if preset.contains(Preset::EQUATIONSONLY) {
            self.auto_separate_equations = false;
            self.prefer_nr_samples = false;
            self.equations_only = true;
            self.inequalities_only = false;
            self.prefer_samples_by_is_root = true;
            self.prefer_nonroot_samples = false;
            self.order = PolynomialOrder::CauchyBound;
        }
        if preset.contains(Preset::INEQUALITIESONLY) {
            self.prefer_nr_samples = false;
            self.equations_only = false;
            self.inequalities_only = true;
            self.prefer_samples_by_is_root = true;
            self.prefer_nonroot_samples = true;
            self.order = PolynomialOrder::CauchyBound;
        }
        if preset.contains(Preset::ZERODIM) {
            self.zero_dim_equations = true;
        }
        if preset.contains(Preset::ALTERNATIVEORDER) {
            self.order = PolynomialOrder::LowDegree;
        }
        self
    }

    fn active_options(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.simplify_by_rootcounting {
            out.push("Drop last-level polynomials without real roots.");
        }
        if self.simplify_by_factorization {
            out.push("Split elimination polynomials into square-free factors.");
        }
        if self.prefer_nr_samples {
            out.push("Prefer numeric samples over interval represented ones.");
        }
        if self.prefer_samples_by_is_root {
            if self.prefer_nonroot_samples {
                out.push("Prefer non-root samples.");
            } else {
                out.push("Prefer root samples.");
            }
        }
        if self.equations_only {
            out.push("Use only root samples where an equation decides a coordinate.");
        }
        if self.inequalities_only {
            out.push("Use only non-root samples for strict constraint sets.");
        }
        if self.remove_constants {
            out.push("Remove constant polynomials during elimination.");
        }
        if self.trim_variables {
            out.push("Drop variables with empty elimination levels after removals.");
        }
        if self.auto_separate_equations {
            out.push("Detect equations and strict inequalities per check.");
        }
        if self.zero_dim_equations {
            out.push("Treat equation systems as zero-dimensional.");
        }
        if self.compute_conflict_graph {
            out.push("Compute a conflict graph during checks.");
        }
        if self.warm_restart {
            out.push("Reuse the sample trace of the previous check.");
        }
        if self.pre_solve_by_bounds {
            out.push("Solve by interval evaluation over the bounds when possible.");
        }
        if self.early_lifting_pruning_by_bounds {
            out.push("Discard samples outside the bounds during lifting.");
        }
        if self.simplify_elimination_by_bounds {
            out.push("Park elimination polynomials without roots in the bounds.");
        }
        if self.improve_bounds {
            out.push("Widen bounds after UNSAT and shrink them after SAT.");
        }
        out
    }
}

impl fmt::Display for CadSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+------------------------------------ CAD Setting -----------------------------------")?;
        for line in self.active_options() {
            writeln!(f, "| {}", line)?;
        }
        writeln!(f, "| Polynomial order: {}", self.order)?;
        writeln!(f, "| Splitting strategy: {}", self.splitting_strategy)?;
        writeln!(f, "| Projection: {}", self.projection)?;
        writeln!(f, "| Number of deductions: {}", self.number_of_deductions)?;
        writeln!(f, "| Integer handling: {}", self.integer_handling)?;
        write!(f, "+------------------------------------------------------------------------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = CadSettings::default();
        assert!(s.simplify_by_factorization);
        assert!(s.remove_constants);
        assert!(s.compute_conflict_graph);
        assert_eq!(s.number_of_deductions, 1);
        assert!(s.early_lifting_pruning_by_bounds);
        assert!(s.simplify_elimination_by_bounds);
        assert!(s.improve_bounds);
        assert!(!s.warm_restart);
        assert!(!s.equations_only);
        assert_eq!(s.order, PolynomialOrder::LowDegree);
        assert_eq!(s.projection, ProjectionOperator::McCallum);
    }

    #[test]
    fn test_bounded_presets() {
        let b = CadSettings::preset(Preset::DEFAULT, SplittingStrategy::Generic);
        assert!(b.warm_restart);
        assert!(!b.compute_conflict_graph);
        assert!(b.improve_bounds);
        assert!(b.auto_separate_equations);
        assert_eq!(b.splitting_strategy, SplittingStrategy::Generic);
        assert_eq!(b.order, PolynomialOrder::CauchyBound);

        let nb = CadSettings::preset(Preset::NOTBOUNDED, SplittingStrategy::default());
        assert!(!nb.improve_bounds);
        assert!(!nb.early_lifting_pruning_by_bounds);
        assert!(!nb.simplify_elimination_by_bounds);
    }

    #[test]
    fn test_preset_precedence() {
        // EQUATIONSONLY is applied after BOUNDED
        let s = CadSettings::preset(
            Preset::BOUNDED | Preset::EQUATIONSONLY | Preset::ALTERNATIVEORDER,
            SplittingStrategy::default(),
        );
        assert!(s.equations_only);
        assert!(!s.auto_separate_equations);
        assert!(s.prefer_samples_by_is_root);
        assert_eq!(s.order, PolynomialOrder::LowDegree);

        let g = CadSettings::preset(Preset::GENERIC, SplittingStrategy::default());
        assert_eq!(g, CadSettings::default());
        assert!(!Preset::GENERIC.contains(Preset::GENERIC));
    }

    #[test]
    fn test_display_box() {
        let text = CadSettings::default().to_string();
        assert!(text.contains("CAD Setting"));
        assert!(text.contains("Polynomial order: LowDegree"));
        assert!(text.contains("conflict graph"));
    }
}
