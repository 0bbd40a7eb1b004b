//! Incremental real root isolation.
//!
//! The finder keeps a work queue of open intervals ordered by width
//! (smallest first). Each step pops an interval, splits it with the
//! interval's splitting strategy and sorts the pieces by their Sturm root
//! count: pieces without roots are dropped, pieces with one root become
//! isolating intervals and pieces with several roots are queued again.
//! Split points that are roots themselves are reported as exact rationals.
//!
//! ## Algorithms
//!
//! - **Sturm counting** certifies every reported root
//! - **Bisection** at the midpoint, the simplest rational or a Newton step
//! - **Grid** splitting into `deg + 1` parts
//! - **Eigenvalues / Aberth** floating point approximations of all roots,
//!   used to place split points between neighbouring roots
//!
//! ## References
//!
//! - CArL's `RootFinder` and `SplittingStrategies`

mod strategy;

use crate::algebraic::RealAlgebraicNumber;
use crate::interval::{BoundType, Interval};
use crate::sign::Sign;
use crate::univariate::{count_roots, UnivariatePolynomial};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// How the root finder splits an interval with several roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplittingStrategy {
    /// Bisect at the midpoint.
    Generic,
    /// Bisect at the simplest rational in the middle half.
    BinarySample,
    /// Bisect at a Newton step from the midpoint.
    BinaryNewton,
    /// Split into `deg + 1` equal parts.
    Grid,
    /// Split between eigenvalues of the companion matrix.
    #[default]
    Eigenvalues,
    /// Split between Aberth approximations.
    Aberth,
}

impl fmt::Display for SplittingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplittingStrategy::Generic => "Generic",
            SplittingStrategy::BinarySample => "BinarySample",
            SplittingStrategy::BinaryNewton => "BinaryNewton",
            SplittingStrategy::Grid => "Grid",
            SplittingStrategy::Eigenvalues => "Eigenvalues",
            SplittingStrategy::Aberth => "Aberth",
        };
        write!(f, "{}", name)
    }
}

/// Configuration for root finding.
#[derive(Debug, Clone)]
pub struct RootFinderConfig {
    /// Splitting strategy for the initial interval.
    pub strategy: SplittingStrategy,
    /// Solve polynomials of degree at most two in closed form.
    pub try_trivial_solver: bool,
}

impl Default for RootFinderConfig {
    fn default() -> Self {
        Self {
            strategy: SplittingStrategy::default(),
            try_trivial_solver: true,
        }
    }
}

/// Statistics for root finding.
#[derive(Debug, Clone, Default)]
pub struct RootFinderStats {
    /// Queue items processed.
    pub intervals_processed: u64,
    /// Intervals split into pieces.
    pub splits: u64,
    /// Polynomials solved in closed form.
    pub trivial_solves: u64,
    /// Roots reported.
    pub roots_found: u64,
}

#[derive(Debug, Clone)]
struct QueueItem {
    lower: BigRational,
    upper: BigRational,
    strategy: SplittingStrategy,
}

impl QueueItem {
    fn width(&self) -> BigRational {
        &self.upper - &self.lower
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; the narrowest interval comes first.
        other
            .width()
            .cmp(&self.width())
            .then_with(|| other.lower.cmp(&self.lower))
    }
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lazily isolates the real roots of a univariate polynomial in an interval.
pub struct IncrementalRootFinder {
    poly: Arc<UnivariatePolynomial>,
    sturm: Arc<Vec<UnivariatePolynomial>>,
    queue: BinaryHeap<QueueItem>,
    pending: Vec<RealAlgebraicNumber>,
    config: RootFinderConfig,
    stats: RootFinderStats,
}

impl IncrementalRootFinder {
    /// Prepare root isolation of `poly` inside `interval`.
    pub fn new(poly: &UnivariatePolynomial, interval: &Interval, config: RootFinderConfig) -> Self {
        let mut finder = Self {
            poly: Arc::new(UnivariatePolynomial::zero(poly.var())),
            sturm: Arc::new(Vec::new()),
            queue: BinaryHeap::new(),
            pending: Vec::new(),
            config,
            stats: RootFinderStats::default(),
        };
        if poly.is_zero() || interval.is_empty() {
            return finder;
        }

        let mut p = poly.square_free_part();
        let zero = BigRational::zero();
        if p.eval(&zero).is_zero() {
            if interval.contains(&zero) {
                finder.add_root(RealAlgebraicNumber::from_rational(zero, true));
            }
            p = p.strip_zero_root().1;
        }
        if p.is_constant() {
            return finder;
        }
        if finder.config.try_trivial_solver && p.degree() <= 2 {
            finder.stats.trivial_solves += 1;
            finder.solve_trivial(&p, interval);
            return finder;
        }

        let bound = p.cauchy_bound();
        let search = interval.intersect(&Interval::open(-bound.clone(), bound));
        if search.is_empty() {
            return finder;
        }
        let (Some(lower), Some(upper)) = (search.lower().cloned(), search.upper().cloned()) else {
            return finder;
        };
        if search.lower_type() == BoundType::Weak && p.sign_at(&lower).is_zero() {
            finder.add_root(RealAlgebraicNumber::from_rational(lower.clone(), true));
        }
        if lower < upper && search.upper_type() == BoundType::Weak && p.sign_at(&upper).is_zero() {
            finder.add_root(RealAlgebraicNumber::from_rational(upper.clone(), true));
        }
        finder.sturm = Arc::new(p.sturm_sequence());
        finder.poly = Arc::new(p);
        if lower < upper {
            let strategy = finder.config.strategy;
            finder.classify(lower, upper, strategy);
        }
        finder
    }

    /// Create with default configuration.
    pub fn with_strategy(poly: &UnivariatePolynomial, interval: &Interval, strategy: SplittingStrategy) -> Self {
        Self::new(
            poly,
            interval,
            RootFinderConfig {
                strategy,
                ..RootFinderConfig::default()
            },
        )
    }

    fn add_root(&mut self, root: RealAlgebraicNumber) {
        self.stats.roots_found += 1;
        trace!(%root, "root isolated");
        self.pending.push(root);
    }

    /// Closed-form roots of a square-free polynomial of degree one or two.
    fn solve_trivial(&mut self, p: &UnivariatePolynomial, interval: &Interval) {
        let c = p.coeffs();
        if p.degree() == 1 {
            let root = -&c[0] / &c[1];
            if interval.contains(&root) {
                self.add_root(RealAlgebraicNumber::from_rational(root, true));
            }
            return;
        }
        let (a, b, c0) = (&c[2], &c[1], &c[0]);
        let four = BigRational::from_integer(BigInt::from(4));
        let two = BigRational::from_integer(BigInt::from(2));
        let disc = b * b - &four * a * c0;
        if !disc.is_positive() {
            return;
        }
        if let Some(sqrt) = rational_sqrt(&disc) {
            let mut roots = vec![(-b - &sqrt) / (&two * a), (-b + &sqrt) / (&two * a)];
            roots.sort();
            for r in roots.into_iter().filter(|r| interval.contains(r)) {
                self.add_root(RealAlgebraicNumber::from_rational(r, true));
            }
            return;
        }
        // The vertex separates the two irrational roots.
        let vertex = -b / (&two * a);
        let bound = p.cauchy_bound();
        let sides = [
            Interval::open(-bound.clone(), vertex.clone()),
            Interval::open(vertex, bound),
        ];
        let sturm = p.sturm_sequence();
        for side in sides {
            let piece = side.intersect(interval);
            if piece.is_empty() || count_roots(&sturm, &piece) != 1 {
                continue;
            }
            if let Ok(root) = RealAlgebraicNumber::from_interval(p, &piece, true) {
                self.add_root(root);
            }
        }
    }

    /// Count roots in `(lower, upper)` and act on the count.
    fn classify(&mut self, lower: BigRational, upper: BigRational, strategy: SplittingStrategy) {
        let roots = count_roots(&self.sturm, &Interval::open(lower.clone(), upper.clone()));
        match roots {
            0 => {}
            1 => {
                let root = RealAlgebraicNumber::from_isolating(
                    Arc::clone(&self.poly),
                    Arc::clone(&self.sturm),
                    lower,
                    upper,
                    true,
                );
                self.add_root(root);
            }
            _ => self.queue.push(QueueItem {
                lower,
                upper,
                strategy,
            }),
        }
    }

    /// Split the narrowest queued interval. Returns false if the queue is
    /// empty.
    pub fn process_queue_item(&mut self) -> bool {
        let Some(item) = self.queue.pop() else {
            return false;
        };
        self.stats.intervals_processed += 1;
        self.stats.splits += 1;

        let mut points = strategy::split_points(item.strategy, &self.poly, &item.lower, &item.upper);
        points.retain(|m| m > &item.lower && m < &item.upper);
        points.sort();
        points.dedup();
        if points.is_empty() {
            points.push(Interval::open(item.lower.clone(), item.upper.clone()).sample());
        }
        let next = item.strategy.successor();

        let mut lower = item.lower;
        for m in points {
            self.classify(lower, m.clone(), next);
            if self.poly.sign_at(&m) == Sign::Zero {
                self.add_root(RealAlgebraicNumber::from_rational(m.clone(), true));
            }
            lower = m;
        }
        self.classify(lower, item.upper, next);
        true
    }

    /// Check whether every root has been isolated.
    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Isolate all remaining roots and return every root not yet yielded,
    /// sorted ascending.
    pub fn all_roots(mut self) -> Vec<RealAlgebraicNumber> {
        while self.process_queue_item() {}
        let mut roots = std::mem::take(&mut self.pending);
        roots.sort();
        debug!(
            degree = self.poly.degree(),
            roots = roots.len(),
            processed = self.stats.intervals_processed,
            "root isolation finished"
        );
        roots
    }

    /// Get statistics.
    pub fn stats(&self) -> &RootFinderStats {
        &self.stats
    }
}

impl Iterator for IncrementalRootFinder {
    type Item = RealAlgebraicNumber;

    fn next(&mut self) -> Option<RealAlgebraicNumber> {
        while self.pending.is_empty() {
            if !self.process_queue_item() {
                return None;
            }
        }
        self.pending.pop()
    }
}

impl SplittingStrategy {
    /// Strategy used for the pieces of an interval split with `self`.
    fn successor(self) -> SplittingStrategy {
        match self {
            SplittingStrategy::Eigenvalues | SplittingStrategy::Aberth => {
                SplittingStrategy::BinarySample
            }
            other => other,
        }
    }
}

/// Exact square root of a non-negative rational, if it is rational.
fn rational_sqrt(value: &BigRational) -> Option<BigRational> {
    if value.is_negative() {
        return None;
    }
    let n = value.numer().sqrt();
    let d = value.denom().sqrt();
    (&n * &n == *value.numer() && &d * &d == *value.denom()).then(|| BigRational::new(n, d))
}

/// All real roots of `poly` inside `interval`, sorted ascending and marked
/// as roots.
pub fn real_roots(
    poly: &UnivariatePolynomial,
    interval: &Interval,
    strategy: SplittingStrategy,
) -> Vec<RealAlgebraicNumber> {
    IncrementalRootFinder::with_strategy(poly, interval, strategy).all_roots()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn upoly(coeffs: &[i64]) -> UnivariatePolynomial {
        UnivariatePolynomial::new(0, coeffs.iter().map(|&c| rat(c)).collect())
    }

    /// (x - 1)(x - 2)(x - 3)(x + 4)(x^2 - 2)
    fn sextic() -> UnivariatePolynomial {
        let mut p = upoly(&[1]);
        for f in [upoly(&[-1, 1]), upoly(&[-2, 1]), upoly(&[-3, 1]), upoly(&[4, 1]), upoly(&[-2, 0, 1])] {
            p = p.mul(&f);
        }
        p
    }

    #[test]
    fn test_linear_and_quadratic() {
        let roots = real_roots(&upoly(&[-3, 2]), &Interval::unbounded(), SplittingStrategy::default());
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].value(), Some(BigRational::new(3.into(), 2.into())));

        let roots = real_roots(&upoly(&[-2, 0, 1]), &Interval::unbounded(), SplittingStrategy::default());
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].sgn(), Sign::Negative);
        assert_eq!(roots[1].sgn(), Sign::Positive);
        assert!(roots.iter().all(|r| r.is_root() && !r.is_numeric()));

        let roots = real_roots(&upoly(&[-4, 0, 1]), &Interval::unbounded(), SplittingStrategy::default());
        assert_eq!(roots.iter().filter_map(|r| r.value()).collect::<Vec<_>>(), vec![rat(-2), rat(2)]);
    }

    #[test]
    fn test_no_real_roots() {
        assert!(real_roots(&upoly(&[1, 0, 1]), &Interval::unbounded(), SplittingStrategy::default()).is_empty());
        assert!(real_roots(&upoly(&[5]), &Interval::unbounded(), SplittingStrategy::default()).is_empty());
    }

    #[test]
    fn test_zero_root() {
        // x^3 - x
        let roots = real_roots(&upoly(&[0, -1, 0, 1]), &Interval::unbounded(), SplittingStrategy::Generic);
        let values: Vec<_> = roots.iter().filter_map(|r| r.value()).collect();
        assert_eq!(values, vec![rat(-1), rat(0), rat(1)]);
    }

    #[test]
    fn test_all_strategies_agree() {
        let p = sextic();
        for strategy in [
            SplittingStrategy::Generic,
            SplittingStrategy::BinarySample,
            SplittingStrategy::BinaryNewton,
            SplittingStrategy::Grid,
            SplittingStrategy::Eigenvalues,
            SplittingStrategy::Aberth,
        ] {
            let roots = real_roots(&p, &Interval::unbounded(), strategy);
            assert_eq!(roots.len(), 6, "strategy {}", strategy);
            for w in roots.windows(2) {
                assert!(w[0] < w[1]);
            }
            for r in &roots {
                assert_eq!(r.sgn_of(&p), Sign::Zero);
            }
        }
    }

    #[test]
    fn test_bounded_search() {
        let p = sextic();
        let roots = real_roots(&p, &Interval::open(rat(0), rat(3)), SplittingStrategy::default());
        // 1, sqrt 2 and 2; the root 3 is excluded by the strict bound
        assert_eq!(roots.len(), 3);
        let roots = real_roots(&p, &Interval::closed(rat(2), rat(3)), SplittingStrategy::default());
        let values: Vec<_> = roots.iter().filter_map(|r| r.value()).collect();
        assert_eq!(values, vec![rat(2), rat(3)]);
    }

    #[test]
    fn test_incremental_iteration() {
        let p = sextic();
        let mut finder = IncrementalRootFinder::with_strategy(&p, &Interval::unbounded(), SplittingStrategy::Grid);
        let first = finder.next();
        assert!(first.is_some());
        let rest: Vec<_> = finder.collect();
        assert_eq!(rest.len(), 5);
    }

    #[test]
    fn test_square_free_input() {
        // (x - 1)^3 (x + 1)^2
        let p = upoly(&[-1, 1]).mul(&upoly(&[-1, 1])).mul(&upoly(&[-1, 1])).mul(&upoly(&[1, 1])).mul(&upoly(&[1, 1]));
        let roots = real_roots(&p, &Interval::unbounded(), SplittingStrategy::default());
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(SplittingStrategy::default().to_string(), "Eigenvalues");
        assert_eq!(SplittingStrategy::BinaryNewton.to_string(), "BinaryNewton");
    }

    #[test]
    fn test_queue_order_ignores_strategy() {
        let item = |strategy| QueueItem {
            lower: rat(0),
            upper: rat(2),
            strategy,
        };
        let a = item(SplittingStrategy::Grid);
        let b = item(SplittingStrategy::Aberth);
        assert_eq!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a, b);

        let narrow = QueueItem {
            lower: rat(0),
            upper: rat(1),
            strategy: SplittingStrategy::Grid,
        };
        assert!(narrow > a);
        assert_ne!(narrow, a);
    }
}
