//! Ordered candidate samples with preference queues.
//!
//! A [`SampleSet`] keeps real algebraic samples sorted and deduplicated,
//! each with a payload (the sample tree node it stands for). Besides the
//! plain insertion order it maintains queues of numeric, interval
//! represented, root and non-root samples, so lifting can prefer cheap or
//! promising samples without rescanning.

use cadkit_math::RealAlgebraicNumber;
use num_rational::BigRational;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::fmt;

/// Stable handle of a sample inside its set.
pub type SampleId = usize;

#[derive(Debug, Clone)]
struct Item<T> {
    value: RealAlgebraicNumber,
    payload: T,
}

/// Sorted, deduplicated samples with classification queues.
#[derive(Debug, Clone)]
pub struct SampleSet<T = ()> {
    items: Vec<Option<Item<T>>>,
    sorted: Vec<SampleId>,
    queue: VecDeque<SampleId>,
    nr_queue: VecDeque<SampleId>,
    ir_queue: VecDeque<SampleId>,
    root_queue: VecDeque<SampleId>,
    nonroot_queue: VecDeque<SampleId>,
    /// Every numeric value held so far, removed ones included; sorted.
    seen: Vec<BigRational>,
}

impl<T> Default for SampleSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            sorted: Vec::new(),
            queue: VecDeque::new(),
            nr_queue: VecDeque::new(),
            ir_queue: VecDeque::new(),
            root_queue: VecDeque::new(),
            nonroot_queue: VecDeque::new(),
            seen: Vec::new(),
        }
    }
}

fn record(seen: &mut Vec<BigRational>, value: BigRational) {
    if let Err(pos) = seen.binary_search(&value) {
        seen.insert(pos, value);
    }
}

fn remove_from(queue: &mut VecDeque<SampleId>, id: SampleId) {
    if let Some(pos) = queue.iter().position(|&s| s == id) {
        queue.remove(pos);
    }
}

impl<T> SampleSet<T> {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// The sample behind `id`.
    pub fn get(&self, id: SampleId) -> Option<&RealAlgebraicNumber> {
        self.items.get(id).and_then(Option::as_ref).map(|i| &i.value)
    }

    /// The payload of `id`.
    pub fn payload(&self, id: SampleId) -> Option<&T> {
        self.items.get(id).and_then(Option::as_ref).map(|i| &i.payload)
    }

    /// Samples in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (SampleId, &RealAlgebraicNumber)> {
        self.sorted.iter().filter_map(move |&id| self.get(id).map(|v| (id, v)))
    }

    fn position(&self, value: &RealAlgebraicNumber) -> Result<usize, usize> {
        self.sorted.binary_search_by(|&id| match self.get(id) {
            Some(v) => v.cmp(value),
            None => std::cmp::Ordering::Less,
        })
    }

    /// Check whether a sample equal to `value` is present.
    pub fn contains(&self, value: &RealAlgebraicNumber) -> bool {
        self.position(value).is_ok()
    }

    /// The handle of the sample equal to `value`.
    pub fn find(&self, value: &RealAlgebraicNumber) -> Option<SampleId> {
        self.position(value).ok().map(|pos| self.sorted[pos])
    }

    /// Insert a sample.
    ///
    /// Returns the handle and whether the sample is new. An equal sample
    /// keeps its payload; it becomes a root if `value` is one.
    pub fn insert(&mut self, value: RealAlgebraicNumber, payload: T) -> (SampleId, bool) {
        match self.position(&value) {
            Ok(pos) => {
                let id = self.sorted[pos];
                if value.is_root() {
                    self.mark_root(id);
                }
                (id, false)
            }
            Err(pos) => {
                let id = self.items.len();
                if let Some(v) = value.value() {
                    record(&mut self.seen, v);
                    self.nr_queue.push_back(id);
                } else {
                    self.ir_queue.push_back(id);
                }
                if value.is_root() {
                    self.root_queue.push_back(id);
                } else {
                    self.nonroot_queue.push_back(id);
                }
                self.queue.push_back(id);
                self.items.push(Some(Item { value, payload }));
                self.sorted.insert(pos, id);
                (id, true)
            }
        }
    }

    /// Set the root flag of `id`.
    pub fn mark_root(&mut self, id: SampleId) {
        if let Some(Some(item)) = self.items.get_mut(id) {
            if !item.value.is_root() {
                item.value.set_is_root(true);
                remove_from(&mut self.nonroot_queue, id);
                self.root_queue.push_back(id);
            }
        }
    }

    /// Remove a sample; returns its value and payload.
    pub fn remove(&mut self, id: SampleId) -> Option<(RealAlgebraicNumber, T)> {
        let item = self.items.get_mut(id)?.take()?;
        self.sorted.retain(|&s| s != id);
        for queue in [
            &mut self.queue,
            &mut self.nr_queue,
            &mut self.ir_queue,
            &mut self.root_queue,
            &mut self.nonroot_queue,
        ] {
            remove_from(queue, id);
        }
        Some((item.value, item.payload))
    }

    /// The oldest sample.
    pub fn next(&self) -> Option<SampleId> {
        self.queue.front().copied()
    }

    /// The oldest numeric sample, or the oldest sample if none is numeric.
    pub fn next_nr(&self) -> Option<SampleId> {
        self.nr_queue.front().copied().or_else(|| self.next())
    }

    /// The oldest non-root sample, or the oldest sample.
    pub fn next_non_root(&self) -> Option<SampleId> {
        self.nonroot_queue.front().copied().or_else(|| self.next())
    }

    /// The oldest root sample, or the oldest sample.
    pub fn next_root(&self) -> Option<SampleId> {
        self.root_queue.front().copied().or_else(|| self.next())
    }

    /// Remove the sample returned by [`Self::next`].
    pub fn pop(&mut self) -> Option<(RealAlgebraicNumber, T)> {
        self.next().and_then(|id| self.remove(id))
    }

    /// Remove the sample returned by [`Self::next_nr`].
    pub fn pop_nr(&mut self) -> Option<(RealAlgebraicNumber, T)> {
        self.next_nr().and_then(|id| self.remove(id))
    }

    /// Remove the sample returned by [`Self::next_non_root`].
    pub fn pop_non_root(&mut self) -> Option<(RealAlgebraicNumber, T)> {
        self.next_non_root().and_then(|id| self.remove(id))
    }

    /// Remove the sample returned by [`Self::next_root`].
    pub fn pop_root(&mut self) -> Option<(RealAlgebraicNumber, T)> {
        self.next_root().and_then(|id| self.remove(id))
    }

    /// Check whether no numeric sample is left.
    pub fn empty_nr(&self) -> bool {
        self.nr_queue.is_empty()
    }

    /// Check whether no interval represented sample is left.
    pub fn empty_ir(&self) -> bool {
        self.ir_queue.is_empty()
    }

    /// Check whether no root sample is left.
    pub fn empty_root(&self) -> bool {
        self.root_queue.is_empty()
    }

    /// Check whether no non-root sample is left.
    pub fn empty_non_root(&self) -> bool {
        self.nonroot_queue.is_empty()
    }

    /// Move interval represented samples whose value can be shown to be
    /// rational to the numeric queue. Each one is tested with
    /// `refine_avoiding` against the numeric values this set has held
    /// (removed ones included) and the simplest rational of its isolating
    /// interval; failed tests still shrink the interval. Returns the moved
    /// samples with their values.
    pub fn simplify(&mut self) -> FxHashMap<SampleId, BigRational> {
        let mut moved = FxHashMap::default();
        let candidates: Vec<SampleId> = self.ir_queue.iter().copied().collect();
        for id in candidates {
            let Some(value) = self.get(id) else {
                continue;
            };
            if !value.is_numeric() {
                let interval = value.interval();
                let hit = self
                    .seen
                    .iter()
                    .filter(|v| interval.contains(v))
                    .any(|v| value.refine_avoiding(v));
                if !hit {
                    value.refine_avoiding(&interval.sample());
                }
            }
            let Some(v) = value.value() else {
                continue;
            };
            remove_from(&mut self.ir_queue, id);
            self.nr_queue.push_back(id);
            record(&mut self.seen, v.clone());
            moved.insert(id, v);
        }
        moved
    }
}

impl<T> fmt::Display for SampleSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (_, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadkit_math::{Interval, Polynomial};
    use num_bigint::BigInt;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn nr(n: i64, root: bool) -> RealAlgebraicNumber {
        RealAlgebraicNumber::from_rational(rat(n), root)
    }

    fn sqrt2(root: bool) -> RealAlgebraicNumber {
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-2, &[])]);
        RealAlgebraicNumber::from_polynomial(&p, 0, &Interval::open(rat(1), rat(2)), root).unwrap()
    }

    #[test]
    fn test_sorted_dedup() {
        let mut set = SampleSet::new();
        set.insert(nr(3, false), ());
        set.insert(sqrt2(true), ());
        set.insert(nr(0, false), ());
        let (_, added) = set.insert(nr(3, false), ());
        assert!(!added);
        assert_eq!(set.len(), 3);
        let values: Vec<String> = set.iter().map(|(_, v)| v.to_string()).collect();
        assert_eq!(values[0], nr(0, false).to_string());
        assert_eq!(values[2], nr(3, false).to_string());
        assert!(set.contains(&sqrt2(false)));
    }

    #[test]
    fn test_preference_queues() {
        let mut set = SampleSet::new();
        let (a, _) = set.insert(sqrt2(true), 'a');
        let (b, _) = set.insert(nr(5, false), 'b');
        let (c, _) = set.insert(nr(7, true), 'c');
        assert_eq!(set.next(), Some(a));
        assert_eq!(set.next_nr(), Some(b));
        assert_eq!(set.next_non_root(), Some(b));
        assert_eq!(set.next_root(), Some(a));
        assert_eq!(set.pop_non_root().map(|(_, p)| p), Some('b'));
        assert!(set.empty_non_root());
        // no non-root left: fall back to insertion order
        assert_eq!(set.next_non_root(), Some(a));
        assert_eq!(set.pop_nr().map(|(_, p)| p), Some('c'));
        assert_eq!(set.payload(c), None);
        assert!(set.empty_nr());
        assert_eq!(set.payload(a), Some(&'a'));
        assert_eq!(set.len(), 1);
        assert!(set.pop().is_some());
        assert!(set.is_empty());
        assert_eq!(set.next(), None);
    }

    #[test]
    fn test_root_merge() {
        let mut set = SampleSet::new();
        let (id, _) = set.insert(nr(1, false), ());
        assert!(set.empty_root());
        let (again, added) = set.insert(nr(1, true), ());
        assert!(!added);
        assert_eq!(id, again);
        assert!(set.get(id).is_some_and(|v| v.is_root()));
        assert!(set.empty_non_root());
        assert_eq!(set.next_root(), Some(id));
    }

    #[test]
    fn test_simplify_moves_rational_roots() {
        // (x - 1)(x^2 - 3) has the rational root 1 isolated by (0, 3/2)
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 3)]), (-1, &[(0, 2)]), (-3, &[(0, 1)]), (3, &[])]);
        let one = RealAlgebraicNumber::from_polynomial(
            &p,
            0,
            &Interval::open(rat(0), BigRational::new(3.into(), 2.into())),
            true,
        )
        .unwrap();
        let mut set = SampleSet::new();
        set.insert(nr(-5, false), ());
        let (id, _) = set.insert(one, ());
        assert!(!set.empty_ir());
        // 1 is the simplest rational of (0, 3/2)
        let moved = set.simplify();
        assert_eq!(moved.get(&id), Some(&rat(1)));
        assert!(set.empty_ir());
        assert!(set.simplify().is_empty());
    }

    #[test]
    fn test_simplify_uses_removed_numeric_samples() {
        let five_quarters = BigRational::new(5.into(), 4.into());
        let mut set = SampleSet::new();
        set.insert(RealAlgebraicNumber::from_rational(five_quarters.clone(), false), ());
        assert!(set.pop().is_some());

        // (4x - 5)(x^2 - 3) with 5/4 isolated by (1, 3/2); the simplest
        // rational there is 4/3
        let p = Polynomial::from_coeffs_int(&[(4, &[(0, 3)]), (-5, &[(0, 2)]), (-12, &[(0, 1)]), (15, &[])]);
        let root = RealAlgebraicNumber::from_polynomial(
            &p,
            0,
            &Interval::open(rat(1), BigRational::new(3.into(), 2.into())),
            true,
        )
        .unwrap();
        assert!(!root.is_numeric());
        let (id, _) = set.insert(root, ());
        let moved = set.simplify();
        assert_eq!(moved.get(&id), Some(&five_quarters));
        assert!(set.empty_ir());
    }

    #[test]
    fn test_simplify_keeps_irrational_samples() {
        let mut set = SampleSet::new();
        let (id, _) = set.insert(sqrt2(false), ());
        assert!(set.simplify().is_empty());
        assert!(!set.empty_ir());
        assert!(set.get(id).is_some_and(|v| v.refinement_count() > 0));
    }
}
