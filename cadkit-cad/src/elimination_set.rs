//! Polynomials of one elimination level.
//!
//! An [`EliminationSet`] is an arena of deduplicated polynomials. Every
//! entry carries the set of ways it was produced ([`Provenance`]): as input,
//! from the single projection of one parent, or from the paired projection
//! of two parents. Removing a parent drops the matching provenances from the
//! next levels, and an entry disappears once no provenance is left.
//!
//! Three work queues reference the entries: the single and paired
//! elimination queues, and the lifting queue with its reset snapshot.

use crate::settings::PolynomialOrder;
use cadkit_math::{Polynomial, Var};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Handle of a polynomial in an elimination set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolyId {
    level: usize,
    slot: usize,
}

impl PolyId {
    /// The handle of slot `slot` at level `level`.
    pub fn new(level: usize, slot: usize) -> Self {
        Self { level, slot }
    }

    /// The elimination level.
    pub fn level(self) -> usize {
        self.level
    }

    /// The slot inside the level.
    pub fn slot(self) -> usize {
        self.slot
    }
}

impl fmt::Display for PolyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}.{}", self.level, self.slot)
    }
}

/// How a polynomial entered an elimination set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provenance {
    /// Added by the user.
    Input,
    /// Single projection of a parent.
    Single(PolyId),
    /// Paired projection of two parents, smaller id first.
    Pair(PolyId, PolyId),
}

impl Provenance {
    /// Paired provenance with normalized parent order.
    pub fn pair(a: PolyId, b: PolyId) -> Self {
        if a <= b {
            Provenance::Pair(a, b)
        } else {
            Provenance::Pair(b, a)
        }
    }

    /// Check whether `id` is a parent.
    pub fn mentions(&self, id: PolyId) -> bool {
        match *self {
            Provenance::Input => false,
            Provenance::Single(p) => p == id,
            Provenance::Pair(a, b) => a == id || b == id,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    poly: Arc<Polynomial>,
    provenance: BTreeSet<Provenance>,
    degree: u32,
    total_degree: u32,
    terms: usize,
    cauchy: BigRational,
}

impl Entry {
    fn new(poly: Arc<Polynomial>, var: Var) -> Self {
        Self {
            degree: poly.degree(var),
            total_degree: poly.total_degree(),
            terms: poly.num_terms(),
            cauchy: cauchy_estimate(&poly, var),
            poly,
            provenance: BTreeSet::new(),
        }
    }
}

/// `1 + max |c| / min |l|` over the numeric coefficients `c` of the lower
/// terms and `l` of the top terms in `var`.
fn cauchy_estimate(p: &Polynomial, var: Var) -> BigRational {
    let deg = p.degree(var);
    let mut lead: Option<BigRational> = None;
    let mut rest = BigRational::zero();
    for t in p.terms() {
        let c = t.coeff.abs();
        if t.monomial.degree(var) == deg {
            lead = Some(match lead {
                Some(l) if l <= c => l,
                _ => c,
            });
        } else if c > rest {
            rest = c;
        }
    }
    match lead {
        Some(l) if !l.is_zero() => BigRational::one() + rest / l,
        _ => BigRational::one(),
    }
}

/// The polynomials of one elimination level with their work queues.
#[derive(Debug, Clone)]
pub struct EliminationSet {
    level: usize,
    var: Var,
    entries: Vec<Option<Entry>>,
    index: FxHashMap<Arc<Polynomial>, usize>,
    single_queue: Vec<usize>,
    paired_queue: Vec<usize>,
    paired_done: Vec<usize>,
    lifting_queue: Vec<usize>,
    lifting_reset: Vec<usize>,
    deferred: FxHashSet<usize>,
    elimination_order: PolynomialOrder,
    lifting_order: PolynomialOrder,
}

impl EliminationSet {
    /// An empty set for level `level` with main variable `var`.
    pub fn new(level: usize, var: Var, order: PolynomialOrder) -> Self {
        Self {
            level,
            var,
            entries: Vec::new(),
            index: FxHashMap::default(),
            single_queue: Vec::new(),
            paired_queue: Vec::new(),
            paired_done: Vec::new(),
            lifting_queue: Vec::new(),
            lifting_reset: Vec::new(),
            deferred: FxHashSet::default(),
            elimination_order: order,
            lifting_order: order,
        }
    }

    /// The level of this set.
    pub fn level(&self) -> usize {
        self.level
    }

    /// The main variable of this level.
    pub fn var(&self) -> Var {
        self.var
    }

    /// Number of polynomials.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check whether the set holds no polynomial.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn id(&self, slot: usize) -> PolyId {
        PolyId::new(self.level, slot)
    }

    fn entry(&self, id: PolyId) -> Option<&Entry> {
        if id.level != self.level {
            return None;
        }
        self.entries.get(id.slot).and_then(Option::as_ref)
    }

    /// The polynomial behind `id`.
    pub fn get(&self, id: PolyId) -> Option<&Arc<Polynomial>> {
        self.entry(id).map(|e| &e.poly)
    }

    /// The provenances of `id`.
    pub fn provenance(&self, id: PolyId) -> Option<&BTreeSet<Provenance>> {
        self.entry(id).map(|e| &e.provenance)
    }

    /// The handle of `poly`, if present.
    pub fn find(&self, poly: &Polynomial) -> Option<PolyId> {
        self.index.get(poly).map(|&slot| self.id(slot))
    }

    /// All polynomials in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PolyId, &Arc<Polynomial>)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(move |(slot, e)| e.as_ref().map(|e| (self.id(slot), &e.poly)))
    }

    /// Insert `poly` with `provenance`.
    ///
    /// Returns the handle and whether the polynomial is new. A new
    /// polynomial enters the paired and lifting queues, and the single
    /// queue unless `avoid_single` is set. Known polynomials only gain the
    /// provenance.
    pub fn insert(&mut self, poly: Polynomial, provenance: Provenance, avoid_single: bool) -> (PolyId, bool) {
        if let Some(&slot) = self.index.get(&poly) {
            if let Some(Some(e)) = self.entries.get_mut(slot) {
                e.provenance.insert(provenance);
            }
            return (self.id(slot), false);
        }
        let slot = self.entries.len();
        let poly = Arc::new(poly);
        let mut entry = Entry::new(Arc::clone(&poly), self.var);
        entry.provenance.insert(provenance);
        self.entries.push(Some(entry));
        self.index.insert(poly, slot);
        if !avoid_single {
            self.single_queue.push(slot);
        }
        self.paired_queue.push(slot);
        self.lifting_queue.push(slot);
        self.lifting_reset.push(slot);
        (self.id(slot), true)
    }

    /// Insert several polynomials with a shared provenance; returns the
    /// handles of those that were new.
    pub fn insert_all(
        &mut self,
        polys: impl IntoIterator<Item = Polynomial>,
        provenance: Provenance,
        avoid_single: bool,
    ) -> Vec<PolyId> {
        polys
            .into_iter()
            .filter_map(|p| {
                let (id, added) = self.insert(p, provenance, avoid_single);
                added.then_some(id)
            })
            .collect()
    }

    /// Remove `id` from the set and all queues.
    pub fn erase(&mut self, id: PolyId) -> Option<Arc<Polynomial>> {
        if id.level != self.level {
            return None;
        }
        let entry = self.entries.get_mut(id.slot)?.take()?;
        let slot = id.slot;
        self.index.remove(&*entry.poly);
        for queue in [
            &mut self.single_queue,
            &mut self.paired_queue,
            &mut self.paired_done,
            &mut self.lifting_queue,
            &mut self.lifting_reset,
        ] {
            queue.retain(|&s| s != slot);
        }
        self.deferred.remove(&slot);
        Some(entry.poly)
    }

    /// Drop the input provenance of `id`; erases it if nothing else
    /// produced it. Returns whether it was erased.
    pub fn remove_input(&mut self, id: PolyId) -> bool {
        let empty = match self.entries.get_mut(id.slot).and_then(Option::as_mut) {
            Some(e) if id.level == self.level => {
                e.provenance.remove(&Provenance::Input);
                e.provenance.is_empty()
            }
            _ => return false,
        };
        if empty {
            self.erase(id);
        }
        empty
    }

    /// Drop every provenance mentioning `parent` and erase the entries left
    /// without provenance. Returns the erased handles.
    pub fn remove_by_parent(&mut self, parent: PolyId) -> Vec<PolyId> {
        let mut orphans = Vec::new();
        for (slot, e) in self.entries.iter_mut().enumerate() {
            if let Some(e) = e {
                let before = e.provenance.len();
                e.provenance.retain(|p| !p.mentions(parent));
                if before != e.provenance.len() && e.provenance.is_empty() {
                    orphans.push(PolyId::new(self.level, slot));
                }
            }
        }
        for &id in &orphans {
            self.erase(id);
        }
        orphans
    }

    /// Install the order of the elimination queues.
    pub fn set_elimination_order(&mut self, order: PolynomialOrder) {
        self.elimination_order = order;
    }

    /// Install the order of the lifting queue.
    pub fn set_lifting_order(&mut self, order: PolynomialOrder) {
        self.lifting_order = order;
    }

    fn key(&self, slot: usize, order: PolynomialOrder) -> (BigRational, u32, u32, usize, usize) {
        let Some(Some(e)) = self.entries.get(slot) else {
            return (BigRational::zero(), 0, 0, 0, slot);
        };
        match order {
            PolynomialOrder::CauchyBound => (e.cauchy.clone(), e.degree, e.total_degree, e.terms, slot),
            PolynomialOrder::LowDegree => (BigRational::zero(), e.degree, e.total_degree, e.terms, slot),
            PolynomialOrder::Memory => (BigRational::zero(), 0, 0, 0, slot),
        }
    }

    fn pop_min(&mut self, which: Queue) -> Option<usize> {
        let order = match which {
            Queue::Lifting => self.lifting_order,
            _ => self.elimination_order,
        };
        let queue = match which {
            Queue::Single => &self.single_queue,
            Queue::Paired => &self.paired_queue,
            Queue::Lifting => &self.lifting_queue,
        };
        let pos = queue
            .iter()
            .enumerate()
            .filter(|&(_, s)| !self.deferred.contains(s))
            .min_by_key(|&(_, s)| self.key(*s, order))
            .map(|(i, _)| i)?;
        let queue = match which {
            Queue::Single => &mut self.single_queue,
            Queue::Paired => &mut self.paired_queue,
            Queue::Lifting => &mut self.lifting_queue,
        };
        Some(queue.remove(pos))
    }

    /// Check whether a polynomial awaits single or paired elimination.
    pub fn elimination_pending(&self) -> bool {
        let live = |q: &Vec<usize>| q.iter().any(|s| !self.deferred.contains(s));
        live(&self.single_queue) || live(&self.paired_queue)
    }

    /// Pop the next polynomial for single elimination.
    pub fn pop_single(&mut self) -> Option<PolyId> {
        self.pop_min(Queue::Single).map(|s| self.id(s))
    }

    /// Pop the next polynomial for paired elimination together with the
    /// partners it has to be paired with: every polynomial popped before.
    pub fn pop_paired(&mut self) -> Option<(PolyId, Vec<PolyId>)> {
        let slot = self.pop_min(Queue::Paired)?;
        let partners = self.paired_done.iter().map(|&s| self.id(s)).collect();
        self.paired_done.push(slot);
        Some((self.id(slot), partners))
    }

    /// Check whether a polynomial awaits lifting.
    pub fn lifting_pending(&self) -> bool {
        self.lifting_queue.iter().any(|s| !self.deferred.contains(s))
    }

    /// Pop the next polynomial for lifting.
    pub fn pop_lifting(&mut self) -> Option<PolyId> {
        self.pop_min(Queue::Lifting).map(|s| self.id(s))
    }

    /// Restore the lifting queue to all polynomials of the set.
    pub fn reset_lifting_queue(&mut self) {
        self.lifting_queue = self.lifting_reset.clone();
    }

    /// All live polynomials in lifting order.
    pub fn lifting_order(&self) -> Vec<PolyId> {
        let mut slots: Vec<usize> = self
            .lifting_reset
            .iter()
            .copied()
            .filter(|s| !self.deferred.contains(s))
            .collect();
        slots.sort_by_cached_key(|&s| self.key(s, self.lifting_order));
        slots.into_iter().map(|s| self.id(s)).collect()
    }

    /// Park `id`: it is skipped by all queues until readmitted.
    pub fn defer(&mut self, id: PolyId) {
        if self.entry(id).is_some() {
            self.deferred.insert(id.slot);
        }
    }

    /// Check whether `id` is parked.
    pub fn is_deferred(&self, id: PolyId) -> bool {
        id.level == self.level && self.deferred.contains(&id.slot)
    }

    /// Readmit all parked polynomials; returns them.
    pub fn readmit_all(&mut self) -> Vec<PolyId> {
        let mut slots: Vec<usize> = self.deferred.drain().collect();
        slots.sort_unstable();
        slots.into_iter().map(|s| PolyId::new(self.level, s)).collect()
    }

    /// Remove all polynomials and reset the queues.
    pub fn clear(&mut self) {
        *self = Self {
            elimination_order: self.elimination_order,
            lifting_order: self.lifting_order,
            ..Self::new(self.level, self.var, self.elimination_order)
        };
    }
}

#[derive(Clone, Copy)]
enum Queue {
    Single,
    Paired,
    Lifting,
}

impl fmt::Display for EliminationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {} (x{}): {{", self.level, self.var)?;
        for (i, (id, p)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", id, p)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coeffs: &[(i64, &[(Var, u32)])]) -> Polynomial {
        Polynomial::from_coeffs_int(coeffs)
    }

    fn x_pow(k: u32) -> Polynomial {
        poly(&[(1, &[(0, k)]), (-1, &[])])
    }

    #[test]
    fn test_insert_dedup_merges_provenance() {
        let mut set = EliminationSet::new(1, 0, PolynomialOrder::Memory);
        let a = PolyId::new(0, 0);
        let b = PolyId::new(0, 1);
        let (id, added) = set.insert(x_pow(2), Provenance::Single(a), false);
        assert!(added);
        let (again, added) = set.insert(x_pow(2), Provenance::Single(b), false);
        assert!(!added);
        assert_eq!(id, again);
        assert_eq!(set.len(), 1);
        assert_eq!(set.provenance(id).map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_insert_all_returns_new() {
        let mut set = EliminationSet::new(0, 0, PolynomialOrder::Memory);
        set.insert(x_pow(1), Provenance::Input, false);
        let added = set.insert_all([x_pow(1), x_pow(2), x_pow(3)], Provenance::Input, false);
        assert_eq!(added.len(), 2);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_remove_by_parent() {
        let mut set = EliminationSet::new(1, 1, PolynomialOrder::Memory);
        let a = PolyId::new(0, 0);
        let b = PolyId::new(0, 1);
        let c = PolyId::new(0, 2);
        let (shared, _) = set.insert(x_pow(2), Provenance::pair(a, b), false);
        set.insert(x_pow(2), Provenance::pair(b, c), false);
        let (only_a, _) = set.insert(x_pow(3), Provenance::Single(a), false);
        let removed = set.remove_by_parent(a);
        assert_eq!(removed, vec![only_a]);
        assert!(set.get(shared).is_some());
        let removed = set.remove_by_parent(c);
        assert_eq!(removed, vec![shared]);
        assert!(set.is_empty());
        assert!(!set.elimination_pending());
    }

    #[test]
    fn test_queues() {
        let mut set = EliminationSet::new(0, 0, PolynomialOrder::LowDegree);
        let (p3, _) = set.insert(x_pow(3), Provenance::Input, false);
        let (p1, _) = set.insert(x_pow(1), Provenance::Input, true);
        let (p2, _) = set.insert(x_pow(2), Provenance::Input, false);
        // p1 skipped the single queue
        assert_eq!(set.pop_single(), Some(p2));
        assert_eq!(set.pop_single(), Some(p3));
        assert_eq!(set.pop_single(), None);

        assert_eq!(set.pop_paired(), Some((p1, vec![])));
        assert_eq!(set.pop_paired(), Some((p2, vec![p1])));
        assert_eq!(set.pop_paired(), Some((p3, vec![p1, p2])));
        assert!(!set.elimination_pending());

        assert_eq!(set.lifting_order(), vec![p1, p2, p3]);
        assert_eq!(set.pop_lifting(), Some(p1));
        set.set_lifting_order(PolynomialOrder::Memory);
        assert_eq!(set.pop_lifting(), Some(p3));
        set.reset_lifting_queue();
        assert!(set.lifting_pending());
        assert_eq!(set.pop_lifting(), Some(p3));
    }

    #[test]
    fn test_cauchy_order() {
        let mut set = EliminationSet::new(0, 0, PolynomialOrder::CauchyBound);
        let (wide, _) = set.insert(poly(&[(1, &[(0, 1)]), (-100, &[])]), Provenance::Input, false);
        let (narrow, _) = set.insert(poly(&[(1, &[(0, 2)]), (-2, &[])]), Provenance::Input, false);
        assert_eq!(set.pop_single(), Some(narrow));
        assert_eq!(set.pop_single(), Some(wide));
    }

    #[test]
    fn test_deferred() {
        let mut set = EliminationSet::new(0, 0, PolynomialOrder::Memory);
        let (a, _) = set.insert(x_pow(1), Provenance::Input, false);
        let (b, _) = set.insert(x_pow(2), Provenance::Input, false);
        set.defer(a);
        assert!(set.is_deferred(a));
        assert_eq!(set.lifting_order(), vec![b]);
        assert_eq!(set.pop_single(), Some(b));
        assert_eq!(set.pop_single(), None);
        assert!(set.elimination_pending());
        assert_eq!(set.readmit_all(), vec![a]);
        assert_eq!(set.pop_single(), Some(a));
    }

    #[test]
    fn test_remove_input() {
        let mut set = EliminationSet::new(0, 0, PolynomialOrder::Memory);
        let (a, _) = set.insert(x_pow(1), Provenance::Input, false);
        set.insert(x_pow(1), Provenance::Single(PolyId::new(0, 7)), false);
        assert!(!set.remove_input(a));
        assert!(set.get(a).is_some());
        assert_eq!(set.remove_by_parent(PolyId::new(0, 7)), vec![a]);
        assert!(set.find(&x_pow(1)).is_none());
    }
}
