//! Demand-driven projection of elimination levels.

use super::Cad;
use crate::elimination_set::Provenance;
use crate::observer::CadObserver;
use crate::projection::Projection;
use cadkit_math::{Polynomial, Var};
use tracing::{debug, trace};

impl<O: CadObserver> Cad<O> {
    /// Project polynomials of the levels below `level` until some level
    /// gains a new polynomial, starting with the highest level that has
    /// work left.
    ///
    /// Returns the lowest level that gained a polynomial, or `None` once
    /// every level below `level` is fully projected.
    pub fn eliminate(&mut self, level: usize) -> Option<usize> {
        let top = level.min(self.eliminable_levels());
        loop {
            let k = (0..top).rev().find(|&k| self.elimination_sets[k].elimination_pending())?;
            if let Some(gained) = self.eliminate_step(k) {
                return Some(gained);
            }
        }
    }

    /// Project every level completely. Returns false if an interrupt
    /// stopped the elimination.
    pub fn complete_elimination(&mut self) -> bool {
        self.prepare_elimination();
        for k in 0..self.eliminable_levels() {
            while self.elimination_sets[k].elimination_pending() {
                if self.an_answer_found() {
                    debug!(level = k, "elimination interrupted");
                    return false;
                }
                self.eliminate_step(k);
            }
        }
        true
    }

    /// Check whether no level has projection work left. Polynomials parked
    /// by the bounds of the last check do not count.
    pub fn is_complete(&self) -> bool {
        self.elimination_sets[..self.eliminable_levels()]
            .iter()
            .all(|set| !set.elimination_pending())
    }

    /// The last level only yields constants when projected.
    fn eliminable_levels(&self) -> usize {
        self.elimination_sets.len().saturating_sub(1)
    }

    /// Perform one single or paired projection at level `k`. Returns the
    /// lowest level that gained a polynomial.
    fn eliminate_step(&mut self, k: usize) -> Option<usize> {
        let var = self.variables[k];
        let mut produced: Vec<(Polynomial, Provenance)> = Vec::new();
        let poly = if let Some(id) = self.elimination_sets[k].pop_single() {
            let p = self.elimination_sets[k].get(id).cloned()?;
            if p.degree(var) > 0 {
                self.projection.project_single(&p, var, id, &mut produced);
            }
            p
        } else {
            let (id, partners) = self.elimination_sets[k].pop_paired()?;
            let p = self.elimination_sets[k].get(id).cloned()?;
            if p.degree(var) > 0 {
                for partner in partners {
                    let Some(q) = self.elimination_sets[k].get(partner).cloned() else {
                        continue;
                    };
                    if q.degree(var) > 0 {
                        self.projection.project_paired(&p, &q, var, (id, partner), &mut produced);
                    }
                }
            }
            p
        };
        self.stats.polynomials_eliminated += 1;

        let mut lowest: Option<usize> = None;
        let mut count = 0;
        for (r, provenance) in produced {
            for f in self.factors(&r) {
                if let Some(id) = self.route(f, k + 1, provenance) {
                    count += 1;
                    lowest = Some(lowest.map_or(id.level(), |l| l.min(id.level())));
                }
            }
        }
        trace!(level = k, poly = %poly, produced = count, "elimination step");
        self.observer.on_elimination(k, &poly, count);
        lowest
    }

    /// A variable order for `polys` that keeps the projection small.
    ///
    /// Greedily picks, one at a time, the variable whose McCallum
    /// projection of the current polynomials has the smallest sum of total
    /// degrees. The first variable of the result is eliminated first.
    pub fn order_variables_greedily(polys: &[Polynomial], vars: &[Var]) -> Vec<Var> {
        let mut projection = Projection::default();
        let mut current: Vec<Polynomial> = Vec::new();
        for p in polys.iter().filter(|p| !p.is_constant()) {
            let p = p.primitive();
            if !current.contains(&p) {
                current.push(p);
            }
        }
        let mut remaining = vars.to_vec();
        let mut order = Vec::with_capacity(vars.len());
        while !remaining.is_empty() {
            let mut best: Option<(u64, usize, Vec<Polynomial>)> = None;
            for (i, &v) in remaining.iter().enumerate() {
                let next = project_all(&mut projection, &current, v);
                let cost: u64 = next.iter().map(|p| u64::from(p.total_degree())).sum();
                if best.as_ref().map_or(true, |(c, _, _)| cost < *c) {
                    best = Some((cost, i, next));
                }
            }
            let Some((cost, i, next)) = best else {
                break;
            };
            trace!(var = remaining[i], cost, "variable chosen");
            order.push(remaining.remove(i));
            current = next;
        }
        order
    }
}

/// One full McCallum projection step eliminating `var`; polynomials free
/// of `var` are carried over.
fn project_all(projection: &mut Projection, polys: &[Polynomial], var: Var) -> Vec<Polynomial> {
    let (with, without): (Vec<&Polynomial>, Vec<&Polynomial>) = polys.iter().partition(|p| p.has_var(var));
    let mut out: Vec<Polynomial> = without.into_iter().cloned().collect();
    let mut push = |p: Polynomial| {
        if !out.contains(&p) {
            out.push(p);
        }
    };
    for (i, p) in with.iter().enumerate() {
        projection.single(p, var).into_iter().for_each(&mut push);
        for q in &with[..i] {
            projection.paired(p, q, var).into_iter().for_each(&mut push);
        }
    }
    out
}
