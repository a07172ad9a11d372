//! Stabilizer chains.
//!
//! A base and strong generating set (BSGS) of a group G is a sequence of points b_0, ..., b_{k-1}
//! together with generators S such that the only element of G fixing every base point is the
//! identity and, for every i, the elements of S fixing b_0, ..., b_{i-1} generate the pointwise
//! stabilizer G^(i). Each level of the resulting chain G = G^(0) ≥ G^(1) ≥ ... ≥ G^(k) = 1 stores
//! the orbit of its base point under G^(i) and a transversal of coset representatives.
//!
//! This module contains the chain data structures shared by every construction algorithm, the
//! distribution of generators over chain levels and sifting.
use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::One;

use crate::action::LeftAction;
use crate::perm::Perm;
use crate::El;

/// An orbit together with coset representatives.
///
/// For a root point α and a generating set, stores every point β of the orbit of α along with an
/// element mapping α to β. Representatives are owned by the transversal and never shared.
#[derive(Clone, Debug)]
pub struct Transversal {
    point: El,
    orbit: Vec<El>,
    sorted: Vec<El>,
    reps: Vec<Perm>,
    slots: Vec<Option<usize>>,
}

impl Transversal {
    fn with_root(degree: usize, point: El) -> Transversal {
        assert!((point as usize) < degree, "point {} out of range", point);
        let mut slots = vec![None; degree];
        slots[point as usize] = Some(0);
        Transversal {
            point,
            orbit: vec![point],
            sorted: vec![],
            reps: vec![Perm::identity(degree)],
            slots,
        }
    }

    fn discover(&mut self, gen: &Perm, from: usize) -> Option<usize> {
        let gamma = gen.image(self.orbit[from]);
        if self.slots[gamma as usize].is_some() {
            return None;
        }
        let slot = self.orbit.len();
        self.slots[gamma as usize] = Some(slot);
        self.orbit.push(gamma);
        self.reps.push(gen.left_apply(self.reps[from].clone()));
        Some(slot)
    }

    fn finish(mut self) -> Transversal {
        self.sorted = self.orbit.clone();
        self.sorted.sort_unstable();
        self
    }

    /// Orbit transversal computed by breadth first search.
    ///
    /// The representative of `g(β)` is `g * u_β` where `u_β` is the representative of the point
    /// β it was first reached from.
    pub fn breadth_first(degree: usize, gens: &[Perm], point: El) -> Transversal {
        let mut transversal = Transversal::with_root(degree, point);
        let mut pos = 0;
        while pos < transversal.orbit.len() {
            for gen in gens {
                transversal.discover(gen, pos);
            }
            pos += 1;
        }
        transversal.finish()
    }

    /// Orbit transversal computed by depth first search (a Schreier tree).
    pub fn depth_first(degree: usize, gens: &[Perm], point: El) -> Transversal {
        let mut transversal = Transversal::with_root(degree, point);
        // Each stack entry is an orbit position and the next generator to try from there
        let mut stack = vec![(0, 0)];
        while let Some(top) = stack.last_mut() {
            let (pos, gen_index) = *top;
            if gen_index == gens.len() {
                stack.pop();
                continue;
            }
            top.1 += 1;
            if let Some(slot) = transversal.discover(&gens[gen_index], pos) {
                stack.push((slot, 0));
            }
        }
        transversal.finish()
    }

    /// Number of points of the domain.
    pub fn degree(&self) -> usize {
        self.slots.len()
    }

    /// The root point.
    pub fn point(&self) -> El {
        self.point
    }

    /// The orbit of the root point in discovery order.
    pub fn orbit(&self) -> &[El] {
        &self.orbit
    }

    /// The orbit of the root point in increasing order.
    pub fn sorted_orbit(&self) -> &[El] {
        &self.sorted
    }

    /// Size of the orbit.
    pub fn len(&self) -> usize {
        self.orbit.len()
    }

    /// Orbits always contain the root point.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, beta: El) -> bool {
        self.slot(beta).is_some()
    }

    /// The representative mapping the root point to `beta`, if `beta` is in the orbit.
    pub fn get(&self, beta: El) -> Option<&Perm> {
        self.slot(beta).map(|slot| &self.reps[slot])
    }

    /// Position of `beta` within the sorted orbit.
    pub fn index_of(&self, beta: El) -> Option<usize> {
        self.sorted.binary_search(&beta).ok()
    }

    /// The representative at a position of the sorted orbit.
    pub fn rep_at(&self, index: usize) -> Option<&Perm> {
        self.sorted.get(index).and_then(|&beta| self.get(beta))
    }

    /// Pairs of orbit points and their representatives, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (El, &Perm)> + '_ {
        self.orbit.iter().copied().zip(self.reps.iter())
    }

    fn slot(&self, beta: El) -> Option<usize> {
        self.slots.get(beta as usize).copied().flatten()
    }
}

/// A base together with a strong generating set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bsgs {
    pub base: Vec<El>,
    pub strong_gens: Vec<Perm>,
}

impl Bsgs {
    /// Strong generators of every basic stabilizer, see [`distribute_gens_by_base`].
    pub fn distribute(&self) -> Vec<Vec<Perm>> {
        distribute_gens_by_base(&self.base, &self.strong_gens)
    }

    /// Breadth first orbit transversals of every base point under its basic stabilizer.
    pub fn transversals(&self, degree: usize) -> Vec<Transversal> {
        self.base
            .iter()
            .zip(self.distribute())
            .map(|(&point, gens)| Transversal::breadth_first(degree, &gens, point))
            .collect()
    }
}

/// Result of sifting an element through a stabilizer chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sift {
    /// What remains of the element after dividing out the representatives of every passed level.
    pub residue: Perm,
    /// Index of the level at which the residue left the basic orbit, or the number of levels if
    /// every level was passed.
    pub level: usize,
}

impl Sift {
    /// Whether the element is a product of the chain's representatives.
    pub fn is_member(&self, levels: usize) -> bool {
        self.level == levels && self.residue.is_identity()
    }
}

/// Sift an element through levels given by base points and their transversals.
pub fn strip(g: &Perm, base: &[El], transversals: &[Transversal]) -> Sift {
    let mut residue = g.clone();
    for (level, (&point, transversal)) in base.iter().zip(transversals).enumerate() {
        let beta = residue.image(point);
        if beta == point {
            continue;
        }
        match transversal.get(beta) {
            Some(rep) => rep.inverse().left_apply_to(&mut residue),
            None => return Sift { residue, level },
        }
    }
    Sift {
        residue,
        level: base.len(),
    }
}

/// Distribute generators over the levels of a base.
///
/// Level i receives every generator fixing `base[..i]`. Generators fixing all but possibly the
/// last base point end up on every level.
pub fn distribute_gens_by_base(base: &[El], gens: &[Perm]) -> Vec<Vec<Perm>> {
    let mut levels = vec![vec![]; base.len()];
    if base.is_empty() {
        return levels;
    }
    for gen in gens {
        let mut depth = 0;
        while depth + 1 < base.len() && gen.image(base[depth]) == base[depth] {
            depth += 1;
        }
        for level in &mut levels[..=depth] {
            level.push(gen.clone());
        }
    }
    levels
}

/// The union of per-level generators without duplicates, keeping the first occurrence.
pub fn strong_gens_from_distr(levels: &[Vec<Perm>]) -> Vec<Perm> {
    levels.iter().flatten().unique().cloned().collect()
}

/// Position of every point in the ordering induced by a base.
///
/// Base points come first, in base order, followed by all other points in increasing order.
pub fn base_ordering(base: &[El], degree: usize) -> Vec<usize> {
    let mut ordering = vec![usize::MAX; degree];
    for (pos, &point) in base.iter().enumerate() {
        ordering[point as usize] = pos;
    }
    let mut next = base.len();
    for rank in ordering.iter_mut() {
        if *rank == usize::MAX {
            *rank = next;
            next += 1;
        }
    }
    ordering
}

/// A stabilizer chain for a permutation group.
///
/// Built either by deterministic Schreier-Sims or from any base and strong generating set. The
/// group order is the product of the basic orbit sizes.
#[derive(Clone, Debug)]
pub struct StabilizerChain {
    degree: usize,
    base: Vec<El>,
    strong_gens: Vec<Perm>,
    transversals: Vec<Transversal>,
    stabilizer_gens: Vec<Perm>,
    order: BigUint,
}

impl StabilizerChain {
    pub(crate) fn new(
        degree: usize,
        base: Vec<El>,
        strong_gens: Vec<Perm>,
        transversals: Vec<Transversal>,
        stabilizer_gens: Vec<Perm>,
    ) -> StabilizerChain {
        debug_assert_eq!(base.len(), transversals.len());
        let order = transversals
            .iter()
            .fold(BigUint::one(), |acc, transversal| acc * transversal.len());
        StabilizerChain {
            degree,
            base,
            strong_gens,
            transversals,
            stabilizer_gens,
            order,
        }
    }

    /// The chain of the trivial group.
    pub fn trivial(degree: usize) -> StabilizerChain {
        StabilizerChain::new(degree, vec![], vec![], vec![], vec![])
    }

    /// Build the chain described by a base and strong generating set.
    ///
    /// Base points with a trivial basic orbit are dropped. The result is only meaningful when
    /// `bsgs` actually is a BSGS.
    pub fn from_bsgs(degree: usize, bsgs: &Bsgs) -> StabilizerChain {
        let distr = bsgs.distribute();
        let mut base = vec![];
        let mut transversals = vec![];
        for (&point, gens) in bsgs.base.iter().zip(&distr) {
            let transversal = Transversal::breadth_first(degree, gens, point);
            if transversal.len() > 1 {
                base.push(point);
                transversals.push(transversal);
            }
        }
        let stabilizer_gens = strong_gens_from_distr(distr.get(1..).unwrap_or(&[]));
        let strong_gens = bsgs
            .strong_gens
            .iter()
            .filter(|gen| !gen.is_identity())
            .unique()
            .cloned()
            .collect();
        StabilizerChain::new(degree, base, strong_gens, transversals, stabilizer_gens)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The base points, one per nontrivial level.
    pub fn base(&self) -> &[El] {
        &self.base
    }

    pub fn strong_gens(&self) -> &[Perm] {
        &self.strong_gens
    }

    /// Generators for the stabilizers further down the chain.
    pub fn stabilizer_gens(&self) -> &[Perm] {
        &self.stabilizer_gens
    }

    /// Orbit transversals of the base points, one per level.
    pub fn transversals(&self) -> &[Transversal] {
        &self.transversals
    }

    /// Basic orbits in discovery order.
    pub fn basic_orbits(&self) -> Vec<&[El]> {
        self.transversals.iter().map(Transversal::orbit).collect()
    }

    pub fn basic_orbit_sizes(&self) -> Vec<usize> {
        self.transversals.iter().map(Transversal::len).collect()
    }

    /// Order of the group.
    pub fn order(&self) -> &BigUint {
        &self.order
    }

    /// Sift an element through this chain.
    pub fn strip(&self, g: &Perm) -> Sift {
        strip(g, &self.base, &self.transversals)
    }

    pub fn to_bsgs(&self) -> Bsgs {
        Bsgs {
            base: self.base.clone(),
            strong_gens: self.strong_gens.clone(),
        }
    }
}
