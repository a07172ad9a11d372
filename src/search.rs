//! Backtrack search over the elements of a group.
//!
//! Elements are visited in lexicographic order of their base images, where points are compared
//! by the ordering induced by the base. Every element factors as `g = u_0 * u_1 * ... * u_{k-1}`
//! and its image of the base point b_l only depends on `w_l = u_0 * ... * u_l`, so a partial
//! product fixes a prefix of the base images and the search tree has one level per base point.
use log::debug;

use crate::chain::{base_ordering, distribute_gens_by_base, Bsgs, Transversal};
use crate::group::PermGroup;
use crate::incremental::schreier_sims_incremental;
use crate::orbit::{orbit_of_points, orbits};
use crate::perm::Perm;
use crate::El;

/// All elements of the group with the given BSGS, in lexicographic order of their base images.
pub fn list_lex_by_base(degree: usize, bsgs: &Bsgs) -> Vec<Perm> {
    let ordering = base_ordering(&bsgs.base, degree);
    let mut elements = vec![Perm::identity(degree)];
    for transversal in bsgs.transversals(degree) {
        let mut next = Vec::with_capacity(elements.len() * transversal.len());
        for prefix in &elements {
            let mut branches: Vec<(El, &Perm)> = transversal.iter().collect();
            branches.sort_unstable_by_key(|&(delta, _)| ordering[prefix.image(delta) as usize]);
            next.extend(branches.into_iter().map(|(_, rep)| prefix * rep));
        }
        elements = next;
    }
    elements
}

/// Per-level test used to prune [`PermGroup::subgroup_search`].
///
/// Called with a level l and the partial products `w_0, ..., w_l`. It must return true whenever
/// some element below the node satisfies the searched property.
pub type LevelTest<'a> = &'a dyn Fn(usize, &[Perm]) -> bool;

/// Optional inputs of [`PermGroup::subgroup_search`].
#[derive(Clone, Copy, Default)]
pub struct SearchOptions<'a> {
    /// Base and strong generating set of the searched group. Computed by incremental
    /// Schreier-Sims when missing.
    pub bsgs: Option<&'a Bsgs>,
    /// Necessary conditions checked before descending into a subtree.
    pub tests: Option<LevelTest<'a>>,
    /// A subgroup known to consist of elements with the property.
    pub init_subgroup: Option<&'a PermGroup>,
}

/// The part of the result found so far, with its stabilizer chain relative to the searched base.
struct Known {
    gens: Vec<Perm>,
    /// Generators of the pointwise stabilizer of the first i base points.
    levels: Vec<Vec<Perm>>,
    /// Orbit of base point i under `levels[i]`.
    orbits: Vec<Vec<El>>,
}

impl Known {
    fn new(degree: usize, base: &[El], gens: Vec<Perm>) -> Known {
        let bsgs = schreier_sims_incremental(degree, base.to_vec(), &gens);
        let mut levels = distribute_gens_by_base(&bsgs.base, &bsgs.strong_gens);
        levels.resize(base.len(), vec![]);
        let orbits = base
            .iter()
            .zip(&levels)
            .map(|(&point, level)| orbit_of_points(degree, level, &[point]))
            .collect();
        Known {
            gens,
            levels,
            orbits,
        }
    }
}

struct Backtrack<'a> {
    degree: usize,
    base: Vec<El>,
    ordering: Vec<usize>,
    transversals: Vec<Transversal>,
    tests: Option<LevelTest<'a>>,
    known: Known,
    /// Index of the current branch within `sorted` on every level.
    choice: Vec<usize>,
    words: Vec<Perm>,
    /// Possible base images of each level below the current prefix, in base ordering.
    sorted: Vec<Vec<El>>,
    /// Strict lower bound for the base image of each level, None if unbounded.
    lower: Vec<Option<El>>,
    /// Strict upper bound for the base image of each level, None if unbounded.
    upper: Vec<Option<El>>,
    /// Minimal orbit representatives of the part of the result fixing the current prefix.
    reps: Vec<Vec<El>>,
    /// Generators of the part of the result fixing the current prefix.
    stabs: Vec<Vec<Perm>>,
}

impl<'a> Backtrack<'a> {
    fn precedes(&self, a: El, b: El) -> bool {
        self.ordering[a as usize] < self.ordering[b as usize]
    }

    fn image(&self, level: usize) -> El {
        self.words[level].image(self.base[level])
    }

    fn minimal_reps(&self, gens: &[Perm]) -> Vec<El> {
        orbits(self.degree, gens)
            .into_iter()
            .filter_map(|orbit| {
                orbit
                    .into_iter()
                    .min_by_key(|&point| self.ordering[point as usize])
            })
            .collect()
    }

    fn update_bounds(&mut self, level: usize) {
        let mut lower: Option<El> = None;
        for i in 0..level {
            if self.known.orbits[i].contains(&self.base[level]) {
                let candidate = self.image(i);
                if lower.map_or(true, |bound| self.precedes(bound, candidate)) {
                    lower = Some(candidate);
                }
            }
        }
        self.lower[level] = lower;

        // A minimal element of its coset of the result cannot take one of the last
        // |orbit| - 1 images, where orbit is the base point's orbit in the result's stabilizer.
        let index = (self.sorted[level].len() + 1).saturating_sub(self.known.orbits[level].len());
        self.upper[level] = self.sorted[level].get(index).copied();
    }

    /// Reset the topmost searched level after the result changed.
    fn reset_top(&mut self, level: usize) {
        self.stabs[level] = self.known.levels[level].clone();
        let mut reps = self.minimal_reps(&self.stabs[level]);
        // The subtree of the base point itself is already covered by the result.
        reps.retain(|&point| point != self.base[level]);
        self.reps[level] = reps;
        self.update_bounds(level);
    }

    fn passes(&self, level: usize) -> bool {
        let beta = self.image(level);
        self.reps[level].contains(&beta)
            && self.lower[level].map_or(true, |bound| self.precedes(bound, beta))
            && self.upper[level].map_or(true, |bound| self.precedes(beta, bound))
            && self
                .tests
                .map_or(true, |test| test(level, &self.words[..=level]))
    }

    fn set_branch(&mut self, level: usize) {
        let point = self.sorted[level][self.choice[level]];
        let word = match level {
            0 => Perm::identity(self.degree),
            _ => self.words[level - 1].clone(),
        };
        let gamma = word.inverse().image(point);
        let rep = self.transversals[level]
            .get(gamma)
            .unwrap_or_else(|| unreachable!("branches stay within the basic orbit"));
        self.words[level] = &word * rep;
    }

    /// Move from `level` to the first branch of `level + 1`.
    fn descend(&mut self, level: usize) {
        let beta = self.image(level);
        let next = level + 1;

        let stab = schreier_sims_incremental(self.degree, vec![beta], &self.stabs[level]);
        self.stabs[next] = stab
            .strong_gens
            .into_iter()
            .filter(|gen| gen.image(beta) == beta)
            .collect();
        self.reps[next] = self.minimal_reps(&self.stabs[next]);

        let word = &self.words[level];
        let mut sorted: Vec<El> = self.transversals[next]
            .orbit()
            .iter()
            .map(|&delta| word.image(delta))
            .collect();
        sorted.sort_unstable_by_key(|&point| self.ordering[point as usize]);
        self.sorted[next] = sorted;

        self.update_bounds(next);
        self.choice[next] = 0;
        self.set_branch(next);
    }
}

impl PermGroup {
    /// All elements in lexicographic order of their base images.
    pub fn list_lex(&self) -> Vec<Perm> {
        list_lex_by_base(self.degree(), &self.chain().to_bsgs())
    }

    /// The subgroup of all elements satisfying `prop`.
    ///
    /// `prop` must define a subgroup: the elements satisfying it are closed under products. The
    /// search visits the tree of base images depth first. It skips subtrees whose elements cannot
    /// be minimal in their double coset of the subgroup found so far, and subtrees failing
    /// `options.tests`.
    pub fn subgroup_search<P>(&self, prop: P, options: SearchOptions) -> PermGroup
    where
        P: Fn(&Perm) -> bool,
    {
        let degree = self.degree();
        let bsgs = match options.bsgs {
            Some(bsgs) => bsgs.clone(),
            None => self.schreier_sims_incremental(),
        };
        let init_gens: Vec<Perm> = options
            .init_subgroup
            .map(|group| {
                group
                    .generators()
                    .iter()
                    .filter(|gen| !gen.is_identity())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let base_len = bsgs.base.len();
        if base_len == 0 {
            return PermGroup::trivial(degree);
        }

        let transversals = bsgs.transversals(degree);
        let ordering = base_ordering(&bsgs.base, degree);
        let sorted = transversals
            .iter()
            .map(|transversal| {
                let mut orbit = transversal.orbit().to_vec();
                orbit.sort_unstable_by_key(|&point| ordering[point as usize]);
                orbit
            })
            .collect();

        let mut search = Backtrack {
            degree,
            known: Known::new(degree, &bsgs.base, init_gens),
            base: bsgs.base,
            ordering,
            transversals,
            tests: options.tests,
            choice: vec![0; base_len],
            words: vec![Perm::identity(degree); base_len],
            sorted,
            lower: vec![None; base_len],
            upper: vec![None; base_len],
            reps: vec![vec![]; base_len],
            stabs: vec![vec![]; base_len],
        };

        // Levels above `top` are on their first branch, the one of the base point itself.
        let mut top = base_len - 1;
        let mut level = base_len - 1;
        search.reset_top(top);

        loop {
            while level + 1 < base_len && search.passes(level) {
                search.descend(level);
                level += 1;
            }

            if level + 1 == base_len && search.passes(level) && prop(&search.words[level]) {
                let found = search.words[level].clone();
                debug!("subgroup search: new generator {} at level {}", found, top);
                let mut gens = std::mem::take(&mut search.known.gens);
                gens.push(found);
                search.known = Known::new(degree, &search.base, gens);
                search.reset_top(top);
                level = top;
            }

            while search.choice[level] + 1 == search.sorted[level].len() {
                if level == 0 {
                    return PermGroup::generated_by(degree, search.known.gens);
                }
                level -= 1;
            }
            if level < top {
                top = level;
                search.reset_top(top);
            }
            search.choice[level] += 1;
            search.set_branch(level);
        }
    }
}
