//! Permutation groups given by generators.
use std::fmt;
use std::ops::Mul;

use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::One;
use once_cell::unsync::OnceCell;

use crate::chain::{distribute_gens_by_base, StabilizerChain, Transversal};
use crate::error::GroupError;
use crate::incremental::schreier_sims_incremental;
use crate::perm::Perm;
use crate::schreier_sims::schreier_sims;
use crate::El;

/// A permutation group given by generators.
///
/// The group owns a copy of its generators. Everything derived from them, most importantly the
/// stabilizer chain, is computed on first use and cached for the lifetime of the instance.
/// Operations that produce other groups return new instances with their own caches.
#[derive(Clone)]
pub struct PermGroup {
    degree: usize,
    generators: Vec<Perm>,
    chain: OnceCell<StabilizerChain>,
    pub(crate) transitive: OnceCell<bool>,
    pub(crate) primitive: OnceCell<bool>,
}

impl PermGroup {
    /// Create the group generated by a non-empty list of permutations of equal degree.
    pub fn new(generators: Vec<Perm>) -> Result<PermGroup, GroupError> {
        let degree = generators.first().ok_or(GroupError::NoGenerators)?.degree();
        if let Some((index, gen)) = generators
            .iter()
            .enumerate()
            .find(|(_, gen)| gen.degree() != degree)
        {
            return Err(GroupError::DegreeMismatch {
                index,
                expected: degree,
                found: gen.degree(),
            });
        }
        Ok(PermGroup::from_parts(degree, generators))
    }

    /// The trivial group acting on `degree` points.
    pub fn trivial(degree: usize) -> PermGroup {
        PermGroup::from_parts(degree, vec![Perm::identity(degree)])
    }

    /// The group generated by `gens`, dropping identities and duplicates.
    ///
    /// Falls back to the trivial group when nothing remains.
    pub(crate) fn generated_by<I>(degree: usize, gens: I) -> PermGroup
    where
        I: IntoIterator<Item = Perm>,
    {
        let gens: Vec<Perm> = gens
            .into_iter()
            .filter(|gen| !gen.is_identity())
            .unique()
            .collect();
        if gens.is_empty() {
            PermGroup::trivial(degree)
        } else {
            PermGroup::from_parts(degree, gens)
        }
    }

    fn from_parts(degree: usize, generators: Vec<Perm>) -> PermGroup {
        PermGroup {
            degree,
            generators,
            chain: OnceCell::new(),
            transitive: OnceCell::new(),
            primitive: OnceCell::new(),
        }
    }

    /// Number of points the group acts on.
    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn generators(&self) -> &[Perm] {
        &self.generators
    }

    /// The stabilizer chain computed by deterministic Schreier-Sims.
    ///
    /// Computed on first use.
    pub fn chain(&self) -> &StabilizerChain {
        self.chain
            .get_or_init(|| schreier_sims(self.degree, &self.generators))
    }

    pub fn base(&self) -> &[El] {
        self.chain().base()
    }

    pub fn strong_gens(&self) -> &[Perm] {
        self.chain().strong_gens()
    }

    /// Generators produced for the stabilizers of the chain.
    pub fn stabilizers_gens(&self) -> &[Perm] {
        self.chain().stabilizer_gens()
    }

    pub fn basic_orbits(&self) -> Vec<&[El]> {
        self.chain().basic_orbits()
    }

    pub fn basic_transversals(&self) -> &[Transversal] {
        self.chain().transversals()
    }

    /// The groups G^(i) of the stabilizer chain, one per base point.
    pub fn basic_stabilizers(&self) -> Vec<PermGroup> {
        let chain = self.chain();
        distribute_gens_by_base(chain.base(), chain.strong_gens())
            .into_iter()
            .map(|gens| PermGroup::generated_by(self.degree, gens))
            .collect()
    }

    /// Number of elements of the group.
    pub fn order(&self) -> &BigUint {
        self.chain().order()
    }

    pub fn is_trivial(&self) -> bool {
        self.generators.iter().all(Perm::is_identity)
    }

    /// Whether all generators commute.
    pub fn is_abelian(&self) -> bool {
        self.generators
            .iter()
            .tuple_combinations()
            .all(|(a, b)| a.commutes_with(b))
    }

    /// Whether this group is a subgroup of `other`.
    pub fn is_subgroup(&self, other: &PermGroup) -> bool {
        self.degree == other.degree
            && self.generators.iter().all(|gen| other.has_element(gen))
    }

    /// Whether this group is a normal subgroup of `other`.
    pub fn is_normal(&self, other: &PermGroup) -> bool {
        self.is_subgroup(other)
            && other.generators.iter().all(|by| {
                self.generators
                    .iter()
                    .all(|gen| self.has_element(&gen.conjugate(by)))
            })
    }

    /// The smallest normal subgroup of this group containing `other`.
    ///
    /// The closure is grown by conjugating with this group's generators. Each new conjugate is
    /// added to an incrementally extended base and strong generating set.
    ///
    /// Panics when the groups act on different numbers of points.
    pub fn normal_closure(&self, other: &PermGroup) -> PermGroup {
        assert_eq!(
            self.degree, other.degree,
            "normal closure of a group of different degree"
        );
        let mut gens: Vec<Perm> = other
            .generators
            .iter()
            .filter(|gen| !gen.is_identity())
            .cloned()
            .collect();
        if gens.is_empty() {
            return PermGroup::trivial(self.degree);
        }

        let mut bsgs = schreier_sims_incremental(self.degree, vec![], &gens);
        let mut chain = StabilizerChain::from_bsgs(self.degree, &bsgs);

        loop {
            let missing = self
                .generators
                .iter()
                .cartesian_product(&gens)
                .map(|(by, gen)| gen.conjugate(by))
                .find(|conjugate| !chain.strip(conjugate).is_member(chain.base().len()));
            let conjugate = match missing {
                Some(conjugate) => conjugate,
                None => break,
            };
            let mut strong_gens = bsgs.strong_gens.clone();
            strong_gens.push(conjugate.clone());
            bsgs = schreier_sims_incremental(self.degree, bsgs.base, &strong_gens);
            chain = StabilizerChain::from_bsgs(self.degree, &bsgs);
            gens.push(conjugate);
        }

        let closure = PermGroup::generated_by(self.degree, gens);
        // The incremental chain is a valid chain of the closure, reuse it
        let _ = closure.chain.set(chain);
        closure
    }

    /// The normal closure in this group of all commutators of generators of `a` and `b`.
    ///
    /// For normal subgroups `a` and `b` this is the commutator subgroup [a, b].
    ///
    /// Panics when `a` or `b` acts on a different number of points than this group.
    pub fn commutator(&self, a: &PermGroup, b: &PermGroup) -> PermGroup {
        let commutators = a
            .generators
            .iter()
            .cartesian_product(&b.generators)
            .map(|(x, y)| x.commutator(y));
        let generated = PermGroup::generated_by(self.degree, commutators);
        self.normal_closure(&generated)
    }

    /// The commutator subgroup [G, G].
    pub fn derived_subgroup(&self) -> PermGroup {
        self.commutator(self, self)
    }

    /// Whether the derived series reaches the trivial group.
    pub fn is_solvable(&self) -> bool {
        let mut current = self.clone();
        loop {
            if current.order().is_one() {
                return true;
            }
            let next = current.derived_subgroup();
            if next.order() == current.order() {
                return false;
            }
            current = next;
        }
    }

    /// The direct product of groups, acting on the disjoint union of their domains.
    pub fn direct_product(groups: &[&PermGroup]) -> Result<PermGroup, GroupError> {
        if groups.is_empty() {
            return Err(GroupError::NoGenerators);
        }
        let degree: usize = groups.iter().map(|group| group.degree).sum();
        let mut offset = 0;
        let mut gens = vec![];
        for group in groups {
            gens.extend(
                group
                    .generators
                    .iter()
                    .map(|gen| gen.shifted(offset, degree)),
            );
            offset += group.degree;
        }
        Ok(PermGroup::generated_by(degree, gens))
    }
}

impl<'a, 'b> Mul<&'b PermGroup> for &'a PermGroup {
    type Output = PermGroup;

    /// Direct product of two groups.
    fn mul(self, rhs: &'b PermGroup) -> PermGroup {
        let degree = self.degree + rhs.degree;
        let gens = self
            .generators
            .iter()
            .map(|gen| gen.shifted(0, degree))
            .chain(rhs.generators.iter().map(|gen| gen.shifted(self.degree, degree)));
        PermGroup::generated_by(degree, gens)
    }
}

/// Two groups are equal when they contain the same elements.
impl PartialEq for PermGroup {
    fn eq(&self, other: &PermGroup) -> bool {
        self.degree == other.degree && self.order() == other.order() && self.is_subgroup(other)
    }
}

impl Eq for PermGroup {}

impl fmt::Debug for PermGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PermGroup")
            .field("degree", &self.degree)
            .field("generators", &self.generators)
            .finish()
    }
}
