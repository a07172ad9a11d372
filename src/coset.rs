//! Coset representation of group elements.
//!
//! With a stabilizer chain every element g factors uniquely as `g = u_0 * u_1 * ... * u_{k-1}`
//! where u_i is a coset representative of level i. Numbering the representatives of each level
//! by their image point turns this factorization into a mixed radix number, the rank of g, which
//! gives membership testing, ranking, unranking, uniform sampling and enumeration.
use std::str::FromStr;

use ahash::AHashSet;
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};
use rand::Rng;

use crate::action::LeftAction;
use crate::chain::StabilizerChain;
use crate::error::GroupError;
use crate::group::PermGroup;
use crate::perm::Perm;

impl StabilizerChain {
    /// Factor an element into coset representatives, one per level in base order.
    ///
    /// Returns None if the element is not a member of the group.
    pub fn coset_decomposition(&self, g: &Perm) -> Option<Vec<Perm>> {
        if g.degree() != self.degree() {
            return None;
        }
        let mut rest = g.clone();
        let mut factors = Vec::with_capacity(self.base().len());
        for transversal in self.transversals() {
            let rep = transversal.get(rest.image(transversal.point()))?;
            rep.inverse().left_apply_to(&mut rest);
            factors.push(rep.clone());
        }
        if rest.is_identity() {
            Some(factors)
        } else {
            None
        }
    }

    /// Whether an element is a member of the group.
    pub fn contains(&self, g: &Perm) -> bool {
        g.degree() == self.degree() && self.strip(g).is_member(self.base().len())
    }

    /// Rank of an element in the coset enumeration, in `0..order`.
    ///
    /// Returns None if the element is not a member of the group.
    pub fn coset_rank(&self, g: &Perm) -> Option<BigUint> {
        let factors = self.coset_decomposition(g)?;
        let mut rank = BigUint::zero();
        for (transversal, factor) in self.transversals().iter().zip(&factors) {
            let index = transversal.index_of(factor.image(transversal.point()))?;
            rank = rank * transversal.len() + index;
        }
        Some(rank)
    }

    /// The element with a given rank.
    ///
    /// Returns None if the rank is not below the group order.
    pub fn coset_unrank(&self, rank: &BigUint) -> Option<Perm> {
        if rank >= self.order() {
            return None;
        }
        let mut digits = vec![0; self.transversals().len()];
        let mut rest = rank.clone();
        for (digit, transversal) in digits.iter_mut().zip(self.transversals()).rev() {
            let (quotient, remainder) = rest.div_rem(&BigUint::from(transversal.len()));
            *digit = remainder.to_usize()?;
            rest = quotient;
        }

        let mut element = Perm::identity(self.degree());
        for (&digit, transversal) in digits.iter().zip(self.transversals()) {
            element = &element * transversal.rep_at(digit)?;
        }
        Some(element)
    }

    /// A uniformly distributed random element.
    pub fn random_element<R>(&self, rng: &mut R) -> Perm
    where
        R: Rng + ?Sized,
    {
        let rank = rng.gen_biguint_below(self.order());
        match self.coset_unrank(&rank) {
            Some(element) => element,
            None => unreachable!("ranks below the order are valid"),
        }
    }

    /// All elements in rank order.
    pub fn elements(&self) -> CosetElements<'_> {
        CosetElements::new(self)
    }
}

/// Iterator over the elements of a group in rank order.
///
/// Partial products of the representatives are kept per level, so advancing only recomputes the
/// levels whose digit changed.
pub struct CosetElements<'a> {
    chain: &'a StabilizerChain,
    digits: Vec<usize>,
    partial: Vec<Perm>,
    done: bool,
}

impl<'a> CosetElements<'a> {
    fn new(chain: &'a StabilizerChain) -> CosetElements<'a> {
        let levels = chain.transversals().len();
        let mut elements = CosetElements {
            chain,
            digits: vec![0; levels],
            partial: vec![Perm::identity(chain.degree()); levels + 1],
            done: false,
        };
        elements.recompute_from(0);
        elements
    }

    fn recompute_from(&mut self, level: usize) {
        for l in level..self.digits.len() {
            let rep = self.chain.transversals()[l]
                .rep_at(self.digits[l])
                .unwrap_or_else(|| unreachable!("digits stay below the orbit sizes"));
            self.partial[l + 1] = &self.partial[l] * rep;
        }
    }
}

impl<'a> Iterator for CosetElements<'a> {
    type Item = Perm;

    fn next(&mut self) -> Option<Perm> {
        if self.done {
            return None;
        }
        let element = self.partial[self.digits.len()].clone();

        let sizes = self.chain.transversals();
        let mut level = self.digits.len();
        loop {
            if level == 0 {
                self.done = true;
                break;
            }
            level -= 1;
            self.digits[level] += 1;
            if self.digits[level] < sizes[level].len() {
                self.recompute_from(level);
                break;
            }
            self.digits[level] = 0;
        }

        Some(element)
    }
}

/// All elements of the group generated by `gens`, by Dimino's method.
///
/// Each new generator extends the current subgroup H to ⟨H, g⟩ by adding whole cosets of H.
pub fn generate_dimino(degree: usize, gens: &[Perm]) -> Vec<Perm> {
    let identity = Perm::identity(degree);
    let mut elements = vec![identity.clone()];
    let mut seen: AHashSet<Perm> = AHashSet::default();
    seen.insert(identity.clone());

    for (i, gen) in gens.iter().enumerate() {
        if seen.contains(gen) {
            continue;
        }
        let subgroup = elements.clone();
        let mut reps = vec![identity.clone()];
        let mut pos = 0;
        while pos < reps.len() {
            let rep = reps[pos].clone();
            pos += 1;
            for g in &gens[..=i] {
                let candidate = &rep * g;
                if seen.contains(&candidate) {
                    continue;
                }
                for h in &subgroup {
                    let element = h * &candidate;
                    seen.insert(element.clone());
                    elements.push(element);
                }
                reps.push(candidate);
            }
        }
    }
    elements
}

/// Method used to enumerate group elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerateMethod {
    /// Rank order of the coset representation.
    Coset,
    /// Dimino's method, independent of the stabilizer chain.
    Dimino,
}

impl FromStr for GenerateMethod {
    type Err = GroupError;

    fn from_str(name: &str) -> Result<GenerateMethod, GroupError> {
        match name {
            "coset" => Ok(GenerateMethod::Coset),
            "dimino" => Ok(GenerateMethod::Dimino),
            _ => Err(GroupError::UnsupportedMethod(name.to_string())),
        }
    }
}

/// Iterator over group elements produced by [`PermGroup::generate`].
pub enum Elements<'a> {
    Coset(CosetElements<'a>),
    Dimino(std::vec::IntoIter<Perm>),
}

impl<'a> Iterator for Elements<'a> {
    type Item = Perm;

    fn next(&mut self) -> Option<Perm> {
        match self {
            Elements::Coset(elements) => elements.next(),
            Elements::Dimino(elements) => elements.next(),
        }
    }
}

impl PermGroup {
    /// Whether `g` is an element of this group.
    pub fn has_element(&self, g: &Perm) -> bool {
        self.chain().contains(g)
    }

    /// See [`StabilizerChain::coset_decomposition`].
    pub fn coset_decomposition(&self, g: &Perm) -> Option<Vec<Perm>> {
        self.chain().coset_decomposition(g)
    }

    /// See [`StabilizerChain::coset_rank`].
    pub fn coset_rank(&self, g: &Perm) -> Option<BigUint> {
        self.chain().coset_rank(g)
    }

    /// See [`StabilizerChain::coset_unrank`].
    pub fn coset_unrank(&self, rank: &BigUint) -> Option<Perm> {
        self.chain().coset_unrank(rank)
    }

    /// A uniformly distributed random element.
    pub fn random<R>(&self, rng: &mut R) -> Perm
    where
        R: Rng + ?Sized,
    {
        self.chain().random_element(rng)
    }

    /// Enumerate all elements of this group.
    pub fn generate(&self, method: GenerateMethod) -> Elements<'_> {
        match method {
            GenerateMethod::Coset => Elements::Coset(self.chain().elements()),
            GenerateMethod::Dimino => Elements::Dimino(
                generate_dimino(self.degree(), self.generators()).into_iter(),
            ),
        }
    }

    /// Enumerate all elements using a method given by name.
    pub fn generate_by_name(&self, method: &str) -> Result<Elements<'_>, GroupError> {
        Ok(self.generate(method.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    use num_traits::One;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::test_groups::*;

    #[test]
    fn rank_order_of_symmetric_three() {
        let group = PermGroup::new(vec![perm(&[0, 2, 1]), perm(&[1, 0, 2])]).unwrap();
        let elements: Vec<Vec<u32>> = group
            .generate(GenerateMethod::Coset)
            .map(Vec::from)
            .collect();
        assert_eq!(
            elements,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
        for (rank, element) in elements.into_iter().enumerate() {
            let element = Perm::from_vec(element).unwrap();
            assert_eq!(group.coset_rank(&element), Some(BigUint::from(rank)));
        }
    }

    #[test]
    fn out_of_range_rank() {
        let group = symmetric(4);
        assert!(group.coset_unrank(&BigUint::from(24u32)).is_none());
        assert!(group.coset_unrank(&BigUint::from(23u32)).is_some());
    }

    #[test]
    fn non_members() {
        let group = alternating(4);
        let odd = cycles(4, &[&[0, 1]]);
        assert!(!group.has_element(&odd));
        assert!(group.coset_decomposition(&odd).is_none());
        assert!(group.coset_rank(&odd).is_none());
        assert!(!group.has_element(&Perm::identity(5)));
    }

    #[test]
    fn trivial_group_has_one_element() {
        let group = PermGroup::trivial(3);
        let elements: Vec<Perm> = group.generate(GenerateMethod::Coset).collect();
        assert_eq!(elements, vec![Perm::identity(3)]);
        assert_eq!(group.coset_rank(&Perm::identity(3)), Some(BigUint::zero()));
        assert!(group.order().is_one());
    }

    #[test]
    fn method_names() {
        assert_eq!("coset".parse(), Ok(GenerateMethod::Coset));
        assert_eq!("dimino".parse(), Ok(GenerateMethod::Dimino));
        let group = cyclic(3);
        match group.generate_by_name("schreier") {
            Err(err) => assert_eq!(err, GroupError::UnsupportedMethod("schreier".to_string())),
            Ok(_) => panic!("unknown method accepted"),
        }
    }

    #[test]
    fn random_elements_are_members() {
        let group = dihedral(12);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            assert!(group.has_element(&group.random(&mut rng)));
        }
    }

    proptest! {
        #[test]
        fn enumerations_agree(group in small_group()) {
            let coset: BTreeSet<Perm> = group.generate(GenerateMethod::Coset).collect();
            let dimino: Vec<Perm> = group.generate(GenerateMethod::Dimino).collect();
            let brute = brute_force_elements(group.degree(), group.generators());
            prop_assert_eq!(dimino.len(), brute.len());
            prop_assert_eq!(&dimino.into_iter().collect::<BTreeSet<_>>(), &brute);
            prop_assert_eq!(&coset, &brute);
            prop_assert_eq!(BigUint::from(coset.len()), group.order().clone());
        }

        #[test]
        fn rank_unrank_inverse(group in small_group()) {
            for (rank, element) in group.generate(GenerateMethod::Coset).enumerate() {
                let rank = BigUint::from(rank);
                let rank_of = group.coset_rank(&element);
                let unranked = group.coset_unrank(&rank);
                prop_assert_eq!(rank_of.as_ref(), Some(&rank));
                prop_assert_eq!(unranked.as_ref(), Some(&element));
            }
        }

        #[test]
        fn decomposition_reconstructs(group in small_group()) {
            for element in brute_force_elements(group.degree(), group.generators()) {
                let factors = group.coset_decomposition(&element).unwrap();
                let product = factors
                    .iter()
                    .fold(Perm::identity(group.degree()), |acc, factor| &acc * factor);
                prop_assert_eq!(product, element.clone());
                prop_assert!(group.has_element(&element));
            }
        }

        #[test]
        fn membership_matches_enumeration(group in small_group()) {
            let degree = group.degree();
            let elements = brute_force_elements(degree, group.generators());
            for candidate in brute_force_elements(degree, symmetric(degree).generators()) {
                prop_assert_eq!(group.has_element(&candidate), elements.contains(&candidate));
            }
        }
    }
}
