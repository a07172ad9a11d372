//! Exchanging adjacent base points.
//!
//! Given a BSGS with base `[.., b_i, b_{i+1}, ..]`, a BSGS for the base with `b_i` and `b_{i+1}`
//! interchanged only needs new generators for the stabilizer of `b_0, .., b_{i-1}, b_{i+1}`. The
//! stabilizer of the first `i + 2` points is unchanged and seeds the new level.
use std::collections::BTreeSet;

use log::debug;
use rand::Rng;

use crate::chain::{strong_gens_from_distr, Bsgs};
use crate::group::PermGroup;
use crate::orbit::orbit_of_points;
use crate::perm::Perm;
use crate::random::ProductReplacementConfig;
use crate::El;

/// A BSGS for the base of `bsgs` with the points at `pos` and `pos + 1` interchanged.
///
/// The deterministic variant walks the basic orbit of `base[pos]`, ruling out whole orbits of the
/// growing stabilizer. With `randomized`, random elements of the stabilizer of `base[..pos]` that
/// fix `base[pos + 1]` are added until the new basic orbit has the right size. Either way the
/// result is a BSGS; only the running time of the randomized variant is random.
///
/// `bsgs` must be a BSGS. Panics when `pos + 1` is not a base position.
pub fn baseswap<R>(degree: usize, bsgs: &Bsgs, pos: usize, randomized: bool, rng: &mut R) -> Bsgs
where
    R: Rng + ?Sized,
{
    let base = &bsgs.base;
    assert!(
        pos + 1 < base.len(),
        "cannot swap base position {} of a base of length {}",
        pos,
        base.len()
    );
    let (first, second) = (base[pos], base[pos + 1]);
    let mut distr = bsgs.distribute();
    let transversals = bsgs.transversals(degree);

    // |orbit of `first` under the stabilizer of base[..pos] and `second`|
    let size = transversals[pos].len() * transversals[pos + 1].len()
        / orbit_of_points(degree, &distr[pos], &[second]).len();

    let mut stab: Vec<Perm> = distr.get(pos + 2).cloned().unwrap_or_default();
    let orbit_size = |stab: &[Perm]| orbit_of_points(degree, stab, &[first]).len();

    if randomized {
        let level = PermGroup::generated_by(degree, distr[pos].iter().cloned());
        let vector = level.schreier_vector(second);
        let mut sampler = level.random_pr(&ProductReplacementConfig::default(), rng);
        while orbit_size(&stab) != size {
            let element = level.random_stab(second, Some(&vector[..]), &mut sampler, rng);
            if !element.is_identity() {
                stab.push(element);
            }
        }
    } else {
        let mut candidates: BTreeSet<El> = transversals[pos].orbit().iter().copied().collect();
        candidates.remove(&first);
        candidates.remove(&second);
        while orbit_size(&stab) != size {
            let gamma = match candidates.iter().next() {
                Some(&gamma) => gamma,
                None => break,
            };
            let x = match transversals[pos].get(gamma) {
                Some(x) => x,
                None => break,
            };
            let preimage = x.inverse().image(second);
            match transversals[pos + 1].get(preimage) {
                None => {
                    for point in orbit_of_points(degree, &stab, &[gamma]) {
                        candidates.remove(&point);
                    }
                }
                Some(y) => {
                    // Fixes `second` and maps `first` to `gamma`
                    let element = x * y;
                    stab.push(element);
                    for point in orbit_of_points(degree, &stab, &[first]) {
                        candidates.remove(&point);
                    }
                }
            }
            candidates.remove(&gamma);
        }
    }

    debug!(
        "swapped base points {} and {} at {}, {} generators for the new level",
        first,
        second,
        pos,
        stab.len()
    );

    distr[pos + 1] = stab;
    let mut new_base = base.clone();
    new_base.swap(pos, pos + 1);
    Bsgs {
        base: new_base,
        strong_gens: strong_gens_from_distr(&distr),
    }
}

impl PermGroup {
    /// Interchange the base points at `pos` and `pos + 1` of a BSGS of this group.
    ///
    /// See [`baseswap`].
    pub fn baseswap<R>(&self, bsgs: &Bsgs, pos: usize, randomized: bool, rng: &mut R) -> Bsgs
    where
        R: Rng + ?Sized,
    {
        baseswap(self.degree(), bsgs, pos, randomized, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::chain::StabilizerChain;
    use crate::test_groups::*;

    #[test]
    fn symmetric_group_swap() {
        let s4 = symmetric(4);
        let bsgs = s4.schreier_sims_incremental_from(&[0, 1, 2], s4.generators());
        assert_eq!(bsgs.base, vec![0, 1, 2]);
        let mut rng = SmallRng::seed_from_u64(1);
        for randomized in [false, true] {
            let swapped = s4.baseswap(&bsgs, 1, randomized, &mut rng);
            assert_eq!(swapped.base, vec![0, 2, 1]);
            let chain = StabilizerChain::from_bsgs(4, &swapped);
            assert_eq!(chain.basic_orbit_sizes(), vec![4, 3, 2]);
            assert_eq!(chain.order(), s4.order());
        }
    }

    #[test]
    fn swap_at_front() {
        let d5 = dihedral(5);
        let bsgs = d5.chain().to_bsgs();
        assert_eq!(bsgs.base.len(), 2);
        let swapped = d5.baseswap(&bsgs, 0, false, &mut SmallRng::seed_from_u64(0));
        assert_eq!(swapped.base, vec![bsgs.base[1], bsgs.base[0]]);
        let chain = StabilizerChain::from_bsgs(5, &swapped);
        assert_eq!(chain.order(), d5.order());
    }

    #[test]
    #[should_panic(expected = "cannot swap")]
    fn last_position_cannot_swap() {
        let s3 = symmetric(3);
        let bsgs = s3.chain().to_bsgs();
        s3.baseswap(&bsgs, bsgs.base.len() - 1, false, &mut SmallRng::seed_from_u64(0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn swapped_chain_describes_same_group(
            group in small_group(),
            pos in 0..4usize,
            randomized in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let bsgs = group.chain().to_bsgs();
            prop_assume!(bsgs.base.len() >= 2);
            let pos = pos % (bsgs.base.len() - 1);
            let mut rng = SmallRng::seed_from_u64(seed);
            let swapped = group.baseswap(&bsgs, pos, randomized, &mut rng);

            let mut expected_base = bsgs.base.clone();
            expected_base.swap(pos, pos + 1);
            prop_assert_eq!(&swapped.base, &expected_base);

            let chain = StabilizerChain::from_bsgs(group.degree(), &swapped);
            prop_assert_eq!(chain.order(), group.order());
            for gen in &swapped.strong_gens {
                prop_assert!(group.has_element(gen));
            }
            for g in brute_force_elements(group.degree(), group.generators()) {
                prop_assert!(chain.strip(&g).is_member(chain.base().len()));
            }
        }
    }
}
