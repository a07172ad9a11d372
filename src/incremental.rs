//! Incremental Schreier-Sims.
//!
//! Extends a partial base and generating set to a base and strong generating set. Schreier
//! generators are sifted through the partially built chain starting from the deepest level; a
//! residue that does not sift becomes a new strong generator (and possibly yields a new base
//! point) and processing resumes at the deepest level it changed.
use log::{debug, trace};

use crate::action::LeftAction;
use crate::chain::{distribute_gens_by_base, strip, strong_gens_from_distr, Bsgs, Transversal};
use crate::group::PermGroup;
use crate::perm::Perm;
use crate::El;

/// Extend `base` and `gens` to a base and strong generating set of the group generated by `gens`.
///
/// The given base points are kept in order; new base points are appended. When every generator
/// is the identity, the base is returned unchanged with no strong generators.
pub fn schreier_sims_incremental(degree: usize, mut base: Vec<El>, gens: &[Perm]) -> Bsgs {
    let gens: Vec<Perm> = gens.iter().filter(|g| !g.is_identity()).cloned().collect();
    if gens.is_empty() {
        return Bsgs {
            base,
            strong_gens: vec![],
        };
    }

    // No generator may fix the whole base
    for gen in &gens {
        if base.iter().all(|&b| gen.image(b) == b) {
            if let Some(point) = gen.smallest_moved_point() {
                base.push(point);
            }
        }
    }

    let mut levels = distribute_gens_by_base(&base, &gens);
    let mut transversals: Vec<Transversal> = base
        .iter()
        .zip(&levels)
        .map(|(&point, level_gens)| Transversal::breadth_first(degree, level_gens, point))
        .collect();

    // Levels below `pending` still need to be checked
    let mut pending = base.len();
    while pending > 0 {
        let level = pending - 1;
        match find_non_member(level, &base, &levels, &transversals) {
            None => pending -= 1,
            Some((residue, depth)) => {
                if depth == base.len() {
                    // The residue fixes every base point, so it yields a new one
                    let point = residue
                        .smallest_moved_point()
                        .unwrap_or_else(|| unreachable!("non-members are not the identity"));
                    trace!("incremental schreier-sims: new base point {}", point);
                    base.push(point);
                    levels.push(vec![]);
                    transversals.push(Transversal::breadth_first(degree, &[], point));
                }
                for l in level + 1..=depth {
                    levels[l].push(residue.clone());
                    transversals[l] = Transversal::breadth_first(degree, &levels[l], base[l]);
                }
                pending = depth + 1;
            }
        }
    }

    let strong_gens = strong_gens_from_distr(&levels);
    debug!(
        "incremental schreier-sims: base {:?}, {} strong generators",
        base,
        strong_gens.len()
    );
    Bsgs { base, strong_gens }
}

/// Search a level for a Schreier generator that does not sift through the chain.
///
/// Returns the residue and the depth at which sifting stopped.
fn find_non_member(
    level: usize,
    base: &[El],
    levels: &[Vec<Perm>],
    transversals: &[Transversal],
) -> Option<(Perm, usize)> {
    let transversal = &transversals[level];
    for (beta, u_beta) in transversal.iter() {
        for gen in &levels[level] {
            let u_gamma = transversal.get(gen.image(beta))?;
            let moved = gen.left_apply(u_beta.clone());
            if moved == *u_gamma {
                continue;
            }
            let mut schreier = moved;
            u_gamma.inverse().left_apply_to(&mut schreier);

            let sift = strip(&schreier, base, transversals);
            if sift.level < base.len() || !sift.residue.is_identity() {
                return Some((sift.residue, sift.level));
            }
        }
    }
    None
}

impl PermGroup {
    /// Base and strong generating set computed by incremental Schreier-Sims.
    pub fn schreier_sims_incremental(&self) -> Bsgs {
        schreier_sims_incremental(self.degree(), vec![], self.generators())
    }

    /// Extend a partial base and a generating set of this group to a BSGS.
    ///
    /// `gens` must generate this group.
    pub fn schreier_sims_incremental_from(&self, base: &[El], gens: &[Perm]) -> Bsgs {
        schreier_sims_incremental(self.degree(), base.to_vec(), gens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use num_bigint::BigUint;
    use proptest::prelude::*;

    use crate::chain::StabilizerChain;
    use crate::test_groups::*;

    fn chain_order(degree: usize, bsgs: &Bsgs) -> BigUint {
        StabilizerChain::from_bsgs(degree, bsgs).order().clone()
    }

    #[test]
    fn extends_given_base() {
        let group = symmetric(5);
        let bsgs = group.schreier_sims_incremental_from(&[4, 2], group.generators());
        assert_eq!(&bsgs.base[..2], &[4, 2]);
        assert_eq!(chain_order(5, &bsgs), BigUint::from(120u32));
        for gen in &bsgs.strong_gens {
            assert!(bsgs.base.iter().any(|&b| gen.image(b) != b));
        }
    }

    #[test]
    fn trivial_generators() {
        let bsgs = schreier_sims_incremental(3, vec![1], &[Perm::identity(3)]);
        assert_eq!(bsgs.base, vec![1]);
        assert!(bsgs.strong_gens.is_empty());
    }

    #[test]
    fn alternating_group() {
        let group = alternating(6);
        let bsgs = group.schreier_sims_incremental();
        assert_eq!(chain_order(6, &bsgs), BigUint::from(360u32));
    }

    proptest! {
        #[test]
        fn matches_deterministic_order(group in small_group()) {
            let bsgs = group.schreier_sims_incremental();
            prop_assert_eq!(&chain_order(group.degree(), &bsgs), group.order());
            // Every element of the group sifts through the incremental chain
            let chain = StabilizerChain::from_bsgs(group.degree(), &bsgs);
            for g in brute_force_elements(group.degree(), group.generators()) {
                prop_assert!(chain.strip(&g).is_member(chain.base().len()));
            }
        }
    }
}
