//! Deterministic Schreier-Sims with Jerrum's filter.
//!
//! The chain is built for the points 0, 1, 2, ... in order. At each point α the orbit of α under
//! the current generators is explored with a Schreier tree, Schreier's lemma yields generators of
//! the point stabilizer and Jerrum's filter cuts them down to at most n - 1 before moving on to
//! α + 1. Points with a trivial orbit do not become base points.
use itertools::Itertools;
use log::debug;

use crate::action::LeftAction;
use crate::chain::{StabilizerChain, Transversal};
use crate::jerrum::JerrumGraph;
use crate::perm::Perm;

/// Schreier generators `u_{g(β)}⁻¹ * g * u_β` of the stabilizer of a transversal's root.
///
/// Orbit points are visited in increasing order and, for each, all generators in order.
pub fn schreier_generators(tree: &Transversal, gens: &[Perm]) -> Vec<Perm> {
    let mut inverses: Vec<Option<Perm>> = vec![None; tree.degree()];
    for (beta, rep) in tree.iter() {
        inverses[beta as usize] = Some(rep.inverse());
    }

    let mut result = Vec::with_capacity(tree.len() * gens.len());
    for &beta in tree.sorted_orbit() {
        let rep = match tree.get(beta) {
            Some(rep) => rep,
            None => continue,
        };
        for gen in gens {
            if let Some(back) = &inverses[gen.image(beta) as usize] {
                let mut schreier = gen.left_apply(rep.clone());
                back.left_apply_to(&mut schreier);
                result.push(schreier);
            }
        }
    }
    result
}

/// Compute a stabilizer chain of the group generated by `generators`.
pub fn schreier_sims(degree: usize, generators: &[Perm]) -> StabilizerChain {
    let initial: Vec<Perm> = generators
        .iter()
        .filter(|gen| !gen.is_identity())
        .unique()
        .cloned()
        .collect();

    if degree == 0 || initial.is_empty() {
        return StabilizerChain::trivial(degree);
    }

    let mut graph = JerrumGraph::new(degree);
    let mut gens = initial.clone();
    let mut base = vec![];
    let mut transversals = vec![];
    let mut stabilizer_gens = vec![];
    let mut alpha = 0;

    loop {
        let tree = Transversal::depth_first(degree, &gens, alpha);
        let filtered = graph.filter(schreier_generators(&tree, &gens), alpha);
        debug!(
            "schreier-sims at point {}: orbit size {}, {} generators after filtering",
            alpha,
            tree.len(),
            filtered.len()
        );

        if tree.len() > 1 {
            base.push(alpha);
            transversals.push(tree);
        }
        if filtered.is_empty() {
            break;
        }
        stabilizer_gens.extend(filtered.iter().cloned());
        gens = filtered;
        alpha += 1;
    }

    let stabilizer_gens: Vec<Perm> = stabilizer_gens.into_iter().unique().collect();
    let strong_gens = initial
        .into_iter()
        .chain(stabilizer_gens.iter().cloned())
        .unique()
        .collect();

    let chain = StabilizerChain::new(degree, base, strong_gens, transversals, stabilizer_gens);
    debug!(
        "stabilizer chain with base {:?} and order {}",
        chain.base(),
        chain.order()
    );
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    use num_bigint::BigUint;
    use proptest::prelude::*;

    use crate::chain::distribute_gens_by_base;
    use crate::group::PermGroup;
    use crate::test_groups::*;

    fn assert_strong(chain: &StabilizerChain) {
        let degree = chain.degree();
        let base = chain.base();
        for gen in chain.strong_gens() {
            assert!(base.iter().any(|&b| gen.image(b) != b));
        }
        let levels = distribute_gens_by_base(base, chain.strong_gens());
        for (i, transversal) in chain.transversals().iter().enumerate() {
            let orbit = Transversal::breadth_first(degree, &levels[i], base[i]);
            assert_eq!(orbit.sorted_orbit(), transversal.sorted_orbit());
        }
    }

    #[test]
    fn symmetric_three() {
        let a = perm(&[0, 2, 1]);
        let b = perm(&[1, 0, 2]);
        let chain = schreier_sims(3, &[a, b]);
        assert_eq!(chain.order(), &BigUint::from(6u32));
        assert_eq!(chain.base(), &[0, 1]);
        assert_eq!(chain.stabilizer_gens(), &[perm(&[0, 2, 1])]);
        assert_eq!(chain.basic_orbit_sizes(), vec![3, 2]);
        let reps: Vec<&[u32]> = chain.transversals()[0]
            .sorted_orbit()
            .iter()
            .map(|&beta| chain.transversals()[0].get(beta).unwrap().as_slice())
            .collect();
        assert_eq!(reps, vec![&[0, 1, 2][..], &[1, 0, 2], &[2, 0, 1]]);
        assert_strong(&chain);
    }

    #[test]
    fn known_orders() {
        let cases: Vec<(PermGroup, u64)> = vec![
            (symmetric(6), 720),
            (alternating(7), 2520),
            (dihedral(6), 12),
            (dihedral(10), 20),
            (cyclic(9), 9),
        ];
        for (group, order) in cases {
            let chain = schreier_sims(group.degree(), group.generators());
            assert_eq!(chain.order(), &BigUint::from(order));
            assert_strong(&chain);
        }
    }

    #[test]
    fn trivial_groups() {
        let chain = schreier_sims(4, &[Perm::identity(4)]);
        assert!(chain.base().is_empty());
        assert!(chain.strong_gens().is_empty());
        assert_eq!(chain.order(), &BigUint::from(1u32));
        assert_eq!(schreier_sims(0, &[]).order(), &BigUint::from(1u32));
    }

    #[test]
    fn fixed_points_are_skipped() {
        // Acts on {1, 2, 3} only
        let chain = schreier_sims(5, &[cycles(5, &[&[1, 2, 3]]), cycles(5, &[&[1, 2]])]);
        assert_eq!(chain.base(), &[1, 2]);
        assert_eq!(chain.order(), &BigUint::from(6u32));
    }

    proptest! {
        #[test]
        fn order_matches_brute_force(group in small_group()) {
            let chain = schreier_sims(group.degree(), group.generators());
            let elements = brute_force_elements(group.degree(), group.generators());
            prop_assert_eq!(chain.order(), &BigUint::from(elements.len()));
            assert_strong(&chain);
        }
    }
}
