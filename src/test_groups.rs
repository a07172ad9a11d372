//! Groups and helpers shared by the unit tests.
use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::group::PermGroup;
use crate::perm::Perm;
use crate::El;

pub fn perm(images: &[El]) -> Perm {
    Perm::from_vec(images.to_vec()).unwrap()
}

pub fn cycles(degree: usize, cycles: &[&[El]]) -> Perm {
    Perm::from_cycles(degree, cycles).unwrap()
}

fn full_cycle(points: std::ops::Range<El>, degree: usize) -> Perm {
    let points: Vec<El> = points.collect();
    cycles(degree, &[&points])
}

/// Symmetric group on n points, generated by an n-cycle and a transposition.
pub fn symmetric(n: usize) -> PermGroup {
    match n {
        0 | 1 => PermGroup::trivial(n),
        2 => PermGroup::new(vec![perm(&[1, 0])]).unwrap(),
        _ => PermGroup::new(vec![full_cycle(0..n as El, n), cycles(n, &[&[0, 1]])]).unwrap(),
    }
}

/// Cyclic group generated by an n-cycle.
pub fn cyclic(n: usize) -> PermGroup {
    PermGroup::new(vec![full_cycle(0..n as El, n)]).unwrap()
}

/// Symmetries of a regular n-gon, of order 2n.
pub fn dihedral(n: usize) -> PermGroup {
    assert!(n >= 3);
    let reflection: Vec<El> = (0..n as El).rev().collect();
    PermGroup::new(vec![full_cycle(0..n as El, n), perm(&reflection)]).unwrap()
}

/// Alternating group on n >= 3 points.
pub fn alternating(n: usize) -> PermGroup {
    assert!(n >= 3);
    let three_cycle = cycles(n, &[&[0, 1, 2]]);
    let long = if n % 2 == 1 {
        full_cycle(0..n as El, n)
    } else {
        full_cycle(1..n as El, n)
    };
    PermGroup::new(vec![three_cycle, long]).unwrap()
}

/// All elements generated by `gens`, found by closing under multiplication.
pub fn brute_force_elements(degree: usize, gens: &[Perm]) -> BTreeSet<Perm> {
    let mut elements = BTreeSet::new();
    let identity = Perm::identity(degree);
    elements.insert(identity.clone());
    let mut queue = vec![identity];
    while let Some(g) = queue.pop() {
        for gen in gens {
            let h = gen * &g;
            if elements.insert(h.clone()) {
                queue.push(h);
            }
        }
    }
    elements
}

/// Small groups generated by a few random permutations.
pub fn small_group() -> impl Strategy<Value = PermGroup> {
    (1..7u32)
        .prop_flat_map(|n| {
            let shuffled = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
            prop::collection::vec(shuffled, 1..4)
        })
        .prop_map(|gens| {
            PermGroup::new(gens.into_iter().map(|g| Perm::from_vec(g).unwrap()).collect())
                .unwrap()
        })
}
