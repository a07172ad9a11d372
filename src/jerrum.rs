//! Jerrum's filter.
//!
//! Schreier's lemma produces up to |orbit| * |gens| generators per chain level, most of them
//! redundant. Jerrum's filter reduces any generating set of a group fixing the points below α to
//! at most n - 1 generators by maintaining an acyclic labelled graph on the points.
//!
//! Every edge {i, j} with i < j carries a label g with g(i) = j and g(k) = k for all k < i. When
//! inserting an element would close a cycle, the labels around the cycle are multiplied into an
//! element fixing the cycle's smallest vertex, which replaces the cycle's first edge and is
//! inserted in turn. The smallest moved point of inserted elements only grows, so this terminates.
use ahash::AHashMap;
use itertools::Itertools;
use log::trace;

use crate::perm::Perm;
use crate::El;

/// The acyclic labelled graph of Jerrum's filter.
#[derive(Clone, Debug)]
pub struct JerrumGraph {
    degree: usize,
    adjacency: Vec<Vec<El>>,
    labels: AHashMap<(El, El), Perm>,
}

impl JerrumGraph {
    /// Empty graph on `degree` vertices.
    pub fn new(degree: usize) -> JerrumGraph {
        JerrumGraph {
            degree,
            adjacency: vec![vec![]; degree],
            labels: AHashMap::default(),
        }
    }

    pub fn clear(&mut self) {
        for neighbors in self.adjacency.iter_mut() {
            neighbors.clear();
        }
        self.labels.clear();
    }

    /// Number of edges, which is also the number of retained generators.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Insert an element fixing every point below `alpha`.
    pub fn insert(&mut self, perm: Perm, alpha: El) {
        let mut pending = Some(perm);

        while let Some(g) = pending.take() {
            let i = match g.smallest_moved_point_from(alpha) {
                Some(i) => i,
                None => continue,
            };
            let j = g.image(i);

            if let Some(existing) = self.labels.get_mut(&(i, j)) {
                if *existing != g {
                    let quotient = &g.inverse() * &*existing;
                    *existing = g;
                    pending = Some(quotient);
                }
                continue;
            }

            // The graph is a forest, so a cycle appears exactly when i and j are already
            // connected.
            let path = self.find_path(j, i);
            self.add_edge(i, j, g);

            if let Some(path) = path {
                // Closed walk i, j, ..., i
                let mut cycle = Vec::with_capacity(path.len() + 1);
                cycle.push(i);
                cycle.extend(path);
                let edges = cycle.len() - 1;

                let start = (0..edges).min_by_key(|&pos| cycle[pos]).unwrap_or(0);
                let mut product = Perm::identity(self.degree);
                for step in 0..edges {
                    let from = cycle[(start + step) % edges];
                    let to = cycle[(start + step + 1) % edges];
                    product = &self.transition(from, to) * &product;
                }

                let first = cycle[start];
                let second = cycle[(start + 1) % edges];
                trace!(
                    "jerrum cycle of length {} through {}, removing edge {}-{}",
                    edges,
                    first,
                    first,
                    second
                );
                self.remove_edge(first, second);
                pending = Some(product);
            }
        }
    }

    /// Reset the graph, insert all given elements and return the surviving edge labels.
    pub fn filter<I>(&mut self, gens: I, alpha: El) -> Vec<Perm>
    where
        I: IntoIterator<Item = Perm>,
    {
        self.clear();
        for gen in gens {
            self.insert(gen, alpha);
        }
        self.generators()
    }

    /// The edge labels ordered by edge.
    pub fn generators(&self) -> Vec<Perm> {
        self.labels
            .iter()
            .sorted_by_key(|(&edge, _)| edge)
            .map(|(_, label)| label.clone())
            .collect()
    }

    fn add_edge(&mut self, i: El, j: El, label: Perm) {
        self.adjacency[i as usize].push(j);
        self.adjacency[j as usize].push(i);
        self.labels.insert((i, j), label);
    }

    fn remove_edge(&mut self, a: El, b: El) {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.adjacency[lo as usize].retain(|&v| v != hi);
        self.adjacency[hi as usize].retain(|&v| v != lo);
        self.labels.remove(&(lo, hi));
    }

    /// An element mapping `from` to its neighbor `to`.
    fn transition(&self, from: El, to: El) -> Perm {
        if from < to {
            self.labels[&(from, to)].clone()
        } else {
            self.labels[&(to, from)].inverse()
        }
    }

    /// The unique path between two vertices of the forest, including both endpoints.
    fn find_path(&self, from: El, to: El) -> Option<Vec<El>> {
        let mut parent: Vec<Option<El>> = vec![None; self.degree];
        parent[from as usize] = Some(from);
        let mut stack = vec![from];

        while let Some(v) = stack.pop() {
            if v == to {
                let mut path = vec![to];
                let mut current = to;
                while current != from {
                    current = parent[current as usize]?;
                    path.push(current);
                }
                path.reverse();
                return Some(path);
            }
            for &w in &self.adjacency[v as usize] {
                if parent[w as usize].is_none() {
                    parent[w as usize] = Some(v);
                    stack.push(w);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::chain::Transversal;
    use crate::schreier_sims::schreier_generators;
    use crate::test_groups::{brute_force_elements, perm, symmetric};

    #[test]
    fn duplicate_edge_is_relabelled() {
        let mut graph = JerrumGraph::new(4);
        let a = perm(&[1, 0, 2, 3]);
        let b = perm(&[1, 0, 3, 2]);
        graph.insert(a.clone(), 0);
        graph.insert(b.clone(), 0);
        // Both move 0 to 1, the quotient b⁻¹a = (2 3) becomes a second edge
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.generators(), vec![b, perm(&[0, 1, 3, 2])]);
    }

    #[test]
    fn triangle_is_broken() {
        let mut graph = JerrumGraph::new(3);
        let gens = graph.filter(
            vec![perm(&[1, 0, 2]), perm(&[0, 2, 1]), perm(&[2, 1, 0])],
            0,
        );
        assert!(gens.len() <= 2);
        let group = brute_force_elements(3, &gens);
        assert_eq!(group.len(), 6);
    }

    #[test]
    fn identity_is_discarded() {
        let mut graph = JerrumGraph::new(5);
        graph.insert(Perm::identity(5), 0);
        assert!(graph.is_empty());
    }

    proptest! {
        #[test]
        fn filtered_generators_preserve_group(n in 2..6usize, alpha in 0..2u32) {
            let group = symmetric(n);
            let gens = group.generators();
            let tree = Transversal::depth_first(n, gens, 0);
            let schreier = schreier_generators(&tree, gens);

            let mut graph = JerrumGraph::new(n);
            let filtered = graph.filter(schreier.clone(), 0);
            prop_assert!(filtered.len() <= n - 1);
            prop_assert_eq!(brute_force_elements(n, &filtered), brute_force_elements(n, &schreier));

            // Elements fixing the points below alpha stay within that stabilizer
            let fixing: Vec<Perm> = schreier
                .into_iter()
                .filter(|g| (0..alpha).all(|k| g.image(k) == k))
                .collect();
            for g in graph.filter(fixing, alpha) {
                prop_assert!((0..alpha).all(|k| g.image(k) == k));
            }
        }
    }
}
