//! Block systems.
//!
//! A block system is a partition of the points that the group permutes as a whole. Minimal block
//! systems containing a given set of points in one block are found with Atkinson's algorithm on a
//! union-find forest.
use rand::Rng;

use crate::group::PermGroup;
use crate::random::ProductReplacementConfig;
use crate::El;

/// Disjoint sets of points with path compression and union by size.
#[derive(Clone, Debug)]
struct UnionFind {
    parents: Vec<El>,
    sizes: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> UnionFind {
        UnionFind {
            parents: (0..len as El).collect(),
            sizes: vec![1; len],
        }
    }

    fn find(&mut self, el: El) -> El {
        let mut root = el;
        while self.parents[root as usize] != root {
            root = self.parents[root as usize];
        }
        let mut current = el;
        while current != root {
            let next = self.parents[current as usize];
            self.parents[current as usize] = root;
            current = next;
        }
        root
    }

    /// Merge the classes of `a` and `b`.
    ///
    /// Returns the representative that stopped being one, or None when `a` and `b` were already in
    /// the same class.
    fn union(&mut self, a: El, b: El) -> Option<El> {
        let (mut root, mut child) = (self.find(a), self.find(b));
        if root == child {
            return None;
        }
        if self.sizes[root as usize] < self.sizes[child as usize] {
            std::mem::swap(&mut root, &mut child);
        }
        self.parents[child as usize] = root;
        self.sizes[root as usize] += self.sizes[child as usize];
        Some(child)
    }

    fn size(&mut self, el: El) -> usize {
        let root = self.find(el);
        self.sizes[root as usize]
    }
}

/// A partition of the points into blocks of equal size.
///
/// Every point is mapped to the smallest point of its block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockSystem {
    representatives: Vec<El>,
}

impl BlockSystem {
    /// The system with a single block containing every point.
    pub fn single_block(degree: usize) -> BlockSystem {
        BlockSystem {
            representatives: vec![0; degree],
        }
    }

    fn from_union_find(mut classes: UnionFind) -> BlockSystem {
        let degree = classes.parents.len();
        let mut smallest = vec![El::MAX; degree];
        let mut roots = Vec::with_capacity(degree);
        for point in 0..degree as El {
            let root = classes.find(point);
            let slot = &mut smallest[root as usize];
            *slot = (*slot).min(point);
            roots.push(root);
        }
        BlockSystem {
            representatives: roots.into_iter().map(|root| smallest[root as usize]).collect(),
        }
    }

    /// The smallest point of each point's block.
    pub fn representatives(&self) -> &[El] {
        &self.representatives
    }

    /// The smallest point of the block containing `point`.
    pub fn representative(&self, point: El) -> El {
        self.representatives[point as usize]
    }

    /// Whether all points lie in one block.
    pub fn is_single_block(&self) -> bool {
        self.representatives.iter().all(|&rep| rep == 0)
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.representatives
            .iter()
            .enumerate()
            .filter(|&(point, &rep)| point == rep as usize)
            .count()
    }

    pub fn block_size(&self) -> usize {
        match self.block_count() {
            0 => 0,
            count => self.representatives.len() / count,
        }
    }

    /// The blocks, each sorted, ordered by their smallest point.
    pub fn blocks(&self) -> Vec<Vec<El>> {
        let mut blocks: Vec<Vec<El>> = vec![];
        let mut index = vec![usize::MAX; self.representatives.len()];
        for (point, &rep) in self.representatives.iter().enumerate() {
            if index[rep as usize] == usize::MAX {
                index[rep as usize] = blocks.len();
                blocks.push(vec![]);
            }
            blocks[index[rep as usize]].push(point as El);
        }
        blocks
    }
}

/// The largest proper divisor of `n`, or 1 when `n` is prime or at most 1.
pub fn max_div(n: usize) -> usize {
    (2..)
        .take_while(|d| d * d <= n)
        .find(|d| n % d == 0)
        .map_or(1, |d| n / d)
}

impl PermGroup {
    /// Largest proper divisor of the degree, the largest possible size of a nontrivial block.
    pub fn max_div(&self) -> usize {
        max_div(self.degree())
    }

    /// The finest block system in which all of `points` lie in the same block.
    ///
    /// Returns None for intransitive groups. When no proper block contains the points, the
    /// single block system is returned.
    pub fn minimal_block(&self, points: &[El]) -> Option<BlockSystem> {
        if !self.is_transitive() {
            return None;
        }
        let degree = self.degree();
        let limit = self.max_div();

        let mut seed = points.to_vec();
        seed.sort_unstable();
        seed.dedup();
        for &point in &seed {
            assert!((point as usize) < degree, "point {} out of range", point);
        }
        if seed.len() > limit {
            return Some(BlockSystem::single_block(degree));
        }

        let mut classes = UnionFind::new(degree);
        let mut queue = vec![];
        for pair in seed.windows(2) {
            if let Some(merged) = classes.union(pair[0], pair[1]) {
                queue.push(merged);
            }
        }

        // Each queued point was merged into a class; its images must be merged with the images
        // of its representative.
        let mut pos = 0;
        while pos < queue.len() {
            let gamma = queue[pos];
            pos += 1;
            for gen in self.generators() {
                let delta = classes.find(gamma);
                if let Some(merged) = classes.union(gen.image(gamma), gen.image(delta)) {
                    if classes.size(merged) > limit {
                        return Some(BlockSystem::single_block(degree));
                    }
                    queue.push(merged);
                }
            }
        }

        Some(BlockSystem::from_union_find(classes))
    }

    /// Whether the group has no block system other than singletons and the single block.
    ///
    /// Blocks are searched for through orbit representatives of the stabilizer of 0. With
    /// `randomized`, the stabilizer is replaced by a subgroup generated by random stabilizer
    /// elements, which can only refine its orbits, so the answer is exact either way.
    ///
    /// Computed on first use.
    pub fn is_primitive<R>(&self, randomized: bool, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        *self
            .primitive
            .get_or_init(|| self.search_primitive(randomized, rng))
    }

    fn search_primitive<R>(&self, randomized: bool, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        if !self.is_transitive() {
            return false;
        }
        if self.degree() <= 1 {
            return true;
        }

        let stab = if randomized {
            let vector = self.schreier_vector(0);
            let mut sampler = self.random_pr(&ProductReplacementConfig::default(), rng);
            let gens: Vec<_> = (0..self.generators().len())
                .map(|_| self.random_stab(0, Some(&vector[..]), &mut sampler, rng))
                .collect();
            PermGroup::generated_by(self.degree(), gens)
        } else {
            self.stabilizer(0)
        };

        stab.orbits().iter().all(|orbit| {
            let x = orbit[0];
            x == 0
                || self
                    .minimal_block(&[0, x])
                    .map_or(true, |system| system.is_single_block())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::test_groups::*;

    #[test]
    fn largest_proper_divisors() {
        let divs: Vec<usize> = (0..13).map(max_div).collect();
        assert_eq!(divs, vec![1, 1, 1, 1, 2, 1, 3, 1, 4, 3, 5, 1, 6]);
    }

    #[test]
    fn union_find_tracks_sizes() {
        let mut classes = UnionFind::new(6);
        assert_eq!(classes.union(0, 1), Some(1));
        assert_eq!(classes.union(2, 1), Some(2));
        assert_eq!(classes.union(0, 2), None);
        assert_eq!(classes.size(2), 3);
        assert_eq!(classes.find(2), classes.find(0));
        assert_eq!(classes.size(5), 1);
    }

    #[test]
    fn hexagon_blocks() {
        let d6 = dihedral(6);
        let antipodal = d6.minimal_block(&[0, 3]).unwrap();
        assert_eq!(antipodal.representatives(), &[0, 1, 2, 0, 1, 2]);
        assert_eq!(antipodal.blocks(), vec![vec![0, 3], vec![1, 4], vec![2, 5]]);

        let triangles = d6.minimal_block(&[0, 2]).unwrap();
        assert_eq!(triangles.blocks(), vec![vec![0, 2, 4], vec![1, 3, 5]]);
        assert_eq!(triangles.block_size(), 3);

        let whole = d6.minimal_block(&[0, 5]).unwrap();
        assert!(whole.is_single_block());
        assert_eq!(whole.block_count(), 1);

        let mut rng = SmallRng::seed_from_u64(0);
        assert!(!d6.clone().is_primitive(true, &mut rng));
        assert!(!d6.is_primitive(false, &mut rng));
        assert_eq!(d6.primitive.get(), Some(&false));
    }

    #[test]
    fn primitivity_is_memoized() {
        let s5 = symmetric(5);
        assert_eq!(s5.primitive.get(), None);
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(s5.is_primitive(true, &mut rng));
        assert_eq!(s5.primitive.get(), Some(&true));
        assert!(s5.is_primitive(false, &mut rng));
    }

    #[test]
    fn decagon_antipodal_pairs() {
        let d10 = dihedral(10);
        let system = d10.minimal_block(&[0, 5]).unwrap();
        assert_eq!(system.block_size(), 2);
        assert_eq!(system.block_count(), 5);
        assert!(!system.is_single_block());
    }

    #[test]
    fn intransitive_groups_have_no_blocks() {
        let group = PermGroup::new(vec![cycles(4, &[&[0, 1]])]).unwrap();
        assert_eq!(group.minimal_block(&[0, 1]), None);
        assert!(!group.is_primitive(false, &mut SmallRng::seed_from_u64(0)));
    }

    #[test]
    fn primitive_groups() {
        let mut rng = SmallRng::seed_from_u64(9);
        for group in [symmetric(5), alternating(6), dihedral(7), cyclic(5)] {
            assert!(group.clone().is_primitive(true, &mut rng));
            assert!(group.is_primitive(false, &mut rng));
        }
        assert!(!cyclic(4).is_primitive(false, &mut rng));
        assert!(!symmetric(2).stabilizer(0).is_primitive(false, &mut rng));
        assert!(PermGroup::trivial(1).is_primitive(false, &mut rng));
    }

    proptest! {
        #[test]
        fn blocks_are_permuted(group in small_group(), x in 0..6u32) {
            prop_assume!(group.is_transitive());
            let x = x % group.degree() as El;
            let system = group.minimal_block(&[0, x]).unwrap();
            let size = system.block_size();
            prop_assert_eq!(group.degree() % size, 0);
            prop_assert_eq!(system.representative(x), system.representative(0));
            for block in system.blocks() {
                prop_assert_eq!(block.len(), size);
                for gen in group.generators() {
                    let image_rep = system.representative(gen.image(block[0]));
                    for &point in &block {
                        prop_assert_eq!(system.representative(gen.image(point)), image_rep);
                    }
                }
            }
        }
    }
}
