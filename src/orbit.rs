//! Orbits, stabilizers and Schreier vectors.
use std::hash::Hash;

use ahash::AHashSet;
use rand::Rng;

use crate::action::LeftAction;
use crate::chain::Transversal;
use crate::group::PermGroup;
use crate::perm::Perm;
use crate::random::ProductReplacement;
use crate::schreier_sims::schreier_generators;
use crate::El;

/// What to compute the orbit of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitSeed<'a> {
    /// A single point.
    Point(El),
    /// The union of the orbits of several points.
    Union(&'a [El]),
    /// An ordered tuple of points, acted on pointwise.
    Tuple(&'a [El]),
    /// An unordered set of points. Duplicates are ignored.
    Set(&'a [El]),
}

/// An orbit in the shape matching its [`OrbitSeed`].
///
/// Elements are listed in the order they were discovered, starting with the seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Orbit {
    Points(Vec<El>),
    Tuples(Vec<Vec<El>>),
    /// Sets are represented as sorted vectors.
    Sets(Vec<Vec<El>>),
}

impl Orbit {
    pub fn len(&self) -> usize {
        match self {
            Orbit::Points(points) => points.len(),
            Orbit::Tuples(tuples) => tuples.len(),
            Orbit::Sets(sets) => sets.len(),
        }
    }

    /// Orbits always contain their seed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One entry of a Schreier vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchreierEntry {
    /// The root point of the orbit.
    Root,
    /// The point was first reached by applying the generator with this index.
    Gen(usize),
}

/// Closure of `seeds` under the generators, in breadth first order.
fn closure<T, F>(seeds: Vec<T>, gens: &[Perm], mut act: F) -> Vec<T>
where
    T: Clone + Eq + Hash,
    F: FnMut(&Perm, &T) -> T,
{
    let mut seen: AHashSet<T> = AHashSet::default();
    let mut orbit = vec![];
    for seed in seeds {
        if seen.insert(seed.clone()) {
            orbit.push(seed);
        }
    }
    let mut pos = 0;
    while pos < orbit.len() {
        for gen in gens {
            let image = act(gen, &orbit[pos]);
            if seen.insert(image.clone()) {
                orbit.push(image);
            }
        }
        pos += 1;
    }
    orbit
}

/// Orbit of the given points under the generators, in breadth first order.
///
/// Panics when a point is outside `0..degree`.
pub fn orbit_of_points(degree: usize, gens: &[Perm], points: &[El]) -> Vec<El> {
    let mut seen = vec![false; degree];
    let mut orbit = vec![];
    for &point in points {
        assert!((point as usize) < degree, "point {} out of range", point);
        if !seen[point as usize] {
            seen[point as usize] = true;
            orbit.push(point);
        }
    }
    let mut pos = 0;
    while pos < orbit.len() {
        for gen in gens {
            let image = gen.image(orbit[pos]);
            if !seen[image as usize] {
                seen[image as usize] = true;
                orbit.push(image);
            }
        }
        pos += 1;
    }
    orbit
}

/// All orbits, each starting at its smallest point, ordered by that point.
pub fn orbits(degree: usize, gens: &[Perm]) -> Vec<Vec<El>> {
    let mut seen = vec![false; degree];
    let mut result = vec![];
    for point in 0..degree as El {
        if seen[point as usize] {
            continue;
        }
        let orbit = orbit_of_points(degree, gens, &[point]);
        for &beta in &orbit {
            seen[beta as usize] = true;
        }
        result.push(orbit);
    }
    result
}

/// Generators of the stabilizer of `alpha`, obtained from Schreier's lemma without filtering.
///
/// Identities and duplicates are dropped.
pub fn stabilizer_gens(degree: usize, gens: &[Perm], alpha: El) -> Vec<Perm> {
    let tree = Transversal::breadth_first(degree, gens, alpha);
    let mut seen = AHashSet::default();
    schreier_generators(&tree, gens)
        .into_iter()
        .filter(|gen| !gen.is_identity() && seen.insert(gen.clone()))
        .collect()
}

impl PermGroup {
    /// Orbit of a point.
    pub fn orbit(&self, alpha: El) -> Vec<El> {
        orbit_of_points(self.degree(), self.generators(), &[alpha])
    }

    /// Orbit of a point, a union of points, a tuple or a set.
    pub fn orbit_of(&self, seed: OrbitSeed) -> Orbit {
        let gens = self.generators();
        match seed {
            OrbitSeed::Point(alpha) => Orbit::Points(self.orbit(alpha)),
            OrbitSeed::Union(points) => {
                Orbit::Points(orbit_of_points(self.degree(), gens, points))
            }
            OrbitSeed::Tuple(tuple) => {
                self.check_points(tuple);
                Orbit::Tuples(closure(vec![tuple.to_vec()], gens, |gen, tuple| {
                    let mut image = tuple.clone();
                    gen.left_apply_to(&mut image[..]);
                    image
                }))
            }
            OrbitSeed::Set(set) => {
                self.check_points(set);
                let mut seed = set.to_vec();
                seed.sort_unstable();
                seed.dedup();
                Orbit::Sets(closure(vec![seed], gens, |gen, set| {
                    let mut image = set.clone();
                    gen.left_apply_to(&mut image[..]);
                    image.sort_unstable();
                    image
                }))
            }
        }
    }

    fn check_points(&self, points: &[El]) {
        for &point in points {
            assert!((point as usize) < self.degree(), "point {} out of range", point);
        }
    }

    /// Orbit of `alpha` with a representative for every point, found by breadth first search.
    pub fn orbit_transversal(&self, alpha: El) -> Transversal {
        Transversal::breadth_first(self.degree(), self.generators(), alpha)
    }

    /// All orbits, see [`orbits`].
    pub fn orbits(&self) -> Vec<Vec<El>> {
        orbits(self.degree(), self.generators())
    }

    /// Whether the group has a single orbit.
    ///
    /// Computed on first use.
    pub fn is_transitive(&self) -> bool {
        *self
            .transitive
            .get_or_init(|| self.degree() == 0 || self.orbit(0).len() == self.degree())
    }

    /// The stabilizer of a point.
    pub fn stabilizer(&self, alpha: El) -> PermGroup {
        PermGroup::generated_by(
            self.degree(),
            stabilizer_gens(self.degree(), self.generators(), alpha),
        )
    }

    /// For every point of the orbit of `alpha`, the generator that first reached it.
    ///
    /// Points outside the orbit have no entry.
    pub fn schreier_vector(&self, alpha: El) -> Vec<Option<SchreierEntry>> {
        let degree = self.degree();
        assert!((alpha as usize) < degree, "point {} out of range", alpha);
        let mut vector = vec![None; degree];
        vector[alpha as usize] = Some(SchreierEntry::Root);
        let mut orbit = vec![alpha];
        let mut pos = 0;
        while pos < orbit.len() {
            for (k, gen) in self.generators().iter().enumerate() {
                let image = gen.image(orbit[pos]);
                if vector[image as usize].is_none() {
                    vector[image as usize] = Some(SchreierEntry::Gen(k));
                    orbit.push(image);
                }
            }
            pos += 1;
        }
        vector
    }

    /// An element mapping `alpha` to `beta`, or None if `beta` is not in the orbit of `alpha`.
    ///
    /// The element is read off a Schreier vector for `alpha`, which is computed when not given.
    pub fn orbit_rep(
        &self,
        alpha: El,
        beta: El,
        vector: Option<&[Option<SchreierEntry>]>,
    ) -> Option<Perm> {
        let computed;
        let vector = match vector {
            Some(vector) => vector,
            None => {
                computed = self.schreier_vector(alpha);
                &computed
            }
        };

        let mut rep = Perm::identity(self.degree());
        let mut point = beta;
        loop {
            match vector.get(point as usize).copied().flatten()? {
                SchreierEntry::Root => return Some(rep),
                SchreierEntry::Gen(k) => {
                    let gen = &self.generators()[k];
                    rep = &rep * gen;
                    point = gen.inverse().image(point);
                }
            }
        }
    }

    /// A random element of the stabilizer of `alpha`.
    ///
    /// A random group element r from `sampler` is corrected by the inverse of the orbit
    /// representative of r(α). The result is uniform when r is. Panics when `sampler` produces
    /// elements outside this group.
    pub fn random_stab<R>(
        &self,
        alpha: El,
        vector: Option<&[Option<SchreierEntry>]>,
        sampler: &mut ProductReplacement,
        rng: &mut R,
    ) -> Perm
    where
        R: Rng + ?Sized,
    {
        let random = sampler.next_element(rng);
        let beta = random.image(alpha);
        match self.orbit_rep(alpha, beta, vector) {
            Some(rep) => &rep.inverse() * &random,
            None => panic!("sampled element maps {} outside its orbit", alpha),
        }
    }

    /// The largest k such that the group acts transitively on k-tuples of distinct points.
    pub fn transitivity_degree(&self) -> usize {
        let n = self.degree();
        let mut expected: usize = 1;
        for k in 1..=n {
            expected = expected.saturating_mul(n + 1 - k);
            let tuple: Vec<El> = (0..k as El).collect();
            if self.orbit_of(OrbitSeed::Tuple(&tuple)).len() != expected {
                return k - 1;
            }
        }
        n
    }
}
