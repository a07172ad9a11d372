//! Product replacement.
//!
//! Random group elements are produced by repeatedly replacing one entry of a working list of
//! generators with its product with another entry (or that entry's inverse) and multiplying the
//! result into an accumulator. After a burn-in phase the accumulator is close to uniformly
//! distributed.
//!
//! All randomness comes from a caller supplied [`Rng`], so seeding it (e.g. with
//! `SmallRng::seed_from_u64`) makes every sample reproducible. [`ProductReplacement::step_with`]
//! accepts fully precomputed choices.
use rand::Rng;

use crate::action::{LeftAction, RightAction};
use crate::group::PermGroup;
use crate::perm::Perm;

/// Parameters of the product replacement sampler.
#[derive(Clone, Debug)]
pub struct ProductReplacementConfig {
    /// Size of the working list of generators. Generators are repeated to fill it.
    pub gen_count: usize,
    /// Number of steps performed before the first sample.
    pub iterations: usize,
}

impl Default for ProductReplacementConfig {
    fn default() -> Self {
        Self {
            gen_count: 11,
            iterations: 50,
        }
    }
}

/// Which side the replaced entry and the accumulator are multiplied on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The random choices of a single product replacement step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplacementChoice {
    /// Index of the entry that gets replaced.
    pub target: usize,
    /// Index of the entry it is multiplied with, distinct from `target`.
    pub source: usize,
    pub side: Side,
    /// Whether the source entry is inverted before multiplying.
    pub inverse: bool,
}

/// State of the product replacement algorithm.
#[derive(Clone, Debug)]
pub struct ProductReplacement {
    gens: Vec<Perm>,
    accumulator: Perm,
    scratch: Vec<crate::El>,
}

impl ProductReplacement {
    /// Set up the working list without any burn-in.
    ///
    /// The list holds at least two entries; generators are repeated cyclically to fill it.
    pub fn new(degree: usize, generators: &[Perm], gen_count: usize) -> ProductReplacement {
        let len = gen_count.max(generators.len()).max(2);
        let gens = if generators.is_empty() {
            vec![Perm::identity(degree); len]
        } else {
            generators.iter().cycle().take(len).cloned().collect()
        };
        ProductReplacement {
            gens,
            accumulator: Perm::identity(degree),
            scratch: vec![],
        }
    }

    /// Set up the working list and perform the configured number of burn-in steps.
    pub fn with_burn_in<R>(
        degree: usize,
        generators: &[Perm],
        config: &ProductReplacementConfig,
        rng: &mut R,
    ) -> ProductReplacement
    where
        R: Rng + ?Sized,
    {
        let mut sampler = ProductReplacement::new(degree, generators, config.gen_count);
        for _ in 0..config.iterations {
            sampler.step(rng);
        }
        sampler
    }

    /// The current working list of generators.
    pub fn working_gens(&self) -> &[Perm] {
        &self.gens
    }

    /// Draw the choices for one step.
    pub fn random_choice<R>(&self, rng: &mut R) -> ReplacementChoice
    where
        R: Rng + ?Sized,
    {
        let len = self.gens.len();
        let target = rng.gen_range(0..len);
        let mut source = rng.gen_range(0..len - 1);
        if source == target {
            source = len - 1;
        }
        let side = if rng.gen::<bool>() {
            Side::Right
        } else {
            Side::Left
        };
        ReplacementChoice {
            target,
            source,
            side,
            inverse: rng.gen::<bool>(),
        }
    }

    /// Perform one step with the given choices and return the new accumulator.
    ///
    /// Panics when the indices are out of range or equal.
    pub fn step_with(&mut self, choice: ReplacementChoice) -> &Perm {
        assert_ne!(choice.target, choice.source);
        let factor = if choice.inverse {
            self.gens[choice.source].inverse()
        } else {
            self.gens[choice.source].clone()
        };
        let replaced = &mut self.gens[choice.target];
        match choice.side {
            Side::Right => {
                factor.right_apply_to_with_scratch(replaced, &mut self.scratch);
                replaced.right_apply_to_with_scratch(&mut self.accumulator, &mut self.scratch);
            }
            Side::Left => {
                factor.left_apply_to(replaced);
                replaced.left_apply_to(&mut self.accumulator);
            }
        }
        &self.accumulator
    }

    /// Perform one random step and return the new accumulator.
    pub fn step<R>(&mut self, rng: &mut R) -> &Perm
    where
        R: Rng + ?Sized,
    {
        let choice = self.random_choice(rng);
        self.step_with(choice)
    }

    /// A random element of the group.
    pub fn next_element<R>(&mut self, rng: &mut R) -> Perm
    where
        R: Rng + ?Sized,
    {
        self.step(rng).clone()
    }
}

impl PermGroup {
    /// A product replacement sampler for this group, after burn-in.
    pub fn random_pr<R>(&self, config: &ProductReplacementConfig, rng: &mut R) -> ProductReplacement
    where
        R: Rng + ?Sized,
    {
        ProductReplacement::with_burn_in(self.degree(), self.generators(), config, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::test_groups::*;

    #[test]
    fn precomputed_steps() {
        let a = perm(&[1, 0, 2]);
        let b = perm(&[0, 2, 1]);
        let mut sampler = ProductReplacement::new(3, &[a.clone(), b.clone()], 2);

        let acc = sampler
            .step_with(ReplacementChoice {
                target: 0,
                source: 1,
                side: Side::Right,
                inverse: false,
            })
            .clone();
        assert_eq!(sampler.working_gens()[0], &a * &b);
        assert_eq!(acc, &a * &b);

        let acc = sampler
            .step_with(ReplacementChoice {
                target: 1,
                source: 0,
                side: Side::Left,
                inverse: true,
            })
            .clone();
        let replaced = &(&a * &b).inverse() * &b;
        assert_eq!(sampler.working_gens()[1], replaced);
        assert_eq!(acc, &replaced * &(&a * &b));
    }

    #[test]
    fn working_list_is_padded() {
        let sampler = ProductReplacement::new(4, &[perm(&[1, 0, 2, 3])], 11);
        assert_eq!(sampler.working_gens().len(), 11);
        let sampler = ProductReplacement::new(4, &[perm(&[1, 0, 2, 3])], 0);
        assert_eq!(sampler.working_gens().len(), 2);
    }

    #[test]
    fn samples_stay_in_group() {
        let group = dihedral(8);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut sampler = group.random_pr(&ProductReplacementConfig::default(), &mut rng);
        let elements = brute_force_elements(8, group.generators());
        for _ in 0..100 {
            assert!(elements.contains(&sampler.next_element(&mut rng)));
        }
    }

    #[test]
    fn choices_are_distinct_indices() {
        let sampler = ProductReplacement::new(5, &symmetric(5).generators().to_vec(), 11);
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1000 {
            let choice = sampler.random_choice(&mut rng);
            assert_ne!(choice.target, choice.source);
            assert!(choice.source < 11 && choice.target < 11);
        }
    }

    #[test]
    fn seeded_samplers_agree() {
        let group = symmetric(6);
        let config = ProductReplacementConfig::default();
        let mut first = SmallRng::seed_from_u64(42);
        let mut second = SmallRng::seed_from_u64(42);
        let mut a = group.random_pr(&config, &mut first);
        let mut b = group.random_pr(&config, &mut second);
        for _ in 0..10 {
            assert_eq!(a.next_element(&mut first), b.next_element(&mut second));
        }
    }
}
