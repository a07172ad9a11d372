//! Monte Carlo algorithms: randomized Schreier-Sims and the Alt/Sym test.
use log::{debug, warn};
use rand::Rng;

use crate::chain::{distribute_gens_by_base, strip, strong_gens_from_distr, Bsgs, Transversal};
use crate::group::PermGroup;
use crate::perm::Perm;
use crate::random::ProductReplacementConfig;
use crate::El;

/// Parameters of randomized Schreier-Sims.
#[derive(Clone, Debug)]
pub struct RandomSchreierSimsConfig {
    /// Number of consecutive random elements that must sift through the chain before it is
    /// accepted. The result fails to be a BSGS with probability at most `1 / consec_succ`.
    pub consec_succ: usize,
    /// Sampler used to draw random elements.
    pub product_replacement: ProductReplacementConfig,
    /// Optional upper bound on the number of sifted elements. When reached, the chain built so
    /// far is returned even if it is incomplete.
    pub max_sifts: Option<usize>,
}

impl Default for RandomSchreierSimsConfig {
    fn default() -> Self {
        Self {
            consec_succ: 10,
            product_replacement: ProductReplacementConfig::default(),
            max_sifts: None,
        }
    }
}

/// Randomized Schreier-Sims.
///
/// Random elements of the group generated by `gens` are drawn from `sample` and sifted through
/// the chain built so far. Elements that fail to sift extend the chain. The algorithm stops
/// after `consec_succ` consecutive elements sifted successfully.
pub fn schreier_sims_random<S>(
    degree: usize,
    mut base: Vec<El>,
    gens: &[Perm],
    config: &RandomSchreierSimsConfig,
    mut sample: S,
) -> Bsgs
where
    S: FnMut() -> Perm,
{
    for gen in gens {
        if base.iter().all(|&b| gen.image(b) == b) {
            if let Some(point) = gen.smallest_moved_point() {
                base.push(point);
            }
        }
    }

    let mut levels = distribute_gens_by_base(&base, gens);
    let mut transversals: Vec<Transversal> = base
        .iter()
        .zip(&levels)
        .map(|(&point, level_gens)| Transversal::breadth_first(degree, level_gens, point))
        .collect();

    let mut successes = 0;
    let mut sifts = 0;
    while successes < config.consec_succ {
        if config.max_sifts.map_or(false, |max| sifts >= max) {
            warn!(
                "randomized schreier-sims stopped after {} sifts with {} consecutive successes",
                sifts, successes
            );
            break;
        }
        sifts += 1;

        let sift = strip(&sample(), &base, &transversals);
        let mut depth = sift.level;
        if depth == base.len() {
            match sift.residue.smallest_moved_point() {
                None => {
                    successes += 1;
                    continue;
                }
                Some(point) => {
                    base.push(point);
                    levels.push(vec![]);
                    transversals.push(Transversal::breadth_first(degree, &[], point));
                    depth = base.len() - 1;
                }
            }
        }

        debug!(
            "randomized schreier-sims: element failed to sift at level {}",
            depth
        );
        // Level 0 already generates the whole group
        let first = if depth == 0 { 0 } else { 1 };
        for l in first..=depth {
            levels[l].push(sift.residue.clone());
            transversals[l] = Transversal::breadth_first(degree, &levels[l], base[l]);
        }
        successes = 0;
    }

    Bsgs {
        base,
        strong_gens: strong_gens_from_distr(&levels),
    }
}

/// Whether `n` is prime, by trial division.
fn is_prime(n: usize) -> bool {
    n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

/// Whether a permutation of n points has a cycle of prime length p with n/2 < p < n - 2.
///
/// By a theorem of Jordan, a primitive group containing such an element contains Alt(n).
fn has_large_prime_cycle(perm: &Perm) -> bool {
    let n = perm.degree();
    perm.cycles()
        .map(|cycle| cycle.count())
        .any(|len| len > n / 2 && len + 2 < n && is_prime(len))
}

impl PermGroup {
    /// Base and strong generating set computed by randomized Schreier-Sims.
    ///
    /// Random elements come from a product replacement sampler driven by `rng`.
    pub fn schreier_sims_random<R>(&self, config: &RandomSchreierSimsConfig, rng: &mut R) -> Bsgs
    where
        R: Rng + ?Sized,
    {
        let mut sampler = self.random_pr(&config.product_replacement, rng);
        schreier_sims_random(self.degree(), vec![], self.generators(), config, || {
            sampler.next_element(rng)
        })
    }

    /// Monte Carlo test whether this group is the alternating or symmetric group.
    ///
    /// A `true` answer is always correct. A `false` answer is wrong with probability at most
    /// `eps`. Groups of degree below 8 and intransitive groups always answer `false`.
    ///
    /// Panics unless `eps` is positive.
    pub fn is_alt_sym<R>(&self, eps: f64, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        assert!(eps > 0.0, "error bound {} must be positive", eps);
        let n = self.degree();
        if n < 8 || !self.is_transitive() {
            return false;
        }
        let c_n = if n < 17 { 0.34 } else { 0.57 };
        let d_n = c_n * std::f64::consts::LN_2 / (n as f64).ln();
        let samples = (-eps.ln() / d_n) as usize;

        let mut sampler = self.random_pr(&ProductReplacementConfig::default(), rng);
        (0..samples).any(|_| has_large_prime_cycle(&sampler.next_element(rng)))
    }

    /// [`is_alt_sym`][PermGroup::is_alt_sym] on precomputed group elements.
    pub fn is_alt_sym_with<I>(&self, samples: I) -> bool
    where
        I: IntoIterator<Item = Perm>,
    {
        self.degree() >= 8
            && self.is_transitive()
            && samples
                .into_iter()
                .any(|sample| has_large_prime_cycle(&sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use num_bigint::BigUint;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::chain::StabilizerChain;
    use crate::test_groups::*;

    fn strict_config() -> RandomSchreierSimsConfig {
        RandomSchreierSimsConfig {
            consec_succ: 40,
            ..RandomSchreierSimsConfig::default()
        }
    }

    #[test]
    fn primes() {
        let primes: Vec<usize> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn randomized_orders() {
        let mut rng = SmallRng::seed_from_u64(2024);
        for (group, order) in [
            (symmetric(7), 5040u32),
            (alternating(6), 360),
            (dihedral(9), 18),
        ] {
            let bsgs = group.schreier_sims_random(&strict_config(), &mut rng);
            let chain = StabilizerChain::from_bsgs(group.degree(), &bsgs);
            assert_eq!(chain.order(), &BigUint::from(order));
        }
    }

    #[test]
    fn precomputed_elements_extend_chain() {
        let group = symmetric(3);
        let elements: Vec<Perm> = brute_force_elements(3, group.generators()).into_iter().collect();
        let mut elements = elements.into_iter().cycle();
        let config = RandomSchreierSimsConfig {
            consec_succ: 6,
            ..RandomSchreierSimsConfig::default()
        };
        let bsgs = schreier_sims_random(3, vec![], group.generators(), &config, || {
            elements.next().unwrap()
        });
        let chain = StabilizerChain::from_bsgs(3, &bsgs);
        assert_eq!(chain.order(), &BigUint::from(6u32));
    }

    #[test]
    fn sift_ceiling_stops_early() {
        let group = symmetric(5);
        let config = RandomSchreierSimsConfig {
            max_sifts: Some(0),
            ..RandomSchreierSimsConfig::default()
        };
        let bsgs = schreier_sims_random(5, vec![], group.generators(), &config, || {
            Perm::identity(5)
        });
        assert_eq!(bsgs.base, vec![0]);
    }

    #[test]
    fn alt_sym_detection() {
        let mut rng = SmallRng::seed_from_u64(5);
        assert!(symmetric(9).is_alt_sym(1e-6, &mut rng));
        assert!(alternating(10).is_alt_sym(1e-6, &mut rng));
        assert!(!dihedral(10).is_alt_sym(1e-6, &mut rng));
        assert!(!symmetric(7).is_alt_sym(1e-6, &mut rng));

        let s8 = symmetric(8);
        assert!(s8.is_alt_sym_with(vec![cycles(8, &[&[0, 1, 2, 3, 4]])]));
        assert!(!s8.is_alt_sym_with(vec![cycles(8, &[&[0, 1, 2]])]));
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn alt_sym_rejects_zero_error_bound() {
        dihedral(10).is_alt_sym(0.0, &mut SmallRng::seed_from_u64(0));
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn alt_sym_rejects_nan_error_bound() {
        dihedral(10).is_alt_sym(f64::NAN, &mut SmallRng::seed_from_u64(0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn randomized_matches_deterministic(group in small_group(), seed in any::<u64>()) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let bsgs = group.schreier_sims_random(&strict_config(), &mut rng);
            let chain = StabilizerChain::from_bsgs(group.degree(), &bsgs);
            prop_assert_eq!(chain.order(), group.order());
        }
    }
}
