//! Estimating the power of a phase 2 design.
//!
//! We simulate the study many times with a test that performs at
//! `tpf1`/`fpf1`, and count how often the one-sided confidence region
//! lets us conclude that the test beats `tpf0`/`fpf0`.

use crate::binomial::{clopper_pearson, Alternative};
use crate::{check_conf_level, confidence_region, Counts, Error, Region, SampleSize, Tails};
use rand::distributions::{Bernoulli, Distribution};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use statrs::distribution::{Binomial, Discrete};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerDesign {
    pub n_diseased: u64,
    pub n_nondiseased: u64,
    /// The region's lower TPF bound must exceed this
    pub tpf0: f64,
    /// The region's upper FPF bound must fall below this
    pub fpf0: f64,
    /// The test's actual TPF
    pub tpf1: f64,
    /// The test's actual FPF
    pub fpf1: f64,
    pub conf_level: f64,
    /// The number of simulated studies (B)
    pub trials: u64,
}

impl Default for PowerDesign {
    fn default() -> PowerDesign {
        PowerDesign {
            n_diseased: 64,
            n_nondiseased: 46,
            tpf0: 0.75,
            fpf0: 0.2,
            tpf1: 0.9,
            fpf1: 0.05,
            conf_level: 0.95,
            trials: 500,
        }
    }
}

impl PowerDesign {
    pub fn with_sample_size(self, n: SampleSize) -> PowerDesign {
        PowerDesign {
            n_diseased: n.n_diseased,
            n_nondiseased: n.n_nondiseased,
            ..self
        }
    }
}

/// Whether a study with this outcome would reject the null, ie. show the
/// test to be adequate.
pub fn rejects_null(region: &Region, tpf0: f64, fpf0: f64) -> bool {
    region.tpf_min > tpf0 && region.fpf_max < fpf0
}

/// Simulate a single study.  All diseased subjects are drawn before any
/// non-diseased ones.
pub fn trial<R: Rng>(design: &PowerDesign, rng: &mut R) -> Result<bool, Error> {
    let tp = positives(design.n_diseased, design.tpf1, rng)?;
    let fp = positives(design.n_nondiseased, design.fpf1, rng)?;
    let counts = Counts {
        tp,
        fp,
        fn_: design.n_diseased - tp,
        tn: design.n_nondiseased - fp,
    };
    let region = confidence_region(counts, design.conf_level, Tails::One)?;
    Ok(rejects_null(&region, design.tpf0, design.fpf0))
}

/// The number of positives among `n` subjects who each test positive with
/// probability `p`.
fn positives<R: Rng>(n: u64, p: f64, rng: &mut R) -> Result<u64, Error> {
    let dist = Bernoulli::new(p).map_err(|_| Error::InvalidProbability(p))?;
    Ok((0..n).filter(|_| dist.sample(&mut *rng)).count() as u64)
}

/// The fraction of simulated studies which reject the null, drawing from a
/// stream seeded with `seed`.  The same seed always gives the same answer.
pub fn simulate(design: &PowerDesign, seed: u64) -> Result<f64, Error> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    simulate_with(design, &mut rng)
}

/// Like [`simulate`], but drawing from a stream owned by the caller.  If
/// any single study is undefined then so is the whole simulation.
pub fn simulate_with<R: Rng>(design: &PowerDesign, rng: &mut R) -> Result<f64, Error> {
    if design.trials == 0 {
        return Err(Error::NoTrials);
    }
    let mut successes = 0u64;
    for _ in 0..design.trials {
        if trial(design, rng)? {
            successes += 1;
        }
    }
    Ok(successes as f64 / design.trials as f64)
}

/// The power which [`simulate`] estimates, computed without sampling.
///
/// The two groups are independent, so the power is the product of the
/// probability that the TPF bound clears `tpf0` and the probability that
/// the FPF bound clears `fpf0`.  Each of those is a sum of binomial
/// probabilities over the outcomes which clear the bound.
pub fn exact(design: &PowerDesign) -> Result<f64, Error> {
    let conf_level = check_conf_level(design.conf_level)?;
    let marginal = conf_level.sqrt();
    let p_tpf = clearing_probability(design.n_diseased, design.tpf1, |k, n| {
        Ok(clopper_pearson(k, n, Alternative::Greater, marginal)?.lower > design.tpf0)
    })?;
    let p_fpf = clearing_probability(design.n_nondiseased, design.fpf1, |k, n| {
        Ok(clopper_pearson(k, n, Alternative::Less, marginal)?.upper < design.fpf0)
    })?;
    Ok(p_tpf * p_fpf)
}

fn clearing_probability(
    n: u64,
    p: f64,
    clears: impl Fn(u64, u64) -> Result<bool, Error>,
) -> Result<f64, Error> {
    if n == 0 {
        return Err(Error::NoTrials);
    }
    let dist = Binomial::new(p, n).map_err(|_| Error::InvalidProbability(p))?;
    let mut total = 0.;
    for k in 0..=n {
        if clears(k, n)? {
            total += dist.pmf(k);
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    #[test]
    fn reproducible() {
        let design = PowerDesign::default();
        let x = simulate(&design, 185).unwrap();
        let y = simulate(&design, 185).unwrap();
        assert_eq!(x.to_bits(), y.to_bits());
        assert!((0. ..=1.).contains(&x));
    }

    #[test]
    fn close_to_exact() {
        let design = PowerDesign::default();
        let exact = exact(&design).unwrap();
        assert_abs_diff_eq!(exact, 0.7205493654063742, epsilon = 1e-6);
        // sd ≈ 0.02 at B = 500
        let power = simulate(&design, 185).unwrap();
        assert_abs_diff_eq!(power, exact, epsilon = 0.1);
    }

    #[test]
    fn converges() {
        let design = PowerDesign {
            trials: 4000,
            ..PowerDesign::default()
        };
        let exact = exact(&design).unwrap();
        for seed in 1..4 {
            let power = simulate(&design, seed).unwrap();
            // sd ≈ 0.007 at B = 4000
            assert_abs_diff_eq!(power, exact, epsilon = 0.04);
        }
    }

    #[test]
    fn small_study() {
        let design = PowerDesign {
            n_diseased: 20,
            n_nondiseased: 20,
            ..PowerDesign::default()
        };
        assert_abs_diff_eq!(exact(&design).unwrap(), 0.14043578397367815, epsilon = 1e-6);
    }

    #[test]
    fn under_the_null() {
        // If the test only just meets the thresholds we should almost never
        // reject
        let design = PowerDesign {
            tpf1: 0.75,
            fpf1: 0.2,
            ..PowerDesign::default()
        };
        assert_abs_diff_eq!(exact(&design).unwrap(), 0.0002765340254303036, epsilon = 1e-7);
        assert!(simulate(&design, 185).unwrap() < 0.02);
    }

    #[test]
    fn caller_owned_stream() {
        let design = PowerDesign::default();
        let mut rng = ChaCha8Rng::seed_from_u64(185);
        assert_eq!(
            simulate_with(&design, &mut rng).unwrap(),
            simulate(&design, 185).unwrap()
        );
        // A single study can also be run on its own
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut outcomes = (0..50).map(|_| trial(&design, &mut rng).unwrap());
        assert!(outcomes.any(|x| x));
    }

    #[test]
    fn rejection_rule() {
        let region = Region {
            tpf: 0.9,
            fpf: 0.05,
            tpf_min: 0.8,
            tpf_max: 1.,
            fpf_min: 0.,
            fpf_max: 0.15,
            conf_level: 0.95,
        };
        assert!(rejects_null(&region, 0.75, 0.2));
        assert!(!rejects_null(&region, 0.8, 0.2));
        assert!(!rejects_null(&region, 0.75, 0.15));
    }

    #[test]
    fn bad_designs() {
        let design = PowerDesign {
            trials: 0,
            ..PowerDesign::default()
        };
        assert_eq!(simulate(&design, 1), Err(Error::NoTrials));
        let design = PowerDesign {
            fpf1: 1.2,
            ..PowerDesign::default()
        };
        assert_eq!(simulate(&design, 1), Err(Error::InvalidProbability(1.2)));
        assert_eq!(exact(&design), Err(Error::InvalidProbability(1.2)));
        let design = PowerDesign {
            n_diseased: 0,
            ..PowerDesign::default()
        };
        assert_eq!(simulate(&design, 1), Err(Error::EmptyDiseasedGroup));
    }
}
