/*! Design tools for evaluating a binary diagnostic test.

A binary diagnostic test classifies each subject as positive or negative,
and we compare that against their true disease status.  Two numbers
summarise how well it does: the true-positive fraction (TPF, aka.
sensitivity) and the false-positive fraction (FPF, aka. 1 - specificity).

This crate can:

* compute a joint confidence region for (TPF, FPF) from observed counts
  ([`confidence_region`]);
* size a single-arm "phase 2" study which must show that a test beats
  minimally acceptable TPF/FPF values ([`phase2::sample_size`]);
* size a "phase 3" study comparing a new test against an existing one
  ([`phase3::sample_size`]);
* estimate the power of a phase 2 design by simulation
  ([`power::simulate`]), or compute it exactly ([`power::exact`]).

## Example

Suppose we've run our test on 24 diseased and 93 non-diseased subjects.
18 of the diseased subjects and 1 of the non-diseased ones tested
positive.

```
# use bdt_stats::*;
let counts = Counts { tp: 18, fp: 1, fn_: 6, tn: 92 };
let region = confidence_region(counts, 0.95, Tails::Two).unwrap();
let msg = format!(
    "TPF = {:.2} ({:.2}, {:.2}), FPF = {:.3} ({:.3}, {:.3})",
    region.tpf, region.tpf_min, region.tpf_max,
    region.fpf, region.fpf_min, region.fpf_max,
);
assert_eq!(msg, "TPF = 0.75 (0.50, 0.92), FPF = 0.011 (0.000, 0.067)");
```

*/

pub mod binomial;
pub mod phase2;
pub mod phase3;
pub mod power;
mod region;

pub use region::*;

use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;

/// The number of subjects to recruit into each group of a study.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleSize {
    /// Subjects who have the disease (used to estimate TPF)
    pub n_diseased: u64,
    /// Subjects who don't (used to estimate FPF)
    pub n_nondiseased: u64,
}

impl SampleSize {
    /// Round continuous sample sizes up.  Rounding down would leave the
    /// study short of its target power.
    pub fn from_continuous(n_diseased: f64, n_nondiseased: f64) -> SampleSize {
        SampleSize {
            n_diseased: n_diseased.ceil() as u64,
            n_nondiseased: n_nondiseased.ceil() as u64,
        }
    }

    pub fn total(self) -> u64 {
        self.n_diseased + self.n_nondiseased
    }
}

impl fmt::Display for SampleSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} diseased, {} non-diseased",
            self.n_diseased, self.n_nondiseased
        )
    }
}

/// The inverse CDF of the standard normal distribution.
pub fn normal_quantile(p: f64) -> f64 {
    // N(0, 1) always has valid parameters
    match Normal::new(0., 1.) {
        Ok(dist) => dist.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// One half of a study design: the diseased group measures TPF, the
/// non-diseased group measures FPF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arm {
    Tpf,
    Fpf,
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arm::Tpf => f.write_str("TPF"),
            Arm::Fpf => f.write_str("FPF"),
        }
    }
}

/// Every way a calculation can be undefined.  These are all mathematical
/// preconditions: retrying with the same inputs will fail the same way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    EmptyDiseasedGroup,
    EmptyNondiseasedGroup,
    NoDiscrimination(Arm),
    NullRatioMatchesEffect(Arm),
    ZeroRate(Arm),
    ZeroVariance(Arm),
    InvalidRatio(f64),
    InvalidProbability(f64),
    InvalidErrorRate(f64),
    InvalidConfidenceLevel(f64),
    SuccessesExceedTrials { successes: u64, trials: u64 },
    NoTrials,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EmptyDiseasedGroup => {
                f.write_str("Can't compute TPF without any diseased subjects (tp + fn = 0)")
            }
            Error::EmptyNondiseasedGroup => {
                f.write_str("Can't compute FPF without any non-diseased subjects (fp + tn = 0)")
            }
            Error::NoDiscrimination(arm) => write!(
                f,
                "The target {} is equal to the null {}, so no study can tell them apart",
                arm, arm
            ),
            Error::NullRatioMatchesEffect(arm) => write!(
                f,
                "The {} ratio between the tests is equal to the null ratio",
                arm
            ),
            Error::ZeroRate(arm) => write!(f, "{} of both tests must be positive", arm),
            Error::ZeroVariance(arm) => write!(
                f,
                "The estimated {} ratio has zero variance, so its sample size is undefined",
                arm
            ),
            Error::InvalidRatio(x) => write!(f, "Null ratio must be positive, got {}", x),
            Error::InvalidProbability(x) => write!(f, "{} is not a valid probability", x),
            Error::InvalidErrorRate(x) => {
                write!(f, "Error rates must be strictly between 0 and 1, got {}", x)
            }
            Error::InvalidConfidenceLevel(x) => write!(
                f,
                "Confidence level must be strictly between 0 and 1, got {}",
                x
            ),
            Error::SuccessesExceedTrials { successes, trials } => write!(
                f,
                "Can't have {} successes out of {} trials",
                successes, trials
            ),
            Error::NoTrials => f.write_str("Need at least one trial"),
        }
    }
}
impl std::error::Error for Error {}

fn check_probability(p: f64) -> Result<f64, Error> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(Error::InvalidProbability(p))
    }
}

fn check_error_rate(x: f64) -> Result<f64, Error> {
    if x > 0. && x < 1. {
        Ok(x)
    } else {
        Err(Error::InvalidErrorRate(x))
    }
}

fn check_conf_level(x: f64) -> Result<f64, Error> {
    if x > 0. && x < 1. {
        Ok(x)
    } else {
        Err(Error::InvalidConfidenceLevel(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    #[test]
    fn normal_table() {
        assert_abs_diff_eq!(normal_quantile(0.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(normal_quantile(0.975), 1.959963984540054, max_relative = 1e-9);
        assert_relative_eq!(normal_quantile(0.95), 1.6448536269514722, max_relative = 1e-9);
        assert_relative_eq!(normal_quantile(0.9f64.sqrt()), 1.6322187896168654, max_relative = 1e-9);
        assert_relative_eq!(normal_quantile(0.025), -1.959963984540054, max_relative = 1e-9);
    }

    #[test]
    fn rounding_up() {
        let n = SampleSize::from_continuous(63.0205, 45.0000001);
        assert_eq!(n, SampleSize { n_diseased: 64, n_nondiseased: 46 });
        assert_eq!(SampleSize::from_continuous(12., 3.).total(), 15);
    }

    #[test]
    fn validation() {
        assert_eq!(check_probability(0.), Ok(0.));
        assert_eq!(check_probability(1.), Ok(1.));
        assert_eq!(check_probability(1.5), Err(Error::InvalidProbability(1.5)));
        assert!(check_probability(f64::NAN).is_err());
        assert_eq!(check_error_rate(0.), Err(Error::InvalidErrorRate(0.)));
        assert_eq!(check_conf_level(1.), Err(Error::InvalidConfidenceLevel(1.)));
        assert_eq!(check_conf_level(0.95), Ok(0.95));
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::NoDiscrimination(Arm::Fpf).to_string(),
            "The target FPF is equal to the null FPF, so no study can tell them apart"
        );
        assert_eq!(
            Error::SuccessesExceedTrials { successes: 3, trials: 2 }.to_string(),
            "Can't have 3 successes out of 2 trials"
        );
    }
}
