//! Exact (Clopper-Pearson) confidence intervals for a binomial proportion.

use crate::{check_conf_level, Error};
use special::Beta;

/// Which side(s) of the interval to bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alternative {
    /// Bound both sides, splitting the error rate evenly between the tails
    TwoSided,
    /// Only bound from above; the lower bound is 0
    Less,
    /// Only bound from below; the upper bound is 1
    Greater,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn contains(self, x: f64) -> bool {
        self.lower <= x && x <= self.upper
    }
}

/// The inverse CDF of the Beta(a, b) distribution.
fn beta_quantile(p: f64, a: f64, b: f64) -> f64 {
    p.inv_inc_beta(a, b, a.ln_beta(b))
}

/// A confidence interval for the success probability of a binomial
/// distribution, having observed `successes` out of `trials`.
///
/// The Clopper-Pearson interval inverts the binomial CDF.  The lower bound
/// is the `p` for which seeing at least `successes` has probability `α`;
/// this is the α-quantile of Beta(x, n - x + 1).  Likewise the upper bound
/// is the (1 - α)-quantile of Beta(x + 1, n - x).
///
/// With no successes the lower bound is 0, and with no failures the upper
/// bound is 1.
pub fn clopper_pearson(
    successes: u64,
    trials: u64,
    alternative: Alternative,
    conf_level: f64,
) -> Result<Interval, Error> {
    if trials == 0 {
        return Err(Error::NoTrials);
    }
    if successes > trials {
        return Err(Error::SuccessesExceedTrials { successes, trials });
    }
    let conf_level = check_conf_level(conf_level)?;

    // The probability mass left in each bounded tail
    let alpha = match alternative {
        Alternative::TwoSided => (1. - conf_level) / 2.,
        Alternative::Less | Alternative::Greater => 1. - conf_level,
    };

    let x = successes as f64;
    let n = trials as f64;
    let lower = if alternative == Alternative::Less || successes == 0 {
        0.
    } else {
        beta_quantile(alpha, x, n - x + 1.)
    };
    let upper = if alternative == Alternative::Greater || successes == trials {
        1.
    } else {
        beta_quantile(1. - alpha, x + 1., n - x)
    };
    Ok(Interval { lower, upper })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    macro_rules! assert_interval {
        ($ci:expr, $lower:expr, $upper:expr) => {
            let ci = $ci;
            assert_abs_diff_eq!(ci.lower, $lower, epsilon = 1e-8);
            assert_abs_diff_eq!(ci.upper, $upper, epsilon = 1e-8);
        };
    }

    #[test]
    fn two_sided() {
        let conf = 0.95f64.sqrt();
        assert_interval!(
            clopper_pearson(18, 24, Alternative::TwoSided, conf).unwrap(),
            0.5043951391035291,
            0.9158797647815196
        );
        assert_interval!(
            clopper_pearson(1, 93, Alternative::TwoSided, conf).unwrap(),
            0.00013699176669629276,
            0.0665116225345927
        );
    }

    #[test]
    fn one_sided() {
        let conf = 0.95f64.sqrt();
        assert_interval!(
            clopper_pearson(18, 24, Alternative::Greater, conf).unwrap(),
            0.5334494803493581,
            1.
        );
        assert_interval!(
            clopper_pearson(1, 93, Alternative::Less, conf).unwrap(),
            0.,
            0.05830514381397617
        );
    }

    #[test]
    fn no_successes_or_failures() {
        // 0/10 and 10/10 mirror each other
        assert_interval!(
            clopper_pearson(0, 10, Alternative::TwoSided, 0.95).unwrap(),
            0.,
            0.3084971078187607
        );
        assert_interval!(
            clopper_pearson(10, 10, Alternative::TwoSided, 0.95).unwrap(),
            0.6915028921812392,
            1.
        );
        // With no successes the upper bound has a closed form
        let ci = clopper_pearson(0, 20, Alternative::Less, 0.9).unwrap();
        assert_relative_eq!(ci.upper, 1. - 0.1f64.powf(1. / 20.), max_relative = 1e-9);
    }

    #[test]
    fn bad_input() {
        assert_eq!(
            clopper_pearson(0, 0, Alternative::TwoSided, 0.95),
            Err(Error::NoTrials)
        );
        assert_eq!(
            clopper_pearson(5, 4, Alternative::TwoSided, 0.95),
            Err(Error::SuccessesExceedTrials { successes: 5, trials: 4 })
        );
        assert_eq!(
            clopper_pearson(2, 4, Alternative::TwoSided, 1.),
            Err(Error::InvalidConfidenceLevel(1.))
        );
    }

    #[test]
    fn containment() {
        for trials in 1..=30 {
            for successes in 0..=trials {
                let p = successes as f64 / trials as f64;
                for &alt in &[Alternative::TwoSided, Alternative::Less, Alternative::Greater] {
                    let ci = clopper_pearson(successes, trials, alt, 0.9).unwrap();
                    assert!(ci.contains(p), "{}/{} {:?}: {:?}", successes, trials, alt, ci);
                }
            }
        }
    }
}
