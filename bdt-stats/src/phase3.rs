//! Sample sizes for a paired study comparing a new test (A) against an
//! existing one (B).
//!
//! Effects are measured as ratios: `tpf_a / tpf_b` and `fpf_a / fpf_b`.
//! The study must rule out the null ratios `delta0_tpf` and `delta0_fpf`.

use crate::{check_error_rate, check_probability, normal_quantile, Arm, Error, SampleSize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phase3Design {
    /// The TPF ratio to rule out
    pub delta0_tpf: f64,
    /// The FPF ratio to rule out
    pub delta0_fpf: f64,
    pub tpf_a: f64,
    pub fpf_a: f64,
    pub tpf_b: f64,
    pub fpf_b: f64,
    /// Type I error rate
    pub alpha: f64,
    /// Type II error rate
    pub beta: f64,
}

impl Default for Phase3Design {
    fn default() -> Phase3Design {
        Phase3Design {
            delta0_tpf: 1.,
            delta0_fpf: 1.5,
            tpf_a: 0.8,
            fpf_a: 0.01,
            tpf_b: 0.75,
            fpf_b: 0.01,
            alpha: 0.05,
            beta: 0.1,
        }
    }
}

impl Phase3Design {
    /// The expected ratios (δ1) for TPF and FPF.
    pub fn ratios(&self) -> Result<(f64, f64), Error> {
        Ok((
            ratio(self.tpf_a, self.tpf_b, Arm::Tpf)?,
            ratio(self.fpf_a, self.fpf_b, Arm::Fpf)?,
        ))
    }

    /// The continuous sample sizes, before rounding.
    pub fn continuous(&self) -> Result<(f64, f64), Error> {
        let n_diseased = arm_size(
            self.delta0_tpf,
            self.tpf_a,
            self.tpf_b,
            self.alpha,
            self.beta,
            Arm::Tpf,
        )?;
        let n_nondiseased = arm_size(
            self.delta0_fpf,
            self.fpf_a,
            self.fpf_b,
            self.alpha,
            self.beta,
            Arm::Fpf,
        )?;
        Ok((n_diseased, n_nondiseased))
    }
}

fn ratio(rate_a: f64, rate_b: f64, arm: Arm) -> Result<f64, Error> {
    let rate_a = check_probability(rate_a)?;
    let rate_b = check_probability(rate_b)?;
    if rate_a == 0. || rate_b == 0. {
        return Err(Error::ZeroRate(arm));
    }
    Ok(rate_a / rate_b)
}

/// The fraction of subjects that both tests call positive, under the
/// smallest correlation between the tests that the rates allow.
///
/// If the tests are positive at rates δ1·r_B and r_B, at least
/// (δ1 + 1)·r_B - 1 must be positive on both.  When that's negative the
/// tests can be disjoint and the fraction is 0.
pub fn pooled_positive_fraction(delta1: f64, rate_b: f64) -> f64 {
    ((delta1 + 1.) * rate_b - 1.).max(0.)
}

/// The (unrounded) number of subjects needed to rule out the ratio
/// `delta0`, when the tests' actual rates are `rate_a` and `rate_b`.
///
/// This is a test on log(δ): the variance of the estimated log-ratio per
/// subject is ((δ1 + 1)·r_B - 2·XPPF) / (δ1·r_B²).  When that is zero
/// (eg. both rates are 1) no finite study is needed or possible, and we
/// return [`Error::ZeroVariance`].
pub fn arm_size(
    delta0: f64,
    rate_a: f64,
    rate_b: f64,
    alpha: f64,
    beta: f64,
    arm: Arm,
) -> Result<f64, Error> {
    if !(delta0.is_finite() && delta0 > 0.) {
        return Err(Error::InvalidRatio(delta0));
    }
    let delta1 = ratio(rate_a, rate_b, arm)?;
    let alpha = check_error_rate(alpha)?;
    let beta = check_error_rate(beta)?;
    let log_ratio = (delta1 / delta0).ln();
    if log_ratio == 0. {
        return Err(Error::NullRatioMatchesEffect(arm));
    }
    let z_alpha = normal_quantile((1. - alpha).sqrt());
    let z_beta = normal_quantile((1. - beta).sqrt());
    let xppf = pooled_positive_fraction(delta1, rate_b);
    let scale = (z_beta + z_alpha) / log_ratio;
    let var = ((delta1 + 1.) * rate_b - 2. * xppf) / (delta1 * rate_b * rate_b);
    // Only when r_A = r_B = 1
    if var <= 0. {
        return Err(Error::ZeroVariance(arm));
    }
    Ok(scale * scale * var)
}

/// The number of subjects to recruit into each group.
pub fn sample_size(design: &Phase3Design) -> Result<SampleSize, Error> {
    let (n_diseased, n_nondiseased) = design.continuous()?;
    Ok(SampleSize::from_continuous(n_diseased, n_nondiseased))
}
