//! Sample sizes for a single-arm study of one test.
//!
//! The study recruits diseased and non-diseased subjects, and succeeds if
//! it can rule out that the test's TPF is at or below `tpf0` and that its
//! FPF is at or above `fpf0`.  We size it assuming the test actually
//! performs at `tpf1`/`fpf1`.

use crate::{check_error_rate, normal_quantile, Arm, Error, SampleSize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phase2Design {
    /// The minimally acceptable TPF
    pub tpf0: f64,
    /// The maximally acceptable FPF
    pub fpf0: f64,
    /// The TPF we expect the test to have
    pub tpf1: f64,
    /// The FPF we expect the test to have
    pub fpf1: f64,
    /// Type I error rate
    pub alpha: f64,
    /// Type II error rate
    pub beta: f64,
}

impl Default for Phase2Design {
    fn default() -> Phase2Design {
        Phase2Design {
            tpf0: 0.75,
            fpf0: 0.2,
            tpf1: 0.9,
            fpf1: 0.05,
            alpha: 0.1,
            beta: 0.1,
        }
    }
}

impl Phase2Design {
    /// The continuous sample sizes, before rounding.
    pub fn continuous(&self) -> Result<(f64, f64), Error> {
        let n_diseased = arm_size(self.tpf0, self.tpf1, self.alpha, self.beta, Arm::Tpf)?;
        let n_nondiseased = arm_size(self.fpf0, self.fpf1, self.alpha, self.beta, Arm::Fpf)?;
        Ok((n_diseased, n_nondiseased))
    }
}

/// The (unrounded) number of subjects needed to distinguish rate `r1` from
/// rate `r0`.
///
/// Both the TPF and FPF must be established for the study to succeed, so
/// the error rates are split between them: each arm is run at size
/// 1 - √(1 - α) and power √(1 - β).
///
/// For α or β above 0.75 the split level √(1 - α) drops below one half, so
/// its normal quantile is negative and the two spread terms partly cancel.
/// The formula is still applied as written; expect very small sizes.
pub fn arm_size(r0: f64, r1: f64, alpha: f64, beta: f64, arm: Arm) -> Result<f64, Error> {
    let r0 = check_rate(r0)?;
    let r1 = check_rate(r1)?;
    let alpha = check_error_rate(alpha)?;
    let beta = check_error_rate(beta)?;
    if r0 == r1 {
        return Err(Error::NoDiscrimination(arm));
    }
    let z_alpha = normal_quantile((1. - alpha).sqrt());
    let z_beta = normal_quantile((1. - beta).sqrt());
    let spread = z_alpha * (r0 * (1. - r0)).sqrt() + z_beta * (r1 * (1. - r1)).sqrt();
    let effect = r1 - r0;
    Ok(spread * spread / (effect * effect))
}

/// The number of subjects to recruit into each group.
pub fn sample_size(design: &Phase2Design) -> Result<SampleSize, Error> {
    let (n_diseased, n_nondiseased) = design.continuous()?;
    Ok(SampleSize::from_continuous(n_diseased, n_nondiseased))
}

fn check_rate(r: f64) -> Result<f64, Error> {
    if r > 0. && r < 1. {
        Ok(r)
    } else {
        Err(Error::InvalidProbability(r))
    }
}
