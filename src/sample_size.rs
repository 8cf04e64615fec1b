use crate::pretty;
use anyhow::{Context, Result};
use bdt_stats::phase2::Phase2Design;
use bdt_stats::phase3::{pooled_positive_fraction, Phase3Design};
use bdt_stats::SampleSize;
use bpaf::Bpaf;
use log::*;
use serde_json::json;

/// Sample sizes for a single-arm study showing that a test beats minimally
/// acceptable TPF and FPF values
#[derive(Debug, Clone, Bpaf)]
#[bpaf(command("phase2"))]
pub struct Phase2Options {
    /// The minimally acceptable TPF
    #[bpaf(argument("RATE"), fallback(0.75), display_fallback)]
    pub tpf0: f64,
    /// The maximally acceptable FPF
    #[bpaf(argument("RATE"), fallback(0.2), display_fallback)]
    pub fpf0: f64,
    /// The TPF the test is expected to have
    #[bpaf(argument("RATE"), fallback(0.9), display_fallback)]
    pub tpf1: f64,
    /// The FPF the test is expected to have
    #[bpaf(argument("RATE"), fallback(0.05), display_fallback)]
    pub fpf1: f64,
    /// Type I error rate
    #[bpaf(argument("RATE"), fallback(0.1), display_fallback)]
    pub alpha: f64,
    /// Type II error rate
    #[bpaf(argument("RATE"), fallback(0.1), display_fallback)]
    pub beta: f64,
    /// Print the result as JSON
    pub json: bool,
}

impl From<&Phase2Options> for Phase2Design {
    fn from(x: &Phase2Options) -> Phase2Design {
        Phase2Design {
            tpf0: x.tpf0,
            fpf0: x.fpf0,
            tpf1: x.tpf1,
            fpf1: x.fpf1,
            alpha: x.alpha,
            beta: x.beta,
        }
    }
}

pub fn phase2(opts: Phase2Options) -> Result<()> {
    let design = Phase2Design::from(&opts);
    let (n_d, n_n) = design
        .continuous()
        .context("Can't size a phase 2 study with this design")?;
    info!("Unrounded sample sizes: {} diseased, {} non-diseased", n_d, n_n);
    let n = SampleSize::from_continuous(n_d, n_n);
    if opts.json {
        println!("{}", sample_size_json(n, n_d, n_n));
    } else {
        pretty::write_sample_size(std::io::stdout(), "Phase 2 sample size", n)?;
    }
    Ok(())
}

/// Sample sizes for a paired study comparing a new test (A) against an
/// existing one (B)
#[derive(Debug, Clone, Bpaf)]
#[bpaf(command("phase3"))]
pub struct Phase3Options {
    /// The ratio of TPFs (A / B) to rule out
    #[bpaf(argument("RATIO"), fallback(1.), display_fallback)]
    pub delta0_tpf: f64,
    /// The ratio of FPFs (A / B) to rule out
    #[bpaf(argument("RATIO"), fallback(1.5), display_fallback)]
    pub delta0_fpf: f64,
    /// The expected TPF of the new test
    #[bpaf(argument("RATE"), fallback(0.8), display_fallback)]
    pub tpf_a: f64,
    /// The expected FPF of the new test
    #[bpaf(argument("RATE"), fallback(0.01), display_fallback)]
    pub fpf_a: f64,
    /// The TPF of the existing test
    #[bpaf(argument("RATE"), fallback(0.75), display_fallback)]
    pub tpf_b: f64,
    /// The FPF of the existing test
    #[bpaf(argument("RATE"), fallback(0.01), display_fallback)]
    pub fpf_b: f64,
    /// Type I error rate
    #[bpaf(argument("RATE"), fallback(0.05), display_fallback)]
    pub alpha: f64,
    /// Type II error rate
    #[bpaf(argument("RATE"), fallback(0.1), display_fallback)]
    pub beta: f64,
    /// Print the result as JSON
    pub json: bool,
}

impl From<&Phase3Options> for Phase3Design {
    fn from(x: &Phase3Options) -> Phase3Design {
        Phase3Design {
            delta0_tpf: x.delta0_tpf,
            delta0_fpf: x.delta0_fpf,
            tpf_a: x.tpf_a,
            fpf_a: x.fpf_a,
            tpf_b: x.tpf_b,
            fpf_b: x.fpf_b,
            alpha: x.alpha,
            beta: x.beta,
        }
    }
}

pub fn phase3(opts: Phase3Options) -> Result<()> {
    let design = Phase3Design::from(&opts);
    let (delta1_tpf, delta1_fpf) = design
        .ratios()
        .context("Can't compare tests with these rates")?;
    info!("Ratios of A to B: TPF {}, FPF {}", delta1_tpf, delta1_fpf);
    for (arm, delta1, rate_b) in [
        ("TPF", delta1_tpf, design.tpf_b),
        ("FPF", delta1_fpf, design.fpf_b),
    ] {
        let raw = (delta1 + 1.) * rate_b - 1.;
        if raw < 0. {
            warn!(
                "{}: pooled positive fraction {} is negative; using {}",
                arm,
                raw,
                pooled_positive_fraction(delta1, rate_b)
            );
        }
    }
    let (n_d, n_n) = design
        .continuous()
        .context("Can't size a phase 3 study with this design")?;
    info!("Unrounded sample sizes: {} diseased, {} non-diseased", n_d, n_n);
    let n = SampleSize::from_continuous(n_d, n_n);
    if opts.json {
        println!("{}", sample_size_json(n, n_d, n_n));
    } else {
        pretty::write_sample_size(std::io::stdout(), "Phase 3 sample size", n)?;
    }
    Ok(())
}

fn sample_size_json(n: SampleSize, n_d: f64, n_n: f64) -> serde_json::Value {
    json!({
        "n_diseased": n.n_diseased,
        "n_nondiseased": n.n_nondiseased,
        "unrounded": { "n_diseased": n_d, "n_nondiseased": n_n },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdt_stats::{phase2, Error};

    fn defaults2() -> Phase2Options {
        Phase2Options {
            tpf0: 0.75,
            fpf0: 0.2,
            tpf1: 0.9,
            fpf1: 0.05,
            alpha: 0.1,
            beta: 0.1,
            json: true,
        }
    }

    #[test]
    fn options_match_library_defaults() {
        assert_eq!(Phase2Design::from(&defaults2()), Phase2Design::default());
        let opts = Phase3Options {
            delta0_tpf: 1.,
            delta0_fpf: 1.5,
            tpf_a: 0.8,
            fpf_a: 0.01,
            tpf_b: 0.75,
            fpf_b: 0.01,
            alpha: 0.05,
            beta: 0.1,
            json: false,
        };
        assert_eq!(Phase3Design::from(&opts), Phase3Design::default());
    }

    #[test]
    fn json_output() {
        let design = Phase2Design::from(&defaults2());
        let (n_d, n_n) = design.continuous().unwrap();
        let n = phase2::sample_size(&design).unwrap();
        let json = sample_size_json(n, n_d, n_n);
        assert_eq!(json["n_diseased"], 64);
        assert_eq!(json["n_nondiseased"], 46);
    }

    #[test]
    fn errors_keep_their_cause() {
        let opts = Phase2Options {
            fpf1: 0.2,
            ..defaults2()
        };
        let e = phase2(opts).unwrap_err();
        assert_eq!(
            e.downcast_ref::<Error>(),
            Some(&Error::NoDiscrimination(bdt_stats::Arm::Fpf))
        );
        let opts = Phase3Options {
            delta0_tpf: 1.,
            delta0_fpf: 1.,
            tpf_a: 0.8,
            fpf_a: 0.01,
            tpf_b: 0.75,
            fpf_b: 0.01,
            alpha: 0.05,
            beta: 0.1,
            json: true,
        };
        let e = phase3(opts).unwrap_err();
        assert_eq!(
            e.downcast_ref::<Error>(),
            Some(&Error::NullRatioMatchesEffect(bdt_stats::Arm::Fpf))
        );
    }
}
