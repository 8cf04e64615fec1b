use ansi_term::Style;
use anyhow::{Context, Result};
use bdt_stats::phase2::{self, Phase2Design};
use bdt_stats::power::{self as sim, PowerDesign};
use bdt_stats::SampleSize;
use bpaf::Bpaf;
use log::*;
use serde_json::json;
use std::io::Write;
use std::time::Instant;

/// Estimates the power of a phase 2 study by simulating it repeatedly.  A
/// group size which is omitted is taken from the phase 2 formula.
#[derive(Debug, Clone, Bpaf)]
#[bpaf(command("power"))]
pub struct Options {
    /// Number of diseased subjects per study
    #[bpaf(argument("N"))]
    pub n_diseased: Option<u64>,
    /// Number of non-diseased subjects per study
    #[bpaf(argument("N"))]
    pub n_nondiseased: Option<u64>,
    /// The lower TPF bound must exceed this for a study to succeed
    #[bpaf(argument("RATE"), fallback(0.75), display_fallback)]
    pub tpf0: f64,
    /// The upper FPF bound must fall below this for a study to succeed
    #[bpaf(argument("RATE"), fallback(0.2), display_fallback)]
    pub fpf0: f64,
    /// The test's actual TPF
    #[bpaf(argument("RATE"), fallback(0.9), display_fallback)]
    pub tpf1: f64,
    /// The test's actual FPF
    #[bpaf(argument("RATE"), fallback(0.05), display_fallback)]
    pub fpf1: f64,
    /// The joint confidence level of each study's region
    #[bpaf(argument("P"), fallback(0.95), display_fallback)]
    pub conf_level: f64,
    /// Type I error rate, for sizing the study when no size is given
    #[bpaf(argument("RATE"), fallback(0.1), display_fallback)]
    pub alpha: f64,
    /// Type II error rate, for sizing the study when no size is given
    #[bpaf(argument("RATE"), fallback(0.1), display_fallback)]
    pub beta: f64,
    /// The number of studies to simulate
    #[bpaf(argument("B"), fallback(500), display_fallback)]
    pub trials: u64,
    /// Seed for the random stream
    #[bpaf(argument("SEED"), fallback(185), display_fallback)]
    pub seed: u64,
    /// Also compute the power exactly
    pub exact: bool,
    /// Print the result as JSON
    pub json: bool,
}

impl Options {
    /// The group sizes given on the command line, with any missing one
    /// filled in from the phase 2 formula.
    fn sample_size(&self) -> Result<SampleSize> {
        if let (Some(n_diseased), Some(n_nondiseased)) = (self.n_diseased, self.n_nondiseased) {
            return Ok(SampleSize {
                n_diseased,
                n_nondiseased,
            });
        }
        let design = Phase2Design {
            tpf0: self.tpf0,
            fpf0: self.fpf0,
            tpf1: self.tpf1,
            fpf1: self.fpf1,
            alpha: self.alpha,
            beta: self.beta,
        };
        let formula = phase2::sample_size(&design)
            .context("Can't size the study from the phase 2 formula")?;
        let n = SampleSize {
            n_diseased: self.n_diseased.unwrap_or(formula.n_diseased),
            n_nondiseased: self.n_nondiseased.unwrap_or(formula.n_nondiseased),
        };
        info!("Phase 2 formula gives {}; using {}", formula, n);
        Ok(n)
    }

    fn design(&self) -> Result<PowerDesign> {
        let design = PowerDesign {
            tpf0: self.tpf0,
            fpf0: self.fpf0,
            tpf1: self.tpf1,
            fpf1: self.fpf1,
            conf_level: self.conf_level,
            trials: self.trials,
            ..PowerDesign::default()
        };
        Ok(design.with_sample_size(self.sample_size()?))
    }
}

pub struct Report {
    pub design: PowerDesign,
    pub seed: u64,
    pub power: f64,
    pub exact: Option<f64>,
}

pub fn run(opts: &Options) -> Result<Report> {
    let design = opts.design()?;
    info!(
        "Simulating {} studies of {} diseased and {} non-diseased subjects (seed {})",
        design.trials, design.n_diseased, design.n_nondiseased, opts.seed
    );
    let start = Instant::now();
    let power = sim::simulate(&design, opts.seed).context("Simulation failed")?;
    info!(
        "Simulation took {}",
        humantime::format_duration(start.elapsed())
    );
    let exact = if opts.exact {
        Some(sim::exact(&design).context("Can't compute the exact power")?)
    } else {
        None
    };
    Ok(Report {
        design,
        seed: opts.seed,
        power,
        exact,
    })
}

pub fn power(opts: Options) -> Result<()> {
    let report = run(&opts)?;
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    if opts.json {
        writeln!(stdout, "{}", report_json(&report))?;
    } else {
        write_report(&mut stdout, &report)?;
    }
    Ok(())
}

fn report_json(report: &Report) -> serde_json::Value {
    json!({
        "n_diseased": report.design.n_diseased,
        "n_nondiseased": report.design.n_nondiseased,
        "trials": report.design.trials,
        "seed": report.seed,
        "power": report.power,
        "exact": report.exact,
    })
}

fn write_report(out: impl Write, report: &Report) -> Result<()> {
    let mut out = tabwriter::TabWriter::new(out);
    writeln!(
        out,
        "{}",
        Style::new().bold().paint(format!(
            "Power over {} simulated studies (seed {})",
            report.design.trials, report.seed
        ))
    )?;
    writeln!(out, "\tDiseased:\t{}", report.design.n_diseased)?;
    writeln!(out, "\tNon-diseased:\t{}", report.design.n_nondiseased)?;
    writeln!(out, "\tPower:\t{:.3}", report.power)?;
    if let Some(exact) = report.exact {
        writeln!(out, "\tExact power:\t{:.3}", exact)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Options {
        Options {
            n_diseased: Some(64),
            n_nondiseased: Some(46),
            tpf0: 0.75,
            fpf0: 0.2,
            tpf1: 0.9,
            fpf1: 0.05,
            conf_level: 0.95,
            alpha: 0.1,
            beta: 0.1,
            trials: 500,
            seed: 185,
            exact: true,
            json: false,
        }
    }

    #[test]
    fn options_match_library_defaults() {
        assert_eq!(defaults().design().unwrap(), PowerDesign::default());
    }

    #[test]
    fn sized_from_phase2() {
        let opts = Options {
            n_diseased: None,
            ..defaults()
        };
        let design = opts.design().unwrap();
        assert_eq!(design.n_diseased, 64);
        assert_eq!(design.n_nondiseased, 46);

        let opts = Options {
            n_diseased: None,
            n_nondiseased: None,
            ..defaults()
        };
        let design = opts.design().unwrap();
        assert_eq!(design.n_diseased, 64);
        assert_eq!(design.n_nondiseased, 46);
    }

    #[test]
    fn given_size_is_kept() {
        let opts = Options {
            n_diseased: Some(100),
            n_nondiseased: None,
            ..defaults()
        };
        let design = opts.design().unwrap();
        assert_eq!(design.n_diseased, 100);
        assert_eq!(design.n_nondiseased, 46);

        let opts = Options {
            n_diseased: None,
            n_nondiseased: Some(30),
            ..defaults()
        };
        let design = opts.design().unwrap();
        assert_eq!(design.n_diseased, 64);
        assert_eq!(design.n_nondiseased, 30);
    }

    #[test]
    fn reproducible_report() {
        let x = run(&defaults()).unwrap();
        let y = run(&defaults()).unwrap();
        assert_eq!(x.power.to_bits(), y.power.to_bits());
        assert_eq!(report_json(&x), report_json(&y));
        let exact = x.exact.unwrap();
        assert!((x.power - exact).abs() < 0.1);
    }

    #[test]
    fn table() {
        let report = run(&defaults()).unwrap();
        let mut out = vec![];
        write_report(&mut out, &report).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("seed 185"));
        assert!(out.contains("Exact power:"));
    }
}
