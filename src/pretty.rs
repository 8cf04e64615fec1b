use ansi_term::Style;
use anyhow::Result;
use bdt_stats::{Region, SampleSize, Tails};
use std::fmt;
use std::io::Write;

/// An estimate and its bounds.  A bound which the region doesn't
/// constrain (ie. 0 or 1 on the open side of a one-sided region) is dimmed.
pub struct PrettyRate {
    pub estimate: f64,
    pub min: f64,
    pub max: f64,
    pub open_min: bool,
    pub open_max: bool,
}

impl fmt::Display for PrettyRate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let dim = Style::new().dimmed();
        let min = format!("{:.3}", self.min);
        let max = format!("{:.3}", self.max);
        write!(f, "{:.3}\t(", self.estimate)?;
        if self.open_min {
            write!(f, "{}", dim.paint(min))?;
        } else {
            f.write_str(&min)?;
        }
        f.write_str(", ")?;
        if self.open_max {
            write!(f, "{}", dim.paint(max))?;
        } else {
            f.write_str(&max)?;
        }
        f.write_str(")")
    }
}

/// Render "95" for 0.95, "97.5" for 0.975
pub fn percent(x: f64) -> String {
    let s = format!("{:.6}", x * 100.);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn tails_name(tails: Tails) -> &'static str {
    match tails {
        Tails::One => "one-sided",
        Tails::Two => "two-sided",
    }
}

pub fn write_region(out: impl Write, region: &Region, tails: Tails) -> Result<()> {
    let mut out = tabwriter::TabWriter::new(out);
    writeln!(
        out,
        "{}",
        Style::new().bold().paint(format!(
            "Joint {}% confidence region ({})",
            percent(region.conf_level),
            tails_name(tails)
        ))
    )?;
    let one_sided = tails == Tails::One;
    let tpf = PrettyRate {
        estimate: region.tpf,
        min: region.tpf_min,
        max: region.tpf_max,
        open_min: false,
        open_max: one_sided,
    };
    let fpf = PrettyRate {
        estimate: region.fpf,
        min: region.fpf_min,
        max: region.fpf_max,
        open_min: one_sided,
        open_max: false,
    };
    writeln!(out, "\tSensitivity:\t{}", tpf)?;
    writeln!(out, "\t1 - Specificity:\t{}", fpf)?;
    out.flush()?;
    Ok(())
}

pub fn write_sample_size(out: impl Write, title: &str, n: SampleSize) -> Result<()> {
    let mut out = tabwriter::TabWriter::new(out);
    writeln!(out, "{}", Style::new().bold().paint(title))?;
    writeln!(out, "\tDiseased:\t{}", n.n_diseased)?;
    writeln!(out, "\tNon-diseased:\t{}", n.n_nondiseased)?;
    writeln!(out, "\tTotal:\t{}", n.total())?;
    out.flush()?;
    Ok(())
}
