use crate::pretty;
use anyhow::{Context, Result};
use bdt_stats::{confidence_region, Counts, Region, Tails};
use bpaf::Bpaf;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// The cells of the 2x2 table
#[derive(Debug, Clone, Bpaf)]
pub struct CountArgs {
    /// Diseased subjects who tested positive
    #[bpaf(long("tp"), argument("N"))]
    pub tp: u64,
    /// Non-diseased subjects who tested positive
    #[bpaf(long("fp"), argument("N"))]
    pub fp: u64,
    /// Diseased subjects who tested negative
    #[bpaf(long("fn"), argument("N"))]
    pub fn_: u64,
    /// Non-diseased subjects who tested negative
    #[bpaf(long("tn"), argument("N"))]
    pub tn: u64,
}

impl From<CountArgs> for Counts {
    fn from(x: CountArgs) -> Counts {
        Counts {
            tp: x.tp,
            fp: x.fp,
            fn_: x.fn_,
            tn: x.tn,
        }
    }
}

#[derive(Debug, Clone, Bpaf)]
pub struct ConfArgs {
    /// The joint confidence level of the region
    #[bpaf(argument("P"), fallback(0.95), display_fallback)]
    pub conf_level: f64,
    /// Bound TPF and FPF on both sides, rather than TPF from below and FPF
    /// from above
    pub two_sided: bool,
}

impl ConfArgs {
    pub fn tails(&self) -> Tails {
        if self.two_sided {
            Tails::Two
        } else {
            Tails::One
        }
    }

    pub fn region(&self, counts: Counts) -> Result<Region> {
        info!(
            "Each marginal interval is at the {:.4} level",
            self.conf_level.sqrt()
        );
        confidence_region(counts, self.conf_level, self.tails())
            .with_context(|| format!("Can't compute a confidence region for {:?}", counts))
    }
}

/// Compute a joint confidence region for sensitivity and 1 - specificity
#[derive(Debug, Clone, Bpaf)]
#[bpaf(command("region"))]
pub struct Options {
    #[bpaf(external(count_args))]
    pub counts: CountArgs,
    #[bpaf(external(conf_args))]
    pub conf: ConfArgs,
    /// Print the region as JSON
    pub json: bool,
}

pub fn region(opts: Options) -> Result<()> {
    let region = opts.conf.region(opts.counts.into())?;
    if opts.json {
        println!("{}", region_json(&region));
    } else {
        pretty::write_region(std::io::stdout(), &region, opts.conf.tails())?;
    }
    Ok(())
}

pub fn region_json(region: &Region) -> serde_json::Value {
    json!({
        "conf_level": region.conf_level,
        "tpf": region.tpf,
        "tpf_min": region.tpf_min,
        "tpf_max": region.tpf_max,
        "fpf": region.fpf,
        "fpf_min": region.fpf_min,
        "fpf_max": region.fpf_max,
    })
}

/// Takes CSV counts on stdin (label,tp,fp,fn,tn) and writes a confidence
/// region for each row as CSV on stdout
#[derive(Debug, Clone, Bpaf)]
#[bpaf(command("regions"))]
pub struct BatchOptions {
    #[bpaf(external(conf_args))]
    pub conf: ConfArgs,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    label: String,
    tp: u64,
    fp: u64,
    #[serde(rename = "fn")]
    fn_: u64,
    tn: u64,
}

#[derive(Debug, Serialize)]
struct RegionRow {
    label: String,
    tpf: f64,
    tpf_min: f64,
    tpf_max: f64,
    fpf: f64,
    fpf_min: f64,
    fpf_max: f64,
}

pub fn regions(opts: BatchOptions) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    batch(&opts.conf, stdin.lock(), stdout.lock())
}

fn batch(conf: &ConfArgs, input: impl std::io::Read, output: impl std::io::Write) -> Result<()> {
    let mut rdr = csv::Reader::from_reader(input);
    let mut wtr = csv::Writer::from_writer(output);
    for row in rdr.deserialize::<CountRow>() {
        let row = row?;
        debug!("Computing region for {}", row.label);
        let counts = Counts {
            tp: row.tp,
            fp: row.fp,
            fn_: row.fn_,
            tn: row.tn,
        };
        let region = confidence_region(counts, conf.conf_level, conf.tails())
            .with_context(|| format!("{}: can't compute a confidence region", row.label))?;
        wtr.serialize(RegionRow {
            label: row.label,
            tpf: region.tpf,
            tpf_min: region.tpf_min,
            tpf_max: region.tpf_max,
            fpf: region.fpf,
            fpf_min: region.fpf_min,
            fpf_max: region.fpf_max,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
