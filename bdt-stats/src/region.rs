use crate::binomial::{clopper_pearson, Alternative};
use crate::{check_conf_level, Error};

/// The 2x2 table of test outcome against disease status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Counts {
    /// Diseased, tested positive
    pub tp: u64,
    /// Non-diseased, tested positive
    pub fp: u64,
    /// Diseased, tested negative
    pub fn_: u64,
    /// Non-diseased, tested negative
    pub tn: u64,
}

impl Counts {
    pub fn diseased(self) -> u64 {
        self.tp + self.fn_
    }

    pub fn nondiseased(self) -> u64 {
        self.fp + self.tn
    }

    /// The observed TPF and FPF.
    pub fn rates(self) -> Result<RatePoint, Error> {
        if self.diseased() == 0 {
            return Err(Error::EmptyDiseasedGroup);
        }
        if self.nondiseased() == 0 {
            return Err(Error::EmptyNondiseasedGroup);
        }
        Ok(RatePoint {
            tpf: self.tp as f64 / self.diseased() as f64,
            fpf: self.fp as f64 / self.nondiseased() as f64,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatePoint {
    pub tpf: f64,
    pub fpf: f64,
}

/// Whether the region bounds TPF/FPF on the side that matters, or on both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tails {
    /// TPF is bounded below and FPF above: a good test has TPF over a
    /// floor and FPF under a ceiling.
    #[default]
    One,
    Two,
}

impl Tails {
    fn tpf_alternative(self) -> Alternative {
        match self {
            Tails::One => Alternative::Greater,
            Tails::Two => Alternative::TwoSided,
        }
    }

    fn fpf_alternative(self) -> Alternative {
        match self {
            Tails::One => Alternative::Less,
            Tails::Two => Alternative::TwoSided,
        }
    }
}

/// A point estimate of (TPF, FPF) and a rectangular confidence region
/// around it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub tpf: f64,
    pub fpf: f64,
    pub tpf_min: f64,
    pub tpf_max: f64,
    pub fpf_min: f64,
    pub fpf_max: f64,
    /// The joint confidence level the region was built for
    pub conf_level: f64,
}

impl Region {
    pub fn point(self) -> RatePoint {
        RatePoint {
            tpf: self.tpf,
            fpf: self.fpf,
        }
    }
}

/// A joint confidence region for (TPF, FPF).
///
/// The diseased and non-diseased groups are independent binomial samples,
/// so we build an exact interval for each.  If each marginal interval has
/// coverage √c then the rectangle they span has coverage (√c)² = c.
pub fn confidence_region(counts: Counts, conf_level: f64, tails: Tails) -> Result<Region, Error> {
    let conf_level = check_conf_level(conf_level)?;
    let RatePoint { tpf, fpf } = counts.rates()?;
    let marginal = conf_level.sqrt();
    let tpf_ci = clopper_pearson(
        counts.tp,
        counts.diseased(),
        tails.tpf_alternative(),
        marginal,
    )?;
    let fpf_ci = clopper_pearson(
        counts.fp,
        counts.nondiseased(),
        tails.fpf_alternative(),
        marginal,
    )?;
    Ok(Region {
        tpf,
        fpf,
        tpf_min: tpf_ci.lower,
        tpf_max: tpf_ci.upper,
        fpf_min: fpf_ci.lower,
        fpf_max: fpf_ci.upper,
        conf_level,
    })
}
