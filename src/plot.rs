use crate::pretty::percent;
use crate::region::{conf_args, count_args, ConfArgs, CountArgs};
use anyhow::Result;
use bdt_stats::Region;
use bpaf::Bpaf;
use serde_json::json;

/// Computes a confidence region and produces a vega-lite plot specification
/// of it on stdout
#[derive(Debug, Clone, Bpaf)]
#[bpaf(command("plot"))]
pub struct Options {
    #[bpaf(external(count_args))]
    pub counts: CountArgs,
    #[bpaf(external(conf_args))]
    pub conf: ConfArgs,
}

fn axis(field: &str, title: &str) -> serde_json::Value {
    json!({
        "field": field,
        "type": "quantitative",
        "title": title,
        "scale": { "domain": [0, 1] },
    })
}

pub fn mk_chart(region: &Region) -> serde_json::Value {
    let x = axis("fpf", "1 - Specificity");
    let y = axis("tpf", "Sensitivity");
    let sensitivity = format!(
        "Sensitivity: {:.2} ({:.2}, {:.2})",
        region.tpf, region.tpf_min, region.tpf_max
    );
    let specificity = format!(
        "1 - Specificity: {:.2} ({:.2}, {:.2})",
        region.fpf, region.fpf_min, region.fpf_max
    );
    json!({
        "$schema": "https://vega.github.io/schema/vega-lite/v4.json",
        "title": format!(
            "Joint {}% confidence region for Sensitivity and 1 - Specificity",
            percent(region.conf_level)
        ),
        "width": 400,
        "height": 400,
        "layer": [
            {
                "data": { "values": [{ "fpf": 0, "tpf": 0 }, { "fpf": 1, "tpf": 1 }] },
                "mark": { "type": "line", "strokeDash": [6, 4], "color": "gray" },
                "encoding": { "x": x, "y": y },
            },
            {
                "data": { "values": [{
                    "fpf": region.fpf_min,
                    "fpf_max": region.fpf_max,
                    "tpf": region.tpf_min,
                    "tpf_max": region.tpf_max,
                }] },
                "mark": { "type": "rect", "filled": false, "stroke": "black" },
                "encoding": {
                    "x": x,
                    "x2": { "field": "fpf_max" },
                    "y": y,
                    "y2": { "field": "tpf_max" },
                },
            },
            {
                "data": { "values": [{ "fpf": region.fpf, "tpf": region.tpf }] },
                "mark": { "type": "point", "filled": true, "color": "black" },
                "encoding": { "x": x, "y": y },
            },
            {
                "data": { "values": [
                    { "fpf": 0.45, "tpf": 0.2, "label": sensitivity },
                    { "fpf": 0.45, "tpf": 0.12, "label": specificity },
                ] },
                "mark": { "type": "text", "align": "left" },
                "encoding": { "x": x, "y": y, "text": { "field": "label" } },
            },
        ],
    })
}

pub fn plot(opts: Options) -> Result<()> {
    let region = opts.conf.region(opts.counts.into())?;
    println!("{}", mk_chart(&region));
    Ok(())
}
