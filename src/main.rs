mod plot;
mod power;
mod pretty;
mod region;
mod sample_size;

use bpaf::*;

#[derive(Debug, Clone)]
enum Subcommand {
    Region(region::Options),
    Regions(region::BatchOptions),
    Plot(plot::Options),
    Phase2(sample_size::Phase2Options),
    Phase3(sample_size::Phase3Options),
    Power(power::Options),
}

fn subcommand() -> OptionParser<Subcommand> {
    let region = region::options().map(Subcommand::Region);
    let regions = region::batch_options().map(Subcommand::Regions);
    let plot = plot::options().map(Subcommand::Plot);
    let phase2 = sample_size::phase2_options().map(Subcommand::Phase2);
    let phase3 = sample_size::phase3_options().map(Subcommand::Phase3);
    let power = power::options().map(Subcommand::Power);
    construct!([region, regions, plot, phase2, phase3, power])
        .to_options()
        .descr("Design tools for studies of binary diagnostic tests")
        .version(env!("CARGO_PKG_VERSION"))
}

fn main() {
    env_logger::init();
    let result = match subcommand().run() {
        Subcommand::Region(opts) => region::region(opts),
        Subcommand::Regions(opts) => region::regions(opts),
        Subcommand::Plot(opts) => plot::plot(opts),
        Subcommand::Phase2(opts) => sample_size::phase2(opts),
        Subcommand::Phase3(opts) => sample_size::phase3(opts),
        Subcommand::Power(opts) => power::power(opts),
    };
    match result {
        Ok(()) => (),
        Err(e) => {
            // Ignore EPIPE
            if let Some(e) = e.downcast_ref::<std::io::Error>() {
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    return;
                }
            }
            eprintln!("Error: {:#}", e);
            std::process::exit(1)
        }
    }
}
