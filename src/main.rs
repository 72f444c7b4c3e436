use clap::Parser;
use log::{info, warn};

mod args;
mod report;

fn main() {
    let args = args::Args::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
    info!("args: {:?}", args);

    if let Err(e) = report::run_analysis(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        std::process::exit(1);
    }
}
