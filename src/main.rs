use clap::Parser;
use log::{info, warn, LevelFilter};
use snafu::ErrorCompat;

mod args;
mod ravg;

fn main() {
    let args = args::Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    } else if std::env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Info);
    }
    logger.init();
    info!("args: {:?}", args);

    let overrides = ravg::Overrides {
        input: args.input.clone(),
        input_type: args.input_type.clone(),
        formula: args.formula.clone(),
        supervisor_weight: args.supervisor_weight,
        owner: args.owner.clone(),
        excel_worksheet_name: args.excel_worksheet_name.clone(),
    };

    let res = ravg::run_collection(args.config, &overrides, args.out, args.reference);
    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
