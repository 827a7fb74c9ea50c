mod binning;

use anyhow::Result;
use clap::{ArgAction, Command, arg};
use log::LevelFilter;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "bwmat";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Bin bigWig signal tracks into fixed-resolution, per-chromosome matrices for machine learning pipelines.")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose "Log debug messages")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(binning::cli::create_bin_cli())
        .subcommand(binning::cli::create_layout_cli())
}

fn init_logging(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_flag("verbose"));

    match matches.subcommand() {
        //
        // BIN
        //
        Some((binning::cli::BIN_CMD, matches)) => {
            binning::handlers::run_bin(matches)?;
        }

        //
        // LAYOUT (dry run)
        //
        Some((binning::cli::LAYOUT_CMD, matches)) => {
            binning::handlers::run_layout(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
