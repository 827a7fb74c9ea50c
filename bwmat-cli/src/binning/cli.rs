use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const BIN_CMD: &str = "bin";
pub const LAYOUT_CMD: &str = "layout";

fn chrom_sizes_arg() -> Arg {
    Arg::new("chrom-sizes")
        .long("chrom-sizes")
        .short('s')
        .value_name("FILE")
        .help("Chromosome sizes file: one `name<TAB>length` line per chromosome")
        .required(true)
}

fn coords_arg() -> Arg {
    Arg::new("coords")
        .long("coords")
        .short('c')
        .value_name("FILE")
        .help("Only bin the intervals of this bigBed or BED(.gz) file")
}

fn resolution_arg() -> Arg {
    Arg::new("resolution")
        .long("resolution")
        .short('r')
        .value_name("N")
        .help("Bin size in base pairs [default: 100]")
        .value_parser(value_parser!(u32))
}

pub fn create_bin_cli() -> Command {
    Command::new(BIN_CMD)
        .author("Databio")
        .about("Bin one or more bigWig tracks into a matrix per chromosome, written as .npy files.")
        .arg_required_else_help(true)
        .arg(resolution_arg())
        .arg(
            Arg::new("track")
                .long("track")
                .short('t')
                .value_name("PATH")
                .help("A bigWig track to bin; repeat for more tracks")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("tracks-dir")
                .long("tracks-dir")
                .short('T')
                .value_name("DIR")
                .help("Bin every track with a configured extension in this directory"),
        )
        .arg(chrom_sizes_arg())
        .arg(coords_arg())
        .arg(
            arg!(--threads <N> "Worker threads [default: all cores]")
                .required(false)
                .value_parser(value_parser!(usize)),
        )
        .arg(arg!(--transpose "Write tracks x bins matrices instead of bins x tracks"))
        .arg(arg!(--progress "Show a progress bar over chromosomes"))
        .arg(
            arg!(--config <FILE> "TOML configuration file; command line flags take precedence")
                .required(false),
        )
        .arg(
            Arg::new("out")
                .value_name("OUT_DIR")
                .help("Directory to write the matrices to")
                .required(true),
        )
}

pub fn create_layout_cli() -> Command {
    Command::new(LAYOUT_CMD)
        .author("Databio")
        .about("Print how many intervals and bins every chromosome gets, without reading any track.")
        .arg_required_else_help(true)
        .arg(chrom_sizes_arg())
        .arg(coords_arg())
        .arg(resolution_arg())
}
