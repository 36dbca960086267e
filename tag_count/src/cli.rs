use std::{num::NonZeroUsize, path::PathBuf};

use clap::{
    crate_description, crate_name, crate_version, value_parser, Arg, ArgAction, Command,
};

use anyhow::Context;

use utils::{init_log, LogLevel};

use crate::{config::*, input};

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("warn")
                .help("Set log level"),
        )
        .arg(
            Arg::new("quiet")
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with("loglevel")
                .help("Silence all output"),
        )
        .arg(
            Arg::new("summary")
                .action(ArgAction::SetTrue)
                .short('S')
                .long("summary")
                .help("Treat inputs as summary graph files and total their scores"),
        )
        .arg(
            Arg::new("threshold")
                .short('T')
                .long("threshold")
                .value_parser(value_parser!(f64))
                .value_name("FLOAT")
                .requires("summary")
                .help("Minimum score for an interval to count towards the total (0 disables filtering)"),
        )
        .arg(
            Arg::new("check_sort")
                .action(ArgAction::SetTrue)
                .short('c')
                .long("check-sort")
                .requires("summary")
                .help("Check that intervals are sorted on start position before totalling"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_parser(value_parser!(NonZeroUsize))
                .value_name("INT")
                .help("Set number of counting threads [default: available cores minus one]"),
        )
        .arg(
            Arg::new("input_dir")
                .short('D')
                .long("input-dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .conflicts_with("input")
                .help("Collect per chromosome files from this directory instead of the command line"),
        )
        .arg(
            Arg::new("prefix")
                .short('P')
                .long("prefix")
                .value_parser(value_parser!(String))
                .value_name("STRING")
                .default_value("tags")
                .help("Set prefix for per chromosome file names"),
        )
        .arg(
            Arg::new("suffix")
                .short('s')
                .long("suffix")
                .value_parser(value_parser!(String))
                .value_name("STRING")
                .default_value("bed")
                .help("Set suffix for per chromosome file names"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output-file")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Set output file [default: <stdout>]"),
        )
        .arg(
            Arg::new("input")
                .value_parser(value_parser!(PathBuf))
                .value_name("FILE")
                .num_args(1..)
                .required_unless_present("input_dir")
                .help("Input tag or summary graph files"),
        )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");

    let mode = if m.get_flag("summary") {
        CountMode::Summary {
            threshold: m.get_one::<f64>("threshold").copied().unwrap_or(0.0),
            check_sort: m.get_flag("check_sort"),
        }
    } else {
        CountMode::Tags
    };

    let inputs = if let Some(dir) = m.get_one::<PathBuf>("input_dir") {
        let prefix = m
            .get_one::<String>("prefix")
            .expect("Missing default prefix");
        let suffix = m
            .get_one::<String>("suffix")
            .expect("Missing default suffix");
        input::find_chrom_files(dir, prefix, suffix)
            .with_context(|| "Error collecting input files")?
    } else {
        m.get_many::<PathBuf>("input")
            .expect("Missing input files")
            .cloned()
            .collect()
    };

    // Catch missing inputs before starting any counting
    for p in inputs.iter() {
        if !p.is_file() {
            return Err(anyhow!("Input file {} not found", p.display()));
        }
    }

    debug!("Number of input files: {}", inputs.len());

    let nt = m
        .get_one::<NonZeroUsize>("threads")
        .map(|x| usize::from(*x))
        .unwrap_or_else(utils::n_workers);

    Ok(Config::new(
        inputs,
        mode,
        nt,
        m.get_one::<PathBuf>("output").map(|p| p.to_owned()),
    ))
}
