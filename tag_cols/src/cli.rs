use std::path::PathBuf;

use clap::{
    crate_description, crate_name, crate_version, value_parser, Arg, ArgAction, ArgMatches,
    Command,
};

use utils::{init_log, LogLevel};

use crate::config::*;

fn column_arg() -> Arg {
    Arg::new("column")
        .short('c')
        .long("column")
        .value_parser(value_parser!(usize))
        .value_name("COL")
        .required(true)
        .help("Column to operate on (0 based)")
}

fn input_arg() -> Arg {
    Arg::new("input")
        .value_parser(value_parser!(PathBuf))
        .value_name("INPUT")
        .required(true)
        .help("Input file")
}

fn output_arg() -> Arg {
    Arg::new("output")
        .value_parser(value_parser!(PathBuf))
        .value_name("OUTPUT")
        .help("Output file [default: <stdout>]")
}

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .subcommand_required(true)
        .arg_required_else_help(true)
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
        .subcommand(
            Command::new("rescale")
                .about("Multiply one column by a constant factor")
                .arg(column_arg())
                .arg(
                    Arg::new("factor")
                        .short('f')
                        .long("factor")
                        .value_parser(value_parser!(f64))
                        .value_name("FLOAT")
                        .required(true)
                        .help("Factor to multiply the column by"),
                )
                .arg(input_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("normalize")
                .about("Divide one column by its value on the first data line")
                .arg(column_arg())
                .arg(input_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("add")
                .about("Insert a new column at the given position")
                .arg(column_arg())
                .arg(
                    Arg::new("value")
                        .short('v')
                        .long("value")
                        .value_parser(value_parser!(String))
                        .value_name("STRING")
                        .help("Constant value for the new column [default: line number labels L1, L2, ...]"),
                )
                .arg(input_arg())
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("extract")
                .about("Extract two columns from each line")
                .arg(
                    Arg::new("columns")
                        .short('c')
                        .long("columns")
                        .value_parser(value_parser!(usize))
                        .value_name("COL")
                        .num_args(2)
                        .required(true)
                        .help("The two columns to extract (0 based)"),
                )
                .arg(input_arg())
                .arg(output_arg()),
        )
}

fn get_column(m: &ArgMatches) -> usize {
    *m.get_one::<usize>("column").expect("Missing column")
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m);

    debug!("Processing command line options");

    let (sub, sm) = m
        .subcommand()
        .ok_or_else(|| anyhow!("Missing subcommand"))?;

    let op = match sub {
        "rescale" => ColOp::Rescale {
            col: get_column(sm),
            factor: *sm.get_one::<f64>("factor").expect("Missing factor"),
        },
        "normalize" => ColOp::Normalize {
            col: get_column(sm),
        },
        "add" => ColOp::Add {
            col: get_column(sm),
            value: sm.get_one::<String>("value").cloned(),
        },
        "extract" => {
            let v: Vec<usize> = sm
                .get_many::<usize>("columns")
                .expect("Missing columns")
                .copied()
                .collect();
            ColOp::Extract { cols: (v[0], v[1]) }
        }
        s => return Err(anyhow!("Unknown command {}", s)),
    };

    let input = sm
        .get_one::<PathBuf>("input")
        .expect("Missing input file")
        .to_owned();

    Ok(Config::new(
        op,
        input,
        sm.get_one::<PathBuf>("output").map(|p| p.to_owned()),
    ))
}
