use super::{DEFAULT_CSV, VERSION};
use clap::{App, Arg, ArgMatches};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Takes the CLI arguments for plotting the sensor log: the csv file and the verbose flag.
/// The output png is always `DEFAULT_PNG`.
pub fn parse_cli() -> (PathBuf, bool) {
    cli_values(&cli_app().get_matches())
}

fn cli_app() -> App<'static, 'static> {
    let arg_csvin = Arg::with_name("input_csvfile")
        .help("name of the csv file with the sensor log")
        .short("f")
        .long("csvfile")
        .takes_value(true)
        .default_value(DEFAULT_CSV);
    let arg_verbose = Arg::with_name("verbose")
        .help("print diagnostic information on stderr")
        .short("v")
        .long("verbose")
        .takes_value(false)
        .required(false);
    App::new("scd41_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot the CO2, temperature and humidity time series")
        .arg(arg_csvin)
        .arg(arg_verbose)
}

fn cli_values(cli_args: &ArgMatches) -> (PathBuf, bool) {
    let csvin = PathBuf::from(cli_args.value_of("input_csvfile").unwrap_or(DEFAULT_CSV));
    let verbose = cli_args.is_present("verbose");
    (csvin, verbose)
}

/// Diagnostics go to stderr, stdout is left to the progress messages.
/// RUST_LOG takes precedence over the verbose flag.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
