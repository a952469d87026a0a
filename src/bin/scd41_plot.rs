use scd41_viz::plot::{init_logging, parse_cli};
use scd41_viz::{plot_sensor_data, Outcome, DEFAULT_PNG};
use std::path::Path;
use tracing::debug;

fn main() -> Result<(), scd41_viz::Error> {
    let (csvin, verbose) = parse_cli();
    init_logging(verbose);
    debug!("read data from {} and plot to {}", csvin.display(), DEFAULT_PNG);
    match plot_sensor_data(&csvin, Path::new(DEFAULT_PNG))? {
        Outcome::Saved { rows, path } => debug!("{} rows plotted to {}", rows, path.display()),
        Outcome::Aborted(e) => debug!("nothing plotted: {:?}", e),
    }
    Ok(())
}
