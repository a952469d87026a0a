use chrono::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
pub mod chart;
pub mod error;
pub mod plot;

pub use error::{Error, ParseError};

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

/// canonical format for writing datetimes back out
pub const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// format of the tick labels on the shared time axis
pub const DT_AXIS_FORMAT: &str = "%Y-%m-%d %H:%M";

pub const DEFAULT_CSV: &str = "sensor_log.csv";
pub const DEFAULT_PNG: &str = "sensor_plot.png";

/// printed after a missing input file, the binary reads from the working directory
pub const NOT_FOUND_HINT: &str = "Please make sure the log file is in the working directory.";

/// naive formats accepted in the first column, after RFC 3339
const DT_INPUT_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
];

/// The three channels logged by the SCD41, one panel each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Co2,
    Temperature,
    Humidity,
}

impl Channel {
    /// panel order, top to bottom
    pub const ALL: [Channel; 3] = [Channel::Co2, Channel::Temperature, Channel::Humidity];

    /// name of the csv column holding the channel
    pub fn column(self) -> &'static str {
        match self {
            Channel::Co2 => "Avg_CO2_ppm",
            Channel::Temperature => "Avg_Temp_C",
            Channel::Humidity => "Avg_Humidity_RH",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Channel::Co2 => "CO2 Level",
            Channel::Temperature => "Temperature",
            Channel::Humidity => "Humidity",
        }
    }

    pub fn y_desc(self) -> &'static str {
        match self {
            Channel::Co2 => "CO2 (ppm)",
            Channel::Temperature => "Temperature (°C)",
            Channel::Humidity => "Humidity (%RH)",
        }
    }
}

/// The sensor time series, one vector per column.
/// Missing readings are stored as NAN.
#[derive(Debug, Clone)]
pub struct SensorLog {
    pub time: Vec<NaiveDateTime>,
    pub co2: Vec<f64>,
    pub temp: Vec<f64>,
    pub humidity: Vec<f64>,
}

impl SensorLog {
    pub fn new(capacity: usize) -> SensorLog {
        SensorLog {
            time: Vec::with_capacity(capacity),
            co2: Vec::with_capacity(capacity),
            temp: Vec::with_capacity(capacity),
            humidity: Vec::with_capacity(capacity),
        }
    }

    /// Init a SensorLog from csv.
    /// The first column is the datetime, the channels are looked up by header name
    /// and any other column is ignored.
    /// Empty channel cells become NAN, anything else that does not parse is an error.
    pub fn from_csv(fin: &Path) -> Result<SensorLog, Error> {
        let file = match File::open(fin) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::InputNotFound(fin.to_path_buf()))
            }
            Err(e) => return Err(ParseError::Io(e).into()),
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let headers = reader.headers()?.clone();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ParseError::NoHeader.into());
        }
        let mut columns = [0usize; 3];
        for (idx, channel) in columns.iter_mut().zip(Channel::ALL.iter()) {
            match headers.iter().skip(1).position(|h| h == channel.column()) {
                Some(p) => *idx = p + 1,
                // a header without rows is empty input, whatever its columns
                None if !reader.read_record(&mut csv::StringRecord::new())? => {
                    return Ok(SensorLog::new(0))
                }
                None => {
                    return Err(Error::MissingColumn {
                        column: channel.column(),
                        path: fin.to_path_buf(),
                    })
                }
            }
        }
        debug!(
            "columns of {}: datetime '{}', channels at {:?}",
            fin.display(),
            &headers[0],
            columns
        );

        let mut log = SensorLog::new(1024);
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let dt_field = record.get(0).unwrap_or_default();
            let dt = parse_datetime(dt_field).ok_or_else(|| ParseError::Timestamp {
                line,
                value: dt_field.to_string(),
            })?;
            let mut values = [f64::NAN; 3];
            let cells = values.iter_mut().zip(columns.iter()).zip(Channel::ALL.iter());
            for ((v, &idx), channel) in cells {
                let field = record.get(idx).unwrap_or_default();
                *v = parse_reading(field).ok_or_else(|| ParseError::Value {
                    line,
                    column: channel.column(),
                    value: field.to_string(),
                })?;
                if v.is_nan() {
                    warn!("line {}: missing {} reading", line, channel.column());
                }
            }
            log.time.push(dt);
            log.co2.push(values[0]);
            log.temp.push(values[1]);
            log.humidity.push(values[2]);
        }
        Ok(log)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// the readings of one channel, aligned with `time`
    pub fn values(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::Co2 => &self.co2,
            Channel::Temperature => &self.temp,
            Channel::Humidity => &self.humidity,
        }
    }
}

impl std::fmt::Display for SensorLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "datetime,{},{},{}",
            Channel::Co2.column(),
            Channel::Temperature.column(),
            Channel::Humidity.column()
        )?;
        for i in 0..self.len() {
            writeln!(
                f,
                "{},{},{},{}",
                self.time[i].format(DT_FORMAT),
                self.co2[i],
                self.temp[i],
                self.humidity[i]
            )?;
        }
        Ok(())
    }
}

/// What a run of the plotting pipeline ended with, short of a fatal error.
#[derive(Debug)]
pub enum Outcome {
    Saved { rows: usize, path: PathBuf },
    /// one of the reported input failures, already printed
    Aborted(Error),
}

/// Reads the sensor log at `csvin` and saves the three-panel plot to `pngout`.
/// Missing, unreadable or empty input is printed and returned as `Outcome::Aborted`;
/// missing columns and drawing failures are returned as errors.
pub fn plot_sensor_data(csvin: &Path, pngout: &Path) -> Result<Outcome, Error> {
    let log = match SensorLog::from_csv(csvin) {
        Ok(log) if log.is_empty() => return Ok(abort(Error::EmptyInput)),
        Ok(log) => log,
        Err(e) if e.is_reported() => return Ok(abort(e)),
        Err(e) => return Err(e),
    };
    println!(
        "Successfully loaded {} data points from '{}'.",
        log.len(),
        csvin.display()
    );
    log.plot_png(pngout).map_err(Error::Drawing)?;
    println!("Plot successfully saved to '{}'", pngout.display());
    Ok(Outcome::Saved {
        rows: log.len(),
        path: pngout.to_path_buf(),
    })
}

fn abort(e: Error) -> Outcome {
    println!("{}", e);
    if let Error::InputNotFound(_) = e {
        println!("{}", NOT_FOUND_HINT);
    }
    Outcome::Aborted(e)
}

/// Parses the datetime column, RFC 3339 (converted to UTC) first,
/// then the naive formats and finally a bare date at midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DT_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// empty cells are missing readings (NAN), None if the cell is not a number
fn parse_reading(s: &str) -> Option<f64> {
    if s.is_empty() {
        Some(f64::NAN)
    } else {
        s.parse().ok()
    }
}

/// min and max of the values, None for no values
pub fn min_and_max<T, I>(values: I) -> Option<(T, T)>
where
    T: PartialOrd + Copy,
    I: IntoIterator<Item = T>,
{
    let mut values = values.into_iter();
    let first = values.next()?;
    let (mut min, mut max) = (first, first);
    for v in values {
        if v > max {
            max = v
        }
        if v < min {
            min = v
        }
    }
    Some((min, max))
}
