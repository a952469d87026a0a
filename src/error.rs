use std::path::PathBuf;
use thiserror::Error;

/// Why a line of the sensor log could not be read.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("no header row found")]
    NoHeader,
    #[error("line {line}: could not parse '{value}' as a date and time")]
    Timestamp { line: u64, value: String },
    #[error("line {line}: could not parse '{value}' in column '{column}' as a number")]
    Value {
        line: u64,
        column: &'static str,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error: The file '{}' was not found.", .0.display())]
    InputNotFound(PathBuf),
    #[error("An error occurred while reading the CSV file: {0}")]
    InputParse(#[from] ParseError),
    #[error("The CSV file is empty. No data to plot.")]
    EmptyInput,
    #[error("column '{column}' not found in the header of '{}'", .path.display())]
    MissingColumn { column: &'static str, path: PathBuf },
    #[error("could not draw the sensor plot: {0}")]
    Drawing(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// true for the failures that end a run with a message instead of a crash:
    /// missing input, unreadable input and input without data rows
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            Error::InputNotFound(_) | Error::InputParse(_) | Error::EmptyInput
        )
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::InputParse(ParseError::Csv(e))
    }
}
