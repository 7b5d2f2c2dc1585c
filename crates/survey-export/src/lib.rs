//! Translations of planner results into interchange formats.
//!
//! Everything here is a read-only view over the result structures; no
//! function touches planner state.

pub mod csv_export;
pub mod geojson;
pub mod summary;

use thiserror::Error;

pub type ExportResult<T> = std::result::Result<T, ExportError>;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    CsvIntoInner(String),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
