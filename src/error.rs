//! Error taxonomy for the map pipeline.
//!
//! None of these are fatal to a map instance: decode and fetch failures are converted
//! into [`crate::view::Notice`]s by the completion handlers, validation failures are
//! reported before anything is submitted.

use thiserror::Error;

/// Geometry archive could not be turned into a feature collection.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("geometry source could not be read: {0}")]
    Unreadable(String),

    #[error("malformed geometry archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("geometry archive has no {0} component")]
    MissingComponent(&'static str),

    #[error("malformed shapefile records: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("malformed attribute table: {0}")]
    Attributes(#[from] shapefile::dbase::Error),

    #[error("unsupported shape type {0}")]
    UnsupportedShape(String),

    #[error("archive member {name} is larger than {limit} bytes")]
    Oversized { name: String, limit: u64 },

    #[error("geometry loader stopped before reporting a result")]
    Interrupted,
}

/// Statistics request failed or was rejected by the host.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server answered with status {0}")]
    Status(u16),

    #[error("server rejected the request: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no data for {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// Contact form input rejected before submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("please provide a valid email address")]
    InvalidEmail,

    #[error("precinct {0} is not a contactable precinct")]
    InvalidPrecinct(String),
}

/// Filter transition refused by the state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("select an election before choosing a race")]
    NoElection,

    #[error("no election on {0}")]
    UnknownElection(String),

    #[error("race {race:?} is not on the {date} ballot")]
    UnknownRace { date: String, race: String },
}
