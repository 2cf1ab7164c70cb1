use std::{fmt, fs, path::PathBuf};

use bytes::Bytes;

use crate::error::DecodeError;

/// Where a geometry archive comes from. All variants decode identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometrySource {
    Url(String),
    Path(PathBuf),
    Bytes(Bytes),
}

impl GeometrySource {
    /// `http(s)://` locations are URLs, anything else is a filesystem path.
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::Path(PathBuf::from(location))
        }
    }

    /// Fetch the archive bytes. Blocking; run it off the interaction thread.
    pub fn read(&self) -> Result<Bytes, DecodeError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Path(path) => fs::read(path)
                .map(Bytes::from)
                .map_err(|e| DecodeError::Unreadable(format!("{}: {e}", path.display()))),
            Self::Url(url) => fetch_url(url),
        }
    }
}

impl fmt::Display for GeometrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Bytes(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}

impl From<Vec<u8>> for GeometrySource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

#[cfg(feature = "download")]
fn fetch_url(url: &str) -> Result<Bytes, DecodeError> {
    let unreadable = |e: reqwest::Error| DecodeError::Unreadable(format!("GET {url}: {e}"));
    reqwest::blocking::get(url)
        .map_err(unreadable)?
        .error_for_status()
        .map_err(unreadable)?
        .bytes()
        .map_err(unreadable)
}

#[cfg(not(feature = "download"))]
fn fetch_url(url: &str) -> Result<Bytes, DecodeError> {
    Err(DecodeError::Unreadable(format!("{url}: built without the `download` feature")))
}
