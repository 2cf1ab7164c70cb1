use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{error::FetchError, state::ElectionCatalog, stats::StatsTable};

use super::{
    ElectionFeed, PrecinctListing,
    contact::{ContactMessage, PcoDirectory},
    csv,
};

/// Feed backed by a directory of exported files:
///
/// ```text
/// catalog.json                    elections and races
/// votes/<date>.json|csv           county-wide votes per precinct
/// results/<date>/<race>.json|csv  candidate results per precinct
/// precincts.json                  [{ "number": .., "name": .. }]
/// pcos.json                       { "<precinct>": { "name", "email", "precinct_name", "has_pco" } }
/// outbox.jsonl                    submitted contact messages, appended
/// ```
#[derive(Debug, Clone)]
pub struct DirFeed {
    root: PathBuf,
}

impl DirFeed {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn outbox_path(&self) -> PathBuf {
        self.root.join("outbox.jsonl")
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, FetchError> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(path.display().to_string()),
            _ => FetchError::Transport(format!("{}: {e}", path.display())),
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `<stem>.json` if present, else `<stem>.csv` converted by `from_csv`.
    fn read_payload(
        &self,
        stem: PathBuf,
        from_csv: fn(Vec<serde_json::Map<String, Value>>) -> anyhow::Result<Value>,
    ) -> Result<Value, FetchError> {
        let json_path = with_suffix(&stem, "json");
        if json_path.is_file() {
            return self.read_json(&json_path);
        }
        let csv_path = with_suffix(&stem, "csv");
        if csv_path.is_file() {
            return csv::read_rows(&csv_path)
                .and_then(from_csv)
                .map_err(|e| FetchError::Malformed(format!("{e:#}")));
        }
        Err(FetchError::NotFound(stem.display().to_string()))
    }
}

/// Append an extension without touching dots already in the name.
fn with_suffix(stem: &Path, ext: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// File name for a race; path separators are replaced.
fn race_file_stem(race: &str) -> String {
    race.trim().replace(['/', '\\'], "_")
}

impl ElectionFeed for DirFeed {
    fn fetch_election_votes(&self, date: &str) -> Result<StatsTable, FetchError> {
        let payload = self.read_payload(self.root.join("votes").join(date), csv::votes_payload)?;
        StatsTable::from_votes_payload(&payload)
    }

    fn fetch_election_results(&self, date: &str, race: &str) -> Result<StatsTable, FetchError> {
        let stem = self.root.join("results").join(date).join(race_file_stem(race));
        let payload = self.read_payload(stem, csv::results_payload)?;
        StatsTable::from_results_payload(&payload)
    }

    fn fetch_precinct_list(&self) -> Result<Vec<PrecinctListing>, FetchError> {
        let listings: Vec<PrecinctListing> = self.read_json(&self.root.join("precincts.json"))?;
        Ok(listings.into_iter().filter(|p| p.number.is_geographic()).collect())
    }

    fn submit_contact_message(&self, message: &ContactMessage) -> Result<(), FetchError> {
        message.validate().map_err(|e| FetchError::Rejected(e.to_string()))?;
        let line = serde_json::to_string(message)?;
        let path = self.outbox_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| FetchError::Transport(format!("{}: {e}", path.display())))?;
        writeln!(file, "{line}").map_err(|e| FetchError::Transport(format!("{}: {e}", path.display())))?;
        tracing::info!(precinct = %message.precinct_number, "[feed::dir] contact message queued");
        Ok(())
    }

    fn fetch_catalog(&self) -> Result<ElectionCatalog, FetchError> {
        let catalog: ElectionCatalog = self.read_json(&self.root.join("catalog.json"))?;
        Ok(catalog.normalized())
    }

    fn fetch_pco_directory(&self) -> Result<PcoDirectory, FetchError> {
        self.read_json(&self.root.join("pcos.json"))
    }
}
