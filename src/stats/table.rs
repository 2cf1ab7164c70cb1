use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::FetchError,
    types::{CandidateVotes, PrecinctId, PrecinctStat, count_from_value, lenient_count},
};

/// Statistics for one (election, race) selection.
///
/// The total row (`-1`) lives in its own slot and the sentinel (`0`) is dropped at
/// construction, so iterating rows only ever yields real precincts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTable {
    rows: BTreeMap<PrecinctId, PrecinctStat>,
    total: Option<PrecinctStat>,
}

/// One row of a county-wide votes payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VotesRow {
    precinct_name: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    votes: u64,
    #[serde(deserialize_with = "lenient_count")]
    active_voters: u64,
    #[serde(deserialize_with = "lenient_count")]
    inactive_voters: u64,
    total_registered: Option<Value>,
    population: Option<Value>,
}

/// One row of a race results payload.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResultsRow {
    precinct_name: Option<String>,
    #[serde(alias = "population")]
    registered_voters: Option<Value>,
    candidates: Vec<CandidateVotes>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from keyed rows, splitting out the total row and dropping the sentinel.
    pub fn from_rows(rows: impl IntoIterator<Item = (PrecinctId, PrecinctStat)>) -> Self {
        let mut table = Self::default();
        for (id, stat) in rows {
            table.insert(id, stat);
        }
        table
    }

    pub fn insert(&mut self, id: PrecinctId, stat: PrecinctStat) {
        if id.is_total_row() {
            self.total = Some(stat);
        } else if !id.is_sentinel() {
            self.rows.insert(id, stat);
        }
    }

    /// Parse a votes payload: an object keyed by precinct number.
    pub fn from_votes_payload(payload: &Value) -> Result<Self, FetchError> {
        let mut table = Self::default();
        for (key, row) in payload_rows(payload)? {
            let row: VotesRow = serde_json::from_value(row.clone())?;
            let registered = row.total_registered.as_ref()
                .or(row.population.as_ref())
                .map(count_from_value)
                .unwrap_or(row.active_voters + row.inactive_voters);
            table.insert(PrecinctId::new(key), PrecinctStat {
                precinct_name: row.precinct_name,
                active_voters: row.active_voters,
                inactive_voters: row.inactive_voters,
                total_registered: registered,
                votes: row.votes,
                candidates: None,
            });
        }
        Ok(table)
    }

    /// Parse a race results payload: an object keyed by precinct number with candidate lists.
    pub fn from_results_payload(payload: &Value) -> Result<Self, FetchError> {
        let mut table = Self::default();
        for (key, row) in payload_rows(payload)? {
            let row: ResultsRow = serde_json::from_value(row.clone())?;
            let registered = row.registered_voters.as_ref().map_or(0, count_from_value);
            table.insert(
                PrecinctId::new(key),
                PrecinctStat::from_candidates(row.precinct_name, registered, row.candidates),
            );
        }
        Ok(table)
    }

    pub fn get(&self, id: &PrecinctId) -> Option<&PrecinctStat> {
        self.rows.get(id)
    }

    /// The `-1` row, when the feed supplied official totals.
    pub fn total(&self) -> Option<&PrecinctStat> {
        self.total.as_ref()
    }

    /// Real precincts in numeric order.
    pub fn iter(&self) -> impl Iterator<Item = (&PrecinctId, &PrecinctStat)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn payload_rows(payload: &Value) -> Result<Vec<(&str, &Value)>, FetchError> {
    match payload {
        Value::Object(object) => Ok(object.iter().map(|(key, row)| (key.as_str(), row)).collect()),
        // an empty keyed array arrives as `[]`
        Value::Array(items) if items.is_empty() => Ok(Vec::new()),
        other => Err(FetchError::Malformed(format!("expected an object keyed by precinct, got {other}"))),
    }
}
