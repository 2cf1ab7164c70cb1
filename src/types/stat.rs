use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Votes received by one candidate in one precinct (or county-wide on the total row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateVotes {
    pub name: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub party: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub votes: u64,
}

impl CandidateVotes {
    pub fn new(name: impl Into<String>, party: Option<&str>, votes: u64) -> Self {
        Self { name: name.into(), party: party.map(str::to_string), votes }
    }
}

/// Joined statistic record for one precinct under one (election, race) selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrecinctStat {
    pub precinct_name: Option<String>,
    pub active_voters: u64,
    pub inactive_voters: u64,
    pub total_registered: u64,
    pub votes: u64,
    pub candidates: Option<Vec<CandidateVotes>>,
}

impl PrecinctStat {
    /// Zero-filled record substituted for precincts missing from a feed.
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Record for a race: `votes` is the sum of the candidates' votes.
    pub fn from_candidates(precinct_name: Option<String>, registered: u64, candidates: Vec<CandidateVotes>) -> Self {
        Self {
            precinct_name,
            total_registered: registered,
            votes: candidates.iter().map(|c| c.votes).sum(),
            candidates: Some(candidates),
            ..Self::default()
        }
    }

    /// Percentage of active voters who voted, `0.0` when there are no active voters.
    pub fn turnout(&self) -> f64 {
        turnout(self.votes, self.active_voters)
    }
}

/// `votes / base * 100`, defined as `0.0` for an empty base.
pub fn turnout(votes: u64, base: u64) -> f64 {
    if base == 0 { 0.0 } else { votes as f64 / base as f64 * 100.0 }
}

/// Counts arrive as numbers, numeric strings or null; anything unparsable counts as zero.
pub(crate) fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(count_from_value(&Value::deserialize(deserializer)?))
}

pub(crate) fn count_from_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64()
            .or_else(|| n.as_f64().filter(|x| *x > 0.0).map(|x| x.trunc() as u64))
            .unwrap_or(0),
        Value::String(s) => leading_integer(s),
        _ => 0,
    }
}

/// Integer prefix of a string (`"12 votes"` → 12), zero when there is none.
fn leading_integer(s: &str) -> u64 {
    let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn non_empty_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}
