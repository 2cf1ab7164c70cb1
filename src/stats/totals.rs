use serde::Serialize;

use crate::types::{CandidateVotes, turnout};

use super::table::StatsTable;

/// County-wide aggregates for the votes legend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub votes: u64,
    pub active_voters: u64,
    pub inactive_voters: u64,
    /// Active plus inactive voters.
    pub total_registered: u64,
    /// Vote total taken from the feed's total row rather than summed.
    pub official: bool,
}

impl Totals {
    /// The total row's vote count is authoritative when present; voter counts always
    /// come from real precincts.
    pub fn compute(table: &StatsTable) -> Self {
        let mut totals = table.iter().fold(Self::default(), |mut acc, (_, stat)| {
            acc.votes += stat.votes;
            acc.active_voters += stat.active_voters;
            acc.inactive_voters += stat.inactive_voters;
            acc
        });
        totals.total_registered = totals.active_voters + totals.inactive_voters;
        if let Some(total) = table.total() {
            totals.votes = total.votes;
            totals.official = true;
        }
        totals
    }

    /// Votes as a percentage of active voters.
    pub fn turnout(&self) -> f64 {
        turnout(self.votes, self.active_voters)
    }
}

/// Race-wide aggregates for the race legend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateTotals {
    /// Candidates in feed order (total row order, or first appearance across precincts).
    pub candidates: Vec<CandidateVotes>,
    pub votes: u64,
    /// Registered voters summed over real precincts.
    pub population: u64,
    pub official: bool,
}

impl CandidateTotals {
    pub fn compute(table: &StatsTable) -> Self {
        let population = table.iter().map(|(_, stat)| stat.total_registered).sum();

        let (candidates, official) = match table.total().and_then(|t| t.candidates.as_ref()) {
            Some(official) => (official.clone(), true),
            None => (sum_by_name(table), false),
        };
        let votes = candidates.iter().map(|c| c.votes).sum();

        Self { candidates, votes, population, official }
    }

    /// Votes as a percentage of the race population.
    pub fn turnout(&self) -> f64 {
        turnout(self.votes, self.population)
    }

    /// Candidates by votes, descending; equal counts keep feed order.
    pub fn ranked(&self) -> Vec<&CandidateVotes> {
        let mut ranked: Vec<&CandidateVotes> = self.candidates.iter().collect();
        ranked.sort_by(|a, b| b.votes.cmp(&a.votes));
        ranked
    }
}

fn sum_by_name(table: &StatsTable) -> Vec<CandidateVotes> {
    let mut sums: Vec<CandidateVotes> = Vec::new();
    let candidates = table.iter().flat_map(|(_, stat)| stat.candidates.iter().flatten());
    for candidate in candidates {
        match sums.iter_mut().find(|c| c.name == candidate.name) {
            Some(sum) => sum.votes += candidate.votes,
            None => sums.push(candidate.clone()),
        }
    }
    sums
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn official_vote_total_wins_but_voters_are_summed() {
        let table = StatsTable::from_votes_payload(&json!({
            "-1": { "votes": 500, "active_voters": 100000 },
            "1": { "votes": 100, "active_voters": 10, "inactive_voters": 1 },
            "2": { "votes": 200, "active_voters": 20, "inactive_voters": 2 },
        }))
        .unwrap();

        let totals = Totals::compute(&table);
        assert_eq!(totals.votes, 500);
        assert_eq!(totals.active_voters, 30);
        assert_eq!(totals.inactive_voters, 3);
        assert_eq!(totals.total_registered, 33);
        assert!(totals.official);
    }

    #[test]
    fn without_a_total_row_everything_is_summed() {
        let table = StatsTable::from_votes_payload(&json!({
            "1": { "votes": 10, "active_voters": 40 },
            "2": { "votes": 20, "active_voters": 0 },
        }))
        .unwrap();

        let totals = Totals::compute(&table);
        assert_eq!(totals.votes, 30);
        assert!(!totals.official);
        assert_eq!(totals.turnout(), 75.0);
        assert_eq!(Totals::default().turnout(), 0.0);
    }

    #[test]
    fn race_totals_prefer_the_official_candidate_list() {
        let table = StatsTable::from_results_payload(&json!({
            "-1": { "candidates": [{ "name": "A", "votes": 70 }, { "name": "B", "votes": 90 }] },
            "1": { "population": 100, "candidates": [{ "name": "A", "votes": 1 }] },
            "2": { "population": 150, "candidates": [{ "name": "B", "votes": 2 }] },
        }))
        .unwrap();

        let totals = CandidateTotals::compute(&table);
        assert!(totals.official);
        assert_eq!(totals.votes, 160);
        assert_eq!(totals.population, 250);
        assert_eq!(totals.ranked()[0].name, "B");
    }

    #[test]
    fn race_totals_aggregate_in_first_seen_order() {
        let table = StatsTable::from_results_payload(&json!({
            "1": { "population": 100, "candidates": [
                { "name": "B", "party": "Republican", "votes": 5 },
                { "name": "A", "party": "Democratic", "votes": 5 },
            ] },
            "2": { "population": 100, "candidates": [
                { "name": "A", "votes": 3 },
                { "name": "C", "votes": 1 },
            ] },
        }))
        .unwrap();

        let totals = CandidateTotals::compute(&table);
        let names: Vec<&str> = totals.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(totals.candidates[1].votes, 8);
        assert_eq!(totals.candidates[1].party.as_deref(), Some("Democratic"));
        assert_eq!(totals.turnout(), 7.0);
        let ranked: Vec<&str> = totals.ranked().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(ranked, vec!["A", "B", "C"]);
    }
}
