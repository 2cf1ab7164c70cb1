use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::Serialize;

use crate::{
    scale::{HeatScale, PartyPalette, Rgb, ScaleTick},
    stats::{CandidateTotals, Totals},
};

use super::format::{display_date, percent, share, thousands};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictEntry {
    pub district: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub name: String,
    /// `"No Party"` when the feed has none.
    pub party: String,
    pub color: Rgb,
    pub votes: u64,
    pub percent: f64,
}

/// Legend contents for the current filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Legend {
    /// No election selected: one swatch per active, colored legislative district.
    Districts { entries: Vec<DistrictEntry> },
    /// County-wide vote summary with the heat scale.
    Votes {
        election_date: String,
        totals: Totals,
        turnout: f64,
        ticks: Vec<ScaleTick>,
    },
    /// Race summary with ranked candidates.
    Race {
        race: String,
        election_date: String,
        votes: u64,
        official: bool,
        population: u64,
        turnout: f64,
        candidates: Vec<RankedCandidate>,
    },
}

impl Legend {
    /// Districts present on the map that have a configured color, sorted.
    pub fn districts<'a>(active: impl IntoIterator<Item = &'a str>, colors: &BTreeMap<String, Rgb>) -> Self {
        let active: BTreeSet<&str> = active.into_iter().collect();
        let entries = active
            .into_iter()
            .filter_map(|d| colors.get(d).map(|&color| DistrictEntry { district: d.to_string(), color }))
            .collect();
        Legend::Districts { entries }
    }

    pub fn votes(election_date: &str, totals: Totals, scale: &HeatScale) -> Self {
        Legend::Votes {
            election_date: election_date.to_string(),
            turnout: totals.turnout(),
            totals,
            ticks: scale.ticks(),
        }
    }

    pub fn race(race: &str, election_date: &str, totals: &CandidateTotals, palette: &PartyPalette) -> Self {
        let candidates = totals
            .ranked()
            .into_iter()
            .map(|c| RankedCandidate {
                name: c.name.clone(),
                party: c.party.clone().unwrap_or_else(|| "No Party".to_string()),
                color: palette.color(c.party.as_deref()),
                votes: c.votes,
                percent: share(c.votes, totals.votes),
            })
            .collect();
        Legend::Race {
            race: race.to_string(),
            election_date: election_date.to_string(),
            votes: totals.votes,
            official: totals.official,
            population: totals.population,
            turnout: totals.turnout(),
            candidates,
        }
    }
}

fn official_marker(official: bool) -> &'static str {
    if official { " (Official)" } else { "" }
}

impl fmt::Display for Legend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Legend::Districts { entries } => {
                write!(f, "Legislative Districts")?;
                for entry in entries {
                    write!(f, "\n  {} District {}", entry.color, entry.district)?;
                }
                Ok(())
            }
            Legend::Votes { election_date, totals, turnout, ticks } => {
                writeln!(f, "Results Summary")?;
                writeln!(f, "Election Date: {}", display_date(election_date))?;
                writeln!(f, "Active Voters: {}", thousands(totals.active_voters))?;
                writeln!(f, "Inactive Voters: {}", thousands(totals.inactive_voters))?;
                writeln!(f, "Total Registered: {}", thousands(totals.total_registered))?;
                writeln!(f, "Total Votes Cast: {}{}", thousands(totals.votes), official_marker(totals.official))?;
                writeln!(f, "Voter Turnout: {}", percent(*turnout))?;
                write!(f, "Vote Count Scale")?;
                for tick in ticks {
                    write!(f, "\n  {} {}", tick.color, thousands(tick.value))?;
                }
                Ok(())
            }
            Legend::Race { race, election_date, votes, official, population, turnout, candidates } => {
                writeln!(f, "{race}")?;
                writeln!(f, "Election Date: {}", display_date(election_date))?;
                writeln!(f, "Total Votes: {}{}", thousands(*votes), official_marker(*official))?;
                writeln!(f, "Total Population: {}", thousands(*population))?;
                write!(f, "Overall Turnout: {}", percent(*turnout))?;
                for (rank, c) in candidates.iter().enumerate() {
                    write!(
                        f,
                        "\n  {}. {} {} ({}): {} {}",
                        rank + 1,
                        c.color,
                        c.name,
                        c.party,
                        thousands(c.votes),
                        percent(c.percent),
                    )?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        stats::StatsTable,
        types::{CandidateVotes, PrecinctId, PrecinctStat},
    };

    #[test]
    fn district_legend_lists_only_colored_active_districts() {
        let colors: BTreeMap<String, Rgb> = [("19", "#ff7f00"), ("20", "#377eb8"), ("35", "#4daf4a")]
            .into_iter()
            .map(|(d, c)| (d.to_string(), Rgb::from_hex(c).unwrap()))
            .collect();
        let legend = Legend::districts(["35", "20", "99", "20"], &colors);
        assert_eq!(legend.to_string(), "Legislative Districts\n  #377eb8 District 20\n  #4daf4a District 35");
    }

    #[test]
    fn votes_legend_marks_official_totals() {
        let table = StatsTable::from_rows([
            (PrecinctId::total_row(), PrecinctStat { votes: 900, ..PrecinctStat::zeroed() }),
            (
                PrecinctId::new("1"),
                PrecinctStat { votes: 300, active_voters: 1000, inactive_voters: 100, ..PrecinctStat::zeroed() },
            ),
        ]);
        let legend = Legend::votes("2024-11-05", Totals::compute(&table), &HeatScale::new(300));
        let text = legend.to_string();
        assert!(text.contains("Election Date: November 5, 2024"));
        assert!(text.contains("Total Registered: 1,100"));
        assert!(text.contains("Total Votes Cast: 900 (Official)"));
        assert!(text.contains("Voter Turnout: 90.0%"));
        let Legend::Votes { ticks, .. } = legend else { panic!("expected a votes legend") };
        assert_eq!(ticks.len(), 6);
    }

    #[test]
    fn race_legend_ranks_candidates() {
        let table = StatsTable::from_rows([
            (
                PrecinctId::new("1"),
                PrecinctStat::from_candidates(
                    None,
                    100,
                    vec![CandidateVotes::new("A", Some("Democratic"), 20), CandidateVotes::new("B", None, 60)],
                ),
            ),
        ]);
        let totals = CandidateTotals::compute(&table);
        let legend = Legend::race("Governor", "2024-11-05", &totals, &PartyPalette::default());
        let Legend::Race { candidates, turnout, official, .. } = &legend else { panic!("expected a race legend") };
        assert!(!official);
        assert_eq!(*turnout, 80.0);
        assert_eq!(candidates[0].name, "B");
        assert_eq!(candidates[0].party, "No Party");
        assert_eq!(percent(candidates[0].percent), "75.0%");
        assert!(legend.to_string().starts_with("Governor\nElection Date: November 5, 2024\nTotal Votes: 80\n"));
    }
}
