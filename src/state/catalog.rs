use serde::{Deserialize, Serialize};

/// One race on one election's ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceListing {
    pub election_date: String,
    pub race_name: String,
}

/// Elections and races the feed has results for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCatalog {
    #[serde(default)]
    elections: Vec<String>,
    #[serde(default)]
    races: Vec<RaceListing>,
}

impl ElectionCatalog {
    /// Dates are `YYYY-MM-DD`; elections are kept newest first, races by date then name.
    pub fn new(elections: impl IntoIterator<Item = String>, races: impl IntoIterator<Item = RaceListing>) -> Self {
        Self { elections: elections.into_iter().collect(), races: races.into_iter().collect() }.normalized()
    }

    /// Sort and deduplicate, adding any election that only appears through its races.
    pub fn normalized(mut self) -> Self {
        for race in &self.races {
            if !self.elections.contains(&race.election_date) {
                self.elections.push(race.election_date.clone());
            }
        }
        self.elections.sort_by(|a, b| b.cmp(a));
        self.elections.dedup();
        self.races.sort_by(|a, b| b.election_date.cmp(&a.election_date).then_with(|| a.race_name.cmp(&b.race_name)));
        self.races.dedup();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.elections.is_empty()
    }

    pub fn elections(&self) -> &[String] {
        &self.elections
    }

    /// The most recent election, selected when a map opens.
    pub fn latest(&self) -> Option<&str> {
        self.elections.first().map(String::as_str)
    }

    pub fn has_election(&self, date: &str) -> bool {
        self.elections.iter().any(|d| d == date)
    }

    /// Race names on one election's ballot, alphabetical.
    pub fn races_for(&self, date: &str) -> Vec<&str> {
        self.races.iter()
            .filter(|r| r.election_date == date)
            .map(|r| r.race_name.as_str())
            .collect()
    }

    pub fn has_race(&self, date: &str, race: &str) -> bool {
        self.races.iter().any(|r| r.election_date == date && r.race_name == race)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race(date: &str, name: &str) -> RaceListing {
        RaceListing { election_date: date.into(), race_name: name.into() }
    }

    #[test]
    fn elections_are_newest_first_and_races_grouped() {
        let catalog = ElectionCatalog::new(
            vec!["2023-11-07".to_string()],
            vec![race("2024-11-05", "Sheriff"), race("2024-11-05", "Governor"), race("2023-11-07", "Port")],
        );
        assert_eq!(catalog.elections(), &["2024-11-05".to_string(), "2023-11-07".to_string()]);
        assert_eq!(catalog.latest(), Some("2024-11-05"));
        assert_eq!(catalog.races_for("2024-11-05"), vec!["Governor", "Sheriff"]);
        assert!(catalog.has_race("2023-11-07", "Port"));
        assert!(!catalog.has_race("2024-11-05", "Port"));
    }

    #[test]
    fn deserializes_feed_shape() {
        let catalog: ElectionCatalog = serde_json::from_str(
            r#"{"elections":["2024-08-06"],"races":[{"race_name":"Governor","election_date":"2024-08-06"}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.races_for("2024-08-06"), vec!["Governor"]);
    }
}
