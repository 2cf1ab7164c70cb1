use std::collections::{BTreeMap, BTreeSet};

use crate::{
    layer::FeatureLayer,
    types::{PrecinctId, PrecinctStat},
};

use super::table::StatsTable;

/// Every layer feature paired with a statistic record.
///
/// Precincts the feed did not mention carry zero-filled records, rows for precincts
/// outside the layer are left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedView {
    stats: BTreeMap<PrecinctId, PrecinctStat>,
    missing: BTreeSet<PrecinctId>,
}

impl JoinedView {
    pub fn get(&self, id: &PrecinctId) -> Option<&PrecinctStat> {
        self.stats.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PrecinctId, &PrecinctStat)> {
        self.stats.iter()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Number of features that received a zero-filled record.
    pub fn missing(&self) -> usize {
        self.missing.len()
    }

    /// Whether the feed had no row for this precinct.
    pub fn is_missing(&self, id: &PrecinctId) -> bool {
        self.missing.contains(id)
    }

    /// Largest vote count across joined precincts.
    pub fn max_votes(&self) -> u64 {
        self.stats.values().map(|stat| stat.votes).max().unwrap_or(0)
    }
}

/// Attach a stat to every feature of `layer`.
pub fn join(layer: &FeatureLayer, table: &StatsTable) -> JoinedView {
    let mut missing = BTreeSet::new();
    let stats = layer.ids()
        .map(|id| {
            let stat = table.get(id).cloned().unwrap_or_else(|| {
                missing.insert(id.clone());
                PrecinctStat::zeroed()
            });
            (id.clone(), stat)
        })
        .collect();

    let unmatched = table.iter().filter(|(id, _)| !layer.contains(id)).count();
    tracing::debug!(features = layer.len(), missing = missing.len(), unmatched, "[stats::join] joined");

    JoinedView { stats, missing }
}

#[cfg(test)]
mod tests {
    use geo::Point;
    use serde_json::json;

    use super::*;
    use crate::{
        geometry::{Feature, FeatureCollection, Geometry},
        layer::FeatureStyle,
        scale::DISTRICT_GRAY,
    };

    fn layer(numbers: &[i64]) -> FeatureLayer {
        let features = numbers.iter()
            .map(|n| Feature::new(
                Geometry::Point(Point::new(*n as f64, 0.0)),
                json!({ "PRECINCT_N": n }).as_object().cloned().unwrap(),
            ))
            .collect();
        FeatureLayer::build(
            &FeatureCollection { features, projection: None },
            |_| FeatureStyle::district(DISTRICT_GRAY),
            None,
        )
    }

    #[test]
    fn missing_precincts_are_zero_filled() {
        let table = StatsTable::from_votes_payload(&json!({
            "1": { "votes": 30, "active_voters": 100 },
            "-1": { "votes": 999 },
            "42": { "votes": 5 },
        }))
        .unwrap();

        let view = join(&layer(&[1, 2]), &table);
        assert_eq!(view.len(), 2);
        assert_eq!(view.get(&PrecinctId::new("1")).unwrap().votes, 30);
        assert_eq!(view.get(&PrecinctId::new("2")), Some(&PrecinctStat::zeroed()));
        assert_eq!(view.get(&PrecinctId::new("42")), None);
        assert_eq!(view.get(&PrecinctId::total_row()), None);
        assert_eq!(view.missing(), 1);
        assert!(view.is_missing(&PrecinctId::new("2")));
        assert_eq!(view.max_votes(), 30);
    }
}
