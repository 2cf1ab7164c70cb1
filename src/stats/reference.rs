use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{geometry::FeatureCollection, types::PrecinctId};

/// Per-precinct attributes from the voting reference archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrecinctReference {
    pub name: Option<String>,
    pub population: Option<u64>,
    pub legislative_district: Option<String>,
}

/// Reference attributes keyed by precinct. The first record of a precinct wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    rows: BTreeMap<PrecinctId, PrecinctReference>,
}

impl ReferenceTable {
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        let mut rows = BTreeMap::new();
        for feature in &collection.features {
            let Some(id) = feature.precinct_id().filter(PrecinctId::is_geographic) else { continue };
            rows.entry(id).or_insert_with(|| PrecinctReference {
                name: feature.precinct_name(),
                population: feature.population(),
                legislative_district: feature.legislative_district(),
            });
        }
        Self { rows }
    }

    pub fn get(&self, id: &PrecinctId) -> Option<&PrecinctReference> {
        self.rows.get(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Legislative districts that appear in the reference, sorted.
    pub fn districts(&self) -> BTreeSet<&str> {
        self.rows.values().filter_map(|r| r.legislative_district.as_deref()).collect()
    }
}
