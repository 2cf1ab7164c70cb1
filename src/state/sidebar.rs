use std::collections::BTreeMap;

use serde::Serialize;

use crate::{layer::FeatureLayer, types::PrecinctId};

/// One row of the precinct list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub id: PrecinctId,
    /// `#N name`
    pub label: String,
    pub hovered: bool,
    pub active: bool,
}

/// Searchable precinct list linked to the map's hover and selection.
#[derive(Debug, Clone, Default)]
pub struct Sidebar {
    entries: Vec<SidebarEntry>,
    query: String,
}

impl Sidebar {
    /// Entries for every layer feature, in numeric order.
    pub fn from_layer(layer: &FeatureLayer) -> Self {
        let mut entries: Vec<SidebarEntry> = layer.iter()
            .map(|feature| SidebarEntry {
                id: feature.id.clone(),
                label: feature.label(),
                hovered: false,
                active: false,
            })
            .collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        Self { entries, query: String::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SidebarEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &PrecinctId) -> Option<&SidebarEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
    }

    /// Entries whose label contains the search text, ignoring case.
    pub fn visible(&self) -> impl Iterator<Item = &SidebarEntry> {
        self.entries.iter().filter(|e| self.query.is_empty() || e.label.to_lowercase().contains(&self.query))
    }

    /// Relabel entries from the host's precinct list. Listed precincts that are not
    /// on the map stay out, blank names leave the boundary name in place.
    pub fn rename(&mut self, names: &BTreeMap<PrecinctId, String>) {
        for entry in &mut self.entries {
            if let Some(name) = names.get(&entry.id).map(|n| n.trim()).filter(|n| !n.is_empty()) {
                entry.label = format!("#{} {}", entry.id, name);
            }
        }
    }

    pub fn set_hovered(&mut self, id: Option<&PrecinctId>) {
        for entry in &mut self.entries {
            entry.hovered = Some(&entry.id) == id;
        }
    }

    pub fn set_active(&mut self, id: Option<&PrecinctId>) {
        for entry in &mut self.entries {
            entry.active = Some(&entry.id) == id;
        }
    }
}
