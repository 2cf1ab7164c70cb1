//! Map configuration loaded from JSON.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    scale::{DISTRICT_GRAY, PartyPalette, Rgb},
    state::Viewport,
};

/// Where statistics come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Host AJAX endpoint (form-encoded POST).
    pub endpoint: Option<String>,
    pub nonce: String,
    /// Static JSON export of the election catalog.
    pub catalog_url: Option<String>,
    /// Static JSON export of the PCO directory.
    pub pco_url: Option<String>,
    /// Directory of exported files, used when no endpoint is set.
    pub data_dir: Option<String>,
}

/// Settings of one map instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Party name to fill color; unlisted parties are gray.
    pub party_colors: BTreeMap<String, Rgb>,
    /// Legislative district to fill color for the default view.
    pub district_colors: BTreeMap<String, Rgb>,
    pub default_view: Viewport,
    /// Cap applied when zooming to a selected precinct.
    pub max_zoom: f64,
    /// Map size in pixels, used to fit bounds.
    pub map_size: (f64, f64),
    /// Categorical opacity from zero votes to the busiest precinct.
    pub opacity_range: (f64, f64),
    pub info_title: String,
    /// Precinct boundary archive.
    pub boundary_archive: Option<String>,
    /// Voting reference archive (population, legislative district).
    pub voting_archive: Option<String>,
    pub feed: FeedConfig,
    /// Select the newest election as soon as the catalog is known.
    pub auto_select_latest: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        let district_colors = [("19", Rgb::new(0xff, 0x7f, 0x00)), ("20", Rgb::new(0x37, 0x7e, 0xb8)), ("35", Rgb::new(0x4d, 0xaf, 0x4a))]
            .into_iter()
            .map(|(d, c)| (d.to_string(), c))
            .collect();
        Self {
            party_colors: BTreeMap::new(),
            district_colors,
            default_view: Viewport::default(),
            max_zoom: 12.0,
            map_size: (800.0, 600.0),
            opacity_range: (0.3, 0.9),
            info_title: "Lewis County Precinct".to_string(),
            boundary_archive: None,
            voting_archive: None,
            feed: FeedConfig::default(),
            auto_select_latest: true,
        }
    }
}

impl MapConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("[config] Failed to parse {}", path.display()))
    }

    pub fn palette(&self) -> PartyPalette {
        PartyPalette::new(self.party_colors.iter().map(|(k, v)| (k.clone(), *v)).collect::<HashMap<_, _>>())
    }

    /// Fill for a legislative district in the default view.
    pub fn district_color(&self, district: Option<&str>) -> Rgb {
        district
            .and_then(|d| self.district_colors.get(d.trim()))
            .copied()
            .unwrap_or(DISTRICT_GRAY)
    }
}
