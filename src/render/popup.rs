use std::fmt;

use serde::Serialize;

use crate::{
    feed::PcoDirectory,
    layer::LayerFeature,
    scale::{PartyPalette, Rgb},
    stats::PrecinctReference,
    types::{PrecinctId, PrecinctStat},
};

use super::format::{percent, share, thousands};

/// One row of the candidate table in a race popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRow {
    pub name: String,
    pub party: Option<String>,
    pub color: Rgb,
    pub votes: u64,
    /// Share of the precinct's own vote total.
    pub percent: f64,
}

/// What the contact link in a popup offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PcoAction {
    Contact { name: String },
    Become,
}

/// Voter registration block: the votes view shows the breakdown, the race view only the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Registration {
    Breakdown { active: u64, inactive: u64, total: u64 },
    Registered { total: u64 },
}

/// Popup for a clicked precinct while election statistics are shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecinctSummary {
    pub id: PrecinctId,
    /// `"<name> (#<number>)"`.
    pub title: String,
    pub registration: Registration,
    pub votes: u64,
    pub turnout: f64,
    /// Ranked by votes, empty outside the race view.
    pub candidates: Vec<CandidateRow>,
    pub pco: Option<PcoAction>,
}

impl PrecinctSummary {
    /// County-wide votes view. Turnout is relative to active voters.
    pub fn votes(feature: &LayerFeature, stat: &PrecinctStat) -> Self {
        Self {
            id: feature.id.clone(),
            title: title(feature, stat),
            registration: Registration::Breakdown {
                active: stat.active_voters,
                inactive: stat.inactive_voters,
                total: stat.total_registered,
            },
            votes: stat.votes,
            turnout: stat.turnout(),
            candidates: Vec::new(),
            pco: None,
        }
    }

    /// Race view. Turnout is relative to registered voters.
    pub fn race(feature: &LayerFeature, stat: &PrecinctStat, palette: &PartyPalette) -> Self {
        let mut ranked: Vec<_> = stat.candidates.iter().flatten().collect();
        ranked.sort_by(|a, b| b.votes.cmp(&a.votes));
        let candidates = ranked
            .into_iter()
            .map(|c| CandidateRow {
                name: c.name.clone(),
                party: c.party.clone(),
                color: palette.color(c.party.as_deref()),
                votes: c.votes,
                percent: share(c.votes, stat.votes),
            })
            .collect();

        Self {
            id: feature.id.clone(),
            title: title(feature, stat),
            registration: Registration::Registered { total: stat.total_registered },
            votes: stat.votes,
            turnout: share(stat.votes, stat.total_registered),
            candidates,
            pco: None,
        }
    }

    /// Attach the contact choice from the PCO directory.
    pub fn with_pco(mut self, directory: &PcoDirectory) -> Self {
        self.pco = Some(match directory.get(&self.id) {
            Some(record) if record.is_filled() => PcoAction::Contact { name: record.name.clone() },
            _ => PcoAction::Become,
        });
        self
    }
}

fn title(feature: &LayerFeature, stat: &PrecinctStat) -> String {
    let name = stat
        .precinct_name
        .as_deref()
        .or(feature.name.as_deref())
        .unwrap_or("Precinct");
    format!("{name} (#{})", feature.id)
}

impl fmt::Display for PrecinctSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        match self.registration {
            Registration::Breakdown { active, inactive, total } => {
                writeln!(f, "Active Voters: {}", thousands(active))?;
                writeln!(f, "Inactive Voters: {}", thousands(inactive))?;
                writeln!(f, "Total Registered: {}", thousands(total))?;
                writeln!(f, "Total Votes Cast: {}", thousands(self.votes))?;
            }
            Registration::Registered { total } => {
                writeln!(f, "Registered Voters: {}", thousands(total))?;
                writeln!(f, "Total Votes: {}", thousands(self.votes))?;
            }
        }
        write!(f, "Turnout: {}", percent(self.turnout))?;
        for row in &self.candidates {
            write!(
                f,
                "\n  {} {} ({}): {} {}",
                row.color,
                row.name,
                row.party.as_deref().unwrap_or("No Party"),
                thousands(row.votes),
                percent(row.percent),
            )?;
        }
        match &self.pco {
            Some(PcoAction::Contact { name }) if !name.is_empty() => write!(f, "\nContact your PCO: {name}"),
            Some(PcoAction::Contact { .. }) => write!(f, "\nContact your PCO"),
            Some(PcoAction::Become) => write!(f, "\nBecome a PCO"),
            None => Ok(()),
        }
    }
}

/// Popup shown before any election is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeometryPopup {
    pub id: PrecinctId,
    pub name: Option<String>,
    pub population: Option<u64>,
    pub legislative_district: Option<String>,
}

impl GeometryPopup {
    /// Reference attributes win over the boundary feature's own.
    pub fn new(feature: &LayerFeature, reference: Option<&PrecinctReference>) -> Self {
        let reference = reference.cloned().unwrap_or_default();
        Self {
            id: feature.id.clone(),
            name: reference.name.or_else(|| feature.name.clone()),
            population: reference.population.or(feature.population),
            legislative_district: reference.legislative_district.or_else(|| feature.district.clone()),
        }
    }
}

impl fmt::Display for GeometryPopup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Precinct Information")?;
        write!(f, "#{} {}", self.id, self.name.as_deref().unwrap_or(""))?;
        if let Some(population) = self.population {
            write!(f, "\nPopulation: {}", thousands(population))?;
        }
        if let Some(district) = &self.legislative_district {
            write!(f, "\nLegislative District: {district}")?;
        }
        Ok(())
    }
}

/// Either popup, depending on the active filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Popup {
    Geometry(GeometryPopup),
    Precinct(PrecinctSummary),
}

impl Popup {
    pub fn id(&self) -> &PrecinctId {
        match self {
            Popup::Geometry(p) => &p.id,
            Popup::Precinct(p) => &p.id,
        }
    }
}

impl fmt::Display for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Popup::Geometry(p) => p.fmt(f),
            Popup::Precinct(p) => p.fmt(f),
        }
    }
}

/// Hover panel in the map corner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoPanel {
    pub title: String,
    /// `#N name` of the hovered precinct, if any.
    pub hovered: Option<String>,
}

impl InfoPanel {
    pub fn new(title: impl Into<String>, hovered: Option<&LayerFeature>) -> Self {
        Self { title: title.into(), hovered: hovered.map(LayerFeature::label) }
    }
}

impl fmt::Display for InfoPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        write!(f, "{}", self.hovered.as_deref().unwrap_or("Hover over a precinct"))
    }
}
