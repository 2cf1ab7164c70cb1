use serde::Serialize;

use crate::error::FilterError;

use super::catalog::ElectionCatalog;

/// Which statistics the map is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FilterState {
    /// No election chosen: district coloring.
    #[default]
    Idle,
    /// County-wide vote heat map for one election.
    ElectionSelected { date: String },
    /// Party-win view for one race.
    RaceSelected { date: String, race: String },
}

/// Identifies the filter generation a fetch was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Data a filter transition needs from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Votes { date: String },
    Results { date: String, race: String },
}

/// A request tagged with the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub ticket: Ticket,
    pub request: FetchRequest,
}

/// Election/race filter with stale-response detection.
///
/// Every transition bumps the generation, so a completion is applied only if its
/// ticket was issued by the latest transition.
#[derive(Debug, Clone, Default)]
pub struct FilterMachine {
    state: FilterState,
    generation: u64,
    catalog: ElectionCatalog,
}

impl FilterMachine {
    /// An empty catalog accepts any election and race.
    pub fn new(catalog: ElectionCatalog) -> Self {
        Self { catalog, ..Self::default() }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn catalog(&self) -> &ElectionCatalog {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: ElectionCatalog) {
        self.catalog = catalog;
    }

    pub fn active_election(&self) -> Option<&str> {
        match &self.state {
            FilterState::Idle => None,
            FilterState::ElectionSelected { date } | FilterState::RaceSelected { date, .. } => Some(date),
        }
    }

    pub fn active_race(&self) -> Option<&str> {
        match &self.state {
            FilterState::RaceSelected { race, .. } => Some(race),
            _ => None,
        }
    }

    /// Switch elections; the race is cleared and any in-flight fetch goes stale.
    pub fn select_election(&mut self, date: &str) -> Result<PendingFetch, FilterError> {
        if !self.catalog.is_empty() && !self.catalog.has_election(date) {
            return Err(FilterError::UnknownElection(date.to_string()));
        }
        self.state = FilterState::ElectionSelected { date: date.to_string() };
        Ok(self.issue(FetchRequest::Votes { date: date.to_string() }))
    }

    /// Narrow the active election to one race.
    pub fn select_race(&mut self, race: &str) -> Result<PendingFetch, FilterError> {
        let date = self.active_election().ok_or(FilterError::NoElection)?.to_string();
        if !self.catalog.is_empty() && !self.catalog.has_race(&date, race) {
            return Err(FilterError::UnknownRace { date, race: race.to_string() });
        }
        self.state = FilterState::RaceSelected { date: date.clone(), race: race.to_string() };
        Ok(self.issue(FetchRequest::Results { date, race: race.to_string() }))
    }

    /// Back to the election's vote totals. `None` while idle.
    pub fn clear_race(&mut self) -> Option<PendingFetch> {
        let date = self.active_election()?.to_string();
        self.state = FilterState::ElectionSelected { date: date.clone() };
        Some(self.issue(FetchRequest::Votes { date }))
    }

    /// Back to district coloring; outstanding fetches go stale.
    pub fn clear_election(&mut self) {
        self.state = FilterState::Idle;
        self.generation += 1;
    }

    /// Whether a completion still belongs to the current filter.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    fn issue(&mut self, request: FetchRequest) -> PendingFetch {
        self.generation += 1;
        PendingFetch { ticket: Ticket(self.generation), request }
    }
}
