//! One interactive map instance: layer, filter, statistics, selection and the
//! derived popups and legends.
//!
//! Everything that changes what the map shows goes through [`MapView`]. Geometry loads
//! and statistics fetches complete elsewhere; their results are handed back through
//! [`MapView::on_geometry`] and [`MapView::apply_completion`], which discard anything
//! superseded by a later load or filter change.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{
    config::MapConfig,
    error::FilterError,
    feed::{FetchCompletion, PcoDirectory, PrecinctListing},
    geometry::{LoadEvent, LoadSequence, LoadTicket},
    layer::{Bindings, FeatureLayer, FeatureStyle, LayerFeature, PointerEvent, Reaction, VisualState},
    render::{GeometryPopup, InfoPanel, Legend, Popup, PrecinctSummary},
    scale::{CategoricalScale, HeatScale, PartyPalette, WHITE},
    state::{
        ElectionCatalog, FetchRequest, FilterMachine, FilterState, PendingFetch, Selection, SelectionChange, Sidebar,
        Viewport,
    },
    stats::{CandidateTotals, JoinedView, ReferenceTable, StatsTable, Totals, join},
    types::{PrecinctId, PrecinctStat},
};

/// Non-fatal problem to surface to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Notice {
    /// Boundary archive could not be loaded; the map has no precincts.
    GeometryUnavailable(String),
    /// Reference archive could not be loaded; district and population fall back to the boundary attributes.
    ReferenceUnavailable(String),
    /// Statistics request failed; the map keeps showing what it showed before.
    FetchFailed(String),
}

/// Statistics currently drawn on the map.
#[derive(Debug, Clone)]
enum Applied {
    Votes { date: String, table: StatsTable, joined: JoinedView },
    Race { date: String, race: String, table: StatsTable, joined: JoinedView },
}

impl Applied {
    fn table(&self) -> &StatsTable {
        match self {
            Applied::Votes { table, .. } | Applied::Race { table, .. } => table,
        }
    }

    fn joined(&self) -> &JoinedView {
        match self {
            Applied::Votes { joined, .. } | Applied::Race { joined, .. } => joined,
        }
    }
}

/// Map context. Several instances can coexist; none share state.
#[derive(Debug)]
pub struct MapView {
    config: MapConfig,
    palette: PartyPalette,
    bindings: Bindings,
    layer: FeatureLayer,
    reference: ReferenceTable,
    filter: FilterMachine,
    applied: Option<Applied>,
    selection: Selection,
    sidebar: Sidebar,
    viewport: Viewport,
    popup: Option<Popup>,
    pco: PcoDirectory,
    notices: Vec<Notice>,
    precinct_names: BTreeMap<PrecinctId, String>,
    boundary_loads: LoadSequence,
    reference_loads: LoadSequence,
}

impl MapView {
    pub fn new(config: MapConfig) -> Self {
        Self {
            palette: config.palette(),
            bindings: Bindings::standard(),
            layer: FeatureLayer::default(),
            reference: ReferenceTable::default(),
            filter: FilterMachine::default(),
            applied: None,
            selection: Selection::default(),
            sidebar: Sidebar::default(),
            viewport: config.default_view,
            popup: None,
            pco: PcoDirectory::default(),
            notices: Vec::new(),
            precinct_names: BTreeMap::new(),
            boundary_loads: LoadSequence::default(),
            reference_loads: LoadSequence::default(),
            config,
        }
    }

    // ---- inputs -------------------------------------------------------------

    /// Ticket for a boundary load about to start. Completions of earlier loads
    /// are discarded once this one is issued.
    pub fn begin_geometry_load(&mut self) -> LoadTicket {
        self.boundary_loads.issue()
    }

    /// Ticket for a voting reference load about to start.
    pub fn begin_reference_load(&mut self) -> LoadTicket {
        self.reference_loads.issue()
    }

    /// Boundary archive finished loading. The layer is rebuilt wholesale and any
    /// selection is dropped. Returns whether the load was still current.
    pub fn on_geometry(&mut self, ticket: LoadTicket, event: LoadEvent) -> bool {
        if !self.boundary_loads.is_current(ticket) {
            tracing::debug!(?ticket, "[view] discarding superseded boundary load");
            return false;
        }
        let collection = match event {
            LoadEvent::Loaded(collection) => collection,
            LoadEvent::Error(err) => {
                tracing::warn!(error = %err, "[view] boundary archive unavailable");
                self.notices.push(Notice::GeometryUnavailable(err.to_string()));
                return true;
            }
        };

        self.selection.reset();
        self.popup = None;
        self.viewport = self.config.default_view;

        let mut layer = FeatureLayer::build(&collection, |_| FeatureStyle::district(WHITE), None);
        if let Some(applied) = self.applied.take() {
            self.applied = Some(rejoin(applied, &layer));
        }
        self.restyle_layer(&mut layer);
        self.layer = layer;
        self.sidebar = Sidebar::from_layer(&self.layer);
        self.sidebar.rename(&self.precinct_names);
        tracing::info!(precincts = self.layer.len(), "[view] precinct layer ready");
        true
    }

    /// Voting reference archive finished loading. Returns whether the load was still current.
    pub fn on_reference(&mut self, ticket: LoadTicket, event: LoadEvent) -> bool {
        if !self.reference_loads.is_current(ticket) {
            tracing::debug!(?ticket, "[view] discarding superseded reference load");
            return false;
        }
        match event {
            LoadEvent::Loaded(collection) => {
                self.reference = ReferenceTable::from_collection(&collection);
                tracing::info!(precincts = self.reference.len(), "[view] reference data ready");
                self.restyle();
                self.refresh_popup();
            }
            LoadEvent::Error(err) => {
                tracing::warn!(error = %err, "[view] reference archive unavailable");
                self.notices.push(Notice::ReferenceUnavailable(err.to_string()));
            }
        }
        true
    }

    /// Install the election catalog. With `auto_select_latest`, the newest election
    /// is selected and its fetch returned.
    pub fn set_catalog(&mut self, catalog: ElectionCatalog) -> Option<PendingFetch> {
        self.filter.set_catalog(catalog.normalized());
        if !self.config.auto_select_latest || self.filter.active_election().is_some() {
            return None;
        }
        let latest = self.filter.catalog().latest()?.to_string();
        self.select_election(&latest).ok()
    }

    pub fn set_pco_directory(&mut self, directory: PcoDirectory) {
        self.pco = directory;
    }

    /// Install the host's precinct list; its names label the sidebar, now and after
    /// every boundary reload.
    pub fn set_precinct_list(&mut self, listing: Vec<PrecinctListing>) {
        self.precinct_names = listing
            .into_iter()
            .filter(|p| p.number.is_geographic())
            .map(|p| (p.number, p.name))
            .collect();
        self.sidebar.rename(&self.precinct_names);
    }

    // ---- filter transitions -------------------------------------------------

    pub fn select_election(&mut self, date: &str) -> Result<PendingFetch, FilterError> {
        self.filter.select_election(date)
    }

    pub fn select_race(&mut self, race: &str) -> Result<PendingFetch, FilterError> {
        self.filter.select_race(race)
    }

    /// Back to the active election's vote totals. `None` while no election is selected.
    pub fn clear_race(&mut self) -> Option<PendingFetch> {
        self.filter.clear_race()
    }

    /// Back to district coloring. Takes effect immediately; outstanding fetches go stale.
    pub fn clear_election(&mut self) {
        self.filter.clear_election();
        self.applied = None;
        self.restyle();
        self.refresh_popup();
    }

    /// Apply a finished fetch. Returns whether the map changed: stale completions and
    /// failures leave it as it was.
    pub fn apply_completion(&mut self, completion: FetchCompletion) -> bool {
        if !self.filter.is_current(completion.ticket) {
            tracing::debug!(request = ?completion.request, "[view] discarding stale statistics");
            return false;
        }
        let table = match completion.result {
            Ok(table) => table,
            Err(err) => {
                self.notices.push(Notice::FetchFailed(err.to_string()));
                return false;
            }
        };

        let joined = join(&self.layer, &table);
        self.applied = Some(match completion.request {
            FetchRequest::Votes { date } => Applied::Votes { date, table, joined },
            FetchRequest::Results { date, race } => Applied::Race { date, race, table, joined },
        });
        self.restyle();
        self.refresh_popup();
        true
    }

    // ---- pointer and sidebar ------------------------------------------------

    /// Route a pointer event on one precinct through its bound handlers. The sidebar
    /// and the map share this path, so their hover and selection never diverge.
    pub fn dispatch(&mut self, event: PointerEvent, id: &PrecinctId) -> Vec<Reaction> {
        let reactions = self.layer.fire(id, event);
        for reaction in &reactions {
            self.react(reaction);
        }
        reactions
    }

    /// Click at a map location: a precinct toggles, the background deselects.
    pub fn click_at(&mut self, lon: f64, lat: f64) -> Vec<Reaction> {
        match self.layer.hit_test(lon, lat).cloned() {
            Some(id) => self.dispatch(PointerEvent::Click, &id),
            None => {
                self.click_background();
                Vec::new()
            }
        }
    }

    /// Pointer moved to a map location: hover follows the precinct under it.
    pub fn hover_at(&mut self, lon: f64, lat: f64) -> Vec<Reaction> {
        let target = self.layer.hit_test(lon, lat).cloned();
        let current = self.selection.hovered().cloned();
        if current == target {
            return Vec::new();
        }
        let mut reactions = Vec::new();
        if let Some(current) = current {
            reactions.extend(self.dispatch(PointerEvent::HoverLeave, &current));
        }
        if let Some(id) = target {
            reactions.extend(self.dispatch(PointerEvent::HoverEnter, &id));
        }
        reactions
    }

    /// Clicking outside every precinct deselects.
    pub fn click_background(&mut self) {
        if let Some(id) = self.selection.clear() {
            self.deselect(&id);
        }
    }

    pub fn sidebar_hover(&mut self, id: &PrecinctId) -> Vec<Reaction> {
        self.dispatch(PointerEvent::HoverEnter, id)
    }

    pub fn sidebar_leave(&mut self, id: &PrecinctId) -> Vec<Reaction> {
        self.dispatch(PointerEvent::HoverLeave, id)
    }

    pub fn sidebar_click(&mut self, id: &PrecinctId) -> Vec<Reaction> {
        self.dispatch(PointerEvent::Click, id)
    }

    pub fn search(&mut self, query: &str) {
        self.sidebar.search(query);
    }

    // ---- derived views ------------------------------------------------------

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn layer(&self) -> &FeatureLayer {
        &self.layer
    }

    pub fn reference(&self) -> &ReferenceTable {
        &self.reference
    }

    pub fn filter(&self) -> &FilterState {
        self.filter.state()
    }

    pub fn catalog(&self) -> &ElectionCatalog {
        self.filter.catalog()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Statistics joined against the layer, once a fetch has been applied.
    pub fn joined(&self) -> Option<&JoinedView> {
        self.applied.as_ref().map(Applied::joined)
    }

    pub fn info_panel(&self) -> InfoPanel {
        let hovered = self.selection.hovered().and_then(|id| self.layer.get(id));
        InfoPanel::new(self.config.info_title.clone(), hovered)
    }

    pub fn legend(&self) -> Legend {
        match &self.applied {
            None => {
                let districts: BTreeSet<String> = self
                    .layer
                    .iter()
                    .filter_map(|f| district_of(&self.reference, f))
                    .collect();
                Legend::districts(districts.iter().map(String::as_str), &self.config.district_colors)
            }
            Some(Applied::Votes { date, table, joined }) => {
                Legend::votes(date, Totals::compute(table), &HeatScale::from_view(joined))
            }
            Some(Applied::Race { date, race, table, .. }) => {
                Legend::race(race, date, &CandidateTotals::compute(table), &self.palette)
            }
        }
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand pending notices to the caller, clearing them.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Statistics table behind the current view.
    pub fn table(&self) -> Option<&StatsTable> {
        self.applied.as_ref().map(Applied::table)
    }

    // ---- internals ----------------------------------------------------------

    fn react(&mut self, reaction: &Reaction) {
        match reaction {
            Reaction::Highlight(id) => {
                if let Some(previous) = self.selection.hover(id) {
                    self.settle(&previous);
                }
                if !self.selection.is_selected(id) {
                    self.layer.set_state(id, VisualState::Hovered);
                }
                self.sidebar.set_hovered(Some(id));
            }
            Reaction::Unhighlight(id) => {
                if self.selection.unhover(id) {
                    self.settle(id);
                    self.sidebar.set_hovered(None);
                }
            }
            Reaction::ToggleSelect(id) => match self.selection.toggle(id) {
                SelectionChange::Selected { id, previous } => {
                    if let Some(previous) = previous {
                        self.settle(&previous);
                    }
                    self.layer.set_state(&id, VisualState::Selected);
                    self.sidebar.set_active(Some(&id));
                    if let Some(bounds) = self.layer.bounds(&id) {
                        self.viewport = Viewport::fit_bounds(bounds, self.config.map_size, self.config.max_zoom);
                    }
                    self.popup = self.popup_for(&id);
                }
                SelectionChange::Deselected(id) => self.deselect(&id),
            },
        }
    }

    /// Selection was dropped: default style, default view, no popup.
    fn deselect(&mut self, id: &PrecinctId) {
        self.settle(id);
        self.sidebar.set_active(None);
        self.viewport = self.config.default_view;
        self.popup = None;
    }

    /// Visual state implied by hover and selection.
    fn settle(&mut self, id: &PrecinctId) {
        let state = if self.selection.is_selected(id) {
            VisualState::Selected
        } else if self.selection.hovered() == Some(id) {
            VisualState::Hovered
        } else {
            VisualState::Base
        };
        self.layer.set_state(id, state);
    }

    fn popup_for(&self, id: &PrecinctId) -> Option<Popup> {
        let feature = self.layer.get(id)?;
        let popup = match &self.applied {
            None => Popup::Geometry(GeometryPopup::new(feature, self.reference.get(id))),
            Some(Applied::Votes { joined, .. }) => {
                let stat = joined.get(id)?;
                Popup::Precinct(PrecinctSummary::votes(feature, stat).with_pco(&self.pco))
            }
            Some(Applied::Race { joined, .. }) => {
                let stat = joined.get(id)?;
                Popup::Precinct(PrecinctSummary::race(feature, stat, &self.palette).with_pco(&self.pco))
            }
        };
        Some(popup)
    }

    fn refresh_popup(&mut self) {
        self.popup = self.selection.selected().cloned().and_then(|id| self.popup_for(&id));
    }

    fn restyle(&mut self) {
        let mut layer = std::mem::take(&mut self.layer);
        self.restyle_layer(&mut layer);
        self.layer = layer;
    }

    /// Styles for the current view, then a fresh set of bindings.
    fn restyle_layer(&self, layer: &mut FeatureLayer) {
        match &self.applied {
            None => layer.restyle(
                |f| FeatureStyle::district(self.config.district_color(district_of(&self.reference, f).as_deref())),
                &self.bindings,
            ),
            Some(Applied::Votes { joined, .. }) => {
                let scale = HeatScale::from_view(joined);
                layer.restyle(
                    |f| FeatureStyle::heat(scale.color(joined.get(&f.id).map_or(0, |s| s.votes))),
                    &self.bindings,
                );
            }
            Some(Applied::Race { joined, .. }) => {
                let scale = CategoricalScale::from_view(joined, &self.palette, self.config.opacity_range);
                // precincts without a results row were zero-filled by the join
                let zero = PrecinctStat::zeroed();
                layer.restyle(
                    |f| {
                        let fill = scale.fill(joined.get(&f.id).unwrap_or(&zero));
                        FeatureStyle::categorical(fill.color, fill.opacity)
                    },
                    &self.bindings,
                );
            }
        }
    }
}

/// Legislative district from the reference data, else from the boundary feature.
fn district_of(reference: &ReferenceTable, feature: &LayerFeature) -> Option<String> {
    reference
        .get(&feature.id)
        .and_then(|r| r.legislative_district.clone())
        .or_else(|| feature.district.clone())
}

/// Re-join applied statistics against a rebuilt layer.
fn rejoin(applied: Applied, layer: &FeatureLayer) -> Applied {
    match applied {
        Applied::Votes { date, table, .. } => {
            let joined = join(layer, &table);
            Applied::Votes { date, table, joined }
        }
        Applied::Race { date, race, table, .. } => {
            let joined = join(layer, &table);
            Applied::Race { date, race, table, joined }
        }
    }
}
