use std::collections::HashMap;

use geo::{Point, Rect};

use crate::{
    geometry::{Feature, FeatureCollection, Geometry},
    types::PrecinctId,
};

use super::{
    handlers::{Bindings, HandlerSet, PointerEvent, Reaction},
    index::{SpatialIndex, geometry_bounds, union_rect},
    style::{FeatureStyle, Style, VisualState},
};
use crate::scale::DISTRICT_GRAY;

/// One renderable precinct.
#[derive(Debug)]
pub struct LayerFeature {
    pub id: PrecinctId,
    pub name: Option<String>,
    pub district: Option<String>,
    pub population: Option<u64>,
    pub geometry: Geometry,
    pub bounds: Option<Rect<f64>>,
    style: FeatureStyle,
    state: VisualState,
    handlers: HandlerSet,
}

impl LayerFeature {
    fn from_feature(id: PrecinctId, feature: &Feature) -> Self {
        Self {
            name: feature.precinct_name(),
            district: feature.legislative_district(),
            population: feature.population(),
            bounds: geometry_bounds(&feature.geometry),
            geometry: feature.geometry.clone(),
            style: FeatureStyle::district(DISTRICT_GRAY),
            state: VisualState::Base,
            handlers: HandlerSet::default(),
            id,
        }
    }

    /// `#N name`, as listed in the sidebar and info panel.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("#{} {}", self.id, name),
            None => format!("#{}", self.id),
        }
    }

    pub fn styles(&self) -> &FeatureStyle {
        &self.style
    }

    pub fn state(&self) -> VisualState {
        self.state
    }

    /// Style for the current visual state.
    pub fn current_style(&self) -> &Style {
        self.style.for_state(self.state)
    }
}

/// Renderable layer of precinct features with per-feature styles and handlers.
///
/// Features without a precinct id, or with the sentinel id `0`, never enter the layer.
/// Duplicate ids keep the first feature.
#[derive(Debug, Default)]
pub struct FeatureLayer {
    features: Vec<LayerFeature>,
    index: HashMap<PrecinctId, usize>,
    spatial: SpatialIndex,
}

impl FeatureLayer {
    /// Build a layer from decoded features. The sentinel filter runs before `filter`;
    /// only retained features are styled.
    pub fn build(
        collection: &FeatureCollection,
        style_fn: impl Fn(&LayerFeature) -> FeatureStyle,
        filter: Option<&dyn Fn(&Feature) -> bool>,
    ) -> Self {
        let mut features = Vec::new();
        let mut index = HashMap::new();
        let mut dropped = 0usize;

        for feature in &collection.features {
            let Some(id) = feature.precinct_id().filter(PrecinctId::is_geographic) else {
                dropped += 1;
                continue;
            };
            if filter.is_some_and(|keep| !keep(feature)) {
                dropped += 1;
                continue;
            }
            if index.contains_key(&id) {
                tracing::warn!(precinct = %id, "[layer] duplicate precinct feature ignored");
                dropped += 1;
                continue;
            }

            let mut layer_feature = LayerFeature::from_feature(id.clone(), feature);
            layer_feature.style = style_fn(&layer_feature);
            index.insert(id, features.len());
            features.push(layer_feature);
        }

        let spatial = SpatialIndex::new(features.iter().enumerate().map(|(i, f)| (i, f.bounds)));
        tracing::debug!(features = features.len(), dropped, "[layer] built");

        Self { features, index, spatial }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerFeature> {
        self.features.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PrecinctId> {
        self.features.iter().map(|f| &f.id)
    }

    pub fn get(&self, id: &PrecinctId) -> Option<&LayerFeature> {
        self.index.get(id).map(|&i| &self.features[i])
    }

    pub fn contains(&self, id: &PrecinctId) -> bool {
        self.index.contains_key(id)
    }

    /// Install `bindings` on every feature, removing whatever was bound before.
    pub fn bind(&mut self, bindings: &Bindings) {
        for feature in &mut self.features {
            feature.handlers.off_all();
            for (event, handler) in bindings.iter() {
                feature.handlers.on(*event, handler.clone());
            }
        }
    }

    /// Remove every handler from every feature.
    pub fn unbind_all(&mut self) {
        for feature in &mut self.features {
            feature.handlers.off_all();
        }
    }

    /// Recompute every feature's styles, then rebind.
    pub fn restyle(&mut self, style_fn: impl Fn(&LayerFeature) -> FeatureStyle, bindings: &Bindings) {
        for feature in &mut self.features {
            feature.style = style_fn(feature);
        }
        self.unbind_all();
        self.bind(bindings);
        tracing::debug!(features = self.features.len(), "[layer] restyled");
    }

    /// Number of handlers bound to `event` on one feature; zero for unknown ids.
    pub fn handler_count(&self, id: &PrecinctId, event: PointerEvent) -> usize {
        self.get(id).map_or(0, |f| f.handlers.count(event))
    }

    /// Run the handlers bound to `event` on one feature.
    pub fn fire(&self, id: &PrecinctId, event: PointerEvent) -> Vec<Reaction> {
        self.get(id).map(|f| f.handlers.fire(event, id)).unwrap_or_default()
    }

    /// Switch the shown style of one feature. Returns `false` for unknown ids.
    pub fn set_state(&mut self, id: &PrecinctId, state: VisualState) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.features[i].state = state;
                true
            }
            None => false,
        }
    }

    /// Every feature back to its base style.
    pub fn reset_states(&mut self) {
        for feature in &mut self.features {
            feature.state = VisualState::Base;
        }
    }

    /// Precinct under a pointer location.
    pub fn hit_test(&self, lon: f64, lat: f64) -> Option<&PrecinctId> {
        self.spatial
            .locate(Point::new(lon, lat), |i| &self.features[i].geometry)
            .map(|i| &self.features[i].id)
    }

    pub fn bounds(&self, id: &PrecinctId) -> Option<Rect<f64>> {
        self.get(id).and_then(|f| f.bounds)
    }

    /// Extent of the whole layer.
    pub fn extent(&self) -> Option<Rect<f64>> {
        self.features.iter().filter_map(|f| f.bounds).reduce(union_rect)
    }
}
