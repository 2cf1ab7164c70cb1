//! Renderable feature layer: per-feature styles, handler bindings and hit testing.

mod handlers;
mod index;
#[allow(clippy::module_inception)]
mod layer;
mod style;

pub use handlers::{Bindings, Handler, PointerEvent, Reaction};
pub use layer::{FeatureLayer, LayerFeature};
pub use style::{FeatureStyle, Style, VisualState};

pub(crate) use index::union_rect;
