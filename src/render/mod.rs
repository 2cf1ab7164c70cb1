//! Popups, info panel, legends and SVG snapshots.

mod format;
mod legend;
mod popup;
mod svg;

pub use format::{display_date, percent, share, thousands};
pub use legend::{DistrictEntry, Legend, RankedCandidate};
pub use popup::{CandidateRow, GeometryPopup, InfoPanel, PcoAction, Popup, PrecinctSummary, Registration};
