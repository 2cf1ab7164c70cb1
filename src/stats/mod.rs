//! Tabular statistics: feed payloads, the join against the layer, legend aggregates.

mod join;
mod reference;
mod table;
mod totals;

pub use join::{JoinedView, join};
pub use reference::{PrecinctReference, ReferenceTable};
pub use table::StatsTable;
pub use totals::{CandidateTotals, Totals};
