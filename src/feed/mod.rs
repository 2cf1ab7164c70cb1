//! Statistics feeds: where election numbers, precinct listings and PCO records come from.

#[cfg(feature = "download")]
mod ajax;
mod contact;
mod csv;
mod dir;
mod worker;

use serde::{Deserialize, Serialize};

use crate::{error::FetchError, state::ElectionCatalog, stats::StatsTable, types::PrecinctId};

#[cfg(feature = "download")]
pub use ajax::AjaxFeed;
pub use contact::{ContactMessage, PcoDirectory, PcoRecord};
pub use dir::DirFeed;
pub use worker::{FetchCompletion, FetchWorker};

/// One row of the precinct dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecinctListing {
    pub number: PrecinctId,
    #[serde(default)]
    pub name: String,
}

/// Host-side data interface. Calls block; run them through a [`FetchWorker`]
/// when the caller must stay responsive.
pub trait ElectionFeed: Send + Sync {
    /// County-wide votes per precinct for one election, including the `-1` total row if published.
    fn fetch_election_votes(&self, date: &str) -> Result<StatsTable, FetchError>;

    /// Per-candidate results per precinct for one race.
    fn fetch_election_results(&self, date: &str, race: &str) -> Result<StatsTable, FetchError>;

    /// Every contactable precinct; precinct 0 is never listed. Feeds
    /// [`MapView::set_precinct_list`](crate::view::MapView::set_precinct_list), which labels the sidebar.
    fn fetch_precinct_list(&self) -> Result<Vec<PrecinctListing>, FetchError>;

    fn submit_contact_message(&self, message: &ContactMessage) -> Result<(), FetchError>;

    fn fetch_catalog(&self) -> Result<ElectionCatalog, FetchError>;

    fn fetch_pco_directory(&self) -> Result<PcoDirectory, FetchError>;
}
