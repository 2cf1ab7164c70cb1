#![doc = "Precinct map public API"]
pub mod config;
pub mod error;
pub mod feed;
pub mod geometry;
pub mod layer;
pub mod render;
pub mod scale;
pub mod state;
pub mod stats;
pub mod types;
pub mod view;

#[doc(inline)]
pub use config::MapConfig;

#[doc(inline)]
pub use error::{DecodeError, FetchError, FilterError, ValidationError};

#[doc(inline)]
pub use types::{PrecinctId, PrecinctStat};

#[doc(inline)]
pub use view::{MapView, Notice};
