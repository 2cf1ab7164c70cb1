//! Map interaction state: election/race filter, hover and selection, sidebar, viewport.

mod catalog;
mod filter;
mod selection;
mod sidebar;
mod viewport;

pub use catalog::{ElectionCatalog, RaceListing};
pub use filter::{FetchRequest, FilterMachine, FilterState, PendingFetch, Ticket};
pub use selection::{Selection, SelectionChange};
pub use sidebar::{Sidebar, SidebarEntry};
pub use viewport::Viewport;
