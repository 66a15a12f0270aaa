//! The node-kind catalog: discoverable entries behind template requests.
//!
//! A [`CatalogEntry`] describes one materializable construct -- a connector,
//! an action, an agent -- with the parameter specs its template starts from.
//! Entries come from static registration plus any number of external
//! [`CatalogSource`]s; [`Catalog::search`] does case-insensitive keyword
//! lookup over them in stable catalog order.

pub mod entry;
pub mod search;

pub use entry::{CatalogEntry, ParamSpec};
pub use search::{Catalog, CatalogSource};
