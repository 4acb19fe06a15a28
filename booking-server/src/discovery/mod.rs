//! 店铺发现与排序
//!
//! - [`DiscoveryEngine`] - home feed / search / discovery sections
//! - [`query`] - request validation
//! - [`geo`] - haversine distance

pub mod engine;
pub mod geo;
pub mod query;

pub use engine::{DiscoveryEngine, HomeFeed};
pub use query::{DiscoveryError, DiscoveryResult, SearchQuery, SectionsQuery, SortKey};
