//! Discovery of version folders and their age and size.

mod stats;
mod versions;

pub use stats::{PathStats, StatsCache};
pub use versions::{
    compare_versions, discover_versions, sort_descending, VersionCatalog, VersionPair,
};
