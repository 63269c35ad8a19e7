//! Gazetteer - Hierarchical Geocoding Library
//!
//! Gazetteer turns a free-text address query into a ranked list of
//! geographic objects (countries, regions, localities, streets, buildings)
//! drawn from an in-memory hierarchy. The search walks the hierarchy kinds
//! coarse to fine, assigns contiguous token ranges to kinds with
//! backtracking, keeps each layer consistent with the ancestor chains, and
//! retains the best candidates in a bounded beam.
//!
//! # Quick Start
//!
//! ```rust
//! use gazetteer::{GeoObjectId, Geocoder, HierarchyReader};
//!
//! let data = r#"
//! {"id": "relation:1", "kind": "country", "name": "France"}
//! {"id": "relation:2", "kind": "locality", "name": "Paris", "ancestors": ["relation:1"]}
//! "#;
//!
//! // Load the hierarchy and build the token index.
//! let hierarchy = HierarchyReader::new(data.as_bytes()).read(1)?;
//! let geocoder = Geocoder::new(hierarchy, 1)?;
//!
//! // Queries never fail; unmatched queries yield an empty list.
//! let results = geocoder.process_query("paris france");
//! assert_eq!(results[0].osm_id, GeoObjectId::osm_relation(2));
//! assert_eq!(results[0].certainty, 1.0);
//! # Ok::<(), gazetteer::error::GazetteerError>(())
//! ```
//!
//! # Features
//!
//! - **Layered search**: every contiguous token range may name a country,
//!   region, locality, street or building; candidates survive only when
//!   each finer layer descends from the previous one.
//! - **House numbers**: the building layer matches house-number spelling
//!   variations and suppresses half-matched addresses.
//! - **Shared, immutable indexes**: one `Geocoder` serves any number of
//!   concurrent queries without synchronization.
//! - **Parallel loading**: hierarchy parsing and index construction shard
//!   across a configurable number of worker threads.

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

mod beam;
pub mod error;
mod hierarchy;
mod index;
mod search;
pub mod text;
mod types;

pub use hierarchy::{
    Entry, Hierarchy, HierarchyError, HierarchyReader, MultipleNames, NameDictionary, NamePosition,
};
pub use index::{DocId, TokenIndex};
pub use search::{Geocoder, SearchResult, MAX_RESULTS};
pub use types::{GeoObjectId, Kind, Source};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Gazetteer library.
///
/// Sets up structured logging with configurable levels and filtering. Call
/// this once at the start of your application to enable logging output from
/// Gazetteer operations; the `RUST_LOG` environment variable overrides
/// `level` when set.
///
/// ```rust
/// use tracing::Level;
///
/// gazetteer::init_logging(Level::INFO)?;
/// # Ok::<(), gazetteer::error::GazetteerError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::GazetteerError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?;

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}

/// Worker pool honoring the caller's thread count; 0 picks rayon's default
/// sizing.
pub(crate) fn thread_pool(
    num_threads: usize,
) -> std::result::Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
}
