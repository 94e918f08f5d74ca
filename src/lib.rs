/*!
 * starstat - Star catalog region scanner
 *
 * Queries an EDSM-style star catalog over a 3-D spatial region:
 * - Region split into fixed-size grid chunks, each cached on disk
 * - Versioned, zstd-compressed cache envelopes that self-heal on mismatch
 * - Every remote call paced through a shared self-tuning delay
 * - Ambiguous empty responses resolved with a known-nonempty reference probe
 * - Per-planet statistics: stellar type, temperature, terraforming candidacy
 */

pub mod cache;
pub mod catalog;
pub mod chunk;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod geom;
pub mod logging;
pub mod pacing;

// Re-export commonly used types
pub use cache::{CacheStore, Cacheable};
pub use catalog::{Body, PrimaryStar, StarSystem, SystemInfo};
pub use chunk::{covering_chunks, Chunk, ChunkCoord};
pub use client::EdsmClient;
pub use config::{FetchConfig, LogLevel};
pub use engine::RegionQueryEngine;
pub use error::{Error, Result};
pub use fetch::{CatalogSource, RetryingFetcher};
pub use geom::{Region, Vec3, CHUNK_EDGE, MAX_REGION_EDGE};
pub use pacing::RateController;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
