/*!
 * Region query orchestration
 *
 * Turns a query region into covering grid chunks, serves each chunk from
 * the disk cache when possible, fetches (paced and retried) on a miss,
 * then filters against the original unaligned region and deduplicates by
 * system name.
 */

use std::collections::HashSet;

use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::catalog::{system_cache_key, StarSystem, SystemInfo};
use crate::chunk::{covering_chunks, Chunk, ChunkCoord};
use crate::error::Result;
use crate::fetch::{CatalogSource, RetryingFetcher};
use crate::geom::{Region, CHUNK_EDGE};
use crate::pacing::RateController;

/// Bump to invalidate every cached cube chunk on the next run
pub const CUBE_CACHE_VERSION: i64 = 1;

/// Bump to invalidate every cached per-system body list
pub const SYSTEM_CACHE_VERSION: i64 = 1;

/// Chunked, cached, paced access to the catalog
pub struct RegionQueryEngine<'a, S: CatalogSource> {
    source: &'a S,
    cache: &'a CacheStore,
    pacing: &'a RateController,
    fetcher: RetryingFetcher<'a, S>,
}

impl<'a, S: CatalogSource> RegionQueryEngine<'a, S> {
    pub fn new(
        source: &'a S,
        cache: &'a CacheStore,
        pacing: &'a RateController,
        retry_limit: u32,
    ) -> Self {
        Self {
            source,
            cache,
            pacing,
            fetcher: RetryingFetcher::new(source, pacing, retry_limit),
        }
    }

    /// All systems inside `region`, deduplicated by name.
    ///
    /// Any fetch failure aborts the whole query; partial results are
    /// never returned. Output order is chunk enumeration order, then
    /// catalog response order within a chunk.
    pub fn query_region(&self, region: &Region) -> Result<Vec<StarSystem>> {
        let coords = covering_chunks(region);
        debug!(chunks = coords.len(), "region resolved to chunk grid");

        let mut seen: HashSet<String> = HashSet::new();
        let mut systems = Vec::new();
        let mut cache_hits = 0usize;

        for coord in coords {
            let chunk = match self.cache.find::<Chunk>(CUBE_CACHE_VERSION, &coord.key()) {
                Some(chunk) => {
                    cache_hits += 1;
                    chunk
                }
                None => self.fetch_chunk(coord)?,
            };

            for system in chunk.systems {
                if region.contains(&system.coords) && seen.insert(system.name.clone()) {
                    systems.push(system);
                }
            }
        }

        info!(
            systems = systems.len(),
            cache_hits, "region query complete"
        );
        Ok(systems)
    }

    /// Body list for one system, cached under its sanitized name
    pub fn system_info(&self, name: &str) -> Result<SystemInfo> {
        let key = system_cache_key(name);
        if let Some(info) = self.cache.find::<SystemInfo>(SYSTEM_CACHE_VERSION, &key) {
            return Ok(info);
        }

        let mut session = self.pacing.session();
        session.wait();
        let info = self.source.system_bodies(name)?;
        session.reward();
        drop(session);

        self.cache.store(SYSTEM_CACHE_VERSION, &info);
        Ok(info)
    }

    /// Paced reference probe: `false` means the catalog is throttling
    /// even its known-nonempty query.
    pub fn probe_alive(&self) -> Result<bool> {
        let mut session = self.pacing.session();
        session.wait();
        let alive = self.source.probe_alive()?;
        if alive {
            session.reward();
        } else {
            session.penalize();
        }
        Ok(alive)
    }

    fn fetch_chunk(&self, coord: ChunkCoord) -> Result<Chunk> {
        let raw = self.fetcher.fetch_cube(coord.center(), CHUNK_EDGE)?;

        // The catalog may answer with a wider neighborhood than the
        // requested window; keep only what belongs to this cell.
        let systems: Vec<StarSystem> = raw
            .into_iter()
            .filter(|s| coord.contains(&s.coords))
            .collect();

        let chunk = Chunk { coord, systems };
        self.cache.store(CUBE_CACHE_VERSION, &chunk);
        Ok(chunk)
    }
}
