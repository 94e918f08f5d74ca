/*!
 * Retrying catalog fetch with lock detection
 *
 * An empty cube response is ambiguous: the cell may genuinely hold no
 * systems, or the catalog may be throttling us and answering everything
 * with an empty array. A reference query that is known to always return
 * data tells the two apart. While the reference also comes back empty the
 * catalog is treated as globally rate-limited and the shared delay
 * doubles between attempts, up to a bounded retry budget.
 */

use tracing::{debug, warn};

use crate::catalog::{StarSystem, SystemInfo};
use crate::error::{Error, Result};
use crate::geom::Vec3;
use crate::pacing::RateController;

/// Default number of back-off retries before declaring the catalog locked
pub const DEFAULT_RETRY_LIMIT: u32 = 8;

/// The remote catalog, as seen by the query engine.
///
/// The production implementation is [`crate::client::EdsmClient`]; tests
/// substitute fakes.
pub trait CatalogSource {
    /// Systems inside the axis-aligned cube centered at `center` with
    /// edge length `size`. May legitimately be empty.
    fn cube_systems(&self, center: Vec3, size: f64) -> Result<Vec<StarSystem>>;

    /// Full body list for a named system
    fn system_bodies(&self, name: &str) -> Result<SystemInfo>;

    /// Issue the fixed known-nonempty reference query. `true` means the
    /// catalog answered it normally, `false` that even the reference came
    /// back empty (the catalog is throttling everyone's queries).
    fn probe_alive(&self) -> Result<bool>;
}

/// Wraps a [`CatalogSource`] with pacing, back-off, and lock detection
pub struct RetryingFetcher<'a, S: CatalogSource> {
    source: &'a S,
    pacing: &'a RateController,
    retry_limit: u32,
}

impl<'a, S: CatalogSource> RetryingFetcher<'a, S> {
    pub fn new(source: &'a S, pacing: &'a RateController, retry_limit: u32) -> Self {
        Self {
            source,
            pacing,
            retry_limit,
        }
    }

    /// Fetch one cube query, retrying while the catalog appears locked.
    ///
    /// Transport errors propagate immediately; only the ambiguous-empty
    /// case is retried. After `retry_limit + 1` unresolved attempts the
    /// fetch fails with [`Error::SourceLocked`], which callers treat as
    /// fatal for the whole run.
    pub fn fetch_cube(&self, center: Vec3, size: f64) -> Result<Vec<StarSystem>> {
        let mut session = self.pacing.session();
        let mut attempt: u32 = 0;

        loop {
            session.wait();
            let systems = self.source.cube_systems(center, size)?;

            if !systems.is_empty() {
                session.reward();
                return Ok(systems);
            }

            if self.source.probe_alive()? {
                // Reference query answered normally, so the empty cube
                // result is genuine.
                debug!(?center, "empty cube response confirmed genuine");
                session.reward();
                return Ok(systems);
            }

            attempt += 1;
            if attempt > self.retry_limit {
                return Err(Error::SourceLocked { attempts: attempt });
            }
            session.penalize();
            warn!(
                attempt,
                delay = ?session.current(),
                "catalog appears rate-limited, backing off"
            );
        }
    }
}
