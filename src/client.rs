/*!
 * HTTP client for the EDSM-style catalog API
 */

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::catalog::{StarSystem, SystemInfo};
use crate::error::{Error, Result};
use crate::fetch::CatalogSource;
use crate::geom::Vec3;

/// Public catalog instance
pub const DEFAULT_BASE_URL: &str = "https://www.edsm.net";

/// Reference probe query: a cube around the catalog origin. Sol sits
/// there, so a healthy catalog always answers this with data.
const PROBE_CENTER: Vec3 = Vec3::ZERO;
const PROBE_SIZE: f64 = 10.0;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client for the catalog endpoints
#[derive(Debug)]
pub struct EdsmClient {
    http: Client,
    base_url: String,
}

impl EdsmClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("starstat/", env!("CARGO_PKG_VERSION")))
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl CatalogSource for EdsmClient {
    fn cube_systems(&self, center: Vec3, size: f64) -> Result<Vec<StarSystem>> {
        let url = format!("{}/api-v1/cube-systems", self.base_url);
        debug!(%url, x = center.x, y = center.y, z = center.z, size, "cube query");

        let systems: Vec<StarSystem> = self
            .http
            .get(&url)
            .query(&[
                ("x", center.x.to_string()),
                ("y", center.y.to_string()),
                ("z", center.z.to_string()),
                ("size", size.to_string()),
                ("showCoordinates", "1".to_string()),
                ("showPermit", "1".to_string()),
                ("showPrimaryStar", "1".to_string()),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        Ok(systems)
    }

    fn system_bodies(&self, name: &str) -> Result<SystemInfo> {
        let url = format!("{}/api-system-v1/bodies", self.base_url);
        debug!(%url, system = name, "bodies query");

        let text = self
            .http
            .get(&url)
            .query(&[("systemName", name)])
            .send()?
            .error_for_status()?
            .text()?;

        // The catalog answers unknown systems with an empty object or
        // array rather than an HTTP error.
        let value: serde_json::Value = serde_json::from_str(&text)?;
        let empty = match &value {
            serde_json::Value::Array(a) => a.is_empty(),
            serde_json::Value::Object(o) => o.is_empty(),
            _ => false,
        };
        if empty {
            return Err(Error::SystemNotFound {
                name: name.to_string(),
            });
        }

        Ok(serde_json::from_value(value)?)
    }

    fn probe_alive(&self) -> Result<bool> {
        let systems = self.cube_systems(PROBE_CENTER, PROBE_SIZE)?;
        Ok(!systems.is_empty())
    }
}
