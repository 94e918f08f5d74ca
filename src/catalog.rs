/*!
 * Catalog record types: star systems and their bodies
 *
 * Field names mirror the catalog's JSON (camelCase). A system's name is
 * its stable identity; deduplication across chunk queries keys on it.
 */

use serde::{Deserialize, Serialize};

use crate::cache::Cacheable;
use crate::geom::Vec3;

/// Terraforming state string the catalog uses for candidate planets
pub const TERRAFORMING_CANDIDATE: &str = "Candidate for terraforming";

/// One star system as returned by a cube query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarSystem {
    pub name: String,
    pub coords: Vec3,
    #[serde(default)]
    pub coords_locked: bool,
    #[serde(default)]
    pub permit_name: Option<String>,
    #[serde(default)]
    pub require_permit: bool,
    #[serde(default)]
    pub primary_star: Option<PrimaryStar>,
}

/// Summary of a system's main star, present when the cube query asks for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryStar {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub star_type: Option<String>,
    #[serde(default)]
    pub is_scoopable: bool,
}

/// Full body list for one system, from the bodies endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub name: String,
    #[serde(default)]
    pub bodies: Vec<Body>,
}

impl SystemInfo {
    pub fn stars(&self) -> Vec<&Body> {
        self.bodies.iter().filter(|b| b.body_type == "Star").collect()
    }

    pub fn planets(&self) -> Vec<&Body> {
        self.bodies
            .iter()
            .filter(|b| b.body_type == "Planet")
            .collect()
    }

    pub fn star_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.body_type == "Star").count()
    }
}

impl Cacheable for SystemInfo {
    fn cache_key(&self) -> String {
        system_cache_key(&self.name)
    }
}

/// A single star or planet within a system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub name: String,
    #[serde(rename = "type")]
    pub body_type: String,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(default)]
    pub surface_temperature: Option<f64>,
    #[serde(default)]
    pub distance_to_arrival: Option<f64>,
    #[serde(default)]
    pub terraforming_state: Option<String>,
}

impl Body {
    pub fn is_terraforming_candidate(&self) -> bool {
        self.terraforming_state.as_deref() == Some(TERRAFORMING_CANDIDATE)
    }
}

/// Shorthand for a catalog subType string, e.g.
/// `"G (White-Yellow) Star"` -> `"G"`.
pub fn short_type(sub_type: &str) -> &str {
    sub_type.split_whitespace().next().unwrap_or(sub_type)
}

/// Cache key for a system's body list. System names may contain spaces
/// and punctuation, so anything outside a safe set becomes `_`.
pub fn system_cache_key(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("system/{sanitized}")
}
