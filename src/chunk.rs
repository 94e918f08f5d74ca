/*!
 * Grid chunking: the cacheable unit of a spatial query
 *
 * Query regions are covered by fixed-size grid cells so that overlapping
 * or repeated queries reuse previously fetched cells instead of hitting
 * the catalog again.
 */

use serde::{Deserialize, Serialize};

use crate::cache::Cacheable;
use crate::catalog::StarSystem;
use crate::geom::{Region, Vec3, CHUNK_EDGE};

/// Integer coordinate of one grid cell.
///
/// Two points share a coordinate iff they lie in the same cell. Each axis
/// value is the floor division of the point coordinate by [`CHUNK_EDGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl ChunkCoord {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Coordinate of the cell containing a point
    pub fn of_point(p: &Vec3) -> Self {
        Self {
            x: (p.x / CHUNK_EDGE).floor() as i64,
            y: (p.y / CHUNK_EDGE).floor() as i64,
            z: (p.z / CHUNK_EDGE).floor() as i64,
        }
    }

    /// Geometric center of the cell, used as the remote query point
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.x as f64 + 0.5) * CHUNK_EDGE,
            (self.y as f64 + 0.5) * CHUNK_EDGE,
            (self.z as f64 + 0.5) * CHUNK_EDGE,
        )
    }

    /// A point belongs to this cell iff its own derived coordinate matches
    pub fn contains(&self, p: &Vec3) -> bool {
        ChunkCoord::of_point(p) == *self
    }

    /// Cache key for this cell, e.g. `chunk/n7p3p0`.
    ///
    /// Axis values are sign-prefixed (`n` for negative, `p` otherwise) so
    /// that keys stay unique across signs and safe as path components.
    pub fn key(&self) -> String {
        format!(
            "chunk/{}{}{}",
            axis_key(self.x),
            axis_key(self.y),
            axis_key(self.z)
        )
    }

    /// Parse a key produced by [`ChunkCoord::key`]. Lossless round-trip.
    pub fn from_key(key: &str) -> Option<Self> {
        let body = key.strip_prefix("chunk/")?;

        let mut axes = Vec::new();
        let mut rest = body;
        while !rest.is_empty() {
            let sign = rest.chars().next()?;
            let negative = match sign {
                'p' => false,
                'n' => true,
                _ => return None,
            };
            let digits: String = rest[1..].chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return None;
            }
            let value: i64 = digits.parse().ok()?;
            axes.push(if negative { -value } else { value });
            rest = &rest[1 + digits.len()..];
        }

        match axes.as_slice() {
            &[x, y, z] => Some(Self { x, y, z }),
            _ => None,
        }
    }
}

fn axis_key(v: i64) -> String {
    if v < 0 {
        format!("n{}", -v)
    } else {
        format!("p{}", v)
    }
}

/// The minimal set of cells whose union covers `region`.
///
/// The region is first expanded outward to grid boundaries, then all cells
/// between the resulting corner indices are enumerated inclusively, x
/// outermost and z innermost. The order carries no meaning but is fixed so
/// that results and fixtures stay reproducible.
pub fn covering_chunks(region: &Region) -> Vec<ChunkCoord> {
    let aligned = region.aligned();
    let lo = ChunkCoord::of_point(&aligned.pos);

    // The aligned max corner sits exactly on a grid boundary; the last
    // covered cell is the one just below it. Degenerate (zero-size) axes
    // still yield the single cell holding the region.
    let max = aligned.max();
    let hi = ChunkCoord::new(
        ((max.x / CHUNK_EDGE).round() as i64 - 1).max(lo.x),
        ((max.y / CHUNK_EDGE).round() as i64 - 1).max(lo.y),
        ((max.z / CHUNK_EDGE).round() as i64 - 1).max(lo.z),
    );

    let mut chunks = Vec::new();
    for x in lo.x..=hi.x {
        for y in lo.y..=hi.y {
            for z in lo.z..=hi.z {
                chunks.push(ChunkCoord::new(x, y, z));
            }
        }
    }
    chunks
}

/// One grid cell together with every system located inside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub systems: Vec<StarSystem>,
}

impl Cacheable for Chunk {
    fn cache_key(&self) -> String {
        self.coord.key()
    }
}
