/*!
 * Vector and region geometry for catalog queries
 */

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Edge length of one cache grid cell, in catalog coordinate units
pub const CHUNK_EDGE: f64 = 10.0;

/// Advisory upper bound on a query region edge. Not enforced by the
/// partitioner; callers are expected to keep query cost reasonable.
pub const MAX_REGION_EDGE: f64 = 200.0;

/// A point or extent in catalog coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const ONE: Vec3 = Vec3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Uniform scale by a factor
    pub fn scale(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

/// An axis-aligned box `[pos, pos + size)` in catalog space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub pos: Vec3,
    pub size: Vec3,
}

impl Region {
    pub fn new(pos: Vec3, size: Vec3) -> Self {
        Self { pos, size }
    }

    /// Build a region from its center point and full extent
    pub fn from_center(center: Vec3, size: Vec3) -> Self {
        Self {
            pos: center - size.scale(0.5),
            size,
        }
    }

    /// The exclusive maximum corner
    pub fn max(&self) -> Vec3 {
        self.pos + self.size
    }

    /// Half-open containment test: `[pos, pos + size)` per axis
    pub fn contains(&self, p: &Vec3) -> bool {
        let max = self.max();
        p.x >= self.pos.x
            && p.x < max.x
            && p.y >= self.pos.y
            && p.y < max.y
            && p.z >= self.pos.z
            && p.z < max.z
    }

    /// Expand the region outward to the nearest grid boundaries.
    ///
    /// The minimum corner is rounded down and the maximum corner rounded up
    /// to multiples of [`CHUNK_EDGE`], so the result fully covers `self`
    /// even when it straddles cell boundaries.
    pub fn aligned(&self) -> Region {
        let max = self.max();
        let (lx, hx) = align_axis(self.pos.x, max.x);
        let (ly, hy) = align_axis(self.pos.y, max.y);
        let (lz, hz) = align_axis(self.pos.z, max.z);

        let pos = Vec3::new(lx, ly, lz);
        let high = Vec3::new(hx, hy, hz);
        Region {
            pos,
            size: high - pos,
        }
    }
}

fn align_axis(low: f64, high: f64) -> (f64, f64) {
    (
        CHUNK_EDGE * (low / CHUNK_EDGE).floor(),
        CHUNK_EDGE * (high / CHUNK_EDGE).ceil(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(10.0, 20.0, 30.0);

        assert_eq!(a + b, Vec3::new(11.0, 22.0, 33.0));
        assert_eq!(b - a, Vec3::new(9.0, 18.0, 27.0));
        assert_eq!(a.scale(2.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(Vec3::ONE.scale(200.0), Vec3::new(200.0, 200.0, 200.0));
    }

    #[test]
    fn test_region_from_center() {
        let r = Region::from_center(Vec3::ZERO, Vec3::ONE.scale(20.0));
        assert_eq!(r.pos, Vec3::new(-10.0, -10.0, -10.0));
        assert_eq!(r.size, Vec3::new(20.0, 20.0, 20.0));
        assert_eq!(r.max(), Vec3::new(10.0, 10.0, 10.0));
    }

    #[test]
    fn test_region_contains_half_open() {
        let r = Region::new(Vec3::ZERO, Vec3::ONE.scale(10.0));

        assert!(r.contains(&Vec3::ZERO));
        assert!(r.contains(&Vec3::new(9.999, 0.0, 5.0)));
        // Max corner is exclusive
        assert!(!r.contains(&Vec3::new(10.0, 0.0, 0.0)));
        assert!(!r.contains(&Vec3::new(0.0, -0.001, 0.0)));
    }

    #[test]
    fn test_aligned_expands_to_grid() {
        let r = Region::new(Vec3::new(-3.0, 4.0, 11.0), Vec3::new(5.0, 5.0, 5.0));
        let a = r.aligned();

        assert_eq!(a.pos, Vec3::new(-10.0, 0.0, 10.0));
        assert_eq!(a.max(), Vec3::new(10.0, 10.0, 20.0));
    }

    #[test]
    fn test_aligned_is_identity_on_grid() {
        let r = Region::new(Vec3::new(-10.0, 0.0, 20.0), Vec3::ONE.scale(20.0));
        assert_eq!(r.aligned(), r);
    }

    #[test]
    fn test_aligned_covers_original() {
        let r = Region::new(Vec3::new(-7.3, 2.1, 15.9), Vec3::new(3.0, 12.0, 0.5));
        let a = r.aligned();

        for &p in &[
            r.pos,
            Vec3::new(-7.3, 14.0, 16.3),
            Vec3::new(-4.4, 2.1, 15.9),
        ] {
            assert!(r.contains(&p));
            assert!(a.contains(&p));
        }
    }
}
