//! Geographic bounding boxes.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Akita prefecture, the deployment region of the dashboard.
pub const AKITA: Region = Region {
    west: 138.8,
    south: 38.92,
    east: 141.18,
    north: 41.1,
};

impl Region {
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center of the box as `(lon, lat)`.
    pub fn centroid(&self) -> (f64, f64) {
        (
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    /// Whether the point lies inside the box (edges included).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Whether the two boxes share any area or edge.
    pub fn intersects(&self, other: &Region) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }

    /// Intersection of the two boxes, if any.
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        if !self.intersects(other) {
            return None;
        }
        Some(Region {
            west: self.west.max(other.west),
            south: self.south.max(other.south),
            east: self.east.min(other.east),
            north: self.north.min(other.north),
        })
    }

    /// Closed ring of the box corners, counter-clockwise from south-west.
    pub fn ring(&self) -> [[f64; 2]; 5] {
        [
            [self.west, self.south],
            [self.east, self.south],
            [self.east, self.north],
            [self.west, self.north],
            [self.west, self.south],
        ]
    }
}
