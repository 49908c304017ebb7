//! Geographic coordinates and axis-oriented bounding boxes
//!
//! Boxes are plain WGS84 latitude/longitude rectangles. Regions crossing the
//! antimeridian or reaching past a pole are not representable.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::ops::Range;

use crate::config::Resolution;
use crate::error::{Result, ViewshedError};

/// A WGS84 latitude/longitude pair in degrees
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoord {
    /// Latitude in degrees, south negative
    pub lat: f64,
    /// Longitude in degrees, west negative
    pub lon: f64,
}

impl GeoCoord {
    /// Create a new coordinate
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Rectangle spanned by a lower-left and an upper-right corner
///
/// Invariant: `lower_left.lat <= upper_right.lat` and
/// `lower_left.lon <= upper_right.lon`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisOrientedBoundingBox {
    lower_left: GeoCoord,
    upper_right: GeoCoord,
}

impl AxisOrientedBoundingBox {
    /// Create a box from its lower-left and upper-right corners
    ///
    /// # Errors
    ///
    /// Returns `InvalidBoundingBox` if a corner is not finite or the corners
    /// are inverted on either axis.
    pub fn new(lower_left: GeoCoord, upper_right: GeoCoord) -> Result<Self> {
        let finite = [lower_left.lat, lower_left.lon, upper_right.lat, upper_right.lon]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(ViewshedError::InvalidBoundingBox(format!(
                "corners must be finite ({:?} .. {:?})",
                lower_left, upper_right
            )));
        }
        if lower_left.lat > upper_right.lat || lower_left.lon > upper_right.lon {
            return Err(ViewshedError::InvalidBoundingBox(format!(
                "lower-left {:?} is not below and left of upper-right {:?}",
                lower_left, upper_right
            )));
        }
        Ok(Self {
            lower_left,
            upper_right,
        })
    }

    /// Lower-left (south-west) corner
    #[inline]
    pub fn lower_left(&self) -> GeoCoord {
        self.lower_left
    }

    /// Upper-right (north-east) corner
    #[inline]
    pub fn upper_right(&self) -> GeoCoord {
        self.upper_right
    }

    /// Upper-left (north-west) corner
    #[inline]
    pub fn upper_left(&self) -> GeoCoord {
        GeoCoord::new(self.upper_right.lat, self.lower_left.lon)
    }

    /// Lower-right (south-east) corner
    #[inline]
    pub fn lower_right(&self) -> GeoCoord {
        GeoCoord::new(self.lower_left.lat, self.upper_right.lon)
    }

    /// Extent in degrees of latitude
    #[inline]
    pub fn height(&self) -> f64 {
        self.upper_right.lat - self.lower_left.lat
    }

    /// Extent in degrees of longitude
    #[inline]
    pub fn width(&self) -> f64 {
        self.upper_right.lon - self.lower_left.lon
    }

    /// True if the box has zero extent on either axis
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.height() == 0.0 || self.width() == 0.0
    }

    /// True if the coordinate lies inside or on the edge of the box
    pub fn contains(&self, coord: GeoCoord) -> bool {
        coord.lat >= self.lower_left.lat
            && coord.lat <= self.upper_right.lat
            && coord.lon >= self.lower_left.lon
            && coord.lon <= self.upper_right.lon
    }

    /// True if the two boxes share a region of positive area
    ///
    /// Boxes that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &AxisOrientedBoundingBox) -> bool {
        self.lower_left.lat < other.upper_right.lat
            && other.lower_left.lat < self.upper_right.lat
            && self.lower_left.lon < other.upper_right.lon
            && other.lower_left.lon < self.upper_right.lon
    }

    /// Compute the overlapping region of two boxes
    pub fn intersection(&self, other: &AxisOrientedBoundingBox) -> Option<AxisOrientedBoundingBox> {
        if !self.intersects(other) {
            return None;
        }
        Some(AxisOrientedBoundingBox {
            lower_left: GeoCoord::new(
                self.lower_left.lat.max(other.lower_left.lat),
                self.lower_left.lon.max(other.lower_left.lon),
            ),
            upper_right: GeoCoord::new(
                self.upper_right.lat.min(other.upper_right.lat),
                self.upper_right.lon.min(other.upper_right.lon),
            ),
        })
    }

    /// Reject regions touching the poles or wrapping past ±180°
    pub fn check_supported(&self) -> Result<()> {
        if self.lower_left.lat < -90.0 || self.upper_right.lat > 90.0 {
            return Err(ViewshedError::UnsupportedRegion(format!(
                "latitude range {}..{} reaches past a pole",
                self.lower_left.lat, self.upper_right.lat
            )));
        }
        if self.lower_left.lon < -180.0 || self.upper_right.lon > 180.0 {
            return Err(ViewshedError::UnsupportedRegion(format!(
                "longitude range {}..{} crosses the antimeridian",
                self.lower_left.lon, self.upper_right.lon
            )));
        }
        Ok(())
    }

    /// Expand the box outward onto the sampling lattice
    ///
    /// Lattice cell `i` is centered on `i / R` degrees and spans half a cell
    /// either side, so tile cell boundaries and snapped boundaries coincide.
    pub fn snap(&self, resolution: Resolution) -> LatticeBox {
        let r = resolution.samples_per_degree() as f64;
        let floor = |v: f64| (v * r + 0.5).floor() as i64;
        let ceil = |v: f64| (v * r + 0.5).ceil() as i64;
        LatticeBox {
            lat: floor(self.lower_left.lat)..ceil(self.upper_right.lat),
            lon: floor(self.lower_left.lon)..ceil(self.upper_right.lon),
            resolution,
        }
    }
}

/// A bounding box expressed in whole lattice cells at one resolution
///
/// `lat` and `lon` are half-open ranges of cell indices; cell `i` is centered
/// on `i / samples_per_degree` degrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeBox {
    /// Cell indices along latitude, south to north
    pub lat: Range<i64>,
    /// Cell indices along longitude, west to east
    pub lon: Range<i64>,
    /// Sampling tier the indices refer to
    pub resolution: Resolution,
}

impl LatticeBox {
    /// Number of rows (latitude cells)
    #[inline]
    pub fn rows(&self) -> usize {
        (self.lat.end - self.lat.start).max(0) as usize
    }

    /// Number of columns (longitude cells)
    #[inline]
    pub fn cols(&self) -> usize {
        (self.lon.end - self.lon.start).max(0) as usize
    }

    /// Geographic extent of the cell boundaries
    pub fn bounding_box(&self) -> AxisOrientedBoundingBox {
        let r = self.resolution.samples_per_degree() as f64;
        let edge = |i: i64| (i as f64 - 0.5) / r;
        AxisOrientedBoundingBox {
            lower_left: GeoCoord::new(edge(self.lat.start), edge(self.lon.start)),
            upper_right: GeoCoord::new(edge(self.lat.end), edge(self.lon.end)),
        }
    }

    /// Every whole-degree tile (south-west corner) the cells fall into
    ///
    /// Empty for a resolution with no samples per degree.
    pub fn tile_corners(&self) -> impl Iterator<Item = (i32, i32)> {
        let r = self.resolution.samples_per_degree() as i64;
        let (lat_tiles, lon_tiles) = if r == 0 {
            (1..=0, 1..=0)
        } else {
            (
                self.lat.start.div_euclid(r)..=(self.lat.end - 1).div_euclid(r),
                self.lon.start.div_euclid(r)..=(self.lon.end - 1).div_euclid(r),
            )
        };
        lat_tiles.flat_map(move |lat| lon_tiles.clone().map(move |lon| (lat as i32, lon as i32)))
    }
}
