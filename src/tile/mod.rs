//! SRTM elevation tiles
//!
//! A tile covers one degree of latitude and longitude. Source files hold
//! `(R+1)²` big-endian `i16` samples stored north to south, west to east; the
//! top row and the rightmost column duplicate the neighbouring tiles and are
//! dropped on load so that adjacent tiles interlock without overlap.

mod repository;

pub use repository::TileRepository;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::fs;
use std::path::Path;

use crate::config::Resolution;
use crate::error::DecodeError;
use crate::geo::{AxisOrientedBoundingBox, GeoCoord, LatticeBox};

/// Sample value marking missing data
pub const VOID: i16 = -32768;

/// Whole-degree south-west corner identifying a tile (e.g. `N37W105`)
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Latitude of the lower-left corner, south negative
    pub lat: i32,
    /// Longitude of the lower-left corner, west negative
    pub lon: i32,
}

impl TileCoord {
    /// Create a tile coordinate from its lower-left corner
    #[inline]
    pub fn new(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Tile whose lower-left whole-degree corner is below and left of `coord`
    pub fn containing(coord: GeoCoord) -> Self {
        Self {
            lat: coord.lat.floor() as i32,
            lon: coord.lon.floor() as i32,
        }
    }

    /// Filename for this tile, e.g. `N37W105.hgt`
    pub fn filename(&self) -> String {
        let ns = if self.lat >= 0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0 { 'E' } else { 'W' };
        format!(
            "{}{:02}{}{:03}.hgt",
            ns,
            self.lat.unsigned_abs(),
            ew,
            self.lon.unsigned_abs()
        )
    }

    /// Parse a `{N|S}dd{E|W}ddd.hgt` filename (extension case-insensitive)
    pub fn from_filename(name: &str) -> Result<Self, DecodeError> {
        let invalid = || DecodeError::InvalidTileName(name.to_string());

        let stem = match name.len().checked_sub(4) {
            Some(split) if name.is_char_boundary(split) => {
                let (stem, ext) = name.split_at(split);
                if !ext.eq_ignore_ascii_case(".hgt") {
                    return Err(invalid());
                }
                stem
            }
            _ => return Err(invalid()),
        };
        if stem.len() != 7 || !stem.is_ascii() {
            return Err(invalid());
        }

        let lat_sign = match &stem[0..1] {
            "N" | "n" => 1,
            "S" | "s" => -1,
            _ => return Err(invalid()),
        };
        let lon_sign = match &stem[3..4] {
            "E" | "e" => 1,
            "W" | "w" => -1,
            _ => return Err(invalid()),
        };
        let lat: i32 = stem[1..3].parse().map_err(|_| invalid())?;
        let lon: i32 = stem[4..7].parse().map_err(|_| invalid())?;
        if lat > 90 || lon > 180 {
            return Err(invalid());
        }

        Ok(Self::new(lat_sign * lat, lon_sign * lon))
    }
}

/// One decoded elevation tile
///
/// Samples are stored row-major with row 0 at the northern edge. Sample
/// `(row, col)` is centered on
/// `(lat + (R - 1 - row) / R, lon + col / R)` where `(lat, lon)` is the tile's
/// named corner.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationTile {
    coord: TileCoord,
    resolution: Resolution,
    samples: Vec<i16>,
}

impl ElevationTile {
    /// Decode a tile from the raw bytes of a source file
    ///
    /// # Errors
    ///
    /// - `InvalidResolution` if the tier has no samples per degree
    /// - `SizeMismatch` unless `bytes.len() == (R+1)² * 2`
    pub fn from_bytes(
        coord: TileCoord,
        resolution: Resolution,
        bytes: &[u8],
    ) -> Result<Self, DecodeError> {
        check_resolution(resolution)?;
        let expected = resolution.file_len();
        if bytes.len() != expected {
            return Err(DecodeError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        let file_side = resolution.file_side();
        let side = file_side - 1;
        let mut samples = Vec::with_capacity(side * side);

        // Skip the overlapping top row; drop the last column of every row.
        for row in bytes.chunks_exact(file_side * 2).skip(1) {
            samples.extend(
                row.chunks_exact(2)
                    .take(side)
                    .map(|pair| i16::from_be_bytes([pair[0], pair[1]])),
            );
        }

        Ok(Self {
            coord,
            resolution,
            samples,
        })
    }

    /// Build a tile from already-trimmed samples (`R²`, north row first)
    pub fn from_samples(
        coord: TileCoord,
        resolution: Resolution,
        samples: Vec<i16>,
    ) -> Result<Self, DecodeError> {
        check_resolution(resolution)?;
        let side = resolution.samples_per_degree() as usize;
        if samples.len() != side * side {
            return Err(DecodeError::SizeMismatch {
                expected: side * side * 2,
                actual: samples.len() * 2,
            });
        }
        Ok(Self {
            coord,
            resolution,
            samples,
        })
    }

    /// Load a tile file at a known resolution
    ///
    /// The tile coordinate is taken from the filename.
    pub fn load(path: impl AsRef<Path>, resolution: Resolution) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let coord = coord_from_path(path)?;
        let bytes = fs::read(path)?;
        Self::from_bytes(coord, resolution, &bytes)
    }

    /// Load a tile file, inferring SRTM1 or SRTM3 from its length
    pub fn load_inferred(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let coord = coord_from_path(path)?;
        let bytes = fs::read(path)?;
        let resolution =
            Resolution::from_file_len(bytes.len()).ok_or(DecodeError::SizeMismatch {
                expected: Resolution::Srtm3.file_len(),
                actual: bytes.len(),
            })?;
        Self::from_bytes(coord, resolution, &bytes)
    }

    /// Tile identifier
    #[inline]
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Sampling tier of this tile
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Samples per side (after the overlap is dropped)
    #[inline]
    pub fn side(&self) -> usize {
        self.resolution.samples_per_degree() as usize
    }

    /// Sample at `(row, col)`, row 0 being the northern edge
    #[inline]
    pub fn sample(&self, row: usize, col: usize) -> Option<i16> {
        let side = self.side();
        if row < side && col < side {
            Some(self.samples[row * side + col])
        } else {
            None
        }
    }

    /// Geographic extent of the tile's sample cells
    ///
    /// Sample centers sit on whole multiples of the cell size, so the cell
    /// boundaries are offset half a cell south and west of the named corner.
    pub fn bounding_box(&self) -> AxisOrientedBoundingBox {
        let r = self.resolution.samples_per_degree() as i64;
        LatticeBox {
            lat: self.coord.lat as i64 * r..(self.coord.lat as i64 + 1) * r,
            lon: self.coord.lon as i64 * r..(self.coord.lon as i64 + 1) * r,
            resolution: self.resolution,
        }
        .bounding_box()
    }

    /// Map a coordinate to the sample cell containing it
    ///
    /// `row = R - 1 - floor((lat - corner.lat) * R + ½)` counts from the
    /// northern edge, `col = floor((lon - corner.lon) * R + ½)`. Returns `None`
    /// for coordinates outside the tile.
    pub fn coordinate_to_index(&self, coord: GeoCoord) -> Option<(usize, usize)> {
        let r = self.resolution.samples_per_degree() as f64;
        let k_lat = ((coord.lat - self.coord.lat as f64) * r + 0.5).floor();
        let k_lon = ((coord.lon - self.coord.lon as f64) * r + 0.5).floor();
        if k_lat < 0.0 || k_lat >= r || k_lon < 0.0 || k_lon >= r {
            return None;
        }
        Some((self.side() - 1 - k_lat as usize, k_lon as usize))
    }

    /// Coordinate of the center of sample `(row, col)`
    pub fn index_to_coordinate(&self, row: usize, col: usize) -> GeoCoord {
        let r = self.resolution.samples_per_degree() as f64;
        let k_lat = (self.side() - 1 - row) as f64;
        GeoCoord::new(
            self.coord.lat as f64 + k_lat / r,
            self.coord.lon as f64 + col as f64 / r,
        )
    }

    /// Count of void samples
    pub fn void_count(&self) -> usize {
        self.samples.iter().filter(|&&s| s == VOID).count()
    }
}

fn check_resolution(resolution: Resolution) -> Result<(), DecodeError> {
    match resolution.samples_per_degree() {
        0 => Err(DecodeError::InvalidResolution(0)),
        _ => Ok(()),
    }
}

fn coord_from_path(path: &Path) -> Result<TileCoord, DecodeError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DecodeError::InvalidTileName(path.display().to_string()))?;
    TileCoord::from_filename(name)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn tiny() -> Resolution {
        Resolution::Custom {
            samples_per_degree: 4,
        }
    }

    /// Encode a source file whose sample at file `(row, col)` is `f(row, col)`
    pub(crate) fn encode_file(resolution: Resolution, f: impl Fn(usize, usize) -> i16) -> Vec<u8> {
        let side = resolution.file_side();
        let mut bytes = Vec::with_capacity(side * side * 2);
        for row in 0..side {
            for col in 0..side {
                bytes.extend_from_slice(&f(row, col).to_be_bytes());
            }
        }
        bytes
    }

    #[test]
    fn test_tile_coord_filename() {
        assert_eq!(TileCoord::new(37, -105).filename(), "N37W105.hgt");
        assert_eq!(TileCoord::new(-33, 151).filename(), "S33E151.hgt");
        assert_eq!(TileCoord::new(0, 0).filename(), "N00E000.hgt");
        assert_eq!(TileCoord::new(-1, -1).filename(), "S01W001.hgt");
    }

    #[test]
    fn test_tile_coord_from_filename() {
        assert_eq!(
            TileCoord::from_filename("N37W105.hgt").unwrap(),
            TileCoord::new(37, -105)
        );
        assert_eq!(
            TileCoord::from_filename("s33e151.HGT").unwrap(),
            TileCoord::new(-33, 151)
        );
        for bad in ["N37W105.tif", "X37W105.hgt", "N3W105.hgt", "N37W1a5.hgt", ".hgt", "N95E000.hgt"] {
            assert!(
                matches!(TileCoord::from_filename(bad), Err(DecodeError::InvalidTileName(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_tile_coord_containing() {
        assert_eq!(
            TileCoord::containing(GeoCoord::new(37.77, -122.42)),
            TileCoord::new(37, -123)
        );
        assert_eq!(
            TileCoord::containing(GeoCoord::new(-33.87, 151.21)),
            TileCoord::new(-34, 151)
        );
    }

    #[test]
    fn test_decode_drops_overlap() {
        let res = tiny();
        // Encode file position into the sample so we can see what survived.
        let bytes = encode_file(res, |row, col| (row * 10 + col) as i16);
        let tile = ElevationTile::from_bytes(TileCoord::new(1, 2), res, &bytes).unwrap();

        assert_eq!(tile.side(), 4);
        // Trimmed row 0 is file row 1; columns keep their index.
        assert_eq!(tile.sample(0, 0), Some(10));
        assert_eq!(tile.sample(0, 3), Some(13));
        assert_eq!(tile.sample(3, 3), Some(43));
        assert_eq!(tile.sample(4, 0), None);
        assert_eq!(tile.sample(0, 4), None);
    }

    #[test]
    fn test_decode_big_endian_and_void() {
        let res = tiny();
        let bytes = encode_file(res, |row, col| match (row, col) {
            (1, 0) => -200,
            (2, 1) => VOID,
            _ => 0x0102,
        });
        let tile = ElevationTile::from_bytes(TileCoord::new(0, 0), res, &bytes).unwrap();
        assert_eq!(tile.sample(0, 0), Some(-200));
        assert_eq!(tile.sample(1, 1), Some(VOID));
        assert_eq!(tile.sample(2, 2), Some(258));
        assert_eq!(tile.void_count(), 1);
    }

    #[test]
    fn test_decode_rejects_zero_resolution() {
        let empty = Resolution::Custom {
            samples_per_degree: 0,
        };
        assert_eq!(
            ElevationTile::from_bytes(TileCoord::new(0, 0), empty, &[0u8; 2]),
            Err(DecodeError::InvalidResolution(0))
        );
        assert_eq!(
            ElevationTile::from_samples(TileCoord::new(0, 0), empty, Vec::new()),
            Err(DecodeError::InvalidResolution(0))
        );
    }

    #[test]
    fn test_decode_size_mismatch() {
        let result = ElevationTile::from_bytes(TileCoord::new(0, 0), tiny(), &[0u8; 48]);
        assert_eq!(
            result,
            Err(DecodeError::SizeMismatch {
                expected: 50,
                actual: 48
            })
        );
    }

    #[test]
    fn test_bounding_box_offset_half_cell() {
        let tile = ElevationTile::from_samples(TileCoord::new(10, -3), tiny(), vec![0; 16]).unwrap();
        let b = tile.bounding_box();
        assert!((b.lower_left().lat - 9.875).abs() < 1e-12);
        assert!((b.lower_left().lon + 3.125).abs() < 1e-12);
        assert!((b.upper_right().lat - 10.875).abs() < 1e-12);
        assert!((b.upper_right().lon + 2.125).abs() < 1e-12);
    }

    #[test]
    fn test_coordinate_index_round_trip() {
        for res in [tiny(), Resolution::Srtm3] {
            let tile = ElevationTile {
                coord: TileCoord::new(-34, 151),
                resolution: res,
                samples: vec![0; res.samples_per_degree().pow(2) as usize],
            };
            let side = tile.side();
            for &row in &[0, 1, side / 2, side - 1] {
                for &col in &[0, 1, side / 2, side - 1] {
                    let center = tile.index_to_coordinate(row, col);
                    assert_eq!(tile.coordinate_to_index(center), Some((row, col)));
                }
            }
        }
    }

    #[test]
    fn test_coordinate_to_index_orientation() {
        let tile = ElevationTile::from_samples(TileCoord::new(0, 0), tiny(), vec![0; 16]).unwrap();
        // South-west sample is the last row.
        assert_eq!(tile.coordinate_to_index(GeoCoord::new(0.0, 0.0)), Some((3, 0)));
        // North-east sample is the first row, last column.
        assert_eq!(tile.coordinate_to_index(GeoCoord::new(0.75, 0.75)), Some((0, 3)));
        // Just inside the northern cell boundary.
        assert_eq!(tile.coordinate_to_index(GeoCoord::new(0.87, 0.1)), Some((0, 0)));
        // Beyond it belongs to the next tile north.
        assert_eq!(tile.coordinate_to_index(GeoCoord::new(0.9, 0.1)), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("N01E002.hgt");
        std::fs::write(&path, encode_file(tiny(), |_, _| 7)).unwrap();

        let tile = ElevationTile::load(&path, tiny()).unwrap();
        assert_eq!(tile.coord(), TileCoord::new(1, 2));
        assert_eq!(tile.sample(2, 2), Some(7));

        let missing = ElevationTile::load(dir.path().join("N01E003.hgt"), tiny());
        assert!(matches!(missing, Err(DecodeError::Io(_))));
    }

    #[test]
    fn test_load_inferred_rejects_unknown_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("N01E002.hgt");
        std::fs::write(&path, [0u8; 10]).unwrap();
        assert!(matches!(
            ElevationTile::load_inferred(&path),
            Err(DecodeError::SizeMismatch { actual: 10, .. })
        ));
    }
}
