//! Caller-owned store of decoded tiles
//!
//! The assembler never reaches for the filesystem on its own. Tiles are put
//! into a repository either up front (`from_directory`) or on demand for one
//! region (`load_region`), and the repository is handed to the assembler.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};

use super::{ElevationTile, TileCoord};
use crate::config::Resolution;
use crate::error::{DecodeError, Result, ViewshedError};
use crate::geo::LatticeBox;

/// Decoded tiles of one resolution, keyed by their lower-left corner
#[derive(Debug, Clone, Default)]
pub struct TileRepository {
    resolution: Resolution,
    tiles: HashMap<TileCoord, ElevationTile>,
}

impl TileRepository {
    /// Create an empty repository
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the resolution has no samples per degree
    pub fn new(resolution: Resolution) -> Result<Self> {
        resolution.validate()?;
        Ok(Self {
            resolution,
            tiles: HashMap::new(),
        })
    }

    /// Preload every `*.hgt` file in a directory
    ///
    /// Files that fail to decode are logged and skipped; their area will be
    /// void in assembled grids.
    ///
    /// # Errors
    ///
    /// Returns an I/O decode error only if the directory itself cannot be read.
    pub fn from_directory(dir: impl AsRef<Path>, resolution: Resolution) -> Result<Self> {
        let dir = dir.as_ref();
        let start = Instant::now();
        let mut repo = Self::new(resolution)?;

        let entries = fs::read_dir(dir).map_err(DecodeError::from)?;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    warn!("[Tiles] skipping unreadable entry in {}: {}", dir.display(), err);
                    continue;
                }
            };
            let is_hgt = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("hgt"));
            if !is_hgt {
                continue;
            }
            match ElevationTile::load(&path, resolution) {
                Ok(tile) => {
                    repo.tiles.insert(tile.coord(), tile);
                }
                Err(err) => warn!("[Tiles] ignoring {}: {}", path.display(), err),
            }
        }

        info!(
            "[Tiles] preloaded {} {} tiles from {} in {:.2?}",
            repo.len(),
            resolution.name(),
            dir.display(),
            start.elapsed()
        );
        Ok(repo)
    }

    /// Load, by filename, every tile a lattice box touches that is not yet held
    ///
    /// Missing files are expected and only logged. Returns the number of
    /// tiles newly loaded.
    pub fn load_region(&mut self, dir: impl AsRef<Path>, region: &LatticeBox) -> usize {
        let dir = dir.as_ref();
        let mut loaded = 0;
        for (lat, lon) in region.tile_corners() {
            let coord = TileCoord::new(lat, lon);
            if self.tiles.contains_key(&coord) {
                continue;
            }
            let path = dir.join(coord.filename());
            if !path.is_file() {
                debug!("[Tiles] no local tile {}", coord.filename());
                continue;
            }
            match ElevationTile::load(&path, self.resolution) {
                Ok(tile) => {
                    self.tiles.insert(coord, tile);
                    loaded += 1;
                }
                Err(err) => warn!("[Tiles] ignoring {}: {}", path.display(), err),
            }
        }
        loaded
    }

    /// Add a tile, replacing any tile already held for the same corner
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the tile's resolution differs from the repository's
    pub fn insert(&mut self, tile: ElevationTile) -> Result<Option<ElevationTile>> {
        if tile.resolution() != self.resolution {
            return Err(ViewshedError::InvalidConfig(format!(
                "tile {} is {} but repository holds {}",
                tile.coord().filename(),
                tile.resolution().name(),
                self.resolution.name()
            )));
        }
        Ok(self.tiles.insert(tile.coord(), tile))
    }

    /// Look up a tile by corner
    #[inline]
    pub fn get(&self, coord: TileCoord) -> Option<&ElevationTile> {
        self.tiles.get(&coord)
    }

    /// Sampling tier of every tile held
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of tiles held
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if no tiles are held
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Corners of every tile held, in no particular order
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.tiles.keys().copied()
    }
}
