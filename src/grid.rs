//! Elevation grids
//!
//! `ElevationDataGrid` stitches tiles from a `TileRepository` into one matrix
//! covering a bounding box snapped to the sampling lattice. No resampling is
//! ever done: every grid cell is exactly one tile sample, or void.
//!
//! The sweep engine reads heights through the `HeightField` trait, so it can
//! run equally on an assembled grid or on a plain `ElevationMatrix`.

use std::path::Path;
use std::time::Instant;

use glam::IVec2;
use log::{debug, info, warn};

use crate::config::Resolution;
use crate::error::{Result, ViewshedError};
use crate::geo::{AxisOrientedBoundingBox, GeoCoord, LatticeBox};
use crate::tile::{TileCoord, TileRepository, VOID};

/// Read-only access to heights on an integer grid
///
/// Cells are addressed `(x, y)` with `x` the first matrix index. `height_at`
/// returns `None` outside the grid and for cells without data.
pub trait HeightField {
    /// Extent along x and y
    fn dimensions(&self) -> (usize, usize);

    /// Height at a cell, if inside the grid and not void
    fn height_at(&self, cell: IVec2) -> Option<f64>;

    /// True if the cell lies inside the grid
    fn contains(&self, cell: IVec2) -> bool {
        let (nx, ny) = self.dimensions();
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < nx && (cell.y as usize) < ny
    }
}

/// Plain in-memory height matrix
///
/// Non-finite values are treated as void.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationMatrix {
    nx: usize,
    ny: usize,
    heights: Vec<f64>,
}

impl ElevationMatrix {
    /// Create a matrix filled with one height
    pub fn new(nx: usize, ny: usize, fill: f64) -> Self {
        Self {
            nx,
            ny,
            heights: vec![fill; nx * ny],
        }
    }

    /// Build from nested rows, `rows[x][y]`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the rows are ragged
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let nx = rows.len();
        let ny = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != ny) {
            return Err(ViewshedError::InvalidConfig(
                "elevation rows must all have the same length".to_string(),
            ));
        }
        Ok(Self {
            nx,
            ny,
            heights: rows.into_iter().flatten().collect(),
        })
    }

    /// Set the height of a cell; out-of-range cells are ignored
    pub fn set(&mut self, x: usize, y: usize, height: f64) {
        if x < self.nx && y < self.ny {
            self.heights[x * self.ny + y] = height;
        }
    }

    /// Height of a cell
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x < self.nx && y < self.ny {
            Some(self.heights[x * self.ny + y])
        } else {
            None
        }
    }
}

impl HeightField for ElevationMatrix {
    fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    fn height_at(&self, cell: IVec2) -> Option<f64> {
        if !self.contains(cell) {
            return None;
        }
        let h = self.heights[cell.x as usize * self.ny + cell.y as usize];
        h.is_finite().then_some(h)
    }
}

/// Elevation samples covering a lattice-snapped bounding box
///
/// Row 0 is the northern edge, column 0 the western edge. As a `HeightField`
/// `x` is the row and `y` the column.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationDataGrid {
    lattice: LatticeBox,
    rows: usize,
    cols: usize,
    samples: Vec<i16>,
}

impl ElevationDataGrid {
    /// Assemble the grid covering `bbox` from tiles already in `repo`
    ///
    /// The box is snapped outward to the lattice of the repository's
    /// resolution. Tiles absent from the repository contribute void samples.
    ///
    /// # Errors
    ///
    /// - `InvalidBoundingBox` if the box has zero width or height
    /// - `UnsupportedRegion` if it reaches past a pole or the antimeridian
    pub fn assemble(repo: &TileRepository, bbox: &AxisOrientedBoundingBox) -> Result<Self> {
        let start = Instant::now();
        bbox.check_supported()?;
        if bbox.is_degenerate() {
            return Err(ViewshedError::InvalidBoundingBox(format!(
                "box {:?} .. {:?} has no area",
                bbox.lower_left(),
                bbox.upper_right()
            )));
        }

        let resolution = repo.resolution();
        let lattice = bbox.snap(resolution);
        let snapped = lattice.bounding_box();
        let mut grid = Self {
            rows: lattice.rows(),
            cols: lattice.cols(),
            samples: vec![VOID; lattice.rows() * lattice.cols()],
            lattice,
        };

        let half = resolution.cell_size() / 2.0;
        let mut used = 0;
        let mut missing = 0;

        for (lat, lon) in grid.lattice.tile_corners() {
            let coord = TileCoord::new(lat, lon);
            let Some(tile) = repo.get(coord) else {
                debug!("[Assemble] {} not available, leaving void", coord.filename());
                missing += 1;
                continue;
            };
            let Some(area) = tile.bounding_box().intersection(&snapped) else {
                continue;
            };

            // Sample centers at the north-west and south-east corners of the overlap.
            let north_west = GeoCoord::new(area.upper_right().lat - half, area.lower_left().lon + half);
            let south_east = GeoCoord::new(area.lower_left().lat + half, area.upper_right().lon - half);

            let (Some((src_r0, src_c0)), Some((src_r1, src_c1)), Some((dst_r0, dst_c0))) = (
                tile.coordinate_to_index(north_west),
                tile.coordinate_to_index(south_east),
                grid.coordinate_to_cell(north_west),
            ) else {
                warn!("[Assemble] overlap with {} fell off the lattice", coord.filename());
                continue;
            };

            for (i, src_row) in (src_r0..=src_r1).enumerate() {
                let dst = (dst_r0 + i) * grid.cols + dst_c0;
                for (j, src_col) in (src_c0..=src_c1).enumerate() {
                    grid.samples[dst + j] = tile.sample(src_row, src_col).unwrap_or(VOID);
                }
            }
            used += 1;
        }

        info!(
            "[Assemble] {}x{} grid from {} tiles ({} missing) in {:.2?}",
            grid.rows,
            grid.cols,
            used,
            missing,
            start.elapsed()
        );
        Ok(grid)
    }

    /// Load the tiles `bbox` needs from a directory, then assemble
    ///
    /// Tiles are looked up by filename; nothing else in the directory is read.
    pub fn assemble_from_directory(
        dir: impl AsRef<Path>,
        bbox: &AxisOrientedBoundingBox,
        resolution: Resolution,
    ) -> Result<Self> {
        bbox.check_supported()?;
        let mut repo = TileRepository::new(resolution)?;
        repo.load_region(dir, &bbox.snap(resolution));
        Self::assemble(&repo, bbox)
    }

    /// Snapped geographic extent of the grid
    pub fn bounding_box(&self) -> AxisOrientedBoundingBox {
        self.lattice.bounding_box()
    }

    /// Sampling tier the grid was built at
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.lattice.resolution
    }

    /// Number of rows (north to south)
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (west to east)
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Raw sample at `(row, col)`, `VOID` included
    #[inline]
    pub fn sample(&self, row: usize, col: usize) -> Option<i16> {
        if row < self.rows && col < self.cols {
            Some(self.samples[row * self.cols + col])
        } else {
            None
        }
    }

    /// Number of void samples
    pub fn void_count(&self) -> usize {
        self.samples.iter().filter(|&&s| s == VOID).count()
    }

    /// Grid cell `(row, col)` containing a coordinate
    pub fn coordinate_to_cell(&self, coord: GeoCoord) -> Option<(usize, usize)> {
        let r = self.resolution().samples_per_degree() as f64;
        let lat_i = (coord.lat * r + 0.5).floor() as i64;
        let lon_i = (coord.lon * r + 0.5).floor() as i64;
        if !self.lattice.lat.contains(&lat_i) || !self.lattice.lon.contains(&lon_i) {
            return None;
        }
        Some((
            (self.lattice.lat.end - 1 - lat_i) as usize,
            (lon_i - self.lattice.lon.start) as usize,
        ))
    }

    /// Coordinate of the center of cell `(row, col)`
    pub fn cell_to_coordinate(&self, row: usize, col: usize) -> GeoCoord {
        let r = self.resolution().samples_per_degree() as f64;
        let lat_i = self.lattice.lat.end - 1 - row as i64;
        let lon_i = self.lattice.lon.start + col as i64;
        GeoCoord::new(lat_i as f64 / r, lon_i as f64 / r)
    }
}

impl HeightField for ElevationDataGrid {
    fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn height_at(&self, cell: IVec2) -> Option<f64> {
        if !self.contains(cell) {
            return None;
        }
        match self.samples[cell.x as usize * self.cols + cell.y as usize] {
            VOID => None,
            h => Some(h as f64),
        }
    }
}
