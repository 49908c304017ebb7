//! Terrain viewsheds over SRTM elevation tiles
//!
//! Stitches fixed-resolution HGT tiles into one elevation grid covering a
//! bounding box, then computes which cells an observer can see with a
//! radial sweep. The sweep can be split into 1, 2 or 4 perimeter quadrants
//! that run independently; their partial grids merge cell by cell, a cell
//! being visible if any quadrant saw it.
//!
//! # Quick Start
//!
//! ```rust
//! use fog_viewshed::*;
//! use fog_viewshed::terrain::{generate_matrix, HillsTerrain};
//!
//! // Any HeightField works; an assembled ElevationDataGrid is the usual one
//! let field = generate_matrix(128, 128, &HillsTerrain::new(42, 128, 128, 16, 200.0));
//!
//! let observer = Observer::new(64, 64, 20.0, 40).unwrap();
//! let viewshed = Viewshed::compute(&field, observer, 4).unwrap();
//! println!("{} cells visible", viewshed.visible_count());
//! ```
//!
//! From tiles on disk:
//!
//! ```rust,no_run
//! use fog_viewshed::*;
//!
//! let bbox = AxisOrientedBoundingBox::new(
//!     GeoCoord::new(36.2, -112.3),
//!     GeoCoord::new(36.5, -111.9),
//! ).unwrap();
//! let grid = ElevationDataGrid::assemble_from_directory("hgt/", &bbox, Resolution::Srtm3).unwrap();
//!
//! let observer = Observer::at_coordinate(&grid, GeoCoord::new(36.35, -112.1), 20.0, 150).unwrap();
//! let viewshed = Viewshed::compute(&grid, observer, 4).unwrap();
//! print!("{}", viewshed.grid());
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization of configs, observers, work units and
//!   visibility grids

// Modules
pub mod error;
pub mod config;
pub mod geo;
pub mod tile;
pub mod grid;
pub mod line;
pub mod observer;
pub mod partition;
pub mod visibility;
pub mod sweep;
pub mod viewshed;
pub mod terrain;

// Re-export core types for convenience
pub use error::{DecodeError, ViewshedError, Result};
pub use config::{Resolution, ViewshedConfig, ViewshedConfigBuilder, MAX_RADIUS};
pub use geo::{AxisOrientedBoundingBox, GeoCoord, LatticeBox};
pub use tile::{ElevationTile, TileCoord, TileRepository, VOID};
pub use grid::{ElevationDataGrid, ElevationMatrix, HeightField};
pub use line::rasterize;
pub use observer::Observer;
pub use partition::{PartialResults, PerimeterPartition, QuadrantAssignment, ViewshedWork};
pub use visibility::{Visibility, VisibilityGrid};
pub use sweep::sweep;
pub use viewshed::Viewshed;
pub use terrain::{FlatTerrain, HillsTerrain, TerrainSampler};

// Re-export glam::IVec2 for convenience
pub use glam::IVec2;
