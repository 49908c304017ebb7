//! Observer placement
//!
//! The observer is a plain value (grid cell, eye height, radius) so it can
//! be shipped to remote workers alongside a quadrant assignment.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::IVec2;

use crate::config::{ViewshedConfig, MAX_RADIUS};
use crate::error::{Result, ViewshedError};
use crate::geo::GeoCoord;
use crate::grid::{ElevationDataGrid, HeightField};

/// Viewpoint on a height field
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// First grid index of the observer's cell
    pub x: i32,
    /// Second grid index of the observer's cell
    pub y: i32,
    /// Eye height above the local terrain, in meters
    pub height: f64,
    /// Viewing radius in cells (Chebyshev distance)
    pub radius: u32,
}

impl Observer {
    /// Create an observer
    ///
    /// # Errors
    ///
    /// Returns `InvalidObserver` for a radius outside `1..=MAX_RADIUS` or a
    /// non-finite height
    pub fn new(x: i32, y: i32, height: f64, radius: u32) -> Result<Self> {
        check_radius(radius)?;
        if !height.is_finite() {
            return Err(ViewshedError::InvalidObserver(format!(
                "height must be finite (got {})",
                height
            )));
        }
        Ok(Self {
            x,
            y,
            height,
            radius,
        })
    }

    /// Observer at a grid cell using the height and radius of a config
    pub fn with_config(cell: IVec2, config: &ViewshedConfig) -> Result<Self> {
        Self::new(cell.x, cell.y, config.observer_height, config.radius)
    }

    /// Observer standing at a geographic position on an assembled grid
    ///
    /// # Errors
    ///
    /// Returns `InvalidObserver` if the position is outside the grid
    pub fn at_coordinate(
        grid: &ElevationDataGrid,
        coord: GeoCoord,
        height: f64,
        radius: u32,
    ) -> Result<Self> {
        let (row, col) = grid.coordinate_to_cell(coord).ok_or_else(|| {
            ViewshedError::InvalidObserver(format!(
                "({}, {}) is outside the elevation grid",
                coord.lat, coord.lon
            ))
        })?;
        Self::new(row as i32, col as i32, height, radius)
    }

    /// Grid cell the observer stands on
    #[inline]
    pub fn cell(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Absolute eye elevation over a height field
    ///
    /// # Errors
    ///
    /// Returns `InvalidObserver` if the radius is out of range, or the cell
    /// is outside the field or has no data.
    pub fn eye_elevation<H: HeightField + ?Sized>(&self, field: &H) -> Result<f64> {
        check_radius(self.radius)?;
        if !field.contains(self.cell()) {
            let (nx, ny) = field.dimensions();
            return Err(ViewshedError::InvalidObserver(format!(
                "cell {} is outside the {}x{} height field",
                self.cell(),
                nx,
                ny
            )));
        }
        let ground = field.height_at(self.cell()).ok_or_else(|| {
            ViewshedError::InvalidObserver(format!("cell {} has no elevation data", self.cell()))
        })?;
        Ok(ground + self.height)
    }
}

fn check_radius(radius: u32) -> Result<()> {
    if radius == 0 || radius > MAX_RADIUS {
        return Err(ViewshedError::InvalidObserver(format!(
            "radius must be in 1..={} (got {})",
            MAX_RADIUS, radius
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ElevationMatrix;

    #[test]
    fn test_new_validates() {
        assert!(Observer::new(1, 1, 2.0, 0).is_err());
        assert!(Observer::new(1, 1, 2.0, MAX_RADIUS + 1).is_err());
        assert!(Observer::new(1, 1, 2.0, u32::MAX).is_err());
        assert!(Observer::new(1, 1, f64::INFINITY, 3).is_err());
        let obs = Observer::new(1, 2, 2.0, 3).unwrap();
        assert_eq!(obs.cell(), IVec2::new(1, 2));
    }

    #[test]
    fn test_with_config() {
        let config = ViewshedConfig::default();
        let obs = Observer::with_config(IVec2::new(4, 5), &config).unwrap();
        assert_eq!(obs.height, 20.0);
        assert_eq!(obs.radius, 250);
    }

    #[test]
    fn test_eye_elevation() {
        let mut field = ElevationMatrix::new(4, 4, 100.0);
        field.set(2, 2, f64::NAN);

        let obs = Observer::new(1, 1, 5.0, 2).unwrap();
        assert_eq!(obs.eye_elevation(&field).unwrap(), 105.0);

        let off_grid = Observer::new(4, 0, 5.0, 2).unwrap();
        assert!(matches!(
            off_grid.eye_elevation(&field),
            Err(ViewshedError::InvalidObserver(_))
        ));

        let on_void = Observer::new(2, 2, 5.0, 2).unwrap();
        assert!(on_void.eye_elevation(&field).is_err());

        // Built without `new`, as a deserialized observer would be.
        let huge = Observer {
            radius: u32::MAX,
            ..obs
        };
        assert!(matches!(
            huge.eye_elevation(&field),
            Err(ViewshedError::InvalidObserver(_))
        ));
    }
}
