//! Viewshed configuration and builder
//!
//! This module provides the sampling resolution tiers and the validated
//! configuration used to run a viewshed.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewshedError};

/// Largest accepted viewing radius in cells
///
/// A visibility grid holds `(2·radius + 1)²` cells; this keeps it near a
/// gigabyte and every cell offset inside `i32`.
pub const MAX_RADIUS: u32 = 16_384;

/// Sampling resolution tiers for SRTM elevation tiles
///
/// Source files carry one extra row and column that overlap the neighbouring
/// tile. After that overlap is discarded a tile holds exactly
/// `samples_per_degree²` samples.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// One arc-second sampling: 3601×3601 files
    Srtm1,
    /// Three arc-second sampling: 1201×1201 files
    Srtm3,
    /// Any other square tiling, mostly useful for small test fixtures
    Custom {
        /// Samples per degree after the overlap row/column is dropped
        samples_per_degree: u32,
    },
}

impl Resolution {
    /// Samples per degree along each axis
    pub fn samples_per_degree(self) -> u32 {
        match self {
            Resolution::Srtm1 => 3600,
            Resolution::Srtm3 => 1200,
            Resolution::Custom { samples_per_degree } => samples_per_degree,
        }
    }

    /// Samples per side in the source file (including the overlap)
    #[inline]
    pub fn file_side(self) -> usize {
        self.samples_per_degree() as usize + 1
    }

    /// Expected byte length of a source file at this tier
    #[inline]
    pub fn file_len(self) -> usize {
        self.file_side() * self.file_side() * 2
    }

    /// Size of one sample cell in degrees
    #[inline]
    pub fn cell_size(self) -> f64 {
        1.0 / self.samples_per_degree() as f64
    }

    /// Infer the SRTM tier from a source file length in bytes
    pub fn from_file_len(len: usize) -> Option<Self> {
        [Resolution::Srtm1, Resolution::Srtm3]
            .into_iter()
            .find(|r| r.file_len() == len)
    }

    /// Check the tier has at least one sample per degree
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for `Custom { samples_per_degree: 0 }`
    pub fn validate(self) -> Result<()> {
        if self.samples_per_degree() == 0 {
            return Err(ViewshedError::InvalidConfig(
                "resolution must have at least one sample per degree".to_string(),
            ));
        }
        Ok(())
    }

    /// Get a human-readable name for this tier
    pub fn name(self) -> &'static str {
        match self {
            Resolution::Srtm1 => "SRTM1",
            Resolution::Srtm3 => "SRTM3",
            Resolution::Custom { .. } => "Custom",
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Srtm3
    }
}

/// Configuration for a single-observer viewshed run
///
/// # Example
///
/// ```rust
/// use fog_viewshed::*;
///
/// let config = ViewshedConfigBuilder::new()
///     .observer_height(30.0)
///     .unwrap()
///     .radius(100)
///     .unwrap()
///     .number_of_quadrants(4)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.radius, 100);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewshedConfig {
    /// Eye height above the local terrain, in meters
    pub observer_height: f64,

    /// Viewing radius in grid cells (Chebyshev distance)
    pub radius: u32,

    /// How many perimeter arcs the sweep is split into (1, 2 or 4)
    pub number_of_quadrants: u8,

    /// Sampling tier used when assembling elevation grids
    pub resolution: Resolution,
}

impl Default for ViewshedConfig {
    fn default() -> Self {
        Self {
            observer_height: 20.0,
            radius: 250,
            number_of_quadrants: 1,
            resolution: Resolution::default(),
        }
    }
}

/// Builder for creating ViewshedConfig with validation
///
/// Defaults:
/// - observer_height: 20 m
/// - radius: 250 cells
/// - number_of_quadrants: 1
/// - resolution: SRTM3
#[derive(Debug, Clone)]
pub struct ViewshedConfigBuilder {
    config: ViewshedConfig,
}

impl ViewshedConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: ViewshedConfig::default(),
        }
    }

    /// Set the observer's eye height above ground
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the height is negative or not finite
    pub fn observer_height(mut self, height: f64) -> Result<Self> {
        if !height.is_finite() || height < 0.0 {
            return Err(ViewshedError::InvalidConfig(format!(
                "observer height must be finite and >= 0 (got {})",
                height
            )));
        }
        self.config.observer_height = height;
        Ok(self)
    }

    /// Set the viewing radius in cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if radius is zero or above `MAX_RADIUS`
    pub fn radius(mut self, radius: u32) -> Result<Self> {
        if radius == 0 || radius > MAX_RADIUS {
            return Err(ViewshedError::InvalidConfig(format!(
                "radius must be in 1..={} (got {})",
                MAX_RADIUS, radius
            )));
        }
        self.config.radius = radius;
        Ok(self)
    }

    /// Set how many quadrants the sweep is split into
    ///
    /// # Errors
    ///
    /// Returns `InvalidPartition` unless the count is 1, 2 or 4
    pub fn number_of_quadrants(mut self, count: u8) -> Result<Self> {
        if !matches!(count, 1 | 2 | 4) {
            return Err(ViewshedError::InvalidPartition {
                number_of_quadrants: count,
                which_quadrant: 1,
            });
        }
        self.config.number_of_quadrants = count;
        Ok(self)
    }

    /// Set the sampling tier used for grid assembly
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.config.resolution = resolution;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a custom resolution of zero samples
    pub fn build(self) -> Result<ViewshedConfig> {
        self.config.resolution.validate()?;
        Ok(self.config)
    }
}

impl Default for ViewshedConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_tiers() {
        assert_eq!(Resolution::Srtm1.samples_per_degree(), 3600);
        assert_eq!(Resolution::Srtm3.samples_per_degree(), 1200);
        assert_eq!(Resolution::Srtm3.file_side(), 1201);
        assert_eq!(Resolution::Srtm1.file_len(), 3601 * 3601 * 2);
        assert_eq!(Resolution::Srtm1.name(), "SRTM1");
    }

    #[test]
    fn test_resolution_from_file_len() {
        assert_eq!(
            Resolution::from_file_len(1201 * 1201 * 2),
            Some(Resolution::Srtm3)
        );
        assert_eq!(
            Resolution::from_file_len(3601 * 3601 * 2),
            Some(Resolution::Srtm1)
        );
        assert_eq!(Resolution::from_file_len(1000), None);
    }

    #[test]
    fn test_builder_defaults() {
        let config = ViewshedConfigBuilder::new().build().unwrap();
        assert_eq!(config.observer_height, 20.0);
        assert_eq!(config.radius, 250);
        assert_eq!(config.number_of_quadrants, 1);
        assert_eq!(config.resolution, Resolution::Srtm3);
    }

    #[test]
    fn test_builder_custom() {
        let config = ViewshedConfigBuilder::new()
            .observer_height(3.0)
            .unwrap()
            .radius(2)
            .unwrap()
            .number_of_quadrants(2)
            .unwrap()
            .resolution(Resolution::Srtm1)
            .build()
            .unwrap();

        assert_eq!(config.observer_height, 3.0);
        assert_eq!(config.radius, 2);
        assert_eq!(config.number_of_quadrants, 2);
        assert_eq!(config.resolution, Resolution::Srtm1);
    }

    #[test]
    fn test_builder_rejects_zero_radius() {
        assert!(ViewshedConfigBuilder::new().radius(0).is_err());
        assert!(ViewshedConfigBuilder::new().radius(MAX_RADIUS + 1).is_err());
        assert!(ViewshedConfigBuilder::new().radius(MAX_RADIUS).is_ok());
    }

    #[test]
    fn test_builder_rejects_bad_height() {
        assert!(ViewshedConfigBuilder::new().observer_height(-1.0).is_err());
        assert!(ViewshedConfigBuilder::new()
            .observer_height(f64::NAN)
            .is_err());
    }

    #[test]
    fn test_builder_rejects_bad_quadrant_count() {
        for count in [0, 3, 5, 8] {
            let result = ViewshedConfigBuilder::new().number_of_quadrants(count);
            assert!(matches!(
                result,
                Err(ViewshedError::InvalidPartition { number_of_quadrants, .. }) if number_of_quadrants == count
            ));
        }
    }

    #[test]
    fn test_builder_rejects_empty_custom_resolution() {
        let result = ViewshedConfigBuilder::new()
            .resolution(Resolution::Custom {
                samples_per_degree: 0,
            })
            .build();
        assert!(result.is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = ViewshedConfigBuilder::new()
            .radius(42)
            .unwrap()
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: ViewshedConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
