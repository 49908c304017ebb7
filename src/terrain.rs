//! Synthetic terrain
//!
//! Height-field samplers for demos and tests: a flat plane and a seeded
//! field of Gaussian hills.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::grid::ElevationMatrix;

/// Trait for sampling terrain height at a grid position
pub trait TerrainSampler {
    /// Height in meters at grid position `(x, y)`
    fn sample(&self, x: f64, y: f64) -> f64;
}

/// Level terrain at a fixed height
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlatTerrain {
    /// Height of every cell, in meters
    pub height: f64,
}

impl FlatTerrain {
    /// Create a plane at `height`
    pub fn new(height: f64) -> Self {
        Self { height }
    }
}

impl TerrainSampler for FlatTerrain {
    fn sample(&self, _x: f64, _y: f64) -> f64 {
        self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Hill {
    x: f64,
    y: f64,
    sigma: f64,
    height: f64,
}

/// Rolling terrain built from randomly placed Gaussian hills
///
/// The same seed always produces the same terrain.
///
/// # Example
///
/// ```rust
/// use fog_viewshed::terrain::{HillsTerrain, TerrainSampler};
///
/// let a = HillsTerrain::new(42, 100, 100, 10, 250.0);
/// let b = HillsTerrain::new(42, 100, 100, 10, 250.0);
/// assert_eq!(a.sample(12.0, 40.0), b.sample(12.0, 40.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HillsTerrain {
    hills: Vec<Hill>,
}

impl HillsTerrain {
    /// Scatter `count` hills over an `nx` × `ny` area
    ///
    /// Hill peaks range from a fifth of `max_height` up to `max_height`;
    /// widths scale with the size of the area.
    pub fn new(seed: u64, nx: usize, ny: usize, count: usize, max_height: f64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let extent = nx.max(ny).max(1) as f64;
        let max_sigma = 1.5 + extent / 6.0;
        let min_height = 0.2 * max_height.abs();

        let hills = (0..count)
            .map(|_| Hill {
                x: rng.gen_range(0.0..nx.max(1) as f64),
                y: rng.gen_range(0.0..ny.max(1) as f64),
                sigma: rng.gen_range(1.0..max_sigma),
                height: rng.gen_range(min_height..=max_height.abs()),
            })
            .collect();

        Self { hills }
    }

    /// Number of hills in the field
    pub fn len(&self) -> usize {
        self.hills.len()
    }

    /// True if the field has no hills
    pub fn is_empty(&self) -> bool {
        self.hills.is_empty()
    }
}

impl TerrainSampler for HillsTerrain {
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.hills
            .iter()
            .map(|hill| {
                let d2 = (x - hill.x).powi(2) + (y - hill.y).powi(2);
                hill.height * (-d2 / (2.0 * hill.sigma * hill.sigma)).exp()
            })
            .sum()
    }
}

/// Sample a terrain at every cell of an `nx` × `ny` grid
pub fn generate_matrix<S: TerrainSampler + ?Sized>(nx: usize, ny: usize, sampler: &S) -> ElevationMatrix {
    let mut matrix = ElevationMatrix::new(nx, ny, 0.0);
    for x in 0..nx {
        for y in 0..ny {
            matrix.set(x, y, sampler.sample(x as f64, y as f64));
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::HeightField;
    use glam::IVec2;

    #[test]
    fn test_flat_terrain() {
        let matrix = generate_matrix(3, 4, &FlatTerrain::new(12.5));
        assert_eq!(matrix.dimensions(), (3, 4));
        assert_eq!(matrix.height_at(IVec2::new(2, 3)), Some(12.5));
    }

    #[test]
    fn test_hills_are_deterministic() {
        let a = HillsTerrain::new(7, 50, 50, 8, 100.0);
        let b = HillsTerrain::new(7, 50, 50, 8, 100.0);
        let c = HillsTerrain::new(8, 50, 50, 8, 100.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 8);
    }

    #[test]
    fn test_hills_stay_in_range() {
        let terrain = HillsTerrain::new(3, 30, 30, 5, 200.0);
        let matrix = generate_matrix(30, 30, &terrain);
        let mut highest = 0.0f64;
        for x in 0..30 {
            for y in 0..30 {
                let h = matrix.get(x, y).unwrap();
                assert!(h >= 0.0);
                assert!(h <= 5.0 * 200.0);
                highest = highest.max(h);
            }
        }
        assert!(highest > 0.0);
    }

    #[test]
    fn test_no_hills_is_flat() {
        let terrain = HillsTerrain::new(1, 10, 10, 0, 100.0);
        assert!(terrain.is_empty());
        assert_eq!(terrain.sample(4.0, 4.0), 0.0);
    }
}
