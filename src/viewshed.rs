//! Whole-viewshed computation
//!
//! Fans the quadrants of a partition out over rayon's thread pool, sweeps
//! each one independently and joins the partial grids.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::time::Instant;

use glam::IVec2;
use log::info;
use rayon::prelude::*;

use crate::config::ViewshedConfig;
use crate::error::Result;
use crate::grid::HeightField;
use crate::observer::Observer;
use crate::partition::{PartialResults, PerimeterPartition};
use crate::visibility::{Visibility, VisibilityGrid};

/// A finished viewshed: the observer and its merged visibility grid
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Viewshed {
    observer: Observer,
    grid: VisibilityGrid,
}

impl Viewshed {
    /// Compute the viewshed of one observer
    ///
    /// The perimeter is split into `number_of_quadrants` arcs that are swept
    /// in parallel and merged. On flat terrain every split gives the same
    /// grid. On rough terrain a cell hidden by the last sight line through
    /// it may still be visible from another quadrant, so a split can show
    /// more than a single sweep, never less.
    ///
    /// # Errors
    ///
    /// `InvalidPartition` or `InvalidObserver`, checked before any work is
    /// scheduled.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fog_viewshed::*;
    ///
    /// let field = ElevationMatrix::new(16, 16, 0.0);
    /// let observer = Observer::new(8, 8, 1.8, 5).unwrap();
    /// let viewshed = Viewshed::compute(&field, observer, 4).unwrap();
    ///
    /// assert_eq!(viewshed.visible_count(), 11 * 11 - 1);
    /// ```
    pub fn compute<H>(field: &H, observer: Observer, number_of_quadrants: u8) -> Result<Self>
    where
        H: HeightField + Sync + ?Sized,
    {
        let partition = PerimeterPartition::new(number_of_quadrants)?;
        observer.eye_elevation(field)?;

        let start = Instant::now();
        let partials = partition
            .work_for(observer)
            .into_par_iter()
            .map(|work| work.run(field).map(|grid| (work.assignment, grid)))
            .collect::<Result<Vec<_>>>()?;

        let mut join = PartialResults::new(number_of_quadrants)?;
        for (assignment, grid) in partials {
            join.receive(assignment, grid)?;
        }
        let grid = join.finish()?;

        info!(
            "[Viewshed] observer {} radius {} ({} quadrants): {}/{} cells visible in {:.2?}",
            observer.cell(),
            observer.radius,
            number_of_quadrants,
            grid.count(Visibility::Visible),
            grid.side() * grid.side(),
            start.elapsed()
        );
        Ok(Self { observer, grid })
    }

    /// Compute the viewshed for an observer cell using a config's settings
    pub fn with_config<H>(field: &H, cell: IVec2, config: &ViewshedConfig) -> Result<Self>
    where
        H: HeightField + Sync + ?Sized,
    {
        let observer = Observer::with_config(cell, config)?;
        Self::compute(field, observer, config.number_of_quadrants)
    }

    /// Compute several independent viewsheds over the same field
    ///
    /// Observers run in parallel; each result is reported separately so one
    /// bad observer does not discard the others.
    pub fn compute_many<H>(
        field: &H,
        observers: &[Observer],
        number_of_quadrants: u8,
    ) -> Vec<Result<Self>>
    where
        H: HeightField + Sync + ?Sized,
    {
        observers
            .par_iter()
            .map(|&observer| Self::compute(field, observer, number_of_quadrants))
            .collect()
    }

    /// The observer this viewshed was computed for
    #[inline]
    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// The merged visibility grid
    #[inline]
    pub fn grid(&self) -> &VisibilityGrid {
        &self.grid
    }

    /// Take the merged visibility grid
    pub fn into_grid(self) -> VisibilityGrid {
        self.grid
    }

    /// Number of cells the observer can see
    pub fn visible_count(&self) -> usize {
        self.grid.count(Visibility::Visible)
    }
}
