//! Radial-sweep visibility engine
//!
//! For every perimeter cell in the assigned quadrant a sight line is
//! rasterized from the observer outward. Each line keeps its own horizon:
//! the steepest `(z - eye) / distance` seen so far, starting at `-∞`. A cell
//! whose slope falls below the horizon is marked `Occluded`; otherwise it is
//! marked `Visible` and raises the horizon. Ties count as visible.
//!
//! Lines never share horizon state, and a cell crossed by several lines
//! keeps whatever the last of them decided. A cell can therefore be seen
//! along one line and end up hidden by a neighbouring one.
//!
//! Reference: Franklin & Ray, "Higher isn't necessarily better: visibility
//! algorithms and experiments" (R2 perimeter sweep).

use std::time::Instant;

use glam::IVec2;
use log::debug;

use crate::error::Result;
use crate::grid::HeightField;
use crate::line::rasterize_into;
use crate::observer::Observer;
use crate::partition::{perimeter, QuadrantAssignment};
use crate::visibility::{Visibility, VisibilityGrid};

/// Sweep one quadrant of an observer's perimeter
///
/// Sight-line cells outside the height field, or without data, are skipped
/// and stay `Occluded`.
///
/// # Errors
///
/// - `InvalidPartition` if the assignment is malformed
/// - `InvalidObserver` if the observer has no radius, or stands outside the
///   field or on a void cell
///
/// Both are checked before any sweep work begins.
///
/// # Example
///
/// ```rust
/// use fog_viewshed::*;
///
/// let field = ElevationMatrix::new(9, 9, 1.0);
/// let observer = Observer::new(4, 4, 2.0, 3).unwrap();
/// let grid = sweep(&field, &observer, QuadrantAssignment::full()).unwrap();
///
/// assert_eq!(grid.side(), 7);
/// assert_eq!(grid.count(Visibility::Visible), 48);
/// ```
pub fn sweep<H>(field: &H, observer: &Observer, assignment: QuadrantAssignment) -> Result<VisibilityGrid>
where
    H: HeightField + ?Sized,
{
    assignment.validate()?;
    let eye = observer.eye_elevation(field)?;

    let start = Instant::now();
    let center = observer.cell();
    let mut grid = VisibilityGrid::new(center, observer.radius);
    let mut line: Vec<IVec2> = Vec::with_capacity(observer.radius as usize + 1);

    let targets = perimeter(center, observer.radius, assignment);
    for &target in &targets {
        line.clear();
        rasterize_into(center, target, &mut line);

        let mut horizon = f64::NEG_INFINITY;
        // line[0] is the observer itself
        for &cell in &line[1..] {
            let Some(z) = field.height_at(cell) else {
                continue;
            };
            let distance = (cell - center).as_dvec2().length();
            let slope = (z - eye) / distance;
            if slope < horizon {
                grid.mark_occluded(cell);
                continue;
            }
            horizon = slope;
            grid.mark_visible(cell);
        }
    }
    grid.mark_observer();

    debug!(
        "[Sweep] observer {} quadrant {}/{}: {} lines, {} visible in {:.2?}",
        center,
        assignment.which_quadrant(),
        assignment.number_of_quadrants(),
        targets.len(),
        grid.count(Visibility::Visible),
        start.elapsed()
    );
    Ok(grid)
}
