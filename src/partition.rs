//! Partitioning a sweep into quadrants and joining the partial results
//!
//! The perimeter of the square around the observer is walked as four edges
//! in a fixed order:
//!
//! 1. `x` from `cx - r` to `cx + r` along `y = cy - r` (both corners)
//! 2. `y` from `cy - r + 1` to `cy + r - 1` along `x = cx + r` (no corners)
//! 3. `x` from `cx + r` down to `cx - r` along `y = cy + r` (both corners)
//! 4. `y` from `cy + r - 1` down to `cy - r + 1` along `x = cx - r` (no corners)
//!
//! Together these visit each of the `8r` perimeter cells exactly once. A
//! split into `n` quadrants hands each quadrant `4 / n` consecutive edges.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::IVec2;
use log::debug;

use crate::error::{Result, ViewshedError};
use crate::grid::HeightField;
use crate::observer::Observer;
use crate::sweep::sweep;
use crate::visibility::VisibilityGrid;

const EDGES: u8 = 4;

/// Which arc of the perimeter one worker sweeps
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuadrantAssignment {
    number_of_quadrants: u8,
    which_quadrant: u8,
}

impl QuadrantAssignment {
    /// Create an assignment, `which_quadrant` counting from 1
    ///
    /// # Errors
    ///
    /// Returns `InvalidPartition` unless the count is 1, 2 or 4 and the
    /// quadrant lies in `1..=count`
    pub fn new(number_of_quadrants: u8, which_quadrant: u8) -> Result<Self> {
        let assignment = Self {
            number_of_quadrants,
            which_quadrant,
        };
        assignment.validate()?;
        Ok(assignment)
    }

    /// The whole perimeter as a single quadrant
    pub fn full() -> Self {
        Self {
            number_of_quadrants: 1,
            which_quadrant: 1,
        }
    }

    /// Total number of quadrants in the split
    #[inline]
    pub fn number_of_quadrants(&self) -> u8 {
        self.number_of_quadrants
    }

    /// This quadrant, counting from 1
    #[inline]
    pub fn which_quadrant(&self) -> u8 {
        self.which_quadrant
    }

    /// Check the assignment maps onto a well-defined arc
    ///
    /// Deserialized assignments bypass `new`, so consumers re-check here.
    pub fn validate(&self) -> Result<()> {
        let count_ok = matches!(self.number_of_quadrants, 1 | 2 | 4);
        if !count_ok || self.which_quadrant == 0 || self.which_quadrant > self.number_of_quadrants {
            return Err(ViewshedError::InvalidPartition {
                number_of_quadrants: self.number_of_quadrants,
                which_quadrant: self.which_quadrant,
            });
        }
        Ok(())
    }

    fn edges(&self) -> std::ops::Range<u8> {
        let per_quadrant = EDGES / self.number_of_quadrants;
        let first = (self.which_quadrant - 1) * per_quadrant;
        first..first + per_quadrant
    }
}

/// A split of the perimeter into independent work units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerimeterPartition {
    number_of_quadrants: u8,
}

impl PerimeterPartition {
    /// Split into 1, 2 or 4 quadrants
    pub fn new(number_of_quadrants: u8) -> Result<Self> {
        QuadrantAssignment::new(number_of_quadrants, 1)?;
        Ok(Self {
            number_of_quadrants,
        })
    }

    /// Number of quadrants in the split
    #[inline]
    pub fn number_of_quadrants(&self) -> u8 {
        self.number_of_quadrants
    }

    /// One assignment per quadrant, in perimeter order
    pub fn work_units(&self) -> Vec<QuadrantAssignment> {
        (1..=self.number_of_quadrants)
            .map(|which_quadrant| QuadrantAssignment {
                number_of_quadrants: self.number_of_quadrants,
                which_quadrant,
            })
            .collect()
    }

    /// Work units bundled with the observer they sweep for
    pub fn work_for(&self, observer: Observer) -> Vec<ViewshedWork> {
        self.work_units()
            .into_iter()
            .map(|assignment| ViewshedWork {
                observer,
                assignment,
            })
            .collect()
    }
}

/// Everything a worker needs besides the height field
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewshedWork {
    /// Observer to compute the viewshed for
    pub observer: Observer,
    /// Arc of the perimeter to sweep
    pub assignment: QuadrantAssignment,
}

impl ViewshedWork {
    /// Sweep this unit's arc over a height field
    pub fn run<H: HeightField + ?Sized>(&self, field: &H) -> Result<VisibilityGrid> {
        sweep(field, &self.observer, self.assignment)
    }
}

/// Perimeter cells of the square of radius `radius` around `center` that
/// belong to one quadrant, in sweep order
pub fn perimeter(center: IVec2, radius: u32, assignment: QuadrantAssignment) -> Vec<IVec2> {
    let r = radius as i32;
    let (cx, cy) = (center.x, center.y);
    let mut cells = Vec::with_capacity(8 * radius as usize / assignment.number_of_quadrants.max(1) as usize + 2);

    for edge in assignment.edges() {
        match edge {
            0 => cells.extend((cx - r..=cx + r).map(|x| IVec2::new(x, cy - r))),
            1 => cells.extend((cy - r + 1..cy + r).map(|y| IVec2::new(cx + r, y))),
            2 => cells.extend((cx - r..=cx + r).rev().map(|x| IVec2::new(x, cy + r))),
            _ => cells.extend((cy - r + 1..cy + r).rev().map(|y| IVec2::new(cx - r, y))),
        }
    }
    cells
}

/// Counting join over the partial grids of one partitioned sweep
///
/// Partial results are merged as they arrive, so the running merge can be
/// displayed before every quadrant has reported.
#[derive(Debug, Clone)]
pub struct PartialResults {
    number_of_quadrants: u8,
    received: Vec<bool>,
    merged: Option<VisibilityGrid>,
}

impl PartialResults {
    /// Expect one partial grid per quadrant of an `n`-way split
    pub fn new(number_of_quadrants: u8) -> Result<Self> {
        PerimeterPartition::new(number_of_quadrants)?;
        Ok(Self {
            number_of_quadrants,
            received: vec![false; number_of_quadrants as usize],
            merged: None,
        })
    }

    /// Accept the partial grid swept for `assignment`
    ///
    /// Returns `true` once every quadrant has reported.
    ///
    /// # Errors
    ///
    /// - `InvalidPartition` if the assignment belongs to a different split
    /// - `DuplicateQuadrant` if this quadrant already reported
    /// - `GridMismatch` / `InvalidObserver` if the grid does not line up
    pub fn receive(&mut self, assignment: QuadrantAssignment, grid: VisibilityGrid) -> Result<bool> {
        assignment.validate()?;
        if assignment.number_of_quadrants != self.number_of_quadrants {
            return Err(ViewshedError::InvalidPartition {
                number_of_quadrants: assignment.number_of_quadrants,
                which_quadrant: assignment.which_quadrant,
            });
        }
        let slot = assignment.which_quadrant as usize - 1;
        if self.received[slot] {
            return Err(ViewshedError::DuplicateQuadrant(assignment.which_quadrant));
        }

        match self.merged.as_mut() {
            Some(merged) => merged.merge(&grid)?,
            None => self.merged = Some(grid),
        }
        self.received[slot] = true;

        debug!(
            "[Merge] quadrant {} of {} received ({} outstanding)",
            assignment.which_quadrant,
            self.number_of_quadrants,
            self.outstanding()
        );
        Ok(self.is_complete())
    }

    /// Number of partial grids received so far
    pub fn received(&self) -> usize {
        self.received.iter().filter(|&&r| r).count()
    }

    /// Number of partial grids still expected
    pub fn outstanding(&self) -> usize {
        self.number_of_quadrants as usize - self.received()
    }

    /// True once every quadrant has reported
    pub fn is_complete(&self) -> bool {
        self.outstanding() == 0
    }

    /// Merge of everything received so far
    pub fn current(&self) -> Option<&VisibilityGrid> {
        self.merged.as_ref()
    }

    /// The complete merged grid
    ///
    /// # Errors
    ///
    /// Returns `IncompleteMerge` if any quadrant is still outstanding
    pub fn finish(self) -> Result<VisibilityGrid> {
        let received = self.received();
        match self.merged {
            Some(grid) if received == self.number_of_quadrants as usize => Ok(grid),
            _ => Err(ViewshedError::IncompleteMerge {
                received,
                expected: self.number_of_quadrants as usize,
            }),
        }
    }
}
