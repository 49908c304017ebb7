//! Visibility grids produced by a sweep
//!
//! A `VisibilityGrid` is a square of side `2·radius + 1` centered on the
//! observer. Cells start `Occluded`; a sweep marks cells `Visible` and the
//! observer's own cell `ObserverCell`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::fmt;

use glam::IVec2;

use crate::error::{Result, ViewshedError};

/// Visibility state of one cell
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i8)]
pub enum Visibility {
    /// Hidden from the observer, or never reached by a sight line
    #[default]
    Occluded = 0,
    /// Seen from the observer
    Visible = 1,
    /// The observer's own position
    ObserverCell = -1,
}

impl Visibility {
    /// Signed value used on the wire (`-1`, `0` or `1`)
    #[inline]
    pub fn value(self) -> i8 {
        self as i8
    }

    /// Parse a wire value
    pub fn from_value(value: i8) -> Option<Self> {
        match value {
            0 => Some(Visibility::Occluded),
            1 => Some(Visibility::Visible),
            -1 => Some(Visibility::ObserverCell),
            _ => None,
        }
    }

    fn merge(self, incoming: Visibility) -> Visibility {
        match (self, incoming) {
            (Visibility::ObserverCell, _) => Visibility::ObserverCell,
            (_, Visibility::Visible) => Visibility::Visible,
            (Visibility::Occluded, Visibility::ObserverCell) => Visibility::ObserverCell,
            (current, _) => current,
        }
    }
}

/// Square visibility result centered on an observer
///
/// Local cell `(lx, ly)` corresponds to height-field cell
/// `(center.x - radius + lx, center.y - radius + ly)`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityGrid {
    center: IVec2,
    radius: u32,
    cells: Vec<Visibility>,
}

impl VisibilityGrid {
    /// Allocate an all-`Occluded` grid
    pub fn new(center: IVec2, radius: u32) -> Self {
        let side = 2 * radius as usize + 1;
        Self {
            center,
            radius,
            cells: vec![Visibility::Occluded; side * side],
        }
    }

    /// Rebuild a grid from its signed-value matrix (`values[lx][ly]`)
    ///
    /// # Errors
    ///
    /// - `GridMismatch` if the matrix is not square with an odd side
    /// - `InvalidConfig` for values outside `{-1, 0, 1}`
    pub fn from_values(center: IVec2, values: &[Vec<i8>]) -> Result<Self> {
        let side = values.len();
        if side % 2 == 0 {
            return Err(ViewshedError::GridMismatch {
                expected: side + 1,
                actual: side,
            });
        }
        if let Some(row) = values.iter().find(|row| row.len() != side) {
            return Err(ViewshedError::GridMismatch {
                expected: side,
                actual: row.len(),
            });
        }

        let cells = values
            .iter()
            .flatten()
            .map(|&v| {
                Visibility::from_value(v).ok_or_else(|| {
                    ViewshedError::InvalidConfig(format!("invalid visibility value {}", v))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            center,
            radius: (side / 2) as u32,
            cells,
        })
    }

    /// Signed-value matrix, `values[lx][ly]`
    pub fn to_values(&self) -> Vec<Vec<i8>> {
        self.cells
            .chunks(self.side())
            .map(|row| row.iter().map(|c| c.value()).collect())
            .collect()
    }

    /// Height-field cell the observer stands on
    #[inline]
    pub fn center(&self) -> IVec2 {
        self.center
    }

    /// Viewing radius in cells
    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Side length, `2·radius + 1`
    #[inline]
    pub fn side(&self) -> usize {
        2 * self.radius as usize + 1
    }

    /// State of local cell `(lx, ly)`
    pub fn get(&self, lx: usize, ly: usize) -> Option<Visibility> {
        let side = self.side();
        (lx < side && ly < side).then(|| self.cells[lx * side + ly])
    }

    /// State of a height-field cell, if it lies inside the grid
    pub fn get_global(&self, cell: IVec2) -> Option<Visibility> {
        self.local_index(cell).map(|i| self.cells[i])
    }

    /// Number of cells in a given state
    pub fn count(&self, state: Visibility) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Iterate `(height-field cell, state)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, Visibility)> + '_ {
        let side = self.side();
        let origin = self.origin();
        self.cells.iter().enumerate().map(move |(i, &state)| {
            let local = IVec2::new((i / side) as i32, (i % side) as i32);
            (origin + local, state)
        })
    }

    /// Fold another grid of the same observer into this one
    ///
    /// A cell becomes `Visible` if either grid has it `Visible`; otherwise it
    /// keeps its `Occluded` / `ObserverCell` state. Merging a grid with
    /// itself leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `GridMismatch` if the grids differ in size, and
    /// `InvalidObserver` if they are centered on different cells.
    pub fn merge(&mut self, other: &VisibilityGrid) -> Result<()> {
        if self.radius != other.radius {
            return Err(ViewshedError::GridMismatch {
                expected: self.side(),
                actual: other.side(),
            });
        }
        if self.center != other.center {
            return Err(ViewshedError::InvalidObserver(format!(
                "cannot merge grid centered on {} into grid centered on {}",
                other.center, self.center
            )));
        }
        for (cell, &incoming) in self.cells.iter_mut().zip(&other.cells) {
            *cell = cell.merge(incoming);
        }
        Ok(())
    }

    pub(crate) fn mark_visible(&mut self, cell: IVec2) {
        if let Some(i) = self.local_index(cell) {
            self.cells[i] = Visibility::Visible;
        }
    }

    pub(crate) fn mark_occluded(&mut self, cell: IVec2) {
        if let Some(i) = self.local_index(cell) {
            self.cells[i] = Visibility::Occluded;
        }
    }

    pub(crate) fn mark_observer(&mut self) {
        let i = self.radius as usize * self.side() + self.radius as usize;
        self.cells[i] = Visibility::ObserverCell;
    }

    fn origin(&self) -> IVec2 {
        self.center - IVec2::splat(self.radius as i32)
    }

    fn local_index(&self, cell: IVec2) -> Option<usize> {
        let local = cell - self.origin();
        let side = self.side() as i32;
        if local.x < 0 || local.y < 0 || local.x >= side || local.y >= side {
            return None;
        }
        Some(local.x as usize * side as usize + local.y as usize)
    }
}

impl fmt::Display for VisibilityGrid {
    /// One text line per local `x`, `*` visible, `.` occluded, `@` observer
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.side()) {
            for cell in row {
                let c = match cell {
                    Visibility::Visible => '*',
                    Visibility::Occluded => '.',
                    Visibility::ObserverCell => '@',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> VisibilityGrid {
        VisibilityGrid::from_values(
            IVec2::new(5, 5),
            &[vec![1, 0, 1], vec![0, -1, 0], vec![1, 1, 0]],
        )
        .unwrap()
    }

    #[test]
    fn test_new_is_all_occluded() {
        let grid = VisibilityGrid::new(IVec2::new(10, 10), 3);
        assert_eq!(grid.side(), 7);
        assert_eq!(grid.count(Visibility::Occluded), 49);
    }

    #[test]
    fn test_values_round_trip() {
        let grid = sample_grid();
        assert_eq!(grid.radius(), 1);
        assert_eq!(grid.get(1, 1), Some(Visibility::ObserverCell));
        assert_eq!(grid.get_global(IVec2::new(4, 4)), Some(Visibility::Visible));
        assert_eq!(grid.get_global(IVec2::new(7, 5)), None);
        assert_eq!(grid.to_values(), vec![vec![1, 0, 1], vec![0, -1, 0], vec![1, 1, 0]]);
    }

    #[test]
    fn test_from_values_rejects_bad_input() {
        assert!(VisibilityGrid::from_values(IVec2::ZERO, &[vec![0, 0], vec![0, 0]]).is_err());
        assert!(VisibilityGrid::from_values(IVec2::ZERO, &[vec![0, 0, 0], vec![0], vec![0]]).is_err());
        assert!(matches!(
            VisibilityGrid::from_values(IVec2::ZERO, &[vec![2]]),
            Err(ViewshedError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_merge_visible_wins() {
        let mut a = sample_grid();
        let b = VisibilityGrid::from_values(
            IVec2::new(5, 5),
            &[vec![0, 1, 0], vec![0, -1, 0], vec![0, 0, 0]],
        )
        .unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.to_values(), vec![vec![1, 1, 1], vec![0, -1, 0], vec![1, 1, 0]]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let grid = sample_grid();
        let mut merged = grid.clone();
        merged.merge(&grid).unwrap();
        assert_eq!(merged, grid);
    }

    #[test]
    fn test_merge_into_blank_keeps_observer() {
        let mut blank = VisibilityGrid::new(IVec2::new(5, 5), 1);
        blank.merge(&sample_grid()).unwrap();
        assert_eq!(blank, sample_grid());
    }

    #[test]
    fn test_merge_rejects_mismatch() {
        let mut a = sample_grid();
        let bigger = VisibilityGrid::new(IVec2::new(5, 5), 2);
        assert!(matches!(
            a.merge(&bigger),
            Err(ViewshedError::GridMismatch { expected: 3, actual: 5 })
        ));
        let moved = VisibilityGrid::new(IVec2::new(6, 5), 1);
        assert!(matches!(a.merge(&moved), Err(ViewshedError::InvalidObserver(_))));
    }

    #[test]
    fn test_iter_uses_height_field_cells() {
        let grid = sample_grid();
        let observer: Vec<_> = grid
            .iter()
            .filter(|(_, s)| *s == Visibility::ObserverCell)
            .map(|(c, _)| c)
            .collect();
        assert_eq!(observer, vec![IVec2::new(5, 5)]);
    }

    #[test]
    fn test_marks_overwrite() {
        let mut grid = VisibilityGrid::new(IVec2::new(5, 5), 1);
        grid.mark_visible(IVec2::new(6, 4));
        grid.mark_occluded(IVec2::new(6, 4));
        grid.mark_visible(IVec2::new(4, 4));
        // Outside the grid: ignored
        grid.mark_visible(IVec2::new(9, 9));
        grid.mark_observer();
        assert_eq!(grid.to_values(), vec![vec![1, 0, 0], vec![0, -1, 0], vec![0, 0, 0]]);
    }

    #[test]
    fn test_display() {
        assert_eq!(sample_grid().to_string(), "*.*\n.@.\n**.\n");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_grid_serialization() {
        let grid = sample_grid();
        let json = serde_json::to_string(&grid).unwrap();
        let restored: VisibilityGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(grid, restored);
    }
}
