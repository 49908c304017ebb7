//! Bresenham line rasterization
//!
//! Integer-only digital lines between two grid cells. Each step advances the
//! dominant axis by exactly one and the minor axis by at most one.

use glam::IVec2;

/// Cells on the line from `from` to `to`, both endpoints included
///
/// Reversing the endpoints yields exactly the reversed sequence.
///
/// # Example
///
/// ```rust
/// use fog_viewshed::rasterize;
/// use glam::IVec2;
///
/// let cells = rasterize(IVec2::new(0, 0), IVec2::new(3, 1));
/// assert_eq!(cells.len(), 4);
/// assert_eq!(cells[0], IVec2::new(0, 0));
/// assert_eq!(cells[3], IVec2::new(3, 1));
/// ```
pub fn rasterize(from: IVec2, to: IVec2) -> Vec<IVec2> {
    let mut cells = Vec::new();
    rasterize_into(from, to, &mut cells);
    cells
}

/// Append the cells from `from` to `to` onto `out`
///
/// Lets a caller walking many lines reuse one buffer.
pub fn rasterize_into(from: IVec2, to: IVec2, out: &mut Vec<IVec2>) {
    let start = out.len();
    // Always trace from the lexicographically smaller end so both directions
    // pick the same cells on ties.
    if (to.x, to.y) < (from.x, from.y) {
        trace(to, from, out);
        out[start..].reverse();
    } else {
        trace(from, to, out);
    }
}

fn trace(mut at: IVec2, to: IVec2, out: &mut Vec<IVec2>) {
    let dx = (to.x - at.x).abs();
    let dy = -(to.y - at.y).abs();
    let sx = if at.x < to.x { 1 } else { -1 };
    let sy = if at.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;

    out.reserve(dx.max(-dy) as usize + 1);
    loop {
        out.push(at);
        if at == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            at.x += sx;
        }
        if e2 <= dx {
            err += dx;
            at.y += sy;
        }
    }
}
