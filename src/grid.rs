//! Background note grid
//!
//! Line positions are computed as `index * cell_size` rather than by
//! repeated addition, so identical geometry always yields bit-identical
//! coordinates. Nothing is drawn above [`PageGeometry::grid_top`].

use crate::error::Result;
use crate::layout::PageGeometry;
use crate::pdf::{DrawingSurface, LineSegment, Stroke};

/// Thin light-gray stroke used for every grid line
pub const GRID_STROKE: Stroke = Stroke { gray: 0.85, width: 0.2 };

/// Grid line offsets for one page
#[derive(Debug, Clone, PartialEq)]
pub struct GridLines {
    /// x-coordinates of the vertical lines, left to right
    pub vertical: Vec<f32>,
    /// y-coordinates of the horizontal lines, bottom to top
    pub horizontal: Vec<f32>,
    /// Upper end of the vertical lines
    top: f32,
    /// Right end of the horizontal lines
    right: f32,
}

/// Multiples of `step` from 0 up to and including `limit`
fn offsets(step: f32, limit: f32) -> Vec<f32> {
    if !(step.is_finite() && step > 0.0) {
        return Vec::new();
    }
    (0u32..)
        .map(|i| i as f32 * step)
        .take_while(|offset| *offset <= limit)
        .collect()
}

impl GridLines {
    /// Compute the grid for a page. The geometry must already be validated.
    pub fn compute(geometry: &PageGeometry) -> Self {
        let top = geometry.grid_top();
        Self {
            vertical: offsets(geometry.cell_size, geometry.width),
            horizontal: offsets(geometry.cell_size, top),
            top,
            right: geometry.width,
        }
    }

    /// Total number of lines
    pub fn len(&self) -> usize {
        self.vertical.len() + self.horizontal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Segments to draw: vertical lines first, then horizontal ones
    pub fn segments(&self) -> impl Iterator<Item = LineSegment> + '_ {
        let verticals = self.vertical.iter().map(|&x| LineSegment::new(x, 0.0, x, self.top));
        let horizontals = self.horizontal.iter().map(|&y| LineSegment::new(0.0, y, self.right, y));
        verticals.chain(horizontals)
    }
}

/// Draw the grid for `geometry` and return how many lines were drawn
pub fn draw_grid<S: DrawingSurface + ?Sized>(surface: &mut S, geometry: &PageGeometry) -> Result<usize> {
    let grid = GridLines::compute(geometry);
    for segment in grid.segments() {
        surface.draw_line(segment, GRID_STROKE)?;
    }
    Ok(grid.len())
}
