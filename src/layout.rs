//! Page layout calculations
//!
//! All drawing coordinates are PDF points with the origin at the bottom-left
//! of the page.

use crate::error::{Error, Result};

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_mm(215.9),
            height: Length::from_mm(279.4),
        }
    }

    /// A4 size (210mm × 297mm)
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }

    pub fn width_pt(&self) -> f32 {
        self.width.pt() as f32
    }

    pub fn height_pt(&self) -> f32 {
        self.height.pt() as f32
    }
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self::a4()
    }
}

/// Everything the grid and the header need to know about one page
///
/// The band between the top edge and `height - top_margin` is reserved for
/// the date header; the grid lives below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Height of the header band at the top of the page
    pub top_margin: f32,
    /// Grid spacing in points
    pub cell_size: f32,
}

impl PageGeometry {
    pub fn new(page: &PageDimensions, top_margin: f32, cell_size: f32) -> Self {
        Self {
            width: page.width_pt(),
            height: page.height_pt(),
            top_margin,
            cell_size,
        }
    }

    /// Highest y-coordinate the grid may reach
    pub fn grid_top(&self) -> f32 {
        self.height - self.top_margin
    }

    /// Whether `y` lies strictly inside the reserved header band
    pub fn in_header_band(&self, y: f32) -> bool {
        y > self.grid_top() && y <= self.height
    }

    /// Left x-coordinate that centers a run of text `text_width` wide
    pub fn centered_x(&self, text_width: f32) -> f32 {
        (self.width - text_width) / 2.0
    }

    /// Reject geometry the grid math cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "page size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "grid cell size must be a positive number, got {}",
                self.cell_size
            )));
        }
        if !(self.top_margin > 0.0 && self.top_margin < self.height) {
            return Err(Error::InvalidConfig(format!(
                "top margin must be between 0 and the page height ({}), got {}",
                self.height, self.top_margin
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        assert!((Length::from_mm(25.4).pt() - 72.0).abs() < 0.01);
        assert!((Length::from_mm(210.0).pt() - 595.28).abs() < 0.01);
    }

    #[test]
    fn test_letter_size() {
        let letter = PageDimensions::letter();
        assert!((letter.width_pt() - 612.0).abs() < 0.01);
        assert!((letter.height_pt() - 792.0).abs() < 0.01);
    }

    #[test]
    fn test_a4_size() {
        let a4 = PageDimensions::a4();
        assert!((a4.width_pt() - 595.28).abs() < 0.01);
        assert!((a4.height_pt() - 841.89).abs() < 0.01);
    }

    #[test]
    fn test_grid_top_and_header_band() {
        let geometry = PageGeometry::new(&PageDimensions::letter(), 100.0, 20.0);
        assert!((geometry.grid_top() - 692.0).abs() < 0.01);
        assert!(geometry.in_header_band(700.0));
        assert!(!geometry.in_header_band(680.0));
        assert!(!geometry.in_header_band(20.0));
    }

    #[test]
    fn test_centered_x() {
        let geometry = PageGeometry::new(&PageDimensions::letter(), 100.0, 20.0);
        assert!((geometry.centered_x(212.0) - 200.0).abs() < 0.01);
    }

    #[test]
    fn test_validate() {
        let page = PageDimensions::a4();
        assert!(PageGeometry::new(&page, 100.0, 20.0).validate().is_ok());
        assert!(PageGeometry::new(&page, 100.0, 0.0).validate().is_err());
        assert!(PageGeometry::new(&page, 100.0, -5.0).validate().is_err());
        assert!(PageGeometry::new(&page, 100.0, f32::NAN).validate().is_err());
        assert!(PageGeometry::new(&page, 0.0, 20.0).validate().is_err());
        assert!(PageGeometry::new(&page, 900.0, 20.0).validate().is_err());
    }
}
