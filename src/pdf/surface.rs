//! The drawing-surface boundary
//!
//! Page composition talks to the output document only through
//! [`DrawingSurface`]. [`PdfSurface`](super::PdfSurface) writes a real PDF;
//! [`RecordingSurface`] keeps every operation in memory for dry runs and
//! tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use super::fonts::{FontMetrics, HELVETICA};

/// A straight segment in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl LineSegment {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_horizontal(&self) -> bool {
        self.y1 == self.y2
    }

    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }
}

/// Stroke style for lines: gray level (0 = black, 1 = white) and width in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub gray: f32,
    pub width: f32,
}

/// Minimum capability set page composition needs from an output document
pub trait DrawingSurface {
    /// Make the font at `path` available under `name`.
    /// Failure only means the font cannot be used.
    fn register_font(&mut self, name: &str, path: &Path) -> Result<()>;

    /// Start a new blank page; it becomes the drawing target
    fn new_page(&mut self) -> Result<()>;

    /// Select font and size for subsequent text. Fails for unknown fonts.
    fn set_font(&mut self, name: &str, size: f32) -> Result<()>;

    /// Rendered width of `text`, in the same units as the page geometry
    fn text_width(&self, text: &str, name: &str, size: f32) -> Result<f32>;

    /// Draw text with its baseline-left corner at (x, y)
    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<()>;

    fn draw_line(&mut self, segment: LineSegment, stroke: Stroke) -> Result<()>;

    /// Write the composed document to `destination`
    fn finalize(&mut self, destination: &Path) -> Result<()>;
}

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        font: String,
        size: f32,
    },
    Line {
        segment: LineSegment,
        stroke: Stroke,
    },
}

/// Operations recorded for a single page, in drawing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedPage {
    pub ops: Vec<DrawOp>,
}

impl RecordedPage {
    /// Text operations as (x, y, text, font, size)
    pub fn texts(&self) -> impl Iterator<Item = (f32, f32, &str, &str, f32)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { x, y, text, font, size } => Some((*x, *y, text.as_str(), font.as_str(), *size)),
            DrawOp::Line { .. } => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineSegment> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Line { segment, .. } => Some(segment),
            DrawOp::Text { .. } => None,
        })
    }
}

/// In-memory surface that records what would be drawn
///
/// Fonts register successfully when their file exists and the name is not
/// already taken by another file; all text is measured with Helvetica metrics.
#[derive(Debug)]
pub struct RecordingSurface {
    /// Registered names and the file each came from; `None` for built-ins
    fonts: BTreeMap<String, Option<PathBuf>>,
    metrics: FontMetrics,
    pages: Vec<RecordedPage>,
    current_font: Option<(String, f32)>,
    registrations: usize,
    finalized: Option<PathBuf>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            fonts: BTreeMap::from([(HELVETICA.to_string(), None)]),
            metrics: FontMetrics::helvetica(),
            pages: Vec::new(),
            current_font: None,
            registrations: 0,
            finalized: None,
        }
    }

    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    /// Number of successful `register_font` calls
    pub fn registrations(&self) -> usize {
        self.registrations
    }

    /// Destination passed to `finalize`, if it was called
    pub fn finalized(&self) -> Option<&Path> {
        self.finalized.as_deref()
    }

    fn check_open(&self) -> Result<()> {
        if self.finalized.is_some() {
            return Err(Error::General("document already finalized".to_string()));
        }
        Ok(())
    }

    fn current_page(&mut self) -> Result<&mut RecordedPage> {
        self.check_open()?;
        self.pages
            .last_mut()
            .ok_or_else(|| Error::General("no page open; call new_page first".to_string()))
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface for RecordingSurface {
    fn register_font(&mut self, name: &str, path: &Path) -> Result<()> {
        self.check_open()?;
        if let Some(existing) = self.fonts.get(name) {
            if existing.as_deref() != Some(path) {
                return Err(Error::Font(format!("font name {} is already in use", name)));
            }
            return Ok(());
        }
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        self.fonts.insert(name.to_string(), Some(path.to_path_buf()));
        self.registrations += 1;
        Ok(())
    }

    fn new_page(&mut self) -> Result<()> {
        self.check_open()?;
        self.pages.push(RecordedPage::default());
        Ok(())
    }

    fn set_font(&mut self, name: &str, size: f32) -> Result<()> {
        if !self.fonts.contains_key(name) {
            return Err(Error::Font(format!("font {} was never registered", name)));
        }
        self.current_font = Some((name.to_string(), size));
        Ok(())
    }

    fn text_width(&self, text: &str, name: &str, size: f32) -> Result<f32> {
        if !self.fonts.contains_key(name) {
            return Err(Error::Font(format!("font {} was never registered", name)));
        }
        Ok(self.metrics.text_width(text, size))
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<()> {
        let (font, size) = self
            .current_font
            .clone()
            .ok_or_else(|| Error::Font("no font selected".to_string()))?;
        self.current_page()?.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            font,
            size,
        });
        Ok(())
    }

    fn draw_line(&mut self, segment: LineSegment, stroke: Stroke) -> Result<()> {
        self.current_page()?.ops.push(DrawOp::Line { segment, stroke });
        Ok(())
    }

    fn finalize(&mut self, destination: &Path) -> Result<()> {
        self.check_open()?;
        self.finalized = Some(destination.to_path_buf());
        Ok(())
    }
}
