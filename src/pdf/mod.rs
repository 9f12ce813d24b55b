//! PDF output module

pub mod fonts;
pub mod metadata;
pub mod surface;
pub mod writer;

// Re-export commonly used items
pub use fonts::{FontMetrics, HELVETICA};
pub use metadata::{count_pages, extract_metadata, PdfMetadata};
pub use surface::{DrawOp, DrawingSurface, LineSegment, RecordedPage, RecordingSurface, Stroke};
pub use writer::PdfSurface;
