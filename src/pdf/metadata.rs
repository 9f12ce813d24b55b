//! Reading back a generated agenda

use std::path::Path;
use lopdf::{Document, Object};
use crate::error::{Error, Result};

/// Read the Count field of the root Pages dictionary
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let pages_id = doc.catalog()?.get(b"Pages")?.as_reference()?;
    let count = doc.get_dictionary(pages_id)?.get(b"Count")?.as_i64()?;

    usize::try_from(count)
        .map_err(|_| Error::General(format!("Negative page count: {}", count)))
}

/// Look up a text entry of the document info dictionary
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
    let value = doc.get_dictionary(info_id).ok()?.get(key).ok()?;
    value.as_str().ok().map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Producing application (if present)
    pub creator: Option<String>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(PdfMetadata {
        page_count,
        title: info_string(&doc, b"Title"),
        creator: info_string(&doc, b"Creator"),
    })
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    extract_metadata(path).map(|metadata| metadata.page_count)
}
