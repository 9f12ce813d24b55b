//! PDF writing using lopdf
//!
//! Pages are appended in the order they are opened. Every page shares one
//! Resources dictionary holding all registered fonts. The finished document
//! is written to a temporary file beside the destination and renamed into
//! place, so a failed build never leaves a truncated PDF behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::PageDimensions;
use super::fonts::{add_helvetica, embed_truetype, encode_win_ansi, FontMetrics, HELVETICA};
use super::surface::{DrawingSurface, LineSegment, Stroke};

/// A font available to `set_font`
#[derive(Debug)]
struct PdfFont {
    /// Name used in the Resources /Font dictionary, e.g. `F1`
    resource: String,
    id: ObjectId,
    metrics: FontMetrics,
    /// File the font was embedded from; `None` for built-ins
    source: Option<PathBuf>,
}

/// [`DrawingSurface`] that builds a PDF document in memory
#[derive(Debug)]
pub struct PdfSurface {
    doc: Document,
    width: f32,
    height: f32,
    pages_id: ObjectId,
    resources_id: ObjectId,
    fonts: BTreeMap<String, PdfFont>,
    page_ids: Vec<ObjectId>,
    current: Option<Vec<Operation>>,
    current_font: Option<(String, f32)>,
    title: Option<String>,
    finished: bool,
}

impl PdfSurface {
    /// Create an empty document whose pages all have the given size.
    /// Helvetica is always available.
    pub fn new(page: PageDimensions) -> Self {
        let mut doc = Document::with_version("1.5");

        // Reserve ids now; the dictionaries are filled in by finalize()
        let pages_id = doc.new_object_id();
        let resources_id = doc.new_object_id();

        let helvetica_id = add_helvetica(&mut doc);
        let mut fonts = BTreeMap::new();
        fonts.insert(HELVETICA.to_string(), PdfFont {
            resource: "F1".to_string(),
            id: helvetica_id,
            metrics: FontMetrics::helvetica(),
            source: None,
        });

        Self {
            doc,
            width: page.width_pt(),
            height: page.height_pt(),
            pages_id,
            resources_id,
            fonts,
            page_ids: Vec::new(),
            current: None,
            current_font: None,
            title: None,
            finished: false,
        }
    }

    /// Set the /Title entry of the document info dictionary
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Pages opened so far, including the one being drawn
    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.current.is_some())
    }

    fn check_open(&self) -> Result<()> {
        if self.finished {
            return Err(Error::General("document already finalized".to_string()));
        }
        Ok(())
    }

    fn font(&self, name: &str) -> Result<&PdfFont> {
        self.fonts
            .get(name)
            .ok_or_else(|| Error::Font(format!("font {} was never registered", name)))
    }

    fn operations(&mut self) -> Result<&mut Vec<Operation>> {
        self.check_open()?;
        self.current
            .as_mut()
            .ok_or_else(|| Error::General("no page open; call new_page first".to_string()))
    }

    /// Turn the page being drawn into a content stream and page object
    fn flush_page(&mut self) -> Result<()> {
        let Some(operations) = self.current.take() else {
            return Ok(());
        };

        let content = Content { operations }.encode()?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set("MediaBox", Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(self.width),
            Object::Real(self.height),
        ]));
        page.set("Resources", Object::Reference(self.resources_id));
        page.set("Contents", Object::Reference(content_id));

        let page_id = self.doc.add_object(Object::Dictionary(page));
        self.page_ids.push(page_id);
        debug!(page = self.page_ids.len(), "page written");
        Ok(())
    }

    /// Catalog, page tree, shared resources and info dictionary
    fn build_document_structure(&mut self) {
        let mut font_resources = Dictionary::new();
        for font in self.fonts.values() {
            font_resources.set(font.resource.as_bytes(), Object::Reference(font.id));
        }
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_resources));

        let kids: Vec<Object> = self.page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(self.page_ids.len() as i64));
        pages.set("Kids", Object::Array(kids));

        self.doc.objects.insert(self.resources_id, Object::Dictionary(resources));
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.doc.add_object(Object::Dictionary(catalog));

        let mut info = Dictionary::new();
        if let Some(ref title) = self.title {
            info.set("Title", Object::String(title.as_bytes().to_vec(), StringFormat::Literal));
        }
        info.set("Creator", Object::String(env!("CARGO_PKG_NAME").as_bytes().to_vec(), StringFormat::Literal));
        let created = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        info.set("CreationDate", Object::String(created.into_bytes(), StringFormat::Literal));
        let info_id = self.doc.add_object(Object::Dictionary(info));

        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.trailer.set("Info", Object::Reference(info_id));
    }
}

impl DrawingSurface for PdfSurface {
    fn register_font(&mut self, name: &str, path: &Path) -> Result<()> {
        self.check_open()?;
        if let Some(existing) = self.fonts.get(name) {
            if existing.source.as_deref() != Some(path) {
                return Err(Error::Font(format!("font name {} is already in use", name)));
            }
            return Ok(());
        }

        let data = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let (id, metrics) = embed_truetype(&mut self.doc, name, &data)?;

        let resource = format!("F{}", self.fonts.len() + 1);
        debug!(font = name, resource = %resource, path = %path.display(), "embedded font");
        self.fonts.insert(name.to_string(), PdfFont {
            resource,
            id,
            metrics,
            source: Some(path.to_path_buf()),
        });
        Ok(())
    }

    fn new_page(&mut self) -> Result<()> {
        self.check_open()?;
        self.flush_page()?;
        // Black fill for text; strokes set their own gray
        self.current = Some(vec![Operation::new("g", vec![Object::Integer(0)])]);
        Ok(())
    }

    fn set_font(&mut self, name: &str, size: f32) -> Result<()> {
        self.font(name)?;
        self.current_font = Some((name.to_string(), size));
        Ok(())
    }

    fn text_width(&self, text: &str, name: &str, size: f32) -> Result<f32> {
        Ok(self.font(name)?.metrics.text_width(text, size))
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<()> {
        let (name, size) = self
            .current_font
            .clone()
            .ok_or_else(|| Error::Font("no font selected".to_string()))?;
        let resource = self.font(&name)?.resource.clone();

        self.operations()?.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(resource.into_bytes()), Object::Real(size)]),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new("Tj", vec![Object::String(encode_win_ansi(text), StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    fn draw_line(&mut self, segment: LineSegment, stroke: Stroke) -> Result<()> {
        self.operations()?.extend([
            Operation::new("w", vec![Object::Real(stroke.width)]),
            Operation::new("G", vec![Object::Real(stroke.gray)]),
            Operation::new("m", vec![Object::Real(segment.x1), Object::Real(segment.y1)]),
            Operation::new("l", vec![Object::Real(segment.x2), Object::Real(segment.y2)]),
            Operation::new("S", vec![]),
        ]);
        Ok(())
    }

    fn finalize(&mut self, destination: &Path) -> Result<()> {
        self.check_open()?;
        self.flush_page()?;
        if self.page_ids.is_empty() {
            return Err(Error::EmptyPdf(destination.to_path_buf()));
        }

        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.is_dir() {
            return Err(Error::FileNotFound(dir.to_path_buf()));
        }

        self.build_document_structure();
        self.finished = true;
        self.doc.compress();

        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            self.doc.save_to(&mut writer)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(destination).map_err(|e| Error::Io(e.error))?;

        debug!(pages = self.page_ids.len(), path = %destination.display(), "document saved");
        Ok(())
    }
}
