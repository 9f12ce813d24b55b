//! Agenda composition
//!
//! [`build_agenda`] drives a whole build: it validates the options, resolves
//! the typeface once, then opens one page per day and lets [`PageComposer`]
//! draw the header, grid and page number on it. The first error aborts the
//! build; pages are never retried individually.

use std::path::PathBuf;

use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::date::{today_in, CalendarDate, DateRange, DEFAULT_TIME_ZONE};
use crate::error::{Error, Result};
use crate::grid::draw_grid;
use crate::layout::{PageDimensions, PageGeometry};
use crate::locale::format_date_es;
use crate::pdf::{DrawingSurface, PdfSurface};
use crate::typeface::{default_candidates, resolve_typeface, FontCandidate, TypefaceChoice};

/// Options for building an agenda
#[derive(Debug, Clone)]
pub struct AgendaOptions {
    /// Where the finished PDF is written
    pub output_path: PathBuf,
    /// First day of the agenda; `None` means today in `time_zone`
    pub start_date: Option<CalendarDate>,
    /// Time zone that decides what "today" is
    pub time_zone: Tz,
    /// Grid spacing in points
    pub grid_cell_size: f32,
    /// Date header font size in points
    pub header_font_size: f32,
    /// Page number font size in points
    pub footer_font_size: f32,
    /// Whether to draw page numbers
    pub include_page_numbers: bool,
    /// Height of the header band kept free of grid lines
    pub top_margin: f32,
    /// Distance from the top edge down to the header baseline
    pub header_baseline_offset: f32,
    /// Height of the page number baseline above the bottom edge
    pub footer_baseline: f32,
    /// Paper size
    pub page: PageDimensions,
    /// Fonts to try, most preferred first
    pub font_candidates: Vec<FontCandidate>,
}

impl Default for AgendaOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("agenda.pdf"),
            start_date: None,
            time_zone: DEFAULT_TIME_ZONE,
            grid_cell_size: 20.0,
            header_font_size: 36.0,
            footer_font_size: 10.0,
            include_page_numbers: true,
            top_margin: 100.0,
            header_baseline_offset: 70.0,
            footer_baseline: 20.0,
            page: PageDimensions::a4(),
            font_candidates: default_candidates(),
        }
    }
}

impl AgendaOptions {
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(&self.page, self.top_margin, self.grid_cell_size)
    }

    /// Reject configurations that cannot produce a sensible page
    pub fn validate(&self) -> Result<()> {
        let geometry = self.geometry();
        geometry.validate()?;

        if !(self.header_font_size.is_finite() && self.header_font_size > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "header font size must be a positive number, got {}",
                self.header_font_size
            )));
        }
        if !(self.footer_font_size > 0.0 && self.footer_font_size <= self.header_font_size) {
            return Err(Error::InvalidConfig(format!(
                "page number font size must be between 0 and the header size, got {}",
                self.footer_font_size
            )));
        }
        if !(self.header_baseline_offset > 0.0 && self.header_baseline_offset <= self.top_margin) {
            return Err(Error::InvalidConfig(format!(
                "header baseline offset must lie inside the top margin ({}), got {}",
                self.top_margin, self.header_baseline_offset
            )));
        }
        if !(self.footer_baseline >= 0.0 && self.footer_baseline < geometry.grid_top()) {
            return Err(Error::InvalidConfig(format!(
                "page number baseline must lie below the header band, got {}",
                self.footer_baseline
            )));
        }
        Ok(())
    }
}

/// What a finished build produced
#[derive(Debug, Clone)]
pub struct AgendaSummary {
    pub pages: usize,
    pub first_date: CalendarDate,
    pub last_date: CalendarDate,
    pub typeface: TypefaceChoice,
    pub output_path: PathBuf,
}

/// Lays out a single agenda page
#[derive(Debug, Clone)]
pub struct PageComposer<'a> {
    typeface: &'a TypefaceChoice,
    geometry: PageGeometry,
    header_font_size: f32,
    footer_font_size: f32,
    header_baseline_offset: f32,
    footer_baseline: f32,
    include_page_numbers: bool,
}

impl<'a> PageComposer<'a> {
    pub fn new(options: &AgendaOptions, typeface: &'a TypefaceChoice) -> Self {
        Self {
            typeface,
            geometry: options.geometry(),
            header_font_size: options.header_font_size,
            footer_font_size: options.footer_font_size,
            header_baseline_offset: options.header_baseline_offset,
            footer_baseline: options.footer_baseline,
            include_page_numbers: options.include_page_numbers,
        }
    }

    /// Baseline of the date header
    pub fn header_y(&self) -> f32 {
        self.geometry.height - self.header_baseline_offset
    }

    /// Draw `text` horizontally centered with its baseline at `y`
    fn draw_centered<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        text: &str,
        size: f32,
        y: f32,
    ) -> Result<f32> {
        let font = self.typeface.name();
        surface.set_font(font, size)?;
        let width = surface.text_width(text, font, size)?;
        if width > self.geometry.width {
            warn!(text, width, page_width = self.geometry.width, "text wider than the page");
        }
        let x = self.geometry.centered_x(width);
        surface.draw_text(x, y, text)?;
        Ok(x)
    }

    /// Compose the page that is currently open on `surface`:
    /// header, then grid, then the optional page number.
    pub fn compose<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        date: &CalendarDate,
        header: &str,
        page_number: usize,
    ) -> Result<()> {
        let header_x = self.draw_centered(surface, header, self.header_font_size, self.header_y())?;
        let lines = draw_grid(surface, &self.geometry)?;

        if self.include_page_numbers {
            let label = page_number.to_string();
            self.draw_centered(surface, &label, self.footer_font_size, self.footer_baseline)?;
        }

        debug!(%date, page = page_number, header_x, lines, "composed page");
        Ok(())
    }
}

/// Widest header of `range` when set in `font` at `size`, with its text
fn widest_header<S: DrawingSurface + ?Sized>(
    surface: &S,
    font: &str,
    size: f32,
    range: &DateRange,
) -> Result<Option<(f32, String)>> {
    let mut widest: Option<(f32, String)> = None;
    for date in range {
        let header = format_date_es(&date);
        let width = surface.text_width(&header, font, size)?;
        if widest.as_ref().map_or(true, |(w, _)| width > *w) {
            widest = Some((width, header));
        }
    }
    Ok(widest)
}

/// Fail unless every header of `range` fits between the page edges
fn check_headers_fit<S: DrawingSurface + ?Sized>(
    surface: &S,
    options: &AgendaOptions,
    typeface: &TypefaceChoice,
    range: &DateRange,
) -> Result<()> {
    let page_width = options.page.width_pt();
    let size = options.header_font_size;
    if let Some((width, header)) = widest_header(surface, typeface.name(), size, range)? {
        if width > page_width {
            return Err(Error::InvalidConfig(format!(
                "header {:?} is {:.1}pt wide in {} at {}pt but the page is only {:.1}pt wide; \
                 use a smaller header font size",
                header,
                width,
                typeface.name(),
                size,
                page_width
            )));
        }
        debug!(header = %header, width, page_width, "widest header fits");
    }
    Ok(())
}

/// Build an agenda on `surface`
///
/// Starts at `options.start_date`, or at `today` when none is set, and runs
/// through December 31 of that year. The surface is finalized to
/// `options.output_path` after the last page.
///
/// Headers are measured with the resolved typeface before the first page is
/// opened; a header wider than the page is a configuration error.
pub fn build_agenda<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    options: &AgendaOptions,
    today: CalendarDate,
) -> Result<AgendaSummary> {
    options.validate()?;

    let start = options.start_date.unwrap_or(today);
    let range = DateRange::through_year_end(start);
    if range.is_empty() {
        return Err(Error::InvalidConfig(format!(
            "start date {} is after the end of its year",
            start
        )));
    }

    let typeface = resolve_typeface(surface, &options.font_candidates);
    check_headers_fit(surface, options, &typeface, &range)?;
    let composer = PageComposer::new(options, &typeface);

    for (index, date) in range.iter().enumerate() {
        surface.new_page()?;
        composer.compose(surface, &date, &format_date_es(&date), index + 1)?;
    }

    surface.finalize(&options.output_path)?;

    info!(
        pages = range.len(),
        from = %range.start(),
        to = %range.end(),
        font = typeface.name(),
        path = %options.output_path.display(),
        "agenda written"
    );

    Ok(AgendaSummary {
        pages: range.len(),
        first_date: range.start(),
        last_date: range.end(),
        typeface,
        output_path: options.output_path.clone(),
    })
}

/// Build an agenda PDF at `options.output_path`
///
/// "Today" is taken from the clock in `options.time_zone`.
///
/// # Example
///
/// ```no_run
/// use daily_agenda::agenda::{build_agenda_pdf, AgendaOptions};
/// use daily_agenda::date::CalendarDate;
/// use std::path::PathBuf;
///
/// let options = AgendaOptions {
///     output_path: PathBuf::from("Agenda_2025.pdf"),
///     start_date: Some(CalendarDate::from_ymd(2025, 8, 28).unwrap()),
///     ..Default::default()
/// };
///
/// build_agenda_pdf(&options).expect("Failed to build agenda");
/// ```
pub fn build_agenda_pdf(options: &AgendaOptions) -> Result<AgendaSummary> {
    let today = today_in(options.time_zone);
    let year = options.start_date.unwrap_or(today).year();

    let mut surface = PdfSurface::new(options.page).with_title(format!("Agenda {}", year));
    build_agenda(&mut surface, options, today)
}
