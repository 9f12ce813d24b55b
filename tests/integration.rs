//! Integration tests for the daily agenda library

use daily_agenda::agenda::{build_agenda_pdf, AgendaOptions};
use daily_agenda::date::CalendarDate;
use daily_agenda::layout::PageDimensions;
use daily_agenda::pdf::{count_pages, extract_metadata, FontMetrics};
use daily_agenda::typeface::FontCandidate;
use daily_agenda::Error;
use lopdf::content::Operation;
use lopdf::{Document, Object};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DEJAVU_SANS: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

fn date(y: i32, m: u32, d: u32) -> CalendarDate {
    CalendarDate::from_ymd(y, m, d).expect("valid test date")
}

/// Options writing into `dir`, with no font available so output is predictable
fn options_in(dir: &TempDir, name: &str, start: CalendarDate) -> AgendaOptions {
    AgendaOptions {
        output_path: dir.path().join(name),
        start_date: Some(start),
        font_candidates: vec![FontCandidate::new("Missing", "/nonexistent/fonts/missing.ttf")],
        ..Default::default()
    }
}

/// Decoded content stream operations of every page, in page order
fn page_operations(path: &Path) -> Vec<Vec<Operation>> {
    let doc = Document::load(path).expect("Failed to load generated PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            doc.get_and_decode_page_content(id)
                .expect("Failed to decode page content")
                .operations
        })
        .collect()
}

/// Strings shown with Tj on one page
fn shown_text(operations: &[Operation]) -> Vec<Vec<u8>> {
    operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|operand| operand.as_str().ok().map(|s| s.to_vec()))
        .collect()
}

#[test]
fn test_agenda_from_august_28() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = options_in(&temp_dir, "Agenda_2025.pdf", date(2025, 8, 28));

    let summary = build_agenda_pdf(&options).expect("Failed to build agenda");
    assert_eq!(summary.pages, 126);
    assert_eq!(summary.last_date, date(2025, 12, 31));

    let metadata = extract_metadata(&options.output_path).expect("Failed to read metadata");
    assert_eq!(metadata.page_count, 126);
    assert_eq!(metadata.title.as_deref(), Some("Agenda 2025"));
    assert_eq!(metadata.creator.as_deref(), Some("daily-agenda"));

    let pages = page_operations(&options.output_path);
    assert_eq!(pages.len(), 126);
    let first = shown_text(&pages[0]);
    assert_eq!(first[0], b"Jueves 28 Agosto 2025".to_vec());
    assert_eq!(first[1], b"1".to_vec());

    // "Miércoles" is written in WinAnsiEncoding (é = 0xE9)
    let last = shown_text(&pages[125]);
    assert_eq!(last[0], b"Mi\xE9rcoles 31 Diciembre 2025".to_vec());
    assert_eq!(last[1], b"126".to_vec());
}

#[test]
fn test_agenda_on_december_31() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = options_in(&temp_dir, "last_day.pdf", date(2025, 12, 31));

    build_agenda_pdf(&options).expect("Failed to build agenda");
    assert_eq!(count_pages(&options.output_path).expect("Failed to count pages"), 1);
}

#[test]
fn test_agenda_without_page_numbers() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let numbered = options_in(&temp_dir, "numbered.pdf", date(2025, 12, 1));
    let plain = AgendaOptions {
        output_path: temp_dir.path().join("plain.pdf"),
        include_page_numbers: false,
        ..numbered.clone()
    };

    build_agenda_pdf(&numbered).expect("Failed to build numbered agenda");
    build_agenda_pdf(&plain).expect("Failed to build plain agenda");

    let numbered_pages = page_operations(&numbered.output_path);
    let plain_pages = page_operations(&plain.output_path);
    assert_eq!(plain_pages.len(), 31);
    assert_eq!(numbered_pages.len(), 31);

    for (plain_ops, numbered_ops) in plain_pages.iter().zip(&numbered_pages) {
        assert_eq!(shown_text(plain_ops).len(), 1);
        assert_eq!(shown_text(numbered_ops).len(), 2);

        let lines = |ops: &[Operation]| ops.iter().filter(|op| op.operator == "S").count();
        assert_eq!(lines(plain_ops), lines(numbered_ops));
    }
}

#[test]
fn test_fallback_font_when_none_available() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = options_in(&temp_dir, "fallback.pdf", date(2025, 12, 20));

    let summary = build_agenda_pdf(&options).expect("Failed to build agenda");
    assert!(summary.typeface.is_fallback());
    assert_eq!(summary.typeface.name(), "Helvetica");

    for operations in page_operations(&options.output_path) {
        for op in operations.iter().filter(|op| op.operator == "Tf") {
            assert_eq!(op.operands[0].as_name().expect("font operand is a name"), b"F1");
        }
    }
}

#[test]
fn test_embeds_system_font_when_present() {
    if !Path::new(DEJAVU_SANS).exists() {
        eprintln!("Skipping font embedding test: {} not found", DEJAVU_SANS);
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = AgendaOptions {
        font_candidates: vec![FontCandidate::new("DejaVuSans", DEJAVU_SANS)],
        ..options_in(&temp_dir, "dejavu.pdf", date(2025, 12, 30))
    };

    let summary = build_agenda_pdf(&options).expect("Failed to build agenda");
    assert_eq!(summary.typeface.name(), "DejaVuSans");
    assert_eq!(summary.typeface.source(), Some(Path::new(DEJAVU_SANS)));

    let doc = Document::load(&options.output_path).expect("Failed to load generated PDF");
    let has_truetype = doc.objects.values().any(|obj| match obj {
        Object::Dictionary(dict) => dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map_or(false, |subtype| subtype == b"TrueType"),
        _ => false,
    });
    assert!(has_truetype, "DejaVuSans should be embedded as a TrueType font");
}

#[test]
fn test_embedded_font_headers_stay_inside_page() {
    if !Path::new(DEJAVU_SANS).exists() {
        eprintln!("Skipping header width test: {} not found", DEJAVU_SANS);
        return;
    }

    let data = std::fs::read(DEJAVU_SANS).expect("Failed to read font");
    let face = rustybuzz::Face::from_slice(&data, 0).expect("Failed to parse font");
    let metrics = FontMetrics::from_face(&face);
    let page_width = PageDimensions::a4().width_pt();

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = AgendaOptions {
        font_candidates: vec![FontCandidate::new("DejaVuSans", DEJAVU_SANS)],
        ..options_in(&temp_dir, "full_year.pdf", date(2025, 1, 1))
    };
    let summary = build_agenda_pdf(&options).expect("Failed to build agenda");
    assert_eq!(summary.pages, 365);

    for operations in page_operations(&options.output_path) {
        // The header is the first text object on the page
        let size = operations
            .iter()
            .find(|op| op.operator == "Tf")
            .and_then(|op| op.operands[1].as_float().ok())
            .expect("header font size");
        let x = operations
            .iter()
            .find(|op| op.operator == "Td")
            .and_then(|op| op.operands[0].as_float().ok())
            .expect("header position");
        let header = shown_text(&operations).remove(0);
        let units: f32 = header.iter().map(|&code| f32::from(metrics.code_width(code))).sum();
        let width = units * size / 1000.0;

        let label = String::from_utf8_lossy(&header);
        assert!(x >= 0.0, "{} overflows the left edge: x={}", label, x);
        assert!(x + width <= page_width + 1e-3, "{} overflows the right edge: {}", label, x + width);
    }
}

#[test]
fn test_unwritable_destination_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output_path = temp_dir.path().join("no_such_dir").join("agenda.pdf");
    let options = AgendaOptions {
        output_path: output_path.clone(),
        ..options_in(&temp_dir, "unused.pdf", date(2025, 12, 28))
    };

    let result = build_agenda_pdf(&options);
    assert!(result.is_err(), "Should fail when the directory does not exist");
    assert!(!output_path.exists());
}

#[test]
fn test_invalid_config_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = AgendaOptions {
        grid_cell_size: -1.0,
        ..options_in(&temp_dir, "invalid.pdf", date(2025, 8, 28))
    };

    let result = build_agenda_pdf(&options);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert!(!options.output_path.exists());

    let leftovers: Vec<PathBuf> = std::fs::read_dir(temp_dir.path())
        .expect("Failed to list temp directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
}

#[test]
fn test_rebuild_overwrites_existing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let long = options_in(&temp_dir, "agenda.pdf", date(2025, 12, 1));
    let short = options_in(&temp_dir, "agenda.pdf", date(2025, 12, 31));

    build_agenda_pdf(&long).expect("Failed to build first agenda");
    assert_eq!(count_pages(&long.output_path).expect("Failed to count pages"), 31);

    build_agenda_pdf(&short).expect("Failed to build second agenda");
    assert_eq!(count_pages(&short.output_path).expect("Failed to count pages"), 1);
}
