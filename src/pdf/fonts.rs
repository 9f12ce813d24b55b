//! Font metrics and font objects for the PDF writer
//!
//! Text is written as single-byte WinAnsiEncoding strings, so every font
//! carries a 224-entry advance table for codes 32..=255. The same table is
//! written to the font's `/Widths` array and used to measure text, which
//! keeps measured and rendered widths identical.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use rustybuzz::ttf_parser::GlyphId;
use crate::error::{Error, Result};

/// Name of the base-14 font every PDF viewer provides
pub const HELVETICA: &str = "Helvetica";

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 255;

/// Helvetica advance widths for ASCII 32..=126 (1/1000 em)
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Helvetica advance widths for Latin-1 0xA0..=0xFF (1/1000 em)
const HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // A0-AF
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // B0-BF
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // C0-CF
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // D0-DF
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // E0-EF
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // F0-FF
];

/// Characters WinAnsiEncoding places in 0x80..=0x9F
const WIN_ANSI_SPECIALS: [(u8, char); 9] = [
    (0x80, '€'),
    (0x85, '…'),
    (0x91, '‘'),
    (0x92, '’'),
    (0x93, '“'),
    (0x94, '”'),
    (0x95, '•'),
    (0x96, '–'),
    (0x97, '—'),
];

const HELVETICA_SPECIALS: [u16; 9] = [556, 1000, 222, 222, 333, 333, 350, 556, 1000];

/// Encode text as WinAnsiEncoding bytes; unencodable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => WIN_ANSI_SPECIALS
                .iter()
                .find(|(_, special)| *special == c)
                .map_or(b'?', |(code, _)| *code),
        })
        .collect()
}

/// Character a WinAnsiEncoding code stands for, if any
pub fn decode_win_ansi(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(char::from(code)),
        _ => WIN_ANSI_SPECIALS
            .iter()
            .find(|(special, _)| *special == code)
            .map(|(_, c)| *c),
    }
}

fn helvetica_width(code: u8) -> u16 {
    match code {
        0x20..=0x7E => HELVETICA_ASCII[(code - 0x20) as usize],
        0xA0..=0xFF => HELVETICA_LATIN1[(code - 0xA0) as usize],
        _ => WIN_ANSI_SPECIALS
            .iter()
            .position(|(special, _)| *special == code)
            .map_or(0, |i| HELVETICA_SPECIALS[i]),
    }
}

/// Advance widths for WinAnsi codes 32..=255, in 1/1000 em
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    widths: Vec<u16>,
}

impl FontMetrics {
    /// Standard AFM metrics of the base-14 Helvetica
    pub fn helvetica() -> Self {
        Self {
            widths: (FIRST_CHAR..=LAST_CHAR).map(helvetica_width).collect(),
        }
    }

    /// Metrics read from a parsed TrueType face
    pub fn from_face(face: &rustybuzz::Face<'_>) -> Self {
        let scale = 1000.0 / face.units_per_em() as f32;
        let advance = |glyph: GlyphId| {
            face.glyph_hor_advance(glyph)
                .map(|units| (f32::from(units) * scale).round() as u16)
        };
        let missing = advance(GlyphId(0)).unwrap_or(0);

        let widths = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                decode_win_ansi(code)
                    .and_then(|c| face.glyph_index(c))
                    .and_then(&advance)
                    .unwrap_or(missing)
            })
            .collect();

        Self { widths }
    }

    /// Advance of a single encoded byte
    pub fn code_width(&self, code: u8) -> u16 {
        code.checked_sub(FIRST_CHAR)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Rendered width of `text` at `size` points
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|code| u32::from(self.code_width(code)))
            .sum();
        units as f32 * size / 1000.0
    }

    fn widths_array(&self) -> Vec<Object> {
        self.widths.iter().map(|w| Object::Integer(i64::from(*w))).collect()
    }
}

/// Add the base-14 Helvetica font dictionary (nothing to embed)
pub fn add_helvetica(doc: &mut Document) -> ObjectId {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(HELVETICA.as_bytes().to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));

    doc.add_object(Object::Dictionary(font))
}

/// Embed a TrueType font file with WinAnsiEncoding
///
/// The font is parsed before anything is added to `doc`, so a rejected file
/// leaves the document untouched.
pub fn embed_truetype(doc: &mut Document, name: &str, data: &[u8]) -> Result<(ObjectId, FontMetrics)> {
    if data.starts_with(b"OTTO") || data.starts_with(b"ttcf") {
        return Err(Error::Font(format!(
            "{}: only single TrueType-outline fonts can be embedded",
            name
        )));
    }

    let face = rustybuzz::Face::from_slice(data, 0)
        .ok_or_else(|| Error::Font(format!("{}: unable to parse font data", name)))?;

    let metrics = FontMetrics::from_face(&face);
    let scale = 1000.0 / face.units_per_em() as f32;
    let to_em = |units: i16| Object::Integer((f32::from(units) * scale).round() as i64);
    let bbox = face.global_bounding_box();
    let base_font: Vec<u8> = name.bytes().filter(|b| !b.is_ascii_whitespace()).collect();

    let mut font_stream_dict = Dictionary::new();
    font_stream_dict.set("Length1", Object::Integer(data.len() as i64));

    let font_stream = Stream {
        dict: font_stream_dict,
        content: data.to_vec(),
        allows_compression: true,
        start_position: None,
    };
    let font_stream_id = doc.add_object(Object::Stream(font_stream));

    let mut font_descriptor = Dictionary::new();
    font_descriptor.set("Type", Object::Name(b"FontDescriptor".to_vec()));
    font_descriptor.set("FontName", Object::Name(base_font.clone()));
    font_descriptor.set("FontFamily", Object::String(name.as_bytes().to_vec(), StringFormat::Literal));
    font_descriptor.set("Flags", Object::Integer(32)); // Nonsymbolic
    font_descriptor.set("FontBBox", Object::Array(vec![
        to_em(bbox.x_min),
        to_em(bbox.y_min),
        to_em(bbox.x_max),
        to_em(bbox.y_max),
    ]));
    font_descriptor.set("ItalicAngle", Object::Integer(0));
    font_descriptor.set("Ascent", to_em(face.ascender()));
    font_descriptor.set("Descent", to_em(face.descender()));
    font_descriptor.set("CapHeight", to_em(face.capital_height().unwrap_or(face.ascender())));
    font_descriptor.set("StemV", Object::Integer(80));
    font_descriptor.set("FontFile2", Object::Reference(font_stream_id));

    let font_descriptor_id = doc.add_object(Object::Dictionary(font_descriptor));

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"TrueType".to_vec()));
    font.set("BaseFont", Object::Name(base_font));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font.set("FontDescriptor", Object::Reference(font_descriptor_id));
    font.set("FirstChar", Object::Integer(i64::from(FIRST_CHAR)));
    font.set("LastChar", Object::Integer(i64::from(LAST_CHAR)));
    font.set("Widths", Object::Array(metrics.widths_array()));

    let font_id = doc.add_object(Object::Dictionary(font));
    Ok((font_id, metrics))
}
