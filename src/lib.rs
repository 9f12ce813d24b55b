//! Daily Agenda Library
//!
//! Generates a printable planner: one PDF page per day from a start date
//! through December 31 of that year. Each page has:
//! - A large centered Spanish date header ("Jueves 28 Agosto 2025")
//! - A light gray grid for handwritten notes, kept clear of the header
//! - An optional centered page number
//!
//! # Example
//!
//! ```no_run
//! use daily_agenda::agenda::{build_agenda_pdf, AgendaOptions};
//! use std::path::PathBuf;
//!
//! let options = AgendaOptions {
//!     output_path: PathBuf::from("Agenda.pdf"),
//!     ..Default::default()
//! };
//!
//! build_agenda_pdf(&options).expect("Failed to build agenda");
//! ```

pub mod agenda;
pub mod date;
pub mod error;
pub mod grid;
pub mod layout;
pub mod locale;
pub mod logging;
pub mod pdf;
pub mod typeface;

// Re-export commonly used items
pub use agenda::{build_agenda, build_agenda_pdf, AgendaOptions, AgendaSummary};
pub use date::CalendarDate;
pub use error::{Error, Result};
