//! Spanish date headers
//!
//! Produces strings like `"Jueves 28 Agosto 2025"`: weekday, day without
//! leading zero, month name and year, names capitalized.

use chrono::Weekday;
use crate::date::CalendarDate;

/// Weekday names, Monday first
pub const WEEKDAYS: [&str; 7] = [
    "Lunes", "Martes", "Miércoles", "Jueves", "Viernes", "Sábado", "Domingo",
];

/// Month names, January first
pub const MONTHS: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize]
}

/// Month name for a 1-based month number
pub fn month_name(month: u32) -> &'static str {
    MONTHS[(month as usize - 1) % MONTHS.len()]
}

/// Format a date as `"<Weekday> <day> <Month> <year>"`
pub fn format_date_es(date: &CalendarDate) -> String {
    format!(
        "{} {} {} {}",
        weekday_name(date.weekday()),
        date.day(),
        month_name(date.month()),
        date.year()
    )
}
