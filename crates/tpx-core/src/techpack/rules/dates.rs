//! Date normalization for techpack date fields.

use chrono::{Datelike, NaiveDate};
use tracing::trace;

use super::patterns::DATE_DMY_SLASHED;

/// Values treated as "no date".
const NOT_APPLICABLE: [&str; 4] = ["n/a", "na", "tbd", "-"];

/// Accepted formats, in preference order. Day-first wins over month-first
/// for ambiguous input such as `05/06/2024`.
const DATE_FORMATS: [&str; 13] = [
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d %B %Y",
    "%d-%b-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b. %d, %Y",
];

/// Output format for normalized dates.
pub const OUTPUT_FORMAT: &str = "%d/%m/%Y";

/// Two-digit years above this belong to the 1900s.
pub const CENTURY_PIVOT: u32 = 68;

/// Normalize a date value to `DD/MM/YYYY`.
///
/// Not-applicable markers become an empty string. Anything that cannot be
/// read as a calendar date is returned trimmed but otherwise unchanged.
pub fn normalize_date(raw: &str) -> String {
    let value = raw.trim();

    if value.is_empty() || NOT_APPLICABLE.iter().any(|na| value.eq_ignore_ascii_case(na)) {
        return String::new();
    }

    match parse_date(value) {
        Some(date) => date.format(OUTPUT_FORMAT).to_string(),
        None => {
            trace!("Leaving unparseable date as-is: {:?}", value);
            value.to_string()
        }
    }
}

/// Parse a date using the known formats, then the slashed D/M/Y fallback.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            // chrono's %Y also accepts short years; those go through the pivot
            if (1000..=9999).contains(&date.year()) {
                return Some(date);
            }
            if is_textual(format) && has_short_year(value) && (0..=99).contains(&date.year()) {
                if let Some(date) = date.with_year(expand_year(date.year() as u32)) {
                    return Some(date);
                }
            }
        }
    }

    parse_dmy_fallback(value)
}

fn is_textual(format: &str) -> bool {
    format.contains("%b") || format.contains("%B")
}

/// Textual formats end in the year; a short year is one or two trailing digits.
fn has_short_year(value: &str) -> bool {
    let digits = value
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    (1..=2).contains(&digits)
}

fn parse_dmy_fallback(value: &str) -> Option<NaiveDate> {
    let slashed = value.replace(['.', '-'], "/");
    let caps = DATE_DMY_SLASHED.captures(&slashed)?;

    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = if caps[3].len() == 2 {
        expand_year(caps[3].parse().ok()?)
    } else {
        caps[3].parse().ok()?
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Expand a two-digit year using the century pivot.
pub fn expand_year(short: u32) -> i32 {
    if short > CENTURY_PIVOT {
        1900 + short as i32
    } else {
        2000 + short as i32
    }
}
