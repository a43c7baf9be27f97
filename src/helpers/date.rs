//! Date helper functions

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse an ISO 8601 calendar date or date-time.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS[.f]]` (a space may replace the
/// `T`) and any of those with a `Z` or `±HH:MM` offset. Values without an
/// offset are taken as UTC.
pub fn parse_iso_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let offset_formats = [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%d %H:%M%:z",
    ];
    for fmt in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    // A trailing Z on a value rfc3339 rejected (e.g. no seconds)
    let naive_part = s.strip_suffix('Z').unwrap_or(s);

    let naive_formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in naive_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive_part, fmt) {
            return Some(as_utc(dt));
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(naive_part, "%Y-%m-%d") {
        return Some(as_utc(d.and_hms_opt(0, 0, 0)?));
    }

    None
}

fn as_utc(dt: NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.from_utc_datetime(&dt).fixed_offset()
}

/// Format a date using Moment.js-compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-15"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = moment_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Moment.js tokens, longest first within each family
const MOMENT_TOKENS: [(&str, &str); 13] = [
    ("YYYY", "%Y"),
    ("MMMM", "%B"),
    ("dddd", "%A"),
    ("MMM", "%b"),
    ("ddd", "%a"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("ZZ", "%z"),
];

/// Convert Moment.js format to chrono format.
///
/// A run of letters converts only when it is made up entirely of tokens;
/// anything else (and text inside `[...]`) is copied literally.
fn moment_to_chrono_format(format: &str) -> String {
    let mut result = String::with_capacity(format.len() * 2);
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                push_literal(&mut result, &rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }

        if c.is_ascii_alphabetic() {
            let len = rest
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(rest.len());
            let (word, tail) = rest.split_at(len);
            match convert_word(word) {
                Some(converted) => result.push_str(&converted),
                None => push_literal(&mut result, word),
            }
            rest = tail;
            continue;
        }

        let (literal, tail) = rest.split_at(c.len_utf8());
        push_literal(&mut result, literal);
        rest = tail;
    }

    result
}

fn convert_word(word: &str) -> Option<String> {
    let mut converted = String::new();
    let mut rest = word;
    while !rest.is_empty() {
        let (token, chrono) = MOMENT_TOKENS
            .iter()
            .find(|(token, _)| rest.starts_with(token))?;
        converted.push_str(chrono);
        rest = &rest[token.len()..];
    }
    Some(converted)
}

fn push_literal(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}
