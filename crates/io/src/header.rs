//! Header extractor: the fixed leading line of every source file.
//!
//! Layout (1-based, inclusive):
//! - 1–14   organization tax id
//! - 15–22  period start `DDMMYYYY`
//! - 23–30  period end `DDMMYYYY`
//! - 31–38  generation date `DDMMYYYY`
//! - 39–    entity name

use chrono::NaiveDate;
use padconv_core::Header;

use crate::error::HeaderError;

const TAX_ID_LEN: usize = 14;
const DATE_LEN: usize = 8;
const MIN_LEN: usize = TAX_ID_LEN + 3 * DATE_LEN;

pub fn parse_header(line: &str) -> Result<Header, HeaderError> {
    let chars: Vec<char> = line.trim_end_matches(&['\r', '\n'][..]).chars().collect();
    if chars.is_empty() {
        return Err(HeaderError::Missing);
    }
    if chars.len() < MIN_LEN {
        return Err(HeaderError::TooShort { len: chars.len() });
    }

    let field = |from: usize, len: usize| -> String { chars[from..from + len].iter().collect() };

    let date = |name: &'static str, from: usize| -> Result<NaiveDate, HeaderError> {
        let raw = field(from, DATE_LEN);
        parse_ddmmyyyy(&raw).ok_or(HeaderError::BadDate { field: name, value: raw })
    };

    let tax_id = field(0, TAX_ID_LEN);
    let period_start = date("period_start", TAX_ID_LEN)?;
    let period_end = date("period_end", TAX_ID_LEN + DATE_LEN)?;
    let generated_on = date("generated_on", TAX_ID_LEN + 2 * DATE_LEN)?;
    let entity_name: String = chars[MIN_LEN..].iter().collect();

    Ok(Header {
        tax_id,
        period_start,
        period_end,
        generated_on,
        entity_name: entity_name.trim().to_string(),
    })
}

/// Parse an 8-digit `DDMMYYYY` date. Anything else (blank, zeros, 31/02) is `None`.
pub fn parse_ddmmyyyy(raw: &str) -> Option<NaiveDate> {
    if raw.len() != DATE_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = raw[0..2].parse().ok()?;
    let month: u32 = raw[2..4].parse().ok()?;
    let year: i32 = raw[4..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
