// Text-to-number helpers shared by the extractors

use super::Level;
use crate::error::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Parse a supply table cell such as "70%*" into a level.
/// Decoration characters are stripped; anything else unparseable is unknown.
pub fn parse_percent_cell(text: &str) -> Level {
    let cleaned: String = text.trim().replace(['%', '*'], "");
    match cleaned.trim().parse::<i64>() {
        Ok(value) if value >= 0 => u32::try_from(value).map_or(Level::Unknown, Level::Known),
        _ => Level::Unknown,
    }
}

/// First run of digits in free text, e.g. "Black Cartridge 8%" -> 8
pub fn first_number(text: &str) -> Level {
    DIGITS
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map_or(Level::Unknown, Level::Known)
}

/// Strict integer parse of a page count cell
pub fn parse_page_count(text: &str) -> Result<u32, ExtractionError> {
    let trimmed = text.trim();
    trimmed
        .parse::<u32>()
        .map_err(|_| ExtractionError::NotNumeric(trimmed.to_string()))
}
