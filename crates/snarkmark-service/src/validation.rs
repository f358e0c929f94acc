use thiserror::Error;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_ARTICLES_LIMIT: u32 = 20;
pub const DEFAULT_MARKS_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: id")]
    MissingArticleId,
    #[error("Missing required parameter: username")]
    MissingUsername,
    #[error("item_id and user_id are required")]
    MissingMarkFields,
}

/// Pagination window for the article listing.
///
/// Raw query parameters are parsed leniently: malformed numbers fall back to
/// the defaults and out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        PageParams {
            page: parse_clamped(page, DEFAULT_PAGE, 1, u32::MAX),
            limit: parse_clamped(limit, DEFAULT_ARTICLES_LIMIT, 1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

fn parse_clamped(raw: Option<&str>, default: u32, min: u32, max: u32) -> u32 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => match s.parse::<i64>() {
            Ok(n) => n.clamp(min as i64, max as i64) as u32,
            Err(_) => default,
        },
        None => default,
    }
}

/// Lenient limit for the mark listings. Malformed values fall back to
/// `default`, matching the tolerant parsing of the original handlers.
pub fn parse_limit(raw: Option<&str>, default: u32) -> u32 {
    parse_clamped(raw, default, 1, MAX_LIMIT)
}

/// A `user_id` that does not parse is treated as absent rather than an error;
/// the marks endpoint then falls through to the recent listing.
pub fn parse_user_id(raw: Option<&str>) -> Option<i32> {
    raw.map(str::trim).and_then(|s| s.parse::<i32>().ok())
}

/// Empty or whitespace-only search text means "no filter".
pub fn normalize_search(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Empty notes are stored as null.
pub fn normalize_note(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

pub fn require_username(raw: Option<String>) -> Result<String, ValidationError> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingUsername)
}
