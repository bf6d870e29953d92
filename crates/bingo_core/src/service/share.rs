//! Canonical public share link for a card.

use crate::model::grid::GridId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static BASE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9.\-]+(:[0-9]{1,5})?(/[^\s?#]*)?$").expect("valid base url regex")
});

/// Base URL rejected for share link derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidBaseUrl(pub String);

impl Display for InvalidBaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "share base url must be an http(s) origin, got `{}`", self.0)
    }
}

impl Error for InvalidBaseUrl {}

/// Returns `<base>/card/<grid_id>`; a trailing slash on `base_url` is dropped.
pub fn share_url(base_url: &str, grid_id: GridId) -> Result<String, InvalidBaseUrl> {
    let trimmed = base_url.trim();
    if !BASE_URL_RE.is_match(trimmed) {
        return Err(InvalidBaseUrl(trimmed.to_string()));
    }
    Ok(format!("{}/card/{grid_id}", trimmed.trim_end_matches('/')))
}
