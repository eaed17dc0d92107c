//! Date-templated image URLs.

use chrono::{Datelike, NaiveDate};
use url::Url;

use crate::error::FetchError;

/// Default daily moon image location.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://starwalk.space/assets/moon-calendar/phases/moon-phase-london-uk-{year}-{month}-{day}-m.png";

/// Placeholders every template must contain.
pub const PLACEHOLDERS: [&str; 3] = ["{year}", "{month}", "{day}"];

/// URL template with `{year}`, `{month}` and `{day}` placeholders.
///
/// Month and day expand zero-padded to two digits. Construction checks that
/// every placeholder is present and that the expansion is an http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, FetchError> {
        let template = template.into();

        if let Some(missing) = PLACEHOLDERS.iter().find(|p| !template.contains(*p)) {
            return Err(FetchError::InvalidUrl(format!(
                "template '{}' is missing {}",
                template, missing
            )));
        }

        let parsed = Self { template };
        // Any valid day works for checking the shape of the expansion
        let probe = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
        parsed.expand(probe)?;
        Ok(parsed)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Expand the template for `day`.
    pub fn expand(&self, day: NaiveDate) -> Result<Url, FetchError> {
        let expanded = self
            .template
            .replace("{year}", &format!("{:04}", day.year()))
            .replace("{month}", &format!("{:02}", day.month()))
            .replace("{day}", &format!("{:02}", day.day()));

        let url = Url::parse(&expanded)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", expanded, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(FetchError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                expanded, other
            ))),
        }
    }
}

impl Default for UrlTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}
