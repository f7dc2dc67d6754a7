//! Admin configuration for the Leganto integration.
//!
//! Settings are stored in a TOML file, by default at
//! `<config dir>/leganto/config.toml` (overridable with the
//! `LEGANTO_CONFIG` environment variable or the CLI `--config` flag):
//!
//! ```toml
//! api_url = "api-eu.hosted.exlibrisgroup.com"
//! api_key = "l7xx..."
//! code_source = "shortname"
//! code_regex = '^([A-Z]{4}\d{3})'
//! year_regex = '(20\d{2})'
//! include_child_codes = true
//! default_display = "page"
//! ```
//!
//! Two pieces of cleanup run every time a configuration is loaded, mirroring
//! what administrators actually paste into the settings form:
//!
//! - the API base URL is stripped of scheme prefixes and of the shipped
//!   placeholder text, truncated at the first path separator, and
//!   re-prefixed with `https://`;
//! - the host database prefix is removed from the code-table name.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::LegantoError;

/// Placeholder shown in the API URL setting before an administrator fills
/// it in. Treated the same as an empty value.
pub const API_URL_PLACEHOLDER: &str = "api-eu.hosted.exlibrisgroup.com";

/// Environment variable overriding the default configuration file path.
pub const CONFIG_PATH_ENV: &str = "LEGANTO_CONFIG";

/// Where a local course's Alma codes are sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeSource {
    /// Pattern-extraction from the course id number (the default).
    #[default]
    Idnumber,
    /// Pattern-extraction from the course short name.
    Shortname,
    /// A side lookup table keyed by a configurable course attribute.
    Codetable,
}

/// How a reading list is displayed by the host.
///
/// Affects the heading levels carried on rendered blocks: a separate page
/// has room for larger headings than an inline listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// The list is shown on its own page.
    #[default]
    Page,
    /// The list is shown inline on the course page, initially collapsed.
    InlineCollapsed,
    /// The list is shown inline on the course page, fully expanded.
    InlineExpanded,
}

impl DisplayMode {
    /// Heading level for section headings in this mode.
    #[must_use]
    pub const fn section_heading_level(self) -> u8 {
        match self {
            Self::Page => 3,
            Self::InlineCollapsed | Self::InlineExpanded => 4,
        }
    }

    /// Heading level for citation titles in this mode.
    #[must_use]
    pub const fn citation_heading_level(self) -> u8 {
        match self {
            Self::Page => 4,
            Self::InlineCollapsed | Self::InlineExpanded => 5,
        }
    }
}

/// The admin configuration shared by every instance of the integration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Alma API base URL (host only; sanitised on load).
    pub api_url: String,
    /// Alma API key.
    pub api_key: String,
    /// Where course codes are sourced from.
    pub code_source: CodeSource,
    /// Pattern extracting course codes from the source string. When empty
    /// the whole source string is taken as the single code.
    pub code_regex: String,
    /// Pattern extracting a year token from the course id number or short
    /// name. When empty no year is searched for.
    pub year_regex: String,
    /// Lookup table name for the `codetable` policy, without the host
    /// database prefix.
    pub code_table: String,
    /// Column of the lookup table holding the Alma course code.
    pub code_column: String,
    /// Column of the lookup table matched against the course attribute.
    pub course_column: String,
    /// Which local course attribute is matched against `course_column`.
    pub course_attribute: String,
    /// Whether codes from meta-linked child courses are included.
    pub include_child_codes: bool,
    /// Default display mode for new instances.
    pub default_display: DisplayMode,
    /// Host database prefix stripped from `code_table` on load.
    pub table_prefix: String,
}

impl AdminConfig {
    /// Load and normalise a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LegantoError::ConfigRead`] when the file cannot be read and
    /// [`LegantoError::ConfigParse`] when it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, LegantoError> {
        let raw = std::fs::read_to_string(path).map_err(|source| LegantoError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            toml::from_str(&raw).map_err(|source| LegantoError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.normalize();
        debug!(path = %path.display(), "loaded admin config");
        Ok(config)
    }

    /// The default configuration file location.
    ///
    /// `LEGANTO_CONFIG` takes precedence; otherwise the platform config
    /// directory is used, falling back to the current directory when the
    /// platform reports none.
    #[must_use]
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leganto")
            .join("config.toml")
    }

    /// Apply the load-time cleanup: API URL sanitisation and table-prefix
    /// stripping. Idempotent.
    pub fn normalize(&mut self) {
        self.api_url = sanitize_api_url(&self.api_url);
        if !self.table_prefix.is_empty() {
            if let Some(stripped) = self.code_table.strip_prefix(&self.table_prefix) {
                self.code_table = stripped.to_string();
            }
        }
    }

    /// Names of the required API settings that are currently empty.
    ///
    /// An empty result means the Alma API is fully configured.
    #[must_use]
    pub fn missing_settings(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.api_url.is_empty() {
            missing.push("apiurl".to_string());
        }
        if self.api_key.is_empty() {
            missing.push("apikey".to_string());
        }
        missing
    }

    /// Whether the Alma API is fully configured.
    #[must_use]
    pub fn is_api_configured(&self) -> bool {
        self.missing_settings().is_empty()
    }
}

/// Clean up a pasted Alma API URL.
///
/// Scheme prefixes and the shipped placeholder are removed
/// case-insensitively, surrounding slashes are trimmed, anything after the
/// first remaining slash is dropped, and the result is re-prefixed with
/// `https://`. An empty result stays empty, which reads as "not
/// configured".
fn sanitize_api_url(raw: &str) -> String {
    let mut url = raw.trim().to_string();
    for needle in ["http://", "https://", API_URL_PLACEHOLDER] {
        url = strip_ignore_case(&url, needle);
    }
    let url = url.trim_matches('/');
    let host = match url.find('/') {
        Some(pos) => &url[..pos],
        None => url,
    };
    if host.is_empty() {
        String::new()
    } else {
        format!("https://{host}")
    }
}

/// Remove every occurrence of the ASCII `needle` from `haystack`,
/// ignoring ASCII case.
///
/// Matching is done over bytes; a match consists entirely of ASCII bytes,
/// so the slice boundaries always fall on char boundaries even when the
/// surrounding text is multi-byte.
fn strip_ignore_case(haystack: &str, needle: &str) -> String {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return haystack.to_string();
    }
    let bytes = haystack.as_bytes();
    let mut result = String::with_capacity(haystack.len());
    let mut start = 0;
    let mut pos = 0;
    while pos + needle.len() <= bytes.len() {
        if bytes[pos..pos + needle.len()].eq_ignore_ascii_case(needle) {
            result.push_str(&haystack[start..pos]);
            pos += needle.len();
            start = pos;
        } else {
            pos += 1;
        }
    }
    result.push_str(&haystack[start..]);
    result
}
