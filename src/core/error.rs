//! Error handling for the Leganto integration.
//!
//! The error system is built around a single strongly-typed enum,
//! [`LegantoError`], so that callers can distinguish the failure classes the
//! integration cares about:
//!
//! - **Configuration**: [`LegantoError::NotConfigured`] - required client
//!   settings (API base URL, API key) are absent. Every remote call
//!   short-circuits to this before any argument validation.
//! - **Validation**: [`LegantoError::MissingParameter`] - a required call
//!   parameter is empty. Raised before any network I/O happens.
//! - **Remote availability**: [`LegantoError::RemoteUnavailable`] - the live
//!   call failed *and* no cached fallback exists. This is the terminal state
//!   of the three-tier fetch policy (live -> cache -> failure).
//! - **Corrupt input**: invalid extraction patterns and unreadable
//!   configuration files.
//!
//! Components recover from these at their boundary and degrade to empty
//! results with a diagnostic log entry; the CLI converts whatever does
//! propagate into a friendly message via [`anyhow`].

use std::path::PathBuf;

use thiserror::Error;

/// The error type for all Leganto integration operations.
#[derive(Debug, Error)]
pub enum LegantoError {
    /// Required API settings are missing from the admin configuration.
    ///
    /// Carries the names of every absent setting so the caller can report
    /// all of them at once rather than one per attempt.
    #[error("Alma API not configured: missing setting(s) {}", settings.join(", "))]
    NotConfigured {
        /// Names of the settings that are empty or absent.
        settings: Vec<String>,
    },

    /// A required parameter for an API method was empty.
    ///
    /// No network request is made when this is raised.
    #[error("insufficient data for API request '{method}': missing {params}")]
    MissingParameter {
        /// Human-readable name of the attempted API method.
        method: &'static str,
        /// Comma-separated list of the missing parameters.
        params: String,
    },

    /// The remote API call failed and no cached fallback was available.
    #[error(
        "Alma API unavailable for {endpoint}{} and no cached data exists",
        status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
    )]
    RemoteUnavailable {
        /// Request path of the failed call.
        endpoint: String,
        /// HTTP status of the failed response, if one was received.
        status: Option<u16>,
    },

    /// A configured code or year extraction pattern failed to compile.
    #[error("invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to initialise HTTP transport: {reason}")]
    Transport {
        /// Description of the underlying builder failure.
        reason: String,
    },

    /// A host-side lookup (code table or course directory) failed.
    #[error("host data lookup failed: {reason}")]
    Storage {
        /// Description of the underlying storage failure.
        reason: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed as TOML.
    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

impl LegantoError {
    /// Whether this error means the plugin is simply not configured yet,
    /// as opposed to an operational failure.
    #[must_use]
    pub const fn is_unconfigured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_lists_every_missing_setting() {
        let err = LegantoError::NotConfigured {
            settings: vec!["apiurl".into(), "apikey".into()],
        };
        assert_eq!(
            err.to_string(),
            "Alma API not configured: missing setting(s) apiurl, apikey"
        );
        assert!(err.is_unconfigured());
    }

    #[test]
    fn remote_unavailable_includes_status_when_known() {
        let err = LegantoError::RemoteUnavailable {
            endpoint: "/almaws/v1/courses/123".into(),
            status: Some(500),
        };
        assert!(err.to_string().contains("HTTP 500"));

        let err = LegantoError::RemoteUnavailable {
            endpoint: "/almaws/v1/courses/123".into(),
            status: None,
        };
        assert!(!err.to_string().contains("HTTP"));
        assert!(!err.is_unconfigured());
    }
}
