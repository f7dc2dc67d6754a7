//! Alma course API client.
//!
//! [`AlmaClient`] dispatches the four read methods the integration consumes
//! ([`ApiMethod`]) against the versioned `/almaws/v1/courses` hierarchy,
//! validating required parameters per method before any network I/O and
//! applying a strict three-tier fetch policy:
//!
//! 1. **Live**: an authenticated GET with a 30 second timeout. A 200
//!    response with a decodable, non-empty body is returned and (for every
//!    method except course search) written to the cache.
//! 2. **Cache fallback**: on any other outcome - error status, empty or
//!    undecodable body, transport failure - the last cached value for the
//!    derived key is served as a whole-response fallback.
//! 3. **Failure**: with no cached value the call fails with
//!    [`LegantoError::RemoteUnavailable`].
//!
//! Cached and live data are never mixed within one logical fetch. Course
//! search results are volatile (they depend on the course count) and are
//! never read from or written to the cache.

mod transport;

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError, TransportRequest};

use crate::cache::ListCache;
use crate::config::AdminConfig;
use crate::core::LegantoError;

/// Versioned base path of the Alma courses API.
const COURSES_PATH: &str = "/almaws/v1/courses";

/// Per-call timeout applied to every live request.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// The Alma API read methods consumed by the integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    /// Search courses by query (`GET /courses?q=...`).
    SearchCourses,
    /// Fetch one course (`GET /courses/{id}`).
    GetCourse,
    /// Fetch one reading list (`GET /courses/{id}/reading-lists/{id}`).
    GetList,
    /// Fetch one citation
    /// (`GET /courses/{id}/reading-lists/{id}/citations/{id}`).
    GetCitation,
}

impl ApiMethod {
    /// Human-readable label used in validation errors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SearchCourses => "retrieve courses",
            Self::GetCourse => "retrieve course",
            Self::GetList => "retrieve reading list",
            Self::GetCitation => "retrieve citation",
        }
    }

    /// Whether responses for this method participate in the cache.
    ///
    /// Course search results are volatile and are neither read from nor
    /// written to the cache.
    #[must_use]
    pub const fn uses_cache(self) -> bool {
        !matches!(self, Self::SearchCourses)
    }
}

/// Parameters for a single [`AlmaClient::call`].
#[derive(Debug, Clone, Default)]
pub struct CallParams {
    /// Course search query (`SearchCourses` only).
    pub query: String,
    /// Alma course identifier.
    pub course_id: String,
    /// Reading-list identifier.
    pub list_id: String,
    /// Citation identifier.
    pub citation_id: String,
    /// Additional query parameters, e.g. `view=full`.
    pub extra: Vec<(String, String)>,
    /// When set, an existing cache entry for the derived key is returned
    /// immediately without a network call.
    pub prefer_cache: bool,
}

impl CallParams {
    /// Parameters for a course search.
    #[must_use]
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Parameters for a course fetch.
    #[must_use]
    pub fn course(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            ..Self::default()
        }
    }

    /// Parameters for a reading-list fetch.
    #[must_use]
    pub fn list(course_id: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            list_id: list_id.into(),
            ..Self::default()
        }
    }

    /// Parameters for a citation fetch.
    #[must_use]
    pub fn citation(
        course_id: impl Into<String>,
        list_id: impl Into<String>,
        citation_id: impl Into<String>,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            list_id: list_id.into(),
            citation_id: citation_id.into(),
            ..Self::default()
        }
    }

    /// Append an extra query parameter.
    #[must_use]
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    /// Prefer cached data over a live call when an entry exists.
    #[must_use]
    pub const fn prefer_cached(mut self) -> Self {
        self.prefer_cache = true;
        self
    }
}

/// Client for the Alma course API.
///
/// Generic over its transport and cache so tests can substitute fakes; the
/// production pairing is [`ReqwestTransport`] and
/// [`crate::cache::MemoryCache`] (or whatever keyed store the host
/// supplies).
pub struct AlmaClient<T: HttpTransport, C: ListCache> {
    config: AdminConfig,
    transport: T,
    cache: C,
}

impl<T: HttpTransport, C: ListCache> AlmaClient<T, C> {
    /// Create a client from its collaborators.
    pub fn new(config: AdminConfig, transport: T, cache: C) -> Self {
        Self {
            config,
            transport,
            cache,
        }
    }

    /// The admin configuration this client was built with.
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// The transport this client was built with.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The cache this client was built with.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Call an Alma API method.
    ///
    /// # Errors
    ///
    /// - [`LegantoError::NotConfigured`] when the base URL or API key is
    ///   missing; checked before anything else, no request is made.
    /// - [`LegantoError::MissingParameter`] when a required parameter for
    ///   `method` is empty; no request is made.
    /// - [`LegantoError::RemoteUnavailable`] when the live call failed and
    ///   no cached fallback exists.
    pub async fn call(
        &self,
        method: ApiMethod,
        params: CallParams,
    ) -> Result<Value, LegantoError> {
        let missing = self.config.missing_settings();
        if !missing.is_empty() {
            return Err(LegantoError::NotConfigured { settings: missing });
        }
        validate(method, &params)?;

        let (path, cache_key) = route(method, &params);

        if params.prefer_cache && method.uses_cache() {
            if let Some(value) = self.cache.get(&cache_key) {
                debug!(key = %cache_key, "serving cached response without network call");
                return Ok(value);
            }
        }

        let mut query = params.extra.clone();
        if method == ApiMethod::SearchCourses {
            query.push(("q".to_string(), params.query.clone()));
        }
        let request = TransportRequest {
            url: format!("{}{}", self.config.api_url, path),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                (
                    "Authorization".to_string(),
                    format!("apikey {}", self.config.api_key),
                ),
            ],
            query,
            timeout: CALL_TIMEOUT,
        };

        let mut status = None;
        match self.transport.get(request).await {
            Ok(response) if response.status == 200 => {
                status = Some(response.status);
                match serde_json::from_str::<Value>(&response.body) {
                    Ok(value) if !value.is_null() => {
                        if method.uses_cache() && !self.cache.set(&cache_key, &value) {
                            debug!(key = %cache_key, "unable to cache data retrieved from Alma API");
                        }
                        return Ok(value);
                    }
                    _ => debug!(path = %path, "invalid JSON in Alma API response"),
                }
            }
            Ok(response) => {
                status = Some(response.status);
                debug!(path = %path, status = response.status, "Alma API returned an error status");
            }
            Err(e) => debug!(path = %path, error = %e, "Alma API request failed"),
        }

        // Live call failed; fall back on cached data if available.
        if method.uses_cache() {
            if let Some(value) = self.cache.get(&cache_key) {
                warn!(key = %cache_key, "Alma API unavailable, serving cached data");
                return Ok(value);
            }
        }
        warn!(path = %path, "Alma API and cached data unavailable");
        Err(LegantoError::RemoteUnavailable {
            endpoint: path,
            status,
        })
    }
}

/// Check the required parameters for `method`, collecting every missing one
/// into a single error.
fn validate(method: ApiMethod, params: &CallParams) -> Result<(), LegantoError> {
    let mut missing = Vec::new();
    match method {
        ApiMethod::SearchCourses => {
            if params.query.is_empty() {
                missing.push("search query");
            }
        }
        ApiMethod::GetCourse | ApiMethod::GetList | ApiMethod::GetCitation => {
            if params.course_id.is_empty() {
                missing.push("course identifier");
            }
            if method != ApiMethod::GetCourse && params.list_id.is_empty() {
                missing.push("reading list identifier");
            }
            if method == ApiMethod::GetCitation && params.citation_id.is_empty() {
                missing.push("citation identifier");
            }
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LegantoError::MissingParameter {
            method: method.label(),
            params: missing.join(", "),
        })
    }
}

/// Derive the request path and cache key for a call.
///
/// The cache key is always the most specific identifier supplied: the query
/// for a search, otherwise the course, list, or citation id.
fn route(method: ApiMethod, params: &CallParams) -> (String, String) {
    let mut path = COURSES_PATH.to_string();
    match method {
        ApiMethod::SearchCourses => (path, params.query.clone()),
        ApiMethod::GetCourse => {
            path.push_str(&format!("/{}", params.course_id));
            (path, params.course_id.clone())
        }
        ApiMethod::GetList => {
            path.push_str(&format!(
                "/{}/reading-lists/{}",
                params.course_id, params.list_id
            ));
            (path, params.list_id.clone())
        }
        ApiMethod::GetCitation => {
            path.push_str(&format!(
                "/{}/reading-lists/{}/citations/{}",
                params.course_id, params.list_id, params.citation_id
            ));
            (path, params.citation_id.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_use_the_most_specific_identifier() {
        let params = CallParams::citation("c1", "l1", "x1");
        let (path, key) = route(ApiMethod::GetCitation, &params);
        assert_eq!(path, "/almaws/v1/courses/c1/reading-lists/l1/citations/x1");
        assert_eq!(key, "x1");

        let (path, key) = route(ApiMethod::GetList, &params);
        assert_eq!(path, "/almaws/v1/courses/c1/reading-lists/l1");
        assert_eq!(key, "l1");

        let (path, key) = route(ApiMethod::GetCourse, &params);
        assert_eq!(path, "/almaws/v1/courses/c1");
        assert_eq!(key, "c1");

        let (path, key) = route(ApiMethod::SearchCourses, &CallParams::search("code~ABC"));
        assert_eq!(path, "/almaws/v1/courses");
        assert_eq!(key, "code~ABC");
    }

    #[test]
    fn validation_collects_every_missing_parameter() {
        let err = validate(ApiMethod::GetCitation, &CallParams::default()).unwrap_err();
        match err {
            LegantoError::MissingParameter { method, params } => {
                assert_eq!(method, "retrieve citation");
                assert_eq!(
                    params,
                    "course identifier, reading list identifier, citation identifier"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(validate(ApiMethod::GetCourse, &CallParams::course("123")).is_ok());
        assert!(validate(ApiMethod::SearchCourses, &CallParams::default()).is_err());
    }

    #[test]
    fn search_never_uses_the_cache() {
        assert!(!ApiMethod::SearchCourses.uses_cache());
        assert!(ApiMethod::GetCourse.uses_cache());
        assert!(ApiMethod::GetList.uses_cache());
        assert!(ApiMethod::GetCitation.uses_cache());
    }
}
