//! Reading-list aggregation.
//!
//! [`ListAggregator`] ties the code resolver and the API client together:
//! it searches Alma for every derived course code (optionally narrowed by a
//! year token), fetches the full record of each matched course, and merges
//! all of their reading lists into a single collection ordered naturally by
//! name.
//!
//! Lists are keyed by trimmed, case-folded name during the merge; a later
//! list with the same normalised name replaces an earlier one. Per-code
//! remote failures degrade to skips so one unreachable search cannot hide
//! the lists found through other codes - only a missing API configuration
//! propagates.

use std::collections::HashMap;

use futures::future::join_all;
use regex::Regex;
use tracing::{debug, warn};

use crate::api::{AlmaClient, ApiMethod, CallParams, HttpTransport};
use crate::cache::ListCache;
use crate::codes::CodeResolver;
use crate::core::LegantoError;
use crate::models::{AlmaCourse, CourseSearchResults, LocalCourse, ReadingList};
use crate::utils::natural_cmp;

/// Fetches and merges the reading lists for a local course.
pub struct ListAggregator<'a, T: HttpTransport, C: ListCache> {
    client: &'a AlmaClient<T, C>,
    resolver: &'a CodeResolver<'a>,
}

impl<'a, T: HttpTransport, C: ListCache> ListAggregator<'a, T, C> {
    /// Create an aggregator from its collaborators.
    pub fn new(client: &'a AlmaClient<T, C>, resolver: &'a CodeResolver<'a>) -> Self {
        Self { client, resolver }
    }

    /// All reading lists associated with `course`, sorted by name using
    /// natural, case-insensitive ordering with an ordinal tie-break.
    ///
    /// # Errors
    ///
    /// Returns [`LegantoError::NotConfigured`] when the Alma API settings
    /// are missing and [`LegantoError::Pattern`] when a configured
    /// extraction pattern is invalid. Remote failures for individual codes
    /// or courses are logged and skipped, yielding a (possibly empty)
    /// result instead.
    pub async fn fetch_lists(
        &self,
        course: &LocalCourse,
    ) -> Result<Vec<ReadingList>, LegantoError> {
        let config = self.client.config();
        let missing = config.missing_settings();
        if !missing.is_empty() {
            return Err(LegantoError::NotConfigured { settings: missing });
        }

        let codes = self.resolver.derive_codes(course)?;
        let year = detect_year(&config.year_regex, course)?;

        let mut by_name: HashMap<String, ReadingList> = HashMap::new();
        for code in codes {
            let mut query = format!("code~{code}");
            if let Some(year) = &year {
                query.push_str(&format!(" AND year~{year}"));
            }

            let results = match self
                .client
                .call(ApiMethod::SearchCourses, CallParams::search(query.as_str()))
                .await
            {
                Ok(value) => value,
                Err(e) => {
                    warn!(query = %query, error = %e, "course search failed, skipping code");
                    continue;
                }
            };
            let results: CourseSearchResults = match serde_json::from_value(results) {
                Ok(results) => results,
                Err(e) => {
                    debug!(query = %query, error = %e, "unexpected course search payload");
                    continue;
                }
            };
            if results.total_record_count == 0 {
                debug!(query = %query, "no matching Alma courses");
                continue;
            }

            // The detail fetches are independent reads; issue them
            // concurrently and merge in search order so the last-wins name
            // collision policy stays deterministic.
            let details = join_all(results.courses.iter().map(|stub| {
                self.client.call(
                    ApiMethod::GetCourse,
                    CallParams::course(stub.id.as_str()).with_extra("view", "full"),
                )
            }))
            .await;

            for (stub, detail) in results.courses.iter().zip(details) {
                let detail = match detail {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(course_id = %stub.id, error = %e, "course fetch failed, skipping");
                        continue;
                    }
                };
                let alma_course: AlmaCourse = match serde_json::from_value(detail) {
                    Ok(course) => course,
                    Err(e) => {
                        debug!(course_id = %stub.id, error = %e, "unexpected course payload");
                        continue;
                    }
                };
                let Some(lists) = alma_course.reading_lists else {
                    continue;
                };
                for mut list in lists.reading_list {
                    list.course_id = alma_course.id.clone();
                    let key = list.name.trim().to_lowercase();
                    by_name.insert(key, list);
                }
            }
        }

        let mut lists: Vec<ReadingList> = by_name.into_values().collect();
        lists.sort_by(|a, b| natural_cmp(a.name.trim(), b.name.trim()));
        Ok(lists)
    }
}

/// Detect a year token in the course id number or short name, first match
/// wins, first capture group preferred over the whole match.
fn detect_year(year_regex: &str, course: &LocalCourse) -> Result<Option<String>, LegantoError> {
    if year_regex.is_empty() {
        return Ok(None);
    }
    let regex = Regex::new(year_regex)?;
    for source in [&course.idnumber, &course.shortname] {
        if let Some(caps) = regex.captures(source) {
            let m = caps.get(1).or_else(|| caps.get(0));
            return Ok(m.map(|m| m.as_str().to_string()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(shortname: &str, idnumber: &str) -> LocalCourse {
        LocalCourse {
            id: 1,
            shortname: shortname.into(),
            idnumber: idnumber.into(),
            fullname: String::new(),
        }
    }

    #[test]
    fn year_detection_prefers_idnumber_and_first_capture_group() {
        let year = detect_year(r"-(20\d{2})$", &course("HIST-2025", "HIST101-2026"))
            .unwrap()
            .unwrap();
        assert_eq!(year, "2026");
    }

    #[test]
    fn year_detection_falls_back_to_shortname() {
        let year = detect_year(r"20\d{2}", &course("HIST 2025", "HIST101"))
            .unwrap()
            .unwrap();
        assert_eq!(year, "2025");
    }

    #[test]
    fn no_year_pattern_means_no_year() {
        assert!(detect_year("", &course("HIST 2025", "")).unwrap().is_none());
    }

    #[test]
    fn invalid_year_pattern_is_reported() {
        assert!(matches!(
            detect_year(r"(20\d{2}", &course("", "")),
            Err(LegantoError::Pattern(_))
        ));
    }
}
