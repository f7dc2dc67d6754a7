//! Course code resolution.
//!
//! A local course is associated with Alma courses through one or more
//! course codes. Where those codes come from is an admin decision
//! ([`crate::config::CodeSource`]):
//!
//! - `codetable`: a side lookup table in the host database, keyed by a
//!   configurable course attribute;
//! - `shortname`: pattern-extraction from the course short name;
//! - `idnumber`: pattern-extraction from the course id number.
//!
//! The id number is always tried as a fallback when the primary source
//! yields nothing. When enabled, codes from meta-linked child courses are
//! unioned in; the recursion is bounded to one level so a chain of links
//! cannot loop.
//!
//! Host data access happens through two narrow seams, [`CodeTable`] and
//! [`CourseDirectory`], supplied by the caller.

use regex::Regex;
use tracing::{debug, warn};

use crate::config::{AdminConfig, CodeSource};
use crate::core::LegantoError;
use crate::models::LocalCourse;

/// Read-only access to the code lookup table used by the `codetable`
/// policy. The table lives in the host database with an arbitrary external
/// schema; the configured table and column names are passed through.
pub trait CodeTable {
    /// Return the code-column values of every row whose course column
    /// matches `value`.
    ///
    /// # Errors
    ///
    /// Implementations surface lookup failures as
    /// [`LegantoError::Storage`].
    fn codes_for(
        &self,
        table: &str,
        course_column: &str,
        code_column: &str,
        value: &str,
    ) -> Result<Vec<String>, LegantoError>;
}

/// Read-only access to course-meta-link relationships in the host.
pub trait CourseDirectory {
    /// The active meta-linked child courses of `course_id`.
    ///
    /// # Errors
    ///
    /// Implementations surface lookup failures as
    /// [`LegantoError::Storage`].
    fn child_courses(&self, course_id: i64) -> Result<Vec<LocalCourse>, LegantoError>;
}

/// Derives the Alma course codes for a local course.
pub struct CodeResolver<'a> {
    config: &'a AdminConfig,
    code_table: Option<&'a dyn CodeTable>,
    directory: Option<&'a dyn CourseDirectory>,
}

impl<'a> CodeResolver<'a> {
    /// Create a resolver with no host data access; the `codetable` policy
    /// and child-course lookup degrade gracefully without their seams.
    #[must_use]
    pub fn new(config: &'a AdminConfig) -> Self {
        Self {
            config,
            code_table: None,
            directory: None,
        }
    }

    /// Attach the lookup table used by the `codetable` policy.
    #[must_use]
    pub fn with_code_table(mut self, code_table: &'a dyn CodeTable) -> Self {
        self.code_table = Some(code_table);
        self
    }

    /// Attach the course directory used for child-course code lookup.
    #[must_use]
    pub fn with_directory(mut self, directory: &'a dyn CourseDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// All Alma course codes associated with `course`, deduplicated, with
    /// empty entries filtered out.
    ///
    /// # Errors
    ///
    /// Returns [`LegantoError::Pattern`] when the configured code regex is
    /// invalid and [`LegantoError::Storage`] when a host lookup fails.
    pub fn derive_codes(&self, course: &LocalCourse) -> Result<Vec<String>, LegantoError> {
        self.collect(course, false)
    }

    fn collect(&self, course: &LocalCourse, is_child: bool) -> Result<Vec<String>, LegantoError> {
        let mut codes = match self.config.code_source {
            CodeSource::Codetable => self.table_codes(course)?,
            CodeSource::Shortname => self.extract_codes(&course.shortname)?,
            CodeSource::Idnumber => Vec::new(),
        };

        // The id number is the fallback source whenever the primary source
        // produced nothing, regardless of the configured policy.
        if self.config.code_source == CodeSource::Idnumber || codes.is_empty() {
            codes = self.extract_codes(&course.idnumber)?;
        }

        if self.config.include_child_codes && !is_child {
            if let Some(directory) = self.directory {
                for child in directory.child_courses(course.id)? {
                    debug!(parent = course.id, child = child.id, "including child course codes");
                    codes.extend(self.collect(&child, true)?);
                }
            }
        }

        codes.retain(|code| !code.is_empty());
        dedupe(&mut codes);
        Ok(codes)
    }

    fn table_codes(&self, course: &LocalCourse) -> Result<Vec<String>, LegantoError> {
        let Some(table) = self.code_table else {
            warn!("code source is 'codetable' but no code table was supplied");
            return Ok(Vec::new());
        };
        let Some(value) = course.attribute(&self.config.course_attribute) else {
            warn!(
                attribute = %self.config.course_attribute,
                "configured course attribute does not exist"
            );
            return Ok(Vec::new());
        };
        table.codes_for(
            &self.config.code_table,
            &self.config.course_column,
            &self.config.code_column,
            &value,
        )
    }

    /// Extract one or more course codes from a source string.
    ///
    /// With a configured pattern, every match contributes its first capture
    /// group (or the whole match when the pattern has no groups). Without
    /// one, the whole source string is the single code.
    fn extract_codes(&self, source: &str) -> Result<Vec<String>, LegantoError> {
        if self.config.code_regex.is_empty() {
            return Ok(vec![source.to_string()]);
        }
        let regex = Regex::new(&self.config.code_regex)?;
        let mut codes: Vec<String> = regex
            .captures_iter(source)
            .filter_map(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(0))
                    .map(|m| m.as_str().to_string())
            })
            .collect();
        dedupe(&mut codes);
        Ok(codes)
    }
}

/// Remove duplicates while preserving first-seen order.
fn dedupe(codes: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    codes.retain(|code| seen.insert(code.clone()));
}
