//! Data models for the Alma course API and the host course record.
//!
//! The remote structs mirror the JSON shapes returned by the Alma
//! `/almaws/v1/courses` endpoints (search results, course detail with nested
//! reading lists, and reading lists with nested citations). Everything
//! beyond the identifiers is optional or defaulted: the API omits empty
//! collections and the integration must tolerate partial records.
//!
//! Within a list, citations sharing a `section_info.id` are contiguous in
//! source order. The renderer depends on that adjacency when it derives
//! section headings by scanning for the first matching citation.

use serde::{Deserialize, Serialize};

/// A local (host-side) course record, the starting point for code
/// resolution and list aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalCourse {
    /// Host database id.
    pub id: i64,
    /// Short name, e.g. `BIOL101-Fall`.
    pub shortname: String,
    /// Institutional id number, often carrying the catalogue code.
    pub idnumber: String,
    /// Full display name.
    pub fullname: String,
}

impl LocalCourse {
    /// Look up a course attribute by its configured name.
    ///
    /// Used by the `codetable` code-source policy, where an administrator
    /// picks which attribute is matched against the lookup table.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "shortname" => Some(self.shortname.clone()),
            "idnumber" => Some(self.idnumber.clone()),
            "fullname" => Some(self.fullname.clone()),
            _ => None,
        }
    }
}

/// Response body of a course search (`GET /almaws/v1/courses?q=...`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseSearchResults {
    /// Total number of matching courses, which may exceed the page size.
    pub total_record_count: u64,
    /// The matched courses.
    #[serde(rename = "course")]
    pub courses: Vec<CourseStub>,
}

/// A course entry within search results; only the identifier is needed to
/// fetch the full record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseStub {
    /// Alma course identifier.
    pub id: String,
    /// Course name, when returned.
    pub name: Option<String>,
    /// Course code, when returned.
    pub code: Option<String>,
}

/// Full course record (`GET /almaws/v1/courses/{id}?view=full`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlmaCourse {
    /// Alma course identifier.
    pub id: String,
    /// Nested reading lists; absent when the course has none.
    pub reading_lists: Option<ReadingLists>,
}

/// Wrapper object around the reading-list collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingLists {
    /// The reading lists themselves.
    pub reading_list: Vec<ReadingList>,
}

/// A Leganto reading list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingList {
    /// Alma reading-list identifier.
    pub id: String,
    /// List name.
    pub name: String,
    /// Identifier of the parent Alma course. Not part of the remote
    /// payload; attached during aggregation so the list can be re-fetched
    /// later without a fresh course search.
    pub course_id: String,
    /// Nested citations, in source (insertion) order.
    pub citations: Option<Citations>,
}

impl ReadingList {
    /// Citations in source order, or an empty slice when the list has none.
    #[must_use]
    pub fn citation_slice(&self) -> &[Citation] {
        self.citations.as_ref().map_or(&[], |c| c.citation.as_slice())
    }
}

/// Wrapper object around the citation collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Citations {
    /// The citations themselves.
    pub citation: Vec<Citation>,
}

/// A single bibliographic entry within a reading list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Citation {
    /// Alma citation identifier.
    pub id: String,
    /// Bibliographic metadata bag.
    pub metadata: CitationMetadata,
    /// The list section this citation belongs to.
    pub section_info: Option<SectionInfo>,
    /// Resource type, e.g. "Book" or "Article".
    pub secondary_type: Option<CodeDesc>,
    /// Tags attached to the citation.
    pub citation_tags: Option<CitationTags>,
    /// Permalink into the Leganto UI.
    pub leganto_permalink: Option<String>,
}

impl Citation {
    /// The displayable title: `title` with `article_title` as fallback.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        non_empty(self.metadata.title.as_deref())
            .or_else(|| non_empty(self.metadata.article_title.as_deref()))
    }

    /// Descriptions of the public tags on this citation, in source order.
    /// Non-public tags are never exposed to students.
    #[must_use]
    pub fn public_tags(&self) -> Vec<String> {
        let Some(tags) = &self.citation_tags else {
            return Vec::new();
        };
        tags.citation_tag
            .iter()
            .filter(|tag| {
                tag.tag_type
                    .as_ref()
                    .and_then(|t| t.value.as_deref())
                    .is_some_and(|v| v == "PUBLIC")
            })
            .filter_map(|tag| tag.value.as_ref().and_then(|v| v.desc.clone()))
            .collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Bibliographic metadata fields the integration displays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationMetadata {
    pub title: Option<String>,
    pub article_title: Option<String>,
    pub author: Option<String>,
    pub edition: Option<String>,
    pub publisher: Option<String>,
    pub publication_date: Option<String>,
    pub chapter: Option<String>,
    /// Source URL for "view online" access.
    pub source: Option<String>,
}

/// Section membership of a citation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionInfo {
    /// Section identifier (16-digit numeric string).
    pub id: String,
    /// Section name.
    pub name: String,
    /// Optional section description.
    pub description: Option<String>,
}

/// Alma's ubiquitous `{value, desc}` pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeDesc {
    pub value: Option<String>,
    pub desc: Option<String>,
}

/// A tag attached to a citation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationTag {
    /// Tag visibility type; only `PUBLIC` tags are displayed.
    #[serde(rename = "type")]
    pub tag_type: Option<CodeDesc>,
    /// Tag value and description.
    pub value: Option<CodeDesc>,
}

/// Wrapper object around the tag collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationTags {
    /// The tags themselves.
    pub citation_tag: Vec<CitationTag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_title_falls_back_to_article_title() {
        let mut citation = Citation {
            metadata: CitationMetadata {
                article_title: Some("An Article".into()),
                ..CitationMetadata::default()
            },
            ..Citation::default()
        };
        assert_eq!(citation.display_title(), Some("An Article"));

        citation.metadata.title = Some("A Book".into());
        assert_eq!(citation.display_title(), Some("A Book"));

        citation.metadata.title = Some(String::new());
        assert_eq!(citation.display_title(), Some("An Article"));
    }

    #[test]
    fn only_public_tags_are_exposed() {
        let citation: Citation = serde_json::from_value(serde_json::json!({
            "id": "1111111111111111",
            "citation_tags": {
                "citation_tag": [
                    {"type": {"value": "PUBLIC"}, "value": {"value": "ESS", "desc": "Essential"}},
                    {"type": {"value": "INTERNAL"}, "value": {"value": "X", "desc": "Hidden"}},
                    {"type": {"value": "PUBLIC"}, "value": {"value": "REC"}}
                ]
            }
        }))
        .unwrap();

        assert_eq!(citation.public_tags(), vec!["Essential"]);
    }

    #[test]
    fn search_results_tolerate_missing_fields() {
        let results: CourseSearchResults =
            serde_json::from_str(r#"{"total_record_count": 1, "course": [{"id": "42"}]}"#)
                .unwrap();
        assert_eq!(results.total_record_count, 1);
        assert_eq!(results.courses[0].id, "42");
        assert!(results.courses[0].name.is_none());
    }

    #[test]
    fn course_attribute_lookup_matches_configured_names() {
        let course = LocalCourse {
            id: 7,
            shortname: "HIST202".into(),
            idnumber: "X-HIST202-2026".into(),
            fullname: "History 202".into(),
        };
        assert_eq!(course.attribute("id").as_deref(), Some("7"));
        assert_eq!(course.attribute("shortname").as_deref(), Some("HIST202"));
        assert_eq!(course.attribute("nonsense"), None);
    }
}
