//! Citation selection paths, the selection tree, and the codec between
//! them.
//!
//! An instructor's selection arrives as a flat set of boolean form fields,
//! each keyed by a 4-segment path addressing one citation:
//!
//! ```text
//! course-1234567890123456_list-2345678901234567_section-3456789012345678_citation-4567890123456789
//! ```
//!
//! Every id component is exactly 16 digits; anything else is rejected at
//! the boundary rather than coerced. [`encode`] merges the selected paths
//! into a [`SelectionTree`] - a 4-level nested mapping stored compactly as
//! nested JSON - and [`decode`] walks a stored tree back into full path
//! strings.
//!
//! The tree preserves insertion order at every level and unions citation
//! leaves on merge: two citations under the same section both appear as
//! siblings, never replacing one another. Because no map type in the
//! dependency stack keeps JSON object order, the levels are explicit
//! `Vec`-backed nodes with hand-written `serde` implementations.
//!
//! An empty selection serializes to the empty-string sentinel, and a
//! malformed stored value decodes to an empty tree - never an error.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

/// Shape of a full citation path: four `kind-` segments with 16-digit ids.
static PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^course-[0-9]{16}_list-[0-9]{16}_section-[0-9]{16}_citation-[0-9]{16}$")
        .expect("path pattern is valid")
});

/// A validated 4-level citation address.
///
/// Each component keeps its `kind-` prefix, matching both the form field
/// names and the keys of the stored tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPath {
    course: String,
    list: String,
    section: String,
    citation: String,
}

impl SelectionPath {
    /// Parse a path string, returning `None` unless it matches the
    /// 4-segment 16-digit shape exactly.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        if !PATH_REGEX.is_match(path) {
            return None;
        }
        let mut parts = path.split('_');
        Some(Self {
            course: parts.next()?.to_string(),
            list: parts.next()?.to_string(),
            section: parts.next()?.to_string(),
            citation: parts.next()?.to_string(),
        })
    }

    /// Build a path from bare 16-digit identifiers.
    ///
    /// Used when constructing form field names for the selection form.
    #[must_use]
    pub fn from_ids(course_id: &str, list_id: &str, section_id: &str, citation_id: &str) -> Self {
        Self {
            course: format!("course-{course_id}"),
            list: format!("list-{list_id}"),
            section: format!("section-{section_id}"),
            citation: format!("citation-{citation_id}"),
        }
    }

    /// The course segment, including its `course-` prefix.
    #[must_use]
    pub fn course_key(&self) -> &str {
        &self.course
    }

    /// The list segment, including its `list-` prefix.
    #[must_use]
    pub fn list_key(&self) -> &str {
        &self.list
    }

    /// The section segment, including its `section-` prefix.
    #[must_use]
    pub fn section_key(&self) -> &str {
        &self.section
    }

    /// The citation segment, including its `citation-` prefix.
    #[must_use]
    pub fn citation_key(&self) -> &str {
        &self.citation
    }
}

impl fmt::Display for SelectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.course, self.list, self.section, self.citation
        )
    }
}

/// Strip the `kind-` prefix from a tree key, leaving the bare identifier.
#[must_use]
pub fn bare_id(key: &str) -> &str {
    key.split_once('-').map_or(key, |(_, id)| id)
}

/// The persisted selection: courses -> lists -> sections -> citations, each
/// level in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTree {
    courses: Vec<CourseNode>,
}

/// One course level of a [`SelectionTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseNode {
    key: String,
    lists: Vec<ListNode>,
}

/// One list level of a [`SelectionTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNode {
    key: String,
    sections: Vec<SectionNode>,
}

/// One section level of a [`SelectionTree`], holding its selected
/// citations in encounter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionNode {
    key: String,
    citations: Vec<String>,
}

impl SelectionTree {
    /// Merge a path into the tree.
    ///
    /// Nodes sharing a key merge recursively; citation leaves union, so a
    /// second citation under the same section is appended, never a
    /// replacement. Re-inserting an identical path is a no-op.
    pub fn insert(&mut self, path: &SelectionPath) {
        let course = find_or_push(&mut self.courses, path.course_key(), |key| CourseNode {
            key: key.to_string(),
            lists: Vec::new(),
        });
        let list = find_or_push(&mut course.lists, path.list_key(), |key| ListNode {
            key: key.to_string(),
            sections: Vec::new(),
        });
        let section = find_or_push(&mut list.sections, path.section_key(), |key| SectionNode {
            key: key.to_string(),
            citations: Vec::new(),
        });
        let citation = path.citation_key();
        if !section.citations.iter().any(|c| c == citation) {
            section.citations.push(citation.to_string());
        }
    }

    /// Whether the tree holds no selections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// The course nodes in insertion order.
    #[must_use]
    pub fn courses(&self) -> &[CourseNode] {
        &self.courses
    }

    /// Enumerate the full path of every selected citation, depth-first in
    /// stored order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for course in &self.courses {
            for list in &course.lists {
                for section in &list.sections {
                    for citation in &section.citations {
                        paths.push(format!(
                            "{}_{}_{}_{}",
                            course.key, list.key, section.key, citation
                        ));
                    }
                }
            }
        }
        paths
    }

    /// Parse a stored selection, treating anything malformed - including
    /// the empty-selection sentinel - as an empty tree.
    #[must_use]
    pub fn from_stored(stored: &str) -> Self {
        if stored.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(stored) {
            Ok(tree) => tree,
            Err(e) => {
                debug!(error = %e, "malformed stored selection, treating as empty");
                Self::default()
            }
        }
    }

    /// Serialize the tree for storage. An empty tree becomes the
    /// empty-string sentinel.
    #[must_use]
    pub fn to_stored(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl CourseNode {
    /// The course key, including its `course-` prefix.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The list nodes in insertion order.
    #[must_use]
    pub fn lists(&self) -> &[ListNode] {
        &self.lists
    }
}

impl ListNode {
    /// The list key, including its `list-` prefix.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The section nodes in insertion order.
    #[must_use]
    pub fn sections(&self) -> &[SectionNode] {
        &self.sections
    }
}

impl SectionNode {
    /// The section key, including its `section-` prefix.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The citation keys in encounter order.
    #[must_use]
    pub fn citations(&self) -> &[String] {
        &self.citations
    }
}

fn find_or_push<'a, N>(
    nodes: &'a mut Vec<N>,
    key: &str,
    make: impl FnOnce(&str) -> N,
) -> &'a mut N
where
    N: Keyed,
{
    if let Some(index) = nodes.iter().position(|n| n.node_key() == key) {
        &mut nodes[index]
    } else {
        nodes.push(make(key));
        nodes.last_mut().expect("just pushed")
    }
}

trait Keyed {
    fn node_key(&self) -> &str;
}

impl Keyed for CourseNode {
    fn node_key(&self) -> &str {
        &self.key
    }
}

impl Keyed for ListNode {
    fn node_key(&self) -> &str {
        &self.key
    }
}

impl Keyed for SectionNode {
    fn node_key(&self) -> &str {
        &self.key
    }
}

/// Encode a flat set of form fields into the stored selection string.
///
/// Fields whose key does not match the 4-segment path shape, and fields
/// that are not selected, are ignored. An empty result is the empty-string
/// sentinel, not an empty JSON structure.
pub fn encode<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, bool)>,
{
    let mut tree = SelectionTree::default();
    for (name, selected) in fields {
        if !selected {
            continue;
        }
        if let Some(path) = SelectionPath::parse(name) {
            tree.insert(&path);
        }
    }
    tree.to_stored()
}

/// Decode a stored selection into the full path of every selected
/// citation, in stored order. Malformed input yields an empty vector.
#[must_use]
pub fn decode(stored: &str) -> Vec<String> {
    SelectionTree::from_stored(stored).paths()
}

// Hand-written serde: {"course-x": {"list-y": {"section-z": ["citation-w"]}}}

impl Serialize for SelectionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.courses.len()))?;
        for course in &self.courses {
            map.serialize_entry(&course.key, &CourseLists(&course.lists))?;
        }
        map.end()
    }
}

struct CourseLists<'a>(&'a [ListNode]);

impl Serialize for CourseLists<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for list in self.0 {
            map.serialize_entry(&list.key, &ListSections(&list.sections))?;
        }
        map.end()
    }
}

struct ListSections<'a>(&'a [SectionNode]);

impl Serialize for ListSections<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for section in self.0 {
            map.serialize_entry(&section.key, &CitationKeys(&section.citations))?;
        }
        map.end()
    }
}

struct CitationKeys<'a>(&'a [String]);

impl Serialize for CitationKeys<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for citation in self.0 {
            seq.serialize_element(citation)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SelectionTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TreeVisitor;

        impl<'de> Visitor<'de> for TreeVisitor {
            type Value = SelectionTree;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of course keys to list selections")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut courses = Vec::new();
                while let Some((key, lists)) = access.next_entry::<String, ListLevel>()? {
                    courses.push(CourseNode {
                        key,
                        lists: lists.0,
                    });
                }
                Ok(SelectionTree { courses })
            }
        }

        deserializer.deserialize_map(TreeVisitor)
    }
}

struct ListLevel(Vec<ListNode>);

impl<'de> Deserialize<'de> for ListLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ListVisitor;

        impl<'de> Visitor<'de> for ListVisitor {
            type Value = ListLevel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of list keys to section selections")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut lists = Vec::new();
                while let Some((key, sections)) = access.next_entry::<String, SectionLevel>()? {
                    lists.push(ListNode {
                        key,
                        sections: sections.0,
                    });
                }
                Ok(ListLevel(lists))
            }
        }

        deserializer.deserialize_map(ListVisitor)
    }
}

struct SectionLevel(Vec<SectionNode>);

impl<'de> Deserialize<'de> for SectionLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = SectionLevel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of section keys to citation arrays")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut sections = Vec::new();
                while let Some((key, citations)) = access.next_entry::<String, CitationLevel>()? {
                    sections.push(SectionNode {
                        key,
                        citations: citations.0,
                    });
                }
                Ok(SectionLevel(sections))
            }
        }

        deserializer.deserialize_map(SectionVisitor)
    }
}

struct CitationLevel(Vec<String>);

impl<'de> Deserialize<'de> for CitationLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CitationVisitor;

        impl<'de> Visitor<'de> for CitationVisitor {
            type Value = CitationLevel;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of citation keys")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut citations = Vec::new();
                while let Some(citation) = access.next_element::<String>()? {
                    citations.push(citation);
                }
                Ok(CitationLevel(citations))
            }
        }

        deserializer.deserialize_seq(CitationVisitor)
    }
}
