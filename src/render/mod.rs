//! Selection rendering.
//!
//! [`SelectionRenderer`] re-expands a stored selection into displayable
//! content: it walks the selection tree per course and list, fetches each
//! list through the API client with `prefer_cache` set (render time should
//! not repeat network round-trips for a list already fetched this
//! session), and emits a flat, ordered sequence of [`RenderedBlock`]s. The
//! presentation layer turns blocks into markup; nothing here produces
//! HTML.
//!
//! Grouping boundaries ([`RenderedBlock::GroupOpen`] /
//! [`RenderedBlock::GroupClose`]) are driven by a single
//! "was the previous element a citation" flag threaded through the whole
//! walk of a list, so consecutive citations share one group and a section
//! heading always closes the group before it. A trailing group left open
//! at the end of the walk is closed explicitly.
//!
//! Heading metadata comes from the live (or cached) list data: the first
//! citation whose `section_info.id` matches supplies the section name and
//! description, relying on the invariant that citations of a section are
//! contiguous in source order. The citation *count* on a heading is the
//! size of the stored subtree, which may legitimately differ from the live
//! list if the list changed after the selection was made.

use tracing::{debug, warn};

use crate::api::{AlmaClient, ApiMethod, CallParams, HttpTransport};
use crate::cache::ListCache;
use crate::config::DisplayMode;
use crate::core::LegantoError;
use crate::models::{Citation, ReadingList};
use crate::selection::{ListNode, SelectionTree, bare_id};
use crate::utils::condense_whitespace;

/// One element of the rendered output sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBlock {
    /// A section heading with its stored citation count.
    Section(SectionHeading),
    /// Open a grouping around consecutive citations.
    GroupOpen,
    /// A citation entry.
    Citation(Box<CitationView>),
    /// Close the current citation grouping.
    GroupClose,
}

/// Heading metadata for a rendered section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeading {
    /// Bare section identifier.
    pub id: String,
    /// Section name.
    pub name: String,
    /// Optional section description.
    pub description: Option<String>,
    /// Number of selected citations under this heading.
    pub citation_count: usize,
    /// Heading level for the display mode in effect.
    pub heading_level: u8,
}

/// Displayable citation details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationView {
    /// Bare citation identifier.
    pub id: String,
    /// Citation title (falls back to the article title).
    pub title: String,
    pub author: Option<String>,
    pub edition: Option<String>,
    pub publisher: Option<String>,
    pub published: Option<String>,
    pub chapter: Option<String>,
    /// Resource type description, e.g. "Book".
    pub resource_type: Option<String>,
    /// Public tag descriptions, in source order.
    pub tags: Vec<String>,
    /// Permalink into the Leganto UI.
    pub permalink: Option<String>,
    /// Source URL for "view online" access.
    pub source: Option<String>,
    /// Heading level for the title in the display mode in effect.
    pub heading_level: u8,
}

/// Walks a stored selection against fetched list data.
pub struct SelectionRenderer<'a, T: HttpTransport, C: ListCache> {
    client: &'a AlmaClient<T, C>,
    display: DisplayMode,
}

impl<'a, T: HttpTransport, C: ListCache> SelectionRenderer<'a, T, C> {
    /// Create a renderer for the given display mode.
    pub fn new(client: &'a AlmaClient<T, C>, display: DisplayMode) -> Self {
        Self { client, display }
    }

    /// Render a stored selection into an ordered block sequence.
    ///
    /// A list whose data cannot be fetched (even from cache) is skipped
    /// with a warning; a malformed stored selection renders to nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LegantoError::NotConfigured`] when the Alma API settings
    /// are missing.
    pub async fn render(&self, stored: &str) -> Result<Vec<RenderedBlock>, LegantoError> {
        let config = self.client.config();
        let missing = config.missing_settings();
        if !missing.is_empty() {
            return Err(LegantoError::NotConfigured { settings: missing });
        }

        let tree = SelectionTree::from_stored(stored);
        let mut blocks = Vec::new();

        for course in tree.courses() {
            let course_id = bare_id(course.key());
            for list in course.lists() {
                let list_id = bare_id(list.key());
                let params = CallParams::list(course_id, list_id)
                    .with_extra("view", "full")
                    .prefer_cached();
                let value = match self.client.call(ApiMethod::GetList, params).await {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(list_id, error = %e, "reading list unavailable, skipping");
                        continue;
                    }
                };
                let data: ReadingList = match serde_json::from_value(value) {
                    Ok(data) => data,
                    Err(e) => {
                        debug!(list_id, error = %e, "unexpected reading list payload");
                        continue;
                    }
                };
                self.walk_list(&data, list, &mut blocks);
            }
        }

        Ok(blocks)
    }

    /// Walk one list's stored subtree, appending blocks.
    fn walk_list(&self, data: &ReadingList, selection: &ListNode, blocks: &mut Vec<RenderedBlock>) {
        let mut was_citation = false;

        for section in selection.sections() {
            if was_citation {
                // The previous element was a citation; close its grouping
                // before opening the next section.
                blocks.push(RenderedBlock::GroupClose);
            }
            let section_id = bare_id(section.key());
            if let Some(heading) =
                self.section_heading(data, section_id, Some(section.citations().len()))
            {
                blocks.push(RenderedBlock::Section(heading));
            }
            was_citation = false;

            for citation_key in section.citations() {
                if !was_citation {
                    blocks.push(RenderedBlock::GroupOpen);
                }
                // A citation missing from the list data emits nothing, but
                // still counts for adjacency so the grouping stays intact.
                if let Some(view) = self.citation_view(data, bare_id(citation_key)) {
                    blocks.push(RenderedBlock::Citation(Box::new(view)));
                }
                was_citation = true;
            }
        }

        if was_citation {
            blocks.push(RenderedBlock::GroupClose);
        }
    }

    /// Heading metadata for a section of `data`, scanning for the first
    /// citation that belongs to it.
    ///
    /// With `citation_count: None` the count of matching citations in the
    /// live list is used; the renderer passes the stored subtree size
    /// instead. Returns `None` when the list has no citation in that
    /// section.
    #[must_use]
    pub fn section_heading(
        &self,
        data: &ReadingList,
        section_id: &str,
        citation_count: Option<usize>,
    ) -> Option<SectionHeading> {
        let mut live_count = 0;
        let mut heading = None;

        for citation in data.citation_slice() {
            let Some(info) = &citation.section_info else {
                continue;
            };
            if info.id != section_id {
                continue;
            }
            if heading.is_none() {
                heading = Some(SectionHeading {
                    id: info.id.clone(),
                    name: condense_whitespace(&info.name),
                    description: info
                        .description
                        .as_deref()
                        .filter(|d| !d.is_empty())
                        .map(condense_whitespace),
                    citation_count: 0,
                    heading_level: self.display.section_heading_level(),
                });
            }
            live_count += 1;
        }

        let mut heading = heading?;
        heading.citation_count = citation_count.unwrap_or(live_count);
        Some(heading)
    }

    /// Displayable details for a citation of `data`, or `None` when the id
    /// is not present in the list.
    #[must_use]
    pub fn citation_view(&self, data: &ReadingList, citation_id: &str) -> Option<CitationView> {
        let citation = data
            .citation_slice()
            .iter()
            .find(|c| c.id == citation_id)?;
        Some(self.build_view(citation))
    }

    fn build_view(&self, citation: &Citation) -> CitationView {
        let meta = &citation.metadata;
        CitationView {
            id: citation.id.clone(),
            title: citation
                .display_title()
                .map(condense_whitespace)
                .unwrap_or_default(),
            author: clean(meta.author.as_deref()),
            edition: clean(meta.edition.as_deref()),
            publisher: clean(meta.publisher.as_deref()),
            published: clean(meta.publication_date.as_deref()),
            chapter: clean(meta.chapter.as_deref()),
            resource_type: citation
                .secondary_type
                .as_ref()
                .and_then(|t| clean(t.desc.as_deref())),
            tags: citation
                .public_tags()
                .iter()
                .map(|tag| condense_whitespace(tag))
                .collect(),
            permalink: citation.leganto_permalink.clone().filter(|p| !p.is_empty()),
            source: meta.source.clone().filter(|s| !s.is_empty()),
            heading_level: self.display.citation_heading_level(),
        }
    }
}

/// Condense a metadata field, mapping empty values to `None`.
fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(condense_whitespace)
        .filter(|v| !v.is_empty())
}
