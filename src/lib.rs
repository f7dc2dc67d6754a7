//! Leganto reading-list integration core.
//!
//! This crate integrates the Ex Libris Leganto reading-list service (via the
//! Alma course API) into a host application. It covers the full pipeline from
//! a local course record to a displayable reading list:
//!
//! 1. [`codes`] derives the Alma course codes associated with a local course,
//!    optionally recursing through linked child courses.
//! 2. [`api`] issues parameterized read requests against the Alma
//!    course/list/citation hierarchy, with per-method parameter validation
//!    and a live -> cache -> failure fallback policy.
//! 3. [`lists`] merges all reading lists matching a course's derived codes
//!    into a single name-ordered collection.
//! 4. [`selection`] converts the flat set of "selected citation" form fields
//!    into a compact nested tree for storage, and back into full paths.
//! 5. [`render`] walks a stored selection against fetched list data and
//!    emits an ordered, section-grouped block sequence for the presentation
//!    layer to turn into markup.
//!
//! # Collaborators
//!
//! The engine receives all of its collaborators explicitly: configuration
//! ([`config::AdminConfig`]), the HTTP transport ([`api::HttpTransport`]),
//! the response cache ([`cache::ListCache`]), and the optional lookup-table
//! and course-directory seams used by code resolution ([`codes::CodeTable`],
//! [`codes::CourseDirectory`]). Tests substitute fakes at every seam.
//!
//! # Error policy
//!
//! Failures are typed ([`core::LegantoError`]) and recovered at component
//! boundaries: a transiently unreachable remote degrades to cached data or
//! an empty list, a corrupt stored selection decodes to nothing, and only a
//! missing API configuration surfaces to the caller so it can show an
//! "unconfigured" notice. Nothing in this crate aborts the host request.

pub mod api;
pub mod cache;
pub mod cli;
pub mod codes;
pub mod config;
pub mod core;
pub mod lists;
pub mod models;
pub mod render;
pub mod selection;
pub mod utils;

pub use api::{AlmaClient, ApiMethod, CallParams};
pub use cache::{ListCache, MemoryCache};
pub use codes::CodeResolver;
pub use config::{AdminConfig, DisplayMode};
pub use core::LegantoError;
pub use lists::ListAggregator;
pub use render::{RenderedBlock, SelectionRenderer};
pub use selection::{SelectionPath, SelectionTree, decode, encode};
