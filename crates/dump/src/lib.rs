//! Streaming reader for MediaWiki XML dumps.
//!
//! A dump is one `<mediawiki>` root holding a `<siteinfo>` head and then
//! any number of `<page>` elements, each with its revisions in order. Full
//! history dumps run to terabytes, so nothing here materializes more than
//! one revision at a time: [`DumpReader`] hands out pages and each
//! [`PageReader`] pulls revisions from the shared XML cursor.
//!
//! Batch frameworks split dumps on `<page>` boundaries, which leaves every
//! task with a headless fragment. [`wrap_fragment`] puts the fixed
//! [`DUMP_HEADER`] and [`DUMP_FOOTER`] around such a fragment so it parses
//! as a full document.
//!
//! Errors distinguish content problems confined to one page (a bad
//! timestamp, a missing id) from broken XML; see
//! [`DumpError::is_recoverable`].

mod error;
mod fragment;
mod reader;
mod types;

pub use crate::error::DumpError;
pub use crate::fragment::{wrap_fragment, DUMP_FOOTER, DUMP_HEADER};
pub use crate::reader::{DumpReader, PageReader};
pub use crate::types::{Contributor, Namespaces, Page, Revision, SiteInfo};
