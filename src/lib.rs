//! Workspace umbrella crate for revdiff, a token-level revision differ for
//! MediaWiki dumps.
//!
//! The stages live in their own crates and are re-exported here:
//!
//! * `tokenize` splits wikitext into tokens that concatenate back to the
//!   input;
//! * `delta` interns tokens into symbols, runs a Myers diff over the symbol
//!   sequences, and yields `position:kind:text` edit spans;
//! * `stream` glues a synthetic header and footer around a live byte
//!   source and keeps a bounded history of what was read;
//! * `dump` pulls pages and revisions out of the resulting XML.
//!
//! This crate drives them: [`RevisionDiffer`] diffs each revision of a page
//! against the previous one and writes one row per pair, isolating failures
//! to the page they happen on. The `revision-differ` binary runs it as a
//! Hadoop streaming mapper over stdin.
//!
//! ```
//! use revdiff::{run_stream, wrap_fragment, CounterTally, RevdiffConfig};
//!
//! let fragment = "<page><title>A</title><id>1</id>\
//!     <revision><id>1</id><timestamp>2001-01-01T00:00:00Z</timestamp><text>Foo derp 263254</text></revision>\
//!     <revision><id>2</id><timestamp>2001-01-02T00:00:00Z</timestamp><text>Foo derp 26354</text></revision>\
//!     </page>";
//! let mut input = wrap_fragment(fragment.as_bytes(), 1024);
//! let mut out = Vec::new();
//! let summary = run_stream(&mut input, &RevdiffConfig::default(), &mut out, CounterTally::default())?;
//! assert_eq!(summary.rows, 1);
//!
//! let row = String::from_utf8(out)?;
//! assert!(row.ends_with("\t9:-1:263254\t15:1:26354\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
mod counters;
mod output;
mod pipeline;

pub use crate::config::{ConfigLoadError, OutputFormat, RevdiffConfig, CONFIG_ENV};
pub use crate::counters::{CounterTally, RecordCounters, StreamingCounters};
pub use crate::output::{escape_field, RowHeader, RowWriter, DIFF_FAIL, NULL_FIELD};
pub use crate::pipeline::{
    open_dump, run_stream, PageSummary, PipelineError, RevisionDiffer, RunSummary,
};

pub use delta::{
    apply_edits, diff_texts, simple_diff, DeltaError, DiffOptions, Edit, EditKind, EditScript,
    ReportKinds, Symbol, SymbolTable, MAX_VOCABULARY,
};
pub use dump::{
    wrap_fragment, Contributor, DumpError, DumpReader, Namespaces, Page, PageReader, Revision,
    SiteInfo, DUMP_FOOTER, DUMP_HEADER,
};
pub use stream::{History, RecordingStream, StreamError, SyntheticStream};
pub use tokenize::{tokenize, Tokenizer, TokenizerKind, WikitextTokenizer};
