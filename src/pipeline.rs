use std::io::{self, BufRead, Write};
use std::time::Instant;

use delta::{simple_diff, DeltaError, DiffOptions, Edit, TokenizerKind};
use dump::{DumpError, DumpReader, PageReader, Revision};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, info_span, warn};

use crate::config::RevdiffConfig;
use crate::counters::RecordCounters;
use crate::output::{RowHeader, RowWriter};

/// Errors that can end the processing of a page or of the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The document head could not be read.
    #[error("failed to read dump head: {0}")]
    Setup(#[source] DumpError),
    /// A revision of the page could not be read.
    #[error("{source} - while processing page {page_id} ({title}) after revId={revision_id:?}")]
    Page {
        page_id: u64,
        title: String,
        /// Last revision read before the failure.
        revision_id: Option<u64>,
        #[source]
        source: DumpError,
    },
    /// The diff against the previous revision failed. A sentinel row has
    /// already been written.
    #[error("diff failed for revId={revision_id} on page {page_id}: {source}")]
    Diff {
        page_id: u64,
        revision_id: u64,
        #[source]
        source: DeltaError,
    },
    /// The XML stream broke between pages.
    #[error("dump stream failed: {0}")]
    Dump(#[source] DumpError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl PipelineError {
    /// True for failures confined to one page; the run moves on to the
    /// next page. Everything else aborts it.
    pub fn is_page_local(&self) -> bool {
        match self {
            PipelineError::Page { source, .. } => source.is_recoverable(),
            PipelineError::Diff { .. } => true,
            PipelineError::Setup(_) | PipelineError::Dump(_) | PipelineError::Output(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub page_id: u64,
    pub revisions: u64,
    pub rows: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pages: u64,
    pub pages_failed: u64,
    pub rows: u64,
}

/// Reads the dump head, mapping failures to [`PipelineError::Setup`].
pub fn open_dump<B: BufRead>(source: B) -> Result<DumpReader<B>, PipelineError> {
    DumpReader::new(source).map_err(PipelineError::Setup)
}

/// Diffs each revision of a page against the one before it and writes one
/// row per pair.
#[derive(Debug)]
pub struct RevisionDiffer<W, C> {
    options: DiffOptions,
    tokenizer: TokenizerKind,
    rows: RowWriter<W>,
    counters: C,
}

impl<W: Write, C: RecordCounters> RevisionDiffer<W, C> {
    pub fn new(config: &RevdiffConfig, out: W, counters: C) -> Self {
        Self {
            options: config.diff.to_options(),
            tokenizer: config.diff.tokenizer,
            rows: RowWriter::new(out, config.output.format),
            counters,
        }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Processes every revision of `page`. The first revision only seeds
    /// the comparison; each later one yields a row.
    pub fn process_page<B: BufRead>(
        &mut self,
        page: PageReader<'_, B>,
    ) -> Result<PageSummary, PipelineError> {
        let start = Instant::now();
        let page_id = page.page().id;
        let (namespace, title) = {
            let (namespace, title) = page.page().namespace_and_title(page.namespaces());
            (namespace, title.to_string())
        };

        let span = info_span!("revdiff.page", page_id, namespace, title = %title);
        let _guard = span.enter();
        info!("page_started");

        let mut summary = PageSummary {
            page_id,
            ..PageSummary::default()
        };
        let mut previous: Option<Revision> = None;
        let mut ops = Vec::new();
        for revision in page {
            let revision = revision.map_err(|source| PipelineError::Page {
                page_id,
                title: title.clone(),
                revision_id: previous.as_ref().map(|r| r.id),
                source,
            })?;
            summary.revisions += 1;

            if let Some(old) = &previous {
                let header = RowHeader::new(page_id, namespace, &title, &revision);
                ops.clear();
                match self.diff_pair(&old.text, &revision.text, &mut ops) {
                    Ok(()) => {
                        self.rows.write_row(&header, &ops)?;
                        self.counters.record_processed()?;
                        summary.rows += 1;
                    }
                    Err(source) => {
                        self.rows.write_failure(&header, &ops, &source)?;
                        warn!(revision_id = revision.id, error = %source, "diff_failed");
                        return Err(PipelineError::Diff {
                            page_id,
                            revision_id: revision.id,
                            source,
                        });
                    }
                }
            }
            previous = Some(revision);
        }

        info!(
            revisions = summary.revisions,
            rows = summary.rows,
            elapsed_micros = start.elapsed().as_micros(),
            "page_processed"
        );
        Ok(summary)
    }

    /// Processes pages until the dump ends. Page-local failures are logged
    /// and counted; anything else stops the run.
    pub fn run<B: BufRead>(
        &mut self,
        dump: &mut DumpReader<B>,
    ) -> Result<RunSummary, PipelineError> {
        let start = Instant::now();
        let mut summary = RunSummary::default();
        loop {
            let page = match dump.next_page() {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(source) if source.is_recoverable() => {
                    warn!(error = %source, "page_failed");
                    summary.pages_failed += 1;
                    continue;
                }
                Err(source) => return Err(PipelineError::Dump(source)),
            };
            match self.process_page(page) {
                Ok(page) => {
                    summary.pages += 1;
                    summary.rows += page.rows;
                }
                Err(err) if err.is_page_local() => {
                    warn!(error = %err, "page_failed");
                    summary.pages_failed += 1;
                }
                Err(err) => return Err(err),
            }
        }
        info!(
            pages = summary.pages,
            pages_failed = summary.pages_failed,
            rows = summary.rows,
            elapsed_micros = start.elapsed().as_micros(),
            "run_complete"
        );
        Ok(summary)
    }

    /// Flushes buffered rows and hands back the sinks.
    pub fn finish(mut self) -> Result<(W, C), PipelineError> {
        self.rows.flush()?;
        Ok((self.rows.into_inner(), self.counters))
    }

    /// Collects the reported spans into `ops`. On failure `ops` keeps the
    /// spans produced so far.
    fn diff_pair(&self, old: &str, new: &str, ops: &mut Vec<Edit>) -> Result<(), DeltaError> {
        for edit in simple_diff(old, new, &self.tokenizer, &self.options)? {
            ops.push(edit?);
        }
        Ok(())
    }
}

/// Opens `source` as a dump and diffs every page in it.
pub fn run_stream<B, W, C>(
    source: B,
    config: &RevdiffConfig,
    out: W,
    counters: C,
) -> Result<RunSummary, PipelineError>
where
    B: BufRead,
    W: Write,
    C: RecordCounters,
{
    let mut dump = open_dump(source)?;
    let mut differ = RevisionDiffer::new(config, out, counters);
    let summary = differ.run(&mut dump)?;
    differ.finish()?;
    Ok(summary)
}
