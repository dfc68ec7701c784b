use std::borrow::Cow;
use std::fmt::Display;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use delta::Edit;
use dump::Revision;
use serde::Serialize;

use crate::config::OutputFormat;

/// TSV rendering of an absent value.
pub const NULL_FIELD: &str = "\\N";

/// Marker column that precedes the error text of a failed diff.
pub const DIFF_FAIL: &str = "diff_fail";

/// Leading columns of a row: the newer revision of a pair and its page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowHeader<'a> {
    pub revision_id: u64,
    pub page_id: u64,
    pub namespace: i32,
    pub title: &'a str,
    pub timestamp: DateTime<Utc>,
    pub comment: Option<&'a str>,
    pub minor: bool,
    pub user_id: Option<u64>,
    pub user_name: Option<&'a str>,
}

impl<'a> RowHeader<'a> {
    pub fn new(page_id: u64, namespace: i32, title: &'a str, revision: &'a Revision) -> Self {
        let contributor = revision.contributor.as_ref();
        Self {
            revision_id: revision.id,
            page_id,
            namespace,
            title,
            timestamp: revision.timestamp,
            comment: revision.comment.as_deref(),
            minor: revision.minor,
            user_id: contributor.and_then(|c| c.id),
            user_name: contributor.and_then(|c| c.username.as_deref()),
        }
    }
}

#[derive(Serialize)]
struct JsonRow<'r, 'a> {
    #[serde(flatten)]
    header: &'r RowHeader<'a>,
    ops: &'r [Edit],
    #[serde(skip_serializing_if = "Option::is_none")]
    diff_fail: Option<String>,
}

/// Escapes backslash, tab, newline, and carriage return so a value fits in
/// one TSV column. Borrows when nothing needs escaping.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '\t', '\n', '\r']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Writes one line per revision pair in the configured format.
#[derive(Debug)]
pub struct RowWriter<W> {
    out: W,
    format: OutputFormat,
    line: String,
}

impl<W: Write> RowWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            line: String::new(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn write_row(&mut self, header: &RowHeader<'_>, ops: &[Edit]) -> io::Result<()> {
        self.write(header, ops, None)
    }

    /// Writes the sentinel row for a diff that failed part way: the spans
    /// produced before the failure, then [`DIFF_FAIL`] and the error text.
    pub fn write_failure(
        &mut self,
        header: &RowHeader<'_>,
        ops: &[Edit],
        error: &dyn Display,
    ) -> io::Result<()> {
        self.write(header, ops, Some(error.to_string()))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(
        &mut self,
        header: &RowHeader<'_>,
        ops: &[Edit],
        failure: Option<String>,
    ) -> io::Result<()> {
        match self.format {
            OutputFormat::Tsv => {
                self.line.clear();
                render_tsv(&mut self.line, header, ops, failure.as_deref());
                self.line.push('\n');
                self.out.write_all(self.line.as_bytes())
            }
            OutputFormat::Json => {
                let row = JsonRow {
                    header,
                    ops,
                    diff_fail: failure,
                };
                serde_json::to_writer(&mut self.out, &row)?;
                self.out.write_all(b"\n")
            }
        }
    }
}

fn render_tsv(line: &mut String, header: &RowHeader<'_>, ops: &[Edit], failure: Option<&str>) {
    let mut fields: Vec<Cow<'_, str>> = Vec::with_capacity(9 + ops.len() + 2);
    fields.push(header.revision_id.to_string().into());
    fields.push(header.page_id.to_string().into());
    fields.push(header.namespace.to_string().into());
    fields.push(escape_field(header.title));
    fields.push(header.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string().into());
    fields.push(optional(header.comment));
    fields.push(header.minor.to_string().into());
    fields.push(match header.user_id {
        Some(id) => id.to_string().into(),
        None => NULL_FIELD.into(),
    });
    fields.push(optional(header.user_name));
    for op in ops {
        fields.push(format!("{}:{}:{}", op.position, op.kind, escape_field(&op.text)).into());
    }
    if let Some(error) = failure {
        fields.push(DIFF_FAIL.into());
        fields.push(escape_field(error));
    }
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push('\t');
        }
        line.push_str(field);
    }
}

fn optional(value: Option<&str>) -> Cow<'_, str> {
    value.map_or(Cow::Borrowed(NULL_FIELD), escape_field)
}
