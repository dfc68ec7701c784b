use std::fmt::Display;
use std::io::BufRead;
use std::iter::FusedIterator;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::DumpError;
use crate::types::{Contributor, Namespaces, Page, Revision, SiteInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageState {
    /// Between pages.
    Closed,
    /// Inside a `<page>`. `pending` means the next `<revision>` start tag
    /// has already been consumed.
    Open { pending: bool },
}

/// Pull reader over a MediaWiki XML dump.
///
/// Construction consumes everything up to and including `</siteinfo>`.
/// Pages are then handed out one at a time by [`next_page`](Self::next_page);
/// each [`PageReader`] yields that page's revisions lazily, so a page's
/// full history is never held in memory.
///
/// ```
/// use dump::{DumpReader, DUMP_FOOTER, DUMP_HEADER};
///
/// let xml = format!(
///     "{DUMP_HEADER}<page><title>Talk:A</title><id>1</id>\
///      <revision><id>10</id><timestamp>2004-01-01T00:00:00Z</timestamp><text>x</text></revision>\
///      </page>{DUMP_FOOTER}"
/// );
/// let mut dump = DumpReader::new(xml.as_bytes()).unwrap();
/// let mut page = dump.next_page().unwrap().unwrap();
/// assert_eq!(page.page().id, 1);
/// assert_eq!(page.next().unwrap().unwrap().text, "x");
/// assert!(page.next().is_none());
/// drop(page);
/// assert!(dump.next_page().unwrap().is_none());
/// ```
pub struct DumpReader<B> {
    reader: Reader<B>,
    buf: Vec<u8>,
    site_info: SiteInfo,
    namespaces: Namespaces,
    state: PageState,
    pending_page: bool,
    finished: bool,
}

impl<B: BufRead> DumpReader<B> {
    /// Reads the document head. Fails if the root element is not
    /// `<mediawiki>` or the head is malformed.
    pub fn new(source: B) -> Result<Self, DumpError> {
        let mut dump = Self {
            reader: Reader::from_reader(source),
            buf: Vec::with_capacity(8 * 1024),
            site_info: SiteInfo::default(),
            namespaces: Namespaces::new(),
            state: PageState::Closed,
            pending_page: false,
            finished: false,
        };
        dump.read_head()?;
        debug!(
            site_name = %dump.site_info.site_name,
            namespaces = dump.namespaces.len(),
            "dump_head_read"
        );
        Ok(dump)
    }

    pub fn site_info(&self) -> &SiteInfo {
        &self.site_info
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Bytes consumed by the XML reader so far.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    pub fn get_ref(&self) -> &B {
        self.reader.get_ref()
    }

    pub fn into_inner(self) -> B {
        self.reader.into_inner()
    }

    /// Advances to the next `<page>`. Whatever the previous [`PageReader`]
    /// left unread is skipped first. `Ok(None)` once the root is closed.
    pub fn next_page(&mut self) -> Result<Option<PageReader<'_, B>>, DumpError> {
        if let PageState::Open { pending } = self.state {
            self.skip_page(pending)?;
        }
        if self.finished {
            return Ok(None);
        }
        if !std::mem::take(&mut self.pending_page) {
            loop {
                match self.next_event()? {
                    Event::Start(e) if e.local_name().as_ref() == b"page" => break,
                    Event::Start(_) => self.skip_element("mediawiki")?,
                    Event::End(_) => {
                        self.finished = true;
                        return Ok(None);
                    }
                    Event::Eof => return Err(DumpError::UnexpectedEof("mediawiki")),
                    _ => {}
                }
            }
        }
        self.state = PageState::Open { pending: false };
        let page = self.read_page_head()?;
        debug!(page_id = page.id, title = %page.title, "page_opened");
        Ok(Some(PageReader {
            dump: self,
            page,
            done: false,
        }))
    }

    fn next_event(&mut self) -> Result<Event<'static>, DumpError> {
        self.buf.clear();
        let event = self.reader.read_event_into(&mut self.buf).map(Event::into_owned);
        event.map_err(|source| self.xml_error(source))
    }

    fn xml_error(&self, source: quick_xml::Error) -> DumpError {
        DumpError::Xml {
            position: self.position(),
            source,
        }
    }

    /// Skips to the end tag matching a start tag that was just read.
    fn skip_element(&mut self, context: &'static str) -> Result<(), DumpError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_event()? {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => return Err(DumpError::UnexpectedEof(context)),
                _ => {}
            }
        }
        Ok(())
    }

    fn skip_page(&mut self, pending: bool) -> Result<(), DumpError> {
        if pending {
            self.skip_element("revision")?;
        }
        self.skip_element("page")?;
        self.state = PageState::Closed;
        debug!("page_skipped");
        Ok(())
    }

    /// Text content up to the end tag matching a start tag that was just
    /// read. Nested elements are skipped.
    fn read_text(&mut self, context: &'static str) -> Result<String, DumpError> {
        let mut out = String::new();
        loop {
            match self.next_event()? {
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| self.xml_error(e))?;
                    out.push_str(&text);
                }
                Event::CData(data) => out.push_str(&String::from_utf8_lossy(&data)),
                Event::Start(_) => self.skip_element(context)?,
                Event::End(_) => return Ok(out),
                Event::Eof => return Err(DumpError::UnexpectedEof(context)),
                _ => {}
            }
        }
    }

    fn attribute(&self, element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, DumpError> {
        for attr in element.attributes() {
            let attr = attr?;
            if attr.key.as_ref() == name {
                let value = attr.unescape_value().map_err(|e| self.xml_error(e))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn is_deleted(&self, element: &BytesStart<'_>) -> Result<bool, DumpError> {
        Ok(self.attribute(element, b"deleted")?.as_deref() == Some("deleted"))
    }

    fn read_head(&mut self) -> Result<(), DumpError> {
        loop {
            match self.next_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"mediawiki" => break,
                Event::Start(e) | Event::Empty(e) => {
                    return Err(DumpError::UnexpectedElement {
                        expected: "mediawiki",
                        found: element_name(&e),
                    })
                }
                Event::Eof => return Err(DumpError::UnexpectedEof("mediawiki")),
                _ => {}
            }
        }
        loop {
            match self.next_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"siteinfo" => return self.read_site_info(),
                    b"page" => {
                        self.pending_page = true;
                        return Ok(());
                    }
                    _ => self.skip_element("mediawiki")?,
                },
                Event::End(_) => {
                    self.finished = true;
                    return Ok(());
                }
                Event::Eof => return Err(DumpError::UnexpectedEof("mediawiki")),
                _ => {}
            }
        }
    }

    fn read_site_info(&mut self) -> Result<(), DumpError> {
        loop {
            match self.next_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"sitename" => self.site_info.site_name = self.read_text("sitename")?,
                    b"base" => self.site_info.base = self.read_text("base")?,
                    b"generator" => self.site_info.generator = self.read_text("generator")?,
                    b"case" => self.site_info.case = self.read_text("case")?,
                    b"namespaces" => self.read_namespaces()?,
                    _ => self.skip_element("siteinfo")?,
                },
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(DumpError::UnexpectedEof("siteinfo")),
                _ => {}
            }
        }
    }

    fn read_namespaces(&mut self) -> Result<(), DumpError> {
        loop {
            match self.next_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"namespace" => {
                    let key = self.namespace_key(&e)?;
                    let name = self.read_text("namespace")?;
                    self.namespaces.insert(key, name);
                }
                Event::Empty(e) if e.local_name().as_ref() == b"namespace" => {
                    let key = self.namespace_key(&e)?;
                    self.namespaces.insert(key, "");
                }
                Event::Start(_) => self.skip_element("namespaces")?,
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(DumpError::UnexpectedEof("namespaces")),
                _ => {}
            }
        }
    }

    fn namespace_key(&self, element: &BytesStart<'_>) -> Result<i32, DumpError> {
        let raw = self
            .attribute(element, b"key")?
            .ok_or(DumpError::MissingField {
                element: "key",
                context: "namespace",
            })?;
        parse_number("key", &raw)
    }

    /// Reads page fields up to the first `<revision>` or `</page>`.
    fn read_page_head(&mut self) -> Result<Page, DumpError> {
        let mut id = None;
        let mut title = None;
        let mut namespace = None;
        let mut redirect = None;
        loop {
            match self.next_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"title" => title = Some(self.read_text("title")?),
                    b"id" => id = Some(self.read_text("id")?),
                    b"ns" => namespace = Some(self.read_text("ns")?),
                    b"redirect" => {
                        redirect = Some(self.attribute(&e, b"title")?.unwrap_or_default());
                        self.skip_element("redirect")?;
                    }
                    b"revision" => {
                        self.state = PageState::Open { pending: true };
                        break;
                    }
                    _ => self.skip_element("page")?,
                },
                Event::Empty(e) if e.local_name().as_ref() == b"redirect" => {
                    redirect = Some(self.attribute(&e, b"title")?.unwrap_or_default());
                }
                Event::End(_) => {
                    self.state = PageState::Closed;
                    break;
                }
                Event::Eof => return Err(DumpError::UnexpectedEof("page")),
                _ => {}
            }
        }
        let id = id.ok_or(DumpError::MissingField {
            element: "id",
            context: "page",
        })?;
        let title = title.ok_or(DumpError::MissingField {
            element: "title",
            context: "page",
        })?;
        Ok(Page {
            id: parse_number("id", &id)?,
            title,
            namespace: namespace.as_deref().map(|ns| parse_number("ns", ns)).transpose()?,
            redirect,
        })
    }

    /// Reads one revision through its end tag; fields are validated only
    /// once the element is fully consumed.
    fn read_revision(&mut self) -> Result<Revision, DumpError> {
        let mut raw = RawRevision::default();
        loop {
            match self.next_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"id" => raw.id = Some(self.read_text("id")?),
                    b"parentid" => raw.parent_id = Some(self.read_text("parentid")?),
                    b"timestamp" => raw.timestamp = Some(self.read_text("timestamp")?),
                    b"contributor" => {
                        raw.contributor = if self.is_deleted(&e)? {
                            self.skip_element("contributor")?;
                            None
                        } else {
                            Some(self.read_contributor()?)
                        };
                    }
                    b"minor" => {
                        raw.minor = true;
                        self.skip_element("minor")?;
                    }
                    b"comment" => {
                        raw.comment = if self.is_deleted(&e)? {
                            self.skip_element("comment")?;
                            None
                        } else {
                            Some(self.read_text("comment")?)
                        };
                    }
                    b"text" => {
                        raw.text = if self.is_deleted(&e)? {
                            self.skip_element("text")?;
                            String::new()
                        } else {
                            self.read_text("text")?
                        };
                    }
                    _ => self.skip_element("revision")?,
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"minor" => raw.minor = true,
                    b"comment" => {
                        if !self.is_deleted(&e)? {
                            raw.comment = Some(String::new());
                        }
                    }
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => return Err(DumpError::UnexpectedEof("revision")),
                _ => {}
            }
        }
        raw.finish()
    }

    fn read_contributor(&mut self) -> Result<RawContributor, DumpError> {
        let mut raw = RawContributor::default();
        loop {
            match self.next_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"username" => raw.username = Some(self.read_text("username")?),
                    b"id" => raw.id = Some(self.read_text("id")?),
                    b"ip" => raw.ip = Some(self.read_text("ip")?),
                    _ => self.skip_element("contributor")?,
                },
                Event::End(_) => return Ok(raw),
                Event::Eof => return Err(DumpError::UnexpectedEof("contributor")),
                _ => {}
            }
        }
    }
}

/// Revisions of one page, in document order.
///
/// Borrows the [`DumpReader`]; dropping it early is fine, the rest of the
/// page is skipped by the next [`DumpReader::next_page`] call. Iteration
/// stops after the first error.
pub struct PageReader<'d, B> {
    dump: &'d mut DumpReader<B>,
    page: Page,
    done: bool,
}

impl<B: BufRead> PageReader<'_, B> {
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.dump.namespaces
    }

    fn read_next(&mut self) -> Result<Option<Revision>, DumpError> {
        loop {
            match self.dump.state {
                PageState::Closed => return Ok(None),
                PageState::Open { pending: true } => {
                    self.dump.state = PageState::Open { pending: false };
                    return self.dump.read_revision().map(Some);
                }
                PageState::Open { pending: false } => {}
            }
            match self.dump.next_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"revision" => {
                    self.dump.state = PageState::Open { pending: true };
                }
                Event::Start(_) => self.dump.skip_element("page")?,
                Event::End(_) => self.dump.state = PageState::Closed,
                Event::Eof => return Err(DumpError::UnexpectedEof("page")),
                _ => {}
            }
        }
    }
}

impl<B: BufRead> Iterator for PageReader<'_, B> {
    type Item = Result<Revision, DumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(revision)) => Some(Ok(revision)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<B: BufRead> FusedIterator for PageReader<'_, B> {}

#[derive(Default)]
struct RawContributor {
    id: Option<String>,
    username: Option<String>,
    ip: Option<String>,
}

impl RawContributor {
    fn finish(self) -> Result<Contributor, DumpError> {
        Ok(Contributor {
            id: self.id.as_deref().map(|id| parse_number("id", id)).transpose()?,
            username: self.username,
            ip: self.ip,
        })
    }
}

#[derive(Default)]
struct RawRevision {
    id: Option<String>,
    parent_id: Option<String>,
    timestamp: Option<String>,
    contributor: Option<RawContributor>,
    minor: bool,
    comment: Option<String>,
    text: String,
}

impl RawRevision {
    fn finish(self) -> Result<Revision, DumpError> {
        let id = self.id.ok_or(DumpError::MissingField {
            element: "id",
            context: "revision",
        })?;
        let timestamp = self.timestamp.ok_or(DumpError::MissingField {
            element: "timestamp",
            context: "revision",
        })?;
        Ok(Revision {
            id: parse_number("id", &id)?,
            parent_id: self
                .parent_id
                .as_deref()
                .map(|raw| parse_number("parentid", raw))
                .transpose()?,
            timestamp: parse_timestamp(&timestamp)?,
            contributor: self.contributor.map(RawContributor::finish).transpose()?,
            minor: self.minor,
            comment: self.comment,
            text: self.text,
        })
    }
}

fn parse_number<T>(field: &'static str, raw: &str) -> Result<T, DumpError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|err| DumpError::invalid(field, raw, err))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DumpError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| DumpError::invalid("timestamp", raw, err))
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}
