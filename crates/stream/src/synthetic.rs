use std::io::{self, BufRead, BufReader, Cursor, Read, Seek, SeekFrom};

use tracing::debug;

use crate::error::StreamError;

/// Which part of the composite is being drained. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Prefix,
    Source,
    Suffix,
}

/// A prefix buffer, a live source, and a suffix buffer read as one stream.
///
/// The prefix is drained completely before the source is touched, and the
/// source is drained to EOF before the suffix is touched. Lines that straddle
/// a boundary come out whole from [`read_line_bytes`](Self::read_line_bytes).
///
/// ```
/// use stream::SyntheticStream;
///
/// let mut s = SyntheticStream::new(&b"CDEF"[..], "AB", "GH");
/// assert_eq!(s.read_up_to(3).unwrap(), b"ABC");
/// assert_eq!(s.read_up_to(10).unwrap(), b"DEFGH");
/// assert_eq!(s.position(), 8);
/// ```
#[derive(Debug)]
pub struct SyntheticStream<R> {
    prefix: Cursor<Vec<u8>>,
    source: Option<BufReader<R>>,
    suffix: Cursor<Vec<u8>>,
    segment: Segment,
    source_pos: u64,
    closed: bool,
}

impl<R: Read> SyntheticStream<R> {
    pub fn new(source: R, prefix: impl Into<Vec<u8>>, suffix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: Cursor::new(prefix.into()),
            source: Some(BufReader::new(source)),
            suffix: Cursor::new(suffix.into()),
            segment: Segment::Prefix,
            source_pos: 0,
            closed: false,
        }
    }

    /// Bytes delivered so far across all three parts.
    pub fn position(&self) -> u64 {
        self.prefix.position() + self.source_pos + self.suffix.position()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes the stream and drops the source. Every later read fails with
    /// [`StreamError::Closed`]. Closing twice is a no-op.
    pub fn close(&mut self) {
        if !self.closed {
            debug!(position = self.position(), "synthetic_stream_closed");
        }
        self.closed = true;
        self.source = None;
    }

    /// Reads up to `max` bytes, crossing part boundaries as needed.
    /// Returns fewer only at the end of the stream, and nothing once drained.
    pub fn read_up_to(&mut self, max: usize) -> Result<Vec<u8>, StreamError> {
        let mut out = Vec::with_capacity(max.min(8 * 1024));
        self.ensure_open()?;
        while out.len() < max {
            let buf = self.fill()?;
            if buf.is_empty() {
                break;
            }
            let n = buf.len().min(max - out.len());
            out.extend_from_slice(&buf[..n]);
            self.advance(n);
        }
        Ok(out)
    }

    /// Reads everything that is left.
    pub fn read_to_end_bytes(&mut self) -> Result<Vec<u8>, StreamError> {
        self.read_up_to(usize::MAX)
    }

    /// Reads one line, including its `\n` if it has one. A line split across
    /// the prefix, source, and suffix is returned whole. Empty at the end.
    pub fn read_line_bytes(&mut self) -> Result<Vec<u8>, StreamError> {
        let mut out = Vec::new();
        self.ensure_open()?;
        loop {
            let buf = self.fill()?;
            if buf.is_empty() {
                break;
            }
            let (n, done) = match buf.iter().position(|&b| b == b'\n') {
                Some(idx) => (idx + 1, true),
                None => (buf.len(), false),
            };
            out.extend_from_slice(&buf[..n]);
            self.advance(n);
            if done {
                break;
            }
        }
        Ok(out)
    }

    fn ensure_open(&self) -> Result<(), StreamError> {
        if self.closed {
            Err(StreamError::Closed)
        } else {
            Ok(())
        }
    }

    /// Moves `segment` past any drained parts.
    fn settle(&mut self) -> Result<Segment, StreamError> {
        self.ensure_open()?;
        if self.segment == Segment::Prefix && remaining(&self.prefix).is_empty() {
            self.segment = Segment::Source;
        }
        if self.segment == Segment::Source {
            let exhausted = match self.source.as_mut() {
                Some(source) => source.fill_buf()?.is_empty(),
                None => true,
            };
            if exhausted {
                self.segment = Segment::Suffix;
            }
        }
        Ok(self.segment)
    }

    /// Buffered bytes of the active part; empty only at end of stream.
    fn fill(&mut self) -> Result<&[u8], StreamError> {
        Ok(match self.settle()? {
            Segment::Prefix => remaining(&self.prefix),
            Segment::Source => match self.source.as_mut() {
                Some(source) => source.fill_buf()?,
                None => &[],
            },
            Segment::Suffix => remaining(&self.suffix),
        })
    }

    fn advance(&mut self, amt: usize) {
        if amt == 0 {
            return;
        }
        match self.segment {
            Segment::Prefix => skip(&mut self.prefix, amt),
            Segment::Source => {
                if let Some(source) = self.source.as_mut() {
                    source.consume(amt);
                    self.source_pos += amt as u64;
                }
            }
            Segment::Suffix => skip(&mut self.suffix, amt),
        }
    }
}

fn remaining(cursor: &Cursor<Vec<u8>>) -> &[u8] {
    let data = cursor.get_ref();
    let pos = (cursor.position() as usize).min(data.len());
    &data[pos..]
}

fn skip(cursor: &mut Cursor<Vec<u8>>, amt: usize) {
    let end = cursor.get_ref().len() as u64;
    let pos = (cursor.position() + amt as u64).min(end);
    cursor.set_position(pos);
}

impl<R: Read> Read for SyntheticStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.advance(n);
        Ok(n)
    }
}

impl<R: Read> BufRead for SyntheticStream<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(self.fill()?)
    }

    fn consume(&mut self, amt: usize) {
        self.advance(amt);
    }
}

/// Only `SeekFrom::Current(0)`, i.e. asking for the position, is allowed.
impl<R: Read> Seek for SyntheticStream<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Current(0) => Ok(self.position()),
            _ => Err(StreamError::Unsupported("seek").into()),
        }
    }
}
