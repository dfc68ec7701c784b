use std::collections::VecDeque;
use std::io::{self, BufRead, Read, Seek, SeekFrom};

use crate::error::StreamError;
use crate::synthetic::SyntheticStream;

/// Default number of trailing bytes a [`RecordingStream`] keeps.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// Bounded FIFO of the most recent bytes; the oldest are evicted first.
#[derive(Debug, Clone)]
pub struct History {
    buf: VecDeque<u8>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity.min(64 * 1024)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        if self.capacity == 0 {
            return;
        }
        let bytes = if bytes.len() > self.capacity {
            &bytes[bytes.len() - self.capacity..]
        } else {
            bytes
        };
        let overflow = (self.buf.len() + bytes.len()).saturating_sub(self.capacity);
        self.buf.drain(..overflow);
        self.buf.extend(bytes);
    }

    /// Retained bytes in emission order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let (front, back) = self.buf.as_slices();
        [front, back].concat()
    }

    /// Retained bytes as text. A multi-byte character cut in half by
    /// eviction is dropped from the front instead of shown as U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        let bytes = self.to_bytes();
        let start = bytes
            .iter()
            .take(3)
            .take_while(|&&b| b & 0b1100_0000 == 0b1000_0000)
            .count();
        String::from_utf8_lossy(&bytes[start..]).into_owned()
    }
}

/// A [`SyntheticStream`] that remembers the last bytes it handed out.
///
/// Whatever leaves the stream through [`read_up_to`](Self::read_up_to),
/// [`read_line_bytes`](Self::read_line_bytes), [`Read`] or
/// [`BufRead::consume`] is also appended to a bounded [`History`], so a
/// parser failure can be reported together with the input that caused it.
/// The bytes returned are exactly those of the wrapped stream.
#[derive(Debug)]
pub struct RecordingStream<R> {
    inner: SyntheticStream<R>,
    history: History,
}

impl<R: Read> RecordingStream<R> {
    pub fn new(
        source: R,
        prefix: impl Into<Vec<u8>>,
        suffix: impl Into<Vec<u8>>,
        capacity: usize,
    ) -> Self {
        Self::wrap(SyntheticStream::new(source, prefix, suffix), capacity)
    }

    pub fn wrap(inner: SyntheticStream<R>, capacity: usize) -> Self {
        Self {
            inner,
            history: History::new(capacity),
        }
    }

    /// The retained tail of the output, oldest first, as text.
    ///
    /// Up to three leading bytes of a character split by eviction are
    /// dropped; use [`history_bytes`](Self::history_bytes) for the exact tail.
    pub fn history(&self) -> String {
        self.history.to_string_lossy()
    }

    /// The retained tail of the output, byte for byte.
    pub fn history_bytes(&self) -> Vec<u8> {
        self.history.to_bytes()
    }

    pub fn history_buffer(&self) -> &History {
        &self.history
    }

    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn read_up_to(&mut self, max: usize) -> Result<Vec<u8>, StreamError> {
        let out = self.inner.read_up_to(max)?;
        self.history.extend(&out);
        Ok(out)
    }

    pub fn read_to_end_bytes(&mut self) -> Result<Vec<u8>, StreamError> {
        self.read_up_to(usize::MAX)
    }

    pub fn read_line_bytes(&mut self) -> Result<Vec<u8>, StreamError> {
        let out = self.inner.read_line_bytes()?;
        self.history.extend(&out);
        Ok(out)
    }

    pub fn into_inner(self) -> (SyntheticStream<R>, History) {
        (self.inner, self.history)
    }
}

impl<R: Read> Read for RecordingStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.history.extend(&buf[..n]);
        Ok(n)
    }
}

impl<R: Read> BufRead for RecordingStream<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        if amt > 0 {
            // Already buffered by the caller's fill_buf, so no I/O happens here.
            if let Ok(buf) = self.inner.fill_buf() {
                self.history.extend(&buf[..amt.min(buf.len())]);
            }
        }
        self.inner.consume(amt);
    }
}

impl<R: Read> Seek for RecordingStream<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_the_tail() {
        let mut s = RecordingStream::new(&b"LLOWOR"[..], "HE", "LD", 5);
        assert_eq!(s.read_to_end_bytes().expect("read"), b"HELLOWORLD");
        assert_eq!(s.history(), "WORLD");
    }

    #[test]
    fn split_character_is_trimmed_from_text_only() {
        let mut s = RecordingStream::new("aé".as_bytes(), "", "", 1);
        assert_eq!(s.read_to_end_bytes().expect("read"), "aé".as_bytes());
        assert_eq!(s.history(), "");
        assert_eq!(s.history_bytes(), [0xA9]);
    }

    #[test]
    fn history_accumulates_across_small_reads() {
        let mut s = RecordingStream::new(&b"LLOWOR"[..], "HE", "LD", 5);
        while !s.read_up_to(3).expect("read").is_empty() {}
        assert_eq!(s.history(), "WORLD");
        assert_eq!(s.history_buffer().len(), 5);
    }

    #[test]
    fn recording_does_not_alter_output() {
        let plain = SyntheticStream::new(&b"a\nb"[..], "<x>\n", "\n</x>")
            .read_to_end_bytes()
            .expect("plain");
        let mut recorded = RecordingStream::new(&b"a\nb"[..], "<x>\n", "\n</x>", 100);
        let mut lines = Vec::new();
        loop {
            let line = recorded.read_line_bytes().expect("line");
            if line.is_empty() {
                break;
            }
            lines.extend(line);
        }
        assert_eq!(lines, plain);
        assert_eq!(recorded.history().as_bytes(), plain.as_slice());
    }

    #[test]
    fn bufread_consumers_are_recorded() {
        let mut s = RecordingStream::new(&b"one\ntwo\n"[..], "", "three", 64);
        let mut text = String::new();
        s.read_line(&mut text).expect("line");
        assert_eq!(text, "one\n");
        assert_eq!(s.history(), "one\n");
        let rest: Vec<String> = s.lines().collect::<io::Result<_>>().expect("lines");
        assert_eq!(rest, vec!["two".to_string(), "three".to_string()]);
    }

    #[test]
    fn cut_multibyte_char_is_dropped_from_front() {
        let mut history = History::new(3);
        history.extend("a\u{00e9}b".as_bytes());
        assert_eq!(history.to_bytes(), vec![0xC3, 0xA9, b'b']);
        history.extend(b"c");
        assert_eq!(history.to_string_lossy(), "bc");
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut s = RecordingStream::new(&b"data"[..], "", "", 0);
        s.read_to_end_bytes().expect("read");
        assert!(s.history().is_empty());
    }
}
