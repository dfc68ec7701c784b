use std::io::Read;

use crate::error::StreamError;
use crate::recording::RecordingStream;
use crate::synthetic::SyntheticStream;

/// Something that hands out raw lines, `\n` included.
pub trait LineSource {
    /// Next line, or an empty vector at the end.
    fn next_line(&mut self) -> Result<Vec<u8>, StreamError>;

    /// Lazy iterator over the remaining lines. Not restartable.
    fn byte_lines(&mut self) -> ByteLines<'_, Self>
    where
        Self: Sized,
    {
        ByteLines {
            source: self,
            done: false,
        }
    }
}

impl<R: Read> LineSource for SyntheticStream<R> {
    fn next_line(&mut self) -> Result<Vec<u8>, StreamError> {
        self.read_line_bytes()
    }
}

impl<R: Read> LineSource for RecordingStream<R> {
    fn next_line(&mut self) -> Result<Vec<u8>, StreamError> {
        self.read_line_bytes()
    }
}

/// Iterator returned by [`LineSource::byte_lines`].
///
/// Ends at the first empty read or after the first error.
#[derive(Debug)]
pub struct ByteLines<'s, S> {
    source: &'s mut S,
    done: bool,
}

impl<S: LineSource> Iterator for ByteLines<'_, S> {
    type Item = Result<Vec<u8>, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.next_line() {
            Ok(line) if line.is_empty() => {
                self.done = true;
                None
            }
            Ok(line) => Some(Ok(line)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<S: LineSource> std::iter::FusedIterator for ByteLines<'_, S> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_logical_lines() {
        let mut s = SyntheticStream::new(&b"b\nc"[..], "a\n", "\nd");
        let lines: Vec<Vec<u8>> = s
            .byte_lines()
            .collect::<Result<_, _>>()
            .expect("lines");
        assert_eq!(lines, vec![b"a\n".to_vec(), b"b\n".to_vec(), b"c\n".to_vec(), b"d".to_vec()]);
        assert!(s.byte_lines().next().is_none());
    }

    #[test]
    fn stops_after_close_error() {
        let mut s = RecordingStream::new(&b"x\n"[..], "", "", 8);
        s.close();
        let mut lines = s.byte_lines();
        assert!(matches!(lines.next(), Some(Err(StreamError::Closed))));
        assert!(lines.next().is_none());
    }
}
