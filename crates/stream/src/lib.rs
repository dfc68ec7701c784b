//! revdiff stream layer.
//!
//! A batch framework hands each task an arbitrary byte range of a large XML
//! dump: a run of `<page>` elements with no document root around them. A
//! strict XML parser rejects that. [`SyntheticStream`] fixes it without
//! copying the input by reading a synthetic header, then the live source, then
//! a synthetic footer, as one stream.
//!
//! [`RecordingStream`] adds a bounded trailing [`History`] of everything read,
//! which is what gets printed when the parser gives up halfway through.
//!
//! Both types implement [`std::io::Read`] and [`std::io::BufRead`], so they can
//! be handed straight to a pull parser. Seeking is limited to asking for the
//! current position and there is no write side.
//!
//! ```
//! use std::io::BufRead;
//! use stream::RecordingStream;
//!
//! let body = &b"<page>one</page>\n"[..];
//! let mut s = RecordingStream::new(body, "<root>\n", "</root>\n", 16);
//! let lines: Vec<String> = (&mut s).lines().map(|l| l.unwrap()).collect();
//! assert_eq!(lines, ["<root>", "<page>one</page>", "</root>"]);
//! assert_eq!(s.history(), "</page>\n</root>\n");
//! ```

mod error;
mod lines;
mod recording;
mod synthetic;

pub use crate::error::StreamError;
pub use crate::lines::{ByteLines, LineSource};
pub use crate::recording::{History, RecordingStream, DEFAULT_HISTORY_CAPACITY};
pub use crate::synthetic::SyntheticStream;
