use std::io::Read;

use stream::RecordingStream;

/// Synthetic document head put in front of a page fragment: the export-0.5
/// root element and an English Wikipedia `<siteinfo>`.
pub const DUMP_HEADER: &str = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.5/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.mediawiki.org/xml/export-0.5/ http://www.mediawiki.org/xml/export-0.5.xsd" version="0.5" xml:lang="en">
<siteinfo>
<sitename>Wikipedia</sitename>
<base>http://en.wikipedia.org/wiki/Main_Page</base>
<generator>MediaWiki 1.17wmf1</generator>
<case>first-letter</case>
<namespaces>
<namespace key="-2" case="first-letter">Media</namespace>
<namespace key="-1" case="first-letter">Special</namespace>
<namespace key="0" case="first-letter" />
<namespace key="1" case="first-letter">Talk</namespace>
<namespace key="2" case="first-letter">User</namespace>
<namespace key="3" case="first-letter">User talk</namespace>
<namespace key="4" case="first-letter">Wikipedia</namespace>
<namespace key="5" case="first-letter">Wikipedia talk</namespace>
<namespace key="6" case="first-letter">File</namespace>
<namespace key="7" case="first-letter">File talk</namespace>
<namespace key="8" case="first-letter">MediaWiki</namespace>
<namespace key="9" case="first-letter">MediaWiki talk</namespace>
<namespace key="10" case="first-letter">Template</namespace>
<namespace key="11" case="first-letter">Template talk</namespace>
<namespace key="12" case="first-letter">Help</namespace>
<namespace key="13" case="first-letter">Help talk</namespace>
<namespace key="14" case="first-letter">Category</namespace>
<namespace key="15" case="first-letter">Category talk</namespace>
<namespace key="100" case="first-letter">Portal</namespace>
<namespace key="101" case="first-letter">Portal talk</namespace>
<namespace key="108" case="first-letter">Book</namespace>
<namespace key="109" case="first-letter">Book talk</namespace>
</namespaces>
</siteinfo>
"#;

/// Closes the root opened by [`DUMP_HEADER`].
pub const DUMP_FOOTER: &str = "</mediawiki>";

/// Presents a run of bare `<page>` elements as a complete dump, keeping
/// the last `history_capacity` bytes read for error reports.
pub fn wrap_fragment<R: Read>(source: R, history_capacity: usize) -> RecordingStream<R> {
    RecordingStream::new(source, DUMP_HEADER, DUMP_FOOTER, history_capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_fragment_is_header_body_footer() {
        let mut s = wrap_fragment(&b"<page></page>\n"[..], 32);
        let all = String::from_utf8(s.read_to_end_bytes().expect("read")).expect("utf8");
        assert!(all.starts_with("<mediawiki "));
        assert!(all.ends_with("</siteinfo>\n<page></page>\n</mediawiki>"));
        let history = s.history();
        assert_eq!(history.len(), 32);
        assert!(history.ends_with("<page></page>\n</mediawiki>"));
    }
}
