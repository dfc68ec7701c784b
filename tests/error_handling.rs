use revdiff::{
    run_stream, wrap_fragment, CounterTally, DumpError, PipelineError, RevdiffConfig, DIFF_FAIL,
};

const GOOD_PAGE: &str = "<page><title>Good</title><id>1</id>\
    <revision><id>1</id><timestamp>2010-01-01T00:00:00Z</timestamp><text>one</text></revision>\
    <revision><id>2</id><timestamp>2010-01-02T00:00:00Z</timestamp><text>one two</text></revision>\
    </page>\n";

fn run_fragment(
    fragment: &str,
    config: &RevdiffConfig,
) -> (Result<revdiff::RunSummary, PipelineError>, String, String) {
    let mut input = wrap_fragment(fragment.as_bytes(), 10_000);
    let mut out = Vec::new();
    let result = run_stream(&mut input, config, &mut out, CounterTally::default());
    (
        result,
        String::from_utf8(out).expect("utf8 rows"),
        input.history(),
    )
}

#[test]
fn broken_markup_aborts_but_keeps_earlier_rows() {
    let fragment = format!(
        "{GOOD_PAGE}<page><title>Broken</title><id>2</id>\
         <revision><id>7</id><timestamp>2010-01-01T00:00:00Z</timestamp><text>x</text></revision>\
         <revision><id>8</id></revisio></page>\n"
    );
    let (result, rows, history) = run_fragment(&fragment, &RevdiffConfig::default());

    let err = result.expect_err("mismatched end tag");
    assert!(!err.is_page_local());
    match &err {
        PipelineError::Page {
            page_id,
            revision_id,
            source,
            ..
        } => {
            assert_eq!(*page_id, 2);
            assert_eq!(*revision_id, Some(7));
            assert!(matches!(source, DumpError::Xml { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("while processing page 2 (Broken)"));

    // The row for the first page was written before the failure.
    assert_eq!(rows.lines().count(), 1);
    assert!(rows.starts_with("2\t1\t0\tGood\t"));

    assert!(history.contains("<title>Broken</title>"));
    assert!(!history.contains("</mediawiki>"));
}

#[test]
fn bad_revision_fails_only_its_page() {
    let fragment = format!(
        "<page><title>Flaky</title><id>3</id>\
         <revision><id>1</id><timestamp>2010-01-01T00:00:00Z</timestamp><text>a</text></revision>\
         <revision><id>2</id><timestamp>2010-01-02T00:00:00Z</timestamp><text>a b</text></revision>\
         <revision><id>3</id><timestamp>last tuesday</timestamp><text>a b c</text></revision>\
         <revision><id>4</id><timestamp>2010-01-04T00:00:00Z</timestamp><text>a</text></revision>\
         </page>\n{GOOD_PAGE}"
    );
    let (result, rows, _) = run_fragment(&fragment, &RevdiffConfig::default());
    let summary = result.expect("page-local failure");
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.rows, 1);

    let lines: Vec<&str> = rows.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2\t3\t0\tFlaky\t"));
    assert!(lines[1].starts_with("2\t1\t0\tGood\t"));
}

#[test]
fn page_without_id_is_skipped() {
    let fragment = format!(
        "<page><title>Anonymous</title>\
         <revision><id>1</id><timestamp>2010-01-01T00:00:00Z</timestamp><text>a</text></revision>\
         <revision><id>2</id><timestamp>2010-01-02T00:00:00Z</timestamp><text>b</text></revision>\
         </page>\n{GOOD_PAGE}"
    );
    let (result, rows, _) = run_fragment(&fragment, &RevdiffConfig::default());
    let summary = result.expect("recoverable head error");
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(rows.lines().count(), 1);
}

#[test]
fn diff_failure_writes_sentinel_row() {
    let fragment = "<page><title>Wide</title><id>4</id>\
        <revision><id>1</id><timestamp>2010-01-01T00:00:00Z</timestamp><text>a</text></revision>\
        <revision><id>2</id><timestamp>2010-01-02T00:00:00Z</timestamp><text>a b c d</text></revision>\
        </page>\n";
    let mut config = RevdiffConfig::default();
    config.diff.max_vocabulary = Some(3);
    let (result, rows, _) = run_fragment(fragment, &config);

    let summary = result.expect("diff failures are page-local");
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.rows, 0);

    let fields: Vec<&str> = rows.trim_end_matches('\n').split('\t').collect();
    assert_eq!(&fields[..4], ["2", "4", "0", "Wide"]);
    assert_eq!(fields[9], DIFF_FAIL);
    assert!(!fields[10].is_empty());
}

#[test]
fn wrong_root_is_a_setup_error() {
    let mut out = Vec::new();
    let err = run_stream(
        &b"<feed><entry/></feed>"[..],
        &RevdiffConfig::default(),
        &mut out,
        CounterTally::default(),
    )
    .expect_err("not a dump");
    assert!(matches!(err, PipelineError::Setup(_)));
    assert!(!err.is_page_local());
    assert!(out.is_empty());
}

#[test]
fn truncated_input_reports_unexpected_eof() {
    let mut input = revdiff::RecordingStream::new(
        &b"<page><title>Cut</title><id>5</id><revision><id>1</id>"[..],
        revdiff::DUMP_HEADER,
        "",
        256,
    );
    let err = run_stream(
        &mut input,
        &RevdiffConfig::default(),
        Vec::new(),
        CounterTally::default(),
    )
    .expect_err("truncated");
    assert!(!err.is_page_local());
    assert!(input.history().ends_with("<revision><id>1</id>"));
}
