use revdiff::{
    run_stream, wrap_fragment, CounterTally, OutputFormat, RevdiffConfig, StreamingCounters,
};

const FRAGMENT: &str = r#"  <page>
    <title>User talk:Example</title>
    <id>1200</id>
    <revision>
      <id>5001</id>
      <timestamp>2008-06-01T10:00:00Z</timestamp>
      <contributor><username>Alice</username><id>17</id></contributor>
      <comment>new section</comment>
      <text xml:space="preserve">== Hello ==
Welcome to [[Wikipedia]]!</text>
    </revision>
    <revision>
      <id>5002</id>
      <parentid>5001</parentid>
      <timestamp>2008-06-02T11:30:00Z</timestamp>
      <contributor><ip>203.0.113.9</ip></contributor>
      <minor/>
      <text xml:space="preserve">== Hello ==
Welcome to [[Wikipedia]], friend!</text>
    </revision>
    <revision>
      <id>5003</id>
      <parentid>5002</parentid>
      <timestamp>2008-06-03T08:15:00Z</timestamp>
      <contributor><username>Bob</username><id>18</id></contributor>
      <comment>tab	in comment</comment>
      <text xml:space="preserve">== Hi ==
Welcome to [[Wikipedia]], friend!</text>
    </revision>
  </page>
  <page>
    <title>Template:Cite</title>
    <ns>10</ns>
    <id>1300</id>
    <revision>
      <id>6001</id>
      <timestamp>2009-01-01T00:00:00Z</timestamp>
      <text>{{{1}}}</text>
    </revision>
    <revision>
      <id>6002</id>
      <timestamp>2009-01-02T00:00:00Z</timestamp>
      <text>{{{1}}} more</text>
    </revision>
  </page>
"#;

fn run(config: &RevdiffConfig) -> (String, u64) {
    let mut out = Vec::new();
    let mut tally = CounterTally::default();
    let summary = run_stream(
        wrap_fragment(FRAGMENT.as_bytes(), 10_000),
        config,
        &mut out,
        &mut tally,
    )
    .expect("run succeeds");
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.rows, tally.processed);
    (String::from_utf8(out).expect("utf8 rows"), summary.rows)
}

#[test]
fn tsv_rows_for_every_adjacent_pair() {
    let (text, rows) = run(&RevdiffConfig::default());
    assert_eq!(rows, 3);
    let lines: Vec<Vec<&str>> = text.lines().map(|l| l.split('\t').collect()).collect();

    assert_eq!(
        lines[0],
        [
            "5002",
            "1200",
            "3",
            "Example",
            "2008-06-02T11:30:00Z",
            "\\N",
            "true",
            "\\N",
            "\\N",
            "36:1:, friend",
        ]
    );

    assert_eq!(
        &lines[1][..9],
        [
            "5003",
            "1200",
            "3",
            "Example",
            "2008-06-03T08:15:00Z",
            "tab\\tin comment",
            "false",
            "18",
            "Bob",
        ]
    );
    assert_eq!(&lines[1][9..], ["3:-1:Hello", "8:1:Hi"]);

    assert_eq!(&lines[2][..4], ["6002", "1300", "10", "Cite"]);
    assert_eq!(&lines[2][9..], ["7:1: more"]);
}

#[test]
fn json_rows_carry_the_same_data() {
    let mut config = RevdiffConfig::default();
    config.output.format = OutputFormat::Json;
    let (text, rows) = run(&config);
    assert_eq!(rows, 3);

    let values: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).expect("json row"))
        .collect();
    assert_eq!(values[0]["revision_id"], 5002);
    assert_eq!(values[0]["namespace"], 3);
    assert_eq!(values[0]["title"], "Example");
    assert_eq!(values[0]["minor"], true);
    assert!(values[0]["user_name"].is_null());
    assert_eq!(values[1]["comment"], "tab\tin comment");
    assert_eq!(values[1]["ops"][0]["kind"], -1);
    assert_eq!(values[1]["ops"][0]["position"], 3);
    assert_eq!(values[1]["ops"][0]["text"], "Hello");
    assert_eq!(values[2]["ops"][0]["text"], " more");
}

#[test]
fn equal_spans_are_reported_on_request() {
    let mut config = RevdiffConfig::default();
    config.diff.report = revdiff::ReportKinds::all();
    let (text, _) = run(&config);
    let first: Vec<&str> = text.lines().next().expect("row").split('\t').collect();
    assert_eq!(first[9], "0:0:== Hello ==\\nWelcome to [[Wikipedia]]");
    assert_eq!(&first[10..], ["36:1:, friend", "36:0:!"]);
}

#[test]
fn output_is_deterministic() {
    let config = RevdiffConfig::default();
    let (first, _) = run(&config);
    let (second, _) = run(&config);
    assert_eq!(first, second);
}

#[test]
fn counters_go_to_their_own_sink() {
    let mut out = Vec::new();
    let mut counter_sink = Vec::new();
    let counters = StreamingCounters::new(&mut counter_sink, "G", "N");
    run_stream(
        wrap_fragment(FRAGMENT.as_bytes(), 10_000),
        &RevdiffConfig::default(),
        &mut out,
        counters,
    )
    .expect("run");
    assert_eq!(
        String::from_utf8(counter_sink).expect("utf8"),
        "reporter:counter:G,N,1\n".repeat(3)
    );
}
