use tokenize::tokenize;

struct Case {
    name: &'static str,
    input: &'static str,
    expected: &'static [&'static str],
}

#[test]
fn golden_corpus_regression() {
    let cases = [
        Case {
            name: "plain_sentence",
            input: "The quick fox.",
            expected: &["The", " ", "quick", " ", "fox", "."],
        },
        Case {
            name: "internal_link_with_label",
            input: "[[Main Page|home]]",
            expected: &["[[", "Main", " ", "Page", "|", "home", "]]"],
        },
        Case {
            name: "template_with_param",
            input: "{{Infobox|name={{{1}}}}}",
            expected: &["{{", "Infobox", "|", "name", "=", "{{{", "1", "}}}", "}}"],
        },
        Case {
            name: "section_header",
            input: "=== See also ===\n",
            expected: &["===", " ", "See", " ", "also", " ", "===", "\n"],
        },
        Case {
            name: "bold_italic_entity",
            input: "'''a''' ''b''&nbsp;c",
            expected: &["'''", "a", "'''", " ", "''", "b", "''", "&nbsp;", "c"],
        },
        Case {
            name: "table",
            input: "{|\n|-\n| x\n|}",
            expected: &["{|", "\n", "|-", "\n", "|", " ", "x", "\n", "|}"],
        },
        Case {
            name: "non_ascii",
            input: "Gr\u{00fc}\u{00df}e, \u{4e16}\u{754c}!",
            expected: &["Gr\u{00fc}\u{00df}e", ",", " ", "\u{4e16}\u{754c}", "!"],
        },
    ];

    for case in cases {
        let tokens = tokenize(case.input);
        assert_eq!(tokens, case.expected, "tokens mismatch for {}", case.name);
        assert_eq!(tokens.concat(), case.input, "round trip for {}", case.name);
    }
}

#[test]
fn round_trip_over_mixed_markup() {
    let samples = [
        "",
        " ",
        "\n\n",
        "&",
        "&&amp;;;",
        "}}}}}}}",
        "[[[[]]]]",
        "''''''''",
        "|-|}{|",
        "x = y == z",
        "\u{feff}BOM and \u{200b}zero width",
        "tabs\tand\r\ncarriage returns",
    ];
    for sample in samples {
        assert_eq!(tokenize(sample).concat(), sample, "round trip for {sample:?}");
        assert!(tokenize(sample).iter().all(|t| !t.is_empty()));
    }
}
