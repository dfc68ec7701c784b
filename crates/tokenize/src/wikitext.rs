use crate::tokenizer::Tokenizer;

/// Multi-character delimiters that are matched literally, in priority order.
///
/// `{{{`/`}}}` must be tried before `{{`/`}}` so template parameters are not
/// split into a template delimiter plus a stray brace.
const BRACKETS: [&str; 6] = ["[[", "]]", "{{{", "}}}", "{{", "}}"];

/// Literal delimiters tried after runs and entities.
const QUOTES: [&str; 2] = ["'''", "''"];
const TABLE: [&str; 3] = ["{|", "|}", "|-"];

/// Tokenizer for MediaWiki markup.
///
/// At each position the alternatives are tried in this order and the first
/// match is taken:
///
/// 1. a run of word characters (alphanumerics and `_`)
/// 2. `[[`, `]]`, `{{{`, `}}}`, `{{`, `}}`
/// 3. a run of `\n`
/// 4. a run of spaces
/// 5. an entity such as `&amp;`
/// 6. `'''`, `''`
/// 7. a run of `=`
/// 8. `{|`, `|}`, `|-`
/// 9. any single other character
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WikitextTokenizer;

impl Tokenizer for WikitextTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        tokenize(text)
    }
}

/// Tokenizes `text` with the wikitext rules and collects the tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    // Wikitext averages a little over four bytes per token.
    let mut out = Vec::with_capacity(text.len() / 4 + 1);
    out.extend(tokens(text));
    out
}

/// Lazy form of [`tokenize`].
pub fn tokens(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}

/// Iterator over the wikitext tokens of a string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    /// The part of the input not yet tokenized.
    pub fn remainder(&self) -> &'a str {
        self.rest
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let len = token_len(self.rest);
        let (token, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Every token is at least one byte.
        let upper = self.rest.len();
        ((upper > 0) as usize, Some(upper))
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Byte length of the longest prefix whose chars all satisfy `pred`.
fn run_len(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, ch)| !pred(ch))
        .map_or(s.len(), |(idx, _)| idx)
}

fn literal_len(s: &str, literals: &[&str]) -> usize {
    literals
        .iter()
        .find(|lit| s.starts_with(*lit))
        .map_or(0, |lit| lit.len())
}

/// `&` followed by word characters and a closing `;`.
fn entity_len(s: &str) -> usize {
    let Some(body) = s.strip_prefix('&') else {
        return 0;
    };
    let word = run_len(body, is_word_char);
    if word > 0 && body[word..].starts_with(';') {
        word + 2
    } else {
        0
    }
}

/// Length in bytes of the token at the start of `s`. `s` must be non-empty.
fn token_len(s: &str) -> usize {
    let candidates = [
        run_len(s, is_word_char),
        literal_len(s, &BRACKETS),
        run_len(s, |ch| ch == '\n'),
        run_len(s, |ch| ch == ' '),
        entity_len(s),
        literal_len(s, &QUOTES),
        run_len(s, |ch| ch == '='),
        literal_len(s, &TABLE),
    ];
    candidates
        .into_iter()
        .find(|&len| len > 0)
        .unwrap_or_else(|| s.chars().next().map_or(0, char::len_utf8))
}
