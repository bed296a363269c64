//! Built-in marker-call scanner, used when `xgettext` is not installed.
//!
//! Scans PHP source text for translation marker calls such as
//! `t('Hello')`, `t2('Cat', 'Cats')` and `tc('ctx', 'Hi')`. The marker
//! table is explicit configuration: callers pass the `&[MarkerSpec]`
//! describing which call names to recognize and how their arguments map
//! to (context, singular, plural). There is no global marker state.
//!
//! The scanner tracks `<?php … ?>` regions and skips string literals and
//! comments, so marker names inside them never produce hits. Only calls
//! whose required arguments are plain string literals are extracted.
//! Line numbers point at the call site, and a `i18n:` comment directly
//! above a call is attached to its hit. Both are best effort: the
//! external tool may place them slightly differently.

use serde::{Deserialize, Serialize};

/// How a marker call's arguments map to catalog fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerShape {
    /// Argument 1 is the message.
    Singular,
    /// Argument 1 is the singular form, argument 2 the plural form.
    SingularPlural,
    /// Argument 1 is the context, argument 2 the message.
    ContextSingular,
}

/// One recognized marker-call name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSpec {
    pub name: String,
    pub shape: MarkerShape,
}

impl MarkerSpec {
    pub fn new(name: impl Into<String>, shape: MarkerShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

/// The default marker table: `t()`, `t2()` and `tc()`.
pub fn default_markers() -> Vec<MarkerSpec> {
    vec![
        MarkerSpec::new("t", MarkerShape::Singular),
        MarkerSpec::new("t2", MarkerShape::SingularPlural),
        MarkerSpec::new("tc", MarkerShape::ContextSingular),
    ]
}

/// One extracted marker call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHit {
    pub context: Option<String>,
    pub singular: String,
    pub plural: Option<String>,
    /// 1-based line of the call site.
    pub line: u32,
    pub comment: Option<String>,
}

/// Scans `source` for the given marker calls. Text before the first
/// `<?php` (or `<?=`) tag and after a closing `?>` tag is ignored.
pub fn scan_source(source: &str, markers: &[MarkerSpec]) -> Vec<MarkerHit> {
    Scanner {
        src: source,
        bytes: source.as_bytes(),
        pos: 0,
        line: 1,
        pending_comment: None,
        hits: Vec::new(),
    }
    .run(markers)
}

struct PendingComment {
    text: String,
    end_line: u32,
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    pending_comment: Option<PendingComment>,
    hits: Vec<MarkerHit>,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl Scanner<'_> {
    fn run(mut self, markers: &[MarkerSpec]) -> Vec<MarkerHit> {
        self.skip_to_php_open();
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match b {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b'?' if self.peek_str("?>") => {
                    self.pos += 2;
                    self.skip_to_php_open();
                }
                b'\'' | b'"' => self.skip_string(b),
                b'/' if self.peek_str("//") => self.line_comment(2),
                b'/' if self.peek_str("/*") => self.block_comment(),
                b'#' => self.line_comment(1),
                _ if is_ident_start(b) => self.identifier(markers),
                _ => self.pos += 1,
            }
        }
        self.hits
    }

    fn peek_str(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    /// Consumes an HTML region up to and including the next PHP open tag.
    fn skip_to_php_open(&mut self) {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'\n' {
                self.line += 1;
                self.pos += 1;
                continue;
            }
            if b == b'<' && self.peek_str("<?") {
                if self.peek_str("<?php") {
                    self.pos += 5;
                } else if self.peek_str("<?=") {
                    self.pos += 3;
                } else {
                    self.pos += 2;
                }
                return;
            }
            self.pos += 1;
        }
    }

    fn skip_string(&mut self, quote: u8) {
        self.pos += 1;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'\\' {
                if self.pos + 1 < self.bytes.len() && self.bytes[self.pos + 1] == b'\n' {
                    self.line += 1;
                }
                self.pos += 2;
                continue;
            }
            if b == quote {
                self.pos += 1;
                return;
            }
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
    }

    fn line_comment(&mut self, marker_len: usize) {
        self.pos += marker_len;
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            if self.peek_str("?>") {
                break;
            }
            self.pos += 1;
        }
        let text = self.src[start..self.pos].trim().to_string();
        self.note_comment(text, self.line);
    }

    fn block_comment(&mut self) {
        self.pos += 2;
        let start = self.pos;
        while self.pos < self.bytes.len() && !self.peek_str("*/") {
            if self.bytes[self.pos] == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
        let end = self.pos;
        if self.pos < self.bytes.len() {
            self.pos += 2;
        }
        let text = self.src[start..end]
            .trim()
            .trim_start_matches('*')
            .trim()
            .to_string();
        self.note_comment(text, self.line);
    }

    fn note_comment(&mut self, text: String, end_line: u32) {
        if text.starts_with("i18n:") {
            self.pending_comment = Some(PendingComment { text, end_line });
        }
    }

    /// A pending `i18n:` comment is attached when it ends on the call's
    /// line or the one directly above it.
    fn take_comment_for(&mut self, line: u32) -> Option<String> {
        let attach = self
            .pending_comment
            .as_ref()
            .is_some_and(|p| p.end_line + 1 >= line);
        if attach {
            self.pending_comment.take().map(|p| p.text)
        } else {
            None
        }
    }

    fn identifier(&mut self, markers: &[MarkerSpec]) {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_ident_continue(self.bytes[self.pos]) {
            self.pos += 1;
        }
        if start > 0 {
            let before = self.bytes[start - 1];
            if before == b'$' || is_ident_continue(before) {
                return;
            }
        }
        let name = &self.src[start..self.pos];
        let Some(spec) = markers.iter().find(|m| m.name == name) else {
            return;
        };
        let line = self.line;
        if let Some((context, singular, plural)) = self.try_parse_call(spec.shape) {
            let comment = self.take_comment_for(line);
            self.hits.push(MarkerHit {
                context,
                singular,
                plural,
                line,
                comment,
            });
        }
    }

    fn try_parse_call(
        &mut self,
        shape: MarkerShape,
    ) -> Option<(Option<String>, String, Option<String>)> {
        let saved = (self.pos, self.line);
        let result = self.parse_call(shape);
        if result.is_none() {
            (self.pos, self.line) = saved;
        }
        result
    }

    fn parse_call(
        &mut self,
        shape: MarkerShape,
    ) -> Option<(Option<String>, String, Option<String>)> {
        self.skip_whitespace();
        if !self.eat(b'(') {
            return None;
        }
        let first = self.parse_literal()?;
        match shape {
            MarkerShape::Singular => Some((None, first, None)),
            MarkerShape::SingularPlural => {
                self.eat_comma()?;
                let second = self.parse_literal()?;
                Some((None, first, Some(second)))
            }
            MarkerShape::ContextSingular => {
                self.eat_comma()?;
                let second = self.parse_literal()?;
                Some((Some(first), second, None))
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.pos < self.bytes.len() && self.bytes[self.pos] == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_comma(&mut self) -> Option<()> {
        self.skip_whitespace();
        self.eat(b',').then_some(())
    }

    /// Parses a single- or double-quoted PHP string literal, returning its
    /// unescaped text. Returns `None` (without committing) when the next
    /// token is anything else, which disqualifies the enclosing call.
    fn parse_literal(&mut self) -> Option<String> {
        self.skip_whitespace();
        if self.pos >= self.bytes.len() {
            return None;
        }
        let quote = self.bytes[self.pos];
        if quote != b'\'' && quote != b'"' {
            return None;
        }
        self.pos += 1;
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'\\' {
                if self.pos + 1 < self.bytes.len() && self.bytes[self.pos + 1] == b'\n' {
                    self.line += 1;
                }
                self.pos += 2;
                continue;
            }
            if b == quote {
                let raw = &self.src[start..self.pos];
                self.pos += 1;
                return Some(unescape_php(raw, quote));
            }
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
        None
    }
}

fn unescape_php(raw: &str, quote: u8) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        if quote == b'\'' {
            match next {
                '\\' | '\'' => out.push(next),
                _ => {
                    out.push('\\');
                    out.push(next);
                }
            }
        } else {
            match next {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '"' | '\\' | '$' => out.push(next),
                _ => {
                    out.push('\\');
                    out.push(next);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn scan(source: &str) -> Vec<MarkerHit> {
        scan_source(source, &default_markers())
    }

    #[test]
    fn test_recognizes_all_three_shapes() {
        let hits = scan("<?php t(\"Hello\"); t2(\"Cat\", \"Cats\"); tc(\"ctx\", \"Hi\");");
        assert_eq!(hits.len(), 3);

        assert_eq!(hits[0].singular, "Hello");
        assert_eq!(hits[0].context, None);
        assert_eq!(hits[0].plural, None);

        assert_eq!(hits[1].singular, "Cat");
        assert_eq!(hits[1].plural.as_deref(), Some("Cats"));

        assert_eq!(hits[2].context.as_deref(), Some("ctx"));
        assert_eq!(hits[2].singular, "Hi");
    }

    #[test]
    fn test_single_quoted_literals() {
        let hits = scan("<?php echo t('It\\'s here');");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].singular, "It's here");
    }

    #[test]
    fn test_double_quote_escapes() {
        let hits = scan("<?php t(\"line\\nbreak \\\"x\\\"\");");
        assert_eq!(hits[0].singular, "line\nbreak \"x\"");
    }

    #[test]
    fn test_line_numbers_point_at_the_call() {
        let hits = scan("<?php\n\n$a = 1;\necho t('Deep');\n");
        assert_eq!(hits[0].line, 4);
    }

    #[test]
    fn test_call_spanning_lines_uses_opening_line() {
        let hits = scan("<?php\nt2(\n    'Cat',\n    'Cats'\n);\n");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].line, 2);
        assert_eq!(hits[0].plural.as_deref(), Some("Cats"));
    }

    #[test]
    fn test_markers_inside_strings_are_ignored() {
        let hits = scan("<?php $s = \"call t('no')\"; t('yes');");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].singular, "yes");
    }

    #[test]
    fn test_markers_inside_comments_are_ignored() {
        let hits = scan("<?php // t('no')\n/* t('nope') */\n# t('nah')\nt('yes');");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].singular, "yes");
    }

    #[test]
    fn test_non_literal_arguments_disqualify_the_call() {
        let hits = scan("<?php t($variable); t2('One', $n); t('kept');");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].singular, "kept");
    }

    #[test]
    fn test_longer_identifiers_do_not_match() {
        let hits = scan("<?php cant('no'); t3('no'); att2('a', 'b'); t('yes');");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].singular, "yes");
    }

    #[test]
    fn test_variable_calls_do_not_match() {
        let hits = scan("<?php $t('no'); t('yes');");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].singular, "yes");
    }

    #[test]
    fn test_html_region_is_ignored() {
        let source = "<h1>t('not php')</h1>\n<?php t('inside'); ?>\nt('outside again')\n";
        let hits = scan(source);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].singular, "inside");
        assert_eq!(hits[0].line, 2);
    }

    #[test]
    fn test_attaches_i18n_comment_directly_above() {
        let source = "<?php\n// i18n: shown in the toolbar\nt('Save');\n\n// unrelated\nt('Load');\n";
        let hits = scan(source);
        assert_eq!(
            hits[0].comment.as_deref(),
            Some("i18n: shown in the toolbar")
        );
        assert_eq!(hits[1].comment, None);
    }

    #[test]
    fn test_stale_comment_is_not_attached() {
        let source = "<?php\n// i18n: old note\n$x = 1;\n$y = 2;\nt('Far away');\n";
        let hits = scan(source);
        assert_eq!(hits[0].comment, None);
    }

    #[test]
    fn test_custom_marker_table() {
        let markers = vec![MarkerSpec::new("__", MarkerShape::Singular)];
        let hits = scan_source("<?php __('Custom'); t('ignored');", &markers);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].singular, "Custom");
    }

    #[test]
    fn test_whitespace_between_name_and_arguments() {
        let hits = scan("<?php t  (\n  'Spaced'\n);");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].singular, "Spaced");
        assert_eq!(hits[0].line, 1);
    }

    #[test]
    fn test_marker_shape_serde_names() {
        let json = r#"{"name": "tc", "shape": "context-singular"}"#;
        let spec: MarkerSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec, MarkerSpec::new("tc", MarkerShape::ContextSingular));
    }
}
