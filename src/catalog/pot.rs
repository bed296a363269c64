//! Reading and writing gettext template (`.pot`) files.
//!
//! The parser accepts the subset of PO syntax that `xgettext` emits for a
//! template: `#.` extracted comments, `#:` references, `msgctxt`,
//! `msgid`, `msgid_plural` and `msgstr`/`msgstr[N]` records, multi-line
//! string continuations, and the escape set `\\ \" \n \t \r`. Translation
//! bodies (`msgstr`) are validated and discarded since a template carries
//! none. The header entry (empty `msgid` without context) is emitted by
//! the writer and skipped by the parser; the in-memory catalog never
//! contains it.

use super::{Catalog, Entry, Reference};
use crate::error::{Error, Result};

/// Renders the catalog as a `.pot` template, header included.
pub fn to_pot_string(catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str("msgid \"\"\n");
    out.push_str("msgstr \"\"\n");
    out.push_str("\"Project-Id-Version: \\n\"\n");
    out.push_str("\"Report-Msgid-Bugs-To: \\n\"\n");
    out.push_str("\"MIME-Version: 1.0\\n\"\n");
    out.push_str("\"Content-Type: text/plain; charset=UTF-8\\n\"\n");
    out.push_str("\"Content-Transfer-Encoding: 8bit\\n\"\n");
    for entry in catalog.entries() {
        out.push('\n');
        write_entry(&mut out, entry);
    }
    out
}

fn write_entry(out: &mut String, entry: &Entry) {
    for comment in &entry.comments {
        out.push_str("#. ");
        out.push_str(comment);
        out.push('\n');
    }
    if !entry.references.is_empty() {
        let references: Vec<String> = entry
            .references
            .iter()
            .map(|r| match r.line {
                Some(line) => format!("{}:{line}", r.path),
                None => r.path.clone(),
            })
            .collect();
        out.push_str("#: ");
        out.push_str(&references.join(" "));
        out.push('\n');
    }
    if let Some(context) = &entry.context {
        out.push_str(&format!("msgctxt \"{}\"\n", escape(context)));
    }
    out.push_str(&format!("msgid \"{}\"\n", escape(&entry.singular)));
    match &entry.plural {
        Some(plural) => {
            out.push_str(&format!("msgid_plural \"{}\"\n", escape(plural)));
            out.push_str("msgstr[0] \"\"\n");
            out.push_str("msgstr[1] \"\"\n");
        }
        None => out.push_str("msgstr \"\"\n"),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Context,
    Singular,
    Plural,
    Translation,
}

#[derive(Default)]
struct PendingEntry {
    comments: Vec<String>,
    references: Vec<Reference>,
    context: Option<String>,
    singular: Option<String>,
    plural: Option<String>,
}

/// Parses `.pot` text into a catalog.
pub fn parse(input: &str) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    let mut pending = PendingEntry::default();
    let mut field = Field::None;

    for (index, raw) in input.lines().enumerate() {
        let number = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            flush(&mut catalog, &mut pending, &mut field);
        } else if let Some(rest) = line.strip_prefix("#.") {
            pending.comments.push(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("#:") {
            for token in rest.split_whitespace() {
                pending.references.push(parse_reference(token));
            }
        } else if line.starts_with('#') {
            // translator comments, flags and obsolete entries
        } else if let Some(rest) = line.strip_prefix("msgctxt") {
            if pending.singular.is_some() {
                flush(&mut catalog, &mut pending, &mut field);
            }
            pending.context = Some(parse_string(rest, number)?);
            field = Field::Context;
        } else if let Some(rest) = line.strip_prefix("msgid_plural") {
            pending.plural = Some(parse_string(rest, number)?);
            field = Field::Plural;
        } else if let Some(rest) = line.strip_prefix("msgid") {
            if pending.singular.is_some() {
                flush(&mut catalog, &mut pending, &mut field);
            }
            pending.singular = Some(parse_string(rest, number)?);
            field = Field::Singular;
        } else if let Some(rest) = line.strip_prefix("msgstr") {
            let rest = rest.trim_start();
            let rest = match rest.strip_prefix('[') {
                Some(bracket) => match bracket.split_once(']') {
                    Some((_, tail)) => tail,
                    None => {
                        return Err(Error::CatalogSyntax {
                            line: number,
                            message: "unterminated msgstr index".to_string(),
                        });
                    }
                },
                None => rest,
            };
            parse_string(rest, number)?;
            field = Field::Translation;
        } else if line.starts_with('"') {
            let text = parse_string(line, number)?;
            match field {
                Field::Context => append(&mut pending.context, &text),
                Field::Singular => append(&mut pending.singular, &text),
                Field::Plural => append(&mut pending.plural, &text),
                Field::Translation => {}
                Field::None => {
                    return Err(Error::CatalogSyntax {
                        line: number,
                        message: "string continuation outside an entry".to_string(),
                    });
                }
            }
        } else {
            return Err(Error::CatalogSyntax {
                line: number,
                message: format!("unrecognized line: {line}"),
            });
        }
    }
    flush(&mut catalog, &mut pending, &mut field);

    Ok(catalog)
}

fn append(field: &mut Option<String>, text: &str) {
    match field {
        Some(value) => value.push_str(text),
        None => *field = Some(text.to_string()),
    }
}

fn flush(catalog: &mut Catalog, pending: &mut PendingEntry, field: &mut Field) {
    *field = Field::None;
    let pending = std::mem::take(pending);
    let Some(singular) = pending.singular else {
        return;
    };
    if singular.is_empty() && pending.context.is_none() {
        // header entry
        return;
    }
    catalog.push(Entry {
        context: pending.context,
        singular,
        plural: pending.plural,
        references: pending.references,
        comments: pending.comments,
    });
}

fn parse_reference(token: &str) -> Reference {
    if let Some((path, line)) = token.rsplit_once(':')
        && let Ok(line) = line.parse::<u32>()
    {
        return Reference::new(path, Some(line));
    }
    Reference::new(token, None)
}

fn parse_string(rest: &str, number: usize) -> Result<String> {
    let rest = rest.trim();
    if rest.len() < 2 || !rest.starts_with('"') || !rest.ends_with('"') {
        return Err(Error::CatalogSyntax {
            line: number,
            message: format!("expected a quoted string, found: {rest}"),
        });
    }
    unescape(&rest[1..rest.len() - 1], number)
}

fn unescape(s: &str, number: usize) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => {
                return Err(Error::CatalogSyntax {
                    line: number,
                    message: "dangling escape at end of string".to_string(),
                });
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_xgettext_style_output() {
        let input = r#"# SOME DESCRIPTIVE TITLE.
#, fuzzy
msgid ""
msgstr ""
"Project-Id-Version: PACKAGE VERSION\n"
"Content-Type: text/plain; charset=UTF-8\n"

#. i18n: shown on the login page
#: single_pages/login.php:12 tools/login.php:3
msgid "Sign In"
msgstr ""

#: blocks/search/controller.php:40
msgid "Result"
msgid_plural "Results"
msgstr[0] ""
msgstr[1] ""

#: controllers/dashboard.php:8
msgctxt "MenuLabel"
msgid "Home"
msgstr ""
"#;
        let catalog = parse(input).unwrap();
        assert_eq!(catalog.len(), 3);

        let sign_in = &catalog.entries()[0];
        assert_eq!(sign_in.singular, "Sign In");
        assert_eq!(sign_in.comments, vec!["i18n: shown on the login page"]);
        assert_eq!(sign_in.references.len(), 2);
        assert_eq!(sign_in.references[0].path, "single_pages/login.php");
        assert_eq!(sign_in.references[0].line, Some(12));

        let result = &catalog.entries()[1];
        assert_eq!(result.plural.as_deref(), Some("Results"));

        let home = &catalog.entries()[2];
        assert_eq!(home.context.as_deref(), Some("MenuLabel"));
        assert_eq!(home.singular, "Home");
    }

    #[test]
    fn test_parse_multiline_strings() {
        let input = "msgid \"\"\n\"first \"\n\"second\"\nmsgstr \"\"\n";
        let catalog = parse(input).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].singular, "first second");
    }

    #[test]
    fn test_parse_skips_header() {
        let input = "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain\\n\"\n\nmsgid \"Hi\"\nmsgstr \"\"\n";
        let catalog = parse(input).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].singular, "Hi");
    }

    #[test]
    fn test_parse_unescapes() {
        let input = "msgid \"a\\n\\\"b\\\" \\\\ c\\td\"\nmsgstr \"\"\n";
        let catalog = parse(input).unwrap();
        assert_eq!(catalog.entries()[0].singular, "a\n\"b\" \\ c\td");
    }

    #[test]
    fn test_parse_reference_without_line() {
        let input = "#: blocks/page_list/templates/taxi\nmsgid \"Taxi\"\nmsgstr \"\"\n";
        let catalog = parse(input).unwrap();
        let reference = &catalog.entries()[0].references[0];
        assert_eq!(reference.path, "blocks/page_list/templates/taxi");
        assert_eq!(reference.line, None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse("msgid \"Hi\"\nnot a po line\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 2"), "unexpected error: {message}");
    }

    #[test]
    fn test_parse_rejects_unquoted_value() {
        assert!(parse("msgid Hi\n").is_err());
    }

    #[test]
    fn test_write_then_parse_preserves_entries() {
        let mut catalog = Catalog::new();
        let entry = catalog.insert(None, "Sign In");
        entry.add_reference("login.php", Some(12));
        entry.comments.push("i18n: login button".to_string());
        let entry = catalog.insert(None, "Result");
        entry.plural = Some("Results".to_string());
        entry.add_reference("search.php", Some(40));
        let entry = catalog.insert(Some("MenuLabel"), "Home");
        entry.add_reference("blocks/nav/templates/header", None);

        let parsed = parse(&to_pot_string(&catalog)).unwrap();
        assert_eq!(parsed.entries(), catalog.entries());
    }

    #[test]
    fn test_write_escapes_special_characters() {
        let mut catalog = Catalog::new();
        catalog.insert(None, "line\nbreak \"quoted\"");

        let text = to_pot_string(&catalog);
        assert!(text.contains(r#"msgid "line\nbreak \"quoted\"""#));

        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.entries()[0].singular, "line\nbreak \"quoted\"");
    }
}
