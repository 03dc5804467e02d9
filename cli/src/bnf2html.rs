//! Renders an EBNF grammar description as a standalone HTML page.
//!
//! The input is a plain-text grammar in the W3C notation: one production per
//! rule, `[id] name ::= expression`, with the expression possibly continued
//! on the following lines and `#` lines treated as prose comments. This is a
//! pure text-to-text transform, independent of the RDF data path.

use std::collections::HashSet;
use std::fmt::Write;

struct Production {
    id: Option<String>,
    name: String,
    expression: String,
}

enum Item {
    Production(Production),
    Comment(String),
}

pub fn render(input: &str, title: &str) -> String {
    let items = parse_items(input);
    let names: HashSet<&str> = items
        .iter()
        .filter_map(|item| match item {
            Item::Production(p) => Some(p.name.as_str()),
            Item::Comment(_) => None,
        })
        .collect();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(title));
    html.push_str(
        "<style>\n\
         table { border-collapse: collapse; }\n\
         td { padding: 0.2em 0.6em; vertical-align: top; font-family: monospace; }\n\
         td.id { color: #888; }\n\
         </style>\n</head>\n<body>\n",
    );
    let _ = writeln!(html, "<h1>{}</h1>", escape(title));
    html.push_str("<table>\n");
    for item in &items {
        match item {
            Item::Production(p) => {
                let _ = writeln!(
                    html,
                    "<tr id=\"{name}\"><td class=\"id\">{id}</td>\
                     <td><a href=\"#{name}\">{name}</a></td>\
                     <td>::=</td><td>{expression}</td></tr>",
                    name = escape(&p.name),
                    id = escape(p.id.as_deref().unwrap_or("")),
                    expression = link_expression(&p.expression, &names),
                );
            }
            Item::Comment(text) => {
                let _ = writeln!(
                    html,
                    "<tr><td></td><td colspan=\"3\">{}</td></tr>",
                    escape(text)
                );
            }
        }
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn parse_items(input: &str) -> Vec<Item> {
    let mut items = Vec::new();
    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix('#') {
            items.push(Item::Comment(comment.trim().to_owned()));
            continue;
        }
        if let Some((head, expression)) = trimmed.split_once("::=") {
            let head = head.trim();
            let (id, name) = match head.strip_prefix('[') {
                Some(rest) => match rest.split_once(']') {
                    Some((id, name)) => (Some(id.trim().to_owned()), name.trim()),
                    None => (None, head),
                },
                None => (None, head),
            };
            items.push(Item::Production(Production {
                id,
                name: name.to_owned(),
                expression: expression.trim().to_owned(),
            }));
        } else if let Some(Item::Production(last)) = items.last_mut() {
            // continuation of the previous expression
            last.expression.push(' ');
            last.expression.push_str(trimmed);
        } else {
            items.push(Item::Comment(trimmed.to_owned()));
        }
    }
    items
}

/// Escapes the expression and wraps every reference to a known production in
/// a link to its definition. Identifiers inside quoted terminals stay plain.
fn link_expression(expression: &str, names: &HashSet<&str>) -> String {
    let mut out = String::new();
    let mut chars = expression.char_indices().peekable();
    let mut quote: Option<char> = None;
    let mut word_start: Option<usize> = None;

    let flush_word = |out: &mut String, word: &str, in_quote: bool| {
        if !in_quote && names.contains(word) {
            let escaped = escape(word);
            let _ = write!(out, "<a href=\"#{escaped}\">{escaped}</a>");
        } else {
            out.push_str(&escape(word));
        }
    };

    while let Some((i, c)) = chars.next() {
        let is_word_char = c.is_alphanumeric() || c == '_';
        if is_word_char {
            if word_start.is_none() {
                word_start = Some(i);
            }
            if chars.peek().is_none() {
                let start = word_start.take().unwrap_or(i);
                flush_word(&mut out, &expression[start..i + c.len_utf8()], quote.is_some());
            }
            continue;
        }
        if let Some(start) = word_start.take() {
            flush_word(&mut out, &expression[start..i], quote.is_some());
        }
        match quote {
            Some(q) if c == q => quote = None,
            None if c == '\'' || c == '"' => quote = Some(c),
            _ => (),
        }
        out.push_str(&escape_char(c));
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        out.push_str(&escape_char(c));
    }
    out
}

fn escape_char(c: char) -> String {
    match c {
        '&' => "&amp;".to_owned(),
        '<' => "&lt;".to_owned(),
        '>' => "&gt;".to_owned(),
        '"' => "&quot;".to_owned(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn productions_get_anchors_and_links() {
        let html = render(
            "[1] doc ::= statement*\n[2] statement ::= doc '.'\n",
            "Test",
        );
        assert!(html.contains("<tr id=\"doc\">"));
        assert!(html.contains("<tr id=\"statement\">"));
        assert!(html.contains("<a href=\"#doc\">doc</a>"));
    }

    #[test]
    fn quoted_terminals_are_not_linked() {
        let html = render("[1] doc ::= 'doc'\n", "Test");
        assert!(!html.contains("'<a href=\"#doc\">"));
        assert!(html.contains("'doc'"));
    }

    #[test]
    fn markup_is_escaped() {
        let html = render("[1] iri ::= '<' char* '>'\n", "A <title> & more");
        assert!(html.contains("A &lt;title&gt; &amp; more"));
        assert!(html.contains("'&lt;'"));
        assert!(html.contains("'&gt;'"));
    }

    #[test]
    fn continuation_lines_are_joined() {
        let html = render("[1] doc ::= a\n    | b\n[2] a ::= 'x'\n[3] b ::= 'y'\n", "T");
        assert!(html.contains("<a href=\"#a\">a</a> | <a href=\"#b\">b</a>"));
    }

    #[test]
    fn comment_lines_become_prose_rows() {
        let html = render("# All about docs\n[1] doc ::= 'd'\n", "T");
        assert!(html.contains("<td colspan=\"3\">All about docs</td>"));
    }
}
