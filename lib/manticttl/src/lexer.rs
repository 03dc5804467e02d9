use crate::error::{LexError, TextPosition};
use memchr::{memchr2, memchr3};
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

/// A lexical token, together with its location in the input.
#[derive(Debug, Clone)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub location: Range<TextPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// `<...>`, unescaped but not resolved against the base IRI.
    IriRef(String),
    /// `prefix:local`, unescaped. `PNAME_NS` tokens have an empty local part.
    PrefixedName { prefix: &'a str, local: Cow<'a, str> },
    /// `_:label`.
    BlankNodeLabel(&'a str),
    /// `?name` (N3 only, always rejected downstream).
    Variable(&'a str),
    /// A string literal in any of the four quoting styles, unescaped.
    String(String),
    /// `@tag`. Also carries the `@prefix`/`@base`/`@forAll`/`@forSome` keywords,
    /// which are re-interpreted by the parser from statement position.
    LangTag(&'a str),
    Integer(&'a str),
    Decimal(&'a str),
    Double(&'a str),
    Punctuation(&'a str),
    /// A bare word like `a`, `true`, `GRAPH`, `PREFIX`...
    PlainKeyword(&'a str),
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IriRef(iri) => write!(f, "<{iri}>"),
            Self::PrefixedName { prefix, local } => write!(f, "{prefix}:{local}"),
            Self::BlankNodeLabel(label) => write!(f, "_:{label}"),
            Self::Variable(name) => write!(f, "?{name}"),
            Self::String(value) => write!(f, "\"{value}\""),
            Self::LangTag(tag) => write!(f, "@{tag}"),
            Self::Integer(value) | Self::Decimal(value) | Self::Double(value) => {
                write!(f, "{value}")
            }
            Self::Punctuation(value) | Self::PlainKeyword(value) => write!(f, "'{value}'"),
        }
    }
}

/// Restricts the lexical grammar for the line-oriented formats:
/// no single-quoted and no triple-quoted strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LexerMode {
    Terse,
    NQuads,
}

/// A whole-input tokenizer for the Turtle lexical grammar.
///
/// It is a pure function of the input and the current position: all parse-time
/// state (base IRI, prefixes, blank node labels) lives in the caller.
/// Whitespace and `#` comments are skipped and never surface as tokens.
pub(crate) struct Lexer<'a> {
    input: &'a str,
    cursor: usize,
    position: TextPosition,
    mode: LexerMode,
}

type Recognized<'a> = (Result<TokenKind<'a>, String>, usize);

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, mode: LexerMode) -> Self {
        Self {
            input,
            cursor: 0,
            position: TextPosition::START,
            mode,
        }
    }

    /// The position right after the last returned token.
    pub fn position(&self) -> TextPosition {
        self.position
    }

    pub fn next_token(&mut self) -> Option<Result<Token<'a>, LexError>> {
        self.skip_whitespace_and_comments();
        let rest = &self.input[self.cursor..];
        let first = *rest.as_bytes().first()?;
        let start = self.position;
        let (result, consumed) = match first {
            b'<' => self.recognize_iri_or_arrow(rest),
            b'_' => Self::recognize_blank_node_label(rest),
            b'"' => self.recognize_any_string(rest, b'"'),
            b'\'' if self.mode == LexerMode::Terse => self.recognize_any_string(rest, b'\''),
            b'@' => Self::recognize_lang_tag(rest),
            b'.' => match rest.as_bytes().get(1) {
                Some(b'0'..=b'9') => Self::recognize_number(rest),
                _ => (Ok(TokenKind::Punctuation(".")), 1),
            },
            b'^' => {
                if rest.as_bytes().get(1) == Some(&b'^') {
                    (Ok(TokenKind::Punctuation("^^")), 2)
                } else {
                    (Ok(TokenKind::Punctuation("^")), 1)
                }
            }
            b'=' => {
                if rest.as_bytes().get(1) == Some(&b'>') {
                    (Ok(TokenKind::Punctuation("=>")), 2)
                } else {
                    (Ok(TokenKind::Punctuation("=")), 1)
                }
            }
            b'(' | b')' | b'[' | b']' | b'{' | b'}' | b',' | b';' | b'!' => (
                Ok(TokenKind::Punctuation(
                    &rest[..1], // single ASCII char
                )),
                1,
            ),
            b'0'..=b'9' | b'+' | b'-' => Self::recognize_number(rest),
            b'?' => Self::recognize_variable(rest),
            _ => Self::recognize_pname_or_keyword(rest),
        };
        self.advance_str(&rest[..consumed]);
        let location = start..self.position;
        Some(match result {
            Ok(kind) => Ok(Token { kind, location }),
            Err(message) => Err(LexError { location, message }),
        })
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let bytes = &self.input.as_bytes()[self.cursor..];
            let mut i = 0;
            while let Some(b' ' | b'\t' | b'\r' | b'\n') = bytes.get(i) {
                i += 1;
            }
            let rest = &self.input[self.cursor..];
            self.advance_str(&rest[..i]);
            let rest = &self.input[self.cursor..];
            if rest.as_bytes().first() == Some(&b'#') {
                let end = memchr2(b'\r', b'\n', rest.as_bytes()).unwrap_or(rest.len());
                self.advance_str(&rest[..end]);
            } else {
                return;
            }
        }
    }

    fn advance_str(&mut self, s: &str) {
        for c in s.chars() {
            if c == '\n' {
                self.position.line += 1;
                self.position.column = 0;
            } else {
                self.position.column += 1;
            }
        }
        self.cursor += s.len();
        self.position.offset += s.len() as u64;
    }

    fn recognize_iri_or_arrow(&self, rest: &'a str) -> Recognized<'a> {
        match rest.as_bytes().get(1) {
            Some(b'<') => (Ok(TokenKind::Punctuation("<<")), 2),
            Some(b'=') => {
                // `<=` is the N3 backward implication operator, unless a valid
                // IRI like `<=foo>` starts here
                let iri = Self::recognize_iri(rest);
                if iri.0.is_ok() {
                    iri
                } else {
                    (Ok(TokenKind::Punctuation("<=")), 2)
                }
            }
            _ => Self::recognize_iri(rest),
        }
    }

    fn recognize_iri(rest: &'a str) -> Recognized<'a> {
        // [18] IRIREF  ::=  '<' ([^#x00-#x20<>"{}|^`\] | UCHAR)* '>'
        let bytes = rest.as_bytes();
        let mut string = String::new();
        let mut i = 1;
        loop {
            let Some(end) = memchr2(b'>', b'\\', &bytes[i..]) else {
                return (Err("unterminated IRI: missing '>'".into()), rest.len());
            };
            let chunk = &rest[i..i + end];
            if let Some(c) = chunk
                .chars()
                .find(|c| matches!(c, '\0'..=' ' | '<' | '"' | '{' | '}' | '|' | '^' | '`'))
            {
                return (
                    Err(format!(
                        "the character '{}' is not allowed in IRIs",
                        c.escape_debug()
                    )),
                    i + end + 1,
                );
            }
            string.push_str(chunk);
            i += end;
            match bytes[i] {
                b'>' => return (Ok(TokenKind::IriRef(string)), i + 1),
                _ => match Self::recognize_escape(&rest[i..], false) {
                    Ok((c, len)) => {
                        string.push(c);
                        i += len;
                    }
                    Err((message, len)) => return (Err(message), i + len),
                },
            }
        }
    }

    fn recognize_any_string(&self, rest: &'a str, delimiter: u8) -> Recognized<'a> {
        let bytes = rest.as_bytes();
        if self.mode == LexerMode::Terse
            && bytes.get(1) == Some(&delimiter)
            && bytes.get(2) == Some(&delimiter)
        {
            Self::recognize_long_string(rest, delimiter)
        } else {
            Self::recognize_string(rest, delimiter)
        }
    }

    fn recognize_string(rest: &'a str, delimiter: u8) -> Recognized<'a> {
        // [22] STRING_LITERAL_QUOTE         ::=  '"' ([^#x22#x5C#xA#xD] | ECHAR | UCHAR)* '"'
        // [23] STRING_LITERAL_SINGLE_QUOTE  ::=  "'" ([^#x27#x5C#xA#xD] | ECHAR | UCHAR)* "'"
        let bytes = rest.as_bytes();
        let mut string = String::new();
        let mut i = 1;
        loop {
            let Some(mut end) = memchr3(delimiter, b'\\', b'\n', &bytes[i..]) else {
                return (Err("unterminated string literal".into()), rest.len());
            };
            if let Some(jump) = memchr::memchr(b'\r', &bytes[i..i + end]) {
                end = jump;
            }
            string.push_str(&rest[i..i + end]);
            i += end;
            match bytes[i] {
                b'\n' | b'\r' => {
                    return (
                        Err("line jumps are not allowed in string literals, use \\n".into()),
                        i + 1,
                    );
                }
                b'\\' => match Self::recognize_escape(&rest[i..], true) {
                    Ok((c, len)) => {
                        string.push(c);
                        i += len;
                    }
                    Err((message, len)) => return (Err(message), i + len),
                },
                _ => return (Ok(TokenKind::String(string)), i + 1),
            }
        }
    }

    fn recognize_long_string(rest: &'a str, delimiter: u8) -> Recognized<'a> {
        // [24] STRING_LITERAL_LONG_SINGLE_QUOTE  ::=  "'''" (("'" | "''")? ([^'\] | ECHAR | UCHAR))* "'''"
        // [25] STRING_LITERAL_LONG_QUOTE         ::=  '"""' (('"' | '""')? ([^"\] | ECHAR | UCHAR))* '"""'
        let bytes = rest.as_bytes();
        let mut string = String::new();
        let mut i = 3;
        loop {
            let Some(end) = memchr2(delimiter, b'\\', &bytes[i..]) else {
                return (Err("unterminated long string literal".into()), rest.len());
            };
            string.push_str(&rest[i..i + end]);
            i += end;
            if bytes[i] == delimiter {
                if bytes.get(i + 1) == Some(&delimiter) && bytes.get(i + 2) == Some(&delimiter) {
                    return (Ok(TokenKind::String(string)), i + 3);
                }
                string.push(char::from(delimiter));
                i += 1;
            } else {
                match Self::recognize_escape(&rest[i..], true) {
                    Ok((c, len)) => {
                        string.push(c);
                        i += len;
                    }
                    Err((message, len)) => return (Err(message), i + len),
                }
            }
        }
    }

    /// Decodes one escape sequence starting at a `\`.
    ///
    /// Returns the decoded character and the number of consumed bytes.
    fn recognize_escape(rest: &str, with_echar: bool) -> Result<(char, usize), (String, usize)> {
        // [26]   UCHAR  ::=  '\u' HEX HEX HEX HEX | '\U' HEX HEX HEX HEX HEX HEX HEX HEX
        // [159s] ECHAR  ::=  '\' [tbnrf"'\]
        match rest.as_bytes().get(1) {
            Some(b'u') => Self::recognize_hex_char(rest, 4),
            Some(b'U') => Self::recognize_hex_char(rest, 8),
            Some(b't') if with_echar => Ok(('\t', 2)),
            Some(b'b') if with_echar => Ok(('\u{8}', 2)),
            Some(b'n') if with_echar => Ok(('\n', 2)),
            Some(b'r') if with_echar => Ok(('\r', 2)),
            Some(b'f') if with_echar => Ok(('\u{C}', 2)),
            Some(b'"') if with_echar => Ok(('"', 2)),
            Some(b'\'') if with_echar => Ok(('\'', 2)),
            Some(b'\\') if with_echar => Ok(('\\', 2)),
            Some(_) => {
                let c = rest[1..].chars().next().unwrap_or('\\');
                Err((
                    format!("unexpected escape character '\\{}'", c.escape_debug()),
                    1 + c.len_utf8(),
                ))
            }
            None => Err(("unexpected end of file in escape sequence".into(), 1)),
        }
    }

    fn recognize_hex_char(rest: &str, len: usize) -> Result<(char, usize), (String, usize)> {
        let Some(hex) = rest.get(2..2 + len) else {
            return Err((
                "unexpected end of file in escape sequence".into(),
                rest.len(),
            ));
        };
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err((
                format!("invalid escape sequence '\\{}{hex}'", &rest[1..2]),
                2 + len,
            ));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|e| (e.to_string(), 2 + len))?;
        match char::from_u32(value) {
            Some(c) => Ok((c, 2 + len)),
            None => Err((
                format!("invalid code point in escape sequence '\\{}{hex}'", &rest[1..2]),
                2 + len,
            )),
        }
    }

    fn recognize_lang_tag(rest: &'a str) -> Recognized<'a> {
        // [144s] LANGTAG  ::=  '@' [a-zA-Z]+ ('-' [a-zA-Z0-9]+)*
        let bytes = rest.as_bytes();
        let mut i = 1;
        while bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
            i += 1;
        }
        if i == 1 {
            return (
                Err("a language tag should always start with a letter".into()),
                1,
            );
        }
        while bytes.get(i) == Some(&b'-') {
            let subtag_start = i + 1;
            let mut j = subtag_start;
            while bytes.get(j).is_some_and(u8::is_ascii_alphanumeric) {
                j += 1;
            }
            if j == subtag_start {
                // the '-' is not part of the tag
                break;
            }
            i = j;
        }
        (Ok(TokenKind::LangTag(&rest[1..i])), i)
    }

    fn recognize_number(rest: &'a str) -> Recognized<'a> {
        // [19]   INTEGER   ::=  [+-]? [0-9]+
        // [20]   DECIMAL   ::=  [+-]? [0-9]* '.' [0-9]+
        // [21]   DOUBLE    ::=  [+-]? ([0-9]+ '.' [0-9]* EXPONENT | '.' [0-9]+ EXPONENT | [0-9]+ EXPONENT)
        // [154s] EXPONENT  ::=  [eE] [+-]? [0-9]+
        let bytes = rest.as_bytes();
        let mut i = 0;
        if let Some(b'+' | b'-') = bytes.first() {
            i += 1;
        }
        let count_before = Self::count_digits(&bytes[i..]);
        i += count_before;
        let count_after = if bytes.get(i) == Some(&b'.')
            && matches!(bytes.get(i + 1), Some(b'0'..=b'9' | b'e' | b'E'))
        {
            i += 1;
            let count_after = Self::count_digits(&bytes[i..]);
            i += count_after;
            Some(count_after)
        } else {
            None
        };
        if let Some(b'e' | b'E') = bytes.get(i) {
            i += 1;
            if let Some(b'+' | b'-') = bytes.get(i) {
                i += 1;
            }
            let count_exp = Self::count_digits(&bytes[i..]);
            i += count_exp;
            (
                if count_exp == 0 {
                    Err("a double exponent cannot be empty".into())
                } else if count_before == 0 && count_after.unwrap_or(0) == 0 {
                    Err("a double cannot be empty".into())
                } else {
                    Ok(TokenKind::Double(&rest[..i]))
                },
                i,
            )
        } else if let Some(count_after) = count_after {
            if count_after == 0 {
                // We do not consume the '.' after all
                i -= 1;
                (
                    if count_before == 0 {
                        Err("an integer cannot be empty".into())
                    } else {
                        Ok(TokenKind::Integer(&rest[..i]))
                    },
                    i,
                )
            } else {
                (Ok(TokenKind::Decimal(&rest[..i])), i)
            }
        } else {
            (
                if count_before == 0 {
                    Err("a number should contain at least one digit".into())
                } else {
                    Ok(TokenKind::Integer(&rest[..i]))
                },
                i.max(1),
            )
        }
    }

    fn count_digits(bytes: &[u8]) -> usize {
        bytes
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    }

    fn recognize_variable(rest: &'a str) -> Recognized<'a> {
        // [36] QUICK_VAR_NAME  ::=  "?" PN_LOCAL
        let mut i = 1;
        let mut first = true;
        for c in rest[1..].chars() {
            let valid = if first {
                is_pn_chars_u(c) || c.is_ascii_digit()
            } else {
                is_pn_chars(c)
            };
            if !valid {
                break;
            }
            first = false;
            i += c.len_utf8();
        }
        if i == 1 {
            (Err("a variable name cannot be empty".into()), 1)
        } else {
            (Ok(TokenKind::Variable(&rest[1..i])), i)
        }
    }

    fn recognize_blank_node_label(rest: &'a str) -> Recognized<'a> {
        // [141s] BLANK_NODE_LABEL  ::=  '_:' (PN_CHARS_U | [0-9]) ((PN_CHARS | '.')* PN_CHARS)?
        let bytes = rest.as_bytes();
        if bytes.get(1) != Some(&b':') {
            return (Err("a blank node label should start with '_:'".into()), 1);
        }
        let mut i = 2;
        let mut trailing_dots = 0;
        let mut first = true;
        for c in rest[2..].chars() {
            let valid = if first {
                is_pn_chars_u(c) || c.is_ascii_digit()
            } else if c == '.' {
                trailing_dots += 1;
                i += 1;
                continue;
            } else {
                is_pn_chars(c)
            };
            if !valid {
                break;
            }
            first = false;
            trailing_dots = 0;
            i += c.len_utf8();
        }
        i -= trailing_dots;
        if i == 2 {
            (Err("a blank node label cannot be empty".into()), 2)
        } else {
            (Ok(TokenKind::BlankNodeLabel(&rest[2..i])), i)
        }
    }

    fn recognize_pname_or_keyword(rest: &'a str) -> Recognized<'a> {
        // [139s] PNAME_NS   ::=  PN_PREFIX? ':'
        // [140s] PNAME_LN   ::=  PNAME_NS PN_LOCAL
        // [167s] PN_PREFIX  ::=  PN_CHARS_BASE ((PN_CHARS | '.')* PN_CHARS)?
        let mut i = 0;
        let mut colon = None;
        for c in rest.chars() {
            if c == ':' {
                colon = Some(i);
                break;
            }
            let valid = if i == 0 {
                is_pn_chars_base(c)
            } else {
                is_pn_chars(c) || c == '.'
            };
            if !valid {
                break;
            }
            i += c.len_utf8();
        }
        let Some(colon) = colon else {
            // A bare keyword like `a`, `true` or `GRAPH`
            let mut end = i;
            while rest[..end].ends_with('.') {
                end -= 1;
            }
            if end == 0 {
                let c = rest.chars().next().unwrap_or('\0');
                return (
                    Err(format!("unexpected character '{}'", c.escape_debug())),
                    c.len_utf8().max(1),
                );
            }
            return (Ok(TokenKind::PlainKeyword(&rest[..end])), end);
        };
        let prefix = &rest[..colon];
        if prefix.ends_with('.') {
            return (
                Err(format!(
                    "'{prefix}' is not a valid prefix: prefixes are not allowed to end with '.'"
                )),
                colon + 1,
            );
        }
        match Self::recognize_pn_local(&rest[colon + 1..]) {
            Ok((local, consumed)) => (
                Ok(TokenKind::PrefixedName { prefix, local }),
                colon + 1 + consumed,
            ),
            Err((message, consumed)) => (Err(message), colon + 1 + consumed),
        }
    }

    fn recognize_pn_local(rest: &'a str) -> Result<(Cow<'a, str>, usize), (String, usize)> {
        // [168s] PN_LOCAL  ::=  (PN_CHARS_U | ':' | [0-9] | PLX) ((PN_CHARS | '.' | ':' | PLX)* (PN_CHARS | ':' | PLX))?
        let bytes = rest.as_bytes();
        let mut i = 0;
        let mut buffer: Option<String> = None; // allocated only if there are escapes
        let mut copied_until = 0;
        let mut trailing_dots = 0;
        while let Some(c) = rest[i..].chars().next() {
            match c {
                '%' => {
                    let valid = matches!(bytes.get(i + 1), Some(b) if b.is_ascii_hexdigit())
                        && matches!(bytes.get(i + 2), Some(b) if b.is_ascii_hexdigit());
                    if !valid {
                        return Err((
                            "escapes in prefixed names should be '%' followed by two hexadecimal characters".into(),
                            i + 1,
                        ));
                    }
                    i += 3;
                    trailing_dots = 0;
                }
                '\\' => {
                    let Some(escaped) = rest[i + 1..].chars().next() else {
                        return Err(("unexpected end of file in escape sequence".into(), i + 1));
                    };
                    if !matches!(
                        escaped,
                        '_' | '~'
                            | '.'
                            | '-'
                            | '!'
                            | '$'
                            | '&'
                            | '\''
                            | '('
                            | ')'
                            | '*'
                            | '+'
                            | ','
                            | ';'
                            | '='
                            | '/'
                            | '?'
                            | '#'
                            | '@'
                            | '%'
                    ) {
                        return Err((
                            format!(
                                "the character '{}' cannot be escaped in a prefixed name",
                                escaped.escape_debug()
                            ),
                            i + 1 + escaped.len_utf8(),
                        ));
                    }
                    let buffer = buffer.get_or_insert_with(String::new);
                    buffer.push_str(&rest[copied_until..i]);
                    buffer.push(escaped);
                    i += 1 + escaped.len_utf8();
                    copied_until = i;
                    trailing_dots = 0;
                }
                '.' if i != 0 => {
                    i += 1;
                    trailing_dots += 1;
                }
                c if i == 0 && (is_pn_chars_u(c) || c == ':' || c.is_ascii_digit()) => {
                    i += c.len_utf8();
                }
                c if i != 0 && (is_pn_chars(c) || c == ':') => {
                    i += c.len_utf8();
                    trailing_dots = 0;
                }
                _ => break,
            }
        }
        let end = i - trailing_dots;
        Ok(if let Some(mut buffer) = buffer {
            buffer.push_str(&rest[copied_until..i]);
            for _ in 0..trailing_dots {
                buffer.pop();
            }
            (Cow::Owned(buffer), end)
        } else {
            (Cow::Borrowed(&rest[..end]), end)
        })
    }
}

pub(crate) fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

pub(crate) fn is_pn_chars_u(c: char) -> bool {
    c == '_' || is_pn_chars_base(c)
}

pub(crate) fn is_pn_chars(c: char) -> bool {
    matches!(c,
        '-' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
        || is_pn_chars_u(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<TokenKind<'_>> {
        let mut lexer = Lexer::new(input, LexerMode::Terse);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token() {
            tokens.push(token.expect("lexing should succeed").kind);
        }
        tokens
    }

    #[test]
    fn iri_with_escapes() {
        assert_eq!(
            tokens("<http://example.com/\\u00e9> ."),
            [
                TokenKind::IriRef("http://example.com/\u{e9}".into()),
                TokenKind::Punctuation("."),
            ]
        );
    }

    #[test]
    fn strings_in_all_quoting_styles() {
        assert_eq!(
            tokens("\"a\\tb\" 'c' \"\"\"multi\nline\"\" ok\"\"\" '''x'''"),
            [
                TokenKind::String("a\tb".into()),
                TokenKind::String("c".into()),
                TokenKind::String("multi\nline\"\" ok".into()),
                TokenKind::String("x".into()),
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokens("5 -1.5 .5 4.2e9 5. +3"),
            [
                TokenKind::Integer("5"),
                TokenKind::Decimal("-1.5"),
                TokenKind::Decimal(".5"),
                TokenKind::Double("4.2e9"),
                TokenKind::Integer("5"),
                TokenKind::Punctuation("."),
                TokenKind::Integer("+3"),
            ]
        );
    }

    #[test]
    fn pnames_and_keywords() {
        assert_eq!(
            tokens("ex:foo ex: a true rdf:type-x ex:a\\,b"),
            [
                TokenKind::PrefixedName {
                    prefix: "ex",
                    local: Cow::Borrowed("foo")
                },
                TokenKind::PrefixedName {
                    prefix: "ex",
                    local: Cow::Borrowed("")
                },
                TokenKind::PlainKeyword("a"),
                TokenKind::PlainKeyword("true"),
                TokenKind::PrefixedName {
                    prefix: "rdf",
                    local: Cow::Borrowed("type-x")
                },
                TokenKind::PrefixedName {
                    prefix: "ex",
                    local: Cow::Owned("a,b".into())
                },
            ]
        );
    }

    #[test]
    fn pname_trailing_dot_is_not_consumed() {
        assert_eq!(
            tokens("ex:foo."),
            [
                TokenKind::PrefixedName {
                    prefix: "ex",
                    local: Cow::Borrowed("foo")
                },
                TokenKind::Punctuation("."),
            ]
        );
    }

    #[test]
    fn blank_nodes_and_variables() {
        assert_eq!(
            tokens("_:b0. ?x"),
            [
                TokenKind::BlankNodeLabel("b0"),
                TokenKind::Punctuation("."),
                TokenKind::Variable("x"),
            ]
        );
    }

    #[test]
    fn directives_via_lang_tag() {
        assert_eq!(
            tokens("@prefix \"v\"@en-US"),
            [
                TokenKind::LangTag("prefix"),
                TokenKind::String("v".into()),
                TokenKind::LangTag("en-US"),
            ]
        );
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(
            tokens("# a comment\n\t 5 # trailing\n6"),
            [TokenKind::Integer("5"), TokenKind::Integer("6")]
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let mut lexer = Lexer::new("5\n  <http://a>", LexerMode::Terse);
        let first = lexer.next_token().unwrap().unwrap();
        assert_eq!(first.location.start.line, 0);
        assert_eq!(first.location.start.column, 0);
        let second = lexer.next_token().unwrap().unwrap();
        assert_eq!(second.location.start.line, 1);
        assert_eq!(second.location.start.column, 2);
        assert_eq!(second.location.end.column, 12);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut lexer = Lexer::new("\"abc", LexerMode::Terse);
        let error = lexer.next_token().unwrap().unwrap_err();
        assert!(error.message().contains("unterminated"));
    }

    #[test]
    fn single_quotes_are_rejected_in_nquads_mode() {
        let mut lexer = Lexer::new("'a'", LexerMode::NQuads);
        lexer.next_token().unwrap().unwrap_err();
    }
}
