//! An [N-Quads](https://www.w3.org/TR/n-quads/) parser implemented by [`NQuadsParser`]
//! and a serializer implemented by [`NQuadsSerializer`].

use crate::error::{
    LexError, ResolutionError, SyntaxError, TextPosition, TurtleError, TurtleParseError,
};
use crate::lexer::{Lexer, LexerMode, Token, TokenKind};
use crate::turtle::str_from_utf8;
use manticrdf::{
    BlankNode, BlankNodeRef, Dataset, GraphName, GraphNameRef, Literal, NamedNode,
    NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadRef, Term, TermRef,
};
use oxiri::Iri;
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::ops::Range;

/// A parser for [N-Quads](https://www.w3.org/TR/n-quads/) and its
/// [N-Triples](https://www.w3.org/TR/n-triples/) subset.
///
/// All IRIs must be absolute; prefixes, relative IRIs and the Turtle shorthand
/// notations are not part of these line-oriented grammars.
///
/// ```
/// use manticttl::NQuadsParser;
///
/// let file = "<http://example.com/s> <http://example.com/p> \"v\" <http://example.com/g> .
/// <http://example.com/s> <http://example.com/p> _:b0 .";
///
/// let dataset = NQuadsParser::new().parse_str(file)?;
/// assert_eq!(2, dataset.len());
/// # Result::<_,Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct NQuadsParser {
    default_graph: GraphName,
}

impl NQuadsParser {
    /// Builds a new [`NQuadsParser`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a graph to the statements that carry no graph label of their own.
    #[inline]
    pub fn with_default_graph(mut self, graph_name: impl Into<GraphName>) -> Self {
        self.default_graph = graph_name.into();
        self
    }

    /// Parses a whole document, all-or-nothing.
    pub fn parse_str(&self, input: &str) -> Result<Dataset, TurtleError> {
        LineFormatParser {
            lexer: Lexer::new(input, LexerMode::NQuads),
            peeked: None,
            bnode_labels: HashMap::new(),
            default_graph: self.default_graph.clone(),
            dataset: Dataset::new(),
        }
        .parse()
    }

    /// Parses a whole document from a [`Read`] implementation.
    pub fn parse_reader(&self, mut reader: impl Read) -> Result<Dataset, TurtleParseError> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let input = str_from_utf8(&buffer)?;
        Ok(self.parse_str(input)?)
    }
}

struct LineFormatParser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token<'a>>,
    bnode_labels: HashMap<String, BlankNode>,
    default_graph: GraphName,
    dataset: Dataset,
}

impl<'a> LineFormatParser<'a> {
    // [1] nquadsDoc  ::=  statement? (EOL statement)* EOL?
    // [2] statement  ::=  subject predicate object graphLabel? '.'
    fn parse(mut self) -> Result<Dataset, TurtleError> {
        while let Some(token) = self.next()? {
            let subject = self.parse_subject(token)?;
            let token = self.expect("a predicate IRI")?;
            let predicate = match token.kind {
                TokenKind::IriRef(iri) => self.validate_iri(iri, &token.location)?,
                _ => return Err(syntax_error(&token, "a predicate IRI")),
            };
            let token = self.expect("an object")?;
            let object = self.parse_object(token)?;
            let token = self.expect("a graph label or '.'")?;
            let (graph_name, token) = match token.kind {
                TokenKind::IriRef(iri) => {
                    let name = self.validate_iri(iri, &token.location)?;
                    (name.into(), self.expect("'.'")?)
                }
                TokenKind::BlankNodeLabel(label) => {
                    let name = self.blank_node_for_label(label);
                    (name.into(), self.expect("'.'")?)
                }
                _ => (self.default_graph.clone(), token),
            };
            if token.kind != TokenKind::Punctuation(".") {
                return Err(syntax_error(&token, "'.'"));
            }
            self.dataset.extend([Quad {
                subject,
                predicate,
                object,
                graph_name,
            }]);
        }
        Ok(self.dataset)
    }

    fn parse_subject(&mut self, token: Token<'a>) -> Result<NamedOrBlankNode, TurtleError> {
        match token.kind {
            TokenKind::IriRef(iri) => Ok(self.validate_iri(iri, &token.location)?.into()),
            TokenKind::BlankNodeLabel(label) => Ok(self.blank_node_for_label(label).into()),
            _ => Err(syntax_error(&token, "a subject IRI or blank node")),
        }
    }

    fn parse_object(&mut self, token: Token<'a>) -> Result<Term, TurtleError> {
        match token.kind {
            TokenKind::IriRef(iri) => Ok(self.validate_iri(iri, &token.location)?.into()),
            TokenKind::BlankNodeLabel(label) => Ok(self.blank_node_for_label(label).into()),
            TokenKind::String(value) => {
                let is_lang_tag = matches!(
                    self.peek()?,
                    Some(Token {
                        kind: TokenKind::LangTag(_),
                        ..
                    })
                );
                if is_lang_tag {
                    let token = self.expect("a language tag")?;
                    let TokenKind::LangTag(tag) = token.kind else {
                        unreachable!("peeked a language tag");
                    };
                    let tag = oxilangtag::LanguageTag::parse(tag).map_err(|e| {
                        TurtleError::from(LexError {
                            location: token.location,
                            message: format!("invalid language tag '{tag}': {e}"),
                        })
                    })?;
                    return Ok(Literal::new_language_tagged_literal_unchecked(
                        value,
                        tag.as_str().to_ascii_lowercase(),
                    )
                    .into());
                }
                let has_datatype = matches!(
                    self.peek()?,
                    Some(Token {
                        kind: TokenKind::Punctuation("^^"),
                        ..
                    })
                );
                if has_datatype {
                    self.next()?;
                    let token = self.expect("a datatype IRI")?;
                    let iri = match token.kind {
                        TokenKind::IriRef(iri) => iri,
                        _ => return Err(syntax_error(&token, "a datatype IRI")),
                    };
                    let datatype = self.validate_iri(iri, &token.location)?;
                    return Ok(Literal::new_typed_literal(value, datatype).into());
                }
                Ok(Literal::new_simple_literal(value).into())
            }
            _ => Err(syntax_error(&token, "an object")),
        }
    }

    fn validate_iri(
        &self,
        iri: String,
        location: &Range<TextPosition>,
    ) -> Result<NamedNode, TurtleError> {
        Iri::parse(iri.as_str()).map_err(|e| {
            TurtleError::from(ResolutionError {
                location: location.clone(),
                message: format!("<{iri}> is not a valid absolute IRI: {e}"),
            })
        })?;
        Ok(NamedNode::new_unchecked(iri))
    }

    fn blank_node_for_label(&mut self, label: &str) -> BlankNode {
        self.bnode_labels
            .entry(label.to_owned())
            .or_default()
            .clone()
    }

    fn peek(&mut self) -> Result<Option<&Token<'a>>, TurtleError> {
        // The line formats need no real lookahead buffer: the only optional
        // pieces (language tag, datatype, graph label) directly follow the
        // token that announces them, so a one-token buffer inside the
        // iterator methods below is enough.
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token().transpose()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn next(&mut self) -> Result<Option<Token<'a>>, TurtleError> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }
        Ok(self.lexer.next_token().transpose()?)
    }

    fn expect(&mut self, expected: &str) -> Result<Token<'a>, TurtleError> {
        match self.next()? {
            Some(token) => Ok(token),
            None => {
                let position = self.lexer.position();
                Err(SyntaxError {
                    location: position..position,
                    expected: expected.to_owned(),
                    found: "the end of the file".to_owned(),
                }
                .into())
            }
        }
    }
}

fn syntax_error(token: &Token<'_>, expected: &str) -> TurtleError {
    SyntaxError {
        location: token.location.clone(),
        expected: expected.to_owned(),
        found: token.kind.to_string(),
    }
    .into()
}

/// An [N-Quads](https://www.w3.org/TR/n-quads/) serializer.
///
/// [`serialize_dataset`](NQuadsSerializer::serialize_dataset) writes the canonical
/// projection of a dataset: one line per quad in the canonical order, IRIs fully
/// expanded, and every blank node relabeled to `b0`, `b1`, ... in order of first
/// appearance in the output. The output is parseable by [`NQuadsParser`] and
/// yields back an equal dataset, up to blank node relabeling.
///
/// ```
/// use manticrdf::{NamedNodeRef, QuadRef};
/// use manticttl::NQuadsSerializer;
///
/// let mut serializer = NQuadsSerializer::new().serialize_to_writer(Vec::new());
/// serializer.write_quad(QuadRef::new(
///     NamedNodeRef::new("http://example.com#me")?,
///     NamedNodeRef::new("http://www.w3.org/1999/02/22-rdf-syntax-ns#type")?,
///     NamedNodeRef::new("http://schema.org/Person")?,
///     NamedNodeRef::new("http://example.com")?,
/// ))?;
/// assert_eq!(
///     b"<http://example.com#me> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Person> <http://example.com> .\n",
///     serializer.finish().as_slice()
/// );
/// # Result::<_,Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct NQuadsSerializer;

impl NQuadsSerializer {
    /// Builds a new [`NQuadsSerializer`].
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Writes quads one by one to a [`Write`] implementation, keeping their
    /// blank node labels as they are.
    pub fn serialize_to_writer<W: Write>(self, writer: W) -> WriterNQuadsSerializer<W> {
        WriterNQuadsSerializer { writer }
    }

    /// Writes the canonical N-Quads projection of a whole dataset.
    ///
    /// The dataset's iteration order is already the canonical one; this pass
    /// only rewrites blank node labels so that the output never clashes with
    /// labels from other documents.
    pub fn serialize_dataset(
        &self,
        dataset: &Dataset,
        mut writer: impl Write,
    ) -> io::Result<()> {
        let mut blank_labels: HashMap<String, usize> = HashMap::new();
        for quad in dataset {
            self.write_canonical_quad(quad, &mut blank_labels, &mut writer)?;
        }
        Ok(())
    }

    fn write_canonical_quad(
        &self,
        quad: QuadRef<'_>,
        blank_labels: &mut HashMap<String, usize>,
        writer: &mut impl Write,
    ) -> io::Result<()> {
        match quad.subject {
            NamedOrBlankNodeRef::NamedNode(node) => write!(writer, "{node}")?,
            NamedOrBlankNodeRef::BlankNode(node) => {
                write!(writer, "_:b{}", relabel(blank_labels, node))?;
            }
        }
        write!(writer, " {} ", quad.predicate)?;
        match quad.object {
            TermRef::NamedNode(node) => write!(writer, "{node}")?,
            TermRef::BlankNode(node) => write!(writer, "_:b{}", relabel(blank_labels, node))?,
            TermRef::Literal(literal) => write!(writer, "{literal}")?,
        }
        match quad.graph_name {
            GraphNameRef::NamedNode(node) => write!(writer, " {node}")?,
            GraphNameRef::BlankNode(node) => {
                write!(writer, " _:b{}", relabel(blank_labels, node))?;
            }
            GraphNameRef::DefaultGraph => (),
        }
        writeln!(writer, " .")
    }
}

fn relabel(blank_labels: &mut HashMap<String, usize>, node: BlankNodeRef<'_>) -> usize {
    let next = blank_labels.len();
    *blank_labels.entry(node.as_str().to_owned()).or_insert(next)
}

/// Writes quads to a [`Write`] implementation. Can be built using
/// [`NQuadsSerializer::serialize_to_writer`].
#[must_use]
pub struct WriterNQuadsSerializer<W: Write> {
    writer: W,
}

impl<W: Write> WriterNQuadsSerializer<W> {
    /// Writes an extra quad.
    pub fn write_quad<'a>(&mut self, quad: impl Into<QuadRef<'a>>) -> io::Result<()> {
        writeln!(self.writer, "{} .", quad.into())
    }

    /// Ends the write process and returns the underlying [`Write`].
    pub fn finish(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TurtleParser;
    use manticrdf::vocab::rdf;

    fn serialize(dataset: &Dataset) -> String {
        let mut buffer = Vec::new();
        NQuadsSerializer::new()
            .serialize_dataset(dataset, &mut buffer)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn parse_lines_with_and_without_graphs() {
        let dataset = NQuadsParser::new()
            .parse_str(
                "<http://example.com/s> <http://example.com/p> \"v\"@en <http://example.com/g> .
                <http://example.com/s> <http://example.com/p> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> .
                _:b0 <http://example.com/p> _:b1 _:b0 .",
            )
            .unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.graph_names().count(), 3);
    }

    #[test]
    fn relative_iris_are_rejected() {
        let error = NQuadsParser::new()
            .parse_str("<s> <http://example.com/p> <http://example.com/o> .")
            .unwrap_err();
        assert!(matches!(error, TurtleError::Resolution(_)));
    }

    #[test]
    fn turtle_shorthand_is_rejected() {
        NQuadsParser::new()
            .parse_str("<http://example.com/s> a <http://example.com/C> .")
            .unwrap_err();
        NQuadsParser::new()
            .parse_str("<http://example.com/s> <http://example.com/p> 5 .")
            .unwrap_err();
    }

    #[test]
    fn missing_dot_is_a_syntax_error() {
        let error = NQuadsParser::new()
            .parse_str("<http://example.com/s> <http://example.com/p> <http://example.com/o>")
            .unwrap_err();
        let TurtleError::Syntax(e) = error else {
            panic!("expected a syntax error");
        };
        assert_eq!(e.found(), "the end of the file");
    }

    #[test]
    fn canonical_output_is_sorted_and_expanded() {
        let document = TurtleParser::new()
            .parse_str(
                "@prefix ex: <http://example.com/> .
                ex:g { ex:s2 ex:p \"b\" . }
                ex:s1 ex:p \"a\" .",
            )
            .unwrap();
        assert_eq!(
            serialize(document.dataset()),
            "<http://example.com/s1> <http://example.com/p> \"a\" .\n\
             <http://example.com/s2> <http://example.com/p> \"b\" <http://example.com/g> .\n"
        );
    }

    #[test]
    fn canonical_output_relabels_blank_nodes() {
        let document = TurtleParser::new()
            .parse_str(
                "@prefix ex: <http://example.com/> .
                _:node ex:p _:node .",
            )
            .unwrap();
        assert_eq!(
            serialize(document.dataset()),
            "_:b0 <http://example.com/p> _:b0 .\n"
        );
    }

    #[test]
    fn canonical_output_escapes_literals() {
        let document = TurtleParser::new()
            .parse_str(
                "<http://example.com/s> <http://example.com/p> \"\"\"a\"quote\nnewline\ttab\\\\backslash\"\"\" .",
            )
            .unwrap();
        assert_eq!(
            serialize(document.dataset()),
            "<http://example.com/s> <http://example.com/p> \"a\\\"quote\\nnewline\\ttab\\\\backslash\" .\n"
        );
    }

    #[test]
    fn round_trip_through_canonical_nquads() {
        let document = TurtleParser::new()
            .parse_str(
                "@prefix ex: <http://example.com/> .
                @base <http://example.com/> .
                ex:g {
                    <s> a ex:Person ;
                        ex:knows [ ex:name \"caf\\u00e9\"@fr ] ;
                        ex:list ( 1 2.5 \"x\" ) .
                }
                <s2> ex:p \"plain\" .",
            )
            .unwrap();
        let first = serialize(document.dataset());
        let reparsed = NQuadsParser::new().parse_str(&first).unwrap();
        assert_eq!(reparsed.len(), document.dataset().len());
        // the graph partition survives
        assert_eq!(
            reparsed.graph_names().count(),
            document.dataset().graph_names().count()
        );
        // non-blank statements survive byte for byte
        let second = serialize(&reparsed);
        let stable = |s: &str| {
            s.lines()
                .filter(|l| !l.contains("_:"))
                .map(str::to_owned)
                .collect::<Vec<_>>()
        };
        assert_eq!(stable(&first), stable(&second));
        // the collection structure survives relabeling
        assert_eq!(
            reparsed
                .iter()
                .filter(|q| q.predicate == rdf::FIRST)
                .count(),
            3
        );
        assert_eq!(
            reparsed.iter().filter(|q| q.predicate == rdf::REST).count(),
            3
        );
    }

    #[test]
    fn writer_serializer_keeps_labels() {
        let mut serializer = NQuadsSerializer::new().serialize_to_writer(Vec::new());
        serializer
            .write_quad(QuadRef::new(
                BlankNodeRef::new_unchecked("keep"),
                manticrdf::NamedNodeRef::new_unchecked("http://example.com/p"),
                BlankNodeRef::new_unchecked("keep"),
                GraphNameRef::DefaultGraph,
            ))
            .unwrap();
        assert_eq!(
            String::from_utf8(serializer.finish()).unwrap(),
            "_:keep <http://example.com/p> _:keep .\n"
        );
    }
}
