//! A [Turtle](https://www.w3.org/TR/turtle/) parser implemented by [`TurtleParser`].
//!
//! It also covers TriG-style named-graph blocks and the Turtle subset of
//! [Notation3](https://w3c.github.io/N3/spec/).

use crate::error::{LexError, TextPosition, TurtleError, TurtleParseError};
use crate::terse::TerseParser;
use manticrdf::{Dataset, GraphName};
use oxiri::{Iri, IriParseError};
use std::collections::hash_map;
use std::collections::HashMap;
use std::io::Read;

/// A parser for the [Turtle](https://www.w3.org/TR/turtle/) family of syntaxes:
/// Turtle itself, TriG-style named-graph blocks (`GRAPH <g> { ... }`, `<g> { ... }`
/// and bare `{ ... }` for the default graph) and the Turtle subset of N3.
///
/// The parse is all-or-nothing: it returns either a [`ParsedDocument`] holding
/// every statement of the document, or the first error. N3-only constructs
/// (formulas, variables, implication operators, quantifiers) are rejected with
/// [`UnsupportedConstruct`](crate::UnsupportedConstruct).
///
/// Count the number of people:
/// ```
/// use manticrdf::{vocab::rdf, NamedNodeRef, TermRef};
/// use manticttl::TurtleParser;
///
/// let file = "@base <http://example.com/> .
/// @prefix schema: <http://schema.org/> .
/// <foo> a schema:Person ;
///     schema:name \"Foo\" .
/// <bar> a schema:Person ;
///     schema:name \"Bar\" .";
///
/// let schema_person = NamedNodeRef::new("http://schema.org/Person")?;
/// let document = TurtleParser::new().parse_str(file)?;
/// let count = document
///     .dataset()
///     .iter()
///     .filter(|q| q.predicate == rdf::TYPE && q.object == TermRef::from(schema_person))
///     .count();
/// assert_eq!(2, count);
/// # Result::<_,Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Default, Clone)]
#[must_use]
pub struct TurtleParser {
    base: Option<Iri<String>>,
    prefixes: HashMap<String, Iri<String>>,
    default_graph: GraphName,
}

impl TurtleParser {
    /// Builds a new [`TurtleParser`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base IRI relative IRIs are resolved against until the first
    /// `@base`/`BASE` directive.
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.base = Some(Iri::parse(base_iri.into())?);
        Ok(self)
    }

    /// Declares a prefix binding that is in scope from the start of the document.
    ///
    /// An in-document `@prefix`/`PREFIX` declaration with the same name overrides it.
    #[inline]
    pub fn with_prefix(
        mut self,
        prefix_name: impl Into<String>,
        prefix_iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        self.prefixes
            .insert(prefix_name.into(), Iri::parse(prefix_iri.into())?);
        Ok(self)
    }

    /// Assigns a graph to the statements that carry no graph annotation of their own.
    #[inline]
    pub fn with_default_graph(mut self, graph_name: impl Into<GraphName>) -> Self {
        self.default_graph = graph_name.into();
        self
    }

    /// Parses a whole document, all-or-nothing.
    pub fn parse_str(&self, input: &str) -> Result<ParsedDocument, TurtleError> {
        let parser = TerseParser::new(
            input,
            self.base.clone(),
            self.prefixes.clone(),
            self.default_graph.clone(),
        );
        let (dataset, context) = parser.parse()?;
        Ok(ParsedDocument {
            dataset,
            base_iri: context.base_iri,
            prefixes: context.prefixes,
        })
    }

    /// Parses a whole document from a [`Read`] implementation.
    ///
    /// The reader is drained before parsing starts: parsing is synchronous and
    /// not interruptible at sub-document granularity.
    pub fn parse_reader(&self, mut reader: impl Read) -> Result<ParsedDocument, TurtleParseError> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let input = str_from_utf8(&buffer)?;
        Ok(self.parse_str(input)?)
    }
}

/// Checks UTF-8 validity, reporting the offending position the way the lexer does.
pub(crate) fn str_from_utf8(buffer: &[u8]) -> Result<&str, TurtleError> {
    std::str::from_utf8(buffer).map_err(|e| {
        let valid = &buffer[..e.valid_up_to()];
        let mut position = TextPosition::START;
        for byte in valid {
            if *byte == b'\n' {
                position.line += 1;
                position.column = 0;
            } else if !is_utf8_continuation(*byte) {
                position.column += 1;
            }
        }
        position.offset = valid.len() as u64;
        LexError {
            location: position..position,
            message: format!("invalid UTF-8: {e}"),
        }
        .into()
    })
}

fn is_utf8_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// The result of a successful parse: the dataset plus the terminal parse context
/// (the prefix table and base IRI as they stood at the end of the document).
#[derive(Debug)]
pub struct ParsedDocument {
    pub(crate) dataset: Dataset,
    pub(crate) base_iri: Option<Iri<String>>,
    pub(crate) prefixes: HashMap<String, Iri<String>>,
}

impl ParsedDocument {
    /// The parsed statements.
    #[inline]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Extracts the parsed statements.
    #[inline]
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// The base IRI active at the end of the document, if any.
    #[inline]
    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_ref().map(Iri::as_str)
    }

    /// The prefix bindings active at the end of the document.
    pub fn prefixes(&self) -> Prefixes<'_> {
        Prefixes {
            inner: self.prefixes.iter(),
        }
    }
}

/// Iterator over the prefix bindings of a [`ParsedDocument`].
pub struct Prefixes<'a> {
    inner: hash_map::Iter<'a, String, Iri<String>>,
}

impl<'a> Iterator for Prefixes<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let (name, iri) = self.inner.next()?;
        Some((name.as_str(), iri.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manticrdf::vocab::rdf;
    use manticrdf::{
        GraphNameRef, Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef,
        Quad, Term, TermRef,
    };

    fn parse(input: &str) -> Dataset {
        TurtleParser::new()
            .parse_str(input)
            .expect("parsing should succeed")
            .into_dataset()
    }

    #[test]
    fn base_resolution_applies_forward_only() {
        let dataset = parse(
            "@base <http://example.org/> .
            <foo> <p> <o> .
            @base <http://example.org/sub/> .
            <bar> <p> <o> .",
        );
        let subjects: Vec<_> = dataset.iter().map(|q| q.subject.to_string()).collect();
        assert!(subjects.contains(&"<http://example.org/foo>".to_owned()));
        assert!(subjects.contains(&"<http://example.org/sub/bar>".to_owned()));
    }

    #[test]
    fn prefix_redefinition_is_not_retroactive() {
        let dataset = parse(
            "@prefix ex: <http://one.example/> .
            ex:a ex:p ex:o .
            @prefix ex: <http://two.example/> .
            ex:a ex:p ex:o .",
        );
        assert_eq!(dataset.len(), 2);
        let subjects: Vec<_> = dataset.iter().map(|q| q.subject.to_string()).collect();
        assert_eq!(
            subjects,
            ["<http://one.example/a>", "<http://two.example/a>"]
        );
    }

    #[test]
    fn sparql_style_directives_take_no_dot() {
        let dataset = parse(
            "PREFIX ex: <http://example.com/>
            BASE <http://example.com/>
            ex:s ex:p <o> .",
        );
        assert_eq!(dataset.len(), 1);
        let quad = dataset.iter().next().unwrap();
        assert_eq!(quad.object.to_string(), "<http://example.com/o>");
    }

    #[test]
    fn undeclared_prefix_is_a_resolution_error() {
        let error = TurtleParser::new()
            .parse_str("ex:foo <http://example.com/p> <http://example.com/o> .")
            .unwrap_err();
        assert!(matches!(error, TurtleError::Resolution(_)));
        assert!(error.to_string().contains("'ex:'"));
    }

    #[test]
    fn relative_iri_without_base_is_a_resolution_error() {
        let error = TurtleParser::new()
            .parse_str("<foo> <http://example.com/p> <http://example.com/o> .")
            .unwrap_err();
        assert!(matches!(error, TurtleError::Resolution(_)));
    }

    #[test]
    fn labeled_blank_nodes_share_one_identity() {
        let dataset = parse(
            "_:b0 <http://example.com/p> <http://example.com/o1> .
            _:b0 <http://example.com/p> <http://example.com/o2> .",
        );
        assert_eq!(dataset.len(), 2);
        let subjects: Vec<_> = dataset.iter().map(|q| q.subject.into_owned()).collect();
        assert_eq!(subjects[0], subjects[1]);
    }

    #[test]
    fn anonymous_blank_nodes_are_all_distinct() {
        let dataset = parse(
            "[] <http://example.com/p> <http://example.com/o1> .
            [] <http://example.com/p> <http://example.com/o2> .",
        );
        assert_eq!(dataset.len(), 2);
        let subjects: Vec<_> = dataset.iter().map(|q| q.subject.into_owned()).collect();
        assert_ne!(subjects[0], subjects[1]);
    }

    #[test]
    fn labeled_blank_nodes_do_not_leak_across_parses() {
        let input = "_:b0 <http://example.com/p> <http://example.com/o> .";
        let first = parse(input).iter().next().unwrap().subject.into_owned();
        let second = parse(input).iter().next().unwrap().subject.into_owned();
        assert_ne!(first, second);
    }

    #[test]
    fn a_keyword_expands_to_rdf_type() {
        let dataset = parse("<http://example.com/s> a <http://example.com/C> .");
        let quad = dataset.iter().next().unwrap();
        assert_eq!(quad.predicate, rdf::TYPE);
    }

    #[test]
    fn predicate_object_and_object_lists() {
        let dataset = parse(
            "<http://example.com/s> <http://example.com/p1> <http://example.com/o1> , <http://example.com/o2> ;
                <http://example.com/p2> <http://example.com/o3> ;
                .",
        );
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn collection_desugars_to_first_rest_nil() {
        let dataset = parse(
            "<http://example.com/s> <http://example.com/p> ( <http://example.com/a> <http://example.com/b> ) .",
        );
        // one triple for the subject, two first and two rest links
        assert_eq!(dataset.len(), 5);
        let firsts: Vec<_> = dataset
            .iter()
            .filter(|q| q.predicate == rdf::FIRST)
            .map(|q| q.object.to_string())
            .collect();
        assert_eq!(firsts.len(), 2);
        assert!(firsts.contains(&"<http://example.com/a>".to_owned()));
        assert!(firsts.contains(&"<http://example.com/b>".to_owned()));
        let rests: Vec<_> = dataset
            .iter()
            .filter(|q| q.predicate == rdf::REST)
            .collect();
        assert_eq!(rests.len(), 2);
        assert_eq!(
            rests
                .iter()
                .filter(|q| q.object == TermRef::from(rdf::NIL))
                .count(),
            1
        );
        // the chain nodes are fresh blank nodes
        assert!(rests.iter().all(|q| q.subject.is_blank_node()));
    }

    #[test]
    fn empty_collection_is_nil() {
        let dataset = parse("<http://example.com/s> <http://example.com/p> () .");
        let quad = dataset.iter().next().unwrap();
        assert_eq!(quad.object, TermRef::from(rdf::NIL));
    }

    #[test]
    fn nested_property_lists() {
        let dataset = parse(
            "<http://example.com/s> <http://example.com/p> [
                <http://example.com/q> [ <http://example.com/r> \"v\" ]
            ] .",
        );
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn literals_with_language_tags_and_datatypes() {
        let dataset = parse(
            "@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
            <http://example.com/s> <http://example.com/p>
                \"caf\\u00e9\"@EN , \"5\"^^xsd:byte , true , 4.2 , 1e3 , -7 .",
        );
        let objects: Vec<String> = dataset.iter().map(|q| q.object.to_string()).collect();
        assert!(objects.contains(&"\"caf\u{e9}\"@en".to_owned()));
        assert!(objects
            .contains(&"\"5\"^^<http://www.w3.org/2001/XMLSchema#byte>".to_owned()));
        assert!(objects
            .contains(&"\"true\"^^<http://www.w3.org/2001/XMLSchema#boolean>".to_owned()));
        assert!(objects
            .contains(&"\"4.2\"^^<http://www.w3.org/2001/XMLSchema#decimal>".to_owned()));
        assert!(objects
            .contains(&"\"1e3\"^^<http://www.w3.org/2001/XMLSchema#double>".to_owned()));
        assert!(objects
            .contains(&"\"-7\"^^<http://www.w3.org/2001/XMLSchema#integer>".to_owned()));
    }

    #[test]
    fn graph_blocks_tag_their_statements() {
        let dataset = parse(
            "<http://example.com/g> { <http://example.com/s> <http://example.com/p> <http://example.com/o> . }
            GRAPH <http://example.com/h> { <http://example.com/s2> <http://example.com/p> <http://example.com/o> }
            { <http://example.com/s3> <http://example.com/p> <http://example.com/o> . }",
        );
        assert_eq!(dataset.len(), 3);
        let g = NamedNodeRef::new_unchecked("http://example.com/g");
        let h = NamedNodeRef::new_unchecked("http://example.com/h");
        assert_eq!(dataset.quads_for_graph_name(g).count(), 1);
        assert_eq!(dataset.quads_for_graph_name(h).count(), 1);
        assert_eq!(
            dataset
                .quads_for_graph_name(GraphNameRef::DefaultGraph)
                .count(),
            1
        );
    }

    #[test]
    fn default_graph_override_tags_untagged_statements() {
        let target = NamedNode::new_unchecked("http://example.com/target");
        let document = TurtleParser::new()
            .with_default_graph(target.clone())
            .parse_str(
                "<http://example.com/s> <http://example.com/p> <http://example.com/o> .
                <http://example.com/g> { <http://example.com/s2> <http://example.com/p> <http://example.com/o> . }",
            )
            .unwrap();
        let dataset = document.into_dataset();
        assert_eq!(
            dataset
                .quads_for_graph_name(NamedNodeRef::from(&target))
                .count(),
            1
        );
        assert_eq!(
            dataset
                .quads_for_graph_name(NamedNodeRef::new_unchecked("http://example.com/g"))
                .count(),
            1
        );
    }

    #[test]
    fn n3_constructs_are_rejected_as_unsupported() {
        for (input, construct) in [
            (
                "<http://example.com/a> => <http://example.com/b> .",
                "implication",
            ),
            ("?x <http://example.com/p> <http://example.com/o> .", "variable"),
            (
                "<http://example.com/s> <http://example.com/p> { <http://example.com/a> <http://example.com/b> <http://example.com/c> } .",
                "formula",
            ),
            ("@forAll <http://example.com/x> .", "quantifier"),
        ] {
            let error = TurtleParser::new().parse_str(input).unwrap_err();
            let TurtleError::Unsupported(e) = error else {
                panic!("expected an UnsupportedConstruct error for {input}");
            };
            assert!(
                e.construct().contains(construct),
                "{} should mention {construct}",
                e.construct()
            );
        }
    }

    #[test]
    fn syntax_error_reports_expected_and_found() {
        let error = TurtleParser::new()
            .parse_str("<http://example.com/s> <http://example.com/p> .")
            .unwrap_err();
        let TurtleError::Syntax(e) = error else {
            panic!("expected a syntax error");
        };
        assert_eq!(e.expected(), "an object");
        assert_eq!(e.found(), "'.'");
        assert_eq!(e.location().start.line, 0);
    }

    #[test]
    fn failed_parse_yields_no_partial_graph() {
        let result = TurtleParser::new().parse_str(
            "<http://example.com/s> <http://example.com/p> <http://example.com/o> .
            <http://example.com/s2> <http://example.com/p>",
        );
        assert!(result.is_err());
    }

    #[test]
    fn comments_are_elided() {
        let dataset = parse(
            "# leading comment
            <http://example.com/s> <http://example.com/p> <http://example.com/o> . # trailing",
        );
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn duplicate_statements_collapse() {
        let dataset = parse(
            "<http://example.com/s> <http://example.com/p> <http://example.com/o> .
            <http://example.com/s> <http://example.com/p> <http://example.com/o> .",
        );
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn terminal_context_is_exposed() {
        let document = TurtleParser::new()
            .parse_str(
                "@base <http://example.com/> .
                @prefix ex: <http://example.com/ns#> .
                <s> ex:p <o> .",
            )
            .unwrap();
        assert_eq!(document.base_iri(), Some("http://example.com/"));
        let prefixes: Vec<_> = document.prefixes().collect();
        assert_eq!(prefixes, [("ex", "http://example.com/ns#")]);
    }

    #[test]
    fn initial_prefix_and_base_options() {
        let document = TurtleParser::new()
            .with_base_iri("http://example.com/")
            .unwrap()
            .with_prefix("ex", "http://example.com/ns#")
            .unwrap()
            .parse_str("<s> ex:p <o> .")
            .unwrap();
        assert_eq!(document.dataset().len(), 1);
    }

    #[test]
    fn parse_reader_rejects_invalid_utf8() {
        let error = TurtleParser::new()
            .parse_reader(&b"<http://example.com/s> \xFF"[..])
            .unwrap_err();
        let TurtleParseError::Syntax(TurtleError::Lex(e)) = error else {
            panic!("expected a lexer error");
        };
        assert!(e.message().contains("UTF-8"));
    }

    #[test]
    fn quads_are_built_as_expected() {
        let dataset = parse(
            "@prefix ex: <http://example.com/> .
            ex:g { ex:s ex:p \"v\" . }",
        );
        let expected = Quad::new(
            NamedOrBlankNode::from(NamedNode::new_unchecked("http://example.com/s")),
            NamedNode::new_unchecked("http://example.com/p"),
            Term::from(Literal::new_simple_literal("v")),
            NamedNode::new_unchecked("http://example.com/g"),
        );
        assert!(dataset.contains(&expected));
        assert_eq!(
            dataset.iter().next().unwrap().subject,
            NamedOrBlankNodeRef::from(NamedNodeRef::new_unchecked("http://example.com/s"))
        );
    }
}
