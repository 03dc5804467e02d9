//! Shared recursive-descent core for the Turtle family of terse syntaxes:
//! Turtle, TriG-style named-graph blocks and the Turtle subset of N3.
//!
//! The grammar is LL(1) over the token stream: every production is decided
//! with at most one token of lookahead. The parse is all-or-nothing; the
//! first ungrammatical token aborts it and no partial dataset escapes.

use crate::error::{
    ResolutionError, SyntaxError, TextPosition, TurtleError, UnsupportedConstruct,
};
use crate::lexer::{Lexer, LexerMode, Token, TokenKind};
use manticrdf::vocab::{rdf, xsd};
use manticrdf::{BlankNode, Dataset, GraphName, Literal, NamedNode, NamedOrBlankNode, Quad, Term};
use oxiri::Iri;
use std::collections::HashMap;
use std::ops::Range;

/// The mutable state of one parse: the active base IRI, the prefix table and
/// the labeled-blank-node scope. Created at parse start, discarded at parse
/// end; the resulting dataset does not reference it.
pub(crate) struct ParseContext {
    pub base_iri: Option<Iri<String>>,
    pub prefixes: HashMap<String, Iri<String>>,
    /// Graph assigned to statements that carry no graph annotation.
    pub default_graph: GraphName,
    /// Labels seen in this document, each mapped to a fresh identity so that
    /// equal labels share one node and unrelated parses never collide.
    bnode_labels: HashMap<String, BlankNode>,
}

pub(crate) struct TerseParser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token<'a>>,
    context: ParseContext,
    dataset: Dataset,
    cur_graph: GraphName,
}

impl<'a> TerseParser<'a> {
    pub fn new(
        input: &'a str,
        base_iri: Option<Iri<String>>,
        prefixes: HashMap<String, Iri<String>>,
        default_graph: GraphName,
    ) -> Self {
        Self {
            lexer: Lexer::new(input, LexerMode::Terse),
            peeked: None,
            context: ParseContext {
                base_iri,
                prefixes,
                default_graph,
                bnode_labels: HashMap::new(),
            },
            dataset: Dataset::new(),
            cur_graph: GraphName::DefaultGraph,
        }
    }

    pub fn parse(mut self) -> Result<(Dataset, ParseContext), TurtleError> {
        while self.peek()?.is_some() {
            self.parse_statement()?;
        }
        Ok((self.dataset, self.context))
    }

    // [1g] trigDoc  ::=  (directive | block)*
    // [2g] block    ::=  triplesOrGraph | wrappedGraph | triples2 | "GRAPH" labelOrSubject wrappedGraph
    // [3]  directive ::=  prefixID | base | sparqlPrefix | sparqlBase
    fn parse_statement(&mut self) -> Result<(), TurtleError> {
        let Some(token) = self.next()? else {
            return Ok(());
        };
        let location = token.location.clone();
        match &token.kind {
            // [4] prefixID  ::=  '@prefix' PNAME_NS IRIREF '.'
            TokenKind::LangTag("prefix") => {
                self.parse_prefix_declaration()?;
                self.expect_punctuation(".")
            }
            // [5] base  ::=  '@base' IRIREF '.'
            TokenKind::LangTag("base") => {
                self.parse_base_declaration()?;
                self.expect_punctuation(".")
            }
            TokenKind::LangTag(tag @ ("forAll" | "forSome")) => Err(self.unsupported(
                location,
                format!("the N3 quantifier '@{tag}'"),
            )),
            TokenKind::LangTag("keywords") => {
                Err(self.unsupported(location, "the N3 '@keywords' directive"))
            }
            // [5s] sparqlPrefix  ::=  "PREFIX" PNAME_NS IRIREF
            TokenKind::PlainKeyword(k) if k.eq_ignore_ascii_case("prefix") => {
                self.parse_prefix_declaration()
            }
            // [6s] sparqlBase  ::=  "BASE" IRIREF
            TokenKind::PlainKeyword(k) if k.eq_ignore_ascii_case("base") => {
                self.parse_base_declaration()
            }
            TokenKind::PlainKeyword(k) if k.eq_ignore_ascii_case("graph") => {
                let name = self.parse_graph_label()?;
                self.expect_punctuation("{")?;
                self.parse_graph_body(name)
            }
            TokenKind::Punctuation("{") => self.parse_graph_body(GraphName::DefaultGraph),
            _ => self.parse_triples_or_graph(token),
        }
    }

    fn parse_prefix_declaration(&mut self) -> Result<(), TurtleError> {
        let token = self.expect_token("a prefix name like 'ex:'")?;
        let TokenKind::PrefixedName { prefix, local } = &token.kind else {
            return Err(self.syntax_error(&token, "a prefix name like 'ex:'"));
        };
        if !local.is_empty() {
            return Err(self.syntax_error(&token, "a prefix name like 'ex:'"));
        }
        let name = (*prefix).to_owned();
        let token = self.expect_token("the prefix value as an IRI")?;
        let location = token.location.clone();
        let iri = match token.kind {
            TokenKind::IriRef(iri) => iri,
            _ => return Err(self.syntax_error(&token, "the prefix value as an IRI")),
        };
        let value = self.resolve_iri(iri, &location)?;
        self.context.prefixes.insert(name, value);
        Ok(())
    }

    fn parse_base_declaration(&mut self) -> Result<(), TurtleError> {
        let token = self.expect_token("the base value as an IRI")?;
        let location = token.location.clone();
        let iri = match token.kind {
            TokenKind::IriRef(iri) => iri,
            _ => return Err(self.syntax_error(&token, "the base value as an IRI")),
        };
        // A relative base is resolved against the previous one and only
        // affects the remainder of the document
        self.context.base_iri = Some(self.resolve_iri(iri, &location)?);
        Ok(())
    }

    // [3g] triplesOrGraph  ::=  labelOrSubject (wrappedGraph | predicateObjectList '.')
    // [4g] triples2        ::=  blankNodePropertyList predicateObjectList? '.' | collection predicateObjectList '.'
    fn parse_triples_or_graph(&mut self, token: Token<'a>) -> Result<(), TurtleError> {
        let location = token.location.clone();
        match token.kind {
            TokenKind::IriRef(iri) => {
                let node = self.resolve_named_node(iri, &location)?;
                self.parse_label_or_subject_rest(node.into())
            }
            TokenKind::PrefixedName { prefix, local } => {
                let node = self.resolve_prefixed_name(prefix, &local, &location)?;
                self.parse_label_or_subject_rest(node.into())
            }
            TokenKind::BlankNodeLabel(label) => {
                let node = self.blank_node_for_label(label);
                self.parse_label_or_subject_rest(node.into())
            }
            TokenKind::Punctuation("[") => {
                if self.eat_punctuation("]")? {
                    return self.parse_label_or_subject_rest(BlankNode::default().into());
                }
                let subject = self.parse_property_list_rest()?;
                if self.eat_punctuation(".")? {
                    return Ok(());
                }
                self.parse_predicate_object_list(&subject.into())?;
                self.expect_punctuation(".")
            }
            TokenKind::Punctuation("(") => {
                let subject = self.parse_collection_rest()?;
                self.parse_predicate_object_list(&subject)?;
                self.expect_punctuation(".")
            }
            TokenKind::Variable(name) => {
                Err(self.unsupported(location, format!("the N3 variable '?{name}'")))
            }
            TokenKind::Punctuation("<<") => Err(self.unsupported(location, "a quoted triple")),
            _ => Err(self.syntax_error(&token, "a subject or a graph name")),
        }
    }

    /// After an IRI or blank node at statement level: either a graph block opens
    /// or this was a subject and its predicate-object list follows.
    fn parse_label_or_subject_rest(&mut self, node: NamedOrBlankNode) -> Result<(), TurtleError> {
        if self.eat_punctuation("{")? {
            self.parse_graph_body(node.into())
        } else {
            self.parse_predicate_object_list(&node)?;
            self.expect_punctuation(".")
        }
    }

    /// `GRAPH` keyword form: the label before the block.
    fn parse_graph_label(&mut self) -> Result<GraphName, TurtleError> {
        let token = self.expect_token("a graph name")?;
        let location = token.location.clone();
        match token.kind {
            TokenKind::IriRef(iri) => Ok(self.resolve_named_node(iri, &location)?.into()),
            TokenKind::PrefixedName { prefix, local } => Ok(self
                .resolve_prefixed_name(prefix, &local, &location)?
                .into()),
            TokenKind::BlankNodeLabel(label) => Ok(self.blank_node_for_label(label).into()),
            TokenKind::Punctuation("[") => {
                self.expect_punctuation("]")?;
                Ok(BlankNode::default().into())
            }
            _ => Err(self.syntax_error(&token, "a graph name")),
        }
    }

    // [5g] wrappedGraph  ::=  '{' triplesBlock? '}'
    // [6g] triplesBlock  ::=  triples ('.' triplesBlock?)?
    fn parse_graph_body(&mut self, name: GraphName) -> Result<(), TurtleError> {
        self.cur_graph = name;
        loop {
            if self.eat_punctuation("}")? {
                break;
            }
            self.parse_triples_in_graph()?;
            if self.eat_punctuation(".")? {
                continue;
            }
            let token = self.expect_token("'.' or '}' in a graph block")?;
            if token.kind == TokenKind::Punctuation("}") {
                break;
            }
            return Err(self.syntax_error(&token, "'.' or '}' in a graph block"));
        }
        self.cur_graph = GraphName::DefaultGraph;
        Ok(())
    }

    // [6] triples  ::=  subject predicateObjectList | blankNodePropertyList predicateObjectList?
    fn parse_triples_in_graph(&mut self) -> Result<(), TurtleError> {
        let token = self.expect_token("a subject")?;
        let location = token.location.clone();
        match token.kind {
            TokenKind::IriRef(iri) => {
                let subject = self.resolve_named_node(iri, &location)?;
                self.parse_predicate_object_list(&subject.into())
            }
            TokenKind::PrefixedName { prefix, local } => {
                let subject = self.resolve_prefixed_name(prefix, &local, &location)?;
                self.parse_predicate_object_list(&subject.into())
            }
            TokenKind::BlankNodeLabel(label) => {
                let subject = self.blank_node_for_label(label);
                self.parse_predicate_object_list(&subject.into())
            }
            TokenKind::Punctuation("[") => {
                if self.eat_punctuation("]")? {
                    return self.parse_predicate_object_list(&BlankNode::default().into());
                }
                let subject = self.parse_property_list_rest()?;
                if self.peek_is_one_of(&[".", "}"])? {
                    return Ok(());
                }
                self.parse_predicate_object_list(&subject.into())
            }
            TokenKind::Punctuation("(") => {
                let subject = self.parse_collection_rest()?;
                self.parse_predicate_object_list(&subject)
            }
            TokenKind::Punctuation("{") => {
                Err(self.unsupported(location, "an N3 formula"))
            }
            TokenKind::Variable(name) => {
                Err(self.unsupported(location, format!("the N3 variable '?{name}'")))
            }
            _ => Err(self.syntax_error(&token, "a subject")),
        }
    }

    // [7] predicateObjectList  ::=  verb objectList (';' (verb objectList)?)*
    fn parse_predicate_object_list(
        &mut self,
        subject: &NamedOrBlankNode,
    ) -> Result<(), TurtleError> {
        loop {
            let predicate = self.parse_verb()?;
            loop {
                let object = self.parse_object()?;
                self.emit(subject.clone(), predicate.clone(), object);
                // [8] objectList  ::=  object (',' object)*
                if !self.eat_punctuation(",")? {
                    break;
                }
            }
            let mut ended = true;
            while self.eat_punctuation(";")? {
                ended = false;
            }
            if ended || self.peek_is_one_of(&[".", "]", "}"])? || self.peek()?.is_none() {
                return Ok(());
            }
        }
    }

    // [9] verb  ::=  predicate | 'a'
    fn parse_verb(&mut self) -> Result<NamedNode, TurtleError> {
        let token = self.expect_token("a predicate")?;
        let location = token.location.clone();
        match token.kind {
            TokenKind::PlainKeyword("a") => Ok(rdf::TYPE.into_owned()),
            TokenKind::IriRef(iri) => self.resolve_named_node(iri, &location),
            TokenKind::PrefixedName { prefix, local } => {
                self.resolve_prefixed_name(prefix, &local, &location)
            }
            TokenKind::Punctuation(op @ ("=>" | "<=")) => Err(self.unsupported(
                location,
                format!("the N3 implication operator '{op}'"),
            )),
            TokenKind::Punctuation("=") => {
                Err(self.unsupported(location, "the N3 equality operator '='"))
            }
            TokenKind::Variable(name) => {
                Err(self.unsupported(location, format!("the N3 variable '?{name}'")))
            }
            _ => Err(self.syntax_error(&token, "a predicate IRI")),
        }
    }

    // [12] object  ::=  iri | BlankNode | collection | blankNodePropertyList | literal
    fn parse_object(&mut self) -> Result<Term, TurtleError> {
        let token = self.expect_token("an object")?;
        let location = token.location.clone();
        match token.kind {
            TokenKind::IriRef(iri) => Ok(self.resolve_named_node(iri, &location)?.into()),
            TokenKind::PrefixedName { prefix, local } => Ok(self
                .resolve_prefixed_name(prefix, &local, &location)?
                .into()),
            TokenKind::BlankNodeLabel(label) => Ok(self.blank_node_for_label(label).into()),
            TokenKind::Punctuation("[") => {
                if self.eat_punctuation("]")? {
                    Ok(BlankNode::default().into())
                } else {
                    Ok(self.parse_property_list_rest()?.into())
                }
            }
            TokenKind::Punctuation("(") => Ok(self.parse_collection_rest()?.into()),
            TokenKind::String(value) => self.parse_literal_rest(value),
            TokenKind::Integer(value) => Ok(Literal::new_typed_literal(value, xsd::INTEGER).into()),
            TokenKind::Decimal(value) => Ok(Literal::new_typed_literal(value, xsd::DECIMAL).into()),
            TokenKind::Double(value) => Ok(Literal::new_typed_literal(value, xsd::DOUBLE).into()),
            TokenKind::PlainKeyword(k @ ("true" | "false")) => {
                Ok(Literal::new_typed_literal(k, xsd::BOOLEAN).into())
            }
            TokenKind::Punctuation("{") => Err(self.unsupported(location, "an N3 formula")),
            TokenKind::Punctuation("<<") => Err(self.unsupported(location, "a quoted triple")),
            TokenKind::Variable(name) => {
                Err(self.unsupported(location, format!("the N3 variable '?{name}'")))
            }
            _ => Err(self.syntax_error(&token, "an object")),
        }
    }

    // [128s] RDFLiteral  ::=  String (LANGTAG | '^^' iri)?
    fn parse_literal_rest(&mut self, value: String) -> Result<Term, TurtleError> {
        if let Some(Token {
            kind: TokenKind::LangTag(_),
            ..
        }) = self.peek()?
        {
            let token = self.expect_token("a language tag")?;
            let location = token.location.clone();
            let TokenKind::LangTag(tag) = token.kind else {
                unreachable!("peeked a language tag");
            };
            let tag = oxilangtag::LanguageTag::parse(tag).map_err(|e| {
                TurtleError::from(crate::error::LexError {
                    location,
                    message: format!("invalid language tag '{tag}': {e}"),
                })
            })?;
            return Ok(Literal::new_language_tagged_literal_unchecked(
                value,
                tag.as_str().to_ascii_lowercase(),
            )
            .into());
        }
        if self.eat_punctuation("^^")? {
            let token = self.expect_token("a datatype IRI")?;
            let location = token.location.clone();
            let datatype = match token.kind {
                TokenKind::IriRef(iri) => self.resolve_named_node(iri, &location)?,
                TokenKind::PrefixedName { prefix, local } => {
                    self.resolve_prefixed_name(prefix, &local, &location)?
                }
                _ => return Err(self.syntax_error(&token, "a datatype IRI")),
            };
            return Ok(Literal::new_typed_literal(value, datatype).into());
        }
        Ok(Literal::new_simple_literal(value).into())
    }

    // [14] blankNodePropertyList  ::=  '[' predicateObjectList ']'
    /// The opening `[` is already consumed and the list is known to be non-empty.
    fn parse_property_list_rest(&mut self) -> Result<BlankNode, TurtleError> {
        let node = BlankNode::default();
        self.parse_predicate_object_list(&node.clone().into())?;
        self.expect_punctuation("]")?;
        Ok(node)
    }

    // [15] collection  ::=  '(' object* ')'
    /// The opening `(` is already consumed. An empty collection is `rdf:nil`;
    /// anything else desugars into a chain of fresh blank nodes linked by
    /// `rdf:first`/`rdf:rest` and terminated by `rdf:nil`.
    fn parse_collection_rest(&mut self) -> Result<NamedOrBlankNode, TurtleError> {
        if self.eat_punctuation(")")? {
            return Ok(rdf::NIL.into_owned().into());
        }
        let root = BlankNode::default();
        let mut current = root.clone();
        loop {
            let object = self.parse_object()?;
            self.emit(current.clone().into(), rdf::FIRST.into_owned(), object);
            if self.eat_punctuation(")")? {
                self.emit(
                    current.into(),
                    rdf::REST.into_owned(),
                    rdf::NIL.into_owned().into(),
                );
                return Ok(root.into());
            }
            let next = BlankNode::default();
            self.emit(
                current.into(),
                rdf::REST.into_owned(),
                next.clone().into(),
            );
            current = next;
        }
    }

    fn emit(&mut self, subject: NamedOrBlankNode, predicate: NamedNode, object: Term) {
        let graph_name = if self.cur_graph.is_default_graph() {
            self.context.default_graph.clone()
        } else {
            self.cur_graph.clone()
        };
        self.dataset.extend([Quad {
            subject,
            predicate,
            object,
            graph_name,
        }]);
    }

    fn blank_node_for_label(&mut self, label: &str) -> BlankNode {
        self.context
            .bnode_labels
            .entry(label.to_owned())
            .or_default()
            .clone()
    }

    fn resolve_named_node(
        &self,
        iri: String,
        location: &Range<TextPosition>,
    ) -> Result<NamedNode, TurtleError> {
        Ok(NamedNode::new_unchecked(
            self.resolve_iri(iri, location)?.into_inner(),
        ))
    }

    fn resolve_iri(
        &self,
        iri: String,
        location: &Range<TextPosition>,
    ) -> Result<Iri<String>, TurtleError> {
        if let Some(base_iri) = &self.context.base_iri {
            return base_iri.resolve(&iri).map_err(|e| {
                self.resolution_error(location, format!("invalid IRI <{iri}>: {e}"))
            });
        }
        match Iri::parse(iri.as_str()) {
            Ok(_) => Ok(Iri::parse_unchecked(iri)),
            Err(e) => Err(if has_scheme(&iri) {
                self.resolution_error(location, format!("invalid IRI <{iri}>: {e}"))
            } else {
                self.resolution_error(
                    location,
                    format!("the relative IRI <{iri}> cannot be resolved: no base IRI is in scope"),
                )
            }),
        }
    }

    fn resolve_prefixed_name(
        &self,
        prefix: &str,
        local: &str,
        location: &Range<TextPosition>,
    ) -> Result<NamedNode, TurtleError> {
        let Some(value) = self.context.prefixes.get(prefix) else {
            return Err(self.resolution_error(
                location,
                format!("the prefix '{prefix}:' has not been declared"),
            ));
        };
        let iri = format!("{}{}", value.as_str(), local);
        Iri::parse(iri.as_str()).map_err(|e| {
            self.resolution_error(
                location,
                format!("'{prefix}:{local}' expands to the invalid IRI <{iri}>: {e}"),
            )
        })?;
        Ok(NamedNode::new_unchecked(iri))
    }

    fn peek(&mut self) -> Result<Option<&Token<'a>>, TurtleError> {
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

    fn expect_token(&mut self, expected: &str) -> Result<Token<'a>, TurtleError> {
        match self.next()? {
            Some(token) => Ok(token),
            None => Err(self.end_of_file_error(expected)),
        }
    }

    fn expect_punctuation(&mut self, punctuation: &str) -> Result<(), TurtleError> {
        let expected = format!("'{punctuation}'");
        let token = self.expect_token(&expected)?;
        if token.kind == TokenKind::Punctuation(punctuation) {
            Ok(())
        } else {
            Err(self.syntax_error(&token, &expected))
        }
    }

    fn eat_punctuation(&mut self, punctuation: &str) -> Result<bool, TurtleError> {
        let matches = matches!(
            self.peek()?,
            Some(Token {
                kind: TokenKind::Punctuation(p),
                ..
            }) if *p == punctuation
        );
        if matches {
            self.next()?;
        }
        Ok(matches)
    }

    fn peek_is_one_of(&mut self, punctuations: &[&str]) -> Result<bool, TurtleError> {
        Ok(matches!(
            self.peek()?,
            Some(Token {
                kind: TokenKind::Punctuation(p),
                ..
            }) if punctuations.contains(p)
        ))
    }

    fn syntax_error(&self, token: &Token<'_>, expected: &str) -> TurtleError {
        SyntaxError {
            location: token.location.clone(),
            expected: expected.to_owned(),
            found: token.kind.to_string(),
        }
        .into()
    }

    fn end_of_file_error(&self, expected: &str) -> TurtleError {
        let position = self.lexer.position();
        SyntaxError {
            location: position..position,
            expected: expected.to_owned(),
            found: "the end of the file".to_owned(),
        }
        .into()
    }

    fn resolution_error(
        &self,
        location: &Range<TextPosition>,
        message: impl Into<String>,
    ) -> TurtleError {
        ResolutionError {
            location: location.clone(),
            message: message.into(),
        }
        .into()
    }

    fn unsupported(
        &self,
        location: Range<TextPosition>,
        construct: impl Into<String>,
    ) -> TurtleError {
        UnsupportedConstruct {
            location,
            construct: construct.into(),
        }
        .into()
    }
}

fn has_scheme(iri: &str) -> bool {
    iri.find(':')
        .is_some_and(|i| !iri[..i].contains(['/', '?', '#']))
}
