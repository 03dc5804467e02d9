//! Manticttl parses languages of the [Turtle](https://www.w3.org/TR/turtle/) family into a
//! [`manticrdf::Dataset`] and serializes datasets to [N-Quads](https://www.w3.org/TR/n-quads/):
//!
//! * [`TurtleParser`] covers Turtle, TriG-style named-graph blocks and the Turtle subset of
//!   [Notation3](https://w3c.github.io/N3/spec/). N3-only constructs (formulas, variables,
//!   implication operators, quantifiers) are rejected with [`UnsupportedConstruct`].
//! * [`NQuadsParser`] covers N-Quads and its N-Triples subset.
//! * [`NQuadsSerializer`] writes N-Quads, either quad by quad or as the canonical,
//!   blank-node-relabeled projection of a whole dataset.

mod error;
mod lexer;
mod nquads;
mod terse;
mod turtle;

pub use crate::error::{
    LexError, ResolutionError, SyntaxError, TextPosition, TurtleError, TurtleParseError,
    UnsupportedConstruct,
};
pub use crate::nquads::{NQuadsParser, NQuadsSerializer, WriterNQuadsSerializer};
pub use crate::turtle::{ParsedDocument, TurtleParser};
