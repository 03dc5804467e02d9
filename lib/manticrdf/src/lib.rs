//! Manticrdf provides the data structures of the [RDF 1.1 data model](https://www.w3.org/TR/rdf11-concepts/):
//! IRIs, blank nodes, literals and their combination into triples and quads,
//! plus an in-memory quad store with set semantics, [`Dataset`].
//!
//! Usage example:
//! ```
//! use manticrdf::*;
//!
//! let mut dataset = Dataset::new();
//!
//! // insertion
//! let ex = NamedNodeRef::new("http://example.com")?;
//! let quad = QuadRef::new(ex, ex, ex, GraphNameRef::DefaultGraph);
//! dataset.insert(quad);
//!
//! // inserting twice does not change the store
//! dataset.insert(quad);
//! assert_eq!(1, dataset.len());
//! # Result::<_,Box<dyn std::error::Error>>::Ok(())
//! ```

mod blank_node;
pub mod dataset;
mod literal;
mod named_node;
mod term;
pub mod vocab;

pub use crate::blank_node::{BlankNode, BlankNodeIdParseError, BlankNodeRef};
pub use crate::dataset::Dataset;
pub use crate::literal::{Literal, LiteralRef};
pub use crate::named_node::{NamedNode, NamedNodeRef};
pub use crate::term::{
    GraphName, GraphNameRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadRef, Term, TermRef,
    Triple, TripleRef,
};
pub use oxilangtag::LanguageTagParseError;
pub use oxiri::IriParseError;
