//! [In-memory implementation](Dataset) of [RDF datasets](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset).
//!
//! Usage example:
//! ```
//! use manticrdf::{Dataset, NamedNodeRef, QuadRef};
//!
//! let mut dataset = Dataset::new();
//!
//! // insertion
//! let ex = NamedNodeRef::new("http://example.com")?;
//! let quad = QuadRef::new(ex, ex, ex, ex);
//! dataset.insert(quad);
//!
//! // simple filter
//! let results: Vec<_> = dataset.quads_for_graph_name(ex).collect();
//! assert_eq!(vec![quad], results);
//! # Result::<_,Box<dyn std::error::Error>>::Ok(())
//! ```

use crate::term::{GraphName, GraphNameRef, Quad, QuadRef};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

/// An in-memory [RDF dataset](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset).
///
/// It is a set: inserting a quad a second time is a no-op, and two datasets
/// compare equal when they hold the same quads. Iteration follows the
/// canonical quad order — lexicographic on the (graph name, subject,
/// predicate, object) N-Quads textual forms, default graph first — which is
/// also the order the N-Quads serializer relies on.
///
/// Usage example:
/// ```
/// use manticrdf::{Dataset, GraphNameRef, NamedNodeRef, QuadRef};
///
/// let mut dataset = Dataset::new();
///
/// let ex = NamedNodeRef::new("http://example.com")?;
/// let quad = QuadRef::new(ex, ex, ex, GraphNameRef::DefaultGraph);
/// assert!(dataset.insert(quad));
/// assert!(!dataset.insert(quad)); // already there
/// assert!(dataset.contains(quad));
/// # Result::<_,Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Dataset {
    quads: BTreeSet<Quad>,
}

impl Dataset {
    /// Creates a new empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of quads in this dataset.
    #[inline]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Checks if this dataset contains no quad.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Adds a quad to the dataset.
    ///
    /// Returns `true` if the quad was newly inserted and `false` if it was already present.
    pub fn insert<'a>(&mut self, quad: impl Into<QuadRef<'a>>) -> bool {
        self.quads.insert(quad.into().into_owned())
    }

    /// Removes a quad from the dataset.
    ///
    /// Returns `true` if the quad was present.
    pub fn remove<'a>(&mut self, quad: impl Into<QuadRef<'a>>) -> bool {
        self.quads.remove(&quad.into().into_owned())
    }

    /// Checks if the dataset contains the given quad.
    pub fn contains<'a>(&self, quad: impl Into<QuadRef<'a>>) -> bool {
        self.quads.contains(&quad.into().into_owned())
    }

    /// Iterates over all the quads, in canonical order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.quads.iter(),
        }
    }

    /// Iterates, in canonical order, over the quads of the graph named `graph_name`.
    ///
    /// Use [`GraphNameRef::DefaultGraph`] for the default graph.
    pub fn quads_for_graph_name<'a, 'b>(
        &'a self,
        graph_name: impl Into<GraphNameRef<'b>>,
    ) -> GraphQuads<'a> {
        GraphQuads {
            inner: self.quads.iter(),
            graph_name: graph_name.into().into_owned(),
        }
    }

    /// Iterates over the names of the graphs at least one quad belongs to.
    ///
    /// The default graph is reported with the [`GraphNameRef::DefaultGraph`] sentinel.
    pub fn graph_names(&self) -> GraphNames<'_> {
        GraphNames {
            inner: self.quads.iter(),
            last: None,
        }
    }

    /// Removes all the quads.
    pub fn clear(&mut self) {
        self.quads.clear();
    }
}

impl fmt::Display for Dataset {
    /// The N-Quads serialization of the dataset, without blank node relabeling.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for quad in self {
            writeln!(f, "{quad} .")?;
        }
        Ok(())
    }
}

impl FromIterator<Quad> for Dataset {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        Self {
            quads: iter.into_iter().collect(),
        }
    }
}

impl Extend<Quad> for Dataset {
    fn extend<I: IntoIterator<Item = Quad>>(&mut self, iter: I) {
        self.quads.extend(iter);
    }
}

impl IntoIterator for Dataset {
    type Item = Quad;
    type IntoIter = btree_set::IntoIter<Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = QuadRef<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`Dataset::iter`].
pub struct Iter<'a> {
    inner: btree_set::Iter<'a, Quad>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = QuadRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.as_ref())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator returned by [`Dataset::quads_for_graph_name`].
pub struct GraphQuads<'a> {
    inner: btree_set::Iter<'a, Quad>,
    graph_name: GraphName,
}

impl<'a> Iterator for GraphQuads<'a> {
    type Item = QuadRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        // Quads are sorted by graph name first, so the matches are contiguous
        for quad in self.inner.by_ref() {
            if quad.graph_name == self.graph_name {
                return Some(quad.as_ref());
            }
            if quad.graph_name > self.graph_name {
                break;
            }
        }
        None
    }
}

/// Iterator returned by [`Dataset::graph_names`].
pub struct GraphNames<'a> {
    inner: btree_set::Iter<'a, Quad>,
    last: Option<GraphNameRef<'a>>,
}

impl<'a> Iterator for GraphNames<'a> {
    type Item = GraphNameRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        // The canonical order groups quads by graph, a single pass is enough
        for quad in self.inner.by_ref() {
            let graph_name = quad.graph_name.as_ref();
            if self.last != Some(graph_name) {
                self.last = Some(graph_name);
                return Some(graph_name);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlankNode, Literal, NamedNode, NamedNodeRef};

    fn named(iri: &str) -> NamedNode {
        NamedNode::new_unchecked(iri)
    }

    #[test]
    fn insert_is_idempotent() {
        let mut dataset = Dataset::new();
        let quad = Quad::new(
            named("http://example.com/s"),
            named("http://example.com/p"),
            named("http://example.com/o"),
            GraphName::DefaultGraph,
        );
        assert!(dataset.insert(&quad));
        assert!(!dataset.insert(&quad));
        assert_eq!(dataset.len(), 1);
        assert_eq!(
            dataset.iter().collect::<Vec<_>>(),
            [&quad].map(Quad::as_ref)
        );
    }

    #[test]
    fn canonical_iteration_order() {
        let mut dataset = Dataset::new();
        let g = named("http://example.com/g");
        let p = named("http://example.com/p");
        dataset.insert(
            Quad::new(
                named("http://example.com/s2"),
                p.clone(),
                named("http://example.com/o"),
                g.clone(),
            )
            .as_ref(),
        );
        dataset.insert(
            Quad::new(
                named("http://example.com/s1"),
                p.clone(),
                Literal::new_simple_literal("x"),
                g.clone(),
            )
            .as_ref(),
        );
        dataset.insert(
            Quad::new(
                named("http://example.com/s9"),
                p.clone(),
                named("http://example.com/o"),
                GraphName::DefaultGraph,
            )
            .as_ref(),
        );

        let subjects: Vec<String> = dataset.iter().map(|q| q.subject.to_string()).collect();
        // default graph first, then the named graph sorted by subject
        assert_eq!(
            subjects,
            [
                "<http://example.com/s9>",
                "<http://example.com/s1>",
                "<http://example.com/s2>",
            ]
        );
    }

    #[test]
    fn graph_names_are_deduplicated() {
        let mut dataset = Dataset::new();
        let g = named("http://example.com/g");
        let p = named("http://example.com/p");
        for s in ["http://example.com/a", "http://example.com/b"] {
            dataset.insert(
                Quad::new(named(s), p.clone(), named(s), g.clone()).as_ref(),
            );
            dataset.insert(
                Quad::new(named(s), p.clone(), named(s), GraphName::DefaultGraph).as_ref(),
            );
        }
        let names: Vec<_> = dataset.graph_names().collect();
        assert_eq!(
            names,
            [GraphNameRef::DefaultGraph, GraphNameRef::from(&g)]
        );
    }

    #[test]
    fn quads_for_graph_name_filters() {
        let mut dataset = Dataset::new();
        let g1 = named("http://example.com/g1");
        let g2 = named("http://example.com/g2");
        let p = named("http://example.com/p");
        let s = BlankNode::new_unchecked("s");
        dataset.insert(Quad::new(s.clone(), p.clone(), named("http://example.com/o1"), g1.clone()).as_ref());
        dataset.insert(Quad::new(s.clone(), p.clone(), named("http://example.com/o2"), g2.clone()).as_ref());

        let in_g1: Vec<_> = dataset
            .quads_for_graph_name(NamedNodeRef::from(&g1))
            .collect();
        assert_eq!(in_g1.len(), 1);
        assert_eq!(in_g1[0].object.to_string(), "<http://example.com/o1>");
        assert_eq!(dataset.quads_for_graph_name(GraphNameRef::DefaultGraph).count(), 0);
    }
}
