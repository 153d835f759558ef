//! Ontomod graph store.
//!
//! An ontology is held as a set of axioms over **interned** entity
//! identifiers:
//!
//! 1. **IRI interning**: every IRI is stored once in a [`Vocabulary`] and
//!    referenced by a 4-byte [`NodeId`]. `owl:Thing` and `owl:Nothing` have
//!    fixed ids in every vocabulary.
//! 2. **Bitmap node sets**: [`NodeSet`] is a Roaring bitmap over node ids, so
//!    membership is idempotent and iteration order never depends on
//!    insertion order.
//! 3. **Index-based adjacency**: axioms live in a flat `Vec` per ontology and
//!    are reached through per-class indexes, never through object pointers.
//!
//! A [`GraphStore`] is one local ontology plus the modules it imports, with
//! every query scoped by [`ImportsScope`].

pub mod axiom;
pub mod prefixes;
pub mod snapshot;
pub mod store;
pub mod well_known;

use ahash::AHashMap;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

pub use axiom::{Annotation, AnnotationValue, Axiom, AxiomBody, ClassExpr, EntityKind, Literal};
pub use prefixes::{PrefixError, PrefixMap};
pub use snapshot::{SnapshotError, SnapshotV1, SNAPSHOT_FORMAT_V1};
pub use store::{GraphStore, ImportsScope, Ontology, OntologyId};

// ============================================================================
// Node identifiers (interned IRIs)
// ============================================================================

/// Interned IRI handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// `owl:Thing`, the universal superclass.
    pub const THING: NodeId = NodeId(0);
    /// `owl:Nothing`, the unsatisfiable class.
    pub const NOTHING: NodeId = NodeId(1);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// `true` for `owl:Thing` and `owl:Nothing`.
    pub fn is_reserved(self) -> bool {
        self == Self::THING || self == Self::NOTHING
    }
}

/// IRI interner: maps IRIs to compact ids and back.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    iris: Vec<String>,
    index: AHashMap<String, NodeId>,
}

impl Vocabulary {
    pub fn new() -> Self {
        let mut vocab = Self {
            iris: Vec::new(),
            index: AHashMap::new(),
        };
        vocab.intern(well_known::OWL_THING);
        vocab.intern(well_known::OWL_NOTHING);
        vocab
    }

    /// Rebuild a vocabulary from its string table (ids are positions).
    ///
    /// Returns `None` when the table does not start with the reserved IRIs or
    /// contains duplicates.
    pub fn from_iris(iris: Vec<String>) -> Option<Self> {
        if iris.first().map(String::as_str) != Some(well_known::OWL_THING)
            || iris.get(1).map(String::as_str) != Some(well_known::OWL_NOTHING)
        {
            return None;
        }
        let mut index = AHashMap::with_capacity(iris.len());
        for (i, iri) in iris.iter().enumerate() {
            if index.insert(iri.clone(), NodeId(i as u32)).is_some() {
                return None;
            }
        }
        Some(Self { iris, index })
    }

    /// Intern an IRI, returning its id.
    pub fn intern(&mut self, iri: &str) -> NodeId {
        if let Some(id) = self.index.get(iri) {
            return *id;
        }
        let id = NodeId(self.iris.len() as u32);
        self.iris.push(iri.to_string());
        self.index.insert(iri.to_string(), id);
        id
    }

    /// Look up an existing id without inserting.
    pub fn id_of(&self, iri: &str) -> Option<NodeId> {
        self.index.get(iri).copied()
    }

    pub fn iri(&self, id: NodeId) -> Option<&str> {
        self.iris.get(id.0 as usize).map(String::as_str)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        (id.0 as usize) < self.iris.len()
    }

    pub fn len(&self) -> usize {
        self.iris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iris.is_empty()
    }

    pub fn iris(&self) -> &[String] {
        &self.iris
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.iris
            .iter()
            .enumerate()
            .map(|(i, iri)| (NodeId(i as u32), iri.as_str()))
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Node sets
// ============================================================================

/// A set of node ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeSet(RoaringBitmap);

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node; returns `false` when it was already present.
    pub fn insert(&mut self, id: NodeId) -> bool {
        self.0.insert(id.0)
    }

    pub fn remove(&mut self, id: NodeId) -> bool {
        self.0.remove(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.0.contains(id.0)
    }

    pub fn len(&self) -> usize {
        self.0.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().map(NodeId)
    }

    pub fn union_with(&mut self, other: &NodeSet) {
        self.0 |= &other.0;
    }

    pub fn intersection(&self, other: &NodeSet) -> NodeSet {
        NodeSet(&self.0 & &other.0)
    }

    pub fn difference(&self, other: &NodeSet) -> NodeSet {
        NodeSet(&self.0 - &other.0)
    }

    pub fn is_superset(&self, other: &NodeSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Drop `owl:Thing` and `owl:Nothing`.
    pub fn without_reserved(mut self) -> NodeSet {
        self.remove(NodeId::THING);
        self.remove(NodeId::NOTHING);
        self
    }
}

impl FromIterator<NodeId> for NodeSet {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        NodeSet(iter.into_iter().map(|id| id.0).collect())
    }
}

impl Extend<NodeId> for NodeSet {
    fn extend<T: IntoIterator<Item = NodeId>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(|id| id.0));
    }
}
