//! JSON snapshot of a graph store (`ontomod_snapshot_v1`).
//!
//! ```json
//! {
//!   "format": "ontomod_snapshot_v1",
//!   "iris": ["http://www.w3.org/2002/07/owl#Thing", "...Nothing", "..."],
//!   "root": { "id": { "iri": "..." }, "annotations": [], "axioms": [] },
//!   "imports": []
//! }
//! ```
//!
//! Identifiers in axioms are positions in `iris`.

use crate::store::{GraphStore, Ontology, OntologyId};
use crate::{Annotation, Axiom, NodeId, Vocabulary};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const SNAPSHOT_FORMAT_V1: &str = "ontomod_snapshot_v1";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot format `{0}` (expected `ontomod_snapshot_v1`)")]
    UnsupportedFormat(String),
    #[error("invalid IRI table: must start with owl:Thing, owl:Nothing and contain no duplicates")]
    InvalidVocabulary,
    #[error("node id {id} is out of range (IRI table has {len} entries)")]
    UnknownNodeId { id: u32, len: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyV1 {
    #[serde(default)]
    pub id: OntologyId,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub axioms: Vec<Axiom>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotV1 {
    pub format: String,
    pub iris: Vec<String>,
    pub root: OntologyV1,
    #[serde(default)]
    pub imports: Vec<OntologyV1>,
}

impl OntologyV1 {
    fn from_ontology(ontology: &Ontology) -> Self {
        Self {
            id: ontology.id.clone(),
            annotations: ontology.annotations().iter().cloned().collect(),
            axioms: ontology.axioms().to_vec(),
        }
    }

    fn into_ontology(self, len: usize) -> Result<Ontology, SnapshotError> {
        let mut ontology = Ontology::new(self.id);
        for annotation in self.annotations {
            check_id(annotation.property, len)?;
            if let Some(value) = annotation.value.as_iri() {
                check_id(value, len)?;
            }
            ontology.add_annotation(annotation);
        }
        for axiom in self.axioms {
            let mut bad = None;
            axiom.visit_ids(&mut |id| {
                if bad.is_none() && check_id(id, len).is_err() {
                    bad = Some(id);
                }
            });
            if let Some(id) = bad {
                return Err(SnapshotError::UnknownNodeId { id: id.raw(), len });
            }
            ontology.add_axiom(axiom);
        }
        Ok(ontology)
    }
}

fn check_id(id: NodeId, len: usize) -> Result<(), SnapshotError> {
    if (id.raw() as usize) < len {
        Ok(())
    } else {
        Err(SnapshotError::UnknownNodeId { id: id.raw(), len })
    }
}

impl SnapshotV1 {
    pub fn from_store(store: &GraphStore) -> Self {
        Self {
            format: SNAPSHOT_FORMAT_V1.to_string(),
            iris: store.vocab().iris().to_vec(),
            root: OntologyV1::from_ontology(store.root()),
            imports: store.imports().iter().map(OntologyV1::from_ontology).collect(),
        }
    }

    pub fn into_store(self) -> Result<GraphStore, SnapshotError> {
        if self.format != SNAPSHOT_FORMAT_V1 {
            return Err(SnapshotError::UnsupportedFormat(self.format));
        }
        let vocab = Vocabulary::from_iris(self.iris).ok_or(SnapshotError::InvalidVocabulary)?;
        let len = vocab.len();
        let root = self.root.into_ontology(len)?;
        let imports = self
            .imports
            .into_iter()
            .map(|o| o.into_ontology(len))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GraphStore::from_parts(vocab, root, imports))
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl GraphStore {
    pub fn from_snapshot_json(text: &str) -> Result<Self, SnapshotError> {
        SnapshotV1::from_json(text)?.into_store()
    }

    pub fn to_snapshot_json(&self) -> Result<String, SnapshotError> {
        SnapshotV1::from_store(self).to_json_pretty()
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_snapshot_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let text = self.to_snapshot_json()?;
        std::fs::write(path, text).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImportsScope;

    fn sample() -> GraphStore {
        let mut store = GraphStore::with_id(OntologyId::named("http://example.org/onto"));
        store.add_subclass("http://example.org/A", "http://example.org/B");
        store.add_label("http://example.org/A", "ay");
        let mut imported = Ontology::new(OntologyId::named("http://example.org/imp"));
        let c = store.intern("http://example.org/C");
        imported.add_axiom(Axiom::declaration(c, crate::EntityKind::Class));
        store.add_import(imported);
        store
    }

    #[test]
    fn json_roundtrip_preserves_axioms_and_imports() {
        let store = sample();
        let text = store.to_snapshot_json().unwrap();
        let loaded = GraphStore::from_snapshot_json(&text).unwrap();
        assert_eq!(loaded.root().axioms(), store.root().axioms());
        assert_eq!(loaded.imports().len(), 1);
        assert_eq!(loaded.root().id, store.root().id);
        let a = loaded.id_of("http://example.org/A").unwrap();
        assert_eq!(loaded.label(a), Some("ay"));
        assert_eq!(loaded.classes(ImportsScope::Included).len(), 3);
    }

    #[test]
    fn rejects_wrong_format_tag() {
        let mut snap = SnapshotV1::from_store(&sample());
        snap.format = "something_else".into();
        assert!(matches!(snap.into_store(), Err(SnapshotError::UnsupportedFormat(_))));
    }

    #[test]
    fn rejects_out_of_range_ids() {
        let mut snap = SnapshotV1::from_store(&sample());
        snap.root.axioms.push(Axiom::declaration(
            NodeId::new(9_999),
            crate::EntityKind::Class,
        ));
        assert!(matches!(
            snap.into_store(),
            Err(SnapshotError::UnknownNodeId { id: 9_999, .. })
        ));
    }

    #[test]
    fn rejects_table_without_reserved_prefix() {
        let mut snap = SnapshotV1::from_store(&sample());
        snap.iris.swap(0, 1);
        assert!(matches!(snap.into_store(), Err(SnapshotError::InvalidVocabulary)));
    }
}
