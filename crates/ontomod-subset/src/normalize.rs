//! In-place clean-ups of the local ontology (imports are never touched).

use crate::config::default_base_prefixes;
use ontomod_model::{
    well_known, Annotation, AnnotationValue, Axiom, AxiomBody, GraphStore, NodeId, NodeSet,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub merge_axioms: bool,
    pub subset_decls: bool,
    pub synonym_decls: bool,
    pub add_source: bool,
    /// Declarations are injected only for IRIs under these prefixes; `None`
    /// injects for every IRI.
    pub base_prefixes: Option<Vec<String>>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            merge_axioms: false,
            subset_decls: false,
            synonym_decls: false,
            add_source: false,
            base_prefixes: Some(default_base_prefixes()),
        }
    }
}

impl NormalizeOptions {
    /// Every operation except `add_source`, which needs to be asked for.
    pub fn all() -> Self {
        Self {
            merge_axioms: true,
            subset_decls: true,
            synonym_decls: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub merged: usize,
    pub declarations: usize,
    pub source_added: bool,
}

pub fn normalize(store: &mut GraphStore, options: &NormalizeOptions) -> NormalizeSummary {
    let mut summary = NormalizeSummary::default();
    if options.merge_axioms {
        summary.merged = merge_axioms(store);
    }
    if options.subset_decls || options.synonym_decls {
        summary.declarations = inject_declarations(
            store,
            options.base_prefixes.as_deref(),
            options.subset_decls,
            options.synonym_decls,
        );
    }
    if options.add_source {
        summary.source_added = add_source(store);
    }
    tracing::info!(
        merged = summary.merged,
        declarations = summary.declarations,
        source_added = summary.source_added,
        "normalization done"
    );
    summary
}

/// Merge local axioms that differ only by their axiom annotations into one
/// axiom carrying the union of the annotations. Returns how many axioms
/// disappeared.
pub fn merge_axioms(store: &mut GraphStore) -> usize {
    let before = store.root().len();
    let mut order: Vec<AxiomBody> = Vec::new();
    let mut annotations: HashMap<AxiomBody, BTreeSet<Annotation>> = HashMap::new();
    for axiom in store.root().axioms() {
        let entry = annotations.entry(axiom.body.clone()).or_insert_with(|| {
            order.push(axiom.body.clone());
            BTreeSet::new()
        });
        entry.extend(axiom.annotations.iter().cloned());
    }

    let merged: Vec<Axiom> = order
        .into_iter()
        .map(|body| {
            let annots = annotations.remove(&body).unwrap_or_default();
            Axiom::new(body).with_annotations(annots)
        })
        .collect();
    store.root_mut().replace_axioms(merged);
    before - store.root().len()
}

/// Declare IRIs used as `oboInOwl:inSubset` values as sub-properties of
/// `oboInOwl:SubsetProperty`, and `oboInOwl:hasSynonymType` values as
/// sub-properties of `oboInOwl:SynonymTypeProperty`. Values are collected
/// from local assertions and axiom annotations. Returns the number of new
/// axioms.
pub fn inject_declarations(
    store: &mut GraphStore,
    prefixes: Option<&[String]>,
    for_subsets: bool,
    for_synonyms: bool,
) -> usize {
    let in_subset = store.id_of(well_known::IN_SUBSET);
    let synonym_type = store.id_of(well_known::HAS_SYNONYM_TYPE);

    let mut subsets = NodeSet::new();
    let mut synonyms = NodeSet::new();
    {
        let mut collect = |annotation: &Annotation| {
            let AnnotationValue::Iri(value) = annotation.value else {
                return;
            };
            let iri = store.iri(value);
            let wanted = prefixes.map_or(true, |ps| ps.iter().any(|p| iri.starts_with(p.as_str())));
            if !wanted {
                return;
            }
            if Some(annotation.property) == in_subset {
                subsets.insert(value);
            } else if Some(annotation.property) == synonym_type {
                synonyms.insert(value);
            }
        };
        for axiom in store.root().axioms() {
            if let AxiomBody::AnnotationAssertion { annotation, .. } = &axiom.body {
                collect(annotation);
            }
            for annotation in &axiom.annotations {
                collect(annotation);
            }
        }
    }

    let mut added = 0;
    if for_subsets {
        added += add_sub_properties(store, &subsets, well_known::SUBSET_PROPERTY);
    }
    if for_synonyms {
        added += add_sub_properties(store, &synonyms, well_known::SYNONYM_TYPE_PROPERTY);
    }
    added
}

fn add_sub_properties(store: &mut GraphStore, subs: &NodeSet, parent: &str) -> usize {
    if subs.is_empty() {
        return 0;
    }
    let sup: NodeId = store.intern(parent);
    subs.iter()
        .filter(|&sub| store.add_axiom(Axiom::new(AxiomBody::SubAnnotationPropertyOf { sub, sup })))
        .count()
}

/// Add a `dc:source` ontology annotation pointing at the version IRI.
/// Returns `false` when the ontology has no version IRI.
pub fn add_source(store: &mut GraphStore) -> bool {
    let Some(version) = store.root().id.version_iri.clone() else {
        tracing::warn!("ontology has no version IRI, not adding dc:source");
        return false;
    };
    let property = store.intern(well_known::DC_SOURCE);
    let value = store.intern(&version);
    store
        .root_mut()
        .add_annotation(Annotation::new(property, AnnotationValue::Iri(value)));
    true
}
