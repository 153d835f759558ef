//! Ontologies and the graph store.

use crate::axiom::{Annotation, AnnotationValue, Axiom, AxiomBody, ClassExpr, EntityKind, Literal};
use crate::{well_known, NodeId, NodeSet, Vocabulary};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether a query looks at the local ontology only or at its imports too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportsScope {
    #[default]
    Included,
    Excluded,
}

impl ImportsScope {
    pub fn from_flag(include_imports: bool) -> Self {
        if include_imports {
            ImportsScope::Included
        } else {
            ImportsScope::Excluded
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_iri: Option<String>,
}

impl OntologyId {
    pub fn named(iri: impl Into<String>) -> Self {
        Self {
            iri: Some(iri.into()),
            version_iri: None,
        }
    }
}

// ============================================================================
// Ontology (a set of axioms with lookup indexes)
// ============================================================================

/// One ontology document: identity, ontology annotations and a set of axioms.
#[derive(Debug, Clone, Default)]
pub struct Ontology {
    pub id: OntologyId,
    annotations: BTreeSet<Annotation>,
    axioms: Vec<Axiom>,
    members: AHashSet<Axiom>,
    /// class -> axioms defining it (see `Axiom::defined_classes`)
    defining: AHashMap<NodeId, Vec<u32>>,
    /// subject -> annotation assertions about it
    assertions: AHashMap<NodeId, Vec<u32>>,
    /// (property, IRI value) -> subjects, for IRI-valued assertions
    by_value: AHashMap<(NodeId, NodeId), NodeSet>,
    classes: NodeSet,
}

impl Ontology {
    pub fn new(id: OntologyId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    pub fn contains_axiom(&self, axiom: &Axiom) -> bool {
        self.members.contains(axiom)
    }

    /// Add an axiom; returns `false` when the ontology already had it.
    pub fn add_axiom(&mut self, axiom: Axiom) -> bool {
        if self.members.contains(&axiom) {
            return false;
        }
        let idx = self.axioms.len() as u32;

        for class in axiom.defined_classes() {
            let entry = self.defining.entry(class).or_default();
            if entry.last() != Some(&idx) {
                entry.push(idx);
            }
        }
        if let AxiomBody::AnnotationAssertion {
            subject,
            annotation,
        } = &axiom.body
        {
            self.assertions.entry(*subject).or_default().push(idx);
            if let AnnotationValue::Iri(value) = &annotation.value {
                self.by_value
                    .entry((annotation.property, *value))
                    .or_default()
                    .insert(*subject);
            }
        }
        axiom.collect_classes(&mut self.classes);

        self.members.insert(axiom.clone());
        self.axioms.push(axiom);
        true
    }

    /// Replace the whole axiom set, rebuilding every index.
    pub fn replace_axioms(&mut self, axioms: impl IntoIterator<Item = Axiom>) {
        let id = std::mem::take(&mut self.id);
        let annotations = std::mem::take(&mut self.annotations);
        *self = Ontology {
            id,
            annotations,
            ..Ontology::default()
        };
        for axiom in axioms {
            self.add_axiom(axiom);
        }
    }

    pub fn annotations(&self) -> &BTreeSet<Annotation> {
        &self.annotations
    }

    pub fn add_annotation(&mut self, annotation: Annotation) -> bool {
        self.annotations.insert(annotation)
    }

    /// Classes in the signature (declared or referenced by a class expression).
    pub fn classes(&self) -> &NodeSet {
        &self.classes
    }

    pub fn defining_axioms(&self, class: NodeId) -> impl Iterator<Item = &Axiom> + '_ {
        self.indexed(&self.defining, class)
    }

    pub fn annotation_assertions(&self, subject: NodeId) -> impl Iterator<Item = &Axiom> + '_ {
        self.indexed(&self.assertions, subject)
    }

    /// Subjects `s` with an assertion `s property value` (IRI value).
    pub fn subjects_with(&self, property: NodeId, value: NodeId) -> Option<&NodeSet> {
        self.by_value.get(&(property, value))
    }

    fn indexed<'a>(
        &'a self,
        index: &'a AHashMap<NodeId, Vec<u32>>,
        key: NodeId,
    ) -> impl Iterator<Item = &'a Axiom> + 'a {
        index
            .get(&key)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|&i| self.axioms.get(i as usize))
    }
}

// ============================================================================
// GraphStore (local ontology + imports closure)
// ============================================================================

/// A loaded ontology with its (already flattened) imports closure.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    vocab: Vocabulary,
    root: Ontology,
    imports: Vec<Ontology>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: OntologyId) -> Self {
        Self {
            vocab: Vocabulary::new(),
            root: Ontology::new(id),
            imports: Vec::new(),
        }
    }

    pub(crate) fn from_parts(vocab: Vocabulary, root: Ontology, imports: Vec<Ontology>) -> Self {
        Self {
            vocab,
            root,
            imports,
        }
    }

    /// A fresh store sharing this store's vocabulary (ids stay valid).
    pub fn derive_empty(&self, id: OntologyId) -> Self {
        Self {
            vocab: self.vocab.clone(),
            root: Ontology::new(id),
            imports: Vec::new(),
        }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn intern(&mut self, iri: &str) -> NodeId {
        self.vocab.intern(iri)
    }

    pub fn id_of(&self, iri: &str) -> Option<NodeId> {
        self.vocab.id_of(iri)
    }

    /// The IRI of `id`; empty for ids from another vocabulary.
    pub fn iri(&self, id: NodeId) -> &str {
        self.vocab.iri(id).unwrap_or("")
    }

    pub fn root(&self) -> &Ontology {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Ontology {
        &mut self.root
    }

    pub fn imports(&self) -> &[Ontology] {
        &self.imports
    }

    pub fn add_import(&mut self, ontology: Ontology) {
        self.imports.push(ontology);
    }

    pub fn ontologies(&self, scope: ImportsScope) -> impl Iterator<Item = &Ontology> + '_ {
        let imports: &[Ontology] = match scope {
            ImportsScope::Included => &self.imports,
            ImportsScope::Excluded => &[],
        };
        std::iter::once(&self.root).chain(imports.iter())
    }

    pub fn axioms(&self, scope: ImportsScope) -> impl Iterator<Item = &Axiom> + '_ {
        self.ontologies(scope).flat_map(|o| o.axioms().iter())
    }

    pub fn axiom_count(&self, scope: ImportsScope) -> usize {
        self.ontologies(scope).map(Ontology::len).sum()
    }

    pub fn contains_class(&self, class: NodeId, scope: ImportsScope) -> bool {
        self.ontologies(scope).any(|o| o.classes().contains(class))
    }

    pub fn classes(&self, scope: ImportsScope) -> NodeSet {
        let mut out = NodeSet::new();
        for ontology in self.ontologies(scope) {
            out.union_with(ontology.classes());
        }
        out
    }

    pub fn defining_axioms(
        &self,
        class: NodeId,
        scope: ImportsScope,
    ) -> impl Iterator<Item = &Axiom> + '_ {
        self.ontologies(scope)
            .flat_map(move |o| o.defining_axioms(class))
    }

    pub fn annotation_assertions(
        &self,
        subject: NodeId,
        scope: ImportsScope,
    ) -> impl Iterator<Item = &Axiom> + '_ {
        self.ontologies(scope)
            .flat_map(move |o| o.annotation_assertions(subject))
    }

    /// Subjects carrying `property value` (IRI-valued) anywhere in scope.
    pub fn subjects_with(&self, property: NodeId, value: NodeId, scope: ImportsScope) -> NodeSet {
        let mut out = NodeSet::new();
        for ontology in self.ontologies(scope) {
            if let Some(subjects) = ontology.subjects_with(property, value) {
                out.union_with(subjects);
            }
        }
        out
    }

    /// Subjects with a literal-valued `property` whose lexical form is `text`.
    pub fn subjects_with_literal(&self, property: NodeId, text: &str, scope: ImportsScope) -> NodeSet {
        self.axioms(scope)
            .filter_map(|ax| match &ax.body {
                AxiomBody::AnnotationAssertion {
                    subject,
                    annotation,
                } if annotation.property == property => annotation
                    .value
                    .as_literal()
                    .filter(|lit| lit.lexical == text)
                    .map(|_| *subject),
                _ => None,
            })
            .collect()
    }

    /// Entities whose `rdfs:label` is exactly `label`.
    pub fn entities_with_label(&self, label: &str, scope: ImportsScope) -> NodeSet {
        match self.vocab.id_of(well_known::RDFS_LABEL) {
            Some(prop) => self.subjects_with_literal(prop, label, scope),
            None => NodeSet::new(),
        }
    }

    /// First `rdfs:label` of `subject`, if any.
    pub fn label(&self, subject: NodeId) -> Option<&str> {
        let prop = self.vocab.id_of(well_known::RDFS_LABEL)?;
        self.annotation_assertions(subject, ImportsScope::Included)
            .find_map(|ax| match &ax.body {
                AxiomBody::AnnotationAssertion { annotation, .. } if annotation.property == prop => {
                    annotation.value.as_literal().map(|lit| lit.lexical.as_str())
                }
                _ => None,
            })
    }

    /// Append another store's axioms (local and imported) to the local
    /// ontology, re-interning every identifier into this vocabulary.
    pub fn merge_from(&mut self, other: &GraphStore) {
        let mut mapping: AHashMap<NodeId, NodeId> = AHashMap::new();
        let vocab = &mut self.vocab;
        let mut remap = |id: NodeId| -> NodeId {
            *mapping
                .entry(id)
                .or_insert_with(|| vocab.intern(other.vocab.iri(id).unwrap_or_default()))
        };
        let mut merged = Vec::new();
        for axiom in other.axioms(ImportsScope::Included) {
            merged.push(axiom.map_ids(&mut remap));
        }
        for axiom in merged {
            self.root.add_axiom(axiom);
        }
    }

    // ========================================================================
    // Convenience builders (IRI strings in, axioms out)
    // ========================================================================

    pub fn add_axiom(&mut self, axiom: Axiom) -> bool {
        self.root.add_axiom(axiom)
    }

    pub fn declare(&mut self, iri: &str, kind: EntityKind) -> NodeId {
        let id = self.intern(iri);
        self.root.add_axiom(Axiom::declaration(id, kind));
        id
    }

    pub fn declare_class(&mut self, iri: &str) -> NodeId {
        self.declare(iri, EntityKind::Class)
    }

    /// `sub SubClassOf sup` between named classes.
    pub fn add_subclass(&mut self, sub: &str, sup: &str) -> (NodeId, NodeId) {
        let sub_id = self.intern(sub);
        let sup_id = self.intern(sup);
        self.root.add_axiom(Axiom::subclass_of(
            ClassExpr::Named(sub_id),
            ClassExpr::Named(sup_id),
        ));
        (sub_id, sup_id)
    }

    /// `sub SubClassOf property some filler`.
    pub fn add_some(&mut self, sub: &str, property: &str, filler: &str) -> NodeId {
        let sub_id = self.intern(sub);
        let prop_id = self.intern(property);
        let filler_id = self.intern(filler);
        self.root.add_axiom(Axiom::subclass_of(
            ClassExpr::Named(sub_id),
            ClassExpr::some(prop_id, ClassExpr::Named(filler_id)),
        ));
        sub_id
    }

    pub fn annotate_literal(&mut self, subject: &str, property: &str, value: Literal) -> NodeId {
        let subject_id = self.intern(subject);
        let prop_id = self.intern(property);
        self.root.add_axiom(Axiom::annotation_assertion(
            subject_id,
            prop_id,
            AnnotationValue::Literal(value),
        ));
        subject_id
    }

    pub fn annotate_iri(&mut self, subject: &str, property: &str, value: &str) -> NodeId {
        let subject_id = self.intern(subject);
        let prop_id = self.intern(property);
        let value_id = self.intern(value);
        self.root.add_axiom(Axiom::annotation_assertion(
            subject_id,
            prop_id,
            AnnotationValue::Iri(value_id),
        ));
        subject_id
    }

    pub fn add_label(&mut self, subject: &str, label: &str) -> NodeId {
        self.annotate_literal(subject, well_known::RDFS_LABEL, Literal::plain(label))
    }

    /// Tag `subject` as a member of the named subset `tag`.
    pub fn add_tag(&mut self, subject: &str, tag: &str) -> NodeId {
        self.annotate_iri(subject, well_known::IN_SUBSET, tag)
    }

    pub fn deprecate(&mut self, subject: &str) -> NodeId {
        self.annotate_literal(
            subject,
            well_known::OWL_DEPRECATED,
            Literal::typed("true", well_known::XSD_BOOLEAN),
        )
    }
}
