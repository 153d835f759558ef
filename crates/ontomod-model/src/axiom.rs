//! Axioms and class expressions over interned identifiers.

use crate::{NodeId, NodeSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Class expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassExpr {
    Named(NodeId),
    /// Existential restriction `property some filler`.
    Some {
        property: NodeId,
        filler: Box<ClassExpr>,
    },
    And(Vec<ClassExpr>),
    Or(Vec<ClassExpr>),
    Not(Box<ClassExpr>),
}

impl ClassExpr {
    pub fn some(property: NodeId, filler: ClassExpr) -> Self {
        ClassExpr::Some {
            property,
            filler: Box::new(filler),
        }
    }

    pub fn as_named(&self) -> Option<NodeId> {
        match self {
            ClassExpr::Named(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_top(&self) -> bool {
        self.as_named() == Some(NodeId::THING)
    }

    pub fn is_bottom(&self) -> bool {
        self.as_named() == Some(NodeId::NOTHING)
    }

    /// Top-level conjuncts (the expression itself when it is not an `And`).
    pub fn conjuncts(&self) -> &[ClassExpr] {
        match self {
            ClassExpr::And(parts) => parts,
            other => std::slice::from_ref(other),
        }
    }

    /// Named classes occurring anywhere in the expression (properties excluded).
    pub fn collect_classes(&self, out: &mut NodeSet) {
        match self {
            ClassExpr::Named(id) => {
                out.insert(*id);
            }
            ClassExpr::Some { filler, .. } => filler.collect_classes(out),
            ClassExpr::And(parts) | ClassExpr::Or(parts) => {
                for part in parts {
                    part.collect_classes(out);
                }
            }
            ClassExpr::Not(inner) => inner.collect_classes(out),
        }
    }

    pub fn map_ids(&self, f: &mut impl FnMut(NodeId) -> NodeId) -> ClassExpr {
        match self {
            ClassExpr::Named(id) => ClassExpr::Named(f(*id)),
            ClassExpr::Some { property, filler } => ClassExpr::Some {
                property: f(*property),
                filler: Box::new(filler.map_ids(f)),
            },
            ClassExpr::And(parts) => ClassExpr::And(parts.iter().map(|p| p.map_ids(f)).collect()),
            ClassExpr::Or(parts) => ClassExpr::Or(parts.iter().map(|p| p.map_ids(f)).collect()),
            ClassExpr::Not(inner) => ClassExpr::Not(Box::new(inner.map_ids(f))),
        }
    }

    fn visit_ids(&self, f: &mut impl FnMut(NodeId)) {
        match self {
            ClassExpr::Named(id) => f(*id),
            ClassExpr::Some { property, filler } => {
                f(*property);
                filler.visit_ids(f);
            }
            ClassExpr::And(parts) | ClassExpr::Or(parts) => {
                for part in parts {
                    part.visit_ids(f);
                }
            }
            ClassExpr::Not(inner) => inner.visit_ids(f),
        }
    }
}

// ============================================================================
// Annotations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnnotationValue {
    Iri(NodeId),
    Literal(Literal),
}

impl AnnotationValue {
    pub fn as_iri(&self) -> Option<NodeId> {
        match self {
            AnnotationValue::Iri(id) => Some(*id),
            AnnotationValue::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            AnnotationValue::Literal(lit) => Some(lit),
            AnnotationValue::Iri(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Annotation {
    pub property: NodeId,
    pub value: AnnotationValue,
}

impl Annotation {
    pub fn new(property: NodeId, value: AnnotationValue) -> Self {
        Self { property, value }
    }

    fn map_ids(&self, f: &mut impl FnMut(NodeId) -> NodeId) -> Annotation {
        Annotation {
            property: f(self.property),
            value: match &self.value {
                AnnotationValue::Iri(id) => AnnotationValue::Iri(f(*id)),
                AnnotationValue::Literal(lit) => AnnotationValue::Literal(lit.clone()),
            },
        }
    }

    fn visit_ids(&self, f: &mut impl FnMut(NodeId)) {
        f(self.property);
        if let AnnotationValue::Iri(id) = &self.value {
            f(*id);
        }
    }
}

// ============================================================================
// Axioms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Class,
    ObjectProperty,
    DataProperty,
    AnnotationProperty,
    NamedIndividual,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AxiomBody {
    Declaration { entity: NodeId, kind: EntityKind },
    SubClassOf { sub: ClassExpr, sup: ClassExpr },
    EquivalentClasses(Vec<ClassExpr>),
    DisjointClasses(Vec<ClassExpr>),
    AnnotationAssertion { subject: NodeId, annotation: Annotation },
    SubAnnotationPropertyOf { sub: NodeId, sup: NodeId },
}

/// An axiom: a logical (or annotation) body plus axiom annotations.
///
/// Two axioms with the same body but different annotations are distinct
/// members of an ontology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Axiom {
    pub body: AxiomBody,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub annotations: BTreeSet<Annotation>,
}

impl Axiom {
    pub fn new(body: AxiomBody) -> Self {
        Self {
            body,
            annotations: BTreeSet::new(),
        }
    }

    pub fn with_annotations(mut self, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        self.annotations.extend(annotations);
        self
    }

    pub fn declaration(entity: NodeId, kind: EntityKind) -> Self {
        Self::new(AxiomBody::Declaration { entity, kind })
    }

    pub fn subclass_of(sub: ClassExpr, sup: ClassExpr) -> Self {
        Self::new(AxiomBody::SubClassOf { sub, sup })
    }

    pub fn equivalent(classes: Vec<ClassExpr>) -> Self {
        Self::new(AxiomBody::EquivalentClasses(classes))
    }

    pub fn disjoint(classes: Vec<ClassExpr>) -> Self {
        Self::new(AxiomBody::DisjointClasses(classes))
    }

    pub fn annotation_assertion(subject: NodeId, property: NodeId, value: AnnotationValue) -> Self {
        Self::new(AxiomBody::AnnotationAssertion {
            subject,
            annotation: Annotation::new(property, value),
        })
    }

    /// The same axiom stripped of its axiom annotations.
    pub fn without_annotations(&self) -> Axiom {
        Axiom::new(self.body.clone())
    }

    /// Classes this axiom defines: the named sub-class of a `SubClassOf`, and
    /// every named operand of `EquivalentClasses` / `DisjointClasses`.
    pub fn defined_classes(&self) -> Vec<NodeId> {
        match &self.body {
            AxiomBody::SubClassOf { sub, .. } => sub.as_named().into_iter().collect(),
            AxiomBody::EquivalentClasses(operands) | AxiomBody::DisjointClasses(operands) => {
                operands.iter().filter_map(ClassExpr::as_named).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Named classes in the axiom's signature.
    pub fn collect_classes(&self, out: &mut NodeSet) {
        match &self.body {
            AxiomBody::Declaration { entity, kind } => {
                if *kind == EntityKind::Class {
                    out.insert(*entity);
                }
            }
            AxiomBody::SubClassOf { sub, sup } => {
                sub.collect_classes(out);
                sup.collect_classes(out);
            }
            AxiomBody::EquivalentClasses(operands) | AxiomBody::DisjointClasses(operands) => {
                for op in operands {
                    op.collect_classes(out);
                }
            }
            AxiomBody::AnnotationAssertion { .. } | AxiomBody::SubAnnotationPropertyOf { .. } => {}
        }
    }

    /// Rewrite every identifier (body and annotations) through `f`.
    pub fn map_ids(&self, f: &mut impl FnMut(NodeId) -> NodeId) -> Axiom {
        let body = match &self.body {
            AxiomBody::Declaration { entity, kind } => AxiomBody::Declaration {
                entity: f(*entity),
                kind: *kind,
            },
            AxiomBody::SubClassOf { sub, sup } => AxiomBody::SubClassOf {
                sub: sub.map_ids(f),
                sup: sup.map_ids(f),
            },
            AxiomBody::EquivalentClasses(ops) => {
                AxiomBody::EquivalentClasses(ops.iter().map(|op| op.map_ids(f)).collect())
            }
            AxiomBody::DisjointClasses(ops) => {
                AxiomBody::DisjointClasses(ops.iter().map(|op| op.map_ids(f)).collect())
            }
            AxiomBody::AnnotationAssertion {
                subject,
                annotation,
            } => AxiomBody::AnnotationAssertion {
                subject: f(*subject),
                annotation: annotation.map_ids(f),
            },
            AxiomBody::SubAnnotationPropertyOf { sub, sup } => AxiomBody::SubAnnotationPropertyOf {
                sub: f(*sub),
                sup: f(*sup),
            },
        };
        Axiom {
            body,
            annotations: self.annotations.iter().map(|a| a.map_ids(f)).collect(),
        }
    }

    /// Visit every identifier the axiom mentions.
    pub fn visit_ids(&self, f: &mut impl FnMut(NodeId)) {
        match &self.body {
            AxiomBody::Declaration { entity, .. } => f(*entity),
            AxiomBody::SubClassOf { sub, sup } => {
                sub.visit_ids(f);
                sup.visit_ids(f);
            }
            AxiomBody::EquivalentClasses(ops) | AxiomBody::DisjointClasses(ops) => {
                for op in ops {
                    op.visit_ids(f);
                }
            }
            AxiomBody::AnnotationAssertion {
                subject,
                annotation,
            } => {
                f(*subject);
                annotation.visit_ids(f);
            }
            AxiomBody::SubAnnotationPropertyOf { sub, sup } => {
                f(*sub);
                f(*sup);
            }
        }
        for annotation in &self.annotations {
            annotation.visit_ids(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(raw: u32) -> ClassExpr {
        ClassExpr::Named(NodeId::new(raw))
    }

    #[test]
    fn defined_classes_follow_axiom_shape() {
        let sub = Axiom::subclass_of(n(10), n(11));
        assert_eq!(sub.defined_classes(), vec![NodeId::new(10)]);

        let gci = Axiom::subclass_of(ClassExpr::And(vec![n(10), n(12)]), n(11));
        assert!(gci.defined_classes().is_empty());

        let eq = Axiom::equivalent(vec![n(10), ClassExpr::some(NodeId::new(20), n(11))]);
        assert_eq!(eq.defined_classes(), vec![NodeId::new(10)]);
    }

    #[test]
    fn class_signature_skips_properties() {
        let ax = Axiom::subclass_of(n(10), ClassExpr::some(NodeId::new(20), n(11)));
        let mut classes = NodeSet::new();
        ax.collect_classes(&mut classes);
        assert!(classes.contains(NodeId::new(10)));
        assert!(classes.contains(NodeId::new(11)));
        assert!(!classes.contains(NodeId::new(20)));
    }

    #[test]
    fn annotations_distinguish_axioms_but_not_bodies() {
        let base = Axiom::subclass_of(n(10), n(11));
        let annotated = base.clone().with_annotations([Annotation::new(
            NodeId::new(30),
            AnnotationValue::Literal(Literal::plain("src")),
        )]);
        assert_ne!(base, annotated);
        assert_eq!(base, annotated.without_annotations());
    }

    #[test]
    fn map_ids_rewrites_annotations_too() {
        let ax = Axiom::annotation_assertion(
            NodeId::new(2),
            NodeId::new(3),
            AnnotationValue::Iri(NodeId::new(4)),
        )
        .with_annotations([Annotation::new(NodeId::new(5), AnnotationValue::Iri(NodeId::new(6)))]);
        let shifted = ax.map_ids(&mut |id| NodeId::new(id.raw() + 100));
        let mut seen = Vec::new();
        shifted.visit_ids(&mut |id| seen.push(id.raw()));
        seen.sort();
        assert_eq!(seen, vec![102, 103, 104, 105, 106]);
    }
}
