//! Dangling and obsolete classes.

use ontomod_model::{well_known, AxiomBody, GraphStore, ImportsScope, NodeId};

/// A class is dangling when nothing describes it: no defining axiom in the
/// imports closure (disjointness and `SubClassOf owl:Thing` do not count)
/// and no annotation assertion.
pub fn is_dangling(store: &GraphStore, class: NodeId) -> bool {
    let defined = store
        .defining_axioms(class, ImportsScope::Included)
        .any(|axiom| match &axiom.body {
            AxiomBody::SubClassOf { sup, .. } => !sup.is_top(),
            AxiomBody::DisjointClasses(_) => false,
            _ => true,
        });
    if defined {
        return false;
    }
    store
        .annotation_assertions(class, ImportsScope::Included)
        .next()
        .is_none()
}

/// `owl:deprecated "true"^^xsd:boolean`.
pub fn is_obsolete(store: &GraphStore, class: NodeId) -> bool {
    let Some(deprecated) = store.id_of(well_known::OWL_DEPRECATED) else {
        return false;
    };
    store
        .annotation_assertions(class, ImportsScope::Included)
        .any(|axiom| match &axiom.body {
            AxiomBody::AnnotationAssertion { annotation, .. } if annotation.property == deprecated => {
                annotation.value.as_literal().is_some_and(|lit| {
                    lit.lexical == "true" && lit.datatype.as_deref() == Some(well_known::XSD_BOOLEAN)
                })
            }
            _ => false,
        })
}
