//! Alignment of an ontology against an upper-level ontology.
//!
//! An ontology is aligned when each of its classes has some upper class
//! among its ancestors. The report lists only the top-level offenders
//! (classes whose sole ancestor is `owl:Thing`): fixing those fixes
//! everything below them.

use crate::dangling::{is_dangling, is_obsolete};
use crate::error::ExtractError;
use ontomod_model::{ClassExpr, GraphStore, ImportsScope, NodeId};
use ontomod_reasoner::{ReasoningOracle, StructuralReasoner};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentOptions {
    /// Only classes under these IRI prefixes are checked; empty checks all.
    pub base_prefixes: Vec<String>,
    pub ignore_dangling: bool,
}

impl AlignmentOptions {
    fn in_base(&self, iri: &str) -> bool {
        self.base_prefixes.is_empty() || self.base_prefixes.iter().any(|p| iri.starts_with(p.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// IRIs of top-level unaligned classes, sorted.
    pub unaligned: Vec<String>,
}

impl AlignmentReport {
    pub fn is_aligned(&self) -> bool {
        self.unaligned.is_empty()
    }

    /// One IRI per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for iri in &self.unaligned {
            out.push_str(iri);
            out.push('\n');
        }
        out
    }
}

/// Validate with the structural oracle.
pub fn validate_alignment(
    local: &GraphStore,
    upper: &GraphStore,
    options: &AlignmentOptions,
) -> Result<AlignmentReport, ExtractError> {
    validate_alignment_with(local, upper, options, StructuralReasoner::new)
}

/// Merge `local` into a copy of `upper`, build an oracle over the merge and
/// report unaligned top-level classes. Neither input is modified.
pub fn validate_alignment_with<O, F>(
    local: &GraphStore,
    upper: &GraphStore,
    options: &AlignmentOptions,
    make_oracle: F,
) -> Result<AlignmentReport, ExtractError>
where
    O: ReasoningOracle,
    F: FnOnce(&GraphStore) -> O,
{
    let mut upper_classes = upper.classes(ImportsScope::Included);
    upper_classes.remove(NodeId::THING);

    let mut merged = upper.clone();
    merged.merge_from(local);
    let oracle = make_oracle(&merged);

    let mut unaligned = Vec::new();
    for class in merged.classes(ImportsScope::Included).iter() {
        if class == NodeId::THING || upper_classes.contains(class) {
            continue;
        }
        let iri = merged.iri(class);
        if !options.in_base(iri) {
            continue;
        }
        if options.ignore_dangling && is_dangling(&merged, class) {
            continue;
        }
        if is_obsolete(&merged, class) {
            continue;
        }

        let ancestors = oracle.super_classes(&ClassExpr::Named(class), false)?;
        if !ancestors.intersection(&upper_classes).is_empty() {
            continue;
        }
        let mut strict = ancestors.clone();
        strict.remove(NodeId::THING);
        if strict.is_empty() {
            tracing::debug!(class = %iri, "top-level unaligned class");
            unaligned.push(iri.to_string());
        }
    }
    unaligned.sort();
    if !unaligned.is_empty() {
        tracing::error!(
            count = unaligned.len(),
            "ontology contains top-level unaligned classes"
        );
    }
    Ok(AlignmentReport { unaligned })
}

#[cfg(test)]
mod tests {
    use super::*;

    const UP: &str = "http://upper.org/";
    const OBO: &str = "http://purl.obolibrary.org/obo/";

    fn obo_only() -> AlignmentOptions {
        AlignmentOptions {
            base_prefixes: vec![OBO.to_string()],
            ..AlignmentOptions::default()
        }
    }

    fn upper() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_subclass(&format!("{UP}material"), &format!("{UP}entity"));
        store
    }

    #[test]
    fn reports_only_top_level_unaligned_classes() {
        let mut local = GraphStore::new();
        local.add_subclass(&format!("{OBO}X_1"), &format!("{UP}material"));
        local.add_subclass(&format!("{OBO}X_3"), &format!("{OBO}X_2"));
        local.add_label(&format!("{OBO}X_2"), "orphan");

        let report = validate_alignment(&local, &upper(), &obo_only()).unwrap();
        assert_eq!(report.unaligned, vec![format!("{OBO}X_2")]);
        assert!(!report.is_aligned());
        assert_eq!(report.to_text(), format!("{OBO}X_2\n"));
    }

    #[test]
    fn obsolete_and_out_of_base_classes_are_skipped() {
        let mut local = GraphStore::new();
        local.declare_class(&format!("{OBO}X_9"));
        local.deprecate(&format!("{OBO}X_9"));
        local.declare_class("http://elsewhere.org/Y");

        let report = validate_alignment(&local, &upper(), &obo_only()).unwrap();
        assert!(report.is_aligned());
    }

    #[test]
    fn dangling_classes_can_be_ignored() {
        let mut local = GraphStore::new();
        local.declare_class(&format!("{OBO}X_5"));

        let strict = validate_alignment(&local, &upper(), &obo_only()).unwrap();
        assert_eq!(strict.unaligned.len(), 1);

        let lenient = AlignmentOptions {
            ignore_dangling: true,
            ..obo_only()
        };
        assert!(validate_alignment(&local, &upper(), &lenient).unwrap().is_aligned());
    }

    #[test]
    fn empty_base_checks_every_class() {
        let mut local = GraphStore::new();
        local.add_label("http://elsewhere.org/Y", "why");
        local.declare_class("http://elsewhere.org/Y");
        let report = validate_alignment(&local, &upper(), &AlignmentOptions::default()).unwrap();
        assert_eq!(report.unaligned, vec!["http://elsewhere.org/Y".to_string()]);
    }
}
