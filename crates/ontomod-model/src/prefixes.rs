//! CURIE expansion.
//!
//! Known prefixes expand by concatenation. Any other prefix that looks like
//! an OBO ID space (`GO`, `UBERON`, `NCBITaxon`, ...) expands the OBO way:
//! `GO:0005634` → `http://purl.obolibrary.org/obo/GO_0005634`.

use crate::well_known;
use ontomod_dsl::{parse_entity_ref, EntityRef};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefixError {
    #[error("`{0}` is not a valid identifier (expected `<IRI>` or a CURIE)")]
    Syntax(String),
    #[error("`{0}` is a label, not an identifier")]
    NotAnIdentifier(String),
    #[error("cannot expand CURIE `{prefix}:{local}`: unknown prefix")]
    UnknownPrefix { prefix: String, local: String },
}

#[derive(Debug, Clone)]
pub struct PrefixMap {
    prefixes: BTreeMap<String, String>,
}

impl PrefixMap {
    /// An empty map (OBO ID-space fallback still applies).
    pub fn empty() -> Self {
        Self {
            prefixes: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn expand_curie(&self, prefix: &str, local: &str) -> Result<String, PrefixError> {
        if let Some(ns) = self.prefixes.get(prefix) {
            return Ok(format!("{ns}{local}"));
        }
        if is_obo_id_space(prefix) && !local.is_empty() {
            return Ok(format!("{}{prefix}_{local}", well_known::OBO_NS));
        }
        Err(PrefixError::UnknownPrefix {
            prefix: prefix.to_string(),
            local: local.to_string(),
        })
    }

    /// Resolve an identifier reference to a full IRI. Labels are rejected.
    pub fn resolve(&self, entity: &EntityRef) -> Result<String, PrefixError> {
        match entity {
            EntityRef::Iri(iri) => Ok(iri.clone()),
            EntityRef::Curie { prefix, local } => self.expand_curie(prefix, local),
            EntityRef::Label(label) => Err(PrefixError::NotAnIdentifier(label.clone())),
        }
    }

    /// Parse and resolve a textual identifier (`<IRI>`, bare IRI or CURIE).
    pub fn expand(&self, text: &str) -> Result<String, PrefixError> {
        let entity = parse_entity_ref(text).map_err(|_| PrefixError::Syntax(text.to_string()))?;
        self.resolve(&entity)
    }

    /// Compact an IRI for display; OBO PURLs become `IDSPACE:LOCAL`.
    pub fn shorten(&self, iri: &str) -> String {
        if let Some(rest) = iri.strip_prefix(well_known::OBO_NS) {
            if let Some((space, local)) = rest.split_once('_') {
                if is_obo_id_space(space) && !local.contains('/') {
                    return format!("{space}:{local}");
                }
            }
        }
        let best = self
            .prefixes
            .iter()
            .filter(|(_, ns)| iri.starts_with(ns.as_str()) && ns.len() < iri.len())
            .max_by_key(|(_, ns)| ns.len());
        match best {
            Some((prefix, ns)) => format!("{prefix}:{}", &iri[ns.len()..]),
            None => iri.to_string(),
        }
    }
}

impl Default for PrefixMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.add("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        map.add("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        map.add("owl", "http://www.w3.org/2002/07/owl#");
        map.add("xsd", "http://www.w3.org/2001/XMLSchema#");
        map.add("oboInOwl", well_known::OBO_IN_OWL_NS);
        map.add("obo", well_known::OBO_NS);
        map.add("dc", "http://purl.org/dc/elements/1.1/");
        map.add("dcterms", "http://purl.org/dc/terms/");
        map
    }
}

fn is_obo_id_space(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_and_obo_prefixes() {
        let map = PrefixMap::default();
        assert_eq!(
            map.expand("owl:Thing").unwrap(),
            "http://www.w3.org/2002/07/owl#Thing"
        );
        assert_eq!(
            map.expand("GO:0005634").unwrap(),
            "http://purl.obolibrary.org/obo/GO_0005634"
        );
        assert_eq!(
            map.expand("<http://example.org/x>").unwrap(),
            "http://example.org/x"
        );
    }

    #[test]
    fn rejects_labels_and_bad_syntax() {
        let map = PrefixMap::default();
        assert!(matches!(map.expand("nucleus"), Err(PrefixError::NotAnIdentifier(_))));
        assert!(matches!(map.expand("GO:1 GO:2"), Err(PrefixError::Syntax(_))));
        assert!(matches!(map.expand("9bad:1"), Err(PrefixError::UnknownPrefix { .. })));
        assert!(matches!(map.expand("GO:"), Err(PrefixError::UnknownPrefix { .. })));
    }

    #[test]
    fn shortens_obo_purls() {
        let map = PrefixMap::default();
        assert_eq!(map.shorten("http://purl.obolibrary.org/obo/GO_0005634"), "GO:0005634");
        assert_eq!(map.shorten("http://www.w3.org/2002/07/owl#Thing"), "owl:Thing");
        assert_eq!(map.shorten("http://example.org/x"), "http://example.org/x");
    }
}
