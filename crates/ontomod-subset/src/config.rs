//! Extraction settings.
//!
//! [`FilterConfig`] governs gap filling; [`SubsetOptions`] adds the seed
//! sources and output identity of a full `subset` run. Both load from JSON.

use crate::error::ConfigurationError;
use crate::seeds::SeedSource;
use ontomod_model::{GraphStore, ImportsScope, NodeSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Namespaces treated as "base" by validation and normalization when the
/// caller gives none.
pub const DEFAULT_BASE_PREFIXES: &[&str] = &[
    "http://purl.obolibrary.org/obo/",
    "http://www.ebi.ac.uk/efo/",
    "http://w3id/org/biolink/",
];

pub fn default_base_prefixes() -> Vec<String> {
    DEFAULT_BASE_PREFIXES.iter().map(|p| p.to_string()).collect()
}

/// `given`, or the default base prefixes when `given` is empty.
pub fn default_base_prefixes_or(given: &[String]) -> Vec<String> {
    if given.is_empty() {
        default_base_prefixes()
    } else {
        given.to_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub include_imports: bool,
    pub fill_gaps: bool,
    pub exclude_dangling: bool,
    /// Object property IRIs whose existential edges gap filling may follow.
    /// Empty means subsumption only.
    pub follow_properties: Vec<String>,
    /// Allow-list of IRI prefixes for added ancestors (empty allows all).
    pub follow_in: Vec<String>,
    /// Deny-list of IRI prefixes for added ancestors.
    pub not_follow_in: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include_imports: true,
            fill_gaps: false,
            exclude_dangling: true,
            follow_properties: Vec::new(),
            follow_in: Vec::new(),
            not_follow_in: Vec::new(),
        }
    }
}

impl FilterConfig {
    pub fn scope(&self) -> ImportsScope {
        ImportsScope::from_flag(self.include_imports)
    }

    /// Deny-list wins; otherwise an empty allow-list admits everything.
    pub fn in_scope(&self, iri: &str) -> bool {
        if self.not_follow_in.iter().any(|p| iri.starts_with(p.as_str())) {
            return false;
        }
        self.follow_in.is_empty() || self.follow_in.iter().any(|p| iri.starts_with(p.as_str()))
    }

    /// The followed properties as ids of `store`. Properties the store has
    /// never seen cannot label an edge and are skipped.
    pub fn property_ids(&self, store: &GraphStore) -> NodeSet {
        self.follow_properties
            .iter()
            .filter_map(|iri| store.id_of(iri))
            .collect()
    }

    pub fn add_unique(list: &mut Vec<String>, value: impl Into<String>) {
        let value = value.into();
        if !list.contains(&value) {
            list.push(value);
        }
    }
}

/// Everything a `subset` run needs besides the graph and the oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsetOptions {
    #[serde(flatten)]
    pub filter: FilterConfig,
    pub queries: Vec<String>,
    pub with_ancestors: bool,
    pub tags: Vec<String>,
    pub terms: Vec<String>,
    pub term_files: Vec<PathBuf>,
    pub ontology_iri: Option<String>,
}

impl SubsetOptions {
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|err| ConfigurationError::ConfigFile {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|err| ConfigurationError::ConfigFile {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Seed sources in a fixed order: queries, tags, terms, term files.
    pub fn seed_sources(&self) -> Vec<SeedSource> {
        let mut sources: Vec<SeedSource> = self
            .queries
            .iter()
            .map(|q| SeedSource::Query {
                expression: q.clone(),
                with_ancestors: self.with_ancestors,
            })
            .collect();
        sources.extend(self.tags.iter().cloned().map(SeedSource::Tag));
        if !self.terms.is_empty() {
            sources.push(SeedSource::Terms(self.terms.clone()));
        }
        sources.extend(self.term_files.iter().cloned().map(SeedSource::TermFile));
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_admit_everything() {
        let config = FilterConfig::default();
        assert!(config.in_scope("http://example.org/A"));
        assert!(config.in_scope(""));
    }

    #[test]
    fn deny_list_beats_allow_list() {
        let config = FilterConfig {
            follow_in: vec!["http://purl.obolibrary.org/obo/".into()],
            not_follow_in: vec!["http://purl.obolibrary.org/obo/NCBITaxon_".into()],
            ..FilterConfig::default()
        };
        assert!(config.in_scope("http://purl.obolibrary.org/obo/GO_0005634"));
        assert!(!config.in_scope("http://purl.obolibrary.org/obo/NCBITaxon_9606"));
        assert!(!config.in_scope("http://example.org/A"));
    }

    #[test]
    fn options_load_from_json_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subset.json");
        std::fs::write(
            &path,
            r#"{ "fill_gaps": true, "follow_in": ["http://example.org/"], "tags": ["slim"] }"#,
        )
        .unwrap();
        let options = SubsetOptions::load(&path).unwrap();
        assert!(options.filter.fill_gaps);
        assert!(options.filter.exclude_dangling);
        assert!(options.filter.include_imports);
        assert_eq!(options.filter.follow_in, vec!["http://example.org/".to_string()]);
        assert_eq!(options.seed_sources(), vec![SeedSource::Tag("slim".into())]);
    }

    #[test]
    fn bad_config_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SubsetOptions::load(&path),
            Err(ConfigurationError::ConfigFile { .. })
        ));
    }
}
