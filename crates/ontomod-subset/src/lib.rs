//! Ontomod subset extraction.
//!
//! Given a graph store, a reasoning oracle and a seed set, compute a
//! self-contained subset of the class hierarchy:
//!
//! 1. **Seeds** ([`seeds`]): query results, tag members and explicit terms.
//! 2. **Gap filling** ([`closure`]): optionally add the ancestors that keep the
//!    hierarchy connected, under property and namespace filters.
//! 3. **Dangling pruning** ([`dangling`]): ancestors nothing describes are
//!    left out (explicit seeds never are).
//! 4. **Materialization** ([`materialize`]): copy every axiom about the final
//!    node set into a fresh graph.
//!
//! [`validate`] and [`normalize`] are companion operations over the same
//! store.

pub mod closure;
pub mod config;
pub mod dangling;
pub mod error;
pub mod materialize;
pub mod normalize;
pub mod seeds;
pub mod validate;

pub use config::{
    default_base_prefixes, default_base_prefixes_or, FilterConfig, SubsetOptions,
    DEFAULT_BASE_PREFIXES,
};
pub use dangling::{is_dangling, is_obsolete};
pub use error::{ConfigurationError, ExtractError};
pub use materialize::SubsetGraph;
pub use normalize::{normalize, NormalizeOptions, NormalizeSummary};
pub use seeds::{SeedCollector, SeedSource};
pub use validate::{validate_alignment, validate_alignment_with, AlignmentOptions, AlignmentReport};

use ontomod_model::{GraphStore, NodeId, NodeSet, PrefixMap};
use ontomod_reasoner::ReasoningOracle;

// ============================================================================
// SubsetExtractor
// ============================================================================

/// Extraction over one store and one oracle.
///
/// Configure with the builder methods, then call [`SubsetExtractor::extract`].
/// No state survives between calls except the configuration.
pub struct SubsetExtractor<'a, O: ReasoningOracle + ?Sized> {
    store: &'a GraphStore,
    oracle: &'a O,
    prefixes: PrefixMap,
    config: FilterConfig,
}

impl<'a, O: ReasoningOracle + ?Sized> SubsetExtractor<'a, O> {
    pub fn new(store: &'a GraphStore, oracle: &'a O) -> Self {
        Self {
            store,
            oracle,
            prefixes: PrefixMap::default(),
            config: FilterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_prefixes(mut self, prefixes: PrefixMap) -> Self {
        self.prefixes = prefixes;
        self
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn configure(&mut self, fill_gaps: bool, exclude_dangling: bool, include_imports: bool) -> &mut Self {
        self.config.fill_gaps = fill_gaps;
        self.config.exclude_dangling = exclude_dangling;
        self.config.include_imports = include_imports;
        self
    }

    /// Allow gap filling to follow existential edges over `property`.
    /// Ids unknown to the store's vocabulary are ignored.
    pub fn follow_property(&mut self, property: NodeId) -> &mut Self {
        match self.store.vocab().iri(property) {
            Some(iri) => FilterConfig::add_unique(&mut self.config.follow_properties, iri),
            None => tracing::debug!(id = property.raw(), "ignoring unknown property id"),
        }
        self
    }

    pub fn include_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        FilterConfig::add_unique(&mut self.config.follow_in, prefix);
        self
    }

    pub fn exclude_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        FilterConfig::add_unique(&mut self.config.not_follow_in, prefix);
        self
    }

    fn collector(&self) -> SeedCollector<'_> {
        SeedCollector::new(self.store, &self.prefixes, self.config.scope())
    }

    /// Member classes of a tag; empty when the tag is unknown.
    pub fn resolve_tag(&self, tag: &str) -> NodeSet {
        self.collector().resolve_tag(tag)
    }

    pub fn collect_seeds(&self, sources: &[SeedSource]) -> Result<NodeSet, ExtractError> {
        self.collector().collect(self.oracle, sources)
    }

    /// Seeds that are classes of the store, minus `owl:Thing`/`owl:Nothing`.
    fn known_seeds(&self, seeds: &NodeSet) -> NodeSet {
        seeds
            .intersection(&self.store.classes(self.config.scope()))
            .without_reserved()
    }

    pub fn fill_gaps(&self, seeds: &NodeSet) -> Result<NodeSet, ExtractError> {
        closure::fill_gaps(self.store, self.oracle, &self.config, &self.known_seeds(seeds))
    }

    pub fn extract(&self, seeds: &NodeSet) -> Result<SubsetGraph, ExtractError> {
        let nodes = self.fill_gaps(seeds)?;
        Ok(materialize::materialize(self.store, &nodes, self.config.scope()))
    }
}
