//! Gap filling.
//!
//! For each node of the working set the oracle is asked once for its
//! transitive ancestors (subsumption plus the followed properties). Ancestors
//! that pass the namespace and dangling filters join the set. Filtered
//! ancestors are skipped but do not cut the walk: the oracle already
//! returned everything above them.

use crate::config::FilterConfig;
use crate::dangling::is_dangling;
use crate::error::ExtractError;
use ontomod_model::{GraphStore, NodeSet};
use ontomod_reasoner::ReasoningOracle;

pub fn fill_gaps<O: ReasoningOracle + ?Sized>(
    store: &GraphStore,
    oracle: &O,
    config: &FilterConfig,
    seeds: &NodeSet,
) -> Result<NodeSet, ExtractError> {
    let mut result = seeds.clone();
    if !config.fill_gaps {
        return Ok(result);
    }

    let scope = config.scope();
    let properties = config.property_ids(store);
    let mut added = 0usize;
    for node in seeds.iter() {
        let ancestors = oracle.ancestors(node, &properties)?.without_reserved();
        for ancestor in ancestors.iter() {
            if result.contains(ancestor) || !store.contains_class(ancestor, scope) {
                continue;
            }
            let iri = store.iri(ancestor);
            if !config.in_scope(iri) {
                tracing::debug!(class = %iri, "skipping out-of-scope ancestor");
                continue;
            }
            if config.exclude_dangling && is_dangling(store, ancestor) {
                tracing::debug!(class = %iri, "skipping dangling ancestor");
                continue;
            }
            result.insert(ancestor);
            added += 1;
            tracing::debug!(class = %iri, "filling gap with ancestor");
        }
    }
    tracing::info!(seeds = seeds.len(), added, "gap filling done");
    Ok(result)
}
