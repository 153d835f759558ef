//! Copy the axioms describing a node set into a standalone graph.

use ontomod_model::{Axiom, EntityKind, GraphStore, ImportsScope, NodeSet, OntologyId};

/// The extracted subset: the final node set and the graph built from it.
///
/// The graph shares the source vocabulary, so node ids mean the same thing
/// in both.
#[derive(Debug, Clone)]
pub struct SubsetGraph {
    nodes: NodeSet,
    graph: GraphStore,
}

impl SubsetGraph {
    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn into_graph(self) -> GraphStore {
        self.graph
    }

    pub fn set_ontology_iri(&mut self, iri: impl Into<String>) {
        self.graph.root_mut().id = OntologyId::named(iri);
    }
}

/// For every node: a class declaration, its defining axioms and its
/// annotation assertions. Axioms keep references to nodes outside the set.
pub fn materialize(store: &GraphStore, nodes: &NodeSet, scope: ImportsScope) -> SubsetGraph {
    let mut graph = store.derive_empty(OntologyId::default());
    for node in nodes.iter() {
        let root = graph.root_mut();
        root.add_axiom(Axiom::declaration(node, EntityKind::Class));
        for axiom in store.defining_axioms(node, scope) {
            root.add_axiom(axiom.clone());
        }
        for axiom in store.annotation_assertions(node, scope) {
            root.add_axiom(axiom.clone());
        }
    }
    tracing::info!(
        classes = nodes.len(),
        axioms = graph.root().len(),
        "materialized subset"
    );
    SubsetGraph {
        nodes: nodes.clone(),
        graph,
    }
}
