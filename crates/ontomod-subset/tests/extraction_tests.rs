//! End-to-end extraction scenarios, with stub and structural oracles.

use std::collections::BTreeMap;
use std::io::Write as _;

use ontomod_model::{ClassExpr, GraphStore, NodeId, NodeSet};
use ontomod_reasoner::{OracleError, ReasoningOracle, RelationKind, StructuralReasoner};
use ontomod_subset::{
    ConfigurationError, ExtractError, FilterConfig, SeedSource, SubsetExtractor, SubsetOptions,
};

const EX: &str = "http://example.org/";

fn ex(local: &str) -> String {
    format!("{EX}{local}")
}

fn ids(store: &GraphStore, locals: &[&str]) -> NodeSet {
    locals
        .iter()
        .map(|l| store.id_of(&ex(l)).expect("known IRI"))
        .collect()
}

/// An oracle over a fixed is-a graph, independent of the store's axioms.
struct StubOracle {
    parents: BTreeMap<NodeId, Vec<NodeId>>,
}

impl StubOracle {
    fn new(edges: &[(NodeId, NodeId)]) -> Self {
        let mut parents: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for (sub, sup) in edges {
            parents.entry(*sub).or_default().push(*sup);
        }
        Self { parents }
    }

    fn up(&self, start: NodeId) -> NodeSet {
        let mut seen = NodeSet::new();
        let mut stack = vec![start];
        while let Some(cur) = stack.pop() {
            for next in self.parents.get(&cur).into_iter().flatten() {
                if seen.insert(*next) {
                    stack.push(*next);
                }
            }
        }
        seen
    }
}

impl ReasoningOracle for StubOracle {
    fn related(&self, expr: &ClassExpr, kind: RelationKind<'_>) -> Result<NodeSet, OracleError> {
        let Some(class) = expr.as_named() else {
            return Err(OracleError::Unsupported("stub answers named classes only".into()));
        };
        match kind {
            RelationKind::Ancestors { .. } | RelationKind::SuperClasses { .. } => {
                let mut up = self.up(class);
                up.insert(NodeId::THING);
                Ok(up)
            }
            RelationKind::SubClasses { .. } => Ok(self
                .parents
                .keys()
                .copied()
                .filter(|c| self.up(*c).contains(class))
                .collect()),
            RelationKind::Equivalent => Ok(NodeSet::new()),
        }
    }
}

/// An oracle that always fails, to check error propagation.
struct BrokenOracle;

impl ReasoningOracle for BrokenOracle {
    fn related(&self, _: &ClassExpr, _: RelationKind<'_>) -> Result<NodeSet, OracleError> {
        Err(OracleError::Inconsistent("broken".into()))
    }
}

// ============================================================================
// Dangling exclusion
// ============================================================================

/// `A ⊑ B ⊑ C` in the oracle; the store only declares `B`.
fn dangling_fixture() -> (GraphStore, StubOracle) {
    let mut store = GraphStore::new();
    let a = store.declare_class(&ex("A"));
    let b = store.declare_class(&ex("B"));
    let c = store.declare_class(&ex("C"));
    store.add_label(&ex("A"), "ay");
    store.add_label(&ex("C"), "cee");
    let oracle = StubOracle::new(&[(a, b), (b, c)]);
    (store, oracle)
}

#[test]
fn dangling_intermediate_is_excluded_when_requested() {
    let (store, oracle) = dangling_fixture();
    let seeds = ids(&store, &["A", "C"]);

    let mut extractor = SubsetExtractor::new(&store, &oracle);
    extractor.configure(true, true, true);
    assert_eq!(extractor.extract(&seeds).unwrap().nodes(), &ids(&store, &["A", "C"]));

    extractor.configure(true, false, true);
    assert_eq!(
        extractor.extract(&seeds).unwrap().nodes(),
        &ids(&store, &["A", "B", "C"])
    );
}

#[test]
fn dangling_exclusion_never_drops_explicit_seeds() {
    let (store, oracle) = dangling_fixture();
    let seeds = ids(&store, &["A", "B"]);
    let mut extractor = SubsetExtractor::new(&store, &oracle);
    extractor.configure(true, true, true);
    let nodes = extractor.extract(&seeds).unwrap().nodes().clone();
    assert!(nodes.is_superset(&seeds));
    assert!(nodes.contains(store.id_of(&ex("C")).unwrap()));
}

// ============================================================================
// Property and namespace filters
// ============================================================================

fn part_of_fixture() -> GraphStore {
    let mut store = GraphStore::new();
    store.add_some(&ex("leaf"), &ex("partOf"), &ex("mid"));
    store.add_subclass(&ex("mid"), &ex("root"));
    store.add_label(&ex("root"), "root");
    store
}

#[test]
fn followed_property_and_subsumption_are_both_traversed() {
    let store = part_of_fixture();
    let oracle = StructuralReasoner::new(&store);
    let seeds = ids(&store, &["leaf"]);

    let mut extractor = SubsetExtractor::new(&store, &oracle);
    extractor.configure(true, true, true);
    extractor.follow_property(store.id_of(&ex("partOf")).unwrap());
    assert_eq!(
        extractor.extract(&seeds).unwrap().nodes(),
        &ids(&store, &["leaf", "mid", "root"])
    );

    let mut plain = SubsetExtractor::new(&store, &oracle);
    plain.configure(true, true, true);
    assert_eq!(plain.extract(&seeds).unwrap().nodes(), &ids(&store, &["leaf"]));
}

#[test]
fn out_of_scope_intermediates_do_not_block_traversal() {
    let mut store = GraphStore::new();
    store.add_subclass(&ex("kept/A"), &ex("skipped/B"));
    store.add_subclass(&ex("skipped/B"), &ex("kept/C"));
    store.add_label(&ex("kept/C"), "cee");
    let oracle = StructuralReasoner::new(&store);

    let mut extractor = SubsetExtractor::new(&store, &oracle);
    extractor.configure(true, true, true).exclude_prefix(ex("skipped/"));
    let nodes = extractor.extract(&ids(&store, &["kept/A"])).unwrap().nodes().clone();
    assert_eq!(nodes, ids(&store, &["kept/A", "kept/C"]));
}

#[test]
fn allow_list_restricts_added_ancestors_but_not_seeds() {
    let mut store = GraphStore::new();
    store.add_subclass(&ex("other/A"), &ex("mine/B"));
    store.add_subclass(&ex("mine/B"), &ex("other/C"));
    let oracle = StructuralReasoner::new(&store);

    let mut extractor = SubsetExtractor::new(&store, &oracle);
    extractor.configure(true, false, true).include_prefix(ex("mine/"));
    let nodes = extractor.extract(&ids(&store, &["other/A"])).unwrap().nodes().clone();
    assert_eq!(nodes, ids(&store, &["other/A", "mine/B"]));
}

// ============================================================================
// Tags, seeds and errors
// ============================================================================

#[test]
fn tag_resolution_by_name() {
    let mut store = GraphStore::new();
    store.declare_class(&ex("X"));
    store.declare_class(&ex("Y"));
    store.declare_class(&ex("Z"));
    store.add_tag(&ex("X"), &ex("T"));
    store.add_tag(&ex("Y"), &ex("T"));
    let oracle = StructuralReasoner::new(&store);
    let extractor = SubsetExtractor::new(&store, &oracle);

    assert_eq!(extractor.resolve_tag("T"), ids(&store, &["X", "Y"]));
    assert!(extractor.resolve_tag("unknown").is_empty());
}

#[test]
fn seed_sources_merge_with_set_semantics() {
    let mut store = GraphStore::new();
    store.add_subclass(&ex("A"), &ex("B"));
    store.add_subclass(&ex("C"), &ex("B"));
    store.add_tag(&ex("A"), &ex("T"));
    let oracle = StructuralReasoner::new(&store);
    let extractor = SubsetExtractor::new(&store, &oracle);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("terms.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "# seeds").unwrap();
    writeln!(file, "<{}>", ex("C")).unwrap();
    writeln!(file).unwrap();
    writeln!(file, "{} duplicate", ex("A")).unwrap();
    drop(file);

    let seeds = extractor
        .collect_seeds(&[
            SeedSource::Tag("T".into()),
            SeedSource::Terms(vec![ex("A")]),
            SeedSource::TermFile(path),
        ])
        .unwrap();
    assert_eq!(seeds, ids(&store, &["A", "C"]));
}

#[test]
fn bad_query_fails_before_the_oracle_is_consulted() {
    let mut store = GraphStore::new();
    store.declare_class(&ex("A"));
    let extractor = SubsetExtractor::new(&store, &BrokenOracle);

    let err = extractor
        .collect_seeds(&[
            SeedSource::Query {
                expression: format!("<{}>", ex("A")),
                with_ancestors: false,
            },
            SeedSource::Query {
                expression: "A and".into(),
                with_ancestors: false,
            },
        ])
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Configuration(ConfigurationError::Query { .. })
    ));
}

#[test]
fn missing_term_file_is_a_configuration_error() {
    let store = GraphStore::new();
    let oracle = StructuralReasoner::new(&store);
    let extractor = SubsetExtractor::new(&store, &oracle);
    let err = extractor
        .collect_seeds(&[SeedSource::TermFile("/nonexistent/terms.txt".into())])
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Configuration(ConfigurationError::TermFile { .. })
    ));
}

#[test]
fn oracle_failure_aborts_extraction() {
    let mut store = GraphStore::new();
    let a = store.declare_class(&ex("A"));
    let mut extractor = SubsetExtractor::new(&store, &BrokenOracle);
    extractor.configure(true, true, true);
    let err = extractor.extract(&[a].into_iter().collect()).unwrap_err();
    assert!(matches!(err, ExtractError::OracleUnavailable(_)));

    extractor.configure(false, true, true);
    assert!(extractor.extract(&[a].into_iter().collect()).is_ok());
}

#[test]
fn negated_query_is_unsupported_by_the_structural_oracle() {
    let mut store = GraphStore::new();
    store.declare_class(&ex("A"));
    let oracle = StructuralReasoner::new(&store);
    let extractor = SubsetExtractor::new(&store, &oracle);
    let err = extractor
        .collect_seeds(&[SeedSource::Query {
            expression: format!("not <{}>", ex("A")),
            with_ancestors: false,
        }])
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::OracleUnavailable(OracleError::Unsupported(_))
    ));
}

#[test]
fn options_drive_a_full_run() {
    let mut store = GraphStore::new();
    store.add_subclass(&ex("A"), &ex("B"));
    store.add_label(&ex("B"), "bee");
    let oracle = StructuralReasoner::new(&store);

    let options = SubsetOptions {
        filter: FilterConfig {
            fill_gaps: true,
            ..FilterConfig::default()
        },
        terms: vec![ex("A")],
        ontology_iri: Some(ex("subset")),
        ..SubsetOptions::default()
    };
    let extractor = SubsetExtractor::new(&store, &oracle).with_config(options.filter.clone());
    let seeds = extractor.collect_seeds(&options.seed_sources()).unwrap();
    let mut subset = extractor.extract(&seeds).unwrap();
    if let Some(iri) = &options.ontology_iri {
        subset.set_ontology_iri(iri.clone());
    }

    assert_eq!(subset.nodes(), &ids(&store, &["A", "B"]));
    assert_eq!(subset.graph().root().id.iri.as_deref(), Some(ex("subset").as_str()));
    // declarations for A and B, A ⊑ B, label of B
    assert_eq!(subset.graph().root().len(), 4);
}
