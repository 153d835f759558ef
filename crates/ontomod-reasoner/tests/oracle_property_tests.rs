//! The structural oracle against a naive transitive closure over random DAGs.

use std::collections::{BTreeMap, BTreeSet};

use ontomod_model::{ClassExpr, GraphStore, NodeId, NodeSet};
use ontomod_reasoner::{ReasoningOracle, StructuralReasoner};
use proptest::prelude::*;

fn iri(i: u8) -> String {
    format!("http://example.org/C{i}")
}

/// Edges `(sub, sup)` with `sub < sup`, so the told graph is acyclic.
fn arb_dag() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((0u8..10, 1u8..10), 0..30).prop_map(|pairs| {
        pairs
            .into_iter()
            .filter_map(|(a, b)| (a < b).then_some((a, b)))
            .collect()
    })
}

fn naive_ancestors(edges: &[(u8, u8)], start: u8) -> BTreeSet<u8> {
    let mut adj: BTreeMap<u8, Vec<u8>> = BTreeMap::new();
    for (a, b) in edges {
        adj.entry(*a).or_default().push(*b);
    }
    let mut seen = BTreeSet::new();
    let mut stack = vec![start];
    while let Some(cur) = stack.pop() {
        for next in adj.get(&cur).into_iter().flatten() {
            if seen.insert(*next) {
                stack.push(*next);
            }
        }
    }
    seen
}

fn build(edges: &[(u8, u8)]) -> GraphStore {
    let mut store = GraphStore::new();
    for i in 0..10 {
        store.declare_class(&iri(i));
    }
    for (a, b) in edges {
        store.add_subclass(&iri(*a), &iri(*b));
    }
    store
}

fn ids(store: &GraphStore, locals: &BTreeSet<u8>) -> NodeSet {
    locals.iter().filter_map(|i| store.id_of(&iri(*i))).collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn super_classes_match_naive_closure(edges in arb_dag(), start in 0u8..10) {
        let store = build(&edges);
        let reasoner = StructuralReasoner::new(&store);
        let class = store.id_of(&iri(start)).unwrap();

        let expected = ids(&store, &naive_ancestors(&edges, start));
        let got = reasoner.super_classes(&ClassExpr::Named(class), false).unwrap();
        prop_assert!(got.contains(NodeId::THING));
        prop_assert_eq!(got.without_reserved(), expected.clone());

        let ancestors = reasoner.ancestors(class, &NodeSet::new()).unwrap();
        prop_assert_eq!(ancestors.without_reserved(), expected);
    }

    #[test]
    fn super_and_sub_are_dual(edges in arb_dag(), x in 0u8..10, y in 0u8..10) {
        let store = build(&edges);
        let reasoner = StructuralReasoner::new(&store);
        let xi = store.id_of(&iri(x)).unwrap();
        let yi = store.id_of(&iri(y)).unwrap();

        let x_below_y = reasoner.super_classes(&ClassExpr::Named(xi), false).unwrap().contains(yi);
        let y_above_x = reasoner.sub_classes(&ClassExpr::Named(yi), false).unwrap().contains(xi);
        prop_assert_eq!(x_below_y, y_above_x);
    }

    #[test]
    fn direct_supers_are_a_subset_of_all_supers(edges in arb_dag(), start in 0u8..10) {
        let store = build(&edges);
        let reasoner = StructuralReasoner::new(&store);
        let class = ClassExpr::Named(store.id_of(&iri(start)).unwrap());

        let all = reasoner.super_classes(&class, false).unwrap();
        let direct = reasoner.super_classes(&class, true).unwrap();
        prop_assert!(all.is_superset(&direct));
        prop_assert!(!direct.is_empty());
    }
}
