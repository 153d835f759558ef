//! A told-axiom oracle.
//!
//! Answers come from the asserted hierarchy only: named `SubClassOf` and
//! `EquivalentClasses` edges, plus existential edges `C ⊑ P some D` (also
//! when they appear as conjuncts of an equivalence). No DL inference is
//! performed beyond the transitive walk over those edges.

use crate::{OracleError, RelationKind, ReasoningOracle};
use ahash::AHashMap;
use ontomod_model::{AxiomBody, ClassExpr, GraphStore, ImportsScope, NodeId, NodeSet};
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct StructuralReasoner {
    /// named sub -> named supers
    parents: AHashMap<NodeId, NodeSet>,
    /// named super -> named subs
    children: AHashMap<NodeId, NodeSet>,
    /// class -> (property, filler) told existential edges
    successors: AHashMap<NodeId, Vec<(NodeId, NodeId)>>,
    /// (property, filler) -> classes with that told edge
    predecessors: AHashMap<(NodeId, NodeId), NodeSet>,
    /// named classes told equivalent to a complex expression
    definitions: Vec<(ClassExpr, NodeId)>,
    classes: NodeSet,
    inconsistent: bool,
}

impl StructuralReasoner {
    /// Build the told graph from every axiom visible in `store`, imports
    /// included.
    pub fn new(store: &GraphStore) -> Self {
        let mut reasoner = Self {
            classes: store.classes(ImportsScope::Included),
            ..Self::default()
        };
        for axiom in store.axioms(ImportsScope::Included) {
            match &axiom.body {
                AxiomBody::SubClassOf { sub, sup } => {
                    if let Some(sub) = sub.as_named() {
                        reasoner.add_told_supers(sub, sup);
                    }
                }
                AxiomBody::EquivalentClasses(operands) => {
                    reasoner.add_equivalence(operands);
                }
                _ => {}
            }
        }
        reasoner.inconsistent = reasoner.walk_up(NodeId::THING, None).contains(NodeId::NOTHING);
        if reasoner.inconsistent {
            tracing::warn!("owl:Thing is told to be a subclass of owl:Nothing");
        }
        tracing::debug!(
            classes = reasoner.classes.len(),
            definitions = reasoner.definitions.len(),
            "structural reasoner built"
        );
        reasoner
    }

    fn add_told_supers(&mut self, sub: NodeId, sup: &ClassExpr) {
        for conjunct in sup.conjuncts() {
            match conjunct {
                ClassExpr::Named(sup) => self.add_edge(sub, *sup),
                ClassExpr::Some { property, filler } => {
                    if let Some(filler) = filler.as_named() {
                        self.successors
                            .entry(sub)
                            .or_default()
                            .push((*property, filler));
                        self.predecessors
                            .entry((*property, filler))
                            .or_default()
                            .insert(sub);
                    }
                }
                _ => {}
            }
        }
    }

    fn add_equivalence(&mut self, operands: &[ClassExpr]) {
        let named: Vec<NodeId> = operands.iter().filter_map(ClassExpr::as_named).collect();
        for &a in &named {
            for &b in &named {
                if a != b {
                    self.add_edge(a, b);
                }
            }
            for complex in operands.iter().filter(|op| op.as_named().is_none()) {
                self.add_told_supers(a, complex);
                self.definitions.push((complex.clone(), a));
            }
        }
    }

    fn add_edge(&mut self, sub: NodeId, sup: NodeId) {
        self.parents.entry(sub).or_default().insert(sup);
        self.children.entry(sup).or_default().insert(sub);
    }

    fn check_consistent(&self) -> Result<(), OracleError> {
        if self.inconsistent {
            return Err(OracleError::Inconsistent(
                "owl:Thing is subsumed by owl:Nothing".to_string(),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Walks
    // ========================================================================

    /// Everything reachable upwards from `start` (excluding `start` unless it
    /// lies on a cycle), following existential edges for `properties`.
    fn walk_up(&self, start: NodeId, properties: Option<&NodeSet>) -> NodeSet {
        let mut seen = NodeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if let Some(parents) = self.parents.get(&current) {
                for parent in parents.iter() {
                    if seen.insert(parent) {
                        queue.push_back(parent);
                    }
                }
            }
            let Some(properties) = properties else {
                continue;
            };
            for (property, filler) in self.successors.get(&current).into_iter().flatten() {
                if properties.contains(*property) && seen.insert(*filler) {
                    queue.push_back(*filler);
                }
            }
        }
        seen
    }

    fn walk_down(&self, start: NodeId) -> NodeSet {
        let mut seen = NodeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if let Some(children) = self.children.get(&current) {
                for child in children.iter() {
                    if seen.insert(child) {
                        queue.push_back(child);
                    }
                }
            }
        }
        seen
    }

    /// Named classes that are (told) subsumed by `expr`, including the named
    /// class itself.
    fn members(&self, expr: &ClassExpr) -> Result<NodeSet, OracleError> {
        match expr {
            ClassExpr::Named(id) if *id == NodeId::THING => {
                let mut all = self.classes.clone();
                all.insert(NodeId::THING);
                Ok(all)
            }
            ClassExpr::Named(id) => {
                let mut out = self.walk_down(*id);
                out.insert(*id);
                Ok(out)
            }
            ClassExpr::And(parts) => {
                let mut iter = parts.iter();
                let Some(first) = iter.next() else {
                    return self.members(&ClassExpr::Named(NodeId::THING));
                };
                let mut acc = self.members(first)?;
                for part in iter {
                    acc = acc.intersection(&self.members(part)?);
                }
                Ok(acc)
            }
            ClassExpr::Or(parts) => {
                let mut acc = NodeSet::new();
                for part in parts {
                    acc.union_with(&self.members(part)?);
                }
                Ok(acc)
            }
            ClassExpr::Some { property, filler } => {
                let fillers = self.members(filler)?;
                let mut out = NodeSet::new();
                for filler in fillers.iter() {
                    if let Some(sources) = self.predecessors.get(&(*property, filler)) {
                        for source in sources.iter() {
                            if out.insert(source) {
                                out.union_with(&self.walk_down(source));
                            }
                        }
                    }
                }
                Ok(out)
            }
            ClassExpr::Not(_) => Err(OracleError::Unsupported(
                "negation is not supported by the structural reasoner".to_string(),
            )),
        }
    }

    /// Named classes that (told) subsume `expr`, including named operands.
    fn subsumers(&self, expr: &ClassExpr) -> Result<NodeSet, OracleError> {
        let mut out = match expr {
            ClassExpr::Named(id) => {
                let mut up = self.walk_up(*id, None);
                up.insert(*id);
                up
            }
            ClassExpr::And(parts) => {
                let mut acc = NodeSet::new();
                for part in parts {
                    acc.union_with(&self.subsumers(part)?);
                }
                acc
            }
            ClassExpr::Or(parts) => {
                let mut iter = parts.iter();
                match iter.next() {
                    None => NodeSet::new(),
                    Some(first) => {
                        let mut acc = self.subsumers(first)?;
                        for part in iter {
                            acc = acc.intersection(&self.subsumers(part)?);
                        }
                        acc
                    }
                }
            }
            ClassExpr::Some { .. } => NodeSet::new(),
            ClassExpr::Not(_) => {
                return Err(OracleError::Unsupported(
                    "negation is not supported by the structural reasoner".to_string(),
                ))
            }
        };
        for (definition, class) in &self.definitions {
            if definition == expr && out.insert(*class) {
                out.union_with(&self.walk_up(*class, None));
            }
        }
        out.insert(NodeId::THING);
        Ok(out)
    }

    fn equivalents(&self, expr: &ClassExpr) -> Result<NodeSet, OracleError> {
        let members = self.members(expr)?;
        let subsumers = self.subsumers(expr)?;
        let mut out = members.intersection(&subsumers);
        if let Some(id) = expr.as_named() {
            out.remove(id);
        }
        Ok(out)
    }

    /// Keep only the elements of `set` not strictly below another element.
    fn most_specific(&self, set: &NodeSet) -> NodeSet {
        set.iter()
            .filter(|&x| {
                !set.iter().any(|y| {
                    y != x && self.walk_up(y, None).contains(x) && !self.walk_up(x, None).contains(y)
                })
            })
            .collect()
    }

    fn most_general(&self, set: &NodeSet) -> NodeSet {
        set.iter()
            .filter(|&x| {
                !set.iter().any(|y| {
                    y != x && self.walk_up(x, None).contains(y) && !self.walk_up(y, None).contains(x)
                })
            })
            .collect()
    }
}

impl ReasoningOracle for StructuralReasoner {
    fn related(&self, expr: &ClassExpr, kind: RelationKind<'_>) -> Result<NodeSet, OracleError> {
        self.check_consistent()?;
        match kind {
            RelationKind::SuperClasses { direct } => {
                let equivalents = self.equivalents(expr)?;
                let mut supers = self.subsumers(expr)?.difference(&equivalents);
                if let Some(id) = expr.as_named() {
                    supers.remove(id);
                }
                if !direct {
                    return Ok(supers);
                }
                let mut strict = supers.clone();
                strict.remove(NodeId::THING);
                if strict.is_empty() {
                    return Ok(supers);
                }
                Ok(self.most_specific(&strict))
            }
            RelationKind::SubClasses { direct } => {
                let equivalents = self.equivalents(expr)?;
                let mut subs = self.members(expr)?.difference(&equivalents);
                if let Some(id) = expr.as_named() {
                    subs.remove(id);
                }
                subs.remove(NodeId::THING);
                if direct {
                    subs.remove(NodeId::NOTHING);
                    let top = self.most_general(&subs);
                    return Ok(if top.is_empty() {
                        [NodeId::NOTHING].into_iter().collect()
                    } else {
                        top
                    });
                }
                subs.insert(NodeId::NOTHING);
                Ok(subs)
            }
            RelationKind::Equivalent => self.equivalents(expr),
            RelationKind::Ancestors { properties } => {
                let ClassExpr::Named(class) = expr else {
                    return Err(OracleError::Unsupported(format!(
                        "ancestor walks start from a named class, got {expr:?}"
                    )));
                };
                let mut out = self.walk_up(*class, Some(properties));
                out.remove(*class);
                if *class != NodeId::THING {
                    out.insert(NodeId::THING);
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontomod_model::Axiom;

    const EX: &str = "http://example.org/";

    fn id(store: &GraphStore, local: &str) -> NodeId {
        store.id_of(&format!("{EX}{local}")).unwrap()
    }

    fn set(store: &GraphStore, locals: &[&str]) -> NodeSet {
        locals.iter().map(|l| id(store, l)).collect()
    }

    fn chain() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_subclass(&format!("{EX}A"), &format!("{EX}B"));
        store.add_subclass(&format!("{EX}B"), &format!("{EX}C"));
        store.add_subclass(&format!("{EX}D"), &format!("{EX}B"));
        store
    }

    #[test]
    fn super_classes_are_transitive_and_include_top() {
        let store = chain();
        let reasoner = StructuralReasoner::new(&store);
        let a = ClassExpr::Named(id(&store, "A"));

        let mut expected = set(&store, &["B", "C"]);
        expected.insert(NodeId::THING);
        assert_eq!(reasoner.super_classes(&a, false).unwrap(), expected);
        assert_eq!(reasoner.super_classes(&a, true).unwrap(), set(&store, &["B"]));
    }

    #[test]
    fn sub_classes_include_bottom_unless_direct() {
        let store = chain();
        let reasoner = StructuralReasoner::new(&store);
        let c = ClassExpr::Named(id(&store, "C"));

        let mut expected = set(&store, &["A", "B", "D"]);
        expected.insert(NodeId::NOTHING);
        assert_eq!(reasoner.sub_classes(&c, false).unwrap(), expected);
        assert_eq!(reasoner.sub_classes(&c, true).unwrap(), set(&store, &["B"]));
    }

    #[test]
    fn named_equivalence_is_mutual() {
        let mut store = chain();
        let e = store.intern(&format!("{EX}E"));
        let b = id(&store, "B");
        store.add_axiom(Axiom::equivalent(vec![ClassExpr::Named(b), ClassExpr::Named(e)]));
        let reasoner = StructuralReasoner::new(&store);

        assert_eq!(reasoner.equivalent_classes(&ClassExpr::Named(b)).unwrap(), set(&store, &["E"]));
        let supers = reasoner.super_classes(&ClassExpr::Named(id(&store, "A")), false).unwrap();
        assert!(supers.contains(e));
        let b_supers = reasoner.super_classes(&ClassExpr::Named(b), false).unwrap();
        assert!(!b_supers.contains(e));
    }

    #[test]
    fn existential_members_and_ancestors() {
        let mut store = GraphStore::new();
        let leaf = store.add_some(&format!("{EX}leaf"), &format!("{EX}partOf"), &format!("{EX}mid"));
        store.add_subclass(&format!("{EX}mid"), &format!("{EX}root"));
        store.add_subclass(&format!("{EX}twig"), &format!("{EX}leaf"));
        let part_of = id(&store, "partOf");
        let reasoner = StructuralReasoner::new(&store);

        let query = ClassExpr::some(part_of, ClassExpr::Named(id(&store, "root")));
        let subs = reasoner.sub_classes(&query, false).unwrap().without_reserved();
        assert_eq!(subs, set(&store, &["leaf", "twig"]));

        let follow: NodeSet = [part_of].into_iter().collect();
        let with_part = reasoner.ancestors(leaf, &follow).unwrap().without_reserved();
        assert_eq!(with_part, set(&store, &["mid", "root"]));
        let without = reasoner.ancestors(leaf, &NodeSet::new()).unwrap().without_reserved();
        assert!(without.is_empty());
    }

    #[test]
    fn defined_class_is_equivalent_to_its_definition() {
        let mut store = GraphStore::new();
        let cell = store.declare_class(&format!("{EX}cell"));
        let part_of = store.intern(&format!("{EX}partOf"));
        let nucleus = store.declare_class(&format!("{EX}nucleus"));
        let part = store.intern(&format!("{EX}cellPart"));
        let definition = ClassExpr::And(vec![
            ClassExpr::Named(cell),
            ClassExpr::some(part_of, ClassExpr::Named(nucleus)),
        ]);
        store.add_axiom(Axiom::equivalent(vec![ClassExpr::Named(part), definition.clone()]));
        let reasoner = StructuralReasoner::new(&store);

        let eq = reasoner.equivalent_classes(&definition).unwrap();
        assert_eq!(eq, [part].into_iter().collect());
        let supers = reasoner.super_classes(&ClassExpr::Named(part), false).unwrap();
        assert!(supers.contains(cell));
    }

    #[test]
    fn negation_is_unsupported() {
        let store = chain();
        let reasoner = StructuralReasoner::new(&store);
        let not_a = ClassExpr::Not(Box::new(ClassExpr::Named(id(&store, "A"))));
        assert!(matches!(
            reasoner.sub_classes(&not_a, false),
            Err(OracleError::Unsupported(_))
        ));
    }

    #[test]
    fn thing_below_nothing_is_inconsistent() {
        let mut store = chain();
        store.add_axiom(Axiom::subclass_of(
            ClassExpr::Named(NodeId::THING),
            ClassExpr::Named(NodeId::NOTHING),
        ));
        let reasoner = StructuralReasoner::new(&store);
        let a = ClassExpr::Named(id(&store, "A"));
        assert!(matches!(
            reasoner.super_classes(&a, false),
            Err(OracleError::Inconsistent(_))
        ));
    }
}
