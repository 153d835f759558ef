//! Seed collection.
//!
//! Seeds come from class expression queries, tag membership and explicit
//! term lists. Every source is parsed and resolved first ([`SeedCollector::prepare`]),
//! so a bad query or an unreadable term file fails before the oracle is
//! asked anything. Evaluation then merges all sources into one [`NodeSet`].

use crate::error::{ConfigurationError, ExtractError};
use ontomod_dsl::{parse_class_expr, parse_term_list, ClassExprAst, EntityRef};
use ontomod_model::{well_known, AxiomBody, ClassExpr, GraphStore, ImportsScope, NodeId, NodeSet, PrefixMap};
use ontomod_reasoner::ReasoningOracle;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// A class expression; its sub-classes and equivalents are seeds, and its
    /// super-classes too when `with_ancestors` is set.
    Query {
        expression: String,
        with_ancestors: bool,
    },
    /// A tag IRI, CURIE or name; its member classes are seeds.
    Tag(String),
    /// Explicit class identifiers.
    Terms(Vec<String>),
    /// A file with one identifier per line.
    TermFile(PathBuf),
}

/// A seed source after parsing and resolution.
#[derive(Debug, Clone)]
enum Prepared {
    Query {
        expr: ClassExpr,
        with_ancestors: bool,
    },
    Tag(String),
    Terms(Vec<String>),
}

pub struct SeedCollector<'a> {
    store: &'a GraphStore,
    prefixes: &'a PrefixMap,
    scope: ImportsScope,
}

/// Where an entity reference occurs in a class expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Class,
    Property,
}

impl<'a> SeedCollector<'a> {
    pub fn new(store: &'a GraphStore, prefixes: &'a PrefixMap, scope: ImportsScope) -> Self {
        Self {
            store,
            prefixes,
            scope,
        }
    }

    /// Gather the seed set from all sources.
    pub fn collect<O: ReasoningOracle + ?Sized>(
        &self,
        oracle: &O,
        sources: &[SeedSource],
    ) -> Result<NodeSet, ExtractError> {
        let prepared = self.prepare(sources)?;
        let mut seeds = NodeSet::new();
        for source in &prepared {
            match source {
                Prepared::Query {
                    expr,
                    with_ancestors,
                } => self.add_query_results(oracle, expr, *with_ancestors, &mut seeds)?,
                Prepared::Tag(tag) => {
                    for member in self.resolve_tag(tag).iter() {
                        if seeds.insert(member) {
                            tracing::debug!(class = %self.store.iri(member), "adding tagged class");
                        }
                    }
                }
                Prepared::Terms(iris) => self.add_terms(iris, &mut seeds),
            }
        }
        tracing::info!(seeds = seeds.len(), "collected initial subset");
        Ok(seeds)
    }

    fn prepare(&self, sources: &[SeedSource]) -> Result<Vec<Prepared>, ConfigurationError> {
        let mut prepared = Vec::with_capacity(sources.len());
        for source in sources {
            prepared.push(match source {
                SeedSource::Query {
                    expression,
                    with_ancestors,
                } => Prepared::Query {
                    expr: self.resolve_query(expression)?,
                    with_ancestors: *with_ancestors,
                },
                SeedSource::Tag(tag) => Prepared::Tag(tag.clone()),
                SeedSource::Terms(terms) => Prepared::Terms(self.expand_terms(terms)?),
                SeedSource::TermFile(path) => {
                    let text = std::fs::read_to_string(path).map_err(|source| {
                        ConfigurationError::TermFile {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    Prepared::Terms(self.expand_terms(&parse_term_list(&text))?)
                }
            });
        }
        Ok(prepared)
    }

    fn expand_terms(&self, terms: &[String]) -> Result<Vec<String>, ConfigurationError> {
        terms
            .iter()
            .map(|t| self.prefixes.expand(t).map_err(ConfigurationError::from))
            .collect()
    }

    // ========================================================================
    // Query seeds
    // ========================================================================

    /// Parse a query and bind every entity reference to a store identifier.
    pub fn resolve_query(&self, query: &str) -> Result<ClassExpr, ConfigurationError> {
        let ast = parse_class_expr(query).map_err(|source| ConfigurationError::Query {
            query: query.to_string(),
            source,
        })?;
        self.bind(query, &ast)
    }

    fn bind(&self, query: &str, ast: &ClassExprAst) -> Result<ClassExpr, ConfigurationError> {
        Ok(match ast {
            ClassExprAst::Entity(entity) => {
                ClassExpr::Named(self.bind_entity(query, entity, Position::Class)?)
            }
            ClassExprAst::Some { property, filler } => ClassExpr::some(
                self.bind_entity(query, property, Position::Property)?,
                self.bind(query, filler)?,
            ),
            ClassExprAst::And(parts) => ClassExpr::And(
                parts
                    .iter()
                    .map(|p| self.bind(query, p))
                    .collect::<Result<_, _>>()?,
            ),
            ClassExprAst::Or(parts) => ClassExpr::Or(
                parts
                    .iter()
                    .map(|p| self.bind(query, p))
                    .collect::<Result<_, _>>()?,
            ),
            ClassExprAst::Not(inner) => ClassExpr::Not(Box::new(self.bind(query, inner)?)),
        })
    }

    /// Labels bind to a class in class positions and to a non-class in
    /// property positions; the lowest id wins among several candidates.
    fn bind_entity(
        &self,
        query: &str,
        entity: &EntityRef,
        position: Position,
    ) -> Result<NodeId, ConfigurationError> {
        let unresolved = || ConfigurationError::UnresolvedEntity {
            query: query.to_string(),
            entity: entity.to_string(),
        };
        match entity {
            EntityRef::Label(label) => {
                let labelled = self.store.entities_with_label(label, ImportsScope::Included);
                let classes = self.store.classes(ImportsScope::Included);
                let candidates = match position {
                    Position::Class => labelled.intersection(&classes),
                    Position::Property => labelled.difference(&classes),
                };
                let first = candidates.iter().next();
                first.ok_or_else(unresolved)
            }
            _ => {
                let iri = self.prefixes.resolve(entity).map_err(|_| unresolved())?;
                self.store.id_of(&iri).ok_or_else(unresolved)
            }
        }
    }

    fn add_query_results<O: ReasoningOracle + ?Sized>(
        &self,
        oracle: &O,
        expr: &ClassExpr,
        with_ancestors: bool,
        seeds: &mut NodeSet,
    ) -> Result<(), ExtractError> {
        let mut add = |class: NodeId, what: &str| {
            if !class.is_reserved() && seeds.insert(class) {
                tracing::debug!(class = %self.store.iri(class), "adding {what}");
            }
        };
        if let Some(class) = expr.as_named() {
            add(class, "queried class");
        }
        for class in oracle.sub_classes(expr, false)?.iter() {
            add(class, "subclass");
        }
        for class in oracle.equivalent_classes(expr)?.iter() {
            add(class, "equivalent class");
        }
        if with_ancestors {
            for class in oracle.super_classes(expr, false)?.iter() {
                add(class, "superclass");
            }
        }
        Ok(())
    }

    // ========================================================================
    // Tag seeds
    // ========================================================================

    /// Classes tagged with `tag` (an IRI, a CURIE, or the tag's local name or
    /// label). Unknown tags resolve to the empty set.
    pub fn resolve_tag(&self, tag: &str) -> NodeSet {
        let Some(in_subset) = self.store.id_of(well_known::IN_SUBSET) else {
            tracing::debug!(tag, "no tag annotations in ontology");
            return NodeSet::new();
        };

        let tag_ids: NodeSet = match self.prefixes.expand(tag) {
            Ok(iri) => self.store.id_of(&iri).into_iter().collect(),
            Err(_) => self
                .tag_values(in_subset)
                .iter()
                .filter(|&id| self.tag_matches_name(id, tag))
                .collect(),
        };

        let classes = self.store.classes(self.scope);
        let mut members = NodeSet::new();
        for tag_id in tag_ids.iter() {
            members.union_with(&self.store.subjects_with(in_subset, tag_id, self.scope));
        }
        let members = members.intersection(&classes).without_reserved();
        if members.is_empty() {
            tracing::debug!(tag, "tag has no member classes");
        }
        members
    }

    /// Every IRI used as a tag value.
    fn tag_values(&self, in_subset: NodeId) -> NodeSet {
        self.store
            .axioms(self.scope)
            .filter_map(|axiom| match &axiom.body {
                AxiomBody::AnnotationAssertion { annotation, .. }
                    if annotation.property == in_subset =>
                {
                    annotation.value.as_iri()
                }
                _ => None,
            })
            .collect()
    }

    fn tag_matches_name(&self, tag: NodeId, name: &str) -> bool {
        let iri = self.store.iri(tag);
        let local = iri.rsplit(['#', '/']).next().unwrap_or(iri);
        local == name || self.store.label(tag) == Some(name)
    }

    // ========================================================================
    // Explicit seeds
    // ========================================================================

    fn add_terms(&self, iris: &[String], seeds: &mut NodeSet) {
        for iri in iris {
            match self.store.id_of(iri) {
                Some(id) if !id.is_reserved() && self.store.contains_class(id, self.scope) => {
                    if seeds.insert(id) {
                        tracing::debug!(class = %iri, "adding selected class");
                    }
                }
                _ => tracing::debug!(term = %iri, "term is not a class of the ontology"),
            }
        }
    }
}
