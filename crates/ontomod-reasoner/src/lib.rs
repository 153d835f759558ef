//! Ontomod reasoning oracle.
//!
//! Extraction never inspects subsumption itself: it asks a
//! [`ReasoningOracle`]. The oracle has one required capability,
//! [`ReasoningOracle::related`], and the usual queries (super-classes,
//! sub-classes, equivalents, relation-aware ancestors) are derived from it.
//!
//! Results follow the OWL API conventions: super-class sets include
//! `owl:Thing`, sub-class sets include `owl:Nothing`, and neither contains the
//! queried class or its equivalents.

pub mod structural;

pub use structural::StructuralReasoner;

use ontomod_model::{ClassExpr, NodeId, NodeSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// `owl:Thing` is unsatisfiable; every answer would be vacuous.
    #[error("ontology is inconsistent: {0}")]
    Inconsistent(String),
    #[error("unsupported class expression: {0}")]
    Unsupported(String),
}

/// What to ask the oracle about a class expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelationKind<'a> {
    SuperClasses { direct: bool },
    SubClasses { direct: bool },
    Equivalent,
    /// Transitive ancestors of a named class via subsumption and the given
    /// object properties (`C ⊑ P some D` makes `D` an ancestor when `P` is
    /// listed).
    Ancestors { properties: &'a NodeSet },
}

pub trait ReasoningOracle {
    fn related(&self, expr: &ClassExpr, kind: RelationKind<'_>) -> Result<NodeSet, OracleError>;

    fn super_classes(&self, expr: &ClassExpr, direct: bool) -> Result<NodeSet, OracleError> {
        self.related(expr, RelationKind::SuperClasses { direct })
    }

    fn sub_classes(&self, expr: &ClassExpr, direct: bool) -> Result<NodeSet, OracleError> {
        self.related(expr, RelationKind::SubClasses { direct })
    }

    fn equivalent_classes(&self, expr: &ClassExpr) -> Result<NodeSet, OracleError> {
        self.related(expr, RelationKind::Equivalent)
    }

    fn ancestors(&self, class: NodeId, properties: &NodeSet) -> Result<NodeSet, OracleError> {
        self.related(&ClassExpr::Named(class), RelationKind::Ancestors { properties })
    }
}

impl<T: ReasoningOracle + ?Sized> ReasoningOracle for &T {
    fn related(&self, expr: &ClassExpr, kind: RelationKind<'_>) -> Result<NodeSet, OracleError> {
        (**self).related(expr, kind)
    }
}

impl<T: ReasoningOracle + ?Sized> ReasoningOracle for Box<T> {
    fn related(&self, expr: &ClassExpr, kind: RelationKind<'_>) -> Result<NodeSet, OracleError> {
        (**self).related(expr, kind)
    }
}
