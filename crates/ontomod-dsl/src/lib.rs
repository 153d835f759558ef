//! Ontomod surface syntaxes.
//!
//! This crate owns the small textual languages users hand to the subset
//! tooling and provides parsers + typed ASTs for each of them:
//!
//! - `class_expr`: a Manchester-like class expression subset used for DL
//!   queries (`'cell' and partOf some 'nucleus'`).
//! - `term_list`: one-identifier-per-line term files.
//!
//! Nothing here knows about a loaded ontology. Entity references stay
//! textual (`<IRI>`, `CURIE`, `'label'`) and are resolved by the callers that
//! own a vocabulary.

pub mod class_expr;
pub mod term_list;

pub use class_expr::{
    parse_class_expr, parse_entity_ref, ClassExprAst, ClassExprParseError, EntityRef, MAX_NESTING,
};
pub use term_list::parse_term_list;
