//! Class expression syntax (Manchester-like subset).
//!
//! Supported forms, loosest binding first:
//!
//! ```text
//! expr    := conj ("or" conj)*
//! conj    := unary ("and" unary)*
//! unary   := "not" unary | entity "some" unary | primary
//! primary := "(" expr ")" | entity
//! entity  := "<" IRI ">" | "'" label "'" | word
//! ```
//!
//! A bare `word` is classified as a full IRI when it contains `://`, as a
//! CURIE when it contains `:`, and as a label otherwise. Keywords are
//! lowercase and may not be used as bare words.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{char as pchar, multispace0, multispace1},
    combinator::{all_consuming, verify},
    error::{Error as NomError, ErrorKind},
    multi::many0,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const KEYWORDS: &[&str] = &["and", "or", "not", "some"];

/// Deepest nesting of parentheses, `not` and `some` a query may use.
pub const MAX_NESTING: usize = 64;

// ============================================================================
// AST
// ============================================================================

/// A textual reference to a named entity, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// A full IRI, written `<...>` or bare with a scheme.
    Iri(String),
    /// A compact IRI `prefix:local`.
    Curie { prefix: String, local: String },
    /// A human-readable label (`'quoted'` or a single bare word).
    Label(String),
}

impl EntityRef {
    /// `true` for references that carry an identifier rather than a label.
    pub fn is_identifier(&self) -> bool {
        !matches!(self, EntityRef::Label(_))
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Iri(iri) => write!(f, "<{iri}>"),
            EntityRef::Curie { prefix, local } => write!(f, "{prefix}:{local}"),
            EntityRef::Label(label) => write!(f, "'{label}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassExprAst {
    Entity(EntityRef),
    Some {
        property: EntityRef,
        filler: Box<ClassExprAst>,
    },
    And(Vec<ClassExprAst>),
    Or(Vec<ClassExprAst>),
    Not(Box<ClassExprAst>),
}

impl ClassExprAst {
    /// The entity, when the whole expression is a single named reference.
    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            ClassExprAst::Entity(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ClassExprAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, parts: &[ClassExprAst], op: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{part}")?;
            }
            write!(f, ")")
        }

        match self {
            ClassExprAst::Entity(e) => write!(f, "{e}"),
            ClassExprAst::Some { property, filler } => write!(f, "({property} some {filler})"),
            ClassExprAst::And(parts) => join(f, parts, "and"),
            ClassExprAst::Or(parts) => join(f, parts, "or"),
            ClassExprAst::Not(inner) => write!(f, "(not {inner})"),
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid class expression `{input}` at offset {offset}: {message}")]
pub struct ClassExprParseError {
    pub input: String,
    pub offset: usize,
    pub message: String,
}

/// Parse a complete class expression.
pub fn parse_class_expr(text: &str) -> Result<ClassExprAst, ClassExprParseError> {
    if text.trim().is_empty() {
        return Err(ClassExprParseError {
            input: text.to_string(),
            offset: 0,
            message: "empty class expression".to_string(),
        });
    }

    all_consuming(terminated(|i| expr(i, 0), multispace0))(text)
        .map(|(_, ast)| ast)
        .map_err(|e| to_parse_error(text, e, "expected a class expression"))
}

/// Parse a single entity reference (an identifier or a label), e.g. a
/// `--term` or `--follow-property` argument.
pub fn parse_entity_ref(text: &str) -> Result<EntityRef, ClassExprParseError> {
    all_consuming(delimited(multispace0, entity, multispace0))(text)
        .map(|(_, e)| e)
        .map_err(|e| to_parse_error(text, e, "expected `<IRI>`, a CURIE or a label"))
}

fn to_parse_error(
    text: &str,
    err: nom::Err<NomError<&str>>,
    message: &str,
) -> ClassExprParseError {
    let (offset, message) = match &err {
        nom::Err::Failure(e) if e.code == ErrorKind::TooLarge => (
            text.len() - e.input.len(),
            format!("expression nested deeper than {MAX_NESTING} levels"),
        ),
        nom::Err::Error(e) | nom::Err::Failure(e) => (text.len() - e.input.len(), message.to_string()),
        nom::Err::Incomplete(_) => (text.len(), message.to_string()),
    };
    ClassExprParseError {
        input: text.to_string(),
        offset,
        message,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '/' | '#' | '%' | '~')
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (rest, matched) = tag(kw)(input)?;
        if rest.chars().next().map(is_word_char).unwrap_or(false) {
            return Err(nom::Err::Error(NomError::new(input, ErrorKind::Tag)));
        }
        Ok((rest, matched))
    }
}

fn expr(input: &str, depth: usize) -> IResult<&str, ClassExprAst> {
    let (input, first) = conj(input, depth)?;
    let (input, rest) = many0(preceded(
        tuple((multispace0, keyword("or"))),
        |i| conj(i, depth),
    ))(input)?;
    Ok((input, fold_nary(first, rest, ClassExprAst::Or)))
}

fn conj(input: &str, depth: usize) -> IResult<&str, ClassExprAst> {
    let (input, first) = unary(input, depth)?;
    let (input, rest) = many0(preceded(
        tuple((multispace0, keyword("and"))),
        |i| unary(i, depth),
    ))(input)?;
    Ok((input, fold_nary(first, rest, ClassExprAst::And)))
}

fn fold_nary(
    first: ClassExprAst,
    rest: Vec<ClassExprAst>,
    build: fn(Vec<ClassExprAst>) -> ClassExprAst,
) -> ClassExprAst {
    if rest.is_empty() {
        return first;
    }
    let mut parts = Vec::with_capacity(rest.len() + 1);
    parts.push(first);
    parts.extend(rest);
    build(parts)
}

/// Every nesting level passes through here, so the depth limit is checked
/// once. Exceeding it is a `Failure` so `alt` does not backtrack.
fn unary(input: &str, depth: usize) -> IResult<&str, ClassExprAst> {
    if depth > MAX_NESTING {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    preceded(
        multispace0,
        alt((
            |i| negation(i, depth),
            |i| restriction(i, depth),
            |i| primary(i, depth),
        )),
    )(input)
}

fn negation(input: &str, depth: usize) -> IResult<&str, ClassExprAst> {
    let (input, _) = keyword("not")(input)?;
    let (input, inner) = unary(input, depth + 1)?;
    Ok((input, ClassExprAst::Not(Box::new(inner))))
}

fn restriction(input: &str, depth: usize) -> IResult<&str, ClassExprAst> {
    let (input, property) = entity(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = keyword("some")(input)?;
    let (input, filler) = unary(input, depth + 1)?;
    Ok((
        input,
        ClassExprAst::Some {
            property,
            filler: Box::new(filler),
        },
    ))
}

fn primary(input: &str, depth: usize) -> IResult<&str, ClassExprAst> {
    alt((|i| parenthesized(i, depth), entity_expr))(input)
}

fn parenthesized(input: &str, depth: usize) -> IResult<&str, ClassExprAst> {
    delimited(
        pchar('('),
        |i| expr(i, depth + 1),
        preceded(multispace0, pchar(')')),
    )(input)
}

fn entity_expr(input: &str) -> IResult<&str, ClassExprAst> {
    let (input, e) = entity(input)?;
    Ok((input, ClassExprAst::Entity(e)))
}

fn entity(input: &str) -> IResult<&str, EntityRef> {
    alt((iri_ref, quoted_label, bare_word))(input)
}

fn iri_ref(input: &str) -> IResult<&str, EntityRef> {
    let (input, iri) = delimited(pchar('<'), is_not(">"), pchar('>'))(input)?;
    Ok((input, EntityRef::Iri(iri.trim().to_string())))
}

fn quoted_label(input: &str) -> IResult<&str, EntityRef> {
    let (input, label) = delimited(pchar('\''), is_not("'"), pchar('\''))(input)?;
    Ok((input, EntityRef::Label(label.to_string())))
}

fn bare_word(input: &str) -> IResult<&str, EntityRef> {
    let (input, word) = verify(take_while1(is_word_char), |w: &str| {
        !KEYWORDS.contains(&w)
    })(input)?;
    Ok((input, classify_word(word)))
}

fn classify_word(word: &str) -> EntityRef {
    if word.contains("://") || word.starts_with("urn:") {
        return EntityRef::Iri(word.to_string());
    }
    match word.split_once(':') {
        Some((prefix, local)) => EntityRef::Curie {
            prefix: prefix.to_string(),
            local: local.to_string(),
        },
        None => EntityRef::Label(word.to_string()),
    }
}
