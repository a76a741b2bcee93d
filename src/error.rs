//! Parse failures. Every variant is fatal for the run: the parser trusts
//! the upstream template completely, and a document that deviates from it
//! means the template changed, not that a definition should be skipped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unexpected element <{found}> where {expected} was expected; the document does not match the template")]
    UnexpectedElement { expected: &'static str, found: String },

    #[error("unexpected end of element content while reading {context}; the document does not match the template")]
    UnexpectedEnd { context: &'static str },

    #[error("unrecognized section heading {heading:?}")]
    UnrecognizedSection { heading: String },

    #[error("parameter {name:?} is declared across overloads with conflicting type, optionality or description")]
    AmbiguousParameter { name: String },

    #[error("cross-reference {text:?} has no href")]
    MissingHref { text: String },

    #[error("unbalanced brackets in type {0:?}")]
    UnbalancedType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
