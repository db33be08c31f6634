//! Error types for the conversion pipelines.

use std::fmt;

use thiserror::Error;

use super::ntriples::SyntaxError;

/// The position of a record, and optionally of one of its features, in the
/// document being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub record: usize,
    pub feature: Option<usize>,
}

impl Site {
    pub fn record(record: usize) -> Self {
        Site {
            record,
            feature: None,
        }
    }

    pub fn feature(record: usize, feature: usize) -> Self {
        Site {
            record,
            feature: Some(feature),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.feature {
            Some(feature) => write!(f, "record {}, feature {}", self.record, feature),
            None => write!(f, "record {}", self.record),
        }
    }
}

/// Malformed or out-of-bounds source data.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{site}: invalid residue {residue:?} at position {position}")]
    InvalidResidue {
        site: Site,
        position: usize,
        residue: char,
    },
    #[error("{site}: location {start}..{end} outside of sequence of length {length}")]
    OutOfBounds {
        site: Site,
        start: i64,
        end: i64,
        length: usize,
    },
    #[error("{site}: invalid date {day}-{month}-{year}")]
    InvalidDate {
        site: Site,
        year: i32,
        month: u32,
        day: u32,
    },
    #[error("parser failed: {0}")]
    Syntax(String),
}

/// Identity allocation failures.
#[derive(Debug, Error)]
pub enum IdentifierError {
    #[error("invalid namespace {0:?}: expected an http(s):// or urn: prefix")]
    InvalidNamespace(String),
    #[error("{site}: identity {identity:?} is already taken in this document")]
    Collision { site: Site, identity: String },
    #[error("document already contains an object named {0:?}")]
    Duplicate(String),
}

/// Mapping-rule failures and missing structural elements.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{site}: component {component:?} has no sequence")]
    MissingSequence { site: Site, component: String },
    #[error("missing required property {property} on {subject:?}")]
    MissingProperty {
        subject: String,
        property: &'static str,
    },
    #[error("invalid value {value:?} for {property} on {subject:?}")]
    InvalidProperty {
        subject: String,
        property: &'static str,
        value: String,
    },
    #[error("{site}: malformed extraneous property {literal:?}")]
    MalformedField { site: Site, literal: String },
    #[error("{site}: malformed location layout {layout:?}: {reason}")]
    MalformedLayout {
        site: Site,
        layout: String,
        reason: String,
    },
    #[error("{site}: layout refers to span #{index} but feature has {count} spans")]
    DanglingSpan {
        site: Site,
        index: usize,
        count: usize,
    },
    #[error("{site}: location {start}..{end} outside of sequence of length {length}")]
    SpanOutOfBounds {
        site: Site,
        start: i64,
        end: i64,
        length: usize,
    },
    #[error("no output path given for write")]
    MissingOutput,
}

/// Any failure of a conversion.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
