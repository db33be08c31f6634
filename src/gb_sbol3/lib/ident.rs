//! Deterministic identities for the objects created during a conversion.

use std::collections::HashSet;

use super::error::IdentifierError;
use super::error::Site;

/// The namespace under which a converted document is minted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(uri: &str) -> Result<Self, IdentifierError> {
        let trimmed = uri.trim_end_matches('/');
        let valid_scheme = ["http://", "https://", "urn:"]
            .iter()
            .any(|scheme| trimmed.starts_with(scheme) && trimmed.len() > scheme.len());
        if !valid_scheme || trimmed.chars().any(char::is_whitespace) {
            return Err(IdentifierError::InvalidNamespace(uri.to_string()));
        }
        Ok(Namespace(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Turn an arbitrary string into a valid display id.
///
/// Runs of characters outside `[A-Za-z0-9_]` collapse into a single `_`,
/// and a `_` is prepended when the result would start with a digit.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    let mut in_run = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    match out.chars().next() {
        None => String::from("_"),
        Some(c) if c.is_ascii_digit() => format!("_{}", out),
        Some(_) => out,
    }
}

pub fn is_valid_display_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// The identities allocated while building one document.
#[derive(Debug, Default)]
pub struct IdScope {
    taken: HashSet<String>,
}

impl IdScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `parent/display_id`, where `candidate` is sanitized first.
    ///
    /// Returns the display id and the full identity.
    pub fn allocate(
        &mut self,
        parent: &str,
        candidate: &str,
        site: Site,
    ) -> Result<(String, String), IdentifierError> {
        let display_id = sanitize(candidate);
        let identity = format!("{}/{}", parent, display_id);
        if !self.taken.insert(identity.clone()) {
            return Err(IdentifierError::Collision { site, identity });
        }
        Ok((display_id, identity))
    }

    /// Claim `candidate`, falling back to `candidate_{index}`, then to
    /// `candidate_{index}_2`, `candidate_{index}_3` and so on until a free
    /// identity is found.
    pub fn allocate_indexed(
        &mut self,
        parent: &str,
        candidate: &str,
        index: usize,
    ) -> (String, String) {
        let base = sanitize(candidate);
        let mut display_id = base.clone();
        let mut attempt = 1;
        loop {
            let identity = format!("{}/{}", parent, display_id);
            if self.taken.insert(identity.clone()) {
                return (display_id, identity);
            }
            attempt += 1;
            let suffixed = match attempt {
                2 => format!("{}_{}", base, index),
                n => format!("{}_{}_{}", base, index, n - 1),
            };
            tracing::warn!(taken = %identity, %suffixed, "identity collision, appending index");
            display_id = suffixed;
        }
    }
}
