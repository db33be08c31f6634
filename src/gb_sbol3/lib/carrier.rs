//! Round-trip storage for GenBank data without an SBOL3 counterpart.
//!
//! Every field is stored as one literal annotation on the object it belongs
//! to, prefixed with its position so that the original order can be rebuilt
//! from an unordered graph:
//!
//! * `"{order}:{key}"` for a field without a value (e.g. `/pseudo`),
//! * `"{order}:{key}={value}"` otherwise.
//!
//! Backslashes and `=` inside the key are escaped with a backslash. The
//! value is the tail of the literal and is stored as-is.

use super::error::ConversionError;
use super::error::Site;
use super::ntriples::Term;
use super::ontology::GENBANK_CANONICAL_FIELD;
use super::ontology::GENBANK_CANONICAL_QUALIFIER;
use super::ontology::GENBANK_FIELD;
use super::ontology::GENBANK_ORDER;
use super::ontology::GENBANK_QUALIFIER;
use super::sbol::Annotations;
use super::sbol::XSD_INTEGER;

/// A named value, in the order it appeared in the GenBank record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub key: String,
    pub value: Option<String>,
}

impl Field {
    pub fn new<K: Into<String>>(key: K, value: Option<String>) -> Self {
        Field {
            key: key.into(),
            value,
        }
    }

    pub fn some<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Field::new(key, Some(value.into()))
    }

    pub fn none<K: Into<String>>(key: K) -> Self {
        Field::new(key, None)
    }
}

/// A position in an ordered field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    /// A field stored verbatim in the bag.
    Extraneous(&'a Field),
    /// A field whose value lives in a canonical SBOL3 property; only its
    /// key and position are recorded.
    Canonical(&'a str),
}

/// A position in an ordered field list, as read back from the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replayed {
    Extraneous(Field),
    Canonical(String),
}

/// The pair of predicates one kind of property bag is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carrier {
    pub extraneous: &'static str,
    pub canonical: &'static str,
}

/// Header fields of records, features and locations.
pub const FIELDS: Carrier = Carrier {
    extraneous: GENBANK_FIELD,
    canonical: GENBANK_CANONICAL_FIELD,
};

/// Feature qualifiers.
pub const QUALIFIERS: Carrier = Carrier {
    extraneous: GENBANK_QUALIFIER,
    canonical: GENBANK_CANONICAL_QUALIFIER,
};

impl Carrier {
    /// Store the slots into `target`, numbering them in iteration order.
    pub fn capture<'a, I>(&self, slots: I, target: &mut Annotations)
    where
        I: IntoIterator<Item = Slot<'a>>,
    {
        for (order, slot) in slots.into_iter().enumerate() {
            match slot {
                Slot::Extraneous(field) => target.push(
                    self.extraneous,
                    Term::string(encode(order, &field.key, field.value.as_deref())),
                ),
                Slot::Canonical(key) => {
                    target.push(self.canonical, Term::string(encode(order, key, None)))
                }
            }
        }
    }

    /// Read the slots back from `source` in their original order.
    pub fn replay(
        &self,
        source: &Annotations,
        site: Site,
    ) -> Result<Vec<Replayed>, ConversionError> {
        let mut entries = Vec::new();
        for (predicate, canonical) in [(self.extraneous, false), (self.canonical, true)] {
            for term in source.values(predicate) {
                let malformed = || ConversionError::MalformedField {
                    site,
                    literal: term.to_string(),
                };
                let literal = term.as_literal().ok_or_else(malformed)?;
                let (order, key, value) = decode(literal).ok_or_else(malformed)?;
                let entry = if canonical {
                    if value.is_some() {
                        return Err(malformed());
                    }
                    Replayed::Canonical(key)
                } else {
                    Replayed::Extraneous(Field { key, value })
                };
                entries.push((order, entry, literal));
            }
        }
        entries.sort_by_key(|(order, _, _)| *order);
        for pair in entries.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(ConversionError::MalformedField {
                    site,
                    literal: pair[1].2.to_string(),
                });
            }
        }
        Ok(entries.into_iter().map(|(_, entry, _)| entry).collect())
    }

    /// Capture a plain field list that has no canonical slots.
    pub fn capture_fields(&self, fields: &[Field], target: &mut Annotations) {
        self.capture(fields.iter().map(Slot::Extraneous), target)
    }

    /// Replay a field list that is expected to have no canonical slots.
    pub fn replay_fields(
        &self,
        source: &Annotations,
        site: Site,
    ) -> Result<Vec<Field>, ConversionError> {
        self.replay(source, site)?
            .into_iter()
            .map(|entry| match entry {
                Replayed::Extraneous(field) => Ok(field),
                Replayed::Canonical(key) => Err(ConversionError::MalformedField {
                    site,
                    literal: key,
                }),
            })
            .collect()
    }
}

/// Record the position of an object among its siblings.
pub fn capture_order(order: usize, target: &mut Annotations) {
    target.push(GENBANK_ORDER, Term::typed(order.to_string(), XSD_INTEGER));
}

/// Read back the position recorded with [`capture_order`].
pub fn replay_order(source: &Annotations, site: Site) -> Result<Option<usize>, ConversionError> {
    match source.values(GENBANK_ORDER).next() {
        None => Ok(None),
        Some(term) => term
            .as_literal()
            .and_then(|v| v.parse::<usize>().ok())
            .map(Some)
            .ok_or_else(|| ConversionError::MalformedField {
                site,
                literal: term.to_string(),
            }),
    }
}

pub fn encode(order: usize, key: &str, value: Option<&str>) -> String {
    let mut out = format!("{}:", order);
    for c in key.chars() {
        if c == '\\' || c == '=' {
            out.push('\\');
        }
        out.push(c);
    }
    if let Some(v) = value {
        out.push('=');
        out.push_str(v);
    }
    out
}

pub fn decode(literal: &str) -> Option<(usize, String, Option<String>)> {
    let (order, rest) = literal.split_once(':')?;
    if order.is_empty() || !order.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let order = order.parse::<usize>().ok()?;
    let mut key = String::new();
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, e @ '\\')) | Some((_, e @ '=')) => key.push(e),
                _ => return None,
            },
            '=' => return Some((order, key, Some(rest[i + 1..].to_string()))),
            c => key.push(c),
        }
    }
    Some((order, key, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site {
        Site::feature(0, 0)
    }

    #[test]
    fn encodes_absent_and_empty_values_differently() {
        assert_eq!(encode(3, "pseudo", None), "3:pseudo");
        assert_eq!(encode(3, "note", Some("")), "3:note=");
        assert_eq!(decode("3:pseudo"), Some((3, "pseudo".into(), None)));
        assert_eq!(decode("3:note="), Some((3, "note".into(), Some(String::new()))));
    }

    #[test]
    fn escapes_delimiters_in_keys() {
        let literal = encode(0, "a=b\\c", Some("x=y"));
        assert_eq!(literal, "0:a\\=b\\\\c=x=y");
        assert_eq!(
            decode(&literal),
            Some((0, "a=b\\c".into(), Some("x=y".into())))
        );
    }

    #[test]
    fn rejects_malformed_literals() {
        assert_eq!(decode("note=x"), None);
        assert_eq!(decode(":note"), None);
        assert_eq!(decode("x1:note"), None);
        assert_eq!(decode("1:bad\\escape"), None);
        assert_eq!(decode("1:trailing\\"), None);
    }

    #[test]
    fn replays_captured_fields_exactly() {
        let fields = vec![
            Field::some("note", "say \"hello\"; 1:2=3"),
            Field::none("pseudo"),
            Field::some("note", ""),
            Field::some("Gene", "LacZ\nalpha"),
            Field::some("note", "say \"hello\"; 1:2=3"),
            Field::some("db_xref", "\\back\\slash"),
        ];
        let mut bag = Annotations::default();
        QUALIFIERS.capture_fields(&fields, &mut bag);
        assert_eq!(bag.len(), fields.len());
        assert_eq!(QUALIFIERS.replay_fields(&bag, site()).unwrap(), fields);
    }

    #[test]
    fn replays_canonical_positions() {
        let label = Field::some("label", "J23101");
        let note = Field::some("note", "x");
        let mut bag = Annotations::default();
        QUALIFIERS.capture(
            vec![
                Slot::Extraneous(&note),
                Slot::Canonical("label"),
                Slot::Extraneous(&label),
            ],
            &mut bag,
        );
        let replayed = QUALIFIERS.replay(&bag, site()).unwrap();
        assert_eq!(
            replayed,
            vec![
                Replayed::Extraneous(note),
                Replayed::Canonical("label".into()),
                Replayed::Extraneous(label),
            ]
        );
        assert!(QUALIFIERS.replay_fields(&bag, site()).is_err());
    }

    #[test]
    fn replay_ignores_insertion_order() {
        let mut bag = Annotations::default();
        bag.push(GENBANK_QUALIFIER, Term::string("10:b=2"));
        bag.push(GENBANK_QUALIFIER, Term::string("2:a=1"));
        bag.push(GENBANK_FIELD, Term::string("0:kind=CDS"));
        let fields = QUALIFIERS.replay_fields(&bag, site()).unwrap();
        assert_eq!(fields, vec![Field::some("a", "1"), Field::some("b", "2")]);
        let header = FIELDS.replay_fields(&bag, site()).unwrap();
        assert_eq!(header, vec![Field::some("kind", "CDS")]);
    }

    #[test]
    fn rejects_duplicate_positions() {
        let mut bag = Annotations::default();
        bag.push(GENBANK_QUALIFIER, Term::string("1:a=1"));
        bag.push(GENBANK_CANONICAL_QUALIFIER, Term::string("1:label"));
        assert!(QUALIFIERS.replay(&bag, site()).is_err());
    }

    #[test]
    fn records_sibling_order() {
        let mut bag = Annotations::default();
        assert_eq!(replay_order(&bag, site()).unwrap(), None);
        capture_order(7, &mut bag);
        assert_eq!(replay_order(&bag, site()).unwrap(), Some(7));
    }
}
