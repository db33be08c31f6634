//! A minimal SBOL3 object layer.
//!
//! Only the classes the converter produces are modelled: `Component`,
//! `Sequence`, `SequenceFeature` and the `Range` / `Cut` locations. Any
//! property outside of the SBOL3 vocabulary is kept as an annotation on the
//! object it belongs to, and triples about unknown subjects are kept aside
//! so that reading and writing a document is lossless.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::Path;

use super::atomic::write_atomic;
use super::error::ConversionError;
use super::error::IdentifierError;
use super::error::Result;
use super::ntriples;
use super::ntriples::Term;
use super::ntriples::Triple;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

pub const SBOL_COMPONENT: &str = "http://sbols.org/v3#Component";
pub const SBOL_SEQUENCE: &str = "http://sbols.org/v3#Sequence";
pub const SBOL_SEQUENCE_FEATURE: &str = "http://sbols.org/v3#SequenceFeature";
pub const SBOL_RANGE: &str = "http://sbols.org/v3#Range";
pub const SBOL_CUT: &str = "http://sbols.org/v3#Cut";

pub const SBOL_DISPLAY_ID: &str = "http://sbols.org/v3#displayId";
pub const SBOL_HAS_NAMESPACE: &str = "http://sbols.org/v3#hasNamespace";
pub const SBOL_NAME: &str = "http://sbols.org/v3#name";
pub const SBOL_DESCRIPTION: &str = "http://sbols.org/v3#description";
pub const SBOL_TYPE: &str = "http://sbols.org/v3#type";
pub const SBOL_ROLE: &str = "http://sbols.org/v3#role";
pub const SBOL_HAS_SEQUENCE: &str = "http://sbols.org/v3#hasSequence";
pub const SBOL_HAS_FEATURE: &str = "http://sbols.org/v3#hasFeature";
pub const SBOL_HAS_LOCATION: &str = "http://sbols.org/v3#hasLocation";
pub const SBOL_ELEMENTS: &str = "http://sbols.org/v3#elements";
pub const SBOL_ENCODING: &str = "http://sbols.org/v3#encoding";
pub const SBOL_START: &str = "http://sbols.org/v3#start";
pub const SBOL_END: &str = "http://sbols.org/v3#end";
pub const SBOL_AT: &str = "http://sbols.org/v3#at";
pub const SBOL_ORIENTATION: &str = "http://sbols.org/v3#orientation";
pub const SBOL_ORDER: &str = "http://sbols.org/v3#order";

// ---------------------------------------------------------------------------

/// Properties of an object that are not part of the SBOL3 vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations(Vec<(String, Term)>);

impl Annotations {
    pub fn push<P: Into<String>>(&mut self, predicate: P, value: Term) {
        self.0.push((predicate.into(), value));
    }

    pub fn values<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.0
            .iter()
            .filter(move |(p, _)| p == predicate)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Term)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A location of a feature on a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub identity: String,
    pub display_id: String,
    pub sequence: String,
    pub kind: LocationKind,
    pub orientation: Option<String>,
    pub order: Option<i64>,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// A 1-based, inclusive interval.
    Range { start: i64, end: i64 },
    /// A point between `at` and `at + 1`.
    Cut { at: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFeature {
    pub identity: String,
    pub display_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub roles: Vec<String>,
    pub locations: Vec<Location>,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub identity: String,
    pub display_id: String,
    pub namespace: String,
    pub elements: Option<String>,
    pub encoding: Option<String>,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub identity: String,
    pub display_id: String,
    pub namespace: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub types: Vec<String>,
    pub roles: Vec<String>,
    pub sequences: Vec<String>,
    pub features: Vec<SequenceFeature>,
    pub annotations: Annotations,
}

/// A top-level object of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopLevel {
    Component(Component),
    Sequence(Sequence),
}

impl TopLevel {
    pub fn identity(&self) -> &str {
        match self {
            TopLevel::Component(c) => &c.identity,
            TopLevel::Sequence(s) => &s.identity,
        }
    }
}

impl From<Component> for TopLevel {
    fn from(component: Component) -> Self {
        TopLevel::Component(component)
    }
}

impl From<Sequence> for TopLevel {
    fn from(sequence: Sequence) -> Self {
        TopLevel::Sequence(sequence)
    }
}

// ---------------------------------------------------------------------------

/// An SBOL3 document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    objects: Vec<TopLevel>,
    others: Vec<Triple>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level object, failing if its identity is already used.
    pub fn add<T: Into<TopLevel>>(&mut self, object: T) -> std::result::Result<(), IdentifierError> {
        let object = object.into();
        if self.find(object.identity()).is_some() {
            return Err(IdentifierError::Duplicate(object.identity().to_string()));
        }
        self.objects.push(object);
        Ok(())
    }

    pub fn objects(&self) -> &[TopLevel] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn find(&self, identity: &str) -> Option<&TopLevel> {
        self.objects.iter().find(|o| o.identity() == identity)
    }

    pub fn find_sequence(&self, identity: &str) -> Option<&Sequence> {
        match self.find(identity) {
            Some(TopLevel::Sequence(s)) => Some(s),
            _ => None,
        }
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.objects.iter().filter_map(|o| match o {
            TopLevel::Component(c) => Some(c),
            TopLevel::Sequence(_) => None,
        })
    }

    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.objects.iter().filter_map(|o| match o {
            TopLevel::Sequence(s) => Some(s),
            TopLevel::Component(_) => None,
        })
    }

    /// Triples about subjects this layer does not model.
    pub fn others(&self) -> &[Triple] {
        &self.others
    }

    // -----------------------------------------------------------------------

    pub fn to_triples(&self) -> Vec<Triple> {
        let mut triples = Vec::new();
        for object in &self.objects {
            match object {
                TopLevel::Component(c) => component_triples(c, &mut triples),
                TopLevel::Sequence(s) => sequence_triples(s, &mut triples),
            }
        }
        triples.extend(self.others.iter().cloned());
        triples
    }

    pub fn from_triples<I: IntoIterator<Item = Triple>>(triples: I) -> Result<Self> {
        let mut subjects: BTreeMap<String, Properties> = BTreeMap::new();
        for triple in triples {
            subjects
                .entry(triple.subject.clone())
                .or_insert_with(|| Properties::new(triple.subject.clone()))
                .pairs
                .push((triple.predicate, triple.object));
        }

        let kinds = subjects
            .iter()
            .map(|(s, props)| (s.clone(), props.types()))
            .collect::<BTreeMap<_, _>>();
        let is = |subject: &str, class: &str| {
            kinds
                .get(subject)
                .map(|types| types.iter().any(|t| t == class))
                .unwrap_or(false)
        };

        let mut document = Document::new();
        let mut consumed = HashSet::new();
        let top_levels = subjects
            .keys()
            .filter(|s| is(s, SBOL_COMPONENT) || is(s, SBOL_SEQUENCE))
            .cloned()
            .collect::<Vec<_>>();

        for subject in top_levels {
            if is(&subject, SBOL_SEQUENCE) {
                let mut props = subjects.remove(&subject).unwrap_or_default();
                props.take_iris(RDF_TYPE);
                let sequence = Sequence {
                    display_id: props.take_required_literal(SBOL_DISPLAY_ID)?,
                    namespace: props.take_iri(SBOL_HAS_NAMESPACE).unwrap_or_default(),
                    elements: props.take_literal(SBOL_ELEMENTS),
                    encoding: props.take_iri(SBOL_ENCODING),
                    annotations: props.into_annotations(),
                    identity: subject.clone(),
                };
                consumed.insert(subject);
                document.add(sequence)?;
                continue;
            }

            let mut props = subjects.remove(&subject).unwrap_or_default();
            props.take_iris(RDF_TYPE);
            let mut features = Vec::new();
            for feature_id in props.take_iris(SBOL_HAS_FEATURE) {
                if !is(&feature_id, SBOL_SEQUENCE_FEATURE) {
                    return Err(ConversionError::InvalidProperty {
                        subject: subject.clone(),
                        property: SBOL_HAS_FEATURE,
                        value: feature_id,
                    }
                    .into());
                }
                let mut fprops = subjects.remove(&feature_id).unwrap_or_default();
                fprops.take_iris(RDF_TYPE);
                let mut locations = Vec::new();
                for location_id in fprops.take_iris(SBOL_HAS_LOCATION) {
                    let mut lprops = subjects.remove(&location_id).unwrap_or_default();
                    lprops.take_iris(RDF_TYPE);
                    let kind = if is(&location_id, SBOL_RANGE) {
                        LocationKind::Range {
                            start: lprops.take_required_integer(SBOL_START)?,
                            end: lprops.take_required_integer(SBOL_END)?,
                        }
                    } else if is(&location_id, SBOL_CUT) {
                        LocationKind::Cut {
                            at: lprops.take_required_integer(SBOL_AT)?,
                        }
                    } else {
                        return Err(ConversionError::InvalidProperty {
                            subject: feature_id,
                            property: SBOL_HAS_LOCATION,
                            value: location_id,
                        }
                        .into());
                    };
                    locations.push(Location {
                        display_id: lprops.take_required_literal(SBOL_DISPLAY_ID)?,
                        sequence: lprops.take_required_iri(SBOL_HAS_SEQUENCE)?,
                        orientation: lprops.take_iri(SBOL_ORIENTATION),
                        order: lprops.take_integer(SBOL_ORDER)?,
                        kind,
                        annotations: lprops.into_annotations(),
                        identity: location_id.clone(),
                    });
                    consumed.insert(location_id);
                }
                features.push(SequenceFeature {
                    display_id: fprops.take_required_literal(SBOL_DISPLAY_ID)?,
                    name: fprops.take_literal(SBOL_NAME),
                    description: fprops.take_literal(SBOL_DESCRIPTION),
                    roles: fprops.take_iris(SBOL_ROLE),
                    locations,
                    annotations: fprops.into_annotations(),
                    identity: feature_id.clone(),
                });
                consumed.insert(feature_id);
            }
            let component = Component {
                display_id: props.take_required_literal(SBOL_DISPLAY_ID)?,
                namespace: props.take_iri(SBOL_HAS_NAMESPACE).unwrap_or_default(),
                name: props.take_literal(SBOL_NAME),
                description: props.take_literal(SBOL_DESCRIPTION),
                types: props.take_iris(SBOL_TYPE),
                roles: props.take_iris(SBOL_ROLE),
                sequences: props.take_iris(SBOL_HAS_SEQUENCE),
                features,
                annotations: props.into_annotations(),
                identity: subject.clone(),
            };
            consumed.insert(subject);
            document.add(component)?;
        }

        // anything left is a subject we do not model
        for (subject, props) in subjects {
            if consumed.contains(&subject) {
                continue;
            }
            for (predicate, object) in props.pairs {
                document
                    .others
                    .push(Triple::new(subject.clone(), predicate, object));
            }
        }

        Ok(document)
    }

    pub fn to_ntriples(&self) -> String {
        ntriples::to_sorted_string(&self.to_triples())
    }

    pub fn from_ntriples(text: &str) -> Result<Self> {
        Self::from_triples(ntriples::parse(text)?)
    }

    /// Read a document serialized as N-Triples.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ntriples(&text)
    }

    /// Write the document as sorted N-Triples, replacing the file atomically.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomic(path, self.to_ntriples().as_bytes())?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------

fn integer(value: i64) -> Term {
    Term::typed(value.to_string(), XSD_INTEGER)
}

fn annotation_triples(subject: &str, annotations: &Annotations, out: &mut Vec<Triple>) {
    for (predicate, value) in annotations.iter() {
        out.push(Triple::new(subject, predicate.as_str(), value.clone()));
    }
}

fn location_triples(l: &Location, out: &mut Vec<Triple>) {
    let id = l.identity.as_str();
    match l.kind {
        LocationKind::Range { start, end } => {
            out.push(Triple::new(id, RDF_TYPE, Term::iri(SBOL_RANGE)));
            out.push(Triple::new(id, SBOL_START, integer(start)));
            out.push(Triple::new(id, SBOL_END, integer(end)));
        }
        LocationKind::Cut { at } => {
            out.push(Triple::new(id, RDF_TYPE, Term::iri(SBOL_CUT)));
            out.push(Triple::new(id, SBOL_AT, integer(at)));
        }
    }
    out.push(Triple::new(id, SBOL_DISPLAY_ID, Term::string(l.display_id.as_str())));
    out.push(Triple::new(id, SBOL_HAS_SEQUENCE, Term::iri(l.sequence.as_str())));
    if let Some(orientation) = &l.orientation {
        out.push(Triple::new(id, SBOL_ORIENTATION, Term::iri(orientation.as_str())));
    }
    if let Some(order) = l.order {
        out.push(Triple::new(id, SBOL_ORDER, integer(order)));
    }
    annotation_triples(id, &l.annotations, out);
}

fn feature_triples(f: &SequenceFeature, out: &mut Vec<Triple>) {
    let id = f.identity.as_str();
    out.push(Triple::new(id, RDF_TYPE, Term::iri(SBOL_SEQUENCE_FEATURE)));
    out.push(Triple::new(id, SBOL_DISPLAY_ID, Term::string(f.display_id.as_str())));
    if let Some(name) = &f.name {
        out.push(Triple::new(id, SBOL_NAME, Term::string(name.as_str())));
    }
    if let Some(description) = &f.description {
        out.push(Triple::new(id, SBOL_DESCRIPTION, Term::string(description.as_str())));
    }
    for role in &f.roles {
        out.push(Triple::new(id, SBOL_ROLE, Term::iri(role.as_str())));
    }
    for location in &f.locations {
        out.push(Triple::new(id, SBOL_HAS_LOCATION, Term::iri(location.identity.as_str())));
        location_triples(location, out);
    }
    annotation_triples(id, &f.annotations, out);
}

fn component_triples(c: &Component, out: &mut Vec<Triple>) {
    let id = c.identity.as_str();
    out.push(Triple::new(id, RDF_TYPE, Term::iri(SBOL_COMPONENT)));
    out.push(Triple::new(id, SBOL_DISPLAY_ID, Term::string(c.display_id.as_str())));
    if !c.namespace.is_empty() {
        out.push(Triple::new(id, SBOL_HAS_NAMESPACE, Term::iri(c.namespace.as_str())));
    }
    if let Some(name) = &c.name {
        out.push(Triple::new(id, SBOL_NAME, Term::string(name.as_str())));
    }
    if let Some(description) = &c.description {
        out.push(Triple::new(id, SBOL_DESCRIPTION, Term::string(description.as_str())));
    }
    for t in &c.types {
        out.push(Triple::new(id, SBOL_TYPE, Term::iri(t.as_str())));
    }
    for role in &c.roles {
        out.push(Triple::new(id, SBOL_ROLE, Term::iri(role.as_str())));
    }
    for sequence in &c.sequences {
        out.push(Triple::new(id, SBOL_HAS_SEQUENCE, Term::iri(sequence.as_str())));
    }
    for feature in &c.features {
        out.push(Triple::new(id, SBOL_HAS_FEATURE, Term::iri(feature.identity.as_str())));
        feature_triples(feature, out);
    }
    annotation_triples(id, &c.annotations, out);
}

fn sequence_triples(s: &Sequence, out: &mut Vec<Triple>) {
    let id = s.identity.as_str();
    out.push(Triple::new(id, RDF_TYPE, Term::iri(SBOL_SEQUENCE)));
    out.push(Triple::new(id, SBOL_DISPLAY_ID, Term::string(s.display_id.as_str())));
    if !s.namespace.is_empty() {
        out.push(Triple::new(id, SBOL_HAS_NAMESPACE, Term::iri(s.namespace.as_str())));
    }
    if let Some(elements) = &s.elements {
        out.push(Triple::new(id, SBOL_ELEMENTS, Term::string(elements.as_str())));
    }
    if let Some(encoding) = &s.encoding {
        out.push(Triple::new(id, SBOL_ENCODING, Term::iri(encoding.as_str())));
    }
    annotation_triples(id, &s.annotations, out);
}

// ---------------------------------------------------------------------------

/// The predicate/object pairs of a single subject, consumed as the typed
/// object is rebuilt.
#[derive(Debug, Default)]
struct Properties {
    subject: String,
    pairs: Vec<(String, Term)>,
}

impl Properties {
    fn new(subject: String) -> Self {
        Properties {
            subject,
            pairs: Vec::new(),
        }
    }

    fn types(&self) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(p, _)| p == RDF_TYPE)
            .filter_map(|(_, o)| o.as_iri().map(String::from))
            .collect()
    }

    fn take(&mut self, predicate: &str) -> Vec<Term> {
        let mut taken = Vec::new();
        let mut i = 0;
        while i < self.pairs.len() {
            if self.pairs[i].0 == predicate {
                taken.push(self.pairs.remove(i).1);
            } else {
                i += 1;
            }
        }
        taken
    }

    fn take_iris(&mut self, predicate: &str) -> Vec<String> {
        self.take(predicate)
            .into_iter()
            .filter_map(|t| match t {
                Term::Iri(iri) => Some(iri),
                Term::Literal { .. } => None,
            })
            .collect()
    }

    fn take_iri(&mut self, predicate: &str) -> Option<String> {
        self.take_iris(predicate).into_iter().next()
    }

    fn take_literal(&mut self, predicate: &str) -> Option<String> {
        self.take(predicate).into_iter().find_map(|t| match t {
            Term::Literal { value, .. } => Some(value),
            Term::Iri(_) => None,
        })
    }

    fn take_integer(&mut self, predicate: &'static str) -> Result<Option<i64>> {
        match self.take_literal(predicate) {
            None => Ok(None),
            Some(value) => match value.trim().parse::<i64>() {
                Ok(n) => Ok(Some(n)),
                Err(_) => Err(ConversionError::InvalidProperty {
                    subject: self.subject.clone(),
                    property: predicate,
                    value,
                }
                .into()),
            },
        }
    }

    fn missing(&self, property: &'static str) -> ConversionError {
        ConversionError::MissingProperty {
            subject: self.subject.clone(),
            property,
        }
    }

    fn take_required_literal(&mut self, predicate: &'static str) -> Result<String> {
        match self.take_literal(predicate) {
            Some(value) => Ok(value),
            None => Err(self.missing(predicate).into()),
        }
    }

    fn take_required_iri(&mut self, predicate: &'static str) -> Result<String> {
        match self.take_iri(predicate) {
            Some(value) => Ok(value),
            None => Err(self.missing(predicate).into()),
        }
    }

    fn take_required_integer(&mut self, predicate: &'static str) -> Result<i64> {
        match self.take_integer(predicate)? {
            Some(value) => Ok(value),
            None => Err(self.missing(predicate).into()),
        }
    }

    fn into_annotations(self) -> Annotations {
        Annotations(self.pairs)
    }
}
