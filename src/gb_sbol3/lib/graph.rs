//! Adapter between intermediate records and SBOL3 objects.
//!
//! Each [`Record`] becomes a root [`Component`] owning one [`Sequence`] and
//! one [`SequenceFeature`] per feature. Values with a canonical slot are
//! written there; everything else goes through the carrier so that the
//! record can be rebuilt exactly.

use gb_io::seq::Topology;

use super::carrier;
use super::carrier::Field;
use super::carrier::Replayed;
use super::carrier::Slot;
use super::carrier::FIELDS;
use super::carrier::QUALIFIERS;
use super::error::ConversionError;
use super::error::Result;
use super::error::Site;
use super::ident::IdScope;
use super::ident::Namespace;
use super::location::from_sbol_range;
use super::location::to_sbol_range;
use super::location::FeatureLocation;
use super::location::Span;
use super::location::Strand;
use super::ontology;
use super::record::Feature;
use super::record::Record;
use super::sbol::Annotations;
use super::sbol::Component;
use super::sbol::Document;
use super::sbol::Location;
use super::sbol::LocationKind;
use super::sbol::Sequence;
use super::sbol::SequenceFeature;

/// Qualifiers stored in canonical SBOL3 properties: `/label` in the name,
/// `/note` in the description.
const LABEL: &str = "label";
const NOTE: &str = "note";

// ---------------------------------------------------------------------------

/// Map the `index`-th record of a file to its component and sequence.
pub fn to_graph(
    record: &Record,
    index: usize,
    namespace: &Namespace,
    scope: &mut IdScope,
) -> Result<(Component, Sequence)> {
    let candidate = match &record.name {
        Some(name) if !name.trim().is_empty() => name.clone(),
        _ => match record.accession() {
            Some(accession) if !accession.trim().is_empty() => accession.to_string(),
            _ => format!("record{}", index + 1),
        },
    };
    let (display_id, identity) = scope.allocate_indexed(namespace.as_str(), &candidate, index + 1);
    let (sequence_id, sequence_identity) = scope.allocate_indexed(
        namespace.as_str(),
        &format!("{}_sequence", display_id),
        index + 1,
    );
    tracing::debug!(record = index, %identity, "mapping record");

    let molecule_type = record.molecule_type();
    let sequence = Sequence {
        identity: sequence_identity.clone(),
        display_id: sequence_id,
        namespace: namespace.as_str().to_string(),
        elements: Some(record.sequence.clone()),
        encoding: Some(ontology::encoding(molecule_type).to_string()),
        annotations: Annotations::default(),
    };

    let topology = match record.topology {
        Topology::Linear => ontology::SO_LINEAR,
        Topology::Circular => ontology::SO_CIRCULAR,
    };
    let mut annotations = Annotations::default();
    carrier::capture_order(index, &mut annotations);
    FIELDS.capture_fields(&record.metadata, &mut annotations);

    let mut features = Vec::with_capacity(record.features.len());
    for (i, feature) in record.features.iter().enumerate() {
        features.push(feature_to_graph(
            feature,
            i,
            Site::feature(index, i),
            &identity,
            &sequence_identity,
            scope,
        )?);
    }

    let component = Component {
        identity,
        display_id,
        namespace: namespace.as_str().to_string(),
        name: record.name.clone(),
        description: record.definition.clone(),
        types: vec![
            ontology::molecule_sbo(molecule_type).to_string(),
            topology.to_string(),
        ],
        roles: Vec::new(),
        sequences: vec![sequence_identity],
        features,
        annotations,
    };
    Ok((component, sequence))
}

fn feature_to_graph(
    feature: &Feature,
    index: usize,
    site: Site,
    parent: &str,
    sequence: &str,
    scope: &mut IdScope,
) -> Result<SequenceFeature> {
    let candidate = feature
        .qualifier("locus_tag")
        .or_else(|| feature.qualifier(LABEL))
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(feature.kind.as_str());
    let (display_id, identity) = scope.allocate_indexed(parent, candidate, index + 1);
    tracing::debug!(feature = index, kind = %feature.kind, %identity, "mapping feature");

    let (role, reversible) = ontology::feature_role(&feature.kind);
    let mut header = Vec::new();
    if !reversible {
        header.push(Field::some("kind", feature.kind.as_str()));
    }
    if let Some(layout) = &feature.location.layout {
        header.push(Field::some("layout", layout.as_str()));
    }

    let mut name = None;
    let mut description = None;
    let slots = feature
        .qualifiers
        .iter()
        .map(|q| match (q.key.as_str(), &q.value) {
            (LABEL, Some(value)) if name.is_none() => {
                name = Some(value.clone());
                Slot::Canonical(LABEL)
            }
            (NOTE, Some(value)) if description.is_none() => {
                description = Some(value.clone());
                Slot::Canonical(NOTE)
            }
            _ => Slot::Extraneous(q),
        })
        .collect::<Vec<_>>();

    let mut annotations = Annotations::default();
    carrier::capture_order(index, &mut annotations);
    FIELDS.capture_fields(&header, &mut annotations);
    QUALIFIERS.capture(slots, &mut annotations);

    let mut locations = Vec::with_capacity(feature.location.spans.len());
    for (i, span) in feature.location.spans.iter().enumerate() {
        let mut fields = Vec::new();
        let kind = match *span {
            Span::Range {
                start,
                end,
                before,
                after,
                ..
            } => {
                if before {
                    fields.push(Field::none("before"));
                }
                if after {
                    fields.push(Field::none("after"));
                }
                let (start, end) = to_sbol_range(start, end);
                LocationKind::Range { start, end }
            }
            Span::Between { start, end, .. } => {
                if end != start + 1 {
                    fields.push(Field::some("between_end", end.to_string()));
                }
                LocationKind::Cut { at: start }
            }
        };
        let candidate = match kind {
            LocationKind::Range { .. } => format!("Range{}", i + 1),
            LocationKind::Cut { .. } => format!("Cut{}", i + 1),
        };
        let (display_id, location_identity) = scope.allocate(&identity, &candidate, site)?;
        let mut annotations = Annotations::default();
        FIELDS.capture_fields(&fields, &mut annotations);
        locations.push(Location {
            identity: location_identity,
            display_id,
            sequence: sequence.to_string(),
            kind,
            orientation: Some(
                match span.strand() {
                    Strand::Forward => ontology::SO_FORWARD,
                    Strand::Reverse => ontology::SO_REVERSE,
                }
                .to_string(),
            ),
            order: Some(i as i64),
            annotations,
        });
    }

    Ok(SequenceFeature {
        identity,
        display_id,
        name,
        description,
        roles: vec![role],
        locations,
        annotations,
    })
}

// ---------------------------------------------------------------------------

/// Rebuild the record of a root component, the `index`-th in record order.
pub fn from_graph(component: &Component, document: &Document, index: usize) -> Result<Record> {
    let site = Site::record(index);
    tracing::debug!(record = index, identity = %component.identity, "rebuilding record");

    let sequence = component
        .sequences
        .iter()
        .find_map(|id| document.find_sequence(id))
        .ok_or_else(|| ConversionError::MissingSequence {
            site,
            component: component.identity.clone(),
        })?;

    let mut metadata = FIELDS.replay_fields(&component.annotations, site)?;
    if !metadata.iter().any(|f| f.key == "molecule_type") {
        if let Some(molecule_type) = ontology::sbo_molecule(&component.types) {
            metadata.insert(0, Field::some("molecule_type", molecule_type));
        }
    }
    let topology = if component.types.iter().any(|t| t == ontology::SO_CIRCULAR) {
        Topology::Circular
    } else {
        Topology::Linear
    };

    let features = by_order(&component.features, |f| (&f.annotations, &f.identity), site)?
        .into_iter()
        .enumerate()
        .map(|(i, f)| feature_from_graph(f, Site::feature(index, i)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Record {
        name: component.name.clone(),
        definition: component.description.clone(),
        topology,
        sequence: sequence.elements.clone().unwrap_or_default(),
        metadata,
        features,
    })
}

fn feature_from_graph(feature: &SequenceFeature, site: Site) -> Result<Feature> {
    let mut kind = None;
    let mut layout = None;
    for field in FIELDS.replay_fields(&feature.annotations, site)? {
        match (field.key.as_str(), field.value) {
            ("kind", Some(value)) => kind = Some(value),
            ("layout", Some(value)) => layout = Some(value),
            (key, value) => return Err(unexpected(site, key, value.as_deref()).into()),
        }
    }
    let kind = kind.unwrap_or_else(|| {
        feature
            .roles
            .iter()
            .find_map(|role| ontology::feature_kind(role))
            .unwrap_or("misc_feature")
            .to_string()
    });

    let mut qualifiers = Vec::new();
    let mut has_label = false;
    let mut has_note = false;
    for entry in QUALIFIERS.replay(&feature.annotations, site)? {
        match entry {
            Replayed::Extraneous(field) => qualifiers.push(field),
            Replayed::Canonical(key) => {
                let value = match key.as_str() {
                    LABEL if !has_label => {
                        has_label = true;
                        feature.name.clone()
                    }
                    NOTE if !has_note => {
                        has_note = true;
                        feature.description.clone()
                    }
                    _ => None,
                };
                match value {
                    Some(value) => qualifiers.push(Field::some(key, value)),
                    None => return Err(unexpected(site, &key, None).into()),
                }
            }
        }
    }
    // names and descriptions set outside of a GenBank conversion
    if let (Some(description), false) = (&feature.description, has_note) {
        qualifiers.insert(0, Field::some(NOTE, description.as_str()));
    }
    if let (Some(name), false) = (&feature.name, has_label) {
        qualifiers.insert(0, Field::some(LABEL, name.as_str()));
    }

    let mut spans = Vec::with_capacity(feature.locations.len());
    for location in by_sbol_order(&feature.locations) {
        spans.push(span_from_graph(location, site)?);
    }

    Ok(Feature {
        kind,
        location: FeatureLocation { spans, layout },
        qualifiers,
    })
}

fn span_from_graph(location: &Location, site: Site) -> Result<Span> {
    let strand = match location.orientation.as_deref() {
        Some(ontology::SO_REVERSE) => Strand::Reverse,
        _ => Strand::Forward,
    };
    let mut before = false;
    let mut after = false;
    let mut between_end = None;
    for field in FIELDS.replay_fields(&location.annotations, site)? {
        match (field.key.as_str(), field.value) {
            ("before", None) => before = true,
            ("after", None) => after = true,
            ("between_end", Some(value)) => match value.parse::<i64>() {
                Ok(end) => between_end = Some(end),
                Err(_) => return Err(unexpected(site, "between_end", Some(&value)).into()),
            },
            (key, value) => return Err(unexpected(site, key, value.as_deref()).into()),
        }
    }
    Ok(match location.kind {
        LocationKind::Range { start, end } => {
            let (start, end) = from_sbol_range(start, end);
            Span::Range {
                start,
                end,
                before,
                after,
                strand,
            }
        }
        LocationKind::Cut { at } => Span::Between {
            start: at,
            end: between_end.unwrap_or(at + 1),
            strand,
        },
    })
}

fn unexpected(site: Site, key: &str, value: Option<&str>) -> ConversionError {
    ConversionError::MalformedField {
        site,
        literal: carrier::encode(0, key, value),
    }
}

/// Sort objects by their recorded `genbank:order`, falling back to their
/// identity for objects without one.
pub(crate) fn by_order<'a, T, F>(items: &'a [T], key: F, site: Site) -> Result<Vec<&'a T>>
where
    F: Fn(&'a T) -> (&'a Annotations, &'a String),
{
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let (annotations, identity) = key(item);
        let order = carrier::replay_order(annotations, site)?;
        keyed.push((order.unwrap_or(usize::MAX), identity, item));
    }
    keyed.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    Ok(keyed.into_iter().map(|(_, _, item)| item).collect())
}

fn by_sbol_order(locations: &[Location]) -> Vec<&Location> {
    let mut sorted = locations.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| {
        (a.order.unwrap_or(i64::MAX), &a.identity).cmp(&(b.order.unwrap_or(i64::MAX), &b.identity))
    });
    sorted
}
