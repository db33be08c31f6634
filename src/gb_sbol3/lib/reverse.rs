//! SBOL3 documents to GenBank records.

use gb_io::seq::Seq;

use super::error::Result;
use super::error::Site;
use super::graph;
use super::sbol::Document;

/// Rebuild the records of every root component, in record order.
pub fn document_to_records(document: &Document) -> Result<Vec<Seq>> {
    let components = document.components().collect::<Vec<_>>();
    let ordered = graph::by_order(&components, |c| (&c.annotations, &c.identity), Site::record(0))?;
    let mut seqs = Vec::with_capacity(ordered.len());
    for (index, component) in ordered.into_iter().enumerate() {
        let record = graph::from_graph(component, document, index)?;
        seqs.push(record.into_seq(index)?);
    }
    tracing::debug!(records = seqs.len(), "rebuilt records from graph");
    Ok(seqs)
}

#[cfg(test)]
mod tests {
    use gb_io::seq::After;
    use gb_io::seq::Before;
    use gb_io::seq::Feature;
    use gb_io::seq::Location;
    use gb_io::seq::Topology;

    use super::super::error::ConversionError;
    use super::super::error::Error;
    use super::super::forward::records_to_document;
    use super::super::ident::Namespace;
    use super::super::sbol::Component;
    use super::super::sbol::LocationKind;
    use super::super::sbol::Sequence;
    use super::super::sbol::TopLevel;
    use super::*;

    fn seq(name: &str, residues: &[u8]) -> Seq {
        Seq {
            name: Some(name.to_string()),
            topology: Topology::Circular,
            date: None,
            len: Some(residues.len()),
            molecule_type: Some(String::from("DNA")),
            division: String::from("SYN"),
            definition: Some(format!("{} plasmid", name)),
            accession: None,
            version: None,
            source: None,
            dblink: None,
            keywords: None,
            references: Vec::new(),
            comments: Vec::new(),
            seq: residues.to_vec(),
            contig: None,
            features: Vec::new(),
        }
    }

    #[test]
    fn restores_record_order() {
        // identities sort in the opposite order of the records
        let seqs = vec![seq("zeta", b"aaaa"), seq("alpha", b"cc"), seq("mid", b"g")];
        let namespace = Namespace::new("https://example.org").unwrap();
        let document = records_to_document(&seqs, &namespace).unwrap();
        let reloaded = Document::from_ntriples(&document.to_ntriples()).unwrap();
        assert_eq!(document_to_records(&reloaded).unwrap(), seqs);
    }

    #[test]
    fn converts_foreign_components() {
        let mut document = Document::new();
        document
            .add(Sequence {
                identity: String::from("https://example.org/s"),
                display_id: String::from("s"),
                namespace: String::from("https://example.org"),
                elements: Some(String::from("atgc")),
                encoding: None,
                annotations: Default::default(),
            })
            .unwrap();
        document
            .add(Component {
                identity: String::from("https://example.org/c"),
                display_id: String::from("c"),
                namespace: String::from("https://example.org"),
                name: Some(String::from("c")),
                description: None,
                types: vec![String::from("https://identifiers.org/SBO:0000250")],
                roles: Vec::new(),
                sequences: vec![String::from("https://example.org/s")],
                features: Vec::new(),
                annotations: Default::default(),
            })
            .unwrap();
        let seqs = document_to_records(&document).unwrap();
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].molecule_type.as_deref(), Some("RNA"));
        assert_eq!(seqs[0].topology, Topology::Linear);
        assert_eq!(seqs[0].seq, b"atgc");
        assert_eq!(seqs[0].len, Some(4));
    }

    #[test]
    fn fails_without_sequence() {
        let namespace = Namespace::new("https://example.org").unwrap();
        let document = records_to_document(&[seq("pA", b"acgt")], &namespace).unwrap();
        let mut stripped = Document::new();
        for object in document.objects() {
            if let TopLevel::Component(c) = object {
                stripped.add(c.clone()).unwrap();
            }
        }
        assert!(matches!(
            document_to_records(&stripped),
            Err(Error::Conversion(ConversionError::MissingSequence { .. }))
        ));
    }

    #[test]
    fn rejects_locations_past_the_sequence() {
        let namespace = Namespace::new("https://example.org").unwrap();
        let mut original = seq("pA", b"acgtacgt");
        original.features.push(Feature {
            kind: "gene".into(),
            location: Location::Range((0, Before(false)), (4, After(false))),
            qualifiers: Vec::new(),
        });
        let document = records_to_document(&[original], &namespace).unwrap();
        let mut edited = Document::new();
        for object in document.objects() {
            match object {
                TopLevel::Component(c) => {
                    let mut c = c.clone();
                    c.features[0].locations[0].kind = LocationKind::Range { start: 5, end: 12 };
                    edited.add(c).unwrap();
                }
                other => edited.add(other.clone()).unwrap(),
            }
        }
        match document_to_records(&edited) {
            Err(Error::Conversion(ConversionError::SpanOutOfBounds { site, end, length, .. })) => {
                assert_eq!(site, Site::feature(0, 0));
                assert_eq!(end, 12);
                assert_eq!(length, 8);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
