//! GenBank records to SBOL3 documents.

use gb_io::seq::Seq;

use super::error::Result;
use super::graph;
use super::ident::IdScope;
use super::ident::Namespace;
use super::record::Record;
use super::sbol::Document;

/// Map every record to a root component and its sequence.
///
/// The whole conversion fails on the first invalid record; no partial
/// document is ever returned.
pub fn records_to_document(seqs: &[Seq], namespace: &Namespace) -> Result<Document> {
    let mut scope = IdScope::new();
    let mut document = Document::new();
    let mut features = 0;
    for (index, seq) in seqs.iter().enumerate() {
        let record = Record::from_seq(index, seq)?;
        let (component, sequence) = graph::to_graph(&record, index, namespace, &mut scope)?;
        features += component.features.len();
        document.add(component)?;
        document.add(sequence)?;
    }
    tracing::debug!(records = seqs.len(), features, "mapped records to graph");
    Ok(document)
}

#[cfg(test)]
mod tests {
    use gb_io::seq::After;
    use gb_io::seq::Before;
    use gb_io::seq::Feature;
    use gb_io::seq::Location;
    use gb_io::seq::Topology;

    use super::super::error::Error;
    use super::super::error::FormatError;
    use super::super::error::Site;
    use super::*;

    fn seq(name: Option<&str>, accession: Option<&str>) -> Seq {
        Seq {
            name: name.map(String::from),
            topology: Topology::Linear,
            date: None,
            len: Some(8),
            molecule_type: Some(String::from("DNA")),
            division: String::from("SYN"),
            definition: None,
            accession: accession.map(String::from),
            version: None,
            source: None,
            dblink: None,
            keywords: None,
            references: Vec::new(),
            comments: Vec::new(),
            seq: b"acgtacgt".to_vec(),
            contig: None,
            features: vec![Feature {
                kind: "gene".into(),
                location: Location::Range((0, Before(false)), (4, After(false))),
                qualifiers: vec![("gene".into(), Some(String::from("lacZ")))],
            }],
        }
    }

    fn namespace() -> Namespace {
        Namespace::new("https://example.org").unwrap()
    }

    #[test]
    fn names_components_after_records() {
        let seqs = vec![
            seq(Some("pA"), None),
            seq(None, Some("AB000001")),
            seq(None, None),
            seq(Some("pA"), None),
        ];
        let document = records_to_document(&seqs, &namespace()).unwrap();
        let ids = document
            .components()
            .map(|c| c.display_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["pA", "AB000001", "record3", "pA_4"]);
        assert_eq!(document.len(), 8);
        assert_eq!(document.sequences().count(), 4);
    }

    #[test]
    fn is_deterministic() {
        let seqs = vec![seq(Some("pA"), None), seq(Some("pB"), None)];
        let first = records_to_document(&seqs, &namespace()).unwrap();
        let second = records_to_document(&seqs, &namespace()).unwrap();
        assert_eq!(first.to_ntriples(), second.to_ntriples());
    }

    #[test]
    fn aborts_on_invalid_records() {
        let mut bad = seq(Some("pB"), None);
        bad.features[0].location = Location::Range((4, Before(false)), (9, After(false)));
        let seqs = vec![seq(Some("pA"), None), bad];
        match records_to_document(&seqs, &namespace()) {
            Err(Error::Format(FormatError::OutOfBounds { site, .. })) => {
                assert_eq!(site, Site::feature(1, 0))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn disambiguates_taken_fallbacks() {
        let mut record = seq(Some("pA"), None);
        record.features = ["x", "x_3", "x"]
            .iter()
            .map(|label| Feature {
                kind: "misc_feature".into(),
                location: Location::Range((0, Before(false)), (4, After(false))),
                qualifiers: vec![("label".into(), Some(label.to_string()))],
            })
            .collect();
        let document = records_to_document(&[record], &namespace()).unwrap();
        let component = document.components().next().unwrap();
        let ids = component
            .features
            .iter()
            .map(|f| f.display_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["x", "x_3", "x_3_2"]);
    }

    #[test]
    fn disambiguates_sequence_identities() {
        let seqs = vec![seq(Some("pA_sequence"), None), seq(Some("pA"), None)];
        let document = records_to_document(&seqs, &namespace()).unwrap();
        let ids = document
            .sequences()
            .map(|s| s.display_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["pA_sequence_sequence", "pA_sequence_2"]);
        let components = document.components().collect::<Vec<_>>();
        assert_eq!(components[1].sequences, ["https://example.org/pA_sequence_2"]);
    }
}
