use std::path::Path;
use std::path::PathBuf;

use gb_io::seq::After;
use gb_io::seq::Before;
use gb_io::seq::Feature;
use gb_io::seq::Location;
use gb_io::seq::Seq;
use gb_io::seq::Topology;
use gb_sbol3::reader::read_records;
use gb_sbol3::Converter;
use gb_sbol3::Document;
use gb_sbol3::TEST_NAMESPACE;

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(data(name)).unwrap()
}

/// Convert a GenBank fixture to a graph and back, checking that the
/// original file is reproduced byte for byte.
fn assert_round_trip(name: &str) {
    let converter = Converter::new();
    let text = fixture(name);

    // in memory
    let records = read_records(data(name)).unwrap();
    let document = converter.records_to_document(&records, TEST_NAMESPACE).unwrap();
    let rebuilt = converter.document_to_records(&document).unwrap();
    assert_eq!(rebuilt, records);
    assert_eq!(converter.render(&rebuilt).unwrap(), text);

    // through files, with a persist/reload cycle of the graph
    let dir = tempfile::tempdir().unwrap();
    let nt = dir.path().join("out.nt");
    let gb = dir.path().join("out.gb");
    converter
        .genbank_to_graph(data(name), Some(nt.as_path()), TEST_NAMESPACE, true)
        .unwrap();
    let output = converter
        .graph_to_genbank(&nt, Some(gb.as_path()), true)
        .unwrap();
    assert_eq!(output, text);
    assert_eq!(std::fs::read_to_string(&gb).unwrap(), text);
}

fn j23101() -> Seq {
    Seq {
        name: Some(String::from("BBa_J23101")),
        topology: Topology::Linear,
        date: None,
        len: Some(35),
        molecule_type: Some(String::from("DNA")),
        division: String::from("SYN"),
        definition: Some(String::from("constitutive promoter family member")),
        accession: None,
        version: None,
        source: None,
        dblink: None,
        keywords: None,
        references: Vec::new(),
        comments: Vec::new(),
        seq: b"tttacagctagctcagtcctaggtattatgctagc".to_vec(),
        contig: None,
        features: vec![Feature {
            kind: "promoter".into(),
            location: Location::Range((0, Before(false)), (35, After(false))),
            qualifiers: vec![("label".into(), Some(String::from("J23101")))],
        }],
    }
}

#[test]
fn single_record_matches_reference_graph() {
    let document = Converter::new()
        .records_to_document(&[j23101()], TEST_NAMESPACE)
        .unwrap();
    let reference = Document::read(data("BBa_J23101.nt")).unwrap();
    let diff = gb_sbol3::doc_diff(&document, &reference);
    assert!(diff.is_empty(), "{:#?}", diff);
}

#[test]
fn reference_graph_converts_back() {
    let converter = Converter::new();
    let text = converter
        .graph_to_genbank(&data("BBa_J23101.nt"), None, false)
        .unwrap();
    assert_eq!(text, fixture("BBa_J23101_from_sbol3.gb"));
    assert_eq!(text, converter.render(&[j23101()]).unwrap());
}

#[test]
fn single_record_file() {
    let document = Converter::new()
        .genbank_to_graph(data("BBa_J23101.gb"), None, TEST_NAMESPACE, false)
        .unwrap();
    assert_eq!(document.len(), 2);
    let component = document.components().next().unwrap();
    assert_eq!(
        component.identity,
        "https://test.sbol3.genbank/BBa_J23101"
    );
    assert_eq!(component.features.len(), 1);
    assert_eq!(component.features[0].display_id, "J23101");
    assert_round_trip("BBa_J23101.gb");
}

#[test]
fn multiple_records_keep_their_order() {
    let document = Converter::new()
        .genbank_to_graph(data("iGEM_SBOL2_imports.gb"), None, TEST_NAMESPACE, false)
        .unwrap();
    let ids = document
        .components()
        .map(|c| c.display_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, ["BBa_K1058008", "BBa_J61048", "BBa_E0040"]);
    let features = document
        .components()
        .map(|c| c.features.len())
        .collect::<Vec<_>>();
    assert_eq!(features, [4, 3, 3]);

    // feature order survives sorting of the serialized graph
    let reloaded = Document::from_ntriples(&document.to_ntriples()).unwrap();
    let records = Converter::new().document_to_records(&reloaded).unwrap();
    let kinds = records[0]
        .features
        .iter()
        .map(|f| f.kind.to_string())
        .collect::<Vec<_>>();
    assert_eq!(kinds, ["promoter", "RBS", "CDS", "terminator"]);
    assert_round_trip("iGEM_SBOL2_imports.gb");
}

#[test]
fn extra_properties_round_trip() {
    assert_round_trip("test_extra_properties.gb");
}

#[test]
fn multiple_records_match_reference_graph() {
    let converter = Converter::new();
    let document = converter
        .genbank_to_graph(data("iGEM_SBOL2_imports.gb"), None, TEST_NAMESPACE, false)
        .unwrap();
    let reference = Document::read(data("iGEM_SBOL2_imports.nt")).unwrap();
    let diff = gb_sbol3::doc_diff(&document, &reference);
    assert!(diff.is_empty(), "{:#?}", diff);

    let text = converter
        .graph_to_genbank(&data("iGEM_SBOL2_imports.nt"), None, false)
        .unwrap();
    assert_eq!(text, fixture("iGEM_SBOL2_imports.gb"));
}

#[test]
fn identifiers_are_stable() {
    let converter = Converter::new();
    let first = converter
        .genbank_to_graph(data("iGEM_SBOL2_imports.gb"), None, TEST_NAMESPACE, false)
        .unwrap();
    let second = converter
        .genbank_to_graph(data("iGEM_SBOL2_imports.gb"), None, TEST_NAMESPACE, false)
        .unwrap();
    assert!(gb_sbol3::doc_diff(&first, &second).is_empty());
    assert_eq!(first.to_ntriples(), second.to_ntriples());
}

#[test]
fn namespaces_change_identities_only() {
    let converter = Converter::new();
    let records = read_records(data("BBa_J23101.gb")).unwrap();
    let a = converter
        .records_to_document(&records, "https://a.example.org")
        .unwrap();
    let b = converter
        .records_to_document(&records, "https://b.example.org/")
        .unwrap();
    assert!(!gb_sbol3::doc_diff(&a, &b).is_empty());
    assert_eq!(
        converter.document_to_records(&a).unwrap(),
        converter.document_to_records(&b).unwrap()
    );
}
