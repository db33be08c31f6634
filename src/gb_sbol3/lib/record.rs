//! Adapter between `gb_io` sequences and the intermediate record model.
//!
//! The intermediate [`Record`] keeps the handful of values that have a
//! canonical SBOL3 slot as typed attributes, and every other header field as
//! an ordered [`Field`] list so that it can be carried through the graph and
//! rebuilt verbatim.

use gb_io::seq::Date;
use gb_io::seq::Reference;
use gb_io::seq::Seq;
use gb_io::seq::Source;
use gb_io::seq::Topology;

use super::carrier::Field;
use super::error::ConversionError;
use super::error::FormatError;
use super::error::Result;
use super::error::Site;
use super::location::decode_inline;
use super::location::encode_inline;
use super::location::FeatureLocation;
use super::ontology::is_protein;

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const NUCLEOTIDES: &[u8] = b"ACGTURYSWKMBDHVNacgturyswkmbdhvn-.";

/// A feature of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub kind: String,
    pub location: FeatureLocation,
    pub qualifiers: Vec<Field>,
}

impl Feature {
    /// The value of the first qualifier named `key`, if it has one.
    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|q| q.key == key)
            .and_then(|q| q.value.as_deref())
    }
}

/// A GenBank entry, independent of its serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: Option<String>,
    pub definition: Option<String>,
    pub topology: Topology,
    pub sequence: String,
    /// Every other header field, in capture order.
    pub metadata: Vec<Field>,
    pub features: Vec<Feature>,
}

impl Record {
    /// Adapt the `index`-th sequence of a file, validating its residues and
    /// the bounds of its features.
    pub fn from_seq(index: usize, seq: &Seq) -> Result<Self> {
        let site = Site::record(index);
        let sequence = residues(site, seq)?;

        let mut metadata = Vec::new();
        match seq.len {
            Some(len) if len == seq.seq.len() => (),
            Some(len) => metadata.push(Field::some("length", len.to_string())),
            None => metadata.push(Field::none("length")),
        }
        if let Some(molecule_type) = &seq.molecule_type {
            metadata.push(Field::some("molecule_type", molecule_type.as_str()));
        }
        metadata.push(Field::some("division", seq.division.as_str()));
        if let Some(date) = &seq.date {
            metadata.push(Field::some("date", format_date(date)));
        }
        let optional = [
            ("accession", &seq.accession),
            ("version", &seq.version),
            ("dblink", &seq.dblink),
            ("keywords", &seq.keywords),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                metadata.push(Field::some(key, value.as_str()));
            }
        }
        if let Some(source) = &seq.source {
            metadata.push(Field::some("source", source.source.as_str()));
            if let Some(organism) = &source.organism {
                metadata.push(Field::some("organism", organism.as_str()));
            }
        }
        for reference in &seq.references {
            metadata.push(Field::some("reference.description", reference.description.as_str()));
            metadata.push(Field::some("reference.title", reference.title.as_str()));
            let optional = [
                ("reference.authors", &reference.authors),
                ("reference.consortium", &reference.consortium),
                ("reference.journal", &reference.journal),
                ("reference.pubmed", &reference.pubmed),
                ("reference.remark", &reference.remark),
            ];
            for (key, value) in optional {
                if let Some(value) = value {
                    metadata.push(Field::some(key, value.as_str()));
                }
            }
        }
        for comment in &seq.comments {
            metadata.push(Field::some("comment", comment.as_str()));
        }
        if let Some(contig) = &seq.contig {
            metadata.push(Field::some("contig", encode_inline(contig)));
        }

        let features = seq
            .features
            .iter()
            .map(|f| Feature {
                kind: f.kind.to_string(),
                location: FeatureLocation::from_location(&f.location),
                qualifiers: f
                    .qualifiers
                    .iter()
                    .map(|(k, v)| Field::new(k.to_string(), v.clone()))
                    .collect(),
            })
            .collect();

        let record = Record {
            name: seq.name.clone(),
            definition: seq.definition.clone(),
            topology: seq.topology.clone(),
            sequence,
            metadata,
            features,
        };
        if let Some((site, start, end, length)) = record.out_of_bounds(index) {
            return Err(FormatError::OutOfBounds {
                site,
                start,
                end,
                length,
            }
            .into());
        }
        Ok(record)
    }

    /// Rebuild the `gb_io` sequence of the `index`-th record.
    pub fn into_seq(self, index: usize) -> Result<Seq> {
        if let Some((site, start, end, length)) = self.out_of_bounds(index) {
            return Err(ConversionError::SpanOutOfBounds {
                site,
                start,
                end,
                length,
            }
            .into());
        }
        let site = Site::record(index);

        let mut seq = Seq {
            name: self.name,
            topology: self.topology,
            date: None,
            len: Some(self.sequence.len()),
            molecule_type: None,
            division: String::from("UNK"),
            definition: self.definition,
            accession: None,
            version: None,
            source: None,
            dblink: None,
            keywords: None,
            references: Vec::new(),
            comments: Vec::new(),
            seq: self.sequence.into_bytes(),
            contig: None,
            features: Vec::with_capacity(self.features.len()),
        };

        for field in self.metadata {
            let key = field.key.as_str();
            if key == "length" {
                seq.len = match field.value {
                    None => None,
                    Some(value) => match value.parse::<usize>() {
                        Ok(len) => Some(len),
                        Err(_) => return Err(malformed(site, "length", Some(&value)).into()),
                    },
                };
                continue;
            }
            let value = match field.value {
                Some(value) => value,
                None => return Err(malformed(site, key, None).into()),
            };
            match key {
                "molecule_type" => seq.molecule_type = Some(value),
                "division" => seq.division = value,
                "date" => seq.date = Some(parse_date(site, &value)?),
                "accession" => seq.accession = Some(value),
                "version" => seq.version = Some(value),
                "dblink" => seq.dblink = Some(value),
                "keywords" => seq.keywords = Some(value),
                "source" => {
                    seq.source = Some(Source {
                        source: value,
                        organism: None,
                    })
                }
                "organism" => match seq.source.as_mut() {
                    Some(source) => source.organism = Some(value),
                    None => return Err(malformed(site, key, Some(&value)).into()),
                },
                "reference.description" => seq.references.push(Reference {
                    description: value,
                    title: String::new(),
                    authors: None,
                    consortium: None,
                    journal: None,
                    pubmed: None,
                    remark: None,
                }),
                "comment" => seq.comments.push(value),
                "contig" => seq.contig = Some(decode_inline(&value, site)?),
                _ if key.starts_with("reference.") => {
                    let reference = match seq.references.last_mut() {
                        Some(reference) => reference,
                        None => return Err(malformed(site, key, Some(&value)).into()),
                    };
                    match key {
                        "reference.title" => reference.title = value,
                        "reference.authors" => reference.authors = Some(value),
                        "reference.consortium" => reference.consortium = Some(value),
                        "reference.journal" => reference.journal = Some(value),
                        "reference.pubmed" => reference.pubmed = Some(value),
                        "reference.remark" => reference.remark = Some(value),
                        _ => return Err(malformed(site, key, Some(&value)).into()),
                    }
                }
                _ => return Err(malformed(site, key, Some(&value)).into()),
            }
        }

        for (i, feature) in self.features.into_iter().enumerate() {
            let location = feature.location.to_location(Site::feature(index, i))?;
            seq.features.push(gb_io::seq::Feature {
                kind: feature.kind.into(),
                location,
                qualifiers: feature
                    .qualifiers
                    .into_iter()
                    .map(|q| (q.key.into(), q.value))
                    .collect(),
            });
        }

        Ok(seq)
    }

    /// The value of the first metadata field named `key`.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|f| f.key == key)
            .and_then(|f| f.value.as_deref())
    }

    pub fn molecule_type(&self) -> Option<&str> {
        self.field("molecule_type")
    }

    pub fn accession(&self) -> Option<&str> {
        self.field("accession")
    }

    /// The length against which feature spans are checked: the number of
    /// residues, or the declared length when there are none.
    fn bound(&self) -> usize {
        if self.sequence.is_empty() {
            self.field("length")
                .and_then(|len| len.parse().ok())
                .unwrap_or(0)
        } else {
            self.sequence.len()
        }
    }

    /// The first span lying outside of the sequence, as its site, start,
    /// end and the length it was checked against.
    fn out_of_bounds(&self, index: usize) -> Option<(Site, i64, i64, usize)> {
        let length = self.bound();
        let circular = self.topology == Topology::Circular;
        for (i, feature) in self.features.iter().enumerate() {
            for span in &feature.location.spans {
                let (start, end) = span.bounds();
                let inside = start >= 0
                    && end >= 0
                    && (start as u64) <= length as u64
                    && (end as u64) <= length as u64
                    && (circular || start <= end);
                if !inside {
                    return Some((Site::feature(index, i), start, end, length));
                }
            }
        }
        None
    }
}

fn residues(site: Site, seq: &Seq) -> Result<String> {
    let protein = is_protein(seq.molecule_type.as_deref());
    let valid = |b: &u8| {
        if protein {
            b.is_ascii_alphabetic() || *b == b'*' || *b == b'-'
        } else {
            NUCLEOTIDES.contains(b)
        }
    };
    if let Some(position) = seq.seq.iter().position(|b| !valid(b)) {
        return Err(FormatError::InvalidResidue {
            site,
            position,
            residue: char::from(seq.seq[position]),
        }
        .into());
    }
    // only ASCII is left at this point
    Ok(seq.seq.iter().map(|&b| char::from(b)).collect())
}

fn malformed(site: Site, key: &str, value: Option<&str>) -> ConversionError {
    ConversionError::MalformedField {
        site,
        literal: match value {
            Some(value) => format!("{}={}", key, value),
            None => key.to_string(),
        },
    }
}

fn format_date(date: &Date) -> String {
    let month = MONTHS
        .get((date.month() as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("JAN");
    format!("{:02}-{}-{:04}", date.day(), month, date.year())
}

fn parse_date(site: Site, text: &str) -> Result<Date> {
    let parsed = text.splitn(3, '-').collect::<Vec<_>>();
    let (day, month, year) = match parsed.as_slice() {
        [day, month, year] => (
            day.parse::<u32>().ok(),
            MONTHS.iter().position(|m| m.eq_ignore_ascii_case(month)),
            year.parse::<i32>().ok(),
        ),
        _ => (None, None, None),
    };
    match (day, month, year) {
        (Some(day), Some(month), Some(year)) => {
            let month = month as u32 + 1;
            Date::from_ymd(year, month, day)
                .map_err(|_| FormatError::InvalidDate { site, year, month, day }.into())
        }
        _ => Err(malformed(site, "date", Some(text)).into()),
    }
}

#[cfg(test)]
mod tests {
    use gb_io::seq::After;
    use gb_io::seq::Before;
    use gb_io::seq::Location;

    use super::super::error::Error;
    use super::*;

    fn seq() -> Seq {
        Seq {
            name: Some(String::from("BBa_J23101")),
            topology: Topology::Linear,
            date: Date::from_ymd(2020, 3, 9).ok(),
            len: Some(35),
            molecule_type: Some(String::from("DNA")),
            division: String::from("SYN"),
            definition: Some(String::from("constitutive promoter family member")),
            accession: Some(String::from("BBa_J23101")),
            version: Some(String::from("BBa_J23101.1")),
            source: Some(Source {
                source: String::from("synthetic construct"),
                organism: Some(String::from("synthetic construct")),
            }),
            dblink: None,
            keywords: Some(String::from(".")),
            references: vec![Reference {
                description: String::from("1  (bases 1 to 35)"),
                title: String::from("Direct Submission"),
                authors: Some(String::from("Anderson,J.C.")),
                consortium: None,
                journal: Some(String::from("Unpublished")),
                pubmed: None,
                remark: None,
            }],
            comments: vec![String::from("first"), String::from("second")],
            seq: b"tttacagctagctcagtcctaggtattatgctagc".to_vec(),
            contig: None,
            features: vec![gb_io::seq::Feature {
                kind: "promoter".into(),
                location: Location::Range((0, Before(false)), (35, After(false))),
                qualifiers: vec![
                    ("label".into(), Some(String::from("J23101"))),
                    ("pseudo".into(), None),
                ],
            }],
        }
    }

    #[test]
    fn adapts_and_rebuilds_sequences() {
        let original = seq();
        let record = Record::from_seq(0, &original).unwrap();
        assert_eq!(record.molecule_type(), Some("DNA"));
        assert_eq!(record.field("date"), Some("09-MAR-2020"));
        assert!(record.field("length").is_none());
        assert_eq!(record.features[0].qualifier("label"), Some("J23101"));
        assert_eq!(record.features[0].qualifier("pseudo"), None);
        assert_eq!(record.into_seq(0).unwrap(), original);
    }

    #[test]
    fn keeps_declared_length() {
        let mut original = seq();
        original.len = Some(40);
        let record = Record::from_seq(0, &original).unwrap();
        assert_eq!(record.field("length"), Some("40"));
        assert_eq!(record.into_seq(0).unwrap().len, Some(40));

        original.len = None;
        let record = Record::from_seq(0, &original).unwrap();
        assert_eq!(record.into_seq(0).unwrap().len, None);
    }

    #[test]
    fn rejects_invalid_residues() {
        let mut original = seq();
        original.seq[3] = b'!';
        match Record::from_seq(2, &original) {
            Err(Error::Format(FormatError::InvalidResidue {
                site,
                position,
                residue,
            })) => {
                assert_eq!(site, Site::record(2));
                assert_eq!(position, 3);
                assert_eq!(residue, '!');
            }
            other => panic!("unexpected result: {:?}", other),
        }
        original.molecule_type = Some(String::from("AA"));
        original.seq = b"MKV*".to_vec();
        original.features.clear();
        assert!(Record::from_seq(0, &original).is_ok());
    }

    #[test]
    fn rejects_out_of_bounds_features() {
        let mut original = seq();
        original.features[0].location = Location::Range((10, Before(false)), (36, After(false)));
        match Record::from_seq(0, &original) {
            Err(Error::Format(FormatError::OutOfBounds { site, end, length, .. })) => {
                assert_eq!(site, Site::feature(0, 0));
                assert_eq!(end, 36);
                assert_eq!(length, 35);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // wrapping spans are only allowed on circular records
        original.features[0].location = Location::Range((30, Before(false)), (5, After(false)));
        assert!(Record::from_seq(0, &original).is_err());
        original.topology = Topology::Circular;
        assert!(Record::from_seq(0, &original).is_ok());
    }

    #[test]
    fn bounds_use_declared_length_without_residues() {
        let mut original = seq();
        original.seq.clear();
        original.len = Some(100);
        original.features[0].location = Location::Range((50, Before(false)), (90, After(false)));
        let record = Record::from_seq(0, &original).unwrap();
        assert_eq!(record.into_seq(0).unwrap(), original);
    }

    #[test]
    fn rejects_invalid_dates() {
        let mut record = Record::from_seq(0, &seq()).unwrap();
        for field in record.metadata.iter_mut().filter(|f| f.key == "date") {
            field.value = Some(String::from("31-FEB-2020"));
        }
        assert!(matches!(
            record.clone().into_seq(4),
            Err(Error::Format(FormatError::InvalidDate { month: 2, day: 31, .. }))
        ));
        for field in record.metadata.iter_mut().filter(|f| f.key == "date") {
            field.value = Some(String::from("someday"));
        }
        assert!(matches!(
            record.into_seq(4),
            Err(Error::Conversion(ConversionError::MalformedField { .. }))
        ));
    }

    #[test]
    fn restores_contig_locations() {
        let mut original = seq();
        original.contig = Some(Location::Join(vec![
            Location::External(
                String::from("AC000001.1"),
                Some(Box::new(Location::Range((0, Before(false)), (100, After(false))))),
            ),
            Location::Gap(gb_io::seq::GapLength::Known(50)),
        ]));
        let record = Record::from_seq(0, &original).unwrap();
        assert_eq!(
            record.field("contig"),
            Some("join(external(AC000001.1,0..100),gap(50))")
        );
        assert_eq!(record.into_seq(0).unwrap(), original);
    }
}
