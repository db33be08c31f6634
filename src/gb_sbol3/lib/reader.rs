use std::fs::File;
use std::io::Read;
use std::path::Path;

use gb_io::reader::GbParserError;
use gb_io::reader::SeqReader;
use gb_io::seq::Seq;

use super::error::Error;
use super::error::FormatError;
use super::error::Result;

// ---------------------------------------------------------------------------

/// An iterator over the GenBank records contained in a file.
pub struct RecordReader<R: Read = File> {
    reader: SeqReader<R>,
    count: usize,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: SeqReader::new(reader),
            count: 0,
        }
    }
}

impl RecordReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(file))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Seq>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.reader.next()? {
            Ok(seq) => Ok(seq),
            Err(GbParserError::Io(e)) => Err(Error::Io(e)),
            Err(GbParserError::SyntaxError(e)) => Err(FormatError::Syntax(format!(
                "record {}: {}",
                self.count, e
            ))
            .into()),
        };
        self.count += 1;
        Some(item)
    }
}

/// Load all the records of a GenBank file.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<Seq>> {
    RecordReader::from_path(path)?.collect()
}

#[cfg(test)]
mod tests {
    use gb_io::seq::Topology;
    use gb_io::writer::SeqWriter;

    use super::*;

    fn seq(name: &str, residues: &[u8]) -> Seq {
        Seq {
            name: Some(name.to_string()),
            topology: Topology::Linear,
            date: None,
            len: Some(residues.len()),
            molecule_type: Some(String::from("DNA")),
            division: String::from("SYN"),
            definition: None,
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
    fn iterates_over_records() {
        let mut buffer = Vec::new();
        {
            let mut writer = SeqWriter::new(&mut buffer);
            writer.write(&seq("first", b"acgt")).unwrap();
            writer.write(&seq("second", b"gc")).unwrap();
        }
        let seqs = RecordReader::new(buffer.as_slice())
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].name.as_deref(), Some("first"));
        assert_eq!(seqs[1].seq, b"gc");
    }

    #[test]
    fn reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_records(dir.path().join("missing.gb")),
            Err(Error::Io(_))
        ));
    }
}
