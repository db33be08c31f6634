use std::io::Error as IoError;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use gb_io::seq::Seq;
use gb_io::writer::SeqWriter;

use super::atomic::write_atomic;
use super::error::ConversionError;
use super::error::Result;
use super::forward;
use super::ident::Namespace;
use super::reader::read_records;
use super::reverse;
use super::sbol::Document;

/// The namespace used by the test suite.
pub const TEST_NAMESPACE: &str = "https://test.sbol3.genbank/";

/// Where a reverse conversion takes its graph from.
#[derive(Debug, Clone, Copy)]
pub enum GraphSource<'a> {
    /// An N-Triples file.
    Path(&'a Path),
    /// A document already in memory.
    Document(&'a Document),
}

impl<'a> From<&'a Document> for GraphSource<'a> {
    fn from(document: &'a Document) -> Self {
        GraphSource::Document(document)
    }
}

impl<'a> From<&'a Path> for GraphSource<'a> {
    fn from(path: &'a Path) -> Self {
        GraphSource::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for GraphSource<'a> {
    fn from(path: &'a PathBuf) -> Self {
        GraphSource::Path(path.as_path())
    }
}

/// A GenBank ⇄ SBOL3 converter.
///
/// The options mirror the ones of the GenBank writer and only affect the
/// GenBank text produced by [`Converter::graph_to_genbank`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Converter {
    escape_locus: bool,
    truncate_locus: bool,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escape any whitespace in locus names with an underscore character.
    pub fn escape_locus(mut self, escape_locus: bool) -> Self {
        self.escape_locus = escape_locus;
        self
    }

    /// Trim the locus fields so that the locus line is no longer than 79
    /// characters.
    pub fn truncate_locus(mut self, truncate_locus: bool) -> Self {
        self.truncate_locus = truncate_locus;
        self
    }

    /// Convert every record of a GenBank file into one SBOL3 document.
    ///
    /// When `write` is set, the document is also written as N-Triples to
    /// `output`, which must then be given.
    pub fn genbank_to_graph<P: AsRef<Path>>(
        &self,
        input: P,
        output: Option<&Path>,
        namespace: &str,
        write: bool,
    ) -> Result<Document> {
        let input = input.as_ref();
        let target = output_target(output, write)?;
        let records = read_records(input)?;
        let document = self.records_to_document(&records, namespace)?;
        if let Some(path) = target {
            document.write(path)?;
        }
        tracing::info!(
            input = %input.display(),
            output = ?target,
            records = records.len(),
            objects = document.len(),
            "converted GenBank to SBOL3"
        );
        Ok(document)
    }

    /// Convert an SBOL3 document back to GenBank text.
    ///
    /// When `write` is set, the text is also written to `output`, which must
    /// then be given.
    pub fn graph_to_genbank<'a, S: Into<GraphSource<'a>>>(
        &self,
        source: S,
        output: Option<&Path>,
        write: bool,
    ) -> Result<String> {
        let target = output_target(output, write)?;
        let loaded;
        let document = match source.into() {
            GraphSource::Document(document) => document,
            GraphSource::Path(path) => {
                loaded = Document::read(path)?;
                &loaded
            }
        };
        let records = self.document_to_records(document)?;
        let text = self.render(&records)?;
        if let Some(path) = target {
            write_atomic(path, text.as_bytes())?;
        }
        tracing::info!(
            output = ?target,
            records = records.len(),
            "converted SBOL3 to GenBank"
        );
        Ok(text)
    }

    pub fn records_to_document(&self, records: &[Seq], namespace: &str) -> Result<Document> {
        let namespace = Namespace::new(namespace)?;
        forward::records_to_document(records, &namespace)
    }

    pub fn document_to_records(&self, document: &Document) -> Result<Vec<Seq>> {
        reverse::document_to_records(document)
    }

    /// Serialize records as GenBank text, in order.
    pub fn render(&self, records: &[Seq]) -> Result<String> {
        let mut buffer = Vec::new();
        {
            let mut writer = SeqWriter::new(&mut buffer);
            writer.escape_locus(self.escape_locus);
            writer.truncate_locus(self.truncate_locus);
            for seq in records {
                writer.write(seq)?;
            }
        }
        String::from_utf8(buffer)
            .map_err(|e| IoError::new(ErrorKind::InvalidData, e).into())
    }
}

fn output_target(output: Option<&Path>, write: bool) -> Result<Option<&Path>> {
    match (write, output) {
        (false, _) => Ok(None),
        (true, Some(path)) => Ok(Some(path)),
        (true, None) => Err(ConversionError::MissingOutput.into()),
    }
}
