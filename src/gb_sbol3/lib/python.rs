use std::path::PathBuf;

use pyo3::exceptions::PyOSError;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3_built::pyo3_built;

use super::built;
use super::convert;
use super::convert::GraphSource;
use super::diff;
use super::error::Error;
use super::sbol;

fn convert_error(error: Error) -> PyErr {
    match error {
        Error::Io(e) => match e.raw_os_error() {
            Some(code) => PyOSError::new_err((code, e.to_string())),
            None => PyOSError::new_err(e.to_string()),
        },
        other => PyValueError::new_err(other.to_string()),
    }
}

// ---------------------------------------------------------------------------

/// An SBOL3 document.
#[pyclass(module = "gb_sbol3")]
#[derive(Debug, Clone, Default)]
pub struct Document {
    document: sbol::Document,
}

#[pymethods]
impl Document {
    #[new]
    fn __new__() -> Self {
        Self::default()
    }

    /// Read a document serialized as N-Triples.
    ///
    /// Arguments:
    ///     path (`str` or `os.PathLike`): The path to the N-Triples file.
    ///
    #[staticmethod]
    fn read(py: Python, path: PathBuf) -> PyResult<Self> {
        let document = py
            .detach(|| sbol::Document::read(&path))
            .map_err(convert_error)?;
        Ok(Self { document })
    }

    /// Parse a document from an N-Triples string.
    #[staticmethod]
    fn from_ntriples(text: String) -> PyResult<Self> {
        let document = sbol::Document::from_ntriples(&text).map_err(convert_error)?;
        Ok(Self { document })
    }

    /// Write the document to the given path as sorted N-Triples.
    fn write(&self, py: Python, path: PathBuf) -> PyResult<()> {
        py.detach(|| self.document.write(&path))
            .map_err(convert_error)
    }

    /// Serialize the document as sorted N-Triples.
    fn ntriples(&self) -> String {
        self.document.to_ntriples()
    }

    fn __len__(&self) -> usize {
        self.document.len()
    }

    fn __repr__(&self) -> String {
        format!("<Document with {} objects>", self.document.len())
    }
}

// ---------------------------------------------------------------------------

/// A GenBank to SBOL3 converter.
///
/// Arguments:
///     escape_locus (`bool`): Pass `True` to escape any whitespace in
///         the locus name with an underscore character when writing
///         GenBank records.
///     truncate_locus (`bool`): Pass `True` to trim the locus fields
///          so that the locus line is no longer than 79 characters.
///
#[pyclass(module = "gb_sbol3")]
#[derive(Debug, Clone, Default)]
pub struct Converter {
    converter: convert::Converter,
}

#[pymethods]
impl Converter {
    #[new]
    #[pyo3(signature = (*, escape_locus = false, truncate_locus = false))]
    fn __new__(escape_locus: bool, truncate_locus: bool) -> Self {
        Self {
            converter: convert::Converter::new()
                .escape_locus(escape_locus)
                .truncate_locus(truncate_locus),
        }
    }

    /// Convert a GenBank file to an SBOL3 document.
    ///
    /// Arguments:
    ///     gb_file (`str` or `os.PathLike`): The GenBank file to convert.
    ///     sbol3_file (`str` or `os.PathLike`, optional): Where to write
    ///         the document as N-Triples.
    ///     namespace (`str`): The namespace of the created objects.
    ///     write (`bool`): Pass `False` to skip writing the document.
    ///
    /// Returns:
    ///     `~gb_sbol3.Document`: The converted document.
    ///
    #[pyo3(signature = (gb_file, sbol3_file = None, namespace = String::from(convert::TEST_NAMESPACE), write = true))]
    fn convert_genbank_to_sbol3(
        &self,
        py: Python,
        gb_file: PathBuf,
        sbol3_file: Option<PathBuf>,
        namespace: String,
        write: bool,
    ) -> PyResult<Document> {
        let document = py
            .detach(|| {
                self.converter.genbank_to_graph(
                    &gb_file,
                    sbol3_file.as_deref(),
                    &namespace,
                    write,
                )
            })
            .map_err(convert_error)?;
        Ok(Document { document })
    }

    /// Convert an SBOL3 document back to GenBank.
    ///
    /// Arguments:
    ///     sbol3_file (`str` or `os.PathLike`, optional): An N-Triples file
    ///         to read the document from.
    ///     doc (`~gb_sbol3.Document`, optional): A document to convert,
    ///         used instead of ``sbol3_file``.
    ///     gb_file (`str` or `os.PathLike`, optional): Where to write the
    ///         GenBank records.
    ///     write (`bool`): Pass `True` to write the records to ``gb_file``.
    ///
    /// Returns:
    ///     `str`: The GenBank records, serialized.
    ///
    #[pyo3(signature = (sbol3_file = None, doc = None, gb_file = None, write = false))]
    fn convert_sbol3_to_genbank(
        &self,
        py: Python,
        sbol3_file: Option<PathBuf>,
        doc: Option<PyRef<Document>>,
        gb_file: Option<PathBuf>,
        write: bool,
    ) -> PyResult<String> {
        let document = doc.as_deref().map(|d| &d.document);
        let source = match (document, sbol3_file.as_deref()) {
            (Some(document), _) => GraphSource::Document(document),
            (None, Some(path)) => GraphSource::Path(path),
            (None, None) => {
                return Err(PyValueError::new_err(
                    "expected either `sbol3_file` or `doc`",
                ))
            }
        };
        py.detach(|| {
            self.converter
                .graph_to_genbank(source, gb_file.as_deref(), write)
        })
        .map_err(convert_error)
    }
}

// ---------------------------------------------------------------------------

/// Lossless conversion between GenBank records and SBOL3 documents.
///
/// A `Converter` turns every record of a GenBank file into a root component
/// of an SBOL3 document, and turns such documents back into the exact
/// GenBank text they were created from.
///
#[pymodule]
#[pyo3(name = "lib")]
pub fn init(py: Python, m: &Bound<PyModule>) -> PyResult<()> {
    m.add_class::<self::Converter>()?;
    m.add_class::<self::Document>()?;
    m.add("TEST_NAMESPACE", convert::TEST_NAMESPACE)?;
    m.add("__package__", "gb_sbol3")?;
    m.add("__build__", pyo3_built!(py, built))?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("__author__", env!("CARGO_PKG_AUTHORS").replace(':', "\n"))?;

    /// Count the triples that differ between two documents.
    ///
    /// Arguments:
    ///     a (`~gb_sbol3.Document`): The first document.
    ///     b (`~gb_sbol3.Document`): The second document.
    ///
    /// Returns:
    ///     `int`: The number of triples found in only one of the documents,
    ///     zero when the documents are equal.
    ///
    #[pyfn(m)]
    #[pyo3(name = "doc_diff", text_signature = "(a, b)")]
    fn doc_diff(a: PyRef<Document>, b: PyRef<Document>) -> usize {
        diff::doc_diff(&a.document, &b.document).len()
    }

    Ok(())
}
