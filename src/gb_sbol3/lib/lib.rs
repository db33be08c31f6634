//! Lossless conversion between GenBank records and SBOL3 documents.
//!
//! GenBank records are read and written with [`gb_io`]; every record becomes
//! a root `Component` of an SBOL3 [`Document`], owning its `Sequence` and
//! one `SequenceFeature` per feature. Everything without an SBOL3
//! counterpart (header fields, qualifiers, fuzzy ends, nested locations) is
//! carried as ordered annotations so the original records can be rebuilt
//! byte for byte.
//!
//! ```no_run
//! use gb_sbol3::Converter;
//! use gb_sbol3::TEST_NAMESPACE;
//!
//! let converter = Converter::new();
//! let document = converter.genbank_to_graph("BBa_J23101.gb", None, TEST_NAMESPACE, false)?;
//! let text = converter.graph_to_genbank(&document, None, false)?;
//! # Ok::<(), gb_sbol3::Error>(())
//! ```

extern crate gb_io;
#[cfg(feature = "python")]
extern crate pyo3;
#[cfg(feature = "python")]
extern crate pyo3_built;

#[cfg(feature = "python")]
mod built;
#[cfg(feature = "python")]
mod python;

mod atomic;
pub mod carrier;
pub mod convert;
pub mod diff;
pub mod error;
pub mod forward;
pub mod graph;
pub mod ident;
pub mod location;
pub mod ntriples;
pub mod ontology;
pub mod reader;
pub mod record;
pub mod reverse;
pub mod sbol;

pub use self::convert::Converter;
pub use self::convert::GraphSource;
pub use self::convert::TEST_NAMESPACE;
pub use self::diff::doc_diff;
pub use self::diff::Difference;
pub use self::error::Error;
pub use self::error::Result;
pub use self::reader::RecordReader;
pub use self::sbol::Document;

#[cfg(feature = "python")]
pub use self::python::init;
