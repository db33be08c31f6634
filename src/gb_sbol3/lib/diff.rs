//! Structural comparison of SBOL3 documents.

use std::collections::BTreeSet;
use std::fmt;

use super::sbol::Document;

/// A triple present in only one of two compared documents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Difference {
    /// Only in the first document.
    Removed(String),
    /// Only in the second document.
    Added(String),
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Difference::Removed(triple) => write!(f, "- {}", triple),
            Difference::Added(triple) => write!(f, "+ {}", triple),
        }
    }
}

fn triples(document: &Document) -> BTreeSet<String> {
    document
        .to_triples()
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Compare two documents as sets of triples, ignoring the order of objects
/// and of their properties. Equal documents give an empty list.
pub fn doc_diff(a: &Document, b: &Document) -> Vec<Difference> {
    let left = triples(a);
    let right = triples(b);
    left.difference(&right)
        .cloned()
        .map(Difference::Removed)
        .chain(right.difference(&left).cloned().map(Difference::Added))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
<https://example.org/s> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://sbols.org/v3#Sequence> .
<https://example.org/s> <http://sbols.org/v3#displayId> \"s\" .
<https://example.org/s> <http://sbols.org/v3#elements> \"acgt\" .
";

    #[test]
    fn ignores_triple_order() {
        let a = Document::from_ntriples(DOC).unwrap();
        let reversed = DOC.lines().rev().map(|l| format!("{}\n", l)).collect::<String>();
        let b = Document::from_ntriples(&reversed).unwrap();
        assert!(doc_diff(&a, &b).is_empty());
    }

    #[test]
    fn reports_both_sides() {
        let a = Document::from_ntriples(DOC).unwrap();
        let b = Document::from_ntriples(&DOC.replace("acgt", "acgg")).unwrap();
        let diff = doc_diff(&a, &b);
        assert_eq!(diff.len(), 2);
        assert!(matches!(&diff[0], Difference::Removed(t) if t.contains("acgt")));
        assert!(matches!(&diff[1], Difference::Added(t) if t.contains("acgg")));
        assert!(diff[0].to_string().starts_with("- <https://example.org/s>"));
    }
}
