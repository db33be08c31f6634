//! Canonical vocabulary shared by both conversion directions.

pub const GENBANK: &str = "http://www.ncbi.nlm.nih.gov/genbank#";
pub const GENBANK_FIELD: &str = "http://www.ncbi.nlm.nih.gov/genbank#field";
pub const GENBANK_CANONICAL_FIELD: &str = "http://www.ncbi.nlm.nih.gov/genbank#canonical_field";
pub const GENBANK_QUALIFIER: &str = "http://www.ncbi.nlm.nih.gov/genbank#qualifier";
pub const GENBANK_CANONICAL_QUALIFIER: &str =
    "http://www.ncbi.nlm.nih.gov/genbank#canonical_qualifier";
pub const GENBANK_ORDER: &str = "http://www.ncbi.nlm.nih.gov/genbank#order";

pub const SO: &str = "https://identifiers.org/SO:";
pub const SBO: &str = "https://identifiers.org/SBO:";

pub const SO_LINEAR: &str = "https://identifiers.org/SO:0000987";
pub const SO_CIRCULAR: &str = "https://identifiers.org/SO:0000988";
pub const SO_FORWARD: &str = "https://identifiers.org/SO:0001880";
pub const SO_REVERSE: &str = "https://identifiers.org/SO:0001881";
pub const SO_SEQUENCE_FEATURE: &str = "https://identifiers.org/SO:0000110";

pub const SBO_DNA: &str = "https://identifiers.org/SBO:0000251";
pub const SBO_RNA: &str = "https://identifiers.org/SBO:0000250";
pub const SBO_PROTEIN: &str = "https://identifiers.org/SBO:0000252";

pub const EDAM_NUCLEIC_ACID: &str = "https://identifiers.org/edam:format_1207";
pub const EDAM_PROTEIN: &str = "https://identifiers.org/edam:format_1208";

/// GenBank feature keys and their Sequence Ontology terms.
///
/// When a term appears twice, the first key wins on the way back.
const FEATURE_ROLES: &[(&str, &str)] = &[
    ("promoter", "0000167"),
    ("CDS", "0000316"),
    ("terminator", "0000141"),
    ("RBS", "0000139"),
    ("rep_origin", "0000296"),
    ("primer_bind", "0005850"),
    ("gene", "0000704"),
    ("mRNA", "0000234"),
    ("misc_feature", "0000001"),
    ("protein_bind", "0000410"),
    ("oriT", "0000724"),
    ("polyA_signal", "0000551"),
    ("sig_peptide", "0000418"),
    ("exon", "0000147"),
    ("intron", "0000188"),
    ("5'UTR", "0000204"),
    ("3'UTR", "0000205"),
    ("tRNA", "0000253"),
    ("rRNA", "0000252"),
    ("ncRNA", "0000655"),
    ("misc_RNA", "0000673"),
    ("regulatory", "0005836"),
    ("repeat_region", "0000657"),
    ("stem_loop", "0000313"),
    ("mat_peptide", "0000419"),
    ("LTR", "0000286"),
    ("enhancer", "0000165"),
    ("mobile_element", "0001037"),
    ("misc_binding", "0000409"),
    ("variation", "0001059"),
    ("operon", "0000178"),
    ("telomere", "0000624"),
    ("centromere", "0000577"),
];

/// The role of a feature kind, and whether the kind can be recovered from
/// that role alone.
pub fn feature_role(kind: &str) -> (String, bool) {
    match FEATURE_ROLES.iter().find(|(k, _)| *k == kind) {
        Some((_, term)) => {
            let role = format!("{}{}", SO, term);
            let reversible = feature_kind(&role) == Some(kind);
            (role, reversible)
        }
        None => (SO_SEQUENCE_FEATURE.to_string(), false),
    }
}

pub fn feature_kind(role: &str) -> Option<&'static str> {
    let term = role.strip_prefix(SO)?;
    FEATURE_ROLES
        .iter()
        .find(|(_, t)| *t == term)
        .map(|(k, _)| *k)
}

/// The SBO component type for a GenBank molecule type.
pub fn molecule_sbo(molecule_type: Option<&str>) -> &'static str {
    match molecule_type {
        Some(m) if is_protein(Some(m)) => SBO_PROTEIN,
        Some(m) if m.to_ascii_uppercase().contains("RNA") => SBO_RNA,
        _ => SBO_DNA,
    }
}

/// The molecule type written when a component has no recorded one.
pub fn sbo_molecule(types: &[String]) -> Option<&'static str> {
    types.iter().find_map(|t| match t.as_str() {
        SBO_DNA => Some("DNA"),
        SBO_RNA => Some("RNA"),
        SBO_PROTEIN => Some("AA"),
        _ => None,
    })
}

pub fn is_protein(molecule_type: Option<&str>) -> bool {
    molecule_type
        .map(|m| m.trim().eq_ignore_ascii_case("aa"))
        .unwrap_or(false)
}

pub fn encoding(molecule_type: Option<&str>) -> &'static str {
    if is_protein(molecule_type) {
        EDAM_PROTEIN
    } else {
        EDAM_NUCLEIC_ACID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_kinds_both_ways() {
        let (role, reversible) = feature_role("promoter");
        assert_eq!(role, "https://identifiers.org/SO:0000167");
        assert!(reversible);
        assert_eq!(feature_kind(&role), Some("promoter"));
        for (kind, _) in FEATURE_ROLES {
            assert!(feature_role(kind).1, "{} is not reversible", kind);
        }
    }

    #[test]
    fn falls_back_for_unknown_kinds() {
        let (role, reversible) = feature_role("Promoter");
        assert_eq!(role, SO_SEQUENCE_FEATURE);
        assert!(!reversible);
        assert_eq!(feature_kind(SO_SEQUENCE_FEATURE), None);
        assert_eq!(feature_kind("https://example.org/SO:0000167"), None);
    }

    #[test]
    fn maps_molecule_types() {
        assert_eq!(molecule_sbo(Some("DNA")), SBO_DNA);
        assert_eq!(molecule_sbo(Some("ds-DNA")), SBO_DNA);
        assert_eq!(molecule_sbo(Some("mRNA")), SBO_RNA);
        assert_eq!(molecule_sbo(Some("AA")), SBO_PROTEIN);
        assert_eq!(molecule_sbo(None), SBO_DNA);
        assert_eq!(encoding(Some("aa")), EDAM_PROTEIN);
        assert_eq!(encoding(Some("RNA")), EDAM_NUCLEIC_ACID);
        assert_eq!(sbo_molecule(&[SO_LINEAR.to_string(), SBO_RNA.to_string()]), Some("RNA"));
    }
}
