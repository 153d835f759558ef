//! IRIs with fixed meaning in OWL and OBO ontologies.

pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
pub const OWL_NOTHING: &str = "http://www.w3.org/2002/07/owl#Nothing";
pub const OWL_DEPRECATED: &str = "http://www.w3.org/2002/07/owl#deprecated";

pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

pub const OBO_NS: &str = "http://purl.obolibrary.org/obo/";
pub const OBO_IN_OWL_NS: &str = "http://www.geneontology.org/formats/oboInOwl#";

/// Annotation property linking a term to a named subset (tag).
pub const IN_SUBSET: &str = "http://www.geneontology.org/formats/oboInOwl#inSubset";
pub const HAS_SYNONYM_TYPE: &str = "http://www.geneontology.org/formats/oboInOwl#hasSynonymType";
pub const SUBSET_PROPERTY: &str = "http://www.geneontology.org/formats/oboInOwl#SubsetProperty";
pub const SYNONYM_TYPE_PROPERTY: &str =
    "http://www.geneontology.org/formats/oboInOwl#SynonymTypeProperty";

pub const DC_SOURCE: &str = "http://purl.org/dc/elements/1.1/source";
