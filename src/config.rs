use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::build::decoder::DecoderRegistry;

/// How to treat a record that declares more than one parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParentagePolicy {
    /// Fail the record with [`Error::AmbiguousParentage`](crate::error::Error::AmbiguousParentage).
    #[default]
    Reject,
    /// Link to the first declared parent and ignore the rest.
    FirstDeclared,
}

/// Builder configuration: which type tags decode into which feature kind,
/// and the multi-parent policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderConfig {
    pub reference_types: BTreeSet<String>,
    pub gene_types: BTreeSet<String>,
    pub transcript_types: BTreeSet<String>,
    pub exon_types: BTreeSet<String>,
    pub coding_types: BTreeSet<String>,
    pub parentage: ParentagePolicy,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            reference_types: tags(&["reference", "chromosome", "contig"]),
            gene_types: tags(&["gene", "pseudogene", "transposable_element_gene"]),
            transcript_types: tags(&[
                "mRNA",
                "snRNA",
                "rRNA",
                "snoRNA",
                "mRNA_TE_gene",
                "miRNA",
                "tRNA",
                "ncRNA",
                "pseudogenic_transcript",
            ]),
            exon_types: tags(&["exon", "pseudogenic_exon"]),
            coding_types: tags(&["CDS"]),
            parentage: ParentagePolicy::Reject,
        }
    }
}

impl BuilderConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Check that the tag sets form a valid decoder registry.
    pub fn validate(&self) -> Result<()> {
        DecoderRegistry::from_config(self)?;
        Ok(())
    }

    #[must_use]
    pub fn with_parentage(mut self, parentage: ParentagePolicy) -> Self {
        self.parentage = parentage;
        self
    }
}

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();
        f
    }

    #[test]
    fn default_tags() {
        let config = BuilderConfig::default();
        assert!(config.transcript_types.contains("mRNA"));
        assert!(config.coding_types.contains("CDS"));
        assert_eq!(config.parentage, ParentagePolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let json = r#"{
            "transcriptTypes": ["mRNA", "lnc_RNA"],
            "parentage": "firstDeclared"
        }"#;
        let f = write_config(json);
        let config = BuilderConfig::from_file(f.path()).unwrap();
        assert!(config.transcript_types.contains("lnc_RNA"));
        assert!(!config.transcript_types.contains("tRNA"));
        assert!(config.gene_types.contains("gene"));
        assert_eq!(config.parentage, ParentagePolicy::FirstDeclared);
    }

    #[test]
    fn overlapping_tags_rejected() {
        let json = r#"{ "exonTypes": ["exon", "CDS"] }"#;
        let f = write_config(json);
        let err = BuilderConfig::from_file(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("CDS"));
    }

    #[test]
    fn empty_tag_set_rejected() {
        let json = r#"{ "codingTypes": [] }"#;
        let f = write_config(json);
        assert!(BuilderConfig::from_file(f.path()).is_err());
    }

    #[test]
    fn unknown_policy_rejected() {
        let json = r#"{ "parentage": "pickAny" }"#;
        let f = write_config(json);
        assert!(BuilderConfig::from_file(f.path()).is_err());
    }

    #[test]
    fn missing_file() {
        let err = BuilderConfig::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
