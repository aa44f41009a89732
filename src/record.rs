//! Input feature records, as emitted by an external annotation reader.

use crate::error::Error;
use crate::strand::Strand;

/// One flat annotation record.
///
/// Records may arrive in any order; children can precede their parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: Option<String>,
    /// Feature type tag, e.g. `gene`, `mRNA`, `exon`, `CDS`.
    pub feature_type: String,
    /// ID of the sequence the feature lies on.
    pub seq_id: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub parent_ids: Vec<String>,
}

impl Record {
    pub fn new(
        feature_type: impl Into<String>,
        seq_id: impl Into<String>,
        start: u64,
        end: u64,
        strand: Strand,
    ) -> Self {
        Self {
            id: None,
            feature_type: feature_type.into(),
            seq_id: seq_id.into(),
            start,
            end,
            strand,
            parent_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_ids.push(parent_id.into());
        self
    }

    /// Check the coordinate contract: 1-based, `start <= end`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.start == 0 {
            return Err(Error::InvalidRecord(format!(
                "{}: start must be >= 1",
                self.label()
            )));
        }
        if self.start > self.end {
            return Err(Error::InvalidRecord(format!(
                "{}: start {} exceeds end {}",
                self.label(),
                self.start,
                self.end
            )));
        }
        Ok(())
    }

    /// Short description used in log messages and errors.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("{} '{id}'", self.feature_type),
            None => format!(
                "{} {}:{}-{}",
                self.feature_type, self.seq_id, self.start, self.end
            ),
        }
    }
}

/// Parent ID as declared by the record's parent attribute.
///
/// Ambiguous parentage is settled before linking, so the first entry is the
/// only one considered.
#[must_use]
pub fn declared_parent(record: &Record) -> Option<&str> {
    record.parent_ids.first().map(String::as_str)
}

/// Declared parent, falling back to the sequence ID.
///
/// Genes rarely name their reference explicitly.
#[must_use]
pub fn declared_parent_or_seq_id(record: &Record) -> Option<&str> {
    declared_parent(record).or(Some(record.seq_id.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_coordinates() {
        assert!(Record::new("exon", "chr1", 1, 1, Strand::Forward).validate().is_ok());
        assert!(matches!(
            Record::new("exon", "chr1", 0, 10, Strand::Forward).validate(),
            Err(Error::InvalidRecord(_))
        ));
        assert!(matches!(
            Record::new("exon", "chr1", 20, 10, Strand::Forward).validate(),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn parent_extractors() {
        let gene = Record::new("gene", "chr1", 1, 100, Strand::Forward).with_id("g1");
        assert_eq!(declared_parent(&gene), None);
        assert_eq!(declared_parent_or_seq_id(&gene), Some("chr1"));

        let explicit = gene.clone().with_parent("ref1");
        assert_eq!(declared_parent_or_seq_id(&explicit), Some("ref1"));
    }

    #[test]
    fn labels() {
        let named = Record::new("mRNA", "chr1", 1, 100, Strand::Forward).with_id("t1");
        assert_eq!(named.label(), "mRNA 't1'");
        let unnamed = Record::new("exon", "chr1", 5, 9, Strand::Forward);
        assert_eq!(unnamed.label(), "exon chr1:5-9");
    }
}
