//! Sequence extraction through an external sequence source.
//!
//! The library never stores reference bases; it only computes which slices
//! to take from them.

use std::collections::HashMap;

use crate::error::Error;
use crate::model::{Annotation, Node, TranscriptId};
use crate::region::Region;

/// Supplies raw reference bases by reference ID.
pub trait SequenceSource {
    fn sequence(&self, reference_id: &str) -> Option<&[u8]>;
}

impl SequenceSource for HashMap<String, Vec<u8>> {
    fn sequence(&self, reference_id: &str) -> Option<&[u8]> {
        self.get(reference_id).map(Vec::as_slice)
    }
}

/// Reverse complement of a nucleotide sequence. Case is preserved; unknown
/// symbols become `N`.
#[must_use]
pub fn reverse_complement(bases: &[u8]) -> Vec<u8> {
    bases
        .iter()
        .rev()
        .map(|&b| match b {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            b'a' => b't',
            b't' => b'a',
            b'c' => b'g',
            b'g' => b'c',
            b'n' => b'n',
            _ => b'N',
        })
        .collect()
}

/// Bases covered by `region`, read 5'→3' on the region's strand.
pub fn region_sequence<S: SequenceSource + ?Sized>(
    source: &S,
    reference_id: &str,
    region: &Region,
) -> Result<Vec<u8>, Error> {
    let sequence = source
        .sequence(reference_id)
        .ok_or_else(|| Error::MissingSequence(format!("no sequence for '{reference_id}'")))?;
    let start = (region.start() - 1) as usize;
    let end = region.end() as usize;
    let slice = sequence.get(start..end).ok_or_else(|| {
        Error::MissingSequence(format!(
            "{region} extends past the end of '{reference_id}' ({} bases)",
            sequence.len()
        ))
    })?;
    Ok(if region.strand().is_reverse() {
        reverse_complement(slice)
    } else {
        slice.to_vec()
    })
}

impl Annotation {
    fn transcript_reference_id(&self, id: TranscriptId) -> Result<&str, Error> {
        self.reference_of_transcript(id)
            .map(|r| self.reference(r).id())
            .ok_or_else(|| {
                Error::MissingSequence(format!(
                    "{} is not linked to a reference",
                    self.describe(&Node::Transcript(id))
                ))
            })
    }

    /// Spliced transcript sequence: exon bases concatenated 5'→3'.
    pub fn transcript_sequence<S: SequenceSource + ?Sized>(
        &self,
        source: &S,
        id: TranscriptId,
    ) -> Result<Vec<u8>, Error> {
        let reference_id = self.transcript_reference_id(id)?;
        let mut spliced = Vec::with_capacity(self.transcript_length(id)? as usize);
        for (_, exon) in self.transcript_exons(id)? {
            spliced.extend(region_sequence(source, reference_id, &exon)?);
        }
        Ok(spliced)
    }

    /// The spliced sequence restricted to the coding region, or `None` for a
    /// non-coding transcript.
    pub fn coding_sequence<S: SequenceSource + ?Sized>(
        &self,
        source: &S,
        id: TranscriptId,
    ) -> Result<Option<Vec<u8>>, Error> {
        let Some(coding) = self.coding_span(id)? else {
            return Ok(None);
        };
        let mapper = self.mapper(id)?;
        let first = mapper.abs_to_rel(coding.five_prime())?;
        let last = mapper.abs_to_rel(coding.three_prime())?;
        let spliced = self.transcript_sequence(source, id)?;
        Ok(Some(spliced[(first - 1) as usize..last as usize].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::Builder;
    use crate::config::BuilderConfig;
    use crate::record::Record;
    use crate::strand::Strand;

    const CHR1: &[u8] = b"AAAAACCCCCGGGGGTTTTTACGTACGTAAATTTGGGCCC";

    fn source() -> HashMap<String, Vec<u8>> {
        HashMap::from([("chr1".to_string(), CHR1.to_vec())])
    }

    fn build(strand: Strand) -> (Annotation, TranscriptId) {
        let records = vec![
            Record::new("chromosome", "chr1", 1, 40, Strand::Forward).with_id("chr1"),
            Record::new("gene", "chr1", 1, 40, strand).with_id("g1"),
            Record::new("mRNA", "chr1", 1, 40, strand)
                .with_id("t1")
                .with_parent("g1"),
            Record::new("exon", "chr1", 3, 7, strand).with_parent("t1"),
            Record::new("exon", "chr1", 21, 28, strand).with_parent("t1"),
            Record::new("CDS", "chr1", 6, 7, strand).with_parent("t1"),
            Record::new("CDS", "chr1", 21, 23, strand).with_parent("t1"),
        ];
        let output = Builder::new(&BuilderConfig::default())
            .unwrap()
            .run(records)
            .unwrap();
        let t = output.annotation.find_transcript("t1").unwrap();
        (output.annotation, t)
    }

    #[test]
    fn reverse_complement_preserves_case() {
        assert_eq!(reverse_complement(b"ACGTn"), b"nACGT".to_vec());
        assert_eq!(reverse_complement(b"aaCG"), b"CGtt".to_vec());
        assert_eq!(reverse_complement(b"AXG"), b"CNT".to_vec());
    }

    #[test]
    fn region_slices_are_one_based() {
        let region = Region::new(1, 5, Strand::Forward).unwrap();
        assert_eq!(region_sequence(&source(), "chr1", &region).unwrap(), b"AAAAA");

        let region = Region::new(5, 7, Strand::Reverse).unwrap();
        assert_eq!(region_sequence(&source(), "chr1", &region).unwrap(), b"GGT");
    }

    #[test]
    fn missing_or_short_sequence() {
        let region = Region::new(38, 45, Strand::Forward).unwrap();
        assert!(matches!(
            region_sequence(&source(), "chr1", &region),
            Err(Error::MissingSequence(_))
        ));
        assert!(matches!(
            region_sequence(&source(), "chr2", &region),
            Err(Error::MissingSequence(_))
        ));
    }

    #[test]
    fn forward_transcript_sequence() {
        let (annotation, t) = build(Strand::Forward);
        let seq = annotation.transcript_sequence(&source(), t).unwrap();
        assert_eq!(seq, b"AAACCACGTACGT");
        let coding = annotation.coding_sequence(&source(), t).unwrap().unwrap();
        assert_eq!(coding, b"CCACG");
    }

    #[test]
    fn reverse_transcript_sequence() {
        let (annotation, t) = build(Strand::Reverse);
        let seq = annotation.transcript_sequence(&source(), t).unwrap();
        assert_eq!(seq, b"ACGTACGTGGTTT");
        let coding = annotation.coding_sequence(&source(), t).unwrap().unwrap();
        assert_eq!(coding, b"CGTGG");
    }
}
