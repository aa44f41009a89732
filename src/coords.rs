//! Relative (spliced transcript) ↔ absolute (genomic) coordinate mapping.
//!
//! Relative positions are 1-based along the spliced transcript, counted from
//! its 5' end. Absolute positions are 1-based reference coordinates.

use crate::error::Error;
use crate::region::{Intron, Region};
use crate::strand::Strand;

/// Order intervals 5'→3': ascending start on forward, descending on reverse.
pub(crate) fn sort_five_to_three<T>(strand: Strand, items: &mut [T], start: impl Fn(&T) -> u64) {
    if strand.is_reverse() {
        items.sort_by(|a, b| start(b).cmp(&start(a)));
    } else {
        items.sort_by_key(|item| start(item));
    }
}

/// Maps coordinates between a transcript and its reference.
#[derive(Debug, Clone)]
pub struct TranscriptMapper {
    strand: Strand,
    /// Exons in 5'→3' transcript order.
    exons: Vec<Region>,
}

impl TranscriptMapper {
    /// Build a mapper from exon intervals in any order.
    ///
    /// Exons are re-stranded to `strand` and sorted ascending on the forward
    /// strand, descending on the reverse strand.
    pub fn new(strand: Strand, exons: impl IntoIterator<Item = Region>) -> Result<Self, Error> {
        let mut exons = exons
            .into_iter()
            .map(|e| Region::new(e.start(), e.end(), strand))
            .collect::<Result<Vec<_>, _>>()?;
        sort_five_to_three(strand, &mut exons, Region::start);
        Ok(Self { strand, exons })
    }

    #[must_use]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    #[must_use]
    pub fn exons(&self) -> &[Region] {
        &self.exons
    }

    /// Spliced length: the sum of exon lengths.
    #[must_use]
    pub fn length(&self) -> u64 {
        self.exons.iter().map(Region::length).sum()
    }

    /// Convert a relative transcript position to a genomic coordinate.
    pub fn rel_to_abs(&self, rel: u64) -> Result<u64, Error> {
        let length = self.length();
        if rel < 1 || rel > length {
            return Err(Error::out_of_range(
                rel,
                format!("transcript positions run from 1 to {length}"),
            ));
        }

        let mut cumulative = 0;
        for exon in &self.exons {
            if rel <= cumulative + exon.length() {
                let offset = rel - cumulative - 1;
                return Ok(if self.strand.is_reverse() {
                    exon.five_prime() - offset
                } else {
                    exon.five_prime() + offset
                });
            }
            cumulative += exon.length();
        }

        Err(Error::out_of_range(rel, "position not covered by any exon"))
    }

    /// Convert a genomic coordinate to a relative transcript position.
    ///
    /// Positions inside introns or outside the transcript have no relative
    /// representation.
    pub fn abs_to_rel(&self, abs: u64) -> Result<u64, Error> {
        let mut cumulative = 0;
        for exon in &self.exons {
            if exon.contains(abs) {
                let offset = if self.strand.is_reverse() {
                    exon.five_prime() - abs
                } else {
                    abs - exon.five_prime()
                };
                return Ok(cumulative + offset + 1);
            }
            cumulative += exon.length();
        }

        let reason = if self.introns().iter().any(|i| i.region.contains(abs)) {
            "position lies in an intron"
        } else {
            "position lies outside the transcript"
        };
        Err(Error::out_of_range(abs, reason))
    }

    /// Derive the introns between adjacent exons, in 5'→3' order.
    ///
    /// Abutting or overlapping exons produce no intron.
    #[must_use]
    pub fn introns(&self) -> Vec<Intron> {
        self.exons
            .windows(2)
            .filter_map(|pair| {
                let (a, b) = (&pair[0], &pair[1]);
                let (start, end) = if self.strand.is_reverse() {
                    (b.five_prime() + 1, a.three_prime().checked_sub(1)?)
                } else {
                    (a.three_prime() + 1, b.five_prime().checked_sub(1)?)
                };
                Region::new(start, end, self.strand)
                    .ok()
                    .map(|region| Intron { region })
            })
            .collect()
    }
}
