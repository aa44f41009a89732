//! Stranded 1-based closed genomic intervals.

use std::fmt;

use crate::error::Error;
use crate::strand::Strand;

/// A 1-based, closed genomic interval with a strand.
///
/// `start <= end` holds for every constructed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    start: u64,
    end: u64,
    strand: Strand,
}

impl Region {
    pub fn new(start: u64, end: u64, strand: Strand) -> Result<Self, Error> {
        if start == 0 {
            return Err(Error::out_of_range(start, "genomic coordinates are 1-based"));
        }
        if start > end {
            return Err(Error::out_of_range(
                start,
                format!("region start exceeds end ({end})"),
            ));
        }
        Ok(Self { start, end, strand })
    }

    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// The end transcription starts from.
    #[must_use]
    pub fn five_prime(&self) -> u64 {
        if self.strand.is_reverse() {
            self.end
        } else {
            self.start
        }
    }

    #[must_use]
    pub fn three_prime(&self) -> u64 {
        if self.strand.is_reverse() {
            self.start
        } else {
            self.end
        }
    }

    #[must_use]
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    #[must_use]
    pub fn contains(&self, position: u64) -> bool {
        position >= self.start && position <= self.end
    }

    /// Smallest region covering both `self` and `other`, keeping `self`'s strand.
    #[must_use]
    pub fn union(&self, other: &Region) -> Region {
        Region {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            strand: self.strand,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}({})", self.start, self.end, self.strand)
    }
}

/// The gap between two adjacent exons of a transcript.
///
/// Never read from input; derived from the exon layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intron {
    pub region: Region,
}

impl Intron {
    /// Splice donor: the intron's 5' end.
    #[must_use]
    pub fn donor(&self) -> u64 {
        self.region.five_prime()
    }

    /// Splice acceptor: the intron's 3' end.
    #[must_use]
    pub fn acceptor(&self) -> u64 {
        self.region.three_prime()
    }
}
