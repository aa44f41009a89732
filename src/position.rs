//! Strand-aware single genomic positions.

use std::fmt;

use crate::error::Error;
use crate::strand::Strand;

/// A 1-based genomic coordinate that knows which strand it is read on.
///
/// Upstream and downstream are relative to the direction of transcription:
/// on the forward strand upstream means smaller coordinates, on the reverse
/// strand it means larger ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenomicPosition {
    position: u64,
    strand: Strand,
}

impl GenomicPosition {
    pub fn new(position: u64, strand: Strand) -> Result<Self, Error> {
        if position == 0 {
            return Err(Error::out_of_range(0, "genomic positions start at 1"));
        }
        Ok(Self { position, strand })
    }

    pub fn from_zero_based(position: u64, strand: Strand) -> Result<Self, Error> {
        let position = position
            .checked_add(1)
            .ok_or_else(|| Error::out_of_range(position, "coordinate overflow"))?;
        Ok(Self { position, strand })
    }

    #[must_use]
    pub fn get(&self) -> u64 {
        self.position
    }

    #[must_use]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    #[must_use]
    pub fn to_zero_based(&self) -> u64 {
        self.position - 1
    }

    pub fn upstream(&self, distance: u64) -> Result<Self, Error> {
        if self.strand.is_reverse() {
            self.shift_up(distance)
        } else {
            self.shift_down(distance)
        }
    }

    pub fn downstream(&self, distance: u64) -> Result<Self, Error> {
        if self.strand.is_reverse() {
            self.shift_down(distance)
        } else {
            self.shift_up(distance)
        }
    }

    /// Add two positions on the same strand.
    pub fn checked_add(&self, other: &GenomicPosition) -> Result<Self, Error> {
        self.ensure_same_strand(other)?;
        self.shift_up(other.position)
    }

    /// Signed distance from `self` to `other` in the direction of transcription.
    ///
    /// Positive when `other` is downstream of `self`.
    pub fn distance_to(&self, other: &GenomicPosition) -> Result<i64, Error> {
        self.ensure_same_strand(other)?;
        let from = signed(self.position)?;
        let to = signed(other.position)?;
        let delta = to - from;
        Ok(if self.strand.is_reverse() { -delta } else { delta })
    }

    fn ensure_same_strand(&self, other: &GenomicPosition) -> Result<(), Error> {
        if self.strand != other.strand {
            return Err(Error::StrandMismatch(self.strand, other.strand));
        }
        Ok(())
    }

    fn shift_up(&self, distance: u64) -> Result<Self, Error> {
        let position = self
            .position
            .checked_add(distance)
            .ok_or_else(|| Error::out_of_range(self.position, "coordinate overflow"))?;
        Ok(Self {
            position,
            strand: self.strand,
        })
    }

    fn shift_down(&self, distance: u64) -> Result<Self, Error> {
        match self.position.checked_sub(distance) {
            Some(position) if position >= 1 => Ok(Self {
                position,
                strand: self.strand,
            }),
            _ => Err(Error::out_of_range(
                self.position,
                format!("cannot move {distance} below 1"),
            )),
        }
    }
}

fn signed(position: u64) -> Result<i64, Error> {
    i64::try_from(position).map_err(|_| Error::out_of_range(position, "position exceeds i64 range"))
}

impl fmt::Display for GenomicPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.position, self.strand)
    }
}
