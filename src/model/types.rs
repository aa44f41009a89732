//! Annotation entity types stored in the [`Annotation`](super::Annotation) arena.
//!
//! Back-references and child collections are only written by the linker and
//! the coding aggregator; everything here exposes read access.

use std::cell::OnceCell;
use std::fmt;

use crate::region::Intron;
use crate::strand::Strand;

/// Index of a [`Reference`] in its annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceId(pub(crate) usize);

/// Index of a [`Gene`] in its annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneId(pub(crate) usize);

/// Index of a [`Transcript`] in its annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TranscriptId(pub(crate) usize);

/// Index of an [`Exon`] in its annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExonId(pub(crate) usize);

/// Index of a [`CodingRegion`] in its annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodingRegionId(pub(crate) usize);

/// A reference sequence (chromosome, contig) at the root of the tree.
#[derive(Debug, Clone)]
pub struct Reference {
    pub(crate) id: String,
    pub(crate) size: u64,
    pub(crate) genes: Vec<GeneId>,
}

impl Reference {
    pub(crate) fn new(id: String, size: u64) -> Self {
        Self {
            id,
            size,
            genes: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Genes on this reference, unique, in link order.
    #[must_use]
    pub fn genes(&self) -> &[GeneId] {
        &self.genes
    }
}

/// A gene. Its bounds are derived from its transcripts.
#[derive(Debug, Clone)]
pub struct Gene {
    pub(crate) id: String,
    pub(crate) strand: Strand,
    pub(crate) reference: Option<ReferenceId>,
    pub(crate) transcripts: Vec<TranscriptId>,
}

impl Gene {
    pub(crate) fn new(id: String, strand: Strand) -> Self {
        Self {
            id,
            strand,
            reference: None,
            transcripts: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    #[must_use]
    pub fn reference(&self) -> Option<ReferenceId> {
        self.reference
    }

    #[must_use]
    pub fn transcripts(&self) -> &[TranscriptId] {
        &self.transcripts
    }
}

/// A transcript. Strand and bounds come from its gene and exons.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub(crate) id: Option<String>,
    pub(crate) gene: Option<GeneId>,
    pub(crate) exons: Vec<ExonId>,
    pub(crate) coding_region: Option<CodingRegionId>,
    /// Derived introns; reset whenever the exon set or the gene changes.
    pub(crate) introns: OnceCell<Vec<Intron>>,
}

impl Transcript {
    pub(crate) fn new(id: Option<String>) -> Self {
        Self {
            id,
            gene: None,
            exons: Vec::new(),
            coding_region: None,
            introns: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn gene(&self) -> Option<GeneId> {
        self.gene
    }

    /// Exons in link order. Use [`Annotation::transcript_exons`](super::Annotation::transcript_exons)
    /// for 5'→3' order.
    #[must_use]
    pub fn exon_ids(&self) -> &[ExonId] {
        &self.exons
    }

    #[must_use]
    pub fn coding_region(&self) -> Option<CodingRegionId> {
        self.coding_region
    }

    pub(crate) fn invalidate_introns(&mut self) {
        self.introns = OnceCell::new();
    }
}

/// An exon. Its strand is read through the owning transcript's gene.
#[derive(Debug, Clone)]
pub struct Exon {
    pub(crate) id: Option<String>,
    pub(crate) start: u64,
    pub(crate) end: u64,
    pub(crate) transcript: Option<TranscriptId>,
}

impl Exon {
    pub(crate) fn new(id: Option<String>, start: u64, end: u64) -> Self {
        Self {
            id,
            start,
            end,
            transcript: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
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
    pub fn transcript(&self) -> Option<TranscriptId> {
        self.transcript
    }
}

/// The coalesced coding span of one transcript.
#[derive(Debug, Clone)]
pub struct CodingRegion {
    pub(crate) start: u64,
    pub(crate) end: u64,
    pub(crate) transcript: TranscriptId,
}

impl CodingRegion {
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub fn transcript(&self) -> TranscriptId {
        self.transcript
    }
}

/// One coding record's span, before it is merged into a [`CodingRegion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: u64,
    pub end: u64,
}

/// The closed set of feature kinds a record can decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Reference,
    Gene,
    Transcript,
    Exon,
    CodingFragment,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reference => "reference",
            Self::Gene => "gene",
            Self::Transcript => "transcript",
            Self::Exon => "exon",
            Self::CodingFragment => "coding fragment",
        };
        f.write_str(name)
    }
}

/// A freshly decoded feature, not yet placed in an annotation.
#[derive(Debug, Clone)]
pub enum Feature {
    Reference(Reference),
    Gene(Gene),
    Transcript(Transcript),
    Exon(Exon),
    CodingFragment(Fragment),
}

impl Feature {
    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Reference(_) => FeatureKind::Reference,
            Self::Gene(_) => FeatureKind::Gene,
            Self::Transcript(_) => FeatureKind::Transcript,
            Self::Exon(_) => FeatureKind::Exon,
            Self::CodingFragment(_) => FeatureKind::CodingFragment,
        }
    }
}

/// A node produced by the builder: an arena handle, or a transient fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Reference(ReferenceId),
    Gene(GeneId),
    Transcript(TranscriptId),
    Exon(ExonId),
    CodingFragment(Fragment),
}

impl Node {
    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Reference(_) => FeatureKind::Reference,
            Self::Gene(_) => FeatureKind::Gene,
            Self::Transcript(_) => FeatureKind::Transcript,
            Self::Exon(_) => FeatureKind::Exon,
            Self::CodingFragment(_) => FeatureKind::CodingFragment,
        }
    }
}
