//! The annotation arena: references, genes, transcripts, exons and coding regions.

pub mod types;

use crate::coords::{self, TranscriptMapper};
use crate::error::Error;
use crate::region::{Intron, Region};
use crate::strand::Strand;

pub use types::{
    CodingRegion, CodingRegionId, Exon, ExonId, Feature, FeatureKind, Fragment, Gene, GeneId, Node,
    Reference, ReferenceId, Transcript, TranscriptId,
};

/// Owns every entity produced by one build session.
///
/// Entities refer to each other through typed indices into this arena.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    pub(crate) references: Vec<Reference>,
    pub(crate) genes: Vec<Gene>,
    pub(crate) transcripts: Vec<Transcript>,
    pub(crate) exons: Vec<Exon>,
    pub(crate) coding_regions: Vec<CodingRegion>,
}

impl Annotation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a decoded feature in the arena. Fragments stay transient.
    pub(crate) fn insert(&mut self, feature: Feature) -> Node {
        match feature {
            Feature::Reference(r) => {
                self.references.push(r);
                Node::Reference(ReferenceId(self.references.len() - 1))
            }
            Feature::Gene(g) => {
                self.genes.push(g);
                Node::Gene(GeneId(self.genes.len() - 1))
            }
            Feature::Transcript(t) => {
                self.transcripts.push(t);
                Node::Transcript(TranscriptId(self.transcripts.len() - 1))
            }
            Feature::Exon(e) => {
                self.exons.push(e);
                Node::Exon(ExonId(self.exons.len() - 1))
            }
            Feature::CodingFragment(f) => Node::CodingFragment(f),
        }
    }

    /// Human-readable label for diagnostics, e.g. `gene 'g1'`.
    #[must_use]
    pub fn describe(&self, node: &Node) -> String {
        let id = match node {
            Node::Reference(r) => Some(self.reference(*r).id()),
            Node::Gene(g) => Some(self.gene(*g).id()),
            Node::Transcript(t) => self.transcript(*t).id(),
            Node::Exon(e) => self.exon(*e).id(),
            Node::CodingFragment(_) => None,
        };
        match (node, id) {
            (_, Some(id)) => format!("{} '{id}'", node.kind()),
            (Node::Exon(e), None) => {
                let exon = self.exon(*e);
                format!("exon {}-{}", exon.start, exon.end)
            }
            (Node::CodingFragment(f), None) => format!("coding fragment {}-{}", f.start, f.end),
            (_, None) => format!("unnamed {}", node.kind()),
        }
    }

    pub fn references(&self) -> impl Iterator<Item = (ReferenceId, &Reference)> {
        self.references
            .iter()
            .enumerate()
            .map(|(i, r)| (ReferenceId(i), r))
    }

    pub fn genes(&self) -> impl Iterator<Item = (GeneId, &Gene)> {
        self.genes.iter().enumerate().map(|(i, g)| (GeneId(i), g))
    }

    pub fn transcripts(&self) -> impl Iterator<Item = (TranscriptId, &Transcript)> {
        self.transcripts
            .iter()
            .enumerate()
            .map(|(i, t)| (TranscriptId(i), t))
    }

    pub fn exons(&self) -> impl Iterator<Item = (ExonId, &Exon)> {
        self.exons.iter().enumerate().map(|(i, e)| (ExonId(i), e))
    }

    pub fn coding_regions(&self) -> impl Iterator<Item = (CodingRegionId, &CodingRegion)> {
        self.coding_regions
            .iter()
            .enumerate()
            .map(|(i, c)| (CodingRegionId(i), c))
    }

    /// # Panics
    /// If `id` was not produced by this annotation.
    #[must_use]
    pub fn reference(&self, id: ReferenceId) -> &Reference {
        &self.references[id.0]
    }

    #[must_use]
    pub fn gene(&self, id: GeneId) -> &Gene {
        &self.genes[id.0]
    }

    #[must_use]
    pub fn transcript(&self, id: TranscriptId) -> &Transcript {
        &self.transcripts[id.0]
    }

    #[must_use]
    pub fn exon(&self, id: ExonId) -> &Exon {
        &self.exons[id.0]
    }

    #[must_use]
    pub fn coding_region(&self, id: CodingRegionId) -> &CodingRegion {
        &self.coding_regions[id.0]
    }

    #[must_use]
    pub fn find_reference(&self, id: &str) -> Option<ReferenceId> {
        self.references().find(|(_, r)| r.id == id).map(|(i, _)| i)
    }

    #[must_use]
    pub fn find_gene(&self, id: &str) -> Option<GeneId> {
        self.genes().find(|(_, g)| g.id == id).map(|(i, _)| i)
    }

    #[must_use]
    pub fn find_transcript(&self, id: &str) -> Option<TranscriptId> {
        self.transcripts()
            .find(|(_, t)| t.id.as_deref() == Some(id))
            .map(|(i, _)| i)
    }

    /// Genes linked under a reference.
    pub fn genes_of(&self, id: ReferenceId) -> impl Iterator<Item = &Gene> {
        self.reference(id).genes.iter().map(|g| self.gene(*g))
    }

    pub fn transcripts_of(&self, id: GeneId) -> impl Iterator<Item = &Transcript> {
        self.gene(id).transcripts.iter().map(|t| self.transcript(*t))
    }

    #[must_use]
    pub fn reference_of_transcript(&self, id: TranscriptId) -> Option<ReferenceId> {
        self.transcript(id)
            .gene
            .and_then(|g| self.gene(g).reference)
    }

    /// Strand of a transcript, inherited from its gene.
    pub fn transcript_strand(&self, id: TranscriptId) -> Result<Strand, Error> {
        self.transcript(id)
            .gene
            .map(|g| self.gene(g).strand)
            .ok_or_else(|| Error::Unstranded(self.describe(&Node::Transcript(id))))
    }

    /// An exon as a stranded region.
    pub fn exon_region(&self, id: ExonId) -> Result<Region, Error> {
        let exon = self.exon(id);
        let transcript = exon
            .transcript
            .ok_or_else(|| Error::Unstranded(self.describe(&Node::Exon(id))))?;
        Region::new(exon.start, exon.end, self.transcript_strand(transcript)?)
    }

    /// Exons in 5'→3' order: ascending start on forward, descending on reverse.
    pub fn transcript_exons(&self, id: TranscriptId) -> Result<Vec<(ExonId, Region)>, Error> {
        let strand = self.transcript_strand(id)?;
        let mut exons = self
            .transcript(id)
            .exons
            .iter()
            .map(|&e| {
                let exon = self.exon(e);
                Region::new(exon.start, exon.end, strand).map(|r| (e, r))
            })
            .collect::<Result<Vec<_>, _>>()?;
        coords::sort_five_to_three(strand, &mut exons, |(_, r)| r.start());
        Ok(exons)
    }

    /// Coordinate mapper over the transcript's current exons.
    pub fn mapper(&self, id: TranscriptId) -> Result<TranscriptMapper, Error> {
        let strand = self.transcript_strand(id)?;
        let exons = self.transcript_exons(id)?.into_iter().map(|(_, r)| r);
        TranscriptMapper::new(strand, exons)
    }

    pub fn transcript_length(&self, id: TranscriptId) -> Result<u64, Error> {
        Ok(self.mapper(id)?.length())
    }

    /// Transcript bounds: min start and max end over its exons.
    pub fn transcript_span(&self, id: TranscriptId) -> Result<Region, Error> {
        let strand = self.transcript_strand(id)?;
        let exons = &self.transcript(id).exons;
        let start = exons.iter().map(|&e| self.exon(e).start).min();
        let end = exons.iter().map(|&e| self.exon(e).end).max();
        match (start, end) {
            (Some(start), Some(end)) => Region::new(start, end, strand),
            _ => Err(Error::EmptyFeature(self.describe(&Node::Transcript(id)))),
        }
    }

    /// Gene bounds, recomputed from its transcripts on every call.
    pub fn gene_span(&self, id: GeneId) -> Result<Region, Error> {
        let gene = self.gene(id);
        let mut span: Option<Region> = None;
        for &t in &gene.transcripts {
            let tx = self.transcript_span(t)?;
            span = Some(match span {
                Some(s) => s.union(&tx),
                None => tx,
            });
        }
        span.ok_or_else(|| Error::EmptyFeature(self.describe(&Node::Gene(id))))
    }

    /// Introns between adjacent exons, computed once and cached until the
    /// transcript's exons or gene change.
    pub fn introns(&self, id: TranscriptId) -> Result<&[Intron], Error> {
        let transcript = self.transcript(id);
        if let Some(cached) = transcript.introns.get() {
            return Ok(cached.as_slice());
        }
        let introns = self.mapper(id)?.introns();
        Ok(transcript.introns.get_or_init(|| introns).as_slice())
    }

    /// The transcript's coding span as a stranded region, if it has one.
    pub fn coding_span(&self, id: TranscriptId) -> Result<Option<Region>, Error> {
        match self.transcript(id).coding_region {
            Some(c) => {
                let coding = self.coding_region(c);
                Region::new(coding.start, coding.end, self.transcript_strand(id)?).map(Some)
            }
            None => Ok(None),
        }
    }
}
