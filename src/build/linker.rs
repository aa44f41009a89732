//! Parent resolution by ID with deferred orphans.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{trace, warn};

use crate::error::Error;
use crate::model::{Annotation, FeatureKind, Node};
use crate::record::{self, Record};

use super::{BuildWarning, Hook, HookContext};

/// Extracts the ID of the parent a child record should be linked to.
pub type ParentIdFn = fn(&Record) -> Option<&str>;

/// A parent/child kind pair resolved by one [`Linker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    ReferenceGene,
    GeneTranscript,
    TranscriptExon,
}

impl Link {
    #[must_use]
    pub fn parent_kind(self) -> FeatureKind {
        match self {
            Self::ReferenceGene => FeatureKind::Reference,
            Self::GeneTranscript => FeatureKind::Gene,
            Self::TranscriptExon => FeatureKind::Transcript,
        }
    }

    #[must_use]
    pub fn child_kind(self) -> FeatureKind {
        match self {
            Self::ReferenceGene => FeatureKind::Gene,
            Self::GeneTranscript => FeatureKind::Transcript,
            Self::TranscriptExon => FeatureKind::Exon,
        }
    }
}

/// Links children of one kind to parents of another.
///
/// Children seen before their parent wait in an orphan queue keyed by the
/// awaited parent ID and are attached as soon as that parent is indexed.
pub struct Linker {
    link: Link,
    parent_id: ParentIdFn,
    /// Parent ID → parent node.
    index: HashMap<String, Node>,
    /// Awaited parent ID → children waiting for it, in arrival order.
    orphans: IndexMap<String, Vec<Node>>,
}

impl Linker {
    #[must_use]
    pub fn new(link: Link) -> Self {
        Self {
            link,
            parent_id: record::declared_parent,
            index: HashMap::new(),
            orphans: IndexMap::new(),
        }
    }

    /// Replace the parent ID extractor.
    #[must_use]
    pub fn with_parent_id(mut self, parent_id: ParentIdFn) -> Self {
        self.parent_id = parent_id;
        self
    }

    #[must_use]
    pub fn link(&self) -> Link {
        self.link
    }

    /// Number of children still waiting for a parent.
    #[must_use]
    pub fn orphan_count(&self) -> usize {
        self.orphans.values().map(Vec::len).sum()
    }

    /// Register a parent node and attach any orphans waiting on its ID.
    pub fn index(
        &mut self,
        node: &Node,
        record: &Record,
        annotation: &mut Annotation,
    ) -> Result<(), Error> {
        if node.kind() != self.link.parent_kind() {
            return Ok(());
        }
        let Some(id) = record.id.as_deref() else {
            return Ok(());
        };
        if self.index.contains_key(id) {
            return Err(Error::DuplicateId(id.to_string()));
        }
        self.index.insert(id.to_string(), *node);

        if let Some(waiting) = self.orphans.shift_remove(id) {
            trace!("resolving {} orphan(s) of {}", waiting.len(), record.label());
            for child in waiting {
                attach(annotation, child, *node)?;
            }
        }
        Ok(())
    }

    /// Link a child node to its parent, or queue it until the parent appears.
    pub fn try_link(
        &mut self,
        node: &Node,
        record: &Record,
        ctx: &mut HookContext<'_>,
    ) -> Result<(), Error> {
        if node.kind() != self.link.child_kind() {
            return Ok(());
        }
        let Some(parent_id) = (self.parent_id)(record) else {
            let child = ctx.annotation.describe(node);
            warn!("{child} declares no parent");
            ctx.warnings.push(BuildWarning::Unparented { child });
            return Ok(());
        };

        match self.index.get(parent_id) {
            Some(parent) => attach(ctx.annotation, *node, *parent),
            None => {
                self.orphans
                    .entry(parent_id.to_string())
                    .or_default()
                    .push(*node);
                Ok(())
            }
        }
    }

    /// Report every child whose parent never appeared.
    pub fn finalize(&mut self, ctx: &mut HookContext<'_>) {
        for (parent_id, children) in self.orphans.drain(..) {
            for node in children {
                let child = ctx.annotation.describe(&node);
                warn!("orphan {child}: parent '{parent_id}' never appeared");
                ctx.warnings.push(BuildWarning::Orphan {
                    child,
                    parent_id: parent_id.clone(),
                });
            }
        }
    }
}

impl Hook for Linker {
    fn post_transform(
        &mut self,
        node: &Node,
        record: &Record,
        ctx: &mut HookContext<'_>,
    ) -> Result<(), Error> {
        self.index(node, record, ctx.annotation)?;
        self.try_link(node, record, ctx)
    }

    fn finalize(&mut self, ctx: &mut HookContext<'_>) -> Result<(), Error> {
        Linker::finalize(self, ctx);
        Ok(())
    }
}

/// Set the child's back-reference and add it to the parent's children.
///
/// The only place parent/child links are written. A child is linked at most
/// once.
pub(crate) fn attach(annotation: &mut Annotation, child: Node, parent: Node) -> Result<(), Error> {
    trace!(
        "attach {} -> {}",
        annotation.describe(&child),
        annotation.describe(&parent)
    );
    match (child, parent) {
        (Node::Gene(g), Node::Reference(r)) => {
            if annotation.genes[g.0].reference.is_some() {
                return Err(Error::AlreadyLinked(annotation.describe(&child)));
            }
            annotation.genes[g.0].reference = Some(r);
            let genes = &mut annotation.references[r.0].genes;
            if !genes.contains(&g) {
                genes.push(g);
            }
        }
        (Node::Transcript(t), Node::Gene(g)) => {
            if annotation.transcripts[t.0].gene.is_some() {
                return Err(Error::AlreadyLinked(annotation.describe(&child)));
            }
            let transcript = &mut annotation.transcripts[t.0];
            transcript.gene = Some(g);
            transcript.invalidate_introns();
            let transcripts = &mut annotation.genes[g.0].transcripts;
            if !transcripts.contains(&t) {
                transcripts.push(t);
            }
        }
        (Node::Exon(e), Node::Transcript(t)) => {
            if annotation.exons[e.0].transcript.is_some() {
                return Err(Error::AlreadyLinked(annotation.describe(&child)));
            }
            annotation.exons[e.0].transcript = Some(t);
            let transcript = &mut annotation.transcripts[t.0];
            if !transcript.exons.contains(&e) {
                transcript.exons.push(e);
            }
            transcript.invalidate_introns();
        }
        _ => {
            return Err(Error::DecoderContract(format!(
                "cannot attach {} to {}",
                child.kind(),
                parent.kind()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exon, Feature, Gene, Reference, Transcript};
    use crate::strand::Strand;

    struct Session {
        annotation: Annotation,
        warnings: Vec<BuildWarning>,
    }

    impl Session {
        fn new() -> Self {
            Self {
                annotation: Annotation::new(),
                warnings: Vec::new(),
            }
        }

        fn feed(&mut self, linker: &mut Linker, feature: Feature, record: &Record) -> Node {
            let node = self.annotation.insert(feature);
            let mut ctx = HookContext {
                annotation: &mut self.annotation,
                warnings: &mut self.warnings,
            };
            linker.post_transform(&node, record, &mut ctx).unwrap();
            node
        }

        fn finalize(&mut self, linker: &mut Linker) {
            let mut ctx = HookContext {
                annotation: &mut self.annotation,
                warnings: &mut self.warnings,
            };
            Hook::finalize(linker, &mut ctx).unwrap();
        }
    }

    fn transcript_record(id: &str) -> Record {
        Record::new("mRNA", "chr1", 1, 100, Strand::Forward).with_id(id)
    }

    fn exon_record(parent: &str) -> Record {
        Record::new("exon", "chr1", 10, 20, Strand::Forward).with_parent(parent)
    }

    #[test]
    fn parent_first_links_immediately() {
        let mut s = Session::new();
        let mut linker = Linker::new(Link::TranscriptExon);
        let Node::Transcript(t) = s.feed(
            &mut linker,
            Feature::Transcript(Transcript::new(Some("t1".into()))),
            &transcript_record("t1"),
        ) else {
            unreachable!()
        };
        let Node::Exon(e) = s.feed(
            &mut linker,
            Feature::Exon(Exon::new(None, 10, 20)),
            &exon_record("t1"),
        ) else {
            unreachable!()
        };
        assert_eq!(s.annotation.exon(e).transcript(), Some(t));
        assert_eq!(s.annotation.transcript(t).exon_ids(), &[e]);
        assert_eq!(linker.orphan_count(), 0);
    }

    #[test]
    fn child_first_waits_for_parent() {
        let mut s = Session::new();
        let mut linker = Linker::new(Link::TranscriptExon);
        let Node::Exon(e) = s.feed(
            &mut linker,
            Feature::Exon(Exon::new(None, 10, 20)),
            &exon_record("t1"),
        ) else {
            unreachable!()
        };
        assert_eq!(linker.orphan_count(), 1);
        assert_eq!(s.annotation.exon(e).transcript(), None);

        let Node::Transcript(t) = s.feed(
            &mut linker,
            Feature::Transcript(Transcript::new(Some("t1".into()))),
            &transcript_record("t1"),
        ) else {
            unreachable!()
        };
        assert_eq!(linker.orphan_count(), 0);
        assert_eq!(s.annotation.exon(e).transcript(), Some(t));

        s.finalize(&mut linker);
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn unresolved_orphan_is_reported() {
        let mut s = Session::new();
        let mut linker = Linker::new(Link::TranscriptExon);
        s.feed(
            &mut linker,
            Feature::Exon(Exon::new(None, 10, 20)),
            &exon_record("missing"),
        );
        s.finalize(&mut linker);
        assert_eq!(
            s.warnings,
            vec![BuildWarning::Orphan {
                child: "exon 10-20".to_string(),
                parent_id: "missing".to_string(),
            }]
        );
        assert_eq!(linker.orphan_count(), 0);
    }

    #[test]
    fn ignores_foreign_kinds() {
        let mut s = Session::new();
        let mut linker = Linker::new(Link::TranscriptExon);
        let record = Record::new("gene", "chr1", 1, 100, Strand::Forward)
            .with_id("g1")
            .with_parent("nothing");
        s.feed(
            &mut linker,
            Feature::Gene(Gene::new("g1".into(), Strand::Forward)),
            &record,
        );
        assert_eq!(linker.orphan_count(), 0);
        s.finalize(&mut linker);
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn gene_falls_back_to_seq_id() {
        let mut s = Session::new();
        let mut linker =
            Linker::new(Link::ReferenceGene).with_parent_id(record::declared_parent_or_seq_id);
        let reference = Record::new("chromosome", "chr1", 1, 1000, Strand::Forward).with_id("chr1");
        let Node::Reference(r) = s.feed(
            &mut linker,
            Feature::Reference(Reference::new("chr1".into(), 1000)),
            &reference,
        ) else {
            unreachable!()
        };
        let gene = Record::new("gene", "chr1", 1, 100, Strand::Forward).with_id("g1");
        let Node::Gene(g) = s.feed(
            &mut linker,
            Feature::Gene(Gene::new("g1".into(), Strand::Forward)),
            &gene,
        ) else {
            unreachable!()
        };
        assert_eq!(s.annotation.gene(g).reference(), Some(r));
        assert_eq!(s.annotation.reference(r).genes(), &[g]);
    }

    #[test]
    fn duplicate_parent_id_is_an_error() {
        let mut s = Session::new();
        let mut linker = Linker::new(Link::TranscriptExon);
        s.feed(
            &mut linker,
            Feature::Transcript(Transcript::new(Some("t1".into()))),
            &transcript_record("t1"),
        );
        let node = s
            .annotation
            .insert(Feature::Transcript(Transcript::new(Some("t1".into()))));
        let mut ctx = HookContext {
            annotation: &mut s.annotation,
            warnings: &mut s.warnings,
        };
        assert_eq!(
            linker.post_transform(&node, &transcript_record("t1"), &mut ctx),
            Err(Error::DuplicateId("t1".to_string()))
        );
    }

    #[test]
    fn missing_parent_id_warns() {
        let mut s = Session::new();
        let mut linker = Linker::new(Link::TranscriptExon);
        s.feed(
            &mut linker,
            Feature::Exon(Exon::new(Some("e1".into()), 10, 20)),
            &Record::new("exon", "chr1", 10, 20, Strand::Forward).with_id("e1"),
        );
        assert_eq!(
            s.warnings,
            vec![BuildWarning::Unparented {
                child: "exon 'e1'".to_string()
            }]
        );
    }

    #[test]
    fn attach_twice_fails() {
        let mut annotation = Annotation::new();
        let t1 = annotation.insert(Feature::Transcript(Transcript::new(Some("t1".into()))));
        let t2 = annotation.insert(Feature::Transcript(Transcript::new(Some("t2".into()))));
        let e = annotation.insert(Feature::Exon(Exon::new(None, 1, 5)));
        attach(&mut annotation, e, t1).unwrap();
        assert!(matches!(
            attach(&mut annotation, e, t2),
            Err(Error::AlreadyLinked(_))
        ));
        assert!(matches!(
            attach(&mut annotation, t1, e),
            Err(Error::DecoderContract(_))
        ));
    }
}
