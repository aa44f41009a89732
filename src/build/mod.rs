//! Streaming construction of an [`Annotation`] from flat records.
//!
//! Each record is decoded into zero or more nodes, every node is passed to
//! each post-transform hook in registration order, and once the input is
//! exhausted every hook is finalized exactly once.

pub mod aggregator;
pub mod decoder;
pub mod linker;

use std::collections::{HashSet, VecDeque};
use std::fmt;

use log::{debug, trace};

use crate::config::{BuilderConfig, ParentagePolicy};
use crate::error::Error;
use crate::model::{Annotation, FeatureKind, Node};
use crate::record::{self, Record};

use aggregator::CodingAggregator;
use decoder::DecoderRegistry;
use linker::{Link, Linker};

/// A recoverable anomaly collected during a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// A child whose parent ID never appeared in the input.
    Orphan { child: String, parent_id: String },
    /// A child record that names no parent at all.
    Unparented { child: String },
    /// Coding fragments whose transcript never appeared; their span was dropped.
    OrphanedCodingSpan {
        parent_id: String,
        start: u64,
        end: u64,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orphan { child, parent_id } => {
                write!(f, "orphan {child}: parent '{parent_id}' not found")
            }
            Self::Unparented { child } => write!(f, "{child} declares no parent"),
            Self::OrphanedCodingSpan {
                parent_id,
                start,
                end,
            } => write!(
                f,
                "coding span {start}-{end} dropped: transcript '{parent_id}' not found"
            ),
        }
    }
}

/// Mutable build state handed to hooks.
pub struct HookContext<'a> {
    pub annotation: &'a mut Annotation,
    pub warnings: &'a mut Vec<BuildWarning>,
}

/// A post-processing step run on every produced node.
///
/// Hooks must ignore nodes they do not handle.
pub trait Hook {
    fn post_transform(
        &mut self,
        node: &Node,
        record: &Record,
        ctx: &mut HookContext<'_>,
    ) -> Result<(), Error>;

    /// Called once after the last record.
    fn finalize(&mut self, ctx: &mut HookContext<'_>) -> Result<(), Error>;
}

/// Result of a completed build: the best-effort tree plus its warnings.
#[derive(Debug)]
pub struct BuildOutput {
    pub annotation: Annotation,
    pub warnings: Vec<BuildWarning>,
}

/// Configured pipeline for one build session.
///
/// [`Builder::build`] consumes the builder, so index state never leaks
/// between sessions.
pub struct Builder {
    registry: DecoderRegistry,
    parentage: ParentagePolicy,
    hooks: Vec<Box<dyn Hook>>,
}

impl Builder {
    /// Builder with the configured decoders and the default hooks: the
    /// reference→gene, gene→transcript and transcript→exon linkers, then
    /// the coding aggregator.
    pub fn new(config: &BuilderConfig) -> Result<Self, Error> {
        let registry = DecoderRegistry::from_config(config)?;
        let builder = Self::with_registry(registry, config.parentage)
            .with_hook(
                Linker::new(Link::ReferenceGene)
                    .with_parent_id(record::declared_parent_or_seq_id),
            )
            .with_hook(Linker::new(Link::GeneTranscript))
            .with_hook(Linker::new(Link::TranscriptExon))
            .with_hook(CodingAggregator::new());
        Ok(builder)
    }

    /// Builder with no hooks registered.
    #[must_use]
    pub fn with_registry(registry: DecoderRegistry, parentage: ParentagePolicy) -> Self {
        Self {
            registry,
            parentage,
            hooks: Vec::new(),
        }
    }

    /// Append a hook; hooks run in the order they were added.
    #[must_use]
    pub fn with_hook(mut self, hook: impl Hook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Start a lazy build over `records`.
    pub fn build<I>(self, records: I) -> Build<I::IntoIter>
    where
        I: IntoIterator<Item = Record>,
    {
        Build {
            builder: self,
            records: records.into_iter(),
            annotation: Annotation::new(),
            warnings: Vec::new(),
            produced: VecDeque::new(),
            seen_ids: HashSet::new(),
            finalized: false,
        }
    }

    /// Consume all records and return the finished annotation.
    pub fn run<I>(self, records: I) -> Result<BuildOutput, Error>
    where
        I: IntoIterator<Item = Record>,
    {
        self.build(records).finish()
    }
}

/// A build in progress, yielding each produced node.
///
/// Dropping it before the input is exhausted discards the session without
/// running finalize hooks.
pub struct Build<I> {
    builder: Builder,
    records: I,
    annotation: Annotation,
    warnings: Vec<BuildWarning>,
    produced: VecDeque<Node>,
    seen_ids: HashSet<(FeatureKind, String)>,
    finalized: bool,
}

impl<I> Build<I>
where
    I: Iterator<Item = Record>,
{
    /// The annotation as built so far.
    #[must_use]
    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    #[must_use]
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    /// Drain the remaining input, finalize, and return the result.
    pub fn finish(mut self) -> Result<BuildOutput, Error> {
        for node in self.by_ref() {
            node?;
        }
        Ok(BuildOutput {
            annotation: self.annotation,
            warnings: self.warnings,
        })
    }

    fn process(&mut self, record: Record) -> Result<(), Error> {
        let Some((kind, decoded)) = self.builder.registry.decode(&record)? else {
            debug!("no decoder for {}", record.label());
            return Ok(());
        };
        record.validate()?;

        if record.parent_ids.len() > 1 {
            match self.builder.parentage {
                ParentagePolicy::Reject => {
                    return Err(Error::AmbiguousParentage {
                        id: record.label(),
                        parents: record.parent_ids.clone(),
                    });
                }
                ParentagePolicy::FirstDeclared => debug!(
                    "{} declares {} parents, using '{}'",
                    record.label(),
                    record.parent_ids.len(),
                    record.parent_ids[0]
                ),
            }
        }

        self.claim_id(kind, &record)?;

        trace!("decoding {} as {kind}", record.label());

        for feature in decoded {
            let node = self.annotation.insert(feature);
            let mut ctx = HookContext {
                annotation: &mut self.annotation,
                warnings: &mut self.warnings,
            };
            for hook in &mut self.builder.hooks {
                hook.post_transform(&node, &record, &mut ctx)?;
            }
            self.produced.push_back(node);
        }
        Ok(())
    }

    /// Reserve the record's ID for its kind before any node is created.
    ///
    /// Only kinds that act as parents need unique IDs.
    fn claim_id(&mut self, kind: FeatureKind, record: &Record) -> Result<(), Error> {
        let (FeatureKind::Reference | FeatureKind::Gene | FeatureKind::Transcript) = kind else {
            return Ok(());
        };
        let Some(id) = record.id.as_deref() else {
            return Ok(());
        };
        if !self.seen_ids.insert((kind, id.to_string())) {
            return Err(Error::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), Error> {
        let mut ctx = HookContext {
            annotation: &mut self.annotation,
            warnings: &mut self.warnings,
        };
        for hook in &mut self.builder.hooks {
            hook.finalize(&mut ctx)?;
        }
        debug!(
            "build finished: {} references, {} genes, {} transcripts, {} warnings",
            self.annotation.references.len(),
            self.annotation.genes.len(),
            self.annotation.transcripts.len(),
            self.warnings.len()
        );
        Ok(())
    }
}

impl<I> Iterator for Build<I>
where
    I: Iterator<Item = Record>,
{
    type Item = Result<Node, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.produced.pop_front() {
                return Some(Ok(node));
            }
            if self.finalized {
                return None;
            }
            match self.records.next() {
                Some(record) => {
                    if let Err(e) = self.process(record) {
                        return Some(Err(e));
                    }
                }
                None => {
                    self.finalized = true;
                    if let Err(e) = self.finalize() {
                        return Some(Err(e));
                    }
                }
            }
        }
    }
}
