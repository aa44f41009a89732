//! Coalesces coding fragments into one coding region per transcript.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{trace, warn};

use crate::error::Error;
use crate::model::{Annotation, CodingRegion, CodingRegionId, Fragment, Node, TranscriptId};
use crate::record::{self, Record};

use super::linker::ParentIdFn;
use super::{BuildWarning, Hook, HookContext};

/// Merges coding fragments sharing a parent transcript ID.
///
/// Fragments and transcripts may arrive in any relative order: fragments seen
/// before their transcript accumulate a running span that is materialized
/// when the transcript appears.
pub struct CodingAggregator {
    parent_id: ParentIdFn,
    /// Transcript ID → running span of fragments awaiting that transcript.
    pending: IndexMap<String, Fragment>,
    transcripts: HashMap<String, TranscriptId>,
}

impl Default for CodingAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodingAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent_id: record::declared_parent,
            pending: IndexMap::new(),
            transcripts: HashMap::new(),
        }
    }

    /// Number of transcript IDs with fragments still waiting.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Hook for CodingAggregator {
    fn post_transform(
        &mut self,
        node: &Node,
        record: &Record,
        ctx: &mut HookContext<'_>,
    ) -> Result<(), Error> {
        match node {
            Node::Transcript(transcript) => {
                let Some(id) = record.id.as_deref() else {
                    return Ok(());
                };
                self.transcripts.insert(id.to_string(), *transcript);
                if let Some(span) = self.pending.shift_remove(id) {
                    merge(ctx.annotation, *transcript, span);
                }
            }
            Node::CodingFragment(fragment) => match (self.parent_id)(record) {
                Some(parent_id) => match self.transcripts.get(parent_id) {
                    Some(&transcript) => {
                        merge(ctx.annotation, transcript, *fragment);
                    }
                    None => {
                        self.pending
                            .entry(parent_id.to_string())
                            .and_modify(|span| *span = widen(*span, *fragment))
                            .or_insert(*fragment);
                    }
                },
                None => {
                    let child = ctx.annotation.describe(node);
                    warn!("{child} declares no parent");
                    ctx.warnings.push(BuildWarning::Unparented { child });
                }
            },
            _ => {}
        }
        Ok(())
    }

    fn finalize(&mut self, ctx: &mut HookContext<'_>) -> Result<(), Error> {
        for (parent_id, span) in self.pending.drain(..) {
            warn!(
                "dropping coding span {}-{}: transcript '{parent_id}' never appeared",
                span.start, span.end
            );
            ctx.warnings.push(BuildWarning::OrphanedCodingSpan {
                parent_id,
                start: span.start,
                end: span.end,
            });
        }
        Ok(())
    }
}

fn widen(a: Fragment, b: Fragment) -> Fragment {
    Fragment {
        start: a.start.min(b.start),
        end: a.end.max(b.end),
    }
}

/// Create the transcript's coding region from `span`, or widen the existing one.
fn merge(annotation: &mut Annotation, transcript: TranscriptId, span: Fragment) -> CodingRegionId {
    match annotation.transcripts[transcript.0].coding_region {
        Some(id) => {
            let coding = &mut annotation.coding_regions[id.0];
            coding.start = coding.start.min(span.start);
            coding.end = coding.end.max(span.end);
            trace!("widened coding region to {}-{}", coding.start, coding.end);
            id
        }
        None => {
            let id = CodingRegionId(annotation.coding_regions.len());
            annotation.coding_regions.push(CodingRegion {
                start: span.start,
                end: span.end,
                transcript,
            });
            annotation.transcripts[transcript.0].coding_region = Some(id);
            id
        }
    }
}
