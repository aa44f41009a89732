//! Error types for the annograph library.

use thiserror::Error;

use crate::strand::Strand;

/// Errors that can occur while building or querying an annotation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A record violated the structural input contract.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A record declared more than one parent and the policy rejects it.
    #[error("ambiguous parentage for '{id}': {} parents declared ({})", parents.len(), parents.join(", "))]
    AmbiguousParentage { id: String, parents: Vec<String> },

    /// Two parent-capable features share the same ID.
    #[error("duplicate feature ID: '{0}'")]
    DuplicateId(String),

    /// A child already carries a back-reference to a parent.
    #[error("{0} is already linked to a parent")]
    AlreadyLinked(String),

    /// A decoder registration broke the registry contract.
    #[error("decoder contract violated: {0}")]
    DecoderContract(String),

    /// A feature whose bounds derive from children has no children.
    #[error("{0} has no children to derive its bounds from")]
    EmptyFeature(String),

    /// A transcript (or one of its exons) has no gene to inherit a strand from.
    #[error("{0} has no strand: not linked to a gene")]
    Unstranded(String),

    /// A coordinate fell outside the range it was resolved against.
    #[error("position {position} out of range: {reason}")]
    OutOfRange { position: i64, reason: String },

    /// Position arithmetic combined positions on different strands.
    #[error("strand mismatch: {0} vs {1}")]
    StrandMismatch(Strand, Strand),

    /// The sequence collaborator could not supply the requested bases.
    #[error("missing sequence: {0}")]
    MissingSequence(String),
}

impl Error {
    pub(crate) fn out_of_range(position: impl TryInto<i64>, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            position: position.try_into().unwrap_or(i64::MAX),
            reason: reason.into(),
        }
    }
}
