//! Type-tag → feature constructor dispatch.

use std::collections::BTreeSet;
use std::iter;

use crate::config::BuilderConfig;
use crate::error::Error;
use crate::model::{Exon, Feature, FeatureKind, Fragment, Gene, Reference, Transcript};
use crate::record::Record;

/// Lazy, single-use sequence of features decoded from one record.
pub type Decoded = Box<dyn Iterator<Item = Feature>>;

/// A feature kind bound to the type tags it accepts.
#[derive(Debug, Clone)]
pub struct Decoder {
    kind: FeatureKind,
    tags: BTreeSet<String>,
}

impl Decoder {
    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    #[must_use]
    pub fn accepts(&self, feature_type: &str) -> bool {
        self.tags.contains(feature_type)
    }

    fn decode(&self, record: &Record) -> Result<Decoded, Error> {
        let decoded: Decoded = match self.kind {
            FeatureKind::Reference => {
                let id = required_id(record, self.kind)?;
                let size = record.end;
                Box::new(iter::once_with(move || {
                    Feature::Reference(Reference::new(id, size))
                }))
            }
            FeatureKind::Gene => {
                let id = required_id(record, self.kind)?;
                let strand = record.strand;
                Box::new(iter::once_with(move || Feature::Gene(Gene::new(id, strand))))
            }
            FeatureKind::Transcript => {
                let id = record.id.clone();
                Box::new(iter::once_with(move || {
                    Feature::Transcript(Transcript::new(id))
                }))
            }
            FeatureKind::Exon => {
                let (id, start, end) = (record.id.clone(), record.start, record.end);
                Box::new(iter::once_with(move || {
                    Feature::Exon(Exon::new(id, start, end))
                }))
            }
            FeatureKind::CodingFragment => {
                let fragment = Fragment {
                    start: record.start,
                    end: record.end,
                };
                Box::new(iter::once(Feature::CodingFragment(fragment)))
            }
        };
        Ok(decoded)
    }
}

fn required_id(record: &Record, kind: FeatureKind) -> Result<String, Error> {
    record.id.clone().ok_or_else(|| {
        Error::InvalidRecord(format!("{kind} record without an ID: {}", record.label()))
    })
}

/// Ordered set of decoders; the first decoder accepting a record's type wins.
#[derive(Debug, Clone, Default)]
pub struct DecoderRegistry {
    decoders: Vec<Decoder>,
}

impl DecoderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the five built-in kinds with the configured tags.
    pub fn from_config(config: &BuilderConfig) -> Result<Self, Error> {
        let mut registry = Self::new();
        registry.register(FeatureKind::Reference, config.reference_types.clone())?;
        registry.register(FeatureKind::Gene, config.gene_types.clone())?;
        registry.register(FeatureKind::Transcript, config.transcript_types.clone())?;
        registry.register(FeatureKind::Exon, config.exon_types.clone())?;
        registry.register(FeatureKind::CodingFragment, config.coding_types.clone())?;
        Ok(registry)
    }

    /// Bind `kind` to `tags`.
    ///
    /// Fails if the tag set is empty, the kind is already registered, or a tag
    /// is already claimed by another decoder.
    pub fn register(
        &mut self,
        kind: FeatureKind,
        tags: impl IntoIterator<Item = String>,
    ) -> Result<(), Error> {
        let tags: BTreeSet<String> = tags.into_iter().collect();
        if tags.is_empty() {
            return Err(Error::DecoderContract(format!(
                "{kind} decoder registered without type tags"
            )));
        }
        if self.decoders.iter().any(|d| d.kind == kind) {
            return Err(Error::DecoderContract(format!(
                "{kind} decoder registered twice"
            )));
        }
        for decoder in &self.decoders {
            if let Some(tag) = decoder.tags.intersection(&tags).next() {
                return Err(Error::DecoderContract(format!(
                    "type tag '{tag}' claimed by both {} and {kind} decoders",
                    decoder.kind
                )));
            }
        }
        self.decoders.push(Decoder { kind, tags });
        Ok(())
    }

    pub fn decoders(&self) -> &[Decoder] {
        &self.decoders
    }

    /// Decode a record with the first decoder that accepts its type tag.
    ///
    /// `Ok(None)` means no decoder recognizes the record.
    pub fn decode(&self, record: &Record) -> Result<Option<(FeatureKind, Decoded)>, Error> {
        match self
            .decoders
            .iter()
            .find(|d| d.accepts(&record.feature_type))
        {
            Some(decoder) => Ok(Some((decoder.kind, decoder.decode(record)?))),
            None => Ok(None),
        }
    }
}
