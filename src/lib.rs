//! Annograph: rebuilds the reference → gene → transcript → exon hierarchy from
//! flat, loosely-ordered annotation records, with strand-aware coordinates.

pub mod error;

pub mod build;
pub mod config;
pub mod coords;
pub mod model;
pub mod position;
pub mod record;
pub mod region;
pub mod sequence;
pub mod strand;

pub use build::{Build, BuildOutput, BuildWarning, Builder};
pub use config::{BuilderConfig, ParentagePolicy};
pub use error::Error;
pub use model::Annotation;
pub use record::Record;
pub use strand::Strand;
