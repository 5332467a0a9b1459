// Processing stages: field normalization, classification, record building, consolidation

pub mod classify;
pub mod consolidate;
pub mod normalize;
pub mod record;

pub use classify::{classify, Classification, Classifier};
pub use consolidate::{consolidate, Consolidation, MergeMode};
pub use record::RecordBuilder;
