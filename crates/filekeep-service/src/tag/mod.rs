//! Tag normalization and the workspace tag taxonomy.

pub mod normalize;
pub mod taxonomy;

pub use normalize::{clean, contains_tag, dedup_tags, normalize, same_tag};
pub use taxonomy::{TagOperation, TagOperationReport, TagStat, TagTaxonomy, stats};
