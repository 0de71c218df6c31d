//! Mapping table: resolution from signals, then manual overrides.

mod edit;
mod entry;
mod resolver;
mod table;

pub use edit::{OverrideAction, OverrideOutcome, apply_override};
pub use entry::{AI_CONFIDENCE, MANUAL_CONFIDENCE, MappingEntry, Origin};
pub use resolver::{ReplacementPolicy, Resolver, resolve};
pub use table::{MappingSummary, MappingTable};
