//! Mapping sessions and their on-disk form.
//!
//! A [`Session`] is the explicit context every operation works on: the
//! template, the source file, the last AI suggestions, and the current
//! mapping table. It is saved as a `*.colmap.json` [`SessionFile`] so the
//! CLI can edit and convert in separate invocations.

mod candidates;
mod persistence;
mod state;

pub use candidates::{Candidate, CandidateReport};
pub use persistence::{SessionFile, session_path};
pub use state::{Session, SourceFile, TargetFile};
