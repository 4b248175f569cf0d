//! costlens diagnostics.
//!
//! Severity classification, extraction-pattern heuristics, the
//! recommendation rule tables and the ranking pipeline. Everything here is
//! a pure function of its inputs; I/O lives in the ingest and report
//! crates.

#![warn(missing_docs)]

mod classifier;
mod engine;
mod format;
mod pattern;
mod profile;
mod ranking;

pub mod rules;

pub use classifier::classify;
pub use engine::{Analysis, DiagnosticEngine, DiagnosticReport};
pub use format::group_thousands;
pub use pattern::{analyze_pattern, PatternFacts, MAX_PATTERN_LENGTH};
pub use profile::DomainProfile;
pub use ranking::{rank, Ranking, RankingOptions, ReportSummary};
