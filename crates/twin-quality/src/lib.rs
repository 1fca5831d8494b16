//! Twin Quality: compliance scoring
//!
//! Combines rule-engine and schema-checker findings into one
//! [`ValidationResult`](twin_core::ValidationResult) under a
//! [`ScoringProfile`], and aggregates finished reports into
//! [`BatchStatistics`].
//!
//! # Example
//!
//! ```
//! use twin_core::{FindingKind, ValidationFinding};
//! use twin_quality::{ComplianceScorer, ScoringProfile};
//!
//! let scorer = ComplianceScorer::new(ScoringProfile::standard());
//! let missing = ValidationFinding::error(FindingKind::MissingRequired, "Name", "missing Name");
//!
//! let result = scorer.score(&[missing], &[]);
//! assert_eq!(result.score, 90.0);
//! assert!(!result.is_compliant);
//! ```

pub mod metrics;
pub mod profile;
pub mod scorer;

pub use metrics::{BatchStatistics, QualityTier, TypeTally};
pub use profile::ScoringProfile;
pub use scorer::ComplianceScorer;
