//! Bubble mark detection
//!
//! A bubble group is a horizontal rectangle split into equal-width strips,
//! one per answer. The strip that carries significantly more ink than the
//! average is the marked answer.

/// Strip histogram and standout decision
pub mod sections;

pub use sections::{SectionReading, analyze_sections, strip_boundaries};
