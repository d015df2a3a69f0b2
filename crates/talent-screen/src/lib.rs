//! Screening question engine and candidate application pipeline.
//!
//! Recruiters author an ordered set of screening questions per job posting; candidates submit a
//! CV, answer those questions and are routed by an external scoring collaborator.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
