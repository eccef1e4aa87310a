//! Analysis toolkit for hospital readmission studies: the composite VCI risk
//! score, data-quality auditing of encounter extracts, and the small file
//! utilities (reference mapping, notebook patching, code lookups) around them.

pub mod analytics;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod tooling;
