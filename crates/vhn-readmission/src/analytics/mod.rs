pub mod audit;
pub mod dataset;
pub mod readmission;
mod router;
pub mod vci;

pub use router::analytics_router;
