//! Read-only access to OMNeT++ SQLite result stores and the analysis pass
//! that turns them into an [`netreport_engine::AnalysisReport`].

pub mod pass;
pub mod store;

pub use pass::{analyze, analyze_flows, analyze_scalars};
pub use store::ResultStore;
