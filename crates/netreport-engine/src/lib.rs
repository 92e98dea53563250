pub mod aggregate;
pub mod error;
pub mod extract;
pub mod flow;
pub mod report;
pub mod scalars;
pub mod stats;
pub mod throughput;

pub use aggregate::{LocalityTotals, TrafficAggregator, TrafficMatrix};
pub use error::{EngineError, Result};
pub use extract::extract_coordinate;
pub use flow::FlowParser;
pub use report::{AnalysisReport, FlowReport};
pub use scalars::{ScalarReport, ScalarTally};
pub use stats::{Cdf, cdf, mean};
pub use throughput::{ThroughputEstimate, VectorTotals, estimate_throughput};
