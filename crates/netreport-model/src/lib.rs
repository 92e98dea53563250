pub mod coordinate;
pub mod record;
pub mod variant;

pub use coordinate::Coordinate;
pub use record::{
    FlowRecord, ParameterRecord, RunAttributes, ScalarRecord, TopologyShape, TrafficCell,
};
pub use variant::{MarkerMatch, ShapeMarker, TopologyVariant, VariantConfig};
