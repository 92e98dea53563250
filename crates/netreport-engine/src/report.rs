use crate::aggregate::TrafficAggregator;
use crate::error::Result;
use crate::flow::FlowParser;
use crate::scalars::ScalarReport;
use crate::stats::{Cdf, cdf};
use crate::throughput::ThroughputEstimate;
use netreport_model::{Coordinate, RunAttributes, TopologyShape, TopologyVariant, VariantConfig};
use serde::Serialize;
use std::collections::BTreeMap;

/// One cell of the traffic matrix, flattened for serialization. Entries are
/// sorted by (source, destination) so the report is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficMatrixEntry {
    pub source: Coordinate,
    pub destination: Coordinate,
    pub total_bytes: u64,
    pub total_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalityLevel {
    pub level: usize,
    pub intra_bytes: u64,
    pub extra_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyReport {
    pub captured: TopologyShape,
    pub derived: BTreeMap<String, i64>,
}

/// Flow-side results of one pass: the traffic matrix, locality totals and
/// the three metric CDFs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowReport {
    pub flow_count: u64,
    pub total_traffic_bytes: u64,
    pub traffic_matrix: Vec<TrafficMatrixEntry>,
    pub locality: Vec<LocalityLevel>,
    pub size_cdf: Cdf,
    pub duration_cdf: Cdf,
    pub rate_cdf: Cdf,
    pub topology: TopologyReport,
}

impl FlowReport {
    pub fn build(
        parser: &FlowParser<'_>,
        aggregator: &TrafficAggregator,
        config: &VariantConfig,
    ) -> Result<Self> {
        let mut traffic_matrix: Vec<_> = aggregator
            .matrix()
            .iter()
            .map(|((source, destination), cell)| TrafficMatrixEntry {
                source: source.clone(),
                destination: destination.clone(),
                total_bytes: cell.total_bytes,
                total_secs: cell.total_secs,
            })
            .collect();
        traffic_matrix.sort_by(|a, b| {
            (&a.source, &a.destination).cmp(&(&b.source, &b.destination))
        });

        let locality = (1..=aggregator.locality().levels())
            .map(|level| LocalityLevel {
                level,
                intra_bytes: aggregator.locality().intra(level),
                extra_bytes: aggregator.locality().extra(level),
            })
            .collect();

        // CDF axes are scaled into the units the variant's report plots
        // against; cumulative fractions are unaffected by the rescale.
        let scaled = |samples: &[f64], factor: f64| -> Vec<f64> {
            samples.iter().map(|s| s * factor).collect()
        };

        Ok(Self {
            flow_count: aggregator.flow_count(),
            total_traffic_bytes: parser.sizes.iter().map(|s| *s as u64).sum(),
            traffic_matrix,
            locality,
            size_cdf: cdf(
                "flow size",
                &scaled(&parser.sizes, config.size_scale),
                config.size_bins,
            )?,
            duration_cdf: cdf(
                "flow duration",
                &scaled(&parser.durations, config.duration_scale),
                config.duration_bins,
            )?,
            rate_cdf: cdf(
                "flow rate",
                &scaled(&parser.rates, config.rate_scale),
                config.rate_bins,
            )?,
            topology: TopologyReport {
                captured: parser.shape.clone(),
                derived: config.derived_shape(&parser.shape),
            },
        })
    }
}

/// Boundary contract toward the external rendering/reporting layer. Purely
/// numeric and structured; nothing here knows about charts or tables.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub variant: TopologyVariant,
    pub run: RunAttributes,
    pub flows: FlowReport,
    pub scalars: ScalarReport,
    pub throughput_estimate: Option<ThroughputEstimate>,
}
