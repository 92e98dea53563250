use crate::store::ResultStore;
use netreport_engine::{
    AnalysisReport, EngineError, FlowParser, FlowReport, Result, ScalarReport, ScalarTally,
    TrafficAggregator, estimate_throughput,
};
use netreport_model::VariantConfig;
use tracing::{info, warn};

/// Reconstruct flows from the `runParam` stream and fold them into a flow
/// report.
pub fn analyze_flows(store: &ResultStore, config: &VariantConfig) -> Result<FlowReport> {
    let mut parser = FlowParser::new(config);
    let mut aggregator = TrafficAggregator::new(config.coordinate_arity);
    store.for_each_param(|record| parser.feed(&record, &mut aggregator))?;
    let report = FlowReport::build(&parser, &aggregator, config)?;
    info!(
        flows = report.flow_count,
        total_bytes = report.total_traffic_bytes,
        "reconstructed flows"
    );
    Ok(report)
}

/// Tally and summarize the `scalar` relation.
pub fn analyze_scalars(store: &ResultStore, config: &VariantConfig) -> Result<ScalarReport> {
    let mut tally = ScalarTally::default();
    store.for_each_scalar(|record| {
        tally.observe(&record, config.split_roles);
        Ok(())
    })?;
    tally.summarize(config)
}

/// Run the full analysis pass over a scalar store and, when one is supplied,
/// a companion vector store.
///
/// The throughput estimate is advisory: a vector store with no usable samples
/// degrades to `None` with a warning instead of failing the report, since the
/// estimate's formula is suspect anyway.
pub fn analyze(
    scalar_store: &ResultStore,
    vector_store: Option<&ResultStore>,
    config: &VariantConfig,
) -> Result<AnalysisReport> {
    let run = scalar_store.run_attributes()?;
    let flows = analyze_flows(scalar_store, config)?;
    let scalars = analyze_scalars(scalar_store, config)?;

    let throughput_estimate = match vector_store {
        Some(store) => match estimate_throughput(&store.vector_totals()?) {
            Ok(estimate) => Some(estimate),
            Err(EngineError::EmptyDistribution { metric }) => {
                warn!(metric, "vector store has no usable samples, skipping throughput estimate");
                None
            }
            Err(err) => return Err(err),
        },
        None => None,
    };

    Ok(AnalysisReport {
        variant: config.variant,
        run,
        flows,
        scalars,
        throughput_estimate,
    })
}
