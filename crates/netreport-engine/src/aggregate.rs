use netreport_model::{Coordinate, FlowRecord, TrafficCell};
use std::collections::HashMap;

/// Pairwise traffic totals keyed by `(source, destination)` coordinates.
pub type TrafficMatrix = HashMap<(Coordinate, Coordinate), TrafficCell>;

/// Per-level intra/extra byte totals. Level k (1-based) classifies a flow by
/// equality of the first k coordinate components of source and destination;
/// levels are independent, so one flow contributes at every level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalityTotals {
    intra_bytes: Vec<u64>,
    extra_bytes: Vec<u64>,
}

impl LocalityTotals {
    pub fn new(arity: usize) -> Self {
        Self {
            intra_bytes: vec![0; arity],
            extra_bytes: vec![0; arity],
        }
    }

    pub fn levels(&self) -> usize {
        self.intra_bytes.len()
    }

    pub fn intra(&self, level: usize) -> u64 {
        self.intra_bytes[level - 1]
    }

    pub fn extra(&self, level: usize) -> u64 {
        self.extra_bytes[level - 1]
    }

    fn record(&mut self, flow: &FlowRecord) {
        for level in 1..=self.levels() {
            if flow.source.prefix_matches(&flow.destination, level) {
                self.intra_bytes[level - 1] += flow.size_bytes;
            } else {
                self.extra_bytes[level - 1] += flow.size_bytes;
            }
        }
    }
}

/// Owns all aggregation state for one analysis pass: the traffic matrix and
/// the locality totals. Accumulation is commutative and associative, so the
/// final state does not depend on the order in which complete connection
/// groups arrive.
#[derive(Debug)]
pub struct TrafficAggregator {
    matrix: TrafficMatrix,
    locality: LocalityTotals,
    flow_count: u64,
}

impl TrafficAggregator {
    pub fn new(arity: usize) -> Self {
        Self {
            matrix: TrafficMatrix::new(),
            locality: LocalityTotals::new(arity),
            flow_count: 0,
        }
    }

    pub fn record(&mut self, flow: &FlowRecord) {
        self.matrix
            .entry((flow.source.clone(), flow.destination.clone()))
            .or_default()
            .absorb(flow.size_bytes, flow.duration_secs);
        self.locality.record(flow);
        self.flow_count += 1;
    }

    pub fn matrix(&self) -> &TrafficMatrix {
        &self.matrix
    }

    pub fn locality(&self) -> &LocalityTotals {
        &self.locality
    }

    pub fn flow_count(&self) -> u64 {
        self.flow_count
    }
}
