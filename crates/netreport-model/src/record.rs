use crate::coordinate::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the `runParam` relation, in the store's native order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub run_id: i64,
    pub key: String,
    pub value: String,
    pub order: i64,
}

/// One row of the `scalar` relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub scalar_id: i64,
    pub run_id: i64,
    pub module: String,
    pub name: String,
    pub value: f64,
}

/// Run metadata from the `runAttr` relation. Carried through to the report
/// for the external reporting layer; the engine itself never reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunAttributes {
    pub config_name: String,
    pub datetime: String,
    pub network: String,
    pub experiment: String,
}

/// One finalized logical connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRecord {
    pub source: Coordinate,
    pub destination: Coordinate,
    pub size_bytes: u64,
    pub duration_secs: u64,
    pub rate_bytes_per_sec: f64,
}

/// Accumulated traffic between one `(source, destination)` coordinate pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrafficCell {
    pub total_bytes: u64,
    pub total_secs: u64,
}

impl TrafficCell {
    pub fn absorb(&mut self, bytes: u64, secs: u64) {
        self.total_bytes += bytes;
        self.total_secs += secs;
    }
}

/// Topology dimensions captured from metadata markers during the pass
/// (rows/columns/racks/hosts, or leafs/hosts/numApps). Values are keyed by
/// the canonical label of the marker that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopologyShape {
    values: BTreeMap<String, i64>,
}

impl TopologyShape {
    pub fn set(&mut self, label: &str, value: i64) {
        self.values.insert(label.to_string(), value);
    }

    pub fn add(&mut self, label: &str, value: i64) {
        *self.values.entry(label.to_string()).or_insert(0) += value;
    }

    pub fn get(&self, label: &str) -> Option<i64> {
        self.values.get(label).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traffic_cell_sums_componentwise() {
        let mut cell = TrafficCell::default();
        cell.absorb(100, 5);
        cell.absorb(40, 2);
        assert_eq!(cell.total_bytes, 140);
        assert_eq!(cell.total_secs, 7);
    }

    #[test]
    fn shape_add_accumulates_and_set_overwrites() {
        let mut shape = TopologyShape::default();
        shape.set("hosts", 8);
        shape.set("hosts", 12);
        shape.add("apps", 3);
        shape.add("apps", 4);
        assert_eq!(shape.get("hosts"), Some(12));
        assert_eq!(shape.get("apps"), Some(7));
    }
}
