use crate::aggregate::TrafficAggregator;
use crate::error::{EngineError, Result};
use crate::extract::extract_coordinate;
use netreport_model::{FlowRecord, ParameterRecord, TopologyShape, VariantConfig};
use tracing::debug;

// Unit suffixes are fixed-width in the result files: sizes end in "MiB",
// times in "s". The stripped remainder must be a plain integer.
const SIZE_SUFFIX_LEN: usize = 3;
const TIME_SUFFIX_LEN: usize = 1;

/// Lifecycle phase of the connection currently being reassembled from the
/// parameter stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Idle,
    SizeSet,
    Open,
    Sending,
    Closed,
}

/// Reconstructs flows from the ordered `runParam` stream.
///
/// Each record's key is tested against five marker tokens in a fixed order
/// (first match wins); keys matching none of them are checked against the
/// variant's topology-shape markers. Related records of one connection are
/// assumed to be adjacent in the stream, with `connectAddress` last — the
/// parser trusts that ordering and performs no cross-validation, so a
/// violated ordering silently emits a flow carrying values from an earlier
/// connection. The phase enum tracks the expected lifecycle and debug-logs
/// departures from it, but never withholds or corrects a record.
pub struct FlowParser<'a> {
    config: &'a VariantConfig,
    phase: ConnectionPhase,
    pending_size: u64,
    duration: u64,
    /// Raw samples for the three metric distributions, in stream order.
    pub sizes: Vec<f64>,
    pub durations: Vec<f64>,
    pub rates: Vec<f64>,
    pub shape: TopologyShape,
}

impl<'a> FlowParser<'a> {
    pub fn new(config: &'a VariantConfig) -> Self {
        Self {
            config,
            phase: ConnectionPhase::Idle,
            pending_size: 0,
            duration: 0,
            sizes: Vec::new(),
            durations: Vec::new(),
            rates: Vec::new(),
            shape: TopologyShape::default(),
        }
    }

    /// Consume one parameter record, forwarding any completed flow to the
    /// aggregator.
    pub fn feed(
        &mut self,
        record: &ParameterRecord,
        aggregator: &mut TrafficAggregator,
    ) -> Result<()> {
        if record.key.contains("sendBytes") {
            let size = strip_suffix_int(&record.key, &record.value, SIZE_SUFFIX_LEN)?;
            self.pending_size = size;
            self.sizes.push(size as f64);
            self.transition(ConnectionPhase::SizeSet);
        } else if record.key.contains("tOpen") {
            let open = strip_suffix_int(&record.key, &record.value, TIME_SUFFIX_LEN)?;
            self.duration = self.config.open_baseline_secs + open;
            self.transition(ConnectionPhase::Open);
        } else if record.key.contains("tSend") {
            self.duration += strip_suffix_int(&record.key, &record.value, TIME_SUFFIX_LEN)?;
            self.transition(ConnectionPhase::Sending);
        } else if record.key.contains("tClose") {
            self.duration += strip_suffix_int(&record.key, &record.value, TIME_SUFFIX_LEN)?;
            // A zero-length connection would put an infinite rate into the
            // distribution; abort instead.
            if self.duration == 0 {
                return Err(EngineError::ZeroDuration {
                    key: record.key.clone(),
                });
            }
            self.durations.push(self.duration as f64);
            self.rates.push(self.pending_size as f64 / self.duration as f64);
            self.transition(ConnectionPhase::Closed);
        } else if record.key.contains("connectAddress") {
            let arity = self.config.coordinate_arity;
            let source = extract_coordinate(&record.key, arity)?;
            let destination = extract_coordinate(&record.value, arity)?;
            let flow = FlowRecord {
                source,
                destination,
                size_bytes: self.pending_size,
                duration_secs: self.duration,
                rate_bytes_per_sec: self.pending_size as f64 / self.duration as f64,
            };
            aggregator.record(&flow);
            self.transition(ConnectionPhase::Idle);
        } else {
            self.capture_shape(record)?;
        }
        Ok(())
    }

    fn capture_shape(&mut self, record: &ParameterRecord) -> Result<()> {
        for marker in self.config.shape_markers {
            if marker.matches(&record.key) {
                let value =
                    record
                        .value
                        .parse::<i64>()
                        .map_err(|_| EngineError::MalformedValue {
                            key: record.key.clone(),
                            value: record.value.clone(),
                        })?;
                if marker.accumulate {
                    self.shape.add(marker.label, value);
                } else {
                    self.shape.set(marker.label, value);
                }
                return Ok(());
            }
        }
        Ok(())
    }

    fn transition(&mut self, next: ConnectionPhase) {
        use ConnectionPhase::*;
        let expected = matches!(
            (self.phase, next),
            (Idle, SizeSet)
                | (SizeSet, Open)
                | (Open, Sending)
                | (Sending, Sending)
                | (Open, Closed)
                | (Sending, Closed)
                | (Closed, Idle)
        );
        if !expected {
            debug!(from = ?self.phase, to = ?next, "parameter stream departs from expected lifecycle order");
        }
        self.phase = next;
    }
}

fn strip_suffix_int(key: &str, value: &str, suffix_len: usize) -> Result<u64> {
    let malformed = || EngineError::MalformedValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    let cut = value.len().checked_sub(suffix_len).ok_or_else(malformed)?;
    let digits = value.get(..cut).ok_or_else(malformed)?;
    digits.parse::<u64>().map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netreport_model::Coordinate;

    fn param(key: &str, value: &str) -> ParameterRecord {
        ParameterRecord {
            run_id: 1,
            key: key.to_string(),
            value: value.to_string(),
            order: 0,
        }
    }

    #[test]
    fn unit_suffixes_strip_to_integers() {
        assert_eq!(strip_suffix_int("k", "100MiB", SIZE_SUFFIX_LEN).unwrap(), 100);
        assert_eq!(strip_suffix_int("k", "7s", TIME_SUFFIX_LEN).unwrap(), 7);
    }

    #[test]
    fn non_numeric_remainder_is_malformed() {
        let err = strip_suffix_int("app.sendBytes", "lotsMiB", SIZE_SUFFIX_LEN).unwrap_err();
        assert!(matches!(err, EngineError::MalformedValue { .. }));
        // Value shorter than its suffix cannot hold a number at all.
        let err = strip_suffix_int("app.sendBytes", "iB", SIZE_SUFFIX_LEN).unwrap_err();
        assert!(matches!(err, EngineError::MalformedValue { .. }));
    }

    #[test]
    fn duration_accumulates_with_open_baseline() {
        let config = VariantConfig::owcell();
        let mut parser = FlowParser::new(&config);
        let mut agg = TrafficAggregator::new(config.coordinate_arity);
        for (key, value) in [
            ("cell[0].rack[0].host[0].app[0].tOpen", "5s"),
            ("cell[0].rack[0].host[0].app[0].tSend", "3s"),
            ("cell[0].rack[0].host[0].app[0].tSend", "2s"),
            ("cell[0].rack[0].host[0].app[0].tClose", "1s"),
        ] {
            parser.feed(&param(key, value), &mut agg).unwrap();
        }
        assert_eq!(parser.durations, vec![12.0]);
    }

    #[test]
    fn duration_accumulates_without_baseline() {
        let config = VariantConfig::spineleaf();
        let mut parser = FlowParser::new(&config);
        let mut agg = TrafficAggregator::new(config.coordinate_arity);
        for (key, value) in [
            ("leaf[0].host[0].app[0].tOpen", "5s"),
            ("leaf[0].host[0].app[0].tSend", "3s"),
            ("leaf[0].host[0].app[0].tSend", "2s"),
            ("leaf[0].host[0].app[0].tClose", "1s"),
        ] {
            parser.feed(&param(key, value), &mut agg).unwrap();
        }
        assert_eq!(parser.durations, vec![11.0]);
    }

    #[test]
    fn full_connection_emits_one_flow() {
        let config = VariantConfig::spineleaf();
        let mut parser = FlowParser::new(&config);
        let mut agg = TrafficAggregator::new(config.coordinate_arity);
        for (key, value) in [
            ("Net.leaf[1].host[2].app[0].sendBytes", "100MiB"),
            ("Net.leaf[1].host[2].app[0].tOpen", "2s"),
            ("Net.leaf[1].host[2].app[0].tClose", "3s"),
            ("Net.leaf[1].host[2].app[0].connectAddress", "Net.leaf[3].host[4]"),
        ] {
            parser.feed(&param(key, value), &mut agg).unwrap();
        }

        assert_eq!(agg.flow_count(), 1);
        let cell = agg.matrix()[&(
            Coordinate::new(vec![1, 2]),
            Coordinate::new(vec![3, 4]),
        )];
        assert_eq!(cell.total_bytes, 100);
        assert_eq!(cell.total_secs, 5);
        assert_eq!(parser.sizes, vec![100.0]);
        assert_eq!(parser.durations, vec![5.0]);
        assert_eq!(parser.rates, vec![20.0]);
        // First components differ, so the flow is extra-traffic at level 1.
        assert_eq!(agg.locality().extra(1), 100);
        assert_eq!(agg.locality().intra(1), 0);
    }

    #[test]
    fn size_sample_recorded_even_without_completion() {
        let config = VariantConfig::spineleaf();
        let mut parser = FlowParser::new(&config);
        let mut agg = TrafficAggregator::new(config.coordinate_arity);
        parser
            .feed(&param("leaf[0].host[0].app[1].sendBytes", "42MiB"), &mut agg)
            .unwrap();
        assert_eq!(parser.sizes, vec![42.0]);
        assert_eq!(agg.flow_count(), 0);
    }

    #[test]
    fn shape_markers_update_without_touching_flow_state() {
        let config = VariantConfig::owcell();
        let mut parser = FlowParser::new(&config);
        let mut agg = TrafficAggregator::new(config.coordinate_arity);
        for (key, value) in [
            ("**.rows", "3"),
            ("**.columns", "3"),
            ("**.racks", "8"),
            ("**.hosts", "4"),
        ] {
            parser.feed(&param(key, value), &mut agg).unwrap();
        }
        assert_eq!(parser.shape.get("rows"), Some(3));
        assert_eq!(parser.shape.get("hosts_per_rack"), Some(4));
        assert_eq!(agg.flow_count(), 0);
        assert!(parser.sizes.is_empty());
    }

    #[test]
    fn spineleaf_num_apps_sums_across_hosts() {
        let config = VariantConfig::spineleaf();
        let mut parser = FlowParser::new(&config);
        let mut agg = TrafficAggregator::new(config.coordinate_arity);
        for (key, value) in [
            ("SpineLeaf.leafs", "4"),
            ("SpineLeaf.host[0].numApps", "2"),
            ("SpineLeaf.host[1].numApps", "3"),
        ] {
            parser.feed(&param(key, value), &mut agg).unwrap();
        }
        assert_eq!(parser.shape.get("leafs"), Some(4));
        assert_eq!(parser.shape.get("total_apps"), Some(5));
    }

    #[test]
    fn malformed_size_aborts() {
        let config = VariantConfig::owcell();
        let mut parser = FlowParser::new(&config);
        let mut agg = TrafficAggregator::new(config.coordinate_arity);
        let err = parser
            .feed(&param("app[0].sendBytes", "NaNMiB"), &mut agg)
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedValue { .. }));
    }

    #[test]
    fn zero_duration_close_aborts_instead_of_infinite_rate() {
        let config = VariantConfig::spineleaf();
        let mut parser = FlowParser::new(&config);
        let mut agg = TrafficAggregator::new(config.coordinate_arity);
        parser
            .feed(&param("leaf[0].host[0].app[0].sendBytes", "10MiB"), &mut agg)
            .unwrap();
        parser
            .feed(&param("leaf[0].host[0].app[0].tOpen", "0s"), &mut agg)
            .unwrap();
        let err = parser
            .feed(&param("leaf[0].host[0].app[0].tClose", "0s"), &mut agg)
            .unwrap_err();
        assert!(matches!(err, EngineError::ZeroDuration { .. }));
        assert!(parser.rates.is_empty());
    }

    #[test]
    fn adjacency_violation_carries_stale_values() {
        // Documented fragility: a connectAddress arriving before its own
        // size/duration records reuses whatever the previous connection left
        // behind. The parser reproduces that behavior rather than guessing.
        let config = VariantConfig::spineleaf();
        let mut parser = FlowParser::new(&config);
        let mut agg = TrafficAggregator::new(config.coordinate_arity);
        for (key, value) in [
            ("Net.leaf[0].host[0].app[0].sendBytes", "10MiB"),
            ("Net.leaf[0].host[0].app[0].tOpen", "1s"),
            ("Net.leaf[0].host[0].app[0].tClose", "1s"),
            ("Net.leaf[0].host[0].app[0].connectAddress", "Net.leaf[1].host[1]"),
            // Second connection misordered: address first.
            ("Net.leaf[5].host[5].app[0].connectAddress", "Net.leaf[6].host[6]"),
        ] {
            parser.feed(&param(key, value), &mut agg).unwrap();
        }
        let stale = agg.matrix()[&(
            Coordinate::new(vec![5, 5]),
            Coordinate::new(vec![6, 6]),
        )];
        assert_eq!(stale.total_bytes, 10);
        assert_eq!(stale.total_secs, 2);
    }
}
