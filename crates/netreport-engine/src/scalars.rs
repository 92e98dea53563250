use crate::error::Result;
use crate::stats::{Cdf, cdf, mean};
use netreport_model::{ScalarRecord, VariantConfig};
use serde::Serialize;

/// Byte-for-byte the drop counters the scalar relation reports, keyed by a
/// substring of `scalarName`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DropCounters {
    pub bad_checksum: f64,
    pub wrong_port: f64,
    pub address_resolution_failed: f64,
    pub forwarding_disabled: f64,
    pub hop_limit_reached: f64,
    pub incorrectly_received: f64,
    pub interface_down: f64,
    pub no_interface_found: f64,
    pub no_route_found: f64,
    pub not_addressed_to_us: f64,
    pub queue_overflow: f64,
    pub undefined: f64,
}

/// Tx/rx packet counts split by module role (multi-tier variant only).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RolePacketCounts {
    pub transferred_spine: f64,
    pub transferred_leaf: f64,
    pub received_spine: f64,
    pub received_leaf: f64,
}

/// Mean channel utilization split by module role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleUtilization {
    pub spine: f64,
    pub leaf: f64,
}

/// Running totals over one full scan of the `scalar` relation.
#[derive(Debug, Default)]
pub struct ScalarTally {
    utilization: Vec<f64>,
    spine_utilization: Vec<f64>,
    leaf_utilization: Vec<f64>,
    transfer_count: f64,
    receive_count: f64,
    role_packets: RolePacketCounts,
    drops: DropCounters,
}

impl ScalarTally {
    /// Classify one scalar row. Substrings of `scalarName` are tested in a
    /// fixed order, first match wins; unmatched rows are ignored.
    pub fn observe(&mut self, record: &ScalarRecord, split_roles: bool) {
        let name = record.name.as_str();
        let value = record.value;
        let spine = is_spine_module(&record.module);

        if name.contains("rx channel utilization") {
            self.utilization.push(value);
            if split_roles {
                if spine {
                    self.spine_utilization.push(value);
                } else {
                    self.leaf_utilization.push(value);
                }
            }
        } else if name.contains("txPk:count") {
            self.transfer_count += value;
            if split_roles {
                if spine {
                    self.role_packets.transferred_spine += value;
                } else {
                    self.role_packets.transferred_leaf += value;
                }
            }
        } else if name.contains("rxPkOk:count") {
            self.receive_count += value;
            if split_roles {
                if spine {
                    self.role_packets.received_spine += value;
                } else {
                    self.role_packets.received_leaf += value;
                }
            }
        } else if name.contains("droppedPkBadChecksum:count") {
            self.drops.bad_checksum += value;
        } else if name.contains("droppedPkWrongPort:count") {
            self.drops.wrong_port += value;
        } else if name.contains("packetDropAddressResolutionFailed:count") {
            self.drops.address_resolution_failed += value;
        } else if name.contains("packetDropForwardingDisabled:count") {
            self.drops.forwarding_disabled += value;
        } else if name.contains("packetDropHopLimitReached:count") {
            self.drops.hop_limit_reached += value;
        } else if name.contains("packetDropIncorrectlyReceived:count") {
            self.drops.incorrectly_received += value;
        } else if name.contains("packetDropInterfaceDown:count") {
            self.drops.interface_down += value;
        } else if name.contains("packetDropNoInterfaceFound:count") {
            self.drops.no_interface_found += value;
        } else if name.contains("packetDropNoRouteFound:count") {
            self.drops.no_route_found += value;
        } else if name.contains("packetDropNotAddressedToUs:count") {
            self.drops.not_addressed_to_us += value;
        } else if name.contains("packetDropQueueOverflow:count") {
            self.drops.queue_overflow += value;
        } else if name.contains("packetDropUndefined:count") {
            self.drops.undefined += value;
        }
    }

    /// Fold the tally into the report summary. Fails with an empty
    /// distribution error when a requested mean has no samples.
    pub fn summarize(self, config: &VariantConfig) -> Result<ScalarReport> {
        let average_utilization = mean("channel utilization", &self.utilization)?;
        let role_utilization = if config.split_roles {
            Some(RoleUtilization {
                spine: mean("spine channel utilization", &self.spine_utilization)?,
                leaf: mean("leaf channel utilization", &self.leaf_utilization)?,
            })
        } else {
            None
        };
        let utilization_cdf = match config.utilization_bins {
            Some(bins) => Some(cdf("channel utilization", &self.utilization, bins)?),
            None => None,
        };
        let (spine_utilization_cdf, leaf_utilization_cdf) =
            match (config.split_roles, config.utilization_bins) {
                (true, Some(bins)) => (
                    Some(cdf("spine channel utilization", &self.spine_utilization, bins)?),
                    Some(cdf("leaf channel utilization", &self.leaf_utilization, bins)?),
                ),
                _ => (None, None),
            };

        Ok(ScalarReport {
            average_utilization,
            role_utilization,
            packets_transferred: self.transfer_count,
            packets_received: self.receive_count,
            role_packets: config.split_roles.then_some(self.role_packets),
            drops: self.drops,
            utilization_cdf,
            spine_utilization_cdf,
            leaf_utilization_cdf,
        })
    }
}

fn is_spine_module(module: &str) -> bool {
    module.contains("spine[")
}

/// Scalar summary carried on the report boundary: utilization means, packet
/// totals and drop totals, plus the utilization CDFs where the variant asks
/// for them (overall plus one per role when the role split is on).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarReport {
    pub average_utilization: f64,
    pub role_utilization: Option<RoleUtilization>,
    pub packets_transferred: f64,
    pub packets_received: f64,
    pub role_packets: Option<RolePacketCounts>,
    pub drops: DropCounters,
    pub utilization_cdf: Option<Cdf>,
    pub spine_utilization_cdf: Option<Cdf>,
    pub leaf_utilization_cdf: Option<Cdf>,
}
