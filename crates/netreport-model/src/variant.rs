use crate::record::TopologyShape;
use serde::Serialize;
use std::collections::BTreeMap;

/// The two network topologies the result files come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyVariant {
    /// One-way cell fabric: coordinates are `(cell, rack)`.
    OwCell,
    /// Spine-leaf data center: coordinates are `(leaf, host)`.
    SpineLeaf,
}

/// How a shape marker is matched against a parameter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMatch {
    Substring,
    Suffix,
}

/// A topology-metadata marker: when a parameter key matches `token`, its
/// value updates the captured [`TopologyShape`] under `label`.
#[derive(Debug, Clone, Copy)]
pub struct ShapeMarker {
    pub token: &'static str,
    pub label: &'static str,
    pub matcher: MarkerMatch,
    /// Sum values across matching rows instead of keeping the last one
    /// (`numApps` is declared once per host module).
    pub accumulate: bool,
}

impl ShapeMarker {
    pub fn matches(&self, key: &str) -> bool {
        match self.matcher {
            MarkerMatch::Substring => key.contains(self.token),
            MarkerMatch::Suffix => key.ends_with(self.token),
        }
    }
}

const OWCELL_MARKERS: &[ShapeMarker] = &[
    ShapeMarker {
        token: "**.rows",
        label: "rows",
        matcher: MarkerMatch::Substring,
        accumulate: false,
    },
    ShapeMarker {
        token: "**.columns",
        label: "columns",
        matcher: MarkerMatch::Substring,
        accumulate: false,
    },
    ShapeMarker {
        token: "**.racks",
        label: "racks_per_cell",
        matcher: MarkerMatch::Substring,
        accumulate: false,
    },
    ShapeMarker {
        token: "**.hosts",
        label: "hosts_per_rack",
        matcher: MarkerMatch::Substring,
        accumulate: false,
    },
];

const SPINELEAF_MARKERS: &[ShapeMarker] = &[
    ShapeMarker {
        token: ".leafs",
        label: "leafs",
        matcher: MarkerMatch::Suffix,
        accumulate: false,
    },
    ShapeMarker {
        token: ".hosts",
        label: "hosts_per_leaf",
        matcher: MarkerMatch::Suffix,
        accumulate: false,
    },
    ShapeMarker {
        token: ".numApps",
        label: "total_apps",
        matcher: MarkerMatch::Suffix,
        accumulate: true,
    },
];

/// Per-variant knobs for one analysis pass. Both shipped variants use
/// two-level coordinates; everything else differs.
#[derive(Debug, Clone)]
pub struct VariantConfig {
    pub variant: TopologyVariant,
    pub coordinate_arity: usize,
    /// Added to the `tOpen` value when the duration accumulator is reset.
    pub open_baseline_secs: u64,
    pub size_bins: usize,
    pub duration_bins: usize,
    pub rate_bins: usize,
    /// Factors applied to the raw size/duration/rate samples before binning,
    /// so the CDF axes come out in the units the report plots against
    /// (bytes, microseconds, bits per second in the multi-tier report).
    pub size_scale: f64,
    pub duration_scale: f64,
    pub rate_scale: f64,
    /// CDF bin count for channel-utilization samples, when that variant's
    /// report includes one.
    pub utilization_bins: Option<usize>,
    /// Split utilization and packet counters by module role (spine vs leaf).
    pub split_roles: bool,
    pub shape_markers: &'static [ShapeMarker],
}

impl VariantConfig {
    pub fn owcell() -> Self {
        Self {
            variant: TopologyVariant::OwCell,
            coordinate_arity: 2,
            open_baseline_secs: 1,
            size_bins: 10,
            duration_bins: 10,
            rate_bins: 10,
            size_scale: 1.0,
            duration_scale: 1.0,
            rate_scale: 1.0,
            utilization_bins: None,
            split_roles: false,
            shape_markers: OWCELL_MARKERS,
        }
    }

    pub fn spineleaf() -> Self {
        Self {
            variant: TopologyVariant::SpineLeaf,
            coordinate_arity: 2,
            open_baseline_secs: 0,
            size_bins: 50,
            duration_bins: 10,
            rate_bins: 10,
            // MiB to bytes, seconds to microseconds, MiB/s to Mib/s.
            size_scale: 1_048_576.0,
            duration_scale: 1e6,
            rate_scale: 8.0,
            utilization_bins: Some(100),
            split_roles: true,
            shape_markers: SPINELEAF_MARKERS,
        }
    }

    /// Totals computable from the captured shape (cell count, total racks,
    /// total hosts). Only present when the contributing markers were all
    /// observed in the stream.
    pub fn derived_shape(&self, shape: &TopologyShape) -> BTreeMap<String, i64> {
        let mut derived = BTreeMap::new();
        if let TopologyVariant::OwCell = self.variant {
            if let (Some(rows), Some(columns)) = (shape.get("rows"), shape.get("columns")) {
                let cells = rows * columns;
                derived.insert("cells".to_string(), cells);
                if let Some(racks) = shape.get("racks_per_cell") {
                    let total_racks = cells * racks;
                    derived.insert("total_racks".to_string(), total_racks);
                    if let Some(hosts) = shape.get("hosts_per_rack") {
                        derived.insert("total_hosts".to_string(), total_racks * hosts);
                    }
                }
            }
        }
        derived
    }
}
