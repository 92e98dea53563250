use crate::error::{EngineError, Result};
use serde::Serialize;

/// Cumulative distribution function over binned samples: `cumulative[i]` is
/// the fraction of samples falling at or below `bin_edges[i]` (the upper
/// edge of bin i). The last cumulative fraction is 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cdf {
    pub bin_edges: Vec<f64>,
    pub cumulative: Vec<f64>,
}

/// Bin the samples into `bins` equal-width bins over `[min, max]`, normalize
/// the counts into a probability mass function and accumulate it into a CDF.
/// When all samples are equal the range degenerates; it is widened by half a
/// unit on both sides so the single occupied bin is well-defined.
pub fn cdf(metric: &'static str, samples: &[f64], bins: usize) -> Result<Cdf> {
    if samples.is_empty() {
        return Err(EngineError::EmptyDistribution { metric });
    }
    debug_assert!(bins > 0);

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &s in samples {
        lo = lo.min(s);
        hi = hi.max(s);
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0u64; bins];
    for &s in samples {
        let idx = (((s - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let total = samples.len() as f64;
    let mut cumulative = Vec::with_capacity(bins);
    let mut running = 0.0;
    for count in counts {
        running += count as f64 / total;
        cumulative.push(running);
    }
    let bin_edges = (1..=bins).map(|i| lo + width * i as f64).collect();

    Ok(Cdf {
        bin_edges,
        cumulative,
    })
}

/// Arithmetic mean. Zero samples are a visible failure, never a silent 0.0.
pub fn mean(metric: &'static str, samples: &[f64]) -> Result<f64> {
    if samples.is_empty() {
        return Err(EngineError::EmptyDistribution { metric });
    }
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn cdf_ends_at_one() {
        let samples = [1.0, 2.0, 2.0, 3.0, 10.0, 50.0, 50.0];
        let cdf = cdf("size", &samples, 10).unwrap();
        assert_eq!(cdf.cumulative.len(), 10);
        assert_eq!(cdf.bin_edges.len(), 10);
        let last = *cdf.cumulative.last().unwrap();
        assert!((last - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn cumulative_fractions_are_monotonic() {
        let samples = [5.0, 1.0, 9.0, 4.0, 4.0];
        let cdf = cdf("duration", &samples, 4).unwrap();
        for pair in cdf.cumulative.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn identical_samples_fill_one_bin() {
        let cdf = cdf("rate", &[7.0, 7.0, 7.0], 10).unwrap();
        let occupied: Vec<_> = cdf
            .cumulative
            .windows(2)
            .filter(|pair| pair[1] > pair[0])
            .collect();
        assert!(occupied.len() <= 1);
        assert!((cdf.cumulative.last().unwrap() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn empty_samples_fail() {
        let err = cdf("size", &[], 10).unwrap_err();
        assert!(matches!(
            err,
            EngineError::EmptyDistribution { metric: "size" }
        ));
        let err = mean("utilization", &[]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::EmptyDistribution {
                metric: "utilization"
            }
        ));
    }

    #[test]
    fn mean_of_known_samples() {
        assert_eq!(mean("utilization", &[10.0, 20.0, 30.0]).unwrap(), 20.0);
    }
}
