use super::Estimate;
use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

/// Mean and sample standard deviation (n - 1 denominator).
pub fn summarize(samples: &[f64]) -> Result<SampleSummary> {
    if samples.len() < 2 {
        bail!(
            "need at least two observations for a standard deviation, got {}",
            samples.len()
        );
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Ok(SampleSummary {
        count: samples.len(),
        mean,
        std_dev: variance.sqrt(),
    })
}

/// Student-t quantile at `precision` with `count - 1` degrees of freedom, times sd / sqrt(n).
pub fn half_width(summary: &SampleSummary, precision: f64) -> Result<f64> {
    // Outside (0.5, 1) the quantile is either undefined or negative.
    if !(precision > 0.5 && precision < 1.0) {
        bail!("precision must lie in (0.5, 1), got {}", precision);
    }
    let freedom = (summary.count - 1) as f64;
    let t = StudentsT::new(0.0, 1.0, freedom)
        .map_err(|e| anyhow!("invalid t distribution with {} degrees of freedom: {:?}", freedom, e))?;
    let quantile = t.inverse_cdf(precision);
    Ok(quantile * summary.std_dev / (summary.count as f64).sqrt())
}

pub fn confidence_interval(samples: &[f64], precision: f64) -> Result<Estimate> {
    let summary = summarize(samples)?;
    let half_width = half_width(&summary, precision)?;
    Ok(Estimate::centered(summary.mean, half_width))
}

/// Componentwise mean of per-trial estimates. `None` when there is nothing to average.
pub fn aggregate(estimates: &[Estimate]) -> Option<Estimate> {
    if estimates.is_empty() {
        return None;
    }
    let n = estimates.len() as f64;
    Some(Estimate::new(
        estimates.iter().map(|e| e.lower).sum::<f64>() / n,
        estimates.iter().map(|e| e.mean).sum::<f64>() / n,
        estimates.iter().map(|e| e.upper).sum::<f64>() / n,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_sample_deviation() {
        let summary = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(summary.count, 8);
        assert_eq!(summary.mean, 5.0);
        assert!((summary.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn half_width_matches_t_table() {
        // t_{0.8, 9} = 0.8834
        let samples: Vec<f64> = (1..=10).map(f64::from).collect();
        let summary = summarize(&samples).unwrap();
        let hw = half_width(&summary, 0.8).unwrap();
        let expected = 0.883_4 * summary.std_dev / 10f64.sqrt();
        assert!((hw - expected).abs() < 1e-3, "{} vs {}", hw, expected);
    }

    #[test]
    fn interval_is_ordered_and_centered() {
        let estimate = confidence_interval(&[0.1, 0.2, 0.15, 0.3, 0.12], 0.8).unwrap();
        assert!(estimate.is_ordered());
        assert!((estimate.mean - 0.174).abs() < 1e-12);
        assert!(((estimate.mean - estimate.lower) - (estimate.upper - estimate.mean)).abs() < 1e-12);
    }

    #[test]
    fn constant_samples_have_zero_width() {
        let estimate = confidence_interval(&[1.5; 4], 0.8).unwrap();
        assert_eq!(estimate.to_array(), [1.5, 1.5, 1.5]);
    }

    #[test]
    fn precision_outside_the_open_interval_is_an_error() {
        let samples = [0.1, 0.2, 0.15, 0.3];
        for precision in [1.5, 1.0, 0.5, 0.2, -1.0, f64::NAN] {
            assert!(confidence_interval(&samples, precision).is_err(), "precision {}", precision);
        }
    }

    #[test]
    fn too_few_samples_is_an_error() {
        assert!(confidence_interval(&[], 0.8).is_err());
        assert!(confidence_interval(&[1.0], 0.8).is_err());
    }

    #[test]
    fn aggregate_averages_each_component() {
        let estimates = [Estimate::new(1.0, 2.0, 3.0), Estimate::new(3.0, 4.0, 7.0)];
        assert_eq!(aggregate(&estimates), Some(Estimate::new(2.0, 3.0, 5.0)));
        assert_eq!(aggregate(&[]), None);
    }
}
