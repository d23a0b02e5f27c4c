pub mod chart;
pub mod latex;
pub mod table;

pub use chart::{Chart, Marker, Series};
pub use table::ResultTable;

use crate::simulation::{ModelConfig, Scenario};
use anyhow::{Result, bail};
use std::path::Path;
use tracing::info;

const X_LABEL: &str = "Arrival rate (A)";

/// The four scenario tables over a common arrival-rate sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    rates: Vec<f64>,
    baseline: ResultTable,
    double_speed: ResultTable,
    double_bandwidth: ResultTable,
    double_servers: ResultTable,
}

impl Report {
    /// `tables` in [`Scenario::ALL`] order. Every table must have one row per rate.
    pub fn new(rates: Vec<f64>, tables: [ResultTable; 4]) -> Result<Self> {
        for (scenario, table) in Scenario::ALL.iter().zip(&tables) {
            if table.len() != rates.len() {
                bail!(
                    "{} has {} rows but the sweep has {} arrival rates",
                    scenario.file_name(),
                    table.len(),
                    rates.len()
                );
            }
        }
        let [baseline, double_speed, double_bandwidth, double_servers] = tables;
        Ok(Self {
            rates,
            baseline,
            double_speed,
            double_bandwidth,
            double_servers,
        })
    }

    /// Reads every scenario file from `dir`.
    pub fn load(dir: impl AsRef<Path>, config: &ModelConfig) -> Result<Self> {
        let dir = dir.as_ref();
        let mut tables: [ResultTable; 4] = Default::default();
        for (slot, scenario) in tables.iter_mut().zip(Scenario::ALL) {
            let path = dir.join(scenario.file_name());
            *slot = ResultTable::load(&path)?;
            info!("Loaded {} ({} rows)", path.display(), slot.len());
        }
        let rates = config.sweep().map(f64::from).collect();
        Self::new(rates, tables)
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn table(&self, scenario: Scenario) -> &ResultTable {
        match scenario {
            Scenario::Baseline => &self.baseline,
            Scenario::DoubleSpeed => &self.double_speed,
            Scenario::DoubleBandwidth => &self.double_bandwidth,
            Scenario::DoubleServers => &self.double_servers,
        }
    }

    /// Mean with its lower and upper bounds for one scenario.
    pub fn absolute(&self, scenario: Scenario) -> Chart {
        let table = self.table(scenario);
        Chart {
            id: format!("{}_absolute", scenario.name().replace('-', "_")),
            title: format!("Mean sojourn time by arrival rate ({})", scenario.label()),
            x_label: X_LABEL.to_string(),
            y_label: "Mean sojourn time".to_string(),
            x: self.rates.clone(),
            series: vec![
                Series::new("Lower bound", table.lowers()),
                Series::new("Mean sojourn time", table.means()).with_marker(Marker::Circle),
                Series::new("Upper bound", table.uppers()),
            ],
        }
    }

    /// Baseline mean minus each enhancement's mean.
    pub fn baseline_differences(&self) -> Chart {
        let base = self.baseline.means();
        let markers = [Marker::Circle, Marker::Square, Marker::Triangle];
        let series = Scenario::ENHANCED
            .iter()
            .zip(markers)
            .map(|(scenario, marker)| {
                Series::new(
                    format!("Baseline - {}", scenario.label()),
                    difference(&base, &self.table(*scenario).means()),
                )
                .with_marker(marker)
            })
            .collect();

        Chart {
            id: "baseline_differences".to_string(),
            title: "Improvement over the baseline configuration".to_string(),
            x_label: X_LABEL.to_string(),
            y_label: "Difference in mean sojourn time".to_string(),
            x: self.rates.clone(),
            series,
        }
    }

    /// Pairwise differences between the three enhancements.
    pub fn enhancement_differences(&self) -> Chart {
        let pairs = [
            (Scenario::DoubleSpeed, Scenario::DoubleBandwidth, Marker::Circle),
            (Scenario::DoubleBandwidth, Scenario::DoubleServers, Marker::Square),
            (Scenario::DoubleServers, Scenario::DoubleSpeed, Marker::Triangle),
        ];
        let series = pairs
            .iter()
            .map(|(a, b, marker)| {
                Series::new(
                    format!("{} - {}", a.label(), b.label()),
                    difference(&self.table(*a).means(), &self.table(*b).means()),
                )
                .with_marker(*marker)
            })
            .collect();

        Chart {
            id: "enhancement_differences".to_string(),
            title: "Comparison between the enhanced configurations".to_string(),
            x_label: X_LABEL.to_string(),
            y_label: "Difference in mean sojourn time".to_string(),
            x: self.rates.clone(),
            series,
        }
    }

    pub fn charts(&self) -> Vec<Chart> {
        vec![
            self.absolute(Scenario::Baseline),
            self.absolute(Scenario::DoubleServers),
            self.baseline_differences(),
            self.enhancement_differences(),
        ]
    }
}

/// Elementwise `a - b`.
pub fn difference(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Estimate;

    fn table(means: &[f64]) -> ResultTable {
        ResultTable::new(
            means
                .iter()
                .map(|m| Estimate::new(m - 0.1, *m, m + 0.1))
                .collect(),
        )
    }

    fn report() -> Report {
        Report::new(
            vec![10.0, 11.0],
            [
                table(&[1.0, 2.0]),
                table(&[0.5, 1.5]),
                table(&[0.75, 1.0]),
                table(&[0.25, 0.5]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn absolute_chart_has_bounds_and_mean() {
        let chart = report().absolute(Scenario::DoubleServers);
        assert_eq!(chart.id, "double_servers_absolute");
        assert_eq!(chart.series.len(), 3);
        assert_eq!(chart.series("Mean sojourn time").unwrap().values, vec![0.25, 0.5]);
        let upper = &chart.series("Upper bound").unwrap().values;
        assert!((upper[0] - 0.35).abs() < 1e-12 && (upper[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn baseline_minus_each_enhancement() {
        let chart = report().baseline_differences();
        let values: Vec<Vec<f64>> = chart.series.iter().map(|s| s.values.clone()).collect();
        assert_eq!(values, vec![vec![0.5, 0.5], vec![0.25, 1.0], vec![0.75, 1.5]]);
    }

    #[test]
    fn pairwise_enhancement_differences() {
        let chart = report().enhancement_differences();
        let values: Vec<Vec<f64>> = chart.series.iter().map(|s| s.values.clone()).collect();
        assert_eq!(values, vec![vec![-0.25, 0.5], vec![0.5, 0.5], vec![-0.25, -1.0]]);
        assert_eq!(chart.series[0].label, "Double speed (R) - Double bandwidth (S)");
    }

    #[test]
    fn four_charts_share_the_x_axis() {
        let charts = report().charts();
        assert_eq!(charts.len(), 4);
        assert!(charts.iter().all(|c| c.x == vec![10.0, 11.0]));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = Report::new(
            vec![10.0, 11.0],
            [table(&[1.0, 2.0]), table(&[1.0]), table(&[1.0, 2.0]), table(&[1.0, 2.0])],
        )
        .unwrap_err();
        assert!(err.to_string().contains("double_vitesse.txt"));
    }

    #[test]
    fn loads_all_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModelConfig::default().with_sweep(10, 11);
        for (scenario, means) in Scenario::ALL.iter().zip([[1.0, 2.0], [0.5, 1.5], [0.75, 1.0], [0.25, 0.5]]) {
            table(&means).save(dir.path().join(scenario.file_name())).unwrap();
        }
        assert_eq!(Report::load(dir.path(), &config).unwrap(), report());
    }

    #[test]
    fn missing_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Report::load(dir.path(), &ModelConfig::default()).is_err());
    }
}
