pub mod config;
pub mod engine;
pub mod estimator;
pub mod scenario;

pub use config::ModelConfig;
pub use engine::{EventEngine, TrialRunner};
pub use estimator::{Estimator, PointEstimate, TrialOutcome};
pub use scenario::Scenario;

use crate::metrics::logger::{TrialLogger, TrialRow};
use crate::report::table::ResultTable;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::info;

/// Arrival-rate sweep of one scenario.
pub struct Experiment<R = EventEngine> {
    scenario: Scenario,
    estimator: Estimator<R>,
    show_progress: bool,
}

impl Experiment<EventEngine> {
    pub fn new(scenario: Scenario, config: ModelConfig) -> Result<Self> {
        Ok(Self::with_estimator(scenario, Estimator::new(config)?))
    }
}

impl<R: TrialRunner> Experiment<R> {
    pub fn with_estimator(scenario: Scenario, estimator: Estimator<R>) -> Self {
        Self {
            scenario,
            estimator,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// Estimates every sweep point in order. Any failure aborts the whole sweep.
    pub fn run(&self) -> Result<Vec<PointEstimate>> {
        let config = self.estimator.config();
        info!("Starting sweep: {}", self.scenario.label());
        info!(
            "Arrival rates: {}..={}, trials per point: {}",
            config.sweep_start, config.sweep_end, config.trials
        );

        let pb = if self.show_progress {
            let pb = ProgressBar::new(config.sweep_len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.orange/yellow} {pos}/{len} {msg}")?
                    .progress_chars("█▓░"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut points = Vec::with_capacity(config.sweep_len());
        for rate in config.sweep() {
            let params = self.scenario.params(f64::from(rate));
            let point = self.estimator.estimate_detailed(&params)?;
            pb.inc(1);
            pb.set_message(format!("A = {} | mean sojourn {:.4}", rate, point.estimate.mean));
            points.push(point);
        }
        pb.finish_with_message("Sweep complete");

        Ok(points)
    }

    /// Runs the sweep and writes the table once, after every point succeeded.
    pub fn run_and_save(&self, output_dir: impl AsRef<Path>) -> Result<(ResultTable, PathBuf)> {
        let points = self.run()?;
        self.save_table(&points, output_dir)
    }

    fn save_table(
        &self,
        points: &[PointEstimate],
        output_dir: impl AsRef<Path>,
    ) -> Result<(ResultTable, PathBuf)> {
        let table = ResultTable::from_points(points);

        std::fs::create_dir_all(output_dir.as_ref())?;
        let path = output_dir.as_ref().join(self.scenario.file_name());
        table.save(&path)?;
        info!("Results for {} saved to: {}", self.scenario, path.display());

        Ok((table, path))
    }

    pub fn trial_rows(&self, points: &[PointEstimate]) -> Vec<TrialRow> {
        points
            .iter()
            .flat_map(|point| {
                point.trials.iter().map(move |t| TrialRow {
                    scenario: self.scenario.name().to_string(),
                    arrival_rate: point.params.arrival_rate,
                    trial: t.trial,
                    observations: t.observations,
                    lower: t.estimate.map(|e| e.lower),
                    mean: t.estimate.map(|e| e.mean),
                    upper: t.estimate.map(|e| e.upper),
                })
            })
            .collect()
    }

    /// Sweep, table file, and a timestamped per-trial CSV under `log_dir`.
    pub fn run_with_trial_log(
        &self,
        output_dir: impl AsRef<Path>,
        log_dir: impl AsRef<Path>,
    ) -> Result<(ResultTable, PathBuf, PathBuf)> {
        let points = self.run()?;
        let (table, path) = self.save_table(&points, output_dir)?;

        std::fs::create_dir_all(log_dir.as_ref())?;
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let csv_path = log_dir
            .as_ref()
            .join(format!("{}_{}_trials.csv", self.scenario.name(), timestamp));
        let mut logger = TrialLogger::new(&csv_path)?;
        logger.log_batch(&self.trial_rows(&points))?;
        info!("Trial log saved to: {}", csv_path.display());

        Ok((table, path, csv_path))
    }
}
