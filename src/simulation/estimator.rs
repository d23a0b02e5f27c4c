use super::config::ModelConfig;
use super::engine::{EventEngine, TrialRunner};
use crate::metrics::{Estimate, analyzer, sojourn_times};
use crate::network::{NetworkParams, build_network};
use anyhow::{Result, bail};
use tracing::{debug, info, warn};

/// Result of one seeded trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub trial: u32,
    pub observations: usize,
    /// `None` when the trial had fewer than two qualifying requests.
    pub estimate: Option<Estimate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointEstimate {
    pub params: NetworkParams,
    pub estimate: Estimate,
    pub trials: Vec<TrialOutcome>,
}

/// Runs the configured number of trials for one parameter set and averages their intervals.
#[derive(Debug, Clone)]
pub struct Estimator<R = EventEngine> {
    config: ModelConfig,
    runner: R,
}

impl Estimator<EventEngine> {
    pub fn new(config: ModelConfig) -> Result<Self> {
        Self::with_runner(config, EventEngine)
    }
}

impl<R: TrialRunner> Estimator<R> {
    /// Fails when `config` does not pass [`ModelConfig::validate`].
    pub fn with_runner(config: ModelConfig, runner: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn estimate(&self, params: &NetworkParams) -> Result<Estimate> {
        Ok(self.estimate_detailed(params)?.estimate)
    }

    pub fn estimate_detailed(&self, params: &NetworkParams) -> Result<PointEstimate> {
        let network = build_network(params, &self.config)?;
        info!("Simulation for A = {}", params.arrival_rate);

        let horizon = self.config.horizon();
        let window = self.config.observation_window();
        let mut trials = Vec::with_capacity(self.config.trials as usize);

        for trial in 0..self.config.trials {
            let records = self.runner.run_trial(&network, u64::from(trial), horizon)?;
            let samples = sojourn_times(&records, window);

            let estimate = if samples.len() < 2 {
                warn!(
                    "Trial {} at A = {} has {} qualifying requests, skipping it",
                    trial,
                    params.arrival_rate,
                    samples.len()
                );
                None
            } else {
                Some(analyzer::confidence_interval(&samples, self.config.precision)?)
            };
            debug!(
                "Trial {}: {} observations, estimate {:?}",
                trial,
                samples.len(),
                estimate
            );

            trials.push(TrialOutcome {
                trial,
                observations: samples.len(),
                estimate,
            });
        }

        let usable: Vec<Estimate> = trials.iter().filter_map(|t| t.estimate).collect();
        let Some(estimate) = analyzer::aggregate(&usable) else {
            bail!(
                "No trial produced enough observations at A = {} ({} trials run)",
                params.arrival_rate,
                trials.len()
            );
        };

        Ok(PointEstimate {
            params: *params,
            estimate,
            trials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Destination, Network, Record, RequestId};
    use std::cell::RefCell;

    fn params(rate: f64) -> NetworkParams {
        NetworkParams {
            arrival_rate: rate,
            relay_servers: 1,
            dynamic_throughput: 1500.0,
            bandwidth: 10_000.0,
        }
    }

    fn exit_pair(id: u64, arrival: f64, end: f64) -> [Record; 2] {
        let base = Record {
            id: RequestId::new(id),
            station: 1,
            arrival_date: arrival,
            waiting_time: 0.0,
            service_start_date: arrival,
            service_time: 0.0,
            service_end_date: arrival,
            exit_date: arrival,
            destination: Destination::Station(2),
            server_id: 1,
            queue_size_at_arrival: 0,
            queue_size_at_departure: 0,
        };
        let exit = Record {
            station: 4,
            service_end_date: end,
            exit_date: end,
            destination: Destination::Exit,
            ..base.clone()
        };
        [base, exit]
    }

    /// Replays canned records, one set per seed.
    struct Replay {
        per_seed: Vec<Vec<Record>>,
        seeds: RefCell<Vec<u64>>,
    }

    impl TrialRunner for Replay {
        fn run_trial(&self, _network: &Network, seed: u64, _horizon: f64) -> Result<Vec<Record>> {
            self.seeds.borrow_mut().push(seed);
            Ok(self.per_seed.get(seed as usize).cloned().unwrap_or_default())
        }
    }

    fn small_config() -> ModelConfig {
        ModelConfig::default().with_trials(3)
    }

    #[test]
    fn seeds_trials_by_index() {
        let runner = Replay {
            per_seed: vec![],
            seeds: RefCell::new(vec![]),
        };
        let estimator = Estimator::with_runner(small_config(), runner).unwrap();
        let _ = estimator.estimate(&params(10.0));
        assert_eq!(*estimator.runner.seeds.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn no_observations_is_an_error_not_nan() {
        let runner = Replay {
            per_seed: vec![],
            seeds: RefCell::new(vec![]),
        };
        let estimator = Estimator::with_runner(small_config(), runner).unwrap();
        let err = estimator.estimate(&params(10.0)).unwrap_err();
        assert!(err.to_string().contains("No trial produced enough observations"));
    }

    #[test]
    fn empty_trials_are_skipped_in_the_aggregate() {
        let mut first = Vec::new();
        first.extend(exit_pair(1, 11.0, 12.0));
        first.extend(exit_pair(2, 12.0, 15.0));
        let runner = Replay {
            per_seed: vec![first, vec![], vec![]],
            seeds: RefCell::new(vec![]),
        };
        let estimator = Estimator::with_runner(small_config(), runner).unwrap();
        let point = estimator.estimate_detailed(&params(10.0)).unwrap();

        assert_eq!(point.trials.len(), 3);
        assert_eq!(point.trials[0].observations, 2);
        assert!(point.trials[1].estimate.is_none());
        assert_eq!(point.estimate.mean, 2.0);
        assert!(point.estimate.is_ordered());
        assert!(point.estimate.is_finite());
    }

    #[test]
    fn aggregate_is_the_mean_of_trial_estimates() {
        let mut first = Vec::new();
        first.extend(exit_pair(1, 11.0, 12.0));
        first.extend(exit_pair(2, 12.0, 13.0));
        let mut second = Vec::new();
        second.extend(exit_pair(1, 20.0, 23.0));
        second.extend(exit_pair(2, 21.0, 24.0));
        let runner = Replay {
            per_seed: vec![first, second],
            seeds: RefCell::new(vec![]),
        };
        let estimator = Estimator::with_runner(ModelConfig::default().with_trials(2), runner).unwrap();
        let estimate = estimator.estimate(&params(10.0)).unwrap();
        assert_eq!(estimate, Estimate::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn invalid_parameters_fail_before_simulating() {
        let estimator = Estimator::new(small_config()).unwrap();
        assert!(estimator.estimate(&params(0.0)).is_err());
    }

    #[test]
    fn out_of_range_precision_is_rejected_up_front() {
        // Above 1 the t quantile is undefined; below 0.5 the bounds would swap.
        for precision in [1.5, 1.0, 0.5, 0.2, f64::NAN] {
            let config = small_config().with_precision(precision);
            assert!(Estimator::new(config.clone()).is_err(), "precision {}", precision);
            let runner = Replay {
                per_seed: vec![],
                seeds: RefCell::new(vec![]),
            };
            assert!(Estimator::with_runner(config, runner).is_err());
        }
    }
}
