pub mod distribution;
pub mod record;

pub use distribution::Dist;
pub use record::{Destination, Record, RecordRow, RequestId};

use crate::simulation::config::ModelConfig;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

const ROW_TOLERANCE: f64 = 1e-9;

/// The four stations of the file-transfer model, in routing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Station {
    Initiation,
    Relay,
    StaticProcessing,
    ClientLink,
}

impl Station {
    pub const ALL: [Station; 4] = [
        Station::Initiation,
        Station::Relay,
        Station::StaticProcessing,
        Station::ClientLink,
    ];

    pub fn index(&self) -> usize {
        match self {
            Station::Initiation => 0,
            Station::Relay => 1,
            Station::StaticProcessing => 2,
            Station::ClientLink => 3,
        }
    }

    /// 1-based number used in records.
    pub fn number(&self) -> usize {
        self.index() + 1
    }
}

/// Parameters that vary between runs: A, relay servers, S and R.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkParams {
    pub arrival_rate: f64,
    pub relay_servers: usize,
    pub dynamic_throughput: f64,
    pub bandwidth: f64,
}

#[derive(Debug, Clone)]
pub struct StationSpec {
    pub arrival: Dist,
    pub service: Dist,
    pub servers: usize,
}

/// Open queueing network: stations plus a substochastic routing matrix.
#[derive(Debug, Clone)]
pub struct Network {
    stations: Vec<StationSpec>,
    routing: Vec<Vec<f64>>,
}

impl Network {
    pub fn new(stations: Vec<StationSpec>, routing: Vec<Vec<f64>>) -> Result<Self> {
        if stations.is_empty() {
            bail!("a network needs at least one station");
        }
        if routing.len() != stations.len() {
            bail!(
                "routing matrix has {} rows for {} stations",
                routing.len(),
                stations.len()
            );
        }
        for (i, row) in routing.iter().enumerate() {
            if row.len() != stations.len() {
                bail!("routing row {} has {} columns", i + 1, row.len());
            }
            if row.iter().any(|p| !(p.is_finite() && *p >= 0.0)) {
                bail!("routing row {} has a negative or non-finite probability", i + 1);
            }
            let sum: f64 = row.iter().sum();
            if sum > 1.0 + ROW_TOLERANCE {
                bail!("routing row {} sums to {} > 1", i + 1, sum);
            }
        }
        for (i, station) in stations.iter().enumerate() {
            if station.servers == 0 {
                bail!("station {} has no servers", i + 1);
            }
        }
        Ok(Self { stations, routing })
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[StationSpec] {
        &self.stations
    }

    /// Station by 0-based index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn station(&self, index: usize) -> &StationSpec {
        &self.stations[index]
    }

    /// Routing probabilities out of station `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn routing_row(&self, index: usize) -> &[f64] {
        &self.routing[index]
    }

    /// Probability of leaving the network after station `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn exit_probability(&self, index: usize) -> f64 {
        (1.0 - self.routing[index].iter().sum::<f64>()).max(0.0)
    }
}

/// Builds the four-station file-transfer network.
pub fn build_network(params: &NetworkParams, config: &ModelConfig) -> Result<Network> {
    if params.relay_servers == 0 {
        bail!("the relay needs at least one server");
    }
    for (name, value) in [
        ("arrival rate", params.arrival_rate),
        ("dynamic throughput", params.dynamic_throughput),
        ("bandwidth", params.bandwidth),
    ] {
        if !(value.is_finite() && value > 0.0) {
            bail!("{} must be positive, got {}", name, value);
        }
    }

    let b = config.buffer_size;
    let stations = vec![
        StationSpec {
            arrival: Dist::exponential(params.arrival_rate)?,
            service: Dist::deterministic(config.init_time)?,
            servers: 1,
        },
        StationSpec {
            arrival: Dist::Never,
            service: Dist::exponential(1.0 / (config.static_time + b / params.bandwidth))?,
            servers: params.relay_servers,
        },
        StationSpec {
            arrival: Dist::Never,
            service: Dist::deterministic(b / params.dynamic_throughput)?,
            servers: 1,
        },
        StationSpec {
            arrival: Dist::Never,
            service: Dist::deterministic(b / config.client_bandwidth)?,
            servers: 1,
        },
    ];

    let reroute = config.reroute_probability();
    let routing = vec![
        vec![0.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
        vec![0.0, 0.0, 0.0, 1.0],
        vec![0.0, reroute, 0.0, 0.0],
    ];

    Network::new(stations, routing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> NetworkParams {
        NetworkParams {
            arrival_rate: 15.0,
            relay_servers: 1,
            dynamic_throughput: 1500.0,
            bandwidth: 10_000.0,
        }
    }

    #[test]
    fn only_the_first_station_has_arrivals() {
        let network = build_network(&baseline(), &ModelConfig::default()).unwrap();
        assert_eq!(network.len(), 4);
        assert!(!network.station(0).arrival.is_never());
        for station in &Station::ALL[1..] {
            assert!(network.station(station.index()).arrival.is_never());
        }
    }

    #[test]
    fn service_times_follow_the_model() {
        let config = ModelConfig::default();
        let network = build_network(&baseline(), &config).unwrap();
        assert_eq!(network.station(0).service.mean(), 0.001);
        assert!((network.station(1).service.mean() - (0.0001 + 16.0 / 10_000.0)).abs() < 1e-12);
        assert_eq!(network.station(2).service.mean(), 16.0 / 1500.0);
        assert_eq!(network.station(3).service.mean(), 16.0 / 707.0);
    }

    #[test]
    fn client_link_loops_back_or_exits() {
        let network = build_network(&baseline(), &ModelConfig::default()).unwrap();
        let last = Station::ClientLink.index();
        let back = network.routing_row(last)[Station::Relay.index()];
        assert!((back + network.exit_probability(last) - 1.0).abs() < 1e-12);
        for i in 0..3 {
            assert_eq!(network.exit_probability(i), 0.0);
        }
    }

    #[test]
    fn relay_server_count_is_configurable() {
        let params = NetworkParams {
            relay_servers: 2,
            ..baseline()
        };
        let network = build_network(&params, &ModelConfig::default()).unwrap();
        let servers: Vec<usize> = network.stations().iter().map(|s| s.servers).collect();
        assert_eq!(servers, vec![1, 2, 1, 1]);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let config = ModelConfig::default();
        for params in [
            NetworkParams { arrival_rate: 0.0, ..baseline() },
            NetworkParams { relay_servers: 0, ..baseline() },
            NetworkParams { bandwidth: -1.0, ..baseline() },
            NetworkParams { dynamic_throughput: f64::NAN, ..baseline() },
        ] {
            assert!(build_network(&params, &config).is_err(), "{:?}", params);
        }
    }

    #[test]
    #[should_panic]
    fn station_out_of_range_panics() {
        let network = build_network(&baseline(), &ModelConfig::default()).unwrap();
        let _ = network.station(network.len());
    }

    #[test]
    #[should_panic]
    fn routing_row_out_of_range_panics() {
        let network = build_network(&baseline(), &ModelConfig::default()).unwrap();
        let _ = network.routing_row(4);
    }

    #[test]
    fn rejects_rows_over_one() {
        let station = StationSpec {
            arrival: Dist::Never,
            service: Dist::Deterministic(1.0),
            servers: 1,
        };
        let result = Network::new(vec![station.clone(), station], vec![vec![0.6, 0.6], vec![0.0, 0.0]]);
        assert!(result.is_err());
    }
}
