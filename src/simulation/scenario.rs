use crate::network::NetworkParams;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hardware configurations compared by the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    Baseline,
    /// Relay bandwidth R doubled.
    DoubleSpeed,
    /// Dynamic throughput S doubled.
    DoubleBandwidth,
    /// Two relay servers.
    DoubleServers,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Baseline,
        Scenario::DoubleSpeed,
        Scenario::DoubleBandwidth,
        Scenario::DoubleServers,
    ];

    /// The three enhancements compared against the baseline.
    pub const ENHANCED: [Scenario; 3] = [
        Scenario::DoubleSpeed,
        Scenario::DoubleBandwidth,
        Scenario::DoubleServers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::DoubleSpeed => "double-speed",
            Scenario::DoubleBandwidth => "double-bandwidth",
            Scenario::DoubleServers => "double-servers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Baseline => "Baseline",
            Scenario::DoubleSpeed => "Double speed (R)",
            Scenario::DoubleBandwidth => "Double bandwidth (S)",
            Scenario::DoubleServers => "Double servers",
        }
    }

    /// File the sweep table of this scenario is stored in.
    pub fn file_name(&self) -> &'static str {
        match self {
            Scenario::Baseline => "init.txt",
            Scenario::DoubleSpeed => "double_vitesse.txt",
            Scenario::DoubleBandwidth => "double_bande.txt",
            Scenario::DoubleServers => "double_serveurs.txt",
        }
    }

    /// Network parameters at a given arrival rate.
    pub fn params(&self, arrival_rate: f64) -> NetworkParams {
        let base = NetworkParams {
            arrival_rate,
            relay_servers: 1,
            dynamic_throughput: 1500.0,
            bandwidth: 10_000.0,
        };
        match self {
            Scenario::Baseline => base,
            Scenario::DoubleSpeed => NetworkParams {
                bandwidth: 20_000.0,
                ..base
            },
            Scenario::DoubleBandwidth => NetworkParams {
                dynamic_throughput: 3000.0,
                ..base
            },
            Scenario::DoubleServers => NetworkParams {
                relay_servers: 2,
                ..base
            },
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        for scenario in Scenario::ALL {
            if scenario.name() == wanted || scenario.file_name() == wanted {
                return Ok(scenario);
            }
        }
        match wanted.as_str() {
            "init" | "initial" => Ok(Scenario::Baseline),
            _ => bail!(
                "Unknown scenario: {}. Use: baseline, double-speed, double-bandwidth, double-servers",
                s
            ),
        }
    }
}
