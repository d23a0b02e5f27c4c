use anyhow::{Result, anyhow, bail};
use rand::Rng;
use rand_distr::{Distribution, Exp};

/// Inter-arrival or service time distribution of a station.
#[derive(Debug, Clone, Copy)]
pub enum Dist {
    Exponential { rate: f64, exp: Exp<f64> },
    Deterministic(f64),
    /// Never fires (infinite inter-arrival time).
    Never,
}

impl Dist {
    pub fn exponential(rate: f64) -> Result<Self> {
        if !(rate.is_finite() && rate > 0.0) {
            bail!("exponential rate must be positive and finite, got {}", rate);
        }
        let exp = Exp::new(rate).map_err(|e| anyhow!("invalid exponential rate {}: {:?}", rate, e))?;
        Ok(Dist::Exponential { rate, exp })
    }

    pub fn deterministic(value: f64) -> Result<Self> {
        if !(value.is_finite() && value >= 0.0) {
            bail!("deterministic time must be finite and non-negative, got {}", value);
        }
        Ok(Dist::Deterministic(value))
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Dist::Exponential { exp, .. } => exp.sample(rng),
            Dist::Deterministic(value) => *value,
            Dist::Never => f64::INFINITY,
        }
    }

    pub fn mean(&self) -> f64 {
        match self {
            Dist::Exponential { rate, .. } => 1.0 / rate,
            Dist::Deterministic(value) => *value,
            Dist::Never => f64::INFINITY,
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Dist::Never)
    }
}
