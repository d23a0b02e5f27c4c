use crate::metrics::Estimate;
use crate::simulation::PointEstimate;
use anyhow::{Context, Result, bail};
use std::path::Path;

/// Sweep results of one scenario: one `[lower, mean, upper]` row per arrival rate.
///
/// Stored as the literal text of a nested list, e.g. `[[0.05, 0.06, 0.07], [..]]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<Estimate>,
}

impl ResultTable {
    pub fn new(rows: Vec<Estimate>) -> Self {
        Self { rows }
    }

    pub fn from_points(points: &[PointEstimate]) -> Self {
        Self::new(points.iter().map(|p| p.estimate).collect())
    }

    pub fn rows(&self) -> &[Estimate] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lowers(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.lower).collect()
    }

    pub fn means(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.mean).collect()
    }

    pub fn uppers(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.upper).collect()
    }

    pub fn to_literal(&self) -> String {
        // Debug formatting of f64 is the shortest text that parses back to the same bits.
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|r| format!("[{:?}, {:?}, {:?}]", r.lower, r.mean, r.upper))
            .collect();
        format!("[{}]", rows.join(", "))
    }

    /// Parses a nested numeric list literal. Nothing is evaluated.
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<[f64; 3]> = serde_json::from_str(text.trim())
            .context("expected a list of [lower, mean, upper] numeric triples")?;
        Ok(Self::new(rows.into_iter().map(Estimate::from).collect()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(i) = self.rows.iter().position(|r| !r.is_finite()) {
            bail!(
                "row {} of {} is not finite: {:?}",
                i,
                path.display(),
                self.rows[i]
            );
        }
        std::fs::write(path, format!("{}\n", self.to_literal()))
            .with_context(|| format!("Cannot write {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Malformed result table {}", path.display()))
    }
}
