//! Shift-amount coverage tracking
//!
//! Informational only: coverage never changes the verdict of a run.

use crate::config::Parameters;
use serde::{Deserialize, Serialize};

/// Hit counts per shift amount
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShamtCoverage {
    width: u32,
    hits: Vec<u64>,
    beyond_width: u64,
}

impl ShamtCoverage {
    pub fn new(params: &Parameters) -> Self {
        Self {
            width: params.width,
            hits: vec![0; params.shamt_space() as usize],
            beyond_width: 0,
        }
    }

    pub fn record(&mut self, shamt: u64) {
        if let Some(slot) = self.hits.get_mut(shamt as usize) {
            *slot += 1;
        }
        if shamt >= u64::from(self.width) {
            self.beyond_width += 1;
        }
    }

    /// Per-amount hit counts, indexed by shift amount
    pub fn hits(&self) -> &[u64] {
        &self.hits
    }

    /// Samples whose shift amount was at or above the width
    pub fn beyond_width(&self) -> u64 {
        self.beyond_width
    }

    /// Number of distinct shift amounts seen
    pub fn distinct(&self) -> usize {
        self.hits.iter().filter(|&&h| h > 0).count()
    }

    /// Percentage of representable shift amounts seen
    pub fn percent(&self) -> f64 {
        if self.hits.is_empty() {
            return 0.0;
        }
        self.distinct() as f64 * 100.0 / self.hits.len() as f64
    }

    /// Shift amounts never exercised
    pub fn missed(&self) -> Vec<u64> {
        self.hits
            .iter()
            .enumerate()
            .filter(|(_, &h)| h == 0)
            .map(|(shamt, _)| shamt as u64)
            .collect()
    }
}
