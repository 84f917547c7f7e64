//! State-of-health / state-of-charge estimation.
//!
//! `RandomHealthModel` is a placeholder: it never looks at the scan and draws
//! both scores uniformly from configured ranges. Real inference would plug in
//! behind the same `HealthModel` trait.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::ops::RangeInclusive;

use crate::config::PredictionConfig;
use crate::core::scan::ScanMatrix;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prediction {
    /// State of health, percent.
    pub soh: f64,
    /// State of charge, percent.
    pub soc: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Reusable,
    Degraded,
}

impl Verdict {
    /// The threshold is inclusive: `soh == threshold` is still reusable.
    pub fn from_soh(soh: f64, threshold: f64) -> Self {
        if soh >= threshold {
            Verdict::Reusable
        } else {
            Verdict::Degraded
        }
    }

    pub fn is_reusable(self) -> bool {
        self == Verdict::Reusable
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Reusable => write!(f, "✅ Reusable"),
            Verdict::Degraded => write!(f, "⚠️ Degraded → not reusable"),
        }
    }
}

pub trait HealthModel {
    fn predict(&mut self, scan: &ScanMatrix) -> Prediction;
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub struct RandomHealthModel {
    soh: RangeInclusive<f64>,
    soc: RangeInclusive<f64>,
    rng: StdRng,
}

impl RandomHealthModel {
    pub fn new(cfg: &PredictionConfig) -> Self {
        Self::with_rng(cfg, StdRng::from_os_rng())
    }

    pub fn with_seed(cfg: &PredictionConfig, seed: u64) -> Self {
        Self::with_rng(cfg, StdRng::seed_from_u64(seed))
    }

    fn with_rng(cfg: &PredictionConfig, rng: StdRng) -> Self {
        Self {
            soh: cfg.soh_min..=cfg.soh_max,
            soc: cfg.soc_min..=cfg.soc_max,
            rng,
        }
    }
}

impl HealthModel for RandomHealthModel {
    fn predict(&mut self, _scan: &ScanMatrix) -> Prediction {
        let soh = round2(self.rng.random_range(self.soh.clone()));
        let soc = round2(self.rng.random_range(self.soc.clone()));
        Prediction { soh, soc }
    }
}
