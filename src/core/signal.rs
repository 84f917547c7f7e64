//! Synthetic per-element ultrasound trace.
//! A fixed-frequency sine over a 1 s window plus independent Gaussian noise per sample.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use tracing::warn;

use crate::config::ScanConfig;

#[derive(Clone, Copy, Debug)]
pub struct SignalParams {
    pub samples: usize,
    pub tone_hz: f64,
    pub noise_std: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            samples: 200,
            tone_hz: 5.0,
            noise_std: 0.2,
        }
    }
}

impl From<&ScanConfig> for SignalParams {
    fn from(cfg: &ScanConfig) -> Self {
        Self {
            samples: cfg.samples,
            tone_hz: cfg.tone_hz,
            noise_std: cfg.noise_std,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Trace {
    pub time: Vec<f64>,
    pub amplitude: Vec<f64>,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.amplitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitude.is_empty()
    }

    /// Largest absolute amplitude; the element's scalar summary.
    pub fn peak_abs(&self) -> f64 {
        self.amplitude.iter().fold(0.0f64, |m, a| m.max(a.abs()))
    }
}

/// `n` evenly spaced points from `start` to `end`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

pub struct SignalSimulator {
    params: SignalParams,
    noise: Option<Normal<f64>>,
    rng: StdRng,
}

impl SignalSimulator {
    pub fn new(params: SignalParams) -> Self {
        Self::with_rng(params, StdRng::from_os_rng())
    }

    pub fn with_seed(params: SignalParams, seed: u64) -> Self {
        Self::with_rng(params, StdRng::seed_from_u64(seed))
    }

    fn with_rng(params: SignalParams, rng: StdRng) -> Self {
        let noise = match Normal::new(0.0, params.noise_std) {
            Ok(n) => Some(n),
            Err(err) => {
                warn!("noise disabled: std {} rejected ({err})", params.noise_std);
                None
            }
        };
        Self { params, noise, rng }
    }

    pub fn params(&self) -> &SignalParams {
        &self.params
    }

    pub fn generate(&mut self) -> Trace {
        let time = linspace(0.0, 1.0, self.params.samples);
        let omega = 2.0 * PI * self.params.tone_hz;
        let amplitude = time
            .iter()
            .map(|&t| {
                let n = match &self.noise {
                    Some(dist) => dist.sample(&mut self.rng),
                    None => 0.0,
                };
                (omega * t).sin() + n
            })
            .collect();
        Trace { time, amplitude }
    }
}
