use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::time::Duration;
use tracing::warn;

use crate::core::heatmap::{MAX_SIDE, MIN_HEIGHT, MIN_WIDTH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "ScanConfig::default_rows")]
    pub rows: usize,
    #[serde(default = "ScanConfig::default_cols")]
    pub cols: usize,
    #[serde(default = "ScanConfig::default_samples")]
    pub samples: usize,
    #[serde(default = "ScanConfig::default_tone_hz")]
    pub tone_hz: f64,
    #[serde(default = "ScanConfig::default_noise_std")]
    pub noise_std: f64,
    #[serde(default = "ScanConfig::default_element_delay_ms")]
    pub element_delay_ms: u64,
}

impl ScanConfig {
    fn default_rows() -> usize {
        3
    }
    fn default_cols() -> usize {
        4
    }
    fn default_samples() -> usize {
        200
    }
    fn default_tone_hz() -> f64 {
        5.0
    }
    fn default_noise_std() -> f64 {
        0.2
    }
    fn default_element_delay_ms() -> u64 {
        100
    }

    pub fn element_delay(&self) -> Duration {
        Duration::from_millis(self.element_delay_ms)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rows: Self::default_rows(),
            cols: Self::default_cols(),
            samples: Self::default_samples(),
            tone_hz: Self::default_tone_hz(),
            noise_std: Self::default_noise_std(),
            element_delay_ms: Self::default_element_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "PredictionConfig::default_soh_min")]
    pub soh_min: f64,
    #[serde(default = "PredictionConfig::default_soh_max")]
    pub soh_max: f64,
    #[serde(default = "PredictionConfig::default_soc_min")]
    pub soc_min: f64,
    #[serde(default = "PredictionConfig::default_soc_max")]
    pub soc_max: f64,
    /// SoH at or above this value is reported as reusable.
    #[serde(default = "PredictionConfig::default_reuse_threshold")]
    pub reuse_threshold: f64,
}

impl PredictionConfig {
    fn default_soh_min() -> f64 {
        70.0
    }
    fn default_soh_max() -> f64 {
        100.0
    }
    fn default_soc_min() -> f64 {
        60.0
    }
    fn default_soc_max() -> f64 {
        100.0
    }
    fn default_reuse_threshold() -> f64 {
        80.0
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            soh_min: Self::default_soh_min(),
            soh_max: Self::default_soh_max(),
            soc_min: Self::default_soc_min(),
            soc_max: Self::default_soc_max(),
            reuse_threshold: Self::default_reuse_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapConfig {
    #[serde(default = "HeatmapConfig::default_width")]
    pub width: u32,
    #[serde(default = "HeatmapConfig::default_height")]
    pub height: u32,
}

impl HeatmapConfig {
    fn default_width() -> u32 {
        480
    }
    fn default_height() -> u32 {
        360
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Accepted file extension for the configuration upload, without the dot.
    #[serde(default = "UploadConfig::default_extension")]
    pub extension: String,
}

impl UploadConfig {
    fn default_extension() -> String {
        "bit".to_string()
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            extension: Self::default_extension(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl AppConfig {
    /// Ordered, finite and within [0, 100]; otherwise `fallback`.
    fn percent_range(lo: f64, hi: f64, fallback: (f64, f64)) -> (f64, f64) {
        if !lo.is_finite() || !hi.is_finite() {
            return fallback;
        }
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        (lo.clamp(0.0, 100.0), hi.clamp(0.0, 100.0))
    }

    /// Clamp values that would make the scan, the prediction ranges or the
    /// heat-map canvas unusable.
    pub fn sanitized(mut self) -> Self {
        self.scan.rows = self.scan.rows.max(1);
        self.scan.cols = self.scan.cols.max(1);
        self.scan.samples = self.scan.samples.max(2);
        if !self.scan.tone_hz.is_finite() {
            self.scan.tone_hz = ScanConfig::default_tone_hz();
        }
        if !self.scan.noise_std.is_finite() || self.scan.noise_std < 0.0 {
            warn!(
                "noise_std {} is not usable; falling back to {}",
                self.scan.noise_std,
                ScanConfig::default_noise_std()
            );
            self.scan.noise_std = ScanConfig::default_noise_std();
        }

        let p = &mut self.prediction;
        (p.soh_min, p.soh_max) = Self::percent_range(
            p.soh_min,
            p.soh_max,
            (
                PredictionConfig::default_soh_min(),
                PredictionConfig::default_soh_max(),
            ),
        );
        (p.soc_min, p.soc_max) = Self::percent_range(
            p.soc_min,
            p.soc_max,
            (
                PredictionConfig::default_soc_min(),
                PredictionConfig::default_soc_max(),
            ),
        );
        if !p.reuse_threshold.is_finite() {
            p.reuse_threshold = PredictionConfig::default_reuse_threshold();
        }

        self.heatmap.width = self.heatmap.width.clamp(MIN_WIDTH, MAX_SIDE);
        self.heatmap.height = self.heatmap.height.clamp(MIN_HEIGHT, MAX_SIDE);

        let ext = self.upload.extension.trim().trim_start_matches('.');
        self.upload.extension = if ext.is_empty() {
            UploadConfig::default_extension()
        } else {
            ext.to_ascii_lowercase()
        };
        self
    }

    /// Defaults as TOML with every key commented out; section headers stay live.
    fn commented_defaults() -> Result<String, toml::ser::Error> {
        let text = toml::to_string_pretty(&Self::default())?;
        Ok(text
            .lines()
            .map(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('[') {
                    format!("{line}\n")
                } else {
                    format!("# {line}\n")
                }
            })
            .collect())
    }

    /// Parse `path`, or create it with commented defaults when it does not exist.
    /// Unreadable or invalid files fall back to defaults and are left untouched.
    pub fn load_or_default(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str::<AppConfig>(&contents)
                .map(Self::sanitized)
                .unwrap_or_else(|err| {
                    warn!("config {path} is invalid ({err}); using defaults");
                    Self::default()
                }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                match Self::commented_defaults() {
                    Ok(text) => {
                        if let Err(err) = fs::write(path, text) {
                            warn!("could not create {path}: {err}");
                        }
                    }
                    Err(err) => warn!("could not serialize defaults: {err}"),
                }
                Self::default()
            }
            Err(err) => {
                warn!("could not read config {path} ({err}); using defaults");
                Self::default()
            }
        }
    }
}
