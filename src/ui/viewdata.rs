use egui::TextureHandle;

use crate::core::heatmap::{hot, normalize};
use crate::core::scan::ScanMatrix;
use crate::pages::NoticeLevel;
use crate::pages::diagnosis::ScanReport;

/// Text for the "Diagnosis Result" block.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultView {
    pub soh_text: String,
    pub soc_text: String,
    pub verdict_text: String,
    pub verdict_level: NoticeLevel,
}

impl ResultView {
    pub fn from_report(report: &ScanReport) -> Self {
        Self {
            soh_text: format!("SoH (State of Health): {}%", report.prediction.soh),
            soc_text: format!("SoC (State of Charge): {}%", report.prediction.soc),
            verdict_text: report.verdict.to_string(),
            verdict_level: if report.verdict.is_reusable() {
                NoticeLevel::Success
            } else {
                NoticeLevel::Error
            },
        }
    }
}

/// One texel per scan element, row 0 first.
pub fn heatmap_pixels(matrix: &ScanMatrix) -> Vec<egui::Color32> {
    normalize(matrix)
        .into_iter()
        .map(|v| {
            let [r, g, b] = hot(v);
            egui::Color32::from_rgb(r, g, b)
        })
        .collect()
}

/// Uploaded heat-map texture, keyed by the scan it was built from.
pub struct HeatmapTexture {
    pub scan_id: u64,
    pub handle: TextureHandle,
}
