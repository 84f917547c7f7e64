use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::core::heatmap::HeatmapRenderer;
use crate::core::predict::{HealthModel, Prediction, RandomHealthModel, Verdict};
use crate::core::scan::{Acquisition, AcquisitionEvent, ElementFrame, ScanMatrix};
use crate::core::signal::{SignalParams, SignalSimulator};
use crate::pages::{Notice, Rejection, Transition};
use crate::session::{DiagnosticRecord, Page, Session};

/// An accepted configuration upload. Only the name is kept; the file is never read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitFile {
    pub path: PathBuf,
    pub name: String,
}

impl BitFile {
    /// `None` unless `path` carries `extension` (case-insensitive, no dot).
    pub fn accept(path: &Path, extension: &str) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if !ext.eq_ignore_ascii_case(extension) {
            return None;
        }
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            path: path.to_path_buf(),
            name,
        })
    }
}

/// Everything shown under "Diagnosis Result" after a scan.
#[derive(Clone, Debug)]
pub struct ScanReport {
    pub scan_id: u64,
    pub serial: String,
    pub matrix: ScanMatrix,
    pub prediction: Prediction,
    pub verdict: Verdict,
}

struct Running {
    acquisition: Acquisition,
    serial: String,
}

pub struct DiagnosisPage {
    pub serial: String,
    pub upload: Option<BitFile>,
    pub notice: Option<Notice>,
    upload_extension: String,
    grid: (usize, usize),
    element_delay: Duration,
    reuse_threshold: f64,
    simulator: SignalSimulator,
    model: Box<dyn HealthModel>,
    renderer: HeatmapRenderer,
    running: Option<Running>,
    live: Option<ElementFrame>,
    report: Option<ScanReport>,
    next_scan_id: u64,
}

impl DiagnosisPage {
    pub fn new(cfg: &AppConfig) -> Self {
        let model = Box::new(RandomHealthModel::new(&cfg.prediction));
        Self::with_parts(cfg, SignalSimulator::new(SignalParams::from(&cfg.scan)), model)
    }

    pub fn with_parts(
        cfg: &AppConfig,
        simulator: SignalSimulator,
        model: Box<dyn HealthModel>,
    ) -> Self {
        Self {
            serial: String::new(),
            upload: None,
            notice: None,
            upload_extension: cfg.upload.extension.clone(),
            grid: (cfg.scan.rows, cfg.scan.cols),
            element_delay: cfg.scan.element_delay(),
            reuse_threshold: cfg.prediction.reuse_threshold,
            simulator,
            model,
            renderer: HeatmapRenderer::from(&cfg.heatmap),
            running: None,
            live: None,
            report: None,
            next_scan_id: 1,
        }
    }

    pub fn upload_extension(&self) -> &str {
        &self.upload_extension
    }

    /// Keep the file if its extension matches; other files are ignored.
    pub fn offer_upload(&mut self, path: &Path) -> bool {
        match BitFile::accept(path, &self.upload_extension) {
            Some(file) => {
                info!(file = %file.name, "configuration file accepted");
                self.upload = Some(file);
                true
            }
            None => {
                warn!("ignored upload {}: not a .{} file", path.display(), self.upload_extension);
                false
            }
        }
    }

    pub fn is_acquiring(&self) -> bool {
        self.running.is_some()
    }

    /// (acquired, total) for the running scan.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.running
            .as_ref()
            .map(|r| (r.acquisition.acquired(), r.acquisition.total()))
    }

    /// Latest element trace; each new element replaces the previous one.
    pub fn live_frame(&self) -> Option<&ElementFrame> {
        self.live.as_ref()
    }

    pub fn report(&self) -> Option<&ScanReport> {
        self.report.as_ref()
    }

    pub fn reuse_threshold(&self) -> f64 {
        self.reuse_threshold
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.running
            .as_ref()
            .map(|r| r.acquisition.time_until_due(now))
    }

    /// Start a new scan. The serial is captured now. Ignored while a scan runs.
    pub fn start_acquisition(&mut self, now: Instant) -> bool {
        if self.running.is_some() {
            return false;
        }
        let (rows, cols) = self.grid;
        info!(
            serial = %self.serial,
            file = self.upload.as_ref().map(|f| f.name.as_str()).unwrap_or("-"),
            "acquisition started ({rows}x{cols})"
        );
        self.live = None;
        self.report = None;
        self.notice = None;
        self.running = Some(Running {
            acquisition: Acquisition::new(rows, cols, self.element_delay, now),
            serial: self.serial.clone(),
        });
        true
    }

    /// Advance the running scan by at most one element. On completion the
    /// candidate record replaces `session.last_result`.
    pub fn poll(&mut self, session: &mut Session, now: Instant) -> Option<AcquisitionEvent> {
        let running = self.running.as_mut()?;
        let event = running.acquisition.step(&mut self.simulator, now)?;
        match &event {
            AcquisitionEvent::Element(frame) => self.live = Some(frame.clone()),
            AcquisitionEvent::Complete(matrix) => {
                if let Some(done) = self.running.take() {
                    self.finish(session, matrix.clone(), done.serial);
                }
            }
        }
        Some(event)
    }

    /// Drive a scan to completion on the calling thread, sleeping between
    /// elements. `on_frame` sees every element as it is acquired.
    pub fn run_blocking(
        &mut self,
        session: &mut Session,
        mut on_frame: impl FnMut(&ElementFrame),
    ) -> Option<&ScanReport> {
        self.start_acquisition(Instant::now());
        while self.running.is_some() {
            let now = Instant::now();
            match self.poll(session, now) {
                Some(AcquisitionEvent::Element(frame)) => on_frame(&frame),
                Some(AcquisitionEvent::Complete(_)) => break,
                None => {
                    if let Some(wait) = self.time_until_due(now) {
                        std::thread::sleep(wait);
                    }
                }
            }
        }
        self.report.as_ref()
    }

    fn finish(&mut self, session: &mut Session, matrix: ScanMatrix, serial: String) {
        let prediction = self.model.predict(&matrix);
        let verdict = Verdict::from_soh(prediction.soh, self.reuse_threshold);
        let image: Arc<[u8]> = match self.renderer.render_png(&matrix) {
            Ok(png) => Arc::from(png),
            Err(err) => {
                error!("heat-map encoding failed: {err}");
                self.notice = Some(Notice::error(format!("Heat-map image unavailable: {err}")));
                Arc::from(Vec::new())
            }
        };
        let scan_id = self.next_scan_id;
        self.next_scan_id += 1;
        info!(
            scan_id,
            serial = %serial,
            soh = prediction.soh,
            soc = prediction.soc,
            "acquisition complete: {verdict}"
        );
        session.last_result = Some(DiagnosticRecord {
            scan_id,
            serial: serial.clone(),
            soh: prediction.soh,
            soc: prediction.soc,
            image,
        });
        self.report = Some(ScanReport {
            scan_id,
            serial,
            matrix,
            prediction,
            verdict,
        });
    }

    /// Append the current candidate to the history and move to the History page.
    pub fn save(&mut self, session: &mut Session) -> Result<Transition, Rejection> {
        let Some(record) = session.last_result.clone() else {
            warn!("save rejected: no scan result");
            let rejection = Rejection::NoScanResult;
            self.notice = Some(rejection.into());
            return Err(rejection);
        };
        info!(scan_id = record.scan_id, serial = %record.serial, "result saved");
        session.append_history(record);
        self.notice = None;
        Ok(Transition::GoTo(Page::History))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::NoticeLevel;

    struct Fixed(Prediction);

    impl HealthModel for Fixed {
        fn predict(&mut self, _scan: &ScanMatrix) -> Prediction {
            self.0
        }
    }

    fn instant_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.scan.element_delay_ms = 0;
        cfg
    }

    fn page(soh: f64, soc: f64) -> DiagnosisPage {
        let cfg = instant_config();
        DiagnosisPage::with_parts(
            &cfg,
            SignalSimulator::with_seed(SignalParams::from(&cfg.scan), 9),
            Box::new(Fixed(Prediction { soh, soc })),
        )
    }

    #[test]
    fn bit_file_filter() {
        assert!(BitFile::accept(Path::new("/tmp/cell.bit"), "bit").is_some());
        assert_eq!(
            BitFile::accept(Path::new("CELL.BIT"), "bit").map(|f| f.name),
            Some("CELL.BIT".to_string())
        );
        assert!(BitFile::accept(Path::new("cell.bin"), "bit").is_none());
        assert!(BitFile::accept(Path::new("bit"), "bit").is_none());
    }

    #[test]
    fn offer_upload_keeps_previous_on_mismatch() {
        let mut p = page(85.0, 90.0);
        assert!(p.offer_upload(Path::new("a.bit")));
        assert!(!p.offer_upload(Path::new("b.txt")));
        assert_eq!(p.upload.as_ref().map(|f| f.name.as_str()), Some("a.bit"));
    }

    #[test]
    fn scan_produces_candidate_not_history() {
        let mut p = page(85.0, 90.0);
        p.serial = "SN-001".into();
        let mut session = Session::default();
        let mut frames = 0;
        let report = p
            .run_blocking(&mut session, |_| frames += 1)
            .cloned()
            .expect("report");

        assert_eq!(frames, 12);
        assert_eq!((report.matrix.rows(), report.matrix.cols()), (3, 4));
        assert_eq!(report.verdict, Verdict::Reusable);
        assert!(!p.is_acquiring());
        assert!(session.history().is_empty());

        let rec = session.last_result.as_ref().expect("candidate");
        assert_eq!(rec.serial, "SN-001");
        assert_eq!((rec.soh, rec.soc), (85.0, 90.0));
        assert!(!rec.image.is_empty());
        assert_eq!(p.live_frame().map(|f| (f.row, f.col)), Some((2, 3)));
    }

    #[test]
    fn serial_is_captured_at_start() {
        let mut p = page(85.0, 90.0);
        let mut session = Session::default();
        p.serial = "before".into();
        let t0 = Instant::now();
        assert!(p.start_acquisition(t0));
        assert!(!p.start_acquisition(t0), "second start is ignored");
        p.serial = "after".into();
        while p.is_acquiring() {
            p.poll(&mut session, t0);
        }
        assert_eq!(session.last_result.unwrap().serial, "before");
    }

    #[test]
    fn new_scan_overwrites_candidate() {
        let mut p = page(70.5, 61.0);
        let mut session = Session::default();
        p.run_blocking(&mut session, |_| {});
        let first = session.last_result.clone().unwrap();
        assert_eq!(p.report().unwrap().verdict, Verdict::Degraded);
        p.run_blocking(&mut session, |_| {});
        let second = session.last_result.clone().unwrap();
        assert_ne!(first.scan_id, second.scan_id);
        assert!(session.history().is_empty());
    }

    #[test]
    fn save_without_scan_is_rejected() {
        let mut p = page(85.0, 90.0);
        let mut session = Session::default();
        assert_eq!(p.save(&mut session), Err(Rejection::NoScanResult));
        assert!(session.history().is_empty());
        assert_eq!(p.notice.as_ref().map(|n| n.level), Some(NoticeLevel::Warning));
    }

    #[test]
    fn save_appends_candidate() {
        let mut p = page(85.0, 90.0);
        let mut session = Session::default();
        p.run_blocking(&mut session, |_| {});
        assert_eq!(p.save(&mut session), Ok(Transition::GoTo(Page::History)));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].soh, 85.0);
        assert!(session.last_result.is_some(), "candidate survives a save");
    }
}
