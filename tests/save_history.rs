use std::sync::Arc;
use std::time::Instant;

use batscan::config::AppConfig;
use batscan::core::predict::{HealthModel, Prediction};
use batscan::core::scan::ScanMatrix;
use batscan::core::signal::{SignalParams, SignalSimulator};
use batscan::pages::diagnosis::DiagnosisPage;
use batscan::pages::history;
use batscan::pages::login::LoginPage;
use batscan::pages::{NoticeLevel, Rejection};
use batscan::router::Router;
use batscan::session::Page;

/// Returns the queued predictions in order, repeating the last one.
struct Scripted {
    queue: Vec<Prediction>,
    next: usize,
}

impl Scripted {
    fn new(queue: Vec<Prediction>) -> Self {
        Self { queue, next: 0 }
    }
}

impl HealthModel for Scripted {
    fn predict(&mut self, _scan: &ScanMatrix) -> Prediction {
        let p = self.queue[self.next.min(self.queue.len() - 1)];
        self.next += 1;
        p
    }
}

fn logged_in_with(model: Scripted) -> (Router, DiagnosisPage) {
    let mut cfg = AppConfig::default();
    cfg.scan.element_delay_ms = 0;
    let page = DiagnosisPage::with_parts(
        &cfg,
        SignalSimulator::with_seed(SignalParams::from(&cfg.scan), 21),
        Box::new(model),
    );
    let mut router = Router::new();
    let mut login = LoginPage::with_credentials("tester", "pw");
    let t = login.submit(router.session()).unwrap();
    router.apply(t);
    assert_eq!(router.begin_cycle(), Page::Diagnosis);
    (router, page)
}

#[test]
fn save_without_scan_warns_and_keeps_state() {
    let (mut router, mut page) = logged_in_with(Scripted::new(vec![Prediction {
        soh: 85.0,
        soc: 90.0,
    }]));
    let result = page.save(router.session());
    assert_eq!(result, Err(Rejection::NoScanResult));
    assert_eq!(page.notice.as_ref().unwrap().level, NoticeLevel::Warning);
    assert!(router.session().history().is_empty());
    assert_eq!(router.begin_cycle(), Page::Diagnosis);
}

#[test]
fn save_after_scan_appends_and_shows_history() {
    let (mut router, mut page) = logged_in_with(Scripted::new(vec![Prediction {
        soh: 85.0,
        soc: 90.0,
    }]));
    page.serial = "BAT-42".into();
    page.run_blocking(router.session(), |_| {});
    assert!(router.session().history().is_empty());

    let t = page.save(router.session()).expect("save");
    router.apply(t);
    assert_eq!(router.begin_cycle(), Page::History);
    assert_eq!(router.session().nav_selection, Page::History);

    let history = router.session().history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].serial, "BAT-42");
    assert_eq!((history[0].soh, history[0].soc), (85.0, 90.0));
    let img = image::load_from_memory(&history[0].image).expect("stored PNG decodes");
    assert_eq!((img.width(), img.height()), (480, 360));
}

#[test]
fn repeated_saves_keep_order() {
    let predictions = vec![
        Prediction { soh: 91.0, soc: 70.0 },
        Prediction { soh: 75.5, soc: 88.0 },
        Prediction { soh: 80.0, soc: 60.0 },
    ];
    let (mut router, mut page) = logged_in_with(Scripted::new(predictions.clone()));

    for (i, serial) in ["first", "second", "third"].iter().enumerate() {
        if i > 0 {
            router.navigate(Page::Diagnosis);
            assert_eq!(router.begin_cycle(), Page::Diagnosis);
        }
        page.serial = serial.to_string();
        page.run_blocking(router.session(), |_| {});
        let t = page.save(router.session()).unwrap();
        router.apply(t);
        assert_eq!(router.begin_cycle(), Page::History);
        assert_eq!(router.session().history().len(), i + 1);
    }

    let session = router.session();
    let rows: Vec<(usize, String, f64)> = history::entries(session)
        .map(|e| (e.number, e.record.serial.clone(), e.record.soh))
        .collect();
    assert_eq!(
        rows,
        vec![
            (1, "first".to_string(), 91.0),
            (2, "second".to_string(), 75.5),
            (3, "third".to_string(), 80.0),
        ]
    );
    let ids: Vec<u64> = session.history().iter().map(|r| r.scan_id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn starting_a_scan_keeps_previous_candidate() {
    let (mut router, mut page) = logged_in_with(Scripted::new(vec![
        Prediction { soh: 88.0, soc: 77.0 },
        Prediction { soh: 72.0, soc: 65.0 },
    ]));
    page.serial = "old".into();
    page.run_blocking(router.session(), |_| {});
    let previous = router.session().last_result.clone().expect("candidate");

    page.serial = "new".into();
    let t0 = Instant::now();
    assert!(page.start_acquisition(t0));
    assert!(page.poll(router.session(), t0).is_some());
    assert!(page.is_acquiring());
    let during = router.session().last_result.as_ref().expect("candidate kept");
    assert_eq!(during.scan_id, previous.scan_id);
    assert_eq!(during.serial, "old");

    while page.is_acquiring() {
        page.poll(router.session(), t0);
    }
    let replaced = router.session().last_result.as_ref().expect("candidate");
    assert_ne!(replaced.scan_id, previous.scan_id);
    assert_eq!((replaced.serial.as_str(), replaced.soh), ("new", 72.0));
}

#[test]
fn saving_twice_appends_same_candidate() {
    let (mut router, mut page) = logged_in_with(Scripted::new(vec![Prediction {
        soh: 81.0,
        soc: 64.0,
    }]));
    page.serial = "twice".into();
    page.run_blocking(router.session(), |_| {});

    for _ in 0..2 {
        let t = page.save(router.session()).expect("save");
        router.apply(t);
        assert_eq!(router.begin_cycle(), Page::History);
    }

    let history = router.session().history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].scan_id, history[1].scan_id);
    assert_eq!(history[0].serial, history[1].serial);
    assert_eq!((history[1].soh, history[1].soc), (81.0, 64.0));
    assert!(Arc::ptr_eq(&history[0].image, &history[1].image));
    let numbers: Vec<usize> = history::entries(router.session()).map(|e| e.number).collect();
    assert_eq!(numbers, vec![1, 2]);
}
