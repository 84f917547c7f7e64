//! Scripted session without a window: login, scan, save, then dispatch to the
//! History page and export each entry. Uses the same router and page handlers
//! as the GUI.

use std::error::Error;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::cli::Args;
use crate::config::AppConfig;
use crate::pages::diagnosis::DiagnosisPage;
use crate::pages::history;
use crate::pages::login::LoginPage;
use crate::router::Router;
use crate::session::Page;

fn serial_for(base: &str, n: usize, scans: usize) -> String {
    match (scans > 1, base.is_empty()) {
        (false, _) => base.to_string(),
        (true, true) => format!("scan-{n}"),
        (true, false) => format!("{base}-{n}"),
    }
}

pub fn run(args: &Args, cfg: &AppConfig) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut router = Router::new();
    let mut diagnosis = DiagnosisPage::new(cfg);
    run_session(&mut router, &mut diagnosis, args)
}

pub fn run_session(
    router: &mut Router,
    diagnosis: &mut DiagnosisPage,
    args: &Args,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut login = LoginPage::with_credentials(args.user.clone(), args.password.clone());
    router.begin_cycle();
    let transition = login.submit(router.session())?;
    router.apply(transition);

    for n in 1..=args.scans {
        if router.begin_cycle() != Page::Diagnosis {
            router.navigate(Page::Diagnosis);
            router.begin_cycle();
        }
        diagnosis.serial = serial_for(&args.serial, n, args.scans);
        let report = diagnosis.run_blocking(router.session(), |frame| {
            println!("  {} peak={:.3}", frame.title(), frame.peak);
        });
        if let Some(r) = report {
            println!(
                "scan {n}: SoH {}% SoC {}% -> {}",
                r.prediction.soh, r.prediction.soc, r.verdict
            );
        }
        let transition = diagnosis.save(router.session())?;
        router.apply(transition);
    }

    if router.begin_cycle() != Page::History {
        router.navigate(Page::History);
        router.begin_cycle();
    }
    let session = router.session();
    if session.history().is_empty() {
        println!("{}", history::empty_notice().text);
        return Ok(Vec::new());
    }
    for entry in history::entries(session) {
        println!("{}: {}", entry.heading(), entry.summary());
    }
    let written = history::export_all(session, Path::new(&args.out))?;
    info!("exported {} heat-map(s) to {}", written.len(), args.out);
    println!("Saved heat-maps to {}", args.out);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials_are_suffixed_for_batches() {
        assert_eq!(serial_for("SN", 1, 1), "SN");
        assert_eq!(serial_for("", 1, 1), "");
        assert_eq!(serial_for("SN", 2, 3), "SN-2");
        assert_eq!(serial_for("", 3, 3), "scan-3");
    }
}
