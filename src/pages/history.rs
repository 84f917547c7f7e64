use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::pages::Notice;
use crate::session::{DiagnosticRecord, Session};

/// One row of the History page; `number` is 1-based in insertion order.
#[derive(Clone, Copy, Debug)]
pub struct HistoryEntry<'a> {
    pub number: usize,
    pub record: &'a DiagnosticRecord,
}

impl HistoryEntry<'_> {
    pub fn heading(&self) -> String {
        format!("Battery {} - {}", self.number, self.record.serial)
    }

    pub fn summary(&self) -> String {
        format!("SoH: {}%, SoC: {}%", self.record.soh, self.record.soc)
    }

    /// Default file name for exporting the heat-map.
    pub fn file_name(&self) -> String {
        let serial: String = self
            .record
            .serial
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        if serial.is_empty() {
            format!("battery_{}.png", self.number)
        } else {
            format!("battery_{}_{}.png", self.number, serial)
        }
    }
}

pub fn entries(session: &Session) -> impl Iterator<Item = HistoryEntry<'_>> {
    session
        .history()
        .iter()
        .enumerate()
        .map(|(i, record)| HistoryEntry {
            number: i + 1,
            record,
        })
}

pub fn empty_notice() -> Notice {
    Notice::info("No saved diagnostic results.")
}

#[derive(Debug, Default)]
pub struct HistoryPage {
    pub notice: Option<Notice>,
}

impl HistoryPage {
    /// Write the entry's PNG to `path`.
    pub fn export(&mut self, entry: &HistoryEntry<'_>, path: &Path) -> io::Result<()> {
        let result = export_png(entry.record, path);
        self.notice = Some(match &result {
            Ok(()) => Notice::success(format!("Saved {}", path.display())),
            Err(err) => Notice::error(format!("Export failed: {err}")),
        });
        result
    }
}

pub fn export_png(record: &DiagnosticRecord, path: &Path) -> io::Result<()> {
    if record.image.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "record has no heat-map image",
        ));
    }
    fs::write(path, &record.image[..])?;
    info!(scan_id = record.scan_id, "heat-map exported to {}", path.display());
    Ok(())
}

/// Export every entry into `dir`, returning the written paths in history order.
pub fn export_all(session: &Session, dir: &Path) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    entries(session)
        .map(|entry| {
            let path = dir.join(entry.file_name());
            export_png(entry.record, &path).map(|()| path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(scan_id: u64, serial: &str, image: Vec<u8>) -> DiagnosticRecord {
        DiagnosticRecord {
            scan_id,
            serial: serial.to_string(),
            soh: 88.5,
            soc: 64.25,
            image: Arc::from(image),
        }
    }

    #[test]
    fn entries_are_numbered_in_insertion_order() {
        let mut session = Session::default();
        for (i, sn) in ["A", "B", "C"].iter().enumerate() {
            session.append_history(record(i as u64, sn, vec![0]));
        }
        let got: Vec<(usize, String)> = entries(&session)
            .map(|e| (e.number, e.record.serial.clone()))
            .collect();
        assert_eq!(
            got,
            vec![(1, "A".into()), (2, "B".into()), (3, "C".into())]
        );
    }

    #[test]
    fn entry_texts() {
        let rec = record(1, "SN 7/a", vec![0]);
        let e = HistoryEntry {
            number: 2,
            record: &rec,
        };
        assert_eq!(e.heading(), "Battery 2 - SN 7/a");
        assert_eq!(e.summary(), "SoH: 88.5%, SoC: 64.25%");
        assert_eq!(e.file_name(), "battery_2_SN_7_a.png");

        let blank = record(1, "", vec![0]);
        let e = HistoryEntry {
            number: 1,
            record: &blank,
        };
        assert_eq!(e.file_name(), "battery_1.png");
    }

    #[test]
    fn empty_history_has_info_notice() {
        let session = Session::default();
        assert_eq!(entries(&session).count(), 0);
        assert_eq!(empty_notice().level, crate::pages::NoticeLevel::Info);
    }

    #[test]
    fn export_refuses_missing_image() {
        let rec = record(1, "X", Vec::new());
        let path = std::env::temp_dir().join("batscan_history_missing.png");
        let err = export_png(&rec, &path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
