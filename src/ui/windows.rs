use std::path::PathBuf;

use egui::{Align, CentralPanel, Color32, Layout, RichText, ScrollArea, SidePanel, TopBottomPanel, Ui, Vec2};

use crate::pages::diagnosis::DiagnosisPage;
use crate::pages::history::{self, HistoryPage};
use crate::pages::login::LoginPage;
use crate::pages::{Notice, NoticeLevel, Transition};
use crate::router::Router;
use crate::session::{Page, Session};
use crate::ui::plots::{colorbar, element_trace_plot, scan_heatmap};
use crate::ui::viewdata::{HeatmapTexture, ResultView};

fn level_color(level: NoticeLevel) -> Color32 {
    match level {
        NoticeLevel::Info => Color32::LIGHT_BLUE,
        NoticeLevel::Success => Color32::LIGHT_GREEN,
        NoticeLevel::Warning => Color32::YELLOW,
        NoticeLevel::Error => Color32::LIGHT_RED,
    }
}

pub fn notice(ui: &mut Ui, n: &Notice) {
    ui.colored_label(level_color(n.level), &n.text);
}

pub fn top_bar(ctx: &egui::Context) {
    TopBottomPanel::top("top").show(ctx, |ui| {
        ui.heading("Battery Ultrasound Diagnosis");
    });
}

/// Sidebar menu. Selections are queued on the router; `locked` disables them.
pub fn sidebar(ctx: &egui::Context, router: &mut Router, locked: bool) {
    SidePanel::left("menu")
        .resizable(false)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.heading("Menu");
            ui.separator();
            if !router.is_authenticated() {
                notice(ui, &Notice::info("Available after login."));
                return;
            }

            let session = router.session();
            ui.label(format!("Signed in as {}", session.username));
            let current = session.nav_selection;
            let mut selection = current;
            ui.add_enabled_ui(!locked, |ui| {
                ui.label("Go to page");
                for page in Page::NAVIGABLE {
                    ui.radio_value(&mut selection, page, page.label());
                }
            });
            if selection != current {
                router.navigate(selection);
            }
        });
}

pub fn login_page(ctx: &egui::Context, page: &mut LoginPage, session: &mut Session) -> Transition {
    let mut transition = Transition::Stay;
    CentralPanel::default().show(ctx, |ui| {
        ui.heading("Login");
        ui.add_space(8.0);
        ui.label("Username");
        ui.text_edit_singleline(&mut page.username);
        ui.label("Password");
        let pw = ui.add(egui::TextEdit::singleline(&mut page.password).password(true));
        let enter = pw.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        ui.add_space(8.0);
        if ui.button("Log in").clicked() || enter {
            if let Ok(t) = page.submit(session) {
                transition = t;
            }
        }
        if let Some(n) = &page.notice {
            notice(ui, n);
        }
    });
    transition
}

fn dropped_paths(ctx: &egui::Context) -> Vec<PathBuf> {
    ctx.input(|i| {
        i.raw
            .dropped_files
            .iter()
            .filter_map(|f| f.path.clone())
            .collect()
    })
}

fn upload_controls(ui: &mut Ui, page: &mut DiagnosisPage, enabled: bool) {
    let ext = page.upload_extension().to_string();
    ui.label(RichText::new("Bit file upload").strong());
    ui.add_enabled_ui(enabled, |ui| {
        if ui.button(format!("Browse .{ext} file…")).clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Select bit file")
                .add_filter("Bit file", &[ext.as_str()])
                .pick_file()
            {
                page.offer_upload(&path);
            }
        }
    });
    match &page.upload {
        Some(file) => ui.small(format!("📄 {}", file.name)),
        None => ui.small(format!("or drop a .{ext} file here")),
    };
    ui.add_space(8.0);
    ui.label(RichText::new("Battery serial number").strong());
    ui.add_enabled(enabled, egui::TextEdit::singleline(&mut page.serial));
}

pub fn diagnosis_page(
    ctx: &egui::Context,
    page: &mut DiagnosisPage,
    session: &mut Session,
    tex: &mut Option<HeatmapTexture>,
) -> Transition {
    let acquiring = page.is_acquiring();
    if !acquiring {
        for path in dropped_paths(ctx) {
            page.offer_upload(&path);
        }
    }

    let mut transition = Transition::Stay;
    CentralPanel::default().show(ctx, |ui| {
        ui.heading(Page::Diagnosis.label());
        ui.label(RichText::new("Upload a bit file, then start the measurement").strong());
        ui.separator();

        let avail = ui.available_width();
        ui.horizontal_top(|ui| {
            ui.allocate_ui_with_layout(
                Vec2::new(avail * 0.62, 0.0),
                Layout::top_down(Align::LEFT),
                |ui| {
                    if let Some((done, total)) = page.progress() {
                        ui.add(
                            egui::ProgressBar::new(done as f32 / total.max(1) as f32)
                                .text(format!("Acquiring {done}/{total}")),
                        );
                    }
                    match page.report() {
                        Some(report) if !acquiring => {
                            ui.label(RichText::new("Ultrasound Image").strong());
                            scan_heatmap(ui, report.scan_id, &report.matrix, tex);
                            if let Some((lo, hi)) = report.matrix.min_max() {
                                colorbar(ui, lo, hi, "Signal Intensity");
                            }
                        }
                        _ => {
                            if let Some(frame) = page.live_frame() {
                                element_trace_plot(ui, frame);
                            }
                        }
                    }
                },
            );
            ui.separator();
            ui.vertical(|ui| upload_controls(ui, page, !acquiring));
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!acquiring, egui::Button::new("Start acquisition"))
                .clicked()
            {
                page.start_acquisition(std::time::Instant::now());
            }
            if ui
                .add_enabled(!acquiring, egui::Button::new("Save result"))
                .clicked()
            {
                if let Ok(t) = page.save(session) {
                    transition = t;
                }
            }
        });

        if let Some(report) = page.report().filter(|_| !acquiring) {
            let view = ResultView::from_report(report);
            ui.add_space(8.0);
            ui.heading("Diagnosis Result");
            ui.label(RichText::new(view.soh_text).monospace());
            ui.label(RichText::new(view.soc_text).monospace());
            ui.colored_label(level_color(view.verdict_level), view.verdict_text);
        }
        if let Some(n) = &page.notice {
            notice(ui, n);
        }
    });
    transition
}

pub fn history_page(ctx: &egui::Context, page: &mut HistoryPage, session: &Session) -> Transition {
    CentralPanel::default().show(ctx, |ui| {
        ui.heading(Page::History.label());
        if let Some(n) = &page.notice {
            notice(ui, n);
        }
        ui.separator();
        if session.history().is_empty() {
            notice(ui, &history::empty_notice());
            return;
        }
        ScrollArea::vertical().show(ui, |ui| {
            for entry in history::entries(session) {
                ui.label(RichText::new(entry.heading()).heading());
                ui.label(RichText::new(format!("- {}", entry.summary())).monospace());
                let rec = entry.record;
                if rec.image.is_empty() {
                    ui.small("Image unavailable.");
                } else {
                    ui.add(
                        egui::Image::from_bytes(
                            format!("bytes://scan-{}.png", rec.scan_id),
                            rec.image.clone(),
                        )
                        .max_width(ui.available_width().min(560.0)),
                    );
                    ui.horizontal(|ui| {
                        ui.small("C-mode Image");
                        if ui.small_button("Export PNG…").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .set_file_name(entry.file_name())
                                .add_filter("PNG image", &["png"])
                                .save_file()
                            {
                                let _ = page.export(&entry, &path);
                            }
                        }
                    });
                }
                ui.separator();
            }
        });
    });
    Transition::Stay
}
