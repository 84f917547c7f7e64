use std::time::Instant;

use crate::config::AppConfig;
use crate::pages::Transition;
use crate::pages::diagnosis::DiagnosisPage;
use crate::pages::history::HistoryPage;
use crate::pages::login::LoginPage;
use crate::router::Router;
use crate::session::Page;
use crate::ui::viewdata::HeatmapTexture;
use crate::ui::windows;

pub struct App {
    router: Router,
    login: LoginPage,
    diagnosis: DiagnosisPage,
    history: HistoryPage,
    heatmap_tex: Option<HeatmapTexture>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, cfg: &AppConfig) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        cc.egui_ctx.set_pixels_per_point(1.25);

        Self {
            router: Router::new(),
            login: LoginPage::default(),
            diagnosis: DiagnosisPage::new(cfg),
            history: HistoryPage::default(),
            heatmap_tex: None,
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // One scan element per frame at most; the rest of the frame shows it.
        self.diagnosis.poll(self.router.session(), now);

        let page = self.router.begin_cycle();
        windows::top_bar(ctx);
        windows::sidebar(ctx, &mut self.router, self.diagnosis.is_acquiring());

        let transition = match page {
            Page::Login => windows::login_page(ctx, &mut self.login, self.router.session()),
            Page::Diagnosis => windows::diagnosis_page(
                ctx,
                &mut self.diagnosis,
                self.router.session(),
                &mut self.heatmap_tex,
            ),
            Page::History => windows::history_page(ctx, &mut self.history, self.router.session()),
        };
        self.router.apply(transition);

        if transition != Transition::Stay || self.router.has_pending() {
            ctx.request_repaint();
        }
        if let Some(wait) = self.diagnosis.time_until_due(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}
