use egui::epaint::ColorImage;
use egui::{Color32, Rect, Sense, TextureOptions, Ui, Vec2, pos2};
use egui_plot::{Line, Plot, PlotImage, PlotPoint, PlotPoints};

use crate::core::heatmap::hot;
use crate::core::scan::{ElementFrame, ScanMatrix};
use crate::ui::viewdata::{HeatmapTexture, heatmap_pixels};

/// Waveform of one scan element.
pub fn element_trace_plot(ui: &mut Ui, frame: &ElementFrame) {
    let points: PlotPoints = frame
        .trace
        .time
        .iter()
        .zip(frame.trace.amplitude.iter())
        .map(|(t, a)| [*t, *a])
        .collect();
    let line = Line::new("amplitude", points);

    ui.vertical(|ui| {
        ui.label(frame.title());

        Plot::new("element_trace")
            .height(220.0)
            .allow_scroll(false)
            .allow_drag(false)
            .allow_zoom(false)
            .include_x(0.0)
            .include_x(1.0)
            .include_y(-1.8)
            .include_y(1.8)
            .x_axis_label("Time [s]")
            .y_axis_label("Amplitude")
            .x_axis_formatter(|mark, _| format!("{:.1}", mark.value))
            .y_axis_formatter(|mark, _| format!("{:.2}", mark.value))
            .show(ui, |plot_ui| {
                plot_ui.line(line);
            });
    });
}

/// Scan matrix as an image plot, row 0 at the top.
pub fn scan_heatmap(
    ui: &mut Ui,
    scan_id: u64,
    matrix: &ScanMatrix,
    tex: &mut Option<HeatmapTexture>,
) {
    let (nx, ny) = (matrix.cols(), matrix.rows());
    if nx == 0 || ny == 0 {
        ui.label("Scan matrix is empty.");
        return;
    }

    if tex.as_ref().map(|t| t.scan_id) != Some(scan_id) {
        let img = ColorImage::new([nx, ny], heatmap_pixels(matrix));
        let handle = ui
            .ctx()
            .load_texture("scan_heatmap", img, TextureOptions::NEAREST);
        *tex = Some(HeatmapTexture { scan_id, handle });
    }
    let Some(texture) = tex.as_ref() else {
        return;
    };

    let (w, h) = (nx as f32, ny as f32);
    Plot::new("scan_heatmap_plot")
        .height(240.0)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_drag(false)
        .show_grid(false)
        .show_axes(false)
        .include_x(0.0)
        .include_x(w as f64)
        .include_y(0.0)
        .include_y(h as f64)
        .show(ui, |plot_ui| {
            let img = PlotImage::new(
                "scan_img",
                texture.handle.id(),
                PlotPoint::new(w * 0.5, h * 0.5),
                Vec2::new(w, h),
            );
            plot_ui.image(img);
        });
}

/// Horizontal colour bar for the "hot" map with the value range underneath.
pub fn colorbar(ui: &mut Ui, lo: f64, hi: f64, label: &str) {
    const STEPS: usize = 64;
    let width = ui.available_width().min(360.0);
    let (rect, _) = ui.allocate_exact_size(Vec2::new(width, 14.0), Sense::hover());
    let painter = ui.painter_at(rect);
    let seg = rect.width() / STEPS as f32;
    for i in 0..STEPS {
        let [r, g, b] = hot(i as f64 / (STEPS - 1) as f64);
        let x0 = rect.left() + seg * i as f32;
        let seg_rect = Rect::from_min_max(pos2(x0, rect.top()), pos2(x0 + seg + 0.5, rect.bottom()));
        painter.rect_filled(seg_rect, 0.0, Color32::from_rgb(r, g, b));
    }
    ui.horizontal(|ui| {
        ui.small(format!("{lo:.2}"));
        ui.label(label);
        ui.small(format!("{hi:.2}"));
    });
}
