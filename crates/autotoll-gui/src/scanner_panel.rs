//! Scanner panel: capture selection, analysis, and result display

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::Instant;

use autotoll_api::TollApi;
use autotoll_app::{load_capture, CapturePayload, Config};
use autotoll_domain::promote;
use autotoll_types::{AnalysisResult, Result, TollRecord};
use chrono::Utc;
use eframe::egui::{self, Color32, RichText, Ui};
use tokio::runtime::Handle;

/// Panel for submitting captures to the recognizer
pub struct ScannerPanel {
    /// Selected capture file
    selected_path: Option<PathBuf>,
    /// Validated upload payload
    payload: Option<CapturePayload>,
    /// Latest recorded pass
    record: Option<TollRecord>,
    error: Option<String>,
    is_analyzing: bool,
    result_rx: Option<Receiver<Result<AnalysisResult>>>,
    start_time: Option<Instant>,
    /// A pass was recorded since the last check
    dirty: bool,
}

impl ScannerPanel {
    pub fn new() -> Self {
        Self {
            selected_path: None,
            payload: None,
            record: None,
            error: None,
            is_analyzing: false,
            result_rx: None,
            start_time: None,
            dirty: false,
        }
    }

    /// True once after a pass was recorded; used to refresh other views
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn ui(&mut self, ui: &mut Ui, handle: &Handle, api: &TollApi, config: &Config) {
        self.poll_status(config);

        ui.heading("Capture Scanner");
        ui.add_space(10.0);

        self.render_capture_selection(ui);

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        self.render_analyze_button(ui, handle, api);

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        self.render_result(ui);
        self.render_error(ui);
    }

    /// Poll the background analysis for completion
    fn poll_status(&mut self, config: &Config) {
        let Some(ref rx) = self.result_rx else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(result)) => {
                let timestamp = Utc::now().timestamp_millis();
                let preview = self
                    .payload
                    .as_ref()
                    .map(|p| p.preview.clone())
                    .unwrap_or_default();
                self.record = Some(promote(
                    &result,
                    &config.toll_rates,
                    timestamp.to_string(),
                    timestamp,
                    preview,
                ));
                self.is_analyzing = false;
                self.result_rx = None;
                self.start_time = None;
                self.dirty = true;
            }
            Ok(Err(e)) => {
                self.error = Some(format!("Analysis failed: {}", e));
                self.is_analyzing = false;
                self.result_rx = None;
                self.start_time = None;
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {}
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.error = Some("Analysis task ended unexpectedly".to_string());
                self.is_analyzing = false;
                self.result_rx = None;
                self.start_time = None;
            }
        }
    }

    fn render_capture_selection(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let enabled = !self.is_analyzing;
            if ui
                .add_enabled(enabled, egui::Button::new("Select capture..."))
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &["jpg", "jpeg", "png", "gif", "bmp", "webp"])
                    .pick_file()
                {
                    match load_capture(&path) {
                        Ok(payload) => {
                            self.selected_path = Some(path);
                            self.payload = Some(payload);
                            self.record = None;
                            self.error = None;
                        }
                        Err(e) => {
                            self.selected_path = Some(path);
                            self.payload = None;
                            self.error = Some(e.to_string());
                        }
                    }
                }
            }

            ui.add_space(10.0);

            if let Some(ref path) = self.selected_path {
                ui.label(
                    RichText::new(path.display().to_string())
                        .monospace()
                        .color(Color32::LIGHT_BLUE),
                );
            } else {
                ui.label(
                    RichText::new("No capture selected")
                        .italics()
                        .color(Color32::GRAY),
                );
            }
        });

        if let Some(ref payload) = self.payload {
            ui.add_space(5.0);
            ui.label(format!(
                "File: {} ({}, {} bytes)",
                payload.file_name,
                payload.mime,
                payload.bytes.len()
            ));
        }
    }

    fn render_analyze_button(&mut self, ui: &mut Ui, handle: &Handle, api: &TollApi) {
        let can_analyze = self.payload.is_some() && !self.is_analyzing;

        ui.horizontal(|ui| {
            let button_text = if self.is_analyzing {
                "Analyzing..."
            } else {
                "Analyze"
            };

            let button = egui::Button::new(RichText::new(button_text).size(16.0));
            if ui.add_enabled(can_analyze, button).clicked() {
                self.start_analysis(handle, api);
            }

            if self.is_analyzing {
                ui.spinner();
                if let Some(start) = self.start_time {
                    ui.label(format!("{:.1} s", start.elapsed().as_secs_f32()));
                }
            }
        });
    }

    /// Submit the capture on the runtime
    fn start_analysis(&mut self, handle: &Handle, api: &TollApi) {
        let Some(ref payload) = self.payload else {
            return;
        };

        self.is_analyzing = true;
        self.error = None;
        self.record = None;
        self.start_time = Some(Instant::now());

        let (tx, rx) = channel();
        self.result_rx = Some(rx);

        let api = api.clone();
        let file_name = payload.file_name.clone();
        let mime = payload.mime.clone();
        let bytes = payload.bytes.clone();

        handle.spawn(async move {
            let _ = tx.send(api.analyze(&file_name, &mime, bytes).await);
        });
    }

    fn render_result(&self, ui: &mut Ui) {
        ui.label(RichText::new("Last recorded pass").strong().size(14.0));
        ui.add_space(5.0);

        let Some(ref record) = self.record else {
            if !self.is_analyzing {
                ui.label(
                    RichText::new("Select a capture and press Analyze")
                        .italics()
                        .color(Color32::GRAY),
                );
            }
            return;
        };

        egui::Grid::new("scan_result_grid")
            .num_columns(2)
            .spacing([20.0, 8.0])
            .striped(true)
            .show(ui, |ui| {
                ui.label(RichText::new("Vehicle:").strong());
                ui.label(record.vehicle_type.label());
                ui.end_row();

                ui.label(RichText::new("Plate:").strong());
                ui.label(RichText::new(&record.license_plate).monospace());
                ui.end_row();

                ui.label(RichText::new("Toll:").strong());
                ui.label(
                    RichText::new(format!("{:.2}", record.toll_amount))
                        .color(Color32::LIGHT_GREEN)
                        .strong(),
                );
                ui.end_row();

                ui.label(RichText::new("Confidence:").strong());
                let pct = record.confidence * 100.0;
                let color = if pct >= 80.0 {
                    Color32::LIGHT_GREEN
                } else if pct >= 60.0 {
                    Color32::YELLOW
                } else {
                    Color32::LIGHT_RED
                };
                ui.label(RichText::new(format!("{:.1}%", pct)).color(color));
                ui.end_row();

                ui.label(RichText::new("Status:").strong());
                let (status_text, status_color) = if record.needs_review() {
                    ("manual review", Color32::YELLOW)
                } else {
                    ("processed", Color32::LIGHT_GREEN)
                };
                ui.label(RichText::new(status_text).color(status_color));
                ui.end_row();

                if !record.make_model.is_empty() {
                    ui.label(RichText::new("Make/model:").strong());
                    ui.label(&record.make_model);
                    ui.end_row();
                }

                if !record.color.is_empty() {
                    ui.label(RichText::new("Color:").strong());
                    ui.label(&record.color);
                    ui.end_row();
                }
            });

        if let Some(ref owner) = record.owner {
            ui.add_space(10.0);
            egui::Frame::new()
                .fill(Color32::from_gray(30))
                .inner_margin(8.0)
                .corner_radius(4.0)
                .show(ui, |ui| {
                    ui.label(RichText::new("Registered vehicle").color(Color32::LIGHT_GREEN));
                    ui.label(format!("Owner: {}", owner.name));
                    if !owner.info.is_empty() {
                        ui.label(format!("Contact: {}", owner.info));
                    }
                });
        }

        if !record.description.is_empty() {
            ui.add_space(10.0);
            egui::Frame::new()
                .fill(Color32::from_gray(40))
                .inner_margin(8.0)
                .corner_radius(4.0)
                .show(ui, |ui| {
                    ui.label(&record.description);
                });
        }
    }

    fn render_error(&self, ui: &mut Ui) {
        if let Some(ref error) = self.error {
            ui.add_space(10.0);
            egui::Frame::new()
                .fill(Color32::from_rgb(80, 20, 20))
                .inner_margin(8.0)
                .corner_radius(4.0)
                .show(ui, |ui| {
                    ui.label(RichText::new(error).color(Color32::LIGHT_RED));
                });
        }
    }
}

impl Default for ScannerPanel {
    fn default() -> Self {
        Self::new()
    }
}
