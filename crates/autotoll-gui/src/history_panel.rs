//! History panel: polled list of recent toll passes

use std::sync::mpsc::{channel, Receiver};
use std::time::Instant;

use autotoll_api::TollApi;
use autotoll_app::RefreshSchedule;
use autotoll_domain::reconcile_all;
use autotoll_types::{RawDetection, Result, TollRecord};
use chrono::{DateTime, Utc};
use eframe::egui::{self, Color32, RichText, Ui};
use tokio::runtime::Handle;

pub struct HistoryPanel {
    records: Vec<TollRecord>,
    error: Option<String>,
    loading: bool,
    rows_rx: Option<Receiver<Result<Vec<RawDetection>>>>,
    schedule: RefreshSchedule,
    /// Show only records awaiting review
    review_only: bool,
    /// Set after the first successful fetch
    loaded_once: bool,
}

impl HistoryPanel {
    pub fn new(poll_secs: u64) -> Self {
        Self {
            records: Vec::new(),
            error: None,
            loading: false,
            rows_rx: None,
            schedule: RefreshSchedule::every_secs(poll_secs.max(1)),
            review_only: false,
            loaded_once: false,
        }
    }

    /// Fetch again on the next frame regardless of the poll period
    pub fn force_refresh(&mut self) {
        self.schedule.force();
    }

    pub fn ui(&mut self, ui: &mut Ui, handle: &Handle, api: &TollApi) {
        self.poll(api);
        self.maybe_fetch(handle, api);

        ui.horizontal(|ui| {
            ui.heading("Toll Passes");
            if self.loading {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.schedule.force();
                }
                ui.checkbox(&mut self.review_only, "Needs review only");
            });
        });
        ui.add_space(10.0);

        if let Some(ref error) = self.error {
            ui.label(RichText::new(error).color(Color32::LIGHT_RED));
            ui.add_space(5.0);
        }

        let shown: Vec<&TollRecord> = self
            .records
            .iter()
            .filter(|r| !self.review_only || r.needs_review())
            .collect();

        if shown.is_empty() {
            let message = if self.loaded_once {
                "No passes recorded."
            } else {
                "Loading..."
            };
            ui.label(RichText::new(message).italics().color(Color32::GRAY));
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("history_grid")
                .num_columns(7)
                .spacing([16.0, 6.0])
                .striped(true)
                .show(ui, |ui| {
                    ui.label(RichText::new("ID").underline());
                    ui.label(RichText::new("Time").underline());
                    ui.label(RichText::new("Vehicle").underline());
                    ui.label(RichText::new("Plate").underline());
                    ui.label(RichText::new("Conf").underline());
                    ui.label(RichText::new("Toll").underline());
                    ui.label(RichText::new("Status").underline());
                    ui.end_row();

                    for record in shown {
                        ui.label(&record.id);
                        ui.label(format_time(record.timestamp_ms));
                        ui.label(record.vehicle_type.label());
                        ui.label(RichText::new(&record.license_plate).monospace());
                        ui.label(format!("{:.0}%", record.confidence * 100.0));
                        ui.label(format!("{:.2}", record.toll_amount));
                        if record.needs_review() {
                            ui.label(RichText::new("review").color(Color32::YELLOW));
                        } else {
                            ui.label(RichText::new("processed").color(Color32::LIGHT_GREEN));
                        }
                        ui.end_row();
                    }
                });
        });
    }

    fn poll(&mut self, api: &TollApi) {
        let Some(ref rx) = self.rows_rx else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(rows)) => {
                let now = Utc::now().timestamp_millis();
                self.records = reconcile_all(&rows, api.base_url(), now);
                self.error = None;
                self.loading = false;
                self.loaded_once = true;
                self.rows_rx = None;
            }
            Ok(Err(e)) => {
                // Keep the last list on a failed poll
                log::warn!("history poll failed: {e}");
                self.error = Some(format!("Refresh failed: {}", e));
                self.loading = false;
                self.rows_rx = None;
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {}
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.loading = false;
                self.rows_rx = None;
            }
        }
    }

    fn maybe_fetch(&mut self, handle: &Handle, api: &TollApi) {
        let now = Instant::now();
        if self.rows_rx.is_some() || !self.schedule.due(now) {
            return;
        }
        self.schedule.mark(now);
        self.loading = true;

        let (tx, rx) = channel();
        self.rows_rx = Some(rx);
        let api = api.clone();
        handle.spawn(async move {
            let _ = tx.send(api.history().await);
        });
    }
}

fn format_time(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
