//! Review panel: manual correction queue for low-confidence passes

use std::sync::mpsc::{channel, Receiver};
use std::time::Instant;

use autotoll_api::TollApi;
use autotoll_app::{RefreshSchedule, ReviewQueue};
use autotoll_domain::reconcile_all;
use autotoll_types::{Error, RawDetection, Result, TollRecord, VehicleType};
use chrono::Utc;
use eframe::egui::{self, Color32, RichText, Ui};
use tokio::runtime::Handle;

/// An in-flight confirm or discard for one record
struct PendingAction {
    id: String,
    rx: Receiver<Result<()>>,
}

pub struct ReviewPanel {
    queue: ReviewQueue,
    schedule: RefreshSchedule,
    rows_rx: Option<Receiver<Result<Vec<RawDetection>>>>,
    actions: Vec<PendingAction>,
    error: Option<String>,
    /// Record id awaiting a second discard click
    confirm_discard: Option<String>,
    dirty: bool,
    loading: bool,
    loaded_once: bool,
}

impl ReviewPanel {
    pub fn new(poll_secs: u64) -> Self {
        Self {
            queue: ReviewQueue::default(),
            schedule: RefreshSchedule::every_secs(poll_secs.max(1)),
            rows_rx: None,
            actions: Vec::new(),
            error: None,
            confirm_discard: None,
            dirty: false,
            loading: false,
            loaded_once: false,
        }
    }

    /// True once after a record was confirmed or discarded
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn force_refresh(&mut self) {
        self.schedule.force();
    }

    pub fn ui(&mut self, ui: &mut Ui, handle: &Handle, api: &TollApi) {
        self.poll(api);
        self.maybe_fetch(handle, api);

        ui.horizontal(|ui| {
            ui.heading("Review Queue");
            if self.loading {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.schedule.force();
                }
                ui.label(format!("{} waiting", self.queue.len()));
            });
        });
        ui.add_space(10.0);

        if let Some(ref error) = self.error {
            egui::Frame::new()
                .fill(Color32::from_rgb(80, 20, 20))
                .inner_margin(8.0)
                .corner_radius(4.0)
                .show(ui, |ui| {
                    ui.label(RichText::new(error).color(Color32::LIGHT_RED));
                });
            ui.add_space(5.0);
        }

        if self.queue.is_empty() {
            let message = if self.loaded_once {
                "Nothing waiting for review."
            } else {
                "Loading..."
            };
            ui.label(RichText::new(message).italics().color(Color32::GRAY));
            return;
        }

        let records: Vec<TollRecord> = self.queue.items().to_vec();
        egui::ScrollArea::vertical().show(ui, |ui| {
            for record in &records {
                self.render_row(ui, handle, api, record);
                ui.add_space(6.0);
                ui.separator();
                ui.add_space(6.0);
            }
        });
    }

    fn render_row(&mut self, ui: &mut Ui, handle: &Handle, api: &TollApi, record: &TollRecord) {
        let busy = self.queue.is_busy(&record.id);
        let mut confirm_clicked = false;
        let mut discard_clicked = false;
        let mut discard_confirmed = false;
        let mut discard_cancelled = false;
        let awaiting_discard = self.confirm_discard.as_deref() == Some(record.id.as_str());

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(
                    RichText::new(format!("#{}  {}", record.id, record.license_plate))
                        .monospace()
                        .strong(),
                );
                ui.label(
                    RichText::new(format!("confidence {:.0}%", record.confidence * 100.0))
                        .color(Color32::YELLOW)
                        .small(),
                );
                if !record.make_model.is_empty() {
                    ui.label(RichText::new(&record.make_model).small());
                }
            });

            ui.add_space(16.0);

            let Some(draft) = self.queue.draft_mut(&record.id) else {
                return;
            };

            ui.label("Type:");
            egui::ComboBox::from_id_salt(format!("review_type_{}", record.id))
                .selected_text(draft.vehicle_type.label())
                .show_ui(ui, |ui| {
                    for vehicle_type in VehicleType::ALL {
                        ui.selectable_value(
                            &mut draft.vehicle_type,
                            vehicle_type,
                            vehicle_type.label(),
                        );
                    }
                });

            ui.add_space(8.0);
            ui.label("Toll:");
            ui.add(
                egui::TextEdit::singleline(&mut draft.toll_text)
                    .desired_width(70.0)
                    .interactive(!busy),
            );

            ui.add_space(12.0);

            if busy {
                ui.spinner();
            } else if awaiting_discard {
                ui.label(RichText::new("Discard permanently?").color(Color32::YELLOW));
                if ui.button(RichText::new("Yes, discard").color(Color32::LIGHT_RED)).clicked() {
                    discard_confirmed = true;
                }
                if ui.button("Cancel").clicked() {
                    discard_cancelled = true;
                }
            } else {
                if ui.button("Confirm").clicked() {
                    confirm_clicked = true;
                }
                if ui.button("Discard").clicked() {
                    discard_clicked = true;
                }
            }
        });

        if discard_clicked {
            self.confirm_discard = Some(record.id.clone());
        }
        if discard_cancelled {
            self.confirm_discard = None;
        }

        if confirm_clicked {
            match self.queue.begin(&record.id) {
                Ok((vehicle_type, toll)) => {
                    self.error = None;
                    self.start_confirm(handle, api, &record.id, vehicle_type, toll);
                }
                Err(e) => self.error = Some(e),
            }
        }

        if discard_confirmed {
            self.confirm_discard = None;
            match self.queue.begin_discard(&record.id) {
                Ok(()) => {
                    self.error = None;
                    self.start_discard(handle, api, &record.id);
                }
                Err(e) => self.error = Some(e),
            }
        }
    }

    fn start_confirm(
        &mut self,
        handle: &Handle,
        api: &TollApi,
        id: &str,
        vehicle_type: VehicleType,
        toll: f64,
    ) {
        let Ok(detection_id) = id.parse::<i64>() else {
            self.queue.settle(id, false);
            self.error = Some(format!("record {id} has no backend id"));
            return;
        };

        let (tx, rx) = channel();
        self.actions.push(PendingAction {
            id: id.to_string(),
            rx,
        });
        let api = api.clone();
        handle.spawn(async move {
            let _ = tx.send(api.confirm_detection(detection_id, vehicle_type, toll).await);
        });
    }

    fn start_discard(&mut self, handle: &Handle, api: &TollApi, id: &str) {
        let Ok(detection_id) = id.parse::<i64>() else {
            self.queue.settle(id, false);
            self.error = Some(format!("record {id} has no backend id"));
            return;
        };

        let (tx, rx) = channel();
        self.actions.push(PendingAction {
            id: id.to_string(),
            rx,
        });
        let api = api.clone();
        handle.spawn(async move {
            let _ = tx.send(api.delete_detection(detection_id).await);
        });
    }

    fn poll(&mut self, api: &TollApi) {
        // Queue reload
        if let Some(ref rx) = self.rows_rx {
            match rx.try_recv() {
                Ok(Ok(rows)) => {
                    let now = Utc::now().timestamp_millis();
                    self.queue.replace(reconcile_all(&rows, api.base_url(), now));
                    self.loading = false;
                    self.loaded_once = true;
                    self.rows_rx = None;
                }
                Ok(Err(e)) => {
                    log::warn!("review queue poll failed: {e}");
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

        // In-flight confirms and discards
        let mut finished: Vec<(String, Result<()>)> = Vec::new();
        self.actions.retain(|action| match action.rx.try_recv() {
            Ok(outcome) => {
                finished.push((action.id.clone(), outcome));
                false
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => true,
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                finished.push((
                    action.id.clone(),
                    Err(Error::AnalysisFailed("submission task ended unexpectedly".to_string())),
                ));
                false
            }
        });

        for (id, outcome) in finished {
            match outcome {
                Ok(()) => {
                    self.queue.settle(&id, true);
                    self.dirty = true;
                    self.schedule.force();
                }
                Err(e) => {
                    self.queue.settle(&id, false);
                    self.error = Some(format!("Submission for #{id} failed: {e}"));
                }
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
            let _ = tx.send(api.review_queue().await);
        });
    }
}
