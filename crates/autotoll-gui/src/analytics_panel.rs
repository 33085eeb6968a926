//! Analytics panel: polled revenue, traffic, and distribution datasets

use std::sync::mpsc::{channel, Receiver};
use std::time::Instant;

use autotoll_api::TollApi;
use autotoll_app::RefreshSchedule;
use autotoll_types::{AnalyticsReport, Result};
use eframe::egui::{self, Color32, RichText, Ui};
use tokio::runtime::Handle;

pub struct AnalyticsPanel {
    report: Option<AnalyticsReport>,
    error: Option<String>,
    loading: bool,
    report_rx: Option<Receiver<Result<AnalyticsReport>>>,
    schedule: RefreshSchedule,
}

impl AnalyticsPanel {
    pub fn new(poll_secs: u64) -> Self {
        Self {
            report: None,
            error: None,
            loading: false,
            report_rx: None,
            schedule: RefreshSchedule::every_secs(poll_secs.max(1)),
        }
    }

    pub fn ui(&mut self, ui: &mut Ui, handle: &Handle, api: &TollApi) {
        self.poll();
        self.maybe_fetch(handle, api);

        ui.horizontal(|ui| {
            ui.heading("Analytics");
            if self.loading {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.schedule.force();
                }
            });
        });
        ui.add_space(10.0);

        if let Some(ref error) = self.error {
            ui.label(RichText::new(error).color(Color32::LIGHT_RED));
            ui.add_space(5.0);
        }

        let Some(report) = self.report.clone() else {
            ui.label(RichText::new("Loading...").italics().color(Color32::GRAY));
            return;
        };

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.label(RichText::new("Totals").strong());
            ui.add_space(5.0);
            egui::Grid::new("analytics_totals")
                .num_columns(2)
                .spacing([20.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Vehicles:");
                    ui.label(format!("{}", report.summary.total_vehicles));
                    ui.end_row();

                    ui.label("Revenue:");
                    ui.label(
                        RichText::new(format!("{:.2}", report.summary.total_revenue))
                            .color(Color32::LIGHT_GREEN),
                    );
                    ui.end_row();

                    ui.label("Avg confidence:");
                    ui.label(format!("{:.0}%", report.summary.avg_confidence * 100.0));
                    ui.end_row();

                    ui.label("Pending review:");
                    ui.label(format!("{}", report.summary.pending_review));
                    ui.end_row();
                });

            if !report.vehicle_distribution.is_empty() {
                ui.add_space(15.0);
                ui.separator();
                ui.add_space(10.0);
                ui.label(RichText::new("Vehicle distribution").strong());
                ui.add_space(5.0);

                let total: u64 = report.vehicle_distribution.iter().map(|s| s.count).sum();
                for slice in &report.vehicle_distribution {
                    let fraction = if total > 0 {
                        slice.count as f32 / total as f32
                    } else {
                        0.0
                    };
                    ui.horizontal(|ui| {
                        ui.label(format!("{:<12}", slice.vehicle_type));
                        ui.add(
                            egui::ProgressBar::new(fraction)
                                .desired_width(240.0)
                                .text(format!("{}", slice.count)),
                        );
                    });
                }
            }

            if !report.revenue_trend.is_empty() {
                ui.add_space(15.0);
                ui.separator();
                ui.add_space(10.0);
                ui.label(RichText::new("Revenue trend").strong());
                ui.add_space(5.0);

                let peak = report
                    .revenue_trend
                    .iter()
                    .map(|p| p.revenue)
                    .fold(0.0_f64, f64::max);
                for point in &report.revenue_trend {
                    let fraction = if peak > 0.0 {
                        (point.revenue / peak) as f32
                    } else {
                        0.0
                    };
                    ui.horizontal(|ui| {
                        ui.label(format!("{:<12}", point.date));
                        ui.add(
                            egui::ProgressBar::new(fraction)
                                .desired_width(240.0)
                                .text(format!("{:.2}", point.revenue)),
                        );
                    });
                }
            }

            if !report.hourly_traffic.is_empty() {
                ui.add_space(15.0);
                ui.separator();
                ui.add_space(10.0);
                ui.label(RichText::new("Traffic by hour").strong());
                ui.add_space(5.0);

                let peak = report.hourly_traffic.iter().map(|p| p.count).max().unwrap_or(0);
                for point in &report.hourly_traffic {
                    let fraction = if peak > 0 {
                        point.count as f32 / peak as f32
                    } else {
                        0.0
                    };
                    ui.horizontal(|ui| {
                        ui.label(format!("{:>2}:00", point.hour));
                        ui.add(
                            egui::ProgressBar::new(fraction)
                                .desired_width(240.0)
                                .text(format!("{}", point.count)),
                        );
                    });
                }
            }
        });
    }

    fn poll(&mut self) {
        let Some(ref rx) = self.report_rx else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(report)) => {
                self.report = Some(report);
                self.error = None;
                self.loading = false;
                self.report_rx = None;
            }
            Ok(Err(e)) => {
                // Keep the last report on a failed poll
                log::warn!("analytics poll failed: {e}");
                self.error = Some(format!("Refresh failed: {}", e));
                self.loading = false;
                self.report_rx = None;
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {}
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.loading = false;
                self.report_rx = None;
            }
        }
    }

    fn maybe_fetch(&mut self, handle: &Handle, api: &TollApi) {
        let now = Instant::now();
        if self.report_rx.is_some() || !self.schedule.due(now) {
            return;
        }
        self.schedule.mark(now);
        self.loading = true;

        let (tx, rx) = channel();
        self.report_rx = Some(rx);
        let api = api.clone();
        handle.spawn(async move {
            let _ = tx.send(api.analytics().await);
        });
    }
}
