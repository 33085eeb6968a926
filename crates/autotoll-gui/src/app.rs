//! Main application structure with view navigation

use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

use autotoll_api::TollApi;
use autotoll_app::{Config, RefreshSchedule};
use autotoll_types::{Result, Summary};
use eframe::egui::{self, Color32, RichText};
use tokio::runtime::Runtime;

use crate::analytics_panel::AnalyticsPanel;
use crate::history_panel::HistoryPanel;
use crate::registry_panel::RegistryPanel;
use crate::review_panel::ReviewPanel;
use crate::scanner_panel::ScannerPanel;
use crate::settings_panel::SettingsPanel;

/// Application view selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Scanner,
    History,
    Review,
    Registry,
    Analytics,
    Settings,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Scanner => "Scanner",
            View::History => "History",
            View::Review => "Review",
            View::Registry => "Registry",
            View::Analytics => "Analytics",
            View::Settings => "Settings",
        }
    }
}

/// Main application state
pub struct AutotollApp {
    /// Currently selected view
    current_view: View,
    /// Async runtime for backend calls
    runtime: Runtime,
    /// Backend client
    api: TollApi,
    /// Application configuration
    config: Config,
    /// Header summary snapshot
    summary: Summary,
    summary_schedule: RefreshSchedule,
    summary_rx: Option<Receiver<Result<Summary>>>,
    scanner_panel: ScannerPanel,
    history_panel: HistoryPanel,
    review_panel: ReviewPanel,
    registry_panel: RegistryPanel,
    analytics_panel: AnalyticsPanel,
    settings_panel: SettingsPanel,
}

impl AutotollApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.interaction.tooltip_delay = 0.5;
        style.animation_time = 0.1;
        cc.egui_ctx.set_style(style);

        let config = Config::load().unwrap_or_default();
        let api = TollApi::new(config.base_url.clone());

        let runtime = Runtime::new().expect("Failed to start async runtime");

        let settings_panel = SettingsPanel::new(&config);
        let history_panel = HistoryPanel::new(config.history_poll_secs);
        let review_panel = ReviewPanel::new(config.history_poll_secs);
        let analytics_panel = AnalyticsPanel::new(config.analytics_poll_secs);

        Self {
            current_view: View::default(),
            runtime,
            api,
            config,
            summary: Summary::default(),
            summary_schedule: RefreshSchedule::every_secs(5),
            summary_rx: None,
            scanner_panel: ScannerPanel::new(),
            history_panel,
            review_panel,
            registry_panel: RegistryPanel::new(),
            analytics_panel,
            settings_panel,
        }
    }

    /// Poll the header summary fetch
    fn poll_summary(&mut self) {
        let now = Instant::now();

        if let Some(ref rx) = self.summary_rx {
            match rx.try_recv() {
                Ok(Ok(summary)) => {
                    self.summary = summary;
                    self.summary_rx = None;
                }
                Ok(Err(e)) => {
                    // Keep the last snapshot on a failed poll
                    log::warn!("summary poll failed: {e}");
                    self.summary_rx = None;
                }
                Err(std::sync::mpsc::TryRecvError::Empty) => {}
                Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                    self.summary_rx = None;
                }
            }
        }

        if self.summary_rx.is_none() && self.summary_schedule.due(now) {
            self.summary_schedule.mark(now);
            let (tx, rx) = channel();
            self.summary_rx = Some(rx);
            let api = self.api.clone();
            self.runtime.handle().spawn(async move {
                let _ = tx.send(api.summary().await);
            });
        }
    }

    /// Render the view bar and summary strip
    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;

            for view in [
                View::Scanner,
                View::History,
                View::Review,
                View::Registry,
                View::Analytics,
                View::Settings,
            ] {
                let selected = self.current_view == view;
                let mut label = view.label().to_string();
                if view == View::Review && self.summary.pending_review > 0 {
                    label = format!("{} ({})", label, self.summary.pending_review);
                }
                if ui.selectable_label(selected, label).clicked() {
                    self.current_view = view;
                }
                ui.add_space(8.0);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(format!(
                        "vehicles {}  |  revenue {:.2}  |  pending {}",
                        self.summary.total_vehicles,
                        self.summary.total_revenue,
                        self.summary.pending_review,
                    ))
                    .color(Color32::GRAY)
                    .small(),
                );
            });
        });
    }
}

impl eframe::App for AutotollApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_summary();

        egui::TopBottomPanel::top("view_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_header(ui);
            ui.add_space(4.0);
        });

        let handle = self.runtime.handle().clone();

        egui::CentralPanel::default().show(ctx, |ui| match self.current_view {
            View::Scanner => {
                self.scanner_panel.ui(ui, &handle, &self.api, &self.config);
                if self.scanner_panel.take_dirty() {
                    self.summary_schedule.force();
                    self.history_panel.force_refresh();
                    self.review_panel.force_refresh();
                }
            }
            View::History => {
                self.history_panel.ui(ui, &handle, &self.api);
            }
            View::Review => {
                self.review_panel.ui(ui, &handle, &self.api);
                if self.review_panel.take_dirty() {
                    self.summary_schedule.force();
                    self.history_panel.force_refresh();
                }
            }
            View::Registry => {
                self.registry_panel.ui(ui, &handle, &self.api);
            }
            View::Analytics => {
                self.analytics_panel.ui(ui, &handle, &self.api);
            }
            View::Settings => {
                if self.settings_panel.ui(ui, &mut self.config) {
                    // Base URL changed, point the client at the new backend
                    self.api = TollApi::new(self.config.base_url.clone());
                    self.summary_schedule.force();
                    self.history_panel.force_refresh();
                    self.review_panel.force_refresh();
                }
            }
        });

        // Keep poll schedules ticking while the window is open
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}
