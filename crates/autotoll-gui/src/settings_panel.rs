//! Settings panel: backend address and toll rate schedule

use autotoll_app::Config;
use autotoll_domain::TollTable;
use autotoll_types::VehicleType;
use eframe::egui::{self, Color32, RichText, Ui};

/// Settings panel
pub struct SettingsPanel {
    base_url_input: String,
    /// Editable rate text per vehicle type
    rate_inputs: Vec<(VehicleType, String)>,
    history_poll_input: String,
    analytics_poll_input: String,
    /// Whether config was modified
    modified: bool,
    /// Status message (message, is_error)
    status_message: Option<(String, bool)>,
}

impl SettingsPanel {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url_input: config.base_url.clone(),
            rate_inputs: rate_inputs_from(&config.toll_rates),
            history_poll_input: config.history_poll_secs.to_string(),
            analytics_poll_input: config.analytics_poll_secs.to_string(),
            modified: false,
            status_message: None,
        }
    }

    /// Returns true when the backend address changed and the client
    /// should be rebuilt.
    pub fn ui(&mut self, ui: &mut Ui, config: &mut Config) -> bool {
        let mut base_url_changed = false;

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Settings");
            ui.add_space(10.0);

            ui.label(RichText::new("Backend").strong());
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.label("Base URL:");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.base_url_input).desired_width(280.0),
                );
                if response.changed() {
                    self.modified = true;
                }
            });

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(15.0);

            ui.label(RichText::new("Toll rates").strong());
            ui.add_space(5.0);
            egui::Grid::new("rate_grid")
                .num_columns(2)
                .spacing([16.0, 6.0])
                .show(ui, |ui| {
                    for (vehicle_type, input) in &mut self.rate_inputs {
                        ui.label(vehicle_type.label());
                        let response =
                            ui.add(egui::TextEdit::singleline(input).desired_width(80.0));
                        if response.changed() {
                            self.modified = true;
                        }
                        ui.end_row();
                    }
                });

            ui.add_space(8.0);
            if ui.button("Restore default rates").clicked() {
                self.rate_inputs = rate_inputs_from(&TollTable::default());
                self.modified = true;
            }

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(15.0);

            ui.label(RichText::new("Polling").strong());
            ui.add_space(5.0);
            egui::Grid::new("poll_grid")
                .num_columns(3)
                .spacing([16.0, 6.0])
                .show(ui, |ui| {
                    ui.label("History/summary:");
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.history_poll_input)
                            .desired_width(60.0),
                    );
                    if response.changed() {
                        self.modified = true;
                    }
                    ui.label("seconds");
                    ui.end_row();

                    ui.label("Analytics:");
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.analytics_poll_input)
                            .desired_width(60.0),
                    );
                    if response.changed() {
                        self.modified = true;
                    }
                    ui.label("seconds");
                    ui.end_row();
                });

            ui.add_space(20.0);

            ui.horizontal(|ui| {
                let save_enabled = self.modified;
                if ui
                    .add_enabled(save_enabled, egui::Button::new(RichText::new("Save").size(16.0)))
                    .clicked()
                {
                    base_url_changed = self.save_config(config);
                }

                if ui.button("Revert").clicked() {
                    self.base_url_input = config.base_url.clone();
                    self.rate_inputs = rate_inputs_from(&config.toll_rates);
                    self.history_poll_input = config.history_poll_secs.to_string();
                    self.analytics_poll_input = config.analytics_poll_secs.to_string();
                    self.modified = false;
                    self.status_message = None;
                }

                if self.modified {
                    ui.label(RichText::new("* unsaved changes").color(Color32::YELLOW));
                }
            });

            if let Some((ref message, is_error)) = self.status_message {
                ui.add_space(10.0);
                let color = if is_error {
                    Color32::LIGHT_RED
                } else {
                    Color32::LIGHT_GREEN
                };
                ui.label(RichText::new(message).color(color));
            }
        });

        base_url_changed
    }

    fn save_config(&mut self, config: &mut Config) -> bool {
        // Validate rate inputs before touching the config
        let mut parsed_rates: Vec<(VehicleType, f64)> = Vec::new();
        for (vehicle_type, input) in &self.rate_inputs {
            match input.trim().parse::<f64>() {
                Ok(rate) if rate >= 0.0 => parsed_rates.push((*vehicle_type, rate)),
                _ => {
                    self.status_message = Some((
                        format!("Invalid rate for {}: '{}'", vehicle_type.label(), input),
                        true,
                    ));
                    return false;
                }
            }
        }

        let history_poll = match self.history_poll_input.trim().parse::<u64>() {
            Ok(secs) if secs >= 1 => secs,
            _ => {
                self.status_message =
                    Some(("History poll must be a whole number of seconds".to_string(), true));
                return false;
            }
        };
        let analytics_poll = match self.analytics_poll_input.trim().parse::<u64>() {
            Ok(secs) if secs >= 1 => secs,
            _ => {
                self.status_message =
                    Some(("Analytics poll must be a whole number of seconds".to_string(), true));
                return false;
            }
        };

        let new_base_url = self.base_url_input.trim().trim_end_matches('/').to_string();
        let base_url_changed = new_base_url != config.base_url;

        config.base_url = new_base_url;
        for (vehicle_type, rate) in parsed_rates {
            config.toll_rates.set(vehicle_type, rate);
        }
        config.history_poll_secs = history_poll;
        config.analytics_poll_secs = analytics_poll;

        match config.save() {
            Ok(()) => {
                self.modified = false;
                self.status_message = Some(("Settings saved".to_string(), false));
            }
            Err(e) => {
                self.status_message = Some((format!("Save failed: {}", e), true));
            }
        }

        base_url_changed
    }
}

fn rate_inputs_from(table: &TollTable) -> Vec<(VehicleType, String)> {
    table
        .iter()
        .map(|(vehicle_type, rate)| (vehicle_type, format!("{:.2}", rate)))
        .collect()
}
