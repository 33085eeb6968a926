//! Registry panel: registered vehicles and owners, registration, import

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};

use autotoll_api::TollApi;
use autotoll_app::load_capture;
use autotoll_types::{
    ImportOutcome, RegistrationForm, RegistryOwner, RegistryVehicle, Result, VehicleStatusReport,
};
use eframe::egui::{self, Color32, RichText, Ui};
use tokio::runtime::Handle;

pub struct RegistryPanel {
    vehicles: Vec<RegistryVehicle>,
    owners: Vec<RegistryOwner>,
    vehicles_rx: Option<Receiver<Result<Vec<RegistryVehicle>>>>,
    owners_rx: Option<Receiver<Result<Vec<RegistryOwner>>>>,
    loaded: bool,

    lookup_input: String,
    lookup_rx: Option<Receiver<Result<VehicleStatusReport>>>,
    lookup_result: Option<VehicleStatusReport>,

    form_name: String,
    form_contact: String,
    form_plate: String,
    form_model: String,
    form_photo: Option<PathBuf>,
    register_rx: Option<Receiver<Result<()>>>,

    import_rx: Option<Receiver<Result<ImportOutcome>>>,

    /// (message, is_error)
    status_message: Option<(String, bool)>,
}

impl RegistryPanel {
    pub fn new() -> Self {
        Self {
            vehicles: Vec::new(),
            owners: Vec::new(),
            vehicles_rx: None,
            owners_rx: None,
            loaded: false,
            lookup_input: String::new(),
            lookup_rx: None,
            lookup_result: None,
            form_name: String::new(),
            form_contact: String::new(),
            form_plate: String::new(),
            form_model: String::new(),
            form_photo: None,
            register_rx: None,
            import_rx: None,
            status_message: None,
        }
    }

    pub fn ui(&mut self, ui: &mut Ui, handle: &Handle, api: &TollApi) {
        if !self.loaded {
            self.loaded = true;
            self.reload(handle, api);
        }
        self.poll(handle, api);

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Vehicle Registry");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Refresh").clicked() {
                        self.reload(handle, api);
                    }
                });
            });
            ui.add_space(10.0);

            if let Some((ref message, is_error)) = self.status_message {
                let color = if is_error {
                    Color32::LIGHT_RED
                } else {
                    Color32::LIGHT_GREEN
                };
                ui.label(RichText::new(message).color(color));
                ui.add_space(8.0);
            }

            self.render_lookup(ui, handle, api);

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(15.0);

            self.render_register_form(ui, handle, api);

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(15.0);

            self.render_lists(ui);
        });
    }

    fn render_lookup(&mut self, ui: &mut Ui, handle: &Handle, api: &TollApi) {
        ui.label(RichText::new("Plate lookup").strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.lookup_input)
                    .desired_width(160.0)
                    .hint_text("license plate"),
            );
            let searching = self.lookup_rx.is_some();
            let can_search = !searching && !self.lookup_input.trim().is_empty();
            if ui.add_enabled(can_search, egui::Button::new("Look up")).clicked() {
                let plate = self.lookup_input.clone();
                let (tx, rx) = channel();
                self.lookup_rx = Some(rx);
                self.lookup_result = None;
                let api = api.clone();
                handle.spawn(async move {
                    let _ = tx.send(api.vehicle_status(&plate).await);
                });
            }
            if searching {
                ui.spinner();
            }
        });

        if let Some(ref report) = self.lookup_result {
            ui.add_space(8.0);
            egui::Frame::new()
                .fill(Color32::from_gray(30))
                .inner_margin(10.0)
                .corner_radius(4.0)
                .show(ui, |ui| {
                    if !report.found {
                        ui.label(RichText::new("Plate not registered").color(Color32::YELLOW));
                        return;
                    }
                    if let Some(ref vehicle) = report.vehicle {
                        ui.label(format!(
                            "{}  {}",
                            vehicle.license_plate, vehicle.make_model
                        ));
                    }
                    if let Some(ref owner) = report.owner {
                        ui.label(format!("Owner: {} ({})", owner.name, owner.contact_info));
                    }
                    if let Some(count) = report.history_count {
                        ui.label(format!("Passes: {}", count));
                    }
                    if let Some(due) = report.total_due {
                        ui.label(
                            RichText::new(format!("Total due: {:.2}", due))
                                .color(Color32::LIGHT_GREEN),
                        );
                    }
                });
        }
    }

    fn render_register_form(&mut self, ui: &mut Ui, handle: &Handle, api: &TollApi) {
        ui.label(RichText::new("Register owner and vehicle").strong());
        ui.add_space(5.0);

        egui::Grid::new("register_form")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label("Name:");
                ui.text_edit_singleline(&mut self.form_name);
                ui.end_row();

                ui.label("Contact:");
                ui.text_edit_singleline(&mut self.form_contact);
                ui.end_row();

                ui.label("Plate:");
                ui.text_edit_singleline(&mut self.form_plate);
                ui.end_row();

                ui.label("Make/model:");
                ui.text_edit_singleline(&mut self.form_model);
                ui.end_row();

                ui.label("Photo:");
                ui.horizontal(|ui| {
                    if ui.button("Choose...").clicked() {
                        self.form_photo = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "webp"])
                            .pick_file();
                    }
                    match self.form_photo {
                        Some(ref path) => {
                            ui.label(
                                RichText::new(path.display().to_string())
                                    .small()
                                    .color(Color32::LIGHT_BLUE),
                            );
                        }
                        None => {
                            ui.label(RichText::new("(optional)").small().color(Color32::GRAY));
                        }
                    }
                });
                ui.end_row();
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let submitting = self.register_rx.is_some();
            let can_submit = !submitting
                && !self.form_name.trim().is_empty()
                && !self.form_contact.trim().is_empty()
                && !self.form_plate.trim().is_empty()
                && !self.form_model.trim().is_empty();

            if ui.add_enabled(can_submit, egui::Button::new("Register")).clicked() {
                self.start_register(handle, api);
            }
            if submitting {
                ui.spinner();
            }

            ui.add_space(20.0);

            let importing = self.import_rx.is_some();
            if ui
                .add_enabled(!importing, egui::Button::new("Import file..."))
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Registry data", &["csv", "json", "xlsx"])
                    .pick_file()
                {
                    self.start_import(handle, api, path);
                }
            }
            if importing {
                ui.spinner();
            }
        });
    }

    fn start_register(&mut self, handle: &Handle, api: &TollApi) {
        let form = RegistrationForm {
            name: self.form_name.trim().to_string(),
            contact_info: self.form_contact.trim().to_string(),
            license_plate: self.form_plate.clone(),
            make_model: self.form_model.trim().to_string(),
            photo: self.form_photo.clone(),
        };

        let photo = match self.form_photo {
            Some(ref path) => match load_capture(path) {
                Ok(payload) => Some((payload.file_name, payload.bytes)),
                Err(e) => {
                    self.status_message = Some((format!("Photo error: {}", e), true));
                    return;
                }
            },
            None => None,
        };

        let (tx, rx) = channel();
        self.register_rx = Some(rx);
        self.status_message = None;
        let api = api.clone();
        handle.spawn(async move {
            let _ = tx.send(api.register(&form, photo).await);
        });
    }

    fn start_import(&mut self, handle: &Handle, api: &TollApi, path: PathBuf) {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.status_message = Some((format!("Import read error: {}", e), true));
                return;
            }
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "import".to_string());

        let (tx, rx) = channel();
        self.import_rx = Some(rx);
        self.status_message = None;
        let api = api.clone();
        handle.spawn(async move {
            let _ = tx.send(api.import(&file_name, bytes).await);
        });
    }

    fn render_lists(&mut self, ui: &mut Ui) {
        ui.columns(2, |columns| {
            let ui = &mut columns[0];
            ui.label(RichText::new(format!("Vehicles ({})", self.vehicles.len())).strong());
            ui.add_space(5.0);
            if self.vehicles.is_empty() {
                ui.label(RichText::new("No registered vehicles").italics().color(Color32::GRAY));
            } else {
                egui::Grid::new("vehicles_grid")
                    .num_columns(2)
                    .spacing([16.0, 4.0])
                    .striped(true)
                    .show(ui, |ui| {
                        for vehicle in &self.vehicles {
                            ui.label(RichText::new(&vehicle.license_plate).monospace());
                            ui.label(&vehicle.make_model);
                            ui.end_row();
                        }
                    });
            }

            let ui = &mut columns[1];
            ui.label(RichText::new(format!("Owners ({})", self.owners.len())).strong());
            ui.add_space(5.0);
            if self.owners.is_empty() {
                ui.label(RichText::new("No registered owners").italics().color(Color32::GRAY));
            } else {
                egui::Grid::new("owners_grid")
                    .num_columns(2)
                    .spacing([16.0, 4.0])
                    .striped(true)
                    .show(ui, |ui| {
                        for owner in &self.owners {
                            ui.label(&owner.name);
                            ui.label(RichText::new(&owner.contact_info).small());
                            ui.end_row();
                        }
                    });
            }
        });
    }

    fn reload(&mut self, handle: &Handle, api: &TollApi) {
        let (tx, rx) = channel();
        self.vehicles_rx = Some(rx);
        let api_clone = api.clone();
        handle.spawn(async move {
            let _ = tx.send(api_clone.vehicles().await);
        });

        let (tx, rx) = channel();
        self.owners_rx = Some(rx);
        let api_clone = api.clone();
        handle.spawn(async move {
            let _ = tx.send(api_clone.owners().await);
        });
    }

    fn poll(&mut self, handle: &Handle, api: &TollApi) {
        if let Some(ref rx) = self.vehicles_rx {
            match rx.try_recv() {
                Ok(Ok(vehicles)) => {
                    self.vehicles = vehicles;
                    self.vehicles_rx = None;
                }
                Ok(Err(e)) => {
                    log::warn!("vehicles fetch failed: {e}");
                    self.vehicles_rx = None;
                }
                Err(std::sync::mpsc::TryRecvError::Empty) => {}
                Err(std::sync::mpsc::TryRecvError::Disconnected) => self.vehicles_rx = None,
            }
        }

        if let Some(ref rx) = self.owners_rx {
            match rx.try_recv() {
                Ok(Ok(owners)) => {
                    self.owners = owners;
                    self.owners_rx = None;
                }
                Ok(Err(e)) => {
                    log::warn!("owners fetch failed: {e}");
                    self.owners_rx = None;
                }
                Err(std::sync::mpsc::TryRecvError::Empty) => {}
                Err(std::sync::mpsc::TryRecvError::Disconnected) => self.owners_rx = None,
            }
        }

        if let Some(ref rx) = self.lookup_rx {
            match rx.try_recv() {
                Ok(Ok(report)) => {
                    self.lookup_result = Some(report);
                    self.lookup_rx = None;
                }
                Ok(Err(e)) => {
                    self.status_message = Some((format!("Lookup failed: {}", e), true));
                    self.lookup_rx = None;
                }
                Err(std::sync::mpsc::TryRecvError::Empty) => {}
                Err(std::sync::mpsc::TryRecvError::Disconnected) => self.lookup_rx = None,
            }
        }

        if let Some(ref rx) = self.register_rx {
            match rx.try_recv() {
                Ok(Ok(())) => {
                    self.status_message =
                        Some((format!("Registered {}", self.form_plate.trim().to_uppercase()), false));
                    self.form_name.clear();
                    self.form_contact.clear();
                    self.form_plate.clear();
                    self.form_model.clear();
                    self.form_photo = None;
                    self.register_rx = None;
                    self.reload(handle, api);
                }
                Ok(Err(e)) => {
                    self.status_message = Some((format!("Registration failed: {}", e), true));
                    self.register_rx = None;
                }
                Err(std::sync::mpsc::TryRecvError::Empty) => {}
                Err(std::sync::mpsc::TryRecvError::Disconnected) => self.register_rx = None,
            }
        }

        if let Some(ref rx) = self.import_rx {
            match rx.try_recv() {
                Ok(Ok(outcome)) => {
                    self.status_message = Some((
                        format!("Imported {} rows, {} failed", outcome.imported, outcome.failed),
                        outcome.failed > 0,
                    ));
                    self.import_rx = None;
                    self.reload(handle, api);
                }
                Ok(Err(e)) => {
                    self.status_message = Some((format!("Import failed: {}", e), true));
                    self.import_rx = None;
                }
                Err(std::sync::mpsc::TryRecvError::Empty) => {}
                Err(std::sync::mpsc::TryRecvError::Disconnected) => self.import_rx = None,
            }
        }
    }
}

impl Default for RegistryPanel {
    fn default() -> Self {
        Self::new()
    }
}
