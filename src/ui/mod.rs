use crate::app::stats::SharedStats;
use crate::assets::ModelIndex;
use crate::params::{DebugOutput, Environment, SharedParams, ToneMap, DEFAULT_CAMERA};

use std::cell::RefCell;
use std::rc::Rc;

/// Settings panel for the viewer: one collapsible section per concern
/// (glTF, Lighting, Debug, Performance). Static controls bind straight
/// to the shared parameters record; the dynamic glTF controls live in
/// replaceable slots so a refresh never leaves two of them alive.
pub struct SettingsPanel {
    models: Rc<RefCell<ModelIndex>>,
    selected_model: String,
    params: SharedParams,
    stats: SharedStats,

    model_select: Option<ModelSelect>,
    version_label: Option<VersionLabel>,
    scene_select: Option<SceneSelect>,
    camera_select: Option<CameraSelect>,

    initialized: bool,
    on_model_selected: Option<Box<dyn FnMut(&str)>>,
}

struct ModelSelect {
    keys: Vec<String>,
}

struct VersionLabel {
    text: String,
}

struct SceneSelect {
    scenes: Vec<String>,
}

struct CameraSelect {
    options: Vec<String>,
}

impl SettingsPanel {
    /// Stores the four collaborators; no controls exist until
    /// [`SettingsPanel::initialize`] runs.
    pub fn new(
        models: Rc<RefCell<ModelIndex>>,
        selected_model: &str,
        params: SharedParams,
        stats: SharedStats,
    ) -> Self {
        Self {
            models,
            selected_model: selected_model.to_string(),
            params,
            stats,
            model_select: None,
            version_label: None,
            scene_select: None,
            camera_select: None,
            initialized: false,
            on_model_selected: None,
        }
    }

    /// Builds the dynamic glTF controls. Call exactly once, before any
    /// of the refresh operations.
    pub fn initialize(&mut self) {
        debug_assert!(!self.initialized, "initialize must be called exactly once");
        self.refresh_model_list();
        self.refresh_version("");
        self.refresh_scene_list(&[]);
        self.refresh_camera_list(&[]);
        self.initialized = true;
    }

    /// Registers the single subscriber notified when the model
    /// selection (or the environment under it) changes. The owner must
    /// register before the first user interaction; until then such
    /// events are dropped with a warning.
    pub fn set_on_model_selected(&mut self, callback: Box<dyn FnMut(&str)>) {
        self.on_model_selected = Some(callback);
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    /// Recomputes the selectable keys from the provider and rebuilds
    /// the model dropdown. A selection that is no longer valid falls
    /// back to the first available key.
    pub fn refresh_model_list(&mut self) {
        let keys = self.models.borrow().keys();
        if !keys.iter().any(|key| *key == self.selected_model) {
            if let Some(first) = keys.first() {
                self.selected_model = first.clone();
            }
        }
        self.model_select.replace(ModelSelect { keys });
    }

    /// Replaces the read-only version display.
    pub fn refresh_version(&mut self, version: &str) {
        self.version_label.replace(VersionLabel {
            text: version.to_string(),
        });
    }

    /// Rebuilds the scene dropdown from the given ordered scene names
    /// (empty list = no scenes). Bound to `scene_index`.
    pub fn refresh_scene_list(&mut self, scenes: &[String]) {
        self.scene_select.replace(SceneSelect {
            scenes: scenes.to_vec(),
        });
    }

    /// Rebuilds the camera dropdown. "default" is always the first
    /// option, even when the model has no cameras.
    pub fn refresh_camera_list(&mut self, cameras: &[String]) {
        let mut options = Vec::with_capacity(cameras.len() + 1);
        options.push(DEFAULT_CAMERA.to_string());
        options.extend(cameras.iter().cloned());
        self.camera_select.replace(CameraSelect { options });
    }

    /// Draws the panel as a right side panel.
    pub fn ui(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("settings_panel")
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.gltf_section(ui);
                        self.lighting_section(ui);
                        self.debug_section(ui);
                        self.performance_section(ui);
                    });
            });
    }

    fn gltf_section(&mut self, ui: &mut egui::Ui) {
        let mut chosen: Option<String> = None;
        egui::CollapsingHeader::new("glTF")
            .default_open(true)
            .show(ui, |ui| {
                if let Some(control) = &self.model_select {
                    egui::ComboBox::from_label("Model")
                        .selected_text(self.selected_model.clone())
                        .show_ui(ui, |ui| {
                            for key in &control.keys {
                                if ui
                                    .selectable_label(*key == self.selected_model, key)
                                    .clicked()
                                {
                                    chosen = Some(key.clone());
                                }
                            }
                        });
                }
                if let Some(control) = &self.version_label {
                    ui.horizontal(|ui| {
                        ui.label("glTF Version");
                        ui.label(&control.text);
                    });
                }
                if let Some(control) = &self.scene_select {
                    let mut params = self.params.borrow_mut();
                    let selected_text = params
                        .scene_index
                        .and_then(|index| control.scenes.get(index).cloned())
                        .unwrap_or_else(|| "-".to_string());
                    egui::ComboBox::from_label("Scene")
                        .selected_text(selected_text)
                        .show_ui(ui, |ui| {
                            for (index, name) in control.scenes.iter().enumerate() {
                                ui.selectable_value(&mut params.scene_index, Some(index), name);
                            }
                        });
                }
                if let Some(control) = &self.camera_select {
                    let mut params = self.params.borrow_mut();
                    let selected_text = params.camera_index.clone();
                    egui::ComboBox::from_label("Camera")
                        .selected_text(selected_text)
                        .show_ui(ui, |ui| {
                            for option in &control.options {
                                ui.selectable_value(
                                    &mut params.camera_index,
                                    option.clone(),
                                    option,
                                );
                            }
                        });
                }
            });
        if let Some(key) = chosen {
            if key != self.selected_model {
                self.select_model(key);
            }
        }
    }

    fn lighting_section(&mut self, ui: &mut egui::Ui) {
        let previous_environment = self.params.borrow().environment;
        {
            let mut params = self.params.borrow_mut();
            egui::CollapsingHeader::new("Lighting").show(ui, |ui| {
                ui.checkbox(&mut params.use_ibl, "Image Based Lighting");
                ui.checkbox(&mut params.use_punctual, "Punctual Lights");
                egui::ComboBox::from_label("Environment")
                    .selected_text(params.environment.label())
                    .show_ui(ui, |ui| {
                        for environment in Environment::ALL {
                            ui.selectable_value(
                                &mut params.environment,
                                environment,
                                environment.label(),
                            );
                        }
                    });
                ui.add(
                    egui::Slider::new(&mut params.exposure, 0.0..=10.0)
                        .step_by(0.1)
                        .text("Exposure"),
                );
                ui.add(
                    egui::Slider::new(&mut params.gamma, 0.0..=10.0)
                        .step_by(0.1)
                        .text("Gamma"),
                );
                egui::ComboBox::from_label("Tone Map")
                    .selected_text(params.tone_map.label())
                    .show_ui(ui, |ui| {
                        for tone_map in ToneMap::ALL {
                            ui.selectable_value(&mut params.tone_map, tone_map, tone_map.label());
                        }
                    });
                ui.horizontal(|ui| {
                    ui.color_edit_button_srgb(&mut params.clear_color);
                    ui.label("Background Color");
                });
            });
        }
        self.handle_environment_change(previous_environment);
    }

    fn debug_section(&mut self, ui: &mut egui::Ui) {
        let mut params = self.params.borrow_mut();
        egui::CollapsingHeader::new("Debug").show(ui, |ui| {
            egui::ComboBox::from_label("Debug Output")
                .selected_text(params.debug_output.label())
                .show_ui(ui, |ui| {
                    for output in DebugOutput::ALL {
                        ui.selectable_value(&mut params.debug_output, output, output.label());
                    }
                });
        });
    }

    fn performance_section(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Performance")
            .default_open(true)
            .show(ui, |ui| {
                let mut stats = self.stats.borrow_mut();
                stats.set_visible(true);
                ui.label(stats.summary());
            });
    }

    /// Change handler for the model dropdown (also used when the app
    /// registers a model programmatically): adopts the new key, then
    /// notifies the owner.
    pub(crate) fn select_model(&mut self, key: String) {
        self.selected_model = key;
        self.emit_model_selected();
    }

    // A new environment re-evaluates the CURRENT model; the selection
    // itself does not change.
    fn handle_environment_change(&mut self, previous: Environment) {
        if self.params.borrow().environment != previous {
            self.emit_model_selected();
        }
    }

    fn emit_model_selected(&mut self) {
        if let Some(callback) = self.on_model_selected.as_mut() {
            callback(&self.selected_model);
        } else {
            log::warn!(
                "model selection event for '{}' dropped: no handler registered yet",
                self.selected_model
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::stats::FrameStats;
    use crate::params::RenderingParameters;
    use std::path::PathBuf;

    fn make_panel(selected_model: &str) -> (SettingsPanel, SharedParams) {
        let models = Rc::new(RefCell::new(ModelIndex::from_entries(vec![
            (
                "Avocado".to_string(),
                PathBuf::from("assets/models/Avocado.gltf"),
            ),
            (
                "BoomBox".to_string(),
                PathBuf::from("assets/models/BoomBox.gltf"),
            ),
        ])));
        let params: SharedParams = Rc::new(RefCell::new(RenderingParameters::default()));
        let stats = Rc::new(RefCell::new(FrameStats::new("test".to_string())));
        let panel = SettingsPanel::new(models, selected_model, params.clone(), stats);
        (panel, params)
    }

    fn record_selections(panel: &mut SettingsPanel) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        panel.set_on_model_selected(Box::new(move |key| {
            sink.borrow_mut().push(key.to_string());
        }));
        seen
    }

    #[test]
    fn test_invalid_initial_model_falls_back_to_first_key() {
        let (mut panel, _params) = make_panel("NoSuchModel");
        panel.initialize();
        assert_eq!(panel.selected_model(), "Avocado");
    }

    #[test]
    fn test_valid_initial_model_is_preserved() {
        let (mut panel, _params) = make_panel("BoomBox");
        panel.initialize();
        assert_eq!(panel.selected_model(), "BoomBox");
    }

    #[test]
    fn test_refresh_version_replaces_single_control() {
        let (mut panel, _params) = make_panel("Avocado");
        panel.initialize();
        panel.refresh_version("2.0");
        panel.refresh_version("2.1");
        let control = panel.version_label.as_ref().unwrap();
        assert_eq!(control.text, "2.1");
    }

    #[test]
    fn test_refresh_scene_list_rebinds_options() {
        let (mut panel, _params) = make_panel("Avocado");
        panel.initialize();
        assert!(panel.scene_select.as_ref().unwrap().scenes.is_empty());

        panel.refresh_scene_list(&["A".to_string(), "B".to_string()]);
        let control = panel.scene_select.as_ref().unwrap();
        assert_eq!(control.scenes, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_camera_list_always_starts_with_default() {
        let (mut panel, _params) = make_panel("Avocado");
        panel.initialize();
        assert_eq!(
            panel.camera_select.as_ref().unwrap().options,
            vec![DEFAULT_CAMERA.to_string()]
        );

        panel.refresh_camera_list(&["cam1".to_string()]);
        assert_eq!(
            panel.camera_select.as_ref().unwrap().options,
            vec![DEFAULT_CAMERA.to_string(), "cam1".to_string()]
        );
    }

    #[test]
    fn test_model_list_refresh_keeps_valid_selection() {
        let (mut panel, _params) = make_panel("BoomBox");
        panel.initialize();
        panel.refresh_model_list();
        assert_eq!(panel.selected_model(), "BoomBox");
        assert_eq!(
            panel.model_select.as_ref().unwrap().keys,
            vec!["Avocado".to_string(), "BoomBox".to_string()]
        );
    }

    #[test]
    fn test_selecting_new_model_notifies_once_with_new_key() {
        let (mut panel, _params) = make_panel("Avocado");
        panel.initialize();
        let seen = record_selections(&mut panel);

        panel.select_model("BoomBox".to_string());
        assert_eq!(*seen.borrow(), vec!["BoomBox".to_string()]);
        assert_eq!(panel.selected_model(), "BoomBox");
    }

    #[test]
    fn test_environment_change_notifies_with_current_model() {
        let (mut panel, params) = make_panel("Avocado");
        panel.initialize();
        let seen = record_selections(&mut panel);

        params.borrow_mut().environment = Environment::Field;
        panel.handle_environment_change(Environment::Papermill);
        assert_eq!(*seen.borrow(), vec!["Avocado".to_string()]);
        assert_eq!(panel.selected_model(), "Avocado");
    }

    #[test]
    fn test_unchanged_environment_stays_silent() {
        let (mut panel, _params) = make_panel("Avocado");
        panel.initialize();
        let seen = record_selections(&mut panel);

        panel.handle_environment_change(Environment::Papermill);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_events_without_handler_are_dropped_not_fatal() {
        let (mut panel, _params) = make_panel("Avocado");
        panel.initialize();
        panel.select_model("BoomBox".to_string());
        assert_eq!(panel.selected_model(), "BoomBox");
    }
}
