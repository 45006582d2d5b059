pub mod egui_host;
pub mod stats;

use crate::assets::{self, ModelIndex};
use crate::params::{serialization, RenderingParameters, SharedParams, DEFAULT_CAMERA};
use crate::render::GfxContext;
use crate::ui::SettingsPanel;
use egui_host::EguiHost;
use stats::{FrameStats, SharedStats};

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "gltfview";
const SETTINGS_FILE: &str = "viewer_settings.json";
const DEFAULT_MODEL_DIR: &str = "assets/models";

pub struct App {
    window: Option<Arc<Window>>,
    gfx: Option<GfxContext>,
    egui_host: Option<EguiHost>,
    panel: SettingsPanel,
    models: Rc<RefCell<ModelIndex>>,
    params: SharedParams,
    stats: SharedStats,
    // Model-selection events from the panel land here and are drained
    // once per frame.
    pending_model: Rc<RefCell<Option<String>>>,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl App {
    fn new(models: ModelIndex, params: RenderingParameters) -> Self {
        let models = Rc::new(RefCell::new(models));
        let params: SharedParams = Rc::new(RefCell::new(params));
        let stats: SharedStats = Rc::new(RefCell::new(FrameStats::new(WINDOW_TITLE.to_string())));

        let initial_model = models.borrow().first_key().unwrap_or("").to_string();
        let mut panel = SettingsPanel::new(
            models.clone(),
            &initial_model,
            params.clone(),
            stats.clone(),
        );
        panel.initialize();

        // The handler must be in place before the first interaction.
        let pending_model = Rc::new(RefCell::new(None::<String>));
        let queue = pending_model.clone();
        panel.set_on_model_selected(Box::new(move |key| {
            *queue.borrow_mut() = Some(key.to_string());
        }));

        let mut app = Self {
            window: None,
            gfx: None,
            egui_host: None,
            panel,
            models,
            params,
            stats,
            pending_model,
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
        };
        let initial = app.panel.selected_model().to_string();
        if !initial.is_empty() {
            app.load_model(&initial);
        }
        app
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(monitor) = window.current_monitor() {
            if let Some(millihz) = monitor.refresh_rate_millihertz() {
                let hz = millihz as f32 / 1000.0;
                if hz > 1.0 {
                    target = Duration::from_secs_f32(1.0 / hz);
                }
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    /// Probes the selected glTF document and feeds the result into the
    /// panel's dynamic controls.
    fn load_model(&mut self, key: &str) {
        let Some(path) = self.models.borrow().path_for(key).map(Path::to_path_buf) else {
            log::warn!("no path registered for model '{}'", key);
            return;
        };
        log::info!("Loading model '{}' from {}", key, path.display());
        match assets::probe_model(&path) {
            Ok(summary) => {
                self.panel.refresh_version(&summary.version);
                self.panel.refresh_scene_list(&summary.scenes);
                self.panel.refresh_camera_list(&summary.cameras);
                let mut params = self.params.borrow_mut();
                params.scene_index = if summary.scenes.is_empty() {
                    None
                } else {
                    Some(0)
                };
                params.camera_index = DEFAULT_CAMERA.to_string();
            }
            Err(err) => {
                log::warn!("Failed to probe model '{}': {}", key, err);
                self.panel.refresh_version("");
                self.panel.refresh_scene_list(&[]);
                self.panel.refresh_camera_list(&[]);
                self.params.borrow_mut().scene_index = None;
            }
        }
    }

    fn handle_open_model_action(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("glTF", &["gltf", "glb"])
            .pick_file()
        else {
            return;
        };
        let key = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("model")
            .to_string();
        self.models.borrow_mut().insert(key.clone(), path);
        self.panel.refresh_model_list();
        self.panel.select_model(key);
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        self.stats.borrow_mut().update(self.window.as_deref(), now);

        let Some(window) = self.window.clone() else {
            return;
        };
        let Some(host) = self.egui_host.as_mut() else {
            return;
        };

        let panel = &mut self.panel;
        let mut open_model_clicked = false;
        let frame = host.run_ui(&window, |ctx| {
            egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("Open model…").clicked() {
                        open_model_clicked = true;
                    }
                });
            });
            panel.ui(ctx);
        });

        if open_model_clicked {
            self.handle_open_model_action();
        }
        let pending = self.pending_model.borrow_mut().take();
        if let Some(key) = pending {
            self.load_model(&key);
        }

        let clear_color = self.params.borrow().clear_color;
        if let Some(gfx) = self.gfx.as_mut() {
            gfx.render_frame(clear_color, &frame);
        }
    }

    fn save_settings(&self) {
        let params = self.params.borrow();
        if let Err(err) = serialization::save_params_to_file(&params, Path::new(SETTINGS_FILE)) {
            log::warn!("Failed to save settings: {}", err);
        } else {
            log::info!("Saved settings to {}", SETTINGS_FILE);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(1280u32, 720u32))
            .with_resizable(true);

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        match GfxContext::new(window.clone()) {
            Ok(gfx) => self.gfx = Some(gfx),
            Err(err) => {
                log::error!("Failed to initialize GPU context: {}", err);
                event_loop.exit();
                return;
            }
        }
        self.egui_host = Some(EguiHost::new(&window));
        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let mut ui_consumed = false;
        if let (Some(host), Some(window)) = (self.egui_host.as_mut(), self.window.as_ref()) {
            ui_consumed = host.on_window_event(window, &event);
        }

        match event {
            WindowEvent::CloseRequested => {
                self.save_settings();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !ui_consumed && event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    self.save_settings();
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gfx) = self.gfx.as_mut() {
                    gfx.resize(new_size);
                }
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(gfx), Some(window)) = (self.gfx.as_mut(), self.window.as_ref()) {
                    gfx.resize(window.inner_size());
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let model_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));
    let models = match ModelIndex::from_directory(&model_dir) {
        Ok(index) => index,
        Err(err) => {
            log::warn!("Model scan failed ({}), starting with an empty list", err);
            ModelIndex::new()
        }
    };
    if models.is_empty() {
        log::warn!(
            "No models found under {}; use \"Open model…\" to add one",
            model_dir.display()
        );
    }

    let params = match serialization::load_params_from_file(Path::new(SETTINGS_FILE)) {
        Ok(params) => {
            log::info!("Restored settings from {}", SETTINGS_FILE);
            params
        }
        Err(_) => RenderingParameters::default(),
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(models, params);
    event_loop.run_app(&mut app).expect("Event loop error");
}
