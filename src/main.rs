//! gltfview - a minimal glTF viewer shell.
//!
//! A winit window hosting an egui settings panel bound to a shared
//! rendering-parameters record. The renderer side is a wgpu surface
//! that polls the record once per frame (background clear) and paints
//! the panel; model selection events feed a glTF document probe that
//! repopulates the dynamic dropdowns.

mod app;
mod assets;
mod params;
mod render;
mod ui;

fn main() {
    app::run();
}
