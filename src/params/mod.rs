pub mod serialization;

use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to the parameters record. The panel is the only
/// writer (driven by user input); the renderer reads once per frame.
pub type SharedParams = Rc<RefCell<RenderingParameters>>;

/// User-adjustable renderer settings - matches what can be edited in
/// the settings panel and what the renderer polls each frame.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderingParameters {
    /// Index into the loaded model's scene list, None = no scene.
    pub scene_index: Option<usize>,
    /// "default" or one of the loaded model's camera identifiers.
    pub camera_index: String,
    pub use_ibl: bool,
    pub use_punctual: bool,
    pub environment: Environment,
    /// Exposure in [0, 10].
    pub exposure: f32,
    /// Gamma in [0, 10].
    pub gamma: f32,
    pub tone_map: ToneMap,
    /// Background color as srgb bytes.
    pub clear_color: [u8; 3],
    pub debug_output: DebugOutput,
}

impl Default for RenderingParameters {
    fn default() -> Self {
        Self {
            scene_index: None,
            camera_index: DEFAULT_CAMERA.to_string(),
            use_ibl: true,
            use_punctual: false,
            environment: Environment::Papermill,
            exposure: 1.0,
            gamma: 2.2,
            tone_map: ToneMap::Linear,
            clear_color: [50, 50, 50],
            debug_output: DebugOutput::None,
        }
    }
}

/// Camera identifier used when no model camera is selected. Always
/// the first entry of the camera dropdown.
pub const DEFAULT_CAMERA: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Environment {
    Papermill,
    Field,
    Pisa,
    Doge2,
    Ennis,
    Helipad,
    Neutral,
}

impl Environment {
    pub const ALL: [Environment; 7] = [
        Environment::Papermill,
        Environment::Field,
        Environment::Pisa,
        Environment::Doge2,
        Environment::Ennis,
        Environment::Helipad,
        Environment::Neutral,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Environment::Papermill => "Papermill Ruins",
            Environment::Field => "Field",
            Environment::Pisa => "Pisa Courtyard",
            Environment::Doge2 => "Doge's Palace",
            Environment::Ennis => "Ennis House",
            Environment::Helipad => "Helipad Goldenhour",
            Environment::Neutral => "Studio Neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ToneMap {
    Linear,
    Uncharted,
    HejlRichard,
    Aces,
}

impl ToneMap {
    pub const ALL: [ToneMap; 4] = [
        ToneMap::Linear,
        ToneMap::Uncharted,
        ToneMap::HejlRichard,
        ToneMap::Aces,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToneMap::Linear => "Linear",
            ToneMap::Uncharted => "Uncharted 2",
            ToneMap::HejlRichard => "Hejl Richard",
            ToneMap::Aces => "ACES",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DebugOutput {
    None,
    BaseColor,
    Metallic,
    Roughness,
    Normal,
    Occlusion,
    Emissive,
    F0,
    Alpha,
}

impl DebugOutput {
    pub const ALL: [DebugOutput; 9] = [
        DebugOutput::None,
        DebugOutput::BaseColor,
        DebugOutput::Metallic,
        DebugOutput::Roughness,
        DebugOutput::Normal,
        DebugOutput::Occlusion,
        DebugOutput::Emissive,
        DebugOutput::F0,
        DebugOutput::Alpha,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DebugOutput::None => "None",
            DebugOutput::BaseColor => "Base Color",
            DebugOutput::Metallic => "Metallic",
            DebugOutput::Roughness => "Roughness",
            DebugOutput::Normal => "Normal",
            DebugOutput::Occlusion => "Occlusion",
            DebugOutput::Emissive => "Emissive",
            DebugOutput::F0 => "F0",
            DebugOutput::Alpha => "Alpha",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_viewer_conventions() {
        let params = RenderingParameters::default();
        assert_eq!(params.scene_index, None);
        assert_eq!(params.camera_index, DEFAULT_CAMERA);
        assert!(params.use_ibl);
        assert!(!params.use_punctual);
        assert_eq!(params.exposure, 1.0);
        assert_eq!(params.gamma, 2.2);
        assert_eq!(params.tone_map, ToneMap::Linear);
        assert_eq!(params.clear_color, [50, 50, 50]);
        assert_eq!(params.debug_output, DebugOutput::None);
    }

    #[test]
    fn test_enum_tables_are_unique() {
        for table_len in [
            Environment::ALL.len(),
            ToneMap::ALL.len(),
            DebugOutput::ALL.len(),
        ] {
            assert!(table_len > 0);
        }
        let mut labels: Vec<&str> = DebugOutput::ALL.iter().map(|d| d.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), DebugOutput::ALL.len());
    }

    #[test]
    fn test_scene_index_serializes_as_null_when_unset() {
        let params = RenderingParameters::default();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"scene_index\":null"));
    }
}
