use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "NodeConfig::default_width")]
    pub default_width: f32,
    #[serde(default = "NodeConfig::default_height")]
    pub default_height: f32,
    /// Name for nodes created by click. Supports `{{i}}`, `{{date}}` and `{{time}}`.
    #[serde(default = "NodeConfig::default_auto_name_template")]
    pub auto_name_template: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextTreeConfig {
    #[serde(default = "TextTreeConfig::default_indent_unit")]
    pub indent_unit: usize,
    #[serde(default = "TextTreeConfig::default_spacing_x")]
    pub spacing_x: f32,
    #[serde(default = "TextTreeConfig::default_spacing_y")]
    pub spacing_y: f32,
    #[serde(default = "TextTreeConfig::default_root_text")]
    pub root_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComputeConfig {
    /// Key that must be held for `Stage::tick` to run the engine. `None` runs every tick.
    #[serde(default = "ComputeConfig::default_trigger_key")]
    pub trigger_key: Option<String>,
    #[serde(default)]
    pub random_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_zoom_min")]
    pub zoom_min: f32,
    #[serde(default = "CameraConfig::default_zoom_max")]
    pub zoom_max: f32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StageConfig {
    #[serde(default)]
    pub nodes: NodeConfig,
    #[serde(default)]
    pub text_tree: TextTreeConfig,
    #[serde(default)]
    pub compute: ComputeConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

impl NodeConfig {
    const fn default_width() -> f32 {
        100.0
    }

    const fn default_height() -> f32 {
        100.0
    }

    fn default_auto_name_template() -> String {
        "...".to_string()
    }

    pub fn default_size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.default_width, self.default_height)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            default_width: Self::default_width(),
            default_height: Self::default_height(),
            auto_name_template: Self::default_auto_name_template(),
        }
    }
}

impl TextTreeConfig {
    const fn default_indent_unit() -> usize {
        4
    }

    const fn default_spacing_x() -> f32 {
        50.0
    }

    const fn default_spacing_y() -> f32 {
        100.0
    }

    fn default_root_text() -> String {
        "root".to_string()
    }
}

impl Default for TextTreeConfig {
    fn default() -> Self {
        Self {
            indent_unit: Self::default_indent_unit(),
            spacing_x: Self::default_spacing_x(),
            spacing_y: Self::default_spacing_y(),
            root_text: Self::default_root_text(),
        }
    }
}

impl ComputeConfig {
    fn default_trigger_key() -> Option<String> {
        Some("x".to_string())
    }
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self { trigger_key: Self::default_trigger_key(), random_seed: None }
    }
}

impl CameraConfig {
    const fn default_zoom_min() -> f32 {
        0.05
    }

    const fn default_zoom_max() -> f32 {
        10.0
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<()> {
        if !crate::camera::valid_zoom_limits(self.zoom_min, self.zoom_max) {
            bail!(
                "camera zoom limits must be finite with 0 < zoom_min < zoom_max (got {} and {})",
                self.zoom_min,
                self.zoom_max
            );
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { zoom_min: Self::default_zoom_min(), zoom_max: Self::default_zoom_max() }
    }
}

impl StageConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        cfg.camera.validate().with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "text_tree": {{ "indent_unit": 2 }}, "compute": {{ "trigger_key": null }} }}"#)
            .expect("write config");
        let cfg = StageConfig::load(file.path()).expect("load config");
        assert_eq!(cfg.text_tree.indent_unit, 2);
        assert_eq!(cfg.text_tree.spacing_y, 100.0);
        assert_eq!(cfg.compute.trigger_key, None);
        assert_eq!(cfg.nodes.auto_name_template, "...");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = StageConfig::load_or_default(dir.path().join("missing.json"));
        assert_eq!(cfg.text_tree.indent_unit, 4);
        assert_eq!(cfg.compute.trigger_key.as_deref(), Some("x"));
    }

    #[test]
    fn malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write config");
        let err = StageConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn inverted_zoom_limits_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "camera": {{ "zoom_min": 5, "zoom_max": 1 }} }}"#).expect("write config");
        let err = StageConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        assert!(format!("{err:#}").contains("zoom_min < zoom_max"));

        let cfg = StageConfig::load_or_default(file.path());
        assert_eq!(cfg.camera.zoom_min, 0.05);
        assert_eq!(cfg.camera.zoom_max, 10.0);
    }
}
