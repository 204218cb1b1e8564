//! 应用设置模块
//!
//! # 设计思路
//!
//! 设置文件是可选的 JSON：只写需要调整的字段，其余沿用 `LabelConfig::default()`。
//! 查找顺序：环境变量 `PICLAB_SETTINGS` 指定的路径 → 可执行文件同目录的 `piclab.json`。
//!
//! # 实现思路
//!
//! - 文件不存在时静默使用默认值；读取或解析失败时记录警告并使用默认值，
//!   右键菜单工具不应因为一份坏掉的设置文件而拒绝工作。
//! - 明显有害的取值（空副本后缀、未知输出格式）被忽略并记录警告。

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::labeler::LabelConfig;

/// 指定设置文件路径的环境变量。
pub const SETTINGS_ENV: &str = "PICLAB_SETTINGS";
/// 默认设置文件名（位于可执行文件同目录）。
pub const SETTINGS_FILE_NAME: &str = "piclab.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub font_families: Option<Vec<String>>,
    pub font_file: Option<PathBuf>,
    pub copy_suffix: Option<String>,
    pub output_format: Option<String>,
    pub scrim_alpha: Option<u8>,
    pub shadow_alpha: Option<u8>,
    pub padding_ratio: Option<f64>,
    pub font_size_ratio: Option<f64>,
    pub max_file_size_mb: Option<u64>,
}

impl Settings {
    /// 将设置覆盖到默认配置上。
    pub fn to_label_config(&self) -> LabelConfig {
        let mut config = LabelConfig::default();

        if let Some(families) = &self.font_families {
            let families: Vec<String> = families
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
            if !families.is_empty() {
                config.font_families = families;
            }
        }

        if let Some(path) = &self.font_file {
            config.font_file = Some(path.clone());
        }

        match self.copy_suffix.as_deref() {
            Some("") => log::warn!("⚠️ copySuffix 为空会覆盖原图，已忽略"),
            Some(suffix) => config.copy_suffix = suffix.to_string(),
            None => {}
        }

        if let Some(name) = self.output_format.as_deref() {
            match ImageFormat::from_extension(name.trim().trim_start_matches('.')) {
                Some(format) => config.output_format = format,
                None => log::warn!("⚠️ 未知输出格式 {}，沿用 {:?}", name, config.output_format),
            }
        }

        if let Some(alpha) = self.scrim_alpha {
            config.scrim_color[3] = alpha;
        }
        if let Some(alpha) = self.shadow_alpha {
            config.shadow_color[3] = alpha;
        }
        if let Some(ratio) = self.padding_ratio.filter(|r| *r > 0.0) {
            config.padding_ratio = ratio;
        }
        if let Some(ratio) = self.font_size_ratio.filter(|r| *r > 0.0) {
            config.font_size_ratio = ratio;
        }
        if let Some(mb) = self.max_file_size_mb.filter(|mb| *mb > 0) {
            config.max_file_size = mb.saturating_mul(1024 * 1024);
        }

        config
    }
}

/// 从指定路径读取设置；缺失或无效时返回默认值。
pub fn load_settings_from_path(path: &Path) -> Settings {
    if !path.exists() {
        log::debug!("未找到设置文件 {}，使用默认设置", path.display());
        return Settings::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("⚠️ 读取设置文件失败，使用默认设置: {} ({})", path.display(), err);
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&content) {
        Ok(settings) => {
            log::info!("⚙️ 已加载设置文件: {}", path.display());
            settings
        }
        Err(err) => {
            log::warn!("⚠️ 解析设置文件失败，使用默认设置: {} ({})", path.display(), err);
            Settings::default()
        }
    }
}

/// 设置文件路径：优先环境变量，其次可执行文件同目录。
pub fn settings_file_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(SETTINGS_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SETTINGS_FILE_NAME)))
}

/// 读取当前生效的设置。
pub fn load_settings() -> Settings {
    match settings_file_path() {
        Some(path) => load_settings_from_path(&path),
        None => Settings::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir failed");
        let settings = load_settings_from_path(&dir.path().join("piclab.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn invalid_json_yields_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir failed");
        let path = dir.path().join("piclab.json");
        fs::write(&path, "{ not json").expect("write failed");

        assert_eq!(load_settings_from_path(&path), Settings::default());
    }

    #[test]
    fn partial_settings_override_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir failed");
        let path = dir.path().join("piclab.json");
        fs::write(
            &path,
            r#"{
                "fontFamilies": ["Noto Sans", " "],
                "copySuffix": "_tagged",
                "outputFormat": ".bmp",
                "scrimAlpha": 200
            }"#,
        )
        .expect("write failed");

        let config = load_settings_from_path(&path).to_label_config();

        assert_eq!(config.font_families, vec!["Noto Sans".to_string()]);
        assert_eq!(config.copy_suffix, "_tagged");
        assert_eq!(config.output_format, ImageFormat::Bmp);
        assert_eq!(config.scrim_color, [0, 0, 0, 200]);
        assert_eq!(config.shadow_color, [0, 0, 0, 160]);
    }

    #[test]
    fn harmful_values_are_ignored() {
        let settings = Settings {
            copy_suffix: Some(String::new()),
            output_format: Some("definitely-not-a-format".to_string()),
            padding_ratio: Some(-1.0),
            ..Settings::default()
        };

        let config = settings.to_label_config();
        let defaults = LabelConfig::default();

        assert_eq!(config.copy_suffix, defaults.copy_suffix);
        assert_eq!(config.output_format, defaults.output_format);
        assert_eq!(config.padding_ratio, defaults.padding_ratio);
    }
}
