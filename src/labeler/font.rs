//! # 字体解析模块
//!
//! ## 设计思路
//!
//! 字体选择抽象为“有序偏好列表 + 可用性查询”：列表中第一个在宿主机上可用的字体族生效。
//! 选择逻辑是纯函数（`select_family`），可用性查询由 `FontLocator` 在系统字体目录中完成。
//!
//! ## 实现思路
//!
//! - 每个字体族映射到若干粗体文件名（大小写不敏感），在字体目录中有限深度递归查找。
//! - 配置里显式指定的 `font_file` 优先于字体族查找。
//! - 全部不可用时返回 `None`，调用方据此报告“没有可用字体”，不会写出缺少文字的图片。

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;

use super::LabelConfig;

/// 字体目录递归查找的最大深度。
const MAX_SCAN_DEPTH: usize = 4;

/// 已加载、可直接用于绘制的标签字体。
#[derive(Clone)]
pub struct LabelFont {
    pub(crate) font: FontArc,
    pub(crate) family: String,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont").field("family", &self.family).finish()
    }
}

impl LabelFont {
    pub fn family(&self) -> &str {
        &self.family
    }
}

/// 按优先级返回第一个可用的字体族。
///
/// # 示例
/// ```rust
/// use piclab::labeler::select_family;
///
/// let prefs = vec!["Segoe UI".to_string(), "Arial".to_string()];
/// assert_eq!(select_family(&prefs, |f| f == "Arial"), Some("Arial"));
/// assert_eq!(select_family(&prefs, |_| false), None);
/// ```
pub fn select_family<F>(preferences: &[String], is_available: F) -> Option<&str>
where
    F: Fn(&str) -> bool,
{
    preferences
        .iter()
        .map(String::as_str)
        .find(|family| is_available(family))
}

/// 在一组字体目录中查找指定字体族的粗体文件。
#[derive(Debug, Clone)]
pub struct FontLocator {
    dirs: Vec<PathBuf>,
}

impl FontLocator {
    /// 使用当前平台的系统/用户字体目录。
    pub fn system() -> Self {
        Self {
            dirs: system_font_dirs(),
        }
    }

    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// 返回字体族对应的粗体文件路径；找不到时为 `None`。
    pub fn locate(&self, family: &str) -> Option<PathBuf> {
        let candidates = bold_file_names(family);
        self.dirs
            .iter()
            .find_map(|dir| find_in_dir(dir, &candidates, 0))
    }
}

/// 字体族 → 粗体文件名候选（全部小写）。
fn bold_file_names(family: &str) -> Vec<String> {
    let normalized = family.trim().to_lowercase();
    let known: &[&str] = match normalized.as_str() {
        "segoe ui" => &["segoeuib.ttf", "segoe ui bold.ttf"],
        "arial" => &["arialbd.ttf", "arial bold.ttf", "arial-boldmt.ttf"],
        "dejavu sans" => &["dejavusans-bold.ttf"],
        "liberation sans" => &["liberationsans-bold.ttf"],
        _ => &[],
    };

    if !known.is_empty() {
        return known.iter().map(|name| name.to_string()).collect();
    }

    let compact = normalized.replace(' ', "");
    vec![
        format!("{compact}-bold.ttf"),
        format!("{compact}bd.ttf"),
        format!("{compact}-bold.otf"),
    ]
}

fn find_in_dir(dir: &Path, candidates: &[String], depth: usize) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;

    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
            continue;
        }

        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| candidates.iter().any(|c| c == &name.to_lowercase()))
            .unwrap_or(false);
        if matches {
            return Some(path);
        }
    }

    if depth >= MAX_SCAN_DEPTH {
        return None;
    }

    subdirs.sort();
    subdirs
        .iter()
        .find_map(|sub| find_in_dir(sub, candidates, depth + 1))
}

#[cfg(target_os = "windows")]
fn system_font_dirs() -> Vec<PathBuf> {
    let windir = env::var_os("WINDIR").unwrap_or_else(|| "C:\\Windows".into());
    let mut dirs = vec![PathBuf::from(windir).join("Fonts")];
    if let Some(local) = env::var_os("LOCALAPPDATA") {
        dirs.push(PathBuf::from(local).join("Microsoft").join("Windows").join("Fonts"));
    }
    dirs
}

#[cfg(target_os = "macos")]
fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("/Library/Fonts"),
    ];
    if let Some(home) = env::var_os("HOME") {
        dirs.push(PathBuf::from(home).join("Library").join("Fonts"));
    }
    dirs
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
    ];
    if let Some(home) = env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".local").join("share").join("fonts"));
        dirs.push(home.join(".fonts"));
    }
    dirs
}

fn load_font_file(path: &Path) -> Result<FontArc, String> {
    let bytes = fs::read(path).map_err(|e| format!("读取字体文件失败：{}", e))?;
    FontArc::try_from_vec(bytes).map_err(|e| format!("字体文件无效：{}", e))
}

/// 按配置解析标签字体。
///
/// 顺序：显式 `font_file` → 偏好字体族列表。全部失败时返回 `None`。
pub fn resolve_label_font(config: &LabelConfig, locator: &FontLocator) -> Option<LabelFont> {
    if let Some(path) = &config.font_file {
        match load_font_file(path) {
            Ok(font) => {
                log::debug!("🔤 使用指定字体文件：{}", path.display());
                return Some(LabelFont {
                    font,
                    family: path.display().to_string(),
                });
            }
            Err(err) => log::warn!("⚠️ 指定字体文件不可用，回退字体族查找：{}", err),
        }
    }

    let Some(family) = select_family(&config.font_families, |f| locator.locate(f).is_some()) else {
        log::warn!(
            "⚠️ 未找到任何可用字体（偏好：{:?}）",
            config.font_families
        );
        return None;
    };

    let path = locator.locate(family)?;
    match load_font_file(&path) {
        Ok(font) => {
            log::debug!("🔤 选用字体族 {}：{}", family, path.display());
            Some(LabelFont {
                font,
                family: family.to_string(),
            })
        }
        Err(err) => {
            log::warn!("⚠️ 字体 {} 加载失败：{}", family, err);
            None
        }
    }
}
