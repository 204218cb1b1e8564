//! # 落盘模块
//!
//! ## 设计思路
//!
//! 覆盖原图必须保证“要么完整替换，要么原图不动”：
//! 先把结果编码到同目录下唯一命名的临时文件，再用一次重命名原子替换原图。
//! 任一步失败都会删除临时文件，原图保持原样。
//!
//! 另存副本则直接写入 `<文件名><后缀><扩展名>`，同名文件后写覆盖先写。

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use image::{DynamicImage, ImageFormat};

use super::{LabelError, SaveMode};

/// 临时文件名中的固定标记。
const TEMP_MARKER: &str = "_label_tmp_";

/// 在扩展名前插入后缀；无扩展名时直接追加。
///
/// # 示例
/// ```rust
/// use std::path::Path;
/// use piclab::labeler::labeled_copy_path;
///
/// assert_eq!(
///     labeled_copy_path(Path::new("photos/photo.png"), "_labeled"),
///     Path::new("photos/photo_labeled.png")
/// );
/// assert_eq!(
///     labeled_copy_path(Path::new("photos/README"), "_labeled"),
///     Path::new("photos/README_labeled")
/// );
/// ```
pub fn labeled_copy_path(path: &Path, suffix: &str) -> PathBuf {
    let Some(stem) = path.file_stem() else {
        let mut name = path.as_os_str().to_os_string();
        name.push(suffix);
        return PathBuf::from(name);
    };

    let mut name: OsString = stem.to_os_string();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// 生成与原图同目录、名字唯一的临时文件路径。
///
/// 名字包含精确到微秒的时间戳；若仍与现有文件冲突则追加递增序号。
pub(crate) fn temp_sibling_path(original: &Path, format: ImageFormat) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("image"));
    let ext = format.extensions_str().first().copied().unwrap_or("tmp");
    let timestamp = Local::now().format("%Y%m%d%H%M%S%6f");

    let build = |attempt: u32| {
        let mut name = stem.clone();
        name.push(TEMP_MARKER);
        name.push(timestamp.to_string());
        if attempt > 0 {
            name.push(format!("_{attempt}"));
        }
        name.push(".");
        name.push(ext);
        original.with_file_name(name)
    };

    let mut attempt = 0;
    let mut candidate = build(attempt);
    while candidate.exists() {
        attempt += 1;
        candidate = build(attempt);
    }
    candidate
}

/// 编码前确认目标格式的编码器可用。
pub(crate) fn ensure_encoder(format: ImageFormat) -> Result<(), LabelError> {
    if format.writing_enabled() {
        Ok(())
    } else {
        Err(LabelError::EncoderUnavailable(format!(
            "{:?} 编码器未启用",
            format
        )))
    }
}

fn encode_to(image: &DynamicImage, path: &Path, format: ImageFormat) -> Result<(), String> {
    image
        .save_with_format(path, format)
        .map_err(|e| e.to_string())
}

fn remove_temp(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            log::warn!("⚠️ 清理临时文件失败：{}（{}）", path.display(), err);
        }
    }
}

/// 用临时文件原子替换原图；失败时删除临时文件，原图保持不变。
///
/// 同卷时为一次重命名；跨卷时退化为“复制后删除”。
pub(crate) fn replace_original(temp: &Path, original: &Path) -> Result<(), LabelError> {
    match fs::rename(temp, original) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!("跨卷替换，改为复制后删除：{}", original.display());
            let copied = fs::copy(temp, original);
            remove_temp(temp);
            copied
                .map(|_| ())
                .map_err(|e| LabelError::Replace(format!("{}：{}", original.display(), e)))
        }
        Err(err) => {
            remove_temp(temp);
            Err(LabelError::Replace(format!("{}：{}", original.display(), err)))
        }
    }
}

/// 按落盘方式保存结果，返回最终写入的路径。
pub(crate) fn persist(
    image: &DynamicImage,
    source: &Path,
    mode: SaveMode,
    format: ImageFormat,
    copy_suffix: &str,
) -> Result<PathBuf, LabelError> {
    ensure_encoder(format)?;

    match mode {
        SaveMode::Overwrite => {
            let temp = temp_sibling_path(source, format);
            log::debug!("💾 写入临时文件：{}", temp.display());

            if let Err(err) = encode_to(image, &temp, format) {
                remove_temp(&temp);
                return Err(LabelError::SaveTemp(format!("{}：{}", temp.display(), err)));
            }

            replace_original(&temp, source)?;
            Ok(source.to_path_buf())
        }
        SaveMode::Copy => {
            let destination = labeled_copy_path(source, copy_suffix);
            log::debug!("💾 另存副本：{}", destination.display());

            encode_to(image, &destination, format)
                .map_err(|e| LabelError::SaveCopy(format!("{}：{}", destination.display(), e)))?;
            Ok(destination)
        }
    }
}
