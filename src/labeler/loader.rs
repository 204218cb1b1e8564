//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 在“尽可能早”的阶段执行输入校验：体积 → 文件签名 → 文件头尺寸 → 完整解码。
//! 目标是尽快失败，避免对非图片或超大文件做无谓的解码。

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageReader};

use super::{LabelConfig, LabelError};

/// 从本地路径读取并解码图片。
pub(crate) fn load_image(path: &Path, config: &LabelConfig) -> Result<DynamicImage, LabelError> {
    log::info!("📁 开始读取本地图片 - 路径: {}", path.display());

    let metadata = std::fs::metadata(path)
        .map_err(|e| LabelError::Load(format!("无法读取文件信息：{}", e)))?;

    if !metadata.is_file() {
        return Err(LabelError::Load(format!("不是普通文件：{}", path.display())));
    }

    if metadata.len() > config.max_file_size {
        return Err(LabelError::ResourceLimit(format!(
            "文件过大：{:.2} MB（限制：{:.2} MB）",
            metadata.len() as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes =
        std::fs::read(path).map_err(|e| LabelError::Load(format!("无法读取图片文件：{}", e)))?;
    validate_image_signature(&bytes)?;

    let (header_width, header_height) = inspect_dimensions_from_memory(&bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| LabelError::Load(format!("图片解码失败：{}", e)))?;

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(LabelError::Load("图片尺寸为 0".to_string()));
    }

    log::info!("✅ 图片解码成功 - 尺寸: {}x{} 颜色: {:?}", width, height, decoded.color());
    Ok(decoded)
}

/// 通过文件签名（magic bytes）校验输入是否为图片。
fn validate_image_signature(bytes: &[u8]) -> Result<(), LabelError> {
    if bytes.is_empty() {
        return Err(LabelError::Load("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| LabelError::Load("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(LabelError::Load(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(())
}

/// 仅通过图片头信息读取宽高，用于在完整解码前做像素限制检查。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), LabelError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LabelError::Load(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| LabelError::Load(format!("无法读取图片尺寸：{}", e)))
}

/// 校验像素数量是否超过配置上限。
fn validate_pixel_limits(config: &LabelConfig, width: u32, height: u32) -> Result<(), LabelError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| LabelError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(LabelError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}
