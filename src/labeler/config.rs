//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调参数”集中到 `LabelConfig`，保证版式、配色、落盘行为可观测、可调整、可测试。
//! 比例类参数均以图片高度为基准，使标签在任意分辨率下保持一致的视觉占比。
//!
//! ## 实现思路
//!
//! - `Default` 提供与资源管理器右键工具一致的默认版式。
//! - `SaveMode` 表示“覆盖原图 / 另存副本”两种落盘策略。
//! - 设置文件（见 `crate::settings`）只覆盖需要调整的字段，其余沿用默认值。

use std::path::PathBuf;

use image::ImageFormat;

/// 结果的落盘方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// 先写同目录临时文件，再原子替换原图。
    Overwrite,
    /// 写入 `<原文件名><后缀><扩展名>` 兄弟文件，原图保持不变。
    Copy,
}

/// 加标签流程配置。
///
/// 字段覆盖加载限制、版式比例、配色、字体与落盘四个阶段。
#[derive(Debug, Clone)]
pub struct LabelConfig {
    /// 允许读取的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码前按文件头尺寸校验的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 内边距占图片高度的比例。
    pub padding_ratio: f64,
    /// 内边距下限（像素）。
    pub min_padding: f64,
    /// 字号占图片高度的比例（单位：磅）。
    pub font_size_ratio: f64,
    /// 字号下限（磅）。
    pub min_font_size: f64,
    /// 遮罩条高度下限占图片高度的比例。
    pub scrim_min_ratio: f64,
    /// 遮罩条高度下限（像素）。
    pub scrim_min_height: f64,
    /// 遮罩条高度上限占图片高度的比例。
    pub scrim_max_ratio: f64,
    /// 遮罩条颜色（RGBA），默认约 47% 不透明的黑色。
    pub scrim_color: [u8; 4],
    /// 阴影文字颜色（RGBA）。
    pub shadow_color: [u8; 4],
    /// 前景文字颜色（RGBA）。
    pub text_color: [u8; 4],
    /// 阴影相对正文的偏移（像素，x/y 相同）。
    pub shadow_offset: i32,
    /// 字体族优先级列表，第一个可用的生效。
    pub font_families: Vec<String>,
    /// 显式指定的字体文件，优先于字体族查找。
    pub font_file: Option<PathBuf>,
    /// 另存副本时插入到扩展名前的后缀。
    pub copy_suffix: String,
    /// 输出编码格式。
    pub output_format: ImageFormat,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            padding_ratio: 0.012,
            min_padding: 8.0,
            font_size_ratio: 0.042,
            min_font_size: 10.0,
            scrim_min_ratio: 0.05,
            scrim_min_height: 18.0,
            scrim_max_ratio: 0.15,
            scrim_color: [0, 0, 0, 120],
            shadow_color: [0, 0, 0, 160],
            text_color: [255, 255, 255, 255],
            shadow_offset: 1,
            font_families: vec![
                "Segoe UI".to_string(),
                "Arial".to_string(),
                "DejaVu Sans".to_string(),
            ],
            font_file: None,
            copy_suffix: "_labeled".to_string(),
            output_format: ImageFormat::Png,
        }
    }
}
