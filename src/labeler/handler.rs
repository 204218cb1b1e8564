//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageLabeler` 只负责流程编排，不直接与任何 UI 绑定。
//! 处理链路固定为：
//! 1. 加载并校验图片
//! 2. 解析字体、推导版式、合成遮罩条与文字
//! 3. 按落盘方式编码保存
//!
//! ## 实现思路
//!
//! - 图片缓冲只在单次调用内存在，任何退出路径都会随作用域释放。
//! - 记录 `load/render/save/total` 阶段耗时，便于性能诊断。

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::DynamicImage;

use super::font::{FontLocator, resolve_label_font};
use super::loader::load_image;
use super::persist::{ensure_encoder, persist};
use super::render::compose_label;
use super::{LabelConfig, LabelError, SaveMode};

/// 图片加标签处理器。
pub struct ImageLabeler {
    config: LabelConfig,
    locator: FontLocator,
}

impl ImageLabeler {
    /// 使用系统字体目录创建处理器。
    pub fn new(config: LabelConfig) -> Self {
        Self::with_locator(config, FontLocator::system())
    }

    /// 使用自定义字体查找器创建处理器。
    pub fn with_locator(config: LabelConfig, locator: FontLocator) -> Self {
        Self { config, locator }
    }

    /// 处理主入口：给 `source` 加上 `text` 标签并保存，返回最终写入的路径。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use piclab::labeler::{ImageLabeler, LabelConfig, SaveMode};
    ///
    /// let labeler = ImageLabeler::new(LabelConfig::default());
    /// let saved = labeler.label("C:/tmp/photo.png".as_ref(), "Sunset Beach", SaveMode::Copy)?;
    /// assert!(saved.ends_with("photo_labeled.png"));
    /// # Ok::<(), piclab::labeler::LabelError>(())
    /// ```
    pub fn label(&self, source: &Path, text: &str, mode: SaveMode) -> Result<PathBuf, LabelError> {
        let total_start = Instant::now();

        let load_start = Instant::now();
        let decoded = load_image(source, &self.config)?;
        let load_elapsed = load_start.elapsed();

        // 编码器与字体都在写盘之前确认，任何一项不可用时原图保持原样
        ensure_encoder(self.config.output_format)?;
        let font = resolve_label_font(&self.config, &self.locator).ok_or_else(|| {
            LabelError::FontUnavailable(format!(
                "偏好字体均未安装：{}",
                self.config.font_families.join(", ")
            ))
        })?;

        let render_start = Instant::now();
        let has_alpha = decoded.color().has_alpha();
        let (canvas, geometry) = compose_label(decoded.into_rgba8(), text, &font, &self.config);
        let output = if has_alpha {
            DynamicImage::ImageRgba8(canvas)
        } else {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).into_rgb8())
        };
        let render_elapsed = render_start.elapsed();

        let save_start = Instant::now();
        let saved = persist(
            &output,
            source,
            mode,
            self.config.output_format,
            &self.config.copy_suffix,
        )?;
        let save_elapsed = save_start.elapsed();

        log::info!(
            "✅ 标签已写入 {} - font={} scrim={:.0}px load={}ms render={}ms save={}ms total={}ms",
            saved.display(),
            font.family(),
            geometry.scrim_height,
            load_elapsed.as_millis(),
            render_elapsed.as_millis(),
            save_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(saved)
    }
}
