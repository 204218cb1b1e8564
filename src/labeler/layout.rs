//! # 版式计算模块
//!
//! 根据图片尺寸与文字测量结果推导内边距、字号、遮罩条高度以及文字绘制区域。
//!
//! # 设计思路
//!
//! - 算法纯函数化：输入为图片宽高、文字测量高度与配置，输出唯一几何结果，便于测试。
//! - 所有尺寸均以图片高度为基准，保证不同分辨率下视觉占比一致。
//! - 遮罩条高度先取下限再取上限：极矮的图片上限优先，标签条永远不会喧宾夺主。

use super::LabelConfig;

/// 测量文字时使用的版式框高度（像素），只用于得到换行后的自然高度。
pub(crate) const MEASURE_BOX_HEIGHT: f32 = 1000.0;

/// 轴对齐矩形（像素，浮点坐标）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TextRect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// 整体平移后的矩形（用于阴影层）。
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// 单张图片的标签几何参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelGeometry {
    /// 图片高度（像素）。
    pub image_height: u32,
    /// 内边距（像素）。
    pub padding: f32,
    /// 字号（磅）。
    pub font_size: f32,
    /// 遮罩条高度（像素）。
    pub scrim_height: f32,
    /// 文字绘制区域：遮罩条扣除内边距后的内部区域。
    pub text_rect: TextRect,
}

/// 内边距：`max(min_padding, H * padding_ratio)`。
pub fn padding_for(height: u32, config: &LabelConfig) -> f32 {
    (height as f64 * config.padding_ratio).max(config.min_padding) as f32
}

/// 字号（磅）：`max(min_font_size, H * font_size_ratio)`。
pub fn font_size_for(height: u32, config: &LabelConfig) -> f32 {
    (height as f64 * config.font_size_ratio).max(config.min_font_size) as f32
}

/// 文字换行宽度：图片宽度扣除左右内边距，不小于 0。
pub fn wrap_width_for(width: u32, padding: f32) -> f32 {
    (width as f32 - 2.0 * padding).max(0.0)
}

/// 遮罩条高度。
///
/// `min(max(text_h + 2 * padding, max(H * min_ratio, min_px)), H * max_ratio)`
///
/// 上限最后生效，因此高度不足 120 像素的图片得到的是 `H * max_ratio`。
/// 这里刻意不用 `f64::clamp`：下限大于上限时它会 panic。
pub fn scrim_height_for(height: u32, text_height: f32, padding: f32, config: &LabelConfig) -> f32 {
    let h = height as f64;
    let natural = text_height as f64 + 2.0 * padding as f64;
    let lower = (h * config.scrim_min_ratio).max(config.scrim_min_height);
    let upper = h * config.scrim_max_ratio;
    natural.max(lower).min(upper) as f32
}

impl LabelGeometry {
    /// 根据图片尺寸与测量得到的文字高度推导完整几何参数。
    pub fn compute(width: u32, height: u32, text_height: f32, config: &LabelConfig) -> Self {
        let padding = padding_for(height, config);
        let font_size = font_size_for(height, config);
        let scrim_height = scrim_height_for(height, text_height, padding, config);

        let text_rect = TextRect {
            x: padding,
            y: height as f32 - scrim_height + padding,
            width: wrap_width_for(width, padding),
            height: (scrim_height - 2.0 * padding).max(0.0),
        };

        Self {
            image_height: height,
            padding,
            font_size,
            scrim_height,
            text_rect,
        }
    }

    /// 遮罩条覆盖的第一行像素（含）。
    pub fn scrim_top_row(&self) -> u32 {
        (self.image_height as f32 - self.scrim_height).round().max(0.0) as u32
    }
}
