//! # 合成渲染模块
//!
//! ## 设计思路
//!
//! 将“测量 → 换行 → 截断 → 遮罩条 → 阴影文字 → 前景文字”集中在一处。
//! 换行交给 `textwrap` 的 first-fit 算法（片段宽度取真实字形步进），
//! 绘制交给 `imageproc`：遮罩条是 `Blend` 画布上的实心矩形，
//! 文字先栅格化为绘制区大小的覆盖率蒙版，再按覆盖率 source-over 叠加。
//!
//! ## 实现思路
//!
//! 1. `TextMeasure` 抽象字宽/行高，真实字体走 `ab_glyph`
//! 2. 按空格切词后 first-fit 换行，超过整行宽度的单词按字符切成若干片段
//! 3. 行数超出绘制区时只保留完整可见行，末行以省略号收尾
//! 4. 文字块在绘制区内垂直居中、水平靠左；蒙版与绘制区同尺寸，天然裁剪到绘制区内部

use ab_glyph::{Font, PxScale, PxScaleFont, ScaleFont};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{Blend, Canvas, draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use textwrap::WordSeparator;
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;

use super::LabelConfig;
use super::font::LabelFont;
use super::layout::{
    LabelGeometry, MEASURE_BOX_HEIGHT, TextRect, font_size_for, padding_for, wrap_width_for,
};

pub(crate) const ELLIPSIS: char = '…';

/// 屏幕 DPI 下 1 磅对应的像素数。
const PX_PER_PT: f32 = 96.0 / 72.0;

/// 文字度量抽象。
pub(crate) trait TextMeasure {
    /// 单行文字的水平步进总宽（像素）。
    fn advance(&self, text: &str) -> f32;
    /// 行高（像素）。
    fn line_height(&self) -> f32;
}

/// 基于真实字形的度量。
pub(crate) struct GlyphMetrics<'a> {
    scaled: PxScaleFont<&'a ab_glyph::FontArc>,
}

impl<'a> GlyphMetrics<'a> {
    pub(crate) fn new(font: &'a LabelFont, scale: PxScale) -> Self {
        Self {
            scaled: font.font.as_scaled(scale),
        }
    }
}

impl TextMeasure for GlyphMetrics<'_> {
    fn advance(&self, text: &str) -> f32 {
        let mut width = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            let id = self.scaled.glyph_id(ch);
            if let Some(prev_id) = prev {
                width += self.scaled.kern(prev_id, id);
            }
            width += self.scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    fn line_height(&self) -> f32 {
        self.scaled.height() + self.scaled.line_gap()
    }
}

/// 将磅值字号换算为字体缩放。
pub(crate) fn px_scale_for(font: &LabelFont, font_size_pt: f32) -> PxScale {
    font.font
        .pt_to_px_scale(font_size_pt)
        .unwrap_or_else(|| PxScale::from(font_size_pt * PX_PER_PT))
}

/// 换行片段：宽度以像素计，单词之间的空白单独计宽。
#[derive(Debug)]
struct Piece<'a> {
    text: &'a str,
    whitespace: &'a str,
    width: f64,
    whitespace_width: f64,
}

impl Fragment for Piece<'_> {
    fn width(&self) -> f64 {
        self.width
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace_width
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// 把超过整行宽度的单词按字符切成若干片段，每段尽量填满一行。
fn split_wide_word<'a>(
    word: &'a str,
    whitespace: &'a str,
    max_width: f32,
    measure: &dyn TextMeasure,
    pieces: &mut Vec<Piece<'a>>,
) {
    let mut start = 0;
    for (index, ch) in word.char_indices() {
        let end = index + ch.len_utf8();
        if index > start && measure.advance(&word[start..end]) > max_width {
            pieces.push(Piece {
                text: &word[start..index],
                whitespace: "",
                width: measure.advance(&word[start..index]) as f64,
                whitespace_width: 0.0,
            });
            start = index;
        }
    }
    pieces.push(Piece {
        text: &word[start..],
        whitespace,
        width: measure.advance(&word[start..]) as f64,
        whitespace_width: measure.advance(whitespace) as f64,
    });
}

/// 按词 first-fit 换行；超出宽度的单词按字符断开。
pub(crate) fn wrap_lines(text: &str, max_width: f32, measure: &dyn TextMeasure) -> Vec<String> {
    if max_width <= 0.0 {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        // 制表符等空白统一折叠为单个空格，切词只按 ASCII 空格进行
        let normalized = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");

        let mut pieces = Vec::new();
        for word in WordSeparator::AsciiSpace.find_words(&normalized) {
            if word.word.is_empty() {
                continue;
            }
            if measure.advance(word.word) > max_width {
                split_wide_word(word.word, word.whitespace, max_width, measure, &mut pieces);
            } else {
                pieces.push(Piece {
                    text: word.word,
                    whitespace: word.whitespace,
                    width: measure.advance(word.word) as f64,
                    whitespace_width: measure.advance(word.whitespace) as f64,
                });
            }
        }

        for line in wrap_first_fit(&pieces, &[max_width as f64]) {
            let mut joined = String::new();
            for piece in line {
                joined.push_str(piece.text);
                joined.push_str(piece.whitespace);
            }
            let joined = joined.trim_end();
            if !joined.is_empty() {
                lines.push(joined.to_string());
            }
        }
    }

    lines
}

fn max_visible_lines(box_height: f32, line_height: f32) -> usize {
    if line_height <= 0.0 {
        return 1;
    }
    ((box_height / line_height).floor() as usize).max(1)
}

/// 文字在给定宽度下换行后的自然高度（受测量框高度限制）。
pub(crate) fn measure_text_height(text: &str, max_width: f32, measure: &dyn TextMeasure) -> f32 {
    let lines = wrap_lines(text, max_width, measure);
    let visible = lines
        .len()
        .min(max_visible_lines(MEASURE_BOX_HEIGHT, measure.line_height()));
    visible as f32 * measure.line_height()
}

/// 末尾追加省略号，并删去字符直到整行不超过宽度。
fn ellipsize(line: &str, max_width: f32, measure: &dyn TextMeasure) -> String {
    let mut kept: Vec<char> = line.trim_end().chars().collect();
    loop {
        let mut candidate: String = kept.iter().collect();
        candidate.push(ELLIPSIS);
        if kept.is_empty() || measure.advance(&candidate) <= max_width {
            return candidate;
        }
        kept.pop();
    }
}

/// 只保留能完整放进绘制区的行（至少一行），被截断时末行以省略号结尾。
pub(crate) fn fit_lines(
    lines: Vec<String>,
    box_height: f32,
    max_width: f32,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let max_lines = max_visible_lines(box_height, measure.line_height());
    if lines.len() <= max_lines {
        return lines;
    }

    let mut visible: Vec<String> = lines.into_iter().take(max_lines).collect();
    if let Some(last) = visible.last_mut() {
        *last = ellipsize(last, max_width, measure);
    }
    visible
}

/// `rect` 与图片相交部分的整数像素范围 `(x, y, width, height)`。
fn pixel_bounds(rect: TextRect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let x0 = rect.x.floor().max(0.0) as u32;
    let y0 = rect.y.floor().max(0.0) as u32;
    let x1 = (rect.right().ceil().max(0.0) as u32).min(width);
    let y1 = (rect.bottom().ceil().max(0.0) as u32).min(height);
    (x0 < x1 && y0 < y1).then(|| (x0, y0, x1 - x0, y1 - y0))
}

/// 在 `rect` 内垂直居中、靠左绘制多行文字，超出 `rect` 的部分被裁掉。
fn draw_lines(
    canvas: &mut Blend<RgbaImage>,
    font: &LabelFont,
    scale: PxScale,
    lines: &[String],
    rect: TextRect,
    color: [u8; 4],
) {
    let (width, height) = canvas.0.dimensions();
    let Some((x0, y0, mask_width, mask_height)) = pixel_bounds(rect, width, height) else {
        return;
    };

    let scaled = font.font.as_scaled(scale);
    let line_height = scaled.height() + scaled.line_gap();
    let block_top = rect.y + (rect.height - lines.len() as f32 * line_height) / 2.0;

    let mut mask = GrayImage::new(mask_width, mask_height);
    for (index, line) in lines.iter().enumerate() {
        let top = block_top + index as f32 * line_height;
        draw_text_mut(
            &mut mask,
            Luma([u8::MAX]),
            (rect.x - x0 as f32).round() as i32,
            (top - y0 as f32).round() as i32,
            scale,
            &font.font,
            line,
        );
    }

    for (mx, my, coverage) in mask.enumerate_pixels() {
        if coverage[0] == 0 {
            continue;
        }
        let alpha = (color[3] as u32 * coverage[0] as u32 + 127) / 255;
        canvas.draw_pixel(
            x0 + mx,
            y0 + my,
            Rgba([color[0], color[1], color[2], alpha as u8]),
        );
    }
}

/// 在图片底部合成遮罩条与阴影文字，返回合成后的图片与本次使用的几何参数。
pub(crate) fn compose_label(
    image: RgbaImage,
    text: &str,
    font: &LabelFont,
    config: &LabelConfig,
) -> (RgbaImage, LabelGeometry) {
    let (width, height) = image.dimensions();
    let padding = padding_for(height, config);
    let font_size = font_size_for(height, config);
    let wrap_width = wrap_width_for(width, padding);

    let scale = px_scale_for(font, font_size);
    let measure = GlyphMetrics::new(font, scale);

    let text_height = measure_text_height(text, wrap_width, &measure);
    let geometry = LabelGeometry::compute(width, height, text_height, config);

    log::debug!(
        "📐 版式：padding={:.1} font={:.1}pt text_h={:.1} scrim_h={:.1}",
        geometry.padding,
        geometry.font_size,
        text_height,
        geometry.scrim_height
    );

    // 不透明底图上 source-over 的结果仍应完全不透明
    let opaque = image.pixels().all(|p| p[3] == u8::MAX);
    let mut canvas = Blend(image);

    let top = geometry.scrim_top_row();
    if width > 0 && top < height {
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(0, top as i32).of_size(width, height - top),
            Rgba(config.scrim_color),
        );
    }

    let rect = geometry.text_rect;
    let lines = fit_lines(
        wrap_lines(text, rect.width, &measure),
        rect.height,
        rect.width,
        &measure,
    );
    let offset = config.shadow_offset as f32;

    draw_lines(
        &mut canvas,
        font,
        scale,
        &lines,
        rect.offset(offset, offset),
        config.shadow_color,
    );
    draw_lines(&mut canvas, font, scale, &lines, rect, config.text_color);

    let mut image = canvas.0;
    if opaque {
        for y in top.min(height)..height {
            for x in 0..width {
                image.get_pixel_mut(x, y)[3] = u8::MAX;
            }
        }
    }

    (image, geometry)
}
