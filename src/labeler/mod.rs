//! # 图片加标签模块（labeler）
//!
//! ## 设计思路
//!
//! 该模块将“加载校验 → 版式推导 → 合成渲染 → 编码落盘”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。
//!
//! - `handler`：编排整条处理流水线（含阶段耗时日志）
//! - `loader`：本地文件读取、签名/体积/像素校验、解码
//! - `layout`：内边距、字号、遮罩条高度等纯几何计算
//! - `font`：字体族偏好选择与系统字体查找
//! - `render`：换行、截断、遮罩条与阴影文字合成
//! - `persist`：临时文件 + 原子替换 / 另存副本
//! - `config/error`：配置与错误
//!
//! ## 新同事快速上手
//!
//! ```text
//! app.rs（用户确认标签与落盘方式）
//!    ↓
//! handler.rs（ImageLabeler::label）
//!    ├─ loader.rs（读取 + 校验 + 解码）
//!    ├─ font.rs（选字体）
//!    ├─ render.rs（layout.rs 推导几何 → 遮罩条 → 阴影 → 正文）
//!    └─ persist.rs（临时文件 → 原子替换 / 副本）
//!    ↓
//! 返回保存路径或 LabelError
//! ```

mod config;
mod error;
mod font;
mod handler;
mod layout;
mod loader;
mod persist;
mod render;

pub use config::{LabelConfig, SaveMode};
pub use error::LabelError;
pub use font::{FontLocator, LabelFont, resolve_label_font, select_family};
pub use handler::ImageLabeler;
pub use layout::{LabelGeometry, TextRect, font_size_for, padding_for, scrim_height_for};
pub use persist::labeled_copy_path;
