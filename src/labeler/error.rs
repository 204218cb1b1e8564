//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载加标签链路中的所有失败来源，避免字符串拼接式错误处理。
//! 每个保存阶段各有独立分支，调用侧可以准确报告“哪一步失败”，
//! 同时保证任何分支都不会让原图处于半写入状态。

/// 加标签链路统一错误类型。
///
/// 该类型会在应用层被上转为 `AppError`，最终以错误提示 + 退出码 3 呈现给用户。
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("无法加载图片：{0}")]
    Load(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("没有可用的字体：{0}")]
    FontUnavailable(String),

    #[error("找不到可用的编码器：{0}")]
    EncoderUnavailable(String),

    #[error("写入临时文件失败：{0}")]
    SaveTemp(String),

    #[error("替换原图失败：{0}")]
    Replace(String),

    #[error("保存副本失败：{0}")]
    SaveCopy(String),
}
