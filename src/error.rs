//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，应用流程中的每一步都返回 `Result<T, AppError>`，
//! 最终由 `app::run` 统一转换为“用户提示 + 进程退出码”。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `LabelError` 提供 `From` 转换，无需手动 map。
//! - `exit_code` 集中维护错误到退出码的映射。

use crate::labeler::LabelError;

/// 用法错误的退出码。
pub const EXIT_USAGE: i32 = 1;
/// 源文件不存在的退出码。
pub const EXIT_NOT_FOUND: i32 = 2;
/// 处理失败的退出码。
pub const EXIT_FAILURE: i32 = 3;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 缺少参数或参数无效
    #[error("{0}")]
    Usage(String),

    /// 源文件不存在
    #[error("文件不存在：\n{0}")]
    NotFound(String),

    /// 无法创建输入窗口
    #[error("无法显示界面：{0}")]
    UiInit(String),

    /// 加标签流水线错误（加载 / 编码 / 保存 / 替换）
    #[error("{0}")]
    Label(#[from] LabelError),
}

impl AppError {
    /// 错误对应的进程退出码。
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::NotFound(_) => EXIT_NOT_FOUND,
            Self::UiInit(_) | Self::Label(_) => EXIT_FAILURE,
        }
    }
}
