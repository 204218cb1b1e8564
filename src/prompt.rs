//! 用户交互模块（分层门面）
//!
//! - `console`：基于读写流的文本交互（非 Windows 平台与测试使用）
//! - `win32`：Win32 模态输入窗口与消息框
//! - `placement`：对话框居中等纯几何计算
//!
//! # 设计思路
//!
//! 所有用户可见交互都收敛到 `UserInterface` trait：输入标签、三选一确认、结果提示。
//! 输入框的“接受 / 取消”语义由 `PromptSession` 统一实现，各后端只负责显示与事件转发，
//! 保证任意后端下“空白输入等同取消”的规则一致。

mod console;
mod placement;
#[cfg(target_os = "windows")]
mod win32;

pub use console::ConsoleUi;
pub use placement::centered_origin;
#[cfg(target_os = "windows")]
pub use win32::{Win32Ui, show_fatal_notice};

use crate::error::AppError;
use crate::labeler::SaveMode;

/// 对话框与消息框标题。
pub const APP_TITLE: &str = "PicLab 图片标签";

/// 输入框一次提交的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// 已接受：去除首尾空白后的非空文字。
    Accepted(String),
    /// 用户取消、关闭窗口或提交了空白内容。
    Cancelled,
}

impl PromptOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// 将一次提交的原始文字转换为结果：去除首尾空白，空白内容视为取消。
///
/// # 示例
/// ```rust
/// use piclab::prompt::{evaluate_submission, PromptOutcome};
///
/// assert_eq!(
///     evaluate_submission("  Sunset Beach \n"),
///     PromptOutcome::Accepted("Sunset Beach".into())
/// );
/// assert_eq!(evaluate_submission(" \t "), PromptOutcome::Cancelled);
/// ```
pub fn evaluate_submission(raw: &str) -> PromptOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        PromptOutcome::Cancelled
    } else {
        PromptOutcome::Accepted(trimmed.to_string())
    }
}

/// 输入框生命周期阶段：`Created → Shown → {Accepted | Cancelled} → Destroyed`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPhase {
    Created,
    Shown,
    Accepted,
    Cancelled,
    Destroyed,
}

/// 单次输入会话，一次性使用，不可重入。
#[derive(Debug)]
pub struct PromptSession {
    phase: PromptPhase,
    outcome: PromptOutcome,
}

impl Default for PromptSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptSession {
    pub fn new() -> Self {
        Self {
            phase: PromptPhase::Created,
            outcome: PromptOutcome::Cancelled,
        }
    }

    pub fn phase(&self) -> PromptPhase {
        self.phase
    }

    /// 标记为已显示；只允许从 `Created` 进入。
    pub fn show(&mut self) {
        if self.phase == PromptPhase::Created {
            self.phase = PromptPhase::Shown;
        }
    }

    /// 用户点击确定。非 `Shown` 阶段的提交被忽略。
    pub fn submit(&mut self, raw: &str) {
        if self.phase != PromptPhase::Shown {
            return;
        }
        self.outcome = evaluate_submission(raw);
        self.phase = if self.outcome.accepted() {
            PromptPhase::Accepted
        } else {
            PromptPhase::Cancelled
        };
    }

    /// 用户取消或关闭窗口。
    pub fn cancel(&mut self) {
        if self.phase == PromptPhase::Shown {
            self.outcome = PromptOutcome::Cancelled;
            self.phase = PromptPhase::Cancelled;
        }
    }

    /// 是否已得出结果（窗口可以销毁）。
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, PromptPhase::Accepted | PromptPhase::Cancelled)
    }

    /// 结束会话并取出结果。
    pub fn finish(&mut self) -> PromptOutcome {
        self.phase = PromptPhase::Destroyed;
        std::mem::replace(&mut self.outcome, PromptOutcome::Cancelled)
    }
}

/// 提示类型，决定消息框图标。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// 覆盖 / 副本确认框的正文。
pub fn confirmation_message(label: &str) -> String {
    format!(
        "添加标签：\n\n  \"{label}\"\n\n是 = 覆盖原图\n否 = 另存副本（*_labeled）\n取消 = 放弃"
    )
}

/// 所有用户可见交互。
pub trait UserInterface {
    /// 显示模态输入框并阻塞到用户确定或取消。
    ///
    /// 窗口无法创建时返回 `AppError::UiInit`。
    fn prompt_label(&mut self) -> Result<PromptOutcome, AppError>;

    /// 三选一确认：覆盖原图 / 另存副本 / 取消（`None`）。
    fn choose_save_mode(&mut self, label: &str) -> Result<Option<SaveMode>, AppError>;

    /// 显示模态提示。
    fn notify(&mut self, kind: NoticeKind, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn whitespace_submission_is_cancelled() {
        assert_eq!(evaluate_submission(""), PromptOutcome::Cancelled);
        assert_eq!(evaluate_submission("   \t\r\n"), PromptOutcome::Cancelled);
        assert!(!evaluate_submission(" ").accepted());
    }

    #[test]
    fn session_accepts_trimmed_text() {
        let mut session = PromptSession::new();
        assert_eq!(session.phase(), PromptPhase::Created);

        session.show();
        session.submit("  x  ");
        assert_eq!(session.phase(), PromptPhase::Accepted);
        assert!(session.is_settled());

        assert_eq!(session.finish(), PromptOutcome::Accepted("x".to_string()));
        assert_eq!(session.phase(), PromptPhase::Destroyed);
    }

    #[test]
    fn session_blank_submit_counts_as_cancel() {
        let mut session = PromptSession::new();
        session.show();
        session.submit("   ");
        assert_eq!(session.phase(), PromptPhase::Cancelled);
        assert_eq!(session.finish(), PromptOutcome::Cancelled);
    }

    #[test]
    fn session_ignores_events_outside_shown_phase() {
        let mut session = PromptSession::new();
        session.submit("too early");
        assert_eq!(session.phase(), PromptPhase::Created);

        session.show();
        session.cancel();
        session.submit("too late");
        assert_eq!(session.phase(), PromptPhase::Cancelled);
        assert_eq!(session.finish(), PromptOutcome::Cancelled);
    }

    #[test]
    fn confirmation_message_quotes_label() {
        assert!(confirmation_message("Sunset Beach").contains("\"Sunset Beach\""));
    }

    proptest! {
        #[test]
        fn accepted_text_is_exactly_trimmed(raw in "\\PC{0,40}") {
            match evaluate_submission(&raw) {
                PromptOutcome::Accepted(text) => {
                    prop_assert_eq!(text.as_str(), raw.trim());
                    prop_assert!(!text.is_empty());
                }
                PromptOutcome::Cancelled => prop_assert!(raw.trim().is_empty()),
            }
        }

        #[test]
        fn whitespace_only_is_always_cancelled(raw in "[ \\t\\r\\n]{0,20}") {
            prop_assert_eq!(evaluate_submission(&raw), PromptOutcome::Cancelled);
        }
    }
}
