//! # PicLab 图片标签工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │        资源管理器右键菜单 → piclab.exe "<图片路径>"       │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ 命令行参数
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ app ──────── 参数解析 + 流程编排 + 退出码             │
//! │  │                                                       │
//! │  ├─ prompt ───── UserInterface (Win32 / 控制台)           │
//! │  │   ├─ PromptSession   输入框状态机                      │
//! │  │   └─ placement       对话框居中                        │
//! │  │                                                       │
//! │  ├─ labeler ──── 加载·版式·合成·落盘                      │
//! │  ├─ shell        资源管理器刷新通知                       │
//! │  ├─ settings     可选 JSON 设置                           │
//! │  └─ error        AppError (统一错误类型)                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`app`] | 解析参数，串联输入、确认、加标签、通知，映射退出码 |
//! | [`error`] | 统一错误类型 `AppError` 与退出码常量 |
//! | [`labeler`] | 图片加载校验、遮罩条与阴影文字合成、临时文件 + 原子替换 |
//! | [`prompt`] | 标签输入框、覆盖/副本确认、结果提示 |
//! | [`settings`] | 设置文件的查找、解析与到 `LabelConfig` 的映射 |
//! | [`shell`] | 保存后通知资源管理器刷新 |

pub mod app;
pub mod error;
pub mod labeler;
pub mod prompt;
pub mod settings;
pub mod shell;
