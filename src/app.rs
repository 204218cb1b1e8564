//! 应用流程编排
//!
//! 一次调用处理一张图片：解析参数 → 校验路径 → 输入标签 → 确认落盘方式 →
//! 加标签保存 → 通知资源管理器 → 提示结果。
//!
//! 所有交互经由 `UserInterface`，外壳刷新经由 `HostShell`，便于在测试中替换。

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};

use crate::error::AppError;
use crate::labeler::{ImageLabeler, LabelError, SaveMode};
use crate::prompt::{NoticeKind, PromptOutcome, UserInterface};
use crate::settings::Settings;
use crate::shell::HostShell;

const USAGE: &str = "用法：\n  piclab <图片路径>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Overwrite,
    Copy,
}

impl From<ModeArg> for SaveMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Overwrite => SaveMode::Overwrite,
            ModeArg::Copy => SaveMode::Copy,
        }
    }
}

/// 给图片底部加上一条带文字的半透明标签。
#[derive(Debug, Parser)]
#[command(name = "piclab", version, about)]
struct Cli {
    /// 要加标签的图片
    image: Option<PathBuf>,

    /// 直接指定标签文字，跳过输入框
    #[arg(long)]
    label: Option<String>,

    /// 直接指定落盘方式，跳过确认框
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
}

/// 一次调用的正常结束方式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 已保存到该路径。
    Saved(PathBuf),
    /// 用户在输入或确认阶段取消。
    Cancelled,
    /// 只显示了帮助或版本信息。
    Displayed,
}

enum Invocation {
    Run(Cli),
    Displayed(String),
}

fn parse_invocation<I, T>(args: I) -> Result<Invocation, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Invocation::Run(cli)),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Invocation::Displayed(err.render().to_string()))
        }
        Err(err) => Err(AppError::Usage(format!("{}\n{}", err.render(), USAGE))),
    }
}

/// 执行完整流程，返回正常结束方式或第一个错误。
///
/// 不负责把错误展示给用户，见 [`run`]。
pub fn execute<I, T>(
    args: I,
    settings: &Settings,
    ui: &mut dyn UserInterface,
    shell: &dyn HostShell,
) -> Result<Outcome, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match parse_invocation(args)? {
        Invocation::Run(cli) => cli,
        Invocation::Displayed(text) => {
            ui.notify(NoticeKind::Info, &text);
            return Ok(Outcome::Displayed);
        }
    };

    let source = match cli.image {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => return Err(AppError::Usage(USAGE.to_string())),
    };

    if !source.exists() {
        return Err(AppError::NotFound(source.display().to_string()));
    }
    log::info!("📷 准备加标签: {}", source.display());

    let label = match cli.label {
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(AppError::Usage("--label 不能为空".to_string()));
            }
            trimmed.to_string()
        }
        None => match ui.prompt_label()? {
            PromptOutcome::Accepted(text) => text,
            PromptOutcome::Cancelled => {
                log::info!("用户取消了标签输入");
                return Ok(Outcome::Cancelled);
            }
        },
    };

    let mode = match cli.mode {
        Some(mode) => mode.into(),
        None => match ui.choose_save_mode(&label)? {
            Some(mode) => mode,
            None => {
                log::info!("用户取消了保存确认");
                return Ok(Outcome::Cancelled);
            }
        },
    };
    log::debug!("标签: {label:?}, 落盘方式: {mode:?}");

    let labeler = ImageLabeler::new(settings.to_label_config());
    let saved = labeler.label(&source, &label, mode)?;

    shell.item_changed(&saved);
    ui.notify(NoticeKind::Info, &format!("已保存：\n{}", saved.display()));

    Ok(Outcome::Saved(saved))
}

/// 执行流程并把错误转换为用户提示 + 退出码。
pub fn run<I, T>(
    args: I,
    settings: &Settings,
    ui: &mut dyn UserInterface,
    shell: &dyn HostShell,
) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match execute(args, settings, ui, shell) {
        Ok(outcome) => {
            log::info!("✅ 结束: {outcome:?}");
            0
        }
        Err(err) => {
            let code = err.exit_code();
            log::error!("❌ 处理失败 (exit {code}): {err}");
            match &err {
                AppError::Usage(message) => ui.notify(NoticeKind::Info, message),
                AppError::Label(inner @ LabelError::FontUnavailable(_)) => {
                    ui.notify(NoticeKind::Error, &format!("无法添加标签：\n{inner}"))
                }
                AppError::Label(inner) => {
                    ui.notify(NoticeKind::Error, &format!("写入图片失败：\n{inner}"))
                }
                AppError::NotFound(_) | AppError::UiInit(_) => {
                    ui.notify(NoticeKind::Error, &err.to_string())
                }
            }
            code
        }
    }
}

/// 交互后端无法创建时的收尾：记录日志，尽力用 `notice` 提示用户，返回退出码。
pub fn report_ui_failure(err: &AppError, notice: impl FnOnce(&str)) -> i32 {
    log::error!("❌ 界面初始化失败: {err}");
    notice(&err.to_string());
    err.exit_code()
}
