// 防止在 Windows 发布版本中显示额外的控制台窗口，不要删除！
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! # PicLab 图片标签工具 — 应用入口
//!
//! 本文件仅负责日志、设置与交互后端的初始化。
//! 业务流程见 `app.rs`，架构见 `lib.rs`。

use piclab::{app, settings, shell::SystemShell};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = settings::load_settings();
    let shell = SystemShell;

    #[cfg(target_os = "windows")]
    let code = match piclab::prompt::Win32Ui::new() {
        Ok(mut ui) => app::run(std::env::args_os(), &settings, &mut ui, &shell),
        Err(err) => app::report_ui_failure(&err, piclab::prompt::show_fatal_notice),
    };

    #[cfg(not(target_os = "windows"))]
    let code = {
        let mut ui = piclab::prompt::ConsoleUi::stdio();
        app::run(std::env::args_os(), &settings, &mut ui, &shell)
    };

    std::process::exit(code);
}
