//! 完整应用流程：脚本化交互 + 记录型外壳。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use piclab::app::{self, Outcome};
use piclab::error::{AppError, EXIT_FAILURE, EXIT_NOT_FOUND, EXIT_USAGE};
use piclab::labeler::{FontLocator, LabelConfig, SaveMode, resolve_label_font};
use piclab::prompt::{NoticeKind, PromptOutcome, UserInterface};
use piclab::settings::Settings;
use piclab::shell::HostShell;

#[derive(Default)]
struct ScriptedUi {
    prompts: VecDeque<PromptOutcome>,
    choices: VecDeque<Option<SaveMode>>,
    notices: Vec<(NoticeKind, String)>,
}

impl ScriptedUi {
    fn new(prompt: PromptOutcome, choice: Option<SaveMode>) -> Self {
        Self {
            prompts: VecDeque::from([prompt]),
            choices: VecDeque::from([choice]),
            notices: Vec::new(),
        }
    }
}

impl UserInterface for ScriptedUi {
    fn prompt_label(&mut self) -> Result<PromptOutcome, AppError> {
        Ok(self.prompts.pop_front().unwrap_or(PromptOutcome::Cancelled))
    }

    fn choose_save_mode(&mut self, _label: &str) -> Result<Option<SaveMode>, AppError> {
        Ok(self.choices.pop_front().flatten())
    }

    fn notify(&mut self, kind: NoticeKind, message: &str) {
        self.notices.push((kind, message.to_string()));
    }
}

#[derive(Default)]
struct RecordingShell {
    changed: RefCell<Vec<PathBuf>>,
}

impl HostShell for RecordingShell {
    fn item_changed(&self, path: &Path) {
        self.changed.borrow_mut().push(path.to_path_buf());
    }
}

fn args(extra: &[&Path]) -> Vec<OsString> {
    std::iter::once(OsString::from("piclab"))
        .chain(extra.iter().map(|p| p.as_os_str().to_os_string()))
        .collect()
}

fn write_png(path: &Path) {
    RgbImage::from_pixel(160, 120, Rgb([40, 120, 200]))
        .save(path)
        .expect("write png failed");
}

fn system_font_available() -> bool {
    let found = resolve_label_font(&LabelConfig::default(), &FontLocator::system()).is_some();
    if !found {
        eprintln!("skipped: no preferred label font installed on this host");
    }
    found
}

fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).expect("read dir failed").count()
}

#[test]
fn missing_argument_is_usage_error() {
    let mut ui = ScriptedUi::default();
    let shell = RecordingShell::default();

    let code = app::run(args(&[]), &Settings::default(), &mut ui, &shell);

    assert_eq!(code, EXIT_USAGE);
    assert_eq!(ui.notices.len(), 1);
    assert_eq!(ui.notices[0].0, NoticeKind::Info);
    assert!(ui.notices[0].1.contains("piclab <图片路径>"));
}

#[test]
fn missing_file_exits_with_not_found_and_writes_nothing() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let missing = dir.path().join("nope.png");
    let mut ui = ScriptedUi::new(PromptOutcome::Accepted("x".into()), Some(SaveMode::Copy));
    let shell = RecordingShell::default();

    let code = app::run(args(&[&missing]), &Settings::default(), &mut ui, &shell);

    assert_eq!(code, EXIT_NOT_FOUND);
    assert_eq!(entry_count(dir.path()), 0);
    assert_eq!(ui.notices[0].0, NoticeKind::Error);
    // 未进入输入阶段
    assert_eq!(ui.prompts.len(), 1);
}

#[test]
fn cancelled_prompt_exits_cleanly_without_writes() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let source = dir.path().join("photo.png");
    write_png(&source);
    let mut ui = ScriptedUi::new(PromptOutcome::Cancelled, Some(SaveMode::Copy));
    let shell = RecordingShell::default();

    let outcome = app::execute(args(&[&source]), &Settings::default(), &mut ui, &shell)
        .expect("flow failed");

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(entry_count(dir.path()), 1);
    assert!(ui.notices.is_empty());
    assert!(shell.changed.borrow().is_empty());
}

#[test]
fn cancelled_confirmation_exits_cleanly_without_writes() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let source = dir.path().join("photo.png");
    write_png(&source);
    let mut ui = ScriptedUi::new(PromptOutcome::Accepted("x".into()), None);
    let shell = RecordingShell::default();

    let code = app::run(args(&[&source]), &Settings::default(), &mut ui, &shell);

    assert_eq!(code, 0);
    assert_eq!(entry_count(dir.path()), 1);
}

#[test]
fn copy_flow_saves_and_notifies_shell() {
    if !system_font_available() {
        return;
    }
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let source = dir.path().join("photo.png");
    write_png(&source);
    let original_bytes = fs::read(&source).expect("read original failed");
    let mut ui = ScriptedUi::new(PromptOutcome::Accepted("x".into()), Some(SaveMode::Copy));
    let shell = RecordingShell::default();

    let code = app::run(args(&[&source]), &Settings::default(), &mut ui, &shell);

    let expected = dir.path().join("photo_labeled.png");
    assert_eq!(code, 0);
    assert!(expected.exists());
    assert_eq!(fs::read(&source).expect("read original failed"), original_bytes);
    assert_eq!(shell.changed.borrow().as_slice(), &[expected.clone()]);
    assert_eq!(ui.notices.len(), 1);
    assert_eq!(ui.notices[0].0, NoticeKind::Info);
    assert!(ui.notices[0].1.contains(&expected.display().to_string()));
}

#[test]
fn command_line_overrides_skip_prompts() {
    if !system_font_available() {
        return;
    }
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let source = dir.path().join("photo.png");
    write_png(&source);
    let mut ui = ScriptedUi::default();
    let shell = RecordingShell::default();

    let argv: Vec<OsString> = vec![
        "piclab".into(),
        source.as_os_str().to_os_string(),
        "--label".into(),
        "  Sunset Beach ".into(),
        "--mode".into(),
        "overwrite".into(),
    ];
    let outcome = app::execute(argv, &Settings::default(), &mut ui, &shell).expect("flow failed");

    assert_eq!(outcome, Outcome::Saved(source.clone()));
    assert_eq!(entry_count(dir.path()), 1);
}

#[test]
fn blank_label_argument_is_usage_error() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let source = dir.path().join("photo.png");
    write_png(&source);
    let mut ui = ScriptedUi::default();
    let shell = RecordingShell::default();

    let argv: Vec<OsString> = vec![
        "piclab".into(),
        source.as_os_str().to_os_string(),
        "--label".into(),
        "   ".into(),
    ];
    let code = app::run(argv, &Settings::default(), &mut ui, &shell);

    assert_eq!(code, EXIT_USAGE);
}

#[test]
fn unavailable_encoder_fails_with_exit_three_and_keeps_original() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let source = dir.path().join("photo.png");
    write_png(&source);
    let original_bytes = fs::read(&source).expect("read original failed");
    let settings = Settings {
        output_format: Some("avif".to_string()),
        ..Settings::default()
    };
    let mut ui = ScriptedUi::new(PromptOutcome::Accepted("x".into()), Some(SaveMode::Overwrite));
    let shell = RecordingShell::default();

    let code = app::run(args(&[&source]), &settings, &mut ui, &shell);

    assert_eq!(code, EXIT_FAILURE);
    assert_eq!(fs::read(&source).expect("read original failed"), original_bytes);
    assert_eq!(entry_count(dir.path()), 1);
    assert!(shell.changed.borrow().is_empty());
    assert_eq!(ui.notices[0].0, NoticeKind::Error);
    assert!(ui.notices[0].1.starts_with("写入图片失败"));
}

#[test]
fn help_is_shown_as_info_notice() {
    let mut ui = ScriptedUi::default();
    let shell = RecordingShell::default();

    let argv: Vec<OsString> = vec!["piclab".into(), "--help".into()];
    let code = app::run(argv, &Settings::default(), &mut ui, &shell);

    assert_eq!(code, 0);
    assert_eq!(ui.notices.len(), 1);
    assert_eq!(ui.notices[0].0, NoticeKind::Info);
}

#[test]
fn missing_font_fails_with_exit_three_and_keeps_original() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let source = dir.path().join("photo.png");
    write_png(&source);
    let original_bytes = fs::read(&source).expect("read original failed");
    let settings = Settings {
        font_families: Some(vec!["No Such Family".to_string()]),
        ..Settings::default()
    };
    let mut ui = ScriptedUi::new(PromptOutcome::Accepted("x".into()), Some(SaveMode::Copy));
    let shell = RecordingShell::default();

    let code = app::run(args(&[&source]), &settings, &mut ui, &shell);

    assert_eq!(code, EXIT_FAILURE);
    assert_eq!(fs::read(&source).expect("read original failed"), original_bytes);
    assert_eq!(entry_count(dir.path()), 1);
    assert!(shell.changed.borrow().is_empty());
    assert_eq!(ui.notices.len(), 1);
    assert_eq!(ui.notices[0].0, NoticeKind::Error);
    assert!(ui.notices[0].1.starts_with("无法添加标签"));
}
