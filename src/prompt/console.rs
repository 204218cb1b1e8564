//! 基于读写流的文本交互后端。
//!
//! 读到 EOF 视为取消；确认提问遇到无法识别的回答会重新提问，直接回车等同“是”（覆盖原图）。

use std::io::{self, BufRead, Stderr, StdinLock, Write};

use crate::error::AppError;
use crate::labeler::SaveMode;

use super::{
    APP_TITLE, NoticeKind, PromptOutcome, PromptSession, UserInterface, confirmation_message,
};

pub struct ConsoleUi<R, W> {
    input: R,
    output: W,
}

impl ConsoleUi<StdinLock<'static>, Stderr> {
    /// 标准输入 + 标准错误输出（标准输出留给管道）。
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsoleUi<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

fn parse_save_choice(answer: &str) -> Option<Option<SaveMode>> {
    match answer.trim().to_lowercase().as_str() {
        "" | "y" | "yes" | "是" => Some(Some(SaveMode::Overwrite)),
        "n" | "no" | "否" => Some(Some(SaveMode::Copy)),
        "c" | "cancel" | "取消" => Some(None),
        _ => None,
    }
}

impl<R: BufRead, W: Write> UserInterface for ConsoleUi<R, W> {
    fn prompt_label(&mut self) -> Result<PromptOutcome, AppError> {
        let mut session = PromptSession::new();
        session.show();

        match self.ask(&format!("[{APP_TITLE}] 请输入标签文字：")) {
            Ok(Some(line)) => session.submit(&line),
            Ok(None) => session.cancel(),
            Err(err) => return Err(AppError::UiInit(format!("控制台不可用：{}", err))),
        }

        Ok(session.finish())
    }

    fn choose_save_mode(&mut self, label: &str) -> Result<Option<SaveMode>, AppError> {
        let question = format!("{}\n[Y/n/c] ", confirmation_message(label));
        loop {
            let answer = self
                .ask(&question)
                .map_err(|e| AppError::UiInit(format!("控制台不可用：{}", e)))?;

            let Some(answer) = answer else {
                return Ok(None);
            };

            match parse_save_choice(&answer) {
                Some(choice) => return Ok(choice),
                None => log::debug!("无法识别的回答：{:?}", answer.trim()),
            }
        }
    }

    fn notify(&mut self, kind: NoticeKind, message: &str) {
        let tag = match kind {
            NoticeKind::Info => "信息",
            NoticeKind::Error => "错误",
        };
        if let Err(err) = writeln!(self.output, "[{APP_TITLE}][{tag}] {message}") {
            log::warn!("输出提示失败: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> ConsoleUi<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleUi::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn prompt_returns_trimmed_label() {
        let mut ui = console("  Sunset Beach  \n");
        let outcome = ui.prompt_label().expect("prompt failed");
        assert_eq!(outcome, PromptOutcome::Accepted("Sunset Beach".to_string()));
    }

    #[test]
    fn prompt_eof_and_blank_cancel() {
        for input in ["", "   \n"] {
            let outcome = console(input).prompt_label().expect("prompt failed");
            assert_eq!(outcome, PromptOutcome::Cancelled);
        }
    }

    #[test]
    fn save_choice_reasks_until_recognized() {
        let mut ui = console("maybe\nn\n");
        let choice = ui.choose_save_mode("x").expect("choice failed");
        assert_eq!(choice, Some(SaveMode::Copy));

        let output = String::from_utf8(ui.into_output()).expect("utf8 output");
        assert_eq!(output.matches("[Y/n/c]").count(), 2);
    }

    #[test]
    fn save_choice_defaults_to_overwrite_and_supports_cancel() {
        let choose = |input: &str| console(input).choose_save_mode("x").expect("choice failed");
        assert_eq!(choose("\n"), Some(SaveMode::Overwrite));
        assert_eq!(choose("c\n"), None);
        assert_eq!(choose(""), None);
    }

    #[test]
    fn notify_tags_error_messages() {
        let mut ui = console("");
        ui.notify(NoticeKind::Error, "boom");
        let output = String::from_utf8(ui.into_output()).expect("utf8 output");
        assert!(output.contains("[错误] boom"));
    }
}
