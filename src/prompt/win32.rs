//! Win32 交互后端：自绘模态输入窗口 + 系统消息框。
//!
//! 输入窗口运行自己的局部消息循环，直到窗口销毁（`WM_DESTROY` 投递 `WM_QUIT`）。
//! 会话状态装箱后以裸指针挂在 `GWLP_USERDATA` 上：窗口存活期间只经由该指针访问，
//! 消息循环结束（窗口已销毁）后再由 `prompt_label` 收回所有权。

use std::ffi::{OsStr, c_void};

use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    COLOR_WINDOW, DEFAULT_GUI_FONT, GetStockObject, HBRUSH, UpdateWindow,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::SetFocus;
use windows::Win32::UI::WindowsAndMessaging::{
    BS_DEFPUSHBUTTON, CREATESTRUCTW, CW_USEDEFAULT, CreateWindowExW, DefWindowProcW, DestroyWindow,
    DispatchMessageW, ES_AUTOHSCROLL, GWLP_USERDATA, GetMessageW, GetSystemMetrics,
    GetWindowLongPtrW, GetWindowRect, GetWindowTextW, HMENU, IDC_ARROW, IDCANCEL, IDNO, IDOK, IDYES,
    IsDialogMessageW, LoadCursorW, MB_DEFBUTTON1, MB_ICONERROR, MB_ICONINFORMATION,
    MB_ICONQUESTION, MB_OK, MB_YESNOCANCEL, MESSAGEBOX_RESULT, MESSAGEBOX_STYLE, MSG, MessageBoxW,
    PostQuitMessage, RegisterClassW, SM_CXSCREEN, SM_CYSCREEN, SW_SHOW, SWP_NOSIZE, SWP_NOZORDER,
    SendMessageW, SetWindowLongPtrW, SetWindowPos, ShowWindow, TranslateMessage, WINDOW_EX_STYLE,
    WINDOW_STYLE, WM_CLOSE, WM_COMMAND, WM_CREATE, WM_DESTROY, WM_SETFONT, WNDCLASSW, WS_CAPTION, WS_CHILD, WS_EX_CLIENTEDGE,
    WS_EX_DLGMODALFRAME, WS_OVERLAPPED, WS_SYSMENU, WS_TABSTOP, WS_VISIBLE,
};
use windows::core::{PCWSTR, w};

use crate::error::AppError;
use crate::labeler::SaveMode;
use crate::shell::to_wide;

use super::{
    APP_TITLE, NoticeKind, PromptOutcome, PromptSession, UserInterface, centered_origin,
    confirmation_message,
};

const CLASS_NAME: PCWSTR = w!("PicLabInputWndClass");
const EDIT_ID: usize = 1001;
/// 与编辑框缓冲区一致：最多 1023 个 UTF-16 单元 + 结尾 0。
const EDIT_BUFFER_LEN: usize = 1024;
const WINDOW_SIZE: (i32, i32) = (400, 140);

struct DialogState {
    session: PromptSession,
    edit: HWND,
}

fn wide(s: &str) -> Vec<u16> {
    to_wide(OsStr::new(s))
}

fn set_default_font(hwnd: HWND) {
    unsafe {
        let font = GetStockObject(DEFAULT_GUI_FONT);
        SendMessageW(hwnd, WM_SETFONT, Some(WPARAM(font.0 as usize)), Some(LPARAM(1)));
    }
}

fn read_edit_text(edit: HWND) -> String {
    let mut buf = [0u16; EDIT_BUFFER_LEN];
    let len = unsafe { GetWindowTextW(edit, &mut buf) };
    String::from_utf16_lossy(&buf[..len.max(0) as usize])
}

fn create_controls(hwnd: HWND, instance: HINSTANCE) -> windows::core::Result<HWND> {
    unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            w!("STATIC"),
            w!("请输入标签文字："),
            WS_CHILD | WS_VISIBLE,
            12,
            12,
            360,
            18,
            Some(hwnd),
            None,
            Some(instance),
            None,
        )?;

        let edit = CreateWindowExW(
            WS_EX_CLIENTEDGE,
            w!("EDIT"),
            w!(""),
            WS_CHILD | WS_VISIBLE | WS_TABSTOP | WINDOW_STYLE(ES_AUTOHSCROLL as u32),
            12,
            34,
            360,
            24,
            Some(hwnd),
            Some(HMENU(EDIT_ID as *mut c_void)),
            Some(instance),
            None,
        )?;

        let ok = CreateWindowExW(
            WINDOW_EX_STYLE(0),
            w!("BUTTON"),
            w!("确定"),
            WS_CHILD | WS_VISIBLE | WS_TABSTOP | WINDOW_STYLE(BS_DEFPUSHBUTTON as u32),
            216,
            70,
            72,
            26,
            Some(hwnd),
            Some(HMENU(IDOK.0 as usize as *mut c_void)),
            Some(instance),
            None,
        )?;

        let cancel = CreateWindowExW(
            WINDOW_EX_STYLE(0),
            w!("BUTTON"),
            w!("取消"),
            WS_CHILD | WS_VISIBLE | WS_TABSTOP,
            300,
            70,
            72,
            26,
            Some(hwnd),
            Some(HMENU(IDCANCEL.0 as usize as *mut c_void)),
            Some(instance),
            None,
        )?;

        for control in [edit, ok, cancel] {
            set_default_font(control);
        }
        let _ = SetFocus(Some(edit));

        Ok(edit)
    }
}

/// 在窗口关联的会话状态上执行 `f`；窗口尚未关联或已解除关联时返回 `None`。
fn with_state<R>(hwnd: HWND, f: impl FnOnce(&mut DialogState) -> R) -> Option<R> {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut DialogState;
    // 指针来自 Box::into_raw，WM_DESTROY 时解除关联，之后才会被收回
    let state = unsafe { ptr.as_mut() }?;
    Some(f(state))
}

extern "system" fn input_wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_CREATE => {
            let create = lparam.0 as *const CREATESTRUCTW;
            let Some(create) = (unsafe { create.as_ref() }) else {
                return LRESULT(-1);
            };
            unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize) };

            match create_controls(hwnd, create.hInstance) {
                Ok(edit) => {
                    with_state(hwnd, |state| state.edit = edit);
                    LRESULT(0)
                }
                Err(err) => {
                    log::error!("创建输入框控件失败: {err}");
                    LRESULT(-1)
                }
            }
        }
        WM_COMMAND => {
            let id = (wparam.0 & 0xFFFF) as i32;
            let handled = with_state(hwnd, |state| {
                if id == IDOK.0 {
                    let text = read_edit_text(state.edit);
                    state.session.submit(&text);
                    true
                } else if id == IDCANCEL.0 {
                    state.session.cancel();
                    true
                } else {
                    false
                }
            });
            if handled != Some(true) {
                return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
            }
            let _ = unsafe { DestroyWindow(hwnd) };
            LRESULT(0)
        }
        WM_CLOSE => {
            with_state(hwnd, |state| state.session.cancel());
            let _ = unsafe { DestroyWindow(hwnd) };
            LRESULT(0)
        }
        WM_DESTROY => {
            unsafe {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                PostQuitMessage(0);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// 交互后端不可用时的兜底提示：不依赖 `Win32Ui` 实例，直接弹出错误消息框。
pub fn show_fatal_notice(message: &str) {
    let text = wide(message);
    let title = wide(APP_TITLE);
    unsafe {
        MessageBoxW(
            None,
            PCWSTR(text.as_ptr()),
            PCWSTR(title.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

/// Win32 交互后端。
pub struct Win32Ui {
    instance: HINSTANCE,
}

impl Win32Ui {
    pub fn new() -> Result<Self, AppError> {
        let module = unsafe { GetModuleHandleW(None) }
            .map_err(|e| AppError::UiInit(format!("获取模块句柄失败: {e}")))?;
        Ok(Self {
            instance: module.into(),
        })
    }

    fn register_class(&self) -> Result<(), AppError> {
        let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }
            .map_err(|e| AppError::UiInit(format!("加载光标失败: {e}")))?;

        let class = WNDCLASSW {
            lpfnWndProc: Some(input_wnd_proc),
            hInstance: self.instance,
            lpszClassName: CLASS_NAME,
            hCursor: cursor,
            hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as isize as *mut c_void),
            ..Default::default()
        };

        let atom = unsafe { RegisterClassW(&class) };
        if atom == 0 {
            // 重复注册同名窗口类时也会返回 0，真正的失败由 CreateWindowExW 报告
            log::debug!("RegisterClassW 返回 0: {}", std::io::Error::last_os_error());
        }
        Ok(())
    }

    fn center(hwnd: HWND) {
        let mut rect = RECT::default();
        if unsafe { GetWindowRect(hwnd, &mut rect) }.is_err() {
            return;
        }
        let size = (rect.right - rect.left, rect.bottom - rect.top);
        let screen = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        let (x, y) = centered_origin(size, screen);
        let _ = unsafe { SetWindowPos(hwnd, None, x, y, 0, 0, SWP_NOSIZE | SWP_NOZORDER) };
    }

    fn message_box(&self, text: &str, style: MESSAGEBOX_STYLE) -> MESSAGEBOX_RESULT {
        let text = wide(text);
        let title = wide(APP_TITLE);
        unsafe { MessageBoxW(None, PCWSTR(text.as_ptr()), PCWSTR(title.as_ptr()), style) }
    }
}

impl UserInterface for Win32Ui {
    fn prompt_label(&mut self) -> Result<PromptOutcome, AppError> {
        self.register_class()?;

        let mut session = PromptSession::new();
        session.show();
        let state = Box::into_raw(Box::new(DialogState {
            session,
            edit: HWND::default(),
        }));
        let title = wide("添加标签");

        let created = unsafe {
            CreateWindowExW(
                WS_EX_DLGMODALFRAME,
                CLASS_NAME,
                PCWSTR(title.as_ptr()),
                WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                WINDOW_SIZE.0,
                WINDOW_SIZE.1,
                None,
                None,
                Some(self.instance),
                Some(state as *const c_void),
            )
        };
        let hwnd = match created {
            Ok(hwnd) => hwnd,
            Err(err) => {
                // 创建失败时窗口过程不再持有指针，直接收回
                drop(unsafe { Box::from_raw(state) });
                return Err(AppError::UiInit(format!("创建输入窗口失败: {err}")));
            }
        };

        Self::center(hwnd);
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
        }

        let mut msg = MSG::default();
        while unsafe { GetMessageW(&mut msg, None, 0, 0) }.0 > 0 {
            if !unsafe { IsDialogMessageW(hwnd, &msg) }.as_bool() {
                unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        }

        // 消息循环只在 WM_DESTROY 投递 WM_QUIT 后结束，此时窗口已解除关联
        let mut state = unsafe { Box::from_raw(state) };
        if !state.session.is_settled() {
            log::debug!("输入窗口在未得出结果时被销毁，按取消处理");
        }
        Ok(state.session.finish())
    }

    fn choose_save_mode(&mut self, label: &str) -> Result<Option<SaveMode>, AppError> {
        let choice = self.message_box(
            &confirmation_message(label),
            MB_YESNOCANCEL | MB_ICONQUESTION | MB_DEFBUTTON1,
        );

        Ok(if choice == IDYES {
            Some(SaveMode::Overwrite)
        } else if choice == IDNO {
            Some(SaveMode::Copy)
        } else {
            None
        })
    }

    fn notify(&mut self, kind: NoticeKind, message: &str) {
        let icon = match kind {
            NoticeKind::Info => MB_ICONINFORMATION,
            NoticeKind::Error => MB_ICONERROR,
        };
        self.message_box(message, MB_OK | icon);
    }
}
