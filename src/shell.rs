//! 资源管理器刷新通知
//!
//! 保存成功后通知外壳“该路径的项目已变化”，已打开的文件夹视图随即刷新缩略图与列表，
//! 无需用户手动刷新。非 Windows 平台没有对应机制，仅记录日志。

use std::path::Path;

/// 宿主外壳通知接口。
pub trait HostShell {
    fn item_changed(&self, path: &Path);
}

/// 当前平台的外壳。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

#[cfg(target_os = "windows")]
pub(crate) fn to_wide(s: &std::ffi::OsStr) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;

    s.encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(target_os = "windows")]
impl HostShell for SystemShell {
    fn item_changed(&self, path: &Path) {
        use windows::Win32::UI::Shell::{SHCNE_UPDATEITEM, SHCNF_PATHW, SHChangeNotify};

        let wide = to_wide(path.as_os_str());
        unsafe {
            SHChangeNotify(
                SHCNE_UPDATEITEM,
                SHCNF_PATHW,
                Some(wide.as_ptr() as *const std::ffi::c_void),
                None,
            );
        }
        log::debug!("已通知资源管理器刷新: {}", path.display());
    }
}

#[cfg(not(target_os = "windows"))]
impl HostShell for SystemShell {
    fn item_changed(&self, path: &Path) {
        log::debug!("当前平台无外壳刷新通知，跳过: {}", path.display());
    }
}
