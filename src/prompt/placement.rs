//! 对话框位置计算
//!
//! 纯函数：输入窗口与屏幕尺寸，输出窗口左上角坐标，便于测试。

/// 窗口在屏幕上居中时的左上角坐标。
///
/// 窗口大于屏幕或尺寸异常时贴左上角 `(0, 0)`，避免标题栏跑到屏幕外无法拖动。
pub fn centered_origin(window: (i32, i32), screen: (i32, i32)) -> (i32, i32) {
    let (ww, wh) = window;
    let (sw, sh) = screen;
    if ww <= 0 || wh <= 0 || sw <= 0 || sh <= 0 {
        return (0, 0);
    }

    let x = ((sw - ww) / 2).max(0);
    let y = ((sh - wh) / 2).max(0);
    (x, y)
}
