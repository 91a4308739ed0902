use crate::dispatcher::Message;
use crate::host::{HotkeyHost, WindowHandle};

use anyhow::{anyhow, Result};
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS,
};
use windows::Win32::UI::WindowsAndMessaging::MSG;

/// Registers hotkeys with the desktop session through `RegisterHotKey`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Host;

impl HotkeyHost for Win32Host {
    fn register_hotkey(
        &self,
        target: WindowHandle,
        id: u16,
        modifiers: u32,
        key: u32,
    ) -> Result<()> {
        unsafe { RegisterHotKey(to_hwnd(target), id as i32, HOT_KEY_MODIFIERS(modifiers), key) }
            .map_err(|err| anyhow!("Fail to register hotkey {id}, {err}"))
    }

    fn unregister_hotkey(&self, target: WindowHandle, id: u16) -> Result<()> {
        unsafe { UnregisterHotKey(to_hwnd(target), id as i32) }
            .map_err(|err| anyhow!("Fail to unregister hotkey {id}, {err}"))
    }
}

fn to_hwnd(handle: WindowHandle) -> Option<HWND> {
    if handle.is_null() {
        None
    } else {
        Some(HWND(handle.0 as _))
    }
}

impl From<HWND> for WindowHandle {
    fn from(hwnd: HWND) -> Self {
        WindowHandle(hwnd.0 as isize)
    }
}

impl From<&MSG> for Message {
    fn from(msg: &MSG) -> Self {
        Message::new(msg.hwnd.into(), msg.message, msg.wParam.0, msg.lParam.0)
    }
}
