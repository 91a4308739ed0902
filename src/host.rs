use anyhow::Result;

/// Opaque handle of the window whose queue receives `WM_HOTKEY`.
///
/// `WindowHandle::NULL` targets the message queue of the calling thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// The operating system side of hotkey registration.
pub trait HotkeyHost {
    /// Binds `id` to `modifiers` + `key` for `target`.
    /// Fails when the id or the combination is already taken.
    fn register_hotkey(&self, target: WindowHandle, id: u16, modifiers: u32, key: u32)
        -> Result<()>;

    fn unregister_hotkey(&self, target: WindowHandle, id: u16) -> Result<()>;
}
