#[macro_use]
extern crate log;

#[cfg(windows)]
pub mod macros;

mod binding;
mod config;
mod dispatcher;
mod error;
mod host;
mod keys;
mod registry;
#[cfg(windows)]
mod win32;

pub use crate::binding::{HotkeyBinding, HotkeyPressed};
pub use crate::config::{default_config_path, Config, CONFIG_FILE_NAME};
pub use crate::dispatcher::{Message, MessageDispatcher, MessageFilter, WM_HOTKEY};
pub use crate::error::HotkeyError;
pub use crate::host::{HotkeyHost, WindowHandle};
pub use crate::keys::{KeyCombination, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT, MOD_SHIFT};
pub use crate::registry::{HotkeyRegistry, IdAllocator, RegistryOptions, MAX_HOTKEY_ID};
#[cfg(windows)]
pub use crate::win32::Win32Host;
