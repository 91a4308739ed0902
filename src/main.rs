#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(windows)]
#[macro_use]
extern crate log;

#[cfg(windows)]
fn main() {
    if let Err(err) = app::run() {
        error!("{err}");
        hotkey_handler::alert!("{err}");
    }
}

#[cfg(not(windows))]
fn main() {
    eprintln!("hotkey-handler only runs on Windows");
    std::process::exit(1);
}

#[cfg(windows)]
mod app {
    use anyhow::{anyhow, Result};
    use hotkey_handler::{
        alert, default_config_path, Config, HotkeyBinding, HotkeyRegistry, KeyCombination,
        Message, Win32Host, WindowHandle,
    };
    use std::path::PathBuf;
    use windows::Win32::Foundation::GetLastError;
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, PostQuitMessage, TranslateMessage, MSG,
    };

    const VK_H: u16 = 0x48;
    const VK_P: u16 = 0x50;
    const VK_Q: u16 = 0x51;

    pub fn run() -> Result<()> {
        let config_path = match std::env::args_os().nth(1) {
            Some(v) => PathBuf::from(v),
            None => default_config_path()?,
        };
        let config = Config::load_file(&config_path)?;
        prepare_log(&config)?;
        info!("start config={config:?}");

        let registry = HotkeyRegistry::with_options(Win32Host, config.registry_options());

        // ctrl+alt+p stays registered while the others are suspended
        let toggle = registry.bind_persistent(WindowHandle::NULL, ctrl_alt(VK_P))?;
        let hello = registry.bind(WindowHandle::NULL, ctrl_alt(VK_H))?;
        let quit = registry.bind(WindowHandle::NULL, ctrl_alt(VK_Q))?;

        let toggle_registry = registry.clone();
        toggle.on_pressed(move |_| {
            if toggle_registry.is_enabled() {
                toggle_registry.suspend();
            } else {
                toggle_registry.resume();
            }
            true
        });
        hello.on_pressed(|event| {
            info!("hotkey {} pressed", event.keys);
            true
        });
        quit.on_pressed(|_| {
            unsafe { PostQuitMessage(0) };
            true
        });

        if config.enable {
            registry.register_all();
        } else {
            registry.suspend();
            toggle.register();
        }
        report_unavailable(&registry, &[&toggle, &hello, &quit]);

        eventloop(&registry)
    }

    fn ctrl_alt(code: u16) -> KeyCombination {
        KeyCombination::new(code).with_control().with_alt()
    }

    fn report_unavailable(registry: &HotkeyRegistry, bindings: &[&HotkeyBinding]) {
        let unavailable: Vec<String> = bindings
            .iter()
            .filter(|v| !v.is_registered() && (registry.is_enabled() || v.suppress_auto_unregister()))
            .map(|v| v.keys().to_string())
            .collect();
        if !unavailable.is_empty() {
            alert!("Failed to register hotkeys: {}", unavailable.join(", "));
        }
    }

    fn eventloop(registry: &HotkeyRegistry) -> Result<()> {
        let mut message = MSG::default();
        loop {
            let ret = unsafe { GetMessageW(&mut message, None, 0, 0) };
            match ret.0 {
                -1 => {
                    unsafe { GetLastError() }.ok()?;
                }
                0 => break,
                _ => {
                    if registry.dispatch(&Message::from(&message)) {
                        continue;
                    }
                    unsafe {
                        let _ = TranslateMessage(&message);
                        DispatchMessageW(&message);
                    }
                }
            }
        }
        info!("exit");
        Ok(())
    }

    fn prepare_log(config: &Config) -> Result<()> {
        match &config.log_file {
            Some(path) => simple_logging::log_to_file(path, config.log_level)
                .map_err(|err| anyhow!("Failed to init log file, {err}"))?,
            None => simple_logging::log_to_stderr(config.log_level),
        }
        Ok(())
    }
}
