#[cfg(windows)]
use anyhow::Result;
#[cfg(windows)]
use hotkey_handler::{HotkeyRegistry, KeyCombination, Win32Host, WindowHandle};

#[cfg(windows)]
fn main() -> Result<()> {
    let registry = HotkeyRegistry::new(Win32Host);
    let modifiers: [fn(KeyCombination) -> KeyCombination; 3] = [
        |v| v.with_control().with_alt(),
        |v| v.with_control().with_shift(),
        |v| v.with_alt().with_shift(),
    ];
    let codes = (0x30..=0x39).chain(0x41..=0x5a).chain(0x70..=0x7b);
    for code in codes {
        let mut line = vec![];
        for apply in modifiers.iter() {
            let binding = registry.bind(WindowHandle::NULL, apply(KeyCombination::new(code)))?;
            line.push(format!(
                "{:<16}{:<6}",
                binding.keys().to_string(),
                pretty_bool(binding.can_register())
            ));
        }
        println!("{}", line.join("  "));
    }
    Ok(())
}

#[cfg(windows)]
fn pretty_bool(value: bool) -> &'static str {
    if value {
        "free"
    } else {
        "taken"
    }
}

#[cfg(not(windows))]
fn main() {
    eprintln!("probe-hotkeys only runs on Windows");
}
