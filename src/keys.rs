use std::fmt;

/// OS modifier bits accepted by `RegisterHotKey`.
pub const MOD_ALT: u32 = 0x0001;
pub const MOD_CONTROL: u32 = 0x0002;
pub const MOD_SHIFT: u32 = 0x0004;
pub const MOD_NOREPEAT: u32 = 0x4000;

/// A virtual-key code packed together with its modifier flags.
///
/// The low 16 bits hold the virtual-key code, modifiers live above them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyCombination(u32);

impl KeyCombination {
    pub const NONE: Self = Self(0);
    pub const SHIFT: u32 = 0x0001_0000;
    pub const CONTROL: u32 = 0x0002_0000;
    pub const ALT: u32 = 0x0004_0000;
    const MODIFIERS: u32 = Self::SHIFT | Self::CONTROL | Self::ALT;

    pub const fn new(code: u16) -> Self {
        Self(code as u32)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn with_alt(self) -> Self {
        Self(self.0 | Self::ALT)
    }

    pub const fn with_control(self) -> Self {
        Self(self.0 | Self::CONTROL)
    }

    pub const fn with_shift(self) -> Self {
        Self(self.0 | Self::SHIFT)
    }

    pub fn has_alt(&self) -> bool {
        self.0 & Self::ALT != 0
    }

    pub fn has_control(&self) -> bool {
        self.0 & Self::CONTROL != 0
    }

    pub fn has_shift(&self) -> bool {
        self.0 & Self::SHIFT != 0
    }

    /// The base key with every modifier bit cleared.
    pub fn key_code(&self) -> u32 {
        self.0 & !Self::MODIFIERS
    }

    pub fn has_key(&self) -> bool {
        self.key_code() != 0
    }

    /// Modifier bitmask in the form the OS expects.
    pub fn hotkey_modifiers(&self) -> u32 {
        let mut modifiers = 0;
        if self.has_alt() {
            modifiers |= MOD_ALT;
        }
        if self.has_control() {
            modifiers |= MOD_CONTROL;
        }
        if self.has_shift() {
            modifiers |= MOD_SHIFT;
        }
        modifiers
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_control() {
            f.write_str("ctrl+")?;
        }
        if self.has_alt() {
            f.write_str("alt+")?;
        }
        if self.has_shift() {
            f.write_str("shift+")?;
        }
        let code = self.key_code();
        match code {
            0 => f.write_str("none"),
            0x30..=0x39 | 0x41..=0x5a => write!(f, "{}", (code as u8 as char).to_ascii_lowercase()),
            0x70..=0x7b => write!(f, "f{}", code - 0x6f),
            0x20 => f.write_str("space"),
            0xc0 => f.write_str("`"),
            _ => write!(f, "{code:#04x}"),
        }
    }
}
