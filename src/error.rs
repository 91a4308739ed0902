use crate::keys::KeyCombination;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("hotkey {0} is already registered")]
    AlreadyRegistered(u16),
    #[error("hotkey {0} has no base key")]
    MissingKey(u16),
    #[error("hotkey {id} ({keys}) is unavailable, {reason}")]
    Conflict {
        id: u16,
        keys: KeyCombination,
        reason: anyhow::Error,
    },
    #[error("no free hotkey id left")]
    IdsExhausted,
}
