//! Protocol objects
//!
//! Per-client protocol state that validates requests before anything
//! reaches the seat. Violations are reported back to the offending client
//! as [`ProtocolError`]s and the request is dropped.

pub mod virtual_keyboard;

use thiserror::Error;

pub use virtual_keyboard::{KeyState, KeyboardEvent, Keymap, KeymapLoader, VirtualKeyboard, VirtualKeyboardManager};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Key or modifier event before any keymap was set
    #[error("{0} event received before a keymap was set")]
    NoKeymap(&'static str),

    /// The keymap could not be read or compiled
    #[error("out of memory: {0}")]
    NoMemory(String),

    #[error("unknown object {0}")]
    UnknownObject(u32),
}

impl ProtocolError {
    /// Wire error code sent with the protocol error
    pub fn code(&self) -> u32 {
        match self {
            ProtocolError::NoKeymap(_) => 0,
            ProtocolError::NoMemory(_) => 1,
            ProtocolError::UnknownObject(_) => 2,
        }
    }
}
