//! Virtual keyboard
//!
//! Lets a client (on-screen keyboards, remote input) inject key events. A
//! keymap has to arrive before any key or modifier event, and every key
//! still held when the object goes away is released so nothing stays
//! stuck on the seat.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::protocols::ProtocolError;

/// Only text keymaps in the XKB v1 format are accepted
pub const KEYMAP_FORMAT_XKB_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keymap {
    pub format: u32,
    pub text: String,
}

/// Turns the raw bytes a client shared into a usable keymap
pub trait KeymapLoader {
    fn load(&self, format: u32, data: &[u8]) -> Result<Keymap, ProtocolError>;
}

/// Accepts NUL-terminated XKB text keymaps
#[derive(Debug, Clone, Copy, Default)]
pub struct XkbTextLoader;

impl KeymapLoader for XkbTextLoader {
    fn load(&self, format: u32, data: &[u8]) -> Result<Keymap, ProtocolError> {
        if format != KEYMAP_FORMAT_XKB_V1 {
            return Err(ProtocolError::NoMemory(format!("unsupported keymap format {}", format)));
        }
        let data = data.strip_suffix(&[0]).unwrap_or(data);
        let text = std::str::from_utf8(data)
            .map_err(|e| ProtocolError::NoMemory(format!("keymap is not text: {}", e)))?;
        if !text.contains("xkb_keymap") {
            return Err(ProtocolError::NoMemory("keymap failed to compile".into()));
        }
        Ok(Keymap { format, text: text.to_string() })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyState {
    Released,
    Pressed,
}

impl From<u32> for KeyState {
    fn from(state: u32) -> Self {
        if state == 0 {
            KeyState::Released
        } else {
            KeyState::Pressed
        }
    }
}

/// What the seat receives from a virtual keyboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum KeyboardEvent {
    Keymap { keymap: Keymap },
    Key { time_ms: u32, keycode: u32, state: KeyState },
    Modifiers { depressed: u32, latched: u32, locked: u32, group: u32 },
    Destroyed,
}

pub struct VirtualKeyboard<L: KeymapLoader = XkbTextLoader> {
    id: u32,
    loader: L,
    keymap: Option<Keymap>,
    pressed: Vec<u32>,
    events: Vec<KeyboardEvent>,
    destroyed: bool,
}

impl VirtualKeyboard<XkbTextLoader> {
    pub fn new(id: u32) -> Self {
        Self::with_loader(id, XkbTextLoader)
    }
}

impl<L: KeymapLoader> VirtualKeyboard<L> {
    pub fn with_loader(id: u32, loader: L) -> Self {
        Self {
            id,
            loader,
            keymap: None,
            pressed: Vec::new(),
            events: Vec::new(),
            destroyed: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn has_keymap(&self) -> bool {
        self.keymap.is_some()
    }

    pub fn keymap(&self) -> Option<&Keymap> {
        self.keymap.as_ref()
    }

    /// Keys currently held down
    pub fn pressed(&self) -> &[u32] {
        &self.pressed
    }

    pub fn set_keymap(&mut self, format: u32, data: &[u8]) -> Result<(), ProtocolError> {
        let keymap = self.loader.load(format, data).map_err(|err| {
            error!("Virtual keyboard {}: keymap rejected: {}", self.id, err);
            err
        })?;
        debug!("Virtual keyboard {}: keymap set ({} bytes)", self.id, keymap.text.len());
        self.keymap = Some(keymap.clone());
        self.events.push(KeyboardEvent::Keymap { keymap });
        Ok(())
    }

    pub fn key(&mut self, time_ms: u32, keycode: u32, state: u32) -> Result<(), ProtocolError> {
        if !self.has_keymap() {
            warn!("Virtual keyboard {}: key {} before keymap", self.id, keycode);
            return Err(ProtocolError::NoKeymap("Key"));
        }
        let state = KeyState::from(state);
        self.events.push(KeyboardEvent::Key { time_ms, keycode, state });

        let held = self.pressed.contains(&keycode);
        match state {
            KeyState::Pressed if !held => self.pressed.push(keycode),
            KeyState::Released if held => self.pressed.retain(|&k| k != keycode),
            _ => {}
        }
        Ok(())
    }

    pub fn modifiers(&mut self, depressed: u32, latched: u32, locked: u32, group: u32) -> Result<(), ProtocolError> {
        if !self.has_keymap() {
            warn!("Virtual keyboard {}: modifiers before keymap", self.id);
            return Err(ProtocolError::NoKeymap("Mods"));
        }
        self.events.push(KeyboardEvent::Modifiers { depressed, latched, locked, group });
        Ok(())
    }

    /// Release every held key and announce the destruction. Only the
    /// first call has an effect.
    pub fn destroy(&mut self, time_ms: u32) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for keycode in self.pressed.drain(..) {
            self.events.push(KeyboardEvent::Key { time_ms, keycode, state: KeyState::Released });
        }
        self.events.push(KeyboardEvent::Destroyed);
    }

    pub fn take_events(&mut self) -> Vec<KeyboardEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Owns the virtual keyboards created by clients
pub struct VirtualKeyboardManager<L: KeymapLoader + Clone = XkbTextLoader> {
    loader: L,
    keyboards: BTreeMap<u32, VirtualKeyboard<L>>,
}

impl Default for VirtualKeyboardManager<XkbTextLoader> {
    fn default() -> Self {
        Self::new(XkbTextLoader)
    }
}

impl<L: KeymapLoader + Clone> VirtualKeyboardManager<L> {
    pub fn new(loader: L) -> Self {
        Self { loader, keyboards: BTreeMap::new() }
    }

    pub fn create(&mut self, id: u32) -> &mut VirtualKeyboard<L> {
        info!("New virtual keyboard at id {}", id);
        self.keyboards
            .entry(id)
            .or_insert_with(|| VirtualKeyboard::with_loader(id, self.loader.clone()))
    }

    pub fn get_mut(&mut self, id: u32) -> Result<&mut VirtualKeyboard<L>, ProtocolError> {
        self.keyboards.get_mut(&id).ok_or(ProtocolError::UnknownObject(id))
    }

    /// Tear down a keyboard, returning what it still had to say
    pub fn destroy(&mut self, id: u32, time_ms: u32) -> Result<Vec<KeyboardEvent>, ProtocolError> {
        let mut keyboard = self.keyboards.remove(&id).ok_or(ProtocolError::UnknownObject(id))?;
        keyboard.destroy(time_ms);
        Ok(keyboard.take_events())
    }

    pub fn len(&self) -> usize {
        self.keyboards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyboards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYMAP: &[u8] = b"xkb_keymap { xkb_keycodes \"evdev\" {}; };\0";

    #[test]
    fn test_keys_need_keymap() {
        let mut keyboard = VirtualKeyboard::new(1);
        assert_eq!(keyboard.key(0, 30, 1), Err(ProtocolError::NoKeymap("Key")));
        assert_eq!(keyboard.modifiers(1, 0, 0, 0), Err(ProtocolError::NoKeymap("Mods")));
        assert!(keyboard.take_events().is_empty());
        assert!(keyboard.pressed().is_empty());

        keyboard.set_keymap(KEYMAP_FORMAT_XKB_V1, KEYMAP).unwrap();
        keyboard.key(5, 30, 1).unwrap();
        let events = keyboard.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], KeyboardEvent::Key { time_ms: 5, keycode: 30, state: KeyState::Pressed });
    }

    #[test]
    fn test_bad_keymap_is_out_of_memory() {
        let mut keyboard = VirtualKeyboard::new(1);
        let err = keyboard.set_keymap(KEYMAP_FORMAT_XKB_V1, b"garbage").unwrap_err();
        assert!(matches!(err, ProtocolError::NoMemory(_)));
        assert_eq!(err.code(), 1);
        assert!(!keyboard.has_keymap());

        assert!(keyboard.set_keymap(0, KEYMAP).is_err());
        assert!(keyboard.set_keymap(KEYMAP_FORMAT_XKB_V1, &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_destroy_releases_held_keys() {
        let mut manager = VirtualKeyboardManager::default();
        let keyboard = manager.create(4);
        keyboard.set_keymap(KEYMAP_FORMAT_XKB_V1, KEYMAP).unwrap();
        keyboard.key(1, 30, 1).unwrap();
        keyboard.key(2, 31, 1).unwrap();
        keyboard.key(3, 31, 1).unwrap();
        keyboard.key(4, 30, 0).unwrap();
        assert_eq!(keyboard.pressed(), &[31]);
        keyboard.take_events();

        let events = manager.destroy(4, 9).unwrap();
        assert_eq!(
            events,
            vec![
                KeyboardEvent::Key { time_ms: 9, keycode: 31, state: KeyState::Released },
                KeyboardEvent::Destroyed,
            ]
        );
        assert!(manager.is_empty());
        assert_eq!(manager.destroy(4, 10), Err(ProtocolError::UnknownObject(4)));
    }

    #[test]
    fn test_custom_loader() {
        #[derive(Clone)]
        struct Failing;
        impl KeymapLoader for Failing {
            fn load(&self, _format: u32, _data: &[u8]) -> Result<Keymap, ProtocolError> {
                Err(ProtocolError::NoMemory("mmap failed".into()))
            }
        }

        let mut manager = VirtualKeyboardManager::new(Failing);
        let keyboard = manager.create(1);
        assert!(keyboard.set_keymap(KEYMAP_FORMAT_XKB_V1, KEYMAP).is_err());
        assert_eq!(keyboard.key(0, 1, 1), Err(ProtocolError::NoKeymap("Key")));
    }
}
