use crate::error::MachineError;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

/// host key for each of the sixteen logical keys, indexed by logical key
pub type KeyMap = [char; 16];

/// the left-hand side of a qwerty keyboard, in logical key order
pub const CHIP8_CONVENTIONAL_KEYMAP: KeyMap = [
    '0', // 0
    '1', // 1
    '2', // 2
    '3', // 3
    'q', // 4
    'w', // 5
    'e', // 6
    'a', // 7
    's', // 8
    'd', // 9
    'z', // a
    'c', // b
    '4', // c
    'r', // d
    'f', // e
    'v', // f
];

/// reads host key state
pub trait Input {
    /// pull in whatever the host has to say; called once per cycle
    fn poll(&mut self) -> Result<(), io::Error>;

    /// is this host key currently held
    fn is_down(&self, host_key: char) -> bool;

    /// has the user asked to quit
    fn should_close(&self) -> bool {
        false
    }
}

/// The keypad as the machine sees it: sixteen logical keys looked up through
/// a key map. Holds no state of its own.
pub struct Keypad<'a> {
    keymap: &'a KeyMap,
    input: &'a dyn Input,
}

impl<'a> Keypad<'a> {
    pub fn new(keymap: &'a KeyMap, input: &'a dyn Input) -> Self {
        Keypad { keymap, input }
    }

    /// is logical key `key` held; anything past 0xf is not a key
    pub fn is_down(&self, key: u8) -> Result<bool, MachineError> {
        match self.keymap.get(key as usize) {
            Some(host_key) => Ok(self.input.is_down(*host_key)),
            None => Err(MachineError::InvalidKeyIndex { pc: 0, key }),
        }
    }

    /// the lowest-numbered logical key that is held, if any
    pub fn any_down(&self) -> Option<u8> {
        self.keymap
            .iter()
            .position(|host_key| self.input.is_down(*host_key))
            .map(|key| key as u8)
    }
}

/// Terminal implementation of Input, using crossterm events.
///
/// Terminals only report presses (and auto-repeats), never releases, so a
/// key counts as held for `hold` after the last time it was seen.
pub struct StdinInput {
    keymap: KeyMap,
    last_seen: HashMap<char, Instant>,
    hold: Duration,
    close_requested: bool,
}

impl StdinInput {
    pub fn new(keymap: KeyMap, hold: Duration) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keymap,
            last_seen: HashMap::new(),
            hold,
            close_requested: false,
        })
    }

    fn handle_key(&mut self, evt: KeyEvent) {
        match evt.code {
            KeyCode::Esc => self.close_requested = true,
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                self.close_requested = true
            }
            KeyCode::Char(key) => {
                let key = key.to_ascii_lowercase();
                if !self.keymap.contains(&key) {
                    log::warn!("can't map {:?} to a CHIP-8 key", key);
                }
                self.last_seen.insert(key, Instant::now());
            }
            code => log::debug!("ignoring key event {:?}", code),
        }
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn poll(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                self.handle_key(evt);
            }
        }
        let hold = self.hold;
        self.last_seen.retain(|_, seen| seen.elapsed() < hold);
        Ok(())
    }

    fn is_down(&self, host_key: char) -> bool {
        self.last_seen
            .get(&host_key)
            .map_or(false, |seen| seen.elapsed() < self.hold)
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }
}

/// dummy Input implementation for testing
#[derive(Default)]
pub struct DummyInput {
    held: Vec<char>,
    pub close: bool,
}

impl DummyInput {
    pub fn new(held: &[char]) -> Self {
        DummyInput {
            held: Vec::from(held),
            close: false,
        }
    }

    pub fn press(&mut self, host_key: char) {
        if !self.held.contains(&host_key) {
            self.held.push(host_key);
        }
    }

    pub fn release(&mut self, host_key: char) {
        self.held.retain(|k| *k != host_key);
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<(), io::Error> {
        Ok(())
    }

    fn is_down(&self, host_key: char) -> bool {
        self.held.contains(&host_key)
    }

    fn should_close(&self) -> bool {
        self.close
    }
}
