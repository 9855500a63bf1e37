//! Held-control snapshot
//!
//! Raw key events add or remove controls; the tick only asks "is it held?".

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Controls the simulation understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    Left,
    Right,
    Jump,
}

impl Control {
    /// Map a key name from the input layer to a control
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "left" | "arrowleft" | "a" => Some(Control::Left),
            "right" | "arrowright" | "d" => Some(Control::Right),
            "up" | "arrowup" | "jump" | "space" | "w" => Some(Control::Jump),
            _ => None,
        }
    }
}

/// Set of currently held controls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: HashSet<Control>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with the given controls held
    pub fn holding(controls: &[Control]) -> Self {
        Self {
            held: controls.iter().copied().collect(),
        }
    }

    pub fn press(&mut self, control: Control) {
        self.held.insert(control);
    }

    pub fn release(&mut self, control: Control) {
        self.held.remove(&control);
    }

    #[inline]
    pub fn is_held(&self, control: Control) -> bool {
        self.held.contains(&control)
    }

    /// Key-down from the input layer. Unknown keys are ignored.
    pub fn key_down(&mut self, key: &str) -> Option<Control> {
        let control = Control::from_key(key)?;
        self.press(control);
        Some(control)
    }

    /// Key-up from the input layer. Unknown keys are ignored.
    pub fn key_up(&mut self, key: &str) -> Option<Control> {
        let control = Control::from_key(key)?;
        self.release(control);
        Some(control)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}
