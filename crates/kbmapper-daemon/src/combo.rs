//! Chord tracking
//!
//! # Combo State Machine
//!
//! The tracker keeps the keys currently held down, in the order they were
//! pressed, across every input device. A chord is attempted each time a held
//! key is released.
//!
//! ```text
//!  ┌───────┐   press (key not held)     ┌──────────────┐
//!  │ IDLE  │ ─────────────────────────► │  BUILDING    │ ◄──┐ press: append
//!  │       │                            │              │ ───┘
//!  │ held: │ ◄───────────────────────── │ held: [k..]  │
//!  │  []   │   release, chord resolved  │              │ ◄──┐ release, chord
//!  └───────┘   (clear everything)       └──────────────┘ ───┘ unresolved:
//!      ▲                                       │               drop that key
//!      └───────────────────────────────────────┘
//!        release of the last held key, unresolved
//! ```
//!
//! ## Transitions
//!
//! 1. **Press**: the key is appended unless it is already held.
//! 2. **Release of a held key**: the names of *all* held keys, in press order,
//!    are joined with `+` and offered to the resolver.
//!    - resolved: every held key is forgotten
//!    - unresolved: only the released key is forgotten, so letting go of a
//!      chord one key at a time retries the shrinking remainder
//! 3. **Release of a key that is not held**: ignored.
//! 4. **Autorepeat** (value 2): ignored.
//!
//! The sequence is never sorted: pressing `Control` then `t` gives
//! `Control+t`, pressing them the other way round gives `t+Control`.

use kbmapper_config::CHORD_SEPARATOR;

use crate::keysym::{symbolic_name, KeysymResolver};

/// Event values for key transitions
pub mod event_value {
    pub const RELEASE: i32 = 0;
    pub const PRESS: i32 = 1;
    pub const REPEAT: i32 = 2;
}

/// Coarse state of the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboState {
    /// No keys held
    Idle,
    /// At least one key held
    Building,
}

/// Whether a stimulus matched a configured section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved,
    Unresolved,
}

/// What happened on a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboOutcome {
    /// Key added to the held sequence
    Pressed,
    /// Nothing changed (repeat, duplicate press, release of an unheld key)
    Ignored,
    /// A chord was attempted on release
    Attempted { chord: String, resolution: Resolution },
}

/// Ordered set of held keys, shared by all devices
#[derive(Debug, Clone, Default)]
pub struct ComboTracker {
    held: Vec<u16>,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ComboState {
        if self.held.is_empty() {
            ComboState::Idle
        } else {
            ComboState::Building
        }
    }

    /// Held key codes in press order
    pub fn held(&self) -> &[u16] {
        &self.held
    }

    /// Compose the chord string for the current sequence
    pub fn chord(&self, keysyms: &dyn KeysymResolver) -> String {
        let mut chord = String::new();
        for (i, code) in self.held.iter().enumerate() {
            if i > 0 {
                chord.push(CHORD_SEPARATOR);
            }
            chord.push_str(&symbolic_name(keysyms, *code));
        }
        chord
    }

    /// Record a key press. Returns false if the key was already held.
    pub fn press(&mut self, code: u16) -> bool {
        if self.held.contains(&code) {
            return false;
        }
        self.held.push(code);
        true
    }

    /// Handle a key release.
    ///
    /// Returns `None` if the key was not held. Otherwise the chord for the
    /// whole held sequence is passed to `resolve` and the sequence is
    /// cleared or trimmed depending on the answer.
    pub fn release<F>(
        &mut self,
        code: u16,
        keysyms: &dyn KeysymResolver,
        resolve: F,
    ) -> Option<(String, Resolution)>
    where
        F: FnOnce(&str) -> Resolution,
    {
        let position = self.held.iter().position(|held| *held == code)?;

        let chord = self.chord(keysyms);
        let resolution = resolve(&chord);

        match resolution {
            Resolution::Resolved => self.held.clear(),
            Resolution::Unresolved => {
                self.held.remove(position);
            }
        }

        Some((chord, resolution))
    }

    /// Drive the tracker with one key event
    pub fn handle_key<F>(
        &mut self,
        code: u16,
        value: i32,
        keysyms: &dyn KeysymResolver,
        resolve: F,
    ) -> ComboOutcome
    where
        F: FnOnce(&str) -> Resolution,
    {
        match value {
            event_value::PRESS => {
                if self.press(code) {
                    ComboOutcome::Pressed
                } else {
                    ComboOutcome::Ignored
                }
            }
            event_value::RELEASE => match self.release(code, keysyms, resolve) {
                Some((chord, resolution)) => ComboOutcome::Attempted { chord, resolution },
                None => ComboOutcome::Ignored,
            },
            event_value::REPEAT => ComboOutcome::Ignored,
            _ => {
                tracing::debug!("Unexpected value {} for key {}", value, code);
                ComboOutcome::Ignored
            }
        }
    }
}
