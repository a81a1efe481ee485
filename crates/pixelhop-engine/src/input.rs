//! Logical input actions and the device-to-action mapping.
//!
//! The physics step never sees keys or gamepad buttons. It reads an
//! [`InputFrame`]: which logical [`Action`]s are held this tick, and which
//! of them went from released to held since the previous tick. The
//! [`InputState`] builds those frames from raw device events, OR-ing every
//! physical [`Binding`] mapped to the same action.
//!
//! ```
//! use pixelhop_engine::input::{Action, ActionQuery, Binding, InputState};
//!
//! let mut input = InputState::default();
//! input.handle(&Binding::key("Space"), true);
//! input.handle(&Binding::key("ArrowRight"), true);
//!
//! let frame = input.take_frame();
//! assert!(frame.just_pressed(Action::Jump));
//! assert!(frame.is_active(Action::Right));
//!
//! // Still held, but no longer a fresh press.
//! let frame = input.take_frame();
//! assert!(frame.is_active(Action::Jump));
//! assert!(!frame.just_pressed(Action::Jump));
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A logical game input, independent of the device that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Jump,
    Up,
    Down,
    Menu,
    Inventory,
    Map,
    StatusOverlay,
}

/// Read access to the logical input state for one tick.
pub trait ActionQuery {
    /// The action is held right now.
    fn is_active(&self, action: Action) -> bool;
    /// The action became held since the previous tick.
    fn just_pressed(&self, action: Action) -> bool;
}

// ---------------------------------------------------------------------------
// InputFrame
// ---------------------------------------------------------------------------

/// Logical input for a single physics tick. Serializable so sessions can be
/// recorded and replayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Actions held during this tick.
    pub active: BTreeSet<Action>,
    /// Actions whose press started this tick. Always a subset of `active`
    /// when built by [`InputState`] or the builder methods.
    pub pressed: BTreeSet<Action>,
}

impl InputFrame {
    /// No input at all.
    pub fn idle() -> Self {
        Self::default()
    }

    /// `actions` held, none freshly pressed.
    pub fn holding(actions: &[Action]) -> Self {
        Self {
            active: actions.iter().copied().collect(),
            pressed: BTreeSet::new(),
        }
    }

    /// Add a fresh press of `action` (which also counts as held).
    pub fn with_press(mut self, action: Action) -> Self {
        self.active.insert(action);
        self.pressed.insert(action);
        self
    }
}

impl ActionQuery for InputFrame {
    fn is_active(&self, action: Action) -> bool {
        self.active.contains(&action)
    }

    fn just_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

/// A physical input: a keyboard key or a gamepad button, by name.
///
/// Key names follow the web `KeyboardEvent.key`/winit naming (`ArrowLeft`,
/// `Space`, `Escape`, ...); gamepad names follow the standard mapping labels
/// (`A`, `Back`, `LB`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Binding {
    Key(String),
    Gamepad(String),
}

impl Binding {
    pub fn key(name: &str) -> Self {
        Self::Key(name.to_owned())
    }

    pub fn gamepad(name: &str) -> Self {
        Self::Gamepad(name.to_owned())
    }
}

/// Maps physical inputs to logical actions. One binding may drive several
/// actions and one action may have several bindings.
#[derive(Debug, Clone)]
pub struct Bindings {
    map: HashMap<Binding, Vec<Action>>,
}

impl Bindings {
    /// No bindings.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind `binding` to `action` in addition to any existing actions.
    pub fn bind(&mut self, binding: Binding, action: Action) -> &mut Self {
        let actions = self.map.entry(binding).or_default();
        if !actions.contains(&action) {
            actions.push(action);
        }
        self
    }

    /// Actions driven by `binding` (empty if unbound).
    pub fn actions_for(&self, binding: &Binding) -> &[Action] {
        self.map.get(binding).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The keyboard and gamepad layout of the demo.
    pub fn standard() -> Self {
        let mut b = Self::empty();
        b.bind(Binding::key("ArrowLeft"), Action::Left)
            .bind(Binding::gamepad("Left"), Action::Left)
            .bind(Binding::key("ArrowRight"), Action::Right)
            .bind(Binding::gamepad("Right"), Action::Right)
            .bind(Binding::key("ArrowUp"), Action::Up)
            .bind(Binding::gamepad("Up"), Action::Up)
            .bind(Binding::key("ArrowDown"), Action::Down)
            .bind(Binding::gamepad("Down"), Action::Down)
            .bind(Binding::key("Space"), Action::Jump)
            .bind(Binding::gamepad("A"), Action::Jump)
            .bind(Binding::key("Escape"), Action::Menu)
            .bind(Binding::gamepad("Back"), Action::Menu)
            .bind(Binding::key("E"), Action::Inventory)
            .bind(Binding::gamepad("LB"), Action::Inventory)
            .bind(Binding::key("M"), Action::Map)
            .bind(Binding::gamepad("RB"), Action::Map)
            .bind(Binding::key("Tab"), Action::StatusOverlay)
            .bind(Binding::gamepad("RB"), Action::StatusOverlay);
        b
    }
}

// ---------------------------------------------------------------------------
// InputState
// ---------------------------------------------------------------------------

/// Accumulates device events between ticks and hands out [`InputFrame`]s.
///
/// A press is latched until the next [`take_frame`](Self::take_frame), so a
/// tap shorter than one tick is still seen as a jump.
#[derive(Debug, Clone)]
pub struct InputState {
    bindings: Bindings,
    held: HashSet<Binding>,
    pressed: BTreeSet<Action>,
    /// Window/page has focus. Losing it releases everything.
    focused: bool,
}

impl Default for Bindings {
    fn default() -> Self {
        Self::standard()
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(Bindings::standard())
    }
}

impl InputState {
    pub fn new(bindings: Bindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
            pressed: BTreeSet::new(),
            focused: true,
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Record a press (`pressed == true`) or release of a physical input.
    /// Unbound inputs are ignored; OS key repeat does not re-trigger.
    pub fn handle(&mut self, binding: &Binding, pressed: bool) {
        let actions = self.bindings.actions_for(binding);
        if actions.is_empty() {
            tracing::trace!(?binding, "ignoring unbound input");
            return;
        }
        if pressed {
            if !self.focused || self.held.contains(binding) {
                return;
            }
            let before = self.active_actions();
            self.held.insert(binding.clone());
            for &action in actions {
                if !before.contains(&action) {
                    self.pressed.insert(action);
                }
            }
        } else if !self.held.remove(binding) {
            tracing::debug!(?binding, "release of an input that was not held");
        }
    }

    /// Track window focus. Losing focus releases every held input so no key
    /// stays stuck down.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.release_all();
        }
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Actions currently held through any binding.
    pub fn active_actions(&self) -> BTreeSet<Action> {
        self.held
            .iter()
            .flat_map(|b| self.bindings.actions_for(b).iter().copied())
            .collect()
    }

    /// Snapshot the state for the next tick and clear the press latch.
    pub fn take_frame(&mut self) -> InputFrame {
        let pressed = std::mem::take(&mut self.pressed);
        // A tap released before the tick still counts as held for that tick.
        let active = self.active_actions().union(&pressed).copied().collect();
        InputFrame { active, pressed }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
