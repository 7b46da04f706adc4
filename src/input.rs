//! The per-frame input feed.
//!
//! Platform glue fills an [`InputState`] with the *current* level of every
//! button and key. The engine keeps the previous frame's levels itself and
//! derives press/release edges, so callers never track transitions.

use rustc_hash::FxHashSet;

use crate::math::Vector2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Named keys the dispatcher forwards to the focused element. Printable input
/// arrives separately as characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    Tab,
    Enter,
    Escape,
    Space,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Control,
    Alt,
    Super,
    /// A platform key code without a name here.
    Other(u32),
}

/// Edge-aware state of one button, advanced once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PointerState {
    PressedThisFrame,
    Pressed,
    ReleasedThisFrame,
    #[default]
    Released,
}

impl PointerState {
    /// The state one frame later, given whether the button is held now.
    pub fn advance(self, is_down: bool) -> Self {
        if is_down {
            match self {
                PointerState::PressedThisFrame | PointerState::Pressed => PointerState::Pressed,
                _ => PointerState::PressedThisFrame,
            }
        } else {
            match self {
                PointerState::ReleasedThisFrame | PointerState::Released => PointerState::Released,
                _ => PointerState::ReleasedThisFrame,
            }
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, PointerState::PressedThisFrame | PointerState::Pressed)
    }

    pub fn pressed_this_frame(self) -> bool {
        self == PointerState::PressedThisFrame
    }

    pub fn released_this_frame(self) -> bool {
        self == PointerState::ReleasedThisFrame
    }
}

/// Level-triggered input for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    /// `None` while the pointer is outside the window.
    pub pointer: Option<Vector2>,
    pub buttons_down: FxHashSet<MouseButton>,
    /// Wheel movement accumulated since the previous frame.
    pub wheel: Vector2,
    pub keys_down: FxHashSet<Key>,
    /// Characters typed since the previous frame, in order.
    pub text: Vec<char>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn pointer(&mut self, x: f64, y: f64) -> &mut Self {
        self.pointer = Some(Vector2::new(x, y));
        self
    }

    #[inline]
    pub fn button_down(&mut self, button: MouseButton) -> &mut Self {
        self.buttons_down.insert(button);
        self
    }

    #[inline]
    pub fn wheel(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.wheel = Vector2::new(dx, dy);
        self
    }

    #[inline]
    pub fn key_down(&mut self, key: Key) -> &mut Self {
        self.keys_down.insert(key);
        self
    }

    #[inline]
    pub fn text(&mut self, text: &str) -> &mut Self {
        self.text.extend(text.chars());
        self
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

/// Input with edges resolved against the previous committed frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FrameInput {
    pub(crate) pointer: Option<Vector2>,
    pub(crate) primary: PointerState,
    pub(crate) wheel: Vector2,
    pub(crate) keys_pressed: Vec<Key>,
    pub(crate) keys_released: Vec<Key>,
    pub(crate) text: Vec<char>,
}

/// Levels seen at the last committed frame.
#[derive(Debug, Clone, Default)]
pub(crate) struct InputTracker {
    primary: PointerState,
    keys_down: FxHashSet<Key>,
}

impl InputTracker {
    /// Derives this frame's edges without touching the tracker, so an aborted
    /// frame leaves it as it was.
    pub(crate) fn resolve(&self, input: &InputState) -> FrameInput {
        let mut keys_pressed: Vec<Key> = input
            .keys_down
            .iter()
            .filter(|key| !self.keys_down.contains(key))
            .copied()
            .collect();
        let mut keys_released: Vec<Key> = self
            .keys_down
            .iter()
            .filter(|key| !input.keys_down.contains(key))
            .copied()
            .collect();
        // Hash order is arbitrary; dispatch order must not be.
        keys_pressed.sort_by_key(key_order);
        keys_released.sort_by_key(key_order);

        FrameInput {
            pointer: input.pointer,
            primary: self.primary.advance(input.is_button_down(MouseButton::Left)),
            wheel: input.wheel,
            keys_pressed,
            keys_released,
            text: input.text.clone(),
        }
    }

    pub(crate) fn commit(&mut self, input: &InputState, frame: &FrameInput) {
        self.primary = frame.primary;
        self.keys_down = input.keys_down.clone();
    }
}

fn key_order(key: &Key) -> (u8, u32) {
    match key {
        Key::Other(code) => (1, *code),
        named => (0, named_rank(*named)),
    }
}

fn named_rank(key: Key) -> u32 {
    match key {
        Key::Tab => 0,
        Key::Enter => 1,
        Key::Escape => 2,
        Key::Space => 3,
        Key::Backspace => 4,
        Key::Delete => 5,
        Key::Left => 6,
        Key::Right => 7,
        Key::Up => 8,
        Key::Down => 9,
        Key::Home => 10,
        Key::End => 11,
        Key::PageUp => 12,
        Key::PageDown => 13,
        Key::Shift => 14,
        Key::Control => 15,
        Key::Alt => 16,
        Key::Super => 17,
        Key::Other(_) => u32::MAX,
    }
}
