//! Core domain type definitions

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────
// Cursor
// ─────────────────────────────────────────────────────────

/// Cursor mode reported by the engine
///
/// `Enabled` shows the on-screen pointer and treats input as free-moving.
/// `Disabled` means the pointer is captured: hidden, with relative input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorMode {
    #[default]
    Enabled,
    Disabled,
}

impl CursorMode {
    /// Whether the on-screen cursor indicator should be shown in this mode
    pub fn is_visible(&self) -> bool {
        matches!(self, CursorMode::Enabled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CursorMode::Enabled => "enabled",
            CursorMode::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for CursorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device-space coordinate pair
///
/// Values are not validated; they may be negative or outside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

// ─────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────

/// How the operator is currently interacting with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// A real pointing device is attached
    PointerDriven,
    /// Touch-only interaction
    TouchDriven,
}

/// Engine key code (evdev numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const ESC: KeyCode = KeyCode(1);

    pub fn code(&self) -> u16 {
        self.0
    }
}

/// Mouse button understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event forwarded to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MouseEvent {
    Move { x: i32, y: i32 },
    Button { button: MouseButton, down: bool },
    Scroll { dx: i32, dy: i32 },
}

// ─────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Constructed, `setup` not yet called
    #[default]
    Created,
    /// Wired up and mediating input
    Active,
    /// Engine has exited (terminal)
    Exited,
}

impl SessionPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionPhase::Active)
    }
}

/// Classification of an engine exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Exit code 0
    Normal,
    /// Any non-zero exit code
    Crashed(i32),
}

impl ExitKind {
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            ExitKind::Normal
        } else {
            ExitKind::Crashed(code)
        }
    }

    pub fn is_crash(&self) -> bool {
        matches!(self, ExitKind::Crashed(_))
    }
}
