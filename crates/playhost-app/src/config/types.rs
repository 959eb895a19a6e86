//! Menu settings types
//!
//! Defines:
//! - `MenuSettings` - Operator preferences for the in-game menu
//! - `GestureMode`, `MouseMoveMode` - Touch input behaviour enums

use serde::{Deserialize, Serialize};

/// Operator preferences for the in-game menu.
///
/// Mutated by the host UI; the session only loads them and keeps the
/// persisted copy in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// Fit the game surface to the screen
    pub auto_fit: bool,

    /// Keep the menu view from being dragged
    pub lock_menu_view: bool,

    /// Skip resizing the surface when the soft keyboard opens
    pub disable_soft_key_adjust: bool,

    /// Show the engine log overlay
    pub show_log: bool,

    /// Ignore touch gestures on the game surface
    pub disable_gesture: bool,

    pub gesture_mode: GestureMode,

    pub mouse_move_mode: MouseMoveMode,

    /// Pointer speed multiplier
    pub mouse_sensitivity: f64,

    /// On-screen cursor size in pixels
    pub mouse_size: u32,

    /// Hold time before a touch becomes a long press
    pub gesture_long_press_delay_ms: u32,

    /// Hotbar hit-area scale, in percent
    pub item_bar_scale: i32,

    /// Render resolution scale, in percent
    pub window_scale: u32,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            auto_fit: true,
            lock_menu_view: false,
            disable_soft_key_adjust: false,
            show_log: false,
            disable_gesture: false,
            gesture_mode: GestureMode::default(),
            mouse_move_mode: MouseMoveMode::default(),
            mouse_sensitivity: 1.0,
            mouse_size: 15,
            gesture_long_press_delay_ms: 300,
            item_bar_scale: 0,
            window_scale: 100,
        }
    }
}

/// What a long press on the game surface does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureMode {
    /// Long press breaks blocks, tap uses items
    #[default]
    Build,
    /// Long press uses items, tap attacks
    Fight,
}

/// How touch movement drives the pointer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseMoveMode {
    /// Drag moves the pointer relative to where it was
    #[default]
    Slide,
    /// The pointer jumps to the touch point
    Click,
}
