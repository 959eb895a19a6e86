//! Domain event definitions

use serde::{Deserialize, Serialize};

use crate::types::CursorMode;

// ─────────────────────────────────────────────────────────
// Event Payloads
// ─────────────────────────────────────────────────────────

/// Payload of a `cursor.mode` control line
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorModeChange {
    pub mode: CursorMode,
}

// ─────────────────────────────────────────────────────────
// EngineEvent Enum
// ─────────────────────────────────────────────────────────

/// Notification originated by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine captured or released the pointer
    CursorModeChanged(CursorMode),

    /// One line of engine log output
    Log(String),

    /// The engine rendered its first frame
    GraphicOutput,

    /// The engine process terminated
    Exited { code: i32 },
}

impl EngineEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CursorModeChanged(_) => "cursor_mode_changed",
            Self::Log(_) => "log",
            Self::GraphicOutput => "graphic_output",
            Self::Exited { .. } => "exited",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_labels() {
        assert_eq!(
            EngineEvent::CursorModeChanged(CursorMode::Disabled).event_type(),
            "cursor_mode_changed"
        );
        assert_eq!(EngineEvent::Log("x".into()).event_type(), "log");
        assert_eq!(EngineEvent::GraphicOutput.event_type(), "graphic_output");
        assert_eq!(EngineEvent::Exited { code: 0 }.event_type(), "exited");
    }

    #[test]
    fn test_cursor_mode_change_parse() {
        let change: CursorModeChange = serde_json::from_str(r#"{"mode":"disabled"}"#).unwrap();
        assert_eq!(change.mode, CursorMode::Disabled);
    }
}
