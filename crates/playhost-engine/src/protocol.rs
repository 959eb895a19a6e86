//! Line protocol spoken with a process-backed engine
//!
//! Engine stdout carries two kinds of lines: control events wrapped in
//! brackets (`[{"event":"cursor.mode","params":{"mode":"disabled"}}]`) and
//! plain log output. Host input is written to the engine's stdin as
//! bracketed method calls.

use serde::Deserialize;
use serde_json::json;

use playhost_core::{CursorModeChange, EngineEvent, KeyCode, MouseEvent};

/// Event name for cursor capture changes
pub const EVENT_CURSOR_MODE: &str = "cursor.mode";

/// Event name for the first rendered frame
pub const EVENT_GRAPHIC_OUTPUT: &str = "graphic.output";

/// Method name for key input
pub const METHOD_INPUT_KEY: &str = "input.key";

/// Method name for pointer input
pub const METHOD_INPUT_MOUSE: &str = "input.mouse";

/// Strip the outer brackets from a control line
///
/// Returns the inner content if brackets are present.
pub(crate) fn strip_brackets(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.starts_with("[{") && trimmed.ends_with("}]") {
        Some(&trimmed[1..trimmed.len() - 1])
    } else {
        None
    }
}

/// A raw control event (before parsing into typed events)
#[derive(Debug, Clone, Deserialize)]
struct RawEvent {
    event: String,
    #[serde(default)]
    params: serde_json::Value,
}

// ─────────────────────────────────────────────────────────
// Inbound Parsing
// ─────────────────────────────────────────────────────────

/// Parses one line of engine stdout.
///
/// Recognized control lines become their typed event. Everything else,
/// including malformed or unknown control lines, is log output and is kept
/// verbatim so nothing the engine printed is lost.
pub fn parse_engine_line(line: &str) -> EngineEvent {
    parse_control_line(line).unwrap_or_else(|| EngineEvent::Log(line.to_string()))
}

fn parse_control_line(line: &str) -> Option<EngineEvent> {
    let json = strip_brackets(line)?;
    let raw: RawEvent = serde_json::from_str(json).ok()?;

    match raw.event.as_str() {
        EVENT_CURSOR_MODE => serde_json::from_value::<CursorModeChange>(raw.params)
            .ok()
            .map(|change| EngineEvent::CursorModeChanged(change.mode)),
        EVENT_GRAPHIC_OUTPUT => Some(EngineEvent::GraphicOutput),
        other => {
            tracing::debug!("Unknown engine event '{}', treating as log output", other);
            None
        }
    }
}

// ─────────────────────────────────────────────────────────
// Outbound Encoding
// ─────────────────────────────────────────────────────────

/// Encode a key press/release for the engine's stdin
pub fn encode_key_event(code: KeyCode, is_down: bool) -> String {
    let msg = json!([{
        "method": METHOD_INPUT_KEY,
        "params": { "code": code.code(), "down": is_down },
    }]);
    msg.to_string()
}

/// Encode a pointer event for the engine's stdin
pub fn encode_mouse_event(event: MouseEvent) -> String {
    let msg = json!([{
        "method": METHOD_INPUT_MOUSE,
        "params": event,
    }]);
    msg.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use playhost_core::{CursorMode, MouseButton};

    #[test]
    fn test_strip_brackets() {
        assert_eq!(strip_brackets(r#"[{"a":1}]"#), Some(r#"{"a":1}"#));
        assert_eq!(strip_brackets(r#"  [{"a":1}]  "#), Some(r#"{"a":1}"#));
        assert_eq!(strip_brackets("[INFO] starting"), None);
        assert_eq!(strip_brackets("plain"), None);
    }

    #[test]
    fn test_parse_cursor_mode_event() {
        let event =
            parse_engine_line(r#"[{"event":"cursor.mode","params":{"mode":"disabled"}}]"#);
        assert_eq!(event, EngineEvent::CursorModeChanged(CursorMode::Disabled));

        let event = parse_engine_line(r#"[{"event":"cursor.mode","params":{"mode":"enabled"}}]"#);
        assert_eq!(event, EngineEvent::CursorModeChanged(CursorMode::Enabled));
    }

    #[test]
    fn test_parse_graphic_output_without_params() {
        let event = parse_engine_line(r#"[{"event":"graphic.output"}]"#);
        assert_eq!(event, EngineEvent::GraphicOutput);
    }

    #[test]
    fn test_plain_line_is_log() {
        let line = "[12:00:01] [Render thread/INFO]: Setting user: Steve";
        assert_eq!(parse_engine_line(line), EngineEvent::Log(line.to_string()));
    }

    #[test]
    fn test_unknown_or_malformed_control_is_log() {
        let unknown = r#"[{"event":"audio.ready","params":{}}]"#;
        assert_eq!(
            parse_engine_line(unknown),
            EngineEvent::Log(unknown.to_string())
        );

        let bad_mode = r#"[{"event":"cursor.mode","params":{"mode":"sideways"}}]"#;
        assert_eq!(
            parse_engine_line(bad_mode),
            EngineEvent::Log(bad_mode.to_string())
        );

        let broken = r#"[{"event":}]"#;
        assert_eq!(parse_engine_line(broken), EngineEvent::Log(broken.to_string()));
    }

    #[test]
    fn test_encode_key_event() {
        let line = encode_key_event(KeyCode::ESC, true);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value[0]["method"], "input.key");
        assert_eq!(value[0]["params"]["code"], 1);
        assert_eq!(value[0]["params"]["down"], true);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_encode_mouse_event() {
        let line = encode_mouse_event(MouseEvent::Button {
            button: MouseButton::Left,
            down: false,
        });
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value[0]["method"], "input.mouse");
        assert_eq!(value[0]["params"]["kind"], "button");
        assert_eq!(value[0]["params"]["button"], "left");
        assert_eq!(value[0]["params"]["down"], false);
    }
}
