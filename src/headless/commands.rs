//! Operator commands read from stdin in headless mode

use std::str::FromStr;

use playhost_core::MouseButton;

/// One line of operator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// The host "back" action
    Back,
    /// Host lost focus
    Pause,
    /// Host regained focus
    Resume,
    /// Pointer moved to device coordinates
    Pointer { x: i32, y: i32 },
    /// Pointer button pressed or released
    Button { button: MouseButton, down: bool },
    /// Scroll by notches
    Scroll { dx: i32, dy: i32 },
    /// Stop the engine (or end a simulated session)
    Quit,
}

impl FromStr for OperatorCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().ok_or_else(|| "empty command".to_string())?;

        let parsed = match command {
            "b" | "back" => Self::Back,
            "p" | "pause" => Self::Pause,
            "r" | "resume" => Self::Resume,
            "q" | "quit" => Self::Quit,
            "pointer" => {
                let x = parse_int(&mut parts, command, "x")?;
                let y = parse_int(&mut parts, command, "y")?;
                Self::Pointer { x, y }
            }
            "scroll" => {
                let dx = parse_int(&mut parts, command, "dx")?;
                let dy = parse_int(&mut parts, command, "dy")?;
                Self::Scroll { dx, dy }
            }
            "button" => {
                let button = match parts.next() {
                    Some("left") => MouseButton::Left,
                    Some("right") => MouseButton::Right,
                    Some("middle") => MouseButton::Middle,
                    Some(other) => return Err(format!("button: unknown button {}", other)),
                    None => return Err("button: missing button".to_string()),
                };
                let down = match parts.next() {
                    Some("down") => true,
                    Some("up") => false,
                    Some(other) => {
                        return Err(format!("button: expected down or up, got {}", other))
                    }
                    None => return Err("button: missing down or up".to_string()),
                };
                Self::Button { button, down }
            }
            other => return Err(format!("unknown command: {}", other)),
        };

        if let Some(extra) = parts.next() {
            return Err(format!("{}: unexpected argument {}", command, extra));
        }
        Ok(parsed)
    }
}

fn parse_int<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    command: &str,
    name: &str,
) -> Result<i32, String> {
    parts
        .next()
        .ok_or_else(|| format!("{}: missing {}", command, name))?
        .parse()
        .map_err(|e| format!("{}: bad {}: {}", command, name, e))
}
