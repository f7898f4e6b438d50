//! Keyboard key → path command table.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A path mutation triggered by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCommand {
    /// Drop the last selection.
    Ascend,
    /// Select the first row of the next column.
    Expand,
    Previous,
    Next,
    First,
    Last,
    /// Back to the first selection only.
    Home,
}

/// A raw key identifier plus the modifier that changes its meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
        }
    }

    pub fn with_ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: true,
        }
    }

    /// The command bound to this key, if any.
    pub fn command(&self) -> Option<PathCommand> {
        let command = match self.key.as_str() {
            "h" | "ArrowLeft" => PathCommand::Ascend,
            "l" | "ArrowRight" => PathCommand::Expand,
            "k" | "ArrowUp" if self.ctrl => PathCommand::First,
            "k" | "ArrowUp" => PathCommand::Previous,
            "j" | "ArrowDown" if self.ctrl => PathCommand::Last,
            "j" | "ArrowDown" => PathCommand::Next,
            "g" => PathCommand::First,
            "G" => PathCommand::Last,
            "Home" => PathCommand::Home,
            _ => return None,
        };
        Some(command)
    }
}

/// Parses `j`, `ArrowDown`, `C-j` or `ctrl+j`.
impl FromStr for KeyInput {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, ctrl) = match s
            .strip_prefix("C-")
            .or_else(|| s.strip_prefix("ctrl+"))
        {
            Some(key) => (key, true),
            None => (s, false),
        };

        if key.is_empty() {
            return Err(AppError::UnknownKey(s.to_string()));
        }

        Ok(Self {
            key: key.to_string(),
            ctrl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vim_and_arrow_keys_agree() {
        for (vim, arrow) in [("h", "ArrowLeft"), ("l", "ArrowRight"), ("j", "ArrowDown"), ("k", "ArrowUp")] {
            assert_eq!(KeyInput::new(vim).command(), KeyInput::new(arrow).command());
        }
    }

    #[test]
    fn test_table() {
        assert_eq!(KeyInput::new("h").command(), Some(PathCommand::Ascend));
        assert_eq!(KeyInput::new("l").command(), Some(PathCommand::Expand));
        assert_eq!(KeyInput::new("j").command(), Some(PathCommand::Next));
        assert_eq!(KeyInput::new("k").command(), Some(PathCommand::Previous));
        assert_eq!(KeyInput::new("g").command(), Some(PathCommand::First));
        assert_eq!(KeyInput::new("G").command(), Some(PathCommand::Last));
        assert_eq!(KeyInput::new("Home").command(), Some(PathCommand::Home));
        assert_eq!(KeyInput::new("x").command(), None);
    }

    #[test]
    fn test_ctrl_jumps_to_ends() {
        assert_eq!(KeyInput::with_ctrl("k").command(), Some(PathCommand::First));
        assert_eq!(KeyInput::with_ctrl("ArrowDown").command(), Some(PathCommand::Last));
        assert_eq!(KeyInput::with_ctrl("h").command(), Some(PathCommand::Ascend));
    }

    #[test]
    fn test_parse() {
        assert_eq!("j".parse::<KeyInput>().unwrap(), KeyInput::new("j"));
        assert_eq!("C-j".parse::<KeyInput>().unwrap(), KeyInput::with_ctrl("j"));
        assert_eq!("ctrl+ArrowUp".parse::<KeyInput>().unwrap(), KeyInput::with_ctrl("ArrowUp"));
        assert!("C-".parse::<KeyInput>().is_err());
    }
}
