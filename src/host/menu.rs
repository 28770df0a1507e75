//! Menu actions and labels

use crate::state::{AdapterHandle, AdapterState};

/// A user action from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Toggle,
    Enable,
    Disable,
    /// Disable now, re-enable after this many seconds
    DisableFor(u64),
    /// Cancel the timer and make sure the adapter is on
    CancelTimer,
    Status,
    Refresh,
    Json,
    Help,
    Quit,
}

impl MenuAction {
    /// Parse one input line. Numbers pick an entry from `durations` (1-based).
    pub fn parse(line: &str, durations: &[u64]) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        let argument = words.next();

        let action = match (command.as_str(), argument) {
            ("t" | "toggle", None) => Self::Toggle,
            ("on" | "enable", None) => Self::Enable,
            ("off", None) | ("disable", None) => Self::Disable,
            ("disable" | "for", Some(seconds)) => Self::DisableFor(
                seconds
                    .parse()
                    .map_err(|_| format!("'{}' is not a number of seconds", seconds))?,
            ),
            ("c" | "cancel", None) => Self::CancelTimer,
            ("s" | "status", None) => Self::Status,
            ("r" | "refresh", None) => Self::Refresh,
            ("json", None) => Self::Json,
            ("h" | "help" | "?", None) => Self::Help,
            ("q" | "quit" | "exit", None) => Self::Quit,
            (number, None) if number.parse::<usize>().is_ok() => {
                let index: usize = number.parse().unwrap_or_default();
                let seconds = index
                    .checked_sub(1)
                    .and_then(|i| durations.get(i))
                    .ok_or_else(|| format!("no timer entry {}", number))?;
                Self::DisableFor(*seconds)
            }
            _ => return Err(format!("unknown command '{}', type 'help' for the menu", line.trim())),
        };

        if let Self::DisableFor(0) = action {
            return Err("timer duration must be at least 1 second".to_string());
        }
        Ok(action)
    }
}

/// "1 minute", "30 minutes", "1 hour", "90 seconds"
pub fn duration_label(seconds: u64) -> String {
    let (count, unit) = if seconds % 3600 == 0 {
        (seconds / 3600, "hour")
    } else if seconds % 60 == 0 {
        (seconds / 60, "minute")
    } else {
        (seconds, "second")
    };
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Label for the default toggle entry, naming what clicking it will do
pub fn toggle_label(adapter: &AdapterHandle, state: AdapterState) -> String {
    let next = if state.is_enabled() { "Off" } else { "On" };
    format!("Toggle {} ({})", adapter, next)
}

/// The full menu
pub fn menu_text(adapter: &AdapterHandle, state: AdapterState, durations: &[u64]) -> String {
    let mut lines = vec![
        format!("  t) {}", toggle_label(adapter, state)),
        "     on / off".to_string(),
        "  Disable for...".to_string(),
    ];
    for (index, seconds) in durations.iter().enumerate() {
        lines.push(format!("    {}) {}", index + 1, duration_label(*seconds)));
    }
    lines.push("    c) Cancel Timer".to_string());
    lines.push("  s) Status   r) Refresh   json   q) Quit".to_string());
    lines.join("\n")
}
