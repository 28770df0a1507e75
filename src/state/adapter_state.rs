//! Adapter identity and administrative state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies the single adapter under control by name
///
/// Resolved once at startup and never re-resolved, even if the adapter
/// disappears later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdapterHandle {
    name: String,
}

impl AdapterHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for AdapterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Last observed administrative state of the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AdapterState {
    Enabled,
    Disabled,
    /// Not detected yet, or the last query failed
    #[default]
    Unknown,
}

impl AdapterState {
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    /// Label shown next to the indicator
    pub fn label(self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
            Self::Unknown => "Unknown",
        }
    }

    /// The state a toggle should move to. `Unknown` toggles as if disabled.
    pub fn toggled(self) -> TargetState {
        match self {
            Self::Enabled => TargetState::Disabled,
            Self::Disabled | Self::Unknown => TargetState::Enabled,
        }
    }
}

impl fmt::Display for AdapterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A state the controller can be asked to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetState {
    Enabled,
    Disabled,
}

impl TargetState {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { Self::Enabled } else { Self::Disabled }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    /// Verb used in logs and error messages
    pub fn verb(self) -> &'static str {
        match self {
            Self::Enabled => "enable",
            Self::Disabled => "disable",
        }
    }
}

impl From<TargetState> for AdapterState {
    fn from(target: TargetState) -> Self {
        match target {
            TargetState::Enabled => AdapterState::Enabled,
            TargetState::Disabled => AdapterState::Disabled,
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        AdapterState::from(*self).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_toggles_to_enabled() {
        assert_eq!(AdapterState::Unknown.toggled(), TargetState::Enabled);
        assert_eq!(AdapterState::Disabled.toggled(), TargetState::Enabled);
        assert_eq!(AdapterState::Enabled.toggled(), TargetState::Disabled);
    }

    #[test]
    fn default_state_is_unknown() {
        assert_eq!(AdapterState::default(), AdapterState::Unknown);
    }

    #[test]
    fn target_converts_to_matching_state() {
        assert_eq!(AdapterState::from(TargetState::Enabled), AdapterState::Enabled);
        assert_eq!(AdapterState::from(TargetState::Disabled), AdapterState::Disabled);
        assert_eq!(TargetState::from_enabled(false), TargetState::Disabled);
    }

    #[test]
    fn labels_match_indicator_text() {
        assert_eq!(AdapterState::Enabled.to_string(), "Enabled");
        assert_eq!(AdapterState::Disabled.to_string(), "Disabled");
        assert_eq!(AdapterState::Unknown.to_string(), "Unknown");
        assert_eq!(AdapterHandle::new("Ethernet 2").to_string(), "Ethernet 2");
    }
}
