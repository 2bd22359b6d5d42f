//! Per-call configuration and engine-wide settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Classes applied or removed when an element finishes expanding or collapsing.
///
/// An empty string means the class is not managed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Added when expanded, removed when collapsed.
    pub class_on_expanded: String,
    /// Added when collapsed, removed when expanded.
    pub class_on_collapsed: String,
}

impl Config {
    /// A fresh configuration with both classes unset.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_on_expanded(mut self, class: impl Into<String>) -> Self {
        self.class_on_expanded = class.into();
        self
    }

    pub fn class_on_collapsed(mut self, class: impl Into<String>) -> Self {
        self.class_on_collapsed = class.into();
        self
    }

    /// Load from JSON such as `{"classOnExpanded": "open"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn expanded_class(&self) -> Option<&str> {
        Some(self.class_on_expanded.as_str()).filter(|c| !c.is_empty())
    }

    pub(crate) fn collapsed_class(&self) -> Option<&str> {
        Some(self.class_on_collapsed.as_str()).filter(|c| !c.is_empty())
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Duration of the height transition injected when the element has none.
    pub default_transition_ms: u64,
    /// Marker class while expanding.
    pub expanding_class: String,
    /// Marker class while collapsing.
    pub collapsing_class: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_transition_ms: 300,
            expanding_class: "expanding".to_string(),
            collapsing_class: "collapsing".to_string(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn default_transition(&self) -> Duration {
        Duration::from_millis(self.default_transition_ms)
    }

    /// The declaration injected for elements without a height transition.
    pub fn transition_declaration(&self) -> String {
        format!("height {}ms", self.default_transition_ms)
    }
}
