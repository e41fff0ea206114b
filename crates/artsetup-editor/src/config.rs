use artsetup_core::PlacementDefaults;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Editor session settings. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quiet period before an edited artwork is saved. Default: **1000 ms**.
    pub save_debounce_ms: u64,

    /// Maximum number of history entries, oldest evicted first.
    /// Default: **unbounded**.
    pub history_limit: Option<usize>,

    /// Start geometry for uploaded artworks. Default: width 300 at (50, 50).
    pub placement: PlacementDefaults,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: 1000,
            history_limit: None,
            placement: PlacementDefaults::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}
