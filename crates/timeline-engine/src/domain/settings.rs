//! User settings delivered with the structure read

use serde::{Deserialize, Deserializer, Serialize};

use super::window::clamp_window_days;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// User-defined workspace order; ids missing here sort after by position
    pub workspace_order: Vec<String>,
    pub show_completed: bool,
    /// Days rendered before today
    #[serde(deserialize_with = "window_days")]
    pub past_days: i64,
    /// Days rendered after today
    #[serde(deserialize_with = "window_days")]
    pub future_days: i64,
}

fn window_days<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    i64::deserialize(deserializer).map(clamp_window_days)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workspace_order: Vec::new(),
            show_completed: true,
            past_days: 30,
            future_days: 120,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub future_days: Option<i64>,
}

impl Settings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(order) = &patch.workspace_order {
            self.workspace_order = order.clone();
        }
        if let Some(show) = patch.show_completed {
            self.show_completed = show;
        }
        if let Some(past) = patch.past_days {
            self.past_days = clamp_window_days(past);
        }
        if let Some(future) = patch.future_days {
            self.future_days = clamp_window_days(future);
        }
    }
}
