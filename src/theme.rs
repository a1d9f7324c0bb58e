use crate::simulate::RunStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub primary_color: String,
    pub primary_text_color: String,
    pub primary_border_color: String,
    pub line_color: String,
    pub background: String,
    pub pending_color: String,
    pub running_color: String,
    pub success_color: String,
    pub failure_color: String,
}

impl Theme {
    /// Colours close to the stock bpmn-js look.
    pub fn bpmn_default() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            font_size: 12.0,
            primary_color: "#FFFFFF".to_string(),
            primary_text_color: "#000000".to_string(),
            primary_border_color: "#000000".to_string(),
            line_color: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
            pending_color: "#9CA3AF".to_string(),
            running_color: "#2563EB".to_string(),
            success_color: "#16A34A".to_string(),
            failure_color: "#DC2626".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            primary_color: "#F8FAFF".to_string(),
            primary_text_color: "#1C2430".to_string(),
            primary_border_color: "#C7D2E5".to_string(),
            line_color: "#7A8AA6".to_string(),
            background: "#FFFFFF".to_string(),
            pending_color: "#A0AEC0".to_string(),
            running_color: "#4C6EF5".to_string(),
            success_color: "#2F9E44".to_string(),
            failure_color: "#E03131".to_string(),
        }
    }

    pub fn status_color(&self, status: RunStatus) -> &str {
        match status {
            RunStatus::Pending => &self.pending_color,
            RunStatus::Running => &self.running_color,
            RunStatus::Success => &self.success_color,
            RunStatus::Failure => &self.failure_color,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::bpmn_default()
    }
}
