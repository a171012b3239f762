use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;
use serde_json::Value;

/// Server-held fallbacks for every per-request dispatch override.
#[derive(Debug, Clone, Default)]
pub struct DispatchDefaults {
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub recipients: Option<String>,
    pub template_id: Option<String>,
    pub view_base_url: Option<String>,
}

/// Fully resolved dispatch settings. Every field is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    pub app_id: String,
    pub app_secret: String,
    pub template_id: String,
    pub recipients: Vec<String>,
    pub view_base_url: String,
}

#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub recipient: String,
    pub accepted: bool,
    pub raw_response: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Success,
    PartialError,
}

impl Display for OverallStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OverallStatus::Success => write!(f, "success"),
            OverallStatus::PartialError => write!(f, "partial_error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchSummary {
    pub status: OverallStatus,
    pub sent: usize,
    pub total: usize,
    pub detail_url: String,
}

impl DispatchSummary {
    pub fn aggregate(results: &[DispatchResult], detail_url: String) -> Self {
        let sent = results.iter().filter(|r| r.accepted).count();

        let status = if sent > 0 {
            OverallStatus::Success
        } else {
            OverallStatus::PartialError
        };

        Self {
            status,
            sent,
            total: results.len(),
            detail_url,
        }
    }
}
