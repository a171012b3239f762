use serde::{Deserialize, Serialize};

use crate::utils::{format_beijing_time, generate_message_id};

/// An accepted alert. Created once per dispatch and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMessage {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

impl AlertMessage {
    pub fn new(title: String, content: String) -> Self {
        Self {
            id: generate_message_id(),
            title,
            content,
            created_at: format_beijing_time(chrono::Utc::now()),
        }
    }

    pub fn to_stored(&self) -> StoredAlert {
        StoredAlert {
            title: self.title.clone(),
            content: self.content.clone(),
            date: self.created_at.clone(),
        }
    }
}

/// Record layout kept in the content store under the message id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAlert {
    pub title: String,
    pub content: String,
    pub date: String,
}
