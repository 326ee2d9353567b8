use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum QueueStatus {
    #[default]
    Pending,
    Playing,
}

impl Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Playing => "playing",
        };
        write!(f, "{}", status)
    }
}

impl QueueStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "playing" => QueueStatus::Playing,
            _ => QueueStatus::Pending,
        }
    }
}
