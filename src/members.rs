use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::MemberId;

/// registered cooperative member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    /// human-facing membership number, e.g. "SAC-00042"
    pub member_no: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    /// register a new member
    pub fn register(
        member_no: impl Into<String>,
        full_name: impl Into<String>,
        email: Option<String>,
        phone: Option<String>,
        time_provider: &SafeTimeProvider,
    ) -> Self {
        Self {
            member_id: Uuid::new_v4(),
            member_no: member_no.into(),
            full_name: full_name.into(),
            email: normalize_contact(email),
            phone: normalize_contact(phone),
            joined_at: time_provider.now(),
        }
    }

    /// address decision notices go to, if the member left one
    pub fn notice_address(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

fn normalize_contact(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
