use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of an administrator account.
///
/// Admins manage records. Owners can additionally delete published records, reset collections,
/// and manage administrator accounts.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Admin,
    Owner,
}

serde_plain::derive_display_from_serialize!(Role);
serde_plain::derive_fromstr_from_deserialize!(Role);

/// An administrator account as listed from the remote store. The password is never held here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl AdminUser {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }
}
