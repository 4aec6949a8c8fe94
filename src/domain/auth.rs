use serde::{Deserialize, Serialize};

/// User identity issued by the shared auth service.
///
/// The session identity carries this struct serialized as JSON. Services take
/// it explicitly instead of reading any process-wide "current user".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Stable user identifier, stored as `submitted_by` on submissions.
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiry as a unix timestamp in seconds.
    pub exp: i64,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        check_role(role, &self.roles)
    }

    pub fn is_expired(&self, now_ts: i64) -> bool {
        self.exp > 0 && self.exp < now_ts
    }
}

/// Returns `true` when `role` is present in `roles`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}
