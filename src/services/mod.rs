pub use errors::{ServiceError, ServiceResult};

use crate::SERVICE_ADMIN_ROLE;
use crate::domain::auth::{AuthenticatedUser, check_role};

pub mod admin;
pub mod api;
pub mod errors;
pub mod import_export;
pub mod moderation;
pub mod submissions;
pub mod temples;

/// Fails with [`ServiceError::Unauthorized`] unless the user moderates the
/// directory.
pub(crate) fn require_admin(user: &AuthenticatedUser) -> ServiceResult<()> {
    if check_role(SERVICE_ADMIN_ROLE, &user.roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::SERVICE_ADMIN_ROLE;
    use crate::domain::auth::AuthenticatedUser;
    use crate::domain::submission::{NewSubmission, SubmissionPayload};
    use crate::domain::temple::NewTemple;
    use crate::domain::types::{DistrictName, LocalizedText, RegionCode};

    pub fn admin() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "admin-1".into(),
            email: "admin@example.com".into(),
            name: "Moderator".into(),
            roles: vec![SERVICE_ADMIN_ROLE.into()],
            exp: 0,
        }
    }

    pub fn devotee() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user-7".into(),
            email: "devotee@example.com".into(),
            name: "Devotee".into(),
            roles: vec![],
            exp: 0,
        }
    }

    pub fn new_temple(name: &str, district: &str, state: RegionCode) -> NewTemple {
        NewTemple::new(
            LocalizedText::english(name),
            DistrictName::new(district).unwrap(),
            state,
        )
    }

    pub fn payload(name: &str, district: &str, state: &str) -> SubmissionPayload {
        SubmissionPayload {
            name: Some(LocalizedText::english(name)),
            district: Some(district.into()),
            state: Some(state.into()),
            ..Default::default()
        }
    }

    pub fn submission(name: &str, district: &str, state: &str) -> NewSubmission {
        NewSubmission {
            temple_data: payload(name, district, state),
            submitted_by: Some("user-7".into()),
        }
    }
}
