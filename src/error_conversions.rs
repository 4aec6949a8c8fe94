//! Error conversion glue between layers.
//!
//! The domain layer must not depend on service/repository error types, so
//! the conversions live here instead of next to the error definitions.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(feature = "server")]
mod server {
    use crate::domain::types::TypeConstraintError;
    use crate::forms::festivals::FestivalFormError;
    use crate::forms::import_export::UploadParseError;
    use crate::forms::submissions::SubmitTempleFormError;
    use crate::forms::temples::{BulkOpenFormError, TempleFormError};
    use crate::services::ServiceError;

    impl From<TypeConstraintError> for ServiceError {
        fn from(val: TypeConstraintError) -> Self {
            ServiceError::TypeConstraint(val.to_string())
        }
    }

    impl From<SubmitTempleFormError> for ServiceError {
        fn from(val: SubmitTempleFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<TempleFormError> for ServiceError {
        fn from(val: TempleFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<BulkOpenFormError> for ServiceError {
        fn from(val: BulkOpenFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<FestivalFormError> for ServiceError {
        fn from(val: FestivalFormError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }

    impl From<UploadParseError> for ServiceError {
        fn from(val: UploadParseError) -> Self {
            ServiceError::Form(val.to_string())
        }
    }
}
