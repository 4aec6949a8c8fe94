use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::name_rules::check_name;
use crate::domain::submission::{
    PayloadContact, PayloadLocation, PayloadTimings, SubmissionPayload,
};
use crate::domain::types::{LocalizedText, RegionCode, TypeConstraintError};

/// Splits a textarea into trimmed non-empty lines.
pub(crate) fn split_lines(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a comma separated tag list.
pub(crate) fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional coordinate field; blank input means "not provided".
pub(crate) fn parse_coordinate(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<f64>, TypeConstraintError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| TypeConstraintError::OutOfRange(field)),
        None => Ok(None),
    }
}

/// Public "suggest a temple" form.
#[derive(Deserialize, Validate)]
pub struct SubmitTempleForm {
    #[validate(length(min = 1, max = 200))]
    pub name_english: String,
    #[serde(default)]
    pub name_telugu: String,
    #[validate(length(min = 1, max = 200))]
    pub deity_english: String,
    #[serde(default)]
    pub deity_telugu: String,
    #[serde(default)]
    pub description_english: String,
    #[serde(default)]
    pub description_telugu: String,
    #[validate(length(min = 1))]
    pub district: String,
    #[validate(length(min = 1))]
    pub state: String,
    pub temple_type: Option<String>,
    #[serde(default)]
    pub address_english: String,
    #[serde(default)]
    pub address_telugu: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub morning_timings: Option<String>,
    pub evening_timings: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    /// Comma separated.
    #[serde(default)]
    pub features: String,
    /// One URL per line.
    #[serde(default)]
    pub images: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTempleFormPayload {
    pub temple_data: SubmissionPayload,
}

#[derive(Debug, Error)]
pub enum SubmitTempleFormError {
    #[error("Submission form validation failed: {0}")]
    Validation(String),
    #[error("Submission form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Please enter a real temple name: {0}")]
    InvalidName(String),
}

impl From<ValidationErrors> for SubmitTempleFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for SubmitTempleFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<SubmitTempleForm> for SubmitTempleFormPayload {
    type Error = SubmitTempleFormError;

    fn try_from(mut value: SubmitTempleForm) -> Result<Self, Self::Error> {
        // Browsers send an empty field for a blank email input.
        value.email = non_empty(value.email.take());
        value.validate()?;

        let name = LocalizedText::new(value.name_english, value.name_telugu);
        check_name(&name.english)
            .map_err(|reason| SubmitTempleFormError::InvalidName(reason.to_string()))?;

        let deity = LocalizedText::new(value.deity_english, value.deity_telugu);
        if deity.english.is_empty() {
            return Err(TypeConstraintError::EmptyString("deity").into());
        }
        let district = value.district.trim().to_string();
        if district.is_empty() {
            return Err(TypeConstraintError::EmptyString("district").into());
        }
        let state = RegionCode::try_from(value.state.as_str())?;

        let location = PayloadLocation {
            latitude: parse_coordinate(value.latitude.as_deref(), "latitude")?,
            longitude: parse_coordinate(value.longitude.as_deref(), "longitude")?,
        };

        Ok(Self {
            temple_data: SubmissionPayload {
                name: Some(name),
                deity: Some(deity),
                description: Some(LocalizedText::new(
                    value.description_english,
                    value.description_telugu,
                )),
                history: None,
                district: Some(district),
                state: Some(state.as_str().to_string()),
                temple_type: non_empty(value.temple_type),
                address: Some(LocalizedText::new(
                    value.address_english,
                    value.address_telugu,
                )),
                location: Some(location),
                timings: Some(PayloadTimings {
                    morning: non_empty(value.morning_timings),
                    evening: non_empty(value.evening_timings),
                    puja_timings: Vec::new(),
                }),
                contact: Some(PayloadContact {
                    phone: non_empty(value.phone),
                    website: non_empty(value.website),
                    email: non_empty(value.email),
                }),
                features: split_tags(&value.features),
                images: split_lines(&value.images),
            },
        })
    }
}
