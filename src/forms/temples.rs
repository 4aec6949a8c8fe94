use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::name_rules::check_name;
use crate::domain::temple::{Contact, Location, NewTemple, Timings, normalize_features};
use crate::domain::types::{
    DistrictName, EmailAddress, ImageUrl, Latitude, LocalizedText, Longitude, Popularity,
    RegionCode, TempleId, TempleType, TypeConstraintError, WebsiteUrl,
};
use crate::forms::submissions::{non_empty, parse_coordinate, split_lines, split_tags};

/// Admin create/edit form for a published temple.
#[derive(Deserialize, Validate)]
pub struct TempleForm {
    #[validate(length(min = 1, max = 200))]
    pub name_english: String,
    #[serde(default)]
    pub name_telugu: String,
    #[serde(default)]
    pub deity_english: String,
    #[serde(default)]
    pub deity_telugu: String,
    #[serde(default)]
    pub description_english: String,
    #[serde(default)]
    pub description_telugu: String,
    #[serde(default)]
    pub history_english: String,
    #[serde(default)]
    pub history_telugu: String,
    #[validate(length(min = 1))]
    pub district: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[serde(default)]
    pub temple_type: String,
    #[serde(default)]
    pub address_english: String,
    #[serde(default)]
    pub address_telugu: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[serde(default)]
    pub morning_timings: String,
    #[serde(default)]
    pub evening_timings: String,
    /// One entry per line.
    #[serde(default)]
    pub puja_timings: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub features: String,
    #[serde(default)]
    pub images: String,
    /// Checkbox; present when checked.
    pub is_open: Option<String>,
    #[validate(range(min = 0, max = 5))]
    #[serde(default)]
    pub popularity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TempleFormPayload {
    pub temple: NewTemple,
}

#[derive(Debug, Error)]
pub enum TempleFormError {
    #[error("Temple form validation failed: {0}")]
    Validation(String),
    #[error("Temple form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Invalid temple name: {0}")]
    InvalidName(String),
}

impl From<ValidationErrors> for TempleFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for TempleFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<TempleForm> for TempleFormPayload {
    type Error = TempleFormError;

    fn try_from(value: TempleForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let name = LocalizedText::new(value.name_english, value.name_telugu);
        check_name(&name.english)
            .map_err(|reason| TempleFormError::InvalidName(reason.to_string()))?;

        let temple_type = if value.temple_type.trim().is_empty() {
            TempleType::default()
        } else {
            TempleType::try_from(value.temple_type.as_str())?
        };

        let latitude = parse_coordinate(value.latitude.as_deref(), "latitude")?
            .map(Latitude::new)
            .transpose()?
            .unwrap_or_default();
        let longitude = parse_coordinate(value.longitude.as_deref(), "longitude")?
            .map(Longitude::new)
            .transpose()?
            .unwrap_or_default();

        let images = split_lines(&value.images)
            .into_iter()
            .map(ImageUrl::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            temple: NewTemple {
                name,
                deity: LocalizedText::new(value.deity_english, value.deity_telugu),
                description: LocalizedText::new(
                    value.description_english,
                    value.description_telugu,
                ),
                history: LocalizedText::new(value.history_english, value.history_telugu),
                district: DistrictName::new(value.district)?,
                state: RegionCode::try_from(value.state.as_str())?,
                temple_type,
                location: Location {
                    latitude,
                    longitude,
                    address: LocalizedText::new(value.address_english, value.address_telugu),
                },
                timings: Timings {
                    morning: value.morning_timings.trim().to_string(),
                    evening: value.evening_timings.trim().to_string(),
                    puja_timings: split_lines(&value.puja_timings),
                },
                contact: Contact {
                    phone: non_empty(value.phone),
                    website: non_empty(value.website).map(WebsiteUrl::new).transpose()?,
                    email: non_empty(value.email).map(EmailAddress::new).transpose()?,
                },
                features: normalize_features(split_tags(&value.features)),
                images,
                is_open: value.is_open.is_some(),
                popularity: Popularity::new(value.popularity)?,
            },
        })
    }
}

/// Bulk open/close toggle from the admin temple list.
#[derive(Deserialize, Validate)]
pub struct BulkOpenForm {
    /// Comma separated temple ids.
    #[validate(length(min = 1))]
    pub temple_ids: String,
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkOpenFormPayload {
    pub temple_ids: Vec<TempleId>,
    pub is_open: bool,
}

#[derive(Debug, Error)]
pub enum BulkOpenFormError {
    #[error("Bulk update validation failed: {0}")]
    Validation(String),
    #[error("Bulk update contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for BulkOpenFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for BulkOpenFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<BulkOpenForm> for BulkOpenFormPayload {
    type Error = BulkOpenFormError;

    fn try_from(value: BulkOpenForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let temple_ids = split_tags(&value.temple_ids)
            .into_iter()
            .map(|raw| {
                raw.parse::<i32>()
                    .map_err(|_| TypeConstraintError::InvalidValue(format!("temple id: {raw}")))
                    .and_then(TempleId::new)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            temple_ids,
            is_open: value.is_open,
        })
    }
}
