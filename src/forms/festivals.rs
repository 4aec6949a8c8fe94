use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::festival::NewFestival;
use crate::domain::types::{LocalizedText, TempleId, TypeConstraintError};

#[derive(Deserialize, Validate)]
pub struct FestivalForm {
    #[validate(range(min = 1))]
    pub temple_id: i32,
    #[validate(length(min = 1, max = 200))]
    pub name_english: String,
    #[serde(default)]
    pub name_telugu: String,
    #[serde(default)]
    pub description_english: String,
    #[serde(default)]
    pub description_telugu: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Checkbox; present when checked.
    pub is_active: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FestivalFormPayload {
    pub festival: NewFestival,
}

#[derive(Debug, Error)]
pub enum FestivalFormError {
    #[error("Festival form validation failed: {0}")]
    Validation(String),
    #[error("Festival form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Festival date must be YYYY-MM-DD: {0}")]
    InvalidDate(String),
}

impl From<ValidationErrors> for FestivalFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for FestivalFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<FestivalForm> for FestivalFormPayload {
    type Error = FestivalFormError;

    fn try_from(value: FestivalForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let date = NaiveDate::parse_from_str(value.date.trim(), "%Y-%m-%d")
            .map_err(|_| FestivalFormError::InvalidDate(value.date.clone()))?;

        let name = LocalizedText::new(value.name_english, value.name_telugu);
        if name.english.is_empty() {
            return Err(TypeConstraintError::EmptyString("festival name").into());
        }

        Ok(Self {
            festival: NewFestival {
                temple_id: TempleId::new(value.temple_id)?,
                name,
                description: LocalizedText::new(
                    value.description_english,
                    value.description_telugu,
                ),
                date,
                is_active: value.is_active.is_some(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(date: &str) -> FestivalForm {
        FestivalForm {
            temple_id: 1,
            name_english: "Brahmotsavam".into(),
            name_telugu: "బ్రహ్మోత్సవం".into(),
            description_english: String::new(),
            description_telugu: String::new(),
            date: date.into(),
            is_active: Some("on".into()),
        }
    }

    #[test]
    fn parses_iso_dates() {
        let payload = FestivalFormPayload::try_from(form("2024-10-04")).unwrap();
        assert_eq!(
            payload.festival.date,
            NaiveDate::from_ymd_opt(2024, 10, 4).unwrap()
        );
        assert!(payload.festival.is_active);
    }

    #[test]
    fn rejects_other_date_formats() {
        assert!(matches!(
            FestivalFormPayload::try_from(form("04/10/2024")).unwrap_err(),
            FestivalFormError::InvalidDate(_)
        ));
    }
}
