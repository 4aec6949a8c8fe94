use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::temple::{Contact, Location, NewTemple, Timings, normalize_features};
use crate::domain::types::{
    DistrictName, ImageUrl, Latitude, LocalizedText, Longitude, Popularity, RegionCode,
    SubmissionId, SubmissionStatus, TempleType, TypeConstraintError,
};

/// Raw coordinates as sent by the submission form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PayloadLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PayloadTimings {
    pub morning: Option<String>,
    pub evening: Option<String>,
    pub puja_timings: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PayloadContact {
    pub phone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
}

/// Loosely-shaped temple data attached to a submission.
///
/// Every field is optional and unknown keys are ignored, so partially filled
/// forms still deserialize. Defaults are applied in
/// [`SubmissionPayload::into_new_temple`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub name: Option<LocalizedText>,
    pub deity: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub history: Option<LocalizedText>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub temple_type: Option<String>,
    pub address: Option<LocalizedText>,
    pub location: Option<PayloadLocation>,
    pub timings: Option<PayloadTimings>,
    pub contact: Option<PayloadContact>,
    pub features: Vec<String>,
    pub images: Vec<String>,
}

impl SubmissionPayload {
    /// Trimmed canonical name, empty when absent.
    pub fn english_name(&self) -> &str {
        self.name.as_ref().map_or("", |n| n.english.trim())
    }

    pub fn district(&self) -> Option<&str> {
        self.district
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Builds the insertable temple, applying publish defaults.
    ///
    /// Only the name, district and state are required. Out-of-range
    /// coordinates fall back to `0.0`, malformed URLs and emails are dropped,
    /// unknown temple types resolve to `Ancient`.
    pub fn into_new_temple(self) -> Result<NewTemple, TypeConstraintError> {
        let name = self.name.clone().unwrap_or_default();
        if name.english.trim().is_empty() {
            return Err(TypeConstraintError::EmptyString("name"));
        }
        let district = DistrictName::new(self.district.clone().unwrap_or_default())?;
        let state = RegionCode::try_from(self.state.as_deref().unwrap_or_default())?;

        let location = self.location.unwrap_or_default();
        let timings = self.timings.unwrap_or_default();
        let contact = self.contact.unwrap_or_default();

        Ok(NewTemple {
            name: LocalizedText::new(name.english, name.telugu),
            deity: self.deity.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            history: self.history.unwrap_or_default(),
            district,
            state,
            temple_type: self
                .temple_type
                .as_deref()
                .map(TempleType::parse_lenient)
                .unwrap_or_default(),
            location: Location {
                latitude: location
                    .latitude
                    .and_then(|v| Latitude::new(v).ok())
                    .unwrap_or_default(),
                longitude: location
                    .longitude
                    .and_then(|v| Longitude::new(v).ok())
                    .unwrap_or_default(),
                address: self.address.unwrap_or_default(),
            },
            timings: Timings {
                morning: timings.morning.unwrap_or_default(),
                evening: timings.evening.unwrap_or_default(),
                puja_timings: timings.puja_timings,
            },
            contact: Contact::from_raw(
                contact.phone.as_deref(),
                contact.website.as_deref(),
                contact.email.as_deref(),
            ),
            features: normalize_features(self.features),
            images: self
                .images
                .into_iter()
                .filter_map(|url| ImageUrl::new(url).ok())
                .collect(),
            is_open: true,
            popularity: Popularity::default(),
        })
    }
}

/// A user-proposed temple awaiting moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub temple_data: SubmissionPayload,
    pub status: SubmissionStatus,
    pub submitted_by: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Data required to store a new [`Submission`]. Always starts `pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubmission {
    pub temple_data: SubmissionPayload,
    pub submitted_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_payload_and_ignores_unknown_keys() {
        let payload: SubmissionPayload = serde_json::from_value(serde_json::json!({
            "name": { "english": "Sri Example Temple" },
            "district": "Hyderabad",
            "state": "TS",
            "templeType": "Hill/River",
            "timings": { "pujaTimings": ["Suprabhatam 5:30 AM"] },
            "rating": 4
        }))
        .unwrap();

        assert_eq!(payload.english_name(), "Sri Example Temple");
        assert_eq!(payload.temple_type.as_deref(), Some("Hill/River"));
        assert!(payload.deity.is_none());
    }

    #[test]
    fn applies_publish_defaults() {
        let payload = SubmissionPayload {
            name: Some(LocalizedText::english("Sri Example Temple")),
            district: Some(" Hyderabad ".into()),
            state: Some("TS".into()),
            location: Some(PayloadLocation {
                latitude: Some(120.0),
                longitude: Some(78.47),
            }),
            images: vec!["https://example.com/a.jpg".into(), "broken".into()],
            ..Default::default()
        };

        let temple = payload.into_new_temple().unwrap();
        assert!(temple.is_open);
        assert_eq!(temple.temple_type, TempleType::Ancient);
        assert_eq!(temple.popularity.get(), 0);
        assert_eq!(temple.district.as_str(), "Hyderabad");
        assert_eq!(temple.state, RegionCode::Telangana);
        assert_eq!(temple.location.latitude.get(), 0.0);
        assert_eq!(temple.location.longitude.get(), 78.47);
        assert_eq!(temple.images.len(), 1);
        assert!(temple.contact.is_empty());
        assert!(temple.features.is_empty());
    }

    #[test]
    fn requires_name_district_and_state() {
        let missing_state = SubmissionPayload {
            name: Some(LocalizedText::english("Sri Example Temple")),
            district: Some("Hyderabad".into()),
            ..Default::default()
        };
        assert_eq!(
            missing_state.into_new_temple().unwrap_err(),
            TypeConstraintError::EmptyString("state")
        );

        let blank_name = SubmissionPayload {
            name: Some(LocalizedText::english("   ")),
            ..Default::default()
        };
        assert_eq!(
            blank_name.into_new_temple().unwrap_err(),
            TypeConstraintError::EmptyString("name")
        );
    }
}
