use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::festival::Festival;
use crate::domain::types::{
    DistrictName, EmailAddress, ImageUrl, Latitude, LocalizedText, Longitude, Popularity,
    RegionCode, TempleId, TempleType, WebsiteUrl,
};

/// Geographic position with a bilingual postal address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: Latitude,
    pub longitude: Longitude,
    pub address: LocalizedText,
}

impl Location {
    /// Records seeded without coordinates are stored at `(0, 0)`.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.get() != 0.0 || self.longitude.get() != 0.0
    }
}

/// Darshan timings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timings {
    pub morning: String,
    pub evening: String,
    #[serde(default)]
    pub puja_timings: Vec<String>,
}

/// Optional contact channels.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub phone: Option<String>,
    pub website: Option<WebsiteUrl>,
    pub email: Option<EmailAddress>,
}

impl Contact {
    /// Builds a contact block from raw strings, dropping blank or malformed
    /// entries.
    pub fn from_raw(phone: Option<&str>, website: Option<&str>, email: Option<&str>) -> Self {
        Self {
            phone: phone
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            website: website.and_then(|w| WebsiteUrl::new(w).ok()),
            email: email.and_then(|e| EmailAddress::new(e).ok()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.website.is_none() && self.email.is_none()
    }
}

/// A published temple in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Temple {
    pub id: TempleId,
    pub name: LocalizedText,
    pub deity: LocalizedText,
    pub description: LocalizedText,
    pub history: LocalizedText,
    pub district: DistrictName,
    pub state: RegionCode,
    pub temple_type: TempleType,
    pub location: Location,
    pub timings: Timings,
    /// Festivals ordered by date.
    pub festivals: Vec<Festival>,
    pub contact: Contact,
    pub features: Vec<String>,
    pub images: Vec<ImageUrl>,
    pub is_open: bool,
    pub popularity: Popularity,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Temple {
    /// Cover image shown on cards.
    pub fn primary_image(&self) -> Option<&ImageUrl> {
        self.images.first()
    }

    /// Case-insensitive comparison on the canonical English name.
    pub fn has_english_name(&self, name: &str) -> bool {
        english_name_key(&self.name.english) == english_name_key(name)
    }
}

/// Lookup key for the English name: trimmed and lower-cased with full
/// Unicode case mapping, so `Śiva` and `ŚIVA` share a key.
pub fn english_name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Information required to publish a new [`Temple`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTemple {
    pub name: LocalizedText,
    pub deity: LocalizedText,
    pub description: LocalizedText,
    pub history: LocalizedText,
    pub district: DistrictName,
    pub state: RegionCode,
    pub temple_type: TempleType,
    pub location: Location,
    pub timings: Timings,
    pub contact: Contact,
    pub features: Vec<String>,
    pub images: Vec<ImageUrl>,
    pub is_open: bool,
    pub popularity: Popularity,
}

impl NewTemple {
    /// Minimal record with every optional field defaulted.
    pub fn new(name: LocalizedText, district: DistrictName, state: RegionCode) -> Self {
        Self {
            name,
            deity: LocalizedText::default(),
            description: LocalizedText::default(),
            history: LocalizedText::default(),
            district,
            state,
            temple_type: TempleType::default(),
            location: Location::default(),
            timings: Timings::default(),
            contact: Contact::default(),
            features: Vec::new(),
            images: Vec::new(),
            is_open: true,
            popularity: Popularity::default(),
        }
    }
}

impl From<Temple> for NewTemple {
    fn from(temple: Temple) -> Self {
        Self {
            name: temple.name,
            deity: temple.deity,
            description: temple.description,
            history: temple.history,
            district: temple.district,
            state: temple.state,
            temple_type: temple.temple_type,
            location: temple.location,
            timings: temple.timings,
            contact: temple.contact,
            features: temple.features,
            images: temple.images,
            is_open: temple.is_open,
            popularity: temple.popularity,
        }
    }
}

/// Trims tags, drops blanks and removes case-insensitive duplicates while
/// keeping first-seen order.
pub fn normalize_features<I, S>(features: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    features
        .into_iter()
        .filter_map(|feature| {
            let feature = feature.as_ref().trim();
            (!feature.is_empty() && seen.insert(feature.to_lowercase()))
                .then(|| feature.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_feature_tags() {
        let features = normalize_features(["Parking", " parking ", "", "Prasadam"]);
        assert_eq!(features, vec!["Parking", "Prasadam"]);
    }

    #[test]
    fn contact_drops_malformed_entries() {
        let contact = Contact::from_raw(Some(" "), Some("not a url"), Some("info@tirumala.org"));
        assert!(contact.phone.is_none());
        assert!(contact.website.is_none());
        assert_eq!(
            contact.email.as_ref().map(EmailAddress::as_str),
            Some("info@tirumala.org")
        );
    }

    #[test]
    fn default_location_has_no_coordinates() {
        assert!(!Location::default().has_coordinates());
    }
}
