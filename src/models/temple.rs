use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::temple::{
    Contact, Location, NewTemple as DomainNewTemple, Temple as DomainTemple, Timings,
    english_name_key,
};
use crate::domain::types::{
    DistrictName, EmailAddress, ImageUrl, Latitude, LocalizedText, Longitude, Popularity,
    RegionCode, TempleType, WebsiteUrl,
};
use crate::repository::errors::RepositoryError;

/// Diesel model representing the `temples` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::temples)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Temple {
    pub id: i32,
    pub name_en: String,
    /// See [`english_name_key`].
    pub name_en_key: String,
    pub name_te: String,
    pub deity_en: String,
    pub deity_te: String,
    pub description_en: String,
    pub description_te: String,
    pub history_en: String,
    pub history_te: String,
    pub district: String,
    pub state: String,
    pub temple_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address_en: String,
    pub address_te: String,
    pub morning_timings: String,
    pub evening_timings: String,
    /// JSON array of strings.
    pub puja_timings: String,
    pub contact_phone: Option<String>,
    pub contact_website: Option<String>,
    pub contact_email: Option<String>,
    /// JSON array of strings.
    pub features: String,
    /// JSON array of image URLs.
    pub images: String,
    pub image_url: Option<String>,
    pub is_open: bool,
    pub popularity: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`Temple`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::temples)]
#[diesel(treat_none_as_null = true)]
pub struct NewTemple {
    pub name_en: String,
    pub name_en_key: String,
    pub name_te: String,
    pub deity_en: String,
    pub deity_te: String,
    pub description_en: String,
    pub description_te: String,
    pub history_en: String,
    pub history_te: String,
    pub district: String,
    pub state: String,
    pub temple_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address_en: String,
    pub address_te: String,
    pub morning_timings: String,
    pub evening_timings: String,
    pub puja_timings: String,
    pub contact_phone: Option<String>,
    pub contact_website: Option<String>,
    pub contact_email: Option<String>,
    pub features: String,
    pub images: String,
    pub image_url: Option<String>,
    pub is_open: bool,
    pub popularity: i32,
}

impl TryFrom<Temple> for DomainTemple {
    type Error = RepositoryError;

    fn try_from(temple: Temple) -> Result<Self, Self::Error> {
        let images: Vec<String> = serde_json::from_str(&temple.images)?;

        Ok(Self {
            id: temple.id.try_into()?,
            name: LocalizedText::new(temple.name_en, temple.name_te),
            deity: LocalizedText::new(temple.deity_en, temple.deity_te),
            description: LocalizedText::new(temple.description_en, temple.description_te),
            history: LocalizedText::new(temple.history_en, temple.history_te),
            district: DistrictName::new(temple.district)?,
            state: RegionCode::try_from(temple.state)?,
            temple_type: TempleType::try_from(temple.temple_type)?,
            location: Location {
                latitude: Latitude::new(temple.latitude)?,
                longitude: Longitude::new(temple.longitude)?,
                address: LocalizedText::new(temple.address_en, temple.address_te),
            },
            timings: Timings {
                morning: temple.morning_timings,
                evening: temple.evening_timings,
                puja_timings: serde_json::from_str(&temple.puja_timings)?,
            },
            festivals: Vec::new(),
            contact: Contact {
                phone: temple.contact_phone,
                website: temple.contact_website.map(WebsiteUrl::new).transpose()?,
                email: temple.contact_email.map(EmailAddress::new).transpose()?,
            },
            features: serde_json::from_str(&temple.features)?,
            images: images
                .into_iter()
                .map(ImageUrl::new)
                .collect::<Result<_, _>>()?,
            is_open: temple.is_open,
            popularity: Popularity::new(temple.popularity)?,
            created_at: temple.created_at,
            updated_at: temple.updated_at,
        })
    }
}

impl TryFrom<&DomainNewTemple> for NewTemple {
    type Error = RepositoryError;

    fn try_from(temple: &DomainNewTemple) -> Result<Self, Self::Error> {
        let images = temple
            .images
            .iter()
            .map(ImageUrl::as_str)
            .collect::<Vec<_>>();

        Ok(Self {
            name_en: temple.name.english.clone(),
            name_en_key: english_name_key(&temple.name.english),
            name_te: temple.name.telugu.clone(),
            deity_en: temple.deity.english.clone(),
            deity_te: temple.deity.telugu.clone(),
            description_en: temple.description.english.clone(),
            description_te: temple.description.telugu.clone(),
            history_en: temple.history.english.clone(),
            history_te: temple.history.telugu.clone(),
            district: temple.district.as_str().to_string(),
            state: temple.state.as_str().to_string(),
            temple_type: temple.temple_type.as_str().to_string(),
            latitude: temple.location.latitude.get(),
            longitude: temple.location.longitude.get(),
            address_en: temple.location.address.english.clone(),
            address_te: temple.location.address.telugu.clone(),
            morning_timings: temple.timings.morning.clone(),
            evening_timings: temple.timings.evening.clone(),
            puja_timings: serde_json::to_string(&temple.timings.puja_timings)?,
            contact_phone: temple.contact.phone.clone(),
            contact_website: temple
                .contact
                .website
                .as_ref()
                .map(|w| w.as_str().to_string()),
            contact_email: temple
                .contact
                .email
                .as_ref()
                .map(|e| e.as_str().to_string()),
            features: serde_json::to_string(&temple.features)?,
            images: serde_json::to_string(&images)?,
            image_url: images.first().map(|url| url.to_string()),
            is_open: temple.is_open,
            popularity: temple.popularity.get(),
        })
    }
}
