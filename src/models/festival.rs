use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::festival::{Festival as DomainFestival, NewFestival as DomainNewFestival};
use crate::domain::types::{LocalizedText, TypeConstraintError};
use crate::models::temple::Temple;

/// Diesel model representing the `festivals` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Temple))]
#[diesel(table_name = crate::schema::festivals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Festival {
    pub id: i32,
    pub temple_id: i32,
    pub name_en: String,
    pub name_te: String,
    pub description_en: String,
    pub description_te: String,
    pub date: NaiveDate,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::festivals)]
pub struct NewFestival {
    pub temple_id: i32,
    pub name_en: String,
    pub name_te: String,
    pub description_en: String,
    pub description_te: String,
    pub date: NaiveDate,
    pub is_active: bool,
}

impl TryFrom<Festival> for DomainFestival {
    type Error = TypeConstraintError;

    fn try_from(festival: Festival) -> Result<Self, Self::Error> {
        Ok(Self {
            id: festival.id.try_into()?,
            temple_id: festival.temple_id.try_into()?,
            name: LocalizedText::new(festival.name_en, festival.name_te),
            description: LocalizedText::new(festival.description_en, festival.description_te),
            date: festival.date,
            is_active: festival.is_active,
        })
    }
}

impl From<DomainNewFestival> for NewFestival {
    fn from(festival: DomainNewFestival) -> Self {
        Self {
            temple_id: festival.temple_id.get(),
            name_en: festival.name.english,
            name_te: festival.name.telugu,
            description_en: festival.description.english,
            description_te: festival.description.telugu,
            date: festival.date,
            is_active: festival.is_active,
        }
    }
}
