use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::temple::Temple;
use crate::domain::types::{FestivalId, LocalizedText, TempleId};

/// Number of upcoming festivals shown on the home view.
pub const DEFAULT_UPCOMING_FESTIVALS: usize = 3;

/// A dated celebration at a temple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Festival {
    pub id: FestivalId,
    pub temple_id: TempleId,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub date: NaiveDate,
    pub is_active: bool,
}

/// Data required to insert a new [`Festival`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewFestival {
    pub temple_id: TempleId,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub date: NaiveDate,
    pub is_active: bool,
}

/// A festival paired with the temple that hosts it.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingFestival {
    pub festival: Festival,
    pub temple_id: TempleId,
    pub temple_name: LocalizedText,
}

/// Active festivals dated today or later, soonest first.
pub fn upcoming_festivals(temples: &[Temple], today: NaiveDate, limit: usize) -> Vec<UpcomingFestival> {
    let mut upcoming = temples
        .iter()
        .flat_map(|temple| {
            temple
                .festivals
                .iter()
                .filter(|f| f.is_active && f.date >= today)
                .map(move |f| UpcomingFestival {
                    festival: f.clone(),
                    temple_id: temple.id,
                    temple_name: temple.name.clone(),
                })
        })
        .collect::<Vec<_>>();

    upcoming.sort_by_key(|u| u.festival.date);
    upcoming.truncate(limit);
    upcoming
}

/// Next occurrence of an annual festival on or after `today`.
///
/// Dates that have not passed yet are returned unchanged. Otherwise the month and day of `original` are moved to the current year, or to the
/// next year when that date has already passed. A 29 February festival in a
/// non-leap year falls on 1 March.
pub fn next_occurrence(original: NaiveDate, today: NaiveDate) -> NaiveDate {
    if original >= today {
        return original;
    }
    let this_year = anniversary_in(today.year(), original);
    match this_year {
        Some(date) if date >= today => date,
        _ => anniversary_in(today.year() + 1, original).unwrap_or(original),
    }
}

fn anniversary_in(year: i32, original: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, original.month(), original.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}
