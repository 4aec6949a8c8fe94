//! Catalog filtering, suggestions and distance ordering.

use serde::{Deserialize, Serialize};

use crate::domain::temple::Temple;
use crate::domain::types::{Language, RegionCode, TempleType};

/// Maximum number of suggestions returned for a query.
pub const MAX_SUGGESTIONS: usize = 5;
/// Queries shorter than this produce no suggestions.
pub const MIN_SUGGESTION_QUERY: usize = 2;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Combined free-text and exact filters for the search view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TempleFilter {
    pub query: Option<String>,
    #[serde(default)]
    pub language: Language,
    pub state: Option<RegionCode>,
    pub district: Option<String>,
    pub deity: Option<String>,
    pub temple_type: Option<TempleType>,
    pub is_open: Option<bool>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl TempleFilter {
    fn normalized_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    /// `true` when the temple passes every configured filter.
    pub fn matches(&self, temple: &Temple) -> bool {
        let lang = self.language;

        if let Some(query) = self.normalized_query() {
            let hit = contains_ci(temple.name.get(lang), &query)
                || contains_ci(temple.deity.get(lang), &query)
                || contains_ci(temple.district.as_str(), &query)
                || contains_ci(temple.state.as_str(), &query)
                || contains_ci(temple.description.get(lang), &query);
            if !hit {
                return false;
            }
        }

        if self.state.is_some_and(|state| temple.state != state) {
            return false;
        }
        if let Some(district) = self.district.as_deref().filter(|d| !d.is_empty())
            && temple.district.as_str() != district
        {
            return false;
        }
        if let Some(deity) = self.deity.as_deref().map(str::trim).filter(|d| !d.is_empty())
            && !contains_ci(temple.deity.get(lang), &deity.to_lowercase())
        {
            return false;
        }
        if self.temple_type.is_some_and(|t| temple.temple_type != t) {
            return false;
        }
        if self.is_open.is_some_and(|open| temple.is_open != open) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, temples: &'a [Temple]) -> Vec<&'a Temple> {
        temples.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Distinct names, deities, districts and state names containing `query`.
pub fn suggestions(temples: &[Temple], query: &str, language: Language) -> Vec<String> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_SUGGESTION_QUERY {
        return Vec::new();
    }

    let mut found: Vec<String> = Vec::new();
    let mut push = |value: &str| {
        if !value.is_empty() && !found.iter().any(|f| f == value) {
            found.push(value.to_string());
        }
    };

    for temple in temples {
        if contains_ci(temple.name.get(language), &query) {
            push(temple.name.get(language));
        }
        if contains_ci(temple.deity.get(language), &query) {
            push(temple.deity.get(language));
        }
        if contains_ci(temple.district.as_str(), &query) {
            push(temple.district.as_str());
        }
        if contains_ci(temple.state.as_str(), &query) {
            push(temple.state.display_name());
        }
    }

    found.truncate(MAX_SUGGESTIONS);
    found
}

/// A point supplied by the caller, e.g. the user's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Great-circle distance in kilometres, rounded to one decimal.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    (EARTH_RADIUS_KM * c * 10.0).round() / 10.0
}

/// A temple with its distance from the caller.
#[derive(Debug, Clone, Serialize)]
pub struct TempleDistance<'a> {
    pub temple: &'a Temple,
    pub distance_km: Option<f64>,
}

/// Orders temples nearest first. Records without coordinates go last.
pub fn sort_by_distance(temples: &[Temple], origin: GeoPoint) -> Vec<TempleDistance<'_>> {
    let mut ranked = temples
        .iter()
        .map(|temple| TempleDistance {
            temple,
            distance_km: temple.location.has_coordinates().then(|| {
                haversine_km(
                    origin,
                    GeoPoint {
                        latitude: temple.location.latitude.get(),
                        longitude: temple.location.longitude.get(),
                    },
                )
            }),
        })
        .collect::<Vec<_>>();

    ranked.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    ranked
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::temple::{Contact, Location, Timings};
    use crate::domain::types::{DistrictName, Latitude, LocalizedText, Longitude, Popularity, TempleId};
    use chrono::DateTime;

    pub(crate) fn temple(id: i32, name: &str, deity: &str, district: &str, state: RegionCode) -> Temple {
        let ts = DateTime::from_timestamp(1_700_000_000 + i64::from(id), 0)
            .unwrap()
            .naive_utc();
        Temple {
            id: TempleId::new(id).unwrap(),
            name: LocalizedText::new(name, ""),
            deity: LocalizedText::new(deity, ""),
            description: LocalizedText::default(),
            history: LocalizedText::default(),
            district: DistrictName::new(district).unwrap(),
            state,
            temple_type: TempleType::Ancient,
            location: Location::default(),
            timings: Timings::default(),
            festivals: Vec::new(),
            contact: Contact::default(),
            features: Vec::new(),
            images: Vec::new(),
            is_open: true,
            popularity: Popularity::default(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn catalog() -> Vec<Temple> {
        let mut hill = temple(
            2,
            "Srisailam Mallikarjuna Temple",
            "Lord Shiva",
            "Kurnool",
            RegionCode::AndhraPradesh,
        );
        hill.temple_type = TempleType::Hill;
        hill.is_open = false;
        vec![
            temple(
                1,
                "Chilkur Balaji Temple",
                "Lord Venkateswara",
                "Hyderabad",
                RegionCode::Telangana,
            ),
            hill,
            temple(
                3,
                "Birla Mandir",
                "Lord Venkateswara",
                "Hyderabad",
                RegionCode::Telangana,
            ),
        ]
    }

    fn ids(found: &[&Temple]) -> Vec<i32> {
        found.iter().map(|t| t.id.get()).collect()
    }

    #[test]
    fn free_text_matches_several_fields() {
        let catalog = catalog();
        let by_deity = TempleFilter {
            query: Some("venkat".into()),
            ..Default::default()
        };
        assert_eq!(ids(&by_deity.apply(&catalog)), vec![1, 3]);

        let by_state = TempleFilter {
            query: Some("ap".into()),
            ..Default::default()
        };
        assert_eq!(ids(&by_state.apply(&catalog)), vec![2]);
    }

    #[test]
    fn exact_filters_combine() {
        let catalog = catalog();
        let filter = TempleFilter {
            state: Some(RegionCode::Telangana),
            district: Some("Hyderabad".into()),
            query: Some("birla".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&catalog)), vec![3]);

        let closed_hills = TempleFilter {
            temple_type: Some(TempleType::Hill),
            is_open: Some(false),
            ..Default::default()
        };
        assert_eq!(ids(&closed_hills.apply(&catalog)), vec![2]);
    }

    #[test]
    fn suggestions_are_distinct_and_capped() {
        let mut catalog = catalog();
        for id in 10..20 {
            catalog.push(temple(
                id,
                &format!("Temple of Hyderabad {id}"),
                "Lord Hanuman",
                "Hyderabad",
                RegionCode::Telangana,
            ));
        }
        let found = suggestions(&catalog, "hyder", Language::English);
        assert_eq!(found.len(), MAX_SUGGESTIONS);
        assert_eq!(found[0], "Hyderabad");
        assert!(suggestions(&catalog, "h", Language::English).is_empty());
    }

    #[test]
    fn suggests_state_display_names() {
        let found = suggestions(&catalog(), "ts", Language::English);
        assert!(found.contains(&"Telangana".to_string()));
    }

    #[test]
    fn haversine_rounds_to_one_decimal() {
        let hyderabad = GeoPoint {
            latitude: 17.385,
            longitude: 78.4867,
        };
        let vijayawada = GeoPoint {
            latitude: 16.5062,
            longitude: 80.648,
        };
        let km = haversine_km(hyderabad, vijayawada);
        assert!((245.0..255.0).contains(&km), "got {km}");
        assert_eq!(km, (km * 10.0).round() / 10.0);
        assert_eq!(haversine_km(hyderabad, hyderabad), 0.0);
    }

    #[test]
    fn sorts_nearest_first_with_unknown_coordinates_last() {
        let mut catalog = catalog();
        catalog[0].location = Location {
            latitude: Latitude::new(17.33).unwrap(),
            longitude: Longitude::new(78.30).unwrap(),
            address: LocalizedText::default(),
        };
        catalog[1].location = Location {
            latitude: Latitude::new(16.07).unwrap(),
            longitude: Longitude::new(78.86).unwrap(),
            address: LocalizedText::default(),
        };
        let origin = GeoPoint {
            latitude: 16.2,
            longitude: 78.8,
        };
        let ranked = sort_by_distance(&catalog, origin);
        let order = ranked.iter().map(|r| r.temple.id.get()).collect::<Vec<_>>();
        assert_eq!(order, vec![2, 1, 3]);
        assert!(ranked[2].distance_km.is_none());
    }
}
