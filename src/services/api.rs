use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::featured::select_featured;
use crate::domain::name_rules::check_name;
use crate::domain::search::{GeoPoint, TempleFilter};
use crate::domain::submission::{NewSubmission, Submission, SubmissionPayload};
use crate::domain::temple::Temple;
use crate::domain::types::{Language, Latitude, Longitude, RegionCode, TempleType};
use crate::repository::{SubmissionWriter, TempleListQuery, TempleReader};

use super::{ServiceError, ServiceResult};

/// Largest `count` accepted by the featured endpoint.
pub const MAX_FEATURED_COUNT: usize = 20;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Query string shared by the search page and `/api/v1/search`.
///
/// Empty strings coming from unselected form controls mean "no filter".
#[derive(Deserialize, Debug, Default)]
pub struct SearchQueryParams {
    pub q: Option<String>,
    pub lang: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub deity: Option<String>,
    pub temple_type: Option<String>,
    pub open: Option<String>,
}

impl SearchQueryParams {
    pub fn language(&self) -> Language {
        self.lang
            .as_deref()
            .and_then(|l| Language::try_from(l).ok())
            .unwrap_or_default()
    }
}

impl TryFrom<SearchQueryParams> for TempleFilter {
    type Error = ServiceError;

    fn try_from(params: SearchQueryParams) -> Result<Self, Self::Error> {
        let language = params.language();

        let state = non_blank(params.state)
            .map(|s| RegionCode::try_from(s.as_str()))
            .transpose()
            .map_err(|e| ServiceError::Form(e.to_string()))?;
        let temple_type = non_blank(params.temple_type)
            .map(|t| TempleType::try_from(t.as_str()))
            .transpose()
            .map_err(|e| ServiceError::Form(e.to_string()))?;
        let is_open = match non_blank(params.open).as_deref() {
            None => None,
            Some("true" | "1" | "on") => Some(true),
            Some("false" | "0" | "off") => Some(false),
            Some(other) => return Err(ServiceError::Form(format!("invalid open filter: {other}"))),
        };

        Ok(TempleFilter {
            query: non_blank(params.q),
            language,
            state,
            district: non_blank(params.district),
            deity: non_blank(params.deity),
            temple_type,
            is_open,
        })
    }
}

#[derive(Deserialize, Debug)]
pub struct SuggestionsQueryParams {
    #[serde(default)]
    pub q: String,
    pub lang: Option<String>,
}

/// Query parameters accepted by the nearby endpoints.
#[derive(Deserialize, Debug)]
pub struct NearbyQueryParams {
    pub lat: f64,
    pub lng: f64,
    pub limit: Option<usize>,
}

impl NearbyQueryParams {
    /// The validated user location.
    pub fn origin(&self) -> ServiceResult<GeoPoint> {
        let latitude = Latitude::new(self.lat).map_err(|e| ServiceError::Form(e.to_string()))?;
        let longitude =
            Longitude::new(self.lng).map_err(|e| ServiceError::Form(e.to_string()))?;
        Ok(GeoPoint {
            latitude: latitude.get(),
            longitude: longitude.get(),
        })
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct FeaturedQueryParams {
    pub count: Option<usize>,
    /// Overrides today's date, `YYYY-MM-DD`.
    pub date: Option<NaiveDate>,
}

/// Featured temples for the requested (or current) day.
pub fn api_v1_featured<R>(
    params: FeaturedQueryParams,
    today: NaiveDate,
    default_count: usize,
    repo: &R,
) -> ServiceResult<Vec<Temple>>
where
    R: TempleReader,
{
    let count = params
        .count
        .unwrap_or(default_count)
        .min(MAX_FEATURED_COUNT);
    let day = params.date.unwrap_or(today);

    match repo.list_temples(TempleListQuery::default().oldest_first()) {
        Ok((_total, catalog)) => Ok(select_featured(&catalog, day, count)
            .into_iter()
            .cloned()
            .collect()),
        Err(e) => {
            log::error!("Failed to load featured temples: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Stores a JSON submission from a signed-in user.
///
/// The payload keeps its loose shape; only the fields needed to publish it
/// later are checked here.
pub fn api_v1_submit<R>(
    payload: SubmissionPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Submission>
where
    R: SubmissionWriter,
{
    let name = payload.english_name();
    if name.is_empty() {
        return Err(ServiceError::Form("name.english is required".into()));
    }
    check_name(name).map_err(|reason| ServiceError::Form(reason.to_string()))?;
    if payload.district().is_none() {
        return Err(ServiceError::Form("district is required".into()));
    }
    let state = payload
        .state()
        .ok_or_else(|| ServiceError::Form("state is required".into()))?;
    RegionCode::try_from(state).map_err(|e| ServiceError::Form(e.to_string()))?;

    let submission = NewSubmission {
        temple_data: payload,
        submitted_by: Some(user.sub.clone()),
    };

    repo.create_submission(&submission)
        .inspect(|s| log::info!("User {} submitted {} via API", user.sub, s.id))
        .map_err(|e| {
            log::error!("Failed to create submission: {e}");
            ServiceError::Internal
        })
}
