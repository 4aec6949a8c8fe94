//! Public catalog views. None of these require a signed-in user.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::featured::select_featured;
use crate::domain::festival::{UpcomingFestival, upcoming_festivals};
use crate::domain::search::{GeoPoint, TempleFilter, sort_by_distance, suggestions};
use crate::domain::temple::Temple;
use crate::domain::types::{Language, TempleId, TempleType};
use crate::repository::{TempleListQuery, TempleReader};
use crate::services::{ServiceError, ServiceResult};

fn load_catalog<R>(query: TempleListQuery, repo: &R) -> ServiceResult<Vec<Temple>>
where
    R: TempleReader,
{
    match repo.list_temples(query) {
        Ok((_total, temples)) => Ok(temples),
        Err(e) => {
            log::error!("Failed to load temple catalog: {e}");
            Err(ServiceError::Internal)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub featured: Vec<Temple>,
    pub upcoming_festivals: Vec<UpcomingFestival>,
    pub total_temples: usize,
}

/// Today's featured temples and the next few festivals.
pub fn show_home<R>(
    today: NaiveDate,
    featured_count: usize,
    upcoming_limit: usize,
    repo: &R,
) -> ServiceResult<HomeView>
where
    R: TempleReader,
{
    // Creation order decides ties between equal featured hashes.
    let catalog = load_catalog(TempleListQuery::default().oldest_first(), repo)?;

    let featured = select_featured(&catalog, today, featured_count)
        .into_iter()
        .cloned()
        .collect();

    Ok(HomeView {
        featured,
        upcoming_festivals: upcoming_festivals(&catalog, today, upcoming_limit),
        total_temples: catalog.len(),
    })
}

pub fn search_temples<R>(filter: &TempleFilter, repo: &R) -> ServiceResult<Vec<Temple>>
where
    R: TempleReader,
{
    let catalog = load_catalog(TempleListQuery::default(), repo)?;
    Ok(filter.apply(&catalog).into_iter().cloned().collect())
}

pub fn search_suggestions<R>(
    query: &str,
    language: Language,
    repo: &R,
) -> ServiceResult<Vec<String>>
where
    R: TempleReader,
{
    let catalog = load_catalog(TempleListQuery::default(), repo)?;
    Ok(suggestions(&catalog, query, language))
}

pub fn temples_by_type<R>(temple_type: TempleType, repo: &R) -> ServiceResult<Vec<Temple>>
where
    R: TempleReader,
{
    match repo.list_temples(TempleListQuery::default().temple_type(temple_type)) {
        Ok((_total, temples)) => Ok(temples),
        Err(e) => {
            log::error!("Failed to list {temple_type} temples: {e}");
            Err(ServiceError::Internal)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyTemple {
    pub temple: Temple,
    pub distance_km: Option<f64>,
}

/// Temples ordered by distance from `origin`, nearest first.
pub fn temples_near<R>(
    origin: GeoPoint,
    limit: Option<usize>,
    repo: &R,
) -> ServiceResult<Vec<NearbyTemple>>
where
    R: TempleReader,
{
    let catalog = load_catalog(TempleListQuery::default(), repo)?;
    Ok(sort_by_distance(&catalog, origin)
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|ranked| NearbyTemple {
            temple: ranked.temple.clone(),
            distance_km: ranked.distance_km,
        })
        .collect())
}

pub fn show_temple<R>(id: TempleId, repo: &R) -> ServiceResult<Temple>
where
    R: TempleReader,
{
    match repo.get_temple_by_id(id) {
        Ok(Some(temple)) => Ok(temple),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get temple {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CatalogStats {
    pub total_temples: usize,
    pub open_temples: usize,
    pub total_festivals: usize,
    pub upcoming_festivals: usize,
    pub by_type: BTreeMap<&'static str, usize>,
}

pub fn catalog_stats<R>(today: NaiveDate, repo: &R) -> ServiceResult<CatalogStats>
where
    R: TempleReader,
{
    let catalog = load_catalog(TempleListQuery::default(), repo)?;

    let mut stats = CatalogStats {
        total_temples: catalog.len(),
        by_type: TempleType::ALL.iter().map(|t| (t.as_str(), 0)).collect(),
        ..Default::default()
    };

    for temple in &catalog {
        if temple.is_open {
            stats.open_temples += 1;
        }
        stats.total_festivals += temple.festivals.len();
        stats.upcoming_festivals += temple
            .festivals
            .iter()
            .filter(|f| f.is_active && f.date >= today)
            .count();
        *stats.by_type.entry(temple.temple_type.as_str()).or_default() += 1;
    }

    Ok(stats)
}
