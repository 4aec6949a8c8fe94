//! Catalog maintenance for directory moderators.

use chrono::NaiveDate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::festival::{Festival, next_occurrence};
use crate::domain::temple::{NewTemple, Temple};
use crate::domain::types::{FestivalId, TempleId};
use crate::forms::festivals::FestivalFormPayload;
use crate::forms::temples::{BulkOpenFormPayload, TempleFormPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    FestivalReader, FestivalWriter, TempleListQuery, TempleReader, TempleWriter,
};
use crate::services::{ServiceError, ServiceResult, require_admin};

/// Published temples, newest first, optionally filtered by English name.
pub fn show_temples<R>(
    search: Option<&str>,
    page: usize,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Paginated<Temple>>
where
    R: TempleReader,
{
    require_admin(user)?;

    let mut query = TempleListQuery::default()
        .newest_first()
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        query = query.search(search);
    }

    match repo.list_temples(query) {
        Ok((total, temples)) => Ok(Paginated::new(
            temples,
            page,
            total.div_ceil(DEFAULT_ITEMS_PER_PAGE),
        )),
        Err(e) => {
            log::error!("Failed to list temples: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// A single temple for the edit and festival pages.
pub fn get_temple<R>(id: TempleId, user: &AuthenticatedUser, repo: &R) -> ServiceResult<Temple>
where
    R: TempleReader,
{
    require_admin(user)?;

    match repo.get_temple_by_id(id) {
        Ok(Some(temple)) => Ok(temple),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get temple {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Fails with a form error when another temple already uses the name.
fn ensure_unique_name<R>(temple: &NewTemple, except: Option<TempleId>, repo: &R) -> ServiceResult<()>
where
    R: TempleReader,
{
    match repo.find_temple_by_english_name(&temple.name.english) {
        Ok(Some(existing)) if Some(existing.id) != except => Err(ServiceError::Form(format!(
            "A temple named \"{}\" already exists.",
            existing.name.english
        ))),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to check temple name: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn create_temple<R>(
    payload: TempleFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Temple>
where
    R: TempleReader + TempleWriter,
{
    require_admin(user)?;
    ensure_unique_name(&payload.temple, None, repo)?;

    match repo.create_temple(&payload.temple) {
        Ok(temple) => {
            log::info!("Temple {} created by {}", temple.id, user.sub);
            Ok(temple)
        }
        Err(e) => {
            log::error!("Failed to create temple: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn update_temple<R>(
    id: TempleId,
    payload: TempleFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<()>
where
    R: TempleReader + TempleWriter,
{
    require_admin(user)?;

    match repo.get_temple_by_id(id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get temple {id}: {e}");
            return Err(ServiceError::Internal);
        }
    }

    ensure_unique_name(&payload.temple, Some(id), repo)?;

    match repo.update_temple(id, &payload.temple) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to update temple {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Deletes a temple together with its festivals.
pub fn delete_temple<R>(id: TempleId, user: &AuthenticatedUser, repo: &R) -> ServiceResult<()>
where
    R: TempleWriter,
{
    require_admin(user)?;

    match repo.delete_temple(id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            log::info!("Temple {id} deleted by {}", user.sub);
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to delete temple {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Opens or closes several temples at once. Returns the number changed.
pub fn set_temples_open<R>(
    payload: BulkOpenFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<usize>
where
    R: TempleWriter,
{
    require_admin(user)?;

    repo.set_temples_open(&payload.temple_ids, payload.is_open)
        .map_err(|e| {
            log::error!("Failed to update open status: {e}");
            ServiceError::Internal
        })
}

/// Festivals of one temple, or of the whole catalog.
pub fn show_festivals<R>(
    temple_id: Option<TempleId>,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Vec<Festival>>
where
    R: FestivalReader,
{
    require_admin(user)?;

    repo.list_festivals(temple_id).map_err(|e| {
        log::error!("Failed to list festivals: {e}");
        ServiceError::Internal
    })
}

pub fn create_festival<R>(
    payload: FestivalFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Festival>
where
    R: TempleReader + FestivalWriter,
{
    require_admin(user)?;

    match repo.get_temple_by_id(payload.festival.temple_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get temple: {e}");
            return Err(ServiceError::Internal);
        }
    }

    repo.create_festival(&payload.festival).map_err(|e| {
        log::error!("Failed to create festival: {e}");
        ServiceError::Internal
    })
}

fn require_festival<R>(id: FestivalId, repo: &R) -> ServiceResult<Festival>
where
    R: FestivalReader,
{
    match repo.get_festival_by_id(id) {
        Ok(Some(festival)) => Ok(festival),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get festival {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn update_festival<R>(
    id: FestivalId,
    payload: FestivalFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<()>
where
    R: FestivalReader + FestivalWriter,
{
    require_admin(user)?;
    require_festival(id, repo)?;

    repo.update_festival(id, &payload.festival)
        .map(|_| ())
        .map_err(|e| {
            log::error!("Failed to update festival {id}: {e}");
            ServiceError::Internal
        })
}

pub fn delete_festival<R>(id: FestivalId, user: &AuthenticatedUser, repo: &R) -> ServiceResult<()>
where
    R: FestivalReader + FestivalWriter,
{
    require_admin(user)?;
    require_festival(id, repo)?;

    repo.delete_festival(id).map(|_| ()).map_err(|e| {
        log::error!("Failed to delete festival {id}: {e}");
        ServiceError::Internal
    })
}

/// Flips the festival's active flag, returning the new value.
pub fn toggle_festival<R>(id: FestivalId, user: &AuthenticatedUser, repo: &R) -> ServiceResult<bool>
where
    R: FestivalReader + FestivalWriter,
{
    require_admin(user)?;
    let festival = require_festival(id, repo)?;
    let is_active = !festival.is_active;

    repo.set_festival_active(id, is_active)
        .map(|_| is_active)
        .map_err(|e| {
            log::error!("Failed to toggle festival {id}: {e}");
            ServiceError::Internal
        })
}

/// Moves past festival dates to their next annual occurrence.
///
/// Returns the number of festivals whose date changed.
pub fn roll_festivals_forward<R>(
    today: NaiveDate,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<usize>
where
    R: FestivalReader + FestivalWriter,
{
    require_admin(user)?;

    let festivals = repo.list_festivals(None).map_err(|e| {
        log::error!("Failed to list festivals: {e}");
        ServiceError::Internal
    })?;

    let mut updated = 0;
    for festival in festivals {
        let next = next_occurrence(festival.date, today);
        if next == festival.date {
            continue;
        }
        match repo.set_festival_date(festival.id, next) {
            Ok(_) => updated += 1,
            Err(e) => {
                log::error!("Failed to move festival {}: {e}", festival.id);
                return Err(ServiceError::Internal);
            }
        }
    }

    log::info!("Rolled {updated} festival dates forward");
    Ok(updated)
}
