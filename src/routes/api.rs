//! JSON endpoints mounted under `/api/v1`.

use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::Local;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::search::TempleFilter;
use crate::domain::submission::SubmissionPayload;
use crate::domain::types::{Language, TempleId};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::api::{
    FeaturedQueryParams, NearbyQueryParams, SearchQueryParams, SuggestionsQueryParams,
    api_v1_featured as api_v1_featured_service, api_v1_submit as api_v1_submit_service,
};
use crate::services::temples::{
    catalog_stats as catalog_stats_service, search_suggestions as search_suggestions_service,
    search_temples as search_temples_service, show_temple as show_temple_service,
    temples_near as temples_near_service,
};

fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::NotFound => HttpResponse::NotFound().finish(),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
        }
        ServiceError::Conflict(message) => {
            HttpResponse::Conflict().json(serde_json::json!({ "error": message }))
        }
        ServiceError::Internal => HttpResponse::InternalServerError().finish(),
    }
}

#[get("/featured")]
pub async fn api_v1_featured(
    params: web::Query<FeaturedQueryParams>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let today = Local::now().date_naive();
    match api_v1_featured_service(
        params.into_inner(),
        today,
        server_config.featured_count,
        repo.get_ref(),
    ) {
        Ok(temples) => HttpResponse::Ok().json(temples),
        Err(err) => error_response(err),
    }
}

#[get("/search")]
pub async fn api_v1_search(
    params: web::Query<SearchQueryParams>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let filter: TempleFilter = match params.into_inner().try_into() {
        Ok(filter) => filter,
        Err(err) => return error_response(err),
    };

    match search_temples_service(&filter, repo.get_ref()) {
        Ok(temples) => HttpResponse::Ok().json(temples),
        Err(err) => error_response(err),
    }
}

#[get("/suggestions")]
pub async fn api_v1_suggestions(
    params: web::Query<SuggestionsQueryParams>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let language = params
        .lang
        .as_deref()
        .and_then(|l| Language::try_from(l).ok())
        .unwrap_or_default();

    match search_suggestions_service(&params.q, language, repo.get_ref()) {
        Ok(suggestions) => HttpResponse::Ok().json(suggestions),
        Err(err) => error_response(err),
    }
}

#[get("/nearby")]
pub async fn api_v1_nearby(
    params: web::Query<NearbyQueryParams>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let origin = match params.origin() {
        Ok(origin) => origin,
        Err(err) => return error_response(err),
    };

    match temples_near_service(origin, params.limit, repo.get_ref()) {
        Ok(temples) => HttpResponse::Ok().json(temples),
        Err(err) => error_response(err),
    }
}

#[get("/temples/{temple_id}")]
pub async fn api_v1_temple(
    temple_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(temple_id) = TempleId::new(temple_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match show_temple_service(temple_id, repo.get_ref()) {
        Ok(temple) => HttpResponse::Ok().json(temple),
        Err(err) => error_response(err),
    }
}

#[get("/stats")]
pub async fn api_v1_stats(repo: web::Data<DieselRepository>) -> impl Responder {
    let today = Local::now().date_naive();
    match catalog_stats_service(today, repo.get_ref()) {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(err) => error_response(err),
    }
}

#[post("/submissions")]
pub async fn api_v1_submit(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(payload): web::Json<SubmissionPayload>,
) -> impl Responder {
    match api_v1_submit_service(payload, &user, repo.get_ref()) {
        Ok(submission) => HttpResponse::Created().json(submission),
        Err(err) => error_response(err),
    }
}
