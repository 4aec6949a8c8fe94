use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Local;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::search::TempleFilter;
use crate::domain::types::{RegionCode, TempleId, TempleType};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::api::{NearbyQueryParams, SearchQueryParams};
use crate::services::temples::{
    search_temples as search_temples_service, show_home as show_home_service,
    show_temple as show_temple_service, temples_by_type as temples_by_type_service,
    temples_near as temples_near_service,
};

/// Home page: today's featured temples and upcoming festivals.
#[get("/")]
pub async fn index(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let today = Local::now().date_naive();
    match show_home_service(
        today,
        server_config.featured_count,
        server_config.upcoming_festivals,
        repo.get_ref(),
    ) {
        Ok(home) => {
            let mut context = base_context(
                &flash_messages,
                user.as_ref(),
                "index",
                &server_config.auth_service_url,
            );
            context.insert("home", &home);
            context.insert("today", &today);
            render_template(&tera, "main/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to render home page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/search")]
pub async fn search(
    params: web::Query<SearchQueryParams>,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let filter: TempleFilter = match params.into_inner().try_into() {
        Ok(filter) => filter,
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            return redirect("/search");
        }
        Err(err) => {
            log::error!("Failed to build search filter: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match search_temples_service(&filter, repo.get_ref()) {
        Ok(temples) => {
            let mut context = base_context(
                &flash_messages,
                user.as_ref(),
                "search",
                &server_config.auth_service_url,
            );
            context.insert("temples", &temples);
            context.insert("filter", &filter);
            context.insert(
                "states",
                &RegionCode::ALL.map(|s| (s.as_str(), s.display_name())),
            );
            context.insert("temple_types", &TempleType::ALL);
            render_template(&tera, "temples/search.html", &context)
        }
        Err(err) => {
            log::error!("Failed to search temples: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/temples/{temple_id}")]
pub async fn show_temple(
    temple_id: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(temple_id) = TempleId::new(temple_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match show_temple_service(temple_id, repo.get_ref()) {
        Ok(temple) => {
            let mut context = base_context(
                &flash_messages,
                user.as_ref(),
                "temple",
                &server_config.auth_service_url,
            );
            context.insert("temple", &temple);
            render_template(&tera, "temples/show.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Temple not found.").send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to render temple {temple_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/types/{temple_type}")]
pub async fn temples_by_type(
    temple_type: web::Path<String>,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(temple_type) = TempleType::try_from(temple_type.as_str()) else {
        return HttpResponse::NotFound().finish();
    };

    match temples_by_type_service(temple_type, repo.get_ref()) {
        Ok(temples) => {
            let mut context = base_context(
                &flash_messages,
                user.as_ref(),
                "types",
                &server_config.auth_service_url,
            );
            context.insert("temples", &temples);
            context.insert("temple_type", &temple_type);
            context.insert("temple_types", &TempleType::ALL);
            render_template(&tera, "temples/type.html", &context)
        }
        Err(err) => {
            log::error!("Failed to list {temple_type} temples: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Temples nearest to the visitor. Without coordinates only the location
/// prompt is shown.
#[get("/nearby")]
pub async fn nearby(
    params: Option<web::Query<NearbyQueryParams>>,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(
        &flash_messages,
        user.as_ref(),
        "nearby",
        &server_config.auth_service_url,
    );

    if let Some(params) = params {
        let origin = match params.origin() {
            Ok(origin) => origin,
            Err(ServiceError::Form(message)) => {
                FlashMessage::error(message).send();
                return redirect("/nearby");
            }
            Err(err) => {
                log::error!("Invalid nearby origin: {err}");
                return HttpResponse::InternalServerError().finish();
            }
        };

        match temples_near_service(origin, params.limit, repo.get_ref()) {
            Ok(temples) => {
                context.insert("origin", &origin);
                context.insert("nearby", &temples);
            }
            Err(err) => {
                log::error!("Failed to order temples by distance: {err}");
                return HttpResponse::InternalServerError().finish();
            }
        }
    }

    render_template(&tera, "temples/nearby.html", &context)
}
