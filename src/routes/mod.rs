use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::ErrorUnauthorized;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;

pub mod admin;
pub mod api;
pub mod main;
pub mod submissions;

/// Reads the user the auth service stored in the session identity.
///
/// The identity id is the JSON-serialized [`AuthenticatedUser`]. Missing,
/// malformed or expired identities are rejected with `401`.
impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(user_from_request(req))
    }
}

fn user_from_request(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let identity = req
        .get_identity()
        .map_err(|_| ErrorUnauthorized("not signed in"))?;
    let id = identity
        .id()
        .map_err(|_| ErrorUnauthorized("not signed in"))?;
    let user: AuthenticatedUser =
        serde_json::from_str(&id).map_err(|_| ErrorUnauthorized("invalid identity"))?;

    if user.is_expired(chrono::Utc::now().timestamp()) {
        identity.logout();
        return Err(ErrorUnauthorized("session expired"));
    }
    Ok(user)
}

pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("Failed to render template '{template}': {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: Option<&AuthenticatedUser>,
    current_page: &str,
    home_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &user);
    context.insert(
        "is_admin",
        &user.is_some_and(|u| u.has_role(crate::SERVICE_ADMIN_ROLE)),
    );
    context.insert("current_page", current_page);
    context.insert("home_url", home_url);
    context
}
