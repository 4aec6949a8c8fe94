use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::{RegionCode, TempleType};
use crate::forms::submissions::{SubmitTempleForm, SubmitTempleFormPayload};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::submissions::{
    show_my_submissions as show_my_submissions_service, submit_temple as submit_temple_service,
};

#[derive(Deserialize)]
struct SubmissionsQueryParams {
    page: Option<usize>,
}

#[get("/submit")]
pub async fn new_submission(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(user) = user else {
        return redirect(&server_config.auth_service_url);
    };

    let mut context = base_context(
        &flash_messages,
        Some(&user),
        "submit",
        &server_config.auth_service_url,
    );
    context.insert(
        "states",
        &RegionCode::ALL.map(|s| (s.as_str(), s.display_name())),
    );
    context.insert("temple_types", &TempleType::ALL);
    render_template(&tera, "submissions/new.html", &context)
}

#[post("/submit")]
pub async fn submit_temple(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<SubmitTempleForm>,
) -> impl Responder {
    let payload: SubmitTempleFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect("/submit");
        }
    };

    match submit_temple_service(payload, &user, repo.get_ref()) {
        Ok(_) => {
            FlashMessage::success("Thank you! Your temple will appear once a moderator approves it.")
                .send();
            redirect("/submissions/mine")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/submit")
        }
        Err(err) => {
            log::error!("Failed to submit temple: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/submissions/mine")]
pub async fn my_submissions(
    params: web::Query<SubmissionsQueryParams>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let page = params.page.unwrap_or(1);
    match show_my_submissions_service(page, &user, repo.get_ref()) {
        Ok(submissions) => {
            let mut context = base_context(
                &flash_messages,
                Some(&user),
                "my_submissions",
                &server_config.auth_service_url,
            );
            context.insert("submissions", &submissions);
            render_template(&tera, "submissions/mine.html", &context)
        }
        Err(err) => {
            log::error!("Failed to list submissions of {}: {err}", user.sub);
            HttpResponse::InternalServerError().finish()
        }
    }
}
