//! Moderator console: submission review, catalog and festival maintenance.

use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Local;
use serde::Deserialize;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::{FestivalId, RegionCode, SubmissionId, SubmissionStatus, TempleId, TempleType};
use crate::forms::festivals::{FestivalForm, FestivalFormPayload};
use crate::forms::import_export::UploadTemplesForm;
use crate::forms::temples::{BulkOpenForm, BulkOpenFormPayload, TempleForm, TempleFormPayload};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::admin::{
    create_festival as create_festival_service, create_temple as create_temple_service,
    delete_festival as delete_festival_service, delete_temple as delete_temple_service,
    get_temple as get_temple_service, roll_festivals_forward as roll_festivals_forward_service,
    set_temples_open as set_temples_open_service, show_festivals as show_festivals_service,
    show_temples as show_temples_service, toggle_festival as toggle_festival_service,
    update_festival as update_festival_service, update_temple as update_temple_service,
};
use crate::services::import_export::{
    download_temples as download_temples_service, upload_temples as upload_temples_service,
};
use crate::services::moderation::{
    ModerationError, approve_submission as approve_submission_service,
    reject_submission as reject_submission_service,
    show_submissions as show_submissions_service,
};

#[derive(Deserialize)]
struct SubmissionsQueryParams {
    status: Option<String>,
    page: Option<usize>,
}

#[derive(Deserialize)]
struct TemplesQueryParams {
    search: Option<String>,
    page: Option<usize>,
}

#[derive(Deserialize)]
struct DownloadQueryParams {
    format: String,
}

fn not_moderator() -> HttpResponse {
    FlashMessage::error("Moderator access is required.").send();
    redirect("/")
}

fn form_context_lists(context: &mut tera::Context) {
    context.insert(
        "states",
        &RegionCode::ALL.map(|s| (s.as_str(), s.display_name())),
    );
    context.insert("temple_types", &TempleType::ALL);
}

#[get("/admin/submissions")]
pub async fn show_submissions(
    params: web::Query<SubmissionsQueryParams>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let status = match params.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
        None => None,
        Some(raw) => match SubmissionStatus::try_from(raw) {
            Ok(status) => Some(status),
            Err(e) => {
                FlashMessage::error(e.to_string()).send();
                return redirect("/admin/submissions");
            }
        },
    };
    let page = params.page.unwrap_or(1);

    match show_submissions_service(status, page, &user, repo.get_ref()) {
        Ok(queue) => {
            let mut context = base_context(
                &flash_messages,
                Some(&user),
                "admin_submissions",
                &server_config.auth_service_url,
            );
            context.insert("queue", &queue);
            context.insert("statuses", &SubmissionStatus::ALL);
            render_template(&tera, "admin/submissions.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_moderator(),
        Err(err) => {
            log::error!("Failed to render moderation queue: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn moderation_flash(err: ModerationError) -> Option<HttpResponse> {
    match err {
        ModerationError::Unauthorized => Some(not_moderator()),
        ModerationError::Internal => Some(HttpResponse::InternalServerError().finish()),
        err if err.is_retryable() => {
            FlashMessage::error(format!("{err}. Please try again.")).send();
            None
        }
        err => {
            FlashMessage::error(err.to_string()).send();
            None
        }
    }
}

#[post("/admin/submissions/{submission_id}/approve")]
pub async fn approve_submission(
    submission_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(submission_id) = SubmissionId::new(submission_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match approve_submission_service(submission_id, &user, repo.get_ref()) {
        Ok(temple) => FlashMessage::success(format!(
            "Approved. \"{}\" is now published.",
            temple.name.english
        ))
        .send(),
        Err(err) => {
            if let Some(response) = moderation_flash(err) {
                return response;
            }
        }
    }

    redirect("/admin/submissions")
}

#[post("/admin/submissions/{submission_id}/reject")]
pub async fn reject_submission(
    submission_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(submission_id) = SubmissionId::new(submission_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match reject_submission_service(submission_id, &user, repo.get_ref()) {
        Ok(()) => FlashMessage::success("Submission rejected.").send(),
        Err(err) => {
            if let Some(response) = moderation_flash(err) {
                return response;
            }
        }
    }

    redirect("/admin/submissions")
}

#[get("/admin/temples")]
pub async fn show_temples(
    params: web::Query<TemplesQueryParams>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let page = params.page.unwrap_or(1);
    match show_temples_service(params.search.as_deref(), page, &user, repo.get_ref()) {
        Ok(temples) => {
            let mut context = base_context(
                &flash_messages,
                Some(&user),
                "admin_temples",
                &server_config.auth_service_url,
            );
            context.insert("temples", &temples);
            context.insert("search", &params.search);
            render_template(&tera, "admin/temples.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_moderator(),
        Err(err) => {
            log::error!("Failed to render admin temples: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/admin/temples/new")]
pub async fn new_temple(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    if !user.has_role(crate::SERVICE_ADMIN_ROLE) {
        return not_moderator();
    }

    let mut context = base_context(
        &flash_messages,
        Some(&user),
        "admin_temples",
        &server_config.auth_service_url,
    );
    form_context_lists(&mut context);
    render_template(&tera, "admin/temple_form.html", &context)
}

#[post("/admin/temples")]
pub async fn create_temple(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TempleForm>,
) -> impl Responder {
    let payload: TempleFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect("/admin/temples/new");
        }
    };

    match create_temple_service(payload, &user, repo.get_ref()) {
        Ok(temple) => {
            FlashMessage::success("Temple created.").send();
            redirect(&format!("/admin/temples/{}/edit", temple.id))
        }
        Err(ServiceError::Unauthorized) => not_moderator(),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/admin/temples/new")
        }
        Err(err) => {
            log::error!("Failed to create temple: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/admin/temples/{temple_id}/edit")]
pub async fn edit_temple(
    temple_id: web::Path<i32>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(temple_id) = TempleId::new(temple_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match get_temple_service(temple_id, &user, repo.get_ref()) {
        Ok(temple) => {
            let mut context = base_context(
                &flash_messages,
                Some(&user),
                "admin_temples",
                &server_config.auth_service_url,
            );
            context.insert("temple", &temple);
            form_context_lists(&mut context);
            render_template(&tera, "admin/temple_form.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_moderator(),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Temple not found.").send();
            redirect("/admin/temples")
        }
        Err(err) => {
            log::error!("Failed to load temple {temple_id} for editing: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/admin/temples/{temple_id}/update")]
pub async fn update_temple(
    temple_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TempleForm>,
) -> impl Responder {
    let Ok(temple_id) = TempleId::new(temple_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };
    let edit_url = format!("/admin/temples/{temple_id}/edit");

    let payload: TempleFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(&edit_url);
        }
    };

    match update_temple_service(temple_id, payload, &user, repo.get_ref()) {
        Ok(()) => FlashMessage::success("Temple updated.").send(),
        Err(ServiceError::Unauthorized) => return not_moderator(),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Temple not found.").send();
            return redirect("/admin/temples");
        }
        Err(ServiceError::Form(message)) => FlashMessage::error(message).send(),
        Err(err) => {
            log::error!("Failed to update temple {temple_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect(&edit_url)
}

#[post("/admin/temples/{temple_id}/delete")]
pub async fn delete_temple(
    temple_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(temple_id) = TempleId::new(temple_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match delete_temple_service(temple_id, &user, repo.get_ref()) {
        Ok(()) => FlashMessage::success("Temple deleted.").send(),
        Err(ServiceError::Unauthorized) => return not_moderator(),
        Err(ServiceError::NotFound) => FlashMessage::error("Temple not found.").send(),
        Err(err) => {
            log::error!("Failed to delete temple {temple_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect("/admin/temples")
}

#[post("/admin/temples/open")]
pub async fn set_temples_open(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<BulkOpenForm>,
) -> impl Responder {
    let payload: BulkOpenFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect("/admin/temples");
        }
    };

    match set_temples_open_service(payload, &user, repo.get_ref()) {
        Ok(changed) => FlashMessage::success(format!("{changed} temples updated.")).send(),
        Err(ServiceError::Unauthorized) => return not_moderator(),
        Err(err) => {
            log::error!("Failed to update open status: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect("/admin/temples")
}

#[post("/admin/temples/upload")]
pub async fn upload_temples(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    MultipartForm(mut form): MultipartForm<UploadTemplesForm>,
) -> impl Responder {
    match upload_temples_service(&mut form, &user, repo.get_ref()) {
        Ok(report) => {
            if report.errors.is_empty() {
                FlashMessage::success(format!(
                    "Import finished: {} temples created.",
                    report.created
                ))
                .send();
                return redirect("/admin/temples");
            }

            let temples = match show_temples_service(None, 1, &user, repo.get_ref()) {
                Ok(temples) => temples,
                Err(ServiceError::Unauthorized) => return not_moderator(),
                Err(_) => return HttpResponse::InternalServerError().finish(),
            };

            let mut context = base_context(
                &flash_messages,
                Some(&user),
                "admin_temples",
                &server_config.auth_service_url,
            );
            context.insert("temples", &temples);
            context.insert("search", &None::<String>);
            context.insert("upload_report", &report);
            render_template(&tera, "admin/temples.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_moderator(),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/admin/temples")
        }
        Err(err) => {
            log::error!("Failed to import temples: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/admin/temples/download")]
pub async fn download_temples(
    params: web::Query<DownloadQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match download_temples_service(&params.format, &user, repo.get_ref()) {
        Ok(file) => HttpResponse::Ok()
            .append_header(("Content-Type", file.content_type))
            .append_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", file.file_name),
            ))
            .body(file.bytes),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::Form(message)) => HttpResponse::BadRequest().body(message),
        Err(err) => {
            log::error!("Failed to export temples: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/admin/temples/{temple_id}/festivals")]
pub async fn show_festivals(
    temple_id: web::Path<i32>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(temple_id) = TempleId::new(temple_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    let temple = match get_temple_service(temple_id, &user, repo.get_ref()) {
        Ok(temple) => temple,
        Err(ServiceError::Unauthorized) => return not_moderator(),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Temple not found.").send();
            return redirect("/admin/temples");
        }
        Err(err) => {
            log::error!("Failed to load temple {temple_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match show_festivals_service(Some(temple_id), &user, repo.get_ref()) {
        Ok(festivals) => {
            let mut context = base_context(
                &flash_messages,
                Some(&user),
                "admin_temples",
                &server_config.auth_service_url,
            );
            context.insert("temple", &temple);
            context.insert("festivals", &festivals);
            render_template(&tera, "admin/festivals.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_moderator(),
        Err(err) => {
            log::error!("Failed to list festivals of temple {temple_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/admin/festivals")]
pub async fn create_festival(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<FestivalForm>,
) -> impl Responder {
    let back = format!("/admin/temples/{}/festivals", form.temple_id);
    let payload: FestivalFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(&back);
        }
    };

    match create_festival_service(payload, &user, repo.get_ref()) {
        Ok(_) => FlashMessage::success("Festival added.").send(),
        Err(ServiceError::Unauthorized) => return not_moderator(),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Temple not found.").send();
            return redirect("/admin/temples");
        }
        Err(err) => {
            log::error!("Failed to create festival: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect(&back)
}

#[post("/admin/festivals/{festival_id}/update")]
pub async fn update_festival(
    festival_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<FestivalForm>,
) -> impl Responder {
    let Ok(festival_id) = FestivalId::new(festival_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };
    let back = format!("/admin/temples/{}/festivals", form.temple_id);

    let payload: FestivalFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(&back);
        }
    };

    match update_festival_service(festival_id, payload, &user, repo.get_ref()) {
        Ok(()) => FlashMessage::success("Festival updated.").send(),
        Err(ServiceError::Unauthorized) => return not_moderator(),
        Err(ServiceError::NotFound) => FlashMessage::error("Festival not found.").send(),
        Err(err) => {
            log::error!("Failed to update festival {festival_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect(&back)
}

#[derive(Deserialize)]
pub struct FestivalActionForm {
    temple_id: i32,
}

#[post("/admin/festivals/{festival_id}/delete")]
pub async fn delete_festival(
    festival_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<FestivalActionForm>,
) -> impl Responder {
    let Ok(festival_id) = FestivalId::new(festival_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match delete_festival_service(festival_id, &user, repo.get_ref()) {
        Ok(()) => FlashMessage::success("Festival deleted.").send(),
        Err(ServiceError::Unauthorized) => return not_moderator(),
        Err(ServiceError::NotFound) => FlashMessage::error("Festival not found.").send(),
        Err(err) => {
            log::error!("Failed to delete festival {festival_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect(&format!("/admin/temples/{}/festivals", form.temple_id))
}

#[post("/admin/festivals/{festival_id}/toggle")]
pub async fn toggle_festival(
    festival_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<FestivalActionForm>,
) -> impl Responder {
    let Ok(festival_id) = FestivalId::new(festival_id.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match toggle_festival_service(festival_id, &user, repo.get_ref()) {
        Ok(true) => FlashMessage::success("Festival activated.").send(),
        Ok(false) => FlashMessage::success("Festival deactivated.").send(),
        Err(ServiceError::Unauthorized) => return not_moderator(),
        Err(ServiceError::NotFound) => FlashMessage::error("Festival not found.").send(),
        Err(err) => {
            log::error!("Failed to toggle festival {festival_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect(&format!("/admin/temples/{}/festivals", form.temple_id))
}

#[post("/admin/festivals/roll-forward")]
pub async fn roll_festivals_forward(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let today = Local::now().date_naive();
    match roll_festivals_forward_service(today, &user, repo.get_ref()) {
        Ok(updated) => {
            FlashMessage::success(format!("{updated} festival dates moved forward.")).send()
        }
        Err(ServiceError::Unauthorized) => return not_moderator(),
        Err(err) => {
            log::error!("Failed to roll festivals forward: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect("/admin/temples")
}
