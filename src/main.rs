use std::env;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::FlashMessagesFramework;
use actix_web_flash_messages::storage::CookieMessageStore;
use config::{Config, Environment, File};
use env_logger::Env;
use tera::Tera;

use temple_directory::db::{establish_connection_pool, run_migrations};
use temple_directory::models::config::ServerConfig;
use temple_directory::repository::DieselRepository;
use temple_directory::routes::admin::{
    approve_submission, create_festival, create_temple, delete_festival, delete_temple,
    download_temples, edit_temple, new_temple, reject_submission, roll_festivals_forward,
    set_temples_open, show_festivals, show_submissions, show_temples, toggle_festival,
    update_festival, update_temple, upload_temples,
};
use temple_directory::routes::api::{
    api_v1_featured, api_v1_nearby, api_v1_search, api_v1_stats, api_v1_submit,
    api_v1_suggestions, api_v1_temple,
};
use temple_directory::routes::main::{index, nearby, search, show_temple, temples_by_type};
use temple_directory::routes::submissions::{my_submissions, new_submission, submit_temple};

/// Cookie keys are derived from the configured secret; shorter secrets are refused.
const MIN_SECRET_LEN: usize = 32;

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

    Config::builder()
        .add_source(File::with_name("config/default"))
        .add_source(File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(Environment::with_prefix("APP"))
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let server_config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if server_config.secret.len() < MIN_SECRET_LEN {
        log::error!("The cookie secret must be at least {MIN_SECRET_LEN} bytes long");
        std::process::exit(1);
    }
    let secret_key = Key::derive_from(server_config.secret.as_bytes());

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool) {
        log::error!("Failed to run database migrations: {e}");
        std::process::exit(1);
    }

    let tera = match Tera::new(&format!("{}/**/*", server_config.templates_dir)) {
        Ok(tera) => tera,
        Err(e) => {
            log::error!("Failed to parse templates: {e}");
            std::process::exit(1);
        }
    };

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting temple directory on {}:{}",
        bind_address.0,
        bind_address.1
    );

    let repo = web::Data::new(DieselRepository::new(pool));
    let server_config = web::Data::new(server_config);
    let tera = web::Data::new(tera);

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(
                web::scope("/api/v1")
                    .service(api_v1_featured)
                    .service(api_v1_search)
                    .service(api_v1_suggestions)
                    .service(api_v1_nearby)
                    .service(api_v1_temple)
                    .service(api_v1_stats)
                    .service(api_v1_submit),
            )
            .service(index)
            .service(search)
            .service(show_temple)
            .service(temples_by_type)
            .service(nearby)
            .service(new_submission)
            .service(submit_temple)
            .service(my_submissions)
            .service(show_submissions)
            .service(approve_submission)
            .service(reject_submission)
            .service(show_temples)
            .service(new_temple)
            .service(create_temple)
            .service(download_temples)
            .service(upload_temples)
            .service(set_temples_open)
            .service(edit_temple)
            .service(update_temple)
            .service(delete_temple)
            .service(show_festivals)
            .service(create_festival)
            .service(roll_festivals_forward)
            .service(update_festival)
            .service(delete_festival)
            .service(toggle_festival)
            .app_data(repo.clone())
            .app_data(server_config.clone())
            .app_data(tera.clone())
    })
    .bind(bind_address)?
    .run()
    .await
}
