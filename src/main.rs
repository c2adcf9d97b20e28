mod config;
mod context;
mod core;
mod error;
mod handlers;
mod impls;
mod middlewares;
pub mod models;
pub mod request;
pub mod response;
mod storer;

use std::sync::Mutex;
use std::time::Duration;

use actix_web::web::{delete, get, post, put, resource, scope, Data};
use actix_web::HttpServer;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::core::favorites::FavoriteSet;
use crate::impls::pg::PgStore;
use crate::middlewares::admin::RequireAdmin;
use crate::middlewares::jwt::Jwt;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "actix_web=info,sahyog=info");
    }
    env_logger::init();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    std::fs::create_dir_all(&config.upload_path)?;
    std::fs::create_dir_all(&config.data_dir)?;
    let favorites = Data::new(Mutex::new(FavoriteSet::open(std::path::Path::new(&config.data_dir))));
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.geo_step_timeout_secs))
        .build()?;
    let bind_addr = (config.host.clone(), config.port);

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(PgStore::new(pool.clone())))
            .app_data(Data::new(storer::LocalStorer::new(&config.upload_path)))
            .app_data(Data::new(http_client.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(favorites.clone())
            .service(actix_files::Files::new("/uploads", &config.upload_path))
            .service(
                scope("")
                    .service(resource("login").route(post().to(handlers::login)))
                    .service(resource("signup").route(post().to(handlers::signup)))
                    .service(resource("contact").route(post().to(handlers::contact::create)))
                    .service(
                        scope("opportunities")
                            .route("", get().to(handlers::opportunity::browse))
                            .route("{opportunity_id}", get().to(handlers::opportunity::detail)),
                    )
                    .service(
                        scope("favorites")
                            .route("", get().to(handlers::favorites::list))
                            .route("{opportunity_id}/toggle", post().to(handlers::favorites::toggle)),
                    )
                    .service(
                        scope("")
                            .wrap(Jwt::new(config.jwt_secret.as_bytes().to_owned()))
                            .service(
                                scope("profile")
                                    .service(
                                        resource("")
                                            .route(get().to(handlers::profile::me))
                                            .route(put().to(handlers::profile::update)),
                                    )
                                    .route("avatar", post().to(handlers::upload::create::<storer::LocalStorer>)),
                            )
                            .service(resource("profiles/{profile_id}").route(get().to(handlers::profile::detail)))
                            .service(resource("discovery").route(get().to(handlers::opportunity::discover)))
                            .service(
                                resource("applications")
                                    .route(post().to(handlers::application::apply))
                                    .route(get().to(handlers::application::mine)),
                            )
                            .service(resource("stats").route(get().to(handlers::stats::user_stats)))
                            .service(
                                scope("location")
                                    .route("detect", post().to(handlers::location::detect))
                                    .route("geocode", post().to(handlers::location::geocode))
                                    .route("distance", get().to(handlers::location::distance)),
                            )
                            .service(
                                scope("ngo")
                                    .service(
                                        resource("")
                                            .route(post().to(handlers::ngo::submit))
                                            .route(get().to(handlers::ngo::mine))
                                            .route(put().to(handlers::ngo::update)),
                                    )
                                    .service(
                                        scope("opportunities")
                                            .service(
                                                resource("")
                                                    .route(get().to(handlers::opportunity::mine))
                                                    .route(post().to(handlers::opportunity::create)),
                                            )
                                            .service(
                                                resource("{opportunity_id}")
                                                    .route(put().to(handlers::opportunity::update))
                                                    .route(delete().to(handlers::opportunity::delete_opportunity)),
                                            ),
                                    )
                                    .service(
                                        scope("applications")
                                            .route("", get().to(handlers::application::inbox))
                                            .route("{application_id}/status", put().to(handlers::application::review)),
                                    ),
                            )
                            .service(
                                scope("admin")
                                    .wrap(RequireAdmin::new(pool.clone()))
                                    .route("overview", get().to(handlers::admin::overview))
                                    .route("users", get().to(handlers::admin::users))
                                    .route("ngos", get().to(handlers::admin::ngos))
                                    .route("ngos/{ngo_id}/approve", post().to(handlers::admin::approve_ngo))
                                    .route("ngos/{ngo_id}/reject", post().to(handlers::admin::reject_ngo))
                                    .route("opportunities", get().to(handlers::admin::opportunities))
                                    .route("messages", get().to(handlers::admin::messages))
                                    .route("messages/{message_id}/read", put().to(handlers::admin::mark_message_read)),
                            ),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await?;
    Ok(())
}
