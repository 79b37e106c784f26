use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use user_directory::config::{get_bind_address, load_config, mask_sensitive_url};
use user_directory::types::{AppConfig, StartupError};
use user_directory::user::service::UserService;
use user_directory::{configure_app, database, SERVICE_NAME, VERSION};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
            error!("{}", e);
            return Err(std::io::Error::other(e.to_string()));
        },
    };

    env_logger::init_from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    );

    if let Err(e) = run(config).await {
        error!("{}", e);
        return Err(std::io::Error::other(e.to_string()));
    }
    Ok(())
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    info!("Starting {} v{}", SERVICE_NAME, VERSION);
    info!("Database: {}", mask_sensitive_url(&config.database_url));

    let repository = database::connect(&config).await?;
    let service = web::Data::new(UserService::new(repository));

    let bind_address = get_bind_address(&config);
    info!("Listening on {} with {} workers", bind_address, config.server.workers);

    let cors_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_config))
            .wrap(Logger::default())
            .app_data(service.clone())
            .configure(configure_app)
    })
    .workers(config.server.workers)
    .keep_alive(config.server.keep_alive)
    .bind(&bind_address)
    .map_err(|e| StartupError::ServerBind(format!("{bind_address}: {e}")))?
    .run()
    .await
    .map_err(|e| StartupError::ServerBind(e.to_string()))
}

fn cors(config: &AppConfig) -> Cors {
    if config.allows_any_origin() {
        return Cors::permissive();
    }

    config
        .cors_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}
