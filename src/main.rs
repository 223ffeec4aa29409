use actix_web::{middleware::Logger, web, App, HttpServer};

use quizbot_server::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    config.validate_for_production();
    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    // Best effort; the bot still answers users who never see the button.
    if let Err(err) = state.sender.setup_get_started().await {
        log::warn!("Get Started registration failed: {}", err);
    }

    log::info!("starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .service(handlers::verify_webhook)
            .service(handlers::receive_webhook)
    })
    .bind((host, port))?
    .run()
    .await
}
