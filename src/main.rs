use actix_web::{middleware, web, App, HttpServer};
use amy_epw::config::Config;
use clap::Parser;
use log::{info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Set RUST_LOG=debug (or trace) to see more
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let amy = web::Data::new(config.build_service());

    info!("Station list: {}", amy.catalog_origin());
    info!(
        "Generator: {} {}",
        config.generator_program,
        config.generator_args.join(" ")
    );
    // Warm the cache in the background; a failure is shown on the page and retried per request.
    let warm = amy.clone();
    actix_web::rt::spawn(async move {
        match warm.catalog().await {
            Ok(catalog) => info!("Loaded {} stations", catalog.len()),
            Err(e) => warn!("Station list not available yet: {}", e),
        }
    });

    info!("Listening on http://{}", config.bind);
    HttpServer::new(move || {
        App::new()
            .app_data(amy.clone())
            .wrap(middleware::Logger::default())
            .configure(amy_epw::web::configure)
    })
    .bind(&config.bind)?
    .run()
    .await
}
