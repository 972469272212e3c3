//! HTTP surface: the HTML form and a small JSON API over the same service.
//!
//! | Method | Path                  | Purpose                                   |
//! |--------|-----------------------|-------------------------------------------|
//! | GET    | `/`                   | form (`country`, `city`, `year` query)    |
//! | POST   | `/generate`           | generate and offer the EPW download       |
//! | GET    | `/download/{token}`   | the generated EPW file, as an attachment  |
//! | GET    | `/health`             | liveness and catalog state                |
//! | GET    | `/api/countries`      | countries in the catalog                  |
//! | GET    | `/api/cities`         | station names for `country`               |
//! | GET    | `/api/station`        | station record for `country` + `city`     |
//! | POST   | `/api/catalog/refresh`| drop and reload the cached station list   |

mod api;
mod handlers;
mod page;

use actix_web::web;

/// Registers every route. The app must carry a `web::Data<AmyEpw>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/generate", web::post().to(handlers::generate))
        .route("/download/{token}", web::get().to(handlers::download))
        .route("/health", web::get().to(api::health))
        .service(
            web::scope("/api")
                .route("/countries", web::get().to(api::countries))
                .route("/cities", web::get().to(api::cities))
                .route("/station", web::get().to(api::station))
                .route("/catalog/refresh", web::post().to(api::refresh_catalog)),
        );
}
