use crate::service::AmyEpw;
use crate::stations::error::SelectionError;
use crate::web::page::error_chain;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
    timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now().timestamp(),
        }
    }

    fn error(message: String) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CitiesQuery {
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub struct StationQuery {
    pub country: String,
    pub city: String,
}

#[derive(Debug, Serialize)]
struct CatalogSummary {
    origin: String,
    stations: usize,
    countries: usize,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    catalog_loaded: bool,
    generation_timeout_secs: u64,
}

macro_rules! catalog_or_unavailable {
    ($amy:expr) => {
        match $amy.catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Station list unavailable: {}", e);
                return HttpResponse::ServiceUnavailable()
                    .json(ApiResponse::<()>::error(error_chain(&e)));
            }
        }
    };
}

pub async fn countries(amy: web::Data<AmyEpw>) -> HttpResponse {
    let catalog = catalog_or_unavailable!(amy);
    HttpResponse::Ok().json(ApiResponse::success(catalog.list_countries()))
}

pub async fn cities(amy: web::Data<AmyEpw>, query: web::Query<CitiesQuery>) -> HttpResponse {
    let catalog = catalog_or_unavailable!(amy);
    let cities = catalog.list_cities(&query.country);
    if cities.is_empty() {
        let err = SelectionError::UnknownCountry(query.country.clone());
        return HttpResponse::NotFound().json(ApiResponse::<()>::error(err.to_string()));
    }
    HttpResponse::Ok().json(ApiResponse::success(cities))
}

pub async fn station(amy: web::Data<AmyEpw>, query: web::Query<StationQuery>) -> HttpResponse {
    let catalog = catalog_or_unavailable!(amy);
    match catalog.resolve_station(&query.country, &query.city) {
        Ok(record) => HttpResponse::Ok().json(ApiResponse::success(record)),
        Err(e) => HttpResponse::NotFound().json(ApiResponse::<()>::error(e.to_string())),
    }
}

pub async fn refresh_catalog(amy: web::Data<AmyEpw>) -> HttpResponse {
    amy.refresh_catalog().await;
    let catalog = catalog_or_unavailable!(amy);
    info!("Station list reloaded: {} stations", catalog.len());
    HttpResponse::Ok().json(ApiResponse::success(CatalogSummary {
        origin: amy.catalog_origin(),
        stations: catalog.len(),
        countries: catalog.list_countries().len(),
    }))
}

pub async fn health(amy: web::Data<AmyEpw>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(Health {
        status: "ok",
        catalog_loaded: amy.catalog_loaded().await,
        generation_timeout_secs: amy.generation_timeout().as_secs(),
    }))
}
