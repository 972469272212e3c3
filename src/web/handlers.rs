use crate::service::AmyEpw;
use crate::types::year::AmyYear;
use crate::web::page::{render, render_download_missing, render_unavailable, FormState, Outcome};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{http::StatusCode, web, HttpResponse};
use log::{error, info, warn};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    pub country: Option<String>,
    pub city: Option<String>,
    pub year: Option<String>,
}

/// Fields are optional so that an incomplete post still gets the form back
/// with an error message instead of a bare 400.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateForm {
    pub country: Option<String>,
    pub city: Option<String>,
    pub year: Option<String>,
}

impl GenerateForm {
    fn missing_field(&self) -> Option<&'static str> {
        [
            ("country", &self.country),
            ("city", &self.city),
            ("year", &self.year),
        ]
        .into_iter()
        .find(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
    }
}

/// Year shown in the input: clipped into range, 2020 when missing or unreadable.
fn display_year(raw: Option<&str>) -> AmyYear {
    raw.and_then(|y| y.trim().parse::<i32>().ok())
        .map(AmyYear::clamped)
        .unwrap_or_default()
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub async fn index(amy: web::Data<AmyEpw>, query: web::Query<SelectionQuery>) -> HttpResponse {
    let query = query.into_inner();
    let catalog = match amy.catalog().await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Station list unavailable: {}", e);
            return html(StatusCode::SERVICE_UNAVAILABLE, render_unavailable(&e));
        }
    };
    let form = FormState::select(
        &catalog,
        query.country.as_deref(),
        query.city.as_deref(),
        display_year(query.year.as_deref()),
    );
    html(StatusCode::OK, render(&form, None))
}

pub async fn generate(amy: web::Data<AmyEpw>, form: web::Form<GenerateForm>) -> HttpResponse {
    let form = form.into_inner();
    let catalog = match amy.catalog().await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Station list unavailable: {}", e);
            return html(StatusCode::SERVICE_UNAVAILABLE, render_unavailable(&e));
        }
    };
    let country = form.country.as_deref().unwrap_or_default();
    let city = form.city.as_deref().unwrap_or_default();
    let year = form.year.as_deref().unwrap_or_default();

    let outcome = if let Some(field) = form.missing_field() {
        warn!("Generate request without {}", field);
        Outcome::Failed(format!("Please select a {field} before generating."))
    } else {
        match year.parse::<AmyYear>() {
            Err(e) => Outcome::failed(&e),
            Ok(year) => {
                info!("Generate requested for {}, {} ({})", city, country, year);
                match amy.generate_for_selection(country, city, year).await {
                    Ok((station, epw)) => {
                        let epw = Arc::new(epw);
                        let token = amy.shelve(Arc::clone(&epw));
                        Outcome::Ready {
                            station,
                            epw,
                            token,
                        }
                    }
                    Err(e) => Outcome::failed(&e),
                }
            }
        }
    };

    let selection = FormState::select(
        &catalog,
        form.country.as_deref(),
        form.city.as_deref(),
        display_year(form.year.as_deref()),
    );
    html(StatusCode::OK, render(&selection, Some(&outcome)))
}

/// Serves a generated file as an attachment under its base name.
pub async fn download(amy: web::Data<AmyEpw>, token: web::Path<String>) -> HttpResponse {
    let Some(epw) = amy.download(&token) else {
        warn!("Download requested for unknown or expired token");
        return html(StatusCode::NOT_FOUND, render_download_missing());
    };
    info!("Serving {} ({} bytes)", epw.file_name, epw.len());
    HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(epw.file_name.clone())],
        })
        .body(epw.bytes.clone())
}
