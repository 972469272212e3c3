//! Server-side rendering of the station / year form.

use crate::stations::catalog::StationCatalog;
use crate::types::generated::GeneratedEpw;
use crate::types::station::StationRecord;
use crate::types::year::{AmyYear, MAX_YEAR, MIN_YEAR};
use std::error::Error;
use std::sync::Arc;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem;color:#262730}\
label{display:block;margin:1rem 0 .25rem;font-weight:600}\
select,input{width:100%;padding:.4rem;font-size:1rem}\
button,.download{display:inline-block;margin-top:1.25rem;padding:.5rem 1rem;font-size:1rem;\
border:1px solid #aaa;border-radius:.4rem;background:#fff;color:inherit;text-decoration:none;cursor:pointer}\
.success{background:#e8f5e9;color:#1b5e20;padding:.75rem;border-radius:.4rem;margin-top:1.5rem}\
.error{background:#fdecea;color:#8a1c1c;padding:.75rem;border-radius:.4rem;margin-top:1.5rem}";

/// The selector values shown on the page.
///
/// A requested country or city that is not in the catalog falls back to the
/// first entry of its list, the same way a fresh dropdown would.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState<'a> {
    pub countries: Vec<&'a str>,
    pub cities: Vec<&'a str>,
    pub country: Option<&'a str>,
    pub city: Option<&'a str>,
    pub year: AmyYear,
}

impl<'a> FormState<'a> {
    pub fn select(
        catalog: &'a StationCatalog,
        country: Option<&str>,
        city: Option<&str>,
        year: AmyYear,
    ) -> Self {
        let countries = catalog.list_countries();
        let country = pick(&countries, country);
        let cities = country
            .map(|c| catalog.list_cities(c))
            .unwrap_or_default();
        let city = pick(&cities, city);
        Self {
            countries,
            cities,
            country,
            city,
            year,
        }
    }
}

fn pick<'a>(options: &[&'a str], wanted: Option<&str>) -> Option<&'a str> {
    wanted
        .and_then(|w| options.iter().copied().find(|o| *o == w))
        .or_else(|| options.first().copied())
}

/// Result of pressing "Generate": either a download or an error, never both.
#[derive(Debug)]
pub enum Outcome {
    Ready {
        station: StationRecord,
        epw: Arc<GeneratedEpw>,
        /// Key of the shelved file, served by `GET /download/{token}`.
        token: String,
    },
    Failed(String),
}

impl Outcome {
    pub fn failed(err: &(dyn Error + 'static)) -> Self {
        Outcome::Failed(error_chain(err))
    }
}

/// Joins an error with its sources, skipping sources already spelled out.
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

pub fn render(form: &FormState<'_>, outcome: Option<&Outcome>) -> String {
    let mut body = String::new();
    body.push_str(
        "<p>Select a <strong>country</strong>, then a <strong>city</strong>, \
         and the year to generate a weather EPW file.</p>\n",
    );
    body.push_str("<form method=\"get\" action=\"/\">\n");
    body.push_str(&select("country", "Select Country", &form.countries, form.country));
    body.push_str(&select("city", "Select City", &form.cities, form.city));
    body.push_str(&format!(
        "<label for=\"year\">Select Year</label>\n\
         <input type=\"number\" id=\"year\" name=\"year\" min=\"{MIN_YEAR}\" max=\"{MAX_YEAR}\" \
         step=\"1\" value=\"{}\" required>\n",
        form.year.get()
    ));
    body.push_str(
        "<button type=\"submit\" formmethod=\"post\" formaction=\"/generate\">\
         Generate EPW File</button>\n</form>\n",
    );

    match outcome {
        Some(Outcome::Ready {
            station,
            epw,
            token,
        }) => {
            body.push_str(&format!(
                "<div class=\"success\">&#x2705; EPW file for {}, {} ({}) is ready.</div>\n\
                 <a class=\"download\" download=\"{}\" href=\"/download/{}\">Download EPW</a>\n",
                escape(&station.station_name),
                escape(&station.country),
                epw.year,
                escape(&epw.file_name),
                escape(token),
            ));
        }
        Some(Outcome::Failed(message)) => {
            body.push_str(&format!(
                "<div class=\"error\">&#x26A0;&#xFE0F; Error: {}</div>\n",
                escape(message)
            ));
        }
        None => {}
    }
    document(&body)
}

/// Shown for an unknown or expired download token.
pub fn render_download_missing() -> String {
    document(
        "<div class=\"error\">&#x26A0;&#xFE0F; Error: this download has expired. \
         Generate the file again.</div>\n<p><a href=\"/\">Back to the form</a></p>\n",
    )
}

/// The page shown when the station list cannot be loaded; it has no selectors.
pub fn render_unavailable(err: &(dyn Error + 'static)) -> String {
    document(&format!(
        "<div class=\"error\">&#x26A0;&#xFE0F; Station list unavailable: {}</div>\n\
         <p><a href=\"/\">Try again</a></p>\n",
        escape(&error_chain(err))
    ))
}

fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>Generate EPW File</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>&#x1F30D; Generate EPW File</h1>\n{body}</body>\n</html>\n"
    )
}

fn select(name: &str, label: &str, options: &[&str], selected: Option<&str>) -> String {
    let mut html = format!(
        "<label for=\"{name}\">{label}</label>\n\
         <select id=\"{name}\" name=\"{name}\" onchange=\"this.form.submit()\">\n"
    );
    for option in options {
        let marker = if Some(*option) == selected { " selected" } else { "" };
        let value = escape(option);
        html.push_str(&format!("<option value=\"{value}\"{marker}>{value}</option>\n"));
    }
    html.push_str("</select>\n");
    html
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(wmo_id: u32, name: &str, country: &str) -> StationRecord {
        StationRecord {
            wmo_id,
            station_name: name.to_string(),
            country: country.to_string(),
            latitude: None,
            longitude: None,
            height_meters: None,
        }
    }

    fn catalog() -> StationCatalog {
        StationCatalog::new(vec![
            station(10384, "Berlin-Tempelhof", "Germany"),
            station(10147, "Hamburg-Fuhlsbuettel", "Germany"),
            station(6260, "De Bilt", "Netherlands"),
        ])
    }

    #[test]
    fn test_select_defaults_to_first_entries() {
        let catalog = catalog();
        let form = FormState::select(&catalog, None, None, AmyYear::default());
        assert_eq!(form.country, Some("Germany"));
        assert_eq!(form.city, Some("Berlin-Tempelhof"));
    }

    #[test]
    fn test_country_change_resets_foreign_city() {
        let catalog = catalog();
        let form = FormState::select(
            &catalog,
            Some("Netherlands"),
            Some("Hamburg-Fuhlsbuettel"),
            AmyYear::default(),
        );
        assert_eq!(form.cities, vec!["De Bilt"]);
        assert_eq!(form.city, Some("De Bilt"));
    }

    #[test]
    fn test_render_marks_selection_and_escapes() {
        let catalog = StationCatalog::new(vec![station(1, "A<B>", "X & Y")]);
        let form = FormState::select(&catalog, None, None, AmyYear::default());
        let html = render(&form, None);
        assert!(html.contains("<option value=\"X &amp; Y\" selected>X &amp; Y</option>"));
        assert!(html.contains("A&lt;B&gt;"));
        assert!(html.contains("min=\"1979\" max=\"2025\""));
        assert!(html.contains("value=\"2020\""));
        assert!(!html.contains("class=\"error\""));
        assert!(!html.contains("class=\"success\""));
    }

    #[test]
    fn test_ready_links_to_download_route() {
        let catalog = catalog();
        let form = FormState::select(&catalog, None, None, AmyYear::default());
        let outcome = Outcome::Ready {
            station: station(10384, "Berlin-Tempelhof", "Germany"),
            epw: Arc::new(GeneratedEpw {
                wmo_id: 10384,
                year: AmyYear::default(),
                file_name: "berlin_2020.epw".to_string(),
                bytes: vec![b'x'; 4 * 1024 * 1024],
                generated_at: chrono::Utc::now(),
            }),
            token: "0123abcd".to_string(),
        };
        let html = render(&form, Some(&outcome));
        assert!(html.contains("href=\"/download/0123abcd\""));
        assert!(html.contains("download=\"berlin_2020.epw\""));
        assert!(!html.contains("data:"));
        // The page stays small whatever the file size.
        assert!(html.len() < 16 * 1024);
    }

    #[test]
    fn test_error_chain_skips_repeated_sources() {
        use crate::generator::error::{BackendError, GenerationError};
        let err = GenerationError::from(BackendError::Raised("network timeout".to_string()));
        assert_eq!(
            error_chain(&err),
            "Exception during generation: network timeout"
        );

        let err = crate::stations::error::DataSourceError::FileRead(
            "/nope".into(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(
            error_chain(&err),
            "Failed to read station list file '/nope': no such file"
        );
    }
}
