use crate::stations::catalog::StationCatalog;
use crate::stations::error::DataSourceError;
use crate::types::station::StationRecord;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::io::{self, Cursor};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

/// DWD list of stations reporting CLIMAT messages, keyed by WMO id.
pub const DATA_URL: &str =
    "https://opendata.dwd.de/climate_environment/CDC/help/stations_list_CLIMAT_data.txt";

pub const WMO_ID: &str = "WMO_ID";
pub const STATION_NAME: &str = "StationName";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";
pub const HEIGHT: &str = "Height";
pub const COUNTRY: &str = "Country";
const COLUMN_NAMES: [&str; 6] = [WMO_ID, STATION_NAME, LATITUDE, LONGITUDE, HEIGHT, COUNTRY];

/// Where the raw station table comes from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human readable origin, used in logs and error messages.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<Vec<u8>, DataSourceError>;
}

/// Default limit for the whole station list download, connect to last byte.
pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    url: String,
    client: Client,
    timeout: Duration,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_CATALOG_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HttpCatalogSource {
    fn default() -> Self {
        Self::new(DATA_URL)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>, DataSourceError> {
        info!("Fetching station list from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| DataSourceError::NetworkRequest(self.url.clone(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", self.url, e);
                return Err(if let Some(status) = e.status() {
                    DataSourceError::HttpStatus {
                        url: self.url.clone(),
                        status,
                        source: e,
                    }
                } else {
                    DataSourceError::NetworkRequest(self.url.clone(), e)
                });
            }
        };

        let stream = response.bytes_stream().map_err(io::Error::other);
        let reader = StreamReader::new(stream);
        tokio::pin!(reader);
        let mut body = Vec::new();
        // A timeout while streaming the body surfaces as an io error wrapping reqwest's.
        reader.read_to_end(&mut body).await?;
        debug!("Downloaded {} bytes from {}", body.len(), self.url);
        Ok(body)
    }
}

/// A local copy of the station table, in the same format as [`DATA_URL`].
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>, DataSourceError> {
        info!("Reading station list from {}", self.path.display());
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| DataSourceError::FileRead(self.path.clone(), e))
    }
}

/// Fetches the station table from `source` and parses it on a blocking thread.
pub async fn load_stations(source: &dyn CatalogSource) -> Result<StationCatalog, DataSourceError> {
    let origin = source.describe();
    let bytes = source.fetch().await?;
    let parse_start = std::time::Instant::now();
    let records = tokio::task::spawn_blocking(move || parse_station_table(bytes)).await??;
    if records.is_empty() {
        return Err(DataSourceError::EmptyCatalog(origin));
    }
    info!(
        "Parsed {} stations from {} in {:?}",
        records.len(),
        origin,
        parse_start.elapsed()
    );
    Ok(StationCatalog::new(records))
}

/// Parses the `;` separated station table.
///
/// The first line is a header and is skipped; columns are taken positionally.
/// Rows without a WMO id, station name or country are dropped, as are rows whose
/// WMO id is not a non-negative integer.
pub fn parse_station_table(bytes: Vec<u8>) -> Result<Vec<StationRecord>, DataSourceError> {
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_skip_rows(1)
        // Read every column as text, cleaning happens below.
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(b';')
                // Station names may contain a lone `"`; the table has no quoting.
                .with_quote_char(None)
                .with_encoding(CsvEncoding::LossyUtf8)
                .with_truncate_ragged_lines(true),
        )
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(DataSourceError::CsvParse)?;

    if df.width() < COLUMN_NAMES.len() {
        warn!(
            "Station list column count ({}) is below schema length ({})",
            df.width(),
            COLUMN_NAMES.len()
        );
        return Err(DataSourceError::SchemaMismatch {
            expected: COLUMN_NAMES.len(),
            found: df.width(),
        });
    }

    // Trailing separators show up as extra empty columns; only the first six count.
    let mut df = DataFrame::new(df.get_columns()[..COLUMN_NAMES.len()].to_vec())
        .map_err(DataSourceError::CsvParse)?;
    df.set_column_names(COLUMN_NAMES.iter().copied())
        .map_err(DataSourceError::CsvParse)?;

    let wmo_ids = text_column(&df, WMO_ID)?;
    let names = text_column(&df, STATION_NAME)?;
    let latitudes = text_column(&df, LATITUDE)?;
    let longitudes = text_column(&df, LONGITUDE)?;
    let heights = text_column(&df, HEIGHT)?;
    let countries = text_column(&df, COUNTRY)?;

    let mut records = Vec::with_capacity(df.height());
    let mut incomplete = 0usize;
    let mut bad_ids = 0usize;
    for idx in 0..df.height() {
        let (Some(raw_id), Some(station_name), Some(country)) = (
            non_empty(wmo_ids.get(idx)),
            non_empty(names.get(idx)),
            non_empty(countries.get(idx)),
        ) else {
            incomplete += 1;
            continue;
        };
        let Ok(wmo_id) = raw_id.parse::<u32>() else {
            bad_ids += 1;
            continue;
        };
        records.push(StationRecord {
            wmo_id,
            station_name: station_name.to_string(),
            country: country.to_string(),
            latitude: number(latitudes.get(idx)),
            longitude: number(longitudes.get(idx)),
            height_meters: number(heights.get(idx)),
        });
    }

    if incomplete > 0 {
        debug!("Dropped {} station rows with missing id, name or country", incomplete);
    }
    if bad_ids > 0 {
        warn!("Dropped {} station rows with a non-integer WMO id", bad_ids);
    }
    Ok(records)
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, DataSourceError> {
    df.column(name)
        .and_then(|c| c.str())
        .map_err(DataSourceError::CsvParse)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn number(value: Option<&str>) -> Option<f64> {
    non_empty(value).and_then(|s| s.parse::<f64>().ok())
}
