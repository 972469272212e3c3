pub mod config;
mod downloads;
mod error;
mod generator;
mod service;
mod stations;
mod types;
pub mod web;

pub use downloads::{DownloadShelf, DEFAULT_DOWNLOAD_CAPACITY, DEFAULT_DOWNLOAD_TTL};
pub use error::AmyEpwError;
pub use service::*;

pub use generator::backend::{AmyEpwBackend, AmyRequest, AmyRunResult};
pub use generator::command::CommandBackend;
pub use generator::error::{BackendError, GenerationError};
pub use generator::flow::{generate_epw, generate_weather_file};

pub use stations::cache::CatalogCache;
pub use stations::catalog::StationCatalog;
pub use stations::catalog_loader::{
    load_stations, parse_station_table, CatalogSource, FileCatalogSource, HttpCatalogSource,
    DATA_URL, DEFAULT_CATALOG_TIMEOUT,
};
pub use stations::error::{DataSourceError, SelectionError};

pub use types::generated::GeneratedEpw;
pub use types::station::StationRecord;
pub use types::year::{AmyYear, InvalidYear, YearOutOfRange, DEFAULT_YEAR, MAX_YEAR, MIN_YEAR};
