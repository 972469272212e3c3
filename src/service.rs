//! The main entry point tying the station catalog to the EPW generator.
//!
//! [`AmyEpw`] owns the memoized station catalog and the generator backend and
//! exposes the select-then-generate flow the web form is built on.

use crate::downloads::{DownloadShelf, DEFAULT_DOWNLOAD_CAPACITY, DEFAULT_DOWNLOAD_TTL};
use crate::error::AmyEpwError;
use crate::generator::backend::AmyEpwBackend;
use crate::generator::error::GenerationError;
use crate::generator::flow::generate_epw;
use crate::stations::cache::CatalogCache;
use crate::stations::catalog::StationCatalog;
use crate::stations::catalog_loader::CatalogSource;
use crate::stations::error::DataSourceError;
use crate::types::generated::GeneratedEpw;
use crate::types::station::StationRecord;
use crate::types::year::AmyYear;
use bon::bon;
use std::sync::Arc;
use std::time::Duration;

/// How long a single generator run may take before it is cancelled.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Station selection and EPW generation.
///
/// Create one with [`AmyEpw::builder()`]; it is cheap to share behind an `Arc`.
///
/// # Examples
///
/// ```no_run
/// # use amy_epw::{AmyEpw, AmyEpwError, CommandBackend, HttpCatalogSource};
/// # use std::sync::Arc;
/// # async fn run() -> Result<(), AmyEpwError> {
/// let amy = AmyEpw::builder()
///     .catalog_source(Arc::new(HttpCatalogSource::default()))
///     .backend(Arc::new(
///         CommandBackend::builder()
///             .program("python3")
///             .args(vec!["scripts/diyepw_bridge.py".to_string()])
///             .build(),
///     ))
///     .build();
///
/// let (station, epw) = amy
///     .generate_for_selection("Germany", "Berlin-Tempelhof", Default::default())
///     .await?;
/// println!("{} -> {} ({} bytes)", station.wmo_id, epw.file_name, epw.len());
/// # Ok(())
/// # }
/// ```
pub struct AmyEpw {
    catalog: CatalogCache,
    backend: Arc<dyn AmyEpwBackend>,
    generation_timeout: Duration,
    downloads: DownloadShelf,
}

#[bon]
impl AmyEpw {
    #[builder]
    pub fn new(
        catalog_source: Arc<dyn CatalogSource>,
        backend: Arc<dyn AmyEpwBackend>,
        generation_timeout: Option<Duration>,
        download_ttl: Option<Duration>,
    ) -> Self {
        Self {
            catalog: CatalogCache::new(catalog_source),
            backend,
            generation_timeout: generation_timeout.unwrap_or(DEFAULT_GENERATION_TIMEOUT),
            downloads: DownloadShelf::new(
                DEFAULT_DOWNLOAD_CAPACITY,
                download_ttl.unwrap_or(DEFAULT_DOWNLOAD_TTL),
            ),
        }
    }

    /// The station catalog, loaded on first use and memoized afterwards.
    pub async fn catalog(&self) -> Result<Arc<StationCatalog>, DataSourceError> {
        self.catalog.get().await
    }

    /// Drops the memoized catalog; the next [`AmyEpw::catalog`] call refetches it.
    pub async fn refresh_catalog(&self) {
        self.catalog.invalidate().await
    }

    pub async fn catalog_loaded(&self) -> bool {
        self.catalog.is_loaded().await
    }

    pub fn catalog_origin(&self) -> String {
        self.catalog.source().describe()
    }

    pub fn generation_timeout(&self) -> Duration {
        self.generation_timeout
    }

    /// Keeps a generated file for pickup and returns its download token.
    pub fn shelve(&self, epw: Arc<GeneratedEpw>) -> String {
        self.downloads.put(epw)
    }

    /// A previously shelved file, unless it expired or was pushed out.
    pub fn download(&self, token: &str) -> Option<Arc<GeneratedEpw>> {
        self.downloads.get(token)
    }

    pub fn download_ttl(&self) -> Duration {
        self.downloads.ttl()
    }

    pub async fn resolve_station(
        &self,
        country: &str,
        city: &str,
    ) -> Result<StationRecord, AmyEpwError> {
        let catalog = self.catalog().await?;
        Ok(catalog.resolve_station(country, city)?.clone())
    }

    /// Generates the EPW file for a station id.
    ///
    /// * `.wmo_id(u32)`: **Required.** WMO id of the station.
    /// * `.year(AmyYear)`: Optional, defaults to 2020.
    #[builder]
    pub async fn generate(
        &self,
        wmo_id: u32,
        year: Option<AmyYear>,
    ) -> Result<GeneratedEpw, GenerationError> {
        generate_epw(
            self.backend.as_ref(),
            wmo_id,
            year.unwrap_or_default(),
            self.generation_timeout,
        )
        .await
    }

    /// Resolves a country/city selection and generates its EPW file.
    pub async fn generate_for_selection(
        &self,
        country: &str,
        city: &str,
        year: AmyYear,
    ) -> Result<(StationRecord, GeneratedEpw), AmyEpwError> {
        let station = self.resolve_station(country, city).await?;
        let epw = self
            .generate()
            .wmo_id(station.wmo_id)
            .year(year)
            .call()
            .await?;
        Ok((station, epw))
    }
}
