use crate::stations::catalog::StationCatalog;
use crate::stations::catalog_loader::{load_stations, CatalogSource};
use crate::stations::error::DataSourceError;
use log::info;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Process-wide memo of the station catalog.
///
/// The first [`CatalogCache::get`] loads the catalog from its source; later
/// calls share the same `Arc` until [`CatalogCache::invalidate`] is called.
/// Loads are serialized by `loading`, so callers racing on an empty cache
/// trigger a single fetch. The loaded catalog lives in `snapshot`, which is
/// only locked to clone or swap the `Arc` and never across a fetch.
/// Failed loads are not remembered.
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    snapshot: RwLock<Option<Arc<StationCatalog>>>,
    loading: Mutex<()>,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(None),
            loading: Mutex::new(()),
        }
    }

    pub async fn get(&self) -> Result<Arc<StationCatalog>, DataSourceError> {
        if let Some(catalog) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(catalog));
        }
        let _load = self.loading.lock().await;
        // Another caller may have finished loading while we waited.
        if let Some(catalog) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(catalog));
        }
        let catalog = Arc::new(load_stations(self.source.as_ref()).await?);
        *self.snapshot.write().await = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    pub async fn invalidate(&self) {
        if self.snapshot.write().await.take().is_some() {
            info!("Station catalog cache invalidated");
        }
    }

    /// Whether a catalog is cached. Does not wait for a load in flight.
    pub async fn is_loaded(&self) -> bool {
        self.snapshot.read().await.is_some()
    }

    pub fn source(&self) -> &dyn CatalogSource {
        self.source.as_ref()
    }
}
