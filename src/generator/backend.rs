//! The contract of the external AMY EPW generator.
//!
//! The generator is batch oriented: it takes lists of years and WMO ids and
//! answers with a mapping `year -> wmo id -> entry`, where each entry is an
//! opaque sequence whose second element is the path of the written EPW file.
//! Only [`crate::generator::flow::generate_weather_file`] looks inside that
//! shape.

use crate::generator::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Arguments of one generator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmyRequest {
    pub years: Vec<i32>,
    pub wmo_indices: Vec<u32>,
    /// Whether the generator may download missing observation data.
    pub allow_downloads: bool,
    /// Directory the generator writes its EPW files into.
    pub amy_epw_dir: PathBuf,
}

/// The generator's answer, `year -> wmo id -> entry`.
///
/// Serialized as nested JSON objects; integer keys travel as strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmyRunResult(pub BTreeMap<i32, BTreeMap<u32, Vec<Value>>>);

impl AmyRunResult {
    /// A result holding a single `(status, path)` entry.
    pub fn single(year: i32, wmo_id: u32, status: impl Into<Value>, path: &Path) -> Self {
        let mut result = Self::default();
        result.insert(
            year,
            wmo_id,
            vec![status.into(), Value::from(path.to_string_lossy().into_owned())],
        );
        result
    }

    pub fn insert(&mut self, year: i32, wmo_id: u32, entry: Vec<Value>) {
        self.0.entry(year).or_default().insert(wmo_id, entry);
    }

    pub fn entry(&self, year: i32, wmo_id: u32) -> Option<&[Value]> {
        self.0
            .get(&year)
            .and_then(|stations| stations.get(&wmo_id))
            .map(Vec::as_slice)
    }
}

#[async_trait]
pub trait AmyEpwBackend: Send + Sync {
    async fn create_amy_epw_files(&self, request: &AmyRequest)
        -> Result<AmyRunResult, BackendError>;
}
