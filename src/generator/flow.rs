use crate::generator::backend::{AmyEpwBackend, AmyRequest};
use crate::generator::error::GenerationError;
use crate::types::generated::GeneratedEpw;
use crate::types::year::AmyYear;
use chrono::Utc;
use log::{info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Asks the generator for one station and one year and returns the EPW path it reports.
///
/// Downloads of observation data are always allowed. The path is taken from the
/// second element of the `year -> station` entry; the file is not checked here.
pub async fn generate_weather_file(
    backend: &dyn AmyEpwBackend,
    wmo_id: u32,
    year: AmyYear,
    output_dir: &Path,
) -> Result<PathBuf, GenerationError> {
    let year = year.get();
    let request = AmyRequest {
        years: vec![year],
        wmo_indices: vec![wmo_id],
        allow_downloads: true,
        amy_epw_dir: output_dir.to_path_buf(),
    };
    let result = backend.create_amy_epw_files(&request).await?;
    let entry = result
        .entry(year, wmo_id)
        .ok_or(GenerationError::MissingResultEntry { year, wmo_id })?;

    match entry.get(1) {
        Some(Value::String(path)) => Ok(PathBuf::from(path)),
        _ => Err(GenerationError::MalformedResult {
            year,
            wmo_id,
            entry: Value::from(entry.to_vec()).to_string(),
        }),
    }
}

/// Generates the EPW file for `wmo_id` and `year` inside a fresh scratch directory.
///
/// The file is read into memory before returning. The scratch directory is
/// removed on every exit path, including timeouts.
pub async fn generate_epw(
    backend: &dyn AmyEpwBackend,
    wmo_id: u32,
    year: AmyYear,
    timeout: Duration,
) -> Result<GeneratedEpw, GenerationError> {
    let scratch = tempfile::Builder::new()
        .prefix("amy-epw-")
        .tempdir()
        .map_err(GenerationError::ScratchDir)?;
    let started = Instant::now();
    info!(
        "Generating EPW for station {} in {} (scratch dir {})",
        wmo_id,
        year,
        scratch.path().display()
    );

    let outcome = match tokio::time::timeout(
        timeout,
        generate_and_read(backend, wmo_id, year, scratch.path()),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(GenerationError::TimedOut(timeout)),
    };

    let scratch_path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        warn!(
            "Failed to remove scratch directory {}: {}",
            scratch_path.display(),
            e
        );
    }

    match &outcome {
        Ok(epw) => info!(
            "Generated {} ({} bytes) in {:?}",
            epw.file_name,
            epw.len(),
            started.elapsed()
        ),
        Err(e) => warn!("EPW generation for station {} in {} failed: {}", wmo_id, year, e),
    }
    outcome
}

async fn generate_and_read(
    backend: &dyn AmyEpwBackend,
    wmo_id: u32,
    year: AmyYear,
    output_dir: &Path,
) -> Result<GeneratedEpw, GenerationError> {
    let path = generate_weather_file(backend, wmo_id, year, output_dir).await?;
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(GenerationError::OutputMissing(path));
    }
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| GenerationError::ReadOutput(path.clone(), e))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}_{}.epw", wmo_id, year));

    Ok(GeneratedEpw {
        wmo_id,
        year,
        file_name,
        bytes,
        generated_at: Utc::now(),
    })
}
