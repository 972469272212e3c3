use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by, or while talking to, the external EPW generator.
#[derive(Debug, Error)]
pub enum BackendError {
    // The generator ran and raised; carries its message verbatim.
    #[error("{0}")]
    Raised(String),

    #[error("Failed to start generator '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to exchange data with the generator process")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode generator request")]
    Encode(#[source] serde_json::Error),

    #[error("Generator returned output that is not a result mapping")]
    InvalidOutput(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Exception during generation: {0}")]
    Exception(#[from] BackendError),

    #[error("EPW file generation failed: '{}' was not created", .0.display())]
    OutputMissing(PathBuf),

    #[error("EPW file generation failed: no result for station {wmo_id} in {year}")]
    MissingResultEntry { year: i32, wmo_id: u32 },

    #[error("EPW file generation failed: unexpected result for station {wmo_id} in {year}: {entry}")]
    MalformedResult {
        year: i32,
        wmo_id: u32,
        entry: String,
    },

    #[error("EPW file generation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Failed to create scratch directory")]
    ScratchDir(#[source] std::io::Error),

    #[error("Failed to read generated file '{}'", .0.display())]
    ReadOutput(PathBuf, #[source] std::io::Error),
}
