//! Command-line / environment configuration of the server binary.

use crate::generator::backend::AmyEpwBackend;
use crate::generator::command::CommandBackend;
use crate::service::AmyEpw;
use crate::stations::catalog_loader::{
    CatalogSource, FileCatalogSource, HttpCatalogSource, DATA_URL, DEFAULT_CATALOG_TIMEOUT,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Bridge script calling the Python `diyepw` package, relative to the working directory.
pub const DEFAULT_BRIDGE_SCRIPT: &str = "scripts/diyepw_bridge.py";

/// Serve a form that turns a WMO station and a year into an AMY EPW weather file.
#[derive(Debug, Clone, Parser)]
#[command(name = "amy_epw", version, about)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "AMY_EPW_BIND", default_value = "127.0.0.1:8501")]
    pub bind: String,

    /// URL of the `;` separated WMO station list
    #[arg(
        long,
        env = "AMY_EPW_CATALOG_URL",
        default_value = DATA_URL,
        conflicts_with = "catalog_file"
    )]
    pub catalog_url: String,

    /// Read the station list from a local file instead of the URL
    #[arg(long, env = "AMY_EPW_CATALOG_FILE", value_name = "PATH")]
    pub catalog_file: Option<PathBuf>,

    /// Seconds the station list download may take, connect to last byte
    #[arg(
        long,
        env = "AMY_EPW_CATALOG_TIMEOUT_SECS",
        default_value_t = DEFAULT_CATALOG_TIMEOUT.as_secs()
    )]
    pub catalog_timeout_secs: u64,

    /// Program that runs the EPW generator
    #[arg(long, env = "AMY_EPW_GENERATOR_PROGRAM", default_value = "python3")]
    pub generator_program: String,

    /// Argument passed to the generator program (repeatable)
    #[arg(
        long = "generator-arg",
        value_name = "ARG",
        default_value = DEFAULT_BRIDGE_SCRIPT,
        allow_hyphen_values = true
    )]
    pub generator_args: Vec<String>,

    /// Seconds a single generation may run before it is cancelled
    #[arg(long, env = "AMY_EPW_GENERATION_TIMEOUT_SECS", default_value_t = 900)]
    pub generation_timeout_secs: u64,
}

impl Config {
    pub fn catalog_source(&self) -> Arc<dyn CatalogSource> {
        match &self.catalog_file {
            Some(path) => Arc::new(FileCatalogSource::new(path.clone())),
            None => Arc::new(HttpCatalogSource::with_timeout(
                self.catalog_url.clone(),
                self.catalog_timeout(),
            )),
        }
    }

    pub fn backend(&self) -> Arc<dyn AmyEpwBackend> {
        Arc::new(
            CommandBackend::builder()
                .program(self.generator_program.clone())
                .args(self.generator_args.clone())
                .build(),
        )
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn build_service(&self) -> AmyEpw {
        AmyEpw::builder()
            .catalog_source(self.catalog_source())
            .backend(self.backend())
            .generation_timeout(self.generation_timeout())
            .build()
    }
}
