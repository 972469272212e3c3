use crate::generator::error::GenerationError;
use crate::stations::error::{DataSourceError, SelectionError};
use crate::types::year::YearOutOfRange;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmyEpwError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Year(#[from] YearOutOfRange),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
