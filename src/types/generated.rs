use crate::types::year::AmyYear;
use chrono::{DateTime, Utc};

/// An EPW file produced for one station and year, held fully in memory.
///
/// The scratch directory the file was written to is already gone by the time
/// a value of this type exists; only the bytes and the base name survive.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedEpw {
    pub wmo_id: u32,
    pub year: AmyYear,
    /// Base name of the generated file, e.g. `berlin_2020.epw`.
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedEpw {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
