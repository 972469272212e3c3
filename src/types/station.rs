//! Defines the data structure representing one row of the WMO station catalog
//! (the DWD CLIMAT station list).

use serde::{Deserialize, Serialize};

/// Represents a single WMO weather station as listed in the station catalog.
///
/// Only the identifier, name and country are guaranteed to be present; rows
/// missing any of those are dropped while the catalog is parsed. The
/// coordinates are passed through as published, without validation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    /// World Meteorological Organization station identifier (e.g. `10384`).
    pub wmo_id: u32,
    /// Station name, trimmed of surrounding whitespace (e.g. "Berlin-Tempelhof").
    pub station_name: String,
    /// Country name, trimmed of surrounding whitespace (e.g. "Germany").
    pub country: String,
    /// Latitude in decimal degrees, if it could be read.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, if it could be read.
    pub longitude: Option<f64>,
    /// Station height above sea level in meters, if it could be read.
    pub height_meters: Option<f64>,
}

impl StationRecord {
    /// Returns `true` when this record is the station selected by `country` and `city`.
    ///
    /// Both fields are compared exactly; the catalog already trims them at load time.
    pub fn matches(&self, country: &str, city: &str) -> bool {
        self.country == country && self.station_name == city
    }
}
