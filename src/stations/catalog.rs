//! The in-memory station catalog and the dependent country -> city -> station
//! selection queries the form is built from.

use crate::stations::error::SelectionError;
use crate::types::station::StationRecord;
use log::warn;
use std::collections::{BTreeSet, HashMap};

/// An immutable, ordered table of [`StationRecord`]s.
///
/// Row order is the order of the source table and is what the
/// "first match wins" rule in [`StationCatalog::resolve_station`] refers to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationCatalog {
    records: Vec<StationRecord>,
}

impl StationCatalog {
    pub fn new(records: Vec<StationRecord>) -> Self {
        let catalog = Self { records };
        let ambiguous = catalog.ambiguous_selections();
        if !ambiguous.is_empty() {
            warn!(
                "{} country/station pairs map to more than one WMO id; the first listed row is used for each",
                ambiguous.len()
            );
        }
        catalog
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct country names, sorted ascending.
    pub fn list_countries(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.country.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct station names within `country`, sorted ascending.
    ///
    /// Empty when the country is not in the catalog.
    pub fn list_cities(&self, country: &str) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.country == country)
            .map(|r| r.station_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Resolves a selection to the first catalog row with this exact country and name.
    pub fn resolve_station(
        &self,
        country: &str,
        city: &str,
    ) -> Result<&StationRecord, SelectionError> {
        self.records
            .iter()
            .find(|r| r.matches(country, city))
            .ok_or_else(|| SelectionError::StationNotFound {
                country: country.to_string(),
                city: city.to_string(),
            })
    }

    /// Country/station pairs listed with more than one distinct WMO id.
    pub fn ambiguous_selections(&self) -> Vec<(&str, &str)> {
        let mut ids: HashMap<(&str, &str), BTreeSet<u32>> = HashMap::new();
        for r in &self.records {
            ids.entry((r.country.as_str(), r.station_name.as_str()))
                .or_default()
                .insert(r.wmo_id);
        }
        let mut pairs: Vec<_> = ids
            .into_iter()
            .filter(|(_, set)| set.len() > 1)
            .map(|(pair, _)| pair)
            .collect();
        pairs.sort_unstable();
        pairs
    }
}
