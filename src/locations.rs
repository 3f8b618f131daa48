// Known locations.
// Loads the cities shows can be browsed by, and which of them are featured.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::artsy::Location;
use crate::error::Result;

/// Cities available without a locations file.
const BUILTIN_LOCATIONS: &[(&str, &str, f64, f64)] = &[
    ("new-york", "New York", 40.7128, -74.0060),
    ("london", "London", 51.5074, -0.1278),
    ("los-angeles", "Los Angeles", 34.0522, -118.2437),
    ("berlin", "Berlin", 52.5200, 13.4050),
    ("paris", "Paris", 48.8566, 2.3522),
    ("san-francisco", "San Francisco", 37.7749, -122.4194),
    ("hong-kong", "Hong Kong", 22.3193, 114.1694),
    ("chicago", "Chicago", 41.8781, -87.6298),
];

/// On-disk layout of a locations file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationsHost {
    locations: Vec<Location>,
    /// Ids of the locations shown by default, in display order.
    #[serde(default)]
    featured: Vec<String>,
}

impl LocationsHost {
    pub fn new(locations: Vec<Location>, featured: Vec<String>) -> Self {
        Self {
            locations,
            featured,
        }
    }

    /// The built-in table; every location is featured.
    pub fn builtin() -> Self {
        let locations: Vec<Location> = BUILTIN_LOCATIONS
            .iter()
            .map(|(id, name, lat, long)| Location::new(id, name, *lat, *long))
            .collect();
        let featured = locations.iter().map(|l| l.id.clone()).collect();
        Self::new(locations, featured)
    }

    /// Read a JSON locations file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let host: LocationsHost = serde_json::from_str(&contents)?;
        Ok(host)
    }

    /// Read `path` when given, otherwise use the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn all(&self) -> &[Location] {
        &self.locations
    }

    /// Featured locations in order. Ids with no matching location are skipped.
    pub fn featured(&self) -> Vec<&Location> {
        self.featured
            .iter()
            .filter_map(|id| {
                let location = self.get(id);
                if location.is_none() {
                    warn!(location_id = %id, "featured location is not defined");
                }
                location
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_features_everything() {
        let host = LocationsHost::builtin();
        assert_eq!(host.featured().len(), host.all().len());
        assert_eq!(host.get("london").unwrap().name, "London");
        assert!(host.get("atlantis").is_none());
    }

    #[test]
    fn test_from_file_skips_unknown_featured() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locations.json");
        fs::write(
            &path,
            r#"{
                "locations": [
                    {"id": "oslo", "name": "Oslo", "latitude": 59.91, "longitude": 10.75},
                    {"id": "rome", "name": "Rome", "latitude": 41.9, "longitude": 12.5}
                ],
                "featured": ["rome", "atlantis", "oslo"]
            }"#,
        )
        .unwrap();

        let host = LocationsHost::load(Some(&path)).unwrap();
        let featured: Vec<&str> = host.featured().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(featured, vec!["rome", "oslo"]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(LocationsHost::from_file(&temp_dir.path().join("nope.json")).is_err());
    }
}
