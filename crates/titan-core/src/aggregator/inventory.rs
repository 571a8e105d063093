//! Flat list of locations plus the IP and name indices over it

use crate::model::Location;
use std::collections::HashMap;

/// Locations gathered by one aggregation run
///
/// Index keys are trimmed of surrounding whitespace. When two locations share
/// a key (typically across accounts) the one inserted last wins; no
/// uniqueness is enforced.
#[derive(Debug, Clone, Default)]
pub struct LocationInventory {
    locations: Vec<Location>,
    by_ip: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl LocationInventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every location and both indices
    pub fn clear(&mut self) {
        self.locations.clear();
        self.by_ip.clear();
        self.by_name.clear();
    }

    /// Append a location and index it under its trimmed IP and name
    pub fn insert(&mut self, location: Location) {
        let position = self.locations.len();
        self.by_ip.insert(location.ip.trim().to_string(), position);
        self.by_name.insert(location.name.trim().to_string(), position);
        self.locations.push(location);
    }

    /// Every location, in insertion order
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Number of locations
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the inventory holds no location
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Last location indexed under `ip` (the lookup key is trimmed too)
    pub fn by_ip(&self, ip: &str) -> Option<&Location> {
        self.by_ip.get(ip.trim()).map(|&i| &self.locations[i])
    }

    /// Last location indexed under `name` (the lookup key is trimmed too)
    pub fn by_name(&self, name: &str) -> Option<&Location> {
        self.by_name.get(name.trim()).map(|&i| &self.locations[i])
    }

    /// IP index entries
    pub fn ip_index(&self) -> impl Iterator<Item = (&str, &Location)> {
        self.by_ip
            .iter()
            .map(|(key, &i)| (key.as_str(), &self.locations[i]))
    }

    /// Name index entries
    pub fn name_index(&self) -> impl Iterator<Item = (&str, &Location)> {
        self.by_name
            .iter()
            .map(|(key, &i)| (key.as_str(), &self.locations[i]))
    }
}
