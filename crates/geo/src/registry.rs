//! Keyed registry of locations that can be trimmed to a radius.

use crate::{vincenty_distance, Coordinate};
use std::collections::BTreeMap;

/// Locations keyed by an externally supplied id.
///
/// Each registry owns its own map; two registries never share entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationRegistry {
    entries: BTreeMap<i64, Coordinate>,
}

impl LocationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Inserts `coordinate` at `id`, replacing whatever was there.
    ///
    /// Returns the previous coordinate, if any.
    pub fn add(&mut self, coordinate: Coordinate, id: i64) -> Option<Coordinate> {
        self.entries.insert(id, coordinate)
    }

    /// Removes the entry at `id`.
    ///
    /// A missing id is not an error: it is logged and the registry is left
    /// unchanged.
    pub fn remove(&mut self, id: i64) -> Option<Coordinate> {
        let removed = self.entries.remove(&id);
        if removed.is_none() {
            tracing::warn!(id, "Entry with ID {} does not exist", id);
        }
        removed
    }

    /// Drops every entry farther than `threshold_km` from `reference`.
    ///
    /// Distance is Vincenty's ellipsoidal distance. Entries exactly at the
    /// threshold are kept. A negative threshold keeps nothing, since no
    /// distance is negative. A NaN threshold also keeps nothing: every
    /// comparison against it is false.
    ///
    /// Returns the number of entries removed.
    pub fn filter_by_radius(&mut self, reference: &Coordinate, threshold_km: f64) -> usize {
        let before = self.entries.len();

        // Distances are computed over a snapshot before anything is removed.
        let outside: Vec<i64> = self
            .entries
            .iter()
            .filter_map(|(&id, coordinate)| {
                let distance = vincenty_distance(coordinate, reference);
                let keep = distance <= threshold_km;
                tracing::debug!(id, name = coordinate.name(), distance_km = distance, keep);
                (!keep).then_some(id)
            })
            .collect();

        for id in outside {
            self.remove(id);
        }

        let removed = before - self.entries.len();
        tracing::info!(
            reference = reference.name(),
            threshold_km,
            kept = self.entries.len(),
            removed,
            "Filtered registry by radius"
        );
        removed
    }

    /// Entries in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = (i64, &Coordinate)> + '_ {
        self.entries.iter().map(|(&id, coordinate)| (id, coordinate))
    }

    /// Returns the coordinate stored at `id`.
    pub fn get(&self, id: i64) -> Option<&Coordinate> {
        self.entries.get(&id)
    }

    /// Returns true if an entry exists at `id`.
    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.keys().copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(i64, Coordinate)> for LocationRegistry {
    fn from_iter<I: IntoIterator<Item = (i64, Coordinate)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (id, coordinate) in iter {
            registry.add(coordinate, id);
        }
        registry
    }
}
