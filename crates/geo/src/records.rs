//! Line-delimited customer records.
//!
//! Input is one JSON object per line:
//! `{"latitude": "52.986375", "user_id": 12, "name": "Christina McArdle", "longitude": "-6.043701"}`
//! where latitude and longitude may be JSON numbers or numeric strings.
//!
//! Output is one line per registry entry in ascending id order:
//! `{"user_id": 12, "name": Christina McArdle}`. The name is written verbatim.

use crate::{Coordinate, GeoError, LocationRegistry, Result};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// One input record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerRecord {
    /// Customer name
    pub name: String,
    /// Latitude in degrees
    #[serde(deserialize_with = "number_or_string")]
    pub latitude: f64,
    /// Longitude in degrees
    #[serde(deserialize_with = "number_or_string")]
    pub longitude: f64,
    /// Registry key
    pub user_id: i64,
}

impl CustomerRecord {
    /// Validates the record into a registry key and coordinate.
    pub fn into_entry(self) -> Result<(i64, Coordinate)> {
        let coordinate = Coordinate::new(self.name, self.latitude, self.longitude)?;
        Ok((self.user_id, coordinate))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Degrees {
    Number(f64),
    Text(String),
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Degrees::deserialize(deserializer)? {
        Degrees::Number(value) => Ok(value),
        Degrees::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {:?}", text))),
    }
}

/// Builds a registry from a record stream.
///
/// The first malformed or unreadable line aborts the whole load; no partial
/// registry is returned. Blank lines are skipped. A repeated `user_id` overwrites the
/// earlier entry.
pub fn read_registry<R: BufRead>(reader: R) -> Result<LocationRegistry> {
    let mut registry = LocationRegistry::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|e| GeoError::Ingestion {
            line: line_number,
            reason: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let record: CustomerRecord =
            serde_json::from_str(&line).map_err(|e| GeoError::Ingestion {
                line: line_number,
                reason: e.to_string(),
            })?;

        let (id, coordinate) = record.into_entry().inspect_err(|e| {
            tracing::error!(line = line_number, error = %e, "Rejected record");
        })?;

        if registry.add(coordinate, id).is_some() {
            tracing::debug!(id, line = line_number, "Duplicate user_id, keeping latest");
        }
    }

    Ok(registry)
}

/// Loads a registry from a file of records.
pub fn load_registry(path: impl AsRef<Path>) -> Result<LocationRegistry> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let registry = read_registry(BufReader::new(file))?;

    tracing::info!(path = %path.display(), entries = registry.len(), "Loaded registry");
    Ok(registry)
}

/// Writes one output line per entry, ascending by id.
pub fn write_registry<W: Write>(registry: &LocationRegistry, mut writer: W) -> Result<()> {
    for (id, coordinate) in registry.entries() {
        writeln!(writer, "{{\"user_id\": {}, \"name\": {}}}", id, coordinate.name())?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the registry to `path`, creating or truncating the file.
pub fn save_registry(registry: &LocationRegistry, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_registry(registry, BufWriter::new(file))?;

    tracing::info!(path = %path.display(), entries = registry.len(), "Saved registry");
    Ok(())
}
