//! GCP list files for headless runs.
//!
//! A JSON array of `{ "x": .., "y": .., "lon": .., "lat": .. }` objects.
//! Coordinates may be numbers, strings or null and go through the same
//! parsing as typed input, so a bad value ends up `Invalid` rather than
//! failing the whole file.

use std::path::Path;

use georef_remote::GeorefService;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::WorkflowError;
use crate::map::MapView;
use crate::model::{CoordField, PointStore, StoreError};
use crate::workflow::Workflow;

#[derive(Error, Debug)]
pub enum PointsFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pixel position outside the loaded image
    #[error("Point {number} at ({x}, {y}) lies outside the {width}x{height} image")]
    OutsideImage {
        /// 1-based position in the file
        number: usize,
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A coordinate as written in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCoord {
    Number(f64),
    Text(String),
}

impl RawCoord {
    /// Text as if typed into the edit field.
    pub fn as_input(&self) -> String {
        match self {
            RawCoord::Number(value) => value.to_string(),
            RawCoord::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub lon: Option<RawCoord>,
    #[serde(default)]
    pub lat: Option<RawCoord>,
}

impl PointRecord {
    fn coords(&self) -> [(CoordField, Option<&RawCoord>); 2] {
        [
            (CoordField::Lon, self.lon.as_ref()),
            (CoordField::Lat, self.lat.as_ref()),
        ]
    }
}

pub fn parse_points(json: &str) -> Result<Vec<PointRecord>, PointsFileError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_points(path: &Path) -> Result<Vec<PointRecord>, PointsFileError> {
    let json = std::fs::read_to_string(path)?;
    let records = parse_points(&json)?;
    log::info!("Read {} GCPs from {:?}", records.len(), path);
    Ok(records)
}

/// Fill a bare store, for checks that need no image.
pub fn fill_store(records: &[PointRecord], store: &mut PointStore) -> Result<(), PointsFileError> {
    for record in records {
        let index = store.add_point(record.x, record.y).index;
        for (field, raw) in record.coords() {
            if let Some(raw) = raw {
                store.update_coordinate(index, field, &raw.as_input())?;
            }
        }
    }
    Ok(())
}

/// Place every record on the workflow's current image, in file order.
///
/// Stops at the first record outside the image; earlier records stay placed.
pub fn apply_points<S: GeorefService, M: MapView>(
    records: &[PointRecord],
    workflow: &mut Workflow<S, M>,
) -> Result<usize, PointsFileError> {
    let (width, height) = workflow
        .session()
        .image()
        .map(|image| image.size())
        .ok_or(WorkflowError::NoImage)?;

    for (i, record) in records.iter().enumerate() {
        let inside = record.x >= 0.0
            && record.y >= 0.0
            && record.x <= f64::from(width)
            && record.y <= f64::from(height);
        if !inside {
            return Err(PointsFileError::OutsideImage {
                number: i + 1,
                x: record.x,
                y: record.y,
                width,
                height,
            });
        }

        let index = workflow.place_point(record.x, record.y)?.index;
        for (field, raw) in record.coords() {
            if let Some(raw) = raw {
                workflow.update_coordinate(index, field, &raw.as_input())?;
            }
        }
    }
    Ok(records.len())
}
